//! Target platform detection for extension binaries.
//!
//! Catalog artifacts are keyed by an `(os, arch)` pair. Publishers use a mix
//! of Go-style and Rust-style names, so both sides are normalised before
//! comparison.

use std::fmt;

/// Operating system / architecture pair an artifact is built for
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TargetPlatform {
    os: String,
    arch: String,
}

impl TargetPlatform {
    /// Create a platform from raw names, normalising known aliases
    pub fn new(os: impl AsRef<str>, arch: impl AsRef<str>) -> Self {
        Self {
            os: normalize_os(os.as_ref()),
            arch: normalize_arch(arch.as_ref()),
        }
    }

    /// Detect the platform this binary was compiled for
    pub fn detect() -> Self {
        Self::new(std::env::consts::OS, std::env::consts::ARCH)
    }

    /// Normalised operating system name (linux, macos, windows, ...)
    pub fn os(&self) -> &str {
        &self.os
    }

    /// Normalised architecture name (x86_64, aarch64, ...)
    pub fn arch(&self) -> &str {
        &self.arch
    }

    /// Whether this is the Windows-style platform
    pub fn is_windows(&self) -> bool {
        self.os == "windows"
    }

    /// Suffix appended to executable file names
    pub fn exe_suffix(&self) -> &'static str {
        if self.is_windows() {
            ".exe"
        } else {
            ""
        }
    }

    /// Executable file name for `stem` on this platform
    pub fn executable_name(&self, stem: &str) -> String {
        format!("{}{}", stem, self.exe_suffix())
    }

    /// Whether raw `(os, arch)` names refer to this platform
    pub fn matches(&self, os: &str, arch: &str) -> bool {
        self.os == normalize_os(os) && self.arch == normalize_arch(arch)
    }
}

impl fmt::Display for TargetPlatform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.os, self.arch)
    }
}

fn normalize_os(os: &str) -> String {
    let os = os.trim().to_ascii_lowercase();
    match os.as_str() {
        "darwin" | "osx" | "mac" => "macos".to_string(),
        "win" | "win32" | "win64" => "windows".to_string(),
        _ => os,
    }
}

fn normalize_arch(arch: &str) -> String {
    let arch = arch.trim().to_ascii_lowercase();
    match arch.as_str() {
        "amd64" | "x64" | "x86-64" => "x86_64".to_string(),
        "arm64" => "aarch64".to_string(),
        "386" | "i386" | "i686" => "x86".to_string(),
        _ => arch,
    }
}
