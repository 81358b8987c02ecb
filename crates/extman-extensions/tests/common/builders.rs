//! Builders for archives and catalog entries

use extman_core::types::{Artifact, CatalogDocument, Digest, Extension, Release};
use flate2::write::GzEncoder;
use flate2::Compression;
use std::path::Path;
use tar::{Builder, EntryType, Header};

use super::constants::*;

enum Entry {
    Dir(String),
    File(String, Vec<u8>),
    Symlink(String, String),
    HardLink(String, String),
}

/// Builds gzip-compressed tar archives in memory
#[derive(Default)]
pub struct ArchiveBuilder {
    entries: Vec<Entry>,
}

impl ArchiveBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Archive with the hello fragment and a matching binary
    pub fn hello() -> Self {
        Self::new()
            .file(FRAGMENT_FILENAME, fragment_toml(HELLO, HELLO_VERSION, HELLO_SHA256))
            .file(&binary_entry(HELLO), HELLO_BINARY)
    }

    pub fn dir(mut self, name: &str) -> Self {
        self.entries.push(Entry::Dir(name.to_string()));
        self
    }

    pub fn file(mut self, name: &str, content: impl AsRef<[u8]>) -> Self {
        self.entries
            .push(Entry::File(name.to_string(), content.as_ref().to_vec()));
        self
    }

    pub fn symlink(mut self, name: &str, target: &str) -> Self {
        self.entries
            .push(Entry::Symlink(name.to_string(), target.to_string()));
        self
    }

    pub fn hard_link(mut self, name: &str, target: &str) -> Self {
        self.entries
            .push(Entry::HardLink(name.to_string(), target.to_string()));
        self
    }

    pub fn build(self) -> Vec<u8> {
        let mut builder = Builder::new(GzEncoder::new(Vec::new(), Compression::default()));
        for entry in self.entries {
            let mut header = Header::new_gnu();
            header.set_mode(0o755);
            match entry {
                Entry::Dir(name) => {
                    header.set_entry_type(EntryType::Directory);
                    header.set_size(0);
                    builder
                        .append_data(&mut header, name, std::io::empty())
                        .unwrap();
                }
                Entry::File(name, content) => {
                    header.set_entry_type(EntryType::Regular);
                    header.set_size(content.len() as u64);
                    builder
                        .append_data(&mut header, name, content.as_slice())
                        .unwrap();
                }
                Entry::Symlink(name, target) => {
                    append_link(&mut builder, &mut header, EntryType::Symlink, &name, &target);
                }
                Entry::HardLink(name, target) => {
                    append_link(&mut builder, &mut header, EntryType::Link, &name, &target);
                }
            }
        }
        builder.into_inner().unwrap().finish().unwrap()
    }

    /// Write the archive to `path`
    pub fn write_to(self, path: &Path) {
        std::fs::write(path, self.build()).unwrap();
    }
}

fn append_link<W: std::io::Write>(
    builder: &mut Builder<W>,
    header: &mut Header,
    kind: EntryType,
    name: &str,
    target: &str,
) {
    header.set_entry_type(kind);
    header.set_size(0);
    header.set_link_name(target).unwrap();
    builder.append_data(header, name, std::io::empty()).unwrap();
}

/// Single-extension catalog fragment as shipped in archives
pub fn fragment_toml(name: &str, version: &str, sha256_hex: &str) -> String {
    let doc = CatalogDocument {
        extensions: vec![extension(name, &[release(version, sha256_hex)])],
    };
    doc.to_toml_string().unwrap()
}

/// Release with one artifact for the test platform
pub fn release(version: &str, sha256_hex: &str) -> Release {
    Release::new(
        version,
        vec![Artifact::new(TEST_OS, TEST_ARCH, sha256_sum(sha256_hex))],
    )
}

/// Release whose test-platform artifact is served from `url`
pub fn release_with_url(version: &str, content: &[u8], url: &str) -> Release {
    let digest = Digest::sha256(content);
    Release::new(
        version,
        vec![Artifact::new(TEST_OS, TEST_ARCH, digest.to_string()).with_url(url)],
    )
}

pub fn extension(name: &str, releases: &[Release]) -> Extension {
    Extension::new(name, releases.to_vec())
}

/// Catalog holding `extensions` in order
pub fn catalog(extensions: Vec<Extension>) -> CatalogDocument {
    CatalogDocument { extensions }
}
