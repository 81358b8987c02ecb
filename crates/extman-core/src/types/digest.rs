//! Integrity digests recorded for release artifacts
//!
//! Catalogs write digests either as `sha256:<hex>` or as bare hex, which is
//! taken to be SHA-256.

use crate::error::{Error, Result};
use sha2::{Digest as _, Sha256};
use std::fmt;
use std::str::FromStr;

/// Supported digest algorithms
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DigestAlgorithm {
    Sha256,
}

impl DigestAlgorithm {
    /// Prefix used in the `<algo>:<hex>` form
    pub fn prefix(&self) -> &'static str {
        match self {
            Self::Sha256 => "sha256",
        }
    }

    fn hex_len(&self) -> usize {
        match self {
            Self::Sha256 => 64,
        }
    }
}

/// Expected or computed checksum of an artifact
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Digest {
    algorithm: DigestAlgorithm,
    hex: String,
}

impl Digest {
    /// Compute the SHA-256 digest of `bytes`
    pub fn sha256(bytes: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(bytes);
        Self {
            algorithm: DigestAlgorithm::Sha256,
            hex: format!("{:x}", hasher.finalize()),
        }
    }

    /// Compute a digest of `bytes` with the same algorithm as `self`
    pub fn compute_like(&self, bytes: &[u8]) -> Self {
        match self.algorithm {
            DigestAlgorithm::Sha256 => Self::sha256(bytes),
        }
    }

    /// Algorithm of this digest
    pub fn algorithm(&self) -> DigestAlgorithm {
        self.algorithm
    }

    /// Lowercase hex value
    pub fn hex(&self) -> &str {
        &self.hex
    }
}

impl FromStr for Digest {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        let (algorithm, hex) = match s.split_once(':') {
            Some((algo, hex)) if algo.eq_ignore_ascii_case("sha256") => {
                (DigestAlgorithm::Sha256, hex)
            }
            Some((algo, _)) => {
                return Err(Error::parse(
                    "digest",
                    format!("unsupported digest algorithm '{}'", algo),
                ))
            }
            None => (DigestAlgorithm::Sha256, s),
        };

        if hex.len() != algorithm.hex_len() || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(Error::parse(
                "digest",
                format!(
                    "expected {} hex characters for {}, got '{}'",
                    algorithm.hex_len(),
                    algorithm.prefix(),
                    hex
                ),
            ));
        }

        Ok(Self {
            algorithm,
            hex: hex.to_ascii_lowercase(),
        })
    }
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.algorithm.prefix(), self.hex)
    }
}
