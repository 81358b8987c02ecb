//! Type definitions for extman

mod catalog;
mod digest;
mod platform;

pub use catalog::{Artifact, CatalogDocument, Extension, Release};
pub use digest::{Digest, DigestAlgorithm};
pub use platform::TargetPlatform;
