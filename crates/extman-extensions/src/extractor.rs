//! Distribution archive extraction
//!
//! An extension archive is a gzip-compressed tar stream carrying a catalog
//! fragment (exactly one extension with exactly one release) and the raw
//! extension binary. Entries are read one at a time from the stream, so a
//! download is never buffered whole.
//!
//! Only regular files and directories are accepted. Symlinks, hard links,
//! devices and every other entry type abort extraction: archives are
//! untrusted input and nothing outside the two payloads is ever wanted.

use crate::http::HttpClient;
use extman_core::types::{CatalogDocument, Extension, Release};
use extman_core::{Error, ExtmanConfig, Result};
use flate2::read::GzDecoder;
use std::cell::Cell;
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;
use tar::{Archive, Entry, EntryType};
use tracing::{debug, info};

/// Largest catalog fragment accepted from an archive
pub const MAX_FRAGMENT_BYTES: u64 = 1024 * 1024;

/// Largest binary payload accepted from an archive
pub const MAX_BINARY_BYTES: u64 = 512 * 1024 * 1024;

/// Payloads recovered from a distribution archive
#[derive(Debug, Clone)]
pub struct ExtractedArchive {
    extension: Extension,
    binary: Vec<u8>,
}

impl ExtractedArchive {
    /// The fragment's extension, holding exactly one release
    pub fn extension(&self) -> &Extension {
        &self.extension
    }

    /// The fragment's single release
    pub fn release(&self) -> &Release {
        // Guaranteed non-empty by ArchiveExtractor::finish
        &self.extension.releases[0]
    }

    /// Raw binary payload
    pub fn binary(&self) -> &[u8] {
        &self.binary
    }

    pub fn into_parts(self) -> (Extension, Vec<u8>) {
        (self.extension, self.binary)
    }
}

/// Streams and validates extension archives
#[derive(Debug, Clone)]
pub struct ArchiveExtractor {
    fragment_filename: String,
    binary_prefix: String,
}

impl ArchiveExtractor {
    /// Create an extractor
    ///
    /// `fragment_filename` must match an entry name exactly; any regular
    /// file whose name contains `binary_prefix` is the binary payload.
    pub fn new(fragment_filename: impl Into<String>, binary_prefix: impl Into<String>) -> Self {
        Self {
            fragment_filename: fragment_filename.into(),
            binary_prefix: binary_prefix.into(),
        }
    }

    pub fn from_config(config: &ExtmanConfig) -> Self {
        Self::new(
            config.fragment_filename.clone(),
            config.binary_prefix.clone(),
        )
    }

    /// Extract from a local `.tar.gz` file
    pub fn extract_file(&self, path: &Path) -> Result<ExtractedArchive> {
        info!("Extracting extension archive {}", path.display());
        let file = File::open(path)?;
        self.extract(file)
    }

    /// Extract from an archive streamed over HTTP
    pub fn extract_url(&self, client: &HttpClient, url: &str) -> Result<ExtractedArchive> {
        info!("Downloading extension archive {}", url);
        let response = client.get(url, None)?;
        self.extract_with(response, |e| Error::network(url, e))
    }

    /// Extract from any gzip-compressed tar stream
    ///
    /// Read failures of `reader` itself are reported as `Io`; everything
    /// wrong with the bytes it yields is `MalformedArchive`.
    pub fn extract<R: Read>(&self, reader: R) -> Result<ExtractedArchive> {
        self.extract_with(reader, Error::Io)
    }

    fn extract_with<R, F>(&self, reader: R, source_error: F) -> Result<ExtractedArchive>
    where
        R: Read,
        F: FnOnce(io::Error) -> Error,
    {
        let failure = Cell::new(None);
        let result = self.scan(SourceReader {
            inner: reader,
            failure: &failure,
        });
        match failure.take() {
            Some(e) => Err(source_error(e)),
            None => result,
        }
    }

    fn scan<R: Read>(&self, reader: R) -> Result<ExtractedArchive> {
        let mut archive = Archive::new(GzDecoder::new(reader));

        let mut fragment: Option<CatalogDocument> = None;
        let mut binary: Option<Vec<u8>> = None;

        let entries = archive
            .entries()
            .map_err(|e| Error::malformed_archive(format!("unreadable archive: {}", e)))?;

        for entry in entries {
            let mut entry = entry
                .map_err(|e| Error::malformed_archive(format!("unreadable entry: {}", e)))?;
            let name = String::from_utf8_lossy(&entry.path_bytes()).into_owned();
            let entry_type = entry.header().entry_type();

            match entry_type {
                EntryType::Directory => {
                    debug!("Skipping directory {}", name);
                }
                EntryType::Regular => {
                    if name == self.fragment_filename {
                        if fragment.is_some() {
                            return Err(Error::malformed_archive(format!(
                                "more than one {} entry",
                                self.fragment_filename
                            )));
                        }
                        let bytes = read_entry(&mut entry, &name, MAX_FRAGMENT_BYTES)?;
                        let content = String::from_utf8(bytes).map_err(|e| {
                            Error::malformed_archive(format!("{} is not UTF-8: {}", name, e))
                        })?;
                        let doc = CatalogDocument::from_toml_str(&content).map_err(|e| {
                            Error::malformed_archive(format!("invalid {}: {}", name, e))
                        })?;
                        debug!("Captured catalog fragment {}", name);
                        fragment = Some(doc);
                    } else if name.contains(&self.binary_prefix) {
                        if binary.is_some() {
                            return Err(Error::malformed_archive(format!(
                                "more than one entry named like {}",
                                self.binary_prefix
                            )));
                        }
                        let bytes = read_entry(&mut entry, &name, MAX_BINARY_BYTES)?;
                        debug!("Captured binary {} ({} bytes)", name, bytes.len());
                        binary = Some(bytes);
                    } else {
                        debug!("Ignoring {}", name);
                    }
                }
                other => {
                    return Err(Error::unsupported_entry_type(name, describe(other)));
                }
            }
        }

        self.finish(fragment, binary)
    }

    fn finish(
        &self,
        fragment: Option<CatalogDocument>,
        binary: Option<Vec<u8>>,
    ) -> Result<ExtractedArchive> {
        let fragment = fragment.ok_or_else(|| {
            Error::malformed_archive(format!("missing {}", self.fragment_filename))
        })?;

        let binary = match binary {
            Some(bytes) if !bytes.is_empty() => bytes,
            Some(_) => return Err(Error::malformed_archive("binary payload is empty")),
            None => {
                return Err(Error::malformed_archive(format!(
                    "missing binary entry named like {}",
                    self.binary_prefix
                )))
            }
        };

        let mut extensions = fragment.extensions;
        if extensions.len() != 1 {
            return Err(Error::malformed_archive(format!(
                "{} must describe exactly one extension, found {}",
                self.fragment_filename,
                extensions.len()
            )));
        }
        let extension = extensions.remove(0);
        if extension.releases.len() != 1 {
            return Err(Error::malformed_archive(format!(
                "{} must describe exactly one release of {}, found {}",
                self.fragment_filename,
                extension.name,
                extension.releases.len()
            )));
        }

        validate_component("extension name", &extension.name)?;
        validate_component("release version", &extension.releases[0].version)?;

        info!(
            "Extracted {} {} ({} byte binary)",
            extension.name,
            extension.releases[0].version,
            binary.len()
        );
        Ok(ExtractedArchive { extension, binary })
    }
}

/// Read a whole entry whose header size is at most `limit`
///
/// The header size is untrusted: it bounds the read but never sizes an
/// allocation, and a stream that ends early is a truncated entry.
fn read_entry<R: Read>(entry: &mut Entry<'_, R>, name: &str, limit: u64) -> Result<Vec<u8>> {
    let declared = entry.size();
    if declared > limit {
        return Err(Error::malformed_archive(format!(
            "entry {} declares {} bytes, limit is {}",
            name, declared, limit
        )));
    }

    let mut bytes = Vec::new();
    entry
        .by_ref()
        .take(declared)
        .read_to_end(&mut bytes)
        .map_err(|e| Error::malformed_archive(format!("unreadable entry {}: {}", name, e)))?;

    if (bytes.len() as u64) < declared {
        return Err(Error::malformed_archive(format!(
            "truncated entry {}: {} of {} bytes",
            name,
            bytes.len(),
            declared
        )));
    }
    Ok(bytes)
}

/// Remembers the first read failure of the underlying stream
struct SourceReader<'a, R> {
    inner: R,
    failure: &'a Cell<Option<io::Error>>,
}

impl<R: Read> Read for SourceReader<'_, R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self.inner.read(buf) {
            Err(e) if e.kind() != io::ErrorKind::Interrupted => {
                let surfaced = io::Error::new(e.kind(), e.to_string());
                let first = self.failure.take().unwrap_or(e);
                self.failure.set(Some(first));
                Err(surfaced)
            }
            other => other,
        }
    }
}

/// Whether `value` can be used as exactly one path component
pub(crate) fn is_path_component(value: &str) -> bool {
    !(value.is_empty()
        || value == "."
        || value == ".."
        || value.contains(['/', '\\', '\0']))
}

fn validate_component(what: &str, value: &str) -> Result<()> {
    if !is_path_component(value) {
        return Err(Error::malformed_archive(format!(
            "{} '{}' is not a valid path component",
            what, value
        )));
    }
    Ok(())
}

fn describe(entry_type: EntryType) -> String {
    let label = match entry_type {
        EntryType::Symlink => "symlink",
        EntryType::Link => "hard link",
        EntryType::Char => "character device",
        EntryType::Block => "block device",
        EntryType::Fifo => "fifo",
        EntryType::Continuous => "contiguous file",
        EntryType::XGlobalHeader => "pax global header",
        EntryType::GNUSparse => "sparse file",
        _ => "unknown",
    };
    format!("{} ('{}')", label, entry_type.as_byte() as char)
}
