//! Archive extraction tests

mod common;

use common::*;
use extman_core::Error;
use extman_extensions::{ArchiveExtractor, HttpClient};
use wiremock::MockServer;

fn extractor() -> ArchiveExtractor {
    ArchiveExtractor::new(FRAGMENT_FILENAME, BINARY_PREFIX)
}

#[test]
fn test_well_formed_archive_from_file() {
    let env = TestEnv::new();
    let path = env.write_archive("pkg.tar.gz", &ArchiveBuilder::hello().dir("docs").build());

    let extracted = extractor().extract_file(&path).unwrap();

    assert_eq!(extracted.extension().name, HELLO);
    assert_eq!(extracted.extension().releases.len(), 1);
    assert_eq!(extracted.release().version, HELLO_VERSION);
    assert_eq!(extracted.binary(), HELLO_BINARY);
}

#[test]
fn test_unrelated_files_are_ignored() {
    let bytes = ArchiveBuilder::hello()
        .file("LICENSE", "MIT")
        .file("docs/usage.md", "# Usage")
        .build();

    let extracted = extractor().extract(bytes.as_slice()).unwrap();
    assert_eq!(extracted.binary(), HELLO_BINARY);
}

#[test]
fn test_missing_fragment_is_malformed() {
    let bytes = ArchiveBuilder::new()
        .file(&binary_entry(HELLO), HELLO_BINARY)
        .build();

    let err = extractor().extract(bytes.as_slice()).unwrap_err();
    assert!(matches!(err, Error::MalformedArchive { .. }), "{err}");
}

#[test]
fn test_missing_binary_is_malformed() {
    let bytes = ArchiveBuilder::new()
        .file(FRAGMENT_FILENAME, fragment_toml(HELLO, HELLO_VERSION, HELLO_SHA256))
        .build();

    let err = extractor().extract(bytes.as_slice()).unwrap_err();
    assert!(matches!(err, Error::MalformedArchive { .. }), "{err}");
}

#[test]
fn test_fragment_with_two_extensions_is_malformed() {
    let two = catalog(vec![
        extension("hello", &[release("1.0.0", HELLO_SHA256)]),
        extension("other", &[release("1.0.0", HELLO_SHA256)]),
    ]);
    let bytes = ArchiveBuilder::new()
        .file(FRAGMENT_FILENAME, two.to_toml_string().unwrap())
        .file(&binary_entry(HELLO), HELLO_BINARY)
        .build();

    let err = extractor().extract(bytes.as_slice()).unwrap_err();
    assert!(err.to_string().contains("exactly one extension"), "{err}");
}

#[test]
fn test_unparseable_fragment_is_malformed() {
    let bytes = ArchiveBuilder::new()
        .file(FRAGMENT_FILENAME, "[[extension]\nname = ")
        .file(&binary_entry(HELLO), HELLO_BINARY)
        .build();

    let err = extractor().extract(bytes.as_slice()).unwrap_err();
    assert!(matches!(err, Error::MalformedArchive { .. }), "{err}");
}

#[test]
fn test_duplicate_binary_is_malformed() {
    let bytes = ArchiveBuilder::hello()
        .file("bin/stripe-cli-hello", HELLO_BINARY)
        .build();

    let err = extractor().extract(bytes.as_slice()).unwrap_err();
    assert!(matches!(err, Error::MalformedArchive { .. }), "{err}");
}

#[test]
fn test_symlink_is_rejected() {
    let bytes = ArchiveBuilder::hello().symlink("latest", "stripe-cli-hello").build();

    match extractor().extract(bytes.as_slice()).unwrap_err() {
        Error::UnsupportedEntryType { name, entry_type } => {
            assert_eq!(name, "latest");
            assert!(entry_type.starts_with("symlink"));
        }
        other => panic!("expected UnsupportedEntryType, got {other}"),
    }
}

#[test]
fn test_symlink_before_payloads_is_rejected() {
    let bytes = ArchiveBuilder::new()
        .symlink("stripe-cli-hello", "sh")
        .file(FRAGMENT_FILENAME, fragment_toml(HELLO, HELLO_VERSION, HELLO_SHA256))
        .build();

    let err = extractor().extract(bytes.as_slice()).unwrap_err();
    assert!(matches!(err, Error::UnsupportedEntryType { .. }), "{err}");
}

#[test]
fn test_hard_link_is_rejected() {
    let bytes = ArchiveBuilder::hello().hard_link("copy", "stripe-cli-hello").build();

    match extractor().extract(bytes.as_slice()).unwrap_err() {
        Error::UnsupportedEntryType { entry_type, .. } => {
            assert_eq!(entry_type, "hard link ('1')");
        }
        other => panic!("expected UnsupportedEntryType, got {other}"),
    }
}

#[test]
fn test_traversal_in_extension_name_is_malformed() {
    let bytes = ArchiveBuilder::new()
        .file(FRAGMENT_FILENAME, fragment_toml("..", HELLO_VERSION, HELLO_SHA256))
        .file(&binary_entry(HELLO), HELLO_BINARY)
        .build();

    let err = extractor().extract(bytes.as_slice()).unwrap_err();
    assert!(matches!(err, Error::MalformedArchive { .. }), "{err}");
}

#[tokio::test]
async fn test_extract_streamed_over_http() {
    let server = MockServer::start().await;
    mock_bytes(&server, "/archives/pkg.tar.gz", &ArchiveBuilder::hello().build()).await;
    let url = format!("{}/archives/pkg.tar.gz", server.uri());

    let extracted = tokio::task::spawn_blocking(move || {
        let client = HttpClient::new("extman-tests").unwrap();
        extractor().extract_url(&client, &url)
    })
    .await
    .unwrap()
    .unwrap();

    assert_eq!(extracted.extension().name, HELLO);
    assert_eq!(extracted.binary(), HELLO_BINARY);
}

#[tokio::test]
async fn test_extract_url_not_found_is_network_error() {
    let server = MockServer::start().await;
    mock_status(&server, "/archives/missing.tar.gz", 404).await;
    let url = format!("{}/archives/missing.tar.gz", server.uri());

    let err = tokio::task::spawn_blocking(move || {
        let client = HttpClient::new("extman-tests").unwrap();
        extractor().extract_url(&client, &url)
    })
    .await
    .unwrap()
    .unwrap_err();

    assert!(matches!(err, Error::Network { .. }), "{err}");
    assert!(err.is_retryable());
}
