//! Remote catalog fetch and bootstrap tests

mod common;

use common::*;
use extman_core::Error;
use extman_extensions::{
    CatalogStore, DistributionResolver, ExtensionManager, HttpClient, HttpDistributionResolver,
    RemoteCatalogFetcher,
};
use wiremock::MockServer;

const REMOTE_CATALOG: &str = r#"
[[extension]]
name = "hello"
description = "Says hello"

[[extension.release]]
version = "1.0.0"

[[extension.release.artifact]]
os = "linux"
arch = "x86_64"
sum = "sha256:dffd6021bb2bd5b0af676290809ec3a53191dd81c7f70a4b28688a362182986f"
"#;

#[tokio::test]
async fn test_resolver_reads_plugin_base_url() {
    let server = MockServer::start().await;
    mock_distribution_endpoint(&server).await;
    let api = api_base_url(&server);
    let expected = distribution_base_url(&server);

    let base = tokio::task::spawn_blocking(move || {
        let client = HttpClient::new("extman-tests").unwrap();
        HttpDistributionResolver::new(client, api, DISTRIBUTION_ENDPOINT)
            .resolve_base_url(TEST_API_KEY)
    })
    .await
    .unwrap()
    .unwrap();

    assert_eq!(base, expected);
}

#[tokio::test]
async fn test_rejected_credential_is_auth_error() {
    let server = MockServer::start().await;
    mock_distribution_unauthorized(&server).await;
    let env = TestEnv::new();
    let config = env.config(&api_base_url(&server));

    let err = tokio::task::spawn_blocking(move || {
        let client = HttpClient::new("extman-tests").unwrap();
        RemoteCatalogFetcher::from_config(client, &config).fetch()
    })
    .await
    .unwrap()
    .unwrap_err();

    assert!(matches!(err, Error::Auth { .. }), "{err}");
    assert!(!err.is_retryable());
}

#[tokio::test]
async fn test_fetch_writes_body_verbatim() {
    let server = MockServer::start().await;
    mock_distribution_endpoint(&server).await;
    mock_remote_catalog(&server, REMOTE_CATALOG, 1).await;
    let env = TestEnv::new();
    let config = env.config(&api_base_url(&server));
    let destination = env.catalog_path();

    tokio::task::spawn_blocking(move || {
        let client = HttpClient::new("extman-tests").unwrap();
        RemoteCatalogFetcher::from_config(client, &config).fetch_to(&destination)
    })
    .await
    .unwrap()
    .unwrap();

    assert_eq!(
        std::fs::read_to_string(env.catalog_path()).unwrap(),
        REMOTE_CATALOG
    );
}

#[tokio::test]
async fn test_missing_remote_catalog_is_network_error() {
    let server = MockServer::start().await;
    mock_distribution_endpoint(&server).await;
    mock_status(&server, &format!("{}/{}", DIST_PREFIX, CATALOG_FILENAME), 503).await;
    let env = TestEnv::new();
    let config = env.config(&api_base_url(&server));
    let destination = env.catalog_path();

    let err = tokio::task::spawn_blocking(move || {
        let client = HttpClient::new("extman-tests").unwrap();
        RemoteCatalogFetcher::from_config(client, &config).fetch_to(&destination)
    })
    .await
    .unwrap()
    .unwrap_err();

    assert!(matches!(err, Error::Network { .. }), "{err}");
    assert!(!env.catalog_path().exists());
}

#[tokio::test]
async fn test_bootstrap_on_first_load() {
    // Local catalog absent -> fetched from the origin under /v1 -> later loads stay local
    let server = MockServer::start().await;
    mock_distribution_endpoint(&server).await;
    mock_remote_catalog(&server, REMOTE_CATALOG, 1).await;
    let env = TestEnv::new();
    let config = env.config(&api_base_url(&server));
    assert!(!env.catalog_path().exists());

    let (first, second) = tokio::task::spawn_blocking(move || {
        let client = HttpClient::new("extman-tests").unwrap();
        let fetcher = RemoteCatalogFetcher::from_config(client, &config);
        let store = CatalogStore::new(config.catalog_path.clone()).with_bootstrap(Box::new(fetcher));
        (store.load().unwrap(), store.load().unwrap())
    })
    .await
    .unwrap();

    assert!(env.catalog_path().exists());
    assert_eq!(first, second);
    let hello = first.find_by_name(HELLO).unwrap();
    assert_eq!(hello.description.as_deref(), Some("Says hello"));
    assert_eq!(hello.releases[0].version, HELLO_VERSION);
}

#[tokio::test]
async fn test_bootstrap_without_credential_is_auth_error() {
    let env = TestEnv::new();
    let config = env.offline_config();

    let err = tokio::task::spawn_blocking(move || {
        ExtensionManager::new(config).unwrap().catalog()
    })
    .await
    .unwrap()
    .unwrap_err();

    assert!(matches!(err, Error::Auth { .. }), "{err}");
}

#[tokio::test]
async fn test_refresh_replaces_local_catalog() {
    let server = MockServer::start().await;
    mock_distribution_endpoint(&server).await;
    mock_remote_catalog(&server, REMOTE_CATALOG, 1).await;
    let env = TestEnv::new();
    std::fs::create_dir_all(env.config_dir()).unwrap();
    std::fs::write(env.catalog_path(), "").unwrap();
    let config = env.config(&api_base_url(&server));

    let refreshed = tokio::task::spawn_blocking(move || {
        ExtensionManager::new(config).unwrap().refresh_catalog()
    })
    .await
    .unwrap()
    .unwrap();

    assert_eq!(refreshed.len(), 1);
    assert_eq!(
        std::fs::read_to_string(env.catalog_path()).unwrap(),
        REMOTE_CATALOG
    );
}

#[tokio::test]
async fn test_refresh_with_invalid_remote_keeps_local() {
    let server = MockServer::start().await;
    mock_distribution_endpoint(&server).await;
    mock_remote_catalog(&server, "[[extension]\nname=", 1).await;
    let env = TestEnv::new();
    std::fs::create_dir_all(env.config_dir()).unwrap();
    std::fs::write(env.catalog_path(), REMOTE_CATALOG).unwrap();
    let config = env.config(&api_base_url(&server));

    let err = tokio::task::spawn_blocking(move || {
        ExtensionManager::new(config).unwrap().refresh_catalog()
    })
    .await
    .unwrap()
    .unwrap_err();

    assert!(matches!(err, Error::Parse { .. }), "{err}");
    assert_eq!(
        std::fs::read_to_string(env.catalog_path()).unwrap(),
        REMOTE_CATALOG
    );
}
