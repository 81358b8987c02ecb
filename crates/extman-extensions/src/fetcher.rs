//! Remote catalog retrieval
//!
//! The catalog lives at `{distribution base}/{catalog filename}`. The
//! distribution base is per-account and resolved from the API origin with
//! the user's credential before every fetch.

use crate::http::HttpClient;
use crate::store::CatalogBootstrap;
use extman_core::utils::write_atomic;
use extman_core::{Error, ExtmanConfig, Result};
use serde::Deserialize;
use std::path::Path;
use tracing::{debug, info};
use url::Url;

/// Resolves the per-account distribution base URL
pub trait DistributionResolver {
    fn resolve_base_url(&self, api_key: &str) -> Result<String>;
}

#[derive(Debug, Deserialize)]
struct DistributionResponse {
    plugin_base_url: String,
}

/// Resolver asking the API origin over HTTP
pub struct HttpDistributionResolver {
    client: HttpClient,
    api_base_url: String,
    endpoint: String,
}

impl HttpDistributionResolver {
    pub fn new(
        client: HttpClient,
        api_base_url: impl Into<String>,
        endpoint: impl Into<String>,
    ) -> Self {
        Self {
            client,
            api_base_url: api_base_url.into(),
            endpoint: endpoint.into(),
        }
    }

    /// URL of the distribution endpoint
    pub fn endpoint_url(&self) -> String {
        join_url(&self.api_base_url, &self.endpoint)
    }
}

impl DistributionResolver for HttpDistributionResolver {
    fn resolve_base_url(&self, api_key: &str) -> Result<String> {
        let url = self.endpoint_url();
        let body = self.client.get_bytes(&url, Some(api_key))?;
        let response: DistributionResponse =
            serde_json::from_slice(&body).map_err(|e| Error::parse(url.clone(), e))?;

        debug!("Resolved distribution base URL {}", response.plugin_base_url);
        Ok(response.plugin_base_url)
    }
}

/// Fetches the catalog document from the distribution origin
pub struct RemoteCatalogFetcher {
    client: HttpClient,
    resolver: Box<dyn DistributionResolver>,
    credential: Option<String>,
    catalog_filename: String,
}

impl RemoteCatalogFetcher {
    pub fn new(
        client: HttpClient,
        resolver: Box<dyn DistributionResolver>,
        credential: Option<String>,
        catalog_filename: impl Into<String>,
    ) -> Self {
        Self {
            client,
            resolver,
            credential,
            catalog_filename: catalog_filename.into(),
        }
    }

    /// Fetcher resolving the distribution base from the configured API origin
    pub fn from_config(client: HttpClient, config: &ExtmanConfig) -> Self {
        let resolver = HttpDistributionResolver::new(
            client.clone(),
            config.api_base_url.clone(),
            config.distribution_endpoint.clone(),
        );
        Self::new(
            client,
            Box::new(resolver),
            config.api_key.clone(),
            config.catalog_filename.clone(),
        )
    }

    /// Resolve the absolute URL of the remote catalog document
    pub fn catalog_url(&self) -> Result<String> {
        let api_key = match self.credential.as_deref() {
            Some(key) if !key.trim().is_empty() => key,
            _ => {
                return Err(Error::auth(
                    "no API key configured; set EXTMAN_API_KEY or api_key in config.yaml",
                ))
            }
        };

        let base = self.resolver.resolve_base_url(api_key)?;
        let url = join_url(&base, &self.catalog_filename);
        Url::parse(&url).map_err(|e| Error::parse(format!("catalog URL '{}'", url), e))?;
        Ok(url)
    }

    /// Download the raw catalog document
    ///
    /// A single attempt; retrying is left to the caller.
    pub fn fetch(&self) -> Result<Vec<u8>> {
        let url = self.catalog_url()?;
        info!("Fetching extension catalog from {}", url);
        self.client.get_bytes(&url, None)
    }

    /// Download the catalog and write the body verbatim to `destination`
    pub fn fetch_to(&self, destination: &Path) -> Result<()> {
        let body = self.fetch()?;
        write_atomic(destination, &body)?;
        info!(
            "Wrote {} byte catalog to {}",
            body.len(),
            destination.display()
        );
        Ok(())
    }
}

impl CatalogBootstrap for RemoteCatalogFetcher {
    fn bootstrap(&self, destination: &Path) -> Result<()> {
        self.fetch_to(destination)
    }
}

fn join_url(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}
