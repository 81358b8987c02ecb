//! Traced HTTP GET for catalog, distribution, and archive downloads
//!
//! Every request runs inside an `http_get` span and logs connection timing,
//! status, and size at debug level. No request timeout is applied here:
//! callers needing bounded latency wrap the call with their own deadline.

use extman_core::{Error, Result};
use reqwest::blocking::{Client, Response};
use reqwest::header::{AUTHORIZATION, CONTENT_LENGTH};
use reqwest::StatusCode;
use std::time::Instant;
use tracing::{debug, info_span};

/// Blocking HTTP client shared by the pipeline stages
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
}

impl HttpClient {
    /// Create a client sending `user_agent`
    pub fn new(user_agent: &str) -> Result<Self> {
        let client = Client::builder()
            .user_agent(user_agent)
            .timeout(None)
            .build()
            .map_err(|e| Error::network("<client>", e))?;
        Ok(Self { client })
    }

    /// Perform a GET, failing on transport errors and non-success statuses
    ///
    /// A bearer credential, when given, is sent but never logged. 401 and 403
    /// responses map to an auth error.
    pub fn get(&self, url: &str, bearer: Option<&str>) -> Result<Response> {
        let span = info_span!("http_get", url = %url);
        let _enter = span.enter();

        let mut request = self.client.get(url);
        if let Some(token) = bearer {
            request = request.header(AUTHORIZATION, format!("Bearer {}", token));
        }

        let started = Instant::now();
        let response = request.send().map_err(|e| Error::network(url, e))?;
        let status = response.status();

        debug!(
            status = status.as_u16(),
            content_length = response
                .headers()
                .get(CONTENT_LENGTH)
                .and_then(|v| v.to_str().ok())
                .unwrap_or("unknown"),
            remote_addr = ?response.remote_addr(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "response headers received"
        );

        match status {
            s if s.is_success() => Ok(response),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(Error::auth(format!(
                "{} rejected the credential (HTTP {})",
                url, status
            ))),
            _ => Err(Error::network(url, format!("HTTP {}", status))),
        }
    }

    /// GET `url` and read the whole body
    pub fn get_bytes(&self, url: &str, bearer: Option<&str>) -> Result<Vec<u8>> {
        let started = Instant::now();
        let response = self.get(url, bearer)?;
        let body = response.bytes().map_err(|e| Error::network(url, e))?;
        debug!(
            url = %url,
            bytes = body.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "body received"
        );
        Ok(body.to_vec())
    }
}
