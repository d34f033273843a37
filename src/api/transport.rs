//! The HTTP seam.
//!
//! Endpoints never talk to `reqwest` directly; they hand an [`ApiRequest`] to
//! a [`Transport`]. This enables:
//! - Mocking for unit tests
//! - Alternative HTTP stacks (proxies, recording, custom TLS)

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, HeaderMap};
use serde_json::Value;
use tracing::debug;

use super::credential::PatCredential;
use super::request::ApiRequest;
use crate::error::{ApiError, ApiResult};

/// Fixed per-request timeout.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Sends one request and returns the decoded JSON body.
///
/// Implementations must not retry. Non-success statuses are reported as
/// [`ApiError::RequestFailed`] with the raw body, an empty body decodes to
/// `Value::Null`.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: ApiRequest) -> ApiResult<Value>;
}

/// `reqwest`-backed transport with basic auth and a 60 second timeout.
#[derive(Clone, Debug)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    /// Creates a transport that authenticates every request with `credential`.
    pub fn new(credential: &PatCredential) -> ApiResult<Self> {
        let client = reqwest::Client::builder()
            .default_headers({
                let mut headers = HeaderMap::new();
                headers.insert(AUTHORIZATION, credential.authorization_header()?);
                headers
            })
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: ApiRequest) -> ApiResult<Value> {
        let ApiRequest {
            method,
            url,
            headers,
            body,
        } = request;

        let mut builder = self.client.request(method.clone(), url.clone());
        for (name, value) in &headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        // `json` keeps an explicit Content-Type such as json-patch
        if let Some(body) = &body {
            builder = builder.json(body);
        }

        let response = builder.send().await?;
        let status = response.status();
        debug!(%method, %url, status = status.as_u16(), "received response");

        let bytes = response.bytes().await?;
        if !status.is_success() {
            return Err(ApiError::RequestFailed {
                status: status.as_u16(),
                message: String::from_utf8_lossy(&bytes).into_owned(),
            });
        }

        parse_body(&bytes)
    }
}

/// Decodes a response body; empty bodies become `Value::Null`.
pub(crate) fn parse_body(bytes: &[u8]) -> ApiResult<Value> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Null);
    }
    serde_json::from_slice(bytes).map_err(|e| ApiError::ParseError {
        message: e.to_string(),
    })
}
