//! Request construction.
//!
//! [`EndpointRequest`] is the builder every endpoint operation goes through.
//! It resolves the node's path into a URL, appends `api-version`, merges
//! headers and hands a finished [`ApiRequest`] to the [`Transport`].
//!
//! [`Transport`]: super::Transport

use std::fmt::Display;

use reqwest::Method;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, trace};
use url::Url;

use super::node::ResourceNode;
use super::params::{ParamValue, QueryParams};
use crate::config::ClientConfig;
use crate::error::{ApiError, ApiResult};

/// Header sent with every request.
pub const ACCEPT_JSON: &str = "application/json";

/// Content type used for work item create/update bodies.
pub const JSON_PATCH: &str = "application/json-patch+json";

/// A fully resolved request, ready for a transport.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    pub url: Url,
    /// Header names are stored as given; lookups are case-insensitive.
    pub headers: Vec<(String, String)>,
    pub body: Option<Value>,
}

impl ApiRequest {
    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Decoded query pairs, in order.
    pub fn query_pairs(&self) -> Vec<(String, String)> {
        self.url
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect()
    }

    /// First value of query parameter `name`.
    pub fn query(&self, name: &str) -> Option<String> {
        self.url
            .query_pairs()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.into_owned())
    }
}

/// Builds `<base>/<organization>/<project>/_apis/<segments...>/<parts...>`.
pub fn resource_url<S, P>(config: &ClientConfig, segments: &[S], parts: &[P]) -> ApiResult<Url>
where
    S: AsRef<str>,
    P: AsRef<str>,
{
    let mut url = config.base_url().clone();
    {
        let mut path = url.path_segments_mut().map_err(|()| ApiError::InvalidUrl {
            url: config.base_url().to_string(),
            message: "base URL cannot carry a path".to_string(),
        })?;
        path.pop_if_empty()
            .push(config.organization())
            .push(config.project())
            .push("_apis");
        for segment in segments {
            path.push(segment.as_ref().trim_matches('/'));
        }
        for part in parts {
            path.push(part.as_ref().trim_matches('/'));
        }
    }
    Ok(url)
}

/// Builder for one call against a [`ResourceNode`].
///
/// Created with [`ResourceNode::request`].
#[must_use = "requests do nothing until `send` is awaited"]
pub struct EndpointRequest<'a> {
    node: &'a ResourceNode,
    method: Method,
    parts: Vec<String>,
    params: QueryParams,
    headers: Vec<(String, String)>,
    body: Option<Value>,
    error: Option<ApiError>,
}

impl<'a> EndpointRequest<'a> {
    pub(crate) fn new(node: &'a ResourceNode, method: Method) -> Self {
        Self {
            node,
            method,
            parts: Vec::new(),
            params: QueryParams::new(),
            headers: vec![("Accept".to_string(), ACCEPT_JSON.to_string())],
            body: None,
            error: None,
        }
    }

    /// Appends a path part after the node's own segments (usually an id).
    pub fn part(mut self, part: impl Display) -> Self {
        self.parts.push(part.to_string());
        self
    }

    /// Adds every parameter in `params`.
    pub fn query(mut self, params: QueryParams) -> Self {
        self.params.extend(params);
        self
    }

    /// Adds a single query parameter.
    pub fn param(mut self, name: &str, value: impl Into<ParamValue>) -> Self {
        self.params.insert(name, value);
        self
    }

    /// Adds or replaces a header. The default `Accept` header can be overridden.
    pub fn header(mut self, name: &str, value: &str) -> Self {
        match self
            .headers
            .iter_mut()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
        {
            Some(entry) => entry.1 = value.to_string(),
            None => self.headers.push((name.to_string(), value.to_string())),
        }
        self
    }

    /// Sets the JSON body.
    pub fn json<T: Serialize + ?Sized>(mut self, body: &T) -> Self {
        match serde_json::to_value(body) {
            Ok(value) => self.body = Some(value),
            Err(e) => {
                self.error = Some(ApiError::InvalidParameter {
                    name: "body".to_string(),
                    message: e.to_string(),
                })
            }
        }
        self
    }

    /// Resolves the request without sending it.
    pub fn build(self) -> ApiResult<ApiRequest> {
        if let Some(err) = self.error {
            return Err(err);
        }

        let mut url = resource_url(self.node.config(), self.node.segments(), &self.parts)?;

        let mut params = self.params;
        params.insert("api-version", self.node.api_version());
        url.query_pairs_mut().extend_pairs(params.to_pairs());

        Ok(ApiRequest {
            method: self.method,
            url,
            headers: self.headers,
            body: self.body,
        })
    }

    /// Sends the request and returns the decoded JSON body.
    pub async fn send(self) -> ApiResult<Value> {
        let transport = self.node.transport().clone();
        let request = self.build()?;

        debug!(method = %request.method, url = %request.url, "sending request");
        if let Some(body) = &request.body {
            trace!(bytes = body.to_string().len(), "request body");
        }

        transport.send(request).await
    }

    /// Sends the request and decodes the body into `T`.
    pub async fn send_as<T: DeserializeOwned>(self) -> ApiResult<T> {
        let value = self.send().await?;
        decode(value)
    }
}

/// Decodes a JSON value into `T`, reporting failures as shape errors.
pub fn decode<T: DeserializeOwned>(value: Value) -> ApiResult<T> {
    serde_json::from_value(value).map_err(|e| ApiError::shape(std::any::type_name::<T>(), e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::SecretString;

    fn config() -> ClientConfig {
        ClientConfig::new("contoso", "Fabrikam Fiber", SecretString::from("t".to_string()))
            .unwrap()
    }

    /// # URL Composition
    ///
    /// ## Test Scenario
    /// - Resolves segments and parts against the default host
    ///
    /// ## Expected Outcome
    /// - The URL follows `<host>/<org>/<project>/_apis/<segments>/<parts>`
    /// - Spaces are percent-encoded
    #[test]
    fn test_resource_url_shape() {
        let url = resource_url(&config(), &["build", "definitions"], &["42"]).unwrap();
        assert_eq!(
            url.as_str(),
            "https://dev.azure.com/contoso/Fabrikam%20Fiber/_apis/build/definitions/42"
        );
    }

    #[test]
    fn test_resource_url_keeps_base_path() {
        let config = config().with_base_url("https://tfs.example.com/tfs/").unwrap();
        let url = resource_url(&config, &["git", "repositories"], &[] as &[&str]).unwrap();
        assert_eq!(
            url.as_str(),
            "https://tfs.example.com/tfs/contoso/Fabrikam%20Fiber/_apis/git/repositories"
        );
    }

    #[test]
    fn test_resource_url_strips_stray_slashes() {
        let url = resource_url(&config(), &["/wit/"], &["/7/"]).unwrap();
        assert!(url.as_str().ends_with("/_apis/wit/7"));
    }

    #[test]
    fn test_request_header_lookup_is_case_insensitive() {
        let request = ApiRequest {
            method: Method::GET,
            url: Url::parse("https://example.com/?a=1&b=x%20y").unwrap(),
            headers: vec![("Content-Type".to_string(), JSON_PATCH.to_string())],
            body: None,
        };
        assert_eq!(request.header("content-type"), Some(JSON_PATCH));
        assert_eq!(request.query("b").as_deref(), Some("x y"));
        assert_eq!(request.query_pairs().len(), 2);
    }
}
