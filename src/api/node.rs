//! The resource tree.
//!
//! Every endpoint value wraps a [`ResourceNode`]: the path segments that lead
//! to it, the api version it pins, and the shared configuration and transport.
//! Accessors such as `client.pipelines().pipeline_permissions()` are thin calls
//! to [`ResourceNode::child`], which copies the parent's segments, appends the
//! child's [`Resource::SEGMENT`] and wraps the new node. Nothing is cached and
//! nothing is mutated, so two reads of the same accessor give two equal but
//! independent values.

use std::fmt;
use std::fmt::Display;
use std::sync::Arc;

use reqwest::Method;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use url::Url;

use super::params::QueryParams;
use super::request::{EndpointRequest, decode, resource_url};
use super::transport::Transport;
use crate::config::ClientConfig;
use crate::error::ApiResult;

/// Api version used by families and endpoints that do not pin their own.
pub const DEFAULT_API_VERSION: &str = "7.2-preview.3";

/// Envelope returned by list calls.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ListResponse<T> {
    #[serde(default)]
    pub count: usize,
    pub value: Vec<T>,
}

/// A position in the API tree plus everything needed to call it.
#[derive(Clone)]
pub struct ResourceNode {
    segments: Vec<String>,
    api_version: String,
    config: Arc<ClientConfig>,
    transport: Arc<dyn Transport>,
}

impl ResourceNode {
    /// The root of a tree: no segments, default api version.
    pub fn root(config: Arc<ClientConfig>, transport: Arc<dyn Transport>) -> Self {
        Self {
            segments: Vec::new(),
            api_version: DEFAULT_API_VERSION.to_string(),
            config,
            transport,
        }
    }

    /// Derives the node for child resource `R` and wraps it.
    pub fn child<R: Resource>(&self) -> R {
        R::from_node(self.descend(R::SEGMENT, R::API_VERSION))
    }

    /// A new node one segment deeper. The parent is left untouched.
    pub fn descend(&self, segment: &str, api_version: &str) -> Self {
        let mut segments = Vec::with_capacity(self.segments.len() + 1);
        segments.extend(self.segments.iter().cloned());
        segments.push(segment.to_string());

        Self {
            segments,
            api_version: api_version.to_string(),
            config: Arc::clone(&self.config),
            transport: Arc::clone(&self.transport),
        }
    }

    /// A copy of this node pinned to another api version.
    pub fn with_api_version(&self, api_version: impl Into<String>) -> Self {
        Self {
            api_version: api_version.into(),
            ..self.clone()
        }
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn api_version(&self) -> &str {
        &self.api_version
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub(crate) fn transport(&self) -> &Arc<dyn Transport> {
        &self.transport
    }

    /// The node URL without query string.
    pub fn url(&self) -> ApiResult<Url> {
        resource_url(&self.config, &self.segments, &[] as &[&str])
    }

    /// Starts a request against this node.
    pub fn request(&self, method: Method) -> EndpointRequest<'_> {
        EndpointRequest::new(self, method)
    }

    /// One-shot form of [`ResourceNode::request`].
    ///
    /// `parts` are appended to the path, `headers` are applied after the
    /// default `Accept` header and win on conflict.
    pub async fn call(
        &self,
        method: Method,
        parts: &[&str],
        params: QueryParams,
        payload: Option<&Value>,
        headers: &[(&str, &str)],
    ) -> ApiResult<Value> {
        let mut request = self.request(method).query(params);
        for part in parts {
            request = request.part(part);
        }
        for (name, value) in headers {
            request = request.header(name, value);
        }
        if let Some(payload) = payload {
            request = request.json(payload);
        }
        request.send().await
    }

    /// GET the node URL and unwrap the `{count, value}` envelope.
    ///
    /// Only one page is fetched; continuation tokens are the caller's business.
    pub async fn list_all<T: DeserializeOwned>(&self, params: QueryParams) -> ApiResult<Vec<T>> {
        let value = self.request(Method::GET).query(params).send().await?;
        let list: ListResponse<T> = decode(value)?;
        Ok(list.value)
    }

    /// GET `<url>/<id>` and return the object as sent.
    pub async fn get<T: DeserializeOwned>(&self, id: impl Display) -> ApiResult<T> {
        self.request(Method::GET).part(id).send_as().await
    }
}

impl PartialEq for ResourceNode {
    fn eq(&self, other: &Self) -> bool {
        self.segments == other.segments
            && self.api_version == other.api_version
            && self.config == other.config
    }
}

impl fmt::Debug for ResourceNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResourceNode")
            .field("segments", &self.segments)
            .field("api_version", &self.api_version)
            .field("organization", &self.config.organization())
            .field("project", &self.config.project())
            .finish_non_exhaustive()
    }
}

/// A typed position in the API tree.
///
/// `SEGMENT` and `API_VERSION` can be inspected on the type without building
/// anything; values are only created through [`ResourceNode::child`].
pub trait Resource: Sized {
    /// Path segment appended below the parent.
    const SEGMENT: &'static str;
    /// Api version sent with requests issued from this resource.
    const API_VERSION: &'static str = DEFAULT_API_VERSION;

    fn from_node(node: ResourceNode) -> Self;

    fn node(&self) -> &ResourceNode;

    /// A copy of this resource that sends another api version.
    fn with_api_version(&self, api_version: impl Into<String>) -> Self {
        Self::from_node(self.node().with_api_version(api_version))
    }

    /// The resource URL without query string.
    fn url(&self) -> ApiResult<Url> {
        self.node().url()
    }
}

/// Declares a resource type wrapping a [`ResourceNode`].
///
/// ```ignore
/// resource! {
///     /// Definitions endpoint.
///     pub struct Definitions: "definitions", api_version = "7.2-preview.7";
/// }
/// ```
macro_rules! resource {
    (
        $(#[$meta:meta])*
        pub struct $name:ident: $segment:literal $(, api_version = $version:literal)?;
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq)]
        pub struct $name {
            node: $crate::api::ResourceNode,
        }

        impl $crate::api::Resource for $name {
            const SEGMENT: &'static str = $segment;
            $(const API_VERSION: &'static str = $version;)?

            fn from_node(node: $crate::api::ResourceNode) -> Self {
                Self { node }
            }

            fn node(&self) -> &$crate::api::ResourceNode {
                &self.node
            }
        }
    };
}

pub(crate) use resource;
