//! Request plumbing shared by every endpoint.
//!
//! - [`ResourceNode`] / [`Resource`]: the resource tree and the generic
//!   `list_all` / `get` operations
//! - [`EndpointRequest`] / [`ApiRequest`]: URL, query and header assembly
//! - [`Transport`] / [`HttpTransport`]: the HTTP seam
//! - [`QueryParams`] / [`ParamValue`]: query string values
//! - [`PatCredential`]: basic auth with a personal access token

mod credential;
mod node;
mod params;
mod request;
mod transport;

pub(crate) use node::resource;

pub use credential::PatCredential;
pub use node::{DEFAULT_API_VERSION, ListResponse, Resource, ResourceNode};
pub use params::{ParamValue, QueryParams};
pub use request::{ACCEPT_JSON, ApiRequest, EndpointRequest, JSON_PATCH, decode, resource_url};
pub use transport::{HttpTransport, REQUEST_TIMEOUT, Transport};

#[cfg(test)]
pub(crate) use transport::mocks;
