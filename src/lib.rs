//! # ado-rest
//!
//! A typed client for the Azure DevOps REST API.
//!
//! The API is exposed as a tree that mirrors the URL layout: the [`Client`]
//! hands out API families (`build`, `git`, `pipelines`, `distributed_task`,
//! `wit`), families hand out endpoints, and endpoints carry the operations.
//! Every step is a cheap value carrying the path so far, the api version and
//! the shared configuration.
//!
//! - Build definitions: list and get
//! - Git repositories: list and get
//! - Variable groups: list and get
//! - Pipeline permissions on variable groups: read and grant
//! - Work items: create, update and get through JSON Patch documents
//! - WIQL queries
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use ado_rest::{Client, ClientConfig};
//! use ado_rest::wit::{ItemType, WorkItemParams, WorkItemState};
//! use secrecy::SecretString;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ClientConfig::new(
//!     "my-org",
//!     "my-project",
//!     SecretString::from("my-pat".to_string()),
//! )?;
//! let client = Client::new(config)?;
//!
//! let params = WorkItemParams {
//!     title: Some("Investigate flaky deploy".to_string()),
//!     state: Some(WorkItemState::New),
//!     tags: Some(vec!["ops".to_string()]),
//!     ..WorkItemParams::default()
//! };
//! let item = client.wit().work_items().create(ItemType::Task, &params).await?;
//! println!("Created work item {}", item.id);
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod build;
pub mod cli;
pub mod client;
pub mod config;
pub mod distributed_task;
pub mod error;
pub mod git;
pub mod logging;
pub mod models;
pub mod parsed_property;
pub mod pipelines;
pub mod wit;

pub use api::{Resource, ResourceNode, Transport};
pub use client::Client;
pub use config::{ClientConfig, Config};
pub use error::{AdoError, AdoResult, ApiError, ApiResult, ConfigError};

/// Library version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
