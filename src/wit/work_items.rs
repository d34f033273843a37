//! Work items.

use reqwest::Method;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

use super::patch::{ItemType, WorkItemParams};
use crate::api::{JSON_PATCH, Resource, resource};
use crate::error::ApiResult;

resource! {
    /// `_apis/wit/workitems`
    pub struct WorkItems: "workitems";
}

/// A work item as returned by create, update and get.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkItemResponse {
    pub id: i64,
    pub rev: i64,
    /// Field reference name to value, e.g. `System.Title`.
    #[serde(default)]
    pub fields: Map<String, Value>,
    pub url: String,
}

impl WorkItemResponse {
    /// A field as a string, if present and textual.
    pub fn field_str(&self, name: &str) -> Option<&str> {
        self.fields.get(name).and_then(Value::as_str)
    }
}

impl WorkItems {
    /// Creates a work item of `item_type`.
    pub async fn create(
        &self,
        item_type: ItemType,
        params: &WorkItemParams,
    ) -> ApiResult<WorkItemResponse> {
        self.write(Method::POST, format!("${item_type}"), params)
            .await
    }

    /// Updates work item `id`. Only the fields set in `params` are touched.
    pub async fn update(&self, id: i64, params: &WorkItemParams) -> ApiResult<WorkItemResponse> {
        self.write(Method::PATCH, id.to_string(), params).await
    }

    pub async fn get(&self, id: i64) -> ApiResult<WorkItemResponse> {
        self.node.get(id).await
    }

    async fn write(
        &self,
        method: Method,
        target: String,
        params: &WorkItemParams,
    ) -> ApiResult<WorkItemResponse> {
        let ops = params.to_patch_document(&self.url()?);
        debug!(%method, %target, operations = ops.len(), "writing work item");

        let mut request = self
            .node
            .request(method)
            .part(target)
            .header("Content-Type", JSON_PATCH)
            .query(params.query_flags());
        if !ops.is_empty() {
            request = request.json(&ops);
        }
        request.send_as().await
    }
}
