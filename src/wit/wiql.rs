//! Work Item Query Language.

use reqwest::Method;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::api::resource;
use crate::error::ApiResult;

resource! {
    /// `_apis/wit/wiql`
    pub struct Wiql: "wiql", api_version = "7.1";
}

/// Id and URL of a work item in a query result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkItemReference {
    pub id: i64,
    #[serde(default)]
    pub url: Option<String>,
}

/// A source/target pair in a link query result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkItemLink {
    #[serde(default)]
    pub rel: Option<String>,
    #[serde(default)]
    pub source: Option<WorkItemReference>,
    #[serde(default)]
    pub target: Option<WorkItemReference>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkItemFieldReference {
    pub reference_name: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
}

/// Result of a WIQL query. Flat queries fill `work_items`, link queries
/// fill `work_item_relations`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WiqlResult {
    #[serde(default)]
    pub query_type: Option<String>,
    #[serde(default)]
    pub query_result_type: Option<String>,
    #[serde(default)]
    pub as_of: Option<String>,
    #[serde(default)]
    pub columns: Vec<WorkItemFieldReference>,
    #[serde(default)]
    pub work_items: Vec<WorkItemReference>,
    #[serde(default)]
    pub work_item_relations: Vec<WorkItemLink>,
}

impl WiqlResult {
    /// Ids of the matched work items, in result order.
    pub fn ids(&self) -> Vec<i64> {
        self.work_items.iter().map(|w| w.id).collect()
    }
}

impl Wiql {
    /// Runs `query` and returns the matching references.
    pub async fn execute(&self, query: &str) -> ApiResult<WiqlResult> {
        self.node
            .request(Method::POST)
            .json(&json!({ "query": query }))
            .send_as()
            .await
    }
}
