//! Pipeline permissions on protected resources.
//!
//! Only variable groups are covered. Granting is additive: the current list is
//! read first and every entry that was not asked about is sent back unchanged.

use std::collections::HashSet;

use reqwest::Method;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, info};

use crate::api::resource;
use crate::error::ApiResult;
use crate::models::{AuthorizedByInfo, ResourceRef};

resource! {
    /// `_apis/pipelines/pipelinePermissions`
    pub struct PipelinePermissions: "pipelinePermissions";
}

resource! {
    /// `_apis/pipelines/pipelinePermissions/variablegroup`
    pub struct VariableGroupPermissions: "variablegroup", api_version = "7.1-preview.1";
}

impl PipelinePermissions {
    pub fn variable_groups(&self) -> VariableGroupPermissions {
        self.node.child()
    }
}

/// One pipeline entry as sent in a PATCH.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariableGroupPermissionPatch {
    pub authorized: bool,
    pub id: i64,
}

/// One pipeline entry as returned by the service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VariableGroupPermissionInfo {
    pub authorized: bool,
    pub id: i64,
    #[serde(default)]
    pub authorized_by: Option<AuthorizedByInfo>,
    #[serde(default)]
    pub authorized_on: Option<String>,
}

/// The "open access" switch that covers every pipeline at once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AllPipelinesPermission {
    pub authorized: bool,
    #[serde(default)]
    pub authorized_by: Option<AuthorizedByInfo>,
    #[serde(default)]
    pub authorized_on: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VariableGroupPermissionResponse {
    #[serde(default)]
    pub all_pipelines: Option<AllPipelinesPermission>,
    #[serde(default)]
    pub pipelines: Vec<VariableGroupPermissionInfo>,
    pub resource: ResourceRef,
}

/// Builds the pipeline list for a grant.
///
/// Requested ids come first, authorized, in the order given and without
/// duplicates. Existing entries for other pipelines follow with their
/// `authorized` flag untouched.
pub fn merge_grants(
    pipeline_ids: &[i64],
    existing: &[VariableGroupPermissionInfo],
) -> Vec<VariableGroupPermissionPatch> {
    let mut seen = HashSet::new();
    let mut merged = Vec::with_capacity(pipeline_ids.len() + existing.len());

    for &id in pipeline_ids {
        if seen.insert(id) {
            merged.push(VariableGroupPermissionPatch {
                authorized: true,
                id,
            });
        }
    }
    for entry in existing {
        if seen.insert(entry.id) {
            merged.push(VariableGroupPermissionPatch {
                authorized: entry.authorized,
                id: entry.id,
            });
        }
    }

    merged
}

impl VariableGroupPermissions {
    /// Lists the pipelines with a permission entry on `group_id`.
    pub async fn get(&self, group_id: i64) -> ApiResult<Vec<VariableGroupPermissionInfo>> {
        Ok(self.get_response(group_id).await?.pipelines)
    }

    /// Full permission record for `group_id`.
    pub async fn get_response(&self, group_id: i64) -> ApiResult<VariableGroupPermissionResponse> {
        self.node.get(group_id).await
    }

    /// Authorizes `pipeline_ids` on `group_id` without dropping anyone.
    ///
    /// Issues a GET followed by a PATCH. Concurrent grants on the same group
    /// can race; the last PATCH wins.
    pub async fn grant(
        &self,
        group_id: i64,
        pipeline_ids: &[i64],
    ) -> ApiResult<VariableGroupPermissionResponse> {
        let existing = self.get(group_id).await?;
        let pipelines = merge_grants(pipeline_ids, &existing);
        debug!(
            group_id,
            requested = pipeline_ids.len(),
            total = pipelines.len(),
            "granting variable group permissions"
        );

        let response: VariableGroupPermissionResponse = self
            .node
            .request(Method::PATCH)
            .part(group_id)
            .json(&json!({ "pipelines": pipelines }))
            .send_as()
            .await?;

        info!(group_id, pipelines = ?pipeline_ids, "granted variable group access");
        Ok(response)
    }
}
