//! Pipelines API.

mod pipeline_permissions;

pub use pipeline_permissions::{
    AllPipelinesPermission, PipelinePermissions, VariableGroupPermissionInfo,
    VariableGroupPermissionPatch, VariableGroupPermissionResponse, VariableGroupPermissions,
    merge_grants,
};

use crate::api::resource;

resource! {
    /// `_apis/pipelines`
    pub struct Pipelines: "pipelines";
}

impl Pipelines {
    pub fn pipeline_permissions(&self) -> PipelinePermissions {
        self.node.child()
    }
}
