//! Distributed task API.

mod variable_groups;

pub use variable_groups::{VariableGroupInfo, VariableGroups, VariableGroupsParameters, VariableInfo};

use crate::api::resource;

resource! {
    /// `_apis/distributedtask`
    pub struct DistributedTask: "distributedtask";
}

impl DistributedTask {
    pub fn variable_groups(&self) -> VariableGroups {
        self.node.child()
    }
}
