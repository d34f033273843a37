//! Work item tracking API.
//!
//! Work items are written with JSON Patch documents assembled by
//! [`WorkItemParams::to_patch_document`]; queries go through [`Wiql`].

mod patch;
mod wiql;
mod work_items;

pub use patch::{
    ItemType, PatchOp, PatchOperation, Relationship, RelationshipType, WorkItemParams,
    WorkItemState,
};
pub use wiql::{WiqlResult, Wiql, WorkItemFieldReference, WorkItemLink, WorkItemReference};
pub use work_items::{WorkItemResponse, WorkItems};

use crate::api::resource;

resource! {
    /// `_apis/wit`
    pub struct Wit: "wit";
}

impl Wit {
    pub fn work_items(&self) -> WorkItems {
        self.node.child()
    }

    pub fn wiql(&self) -> Wiql {
        self.node.child()
    }
}
