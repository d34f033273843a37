//! Build API.

mod definitions;

pub use definitions::{DefinitionInfo, DefinitionQueryOrder, Definitions, DefinitionsParameters};

use crate::api::resource;

resource! {
    /// `_apis/build`
    pub struct Build: "build";
}

impl Build {
    pub fn definitions(&self) -> Definitions {
        self.node.child()
    }
}
