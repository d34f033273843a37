//! Git API.

mod repositories;

pub use repositories::{RepoInfo, Repositories, RepositoriesParameters};

use crate::api::resource;

resource! {
    /// `_apis/git`
    pub struct Git: "git";
}

impl Git {
    pub fn repositories(&self) -> Repositories {
        self.node.child()
    }
}
