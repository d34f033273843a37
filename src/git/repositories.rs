//! Git repositories.

use serde::{Deserialize, Serialize};

use crate::api::{QueryParams, resource};
use crate::error::ApiResult;
use crate::models::ProjectInfo;

resource! {
    /// `_apis/git/repositories`
    pub struct Repositories: "repositories";
}

/// Options for [`Repositories::list_all`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RepositoriesParameters {
    pub include_all_urls: Option<bool>,
    pub include_hidden: Option<bool>,
    pub include_links: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepoInfo {
    /// Absent for repositories without any commit.
    #[serde(default)]
    pub default_branch: Option<String>,
    pub id: String,
    #[serde(default)]
    pub is_disabled: bool,
    #[serde(default)]
    pub is_in_maintenance: bool,
    pub name: String,
    pub project: ProjectInfo,
    pub remote_url: String,
    #[serde(default)]
    pub size: u64,
    pub ssh_url: String,
    pub url: String,
    pub web_url: String,
}

impl Repositories {
    pub async fn list_all(&self, params: &RepositoriesParameters) -> ApiResult<Vec<RepoInfo>> {
        self.node.list_all(QueryParams::from_serialize(params)?).await
    }

    /// Gets a repository by id or by name.
    pub async fn get(&self, repository: &str) -> ApiResult<RepoInfo> {
        self.node.get(repository).await
    }
}
