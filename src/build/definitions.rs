//! Build definitions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::api::{QueryParams, resource};
use crate::error::ApiResult;
use crate::models::{AuthoredByInfo, ProjectInfo, QueueInfo};

resource! {
    /// `_apis/build/definitions`
    pub struct Definitions: "definitions", api_version = "7.2-preview.7";
}

/// Sort order for definition listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "camelCase")]
pub enum DefinitionQueryOrder {
    DefinitionNameAscending,
    DefinitionNameDescending,
    LastModifiedAscending,
    LastModifiedDescending,
    None,
}

/// Filters for [`Definitions::list_all`]. Unset fields are not sent.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DefinitionsParameters {
    /// Only definitions with a build after this time.
    pub built_after: Option<DateTime<Utc>>,
    /// Token from a previous page; no automatic paging is done.
    pub continuation_token: Option<String>,
    pub definition_ids: Option<Vec<i64>>,
    pub include_all_properties: Option<bool>,
    pub include_latest_builds: Option<bool>,
    pub min_metrics_time: Option<DateTime<Utc>>,
    pub name: Option<String>,
    /// Only definitions without a build after this time.
    pub not_built_after: Option<DateTime<Utc>>,
    pub path: Option<String>,
    pub process_type: Option<i32>,
    pub query_order: Option<DefinitionQueryOrder>,
    pub repository_id: Option<String>,
    pub repository_type: Option<String>,
    pub task_id_filter: Option<String>,
    pub yaml_filename: Option<String>,
}

/// A build definition as returned by list and get.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DefinitionInfo {
    pub authored_by: AuthoredByInfo,
    pub created_date: String,
    #[serde(default)]
    pub drafts: Vec<Value>,
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub path: Option<String>,
    pub project: ProjectInfo,
    #[serde(default)]
    pub quality: Option<String>,
    #[serde(default)]
    pub queue: Option<QueueInfo>,
    pub revision: i64,
    #[serde(rename = "type")]
    pub kind: String,
    pub uri: String,
    pub url: String,
}

impl Definitions {
    /// Lists build definitions (one page).
    pub async fn list_all(&self, params: &DefinitionsParameters) -> ApiResult<Vec<DefinitionInfo>> {
        self.node.list_all(QueryParams::from_serialize(params)?).await
    }

    pub async fn get(&self, definition_id: i64) -> ApiResult<DefinitionInfo> {
        self.node.get(definition_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::testing::mock_client;
    use crate::error::ApiError;
    use chrono::TimeZone;
    use reqwest::Method;
    use serde_json::json;

    fn definition(id: i64, name: &str) -> Value {
        json!({
            "authoredBy": {
                "displayName": "Chuck Reinhart",
                "id": "8c8c7d32-6b1b-47f4-b2e9-30b477b5ab3d",
                "uniqueName": "fabrikamfiber3@hotmail.com",
                "descriptor": "aad.OGM4YzdkMzI",
                "imageUrl": "https://dev.azure.com/contoso/_api/_common/identityImage?id=8c8c",
                "url": "https://spsprodcus5.vssps.visualstudio.com/_apis/Identities/8c8c"
            },
            "createdDate": "2024-02-20T09:13:51.053Z",
            "drafts": [],
            "id": id,
            "name": name,
            "path": "\\",
            "project": {
                "id": "6ce954b1-ce1f-45d1-b94d-e6bf2464ba2c",
                "lastUpdateTime": "2024-03-01T12:00:00.000Z",
                "name": "Fabrikam-Fiber-Git",
                "revision": 411,
                "state": "wellFormed",
                "url": "https://dev.azure.com/contoso/_apis/projects/6ce954b1",
                "visibility": "private"
            },
            "quality": "definition",
            "queue": {
                "id": 36,
                "name": "Azure Pipelines",
                "pool": { "id": 9, "isHosted": true, "name": "Azure Pipelines" }
            },
            "queueStatus": "enabled",
            "revision": 3,
            "type": "build",
            "uri": format!("vstfs:///Build/Definition/{id}"),
            "url": format!("https://dev.azure.com/contoso/6ce954b1/_apis/build/Definitions/{id}?revision=3")
        })
    }

    /// # List Definitions
    ///
    /// Tests the list call end to end against the mock transport.
    ///
    /// ## Test Scenario
    /// - Lists with a name filter, a timestamp filter and a query order
    ///
    /// ## Expected Outcome
    /// - The envelope is unwrapped into typed definitions
    /// - The URL and every query parameter are as the service expects
    #[tokio::test]
    async fn test_list_all_sends_filters() {
        let (client, mock) = mock_client([json!({
            "count": 2,
            "value": [definition(1, "CI"), definition(2, "Release")]
        })]);

        let params = DefinitionsParameters {
            name: Some("CI*".to_string()),
            built_after: Some(Utc.with_ymd_and_hms(2024, 1, 15, 10, 30, 0).unwrap()),
            query_order: Some(DefinitionQueryOrder::LastModifiedDescending),
            definition_ids: Some(vec![1, 2]),
            ..DefinitionsParameters::default()
        };
        let definitions = client.build().definitions().list_all(&params).await.unwrap();

        assert_eq!(definitions.len(), 2);
        assert_eq!(definitions[1].name, "Release");
        assert_eq!(definitions[0].queue.as_ref().unwrap().pool.name, "Azure Pipelines");

        let request = &mock.requests().await[0];
        assert_eq!(request.method, Method::GET);
        assert_eq!(
            request.url.path(),
            "/contoso/fabrikam/_apis/build/definitions"
        );
        assert_eq!(request.query("builtAfter").as_deref(), Some("2024-01-15T10:30:00Z"));
        assert_eq!(request.query("name").as_deref(), Some("CI*"));
        assert_eq!(
            request.query("queryOrder").as_deref(),
            Some("lastModifiedDescending")
        );
        assert_eq!(request.query("api-version").as_deref(), Some("7.2-preview.7"));
        assert_eq!(request.query("path"), None);
        let ids: Vec<_> = request
            .query_pairs()
            .into_iter()
            .filter(|(k, _)| k == "definitionIds")
            .map(|(_, v)| v)
            .collect();
        assert_eq!(ids, vec!["1", "2"]);
    }

    #[tokio::test]
    async fn test_list_all_without_filters_sends_only_api_version() {
        let (client, mock) = mock_client([json!({"count": 0, "value": []})]);

        let definitions = client
            .build()
            .definitions()
            .list_all(&DefinitionsParameters::default())
            .await
            .unwrap();

        assert!(definitions.is_empty());
        assert_eq!(
            mock.requests().await[0].url.query(),
            Some("api-version=7.2-preview.7")
        );
    }

    #[tokio::test]
    async fn test_get_definition() {
        let (client, mock) = mock_client([definition(7, "Nightly")]);

        let got = client.build().definitions().get(7).await.unwrap();
        assert_eq!(got.id, 7);
        assert_eq!(got.kind, "build");
        assert_eq!(got.authored_by.authorized_by.user.display_name, "Chuck Reinhart");

        assert_eq!(
            mock.requests().await[0].url.path(),
            "/contoso/fabrikam/_apis/build/definitions/7"
        );
    }

    /// # Missing Required Field
    ///
    /// ## Test Scenario
    /// - The service answers a definition without `project`
    ///
    /// ## Expected Outcome
    /// - The call fails with UnexpectedShape naming the expected type
    #[tokio::test]
    async fn test_get_definition_missing_field() {
        let mut broken = definition(7, "Nightly");
        broken.as_object_mut().unwrap().remove("project");
        let (client, _) = mock_client([broken]);

        let err = client.build().definitions().get(7).await.unwrap_err();
        match err {
            ApiError::UnexpectedShape { expected, message } => {
                assert!(expected.ends_with("DefinitionInfo"));
                assert!(message.contains("project"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
