//! Variable groups.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::api::{QueryParams, resource};
use crate::error::ApiResult;
use crate::models::UserInfo;

resource! {
    /// `_apis/distributedtask/variablegroups`
    pub struct VariableGroups: "variablegroups";
}

/// Optional filters for [`VariableGroups::list_all_with`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VariableGroupsParameters {
    /// Name filter, wildcards allowed.
    pub group_name: Option<String>,
    #[serde(rename = "$top")]
    pub top: Option<i32>,
    pub continuation_token: Option<i32>,
}

/// One variable. Secret values come back as `null`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VariableInfo {
    #[serde(default)]
    pub value: Option<String>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_secret: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VariableGroupInfo {
    pub created_by: UserInfo,
    pub created_on: String,
    #[serde(default)]
    pub description: Option<String>,
    pub id: i64,
    #[serde(default)]
    pub is_shared: bool,
    pub modified_by: UserInfo,
    #[serde(default)]
    pub modified_on: Option<String>,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub variable_group_project_references: Value,
    #[serde(default)]
    pub variables: BTreeMap<String, VariableInfo>,
}

impl VariableGroups {
    /// Lists every variable group in the project (one page).
    pub async fn list_all(&self) -> ApiResult<Vec<VariableGroupInfo>> {
        self.list_all_with(&VariableGroupsParameters::default()).await
    }

    pub async fn list_all_with(
        &self,
        params: &VariableGroupsParameters,
    ) -> ApiResult<Vec<VariableGroupInfo>> {
        self.node.list_all(QueryParams::from_serialize(params)?).await
    }

    pub async fn get(&self, group_id: i64) -> ApiResult<VariableGroupInfo> {
        self.node.get(group_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::testing::mock_client;
    use serde_json::json;

    fn group(id: i64, name: &str) -> Value {
        json!({
            "createdBy": {
                "displayName": "Normal Paulk",
                "id": "ac5aaba6-a66a-4e1d-b508-b060ec624fa9",
                "uniqueName": "dev@mailserver.com"
            },
            "createdOn": "2024-05-02T04:27:26.823Z",
            "description": "Shared settings",
            "id": id,
            "isShared": false,
            "modifiedBy": {
                "displayName": "Normal Paulk",
                "id": "ac5aaba6-a66a-4e1d-b508-b060ec624fa9",
                "uniqueName": "dev@mailserver.com"
            },
            "modifiedOn": "2024-05-02T04:27:26.823Z",
            "name": name,
            "type": "Vsts",
            "variableGroupProjectReferences": [
                { "name": name, "projectReference": { "id": "6ce954b1", "name": "fabrikam" } }
            ],
            "variables": {
                "key1": { "value": "value1" },
                "key2": { "value": null, "isSecret": true }
            }
        })
    }

    /// # List Variable Groups
    ///
    /// ## Test Scenario
    /// - Lists without filters; one variable is secret
    ///
    /// ## Expected Outcome
    /// - Variables decode into a map, the secret has no value
    /// - Only the api version is sent
    #[tokio::test]
    async fn test_list_all() {
        let (client, mock) = mock_client([json!({"count": 1, "value": [group(1, "Shared")]})]);

        let groups = client.distributed_task().variable_groups().list_all().await.unwrap();

        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].variables["key1"].value.as_deref(), Some("value1"));
        assert!(groups[0].variables["key2"].is_secret);
        assert_eq!(groups[0].variables["key2"].value, None);

        let request = &mock.requests().await[0];
        assert_eq!(
            request.url.path(),
            "/contoso/fabrikam/_apis/distributedtask/variablegroups"
        );
        assert_eq!(request.url.query(), Some("api-version=7.2-preview.3"));
    }

    #[tokio::test]
    async fn test_list_all_with_filters() {
        let (client, mock) = mock_client([json!({"count": 0, "value": []})]);

        let params = VariableGroupsParameters {
            group_name: Some("Shared*".to_string()),
            top: Some(10),
            ..VariableGroupsParameters::default()
        };
        client
            .distributed_task()
            .variable_groups()
            .list_all_with(&params)
            .await
            .unwrap();

        let request = &mock.requests().await[0];
        assert_eq!(request.query("groupName").as_deref(), Some("Shared*"));
        assert_eq!(request.query("$top").as_deref(), Some("10"));
        assert_eq!(request.query("continuationToken"), None);
    }

    #[tokio::test]
    async fn test_get() {
        let (client, mock) = mock_client([group(12, "Deploy")]);

        let got = client.distributed_task().variable_groups().get(12).await.unwrap();
        assert_eq!(got.name, "Deploy");
        assert_eq!(got.kind, "Vsts");
        assert!(got.variable_group_project_references.is_array());

        assert!(
            mock.requests().await[0]
                .url
                .path()
                .ends_with("/variablegroups/12")
        );
    }
}
