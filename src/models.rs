//! Records shared by several endpoints.
//!
//! Field names follow the REST payloads (camelCase on the wire). Fields the
//! service is known to omit are `Option` or defaulted; everything else is
//! required and a missing value surfaces as
//! [`ApiError::UnexpectedShape`](crate::error::ApiError::UnexpectedShape).

use serde::{Deserialize, Serialize};

/// Identity reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserInfo {
    pub display_name: String,
    pub id: String,
    pub unique_name: String,
}

/// Identity reference that also carries a graph descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorizedByInfo {
    #[serde(flatten)]
    pub user: UserInfo,
    pub descriptor: String,
}

/// Identity reference with avatar and profile links, as found on build definitions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthoredByInfo {
    #[serde(flatten)]
    pub authorized_by: AuthorizedByInfo,
    pub image_url: String,
    pub url: String,
}

/// Agent pool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PoolInfo {
    pub id: i64,
    #[serde(default)]
    pub is_hosted: bool,
    pub name: String,
}

/// Agent queue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueueInfo {
    pub id: i64,
    pub name: String,
    pub pool: PoolInfo,
    #[serde(default)]
    pub url: Option<String>,
}

/// Project lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ProjectState {
    All,
    CreatePending,
    Deleted,
    Deleting,
    New,
    Unchanged,
    WellFormed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ProjectVisibility {
    Public,
    Private,
}

/// Team project reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectInfo {
    #[serde(default)]
    pub description: Option<String>,
    pub id: String,
    pub last_update_time: String,
    pub name: String,
    pub revision: i64,
    pub state: ProjectState,
    pub url: String,
    pub visibility: ProjectVisibility,
}

/// A typed reference to a protected resource (variable group, queue, ...).
///
/// The service sends the id as a string for some resource types and as a
/// number for others; both decode to a string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceRef {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Id {
        Text(String),
        Number(i64),
    }

    Ok(match Id::deserialize(deserializer)? {
        Id::Text(s) => s,
        Id::Number(n) => n.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    /// # Nested Identity Decoding
    ///
    /// ## Test Scenario
    /// - Decodes an authoredBy payload as sent on build definitions
    ///
    /// ## Expected Outcome
    /// - The flattened user fields land in the inner records
    #[test]
    fn test_authored_by_flattening() {
        let value = json!({
            "displayName": "Jamal Hartnett",
            "id": "8c8c7d32-6b1b-47f4-b2e9-30b477b5ab3d",
            "uniqueName": "fabrikamfiber4@hotmail.com",
            "descriptor": "aad.OGM4YzdkMzItNmIxYi03",
            "imageUrl": "https://dev.azure.com/contoso/_api/_common/identityImage?id=8c8c",
            "url": "https://spsprodcus5.vssps.visualstudio.com/_apis/Identities/8c8c"
        });

        let authored: AuthoredByInfo = serde_json::from_value(value.clone()).unwrap();
        assert_eq!(authored.authorized_by.user.display_name, "Jamal Hartnett");
        assert_eq!(authored.authorized_by.descriptor, "aad.OGM4YzdkMzItNmIxYi03");
        assert_eq!(serde_json::to_value(&authored).unwrap(), value);
    }

    #[test]
    fn test_project_info_without_description() {
        let project: ProjectInfo = serde_json::from_value(json!({
            "id": "6ce954b1-ce1f-45d1-b94d-e6bf2464ba2c",
            "lastUpdateTime": "2024-03-01T12:00:00.000Z",
            "name": "Fabrikam-Fiber-Git",
            "revision": 411,
            "state": "wellFormed",
            "url": "https://dev.azure.com/contoso/_apis/projects/6ce954b1",
            "visibility": "private"
        }))
        .unwrap();

        assert_eq!(project.description, None);
        assert_eq!(project.state, ProjectState::WellFormed);
        assert_eq!(project.visibility, ProjectVisibility::Private);
    }

    #[test]
    fn test_project_state_wire_names() {
        assert_eq!(
            serde_json::to_value(ProjectState::CreatePending).unwrap(),
            json!("createPending")
        );
        assert!(serde_json::from_value::<ProjectState>(json!("archived")).is_err());
    }

    #[test]
    fn test_resource_ref_type_field() {
        let r: ResourceRef =
            serde_json::from_value(json!({"id": "12", "type": "variablegroup"})).unwrap();
        assert_eq!(r.kind, "variablegroup");

        let r: ResourceRef =
            serde_json::from_value(json!({"id": 12, "type": "variablegroup"})).unwrap();
        assert_eq!(r.id, "12");
    }
}
