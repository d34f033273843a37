//! JSON Patch documents for work item create/update.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use url::Url;

use crate::api::QueryParams;

const TAGS_FIELD: &str = "/fields/System.Tags";
const ACCEPTANCE_CRITERIA: &str = "Microsoft.VSTS.Common.AcceptanceCriteria";

/// JSON Patch operation kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PatchOp {
    Add,
    Remove,
    Replace,
    Move,
    Copy,
    Test,
}

/// A single JSON Patch operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatchOperation {
    pub op: PatchOp,
    pub path: String,
    pub value: Value,
}

impl PatchOperation {
    pub fn add(path: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            op: PatchOp::Add,
            path: path.into(),
            value: value.into(),
        }
    }
}

/// Work item type used in the create URL (`workitems/$<type>`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
pub enum ItemType {
    Task,
    Bug,
    Feature,
    #[serde(rename = "User Story")]
    #[value(name = "user-story")]
    UserStory,
}

impl ItemType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemType::Task => "Task",
            ItemType::Bug => "Bug",
            ItemType::Feature => "Feature",
            ItemType::UserStory => "User Story",
        }
    }
}

impl fmt::Display for ItemType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
pub enum WorkItemState {
    New,
    Active,
    Closed,
    Removed,
}

impl WorkItemState {
    pub fn as_str(&self) -> &'static str {
        match self {
            WorkItemState::New => "New",
            WorkItemState::Active => "Active",
            WorkItemState::Closed => "Closed",
            WorkItemState::Removed => "Removed",
        }
    }
}

/// Link kinds by their display name in the web UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RelationshipType {
    AffectedBy,
    Affects,
    ArtifactLink,
    AttachedFile,
    Child,
    Duplicate,
    DuplicateOf,
    Hyperlink,
    Parent,
    Predecessor,
    ReferencedBy,
    References,
    Related,
    SharedSteps,
    Successor,
    TestCase,
    TestedBy,
    Tests,
}

impl RelationshipType {
    pub const ALL: [RelationshipType; 18] = [
        RelationshipType::AffectedBy,
        RelationshipType::Affects,
        RelationshipType::ArtifactLink,
        RelationshipType::AttachedFile,
        RelationshipType::Child,
        RelationshipType::Duplicate,
        RelationshipType::DuplicateOf,
        RelationshipType::Hyperlink,
        RelationshipType::Parent,
        RelationshipType::Predecessor,
        RelationshipType::ReferencedBy,
        RelationshipType::References,
        RelationshipType::Related,
        RelationshipType::SharedSteps,
        RelationshipType::Successor,
        RelationshipType::TestCase,
        RelationshipType::TestedBy,
        RelationshipType::Tests,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            RelationshipType::AffectedBy => "Affected By",
            RelationshipType::Affects => "Affects",
            RelationshipType::ArtifactLink => "Artifact Link",
            RelationshipType::AttachedFile => "Attached File",
            RelationshipType::Child => "Child",
            RelationshipType::Duplicate => "Duplicate",
            RelationshipType::DuplicateOf => "Duplicate Of",
            RelationshipType::Hyperlink => "Hyperlink",
            RelationshipType::Parent => "Parent",
            RelationshipType::Predecessor => "Predecessor",
            RelationshipType::ReferencedBy => "Referenced By",
            RelationshipType::References => "References",
            RelationshipType::Related => "Related",
            RelationshipType::SharedSteps => "Shared Steps",
            RelationshipType::Successor => "Successor",
            RelationshipType::TestCase => "Test Case",
            RelationshipType::TestedBy => "Tested By",
            RelationshipType::Tests => "Tests",
        }
    }

    /// Reference name the service expects in `rel`.
    pub fn link_type(&self) -> &'static str {
        match self {
            RelationshipType::AffectedBy => "Microsoft.VSTS.Common.Affects-Reverse",
            RelationshipType::Affects => "Microsoft.VSTS.Common.Affects-Forward",
            RelationshipType::ArtifactLink => "ArtifactLink",
            RelationshipType::AttachedFile => "AttachedFile",
            RelationshipType::Child => "System.LinkTypes.Hierarchy-Forward",
            RelationshipType::Duplicate => "System.LinkTypes.Duplicate-Forward",
            RelationshipType::DuplicateOf => "System.LinkTypes.Duplicate-Reverse",
            RelationshipType::Hyperlink => "Hyperlink",
            RelationshipType::Parent => "System.LinkTypes.Hierarchy-Reverse",
            RelationshipType::Predecessor => "System.LinkTypes.Dependency-Reverse",
            RelationshipType::ReferencedBy => {
                "Microsoft.VSTS.TestCase.SharedParameterReferencedBy-Forward"
            }
            RelationshipType::References => {
                "Microsoft.VSTS.TestCase.SharedParameterReferencedBy-Reverse"
            }
            RelationshipType::Related => "System.LinkTypes.Related",
            RelationshipType::SharedSteps => "Microsoft.VSTS.TestCase.SharedStepReferencedBy-Reverse",
            RelationshipType::Successor => "System.LinkTypes.Dependency-Forward",
            RelationshipType::TestCase => "Microsoft.VSTS.TestCase.SharedStepReferencedBy-Forward",
            RelationshipType::TestedBy => "Microsoft.VSTS.Common.TestedBy-Forward",
            RelationshipType::Tests => "Microsoft.VSTS.Common.TestedBy-Reverse",
        }
    }
}

impl fmt::Display for RelationshipType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for RelationshipType {
    type Err = String;

    /// Accepts the display name in any case, with spaces, dashes or nothing
    /// between words ("Duplicate Of", "duplicate-of", "duplicateof").
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = normalize(s);
        RelationshipType::ALL
            .into_iter()
            .find(|r| normalize(r.name()) == wanted)
            .ok_or_else(|| format!("unknown relationship type: {s}"))
    }
}

fn normalize(s: &str) -> String {
    s.chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

/// A link from the work item being written to another work item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Relationship {
    pub work_item_id: i64,
    pub relationship_type: RelationshipType,
}

/// Fields for a work item create or update.
///
/// Unset and empty fields are left out of the patch, with one exception:
/// `tags: Some(vec![])` clears the tags.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WorkItemParams {
    pub title: Option<String>,
    pub description: Option<String>,
    pub state: Option<WorkItemState>,
    pub tags: Option<Vec<String>>,
    pub area: Option<String>,
    pub iteration: Option<String>,
    pub assigned_to: Option<String>,
    pub relations: Vec<Relationship>,
    /// Rendered as a Markdown bullet list.
    pub acceptance_criteria: Vec<String>,
    pub validate_only: bool,
    pub bypass_rules: bool,
    pub suppress_notifications: bool,
}

impl WorkItemParams {
    /// Assembles the patch document.
    ///
    /// `work_items_url` is the URL of the `workitems` endpoint; relation
    /// targets are addressed below it.
    pub fn to_patch_document(&self, work_items_url: &Url) -> Vec<PatchOperation> {
        let mut ops = Vec::new();

        if let Some(tags) = &self.tags {
            ops.push(PatchOperation::add(TAGS_FIELD, tags.join(";")));
        }

        let base = work_items_url.as_str().trim_end_matches('/');
        for relation in &self.relations {
            ops.push(PatchOperation::add(
                "/relations/-",
                json!({
                    "rel": relation.relationship_type.link_type(),
                    "url": format!("{base}/{}", relation.work_item_id),
                }),
            ));
        }

        if !self.acceptance_criteria.is_empty() {
            let bullets = self
                .acceptance_criteria
                .iter()
                .map(|c| format!("* {c}"))
                .collect::<Vec<_>>()
                .join("\n");
            ops.push(PatchOperation::add(
                format!("/multilineFieldsFormat/{ACCEPTANCE_CRITERIA}"),
                "Markdown",
            ));
            ops.push(PatchOperation::add(
                format!("/fields/{ACCEPTANCE_CRITERIA}"),
                bullets,
            ));
        }

        let simple = [
            ("System.State", self.state.map(|s| s.as_str())),
            ("System.AssignedTo", self.assigned_to.as_deref()),
            ("System.IterationPath", self.iteration.as_deref()),
            ("System.Title", self.title.as_deref()),
            ("System.Description", self.description.as_deref()),
            ("System.AreaPath", self.area.as_deref()),
        ];
        for (field, value) in simple {
            if let Some(value) = value.filter(|v| !v.is_empty()) {
                ops.push(PatchOperation::add(format!("/fields/{field}"), value));
            }
        }

        ops
    }

    /// The three behaviour flags, always sent.
    pub fn query_flags(&self) -> QueryParams {
        QueryParams::new()
            .with("validateOnly", self.validate_only)
            .with("bypassRules", self.bypass_rules)
            .with("suppressNotifications", self.suppress_notifications)
    }
}
