//! Azure DevOps work item types.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

// ============================================================================
// Raw REST payloads
// ============================================================================

/// Work item as returned by the REST API with `$expand=relations`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawWorkItem {
    /// Work item ID.
    pub id: i32,
    /// Revision number.
    #[serde(default)]
    pub rev: Option<i32>,
    /// Field reference name to untyped value.
    #[serde(default)]
    pub fields: HashMap<String, Value>,
    /// Links to other work items and artifacts. Omitted by the API when empty.
    #[serde(default)]
    pub relations: Vec<Relation>,
    /// REST URL of the work item.
    #[serde(default)]
    pub url: Option<String>,
}

impl RawWorkItem {
    /// Create an item with no fields or relations.
    #[must_use]
    pub fn new(id: i32) -> Self {
        Self {
            id,
            rev: None,
            fields: HashMap::new(),
            relations: Vec::new(),
            url: None,
        }
    }

    /// Builder helper: set a field.
    #[must_use]
    pub fn with_field(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.fields.insert(name.to_string(), value.into());
        self
    }

    /// Builder helper: append a relation.
    #[must_use]
    pub fn with_relation(mut self, relation: Relation) -> Self {
        self.relations.push(relation);
        self
    }
}

/// Typed link from a work item to another entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Relation {
    /// Relation kind (e.g. `System.LinkTypes.Hierarchy-Forward`, `ArtifactLink`).
    pub rel: String,
    /// Target URL.
    pub url: String,
    /// Extra link data such as `name`, `comment`, `authorizedDate`.
    #[serde(default)]
    pub attributes: HashMap<String, Value>,
}

impl Relation {
    pub fn new(rel: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            rel: rel.into(),
            url: url.into(),
            attributes: HashMap::new(),
        }
    }

    /// Builder helper: set an attribute.
    #[must_use]
    pub fn with_attribute(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.attributes.insert(name.to_string(), value.into());
        self
    }

    /// String attribute, if present and a string.
    #[must_use]
    pub fn attribute_str(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).and_then(Value::as_str)
    }
}

/// Batch response envelope (`{ "count": n, "value": [...] }`).
#[derive(Debug, Deserialize)]
pub struct WorkItemList {
    #[serde(default)]
    pub value: Vec<RawWorkItem>,
}

/// WIQL query response.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WiqlResult {
    #[serde(default)]
    pub work_items: Vec<WorkItemReference>,
}

/// Reference to a work item in a WIQL result.
#[derive(Debug, Deserialize)]
pub struct WorkItemReference {
    pub id: i32,
    #[serde(default)]
    pub url: Option<String>,
}

/// WIQL query request body.
#[derive(Debug, Serialize)]
pub struct WiqlRequest {
    pub query: String,
}

/// One JSON-Patch operation for work item updates.
#[derive(Debug, Clone, Serialize)]
pub struct PatchOperation {
    pub op: &'static str,
    pub path: String,
    pub value: Value,
}

impl PatchOperation {
    /// `add` operation on `/fields/<name>` (the API treats add as upsert).
    #[must_use]
    pub fn set_field(name: &str, value: Value) -> Self {
        Self {
            op: "add",
            path: format!("/fields/{name}"),
            value,
        }
    }
}

// ============================================================================
// Projected model
// ============================================================================

/// Simplified, strongly typed view of a work item.
///
/// Collections are `None` when not requested; they are never populated on
/// nodes deeper than the projector's depth bound.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkItemModel {
    pub id: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub acceptance_criteria: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_to: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub work_item_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub changed_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub closed_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolved_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub activated_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state_change_date: Option<DateTime<Utc>>,
    /// Child work items (loaded when requested).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<WorkItemModel>>,
    /// Parent work items (loaded when requested).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parents: Option<Vec<WorkItemModel>>,
    /// Linked commits (loaded when requested).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub commits: Option<Vec<CommitInfo>>,
    /// Linked pull requests (loaded when requested).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pull_requests: Option<Vec<PullRequestInfo>>,
}

/// Commit linked to a work item.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommitInfo {
    pub commit_id: Option<String>,
    /// Link comment.
    pub comment: Option<String>,
    /// Not carried by relation data.
    pub author: Option<String>,
    pub commit_date: Option<DateTime<Utc>>,
    pub remote_url: Option<String>,
}

/// Pull request linked to a work item.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PullRequestInfo {
    pub pull_request_id: Option<i32>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<String>,
    pub created_by: Option<String>,
    pub creation_date: Option<DateTime<Utc>>,
    pub closed_date: Option<DateTime<Utc>>,
    pub source_branch: Option<String>,
    pub target_branch: Option<String>,
    pub remote_url: Option<String>,
}

// ============================================================================
// Work item types
// ============================================================================

/// Common work item types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WorkItemType {
    Feature,
    Epic,
    Story,
    Task,
}

impl WorkItemType {
    /// All known types.
    pub const ALL: [Self; 4] = [Self::Feature, Self::Epic, Self::Story, Self::Task];

    /// Name used in WIQL (`System.WorkItemType`).
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Feature => "Feature",
            Self::Epic => "Epic",
            Self::Story => "User Story",
            Self::Task => "Task",
        }
    }
}

impl fmt::Display for WorkItemType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WorkItemType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "feature" => Ok(Self::Feature),
            "epic" => Ok(Self::Epic),
            "story" | "user story" | "userstory" => Ok(Self::Story),
            "task" => Ok(Self::Task),
            _ => Err(format!(
                "Invalid work item type: {s}. Valid types: Feature, Epic, Story, Task"
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_work_item_deserializes_without_relations() {
        let json = r#"{
            "id": 100,
            "rev": 4,
            "fields": { "System.Title": "Fix login bug", "System.State": "Active" },
            "url": "https://dev.azure.com/acme/_apis/wit/workItems/100"
        }"#;
        let item: RawWorkItem = serde_json::from_str(json).unwrap();
        assert_eq!(item.id, 100);
        assert!(item.relations.is_empty());
        assert_eq!(item.fields["System.State"], "Active");
    }

    #[test]
    fn test_relation_attributes() {
        let json = r#"{
            "rel": "ArtifactLink",
            "url": "vstfs:///Git/Commit/abc",
            "attributes": { "name": "Fixed in Commit", "isLocked": false }
        }"#;
        let rel: Relation = serde_json::from_str(json).unwrap();
        assert_eq!(rel.attribute_str("name"), Some("Fixed in Commit"));
        assert_eq!(rel.attribute_str("isLocked"), None);
        assert_eq!(rel.attribute_str("comment"), None);
    }

    #[test]
    fn test_model_omits_unrequested_collections() {
        let model = WorkItemModel {
            id: 1,
            title: Some("t".into()),
            ..Default::default()
        };
        let json = serde_json::to_value(&model).unwrap();
        assert!(json.get("children").is_none());
        assert!(json.get("pullRequests").is_none());
        assert_eq!(json["title"], "t");
    }

    #[test]
    fn test_work_item_type_parsing() {
        assert_eq!("feature".parse::<WorkItemType>(), Ok(WorkItemType::Feature));
        assert_eq!("STORY".parse::<WorkItemType>(), Ok(WorkItemType::Story));
        assert_eq!(WorkItemType::Story.as_str(), "User Story");
        let err = "Bug".parse::<WorkItemType>().unwrap_err();
        assert!(err.contains("Valid types"));
    }

    #[test]
    fn test_patch_operation_path() {
        let op = PatchOperation::set_field("System.State", Value::from("Closed"));
        let json = serde_json::to_value(&op).unwrap();
        assert_eq!(json["op"], "add");
        assert_eq!(json["path"], "/fields/System.State");
    }
}
