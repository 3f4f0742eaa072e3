//! Typed access to the untyped work item field bag.

use chrono::{DateTime, Utc};
use serde_json::Value;

use super::models::RawWorkItem;

// Field reference names read by the projector.
pub const TITLE: &str = "System.Title";
pub const DESCRIPTION: &str = "System.Description";
pub const ACCEPTANCE_CRITERIA: &str = "Microsoft.VSTS.Common.AcceptanceCriteria";
pub const ASSIGNED_TO: &str = "System.AssignedTo";
pub const WORK_ITEM_TYPE: &str = "System.WorkItemType";
pub const STATE: &str = "System.State";
pub const CREATED_DATE: &str = "System.CreatedDate";
pub const CHANGED_DATE: &str = "System.ChangedDate";
pub const CLOSED_DATE: &str = "Microsoft.VSTS.Common.ClosedDate";
pub const RESOLVED_DATE: &str = "Microsoft.VSTS.Common.ResolvedDate";
pub const ACTIVATED_DATE: &str = "Microsoft.VSTS.Common.ActivatedDate";
pub const STATE_CHANGE_DATE: &str = "Microsoft.VSTS.Common.StateChangeDate";

/// Outcome of looking up a field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldLookup<T> {
    /// Present and convertible.
    Found(T),
    /// Missing or `null`.
    Absent,
    /// Present but not convertible to the requested type.
    Mismatch {
        expected: &'static str,
        actual: &'static str,
    },
}

impl<T> FieldLookup<T> {
    /// Collapse to an `Option`, treating mismatches as absent.
    pub fn ok(self) -> Option<T> {
        match self {
            Self::Found(value) => Some(value),
            Self::Absent | Self::Mismatch { .. } => None,
        }
    }

    #[must_use]
    pub const fn is_mismatch(&self) -> bool {
        matches!(self, Self::Mismatch { .. })
    }
}

/// Scalar types that can be read out of a field value.
pub trait FromFieldValue: Sized {
    /// Type name reported on mismatch.
    const EXPECTED: &'static str;

    /// Best-effort conversion; `None` means the value has the wrong shape.
    fn from_field_value(value: &Value) -> Option<Self>;
}

impl FromFieldValue for String {
    const EXPECTED: &'static str = "string";

    fn from_field_value(value: &Value) -> Option<Self> {
        match value {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            // Identity references, e.g. System.AssignedTo
            Value::Object(map) => map
                .get("displayName")
                .or_else(|| map.get("uniqueName"))
                .and_then(Value::as_str)
                .map(str::to_string),
            Value::Null | Value::Array(_) => None,
        }
    }
}

impl FromFieldValue for DateTime<Utc> {
    const EXPECTED: &'static str = "datetime";

    fn from_field_value(value: &Value) -> Option<Self> {
        value
            .as_str()
            .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
            .map(|dt| dt.with_timezone(&Utc))
    }
}

/// Look up `name` in the item's field bag and convert it to `T`.
pub fn get_field<T: FromFieldValue>(item: &RawWorkItem, name: &str) -> FieldLookup<T> {
    match item.fields.get(name) {
        None | Some(Value::Null) => FieldLookup::Absent,
        Some(value) => T::from_field_value(value).map_or_else(
            || FieldLookup::Mismatch {
                expected: T::EXPECTED,
                actual: value_kind(value),
            },
            FieldLookup::Found,
        ),
    }
}

const fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
