//! Pre-flight validation of issues before they are sent to JIRA.

use std::sync::LazyLock;

use regex::Regex;

use super::models::{Issue, IssueFields};
use crate::error::ValidationError;

pub const SUMMARY_MIN_CHARS: usize = 5;
pub const SUMMARY_MAX_CHARS: usize = 255;
pub const DESCRIPTION_MAX_CHARS: usize = 32_767;

static PROJECT_KEY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Z][A-Z0-9_]*$").expect("project key pattern is valid"));

/// Check `fields` against the rules JIRA enforces on creation.
///
/// Every violation is reported, not only the first.
#[must_use]
pub fn validate_fields(fields: &IssueFields) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    match fields.project.as_ref().and_then(|p| p.key.as_deref()) {
        None => errors.push(ValidationError::new("project", "Project is required")),
        Some(key) if key.trim().is_empty() => {
            errors.push(ValidationError::new("project", "Project key is required"));
        }
        Some(key) if !PROJECT_KEY.is_match(key) => errors.push(ValidationError::new(
            "project",
            "Project key must start with a letter and contain only uppercase letters, numbers, and underscores",
        )),
        Some(_) => {}
    }

    match fields.issue_type.as_ref() {
        None => errors.push(ValidationError::new("issuetype", "Issue type is required")),
        Some(issue_type) => {
            if issue_type.name.as_deref().is_none_or(|n| n.trim().is_empty()) {
                errors.push(ValidationError::new("issuetype", "Issue type name is required"));
            }
        }
    }

    match fields.summary.as_deref() {
        None => errors.push(ValidationError::new("summary", "Summary is required")),
        Some(summary) if summary.trim().is_empty() => {
            errors.push(ValidationError::new("summary", "Summary is required"));
        }
        Some(summary) => {
            let len = summary.chars().count();
            if len < SUMMARY_MIN_CHARS {
                errors.push(ValidationError::new(
                    "summary",
                    format!("Summary must be at least {SUMMARY_MIN_CHARS} characters long"),
                ));
            } else if len > SUMMARY_MAX_CHARS {
                errors.push(ValidationError::new(
                    "summary",
                    format!("Summary cannot exceed {SUMMARY_MAX_CHARS} characters"),
                ));
            }
        }
    }

    if let Some(description) = fields.description.as_deref() {
        if description.chars().count() > DESCRIPTION_MAX_CHARS {
            errors.push(ValidationError::new(
                "description",
                format!("Description cannot exceed {DESCRIPTION_MAX_CHARS} characters"),
            ));
        }
    }

    errors
}

/// Validate an issue's fields.
#[must_use]
pub fn validate_issue(issue: &Issue) -> Vec<ValidationError> {
    validate_fields(&issue.fields)
}
