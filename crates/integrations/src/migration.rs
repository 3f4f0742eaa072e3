//! Azure DevOps to JIRA translation.

use crate::pm::azure_devops::WorkItemModel;
use crate::pm::jira::{Issue, IssueFields, User};

/// Render the JIRA wiki-markup description for a migrated work item.
///
/// The work item description and acceptance criteria come first, followed
/// by a footer recording where the issue came from.
#[must_use]
pub fn build_jira_description(model: &WorkItemModel) -> String {
    let mut lines: Vec<String> = Vec::new();

    if let Some(description) = non_blank(model.description.as_deref()) {
        lines.push(description.to_string());
    }

    if let Some(criteria) = non_blank(model.acceptance_criteria.as_deref()) {
        lines.push(String::new());
        lines.push("h3. Acceptance Criteria".to_string());
        lines.push(criteria.to_string());
    }

    lines.push(String::new());
    lines.push("----".to_string());
    lines.push(format!("*Migrated from Azure DevOps Work Item:* {}", model.id));
    lines.push(format!(
        "*Original Type:* {}",
        model.work_item_type.as_deref().unwrap_or_default()
    ));
    lines.push(format!(
        "*Original State:* {}",
        model.state.as_deref().unwrap_or_default()
    ));

    if let Some(assignee) = non_blank(model.assigned_to.as_deref()) {
        lines.push(format!("*Originally Assigned To:* {assignee}"));
    }

    lines.join("\n")
}

/// Build the JIRA issue for `model`, reported by and assigned to `user`.
///
/// The result is not validated; [`crate::pm::jira::validate_issue`] or
/// [`crate::JiraClient::create_issue`] does that.
#[must_use]
pub fn issue_from_work_item(
    model: &WorkItemModel,
    project_key: &str,
    issue_type: &str,
    user: &User,
) -> Issue {
    let summary = non_blank(model.title.as_deref())
        .map_or_else(|| format!("ADO Work Item {}", model.id), str::to_string);

    let mut fields = IssueFields::new(project_key, issue_type, summary)
        .with_description(Some(build_jira_description(model)));
    fields.reporter = Some(user.clone());
    fields.assignee = Some(user.clone());

    Issue::new(fields)
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}
