//! JIRA Data Center integration.
//!
//! - Issue creation with pre-flight validation
//! - Issue lookup by key
//! - Current user lookup (`/myself`)
//!
//! # Configuration
//!
//! - `JIRA_BASE_URL`: JIRA instance URL (e.g., `https://jira.example.com`)
//! - `JIRA_PAT`: Personal access token (Bearer)

mod client;
pub mod models;
pub mod validation;

pub use client::{JiraClient, STORY_ISSUE_TYPE, TEST_ISSUE_TYPE};
pub use models::{
    CreateIssueResponse, ErrorResponse, Issue, IssueFields, IssueType, Priority, Project, User,
};
pub use validation::{validate_fields, validate_issue};
