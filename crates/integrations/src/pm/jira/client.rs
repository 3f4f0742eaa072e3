//! JIRA Data Center REST v2 client.

use std::collections::BTreeMap;
use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde_json::Value;
use tracing::{debug, info, instrument, warn};

use super::models::{
    CreateIssueRequest, CreateIssueResponse, ErrorResponse, Issue, IssueFields, User,
};
use super::validation::validate_fields;
use crate::config::JiraConnection;
use crate::error::{IntegrationError, IntegrationResult};

/// Default timeout for API requests.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Issue type used by [`JiraClient::create_story`].
pub const STORY_ISSUE_TYPE: &str = "Story";
/// Issue type used by [`JiraClient::create_test`].
pub const TEST_ISSUE_TYPE: &str = "Test";

/// JIRA client authenticated with a personal access token.
#[derive(Clone)]
pub struct JiraClient {
    client: Client,
    connection: JiraConnection,
}

impl JiraClient {
    pub fn new(connection: JiraConnection) -> IntegrationResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()?;

        Ok(Self { client, connection })
    }

    /// Instance URL without trailing slash.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.connection.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.connection.base_url)
    }

    /// Create an issue.
    ///
    /// The issue is validated first; violations are returned as
    /// [`IntegrationError::Validation`] without contacting the server.
    #[instrument(skip(self, issue))]
    pub async fn create_issue(&self, issue: &Issue) -> IntegrationResult<CreateIssueResponse> {
        self.create_from_fields(&issue.fields).await
    }

    async fn create_from_fields(
        &self,
        fields: &IssueFields,
    ) -> IntegrationResult<CreateIssueResponse> {
        let errors = validate_fields(fields);
        if !errors.is_empty() {
            return Err(IntegrationError::Validation(errors));
        }

        let url = self.url("/rest/api/2/issue");
        debug!(url = %url, "POST issue");

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.connection.token)
            .json(&CreateIssueRequest { fields })
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            let message = serde_json::from_str::<ErrorResponse>(&text)
                .ok()
                .and_then(|e| e.joined())
                .unwrap_or(text);
            warn!(status = status.as_u16(), error = %message, "Failed to create issue");
            return Err(IntegrationError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let created: CreateIssueResponse = serde_json::from_str(&text)?;
        info!(key = %created.key, "Created JIRA issue");
        Ok(created)
    }

    /// Create an issue from its parts.
    pub async fn create_issue_with(
        &self,
        project_key: &str,
        issue_type: &str,
        summary: &str,
        description: Option<&str>,
        custom_fields: BTreeMap<String, Value>,
    ) -> IntegrationResult<CreateIssueResponse> {
        let fields = IssueFields::new(project_key, issue_type, summary)
            .with_description(description.map(str::to_string))
            .with_custom_fields(custom_fields);
        self.create_from_fields(&fields).await
    }

    /// Create a `Story` issue.
    pub async fn create_story(
        &self,
        project_key: &str,
        summary: &str,
        description: Option<&str>,
        custom_fields: BTreeMap<String, Value>,
    ) -> IntegrationResult<CreateIssueResponse> {
        self.create_issue_with(project_key, STORY_ISSUE_TYPE, summary, description, custom_fields)
            .await
    }

    /// Create a `Test` issue.
    pub async fn create_test(
        &self,
        project_key: &str,
        summary: &str,
        description: Option<&str>,
        custom_fields: BTreeMap<String, Value>,
    ) -> IntegrationResult<CreateIssueResponse> {
        self.create_issue_with(project_key, TEST_ISSUE_TYPE, summary, description, custom_fields)
            .await
    }

    /// Fetch an issue by key.
    #[instrument(skip(self))]
    pub async fn get_issue(&self, key: &str) -> IntegrationResult<Issue> {
        if key.trim().is_empty() {
            return Err(IntegrationError::InvalidArgument(
                "issue key cannot be empty".to_string(),
            ));
        }

        let url = self.url(&format!("/rest/api/2/issue/{}", urlencoding::encode(key)));
        self.get_json(&url).await
    }

    /// The user the token authenticates as.
    #[instrument(skip(self))]
    pub async fn get_current_user(&self) -> IntegrationResult<User> {
        let url = self.url("/rest/api/2/myself");
        self.get_json(&url).await
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, url: &str) -> IntegrationResult<T> {
        debug!(url = %url, "GET request");

        let response = self
            .client
            .get(url)
            .bearer_auth(&self.connection.token)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;

        if status.is_success() {
            serde_json::from_str(&text).map_err(|e| {
                warn!(error = %e, "Failed to parse JIRA response");
                IntegrationError::Serialization(e)
            })
        } else if status == StatusCode::NOT_FOUND {
            Err(IntegrationError::NotFound(text))
        } else {
            Err(IntegrationError::Api {
                status: status.as_u16(),
                message: text,
            })
        }
    }
}

impl std::fmt::Debug for JiraClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JiraClient")
            .field("connection", &self.connection)
            .finish_non_exhaustive()
    }
}
