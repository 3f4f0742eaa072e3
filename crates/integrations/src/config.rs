//! Connection settings for the issue trackers.
//!
//! Credentials are never stored on disk; they are read from environment
//! variables whose names may be overridden per organization.

use std::env;

use crate::error::{IntegrationError, IntegrationResult};

/// Default environment variable holding the Azure DevOps PAT.
pub const ENV_AZURE_DEVOPS_PAT: &str = "AZURE_DEVOPS_PAT";
/// Environment variable holding the JIRA instance URL.
pub const ENV_JIRA_BASE_URL: &str = "JIRA_BASE_URL";
/// Default environment variable holding the JIRA PAT.
pub const ENV_JIRA_PAT: &str = "JIRA_PAT";

/// Azure DevOps connection settings.
#[derive(Clone)]
pub struct AdoConnection {
    /// Organization URL (e.g., `https://dev.azure.com/your-org`).
    pub organization_url: String,
    /// Project name.
    pub project: String,
    /// Personal access token.
    pub pat: String,
}

impl AdoConnection {
    /// Build settings from explicit values.
    pub fn new(
        organization_url: impl Into<String>,
        project: impl Into<String>,
        pat: impl Into<String>,
    ) -> IntegrationResult<Self> {
        let organization_url = require("organization URL", organization_url.into())?;
        let project = require("project", project.into())?;
        let pat = require("personal access token", pat.into())?;

        Ok(Self {
            organization_url: organization_url.trim_end_matches('/').to_string(),
            project,
            pat,
        })
    }

    /// Build settings reading the PAT from `pat_env_var`.
    pub fn from_env(
        organization_url: impl Into<String>,
        project: impl Into<String>,
        pat_env_var: &str,
    ) -> IntegrationResult<Self> {
        let pat = read_env(pat_env_var).ok_or_else(|| {
            IntegrationError::Config(format!(
                "Personal Access Token not found in environment variable '{pat_env_var}'"
            ))
        })?;
        Self::new(organization_url, project, pat)
    }
}

impl std::fmt::Debug for AdoConnection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdoConnection")
            .field("organization_url", &self.organization_url)
            .field("project", &self.project)
            .field("pat", &"<redacted>")
            .finish()
    }
}

/// JIRA connection settings.
#[derive(Clone)]
pub struct JiraConnection {
    /// Instance URL without trailing slash.
    pub base_url: String,
    /// Personal access token (Bearer).
    pub token: String,
}

impl JiraConnection {
    /// Build settings from explicit values.
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> IntegrationResult<Self> {
        let base_url = require("base URL", base_url.into())?;
        let token = require("token", token.into())?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
        })
    }

    /// Build settings for `base_url` reading the token from `token_env_var`.
    pub fn from_env_token(base_url: impl Into<String>, token_env_var: &str) -> IntegrationResult<Self> {
        let token = read_env(token_env_var).ok_or_else(|| {
            IntegrationError::Config(format!(
                "Environment variable '{token_env_var}' is not set or is empty. \
                 Please set it to your JIRA Personal Access Token."
            ))
        })?;
        Self::new(base_url, token)
    }

    /// Build settings from `JIRA_BASE_URL` and `JIRA_PAT`.
    pub fn from_env() -> IntegrationResult<Self> {
        let base_url = read_env(ENV_JIRA_BASE_URL).ok_or_else(|| {
            IntegrationError::Config(format!(
                "Environment variable '{ENV_JIRA_BASE_URL}' is not set or is empty. \
                 Please set it to your JIRA instance URL."
            ))
        })?;
        Self::from_env_token(base_url, ENV_JIRA_PAT)
    }
}

impl std::fmt::Debug for JiraConnection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JiraConnection")
            .field("base_url", &self.base_url)
            .field("token", &"<redacted>")
            .finish()
    }
}

/// Read an environment variable, treating blank values as unset.
#[must_use]
pub fn read_env(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn require(what: &str, value: String) -> IntegrationResult<String> {
    if value.trim().is_empty() {
        return Err(IntegrationError::Config(format!("{what} cannot be empty")));
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn test_ado_connection_trims_trailing_slash() {
        let conn = AdoConnection::new("https://dev.azure.com/acme/", "Web", "pat").unwrap();
        assert_eq!(conn.organization_url, "https://dev.azure.com/acme");
    }

    #[test]
    fn test_ado_connection_rejects_blank_project() {
        let err = AdoConnection::new("https://dev.azure.com/acme", "  ", "pat").unwrap_err();
        assert!(err.is_config());
    }

    #[test]
    #[serial]
    fn test_ado_connection_missing_pat_names_variable() {
        env::remove_var("SDLC_TEST_MISSING_PAT");
        let err =
            AdoConnection::from_env("https://dev.azure.com/acme", "Web", "SDLC_TEST_MISSING_PAT")
                .unwrap_err();
        assert!(err.to_string().contains("SDLC_TEST_MISSING_PAT"));
    }

    #[test]
    #[serial]
    fn test_blank_env_value_counts_as_missing() {
        env::set_var("SDLC_TEST_BLANK_PAT", "   ");
        assert!(read_env("SDLC_TEST_BLANK_PAT").is_none());
        env::remove_var("SDLC_TEST_BLANK_PAT");
    }

    #[test]
    #[serial]
    fn test_jira_connection_from_env() {
        env::set_var(ENV_JIRA_BASE_URL, "https://jira.example.com/");
        env::set_var(ENV_JIRA_PAT, "secret");
        let conn = JiraConnection::from_env().unwrap();
        assert_eq!(conn.base_url, "https://jira.example.com");
        assert_eq!(conn.token, "secret");
        assert!(!format!("{conn:?}").contains("secret"));
        env::remove_var(ENV_JIRA_BASE_URL);
        env::remove_var(ENV_JIRA_PAT);
    }
}
