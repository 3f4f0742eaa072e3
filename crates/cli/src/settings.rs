//! Persisted CLI settings (`~/.sdlc/settings.json`).

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::ui;

const SETTINGS_DIR: &str = ".sdlc";
const SETTINGS_FILE: &str = "settings.json";

/// User-level settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CliSettings {
    pub organizations: Vec<OrganizationConfig>,
    pub default_organization: Option<String>,
    pub verbose_logging: bool,
    pub show_timings: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Default for CliSettings {
    fn default() -> Self {
        let now = Utc::now();
        Self {
            organizations: Vec::new(),
            default_organization: None,
            verbose_logging: false,
            show_timings: true,
            created_at: now,
            updated_at: now,
        }
    }
}

impl CliSettings {
    /// Organization by name, ignoring case.
    #[must_use]
    pub fn organization(&self, name: &str) -> Option<&OrganizationConfig> {
        self.organizations
            .iter()
            .find(|o| o.name.eq_ignore_ascii_case(name))
    }

    pub fn organization_mut(&mut self, name: &str) -> Option<&mut OrganizationConfig> {
        self.organizations
            .iter_mut()
            .find(|o| o.name.eq_ignore_ascii_case(name))
    }

    /// The default organization, if one is set and still exists.
    #[must_use]
    pub fn default_org(&self) -> Option<&OrganizationConfig> {
        self.default_organization
            .as_deref()
            .and_then(|name| self.organization(name))
    }

    /// Whether `name` is the default organization.
    #[must_use]
    pub fn is_default(&self, name: &str) -> bool {
        self.default_organization
            .as_deref()
            .is_some_and(|d| d.eq_ignore_ascii_case(name))
    }

    /// Remove an organization, clearing the default if it pointed there.
    /// Returns whether anything was removed.
    pub fn remove_organization(&mut self, name: &str) -> bool {
        let before = self.organizations.len();
        self.organizations
            .retain(|o| !o.name.eq_ignore_ascii_case(name));
        let removed = self.organizations.len() != before;
        if removed && self.is_default(name) {
            self.default_organization = None;
        }
        removed
    }
}

/// A named bundle of tracker settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrganizationConfig {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub github: Option<GitHubConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jira: Option<JiraConfig>,
    #[serde(
        rename = "azureDevOps",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub azure_devops: Option<AzureDevOpsConfig>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl OrganizationConfig {
    pub fn new(name: impl Into<String>, description: Option<String>) -> Self {
        let now = Utc::now();
        Self {
            name: name.into(),
            description,
            github: None,
            jira: None,
            azure_devops: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    /// Default PAT variable for `service`, e.g. `ACME_JIRA_PAT`.
    #[must_use]
    pub fn default_pat_env(&self, service: &str) -> String {
        let prefix: String = self
            .name
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_uppercase() } else { '_' })
            .collect();
        format!("{prefix}_{service}_PAT")
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GitHubConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organization: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    #[serde(default)]
    pub pat_environment_variable: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JiraConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    #[serde(default)]
    pub pat_environment_variable: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AzureDevOpsConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organization_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_project: Option<String>,
    #[serde(default)]
    pub pat_environment_variable: String,
}

/// Reads and writes [`CliSettings`] as JSON.
#[derive(Debug, Clone)]
pub struct SettingsStore {
    path: PathBuf,
}

impl SettingsStore {
    /// Store at `~/.sdlc/settings.json`.
    pub fn default_location() -> Result<Self> {
        let home = dirs::home_dir().context("Could not determine home directory")?;
        Ok(Self::at(home.join(SETTINGS_DIR).join(SETTINGS_FILE)))
    }

    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load settings. A missing file yields defaults; so does a corrupt
    /// one, with a warning.
    pub fn load(&self) -> Result<CliSettings> {
        if !self.path.exists() {
            return Ok(CliSettings::default());
        }

        let json = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read {}", self.path.display()))?;

        match serde_json::from_str(&json) {
            Ok(settings) => Ok(settings),
            Err(e) => {
                ui::print_warning(&format!(
                    "Settings file {} is unreadable ({e}); using defaults",
                    self.path.display()
                ));
                Ok(CliSettings::default())
            }
        }
    }

    /// Write settings, stamping `updated_at`.
    pub fn save(&self, settings: &mut CliSettings) -> Result<()> {
        settings.updated_at = Utc::now();

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }

        let json = serde_json::to_string_pretty(settings)?;
        fs::write(&self.path, json)
            .with_context(|| format!("Failed to write {}", self.path.display()))?;
        debug!(path = %self.path.display(), "Saved settings");
        Ok(())
    }
}
