//! Command handlers.

pub mod ado;
pub mod jira;
pub mod org;
pub mod settings;

use anyhow::{Context, Result};
use clap::Args;
use sdlc_integrations::config::{read_env, ENV_AZURE_DEVOPS_PAT, ENV_JIRA_BASE_URL, ENV_JIRA_PAT};
use sdlc_integrations::{AdoConnection, AzureDevOpsClient, JiraClient, JiraConnection};

use crate::context::AppContext;

/// Stored organization to fill in missing connection values.
#[derive(Args, Debug, Clone, Default)]
pub struct OrgArg {
    /// Stored organization name (defaults to the default organization)
    #[arg(long = "org", value_name = "NAME")]
    pub org: Option<String>,
}

/// Build an Azure DevOps client from explicit values, falling back to the
/// stored organization.
pub fn ado_client(
    ctx: &AppContext,
    org: &OrgArg,
    organization_url: Option<&str>,
    project: Option<&str>,
    max_depth: usize,
) -> Result<AzureDevOpsClient> {
    let stored = ctx.organization(org.org.as_deref())?;
    let ado = stored.and_then(|o| o.azure_devops.as_ref());

    let url = organization_url
        .map(str::to_string)
        .or_else(|| ado.and_then(|a| a.organization_url.clone()))
        .context("Azure DevOps organization URL is required (--organization, or `sdlc org set-ado`)")?;
    let project = project
        .map(str::to_string)
        .or_else(|| ado.and_then(|a| a.default_project.clone()))
        .context("Azure DevOps project is required (--project, or `sdlc org set-ado --default-project`)")?;
    let pat_env = ado
        .map(|a| a.pat_environment_variable.as_str())
        .filter(|v| !v.is_empty())
        .unwrap_or(ENV_AZURE_DEVOPS_PAT);

    let connection = AdoConnection::from_env(url, project, pat_env)?;
    Ok(AzureDevOpsClient::new(connection)?.with_max_depth(max_depth))
}

/// Build a JIRA client, taking the base URL from the argument, the stored
/// organization or `JIRA_BASE_URL`, in that order.
pub fn jira_client(ctx: &AppContext, org: &OrgArg, base_url: Option<&str>) -> Result<JiraClient> {
    let stored = ctx.organization(org.org.as_deref())?;
    let jira = stored.and_then(|o| o.jira.as_ref());

    let base_url = base_url
        .map(str::to_string)
        .or_else(|| jira.and_then(|j| j.base_url.clone()))
        .or_else(|| read_env(ENV_JIRA_BASE_URL))
        .with_context(|| {
            format!("JIRA base URL is required (--base-url, `sdlc org set-jira`, or {ENV_JIRA_BASE_URL})")
        })?;
    let pat_env = jira
        .map(|j| j.pat_environment_variable.as_str())
        .filter(|v| !v.is_empty())
        .unwrap_or(ENV_JIRA_PAT);

    let connection = JiraConnection::from_env_token(base_url, pat_env)?;
    Ok(JiraClient::new(connection)?)
}
