//! `sdlc org` subcommands.

use anyhow::{bail, Context, Result};
use clap::{Args, Subcommand};
use colored::Colorize;
use sdlc_integrations::config::read_env;

use crate::context::AppContext;
use crate::render;
use crate::settings::{AzureDevOpsConfig, GitHubConfig, JiraConfig, OrganizationConfig};
use crate::ui;

#[derive(Args, Debug)]
pub struct OrgCommand {
    #[command(subcommand)]
    pub command: OrgSubcommand,
}

#[derive(Subcommand, Debug)]
pub enum OrgSubcommand {
    /// Add a new organization
    Add {
        /// Organization name
        #[arg(long)]
        name: String,

        /// Organization description
        #[arg(long)]
        description: Option<String>,
    },

    /// List all organizations
    List,

    /// Show organization details
    Show {
        /// Organization name
        #[arg(long)]
        name: String,
    },

    /// Remove an organization
    Remove {
        /// Organization name
        #[arg(long)]
        name: String,
    },

    /// Configure GitHub settings for an organization
    SetGithub {
        /// Organization name
        #[arg(long)]
        name: String,

        /// GitHub organization
        #[arg(long)]
        organization: Option<String>,

        /// GitHub base URL (for GitHub Enterprise)
        #[arg(long)]
        base_url: Option<String>,

        /// Environment variable holding the PAT (default: <NAME>_GITHUB_PAT)
        #[arg(long)]
        pat_env: Option<String>,
    },

    /// Configure JIRA settings for an organization
    SetJira {
        /// Organization name
        #[arg(long)]
        name: String,

        /// JIRA instance URL
        #[arg(long)]
        base_url: Option<String>,

        /// Environment variable holding the PAT (default: <NAME>_JIRA_PAT)
        #[arg(long)]
        pat_env: Option<String>,
    },

    /// Configure Azure DevOps settings for an organization
    SetAdo {
        /// Organization name
        #[arg(long)]
        name: String,

        /// Azure DevOps organization URL
        #[arg(long)]
        organization_url: Option<String>,

        /// Project used when --project is omitted
        #[arg(long)]
        default_project: Option<String>,

        /// Environment variable holding the PAT (default: <NAME>_AZURE_DEVOPS_PAT)
        #[arg(long)]
        pat_env: Option<String>,
    },
}

impl OrgCommand {
    pub fn run(self, ctx: &mut AppContext) -> Result<()> {
        match self.command {
            OrgSubcommand::Add { name, description } => add(ctx, name, description),
            OrgSubcommand::List => {
                list(ctx);
                Ok(())
            }
            OrgSubcommand::Show { name } => show(ctx, &name),
            OrgSubcommand::Remove { name } => remove(ctx, &name),
            OrgSubcommand::SetGithub {
                name,
                organization,
                base_url,
                pat_env,
            } => update(ctx, &name, "GitHub", |org| {
                let default_env = org.default_pat_env("GITHUB");
                let github = org.github.get_or_insert_with(GitHubConfig::default);
                merge(&mut github.organization, organization);
                merge(&mut github.base_url, base_url);
                set_pat_env(&mut github.pat_environment_variable, pat_env, default_env);
            }),
            OrgSubcommand::SetJira {
                name,
                base_url,
                pat_env,
            } => update(ctx, &name, "JIRA", |org| {
                let default_env = org.default_pat_env("JIRA");
                let jira = org.jira.get_or_insert_with(JiraConfig::default);
                merge(&mut jira.base_url, base_url);
                set_pat_env(&mut jira.pat_environment_variable, pat_env, default_env);
            }),
            OrgSubcommand::SetAdo {
                name,
                organization_url,
                default_project,
                pat_env,
            } => update(ctx, &name, "Azure DevOps", |org| {
                let default_env = org.default_pat_env("AZURE_DEVOPS");
                let ado = org
                    .azure_devops
                    .get_or_insert_with(AzureDevOpsConfig::default);
                merge(&mut ado.organization_url, organization_url);
                merge(&mut ado.default_project, default_project);
                set_pat_env(&mut ado.pat_environment_variable, pat_env, default_env);
            }),
        }
    }
}

fn merge(slot: &mut Option<String>, value: Option<String>) {
    if value.is_some() {
        *slot = value;
    }
}

fn set_pat_env(slot: &mut String, value: Option<String>, default: String) {
    if let Some(value) = value {
        *slot = value;
    } else if slot.is_empty() {
        *slot = default;
    }
}

fn add(ctx: &mut AppContext, name: String, description: Option<String>) -> Result<()> {
    if name.trim().is_empty() {
        bail!("Organization name cannot be empty");
    }
    if ctx.settings.organization(&name).is_some() {
        bail!("Organization '{name}' already exists");
    }

    ctx.settings
        .organizations
        .push(OrganizationConfig::new(name.clone(), description));
    ctx.save_settings()?;

    ui::print_success(&format!("Added organization '{name}'"));
    Ok(())
}

fn list(ctx: &AppContext) {
    if ctx.settings.organizations.is_empty() {
        ui::print_info("No organizations configured. Add one with `sdlc org add --name <NAME>`.");
        return;
    }
    println!("{}", render::organization_table(&ctx.settings));
}

fn pat_status(var: &str) -> String {
    if read_env(var).is_some() {
        format!("{var} ({})", "set".green())
    } else {
        format!("{var} ({})", "not set".red())
    }
}

fn show(ctx: &AppContext, name: &str) -> Result<()> {
    let org = ctx
        .settings
        .organization(name)
        .with_context(|| format!("Organization '{name}' not found"))?;

    ui::print_section(&org.name);
    if let Some(description) = &org.description {
        ui::print_field("Description", description);
    }
    ui::print_field("Default", &ui::yes_no(ctx.settings.is_default(&org.name)));
    ui::print_field("Created", &org.created_at.to_rfc3339());
    ui::print_field("Updated", &org.updated_at.to_rfc3339());

    if let Some(github) = &org.github {
        println!();
        println!("{}", "GitHub".bold());
        if let Some(organization) = &github.organization {
            ui::print_field("Organization", organization);
        }
        if let Some(base_url) = &github.base_url {
            ui::print_field("Base URL", base_url);
        }
        ui::print_field("PAT", &pat_status(&github.pat_environment_variable));
    }

    if let Some(jira) = &org.jira {
        println!();
        println!("{}", "JIRA".bold());
        if let Some(base_url) = &jira.base_url {
            ui::print_field("Base URL", base_url);
        }
        ui::print_field("PAT", &pat_status(&jira.pat_environment_variable));
    }

    if let Some(ado) = &org.azure_devops {
        println!();
        println!("{}", "Azure DevOps".bold());
        if let Some(url) = &ado.organization_url {
            ui::print_field("Organization URL", url);
        }
        if let Some(project) = &ado.default_project {
            ui::print_field("Default project", project);
        }
        ui::print_field("PAT", &pat_status(&ado.pat_environment_variable));
    }

    Ok(())
}

fn remove(ctx: &mut AppContext, name: &str) -> Result<()> {
    if !ctx.settings.remove_organization(name) {
        bail!("Organization '{name}' not found");
    }
    ctx.save_settings()?;
    ui::print_success(&format!("Removed organization '{name}'"));
    Ok(())
}

fn update(
    ctx: &mut AppContext,
    name: &str,
    service: &str,
    apply: impl FnOnce(&mut OrganizationConfig),
) -> Result<()> {
    let org = ctx
        .settings
        .organization_mut(name)
        .with_context(|| format!("Organization '{name}' not found"))?;
    apply(org);
    org.touch();
    ctx.save_settings()?;

    ui::print_success(&format!("Updated {service} settings for '{name}'"));
    Ok(())
}
