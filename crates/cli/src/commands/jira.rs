//! `sdlc jira` subcommands.

use std::collections::BTreeMap;

use anyhow::{bail, Result};
use clap::{Args, Subcommand};
use sdlc_integrations::migration::issue_from_work_item;
use sdlc_integrations::pm::azure_devops::DEFAULT_MAX_DEPTH;
use sdlc_integrations::pm::jira::{validate_issue, User, STORY_ISSUE_TYPE};
use sdlc_integrations::LoadOptions;
use serde_json::Value;

use super::{ado_client, jira_client, OrgArg};
use crate::context::AppContext;
use crate::ui;

#[derive(Args, Debug)]
pub struct JiraCommand {
    #[command(subcommand)]
    pub command: JiraSubcommand,
}

#[derive(Subcommand, Debug)]
pub enum JiraSubcommand {
    /// Create an issue
    Create(CreateArgs),

    /// Show an issue
    Get(GetArgs),

    /// Copy an Azure DevOps work item into a new JIRA issue
    AdoToJira(AdoToJiraArgs),
}

#[derive(Args, Debug)]
pub struct CreateArgs {
    /// JIRA project key (e.g., PROJ)
    #[arg(long)]
    pub project: String,

    /// Issue type name
    #[arg(long = "type", default_value = STORY_ISSUE_TYPE)]
    pub issue_type: String,

    /// Issue summary
    #[arg(long)]
    pub summary: String,

    /// Issue description
    #[arg(long)]
    pub description: Option<String>,

    /// JIRA instance URL (defaults to the stored organization or JIRA_BASE_URL)
    #[arg(long)]
    pub base_url: Option<String>,

    #[command(flatten)]
    pub org: OrgArg,
}

#[derive(Args, Debug)]
pub struct GetArgs {
    /// Issue key (e.g., PROJ-123)
    #[arg(long)]
    pub key: String,

    /// JIRA instance URL (defaults to the stored organization or JIRA_BASE_URL)
    #[arg(long)]
    pub base_url: Option<String>,

    /// Print the issue as JSON
    #[arg(long)]
    pub json: bool,

    #[command(flatten)]
    pub org: OrgArg,
}

#[derive(Args, Debug)]
pub struct AdoToJiraArgs {
    /// Azure DevOps organization URL (e.g., https://dev.azure.com/your-org)
    #[arg(long)]
    pub ado_organization: Option<String>,

    /// Azure DevOps project name
    #[arg(long)]
    pub ado_project: Option<String>,

    /// Azure DevOps work item ID
    #[arg(long)]
    pub work_item_id: i32,

    /// Target JIRA project key
    #[arg(long)]
    pub jira_project: String,

    /// Target JIRA issue type
    #[arg(long, default_value = STORY_ISSUE_TYPE)]
    pub jira_issue_type: String,

    /// JIRA instance URL (defaults to the stored organization or JIRA_BASE_URL)
    #[arg(long)]
    pub jira_base_url: Option<String>,

    #[command(flatten)]
    pub org: OrgArg,
}

impl JiraCommand {
    pub async fn run(self, ctx: &AppContext) -> Result<()> {
        match self.command {
            JiraSubcommand::Create(args) => create(ctx, args).await,
            JiraSubcommand::Get(args) => get(ctx, args).await,
            JiraSubcommand::AdoToJira(args) => ado_to_jira(ctx, args).await,
        }
    }
}

fn user_label(user: &User) -> &str {
    user.display_name
        .as_deref()
        .or(user.name.as_deref())
        .unwrap_or("(unknown)")
}

async fn create(ctx: &AppContext, args: CreateArgs) -> Result<()> {
    let client = jira_client(ctx, &args.org, args.base_url.as_deref())?;

    let created = ctx
        .step(
            &format!("Creating {} in {}", args.issue_type, args.project),
            client.create_issue_with(
                &args.project,
                &args.issue_type,
                &args.summary,
                args.description.as_deref(),
                BTreeMap::new(),
            ),
        )
        .await?;

    ui::print_success(&format!("Created JIRA issue: {}", created.key));
    ui::print_field("URL", &created.self_url);
    Ok(())
}

async fn get(ctx: &AppContext, args: GetArgs) -> Result<()> {
    let client = jira_client(ctx, &args.org, args.base_url.as_deref())?;

    let issue = ctx
        .step(&format!("Fetching {}", args.key), client.get_issue(&args.key))
        .await?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&issue)?);
        return Ok(());
    }

    let fields = &issue.fields;
    ui::print_section(issue.key.as_deref().unwrap_or(&args.key));
    ui::print_field("Summary", fields.summary.as_deref().unwrap_or("(no summary)"));
    ui::print_field(
        "Type",
        fields
            .issue_type
            .as_ref()
            .and_then(|t| t.name.as_deref())
            .unwrap_or("-"),
    );
    ui::print_field(
        "Status",
        fields
            .custom_fields
            .get("status")
            .and_then(|s| s.get("name"))
            .and_then(Value::as_str)
            .unwrap_or("-"),
    );
    ui::print_field(
        "Assignee",
        fields.assignee.as_ref().map_or("(unassigned)", user_label),
    );
    if let Some(description) = fields.description.as_deref().filter(|d| !d.is_empty()) {
        println!();
        println!("{description}");
    }
    Ok(())
}

async fn ado_to_jira(ctx: &AppContext, args: AdoToJiraArgs) -> Result<()> {
    let ado = ado_client(
        ctx,
        &args.org,
        args.ado_organization.as_deref(),
        args.ado_project.as_deref(),
        DEFAULT_MAX_DEPTH,
    )?;
    let jira = jira_client(ctx, &args.org, args.jira_base_url.as_deref())?;

    let work_item = ctx
        .step(
            &format!("Fetching work item {}", args.work_item_id),
            ado.get_work_item_model(args.work_item_id, LoadOptions::none(), &ctx.cancel),
        )
        .await?;

    ui::print_success(&format!(
        "Retrieved work item: {}",
        work_item.title.as_deref().unwrap_or("(no title)")
    ));
    ui::print_field("Type", work_item.work_item_type.as_deref().unwrap_or("-"));
    ui::print_field("State", work_item.state.as_deref().unwrap_or("-"));
    ui::print_field(
        "Assigned To",
        work_item.assigned_to.as_deref().unwrap_or("(unassigned)"),
    );

    let user = ctx
        .step("Getting current JIRA user", jira.get_current_user())
        .await?;
    ui::print_field("JIRA user", user_label(&user));

    let issue = issue_from_work_item(&work_item, &args.jira_project, &args.jira_issue_type, &user);
    let errors = validate_issue(&issue);
    if !errors.is_empty() {
        ui::print_error("JIRA issue validation failed:");
        for error in &errors {
            ui::print_error(&format!("  • {error}"));
        }
        bail!("Issue for work item {} is not valid", args.work_item_id);
    }

    let created = ctx
        .step(
            &format!("Creating JIRA {} in {}", args.jira_issue_type, args.jira_project),
            jira.create_issue(&issue),
        )
        .await?;

    ui::print_success(&format!("Created JIRA issue: {}", created.key));
    ui::print_field("URL", &created.self_url);
    ui::print_field("Assignee", user_label(&user));
    ui::print_field("Reporter", user_label(&user));
    Ok(())
}
