//! `sdlc ado` subcommands.

use std::collections::BTreeMap;

use anyhow::Result;
use clap::{Args, Subcommand};
use sdlc_integrations::pm::azure_devops::{WorkItemType, DEFAULT_MAX_DEPTH};
use sdlc_integrations::LoadOptions;
use serde_json::Value;

use super::{ado_client, OrgArg};
use crate::context::AppContext;
use crate::render;
use crate::ui;

#[derive(Args, Debug)]
pub struct AdoCommand {
    #[command(subcommand)]
    pub command: AdoSubcommand,
}

#[derive(Subcommand, Debug)]
pub enum AdoSubcommand {
    /// Query work items of one type
    Query(QueryArgs),

    /// Show one work item with its related items
    Get(GetArgs),

    /// Set fields on a work item
    Update(UpdateArgs),
}

/// Where to find the Azure DevOps project.
#[derive(Args, Debug, Clone, Default)]
pub struct AdoTarget {
    /// Azure DevOps organization URL (e.g., https://dev.azure.com/your-org)
    #[arg(long)]
    pub organization: Option<String>,

    /// Azure DevOps project name
    #[arg(long)]
    pub project: Option<String>,

    #[command(flatten)]
    pub org: OrgArg,
}

/// Which related items to load.
#[derive(Args, Debug, Clone)]
#[allow(clippy::struct_excessive_bools)]
pub struct LoadArgs {
    /// Load child work items
    #[arg(long)]
    pub load_children: bool,

    /// Load parent work items
    #[arg(long)]
    pub load_parents: bool,

    /// Load linked commits
    #[arg(long)]
    pub load_commits: bool,

    /// Load linked pull requests
    #[arg(long)]
    pub load_pull_requests: bool,

    /// Load everything
    #[arg(long)]
    pub all: bool,

    /// Levels below the root that expand their own relations
    #[arg(long, default_value_t = DEFAULT_MAX_DEPTH)]
    pub max_depth: usize,
}

impl LoadArgs {
    pub fn options(&self) -> LoadOptions {
        if self.all {
            return LoadOptions::all();
        }
        LoadOptions {
            load_children: self.load_children,
            load_parents: self.load_parents,
            load_commits: self.load_commits,
            load_pull_requests: self.load_pull_requests,
        }
    }
}

#[derive(Args, Debug)]
pub struct QueryArgs {
    #[command(flatten)]
    pub target: AdoTarget,

    /// Work item type: Feature, Epic, Story or Task
    #[arg(long = "type", default_value = "Feature")]
    pub work_item_type: WorkItemType,

    #[command(flatten)]
    pub load: LoadArgs,

    /// Rows to show in the table
    #[arg(long, default_value_t = 10)]
    pub limit: usize,

    /// Print every result as JSON instead of a table
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct GetArgs {
    #[command(flatten)]
    pub target: AdoTarget,

    /// Work item ID
    #[arg(long)]
    pub id: i32,

    #[command(flatten)]
    pub load: LoadArgs,

    /// Print the work item as JSON instead of a tree
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct UpdateArgs {
    #[command(flatten)]
    pub target: AdoTarget,

    /// Work item ID
    #[arg(long)]
    pub id: i32,

    /// Field to set, as `Reference.Name=value` (repeatable)
    #[arg(long = "field", value_name = "NAME=VALUE", value_parser = parse_field, required = true)]
    pub fields: Vec<(String, String)>,
}

fn parse_field(raw: &str) -> Result<(String, String), String> {
    let (name, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=VALUE, got '{raw}'"))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(format!("field name missing in '{raw}'"));
    }
    Ok((name.to_string(), value.to_string()))
}

impl AdoCommand {
    pub async fn run(self, ctx: &AppContext) -> Result<()> {
        match self.command {
            AdoSubcommand::Query(args) => query(ctx, args).await,
            AdoSubcommand::Get(args) => get(ctx, args).await,
            AdoSubcommand::Update(args) => update(ctx, args).await,
        }
    }
}

async fn query(ctx: &AppContext, args: QueryArgs) -> Result<()> {
    let client = ado_client(
        ctx,
        &args.target.org,
        args.target.organization.as_deref(),
        args.target.project.as_deref(),
        args.load.max_depth,
    )?;
    let options = args.load.options();

    let models = ctx
        .step(
            &format!("Querying {} work items in {}", args.work_item_type, client.project()),
            client.query_work_item_models_by_type(args.work_item_type, options, &ctx.cancel),
        )
        .await?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&models)?);
        return Ok(());
    }

    if models.is_empty() {
        ui::print_warning(&format!("No {} work items found.", args.work_item_type));
        return Ok(());
    }

    ui::print_success(&format!(
        "Found {} {} work items",
        models.len(),
        args.work_item_type
    ));
    println!("{}", render::work_item_table(&models, options, args.limit));
    if models.len() > args.limit {
        ui::print_info(&format!(
            "Showing first {} of {} results",
            args.limit,
            models.len()
        ));
    }
    Ok(())
}

async fn get(ctx: &AppContext, args: GetArgs) -> Result<()> {
    let client = ado_client(
        ctx,
        &args.target.org,
        args.target.organization.as_deref(),
        args.target.project.as_deref(),
        args.load.max_depth,
    )?;

    let model = ctx
        .step(
            &format!("Fetching work item {}", args.id),
            client.get_work_item_model(args.id, args.load.options(), &ctx.cancel),
        )
        .await?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&model)?);
    } else {
        println!();
        for line in render::work_item_tree(&model) {
            println!("{line}");
        }
    }
    Ok(())
}

async fn update(ctx: &AppContext, args: UpdateArgs) -> Result<()> {
    let client = ado_client(
        ctx,
        &args.target.org,
        args.target.organization.as_deref(),
        args.target.project.as_deref(),
        DEFAULT_MAX_DEPTH,
    )?;

    let fields: BTreeMap<String, Value> = args
        .fields
        .into_iter()
        .map(|(name, value)| (name, Value::String(value)))
        .collect();

    let updated = ctx
        .step(
            &format!("Updating work item {}", args.id),
            client.update_work_item(args.id, &fields),
        )
        .await?;

    ui::print_success(&format!(
        "Updated work item {} (revision {})",
        updated.id,
        updated
            .rev
            .map_or_else(|| "unknown".to_string(), |r| r.to_string())
    ));
    for name in fields.keys() {
        ui::print_field(name, &updated.fields.get(name).map_or_else(String::new, display_value));
    }
    Ok(())
}

fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
