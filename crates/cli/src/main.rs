use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::Colorize;
use sdlc_integrations::IntegrationError;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod commands;
mod context;
mod render;
mod settings;
mod ui;

use commands::ado::AdoCommand;
use commands::jira::JiraCommand;
use commands::org::OrgCommand;
use commands::settings::SettingsCommand;
use context::AppContext;
use settings::SettingsStore;

/// SDLC automation for Azure DevOps and JIRA
#[derive(Parser, Debug)]
#[command(
    name = "sdlc",
    version,
    about = "Query Azure DevOps work items and move them into JIRA",
    long_about = "Query Azure DevOps work items with their children, parents, commits and\n\
                  pull requests, create and inspect JIRA issues, and migrate work items\n\
                  from Azure DevOps to JIRA.\n\n\
                  Credentials are read from environment variables (AZURE_DEVOPS_PAT, JIRA_PAT,\n\
                  JIRA_BASE_URL or per-organization variables configured with `sdlc org`)."
)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable debug logging
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Azure DevOps work items
    Ado(AdoCommand),

    /// JIRA issues
    Jira(JiraCommand),

    /// Stored organizations
    Org(OrgCommand),

    /// CLI settings
    Settings(SettingsCommand),
}

fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if verbose {
            EnvFilter::new("warn,sdlc=debug,sdlc_integrations=debug")
        } else {
            EnvFilter::new("warn")
        }
    });

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .with(filter)
        .init();
}

async fn run(cli: Cli) -> Result<()> {
    let store = SettingsStore::default_location()?;
    let settings = store.load()?;
    init_tracing(cli.verbose || settings.verbose_logging);

    let mut ctx = AppContext::new(settings, store);

    let cancel = ctx.cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            cancel.cancel();
        }
    });

    match cli.command {
        Commands::Ado(cmd) => cmd.run(&ctx).await,
        Commands::Jira(cmd) => cmd.run(&ctx).await,
        Commands::Org(cmd) => cmd.run(&mut ctx),
        Commands::Settings(cmd) => cmd.run(&mut ctx),
    }
}

fn report(err: &anyhow::Error) -> ExitCode {
    match err.downcast_ref::<IntegrationError>() {
        Some(IntegrationError::Cancelled) => {
            eprintln!("{}", "Cancelled.".yellow());
            return ExitCode::from(130);
        }
        Some(IntegrationError::Config(_)) => {
            ui::print_error(&format!("Configuration error: {err}"));
            ui::print_info(
                "Set the environment variable named above to your Personal Access Token, \
                 e.g. export AZURE_DEVOPS_PAT=\"your-pat-token\"",
            );
        }
        Some(IntegrationError::Validation(errors)) => {
            ui::print_error("Validation failed:");
            for error in errors {
                ui::print_error(&format!("  • {error}"));
            }
        }
        _ => ui::print_error(&format!("{err:#}")),
    }
    ExitCode::FAILURE
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => report(&err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::ado::AdoSubcommand;
    use crate::commands::jira::JiraSubcommand;
    use crate::commands::settings::SettingsSubcommand;
    use clap::CommandFactory;
    use sdlc_integrations::pm::azure_devops::WorkItemType;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_ado_query_defaults() {
        let cli = Cli::try_parse_from([
            "sdlc",
            "ado",
            "query",
            "--organization",
            "https://dev.azure.com/acme",
            "--project",
            "Web",
            "--load-children",
        ])
        .unwrap();

        let Commands::Ado(AdoCommand {
            command: AdoSubcommand::Query(args),
        }) = cli.command
        else {
            panic!("expected ado query");
        };
        assert_eq!(args.work_item_type, WorkItemType::Feature);
        assert_eq!(args.limit, 10);
        assert_eq!(args.load.max_depth, 1);
        assert!(args.load.options().load_children);
        assert!(!args.load.options().load_commits);
    }

    #[test]
    fn test_ado_query_rejects_unknown_type() {
        let result = Cli::try_parse_from(["sdlc", "ado", "query", "--type", "Bug"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_ado_get_all_with_org() {
        let cli =
            Cli::try_parse_from(["sdlc", "-v", "ado", "get", "--id", "100", "--all", "--org", "acme"])
                .unwrap();
        assert!(cli.verbose);

        let Commands::Ado(AdoCommand {
            command: AdoSubcommand::Get(args),
        }) = cli.command
        else {
            panic!("expected ado get");
        };
        assert_eq!(args.id, 100);
        assert_eq!(args.target.org.org.as_deref(), Some("acme"));
        assert_eq!(args.load.options(), sdlc_integrations::LoadOptions::all());
    }

    #[test]
    fn test_ado_update_requires_field() {
        assert!(Cli::try_parse_from(["sdlc", "ado", "update", "--id", "5"]).is_err());

        let cli = Cli::try_parse_from([
            "sdlc",
            "ado",
            "update",
            "--id",
            "5",
            "--field",
            "System.State=Closed",
            "--field",
            "System.Title=Done",
        ])
        .unwrap();
        let Commands::Ado(AdoCommand {
            command: AdoSubcommand::Update(args),
        }) = cli.command
        else {
            panic!("expected ado update");
        };
        assert_eq!(args.fields.len(), 2);
    }

    #[test]
    fn test_ado_to_jira_defaults_to_story() {
        let cli = Cli::try_parse_from([
            "sdlc",
            "jira",
            "ado-to-jira",
            "--ado-organization",
            "https://dev.azure.com/acme",
            "--ado-project",
            "Web",
            "--work-item-id",
            "100",
            "--jira-project",
            "PROJ",
        ])
        .unwrap();
        let Commands::Jira(JiraCommand {
            command: JiraSubcommand::AdoToJira(args),
        }) = cli.command
        else {
            panic!("expected ado-to-jira");
        };
        assert_eq!(args.jira_issue_type, "Story");
        assert_eq!(args.work_item_id, 100);
    }

    #[test]
    fn test_settings_set_parses_bools() {
        let cli = Cli::try_parse_from(["sdlc", "settings", "set", "--show-timings", "false"]).unwrap();
        let Commands::Settings(SettingsCommand {
            command: SettingsSubcommand::Set { show_timings, .. },
        }) = cli.command
        else {
            panic!("expected settings set");
        };
        assert_eq!(show_timings, Some(false));
    }
}
