//! `sdlc settings` subcommands.

use anyhow::{bail, Result};
use clap::{Args, Subcommand};
use dialoguer::{theme::ColorfulTheme, Confirm};

use crate::context::AppContext;
use crate::settings::CliSettings;
use crate::ui;

#[derive(Args, Debug)]
pub struct SettingsCommand {
    #[command(subcommand)]
    pub command: SettingsSubcommand,
}

#[derive(Subcommand, Debug)]
pub enum SettingsSubcommand {
    /// Show current settings
    Show,

    /// Change settings
    Set {
        /// Organization used when --org is omitted
        #[arg(long)]
        default_org: Option<String>,

        /// Debug logging for every command
        #[arg(long, value_name = "BOOL")]
        verbose_logging: Option<bool>,

        /// Report how long each step took
        #[arg(long, value_name = "BOOL")]
        show_timings: Option<bool>,
    },

    /// Reset settings to defaults
    Reset {
        /// Skip the confirmation prompt
        #[arg(long, short = 'y')]
        yes: bool,
    },
}

impl SettingsCommand {
    pub fn run(self, ctx: &mut AppContext) -> Result<()> {
        match self.command {
            SettingsSubcommand::Show => {
                show(ctx);
                Ok(())
            }
            SettingsSubcommand::Set {
                default_org,
                verbose_logging,
                show_timings,
            } => set(ctx, default_org, verbose_logging, show_timings),
            SettingsSubcommand::Reset { yes } => reset(ctx, yes),
        }
    }
}

fn show(ctx: &AppContext) {
    let settings = &ctx.settings;
    ui::print_section("Settings");
    ui::print_field("File", &ctx.store.path().display().to_string());
    ui::print_field(
        "Default organization",
        settings.default_organization.as_deref().unwrap_or("(none)"),
    );
    ui::print_field("Verbose logging", &ui::yes_no(settings.verbose_logging));
    ui::print_field("Show timings", &ui::yes_no(settings.show_timings));
    ui::print_field("Organizations", &settings.organizations.len().to_string());
    ui::print_field("Created", &settings.created_at.to_rfc3339());
    ui::print_field("Updated", &settings.updated_at.to_rfc3339());
}

fn set(
    ctx: &mut AppContext,
    default_org: Option<String>,
    verbose_logging: Option<bool>,
    show_timings: Option<bool>,
) -> Result<()> {
    if default_org.is_none() && verbose_logging.is_none() && show_timings.is_none() {
        bail!("Nothing to change. Pass --default-org, --verbose-logging or --show-timings.");
    }

    if let Some(name) = default_org {
        let Some(org) = ctx.settings.organization(&name) else {
            bail!("Organization '{name}' not found");
        };
        ctx.settings.default_organization = Some(org.name.clone());
    }
    if let Some(verbose) = verbose_logging {
        ctx.settings.verbose_logging = verbose;
    }
    if let Some(timings) = show_timings {
        ctx.settings.show_timings = timings;
    }

    ctx.save_settings()?;
    ui::print_success("Settings updated");
    Ok(())
}

fn reset(ctx: &mut AppContext, yes: bool) -> Result<()> {
    if !yes {
        let confirmed = Confirm::with_theme(&ColorfulTheme::default())
            .with_prompt("Reset all settings, including organizations?")
            .default(false)
            .interact()?;
        if !confirmed {
            ui::print_info("Reset cancelled.");
            return Ok(());
        }
    }

    ctx.settings = CliSettings::default();
    ctx.save_settings()?;
    ui::print_success("Settings reset to defaults");
    Ok(())
}
