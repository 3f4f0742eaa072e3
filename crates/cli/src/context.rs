//! Per-invocation command context.

use std::future::Future;
use std::time::{Duration, Instant};

use anyhow::{bail, Result};
use sdlc_integrations::cancel::guarded;
use sdlc_integrations::IntegrationResult;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::settings::{CliSettings, OrganizationConfig, SettingsStore};
use crate::ui;

/// State shared by every command handler for one run of the binary.
pub struct AppContext {
    started: Instant,
    pub settings: CliSettings,
    pub store: SettingsStore,
    pub cancel: CancellationToken,
}

impl AppContext {
    pub fn new(settings: CliSettings, store: SettingsStore) -> Self {
        Self {
            started: Instant::now(),
            settings,
            store,
            cancel: CancellationToken::new(),
        }
    }

    /// Time since the command started.
    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    /// Persist the current settings.
    pub fn save_settings(&mut self) -> Result<()> {
        self.store.save(&mut self.settings)
    }

    /// Organization named on the command line, else the default one.
    ///
    /// Naming an unknown organization is an error; having no default is not.
    pub fn organization(&self, name: Option<&str>) -> Result<Option<&OrganizationConfig>> {
        match name {
            Some(name) => match self.settings.organization(name) {
                Some(org) => Ok(Some(org)),
                None => bail!("Organization '{name}' not found. Run `sdlc org list` to see configured organizations."),
            },
            None => Ok(self.settings.default_org()),
        }
    }

    /// Run one network step behind a spinner, honouring Ctrl-C, and report
    /// its duration when timings are enabled.
    pub async fn step<T, F>(&self, message: &str, fut: F) -> Result<T>
    where
        F: Future<Output = IntegrationResult<T>>,
    {
        let spinner = ui::spinner(message);
        let step_started = Instant::now();
        let result = guarded(&self.cancel, fut).await;
        spinner.finish_and_clear();
        debug!(
            step = message,
            elapsed_ms = step_started.elapsed().as_millis(),
            ok = result.is_ok(),
            "Step finished"
        );

        let value = result?;
        if self.settings.show_timings {
            ui::print_timing(message, step_started.elapsed(), self.elapsed());
        }
        Ok(value)
    }
}
