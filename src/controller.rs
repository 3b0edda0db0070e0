//! The herd-backed controller used by the CLI.
//!
//! Loading the config is deferred to [`Controller::setup_run`] so that a
//! missing or invalid config file is a run fault reported by the
//! orchestrator, not a crash before the run starts.
use crate::action::Action;
use crate::config::{self, ConfigOverrides, LoaderConfig, RunConfig};
use crate::herd::{HerdApi, HerdClient};
use crate::orchestrator::Controller;
use crate::rows;
use crate::summary::RunSummary;
use anyhow::{anyhow, Result};
use std::path::PathBuf;

struct PreparedRun {
    config: LoaderConfig,
    client: HerdClient,
}

pub struct HerdController {
    config_flag: Option<PathBuf>,
    overrides: ConfigOverrides,
    prepared: Option<PreparedRun>,
}

impl HerdController {
    pub fn new(config_flag: Option<PathBuf>, overrides: ConfigOverrides) -> Self {
        Self {
            config_flag,
            overrides,
            prepared: None,
        }
    }

    fn prepared(&self) -> Result<&PreparedRun> {
        self.prepared
            .as_ref()
            .ok_or_else(|| anyhow!("run has not been prepared"))
    }
}

impl Controller for HerdController {
    fn setup_run(&mut self, run: &RunConfig) -> Result<()> {
        let path = config::resolve_config_path(self.config_flag.as_deref())?;
        let mut config = config::load_config(&path)?;
        config::apply_overrides(&mut config, &config::env_overrides());
        config::apply_overrides(&mut config, &self.overrides);
        config::validate_config(&config)?;
        tracing::debug!(
            config = %path.display(),
            gui_enabled = run.gui_enabled,
            action = %config.action,
            rows_file = %config.rows_file.display(),
            "run prepared"
        );
        let client = HerdClient::new(
            &config.base_url,
            &config.username,
            config.password.as_deref(),
        );
        self.prepared = Some(PreparedRun { config, client });
        Ok(())
    }

    fn action(&self) -> Result<Action> {
        self.prepared()?.config.action.parse()
    }

    fn current_user(&self) -> Result<String> {
        let user = self.prepared()?.client.current_user()?;
        Ok(user.user_id)
    }

    fn invoke(&mut self, action: Action) -> Result<RunSummary> {
        let prepared = self.prepared()?;
        let rows = rows::load_rows(&prepared.config.rows_file)?;
        action.run(&prepared.client, &rows)
    }
}
