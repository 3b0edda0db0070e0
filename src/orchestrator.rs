//! Run sequencing and the single fault boundary of the loader.
//!
//! A run walks `Idle → Authenticating → Running(action) → Reporting → Done`.
//! Any error or panic raised by a collaborator moves the run to `Failed`; the
//! fault is logged with its diagnostic trace, the failure marker is emitted,
//! and the run ends in `Done`. [`Orchestrator::run`] never returns an error
//! and never unwinds into the caller.
use crate::action::Action;
use crate::config::RunConfig;
use crate::log::RunLog;
use crate::report::{self, ReportSection};
use crate::summary::RunSummary;
use anyhow::{Context, Result};
use std::any::Any;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};

/// Collaborator that owns configuration, the identity check, and action execution.
pub trait Controller {
    /// Prepare the run; called once before anything else.
    fn setup_run(&mut self, config: &RunConfig) -> Result<()>;

    /// Select the action configured for this run.
    fn action(&self) -> Result<Action>;

    /// Confirm connectivity and credentials; returns the user id.
    fn current_user(&self) -> Result<String>;

    /// Run the action to completion.
    fn invoke(&mut self, action: Action) -> Result<RunSummary>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Idle,
    Authenticating,
    Running(Action),
    Reporting,
    Done,
    Failed,
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunState::Idle => f.write_str("preparing the run"),
            RunState::Authenticating => f.write_str("authenticating"),
            RunState::Running(action) => write!(f, "running {action}"),
            RunState::Reporting => f.write_str("reporting"),
            RunState::Done => f.write_str("done"),
            RunState::Failed => f.write_str("failed"),
        }
    }
}

/// Run-level fault captured at the boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunFault {
    /// State the run was in when the fault was raised.
    pub stage: RunState,
    pub message: String,
    /// Cause chain, plus a backtrace when `RUST_BACKTRACE` is set.
    pub trace: String,
}

impl RunFault {
    fn from_error(stage: RunState, err: &anyhow::Error) -> Self {
        Self {
            stage,
            message: err.to_string(),
            trace: format!("{err:?}"),
        }
    }

    fn from_panic(stage: RunState, payload: &(dyn Any + Send)) -> Self {
        let detail = payload
            .downcast_ref::<&str>()
            .map(|text| text.to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "non-string panic payload".to_string());
        Self {
            stage,
            message: format!("panicked: {detail}"),
            trace: String::new(),
        }
    }
}

/// Terminal result of one run.
#[derive(Debug)]
pub struct RunOutcome {
    /// Every state the run entered, in order.
    pub states: Vec<RunState>,
    pub result: Result<RunSummary, RunFault>,
}

impl RunOutcome {
    pub fn final_state(&self) -> RunState {
        self.states.last().copied().unwrap_or(RunState::Idle)
    }

    /// True when the run completed and no row failed.
    pub fn is_clean(&self) -> bool {
        matches!(&self.result, Ok(summary) if !summary.has_failures())
    }
}

pub struct Orchestrator<'a> {
    controller: &'a mut dyn Controller,
    log: &'a dyn RunLog,
    config: RunConfig,
    summary_out: Option<PathBuf>,
}

impl<'a> Orchestrator<'a> {
    pub fn new(
        controller: &'a mut dyn Controller,
        log: &'a dyn RunLog,
        config: RunConfig,
    ) -> Self {
        Self {
            controller,
            log,
            config,
            summary_out: None,
        }
    }

    /// Also write the finalized summary as JSON before it is reported.
    pub fn with_summary_out(mut self, path: Option<PathBuf>) -> Self {
        self.summary_out = path;
        self
    }

    pub fn run(mut self) -> RunOutcome {
        let mut states = vec![RunState::Idle];
        let result = panic::catch_unwind(AssertUnwindSafe(|| self.run_stages(&mut states)));
        let stage = states.last().copied().unwrap_or(RunState::Idle);
        let fault = match result {
            Ok(Ok(summary)) => {
                states.push(RunState::Done);
                return RunOutcome {
                    states,
                    result: Ok(summary),
                };
            }
            Ok(Err(err)) => RunFault::from_error(stage, &err),
            Err(payload) => RunFault::from_panic(stage, payload.as_ref()),
        };

        states.push(RunState::Failed);
        tracing::debug!(stage = %fault.stage, "run failed");
        self.emit(&report::render_fault(&fault));
        states.push(RunState::Done);
        RunOutcome {
            states,
            result: Err(fault),
        }
    }

    fn run_stages(&mut self, states: &mut Vec<RunState>) -> Result<RunSummary> {
        self.controller
            .setup_run(&self.config)
            .context("prepare run configuration")?;
        let action = self.controller.action().context("select action")?;

        states.push(RunState::Authenticating);
        self.log.info("Connection Check");
        let user = self
            .controller
            .current_user()
            .context("check connection to herd")?;
        tracing::debug!(user = %user, "identity confirmed");
        self.log.info("Success");

        states.push(RunState::Running(action));
        self.log
            .info(&format!("Running action: {} ({})", action, action.description()));
        let summary = self
            .controller
            .invoke(action)
            .with_context(|| format!("run action {action}"))?;

        states.push(RunState::Reporting);
        if let Some(path) = &self.summary_out {
            // Logged only; the report below still ends the run.
            if let Err(err) = write_summary(path, &summary) {
                self.log
                    .error(&format!("Could not write run summary: {err:#}"));
            }
        }
        self.emit(&report::render(&summary));
        Ok(summary)
    }

    fn emit(&self, sections: &[ReportSection]) {
        for section in sections {
            for line in section.lines() {
                self.log.log(section.severity, &line);
            }
        }
    }
}

fn write_summary(path: &Path, summary: &RunSummary) -> Result<()> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create {}", parent.display()))?;
    }
    let json = serde_json::to_string_pretty(summary).context("serialize run summary")?;
    std::fs::write(path, json).with_context(|| format!("write {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
#[path = "orchestrator_tests.rs"]
mod tests;
