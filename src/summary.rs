//! Run summary data model and the aggregator that builds it.
//!
//! Actions report one [`RowOutcome`] at a time while they walk their rows.
//! [`SummaryBuilder`] folds those outcomes into a [`RunSummary`] and checks the
//! count invariants when the run is finalized, so the reporter can trust what
//! it renders.
use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Classification of one row produced by an action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowOutcome {
    Success(usize),
    Warning(usize, String),
    Error(usize, String),
    /// The row succeeded and altered existing state on the service.
    Change(usize, String),
}

impl RowOutcome {
    pub fn index(&self) -> usize {
        match self {
            RowOutcome::Success(index)
            | RowOutcome::Warning(index, _)
            | RowOutcome::Error(index, _)
            | RowOutcome::Change(index, _) => *index,
        }
    }
}

/// A row index paired with the message reported for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowMessage {
    pub index: usize,
    pub message: String,
}

impl RowMessage {
    fn new(index: usize, message: String) -> Self {
        Self { index, message }
    }
}

/// Aggregate result of one action invocation.
///
/// Only [`SummaryBuilder::finalize`] constructs a summary outside of tests, so
/// a value of this type always satisfies the count invariants.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    pub total_rows: usize,
    pub success_rows: usize,
    pub fail_rows: usize,
    pub fail_index: BTreeSet<usize>,
    pub errors: Vec<RowMessage>,
    pub warnings: Vec<RowMessage>,
    pub changes: Vec<RowMessage>,
}

impl RunSummary {
    pub fn has_failures(&self) -> bool {
        self.fail_rows > 0
    }
}

/// Accumulates row outcomes in the order the action produces them.
#[derive(Debug, Default)]
pub struct SummaryBuilder {
    summary: RunSummary,
    succeeded: BTreeSet<usize>,
}

impl SummaryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one outcome. A rejected outcome leaves the builder unchanged.
    pub fn record(&mut self, outcome: RowOutcome) -> Result<()> {
        let index = outcome.index();
        match outcome {
            RowOutcome::Success(_) => {
                self.ensure_unsettled(index)?;
                self.succeeded.insert(index);
                self.summary.total_rows += 1;
                self.summary.success_rows += 1;
            }
            RowOutcome::Error(_, message) => {
                self.ensure_unsettled(index)?;
                if self.has_annotations(index) {
                    return Err(anyhow!(
                        "row {index} already has warnings or changes and cannot fail"
                    ));
                }
                self.summary.fail_index.insert(index);
                self.summary.total_rows += 1;
                self.summary.fail_rows += 1;
                self.summary.errors.push(RowMessage::new(index, message));
            }
            RowOutcome::Warning(_, message) => {
                self.ensure_not_failed(index, "warning")?;
                self.summary.warnings.push(RowMessage::new(index, message));
            }
            RowOutcome::Change(_, message) => {
                self.ensure_not_failed(index, "change")?;
                self.summary.changes.push(RowMessage::new(index, message));
            }
        }
        Ok(())
    }

    /// Record every outcome from an iterator, stopping at the first rejection.
    pub fn extend<I>(&mut self, outcomes: I) -> Result<()>
    where
        I: IntoIterator<Item = RowOutcome>,
    {
        for outcome in outcomes {
            self.record(outcome)?;
        }
        Ok(())
    }

    /// Close the run and hand back the summary.
    ///
    /// Fails when a warning or change was recorded for a row that never
    /// reported a terminal `Success`.
    pub fn finalize(self) -> Result<RunSummary> {
        let orphan = self
            .summary
            .warnings
            .iter()
            .chain(self.summary.changes.iter())
            .find(|entry| !self.succeeded.contains(&entry.index));
        if let Some(entry) = orphan {
            return Err(anyhow!(
                "row {} has a warning or change but no recorded success",
                entry.index
            ));
        }
        let summary = self.summary;
        debug_assert_eq!(
            summary.total_rows,
            summary.success_rows + summary.fail_rows
        );
        debug_assert_eq!(summary.errors.len(), summary.fail_index.len());
        Ok(summary)
    }

    fn ensure_unsettled(&self, index: usize) -> Result<()> {
        if self.succeeded.contains(&index) || self.summary.fail_index.contains(&index) {
            return Err(anyhow!("row {index} already has a recorded outcome"));
        }
        Ok(())
    }

    fn ensure_not_failed(&self, index: usize, kind: &str) -> Result<()> {
        if self.summary.fail_index.contains(&index) {
            return Err(anyhow!("cannot record {kind} for failed row {index}"));
        }
        Ok(())
    }

    fn has_annotations(&self, index: usize) -> bool {
        self.summary
            .warnings
            .iter()
            .chain(self.summary.changes.iter())
            .any(|entry| entry.index == index)
    }
}

#[cfg(test)]
#[path = "summary_tests.rs"]
mod tests;
