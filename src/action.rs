//! Bulk actions the loader can run.
//!
//! Each variant walks the rows in file order and reports per-row outcomes into
//! a [`SummaryBuilder`]. Row problems never abort the run; only a broken
//! outcome sequence (which would violate the summary invariants) does.
use crate::herd::{BusinessObjectDefinition, DescriptiveInfoUpdate, HerdApi};
use crate::rows::ObjectRow;
use crate::summary::{RowOutcome, RunSummary, SummaryBuilder};
use anyhow::{anyhow, Result};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    /// Update display name and description of business object definitions.
    UpdateObjects,
    /// Read-only pass confirming each row's definition exists.
    CheckObjects,
}

impl Action {
    pub const ALL: [Action; 2] = [Action::UpdateObjects, Action::CheckObjects];

    pub fn as_str(&self) -> &'static str {
        match self {
            Action::UpdateObjects => "objects",
            Action::CheckObjects => "check",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Action::UpdateObjects => "update business object descriptive information",
            Action::CheckObjects => "check business object definitions exist",
        }
    }

    /// Process every row and return the finalized summary.
    pub fn run(&self, api: &dyn HerdApi, rows: &[ObjectRow]) -> Result<RunSummary> {
        let mut builder = SummaryBuilder::new();
        for (index, row) in rows.iter().enumerate() {
            let outcomes = match self {
                Action::UpdateObjects => update_row(api, index, row),
                Action::CheckObjects => check_row(api, index, row),
            };
            tracing::debug!(row = index, outcomes = outcomes.len(), action = %self, "row processed");
            builder.extend(outcomes)?;
        }
        builder.finalize()
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Action {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self> {
        let wanted = value.trim();
        Action::ALL
            .into_iter()
            .find(|action| action.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| {
                let known: Vec<&str> = Action::ALL.iter().map(Action::as_str).collect();
                anyhow!(
                    "unknown action {wanted:?} (expected one of: {})",
                    known.join(", ")
                )
            })
    }
}

fn update_row(api: &dyn HerdApi, index: usize, row: &ObjectRow) -> Vec<RowOutcome> {
    let key = match row.key() {
        Ok(key) => key,
        Err(err) => return vec![RowOutcome::Error(index, err.to_string())],
    };
    let current = match api.business_object_definition(&key) {
        Ok(current) => current,
        Err(err) => return vec![RowOutcome::Error(index, format!("lookup {key}: {err:#}"))],
    };

    let mut outcomes = Vec::new();
    let changes = describe_changes(&current, row);
    if !changes.is_empty() {
        let update = DescriptiveInfoUpdate {
            display_name: row
                .display_name()
                .map(str::to_string)
                .or_else(|| current.display_name.clone()),
            description: row
                .description()
                .map(str::to_string)
                .or_else(|| current.description.clone()),
        };
        if let Err(err) = api.update_descriptive_info(&key, &update) {
            return vec![RowOutcome::Error(index, format!("update {key}: {err:#}"))];
        }
        outcomes.push(RowOutcome::Change(index, changes.join("; ")));
    }
    if row.description().is_none() {
        outcomes.push(RowOutcome::Warning(
            index,
            format!("{key}: no description provided, existing description kept"),
        ));
    }
    outcomes.push(RowOutcome::Success(index));
    outcomes
}

fn check_row(api: &dyn HerdApi, index: usize, row: &ObjectRow) -> Vec<RowOutcome> {
    let key = match row.key() {
        Ok(key) => key,
        Err(err) => return vec![RowOutcome::Error(index, err.to_string())],
    };
    match api.business_object_definition(&key) {
        Ok(current) => {
            let mut outcomes = Vec::new();
            let described = current
                .description
                .as_deref()
                .is_some_and(|text| !text.trim().is_empty());
            if !described {
                outcomes.push(RowOutcome::Warning(
                    index,
                    format!("{key}: definition has no description"),
                ));
            }
            outcomes.push(RowOutcome::Success(index));
            outcomes
        }
        Err(err) => vec![RowOutcome::Error(index, format!("lookup {key}: {err:#}"))],
    }
}

fn describe_changes(current: &BusinessObjectDefinition, row: &ObjectRow) -> Vec<String> {
    let mut changes = Vec::new();
    if let Some(display_name) = row.display_name() {
        let old = current.display_name.as_deref().unwrap_or_default();
        if old != display_name {
            changes.push(format!("display name {old:?} -> {display_name:?}"));
        }
    }
    if let Some(description) = row.description() {
        if current.description.as_deref() != Some(description) {
            changes.push("description updated".to_string());
        }
    }
    changes
}

#[cfg(test)]
#[path = "action_tests.rs"]
mod tests;
