//! Input rows for the bulk actions.
//!
//! The rows file is a JSON array; a row's index is its zero-based position in
//! that array. Fields are optional at parse time so one incomplete row is
//! reported as a row error instead of rejecting the whole file.
use crate::herd::ObjectKey;
use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ObjectRow {
    #[serde(default)]
    pub namespace: Option<String>,
    #[serde(default)]
    pub business_object_definition_name: Option<String>,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

impl ObjectRow {
    /// Key of the definition this row targets.
    pub fn key(&self) -> Result<ObjectKey> {
        let namespace = required(self.namespace.as_deref(), "namespace")?;
        let name = required(
            self.business_object_definition_name.as_deref(),
            "business_object_definition_name",
        )?;
        Ok(ObjectKey::new(namespace, name))
    }

    pub fn display_name(&self) -> Option<&str> {
        non_blank(self.display_name.as_deref())
    }

    pub fn description(&self) -> Option<&str> {
        non_blank(self.description.as_deref())
    }
}

pub fn load_rows(path: &Path) -> Result<Vec<ObjectRow>> {
    let bytes = fs::read(path).with_context(|| format!("read rows file {}", path.display()))?;
    let rows: Vec<ObjectRow> = serde_json::from_slice(&bytes)
        .with_context(|| format!("parse rows file {}", path.display()))?;
    tracing::debug!(rows = rows.len(), path = %path.display(), "loaded rows");
    Ok(rows)
}

fn required<'a>(value: Option<&'a str>, field: &str) -> Result<&'a str> {
    let value = non_blank(value).ok_or_else(|| anyhow!("missing {field}"))?;
    if value.contains('/') {
        return Err(anyhow!("{field} must not contain '/' (got {value:?})"));
    }
    Ok(value)
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}
