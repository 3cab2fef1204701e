//! Typed model of the migration plan document

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer};
use serde_yaml::Value;
use std::path::Path;

use super::{read_yaml, take_items};
use crate::error::{ReportError, Result};

#[derive(Debug, Clone, Default)]
pub struct PlanDocument {
    pub items: Vec<PlanEntry>,
}

impl PlanDocument {
    pub const KIND: &'static str = "plan";

    pub fn from_value(value: Value) -> Result<Self> {
        let items = take_items(value, Self::KIND)?
            .into_iter()
            .enumerate()
            .map(|(index, item)| {
                serde_yaml::from_value::<PlanEntry>(item).map_err(|e| {
                    ReportError::malformed(Self::KIND, format!("items[{index}]: {e}"))
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { items })
    }

    pub fn from_yaml_str(content: &str) -> Result<Self> {
        let value = serde_yaml::from_str(content)
            .map_err(|e| ReportError::malformed(Self::KIND, e.to_string()))?;
        Self::from_value(value)
    }

    pub fn load(path: &Path) -> Result<Self> {
        Self::from_value(read_yaml(path)?)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PlanEntry {
    #[serde(default)]
    pub metadata: PlanMetadata,
    #[serde(default)]
    pub spec: PlanSpec,
    #[serde(default)]
    pub status: PlanStatus,
}

impl PlanEntry {
    pub fn name(&self) -> &str {
        self.metadata.name.as_deref().unwrap_or("<unnamed>")
    }

    /// Migration status, present only once the plan has been started
    pub fn migration(&self) -> Option<&MigrationStatus> {
        self.status.migration.as_ref()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PlanMetadata {
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PlanSpec {
    /// Requested VMs; only the count matters for reporting
    pub vms: Option<Vec<Value>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PlanStatus {
    pub migration: Option<MigrationStatus>,
}

/// Timestamps stay raw until the plan is known to be finished
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MigrationStatus {
    pub started: Option<Value>,
    pub completed: Option<Value>,
    #[serde(default)]
    pub vms: Vec<VmStatus>,
}

/// Parse an ISO 8601 timestamp; values without an offset are taken as UTC
pub fn parse_timestamp(value: &Value) -> Option<DateTime<Utc>> {
    let text = value.as_str()?.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(text) {
        return Some(parsed.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M"]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(text, format).ok())
        .map(|naive| naive.and_utc())
}

#[derive(Debug, Clone, Deserialize)]
pub struct VmStatus {
    pub id: String,
    #[serde(default)]
    pub pipeline: Vec<PipelineStage>,
    #[serde(default)]
    pub conditions: Vec<Condition>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PipelineStage {
    /// Stages carrying an `annotations` key, even an empty one, report
    /// transferred disk data
    #[serde(default, deserialize_with = "key_present")]
    pub annotations: Option<Value>,
    pub progress: Option<Progress>,
}

impl PipelineStage {
    pub fn is_annotated(&self) -> bool {
        self.annotations.is_some()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Progress {
    #[serde(default)]
    pub total: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Condition {
    #[serde(rename = "type")]
    pub kind: String,
}

fn key_present<'de, D>(deserializer: D) -> std::result::Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}
