//! Input documents
//!
//! Both inputs are exported resource lists: a top-level mapping whose
//! `items` key holds a sequence of entries. Each file is read and parsed
//! once by the pipeline driver and handed to the stages that need it.

pub mod plan;

use serde_yaml::Value;
use std::path::Path;
use tracing::debug;

use crate::error::{ReportError, Result};

pub use plan::{
    parse_timestamp, Condition, MigrationStatus, PipelineStage, PlanDocument, PlanEntry,
    PlanMetadata, PlanSpec, PlanStatus, Progress, VmStatus,
};

/// Virtual machine inventory, kept as raw entries so each one can be
/// validated independently
#[derive(Debug, Clone)]
pub struct InventoryDocument {
    pub items: Vec<Value>,
}

impl InventoryDocument {
    pub const KIND: &'static str = "inventory";

    pub fn from_value(value: Value) -> Result<Self> {
        let items = take_items(value, Self::KIND)?;
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

/// Read and parse a YAML file from disk
pub fn read_yaml(path: &Path) -> Result<Value> {
    let content = std::fs::read_to_string(path).map_err(|source| ReportError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    debug!("Read {} bytes from {}", content.len(), path.display());

    serde_yaml::from_str(&content).map_err(|source| ReportError::Yaml {
        path: path.to_path_buf(),
        source,
    })
}

/// Pull the `items` sequence out of a parsed document
pub(crate) fn take_items(value: Value, document: &str) -> Result<Vec<Value>> {
    let Value::Mapping(mut root) = value else {
        return Err(ReportError::malformed(document, "top level is not a mapping"));
    };

    match root.remove("items") {
        Some(Value::Sequence(items)) => Ok(items),
        Some(Value::Null) => Ok(Vec::new()),
        Some(_) => Err(ReportError::malformed(document, "`items` is not a sequence")),
        None => Err(ReportError::malformed(document, "missing top-level `items`")),
    }
}

/// Walk a fixed path of mapping keys
pub(crate) fn lookup<'a>(value: &'a Value, path: &[&str]) -> Option<&'a Value> {
    path.iter().try_fold(value, |current, key| current.get(*key))
}
