//! Identity extraction from the VM inventory
//!
//! Every inventory entry is validated on its own. Entries missing a
//! required field are reported back as [`MissingField`] values and skipped;
//! they never abort the extraction.

use serde_yaml::Value;
use std::collections::HashMap;
use tracing::{debug, warn};

use crate::config::ReportConfig;
use crate::document::{lookup, InventoryDocument};

/// Static identity attributes of one virtual machine
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VmIdentity {
    pub name: String,
    pub uid: String,
    pub os: String,
}

/// A required identity field absent from an inventory entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingField {
    /// Entry name, when the entry has one
    pub entry: Option<String>,
    pub field: String,
}

impl std::fmt::Display for MissingField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.entry {
            Some(name) => write!(f, "key `{}` missing, skipping entry {}", self.field, name),
            None => write!(
                f,
                "entry missing required fields (`{}` and its name), skipping",
                self.field
            ),
        }
    }
}

impl std::error::Error for MissingField {}

/// VM identifier to identity mapping, iterated in first-insertion order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IdentityTable {
    order: Vec<String>,
    records: HashMap<String, VmIdentity>,
}

impl IdentityTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an identity; a repeated id replaces the record in place
    pub fn insert(&mut self, vm_id: String, identity: VmIdentity) -> Option<VmIdentity> {
        let previous = self.records.insert(vm_id.clone(), identity);
        if previous.is_none() {
            self.order.push(vm_id);
        }
        previous
    }

    pub fn get(&self, vm_id: &str) -> Option<&VmIdentity> {
        self.records.get(vm_id)
    }

    pub fn contains(&self, vm_id: &str) -> bool {
        self.records.contains_key(vm_id)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &VmIdentity)> {
        self.order
            .iter()
            .filter_map(|id| self.records.get(id).map(|identity| (id.as_str(), identity)))
    }
}

/// Result of walking the whole inventory
#[derive(Debug, Clone, Default)]
pub struct IdentityExtraction {
    pub identities: IdentityTable,
    pub skipped: Vec<MissingField>,
}

/// Build the identity table from a parsed inventory document
pub fn extract_identities(
    document: &InventoryDocument,
    config: &ReportConfig,
) -> IdentityExtraction {
    let mut extraction = IdentityExtraction::default();

    for entry in &document.items {
        match read_identity(entry, config) {
            Ok((vm_id, identity)) => {
                debug!("Found VM {} ({}) running {}", vm_id, identity.name, identity.os);
                if extraction.identities.insert(vm_id.clone(), identity).is_some() {
                    debug!("Duplicate VM id {}, keeping the last entry", vm_id);
                }
            }
            Err(missing) => {
                warn!("{}", missing);
                extraction.skipped.push(missing);
            }
        }
    }

    extraction
}

/// Validate a single inventory entry
pub fn read_identity(
    entry: &Value,
    config: &ReportConfig,
) -> Result<(String, VmIdentity), MissingField> {
    let name = field(entry, &["metadata", "name"]);
    let missing = |field: &str| MissingField {
        entry: name.clone(),
        field: field.to_string(),
    };

    let vm_id = field(entry, &["metadata", "labels", config.vm_id_label.as_str()])
        .ok_or_else(|| missing(&format!("metadata.labels.{}", config.vm_id_label)))?;
    let vm_name = name.clone().ok_or_else(|| missing("metadata.name"))?;
    let uid = field(entry, &["metadata", "uid"]).ok_or_else(|| missing("metadata.uid"))?;
    let os = field(
        entry,
        &["spec", "template", "metadata", "annotations", config.os_annotation.as_str()],
    )
    .ok_or_else(|| {
        missing(&format!(
            "spec.template.metadata.annotations.{}",
            config.os_annotation
        ))
    })?;

    Ok((
        vm_id,
        VmIdentity {
            name: vm_name,
            uid,
            os,
        },
    ))
}

fn field(entry: &Value, path: &[&str]) -> Option<String> {
    match lookup(entry, path)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}
