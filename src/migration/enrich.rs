use std::collections::HashMap;
use tracing::debug;

use super::VmMetrics;
use crate::inventory::{IdentityTable, VmIdentity};

/// A VM identity joined with its migration metrics
#[derive(Debug, Clone, PartialEq)]
pub struct EnrichedVm {
    pub vm_id: String,
    pub identity: VmIdentity,
    pub migration_minutes: f64,
    pub total_disk_sizes: u64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct EnrichedTable {
    /// Matched VMs in identity-table order
    pub vms: Vec<EnrichedVm>,
    /// Metric ids with no inventory entry, first occurrence order
    pub unmatched: Vec<String>,
}

impl EnrichedTable {
    pub fn len(&self) -> usize {
        self.vms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vms.is_empty()
    }
}

/// Left-biased join of metrics onto identities.
///
/// Only identities with at least one metrics entry are kept. When a VM
/// appears in several plans the last one wins.
pub fn enrich(identities: &IdentityTable, metrics: &[VmMetrics]) -> EnrichedTable {
    let mut latest: HashMap<&str, &VmMetrics> = HashMap::new();
    let mut unmatched: Vec<String> = Vec::new();

    for metric in metrics {
        if identities.contains(&metric.vm_id) {
            latest.insert(metric.vm_id.as_str(), metric);
        } else if !unmatched.contains(&metric.vm_id) {
            debug!("VM {} is not in the inventory, dropping its metrics", metric.vm_id);
            unmatched.push(metric.vm_id.clone());
        }
    }

    let vms = identities
        .iter()
        .filter_map(|(vm_id, identity)| {
            latest.get(vm_id).map(|metric| EnrichedVm {
                vm_id: vm_id.to_string(),
                identity: identity.clone(),
                migration_minutes: metric.migration_minutes,
                total_disk_sizes: metric.total_disk_sizes,
            })
        })
        .collect();

    EnrichedTable { vms, unmatched }
}
