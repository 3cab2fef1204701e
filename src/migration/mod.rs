//! Migration plan aggregation
//!
//! [`aggregate`] walks the plan document once, producing per-VM transfer
//! metrics and the successful/failed plan cohorts. [`enrich`] then joins
//! those metrics onto the identity table without mutating it.

pub mod aggregator;
pub mod enrich;

pub use aggregator::{aggregate, Aggregation};
pub use enrich::{enrich, EnrichedTable, EnrichedVm};

/// Outcome of one finished migration plan
#[derive(Debug, Clone, PartialEq)]
pub struct PlanRecord {
    pub name: String,
    /// Wall-clock completion minus start, in minutes
    pub total_duration_mins: f64,
    /// Size of the requested VM list
    pub vms: usize,
    pub failed: bool,
}

/// Transfer metrics derived for one VM from a plan's status
#[derive(Debug, Clone, PartialEq)]
pub struct VmMetrics {
    pub vm_id: String,
    /// Duration of the whole plan the VM migrated in
    pub migration_minutes: f64,
    /// Sum of annotated pipeline progress totals
    pub total_disk_sizes: u64,
}
