//! Summary statistics over plan and VM cohorts
//!
//! All values are kept at full precision; rounding happens only when a
//! report is rendered.

use crate::error::{ReportError, Result};
use crate::migration::{EnrichedTable, EnrichedVm, PlanRecord};

/// Count, sum, minimum and maximum of one numeric field
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldStats {
    pub count: usize,
    pub sum: f64,
    pub min: f64,
    pub max: f64,
}

impl FieldStats {
    pub fn average(&self) -> f64 {
        self.sum / self.count as f64
    }
}

/// Summarize a cohort of values; an empty cohort is an error
pub fn summarize<I>(values: I, cohort: &str) -> Result<FieldStats>
where
    I: IntoIterator<Item = f64>,
{
    let mut values = values.into_iter();
    let first = values.next().ok_or_else(|| ReportError::empty_cohort(cohort))?;

    Ok(values.fold(
        FieldStats {
            count: 1,
            sum: first,
            min: first,
            max: first,
        },
        |acc, value| FieldStats {
            count: acc.count + 1,
            sum: acc.sum + value,
            min: acc.min.min(value),
            max: acc.max.max(value),
        },
    ))
}

/// Statistics for a cohort of migration plans
#[derive(Debug, Clone, PartialEq)]
pub struct PlanCohortSummary {
    pub label: String,
    pub plans: usize,
    /// Requested VMs summed across the cohort
    pub vms: usize,
    pub duration_mins: FieldStats,
}

pub fn summarize_plans(label: &str, plans: &[PlanRecord]) -> Result<PlanCohortSummary> {
    let duration_mins = summarize(plans.iter().map(|p| p.total_duration_mins), label)?;
    Ok(PlanCohortSummary {
        label: label.to_string(),
        plans: duration_mins.count,
        vms: plans.iter().map(|p| p.vms).sum(),
        duration_mins,
    })
}

/// VMs sharing one operating system
#[derive(Debug, Clone, PartialEq)]
pub struct OsGroup<'a> {
    pub os: String,
    pub vms: Vec<&'a EnrichedVm>,
}

/// Partition enriched VMs by OS, groups ordered by first occurrence
pub fn group_by_os(table: &EnrichedTable) -> Vec<OsGroup<'_>> {
    let mut groups: Vec<OsGroup<'_>> = Vec::new();

    for vm in &table.vms {
        match groups.iter().position(|g| g.os == vm.identity.os) {
            Some(index) => groups[index].vms.push(vm),
            None => groups.push(OsGroup {
                os: vm.identity.os.clone(),
                vms: vec![vm],
            }),
        }
    }

    groups
}

/// Transfer statistics for the VMs of one operating system
#[derive(Debug, Clone, PartialEq)]
pub struct OsSummary {
    pub os: String,
    pub hosts: usize,
    /// Disk sizes after dividing by the configured size divisor
    pub transfer_size: FieldStats,
    pub migration_minutes: FieldStats,
}

pub fn summarize_os_group(group: &OsGroup<'_>, size_divisor: f64) -> Result<OsSummary> {
    let transfer_size = summarize(
        group
            .vms
            .iter()
            .map(|vm| vm.total_disk_sizes as f64 / size_divisor),
        &group.os,
    )?;
    let migration_minutes = summarize(group.vms.iter().map(|vm| vm.migration_minutes), &group.os)?;

    Ok(OsSummary {
        os: group.os.clone(),
        hosts: group.vms.len(),
        transfer_size,
        migration_minutes,
    })
}

pub fn summarize_by_os(table: &EnrichedTable, size_divisor: f64) -> Result<Vec<OsSummary>> {
    group_by_os(table)
        .iter()
        .map(|group| summarize_os_group(group, size_divisor))
        .collect()
}
