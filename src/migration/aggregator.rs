use chrono::{DateTime, Utc};
use serde_yaml::Value;
use tracing::debug;

use super::{PlanRecord, VmMetrics};
use crate::config::ReportConfig;
use crate::document::{parse_timestamp, PlanDocument, PlanEntry, VmStatus};
use crate::error::{ReportError, Result};

/// Everything derived from a single pass over the plan document
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Aggregation {
    /// Per-VM metrics in document order; later plans come after earlier ones
    pub vm_metrics: Vec<VmMetrics>,
    pub successful: Vec<PlanRecord>,
    pub failed: Vec<PlanRecord>,
    /// Plans skipped because they have not completed
    pub in_progress: usize,
}

impl Aggregation {
    pub fn plan_count(&self) -> usize {
        self.successful.len() + self.failed.len()
    }
}

/// Walk every plan, classifying finished ones into cohorts
pub fn aggregate(document: &PlanDocument, config: &ReportConfig) -> Result<Aggregation> {
    let mut aggregation = Aggregation::default();

    for entry in &document.items {
        let Some((started, completed)) = plan_window(entry)? else {
            debug!("Plan {} has not completed, skipping", entry.name());
            aggregation.in_progress += 1;
            continue;
        };

        let duration_mins = minutes_between(started, completed);
        let requested = entry.spec.vms.as_ref().ok_or_else(|| {
            ReportError::malformed(
                PlanDocument::KIND,
                format!("plan {} has no `spec.vms`", entry.name()),
            )
        })?;

        let mut failed = false;
        for vm in entry.migration().map(|m| m.vms.as_slice()).unwrap_or_default() {
            aggregation.vm_metrics.push(VmMetrics {
                vm_id: vm.id.clone(),
                migration_minutes: duration_mins,
                total_disk_sizes: transferred_total(vm),
            });

            if !failed && has_unsuccessful_condition(vm, &config.success_condition) {
                debug!("VM {} failed in plan {}", vm.id, entry.name());
                failed = true;
            }
        }

        let record = PlanRecord {
            name: entry.name().to_string(),
            total_duration_mins: duration_mins,
            vms: requested.len(),
            failed,
        };
        debug!(
            "Plan {} took {:.1} minutes for {} VMs (failed: {})",
            record.name, record.total_duration_mins, record.vms, record.failed
        );

        if failed {
            aggregation.failed.push(record);
        } else {
            aggregation.successful.push(record);
        }
    }

    Ok(aggregation)
}

/// Start and completion timestamps, or `None` for unfinished plans
fn plan_window(entry: &PlanEntry) -> Result<Option<(DateTime<Utc>, DateTime<Utc>)>> {
    let Some(migration) = entry.migration() else {
        return Ok(None);
    };
    let Some(completed) = &migration.completed else {
        return Ok(None);
    };
    let started = migration.started.as_ref().ok_or_else(|| {
        ReportError::malformed(
            PlanDocument::KIND,
            format!("plan {} completed without a start time", entry.name()),
        )
    })?;
    Ok(Some((
        timestamp(entry, "started", started)?,
        timestamp(entry, "completed", completed)?,
    )))
}

fn timestamp(entry: &PlanEntry, field: &str, value: &Value) -> Result<DateTime<Utc>> {
    parse_timestamp(value).ok_or_else(|| {
        ReportError::malformed(
            PlanDocument::KIND,
            format!(
                "plan {} has an invalid `{field}` timestamp: {value:?}",
                entry.name()
            ),
        )
    })
}

/// Signed difference in fractional minutes; not clamped at zero
pub fn minutes_between(started: DateTime<Utc>, completed: DateTime<Utc>) -> f64 {
    (completed - started).num_milliseconds() as f64 / 60_000.0
}

/// Total disk data reported by the annotated stages of one VM
pub fn transferred_total(vm: &VmStatus) -> u64 {
    vm.pipeline
        .iter()
        .filter(|stage| stage.is_annotated())
        .filter_map(|stage| stage.progress.as_ref())
        .map(|progress| progress.total)
        .sum()
}

fn has_unsuccessful_condition(vm: &VmStatus, success: &str) -> bool {
    vm.conditions.iter().any(|condition| condition.kind != success)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plans(content: &str) -> PlanDocument {
        PlanDocument::from_yaml_str(content).unwrap()
    }

    fn run(content: &str) -> Aggregation {
        aggregate(&plans(content), &ReportConfig::default()).unwrap()
    }

    #[test]
    fn test_single_successful_plan() {
        let aggregation = run(r#"
items:
  - metadata:
      name: wave-1
    spec:
      vms:
        - id: vm-1
    status:
      migration:
        started: "2024-05-01T08:00:00Z"
        completed: "2024-05-01T08:10:00Z"
        vms:
          - id: vm-1
            pipeline:
              - name: DiskTransfer
                annotations:
                  unit: MB
                progress:
                  total: 2048
            conditions:
              - type: Succeeded
"#);

        assert!(aggregation.failed.is_empty());
        assert_eq!(
            aggregation.successful,
            vec![PlanRecord {
                name: "wave-1".into(),
                total_duration_mins: 10.0,
                vms: 1,
                failed: false,
            }]
        );
        assert_eq!(
            aggregation.vm_metrics,
            vec![VmMetrics {
                vm_id: "vm-1".into(),
                migration_minutes: 10.0,
                total_disk_sizes: 2048,
            }]
        );
    }

    #[test]
    fn test_one_failed_vm_fails_plan() {
        let aggregation = run(r#"
items:
  - metadata:
      name: wave-2
    spec:
      vms: [{id: a}, {id: b}, {id: c}]
    status:
      migration:
        started: "2024-05-01T08:00:00Z"
        completed: "2024-05-01T09:30:00Z"
        vms:
          - id: a
            conditions: [{type: Succeeded}]
          - id: b
            conditions: [{type: Failed}]
          - id: c
            conditions: [{type: Succeeded}]
"#);

        assert!(aggregation.successful.is_empty());
        assert_eq!(aggregation.failed.len(), 1);
        assert_eq!(aggregation.failed[0].total_duration_mins, 90.0);
        assert!(aggregation.failed[0].failed);
        assert_eq!(aggregation.vm_metrics.len(), 3);
    }

    #[test]
    fn test_unfinished_plans_are_skipped() {
        let aggregation = run(r#"
items:
  - metadata:
      name: running
    spec:
      vms: [{id: a}]
    status:
      migration:
        started: "2024-05-01T08:00:00Z"
        vms:
          - id: a
            conditions: [{type: Failed}]
  - metadata:
      name: not-started
"#);

        assert_eq!(aggregation.plan_count(), 0);
        assert_eq!(aggregation.in_progress, 2);
        assert!(aggregation.vm_metrics.is_empty());
    }

    #[test]
    fn test_plan_without_status_vms_is_successful() {
        let aggregation = run(r#"
items:
  - metadata:
      name: empty
    spec:
      vms: [{id: a}, {id: b}]
    status:
      migration:
        started: "2024-05-01T08:00:00Z"
        completed: "2024-05-01T08:00:30Z"
"#);

        assert_eq!(aggregation.successful.len(), 1);
        assert_eq!(aggregation.successful[0].vms, 2);
        assert_eq!(aggregation.successful[0].total_duration_mins, 0.5);
    }

    #[test]
    fn test_completion_before_start_gives_negative_duration() {
        let aggregation = run(r#"
items:
  - metadata:
      name: skewed
    spec:
      vms: []
    status:
      migration:
        started: "2024-05-01T08:05:00Z"
        completed: "2024-05-01T08:00:00Z"
"#);

        assert_eq!(aggregation.successful[0].total_duration_mins, -5.0);
    }

    #[test]
    fn test_only_annotated_stages_count_toward_size() {
        let doc = plans(r#"
items:
  - metadata:
      name: sizes
    spec:
      vms: [{id: a}]
    status:
      migration:
        started: "2024-05-01T08:00:00Z"
        completed: "2024-05-01T08:01:00Z"
        vms:
          - id: a
            pipeline:
              - name: Initialize
                progress:
                  total: 999
              - name: DiskTransfer
                annotations: {unit: MB}
                progress:
                  total: 1024
              - name: DiskTransferV2v
                annotations: {unit: MB}
                progress:
                  total: 512
              - name: ImageConversion
                annotations: {unit: MB}
"#);
        let vm = &doc.items[0].migration().unwrap().vms[0];
        assert_eq!(transferred_total(vm), 1536);
    }

    #[test]
    fn test_requested_vm_count_independent_of_status() {
        // Requested VMs that never report status are counted here but
        // contribute no disk size anywhere.
        let aggregation = run(r#"
items:
  - metadata:
      name: partial
    spec:
      vms: [{id: a}, {id: b}, {id: c}]
    status:
      migration:
        started: "2024-05-01T08:00:00Z"
        completed: "2024-05-01T08:20:00Z"
        vms:
          - id: a
            pipeline:
              - annotations: {unit: MB}
                progress: {total: 100}
            conditions: [{type: Succeeded}]
"#);

        assert_eq!(aggregation.successful[0].vms, 3);
        assert_eq!(aggregation.vm_metrics.len(), 1);
    }

    #[test]
    fn test_completed_without_start_is_malformed() {
        let result = aggregate(
            &plans(r#"
items:
  - metadata:
      name: odd
    spec:
      vms: []
    status:
      migration:
        completed: "2024-05-01T08:00:00Z"
"#),
            &ReportConfig::default(),
        );
        assert!(matches!(result, Err(ReportError::MalformedDocument { .. })));
    }

    #[test]
    fn test_unfinished_plan_with_odd_start_is_skipped() {
        let aggregation = run(r#"
items:
  - metadata:
      name: done
    spec:
      vms: [{id: a}]
    status:
      migration:
        started: "2024-05-01 08:00:00"
        completed: "2024-05-01 08:15:00"
        vms:
          - id: a
            conditions: [{type: Succeeded}]
  - metadata:
      name: running
    spec:
      vms: [{id: b}]
    status:
      migration:
        started: "sometime soon"
"#);

        assert_eq!(aggregation.in_progress, 1);
        assert_eq!(aggregation.successful.len(), 1);
        assert_eq!(aggregation.successful[0].total_duration_mins, 15.0);
    }

    #[test]
    fn test_completed_with_bad_timestamp_is_malformed() {
        let result = aggregate(
            &plans(r#"
items:
  - metadata:
      name: odd
    spec:
      vms: []
    status:
      migration:
        started: "2024-05-01T08:00:00Z"
        completed: "later"
"#),
            &ReportConfig::default(),
        );
        let err = result.unwrap_err();
        assert!(matches!(err, ReportError::MalformedDocument { .. }));
        assert!(err.to_string().contains("`completed`"));
    }

    #[test]
    fn test_null_annotations_count_toward_size() {
        let aggregation = run(r#"
items:
  - metadata:
      name: bare
    spec:
      vms: [{id: a}]
    status:
      migration:
        started: "2024-05-01T08:00:00Z"
        completed: "2024-05-01T08:01:00Z"
        vms:
          - id: a
            pipeline:
              - name: DiskTransfer
                annotations:
                progress:
                  total: 2048
            conditions:
              - type: Succeeded
                status: true
"#);

        assert_eq!(aggregation.vm_metrics[0].total_disk_sizes, 2048);
        assert_eq!(aggregation.successful.len(), 1);
    }

    #[test]
    fn test_completed_without_spec_vms_is_malformed() {
        let result = aggregate(
            &plans(r#"
items:
  - metadata:
      name: odd
    status:
      migration:
        started: "2024-05-01T08:00:00Z"
        completed: "2024-05-01T08:00:00Z"
"#),
            &ReportConfig::default(),
        );
        let err = result.unwrap_err();
        assert!(err.to_string().contains("spec.vms"));
    }

    #[test]
    fn test_cohorts_keep_document_order() {
        let aggregation = run(r#"
items:
  - metadata: {name: first}
    spec: {vms: []}
    status:
      migration: {started: "2024-05-01T08:00:00Z", completed: "2024-05-01T08:01:00Z"}
  - metadata: {name: second}
    spec: {vms: []}
    status:
      migration: {started: "2024-05-01T08:00:00Z", completed: "2024-05-01T08:02:00Z"}
"#);
        let names: Vec<_> = aggregation.successful.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["first", "second"]);
    }

    #[test]
    fn test_aggregation_is_deterministic() {
        let doc = plans(r#"
items:
  - metadata: {name: p}
    spec: {vms: [{id: a}]}
    status:
      migration:
        started: "2024-05-01T08:00:00Z"
        completed: "2024-05-01T08:07:30Z"
        vms:
          - id: a
            conditions: [{type: Succeeded}]
"#);
        let config = ReportConfig::default();
        assert_eq!(
            aggregate(&doc, &config).unwrap(),
            aggregate(&doc, &config).unwrap()
        );
    }
}
