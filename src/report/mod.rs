//! Report rendering
//!
//! Each summary becomes a small plain-text table followed by a blank line.

pub mod sink;
pub mod table;

pub use sink::{BufferHandle, BufferSink, ReportSink, WriterSink};
pub use table::Table;

use crate::error::Result;
use crate::stats::{OsSummary, PlanCohortSummary};

pub fn render_os_summary(summary: &OsSummary, size_unit: &str) -> String {
    let minutes = &summary.migration_minutes;
    let size = &summary.transfer_size;

    Table::new(format!("{} hosts:", summary.os), summary.hosts)
        .decimal_row("Longest transfer in minutes:", minutes.max)
        .decimal_row(format!("Largest transfer size in {size_unit}:"), size.max)
        .decimal_row("Shortest runtime in minutes:", minutes.min)
        .decimal_row(format!("Smallest transfer size in {size_unit}:"), size.min)
        .decimal_row("Average runtime in minutes:", minutes.average())
        .decimal_row(format!("Average transfer size in {size_unit}:"), size.average())
        .render()
}

pub fn render_plan_summary(summary: &PlanCohortSummary) -> String {
    let duration = &summary.duration_mins;

    Table::new(plan_header(&summary.label), summary.plans)
        .row("The number of vms:", summary.vms)
        .decimal_row("Longest runtime in minutes:", duration.max)
        .decimal_row("Shortest runtime in minutes:", duration.min)
        .decimal_row("Average runtime in minutes:", duration.average())
        .render()
}

/// Placeholder for a plan cohort with nothing in it
pub fn render_no_plans(label: &str) -> String {
    Table::new(plan_header(label), 0).row("none", "").render()
}

fn plan_header(label: &str) -> String {
    format!("The number of {label} migrations:")
}

/// Write one rendered table followed by a blank line
pub fn emit(sink: &mut dyn ReportSink, table: &str) -> Result<()> {
    sink.write(table)?;
    sink.write("\n\n")
}
