//! Pipeline driver
//!
//! Reads each input once, then runs extraction, aggregation, enrichment
//! and summarization before writing every report to a single sink.

use std::path::Path;
use tracing::{debug, info};

use crate::config::ReportConfig;
use crate::document::{InventoryDocument, PlanDocument};
use crate::error::Result;
use crate::inventory::{extract_identities, MissingField};
use crate::migration::{aggregate, enrich, PlanRecord};
use crate::report::{self, ReportSink};
use crate::stats::{summarize_by_os, summarize_plans, OsSummary, PlanCohortSummary};

pub const FAILED: &str = "failed";
pub const SUCCESSFUL: &str = "successful";

/// A plan cohort summary, or the label of a cohort with no plans
#[derive(Debug, Clone, PartialEq)]
pub enum CohortReport {
    Summary(PlanCohortSummary),
    Empty(String),
}

impl CohortReport {
    fn from_plans(label: &str, plans: &[PlanRecord]) -> Result<Self> {
        if plans.is_empty() {
            debug!("No {} plans to summarize", label);
            return Ok(Self::Empty(label.to_string()));
        }
        summarize_plans(label, plans).map(Self::Summary)
    }

    pub fn render(&self) -> String {
        match self {
            Self::Summary(summary) => report::render_plan_summary(summary),
            Self::Empty(label) => report::render_no_plans(label),
        }
    }
}

/// Everything computed for one run, in output order
#[derive(Debug, Clone, PartialEq)]
pub struct RunReport {
    pub os_summaries: Vec<OsSummary>,
    pub failed: CohortReport,
    pub successful: CohortReport,
    pub skipped_entries: Vec<MissingField>,
    pub identities: usize,
    pub enriched: usize,
    pub unmatched: Vec<String>,
    pub in_progress: usize,
}

/// Compute all summaries from already-parsed documents
pub fn build_report(
    inventory: &InventoryDocument,
    plans: &PlanDocument,
    config: &ReportConfig,
) -> Result<RunReport> {
    let extraction = extract_identities(inventory, config);
    let aggregation = aggregate(plans, config)?;
    let enriched = enrich(&extraction.identities, &aggregation.vm_metrics);
    let os_summaries = summarize_by_os(&enriched, config.size_divisor)?;

    let report = RunReport {
        os_summaries,
        failed: CohortReport::from_plans(FAILED, &aggregation.failed)?,
        successful: CohortReport::from_plans(SUCCESSFUL, &aggregation.successful)?,
        identities: extraction.identities.len(),
        skipped_entries: extraction.skipped,
        enriched: enriched.len(),
        unmatched: enriched.unmatched,
        in_progress: aggregation.in_progress,
    };

    info!(
        "Processed {} inventory VMs ({} skipped), {} finished plans ({} failed, {} in progress), {} VMs enriched ({} without inventory)",
        report.identities,
        report.skipped_entries.len(),
        aggregation.successful.len() + aggregation.failed.len(),
        aggregation.failed.len(),
        report.in_progress,
        report.enriched,
        report.unmatched.len()
    );

    Ok(report)
}

/// Render every report into the sink, then close it exactly once
pub fn write_report(
    report: &RunReport,
    config: &ReportConfig,
    mut sink: Box<dyn ReportSink>,
) -> Result<()> {
    let written = write_tables(report, config, sink.as_mut());
    let closed = sink.close();
    written.and(closed)
}

fn write_tables(
    report: &RunReport,
    config: &ReportConfig,
    sink: &mut dyn ReportSink,
) -> Result<()> {
    for summary in &report.os_summaries {
        report::emit(sink, &report::render_os_summary(summary, &config.size_unit))?;
    }
    report::emit(sink, &report.failed.render())?;
    report::emit(sink, &report.successful.render())
}

/// Load both documents, build the report and write it
///
/// The sink is opened only once both inputs have loaded, so a bad input
/// leaves any existing output untouched.
pub fn run<F>(
    inventory_path: &Path,
    plans_path: &Path,
    config: &ReportConfig,
    open_sink: F,
) -> Result<RunReport>
where
    F: FnOnce() -> Result<Box<dyn ReportSink>>,
{
    let report = load_and_build(inventory_path, plans_path, config)?;
    write_report(&report, config, open_sink()?)?;
    Ok(report)
}

fn load_and_build(
    inventory_path: &Path,
    plans_path: &Path,
    config: &ReportConfig,
) -> Result<RunReport> {
    let inventory = InventoryDocument::load(inventory_path)?;
    let plans = PlanDocument::load(plans_path)?;
    build_report(&inventory, &plans, config)
}
