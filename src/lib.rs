//! # mtv-report
//!
//! Summarizes exported virtual machine migration plans into plain-text
//! statistical reports.
//!
//! ## Usage
//!
//! ```bash
//! mtv-report --inventory vms.yaml --plans plans.yaml [--output report.txt]
//! ```
//!
//! ## Modules
//!
//! - `config` - Report settings from defaults, TOML, and environment
//! - `document` - Reading and validating the inventory and plan documents
//! - `inventory` - VM identity extraction with per-entry validation
//! - `migration` - Plan aggregation, cohort split, and metrics enrichment
//! - `stats` - Count/sum/min/max statistics and OS grouping
//! - `report` - Table rendering and output sinks
//! - `pipeline` - Driver running all stages in order
pub mod config;
pub mod document;
pub mod error;
pub mod inventory;
pub mod migration;
pub mod pipeline;
pub mod report;
pub mod stats;

pub use error::{ReportError, Result};
