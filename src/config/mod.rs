//! Report configuration
//!
//! Settings are layered: built-in defaults, then an optional TOML file,
//! then `MTV_REPORT_*` environment variables, then command-line flags.

use serde::Deserialize;
use std::path::Path;

use crate::error::{ReportError, Result};

/// Label on an inventory entry carrying the migration VM identifier
pub const DEFAULT_VM_ID_LABEL: &str = "vmID";
/// Template annotation carrying the guest operating system
pub const DEFAULT_OS_ANNOTATION: &str = "vm.kubevirt.io/os";
pub const DEFAULT_SUCCESS_CONDITION: &str = "Succeeded";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    pub vm_id_label: String,
    pub os_annotation: String,
    /// Divisor applied to accumulated progress totals before display
    pub size_divisor: f64,
    pub size_unit: String,
    pub success_condition: String,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            vm_id_label: DEFAULT_VM_ID_LABEL.to_string(),
            os_annotation: DEFAULT_OS_ANNOTATION.to_string(),
            size_divisor: 1024.0,
            size_unit: "GB".to_string(),
            success_condition: DEFAULT_SUCCESS_CONDITION.to_string(),
        }
    }
}

impl ReportConfig {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: ReportConfig =
            toml::from_str(content).map_err(|e| ReportError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| ReportError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// Overlay values from the process environment
    pub fn merge_env_vars(&mut self) -> Result<()> {
        self.merge_env_with(|key| std::env::var(key).ok())
    }

    pub fn merge_env_with<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(label) = lookup("MTV_REPORT_VM_ID_LABEL") {
            self.vm_id_label = label;
        }

        if let Some(annotation) = lookup("MTV_REPORT_OS_ANNOTATION") {
            self.os_annotation = annotation;
        }

        if let Some(divisor) = lookup("MTV_REPORT_SIZE_DIVISOR") {
            self.size_divisor = divisor.parse::<f64>().map_err(|_| {
                ReportError::Config(format!("MTV_REPORT_SIZE_DIVISOR is not a number: {divisor}"))
            })?;
        }

        if let Some(unit) = lookup("MTV_REPORT_SIZE_UNIT") {
            self.size_unit = unit;
        }

        self.validate()
    }

    pub fn validate(&self) -> Result<()> {
        if self.vm_id_label.is_empty() {
            return Err(ReportError::Config("vm_id_label must not be empty".into()));
        }
        if self.os_annotation.is_empty() {
            return Err(ReportError::Config("os_annotation must not be empty".into()));
        }
        if !self.size_divisor.is_finite() || self.size_divisor <= 0.0 {
            return Err(ReportError::Config(format!(
                "size_divisor must be a positive number, got {}",
                self.size_divisor
            )));
        }
        Ok(())
    }
}
