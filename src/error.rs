use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("YAML error in {path}: {source}")]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Malformed {document} document: {reason}")]
    MalformedDocument { document: String, reason: String },

    #[error("Cannot summarize empty {cohort} cohort")]
    EmptyCohort { cohort: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Output error: {0}")]
    Output(#[from] std::io::Error),
}

impl ReportError {
    pub fn malformed(document: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::MalformedDocument {
            document: document.into(),
            reason: reason.into(),
        }
    }

    pub fn empty_cohort(cohort: impl Into<String>) -> Self {
        Self::EmptyCohort {
            cohort: cohort.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ReportError>;
