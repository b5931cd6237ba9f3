use std::path::PathBuf;

use thiserror::Error;

/// Problems with the mapping configuration. Raised before any row is read.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Unable to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid YAML config: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Invalid JSON config: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Invalid(String),
}

/// Failures that abort a run after configuration has been accepted.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("Unable to open input file {path}: {source}")]
    OpenInput {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("Unable to read input: {0}")]
    ReadInput(#[from] csv::Error),

    #[error("Unable to create output directory {path}: {source}")]
    CreateOutputDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Unable to create output file {path}: {source}")]
    CreatePart {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Unable to write output file {path}: {source}")]
    WritePart {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Run cancelled")]
    Cancelled,
}

impl RunError {
    pub fn write_part(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        RunError::WritePart {
            path: path.into(),
            source,
        }
    }
}
