use std::path::PathBuf;

use serde::Serialize;

#[derive(Debug)]
pub struct GenerateUpdateSqlCommand {
    pub config_path: PathBuf,
    pub input_path: Option<PathBuf>,
    pub output_dir: Option<PathBuf>,
    pub batch_size: Option<usize>,
    pub clean_output: bool,
}

/// Outcome of one run. Rows that could not be compiled never make a run fail;
/// `success` is false only when the run was cut short.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub success: bool,
    pub row_count: usize,
    pub skipped_count: usize,
    pub file_count: usize,
    pub output_files: Vec<String>,
    pub output_dir: PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub skipped_rows: Vec<SkippedRow>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedRow {
    pub line: u64,
    pub reason: String,
}
