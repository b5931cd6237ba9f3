use std::{fs, path::Path};

use anyhow::{Context, Result};
use regex::Regex;
use tracing::debug;

/// Deletes part files left in `output_dir` by an earlier run over the same input stem.
///
/// Other files in the directory are left alone. Returns how many files were removed.
pub fn remove_stale_parts(output_dir: &Path, input_stem: &str) -> Result<usize> {
    if !output_dir.is_dir() {
        return Ok(0);
    }

    let part_pattern = Regex::new(&format!(
        r"^{}_part_\d{{3,}}\.sql$",
        regex::escape(input_stem)
    ))
    .context("Unable to build part file pattern")?;

    let entries = fs::read_dir(output_dir)
        .with_context(|| format!("Unable to list output directory: {}", output_dir.display()))?;

    let mut removed = 0usize;
    for entry in entries {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        let file_name = entry.file_name();
        let Some(file_name) = file_name.to_str() else {
            continue;
        };
        if part_pattern.is_match(file_name) {
            fs::remove_file(entry.path()).with_context(|| {
                format!("Unable to remove stale part file: {}", entry.path().display())
            })?;
            debug!(file = file_name, "removed stale part file");
            removed += 1;
        }
    }
    Ok(removed)
}
