use std::{
    path::{self, Path, PathBuf},
    sync::atomic::{AtomicBool, Ordering},
};

use anyhow::{Context, Result, anyhow};
use tracing::{debug, error, info, warn};

use crate::{
    application::commands::{GenerateUpdateSqlCommand, RunSummary, SkippedRow},
    domain::{
        input_row::InputRow,
        mapping::MappingConfig,
        part_file::BatchSize,
        row_compiler::{RowOutcome, SkipReason, UpdateCompiler},
    },
    error::RunError,
    infrastructure::{
        delimited_reader::DelimitedRowReader, mapping_loader::load_mapping,
        output_dir::remove_stale_parts, part_file_writer::PartFileWriter,
    },
};

const MAX_RECORDED_SKIPS: usize = 100;

#[derive(Debug, Default)]
pub struct GenerateUpdateSqlUseCase;

impl GenerateUpdateSqlUseCase {
    pub fn execute(
        &self,
        command: GenerateUpdateSqlCommand,
        stop: &AtomicBool,
    ) -> Result<RunSummary> {
        let mapping = load_mapping(&command.config_path).with_context(|| {
            format!(
                "Unable to load config file: {}",
                command.config_path.display()
            )
        })?;
        let batch_size = BatchSize::new(command.batch_size.unwrap_or(mapping.batch.size))?;

        let input_path = command
            .input_path
            .or_else(|| mapping.input.file.clone())
            .ok_or_else(|| anyhow!("No input file specified in config or command line"))?;
        let output_dir = command
            .output_dir
            .unwrap_or_else(|| mapping.output.dir.clone());
        let input_stem = input_stem(&input_path)?;

        if command.clean_output {
            let removed = remove_stale_parts(&output_dir, &input_stem)?;
            if removed > 0 {
                info!(
                    "Removed {removed} stale part files from {}",
                    output_dir.display()
                );
            }
        }

        info!(
            input = %input_path.display(),
            output = %output_dir.display(),
            batch_size = batch_size.get(),
            "Generating UPDATE statements"
        );
        Ok(generate_update_files(
            &input_path,
            &input_stem,
            &mapping,
            &output_dir,
            batch_size,
            stop,
        ))
    }
}

/// Compiles every row of `input_path` into part files under `output_dir`.
///
/// Never returns an error: failures to open the input or to write output end
/// the run early and are reported through the summary, together with the part
/// files written up to that point.
pub fn generate_update_files(
    input_path: &Path,
    input_stem: &str,
    mapping: &MappingConfig,
    output_dir: &Path,
    batch_size: BatchSize,
    stop: &AtomicBool,
) -> RunSummary {
    let format = mapping.input.resolve_format(input_path);
    debug!(input = %input_path.display(), %format, "Opening input");
    let rows = match DelimitedRowReader::open(
        input_path,
        format,
        mapping.input.has_header,
        mapping.positional_columns(),
    ) {
        Ok(rows) => rows,
        Err(source) => {
            return failed_before_start(
                output_dir,
                RunError::OpenInput {
                    path: input_path.to_path_buf(),
                    source,
                },
            );
        }
    };
    warn_unmapped_columns(rows.columns(), mapping);

    let writer =
        match PartFileWriter::create(output_dir, input_stem, &mapping.database.name, batch_size) {
            Ok(writer) => writer,
            Err(error) => return failed_before_start(output_dir, error),
        };

    run_batches(rows, mapping, writer, stop)
}

/// Streams rows through the compiler into `writer`, one statement per compiled row.
///
/// Blank records are dropped silently, rows that cannot be compiled are logged
/// and counted, and only written statements advance the batch boundary.
pub fn run_batches<I>(
    rows: I,
    mapping: &MappingConfig,
    mut writer: PartFileWriter,
    stop: &AtomicBool,
) -> RunSummary
where
    I: IntoIterator<Item = csv::Result<InputRow>>,
{
    let compiler = UpdateCompiler::new(mapping);
    let mut skips = SkipLog::default();

    let streamed = stream_rows(rows, &compiler, &mut writer, &mut skips, stop);
    let closed = writer.finish();
    let outcome = streamed.and(closed);

    match &outcome {
        Ok(()) => info!(
            rows = writer.written_statements(),
            files = writer.part_files().len(),
            skipped = skips.count,
            "Processed {} rows. Output files saved to: {}",
            writer.written_statements(),
            writer.output_dir().display()
        ),
        Err(run_error) => error!(
            rows = writer.written_statements(),
            files = writer.part_files().len(),
            "Error processing file: {run_error}"
        ),
    }

    RunSummary {
        success: outcome.is_ok(),
        row_count: writer.written_statements(),
        skipped_count: skips.count,
        file_count: writer.part_files().len(),
        output_files: writer.part_files().to_vec(),
        output_dir: absolute_dir(writer.output_dir()),
        error: outcome.err().map(|run_error| run_error.to_string()),
        skipped_rows: skips.recorded,
    }
}

fn stream_rows<I>(
    rows: I,
    compiler: &UpdateCompiler<'_>,
    writer: &mut PartFileWriter,
    skips: &mut SkipLog,
    stop: &AtomicBool,
) -> Result<(), RunError>
where
    I: IntoIterator<Item = csv::Result<InputRow>>,
{
    for row in rows {
        if stop.load(Ordering::SeqCst) {
            return Err(RunError::Cancelled);
        }

        let row = row?;
        if row.is_blank() {
            continue;
        }

        match compiler.compile(&row) {
            RowOutcome::Statement(statement) => writer.write_statement(&statement)?,
            RowOutcome::Skipped(reason) => {
                warn!(line = row.line(), "Skipping row: {reason}");
                skips.record(row.line(), &reason);
            }
        }
    }
    Ok(())
}

#[derive(Debug, Default)]
struct SkipLog {
    count: usize,
    recorded: Vec<SkippedRow>,
}

impl SkipLog {
    fn record(&mut self, line: u64, reason: &SkipReason) {
        self.count += 1;
        if self.recorded.len() < MAX_RECORDED_SKIPS {
            self.recorded.push(SkippedRow {
                line,
                reason: reason.to_string(),
            });
        }
    }
}

fn warn_unmapped_columns(columns: &[String], mapping: &MappingConfig) {
    let is_known = |column: &str| columns.iter().any(|known| known == column);

    for identifier in &mapping.identifiers {
        if !is_known(&identifier.column) {
            warn!(
                "Identifier column '{}' not found in input; every row will be skipped",
                identifier.column
            );
        }
    }
    for update_column in &mapping.update_columns {
        if !is_known(&update_column.column) {
            warn!(
                "Update column '{}' not found in input; it will be left out of every statement",
                update_column.column
            );
        }
    }
}

fn failed_before_start(output_dir: &Path, run_error: RunError) -> RunSummary {
    error!("Error processing file: {run_error}");
    RunSummary {
        success: false,
        row_count: 0,
        skipped_count: 0,
        file_count: 0,
        output_files: Vec::new(),
        output_dir: absolute_dir(output_dir),
        error: Some(run_error.to_string()),
        skipped_rows: Vec::new(),
    }
}

fn input_stem(input_path: &Path) -> Result<String> {
    input_path
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .ok_or_else(|| anyhow!("Input path has no file name: {}", input_path.display()))
}

fn absolute_dir(dir: &Path) -> PathBuf {
    path::absolute(dir).unwrap_or_else(|_| dir.to_path_buf())
}
