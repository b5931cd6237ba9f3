mod application;
mod domain;
mod error;
mod infrastructure;
mod interfaces;
mod logging;

use std::{
    process::ExitCode,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
};

use anyhow::{Context, Result};
use console::style;

use crate::application::{
    commands::RunSummary, use_cases::generate_update_sql::GenerateUpdateSqlUseCase,
};
use crate::interfaces::cli::collect_generate_command;
use crate::logging::setup_logger;

fn main() -> ExitCode {
    match run() {
        Ok(exit_code) => exit_code,
        Err(error) => {
            eprintln!("{} {error:#}", style("Error:").red().bold());
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<ExitCode> {
    let invocation = collect_generate_command()?;
    setup_logger(invocation.log_level);

    let stop = Arc::new(AtomicBool::new(false));
    let stop_handle = Arc::clone(&stop);
    ctrlc::set_handler(move || stop_handle.store(true, Ordering::SeqCst))
        .context("Unable to install Ctrl-C handler")?;

    if !invocation.output_json {
        println!("{}", style("Generating SQL update batches...").cyan());
    }
    let use_case = GenerateUpdateSqlUseCase::default();
    let summary = use_case.execute(invocation.command, &stop)?;

    if invocation.output_json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        print_summary(&summary);
    }

    Ok(if summary.success {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn print_summary(summary: &RunSummary) {
    if summary.success {
        println!(
            "{} {} ({} rows, {} files)",
            style("Generated SQL has been saved to").green(),
            style(summary.output_dir.display()).bold(),
            summary.row_count,
            summary.file_count,
        );
    } else {
        println!(
            "{} {}",
            style("Generation stopped:").red().bold(),
            summary.error.as_deref().unwrap_or("unknown error"),
        );
        if summary.file_count > 0 {
            println!(
                "{} {} rows in {} files under {}",
                style("Kept").yellow(),
                summary.row_count,
                summary.file_count,
                style(summary.output_dir.display()).bold(),
            );
        }
    }

    for file_name in &summary.output_files {
        println!("  {}", style(file_name).dim());
    }
    if summary.skipped_count > 0 {
        println!(
            "{} {} rows could not be converted (see warnings above)",
            style("Skipped").yellow(),
            summary.skipped_count,
        );
    }
}
