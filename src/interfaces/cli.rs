use std::{env, path::PathBuf};

use anyhow::{Result, anyhow};
use clap::{Parser, ValueEnum};
use console::style;
use dialoguer::{Confirm, Input, Select, theme::ColorfulTheme};
use tracing::level_filters::LevelFilter;

use crate::application::commands::GenerateUpdateSqlCommand;

const DEFAULT_CONFIG: &str = "config/update.yaml";

#[derive(Debug, Parser)]
#[command(
    name = "sql-update-batcher",
    version,
    about = "Generate batched SQL UPDATE statements from TSV/CSV exports"
)]
struct CliArgs {
    #[arg(default_value = DEFAULT_CONFIG, help = "Path to the YAML configuration file")]
    config: PathBuf,
    #[arg(long, short = 'i', help = "Input TSV/CSV file (overrides config)")]
    input_file: Option<PathBuf>,
    #[arg(long, short = 'o', help = "Output directory for SQL files (overrides config)")]
    output_dir: Option<PathBuf>,
    #[arg(long, short = 'b', help = "Statements per output file (overrides config)")]
    batch_size: Option<usize>,
    #[arg(long, help = "Remove part files left by a previous run for the same input")]
    clean: bool,
    #[arg(long, help = "Print the run summary as JSON")]
    output_json: bool,
    #[arg(long, value_enum, default_value_t = Verbosity::Info)]
    verbosity: Verbosity,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Verbosity {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl Verbosity {
    const ALL: [Verbosity; 5] = [
        Verbosity::Error,
        Verbosity::Warn,
        Verbosity::Info,
        Verbosity::Debug,
        Verbosity::Trace,
    ];

    fn as_str(self) -> &'static str {
        match self {
            Verbosity::Error => "error",
            Verbosity::Warn => "warn",
            Verbosity::Info => "info",
            Verbosity::Debug => "debug",
            Verbosity::Trace => "trace",
        }
    }
}

impl From<Verbosity> for LevelFilter {
    fn from(value: Verbosity) -> Self {
        match value {
            Verbosity::Error => LevelFilter::ERROR,
            Verbosity::Warn => LevelFilter::WARN,
            Verbosity::Info => LevelFilter::INFO,
            Verbosity::Debug => LevelFilter::DEBUG,
            Verbosity::Trace => LevelFilter::TRACE,
        }
    }
}

#[derive(Debug)]
pub struct CliInvocation {
    pub command: GenerateUpdateSqlCommand,
    pub log_level: LevelFilter,
    pub output_json: bool,
}

pub fn collect_generate_command() -> Result<CliInvocation> {
    if env::args_os().len() == 1 {
        return collect_interactive_command();
    }
    collect_command_from_args(CliArgs::parse())
}

fn collect_command_from_args(args: CliArgs) -> Result<CliInvocation> {
    if args.batch_size == Some(0) {
        return Err(anyhow!("Batch size must be greater than 0"));
    }

    Ok(CliInvocation {
        command: GenerateUpdateSqlCommand {
            config_path: args.config,
            input_path: args.input_file,
            output_dir: args.output_dir,
            batch_size: args.batch_size,
            clean_output: args.clean,
        },
        log_level: args.verbosity.into(),
        output_json: args.output_json,
    })
}

fn collect_interactive_command() -> Result<CliInvocation> {
    let theme = ColorfulTheme::default();

    println!();
    println!(
        "{}",
        style(" SQL UPDATE BATCHER ")
            .black()
            .on_cyan()
            .bold()
            .underlined()
    );
    println!("{}", style("Turn a TSV/CSV export into batched UPDATE files").dim());
    println!();

    let config_path: String = Input::with_theme(&theme)
        .with_prompt("Configuration file")
        .default(DEFAULT_CONFIG.to_string())
        .validate_with(|value: &String| {
            if value.trim().is_empty() {
                Err("Configuration file must not be empty")
            } else {
                Ok(())
            }
        })
        .interact_text()?;

    let input_file: String = Input::with_theme(&theme)
        .with_prompt("Input TSV/CSV file (blank to use the config)")
        .allow_empty(true)
        .interact_text()?;

    let output_dir: String = Input::with_theme(&theme)
        .with_prompt("Output directory (blank to use the config)")
        .allow_empty(true)
        .interact_text()?;

    let batch_size: String = Input::with_theme(&theme)
        .with_prompt("Batch size (blank to use the config)")
        .allow_empty(true)
        .validate_with(|value: &String| parse_optional_batch_size(value).map(|_| ()))
        .interact_text()?;

    let clean_output = Confirm::with_theme(&theme)
        .with_prompt("Remove part files from a previous run of this input first?")
        .default(false)
        .interact()?;

    let verbosity_items = Verbosity::ALL
        .iter()
        .map(|verbosity| verbosity.as_str())
        .collect::<Vec<_>>();
    let selected_verbosity_index = Select::with_theme(&theme)
        .with_prompt("Log level")
        .default(2)
        .items(&verbosity_items)
        .interact()?;

    Ok(CliInvocation {
        command: GenerateUpdateSqlCommand {
            config_path: PathBuf::from(config_path.trim()),
            input_path: optional_path(&input_file),
            output_dir: optional_path(&output_dir),
            batch_size: parse_optional_batch_size(&batch_size).map_err(|error| anyhow!(error))?,
            clean_output,
        },
        log_level: Verbosity::ALL[selected_verbosity_index].into(),
        output_json: false,
    })
}

fn optional_path(value: &str) -> Option<PathBuf> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| PathBuf::from(trimmed))
}

fn parse_optional_batch_size(value: &str) -> Result<Option<usize>, &'static str> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    match trimmed.parse::<usize>() {
        Ok(0) | Err(_) => Err("Batch size must be a whole number greater than 0"),
        Ok(size) => Ok(Some(size)),
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use clap::Parser;
    use tracing::level_filters::LevelFilter;

    use super::{CliArgs, collect_command_from_args, optional_path, parse_optional_batch_size};

    #[test]
    fn parses_args_mode_with_overrides() {
        let args = CliArgs::try_parse_from([
            "sql-update-batcher",
            "config/products.yaml",
            "--input-file",
            "exports/products.tsv",
            "-o",
            "out",
            "-b",
            "500",
            "--clean",
            "--output-json",
            "--verbosity",
            "debug",
        ])
        .expect("cli args should parse");

        let invocation = collect_command_from_args(args).expect("command should be created");

        let command = invocation.command;
        assert_eq!(command.config_path, PathBuf::from("config/products.yaml"));
        assert_eq!(command.input_path, Some(PathBuf::from("exports/products.tsv")));
        assert_eq!(command.output_dir, Some(PathBuf::from("out")));
        assert_eq!(command.batch_size, Some(500));
        assert!(command.clean_output);
        assert!(invocation.output_json);
        assert_eq!(invocation.log_level, LevelFilter::DEBUG);
    }

    #[test]
    fn falls_back_to_default_config_path() {
        let args = CliArgs::try_parse_from(["sql-update-batcher", "--clean"])
            .expect("cli args should parse");

        let invocation = collect_command_from_args(args).expect("command should be created");

        assert_eq!(
            invocation.command.config_path,
            PathBuf::from("config/update.yaml")
        );
        assert_eq!(invocation.command.batch_size, None);
        assert_eq!(invocation.log_level, LevelFilter::INFO);
    }

    #[test]
    fn rejects_zero_batch_size() {
        let args = CliArgs::try_parse_from(["sql-update-batcher", "-b", "0"])
            .expect("cli args should parse");

        let error = collect_command_from_args(args).expect_err("zero batch size is rejected");
        assert!(
            error
                .to_string()
                .contains("Batch size must be greater than 0")
        );
    }

    #[test]
    fn blank_prompt_answers_defer_to_config() {
        assert_eq!(optional_path("  "), None);
        assert_eq!(optional_path(" out "), Some(PathBuf::from("out")));
        assert_eq!(parse_optional_batch_size(""), Ok(None));
        assert_eq!(parse_optional_batch_size(" 250 "), Ok(Some(250)));
        assert!(parse_optional_batch_size("0").is_err());
        assert!(parse_optional_batch_size("many").is_err());
    }
}
