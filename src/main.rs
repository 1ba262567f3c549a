//! Script Profiler CLI
//!
//! Builds line and function profiles and speedscope timelines from
//! traces captured by the script tracer.

use anyhow::Result;
use clap::{Parser, Subcommand};
use env_logger::Env;
use std::path::PathBuf;

use script_profiler::commands::{
    display_schema, display_version, execute_analyze, resolve_config, validate_args,
    validate_report_file, validate_speedscope_file, AnalyzeArgs, ConfigOverrides,
};

/// Script Profiler - line level performance profiles for scripts
#[derive(Parser, Debug)]
#[command(name = "script-profiler")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

/// Available commands
#[derive(Subcommand, Debug)]
enum Commands {
    /// Build a report (and optionally a flame timeline) from a trace
    Analyze {
        /// Trace JSON written by the tracer
        #[arg(short, long)]
        trace: PathBuf,

        /// Output path for the JSON report
        #[arg(short, long, default_value = "report.json")]
        output: PathBuf,

        /// Output path for the speedscope timeline (optional)
        #[arg(short, long)]
        speedscope: Option<PathBuf>,

        /// Name shown in the speedscope document
        #[arg(long)]
        name: Option<String>,

        /// Profiler config TOML with fold rules and limits
        #[arg(short, long, env = "SCRIPT_PROFILER_CONFIG")]
        config: Option<PathBuf>,

        /// Number of entries in each top view
        #[arg(long)]
        top: Option<usize>,

        /// Sample events kept per aggregate
        #[arg(long)]
        sample_cap: Option<usize>,

        /// Keep every event as a sample
        #[arg(long)]
        collect_all: bool,

        /// Fold events of a module into a group, as GROUP=MODULE
        #[arg(long = "fold")]
        fold_modules: Vec<String>,

        /// Fold events of files ending with a suffix, as GROUP=SUFFIX
        #[arg(long = "fold-suffix")]
        fold_suffixes: Vec<String>,

        /// Print text summary to stdout
        #[arg(long)]
        summary: bool,
    },

    /// Validate a report or speedscope JSON file
    Validate {
        /// Path to the file
        #[arg(short, long)]
        file: PathBuf,

        /// Treat the file as a speedscope timeline
        #[arg(long)]
        speedscope: bool,
    },

    /// Display schema information
    Schema {
        /// Show full schema details
        #[arg(long)]
        show: bool,
    },

    /// Display version information
    Version,
}

fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Setup logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(log_level)).init();

    // Execute command
    match cli.command {
        Commands::Analyze {
            trace,
            output,
            speedscope,
            name,
            config,
            top,
            sample_cap,
            collect_all,
            fold_modules,
            fold_suffixes,
            summary,
        } => {
            let config = resolve_config(&ConfigOverrides {
                config_path: config,
                top_n: top,
                sample_cap,
                collect_all,
                fold_modules,
                fold_suffixes,
            })?;

            let args = AnalyzeArgs {
                trace_path: trace,
                output_json: output,
                output_speedscope: speedscope,
                name,
                config,
                print_summary: summary,
            };

            // Validate args first
            validate_args(&args)?;

            execute_analyze(args)?;
        }

        Commands::Validate { file, speedscope } => {
            if speedscope {
                validate_speedscope_file(file)?;
            } else {
                validate_report_file(file)?;
            }
        }

        Commands::Schema { show } => {
            display_schema(show);
        }

        Commands::Version => {
            display_version();
        }
    }

    Ok(())
}
