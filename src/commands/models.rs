use crate::utils::config::ProfilerConfig;
use std::path::PathBuf;

/// Arguments for the analyze command
///
/// **Public** - used by main.rs to construct from CLI args
#[derive(Debug, Clone)]
pub struct AnalyzeArgs {
    /// Trace file written by the tracer
    pub trace_path: PathBuf,

    /// Output path for the JSON report
    pub output_json: PathBuf,

    /// Output path for the speedscope timeline (optional)
    pub output_speedscope: Option<PathBuf>,

    /// Name shown in the speedscope document
    pub name: Option<String>,

    /// Fold rules, sample cap and view size
    pub config: ProfilerConfig,

    /// Print text summary to stdout
    pub print_summary: bool,
}

impl Default for AnalyzeArgs {
    fn default() -> Self {
        Self {
            trace_path: PathBuf::from("trace.json"),
            output_json: PathBuf::from("report.json"),
            output_speedscope: None,
            name: None,
            config: ProfilerConfig::default(),
            print_summary: false,
        }
    }
}

/// Command line overrides applied on top of a config file
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub config_path: Option<PathBuf>,
    pub top_n: Option<usize>,
    pub sample_cap: Option<usize>,
    pub collect_all: bool,
    /// `GROUP=MODULE` pairs
    pub fold_modules: Vec<String>,
    /// `GROUP=SUFFIX` pairs
    pub fold_suffixes: Vec<String>,
}
