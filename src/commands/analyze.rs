//! Analyze command implementation.
//!
//! The analyze command:
//! 1. Loads the trace written by the tracer
//! 2. Reconstructs call flow
//! 3. Aggregates lines and functions into a report
//! 4. Exports the speedscope timeline
//! 5. Writes output files

use super::models::{AnalyzeArgs, ConfigOverrides};
use crate::aggregator::{build_report, process_flow};
use crate::flamegraph::convert;
use crate::output::{render_summary, write_report, write_speedscope};
use crate::parser::{load_trace, SourceMap};
use crate::utils::config::{load_config, parse_fold_spec, FoldRule, ProfilerConfig, DEFAULT_EXPORTER};
use anyhow::{bail, Context, Result};
use log::{debug, info};
use std::time::Instant;

/// Execute the analyze command
///
/// # Errors
/// * Trace file missing or malformed
/// * File write errors
pub fn execute_analyze(args: AnalyzeArgs) -> Result<()> {
    let start_time = Instant::now();

    info!("Analyzing trace: {}", args.trace_path.display());

    // Step 1: Load trace
    info!("Step 1/5: Loading trace...");
    let trace = load_trace(&args.trace_path)
        .with_context(|| format!("Failed to load trace {}", args.trace_path.display()))?;
    let mut events = trace.events;
    let sources = SourceMap::new(trace.sources);

    debug!("Loaded {} events, {} source blocks", events.len(), sources.len());

    // Step 2: Reconstruct flow
    info!("Step 2/5: Reconstructing call flow...");
    let flow = process_flow(&mut events);
    debug!("Flow: {:?}", flow);

    // Step 3: Aggregate
    info!("Step 3/5: Aggregating lines and functions...");
    let report = build_report(&events, &sources, &args.config, trace.stopwatch_duration);

    // Step 4: Speedscope export (if requested)
    let timeline = if args.output_speedscope.is_some() {
        info!("Step 4/5: Converting flame timeline...");
        let name = args.name.clone().unwrap_or_else(|| {
            args.trace_path
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_else(|| "trace".to_string())
        });
        Some(convert(DEFAULT_EXPORTER, &name, &events, report.total_duration))
    } else {
        info!("Step 4/5: Skipping flame timeline (not requested)");
        None
    };

    // Step 5: Write outputs
    info!("Step 5/5: Writing output files...");
    write_report(&report, &args.output_json).context("Failed to write report JSON")?;
    info!("✓ Report written to: {}", args.output_json.display());

    if let (Some(timeline), Some(path)) = (timeline, &args.output_speedscope) {
        write_speedscope(&timeline, path).context("Failed to write speedscope file")?;
        info!("✓ Speedscope timeline written to: {}", path.display());
    }

    if args.print_summary {
        println!("{}", render_summary(&report, 10));
    }

    let elapsed = start_time.elapsed();
    info!("Analysis completed in {:.2}s", elapsed.as_secs_f64());

    Ok(())
}

/// Validate analyze arguments before running
pub fn validate_args(args: &AnalyzeArgs) -> Result<()> {
    if !args.trace_path.exists() {
        bail!("Trace file not found: {}", args.trace_path.display());
    }

    if args.config.top_n == 0 {
        bail!("--top must be at least 1");
    }

    if args.output_speedscope.as_ref() == Some(&args.output_json) {
        bail!("Report and speedscope outputs must be different files");
    }

    Ok(())
}

/// Load the config file, if any, and apply command line overrides
pub fn resolve_config(overrides: &ConfigOverrides) -> Result<ProfilerConfig> {
    let mut config = match &overrides.config_path {
        Some(path) => load_config(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => ProfilerConfig::default(),
    };

    if let Some(top_n) = overrides.top_n {
        config.top_n = top_n;
    }
    if let Some(sample_cap) = overrides.sample_cap {
        config.sample_cap = sample_cap;
    }
    if overrides.collect_all {
        config.collect_all = true;
    }

    for spec in &overrides.fold_modules {
        let (group, module) = parse_fold_spec(spec)?;
        config.add_fold_rule(FoldRule::new(group).with_module(module));
    }
    for spec in &overrides.fold_suffixes {
        let (group, suffix) = parse_fold_spec(spec)?;
        config.add_fold_rule(FoldRule::new(group).with_path_suffix(suffix));
    }

    Ok(config)
}
