use crate::output::{read_report, read_speedscope};
use crate::utils::config::{ticks_to_ms, SCHEMA_VERSION};
use anyhow::{Context, Result};
use std::path::PathBuf;

/// Validate a report JSON file
pub fn validate_report_file(file_path: PathBuf) -> Result<()> {
    println!("Validating report: {}", file_path.display());

    let report = read_report(&file_path)?;

    println!("✓ Valid report JSON");
    println!("  Version: {}", report.version);
    println!("  Generated: {}", report.generated_at);
    println!("  Duration: {:.3} ms", ticks_to_ms(report.total_duration));
    println!("  Lines: {}", report.all_lines.len());
    println!("  Functions: {}", report.all_functions.len());
    println!("  Events: {}", report.events.len());

    Ok(())
}

/// Validate a speedscope file and check its timeline is balanced
pub fn validate_speedscope_file(file_path: PathBuf) -> Result<()> {
    println!("Validating speedscope file: {}", file_path.display());

    let timeline = read_speedscope(&file_path)?;
    timeline
        .check_balance()
        .context("Timeline is not balanced")?;

    let events: usize = timeline.profiles.iter().map(|p| p.events.len()).sum();
    println!("✓ Valid, balanced speedscope JSON");
    println!("  Exporter: {}", timeline.exporter);
    println!("  Frames: {}", timeline.shared.frames.len());
    println!("  Events: {}", events);

    Ok(())
}

/// Display schema information
pub fn display_schema(show_details: bool) {
    println!("Script Profiler Report Schema");
    println!("Current Version: {}", SCHEMA_VERSION);
    println!();

    if show_details {
        println!("Schema Structure:");
        println!("  version: string            - Schema version (e.g., '1.0.0')");
        println!("  generated_at: string       - ISO 8601 timestamp");
        println!("  lines: object              - Top line views");
        println!("    duration: array          - Ranked by duration including callees");
        println!("    self_duration: array     - Ranked by exclusive duration");
        println!("    hit_count: array         - Ranked by hits");
        println!("    memory: array            - Ranked by allocated bytes including callees");
        println!("    self_memory: array       - Ranked by exclusive allocated bytes");
        println!("  functions: object          - Top function views (same shape)");
        println!("  total_duration: number     - Trace duration in 100ns ticks");
        println!("  stopwatch_duration: number - Wall clock duration in 100ns ticks");
        println!("  all_lines: array           - Every line aggregate");
        println!("  all_functions: array       - Every function aggregate");
        println!("  events: array              - The flow-labeled (and folded) trace");
    } else {
        println!("Use --show for detailed schema information");
    }
}

/// Display version information
pub fn display_version() {
    println!("Script Profiler v{}", env!("CARGO_PKG_VERSION"));
    println!("Report Schema: v{}", SCHEMA_VERSION);
    println!();
    println!("Line and function profiles and flame timelines from script traces.");
}
