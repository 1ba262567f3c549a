//! Assemble the profiling report from a flow-labeled trace.

use super::fold::process_group_and_fold;
use super::functions::process_functions;
use super::lines::process_lines;
use super::metrics::{trace_totals, TopViews};
use super::profile::LineProfile;
use crate::parser::{Event, SourceResolver};
use crate::utils::config::{ProfilerConfig, SCHEMA_VERSION};
use chrono::Utc;
use log::{debug, info};
use serde::{Deserialize, Serialize};

/// Everything a presentation layer needs to display a profile
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Report {
    /// Schema version for compatibility checking
    pub version: String,

    /// Timestamp when the report was generated
    pub generated_at: String,

    /// Top line views
    pub lines: TopViews,

    /// Top function views
    pub functions: TopViews,

    /// Ticks from the first to the last real event
    pub total_duration: i64,

    /// Wall clock ticks measured by the tracer
    pub stopwatch_duration: i64,

    pub all_lines: Vec<LineProfile>,

    pub all_functions: Vec<LineProfile>,

    /// The trace, with fold groups applied when configured
    pub events: Vec<Event>,
}

/// Build a report from events that already went through `process_flow`
pub fn build_report(
    events: &[Event],
    resolver: &dyn SourceResolver,
    config: &ProfilerConfig,
    stopwatch_duration: i64,
) -> Report {
    let totals = trace_totals(events);
    debug!(
        "Trace totals: {} ticks, {} bytes",
        totals.duration, totals.memory
    );

    let mut all_lines: Vec<LineProfile> = process_lines(events, resolver, config)
        .into_values()
        .flat_map(|file| file.lines.into_values())
        .collect();
    all_lines.iter_mut().for_each(|line| line.finalize(&totals));

    let mut all_functions: Vec<LineProfile> =
        process_functions(events, config).into_values().collect();
    all_functions.iter_mut().for_each(|f| f.finalize(&totals));

    let mut view = events.to_vec();
    process_group_and_fold(&mut view, config);

    info!(
        "Report: {} lines, {} functions over {} events",
        all_lines.len(),
        all_functions.len(),
        events.len()
    );

    Report {
        version: SCHEMA_VERSION.to_string(),
        generated_at: Utc::now().to_rfc3339(),
        lines: TopViews::from_profiles(&all_lines, config.top_n),
        functions: TopViews::from_profiles(&all_functions, config.top_n),
        total_duration: totals.duration,
        stopwatch_duration,
        all_lines,
        all_functions,
        events: view,
    }
}
