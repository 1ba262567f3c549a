//! Processing passes over a captured trace.
//!
//! This module transforms the tracer's flat event list into:
//! - Call/return structure with inclusive costs (flow)
//! - Line and function aggregates that stay correct under recursion
//! - A folded view with noisy subsystems collapsed
//! - Top-N rankings and the final report

pub mod flow;
pub mod fold;
pub mod functions;
pub mod lines;
pub mod metrics;
pub mod profile;
pub mod report;

// Re-export main types and functions
pub use flow::{process_flow, FlowSummary};
pub use fold::{assign_groups, fold_groups, process_group_and_fold};
pub use functions::{process_functions, FunctionKey};
pub use lines::{process_lines, FileProfile};
pub use metrics::{top_by, total_duration, total_memory, total_self_duration, trace_totals, TopViews};
pub use profile::{CommandHit, LineProfile, ReturnMarks, Totals};
pub use report::{build_report, Report};
