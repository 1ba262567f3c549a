//! Trace loading and the event model.
//!
//! This module handles:
//! - The event records produced by the script tracer
//! - Parsing and validating trace files
//! - Resolving source text for line aggregates

pub mod schema;
pub mod source;
pub mod trace;

// Re-export main types
pub use schema::{CapturedTrace, Event, Flow, MemoryDelta, MemorySnapshot, SourceBlock, SourceLocation};
pub use source::{SourceMap, SourceResolver, SourceText};
pub use trace::{derive_self_costs, load_trace, parse_trace, validate_trace_format};
