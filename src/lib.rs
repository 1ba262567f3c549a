//! Script Profiler
//!
//! Turns the flat event list captured while a script runs under line-level
//! instrumentation into:
//! - reconstructed call/return structure with inclusive costs
//! - per-line and per-function duration, memory and GC statistics
//! - a folded view with noisy subsystems collapsed
//! - an evented speedscope timeline
//!
//! ## Getting Started
//!
//! ```bash
//! script-profiler analyze --trace trace.json --speedscope trace.speedscope.json --summary
//! ```

pub mod aggregator;
pub mod commands;
pub mod flamegraph;
pub mod output;
pub mod parser;
pub mod utils;
