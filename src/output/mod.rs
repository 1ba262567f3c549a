//! Output writers for reports and flame timelines.
//!
//! This module handles writing data to disk and to the console:
//! - JSON reports
//! - Speedscope timeline files
//! - Text summaries

pub mod json;
pub mod summary;

// Re-export main functions
pub use json::{read_report, read_speedscope, validate_path, write_report, write_speedscope};
pub use summary::render_summary;
