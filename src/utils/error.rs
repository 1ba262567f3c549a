//! Error types for the entire application.
//!
//! We use `thiserror` for library-style errors with custom types,
//! and `anyhow` for application-level error propagation in main.rs and commands.

use thiserror::Error;

/// Errors that can occur while loading a captured trace
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("JSON deserialization failed: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Failed to read trace file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Invalid trace format: {0}")]
    InvalidFormat(String),
}

/// Errors that can occur while resolving source text for an event
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SourceError {
    /// The tracer registered the block but could not render its content
    #[error("Source for '{0}' could not be rendered")]
    Unrenderable(String),
}

/// Errors found when checking an exported flame timeline
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FlamegraphError {
    #[error("Close event at {at}ms has no open frame")]
    UnmatchedClose { at: f64 },

    #[error("Close event at {at}ms closes frame {found}, expected {expected}")]
    MismatchedClose { at: f64, expected: usize, found: usize },

    #[error("{0} frames are still open at the end of the timeline")]
    Unclosed(usize),

    #[error("Event references frame {0} which is not in the frame table")]
    UnknownFrame(usize),
}

/// Errors that can occur during file output
#[derive(Error, Debug)]
pub enum OutputError {
    #[error("Failed to write file: {0}")]
    WriteFailed(#[from] std::io::Error),

    #[error("Failed to serialize JSON: {0}")]
    SerializationFailed(#[from] serde_json::Error),

    #[error("Invalid output path: {0}")]
    InvalidPath(String),
}

/// Errors that can occur while loading profiler configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    ParseFailed(#[from] toml::de::Error),

    #[error("Invalid fold rule '{0}', expected GROUP=VALUE")]
    InvalidFoldRule(String),
}
