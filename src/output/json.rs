//! JSON output writer for reports and speedscope files.

use crate::aggregator::Report;
use crate::flamegraph::SpeedscopeReport;
use crate::utils::error::OutputError;
use log::{debug, info};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

/// Write a report to a JSON file
///
/// # Errors
/// * `OutputError::WriteFailed` - I/O error during write
/// * `OutputError::SerializationFailed` - JSON serialization error
/// * `OutputError::InvalidPath` - Path cannot be created or is invalid
///
/// # Example
/// ```ignore
/// let report = build_report(&events, &sources, &config, 0);
/// write_report(&report, "report.json")?;
/// ```
pub fn write_report(report: &Report, output_path: impl AsRef<Path>) -> Result<(), OutputError> {
    write_json(report, output_path.as_ref())
}

/// Write a speedscope document to a JSON file
pub fn write_speedscope(
    report: &SpeedscopeReport,
    output_path: impl AsRef<Path>,
) -> Result<(), OutputError> {
    write_json(report, output_path.as_ref())
}

/// Read a report from a JSON file
pub fn read_report(input_path: impl AsRef<Path>) -> Result<Report, OutputError> {
    let report: Report = read_json(input_path.as_ref())?;
    debug!(
        "Report loaded: version {}, {} lines",
        report.version,
        report.all_lines.len()
    );
    Ok(report)
}

/// Read a speedscope document from a JSON file
pub fn read_speedscope(input_path: impl AsRef<Path>) -> Result<SpeedscopeReport, OutputError> {
    read_json(input_path.as_ref())
}

fn write_json<T: Serialize>(value: &T, output_path: &Path) -> Result<(), OutputError> {
    info!("Writing JSON to: {}", output_path.display());

    validate_path(output_path)?;

    // Create parent directories if needed
    if let Some(parent) = output_path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            debug!("Creating parent directories: {}", parent.display());
            std::fs::create_dir_all(parent).map_err(|e| {
                OutputError::InvalidPath(format!(
                    "Cannot create directory {}: {}",
                    parent.display(),
                    e
                ))
            })?;
        }
    }

    let file = File::create(output_path).map_err(OutputError::WriteFailed)?;
    let writer = BufWriter::new(file);

    serde_json::to_writer_pretty(writer, value).map_err(OutputError::SerializationFailed)?;

    info!(
        "Written successfully ({} bytes)",
        calculate_file_size(output_path)
    );

    Ok(())
}

fn read_json<T: DeserializeOwned>(input_path: &Path) -> Result<T, OutputError> {
    debug!("Reading JSON from: {}", input_path.display());

    let file = File::open(input_path).map_err(OutputError::WriteFailed)?;
    let value = serde_json::from_reader(BufReader::new(file))
        .map_err(OutputError::SerializationFailed)?;

    Ok(value)
}

/// Validate that an output path is writable
pub fn validate_path(path: &Path) -> Result<(), OutputError> {
    if path.as_os_str().is_empty() {
        return Err(OutputError::InvalidPath("Path is empty".to_string()));
    }

    // Check if we're trying to overwrite a directory
    if path.exists() && path.is_dir() {
        return Err(OutputError::InvalidPath(format!(
            "Path is a directory: {}",
            path.display()
        )));
    }

    Ok(())
}

fn calculate_file_size(path: &Path) -> u64 {
    std::fs::metadata(path).map(|m| m.len()).unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flamegraph::convert;
    use tempfile::NamedTempFile;

    #[test]
    fn test_write_and_read_report() {
        let report = Report {
            version: "1.0.0".to_string(),
            total_duration: 42,
            ..Report::default()
        };
        let temp_file = NamedTempFile::new().unwrap();

        write_report(&report, temp_file.path()).unwrap();
        let loaded = read_report(temp_file.path()).unwrap();

        assert_eq!(loaded, report);
    }

    #[test]
    fn test_write_and_read_speedscope() {
        let doc = convert("test", "doc", &[], 0);
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("nested/profile.speedscope.json");

        write_speedscope(&doc, &path).unwrap();

        assert!(path.exists());
        assert_eq!(read_speedscope(&path).unwrap(), doc);
    }

    #[test]
    fn test_validate_path_empty() {
        assert!(validate_path(Path::new("")).is_err());
    }

    #[test]
    fn test_validate_path_directory() {
        let temp_dir = tempfile::tempdir().unwrap();
        assert!(validate_path(temp_dir.path()).is_err());
    }
}
