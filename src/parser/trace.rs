//! Loader for traces written by the script tracer.
//!
//! Accepts either the full `CapturedTrace` object or a bare array of
//! events, checks that indices are dense, and derives self costs when the
//! tracer did not record them.

use super::schema::{CapturedTrace, Event};
use crate::utils::error::ParseError;
use log::{debug, warn};
use std::fs;
use std::path::Path;

/// Read and parse a trace file
pub fn load_trace(path: impl AsRef<Path>) -> Result<CapturedTrace, ParseError> {
    let path = path.as_ref();
    debug!("Reading trace from: {}", path.display());

    let contents = fs::read_to_string(path)?;
    let raw: serde_json::Value = serde_json::from_str(&contents)?;
    parse_trace(&raw)
}

/// Parse raw trace JSON
///
/// # Errors
/// * `ParseError::JsonError` - events do not match the event model
/// * `ParseError::InvalidFormat` - wrong top-level shape or non-dense indices
pub fn parse_trace(raw_trace: &serde_json::Value) -> Result<CapturedTrace, ParseError> {
    let mut trace = match raw_trace {
        serde_json::Value::Object(_) => CapturedTrace::deserialize_from(raw_trace)?,
        serde_json::Value::Array(_) => {
            debug!("Trace is a bare event array, wrapping it");
            CapturedTrace {
                events: serde_json::from_value(raw_trace.clone())?,
                self_costs_included: false,
                ..CapturedTrace::default()
            }
        }
        _ => {
            return Err(ParseError::InvalidFormat(
                "Trace must be a JSON object or array".to_string(),
            ))
        }
    };

    validate_trace_format(&trace.events)?;

    if !trace.self_costs_included {
        derive_self_costs(&mut trace.events);
        trace.self_costs_included = true;
    }

    debug!("Parsed {} events", trace.events.len());
    Ok(trace)
}

impl CapturedTrace {
    fn deserialize_from(raw: &serde_json::Value) -> Result<Self, ParseError> {
        if raw.get("events").is_none() {
            return Err(ParseError::InvalidFormat(
                "Trace object has no 'events' field".to_string(),
            ));
        }
        Ok(serde_json::from_value(raw.clone())?)
    }
}

/// Check that event indices match their position
pub fn validate_trace_format(events: &[Event]) -> Result<(), ParseError> {
    if let Some((position, event)) = events
        .iter()
        .enumerate()
        .find(|(position, event)| event.index != *position)
    {
        return Err(ParseError::InvalidFormat(format!(
            "Event at position {} has index {}",
            position, event.index
        )));
    }

    if let Some(pair) = events.windows(2).find(|w| w[1].start_time < w[0].start_time) {
        warn!(
            "Timestamps go backwards between events {} and {}",
            pair[0].index, pair[1].index
        );
    }

    Ok(())
}

/// Set self duration, memory and GC deltas from the next event's counters
///
/// The last event has nothing after it and gets zero self cost.
pub fn derive_self_costs(events: &mut [Event]) {
    let count = events.len();
    for i in 0..count {
        let (self_duration, self_memory) = match events.get(i + 1) {
            Some(next) => (
                next.start_time - events[i].start_time,
                events[i].memory.delta_to(&next.memory),
            ),
            None => (0, Default::default()),
        };

        let event = &mut events[i];
        event.self_duration = self_duration;
        event.self_memory = self_memory;
    }
}
