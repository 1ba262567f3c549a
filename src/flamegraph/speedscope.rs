//! Evented flame timeline in the speedscope file format.
//!
//! Every event opens a frame. Calls stay open until their frame returns;
//! other events close themselves right away, and returns also close every
//! call frame they leave. Frame names are stored once in the shared table
//! and referenced by index.

use crate::parser::{Event, Flow};
use crate::utils::config::{ticks_to_ms, SENTINEL_EVENTS, SPEEDSCOPE_SCHEMA};
use crate::utils::error::FlamegraphError;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Top-level speedscope document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpeedscopeReport {
    pub exporter: String,
    pub name: String,
    pub active_profile_index: usize,
    #[serde(rename = "$schema")]
    pub schema: String,
    pub shared: SpeedscopeShared,
    pub profiles: Vec<SpeedscopeProfile>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SpeedscopeShared {
    pub frames: Vec<SpeedscopeFrame>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpeedscopeFrame {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpeedscopeProfile {
    #[serde(rename = "type")]
    pub profile_type: String,
    pub name: String,
    pub unit: String,
    pub start_value: i64,
    pub end_value: f64,
    pub events: Vec<SpeedscopeEvent>,
}

/// Open or close of a frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventType {
    #[serde(rename = "O")]
    Open,
    #[serde(rename = "C")]
    Close,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeedscopeEvent {
    #[serde(rename = "type")]
    pub kind: EventType,
    pub frame: usize,
    /// Milliseconds since the first real event
    pub at: f64,
}

/// Deduplicated frame names
#[derive(Debug, Default)]
struct FrameTable {
    frames: Vec<SpeedscopeFrame>,
    lookup: HashMap<String, usize>,
}

impl FrameTable {
    fn index_of(&mut self, name: String) -> usize {
        if let Some(&index) = self.lookup.get(&name) {
            return index;
        }
        let index = self.frames.len();
        self.frames.push(SpeedscopeFrame { name: name.clone() });
        self.lookup.insert(name, index);
        index
    }
}

/// Round milliseconds to 5 decimals
fn round_ms(ticks: i64) -> f64 {
    (ticks_to_ms(ticks) * 100_000.0).round() / 100_000.0
}

/// Convert a flow-labeled trace into a speedscope document
///
/// # Arguments
/// * `exporter` - Name of the exporting tool
/// * `name` - Document name, also used as the profile name prefix
/// * `events` - Trace after `process_flow`
/// * `total_duration` - Trace duration in ticks, shown in the profile name
pub fn convert(exporter: &str, name: &str, events: &[Event], total_duration: i64) -> SpeedscopeReport {
    let (frames, timeline, end_value) = convert_events(events);

    debug!(
        "Converted {} trace events into {} timeline events and {} frames",
        events.len(),
        timeline.len(),
        frames.len()
    );

    let profile = SpeedscopeProfile {
        profile_type: "evented".to_string(),
        name: format!("{} Time={}ms", name, round_ms(total_duration)),
        unit: "milliseconds".to_string(),
        start_value: 0,
        end_value,
        events: timeline,
    };

    SpeedscopeReport {
        exporter: exporter.to_string(),
        name: name.to_string(),
        active_profile_index: 0,
        schema: SPEEDSCOPE_SCHEMA.to_string(),
        shared: SpeedscopeShared { frames },
        profiles: vec![profile],
    }
}

fn convert_events(events: &[Event]) -> (Vec<SpeedscopeFrame>, Vec<SpeedscopeEvent>, f64) {
    if events.len() <= SENTINEL_EVENTS * 2 {
        return (Vec::new(), Vec::new(), 0.0);
    }

    let anchor = events[SENTINEL_EVENTS].start_time;
    let last_valid = events.len() - SENTINEL_EVENTS - 1;
    let end_value = round_ms(events[events.len() - SENTINEL_EVENTS].start_time - anchor);

    let mut table = FrameTable::default();
    let mut timeline = Vec::with_capacity(events.len() * 2);
    let mut stack: Vec<usize> = Vec::new();

    // positions, not event indices, so slices with gaps in their indices
    // still convert
    for (position, event) in events.iter().enumerate() {
        // instrumentation's own events
        if event.level == 0 {
            continue;
        }

        // nothing follows the last real event, so it cannot return
        let flow = if position == last_valid {
            Flow::Process
        } else {
            event.flow
        };

        stack.push(position);
        timeline.push(SpeedscopeEvent {
            kind: EventType::Open,
            frame: table.index_of(event.frame_name()),
            at: round_ms(event.start_time - anchor),
        });

        let closes = match flow {
            Flow::Call => continue,
            Flow::Process => 1,
            // close this event and every frame between here and the level
            // execution continues at
            Flow::Return => {
                let target_level = events.get(position + 1).map_or(0, |e| e.level);
                (stack.len() + 1).saturating_sub(target_level)
            }
        };

        let at = round_ms(event.start_time + event.self_duration - anchor);
        for _ in 0..closes.min(stack.len()) {
            let Some(call_index) = stack.pop() else {
                break;
            };
            timeline.push(SpeedscopeEvent {
                kind: EventType::Close,
                frame: table.index_of(events[call_index].frame_name()),
                at,
            });
        }
    }

    if !stack.is_empty() {
        warn!("Closing {} unbalanced frames at the end of the timeline", stack.len());
        while let Some(call_index) = stack.pop() {
            timeline.push(SpeedscopeEvent {
                kind: EventType::Close,
                frame: table.index_of(events[call_index].frame_name()),
                at: end_value,
            });
        }
    }

    (table.frames, timeline, end_value)
}

impl SpeedscopeReport {
    /// Check that every close matches the innermost open frame, that the
    /// stack ends empty, and that all frame ids exist
    pub fn check_balance(&self) -> Result<(), FlamegraphError> {
        let frame_count = self.shared.frames.len();

        for profile in &self.profiles {
            let mut open: Vec<usize> = Vec::new();
            for event in &profile.events {
                if event.frame >= frame_count {
                    return Err(FlamegraphError::UnknownFrame(event.frame));
                }
                match event.kind {
                    EventType::Open => open.push(event.frame),
                    EventType::Close => match open.pop() {
                        None => return Err(FlamegraphError::UnmatchedClose { at: event.at }),
                        Some(expected) if expected != event.frame => {
                            return Err(FlamegraphError::MismatchedClose {
                                at: event.at,
                                expected,
                                found: event.frame,
                            })
                        }
                        Some(_) => {}
                    },
                }
            }
            if !open.is_empty() {
                return Err(FlamegraphError::Unclosed(open.len()));
            }
        }

        Ok(())
    }
}
