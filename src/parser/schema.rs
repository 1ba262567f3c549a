//! Event model produced by the script tracer.
//!
//! One `Event` is recorded every time the instrumented interpreter hits a
//! statement. Fields after the capture-time ones are filled in by the
//! processing passes in `aggregator`.

use crate::utils::config::ANONYMOUS_BLOCK_NAME;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// How an event moves through the call structure
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Flow {
    /// Execution continues at the same level
    #[default]
    Process,
    /// The next event is one level deeper
    Call,
    /// The next event is at a lower level
    Return,
}

/// Where in the script an event happened
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceLocation {
    /// File path, absent for unsaved or dynamically created blocks
    #[serde(default)]
    pub path: Option<String>,

    /// Identifier of the block the statement belongs to
    #[serde(default)]
    pub block_id: String,

    pub line: u32,

    #[serde(default)]
    pub column: u32,

    /// Text of the statement
    #[serde(default)]
    pub text: String,
}

/// Memory and collection counters read when the event started
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemorySnapshot {
    #[serde(default)]
    pub working_set: i64,
    #[serde(default)]
    pub heap_size: i64,
    #[serde(default)]
    pub allocated_bytes: i64,
    #[serde(default)]
    pub gc0: i64,
    #[serde(default)]
    pub gc1: i64,
    #[serde(default)]
    pub gc2: i64,
}

impl MemorySnapshot {
    pub fn gc_total(&self) -> i64 {
        self.gc0 + self.gc1 + self.gc2
    }

    /// Counters accumulated between `self` and a later snapshot
    pub fn delta_to(&self, later: &MemorySnapshot) -> MemoryDelta {
        MemoryDelta {
            working_set: later.working_set - self.working_set,
            heap_size: later.heap_size - self.heap_size,
            allocated_bytes: later.allocated_bytes - self.allocated_bytes,
            gc0: later.gc0 - self.gc0,
            gc1: later.gc1 - self.gc1,
            gc2: later.gc2 - self.gc2,
        }
    }
}

/// Difference between two memory snapshots
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryDelta {
    #[serde(default)]
    pub working_set: i64,
    #[serde(default)]
    pub heap_size: i64,
    #[serde(default)]
    pub allocated_bytes: i64,
    #[serde(default)]
    pub gc0: i64,
    #[serde(default)]
    pub gc1: i64,
    #[serde(default)]
    pub gc2: i64,
}

impl MemoryDelta {
    pub fn gc_total(&self) -> i64 {
        self.gc0 + self.gc1 + self.gc2
    }
}

/// One instrumentation hit
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    /// Position in the trace, dense and 0-based
    pub index: usize,

    /// Call stack depth at capture time
    pub level: usize,

    /// Start timestamp in ticks
    pub start_time: i64,

    /// Ticks until the next event started
    #[serde(default)]
    pub self_duration: i64,

    /// Ticks spent in this event and everything it called
    #[serde(default)]
    pub duration: i64,

    pub location: SourceLocation,

    /// Owning function, `None` for top-level code
    #[serde(default)]
    pub function: Option<String>,

    #[serde(default)]
    pub module: Option<String>,

    #[serde(default)]
    pub flow: Flow,

    /// Index of the event that called into this frame
    #[serde(default)]
    pub caller_index: Option<usize>,

    /// Index of the event where this call's frame ended, own index otherwise
    #[serde(default)]
    pub return_index: usize,

    /// False for code from unsaved or dynamic blocks
    #[serde(default)]
    pub is_in_file: bool,

    #[serde(default)]
    pub memory: MemorySnapshot,

    #[serde(default)]
    pub self_memory: MemoryDelta,

    /// Allocated bytes including callees
    #[serde(default)]
    pub total_bytes: i64,

    /// Collections including callees
    #[serde(default)]
    pub total_gc: i64,

    /// Noise group assigned by the fold engine
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,

    /// Hidden behind a fold representative
    #[serde(default)]
    pub folded: bool,
}

impl Event {
    pub fn path(&self) -> Option<&str> {
        self.location.path.as_deref()
    }

    pub fn line(&self) -> u32 {
        self.location.line
    }

    pub fn column(&self) -> u32 {
        self.location.column
    }

    pub fn text(&self) -> &str {
        &self.location.text
    }

    /// File path for in-file code, block id for everything else
    pub fn source_key(&self) -> &str {
        match self.path() {
            Some(path) if self.is_in_file => path,
            _ => &self.location.block_id,
        }
    }

    /// Function name with the anonymous block marker treated as absent
    pub fn function_name(&self) -> Option<&str> {
        self.function
            .as_deref()
            .filter(|f| !f.is_empty() && *f != ANONYMOUS_BLOCK_NAME)
    }

    /// Name of the flame frame this event opens
    pub fn frame_name(&self) -> String {
        match self.function_name() {
            Some(name) => name.to_string(),
            None => self.location.text.trim().to_string(),
        }
    }

    pub fn self_gc(&self) -> i64 {
        self.self_memory.gc_total()
    }

    /// Make inclusive values equal to self values, for events that call nothing
    pub(crate) fn close_in_place(&mut self) {
        self.duration = self.self_duration;
        self.total_bytes = self.self_memory.allocated_bytes;
        self.total_gc = self.self_gc();
        self.return_index = self.index;
    }
}

/// Text of a block as registered by the tracer
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceBlock {
    /// Line at which the block starts in its file
    #[serde(default = "first_line")]
    pub start_line: u32,

    /// Rendered content, `None` when the tracer failed to render it
    #[serde(default)]
    pub content: Option<String>,
}

fn first_line() -> u32 {
    1
}

/// A complete trace as written by the tracer
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CapturedTrace {
    pub events: Vec<Event>,

    /// Block text keyed by file path or block id
    #[serde(default)]
    pub sources: HashMap<String, SourceBlock>,

    /// Wall clock ticks measured around the traced script
    #[serde(default)]
    pub stopwatch_duration: i64,

    /// Whether self duration/memory/GC are already set on every event
    #[serde(default = "self_costs_included")]
    pub self_costs_included: bool,
}

fn self_costs_included() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_key_prefers_path_in_file() {
        let mut event = Event {
            location: SourceLocation {
                path: Some("/work/a.ps1".to_string()),
                block_id: "block-1".to_string(),
                ..SourceLocation::default()
            },
            is_in_file: true,
            ..Event::default()
        };
        assert_eq!(event.source_key(), "/work/a.ps1");

        event.is_in_file = false;
        assert_eq!(event.source_key(), "block-1");
    }

    #[test]
    fn test_frame_name_falls_back_to_text() {
        let mut event = Event {
            function: Some(ANONYMOUS_BLOCK_NAME.to_string()),
            location: SourceLocation {
                text: "  Get-Item . ".to_string(),
                ..SourceLocation::default()
            },
            ..Event::default()
        };
        assert_eq!(event.frame_name(), "Get-Item .");

        event.function = Some("Invoke-Build".to_string());
        assert_eq!(event.frame_name(), "Invoke-Build");
    }

    #[test]
    fn test_memory_delta() {
        let before = MemorySnapshot {
            allocated_bytes: 100,
            gc0: 1,
            ..MemorySnapshot::default()
        };
        let after = MemorySnapshot {
            allocated_bytes: 150,
            gc0: 2,
            gc2: 1,
            ..MemorySnapshot::default()
        };

        let delta = before.delta_to(&after);
        assert_eq!(delta.allocated_bytes, 50);
        assert_eq!(delta.gc_total(), 2);
    }

    #[test]
    fn test_event_defaults_from_minimal_json() {
        let event: Event = serde_json::from_str(
            r#"{"index": 3, "level": 1, "start_time": 10, "location": {"line": 4}}"#,
        )
        .unwrap();

        assert_eq!(event.flow, Flow::Process);
        assert_eq!(event.caller_index, None);
        assert!(!event.folded);
        assert_eq!(event.line(), 4);
    }
}
