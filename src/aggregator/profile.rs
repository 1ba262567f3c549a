//! Aggregate records shared by line and function rollups.
//!
//! Self cost is summed for every hit. Inclusive cost is only summed for a
//! hit that starts after the last return claimed by the same key, so a
//! line or function that recurses into itself is not counted once per
//! nesting level.

use crate::parser::Event;
use crate::utils::config::{ticks_to_ms, ProfilerConfig};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::hash::Hash;

/// Statistics for one statement when several share a line
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandHit {
    pub line: u32,
    pub column: u32,
    pub hit_count: u32,
    /// Ticks spent exclusively in this statement
    pub self_duration: i64,
    pub text: String,
}

impl CommandHit {
    pub fn new(event: &Event) -> Self {
        Self {
            line: event.line(),
            column: event.column(),
            hit_count: 1,
            self_duration: event.self_duration,
            text: event.text().to_string(),
        }
    }

    // inclusive duration is not tracked per command, that would need return
    // marks per command to stay correct under recursion
    fn add(&mut self, event: &Event) {
        self.self_duration += event.self_duration;
        self.hit_count += 1;
    }
}

/// Aggregated cost of a line or a function
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LineProfile {
    /// Share of the trace duration spent here including callees
    pub percent: f64,
    pub self_percent: f64,
    pub memory_percent: f64,
    pub self_memory_percent: f64,

    pub hit_count: u32,

    /// Ticks including callees
    pub duration: i64,
    pub self_duration: i64,
    pub average: i64,
    pub self_average: i64,

    /// Allocated bytes including callees
    pub memory: i64,
    pub self_memory: i64,
    pub gc: i64,
    pub self_gc: i64,

    /// File name, or block id for code outside files
    pub name: String,
    pub line: u32,
    pub function: Option<String>,
    pub module: Option<String>,
    pub text: String,
    pub path: String,

    /// Sample of the events that hit this record
    pub hits: Vec<Event>,

    /// Statements on this line keyed by column
    pub command_hits: BTreeMap<u32, CommandHit>,
}

impl LineProfile {
    /// Fold one event into the record
    ///
    /// `inclusive` comes from `ReturnMarks::claim` for the record's key.
    pub fn record(&mut self, event: &Event, inclusive: bool, config: &ProfilerConfig) {
        self.self_duration += event.self_duration;
        self.self_memory += event.self_memory.allocated_bytes;
        self.self_gc += event.self_gc();

        if inclusive {
            self.duration += event.duration;
            self.memory += event.total_bytes;
            self.gc += event.total_gc;
        }

        self.hit_count += 1;

        if config.accepts_sample(self.hits.len()) {
            self.hits.push(event.clone());
        }

        self.command_hits
            .entry(event.column())
            .and_modify(|hit| hit.add(event))
            .or_insert_with(|| CommandHit::new(event));
    }

    /// Compute shares and per-hit averages once all events are recorded
    pub fn finalize(&mut self, totals: &Totals) {
        self.percent = share(self.duration, totals.duration);
        self.self_percent = share(self.self_duration, totals.duration);
        self.memory_percent = share(self.memory, totals.memory);
        self.self_memory_percent = share(self.self_memory, totals.memory);

        if self.hit_count > 0 {
            self.average = self.duration / i64::from(self.hit_count);
            self.self_average = self.self_duration / i64::from(self.hit_count);
        }
    }

    pub fn duration_ms(&self) -> f64 {
        ticks_to_ms(self.duration)
    }

    pub fn self_duration_ms(&self) -> f64 {
        ticks_to_ms(self.self_duration)
    }
}

/// Whole-trace totals that percentages are computed against
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Totals {
    pub duration: i64,
    pub memory: i64,
}

fn share(part: i64, total: i64) -> f64 {
    if total > 0 {
        // two decimals, same as the console views show
        ((part as f64 / total as f64) * 10_000.0).round() / 100.0
    } else {
        0.0
    }
}

/// Highest return index claimed per aggregation key
#[derive(Debug)]
pub struct ReturnMarks<K> {
    marks: HashMap<K, usize>,
}

impl<K: Hash + Eq> Default for ReturnMarks<K> {
    fn default() -> Self {
        Self {
            marks: HashMap::new(),
        }
    }
}

impl<K: Hash + Eq> ReturnMarks<K> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decide whether `event` contributes inclusive cost to `key`
    ///
    /// The first hit of a key always claims; later hits claim only after
    /// the previously claimed frame has returned. A claim moves the mark
    /// forward to the event's return index.
    pub fn claim(&mut self, key: K, event: &Event) -> bool {
        match self.marks.get_mut(&key) {
            None => {
                self.marks.insert(key, event.return_index);
                true
            }
            Some(mark) if event.index > *mark => {
                *mark = event.return_index;
                true
            }
            Some(_) => false,
        }
    }

    pub fn mark(&self, key: &K) -> Option<usize> {
        self.marks.get(key).copied()
    }
}
