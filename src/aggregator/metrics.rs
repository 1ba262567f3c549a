//! Trace totals and top-N views over aggregates.
//!
//! The top views are the primary entry points for finding slow code:
//! what took longest including callees, what took longest by itself,
//! what ran most often and what allocated most.

use super::lines::qualifying;
use super::profile::{LineProfile, Totals};
use crate::parser::Event;
use crate::utils::config::SENTINEL_EVENTS;
use log::debug;
use serde::{Deserialize, Serialize};

/// Top-N rankings of one kind of aggregate
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TopViews {
    pub duration: Vec<LineProfile>,
    pub self_duration: Vec<LineProfile>,
    pub hit_count: Vec<LineProfile>,
    pub memory: Vec<LineProfile>,
    pub self_memory: Vec<LineProfile>,
}

impl TopViews {
    /// Rank `profiles` five ways, keeping `top_n` entries per view
    pub fn from_profiles(profiles: &[LineProfile], top_n: usize) -> Self {
        debug!("Calculating top {} views from {} aggregates", top_n, profiles.len());

        Self {
            duration: top_by(profiles, top_n, |p| p.duration),
            self_duration: top_by(profiles, top_n, |p| p.self_duration),
            hit_count: top_by(profiles, top_n, |p| i64::from(p.hit_count)),
            memory: top_by(profiles, top_n, |p| p.memory),
            self_memory: top_by(profiles, top_n, |p| p.self_memory),
        }
    }
}

/// Highest `top_n` profiles by `key`, without their event samples
///
/// The full records, samples included, stay in the report's line list.
pub fn top_by<F>(profiles: &[LineProfile], top_n: usize, key: F) -> Vec<LineProfile>
where
    F: Fn(&LineProfile) -> i64,
{
    let mut ranked: Vec<&LineProfile> = profiles.iter().collect();
    // stable sort keeps input order for ties
    ranked.sort_by(|a, b| key(b).cmp(&key(a)));

    ranked
        .into_iter()
        .take(top_n)
        .map(|profile| LineProfile {
            hits: Vec::new(),
            ..profile.clone()
        })
        .collect()
}

/// Ticks from the first real event to the first trailing sentinel
pub fn total_duration(events: &[Event]) -> i64 {
    if events.len() <= SENTINEL_EVENTS * 2 {
        return 0;
    }
    let start = events[SENTINEL_EVENTS].start_time;
    let end = events[events.len() - SENTINEL_EVENTS].start_time;
    end - start
}

/// Bytes allocated by all real events
pub fn total_memory(events: &[Event]) -> i64 {
    qualifying(events)
        .iter()
        .map(|e| e.self_memory.allocated_bytes)
        .sum()
}

/// Totals percentages are computed against
pub fn trace_totals(events: &[Event]) -> Totals {
    Totals {
        duration: total_duration(events),
        memory: total_memory(events),
    }
}

/// Sum of self duration over all real events
pub fn total_self_duration(events: &[Event]) -> i64 {
    qualifying(events).iter().map(|e| e.self_duration).sum()
}
