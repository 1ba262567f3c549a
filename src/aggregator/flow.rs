//! Reconstruct call structure from a linear trace.
//!
//! The tracer only records the nesting level of each event. Comparing an
//! event's level with the next one tells whether it called into a deeper
//! frame, returned from one, or continued in place. Call events get their
//! inclusive cost once the matching return is seen.

use crate::parser::{Event, Flow};
use crate::utils::config::SENTINEL_EVENTS;
use log::{debug, warn};

/// Counts gathered while labeling a trace
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FlowSummary {
    pub calls: usize,
    pub returns: usize,
    /// Call frames never closed by a return
    pub open_frames: usize,
}

/// Label every event with its flow and fill in inclusive costs and links
///
/// The trailing sentinel events are never examined as the current event;
/// they only serve as lookahead.
pub fn process_flow(events: &mut [Event]) -> FlowSummary {
    let count = events.len();
    let mut summary = FlowSummary::default();
    let mut stack: Vec<usize> = Vec::new();
    let mut caller: Option<usize> = None;

    for i in 0..count.saturating_sub(SENTINEL_EVENTS) {
        let mut event = events[i].clone();
        let next_level = events[i + 1].level;
        let next_start = events[i + 1].start_time;
        let next_memory = events[i + 1].memory;

        if next_level > event.level {
            event.flow = Flow::Call;
            event.caller_index = caller;
            stack.push(i);
            caller = Some(i);
            summary.calls += 1;
        } else if next_level < event.level {
            event.flow = Flow::Return;
            event.close_in_place();
            event.caller_index = caller;

            // an unwind can leave several frames at once, close every frame
            // between this level and the next one
            let mut outermost = None;
            while stack.len() > next_level {
                let Some(call_index) = stack.pop() else {
                    break;
                };
                let call = &mut events[call_index];
                call.duration = next_start - call.start_time;
                call.total_bytes = next_memory.allocated_bytes - call.memory.allocated_bytes;
                call.total_gc = next_memory.gc_total() - call.memory.gc_total();
                call.return_index = i;
                outermost = Some(call_index);
            }

            if let Some(call_index) = outermost {
                caller = events[call_index].caller_index;
            }
            summary.returns += 1;
        } else {
            event.flow = Flow::Process;
            event.close_in_place();
            event.caller_index = caller;
        }

        events[i] = event;
    }

    summary.open_frames = stack.len();
    if summary.open_frames > 0 {
        warn!("{} call frames were never closed", summary.open_frames);
    }

    debug!(
        "Flow reconstructed: {} calls, {} returns over {} events",
        summary.calls, summary.returns, count
    );

    summary
}
