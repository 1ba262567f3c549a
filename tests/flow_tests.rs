mod common;

use common::{ms, recursive_trace, two_statements, TraceBuilder};
use pretty_assertions::assert_eq;
use script_profiler::aggregator::{process_flow, total_duration, total_self_duration};
use script_profiler::parser::Flow;

#[test]
fn test_every_call_has_a_return() {
    let mut events = recursive_trace();
    let summary = process_flow(&mut events);

    assert_eq!(summary.open_frames, 0);
    for event in events.iter().filter(|e| e.flow == Flow::Call) {
        assert!(event.return_index > event.index, "call {} never returned", event.index);
        assert_eq!(events[event.return_index].flow, Flow::Return);
    }
}

#[test]
fn test_unwind_closes_every_skipped_frame() {
    let mut events = recursive_trace();
    process_flow(&mut events);

    // level 4 -> level 2 leaves both f_inner frames at once
    assert_eq!(events[3].return_index, 5);
    assert_eq!(events[4].return_index, 5);
    assert_eq!(events[3].duration, ms(6));
    assert_eq!(events[4].duration, ms(5));

    // level 4 -> level 1 also leaves f
    assert_eq!(events[2].return_index, 8);
    assert_eq!(events[2].duration, ms(13));
}

#[test]
fn test_callers_are_restored_after_return() {
    let mut events = recursive_trace();
    process_flow(&mut events);

    assert_eq!(events[2].caller_index, Some(1));
    assert_eq!(events[3].caller_index, Some(2));
    assert_eq!(events[5].caller_index, Some(4));
    // back in f after the first f_inner returned
    assert_eq!(events[6].caller_index, Some(2));
    // back at top level
    assert_eq!(events[9].caller_index, Some(1));
}

#[test]
fn test_inclusive_never_below_self() {
    let mut events = recursive_trace();
    process_flow(&mut events);

    for event in &events[..events.len() - 2] {
        assert!(event.duration >= event.self_duration, "event {}", event.index);
    }
}

#[test]
fn test_self_costs_add_up_to_trace_duration() {
    let mut events = recursive_trace();
    process_flow(&mut events);

    assert_eq!(total_duration(&events), ms(14));
    assert_eq!(total_self_duration(&events), total_duration(&events));
}

#[test]
fn test_flat_trace_has_one_root_frame() {
    let mut events = two_statements();
    let summary = process_flow(&mut events);

    assert_eq!(events[1].flow, Flow::Call);
    assert_eq!(events[2].flow, Flow::Process);
    assert_eq!(events[3].flow, Flow::Return);
    assert_eq!(summary.calls, 1);
    assert_eq!(summary.returns, 1);
    assert_eq!(events[1].duration, ms(10));
}

#[test]
fn test_call_memory_includes_callees() {
    let mut events = TraceBuilder::new()
        .alloc(1, 1, None, "Get-Data", 1, 100)
        .alloc(2, 4, Some("Get-Data"), "$list = 1..100", 1, 400)
        .hit(1, 2, None, "done", 1)
        .build();
    process_flow(&mut events);

    assert_eq!(events[2].flow, Flow::Call);
    assert_eq!(events[2].self_memory.allocated_bytes, 100);
    assert_eq!(events[2].total_bytes, 500);
    assert_eq!(events[3].total_bytes, 400);
}
