//! Collapse runs of noisy subsystem events.
//!
//! Events whose module or file matches a fold rule get that rule's group.
//! Every run of two or more consecutive events in the same group is
//! reduced to its last event, which takes over the run's start time,
//! caller and summed self duration. The other events in the run are
//! marked folded so views can hide them.

use crate::parser::Event;
use crate::utils::config::ProfilerConfig;
use log::debug;

/// Label events that belong to a configured noise group
///
/// Level-0 events are the tracer's own and never join a group, even when
/// they carry the profiled script's path.
pub fn assign_groups(events: &mut [Event], config: &ProfilerConfig) -> usize {
    let mut labeled = 0;
    for event in events.iter_mut() {
        event.group = if event.level == 0 {
            None
        } else {
            config
                .group_for(event.module.as_deref(), event.path())
                .map(String::from)
        };
        if event.group.is_some() {
            labeled += 1;
        }
    }
    labeled
}

/// Collapse consecutive same-group events, returns how many were folded
pub fn fold_groups(events: &mut [Event]) -> usize {
    let count = events.len();
    let mut fold_start = 0usize;
    let mut fold_group: Option<String> = None;
    let mut accumulated = 0i64;
    let mut folded = 0usize;

    for i in 0..count.saturating_sub(1) {
        let (entering, closing, inside) = {
            let group = events[i].group.as_deref();
            let next = events[i + 1].group.as_deref();
            let active = fold_group.as_deref();

            let entering = group.is_some() && group != active && next == group;
            let closing = !entering && active.is_some() && group == active && next != active;
            let inside = group.is_some() && group == active && i != fold_start;
            (entering, closing, inside)
        };

        if entering {
            fold_start = i;
            fold_group = events[i].group.clone();
            accumulated = 0;
            events[i].folded = true;
            folded += 1;
        } else if closing {
            close_run(events, fold_start, i, accumulated);
            fold_group = None;
            fold_start = 0;
            accumulated = 0;
        } else if inside {
            accumulated += events[i].self_duration;
            events[i].folded = true;
            folded += 1;
        }
    }

    // a run reaching the end of the buffer closes on its last event
    if let Some(last) = count.checked_sub(1) {
        if fold_group.is_some() && events[last].group == fold_group {
            close_run(events, fold_start, last, accumulated);
        }
    }

    folded
}

/// Move the run's start time, caller and summed self duration onto `end`
fn close_run(events: &mut [Event], start: usize, end: usize, accumulated: i64) {
    let start_time = events[start].start_time;
    let start_self = events[start].self_duration;
    let start_caller = events[start].caller_index;

    let event = &mut events[end];
    event.start_time = start_time;
    event.caller_index = start_caller;
    event.self_duration += start_self + accumulated;
}

/// Label and fold in one go
pub fn process_group_and_fold(events: &mut [Event], config: &ProfilerConfig) -> usize {
    if config.fold_rules.is_empty() {
        return 0;
    }

    let labeled = assign_groups(events, config);
    let folded = fold_groups(events);
    debug!("Fold: {} events grouped, {} folded", labeled, folded);
    folded
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::SourceLocation;
    use crate::utils::config::FoldRule;

    fn event(index: usize, module: Option<&str>) -> Event {
        Event {
            index,
            level: 1,
            start_time: index as i64 * 100,
            self_duration: 100,
            module: module.map(String::from),
            location: SourceLocation::default(),
            ..Event::default()
        }
    }

    #[test]
    fn test_assign_groups_by_module_and_suffix() {
        let config = ProfilerConfig::new().with_fold_rule(
            FoldRule::new("Pester")
                .with_module("Pester")
                .with_path_suffix("Pester.psm1"),
        );
        let mut events = vec![event(0, Some("Pester")), event(1, None), event(2, None)];
        events[2].location.path = Some("/m/Pester.psm1".to_string());

        assert_eq!(assign_groups(&mut events, &config), 2);
        assert_eq!(events[0].group.as_deref(), Some("Pester"));
        assert_eq!(events[1].group, None);
        assert_eq!(events[2].group.as_deref(), Some("Pester"));
    }

    #[test]
    fn test_adjacent_runs_of_different_groups() {
        let mut events: Vec<Event> = (0..6).map(|i| event(i, None)).collect();
        for (i, group) in ["A", "A", "B", "B", "B"].iter().enumerate() {
            events[i].group = Some(group.to_string());
        }

        let folded = fold_groups(&mut events);

        assert_eq!(folded, 3);
        assert!(!events[1].folded);
        assert_eq!(events[1].self_duration, 200);
        assert!(!events[4].folded);
        assert_eq!(events[4].start_time, 200);
        assert_eq!(events[4].self_duration, 300);
    }

    #[test]
    fn test_level_zero_events_are_never_grouped() {
        let config = ProfilerConfig::new().with_fold_rule(FoldRule::new("A").with_module("M"));
        let mut events = vec![event(0, Some("M")), event(1, Some("M"))];
        events[0].level = 0;

        assert_eq!(assign_groups(&mut events, &config), 1);
        assert_eq!(events[0].group, None);
        assert_eq!(events[1].group.as_deref(), Some("A"));
    }

    #[test]
    fn test_run_at_end_of_buffer_is_closed() {
        let mut events: Vec<Event> = (0..4).map(|i| event(i, None)).collect();
        for event in &mut events[1..] {
            event.group = Some("A".to_string());
        }

        let folded = fold_groups(&mut events);

        assert_eq!(folded, 2);
        assert!(events[1].folded);
        assert!(events[2].folded);
        assert!(!events[3].folded);
        assert_eq!(events[3].start_time, 100);
        assert_eq!(events[3].self_duration, 300);
    }

    #[test]
    fn test_no_rules_is_a_no_op() {
        let mut events = vec![event(0, Some("Pester")), event(1, Some("Pester"))];
        assert_eq!(process_group_and_fold(&mut events, &ProfilerConfig::new()), 0);
        assert!(events.iter().all(|e| e.group.is_none() && !e.folded));
    }
}
