//! Per-function aggregation.

use super::lines::qualifying;
use super::profile::{LineProfile, ReturnMarks};
use crate::parser::Event;
use crate::utils::config::{ProfilerConfig, BODY_NAME};
use log::debug;
use std::collections::BTreeMap;

/// Identity of a function across the trace
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FunctionKey {
    pub module: Option<String>,
    pub function: Option<String>,
    /// File path, or block id for code outside files
    pub source: String,
}

impl FunctionKey {
    pub fn for_event(event: &Event) -> Self {
        Self {
            module: event.module.clone(),
            function: event.function_name().map(String::from),
            source: event.source_key().to_string(),
        }
    }
}

/// Aggregate a flow-labeled trace by (module, function, file or block)
pub fn process_functions(
    events: &[Event],
    config: &ProfilerConfig,
) -> BTreeMap<FunctionKey, LineProfile> {
    let mut functions: BTreeMap<FunctionKey, LineProfile> = BTreeMap::new();
    let mut marks: ReturnMarks<FunctionKey> = ReturnMarks::new();

    for event in qualifying(events) {
        let key = FunctionKey::for_event(event);

        let profile = functions.entry(key.clone()).or_insert_with(|| {
            let name = key.function.clone().unwrap_or_else(|| BODY_NAME.to_string());
            LineProfile {
                name: event.path().unwrap_or(&key.source).to_string(),
                line: event.line(),
                text: name.clone(),
                function: Some(name),
                module: key.module.clone(),
                path: key.source.clone(),
                ..LineProfile::default()
            }
        });

        let inclusive = marks.claim(key, event);
        profile.record(event, inclusive, config);
    }

    debug!("Aggregated {} functions", functions.len());
    functions
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::SourceLocation;

    fn event(index: usize, function: Option<&str>) -> Event {
        Event {
            index,
            level: 1,
            return_index: index,
            self_duration: 3,
            duration: 3,
            function: function.map(String::from),
            location: SourceLocation {
                block_id: "blk".to_string(),
                line: 1,
                ..SourceLocation::default()
            },
            ..Event::default()
        }
    }

    #[test]
    fn test_top_level_code_is_body() {
        let events = vec![
            event(0, None),
            event(1, None),
            event(2, None),
            event(3, Some("<ScriptBlock>")),
            event(4, Some("Get-Thing")),
            event(5, None),
            event(6, None),
        ];

        let functions = process_functions(&events, &ProfilerConfig::default());

        assert_eq!(functions.len(), 2);
        let body = functions
            .values()
            .find(|p| p.text == BODY_NAME)
            .unwrap();
        assert_eq!(body.hit_count, 2);
        assert_eq!(body.self_duration, 6);
    }
}
