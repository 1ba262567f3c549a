//! Per-line aggregation, grouped by file or block.

use super::profile::{LineProfile, ReturnMarks};
use crate::parser::{Event, SourceResolver, SourceText};
use crate::utils::config::{ProfilerConfig, SENTINEL_EVENTS};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::Path;

/// Lines of one file or dynamic block
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FileProfile {
    /// Absolute path, or the block id
    pub path: String,
    /// File name, or the block id
    pub name: String,
    pub lines: BTreeMap<u32, LineProfile>,
}

impl FileProfile {
    fn for_event(event: &Event) -> Self {
        let key = event.source_key().to_string();
        let name = match event.path() {
            Some(path) if event.is_in_file => Path::new(path)
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| key.clone()),
            _ => key.clone(),
        };

        Self {
            path: key,
            name,
            lines: BTreeMap::new(),
        }
    }
}

/// Aggregate a flow-labeled trace by (file or block, line)
///
/// Sentinel events at both ends are skipped. Events whose block text the
/// resolver fails to render are skipped with the rest of that block.
pub fn process_lines(
    events: &[Event],
    resolver: &dyn SourceResolver,
    config: &ProfilerConfig,
) -> BTreeMap<String, FileProfile> {
    let mut files: BTreeMap<String, FileProfile> = BTreeMap::new();
    let mut contents: HashMap<String, Option<SourceText>> = HashMap::new();
    let mut marks: ReturnMarks<(String, u32)> = ReturnMarks::new();
    let mut skipped = 0usize;

    for event in qualifying(events) {
        let key = event.source_key();

        if !contents.contains_key(key) {
            let content = match resolver.resolve(key) {
                Ok(text) => Some(text),
                Err(e) => {
                    warn!("Skipping lines of '{}': {}", key, e);
                    None
                }
            };
            contents.insert(key.to_string(), content);
        }

        let Some(Some(content)) = contents.get(key) else {
            skipped += 1;
            continue;
        };

        let file = files
            .entry(key.to_string())
            .or_insert_with(|| FileProfile::for_event(event));

        let line = event.line();
        let profile = file.lines.entry(line).or_insert_with(|| LineProfile {
            name: file.name.clone(),
            line,
            // braces entering or leaving a block can sit outside its text
            text: content
                .line_text(line)
                .unwrap_or_else(|| event.text().trim())
                .to_string(),
            function: event.function_name().map(String::from),
            module: event.module.clone(),
            path: file.path.clone(),
            ..LineProfile::default()
        });

        let inclusive = marks.claim((key.to_string(), line), event);
        profile.record(event, inclusive, config);
    }

    debug!(
        "Aggregated lines of {} files ({} events skipped)",
        files.len(),
        skipped
    );

    files
}

/// Events between the leading and trailing sentinels
pub(crate) fn qualifying(events: &[Event]) -> &[Event] {
    let end = events.len().saturating_sub(SENTINEL_EVENTS);
    if end <= SENTINEL_EVENTS {
        &[]
    } else {
        &events[SENTINEL_EVENTS..end]
    }
}
