//! Trace builders shared by the integration tests.
#![allow(dead_code)]

use script_profiler::parser::{
    derive_self_costs, Event, MemorySnapshot, SourceBlock, SourceLocation, SourceMap,
};
use script_profiler::utils::config::TICKS_PER_MILLISECOND;

pub const SCRIPT_PATH: &str = "/scripts/run.ps1";

pub fn ms(value: i64) -> i64 {
    value * TICKS_PER_MILLISECOND
}

/// Builds a trace bracketed by the tracer's enable/disable events
pub struct TraceBuilder {
    events: Vec<Event>,
    clock: i64,
    allocated: i64,
}

impl TraceBuilder {
    pub fn new() -> Self {
        let mut builder = Self {
            events: Vec::new(),
            clock: 0,
            allocated: 0,
        };
        builder.push(0, 0, None, "", 0, 0);
        builder.push(0, 0, None, "", 0, 0);
        builder
    }

    fn push(
        &mut self,
        level: usize,
        line: u32,
        function: Option<&str>,
        text: &str,
        self_ms: i64,
        bytes: i64,
    ) {
        self.events.push(Event {
            index: self.events.len(),
            level,
            start_time: self.clock,
            location: SourceLocation {
                path: Some(SCRIPT_PATH.to_string()),
                block_id: "block-1".to_string(),
                line,
                column: 1,
                text: text.to_string(),
            },
            function: function.map(String::from),
            is_in_file: true,
            memory: MemorySnapshot {
                allocated_bytes: self.allocated,
                ..MemorySnapshot::default()
            },
            ..Event::default()
        });
        self.clock += ms(self_ms);
        self.allocated += bytes;
    }

    /// Statement at `level` that runs for `self_ms` before the next one starts
    pub fn hit(mut self, level: usize, line: u32, function: Option<&str>, text: &str, self_ms: i64) -> Self {
        self.push(level, line, function, text, self_ms, 0);
        self
    }

    /// Like `hit`, allocating `bytes` before the next statement
    pub fn alloc(
        mut self,
        level: usize,
        line: u32,
        function: Option<&str>,
        text: &str,
        self_ms: i64,
        bytes: i64,
    ) -> Self {
        self.push(level, line, function, text, self_ms, bytes);
        self
    }

    /// Put the last statement into a module
    pub fn in_module(mut self, module: &str) -> Self {
        if let Some(event) = self.events.last_mut() {
            event.module = Some(module.to_string());
        }
        self
    }

    /// Close the trace with the disable events and derive self costs
    pub fn build(mut self) -> Vec<Event> {
        self.push(0, 0, None, "", 0, 0);
        self.push(0, 0, None, "", 0, 0);
        derive_self_costs(&mut self.events);
        self.events
    }
}

/// `A; B` at top level, 5ms each
pub fn two_statements() -> Vec<Event> {
    TraceBuilder::new()
        .hit(1, 1, None, "A", 5)
        .hit(1, 2, None, "B", 5)
        .build()
}

/// `f` calls `f_inner` twice; `f_inner` recurses once on line 5
///
/// ```text
/// 1: f
/// 2: function f { f_inner 1
/// 3:              f_inner 1 }
/// 5: function f_inner($n) { if ($n) { f_inner ($n - 1) } }
/// 9: done
/// ```
pub fn recursive_trace() -> Vec<Event> {
    let recurse = "if ($n) { f_inner ($n - 1) }";
    TraceBuilder::new()
        .hit(1, 1, None, "f", 1)
        .hit(2, 2, Some("f"), "f_inner 1", 1)
        .hit(3, 5, Some("f_inner"), recurse, 2)
        .hit(4, 5, Some("f_inner"), recurse, 3)
        .hit(2, 3, Some("f"), "f_inner 1", 1)
        .hit(3, 5, Some("f_inner"), recurse, 2)
        .hit(4, 5, Some("f_inner"), recurse, 3)
        .hit(1, 9, None, "done", 1)
        .build()
}

/// Resolver holding the text of the test script
pub fn script_sources(content: &str) -> SourceMap {
    let mut map = SourceMap::default();
    map.insert(
        SCRIPT_PATH,
        SourceBlock {
            start_line: 1,
            content: Some(content.to_string()),
        },
    );
    map
}
