//! Source text lookup for line aggregates.
//!
//! Reading script files and rendering dynamic blocks is the tracer's job;
//! this module only defines the seam the line aggregator resolves text
//! through, plus a resolver backed by the trace file's `sources` table.

use super::schema::SourceBlock;
use crate::utils::error::SourceError;
use log::debug;
use std::collections::HashMap;

/// Lines of one file or block
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceText {
    /// Line number of the first entry in `lines`
    pub start_line: u32,
    pub lines: Vec<String>,
}

impl SourceText {
    pub fn new(start_line: u32, content: &str) -> Self {
        Self {
            start_line,
            lines: content.lines().map(str::to_string).collect(),
        }
    }

    /// Trimmed text of an absolute line number, if it lies inside the block
    pub fn line_text(&self, line: u32) -> Option<&str> {
        let offset = line.checked_sub(self.start_line)?;
        self.lines.get(offset as usize).map(|l| l.trim())
    }
}

/// Resolves the text of a file or block by its source key
pub trait SourceResolver {
    fn resolve(&self, key: &str) -> Result<SourceText, SourceError>;
}

/// Resolver over the blocks embedded in a captured trace
#[derive(Debug, Clone, Default)]
pub struct SourceMap {
    blocks: HashMap<String, SourceBlock>,
}

impl SourceMap {
    pub fn new(blocks: HashMap<String, SourceBlock>) -> Self {
        debug!("Source map created with {} blocks", blocks.len());
        Self { blocks }
    }

    pub fn insert(&mut self, key: impl Into<String>, block: SourceBlock) {
        self.blocks.insert(key.into(), block);
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }
}

impl SourceResolver for SourceMap {
    /// Unknown keys resolve to an empty block so callers fall back to the
    /// event text; registered blocks without content are an error.
    fn resolve(&self, key: &str) -> Result<SourceText, SourceError> {
        match self.blocks.get(key) {
            None => Ok(SourceText::default()),
            Some(SourceBlock {
                start_line,
                content: Some(content),
            }) => Ok(SourceText::new(*start_line, content)),
            Some(SourceBlock { content: None, .. }) => {
                Err(SourceError::Unrenderable(key.to_string()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_text_relative_to_block_start() {
        let text = SourceText::new(10, "function f {\n    Get-Date\n}");
        assert_eq!(text.line_text(11), Some("Get-Date"));
        assert_eq!(text.line_text(9), None);
        assert_eq!(text.line_text(13), None);
    }

    #[test]
    fn test_source_map_resolution() {
        let mut map = SourceMap::default();
        map.insert(
            "a.ps1",
            SourceBlock {
                start_line: 1,
                content: Some("A\nB".to_string()),
            },
        );
        map.insert(
            "broken",
            SourceBlock {
                start_line: 1,
                content: None,
            },
        );

        assert_eq!(map.resolve("a.ps1").unwrap().line_text(2), Some("B"));
        assert_eq!(map.resolve("unknown").unwrap(), SourceText::default());
        assert_eq!(
            map.resolve("broken"),
            Err(SourceError::Unrenderable("broken".to_string()))
        );
    }
}
