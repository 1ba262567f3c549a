//! Configuration and constants for the profiler.

use super::error::ConfigError;
use log::debug;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Current report schema version
pub const SCHEMA_VERSION: &str = "1.0.0";

// Timestamps and durations are 100ns ticks
pub const TICKS_PER_MILLISECOND: i64 = 10_000;

/// Events recorded per aggregate unless all hits are requested
pub const DEFAULT_SAMPLE_CAP: usize = 100;

/// Entries in each top-N report view
pub const DEFAULT_TOP_N: usize = 50;

/// Leading and trailing events produced by enabling/disabling the tracer
pub const SENTINEL_EVENTS: usize = 2;

pub const SPEEDSCOPE_SCHEMA: &str = "https://www.speedscope.app/file-format-schema.json";
pub const DEFAULT_EXPORTER: &str = "script-profiler";

/// Function name the tracer reports for anonymous top-level code
pub const ANONYMOUS_BLOCK_NAME: &str = "<ScriptBlock>";

/// Display name for top-level code in function aggregates
pub const BODY_NAME: &str = "<body>";

/// Convert ticks to fractional milliseconds
pub fn ticks_to_ms(ticks: i64) -> f64 {
    ticks as f64 / TICKS_PER_MILLISECOND as f64
}

/// Rule that assigns events of a noisy subsystem to a fold group
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct FoldRule {
    /// Label given to matching events
    pub group: String,

    /// Module names that belong to the group
    #[serde(default)]
    pub modules: Vec<String>,

    /// File name suffixes that belong to the group (e.g. "Pester.psm1")
    #[serde(default)]
    pub path_suffixes: Vec<String>,
}

impl FoldRule {
    pub fn new(group: impl Into<String>) -> Self {
        Self {
            group: group.into(),
            ..Self::default()
        }
    }

    pub fn with_module(mut self, module: impl Into<String>) -> Self {
        self.modules.push(module.into());
        self
    }

    pub fn with_path_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.path_suffixes.push(suffix.into());
        self
    }

    /// Check whether an event's module or path falls under this rule
    pub fn matches(&self, module: Option<&str>, path: Option<&str>) -> bool {
        if let Some(module) = module {
            if self.modules.iter().any(|m| m == module) {
                return true;
            }
        }

        match path {
            Some(path) => self.path_suffixes.iter().any(|s| path.ends_with(s.as_str())),
            None => false,
        }
    }
}

/// Settings for one profiling pass
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ProfilerConfig {
    /// Noise subsystems to collapse in the event view
    #[serde(default)]
    pub fold_rules: Vec<FoldRule>,

    /// Maximum number of sample events kept per aggregate
    #[serde(default = "default_sample_cap")]
    pub sample_cap: usize,

    /// Keep every event as a sample, ignoring the cap
    #[serde(default)]
    pub collect_all: bool,

    /// Number of entries in each top-N view
    #[serde(default = "default_top_n")]
    pub top_n: usize,
}

fn default_sample_cap() -> usize {
    DEFAULT_SAMPLE_CAP
}

fn default_top_n() -> usize {
    DEFAULT_TOP_N
}

impl Default for ProfilerConfig {
    fn default() -> Self {
        Self {
            fold_rules: Vec::new(),
            sample_cap: DEFAULT_SAMPLE_CAP,
            collect_all: false,
            top_n: DEFAULT_TOP_N,
        }
    }
}

impl ProfilerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_fold_rule(mut self, rule: FoldRule) -> Self {
        self.add_fold_rule(rule);
        self
    }

    pub fn with_collect_all(mut self, collect_all: bool) -> Self {
        self.collect_all = collect_all;
        self
    }

    pub fn with_top_n(mut self, top_n: usize) -> Self {
        self.top_n = top_n;
        self
    }

    /// Whether another sample fits into a list that already holds `count`
    pub fn accepts_sample(&self, count: usize) -> bool {
        self.collect_all || count < self.sample_cap
    }

    /// Find the group an event belongs to, first matching rule wins
    pub fn group_for(&self, module: Option<&str>, path: Option<&str>) -> Option<&str> {
        self.fold_rules
            .iter()
            .find(|rule| rule.matches(module, path))
            .map(|rule| rule.group.as_str())
    }

    /// Merge a rule into an existing rule of the same group, or append it
    pub fn add_fold_rule(&mut self, rule: FoldRule) {
        match self.fold_rules.iter_mut().find(|r| r.group == rule.group) {
            Some(existing) => {
                existing.modules.extend(rule.modules);
                existing.path_suffixes.extend(rule.path_suffixes);
            }
            None => self.fold_rules.push(rule),
        }
    }
}

/// Load profiler settings from a TOML file
///
/// # Example
/// ```ignore
/// let config = load_config("profiler.toml")?;
/// ```
pub fn load_config(path: impl AsRef<Path>) -> Result<ProfilerConfig, ConfigError> {
    let path = path.as_ref();
    debug!("Loading profiler config from: {}", path.display());

    let contents = fs::read_to_string(path)?;
    let config: ProfilerConfig = toml::from_str(&contents)?;
    Ok(config)
}

/// Split a `GROUP=VALUE` command line argument
pub fn parse_fold_spec(spec: &str) -> Result<(String, String), ConfigError> {
    match spec.split_once('=') {
        Some((group, value)) if !group.trim().is_empty() && !value.trim().is_empty() => {
            Ok((group.trim().to_string(), value.trim().to_string()))
        }
        _ => Err(ConfigError::InvalidFoldRule(spec.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fold_rule_matches_module_and_suffix() {
        let rule = FoldRule::new("Pester")
            .with_module("Pester")
            .with_path_suffix("Pester.psm1");

        assert!(rule.matches(Some("Pester"), None));
        assert!(rule.matches(None, Some("/modules/Pester/Pester.psm1")));
        assert!(!rule.matches(Some("Other"), Some("/work/script.ps1")));
        assert!(!rule.matches(None, None));
    }

    #[test]
    fn test_add_fold_rule_merges_groups() {
        let mut config = ProfilerConfig::new();
        config.add_fold_rule(FoldRule::new("X").with_module("a"));
        config.add_fold_rule(FoldRule::new("X").with_path_suffix(".x"));

        assert_eq!(config.fold_rules.len(), 1);
        assert_eq!(config.group_for(None, Some("file.x")), Some("X"));
    }

    #[test]
    fn test_accepts_sample() {
        let config = ProfilerConfig::new();
        assert!(config.accepts_sample(99));
        assert!(!config.accepts_sample(100));
        assert!(config.with_collect_all(true).accepts_sample(100_000));
    }

    #[test]
    fn test_parse_fold_spec() {
        assert_eq!(
            parse_fold_spec("Pester=Pester.psm1").unwrap(),
            ("Pester".to_string(), "Pester.psm1".to_string())
        );
        assert!(parse_fold_spec("missing").is_err());
        assert!(parse_fold_spec("=value").is_err());
    }

    #[test]
    fn test_config_from_toml() {
        let config: ProfilerConfig = toml::from_str(
            r#"
            collect_all = true

            [[fold_rules]]
            group = "Pester"
            modules = ["Pester"]
            path_suffixes = ["Pester.psm1", "Pester.ps1"]
            "#,
        )
        .unwrap();

        assert!(config.collect_all);
        assert_eq!(config.sample_cap, DEFAULT_SAMPLE_CAP);
        assert_eq!(config.top_n, DEFAULT_TOP_N);
        assert_eq!(config.fold_rules[0].path_suffixes.len(), 2);
    }
}
