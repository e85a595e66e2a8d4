use std::env;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::correlate::CorrelateParams;
use crate::parser::{DEFAULT_MAX_LINES, DEFAULT_SAMPLE_SIZE};

/// Env var naming the config file to load.
pub const CONFIG_FILE_ENV: &str = "ANALYZER_CONFIG_FILE";
pub const DEFAULT_CONFIG_FILE: &str = "analyzer.toml";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParseConfig {
    /// Raw-line cap per file; 0 disables the cap
    pub max_lines: u64,
    /// Lines sampled for format detection
    pub sample_size: usize,
}

impl Default for ParseConfig {
    fn default() -> Self {
        Self {
            max_lines: DEFAULT_MAX_LINES,
            sample_size: DEFAULT_SAMPLE_SIZE,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyzerConfig {
    pub parse: ParseConfig,
    pub correlate: CorrelateParams,
}

impl AnalyzerConfig {
    /// Priority: env vars > config file > built-in defaults. A missing or
    /// malformed file is not an error; it just means defaults.
    pub fn load() -> Self {
        let path = env::var(CONFIG_FILE_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_FILE.to_string());
        let mut config = Self::from_file(Path::new(&path)).unwrap_or_default();
        config.apply_env();
        config
    }

    pub fn from_file(path: &Path) -> Option<Self> {
        let text = std::fs::read_to_string(path).ok()?;
        match toml::from_str(&text) {
            Ok(config) => {
                debug!(path = %path.display(), "loaded config file");
                Some(config)
            }
            Err(err) => {
                warn!(path = %path.display(), error = %err, "bad config file ignored");
                None
            }
        }
    }

    fn apply_env(&mut self) {
        if let Some(v) = env_parse::<u64>("ANALYZER_MAX_LINES") {
            self.parse.max_lines = v;
        }
        if let Some(v) = env_parse::<usize>("ANALYZER_SAMPLE_SIZE") {
            self.parse.sample_size = v;
        }
        if let Some(v) = env_parse::<u64>("ANALYZER_WINDOW_BEFORE") {
            self.correlate.window_before_secs = v;
        }
        if let Some(v) = env_parse::<u64>("ANALYZER_WINDOW_AFTER") {
            self.correlate.window_after_secs = v;
        }
        if let Some(v) = env_parse::<usize>("ANALYZER_MAX_ANCHORS") {
            self.correlate.max_anchors = v;
        }
    }

    /// Window offsets may be zero; sampling and the per-window caps may not.
    pub fn validate(&self) -> Result<(), String> {
        if self.parse.sample_size == 0 {
            return Err("parse.sample_size must be greater than 0".to_string());
        }
        if self.correlate.max_anchors == 0 {
            return Err("correlate.max_anchors must be greater than 0".to_string());
        }
        if self.correlate.max_precursors == 0 {
            return Err("correlate.max_precursors must be greater than 0".to_string());
        }
        if self.correlate.max_followups == 0 {
            return Err("correlate.max_followups must be greater than 0".to_string());
        }
        Ok(())
    }
}

fn env_parse<T: std::str::FromStr>(name: &str) -> Option<T> {
    let raw = env::var(name).ok()?;
    match raw.parse() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!(var = name, value = %raw, "ignoring unparseable env override");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_defaults() {
        let config = AnalyzerConfig::default();
        assert_eq!(config.parse.max_lines, 10_000);
        assert_eq!(config.parse.sample_size, 100);
        assert_eq!(config.correlate.window_before_secs, 60);
        assert_eq!(config.correlate.window_after_secs, 30);
        assert_eq!(config.correlate.max_anchors, 10);
        assert_eq!(config.correlate.max_precursors, 50);
        assert_eq!(config.correlate.max_followups, 50);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("analyzer.toml");
        fs::write(
            &path,
            "[parse]\nmax_lines = 500\n\n[correlate]\nmax_anchors = 3\n",
        )
        .unwrap();

        let config = AnalyzerConfig::from_file(&path).unwrap();
        assert_eq!(config.parse.max_lines, 500);
        assert_eq!(config.parse.sample_size, 100);
        assert_eq!(config.correlate.max_anchors, 3);
        assert_eq!(config.correlate.window_before_secs, 60);
    }

    #[test]
    fn test_missing_file_is_none() {
        assert!(AnalyzerConfig::from_file(Path::new("/nonexistent/analyzer.toml")).is_none());
    }

    #[test]
    fn test_malformed_file_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("analyzer.toml");
        fs::write(&path, "parse = \"not a table\"").unwrap();
        assert!(AnalyzerConfig::from_file(&path).is_none());
    }

    #[test]
    fn test_validate_rejects_zero_limits() {
        let mut config = AnalyzerConfig::default();
        config.parse.sample_size = 0;
        assert!(config.validate().is_err());

        let mut config = AnalyzerConfig::default();
        config.correlate.max_anchors = 0;
        assert!(config.validate().is_err());

        let mut config = AnalyzerConfig::default();
        config.correlate.max_followups = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_offsets_and_uncapped_lines_are_legal() {
        let mut config = AnalyzerConfig::default();
        config.parse.max_lines = 0;
        config.correlate.window_before_secs = 0;
        config.correlate.window_after_secs = 0;
        assert!(config.validate().is_ok());
    }
}
