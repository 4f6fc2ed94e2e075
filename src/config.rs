use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// The number of `@` blocks parsed per pass unless configured otherwise.
pub const DEFAULT_MAX_MATCHES_PER_PASS: usize = 100;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    Read(#[from] std::io::Error),
    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("max_matches_per_pass must be at least 1")]
    ZeroMaxMatches,
}

/// Options consumed by the import core.
///
/// ```toml
/// max_matches_per_pass = 500
/// debug_timing = true
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserConfig {
    /// Maximum number of `@` blocks parsed before the scheduler yields to its host.
    pub max_matches_per_pass: usize,
    /// Log elapsed parse and normalize times.
    pub debug_timing: bool,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            max_matches_per_pass: DEFAULT_MAX_MATCHES_PER_PASS,
            debug_timing: false,
        }
    }
}

impl ParserConfig {
    pub fn with_max_matches(mut self, max_matches_per_pass: usize) -> Self {
        self.max_matches_per_pass = max_matches_per_pass;
        self
    }

    pub fn with_debug_timing(mut self, debug_timing: bool) -> Self {
        self.debug_timing = debug_timing;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_matches_per_pass == 0 {
            return Err(ConfigError::ZeroMaxMatches);
        }
        Ok(())
    }

    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }
}
