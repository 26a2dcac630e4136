//! Engine configuration parsing from YAML/JSON.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use thiserror::Error;

use super::schema::validate_config_schema;
use crate::crisis::{CrisisDetector, PatternSet};
use crate::questionnaire::{InstrumentDefinition, Instruments, ItemScoreRange};
use crate::types::InstrumentId;

/// Errors that can occur when loading configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to parse YAML: {0}")]
    YamlError(#[from] serde_yaml::Error),

    #[error("Failed to parse JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Config does not match schema: {}", .0.join("; "))]
    SchemaError(Vec<String>),

    #[error("Invalid crisis pattern '{id}': {source}")]
    InvalidPattern {
        id: String,
        #[source]
        source: regex::Error,
    },

    #[error("Config validation failed: {0}")]
    ValidationError(String),
}

/// Static tables the engine runs on.
///
/// Loaded once at startup and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct EngineConfig {
    /// Crisis phrases
    pub pattern_set: PatternSet,

    /// PHQ-9 and GAD-7 definitions
    pub instruments: Instruments,

    /// Accepted per-item score range
    #[serde(default)]
    pub item_score_range: ItemScoreRange,
}

impl EngineConfig {
    /// Parse a config from YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        let value: serde_json::Value = serde_yaml::from_str(yaml)?;
        Self::from_value(value)
    }

    /// Parse a config from JSON string.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let value: serde_json::Value = serde_json::from_str(json)?;
        Self::from_value(value)
    }

    /// Parse a config from a YAML file.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path.as_ref())?;
        tracing::debug!(path = %path.as_ref().display(), "Loading YAML engine config");
        Self::from_yaml(&contents)
    }

    /// Parse a config from a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path.as_ref())?;
        tracing::debug!(path = %path.as_ref().display(), "Loading JSON engine config");
        Self::from_json(&contents)
    }

    /// Parse a config file, choosing the format by extension (`.json` or YAML).
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => Self::from_json_file(path),
            _ => Self::from_yaml_file(path),
        }
    }

    fn from_value(value: serde_json::Value) -> Result<Self, ConfigError> {
        validate_config_schema(&value).map_err(ConfigError::SchemaError)?;
        let config: EngineConfig = serde_json::from_value(value)?;
        config.validate()?;
        Ok(config)
    }

    /// Check invariants the schema cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for id in InstrumentId::ALL {
            self.validate_instrument(id, self.instruments.get(id))?;
        }

        if self.item_score_range.min > self.item_score_range.max {
            return Err(ConfigError::ValidationError(format!(
                "item_score_range.min ({}) exceeds max ({})",
                self.item_score_range.min, self.item_score_range.max
            )));
        }

        self.validate_unique_pattern_ids()?;

        // Compile once to surface bad regexes at load time
        CrisisDetector::new(&self.pattern_set)?;

        Ok(())
    }

    fn validate_instrument(
        &self,
        id: InstrumentId,
        definition: &InstrumentDefinition,
    ) -> Result<(), ConfigError> {
        if definition.questions.is_empty() {
            return Err(ConfigError::ValidationError(format!(
                "instruments.{}.questions must not be empty",
                id
            )));
        }

        let t = &definition.thresholds;
        if !(t.low < t.moderate && t.moderate < t.high) {
            return Err(ConfigError::ValidationError(format!(
                "instruments.{}.thresholds must ascend (low {} < moderate {} < high {})",
                id, t.low, t.moderate, t.high
            )));
        }

        Ok(())
    }

    /// Ensure phrase IDs are present and unique.
    fn validate_unique_pattern_ids(&self) -> Result<(), ConfigError> {
        let mut seen = HashSet::new();

        for phrase in &self.pattern_set.phrases {
            if phrase.id.trim().is_empty() {
                return Err(ConfigError::ValidationError(
                    "Crisis phrase with empty id".to_string(),
                ));
            }
            if !seen.insert(&phrase.id) {
                return Err(ConfigError::ValidationError(format!(
                    "Duplicate crisis phrase ID: {}",
                    phrase.id
                )));
            }
        }

        Ok(())
    }
}
