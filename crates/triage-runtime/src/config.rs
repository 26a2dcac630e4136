//! Runtime configuration for the intake flow.

use std::path::PathBuf;
use std::time::Duration;

/// Enables the fixed-response responder (`"true"` in any case).
pub const ENV_MOCK_RESPONDER: &str = "TRIAGE_MOCK_LLM";

/// Directory of `{country}.json` resource records.
pub const ENV_RESOURCES_DIR: &str = "TRIAGE_RESOURCES_DIR";

/// Responder timeout in milliseconds.
pub const ENV_RESPONDER_TIMEOUT_MS: &str = "TRIAGE_RESPONDER_TIMEOUT_MS";

/// Configuration for the intake flow.
#[derive(Debug, Clone, PartialEq)]
pub struct RuntimeConfig {
    /// Use the fixed-response responder
    pub mock_responder: bool,

    /// Resource directory; `None` uses the built-in records
    pub resources_dir: Option<PathBuf>,

    /// How long a responder call may take before the fallback reply is used
    pub responder_timeout: Duration,

    /// Country used when a session does not name one
    pub default_country: String,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            mock_responder: true,
            resources_dir: None,
            responder_timeout: Duration::from_secs(10),
            default_country: "tr".to_string(),
        }
    }
}

impl RuntimeConfig {
    /// Read configuration from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from any key lookup. Unset or unparsable values
    /// keep their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(value) = lookup(ENV_MOCK_RESPONDER) {
            config.mock_responder = value.eq_ignore_ascii_case("true");
        }

        if let Some(dir) = lookup(ENV_RESOURCES_DIR).filter(|d| !d.trim().is_empty()) {
            config.resources_dir = Some(PathBuf::from(dir));
        }

        if let Some(raw) = lookup(ENV_RESPONDER_TIMEOUT_MS) {
            match raw.trim().parse::<u64>() {
                Ok(ms) => config.responder_timeout = Duration::from_millis(ms),
                Err(e) => {
                    tracing::warn!(value = %raw, error = %e, "Ignoring invalid responder timeout")
                }
            }
        }

        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = RuntimeConfig::from_lookup(lookup(&[]));
        assert!(config.mock_responder);
        assert_eq!(config.resources_dir, None);
        assert_eq!(config.responder_timeout, Duration::from_secs(10));
        assert_eq!(config.default_country, "tr");
    }

    #[test]
    fn test_mock_flag_is_case_insensitive() {
        let config = RuntimeConfig::from_lookup(lookup(&[(ENV_MOCK_RESPONDER, "TRUE")]));
        assert!(config.mock_responder);

        let config = RuntimeConfig::from_lookup(lookup(&[(ENV_MOCK_RESPONDER, "no")]));
        assert!(!config.mock_responder);
    }

    #[test]
    fn test_overrides() {
        let config = RuntimeConfig::from_lookup(lookup(&[
            (ENV_RESOURCES_DIR, "/srv/resources"),
            (ENV_RESPONDER_TIMEOUT_MS, "250"),
        ]));
        assert_eq!(config.resources_dir, Some(PathBuf::from("/srv/resources")));
        assert_eq!(config.responder_timeout, Duration::from_millis(250));
    }

    #[test]
    fn test_invalid_timeout_keeps_default() {
        let config = RuntimeConfig::from_lookup(lookup(&[(ENV_RESPONDER_TIMEOUT_MS, "soon")]));
        assert_eq!(config.responder_timeout, Duration::from_secs(10));
    }
}
