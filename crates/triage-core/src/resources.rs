//! Country resource records.
//!
//! A record carries the emergency number and the support options shown to a
//! user. Records are looked up by country code with a fallback to a default
//! record. Lookup is the only fallible step; formatting a record never fails.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Used when a record has no (or a blank) emergency number.
pub const FALLBACK_EMERGENCY_NUMBER: &str = "112";

const DEFAULT_RECORD: &str = "default";

const BUILTIN_TR: &str = include_str!("../../../resources/tr.json");
const BUILTIN_DEFAULT: &str = include_str!("../../../resources/default.json");

/// Errors from resource lookup.
#[derive(Error, Debug)]
pub enum ResourceError {
    #[error("Failed to read resource file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to parse resource record: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("No resource record for '{0}' and no default record")]
    NotFound(String),
}

/// Contact data for one country.
///
/// Each field degrades on its own: a null or mistyped value falls back to
/// that field's default without discarding the rest of the record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountryResource {
    #[serde(
        default = "default_emergency_number",
        deserialize_with = "deserialize_emergency_number"
    )]
    pub emergency_number: String,

    #[serde(default, deserialize_with = "deserialize_lenient_list")]
    pub crisis_lines: Vec<String>,

    #[serde(default, deserialize_with = "deserialize_lenient_list")]
    pub public_health: Vec<String>,

    #[serde(default, deserialize_with = "deserialize_lenient_list")]
    pub private_options: Vec<String>,
}

fn default_emergency_number() -> String {
    FALLBACK_EMERGENCY_NUMBER.to_string()
}

/// Accepts a string or a bare number; anything else is the fallback number.
fn deserialize_emergency_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(number) => number,
        serde_json::Value::Number(number) => number.to_string(),
        _ => default_emergency_number(),
    })
}

/// Accepts an array (keeping string and number entries) or a single string.
/// Null and other shapes become an empty list.
fn deserialize_lenient_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::Array(items) => items
            .into_iter()
            .filter_map(|item| match item {
                serde_json::Value::String(entry) => Some(entry),
                serde_json::Value::Number(entry) => Some(entry.to_string()),
                _ => None,
            })
            .collect(),
        serde_json::Value::String(entry) => vec![entry],
        _ => Vec::new(),
    })
}

impl CountryResource {
    /// Parse a record, filling missing fields with safe defaults.
    pub fn from_json(json: &str) -> Result<Self, ResourceError> {
        Ok(serde_json::from_str(json)?)
    }

    /// The emergency number to show. Blank values fall back to "112".
    pub fn emergency_number(&self) -> &str {
        let number = self.emergency_number.trim();
        if number.is_empty() {
            FALLBACK_EMERGENCY_NUMBER
        } else {
            number
        }
    }
}

impl Default for CountryResource {
    fn default() -> Self {
        Self {
            emergency_number: default_emergency_number(),
            crisis_lines: Vec::new(),
            public_health: Vec::new(),
            private_options: Vec::new(),
        }
    }
}

/// Source of country resource records.
pub trait ResourceLookup: Send + Sync {
    /// Record for `country`, or the default record if the country has none.
    fn lookup(&self, country: &str) -> Result<CountryResource, ResourceError>;
}

/// Records stored as `{country}.json` files in a directory.
#[derive(Debug, Clone)]
pub struct ResourceDirectory {
    root: PathBuf,
}

impl ResourceDirectory {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn record_path(&self, name: &str) -> PathBuf {
        self.root.join(format!("{}.json", name.to_lowercase()))
    }
}

impl ResourceLookup for ResourceDirectory {
    fn lookup(&self, country: &str) -> Result<CountryResource, ResourceError> {
        let mut path = self.record_path(country);
        if !path.exists() {
            tracing::debug!(country, "No country record, using default");
            path = self.record_path(DEFAULT_RECORD);
        }

        if !path.exists() {
            return Err(ResourceError::NotFound(country.to_string()));
        }

        let contents = fs::read_to_string(&path)?;
        CountryResource::from_json(&contents)
    }
}

/// Records compiled into the binary (`tr` and `default`).
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinResources;

impl ResourceLookup for BuiltinResources {
    fn lookup(&self, country: &str) -> Result<CountryResource, ResourceError> {
        let json = match country.to_lowercase().as_str() {
            "tr" => BUILTIN_TR,
            _ => {
                tracing::debug!(country, "No built-in country record, using default");
                BUILTIN_DEFAULT
            }
        };
        CountryResource::from_json(json)
    }
}

/// Look up a record without ever failing.
///
/// Any lookup error degrades to [`CountryResource::default`].
pub fn lookup_or_default(lookup: &dyn ResourceLookup, country: &str) -> CountryResource {
    match lookup.lookup(country) {
        Ok(resource) => resource,
        Err(e) => {
            tracing::warn!(country, error = %e, "Resource lookup failed, using built-in default");
            CountryResource::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write(dir: &TempDir, name: &str, contents: &str) {
        fs::write(dir.path().join(name), contents).unwrap();
    }

    #[test]
    fn test_missing_fields_get_defaults() {
        let resource = CountryResource::from_json("{}").unwrap();
        assert_eq!(resource.emergency_number, "112");
        assert!(resource.crisis_lines.is_empty());
        assert!(resource.private_options.is_empty());
    }

    #[test]
    fn test_null_field_keeps_rest_of_record() {
        let resource =
            CountryResource::from_json(r#"{"emergency_number": null, "crisis_lines": ["X"]}"#)
                .unwrap();
        assert_eq!(resource.emergency_number, "112");
        assert_eq!(resource.crisis_lines, vec!["X"]);

        let resource =
            CountryResource::from_json(r#"{"emergency_number": "155", "crisis_lines": null}"#)
                .unwrap();
        assert_eq!(resource.emergency_number(), "155");
        assert!(resource.crisis_lines.is_empty());
    }

    #[test]
    fn test_mistyped_fields_degrade_individually() {
        let resource = CountryResource::from_json(
            r#"{
                "emergency_number": 911,
                "crisis_lines": "988 Lifeline",
                "public_health": [true, "Clinic", 42],
                "private_options": {"name": "x"}
            }"#,
        )
        .unwrap();

        assert_eq!(resource.emergency_number, "911");
        assert_eq!(resource.crisis_lines, vec!["988 Lifeline"]);
        assert_eq!(resource.public_health, vec!["Clinic", "42"]);
        assert!(resource.private_options.is_empty());

        let resource = CountryResource::from_json(r#"{"emergency_number": ["1", "2"]}"#).unwrap();
        assert_eq!(resource.emergency_number(), "112");
    }

    #[test]
    fn test_lookup_keeps_hotlines_when_number_is_null() {
        let dir = TempDir::new().unwrap();
        write(&dir, "tr.json", r#"{"emergency_number": null, "crisis_lines": ["Hat 182"]}"#);

        let resource = lookup_or_default(&ResourceDirectory::new(dir.path()), "tr");
        assert_eq!(resource.emergency_number(), "112");
        assert_eq!(resource.crisis_lines, vec!["Hat 182"]);
    }

    #[test]
    fn test_builtin_tr_record() {
        let resource = BuiltinResources.lookup("TR").unwrap();
        assert_eq!(resource.emergency_number(), "112");
        assert!(!resource.crisis_lines.is_empty());
    }

    #[test]
    fn test_builtin_unknown_country_falls_back() {
        let fallback = BuiltinResources.lookup("zz").unwrap();
        let default = BuiltinResources.lookup("default").unwrap();
        assert_eq!(fallback, default);
    }

    #[test]
    fn test_directory_country_record() {
        let dir = TempDir::new().unwrap();
        write(&dir, "de.json", r#"{"emergency_number": "110", "crisis_lines": ["Telefonseelsorge"]}"#);
        write(&dir, "default.json", r#"{"emergency_number": "112"}"#);

        let resource = ResourceDirectory::new(dir.path()).lookup("DE").unwrap();
        assert_eq!(resource.emergency_number, "110");
        assert_eq!(resource.crisis_lines, vec!["Telefonseelsorge"]);
    }

    #[test]
    fn test_directory_falls_back_to_default() {
        let dir = TempDir::new().unwrap();
        write(&dir, "default.json", r#"{"emergency_number": "999"}"#);

        let resource = ResourceDirectory::new(dir.path()).lookup("fr").unwrap();
        assert_eq!(resource.emergency_number, "999");
    }

    #[test]
    fn test_directory_without_default_is_not_found() {
        let dir = TempDir::new().unwrap();
        let result = ResourceDirectory::new(dir.path()).lookup("fr");
        assert!(matches!(result, Err(ResourceError::NotFound(_))));
    }

    #[test]
    fn test_lookup_or_default_absorbs_malformed_record() {
        let dir = TempDir::new().unwrap();
        write(&dir, "tr.json", "{ not json");

        let resource = lookup_or_default(&ResourceDirectory::new(dir.path()), "tr");
        assert_eq!(resource, CountryResource::default());
    }
}
