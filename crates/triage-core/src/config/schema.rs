//! JSON Schema validation for engine configuration.
//!
//! Configs are validated against schema/engine-config.schema.json before
//! they are deserialized.

use std::sync::OnceLock;

const ENGINE_CONFIG_SCHEMA: &str = include_str!("../../../../schema/engine-config.schema.json");

static VALIDATOR: OnceLock<Result<jsonschema::Validator, String>> = OnceLock::new();

fn compile_schema() -> Result<jsonschema::Validator, String> {
    let schema: serde_json::Value = serde_json::from_str(ENGINE_CONFIG_SCHEMA)
        .map_err(|e| format!("Embedded config schema is not valid JSON: {}", e))?;

    jsonschema::options()
        .build(&schema)
        .map_err(|e| format!("Embedded config schema does not compile: {}", e))
}

/// Validate a config JSON value against the schema.
///
/// Returns every violation found, formatted with its instance path. A
/// schema that fails to load is reported as a single violation.
pub fn validate_config_schema(config_json: &serde_json::Value) -> Result<(), Vec<String>> {
    let validator = VALIDATOR
        .get_or_init(compile_schema)
        .as_ref()
        .map_err(|e| vec![e.clone()])?;

    let errors: Vec<String> = validator
        .iter_errors(config_json)
        .map(|e| format!("{} at {}", e, e.instance_path))
        .collect();

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minimal() -> serde_json::Value {
        serde_json::json!({
            "pattern_set": {
                "version": "1",
                "phrases": [
                    { "id": "EN1", "language": "en", "pattern": "suicide" }
                ]
            },
            "instruments": {
                "phq9": {
                    "name": "PHQ-9",
                    "questions": ["Feeling down, depressed, or hopeless"],
                    "thresholds": { "low": 0, "moderate": 10, "high": 15 }
                },
                "gad7": {
                    "name": "GAD-7",
                    "questions": ["Trouble relaxing"]
                }
            }
        })
    }

    #[test]
    fn test_embedded_schema_compiles() {
        assert!(compile_schema().is_ok());
    }

    #[test]
    fn test_minimal_config_passes() {
        assert!(validate_config_schema(&minimal()).is_ok());
    }

    #[test]
    fn test_unknown_instrument_fails() {
        let mut value = minimal();
        value["instruments"]["bdi2"] = serde_json::json!({
            "name": "BDI-II",
            "questions": ["Sadness"]
        });
        assert!(validate_config_schema(&value).is_err());
    }

    #[test]
    fn test_missing_threshold_level_fails() {
        let mut value = minimal();
        value["instruments"]["phq9"]["thresholds"] = serde_json::json!({ "low": 0, "high": 15 });
        assert!(validate_config_schema(&value).is_err());
    }

    #[test]
    fn test_non_integer_cutoff_fails() {
        let mut value = minimal();
        value["instruments"]["phq9"]["thresholds"]["moderate"] = serde_json::json!(9.5);
        assert!(validate_config_schema(&value).is_err());
    }

    #[test]
    fn test_phrase_requires_pattern() {
        let mut value = minimal();
        value["pattern_set"]["phrases"][0] = serde_json::json!({ "id": "EN1", "language": "en" });
        let errors = validate_config_schema(&value).unwrap_err();
        assert!(errors.iter().any(|e| e.contains("/pattern_set/phrases/0")));
    }
}
