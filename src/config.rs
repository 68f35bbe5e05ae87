// Copyright 2025 Cowboy AI, LLC.

//! Engine and batch driver configuration
//!
//! Both structs deserialize from JSON with every field optional; missing
//! fields take their defaults.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::codegen::GenerationLimits;

/// Errors raised while loading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The document is not valid JSON for the expected shape
    #[error("Invalid configuration document: {0}")]
    Parse(#[from] serde_json::Error),

    /// A numeric limit is out of range
    #[error("Invalid value for {field}: {reason}")]
    InvalidValue {
        /// Offending field
        field: &'static str,
        /// What is wrong
        reason: String,
    },
}

/// Composition engine settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct EngineConfig {
    /// Longest override chain a single member may have
    pub max_chain_length: usize,
    /// Most mixins one composite may hold
    pub max_mixin_slots: usize,
    /// Most target members one dispatch table may hold
    pub max_dispatch_entries: usize,
    /// Emit an info event for every composite built
    pub log_compositions: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_chain_length: 64,
            max_mixin_slots: 256,
            max_dispatch_entries: 4096,
            log_compositions: true,
        }
    }
}

impl EngineConfig {
    /// Parse and validate a JSON document
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: EngineConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject limits that would make every composition fail
    pub fn validate(&self) -> Result<(), ConfigError> {
        let limits = [
            ("max_chain_length", self.max_chain_length),
            ("max_mixin_slots", self.max_mixin_slots),
            ("max_dispatch_entries", self.max_dispatch_entries),
        ];
        for (field, value) in limits {
            if value == 0 {
                return Err(ConfigError::InvalidValue {
                    field,
                    reason: "must be greater than zero".to_string(),
                });
            }
        }
        Ok(())
    }

    /// Code generation limits
    pub fn limits(&self) -> GenerationLimits {
        GenerationLimits {
            max_chain_length: self.max_chain_length,
            max_mixin_slots: self.max_mixin_slots,
            max_dispatch_entries: self.max_dispatch_entries,
        }
    }

    /// JSON schema of the document format
    pub fn json_schema() -> schemars::schema::RootSchema {
        schemars::schema_for!(EngineConfig)
    }
}

/// Batch driver settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct MixerConfig {
    /// Contexts built at the same time
    pub concurrency: usize,
}

impl Default for MixerConfig {
    fn default() -> Self {
        Self { concurrency: 4 }
    }
}

impl MixerConfig {
    /// Parse and validate a JSON document
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: MixerConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject a zero concurrency
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.concurrency == 0 {
            return Err(ConfigError::InvalidValue {
                field: "concurrency",
                reason: "must be greater than zero".to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test]
    fn test_defaults_are_valid() {
        let config = EngineConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.limits().max_chain_length, 64);
        assert!(MixerConfig::default().validate().is_ok());
    }

    #[test]
    fn test_partial_document_uses_defaults() {
        let config = EngineConfig::from_json_str(r#"{ "max_chain_length": 8 }"#).unwrap();
        assert_eq!(config.max_chain_length, 8);
        assert_eq!(config.max_mixin_slots, 256);
        assert!(config.log_compositions);
    }

    #[test_case(r#"{ "max_chain_length": 0 }"#, "max_chain_length" ; "zero chain length")]
    #[test_case(r#"{ "max_mixin_slots": 0 }"#, "max_mixin_slots" ; "zero slots")]
    #[test_case(r#"{ "max_dispatch_entries": 0 }"#, "max_dispatch_entries" ; "zero entries")]
    fn test_zero_limits_rejected(json: &str, expected: &str) {
        match EngineConfig::from_json_str(json) {
            Err(ConfigError::InvalidValue { field, .. }) => assert_eq!(field, expected),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_malformed_document_is_parse_error() {
        assert!(matches!(
            EngineConfig::from_json_str("{ not json"),
            Err(ConfigError::Parse(_))
        ));
        assert!(matches!(
            MixerConfig::from_json_str(r#"{ "concurrency": 0 }"#),
            Err(ConfigError::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_schema_lists_limits() {
        let schema = serde_json::to_value(EngineConfig::json_schema()).unwrap();
        assert!(schema["properties"].get("max_dispatch_entries").is_some());
    }
}
