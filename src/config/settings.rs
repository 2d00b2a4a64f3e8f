//! Typed settings with layered loading

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs;
use std::path::Path;
use tracing::debug;

use super::defaults::{
    builtin_layer, DEFAULT_ACCEPT_ORTB2_ALIAS, DEFAULT_PARALLEL, DEFAULT_PARALLEL_MIN_BIDDERS,
};
use super::merge::merge_layers;

/// Settings for first-party data extraction and resolution.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FpdConfig {
    /// Per-bidder resolution settings
    #[serde(default)]
    pub resolution: ResolutionConfig,

    /// Bidder config extraction settings
    #[serde(default)]
    pub bidder_config: BidderConfigPolicy,
}

/// How per-bidder resolution is scheduled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolutionConfig {
    /// Resolve each bidder on its own scoped thread
    #[serde(default = "default_parallel")]
    pub parallel: bool,

    /// Below this many target bidders resolution stays sequential
    #[serde(default = "default_parallel_min_bidders")]
    pub parallel_min_bidders: usize,
}

impl Default for ResolutionConfig {
    fn default() -> Self {
        Self {
            parallel: DEFAULT_PARALLEL,
            parallel_min_bidders: DEFAULT_PARALLEL_MIN_BIDDERS,
        }
    }
}

impl ResolutionConfig {
    /// Whether `bidder_count` targets should be resolved in parallel.
    pub fn fans_out(&self, bidder_count: usize) -> bool {
        self.parallel && bidder_count > 1 && bidder_count >= self.parallel_min_bidders
    }
}

/// How `ext.prebid.bidderconfig` is extracted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BidderConfigPolicy {
    /// What a malformed bidder entry does to the request
    #[serde(default)]
    pub on_error: OnBidderConfigError,

    /// Accept `config.ortb2` when `config.fpd` is absent
    #[serde(default = "default_accept_ortb2_alias")]
    pub accept_ortb2_alias: bool,
}

impl Default for BidderConfigPolicy {
    fn default() -> Self {
        Self {
            on_error: OnBidderConfigError::default(),
            accept_ortb2_alias: DEFAULT_ACCEPT_ORTB2_ALIAS,
        }
    }
}

/// Reaction to a malformed bidder config entry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OnBidderConfigError {
    /// Fail the whole extraction; no bidder is resolved.
    #[default]
    AbortRequest,
    /// Drop the offending bidder's overrides, report the error, continue.
    SkipBidder,
}

impl OnBidderConfigError {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AbortRequest => "abort_request",
            Self::SkipBidder => "skip_bidder",
        }
    }
}

fn default_parallel() -> bool {
    DEFAULT_PARALLEL
}

fn default_parallel_min_bidders() -> usize {
    DEFAULT_PARALLEL_MIN_BIDDERS
}

fn default_accept_ortb2_alias() -> bool {
    DEFAULT_ACCEPT_ORTB2_ALIAS
}

impl FpdConfig {
    /// Build settings from layers: built-in defaults, then the TOML file at
    /// `path` (skipped when it does not exist), then `overrides`.
    pub fn load(path: Option<&Path>, overrides: Option<Value>) -> Result<Self, ConfigError> {
        let mut layers = vec![builtin_layer()];

        if let Some(path) = path {
            if path.exists() {
                let contents =
                    fs::read_to_string(path).map_err(|e| ConfigError::IoError(e.to_string()))?;
                layers.push(Self::parse_toml(&contents)?);
                debug!(path = %path.display(), "loaded first party data settings file");
            } else {
                debug!(path = %path.display(), "settings file not found, using defaults");
            }
        }

        if let Some(overrides) = overrides {
            layers.push(overrides);
        }

        Self::from_merged(merge_layers(layers))
    }

    /// Build settings from TOML text layered over the built-in defaults.
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let layer = Self::parse_toml(contents)?;
        Self::from_merged(merge_layers(vec![builtin_layer(), layer]))
    }

    fn from_merged(merged: Value) -> Result<Self, ConfigError> {
        let config: FpdConfig = serde_json::from_value(merged)
            .map_err(|e| ConfigError::ParseError(format!("invalid settings: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    fn parse_toml(contents: &str) -> Result<Value, ConfigError> {
        let toml_value: toml::Value = toml::from_str(contents)
            .map_err(|e| ConfigError::ParseError(format!("TOML parse error: {}", e)))?;
        Ok(Self::toml_to_json(toml_value))
    }

    /// Convert TOML Value to JSON Value
    fn toml_to_json(toml: toml::Value) -> Value {
        match toml {
            toml::Value::String(s) => Value::String(s),
            toml::Value::Integer(i) => Value::Number(i.into()),
            toml::Value::Float(f) => serde_json::Number::from_f64(f)
                .map(Value::Number)
                .unwrap_or(Value::Null),
            toml::Value::Boolean(b) => Value::Bool(b),
            toml::Value::Datetime(dt) => Value::String(dt.to_string()),
            toml::Value::Array(arr) => {
                Value::Array(arr.into_iter().map(Self::toml_to_json).collect())
            }
            toml::Value::Table(table) => Value::Object(
                table
                    .into_iter()
                    .map(|(k, v)| (k, Self::toml_to_json(v)))
                    .collect(),
            ),
        }
    }

    /// Validate setting values
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.resolution.parallel_min_bidders == 0 {
            return Err(ConfigError::ValidationError(
                "resolution.parallel_min_bidders must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Validation error: {0}")]
    ValidationError(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults_match_builtin_layer() {
        let loaded = FpdConfig::load(None, None).unwrap();
        assert_eq!(loaded, FpdConfig::default());
        assert!(!loaded.resolution.parallel);
        assert_eq!(loaded.bidder_config.on_error, OnBidderConfigError::AbortRequest);
    }

    #[test]
    fn test_load_toml_file() {
        let mut temp = NamedTempFile::new().unwrap();
        writeln!(temp, "[resolution]").unwrap();
        writeln!(temp, "parallel = true").unwrap();
        writeln!(temp, "[bidder_config]").unwrap();
        writeln!(temp, "on_error = \"skip_bidder\"").unwrap();

        let config = FpdConfig::load(Some(temp.path()), None).unwrap();

        assert!(config.resolution.parallel);
        assert_eq!(config.resolution.parallel_min_bidders, 4);
        assert_eq!(config.bidder_config.on_error, OnBidderConfigError::SkipBidder);
        assert!(config.bidder_config.accept_ortb2_alias);
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = FpdConfig::load(Some(&dir.path().join("absent.toml")), None).unwrap();
        assert_eq!(config, FpdConfig::default());
    }

    #[test]
    fn test_overrides_win_over_file() {
        let mut temp = NamedTempFile::new().unwrap();
        writeln!(temp, "[resolution]").unwrap();
        writeln!(temp, "parallel_min_bidders = 8").unwrap();

        let overrides = serde_json::json!({"resolution": {"parallel_min_bidders": 2}});
        let config = FpdConfig::load(Some(temp.path()), Some(overrides)).unwrap();

        assert_eq!(config.resolution.parallel_min_bidders, 2);
    }

    #[test]
    fn test_zero_min_bidders_rejected() {
        let result = FpdConfig::from_toml_str("[resolution]\nparallel_min_bidders = 0\n");
        assert!(result.is_err());
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("parallel_min_bidders"));
    }

    #[test]
    fn test_unknown_policy_rejected() {
        let result = FpdConfig::from_toml_str("[bidder_config]\non_error = \"retry\"\n");
        assert!(matches!(result, Err(ConfigError::ParseError(_))));
    }

    #[test]
    fn test_invalid_toml_rejected() {
        let result = FpdConfig::from_toml_str("[resolution\n");
        assert!(matches!(result, Err(ConfigError::ParseError(_))));
    }

    #[test]
    fn test_fans_out() {
        let mut resolution = ResolutionConfig::default();
        assert!(!resolution.fans_out(10));

        resolution.parallel = true;
        assert!(!resolution.fans_out(3));
        assert!(resolution.fans_out(4));

        resolution.parallel_min_bidders = 1;
        assert!(!resolution.fans_out(1));
        assert!(resolution.fans_out(2));
    }

    #[test]
    fn test_policy_as_str_matches_serde() {
        for policy in [OnBidderConfigError::AbortRequest, OnBidderConfigError::SkipBidder] {
            let json = serde_json::to_value(policy).unwrap();
            assert_eq!(json, policy.as_str());
        }
    }
}
