//! JSON fixture corpus for first-party data tests
//!
//! Each directory under `tests/fixtures/` holds one case per `.json` file.
//! All cases share the [`FpdFixture`] schema; a case omits whatever its test
//! does not read.

#![allow(dead_code)]

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use prebid_fpd::{
    BidRequest, BidderConfigFpd, FpdConfig, FpdError, GlobalFpd, ResolvedFirstPartyData,
    StructuredFpd,
};
use serde_json::Value;

/// Path to a fixture directory
pub fn fixture_dir(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name)
}

/// One fixture case
#[derive(Debug, Clone, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FpdFixture {
    pub description: String,

    /// Full bid request fed to the code under test
    #[serde(default)]
    pub input_request: Option<Value>,

    /// `ext.prebid` object, for bidder config extraction cases
    #[serde(default)]
    pub input_prebid: Option<Value>,

    /// Request expected after extraction
    #[serde(default)]
    pub output_request: Option<Value>,

    #[serde(default)]
    pub bidders: Vec<String>,

    /// Settings override layer, same shape as the TOML file
    #[serde(default)]
    pub config: Option<Value>,

    #[serde(default)]
    pub global_fpd: GlobalFpd,

    #[serde(default)]
    pub structured_fpd: StructuredFpd,

    #[serde(default)]
    pub bidder_config_fpd: BidderConfigFpd,

    #[serde(default)]
    pub resolved: BTreeMap<String, ResolvedFirstPartyData>,

    /// Expected errors, in order
    #[serde(default)]
    pub errors: Vec<ExpectedError>,

    /// The call is expected to fail outright with `errors[0]`
    #[serde(default)]
    pub aborted: bool,
}

/// Expected error, matched loosely on its message
#[derive(Debug, Clone, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExpectedError {
    #[serde(default)]
    pub bidder: Option<String>,
    #[serde(default)]
    pub scope: Option<String>,
    pub message_contains: String,
}

impl ExpectedError {
    pub fn assert_matches(&self, actual: &FpdError, case: &str) {
        assert_eq!(actual.bidder, self.bidder, "{}: wrong bidder on {}", case, actual);
        assert_eq!(actual.scope, self.scope, "{}: wrong scope on {}", case, actual);
        assert!(
            actual.message.contains(&self.message_contains),
            "{}: expected message containing {:?}, got {:?}",
            case,
            self.message_contains,
            actual.message
        );
    }
}

/// Assert `actual` matches `expected` one to one, in order.
pub fn assert_errors(expected: &[ExpectedError], actual: &[FpdError], case: &str) {
    assert_eq!(
        actual.len(),
        expected.len(),
        "{}: wrong number of errors: {:?}",
        case,
        actual
    );
    for (expected, actual) in expected.iter().zip(actual) {
        expected.assert_matches(actual, case);
    }
}

impl FpdFixture {
    /// Load a single case
    pub fn load(path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        let content = std::fs::read_to_string(path)?;
        let fixture: FpdFixture = serde_json::from_str(&content)?;
        Ok(fixture)
    }

    /// Load every case in a fixture directory, ordered by file name
    pub fn load_dir(name: &str) -> Result<Vec<(String, Self)>, Box<dyn std::error::Error>> {
        let mut paths: Vec<PathBuf> = std::fs::read_dir(fixture_dir(name))?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| path.extension().map_or(false, |ext| ext == "json"))
            .collect();
        paths.sort();

        paths
            .into_iter()
            .map(|path| {
                let case = path
                    .file_stem()
                    .map(|stem| stem.to_string_lossy().into_owned())
                    .unwrap_or_default();
                Ok((case, Self::load(&path)?))
            })
            .collect()
    }

    pub fn config(&self) -> FpdConfig {
        FpdConfig::load(None, self.config.clone()).expect("fixture config is valid")
    }

    pub fn request(&self) -> BidRequest {
        let value = self.input_request.clone().expect("fixture has input_request");
        serde_json::from_value(value).expect("input_request is a bid request")
    }

    pub fn expected_request(&self) -> Option<BidRequest> {
        self.output_request
            .clone()
            .map(|value| serde_json::from_value(value).expect("output_request is a bid request"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixture_dirs_load() {
        for dir in ["extract_bidder_config", "resolve", "extract_for_bidders"] {
            let cases = FpdFixture::load_dir(dir).expect("Failed to load fixtures");
            assert!(cases.len() >= 3, "Expected at least 3 cases in {}", dir);
        }
    }
}
