//! Bid request envelope.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::scope::{App, Site, User};

/// OpenRTB bid request.
///
/// Only the first-party data scopes and the impression list are modelled;
/// every other top-level field round-trips through `other` untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BidRequest {
    /// Request ID assigned by the exchange.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Impressions offered in this request.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub imp: Vec<Imp>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub site: Option<Site>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app: Option<App>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<User>,

    /// Request extension (`ext.prebid` lives here).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ext: Option<Value>,

    /// Unmodelled fields (device, regs, tmax, ...).
    #[serde(flatten)]
    pub other: Map<String, Value>,
}

impl BidRequest {
    /// Parse a bid request from JSON text.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Serialize to JSON (compact).
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// A single impression.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Imp {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tagid: Option<String>,

    /// Impression extension (bidder params live here).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ext: Option<Value>,

    #[serde(flatten)]
    pub other: Map<String, Value>,
}
