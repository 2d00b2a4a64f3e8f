//! Prebid request extension types.
//!
//! `ext.prebid.bidderconfig` carries per-bidder first-party data overrides:
//!
//! ```json
//! {"prebid": {"bidderconfig": [
//!     {"bidders": ["appnexus"], "config": {"fpd": {"site": {"k": "v"}}}}
//! ]}}
//! ```

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// `ext.prebid` of a bid request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtRequestPrebid {
    /// Raw bidder config list; parsed only when overrides are extracted so a
    /// malformed list is reported with bidder context.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bidderconfig: Option<Value>,

    /// All other prebid fields, preserved as-is.
    #[serde(flatten)]
    pub other: Map<String, Value>,
}

impl ExtRequestPrebid {
    /// True when no field (bidder config or otherwise) remains.
    pub fn is_empty(&self) -> bool {
        self.bidderconfig.is_none() && self.other.is_empty()
    }
}

/// One entry of `ext.prebid.bidderconfig`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BidderConfig {
    /// Bidders this entry applies to.
    #[serde(default)]
    pub bidders: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<BidderConfigBody>,
}

/// The `config` object of a bidder config entry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BidderConfigBody {
    /// Per-scope override object (`{"site": {...}, "app": {...}, "user": {...}}`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fpd: Option<Value>,

    /// OpenRTB 2.6 style spelling of the same override object.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ortb2: Option<Value>,
}

impl BidderConfigBody {
    /// The override object, preferring `fpd` over the `ortb2` spelling.
    pub fn overrides(&self, accept_ortb2: bool) -> Option<&Value> {
        match (&self.fpd, &self.ortb2) {
            (Some(fpd), _) => Some(fpd),
            (None, Some(ortb2)) if accept_ortb2 => Some(ortb2),
            _ => None,
        }
    }
}
