//! Bidder-specific override extraction from `ext.prebid.bidderconfig`.

use fpd_openrtb::{BidderConfig, FpdError};
use serde_json::Value;
use std::collections::BTreeSet;
use tracing::{debug, warn};

use crate::config::{BidderConfigPolicy, OnBidderConfigError};
use crate::fpd::{BidderConfigFpd, BidderFpd};
use crate::scope::Scope;
use crate::wrapper::RequestExt;

/// Index bidder overrides by bidder name and strip them from the request.
///
/// Any malformed entry fails the call and leaves `ext` unchanged.
pub fn extract_bidder_config_fpd(ext: &mut RequestExt) -> Result<BidderConfigFpd, FpdError> {
    extract_bidder_config_fpd_with(ext, &BidderConfigPolicy::default()).map(|(fpd, _)| fpd)
}

/// [`extract_bidder_config_fpd`] under an explicit policy.
///
/// Returns the overrides plus the errors of bidders skipped under
/// [`OnBidderConfigError::SkipBidder`]. A list that is not an array of
/// entries always fails the call, since no bidder can be blamed for it.
///
/// A bidder named by several entries gets the union of their fields; for a
/// key set twice within one scope the later entry wins.
pub fn extract_bidder_config_fpd_with(
    ext: &mut RequestExt,
    policy: &BidderConfigPolicy,
) -> Result<(BidderConfigFpd, Vec<FpdError>), FpdError> {
    let mut fpd = BidderConfigFpd::new();
    let mut skipped = Vec::new();

    let Some(mut prebid) = ext.prebid().cloned() else {
        return Ok((fpd, skipped));
    };
    let Some(raw) = prebid.bidderconfig.take() else {
        return Ok((fpd, skipped));
    };

    let entries: Vec<BidderConfig> =
        serde_json::from_value(raw).map_err(FpdError::bidder_config_list)?;

    let mut rejected: BTreeSet<String> = BTreeSet::new();
    for entry in &entries {
        let overrides = entry
            .config
            .as_ref()
            .and_then(|config| config.overrides(policy.accept_ortb2_alias));

        for bidder in &entry.bidders {
            if rejected.contains(bidder) {
                continue;
            }
            match decompose_overrides(bidder, overrides) {
                Ok(bidder_fpd) => fpd.merge_bidder(bidder, bidder_fpd),
                Err(err) => match policy.on_error {
                    OnBidderConfigError::AbortRequest => return Err(err),
                    OnBidderConfigError::SkipBidder => {
                        warn!(bidder = %bidder, error = %err, "skipping malformed bidder config");
                        fpd.remove(bidder);
                        rejected.insert(bidder.clone());
                        skipped.push(err);
                    }
                },
            }
        }
    }

    prebid.bidderconfig = None;
    ext.set_prebid(Some(prebid));

    debug!(
        entries = entries.len(),
        bidders = fpd.len(),
        skipped = skipped.len(),
        "extracted bidder first party data config"
    );
    Ok((fpd, skipped))
}

/// Split one entry's override object into per-scope field maps.
fn decompose_overrides(bidder: &str, overrides: Option<&Value>) -> Result<BidderFpd, FpdError> {
    let mut bidder_fpd = BidderFpd::default();

    let scopes = match overrides {
        None | Some(Value::Null) => return Ok(bidder_fpd),
        Some(Value::Object(scopes)) => scopes,
        Some(_) => {
            return Err(FpdError::bidder_config(
                bidder,
                None,
                "override object must be a JSON object",
            ))
        }
    };

    for scope in Scope::ALL {
        match scopes.get(scope.as_str()) {
            None | Some(Value::Null) => {}
            Some(Value::Object(fields)) => bidder_fpd.merge_scope(scope, fields.clone()),
            Some(_) => {
                return Err(FpdError::bidder_config(
                    bidder,
                    Some(scope.as_str()),
                    "must be a JSON object",
                ))
            }
        }
    }

    Ok(bidder_fpd)
}
