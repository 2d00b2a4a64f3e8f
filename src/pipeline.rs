//! Orchestration: extract once, then resolve per bidder.
//!
//! Extraction mutates the request and must finish before any resolution
//! starts. The [`ExtractedFpd`] returned by [`extract_fpd`] is the only way to
//! reach resolution through this module, so the ordering holds by
//! construction.

use fpd_openrtb::{BidRequest, FpdError};
use tracing::debug;

use crate::config::{FpdConfig, ResolutionConfig};
use crate::extract::{extract_bidder_config_fpd_with, extract_global_fpd, extract_structured_fpd};
use crate::fpd::{BidderConfigFpd, FpdResolution, GlobalFpd, StructuredFpd};
use crate::resolve::ResolveInputs;
use crate::wrapper::RequestWrapper;

/// Byproducts of extraction, read-only from here on.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExtractedFpd {
    global: GlobalFpd,
    structured: StructuredFpd,
    bidder_config: BidderConfigFpd,
    skipped: Vec<FpdError>,
    resolution: ResolutionConfig,
}

impl ExtractedFpd {
    pub fn global(&self) -> &GlobalFpd {
        &self.global
    }

    pub fn structured(&self) -> &StructuredFpd {
        &self.structured
    }

    pub fn bidder_config(&self) -> &BidderConfigFpd {
        &self.bidder_config
    }

    /// Errors of bidder config entries dropped under the `skip_bidder` policy.
    pub fn skipped(&self) -> &[FpdError] {
        &self.skipped
    }

    /// Resolve first-party data for `bidders` against the reduced `request`.
    ///
    /// Errors from skipped bidder config entries come first, followed by
    /// resolution errors in bidder-name order.
    pub fn resolve<B: AsRef<str>>(&self, request: &BidRequest, bidders: &[B]) -> FpdResolution {
        let inputs = ResolveInputs {
            request,
            bidder_config: &self.bidder_config,
            global: &self.global,
            structured: &self.structured,
        };
        let mut resolution = inputs.resolve(bidders, &self.resolution);
        if !self.skipped.is_empty() {
            let mut errors = self.skipped.clone();
            errors.append(&mut resolution.errors);
            resolution.errors = errors;
        }
        resolution
    }
}

/// Run all extraction steps over `wrapper` and recompose its request.
///
/// On error the request may already have lost its global and structured
/// first-party data; the bidder config list is left in place.
pub fn extract_fpd(wrapper: &mut RequestWrapper, config: &FpdConfig) -> Result<ExtractedFpd, FpdError> {
    let global = extract_global_fpd(wrapper);
    let structured = extract_structured_fpd(wrapper.request_mut());
    let (bidder_config, skipped) =
        extract_bidder_config_fpd_with(wrapper.request_ext_mut()?, &config.bidder_config)?;
    wrapper.rebuild_request()?;

    debug!(
        global_scopes = global.len(),
        structured_keys = structured.len(),
        bidders = bidder_config.len(),
        skipped = skipped.len(),
        "extracted first party data"
    );

    Ok(ExtractedFpd {
        global,
        structured,
        bidder_config,
        skipped,
        resolution: config.resolution.clone(),
    })
}

/// Extract first-party data from `wrapper` and resolve it for `bidders`.
///
/// `Err` means the whole call was aborted and no bidder was resolved.
pub fn extract_fpd_for_bidders<B: AsRef<str>>(
    wrapper: &mut RequestWrapper,
    bidders: &[B],
    config: &FpdConfig,
) -> Result<FpdResolution, FpdError> {
    let extracted = extract_fpd(wrapper, config)?;
    Ok(extracted.resolve(wrapper.request(), bidders))
}
