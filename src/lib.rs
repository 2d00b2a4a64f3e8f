//! Prebid first-party data - extraction and per-bidder resolution
//!
//! Publishers attach first-party data (FPD) to OpenRTB bid requests in three
//! places: free-form `ext.data` on Site/App/User, structured `data` segments
//! under Site/App content and User, and bidder-specific overrides under
//! `ext.prebid.bidderconfig`. This crate strips all of it from the shared
//! request and gives each bidder its own view of the Site, App and User
//! objects with the right data merged back in.
//!
//! ```no_run
//! use prebid_fpd::{extract_fpd_for_bidders, FpdConfig, RequestWrapper};
//!
//! # fn main() -> Result<(), prebid_fpd::FpdError> {
//! let mut request = RequestWrapper::from_json(r#"{"id":"r1","site":{"ext":{"data":{"k":"v"}}}}"#)?;
//! let resolution = extract_fpd_for_bidders(&mut request, &["appnexus"], &FpdConfig::default())?;
//! for (bidder, fpd) in &resolution.resolved {
//!     println!("{bidder}: {:?}", fpd.site);
//! }
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod extract;
pub mod fpd;
pub mod pipeline;
pub mod resolve;
pub mod scope;
pub mod wrapper;

pub use config::{BidderConfigPolicy, ConfigError, FpdConfig, OnBidderConfigError, ResolutionConfig};
pub use extract::{
    extract_bidder_config_fpd, extract_bidder_config_fpd_with, extract_global_fpd,
    extract_structured_fpd,
};
pub use fpd::{
    BidderConfigFpd, BidderFpd, FieldMap, FpdResolution, GlobalFpd, ResolvedFirstPartyData,
    StructuredFpd,
};
pub use fpd_openrtb::{BidRequest, ErrorKind, FpdError};
pub use pipeline::{extract_fpd, extract_fpd_for_bidders, ExtractedFpd};
pub use resolve::resolve_fpd;
pub use scope::{DataKey, Scope, ScopeObject};
pub use wrapper::{ExtFields, RequestExt, RequestWrapper};
