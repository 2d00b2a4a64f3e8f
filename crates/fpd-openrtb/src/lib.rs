//! OpenRTB wire types for first-party data handling.
//!
//! Defines the slice of an OpenRTB 2.5 bid request that carries first-party
//! data (site, app, user and their content/data containers), the Prebid
//! request extension that holds per-bidder overrides, and the error registry
//! shared by the extraction and resolution stages.

pub mod error;
pub mod ext;
pub mod request;
pub mod scope;

pub use error::{ErrorKind, FpdError};
pub use ext::{BidderConfig, BidderConfigBody, ExtRequestPrebid};
pub use request::{BidRequest, Imp};
pub use scope::{App, Content, Data, Publisher, Segment, Site, User};

/// OpenRTB version modelled by this crate.
pub const OPENRTB_VERSION: &str = "2.5";
