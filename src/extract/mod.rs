//! Extraction phase: lift first-party data out of the request.
//!
//! Every extractor mutates the request it is given. Run them in order
//! (global, structured, bidder config) and recompose the request before
//! handing it downstream; [`crate::pipeline::extract_fpd`] does both.

mod bidder_config;
mod global;
mod structured;

pub use bidder_config::{extract_bidder_config_fpd, extract_bidder_config_fpd_with};
pub use global::extract_global_fpd;
pub use structured::extract_structured_fpd;
