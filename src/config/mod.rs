//! Configuration for first-party data processing
//!
//! Settings are merged from three layers, later layers winning:
//! 1. Built-in defaults
//! 2. An optional TOML file supplied by the host service
//! 3. Optional JSON overrides supplied by the embedding host

mod defaults;
mod merge;
mod settings;

pub use defaults::builtin_layer;
pub use merge::{deep_merge, merge_layers};
pub use settings::{
    BidderConfigPolicy, ConfigError, FpdConfig, OnBidderConfigError, ResolutionConfig,
};
