//! Built-in defaults (layer 1)

use serde_json::Value;

/// Resolve bidders sequentially unless the host opts in.
pub const DEFAULT_PARALLEL: bool = false;

/// Smallest target bidder count worth spreading across threads.
pub const DEFAULT_PARALLEL_MIN_BIDDERS: usize = 4;

/// Malformed bidder config fails the whole request.
pub const DEFAULT_ON_ERROR: &str = "abort_request";

/// Accept `config.ortb2` as a spelling of `config.fpd`.
pub const DEFAULT_ACCEPT_ORTB2_ALIAS: bool = true;

/// The built-in layer as JSON, ready for merging.
pub fn builtin_layer() -> Value {
    serde_json::json!({
        "resolution": {
            "parallel": DEFAULT_PARALLEL,
            "parallel_min_bidders": DEFAULT_PARALLEL_MIN_BIDDERS
        },
        "bidder_config": {
            "on_error": DEFAULT_ON_ERROR,
            "accept_ortb2_alias": DEFAULT_ACCEPT_ORTB2_ALIAS
        }
    })
}
