//! Error types for first-party data processing.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Error kinds reported by extraction and resolution.
///
/// These codes are stable and used for automation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    /// JSON that must be an object is missing that shape or fails to parse.
    MalformedInput,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MalformedInput => write!(f, "MALFORMED_INPUT"),
        }
    }
}

/// A first-party data error.
///
/// Errors are values: extraction returns at most one (and aborts), resolution
/// collects one per failed bidder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct FpdError {
    /// Error kind from the registry.
    pub kind: ErrorKind,
    /// Human-readable, single-line message naming the offending context.
    pub message: String,
    /// Bidder whose configuration or resolution failed, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bidder: Option<String>,
    /// Scope ("site", "app" or "user") involved, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
}

impl FpdError {
    /// Create a MALFORMED_INPUT error without bidder or scope context.
    pub fn malformed_input(message: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::MalformedInput,
            message: message.into(),
            bidder: None,
            scope: None,
        }
    }

    /// Attach the bidder this error belongs to.
    pub fn with_bidder(mut self, bidder: impl Into<String>) -> Self {
        self.bidder = Some(bidder.into());
        self
    }

    /// Attach the scope this error belongs to.
    pub fn with_scope(mut self, scope: impl Into<String>) -> Self {
        self.scope = Some(scope.into());
        self
    }

    /// The request `ext` (or `ext.prebid`) could not be decomposed.
    pub fn request_extension(detail: impl fmt::Display) -> Self {
        Self::malformed_input(format!("failed to parse request ext: {}", detail))
    }

    /// The `ext.prebid.bidderconfig` list could not be parsed.
    pub fn bidder_config_list(detail: impl fmt::Display) -> Self {
        Self::malformed_input(format!(
            "failed to parse ext.prebid.bidderconfig: {}",
            detail
        ))
    }

    /// A bidder's override object is not usable.
    ///
    /// `scope` is `None` when the override object itself (rather than one of
    /// its scopes) is malformed.
    pub fn bidder_config(bidder: &str, scope: Option<&str>, detail: impl fmt::Display) -> Self {
        let err = match scope {
            Some(scope) => Self::malformed_input(format!(
                "invalid first party data config for bidder {}: {} {}",
                bidder, scope, detail
            ))
            .with_scope(scope),
            None => Self::malformed_input(format!(
                "invalid first party data config for bidder {}: {}",
                bidder, detail
            )),
        };
        err.with_bidder(bidder)
    }

    /// A scope extension could not be decomposed while resolving a bidder.
    pub fn extension(bidder: &str, scope: &str, detail: impl fmt::Display) -> Self {
        Self::malformed_input(format!(
            "cannot resolve first party data for bidder {}: {} {}",
            bidder, scope, detail
        ))
        .with_bidder(bidder)
        .with_scope(scope)
    }

    /// A bidder override targets a scope the request does not have.
    pub fn undefined_scope(bidder: &str, scope: &str) -> Self {
        Self::malformed_input(format!(
            "incorrect first party data for bidder {}: {} object is not defined in request, but defined in FPD config",
            bidder, scope
        ))
        .with_bidder(bidder)
        .with_scope(scope)
    }
}
