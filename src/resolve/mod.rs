//! Resolution phase: one independent view of the request per bidder.
//!
//! For every scope present in the request, a bidder receives a deep copy of
//! the scope with:
//! 1. `ext.data` rebuilt from the global free-form data overlaid with the
//!    bidder's override fields (override wins per key);
//! 2. structured data segments reattached verbatim.
//!
//! Nothing passed in is mutated. Bidders do not share scratch state, so they
//! may be resolved on separate threads; results are ordered by bidder name
//! either way.

mod precedence;

pub use precedence::merge_field_layers;

use fpd_openrtb::{BidRequest, FpdError};
use serde_json::{Map, Value};
use std::collections::BTreeSet;
use std::thread;
use tracing::{debug, warn};

use crate::config::ResolutionConfig;
use crate::fpd::{
    BidderConfigFpd, BidderFpd, FpdResolution, GlobalFpd, ResolvedFirstPartyData,
    StructuredFpd,
};
use crate::scope::{ScopeObject, DATA_KEY};

type BidderOutcome<'t> = (&'t str, Result<ResolvedFirstPartyData, FpdError>);

/// Read-only inputs shared by every bidder's resolution.
#[derive(Debug, Clone, Copy)]
pub struct ResolveInputs<'a> {
    pub request: &'a BidRequest,
    pub bidder_config: &'a BidderConfigFpd,
    pub global: &'a GlobalFpd,
    pub structured: &'a StructuredFpd,
}

/// Resolve first-party data for each target bidder.
///
/// Duplicate bidder names are resolved once. A bidder that fails is left out
/// of the resolved map and contributes one error; the others still resolve.
pub fn resolve_fpd<B: AsRef<str>>(
    request: &BidRequest,
    bidder_config: &BidderConfigFpd,
    global: &GlobalFpd,
    structured: &StructuredFpd,
    bidders: &[B],
    options: &ResolutionConfig,
) -> FpdResolution {
    let inputs = ResolveInputs {
        request,
        bidder_config,
        global,
        structured,
    };
    inputs.resolve(bidders, options)
}

impl<'a> ResolveInputs<'a> {
    /// Resolve every target bidder; see [`resolve_fpd`].
    pub fn resolve<B: AsRef<str>>(&self, bidders: &[B], options: &ResolutionConfig) -> FpdResolution {
        let targets: BTreeSet<&str> = bidders.iter().map(AsRef::as_ref).collect();

        let outcomes: Vec<BidderOutcome<'_>> = if options.fans_out(targets.len()) {
            self.resolve_parallel(&targets)
        } else {
            targets
                .iter()
                .map(|&bidder| (bidder, self.resolve_bidder(bidder)))
                .collect()
        };

        let mut resolution = FpdResolution::default();
        for (bidder, outcome) in outcomes {
            match outcome {
                Ok(resolved) => {
                    debug!(bidder, "resolved first party data");
                    resolution.resolved.insert(bidder.to_string(), resolved);
                }
                Err(err) => {
                    warn!(bidder, error = %err, "first party data resolution failed");
                    resolution.errors.push(err);
                }
            }
        }
        resolution
    }

    /// One scoped thread per bidder, joined in bidder-name order.
    fn resolve_parallel<'t>(&self, targets: &BTreeSet<&'t str>) -> Vec<BidderOutcome<'t>> {
        thread::scope(|s| {
            let handles: Vec<_> = targets
                .iter()
                .map(|&bidder| (bidder, s.spawn(move || self.resolve_bidder(bidder))))
                .collect();

            handles
                .into_iter()
                .map(|(bidder, handle)| match handle.join() {
                    Ok(outcome) => (bidder, outcome),
                    Err(panic) => std::panic::resume_unwind(panic),
                })
                .collect()
        })
    }

    /// Resolve a single bidder.
    pub fn resolve_bidder(&self, bidder: &str) -> Result<ResolvedFirstPartyData, FpdError> {
        let overrides = self.bidder_config.get(bidder);
        Ok(ResolvedFirstPartyData {
            site: self.resolve_scope(bidder, self.request.site.as_ref(), overrides)?,
            app: self.resolve_scope(bidder, self.request.app.as_ref(), overrides)?,
            user: self.resolve_scope(bidder, self.request.user.as_ref(), overrides)?,
        })
    }

    fn resolve_scope<T: ScopeObject>(
        &self,
        bidder: &str,
        original: Option<&T>,
        overrides: Option<&BidderFpd>,
    ) -> Result<Option<T>, FpdError> {
        let scope = T::SCOPE;
        let bidder_fields = overrides.and_then(|o| o.get(scope));

        let Some(original) = original else {
            return match bidder_fields {
                Some(_) => Err(FpdError::undefined_scope(bidder, scope.as_str())),
                None => Ok(None),
            };
        };

        let mut resolved = original.clone();

        let data = match (self.global.get(scope), bidder_fields) {
            (None, None) => None,
            (Some(Value::Object(global_fields)), bidder_fields) => Some(Value::Object(
                merge_field_layers([Some(global_fields), bidder_fields].into_iter().flatten()),
            )),
            (None, Some(bidder_fields)) => Some(Value::Object(bidder_fields.clone())),
            // nothing to merge into a non-object fragment, so it goes back as-is
            (Some(raw), None) => Some(raw.clone()),
            (Some(_), Some(_)) => {
                return Err(FpdError::extension(
                    bidder,
                    scope.as_str(),
                    "ext.data is not a JSON object",
                ))
            }
        };
        if let Some(data) = data {
            write_ext_data(&mut resolved, data)
                .map_err(|detail| FpdError::extension(bidder, scope.as_str(), detail))?;
        }

        if let Some(data) = self.structured.get(scope.data_key()) {
            resolved.set_data(data.to_vec());
        }

        Ok(Some(resolved))
    }
}

/// Set `ext.data` on `object`, keeping every other extension key.
fn write_ext_data<T: ScopeObject>(object: &mut T, data: Value) -> Result<(), &'static str> {
    let ext = object
        .ext_mut()
        .get_or_insert_with(|| Value::Object(Map::new()));
    match ext {
        Value::Object(fields) => {
            fields.insert(DATA_KEY.to_string(), data);
            Ok(())
        }
        _ => Err("ext is not a JSON object"),
    }
}
