//! Structured data segment extraction.

use fpd_openrtb::BidRequest;
use tracing::debug;

use crate::fpd::StructuredFpd;
use crate::scope::{DataKey, ScopeObject};

/// Move `site.content.data`, `app.content.data` and `user.data` into the
/// returned [`StructuredFpd`].
///
/// Containers are kept: a site whose content only held data keeps an empty
/// content object, which is not the same as having no content.
pub fn extract_structured_fpd(request: &mut BidRequest) -> StructuredFpd {
    let mut structured = StructuredFpd::new();

    take_segments(&mut structured, request.site.as_mut());
    take_segments(&mut structured, request.app.as_mut());
    take_segments(&mut structured, request.user.as_mut());

    debug!(
        keys = ?structured.keys().map(DataKey::as_str).collect::<Vec<_>>(),
        "extracted structured first party data"
    );
    structured
}

fn take_segments<T: ScopeObject>(structured: &mut StructuredFpd, object: Option<&mut T>) {
    if let Some(object) = object {
        structured.insert(T::SCOPE.data_key(), object.take_data());
    }
}
