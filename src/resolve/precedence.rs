//! Field-level precedence across first-party data sources.

use crate::fpd::FieldMap;

/// Merge field layers left to right; on a key collision the later layer wins.
///
/// Values are replaced whole: an override for `k` replaces the earlier value
/// of `k` even when both are objects.
pub fn merge_field_layers<'a, I>(layers: I) -> FieldMap
where
    I: IntoIterator<Item = &'a FieldMap>,
{
    layers.into_iter().fold(FieldMap::new(), |mut merged, layer| {
        merged.extend(layer.iter().map(|(key, value)| (key.clone(), value.clone())));
        merged
    })
}
