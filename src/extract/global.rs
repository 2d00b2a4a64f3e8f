//! Free-form FPD extraction from scope extensions.

use tracing::debug;

use crate::fpd::GlobalFpd;
use crate::scope::{Scope, DATA_KEY};
use crate::wrapper::RequestWrapper;

/// Move each scope's `ext.data` into the returned [`GlobalFpd`].
///
/// The `data` key is removed whatever its type, so re-running extraction is
/// a no-op. A `null` value is dropped without producing an entry. Other
/// extension keys are untouched; an extension left empty is recomposed as
/// absent. Call [`RequestWrapper::rebuild_request`] to see the reduced request.
pub fn extract_global_fpd(request: &mut RequestWrapper) -> GlobalFpd {
    let mut global = GlobalFpd::new();

    for scope in Scope::ALL {
        let Some(ext) = request.scope_ext_mut(scope) else {
            continue;
        };
        match ext.remove(DATA_KEY) {
            Some(data) if !data.is_null() => global.insert(scope, data),
            _ => {}
        }
    }

    debug!(
        scopes = ?global.scopes().map(Scope::as_str).collect::<Vec<_>>(),
        "extracted global first party data"
    );
    global
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn wrapper(value: Value) -> RequestWrapper {
        RequestWrapper::new(serde_json::from_value(value).unwrap())
    }

    #[test]
    fn test_extracts_every_scope() {
        let mut req = wrapper(json!({
            "site": {"id": "s", "ext": {"data": {"somesitefpd": "sitefpdDataTest"}}},
            "app": {"id": "a", "ext": {"data": {"someappfpd": "appfpdDataTest"}}},
            "user": {"id": "u", "ext": {"data": {"someuserfpd": "userfpdDataTest"}}}
        }));

        let global = extract_global_fpd(&mut req);
        req.rebuild_request().unwrap();

        assert_eq!(global.len(), 3);
        assert_eq!(global.get(Scope::Site), Some(&json!({"somesitefpd": "sitefpdDataTest"})));
        assert_eq!(global.get(Scope::App), Some(&json!({"someappfpd": "appfpdDataTest"})));
        assert_eq!(global.get(Scope::User), Some(&json!({"someuserfpd": "userfpdDataTest"})));
        assert!(req.request().site.as_ref().unwrap().ext.is_none());
        assert!(req.request().app.as_ref().unwrap().ext.is_none());
        assert!(req.request().user.as_ref().unwrap().ext.is_none());
    }

    #[test]
    fn test_unrelated_ext_keys_survive() {
        let mut req = wrapper(json!({
            "site": {"ext": {"data": {"k": "v"}, "amp": 1}}
        }));

        extract_global_fpd(&mut req);
        req.rebuild_request().unwrap();

        assert_eq!(req.request().site.as_ref().unwrap().ext, Some(json!({"amp": 1})));
    }

    #[test]
    fn test_second_run_is_noop() {
        let mut req = wrapper(json!({"user": {"ext": {"data": {"k": "v"}}}}));

        let first = extract_global_fpd(&mut req);
        req.rebuild_request().unwrap();
        let after_first = req.canonical_json().unwrap();

        let second = extract_global_fpd(&mut req);
        req.rebuild_request().unwrap();

        assert_eq!(first.len(), 1);
        assert!(second.is_empty());
        assert_eq!(req.canonical_json().unwrap(), after_first);
    }

    #[test]
    fn test_no_fpd_leaves_request_alone() {
        let raw = json!({
            "id": "bid_id",
            "site": {"id": "reqSiteId", "page": "http://www.foobar.com/1234.html", "publisher": {"id": "1"}},
            "user": {"id": "reqUserID", "yob": 1982, "gender": "M"},
            "app": {"id": "appId", "ext": {"prebid": {"source": "x"}}}
        });
        let mut req = wrapper(raw.clone());

        let global = extract_global_fpd(&mut req);
        req.rebuild_request().unwrap();

        assert!(global.is_empty());
        assert_eq!(serde_json::to_value(req.request()).unwrap(), raw);
    }

    #[test]
    fn test_non_object_data_is_still_removed() {
        let mut req = wrapper(json!({"site": {"ext": {"data": true}}}));

        let global = extract_global_fpd(&mut req);
        req.rebuild_request().unwrap();

        assert_eq!(global.get(Scope::Site), Some(&json!(true)));
        assert!(req.request().site.as_ref().unwrap().ext.is_none());
    }

    #[test]
    fn test_null_data_dropped_without_entry() {
        let mut req = wrapper(json!({"app": {"ext": {"data": null, "x": 1}}}));

        let global = extract_global_fpd(&mut req);
        req.rebuild_request().unwrap();

        assert!(global.get(Scope::App).is_none());
        assert_eq!(req.request().app.as_ref().unwrap().ext, Some(json!({"x": 1})));
    }
}
