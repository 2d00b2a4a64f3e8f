//! Bidder config extraction corpus tests
//!
//! Each fixture under `tests/fixtures/extract_bidder_config/` is an
//! `ext.prebid` object plus the expected per-bidder overrides or errors.

mod fixtures;

use fixtures::{assert_errors, FpdFixture};
use pretty_assertions::assert_eq;
use prebid_fpd::{extract_bidder_config_fpd_with, RequestWrapper};
use serde_json::json;

#[test]
fn test_extract_bidder_config_corpus() {
    let cases = FpdFixture::load_dir("extract_bidder_config").expect("Failed to load corpus");
    assert!(!cases.is_empty());

    for (case, fixture) in cases {
        let prebid = fixture.input_prebid.clone().expect("case has input_prebid");
        let mut wrapper = RequestWrapper::new(
            serde_json::from_value(json!({"id": case, "ext": {"prebid": prebid}})).unwrap(),
        );
        let config = fixture.config();
        let ext = wrapper.request_ext_mut().unwrap();
        let before = ext.clone();

        let outcome = extract_bidder_config_fpd_with(ext, &config.bidder_config);

        if fixture.aborted {
            let err = outcome.expect_err(&case);
            assert_errors(&fixture.errors, &[err], &case);
            assert_eq!(*ext, before, "{}: extension must be untouched on abort", case);
            continue;
        }

        let (fpd, skipped) = outcome.unwrap_or_else(|e| panic!("{}: {}", case, e));
        assert_eq!(fpd, fixture.bidder_config_fpd, "{}: {}", case, fixture.description);
        assert_errors(&fixture.errors, &skipped, &case);
        assert!(
            ext.prebid().map_or(true, |p| p.bidderconfig.is_none()),
            "{}: bidderconfig must be removed",
            case
        );
    }
}

#[test]
fn test_other_prebid_fields_survive() {
    let mut wrapper = RequestWrapper::from_json(
        r#"{"id":"r","ext":{"prebid":{"debug":true,"bidderconfig":[{"bidders":["a"]}]},"gdpr":1}}"#,
    )
    .unwrap();

    extract_bidder_config_fpd_with(
        wrapper.request_ext_mut().unwrap(),
        &Default::default(),
    )
    .unwrap();
    wrapper.rebuild_request().unwrap();

    assert_eq!(
        wrapper.request().ext,
        Some(json!({"prebid": {"debug": true}, "gdpr": 1}))
    );
}
