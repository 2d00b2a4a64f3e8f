//! End-to-end corpus tests: extraction, recomposition and resolution
//!
//! Each fixture under `tests/fixtures/extract_for_bidders/` is a raw bid
//! request with its target bidders, the reduced request expected afterwards
//! and the per-bidder output.

mod fixtures;

use fixtures::{assert_errors, FpdFixture};
use pretty_assertions::assert_eq;
use prebid_fpd::{extract_fpd_for_bidders, RequestWrapper};

#[test]
fn test_extract_for_bidders_corpus() {
    let cases = FpdFixture::load_dir("extract_for_bidders").expect("Failed to load corpus");
    assert!(!cases.is_empty());

    for (case, fixture) in cases {
        let mut wrapper = RequestWrapper::new(fixture.request());
        let config = fixture.config();

        let outcome = extract_fpd_for_bidders(&mut wrapper, &fixture.bidders, &config);

        if fixture.aborted {
            let err = outcome.expect_err(&case);
            assert_errors(&fixture.errors, &[err], &case);
            continue;
        }

        let resolution = outcome.unwrap_or_else(|e| panic!("{}: {}", case, e));
        assert_eq!(resolution.resolved, fixture.resolved, "{}: {}", case, fixture.description);
        assert_errors(&fixture.errors, &resolution.errors, &case);

        if let Some(expected) = fixture.expected_request() {
            assert_eq!(*wrapper.request(), expected, "{}: reduced request", case);
        }
    }
}

#[test]
fn test_reduced_request_recomposition_is_idempotent() {
    let cases = FpdFixture::load_dir("extract_for_bidders").expect("Failed to load corpus");

    for (case, fixture) in cases.into_iter().filter(|(_, f)| !f.aborted) {
        let mut wrapper = RequestWrapper::new(fixture.request());
        extract_fpd_for_bidders(&mut wrapper, &fixture.bidders, &fixture.config()).unwrap();
        let once = wrapper.canonical_digest().unwrap();

        wrapper.rebuild_request().unwrap();
        assert_eq!(wrapper.canonical_digest().unwrap(), once, "{}", case);

        let json = wrapper.request().to_json().unwrap();
        let mut reparsed = RequestWrapper::from_json(&json).unwrap();
        reparsed.rebuild_request().unwrap();
        assert_eq!(reparsed.canonical_digest().unwrap(), once, "{}: reparsed", case);
    }
}
