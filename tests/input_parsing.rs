//! Tests for address normalization through the public API.
//!
//! Complements the unit tests in the target module with table-driven
//! acceptance and rejection cases, plus property tests over generated
//! input shapes.

use proptest::prelude::*;

use site_report::{normalize, AnalysisError, Scheme};

#[test]
fn accepted_inputs_normalize_to_expected_urls() {
    let cases = [
        ("example.com", "https://example.com", "example.com"),
        ("http://example.com", "http://example.com", "example.com"),
        (
            "https://example.com/path",
            "https://example.com/path",
            "example.com",
        ),
        ("  example.com  ", "https://example.com", "example.com"),
        ("example.com:8443", "https://example.com:8443", "example.com"),
        (
            "sub.example.co.uk/a?b=1",
            "https://sub.example.co.uk/a?b=1",
            "sub.example.co.uk",
        ),
        ("127.0.0.1:8080", "https://127.0.0.1:8080", "127.0.0.1"),
        ("[2001:db8::1]", "https://[2001:db8::1]", "[2001:db8::1]"),
    ];

    for (input, expected_url, expected_host) in cases {
        let target = normalize(input)
            .unwrap_or_else(|e| panic!("input {input:?} should normalize, got error: {e}"));
        assert_eq!(target.as_str(), expected_url, "url for input {input:?}");
        assert_eq!(target.host(), expected_host, "host for input {input:?}");
    }
}

#[test]
fn rejected_inputs_produce_invalid_input() {
    let overlong = format!("example.com/{}", "a".repeat(2100));
    let cases = [
        "",
        "   ",
        "\t\n",
        "not a url at all!!!",
        "://example.com",
        "http://",
        "https://   ",
        overlong.as_str(),
    ];

    for input in cases {
        match normalize(input) {
            Err(AnalysisError::InvalidInput(_)) => {}
            Err(other) => panic!("input {input:?} should be InvalidInput, got: {other}"),
            Ok(target) => panic!(
                "input {input:?} should be rejected, normalized to {}",
                target.as_str()
            ),
        }
    }
}

#[test]
fn scheme_maps_to_security_expectation() {
    assert!(normalize("https://example.com").unwrap().scheme().is_secure());
    assert!(!normalize("http://example.com").unwrap().scheme().is_secure());
    // The default scheme is the secure one.
    assert!(normalize("example.com").unwrap().scheme().is_secure());
}

proptest! {
    #[test]
    fn surrounding_whitespace_never_changes_the_outcome(
        domain in "[a-z]{3,15}\\.[a-z]{2,4}",
        left in " {0,4}\t{0,2}",
        right in " {0,4}",
    ) {
        let padded = format!("{left}{domain}{right}");
        let bare = normalize(&domain).unwrap();
        let trimmed = normalize(&padded).unwrap();
        prop_assert_eq!(bare.as_str(), trimmed.as_str());
        prop_assert_eq!(bare.host(), trimmed.host());
    }

    #[test]
    fn normalized_targets_always_carry_a_fetchable_scheme(
        domain in "[a-z]{3,15}\\.[a-z]{2,4}",
        secure in proptest::bool::ANY,
    ) {
        let input = if secure {
            format!("https://{domain}")
        } else {
            format!("http://{domain}")
        };
        let target = normalize(&input).unwrap();
        let prefix = format!("{}://", target.scheme().as_str());
        prop_assert!(target.as_str().starts_with(&prefix));
        prop_assert!(matches!(target.scheme(), Scheme::Http | Scheme::Https));
    }
}
