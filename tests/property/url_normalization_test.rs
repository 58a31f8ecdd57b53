//! Property-based tests for URL normalization and domain derivation.
//!
//! These tests verify that normalized URLs always carry an http(s) scheme,
//! that normalization is idempotent, and that domain derivation never panics.

use proptest::prelude::*;
use smartmark::services::formatting::{derive_domain, normalize_url};

fn has_scheme(url: &str) -> bool {
    let lower = url.to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

fn arb_host() -> impl Strategy<Value = String> {
    "[a-v][a-z0-9]{0,10}(\\.[a-z]{2,6}){1,2}"
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Whatever the input, the result starts with http:// or https://.
    #[test]
    fn prop_normalized_url_has_scheme(input in "\\PC{0,40}") {
        prop_assert!(has_scheme(&normalize_url(&input)));
    }

    /// Normalizing twice gives the same result as normalizing once.
    #[test]
    fn prop_normalize_is_idempotent(input in "\\PC{0,40}") {
        let once = normalize_url(&input);
        prop_assert_eq!(normalize_url(&once), once);
    }

    /// Inputs that already carry a scheme are only trimmed.
    #[test]
    fn prop_existing_scheme_is_kept(
        scheme in prop_oneof![Just("http://"), Just("https://"), Just("HTTP://"), Just("Https://")],
        host in arb_host(),
        pad in " {0,3}",
    ) {
        let input = format!("{}{}{}{}", pad, scheme, host, pad);
        prop_assert_eq!(normalize_url(&input), format!("{}{}", scheme, host));
    }

    /// A bare host gains https:// and its domain is the host minus any www.
    #[test]
    fn prop_bare_host_round_trips_through_domain(host in arb_host(), www in any::<bool>()) {
        let input = if www { format!("www.{}", host) } else { host.clone() };
        let url = normalize_url(&input);
        prop_assert_eq!(&url, &format!("https://{}", input));
        prop_assert_eq!(derive_domain(&url), host);
    }

    /// Domain derivation accepts arbitrary text.
    #[test]
    fn prop_derive_domain_never_panics(input in "\\PC{0,60}") {
        let _ = derive_domain(&input);
    }
}
