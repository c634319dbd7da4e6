//! Property-based tests for address membership.
//!
//! These tests use proptest to verify invariants around:
//! - Prefix boundaries (every address sharing the prefix matches, flipping the
//!   last prefix bit does not)
//! - Exact-match entries
//! - Family separation
//! - Untrusted candidate strings never matching by accident

use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

use proptest::prelude::*;

use crate::{IpMatcher, Operator};

// ============================================================================
// Helpers
// ============================================================================

fn mask_v4(prefix: u8) -> u32 {
    if prefix == 0 {
        0
    } else {
        u32::MAX << (32 - u32::from(prefix))
    }
}

fn mask_v6(prefix: u8) -> u128 {
    if prefix == 0 {
        0
    } else {
        u128::MAX << (128 - u32::from(prefix))
    }
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    #[test]
    fn v4_prefix_boundary(base in any::<u32>(), prefix in 1u8..=32, noise in any::<u32>()) {
        let mask = mask_v4(prefix);
        let matcher = IpMatcher::parse(&format!("{}/{prefix}", Ipv4Addr::from(base))).unwrap();

        let inside = (base & mask) | (noise & !mask);
        let outside = inside ^ (1u32 << (32 - u32::from(prefix)));

        prop_assert!(matcher.contains_str(&Ipv4Addr::from(inside).to_string()));
        prop_assert!(!matcher.contains_str(&Ipv4Addr::from(outside).to_string()));
    }

    #[test]
    fn v6_prefix_boundary(base in any::<u128>(), prefix in 1u8..=128, noise in any::<u128>()) {
        let mask = mask_v6(prefix);
        let matcher = IpMatcher::parse(&format!("{}/{prefix}", Ipv6Addr::from(base))).unwrap();

        let inside = (base & mask) | (noise & !mask);
        let outside = inside ^ (1u128 << (128 - u32::from(prefix)));

        prop_assert!(matcher.contains_str(&Ipv6Addr::from(inside).to_string()));
        prop_assert!(!matcher.contains_str(&Ipv6Addr::from(outside).to_string()));
    }

    #[test]
    fn bare_address_is_exact(a in any::<u32>(), b in any::<u32>()) {
        let matcher = IpMatcher::parse(&Ipv4Addr::from(a).to_string()).unwrap();
        prop_assert!(matcher.contains(&IpAddr::V4(Ipv4Addr::from(a))));
        prop_assert_eq!(matcher.contains(&IpAddr::V4(Ipv4Addr::from(b))), a == b);
    }

    #[test]
    fn bare_v6_address_is_exact(a in any::<u128>(), b in any::<u128>()) {
        let matcher = IpMatcher::parse(&Ipv6Addr::from(a).to_string()).unwrap();
        prop_assert_eq!(matcher.contains(&IpAddr::V6(Ipv6Addr::from(b))), a == b);
    }

    #[test]
    fn other_family_never_matches(v4 in any::<u32>(), v6 in any::<u128>(), prefix in 0u8..=32) {
        let matcher = IpMatcher::parse(&format!("{}/{prefix}", Ipv4Addr::from(v4))).unwrap();
        prop_assert!(!matcher.contains(&IpAddr::V6(Ipv6Addr::from(v6))));

        let matcher = IpMatcher::parse(&format!("{}/{prefix}", Ipv6Addr::from(v6))).unwrap();
        prop_assert!(!matcher.contains(&IpAddr::V4(Ipv4Addr::from(v4))));
    }

    #[test]
    fn non_address_never_matches(value in ".{0,64}") {
        prop_assume!(value.parse::<IpAddr>().is_err());
        let matcher = IpMatcher::parse("0.0.0.0/0, ::/0").unwrap();
        prop_assert!(!matcher.evaluate(&(), &value));
    }

    #[test]
    fn evaluate_is_idempotent(a in any::<u32>(), list_base in any::<u32>(), prefix in 0u8..=32) {
        let matcher = IpMatcher::parse(&format!("{}/{prefix}", Ipv4Addr::from(list_base))).unwrap();
        let candidate = Ipv4Addr::from(a).to_string();
        prop_assert_eq!(matcher.evaluate(&(), &candidate), matcher.evaluate(&(), &candidate));
    }

    #[test]
    fn bad_token_rejects_whole_list(good in any::<u32>(), prefix in 33u16..=999) {
        let list = format!("{}, 10.0.0.0/{prefix}", Ipv4Addr::from(good));
        prop_assert!(IpMatcher::parse(&list).is_err());
    }
}
