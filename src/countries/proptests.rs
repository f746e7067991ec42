//! Property-based tests for the country registry

use super::*;
use proptest::prelude::*;

fn arb_builtin_name() -> impl Strategy<Value = &'static str> {
    prop_oneof![
        Just("Brazil"),
        Just("France"),
        Just("Japan"),
        Just("Canada"),
        Just("Germany"),
    ]
}

/// Randomly re-case a name and pad it with whitespace
fn arb_mangled_name() -> impl Strategy<Value = (String, &'static str)> {
    (arb_builtin_name(), any::<u64>(), 0..3usize, 0..3usize).prop_map(
        |(name, mask, lead, trail)| {
            let recased: String = name
                .chars()
                .enumerate()
                .map(|(i, c)| {
                    if (mask >> (i % 64)) & 1 == 1 {
                        c.to_ascii_uppercase()
                    } else {
                        c.to_ascii_lowercase()
                    }
                })
                .collect();
            (
                format!("{}{recased}{}", " ".repeat(lead), " ".repeat(trail)),
                name,
            )
        },
    )
}

proptest! {
    #[test]
    fn prop_lookup_ignores_case_and_padding((mangled, canonical) in arb_mangled_name()) {
        let registry = CountryRegistry::builtin();
        let record = registry.lookup(&mangled);
        prop_assert!(record.is_some(), "lookup failed for {:?}", mangled);
        prop_assert_eq!(record.map(|r| r.name), Some(canonical));
    }

    #[test]
    fn prop_normalize_is_idempotent(name in "[a-zA-Z' ]{0,30}") {
        let once = normalize_name(&name);
        prop_assert_eq!(normalize_name(&once), once.clone());
    }

    #[test]
    fn prop_unknown_names_not_found(name in "[qxz]{3,12}") {
        let registry = CountryRegistry::builtin();
        prop_assert!(registry.lookup(&name).is_none());
    }
}
