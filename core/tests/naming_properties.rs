//! Property-based tests for identifier sanitization.

use proptest::prelude::*;
use schemagraph_core::oas::naming::{
    is_predeclared, is_rust_keyword, sanitize_enum_names, schema_name_to_type_name,
    to_field_name, NameNormalizer,
};
use regex::Regex;
use std::collections::HashSet;
use std::sync::OnceLock;

fn is_identifier(name: &str) -> bool {
    !name.is_empty()
        && !name.starts_with(|c: char| c.is_ascii_digit())
        && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
        && !is_rust_keyword(name)
}

fn is_unicode_identifier(name: &str) -> bool {
    static IDENT: OnceLock<Regex> = OnceLock::new();
    let re = IDENT.get_or_init(|| Regex::new(r"^\p{XID_Start}\p{XID_Continue}*$").unwrap());
    re.is_match(name) && !is_rust_keyword(name)
}

fn arb_normalizer() -> impl Strategy<Value = NameNormalizer> {
    prop_oneof![
        Just(NameNormalizer::ToCamelCase),
        Just(NameNormalizer::ToCamelCaseWithDigits),
        Just(NameNormalizer::ToCamelCaseWithInitialisms),
    ]
}

// Printable ASCII keeps the identifier check meaningful.
fn arb_raw_name() -> impl Strategy<Value = String> {
    "[ -~]{0,16}"
}

proptest! {
    /// Property: Any raw name becomes a usable type identifier
    #[test]
    fn proptest_type_names_are_identifiers(raw in arb_raw_name(), normalizer in arb_normalizer()) {
        let name = schema_name_to_type_name(&raw, normalizer);
        prop_assert!(is_identifier(&name), "'{}' -> '{}'", raw, name);
        prop_assert!(!is_predeclared(&name));
    }

    /// Property: Any raw name becomes a usable field identifier
    #[test]
    fn proptest_field_names_are_identifiers(raw in arb_raw_name()) {
        let name = to_field_name(&raw);
        prop_assert!(is_identifier(&name), "'{}' -> '{}'", raw, name);
    }

    /// Property: Non-ASCII input still yields a Unicode identifier
    #[test]
    fn proptest_unicode_field_names_are_identifiers(raw in "\\PC{0,12}") {
        let name = to_field_name(&raw);
        prop_assert!(is_unicode_identifier(&name), "'{}' -> '{}'", raw, name);
    }

    /// Property: Enum identifiers are unique and follow first appearance order
    #[test]
    fn proptest_enum_names_are_unique(
        values in prop::collection::vec(arb_raw_name(), 0..24),
        normalizer in arb_normalizer(),
    ) {
        let named = sanitize_enum_names(&[], &values, normalizer).unwrap();

        let mut distinct: Vec<&String> = Vec::new();
        for value in &values {
            if !distinct.contains(&value) {
                distinct.push(value);
            }
        }
        let kept: Vec<&String> = named.iter().map(|v| &v.value).collect();
        prop_assert_eq!(kept, distinct);

        let mut seen = HashSet::new();
        for value in &named {
            prop_assert!(is_identifier(&value.ident), "'{}' -> '{}'", value.value, value.ident);
            prop_assert!(seen.insert(value.ident.to_lowercase()), "duplicate '{}'", value.ident);
        }
    }

    /// Property: Sanitization is a pure function of its input
    #[test]
    fn proptest_enum_names_are_deterministic(values in prop::collection::vec(arb_raw_name(), 0..12)) {
        let first = sanitize_enum_names(&[], &values, NameNormalizer::ToCamelCase).unwrap();
        let second = sanitize_enum_names(&[], &values, NameNormalizer::ToCamelCase).unwrap();
        prop_assert_eq!(first, second);
    }
}
