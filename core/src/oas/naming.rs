#![deny(missing_docs)]

//! # Naming Utilities
//!
//! Turns arbitrary OpenAPI strings (component names, property names, enum values,
//! naming paths) into identifiers that are legal in the generated Rust code, and hands
//! out unique names within a namespace.

use crate::error::{AppError, AppResult};
use heck::ToSnakeCase;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::OnceLock;

/// Characters that start a new word when camel-casing.
const SEPARATORS: &[char] = &[
    '-', '#', '@', '!', '$', '&', '=', '.', '+', ':', ';', '_', '~', ' ', '(', ')', '{', '}',
    '[', ']',
];

/// Upper bound on numeric disambiguation attempts within one namespace.
pub const MAX_DISAMBIGUATION: usize = 10_000;

const INITIALISMS: &[&str] = &[
    "ACL", "AMQP", "API", "ASCII", "CPU", "CSS", "DB", "DNS", "EOF", "GID", "GUID", "HTML",
    "HTTP", "HTTPS", "ID", "IP", "JSON", "QPS", "RAM", "RPC", "RTP", "SIP", "SLA", "SMTP",
    "SQL", "SSH", "TCP", "TLS", "TS", "TTL", "UDP", "UI", "UID", "URI", "URL", "UTF8", "UUID",
    "VM", "XML", "XMPP", "XSRF", "XSS",
];

const RUST_KEYWORDS: &[&str] = &[
    "abstract", "as", "async", "await", "become", "box", "break", "const", "continue", "crate",
    "do", "dyn", "else", "enum", "extern", "false", "final", "fn", "for", "gen", "if", "impl",
    "in", "let", "loop", "macro", "match", "mod", "move", "mut", "override", "priv", "pub",
    "ref", "return", "self", "Self", "static", "struct", "super", "trait", "true", "try",
    "type", "typeof", "unsafe", "unsized", "use", "virtual", "where", "while", "yield",
];

/// Prelude and primitive type names a generated type must not shadow.
const PREDECLARED: &[&str] = &[
    "AsMut", "AsRef", "Box", "Clone", "Copy", "Default", "Drop", "Eq", "Err", "Extend", "Fn",
    "FnMut", "FnOnce", "From", "Into", "IntoIterator", "Iterator", "None", "Ok", "Option",
    "Ord", "PartialEq", "PartialOrd", "Result", "Send", "Sized", "Some", "String", "Sync",
    "ToOwned", "ToString", "Vec", "bool", "char", "f32", "f64", "i8", "i16", "i32", "i64",
    "i128", "isize", "str", "u8", "u16", "u32", "u64", "u128", "usize",
];

/// The configurable identifier normalization function.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum NameNormalizer {
    /// `foo-bar_baz` -> `FooBarBaz`; digits do not start a new word.
    #[default]
    ToCamelCase,
    /// Like `ToCamelCase`, but the letter after a digit is capitalized.
    ToCamelCaseWithDigits,
    /// Like `ToCamelCase`, then well-known initialisms are upper-cased (`UserId` -> `UserID`).
    ToCamelCaseWithInitialisms,
}

impl NameNormalizer {
    /// Applies the normalizer.
    pub fn normalize(self, s: &str) -> String {
        match self {
            NameNormalizer::ToCamelCase => camel_case(s, false),
            NameNormalizer::ToCamelCaseWithDigits => camel_case(s, true),
            NameNormalizer::ToCamelCaseWithInitialisms => to_camel_case_with_initialisms(s),
        }
    }
}

fn camel_case(s: &str, capitalize_after_digit: bool) -> String {
    let mut out = String::with_capacity(s.len());
    let mut cap_next = true;
    for c in s.trim_matches(' ').chars() {
        if c.is_uppercase() || c.is_ascii_digit() {
            out.push(c);
        } else if c.is_lowercase() {
            if cap_next {
                out.extend(c.to_uppercase());
            } else {
                out.push(c);
            }
        } else if c.is_alphabetic() {
            out.push(c);
        }
        cap_next = SEPARATORS.contains(&c) || (capitalize_after_digit && c.is_ascii_digit());
    }
    out
}

/// `foo-bar_baz` -> `FooBarBaz`.
pub fn to_camel_case(s: &str) -> String {
    camel_case(s, false)
}

/// `oneOf2things` -> `OneOf2Things`.
pub fn to_camel_case_with_digits(s: &str) -> String {
    camel_case(s, true)
}

/// `get_user_id` -> `GetUserID`.
pub fn to_camel_case_with_initialisms(s: &str) -> String {
    static PARTS: OnceLock<Regex> = OnceLock::new();
    let re = PARTS.get_or_init(|| Regex::new(r"[\p{Lu}\d]+([\p{Ll}\d]+|$)").expect("Invalid regex"));

    re.find_iter(&to_camel_case(s))
        .map(|part| {
            let upper = part.as_str().to_uppercase();
            if INITIALISMS.contains(&upper.as_str()) {
                upper
            } else {
                part.as_str().to_string()
            }
        })
        .collect()
}

/// Whether `name` is a Rust keyword.
pub fn is_rust_keyword(name: &str) -> bool {
    RUST_KEYWORDS.contains(&name)
}

/// Whether `name` would shadow a prelude or primitive type.
pub fn is_predeclared(name: &str) -> bool {
    PREDECLARED.contains(&name)
}

/// Makes an already-normalized string a legal type or variant identifier.
///
/// Illegal characters become `_`, a leading digit gets an `N` prefix, reserved words get
/// a trailing `_`, and an empty result becomes `Empty`.
pub fn sanitize_identifier(s: &str) -> String {
    let mut out = replace_non_identifier_chars(s);
    if out.is_empty() || out.chars().all(|c| c == '_') {
        return "Empty".to_string();
    }
    if out.starts_with(|c: char| c.is_ascii_digit()) {
        out.insert(0, 'N');
    }
    if is_rust_keyword(&out) || is_predeclared(&out) {
        out.push('_');
    }
    out
}

/// Every character that cannot continue an identifier (outside `XID_Continue`) becomes `_`.
fn replace_non_identifier_chars(s: &str) -> String {
    static INVALID: OnceLock<Regex> = OnceLock::new();
    let re = INVALID.get_or_init(|| Regex::new(r"[^\p{XID_Continue}]").expect("Invalid regex"));
    re.replace_all(s, "_").into_owned()
}

/// Whether the first character may start an identifier (`XID_Start`).
fn starts_identifier(s: &str) -> bool {
    static START: OnceLock<Regex> = OnceLock::new();
    let re = START.get_or_init(|| Regex::new(r"^\p{XID_Start}").expect("Invalid regex"));
    re.is_match(s)
}

/// Converts a component (schema) name to a type name.
///
/// `$` becomes `DollarSign`; everything else goes through the normalizer and
/// [`sanitize_identifier`].
pub fn schema_name_to_type_name(name: &str, normalizer: NameNormalizer) -> String {
    if name == "$" {
        return "DollarSign".to_string();
    }
    sanitize_identifier(&normalizer.normalize(name))
}

/// Converts a naming path (`["Pet", "owner", "Item"]`) to a type name (`PetOwnerItem`).
pub fn path_to_type_name(path: &[String], normalizer: NameNormalizer) -> String {
    schema_name_to_type_name(&path.join("_"), normalizer)
}

/// Converts a JSON property name to a snake_case field identifier.
pub fn to_field_name(json_name: &str) -> String {
    let mut name = replace_non_identifier_chars(&json_name.to_snake_case()).to_snake_case();
    if name.is_empty() {
        return "field".to_string();
    }
    if !starts_identifier(&name) {
        name.insert(0, 'n');
    }
    if is_rust_keyword(&name) {
        name.push('_');
    }
    name
}

/// Renders free text as `///` doc comment lines. Empty text renders nothing.
pub fn to_comment(text: &str) -> String {
    if text.trim().is_empty() {
        return String::new();
    }
    text.trim_end()
        .lines()
        .map(|line| {
            let line = line.trim_end();
            if line.is_empty() {
                "///".to_string()
            } else {
                format!("/// {}", line)
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Renders a deprecation notice as a doc comment.
pub fn deprecation_comment(reason: Option<&str>) -> String {
    match reason.map(str::trim).filter(|r| !r.is_empty()) {
        Some(reason) => to_comment(&format!("Deprecated: {}", reason)),
        None => to_comment("Deprecated"),
    }
}

/// A set of identifiers where each spelling (compared case-insensitively) may be used once.
#[derive(Debug, Clone, Default)]
pub struct Namespace {
    label: String,
    taken: HashSet<String>,
}

impl Namespace {
    /// Creates an empty namespace; `label` appears in collision errors.
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            taken: HashSet::new(),
        }
    }

    /// Whether `name` is already used.
    pub fn contains(&self, name: &str) -> bool {
        self.taken.contains(&name.to_lowercase())
    }

    /// Claims exactly `name`, failing if it is taken.
    pub fn claim_exact(&mut self, name: &str) -> AppResult<()> {
        if !self.taken.insert(name.to_lowercase()) {
            return Err(AppError::collision(name, self.label.clone()));
        }
        Ok(())
    }

    /// Claims `base`, or the first free `base_2`, `base_3`, ...
    pub fn claim(&mut self, base: &str) -> AppResult<String> {
        let free = Self::candidates(base).find(|candidate| !self.contains(candidate));
        match free {
            Some(name) => {
                self.taken.insert(name.to_lowercase());
                Ok(name)
            }
            None => Err(AppError::collision(base, self.label.clone())),
        }
    }

    /// The disambiguation sequence for `base`.
    pub fn candidates(base: &str) -> impl Iterator<Item = String> + '_ {
        std::iter::once(base.to_string())
            .chain((2..=MAX_DISAMBIGUATION).map(move |n| format!("{}_{}", base, n)))
    }
}

/// An enum value paired with its identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnumValue {
    /// The value as it appears on the wire.
    pub value: String,
    /// The variant identifier.
    pub ident: String,
}

/// Pairs each distinct raw enum value with a unique identifier.
///
/// `names` holds explicit identifiers (`x-enum-varnames`) by position; values without one
/// are named after themselves. Repeated raw values are dropped, empty names become
/// `Empty`, and clashing identifiers get `_2`, `_3`, ... in order of first appearance.
pub fn sanitize_enum_names(
    names: &[String],
    values: &[String],
    normalizer: NameNormalizer,
) -> AppResult<Vec<EnumValue>> {
    let mut seen = HashSet::new();
    let mut idents = Namespace::new("enum values");
    let mut out = Vec::with_capacity(values.len());

    for (idx, value) in values.iter().enumerate() {
        if !seen.insert(value.as_str()) {
            continue;
        }
        let label = names.get(idx).unwrap_or(value);
        let ident = idents.claim(&schema_name_to_type_name(label, normalizer))?;
        out.push(EnumValue {
            value: value.clone(),
            ident,
        });
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_camel_case_variants() {
        assert_eq!(to_camel_case("foo-bar_baz"), "FooBarBaz");
        assert_eq!(to_camel_case("oneOf2things"), "OneOf2things");
        assert_eq!(to_camel_case_with_digits("oneOf2things"), "OneOf2Things");
        assert_eq!(to_camel_case("  pet store  "), "PetStore");
        assert_eq!(to_camel_case("a(b)c"), "ABC");
    }

    #[test]
    fn test_initialisms() {
        assert_eq!(to_camel_case_with_initialisms("get_user_id"), "GetUserID");
        assert_eq!(to_camel_case_with_initialisms("http_server"), "HTTPServer");
        assert_eq!(to_camel_case_with_initialisms("oneOf2things"), "OneOf2things");
        assert_eq!(to_camel_case_with_initialisms("json-api"), "JSONAPI");
    }

    #[test]
    fn test_schema_name_to_type_name() {
        let n = NameNormalizer::ToCamelCase;
        assert_eq!(schema_name_to_type_name("$", n), "DollarSign");
        assert_eq!(schema_name_to_type_name("2fa-token", n), "N2faToken");
        assert_eq!(schema_name_to_type_name("pet", n), "Pet");
        assert_eq!(schema_name_to_type_name("option", n), "Option_");
        assert_eq!(schema_name_to_type_name("self", n), "Self_");
        assert_eq!(schema_name_to_type_name("---", n), "Empty");
        assert_eq!(sanitize_identifier("Area²"), "Area_");
    }

    #[test]
    fn test_path_to_type_name() {
        let path = strings(&["GetPet", "200", "JSON", "Response"]);
        assert_eq!(
            path_to_type_name(&path, NameNormalizer::ToCamelCase),
            "GetPet200JSONResponse"
        );
        let path = strings(&["Pet", "owner", "Item"]);
        assert_eq!(path_to_type_name(&path, NameNormalizer::ToCamelCase), "PetOwnerItem");
    }

    #[test]
    fn test_field_names() {
        assert_eq!(to_field_name("petId"), "pet_id");
        assert_eq!(to_field_name("type"), "type_");
        assert_eq!(to_field_name("@type"), "type_");
        assert_eq!(to_field_name("1st"), "n1st");
        assert_eq!(to_field_name("HTTPServer"), "http_server");
        assert_eq!(to_field_name("$"), "field");
        assert_eq!(to_field_name("x²"), "x");
        assert_eq!(to_field_name("m²_total"), "m_total");
        assert_eq!(to_field_name("größe"), "größe");
        assert_eq!(to_field_name("²"), "field");
    }

    #[test]
    fn test_comments() {
        assert_eq!(to_comment(""), "");
        assert_eq!(to_comment("A pet.\n\nSecond line"), "/// A pet.\n///\n/// Second line");
        assert_eq!(deprecation_comment(None), "/// Deprecated");
        assert_eq!(deprecation_comment(Some("use v2")), "/// Deprecated: use v2");
    }

    #[test]
    fn test_namespace_first_claim_wins() {
        let mut ns = Namespace::new("types");
        assert_eq!(ns.claim("Pet").unwrap(), "Pet");
        assert_eq!(ns.claim("pet").unwrap(), "pet_2");
        assert_eq!(ns.claim("Pet").unwrap(), "Pet_3");
        assert!(matches!(
            ns.claim_exact("PET"),
            Err(AppError::NameCollision { .. })
        ));
    }

    #[test]
    fn test_enum_sanitization() {
        let values = strings(&["", "foo", "Foo", "foo", "-1", "+1"]);
        let out = sanitize_enum_names(&[], &values, NameNormalizer::ToCamelCase).unwrap();
        let idents: Vec<&str> = out.iter().map(|v| v.ident.as_str()).collect();
        assert_eq!(idents, vec!["Empty", "Foo", "Foo_2", "N1", "N1_2"]);
        assert_eq!(out[2].value, "Foo");
    }

    #[test]
    fn test_enum_explicit_names() {
        let values = strings(&["0", "1"]);
        let names = strings(&["off", "on"]);
        let out = sanitize_enum_names(&names, &values, NameNormalizer::ToCamelCase).unwrap();
        assert_eq!(out[0].ident, "Off");
        assert_eq!(out[1].ident, "On");
        assert_eq!(out[1].value, "1");
    }
}
