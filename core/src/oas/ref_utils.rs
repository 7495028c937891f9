#![deny(missing_docs)]

//! # Reference Utilities
//!
//! String-level helpers for `$ref` values: splitting document and fragment, decoding
//! JSON Pointer segments and recognising references back into the current document.
//!
//! These utilities never fetch external documents.

use percent_encoding::percent_decode_str;
use std::path::Path;
use url::Url;

/// A `$ref` split at its `#`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SplitRef<'a> {
    /// Everything before `#` (empty for same-document references).
    pub document: &'a str,
    /// Everything after `#`, if there is a `#`.
    pub fragment: Option<&'a str>,
}

/// Splits a `$ref` into document and fragment parts.
pub fn split_reference(reference: &str) -> SplitRef<'_> {
    match reference.split_once('#') {
        Some((document, fragment)) => SplitRef {
            document,
            fragment: Some(fragment),
        },
        None => SplitRef {
            document: reference,
            fragment: None,
        },
    }
}

/// Whether a `$ref` names a whole document (`other.yaml`, `other.yaml#`, `other.yaml#/`).
pub fn is_whole_document_reference(reference: &str) -> bool {
    let split = split_reference(reference);
    !split.document.is_empty() && matches!(split.fragment, None | Some("") | Some("/"))
}

/// Normalizes a `$ref` to a local JSON Pointer (e.g. `#/components/...`) if it targets the
/// current document, either directly or through a document part matching `$self`.
///
/// Returns `None` if the reference is external or lacks a fragment.
pub fn normalize_ref_to_local(reference: &str, self_uri: Option<&str>) -> Option<String> {
    let split = split_reference(reference);
    let fragment = split.fragment?;
    if split.document.is_empty() {
        return Some(format!("#{}", fragment));
    }
    let self_uri = self_uri?;
    if ref_doc_matches_self(split.document, self_uri) {
        return Some(format!("#{}", fragment));
    }
    None
}

/// Parses `/components/{section}/{name}` (the fragment without `#`).
///
/// Returns `None` for any other pointer shape, including deeper pointers into a component.
pub fn parse_component_pointer(fragment: &str) -> Option<(String, String)> {
    let pointer = fragment.strip_prefix('/')?;
    let segments: Vec<&str> = pointer.split('/').collect();

    if segments.len() != 3 || segments[0] != "components" {
        return None;
    }

    let name = decode_pointer_segment(segments[2]);
    if segments[1].is_empty() || name.is_empty() {
        None
    } else {
        Some((segments[1].to_string(), name))
    }
}

/// The decoded last segment of a JSON Pointer.
pub fn last_pointer_segment(fragment: &str) -> Option<String> {
    fragment
        .rsplit('/')
        .find(|s| !s.is_empty())
        .map(decode_pointer_segment)
}

/// The file stem of a document reference (`./schemas/money.yaml` -> `money`).
pub fn document_stem(document: &str) -> String {
    let path = match Url::parse(document) {
        Ok(url) => url.path().to_string(),
        Err(_) => document.to_string(),
    };
    Path::new(&path)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Decodes a JSON Pointer segment (handles `~1`, `~0` and percent encoding).
pub fn decode_pointer_segment(segment: &str) -> String {
    let decoded = segment.replace("~1", "/").replace("~0", "~");
    percent_decode_str(&decoded)
        .decode_utf8_lossy()
        .into_owned()
}

/// Encodes a component name as a JSON Pointer segment.
pub fn encode_pointer_segment(name: &str) -> String {
    name.replace('~', "~0").replace('/', "~1")
}

fn ref_doc_matches_self(ref_doc: &str, self_uri: &str) -> bool {
    if ref_doc == self_uri {
        return true;
    }

    if let (Ok(ref_url), Ok(self_url)) = (Url::parse(ref_doc), Url::parse(self_uri)) {
        return ref_url.scheme() == self_url.scheme()
            && ref_url.host() == self_url.host()
            && ref_url.port() == self_url.port()
            && ref_url.path() == self_url.path();
    }

    // `$self` given as an absolute path (e.g. "/api/openapi"): compare paths.
    if self_uri.starts_with('/') {
        if let Ok(ref_url) = Url::parse(ref_doc) {
            return ref_url.path() == self_uri;
        }
    }

    if !self_uri.contains("://") && !ref_doc.contains("://") {
        return Path::new(ref_doc) == Path::new(self_uri);
    }

    false
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_reference() {
        let split = split_reference("common.yaml#/components/schemas/Money");
        assert_eq!(split.document, "common.yaml");
        assert_eq!(split.fragment, Some("/components/schemas/Money"));

        let split = split_reference("#/components/schemas/Pet");
        assert_eq!(split.document, "");

        let split = split_reference("common.yaml");
        assert_eq!(split.fragment, None);
    }

    #[test]
    fn test_whole_document_reference() {
        assert!(is_whole_document_reference("money.yaml"));
        assert!(is_whole_document_reference("money.yaml#"));
        assert!(is_whole_document_reference("money.yaml#/"));
        assert!(!is_whole_document_reference("money.yaml#/components/schemas/Money"));
        assert!(!is_whole_document_reference("#/components/schemas/Money"));
    }

    #[test]
    fn test_normalize_ref_local_passthrough() {
        let normalized = normalize_ref_to_local("#/components/schemas/User", None).unwrap();
        assert_eq!(normalized, "#/components/schemas/User");
    }

    #[test]
    fn test_normalize_ref_self_absolute_match() {
        let self_uri = Some("https://example.com/openapi.yaml");
        let ref_str = "https://example.com/openapi.yaml#/components/schemas/User";
        let normalized = normalize_ref_to_local(ref_str, self_uri).unwrap();
        assert_eq!(normalized, "#/components/schemas/User");
    }

    #[test]
    fn test_normalize_ref_self_path_match() {
        let self_uri = Some("/api/openapi.yaml");
        let ref_str = "https://example.com/api/openapi.yaml#/components/schemas/User";
        let normalized = normalize_ref_to_local(ref_str, self_uri).unwrap();
        assert_eq!(normalized, "#/components/schemas/User");
    }

    #[test]
    fn test_normalize_ref_external_is_none() {
        assert!(normalize_ref_to_local("other.yaml#/components/schemas/User", None).is_none());
    }

    #[test]
    fn test_parse_component_pointer() {
        assert_eq!(
            parse_component_pointer("/components/schemas/User~1Profile"),
            Some(("schemas".into(), "User/Profile".into()))
        );
        assert_eq!(parse_component_pointer("/components/schemas"), None);
        assert_eq!(
            parse_component_pointer("/components/schemas/Pet/properties/id"),
            None
        );
        assert_eq!(parse_component_pointer("/paths/~1pets"), None);
    }

    #[test]
    fn test_decode_pointer_segment_percent_encoding() {
        let encoded = "User%20Profile~1details";
        let decoded = decode_pointer_segment(encoded);
        assert_eq!(decoded, "User Profile/details");
        assert_eq!(encode_pointer_segment("a/b~c"), "a~1b~0c");
    }

    #[test]
    fn test_document_stem() {
        assert_eq!(document_stem("./schemas/money.yaml"), "money");
        assert_eq!(document_stem("https://example.com/api/common.json"), "common");
        assert_eq!(last_pointer_segment("/components/schemas/Money").as_deref(), Some("Money"));
    }
}
