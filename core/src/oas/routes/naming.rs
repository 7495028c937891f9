#![deny(missing_docs)]

//! # Naming Utilities
//!
//! Operation identifiers, taken from `operationId` or derived from method and path.

use crate::oas::naming::{schema_name_to_type_name, NameNormalizer};

/// Derives an identifier from the HTTP method and path when `operationId` is missing.
///
/// e.g. `GET /users/{id}` -> `get-users-id`
pub fn derive_operation_name(method: &str, path: &str) -> String {
    let method = method.to_lowercase();
    let segments = path
        .split('/')
        .map(|segment| segment.trim_matches(|c| c == '{' || c == '}'))
        .filter(|segment| !segment.is_empty());
    std::iter::once(method.as_str())
        .chain(segments)
        .collect::<Vec<_>>()
        .join("-")
}

/// The normalized identifier of an operation.
pub fn operation_id(
    raw: Option<&str>,
    method: &str,
    path: &str,
    normalizer: NameNormalizer,
) -> String {
    match raw.map(str::trim).filter(|id| !id.is_empty()) {
        Some(id) => schema_name_to_type_name(id, normalizer),
        None => schema_name_to_type_name(&derive_operation_name(method, path), normalizer),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derive_operation_name() {
        assert_eq!(derive_operation_name("GET", "/users"), "get-users");
        assert_eq!(
            derive_operation_name("POST", "/users/{id}/activate"),
            "post-users-id-activate"
        );
        assert_eq!(derive_operation_name("GET", "/"), "get");
    }

    #[test]
    fn test_operation_id() {
        let n = NameNormalizer::ToCamelCase;
        assert_eq!(operation_id(Some("listPets"), "GET", "/pets", n), "ListPets");
        assert_eq!(operation_id(Some("get_user-by.id"), "GET", "/", n), "GetUserById");
        assert_eq!(operation_id(None, "GET", "/pets/{petId}", n), "GetPetsPetId");
        assert_eq!(operation_id(Some("  "), "DELETE", "/pets", n), "DeletePets");
        assert_eq!(
            operation_id(Some("getUserId"), "GET", "/", NameNormalizer::ToCamelCaseWithInitialisms),
            "GetUserID"
        );
    }
}
