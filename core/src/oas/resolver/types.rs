#![deny(missing_docs)]

//! # Type Mapping
//!
//! Maps scalar OpenAPI schemas to Rust type expressions.
//!
//! Supports the **OAS Format Registry** subset the generated code understands:
//! - `format: int64` -> `i64`, `format: float` -> `f32`
//! - `format: uuid` -> `Uuid`, `date-time` -> `DateTime`, `date` -> `NaiveDate`
//! - `format: password` -> `Secret<String>`
//! - `format: binary` / `byte` and binary content encodings -> `Vec<u8>`

use crate::error::{AppError, AppResult};
use crate::oas::models::Schema;
use crate::oas::shims::ShimSchema;

/// Maps a scalar `type` keyword plus `format` to a Rust type.
///
/// Returns `None` for names that are not scalar types.
pub fn scalar_type(type_name: &str, format: Option<&str>) -> Option<&'static str> {
    let ty = match type_name {
        "integer" => match format {
            Some("int64") => "i64",
            _ => "i32",
        },
        "number" => match format {
            Some("float") => "f32",
            _ => "f64",
        },
        "boolean" => "bool",
        "string" => match format {
            Some("uuid") => "Uuid",
            Some("date-time") => "DateTime",
            Some("date") => "NaiveDate",
            Some("password") => "Secret<String>",
            Some("binary") | Some("byte") => "Vec<u8>",
            _ => "String",
        },
        _ => return None,
    };
    Some(ty)
}

/// Builds the schema of a scalar-typed node.
pub fn scalar_schema(schema: &ShimSchema, type_name: &str, path: &[String]) -> AppResult<Schema> {
    if type_name == "string" && is_binary_schema(schema) {
        return Ok(Schema::primitive("Vec<u8>"));
    }
    scalar_type(type_name, schema.format.as_deref())
        .map(Schema::primitive)
        .ok_or_else(|| AppError::unsupported(path, format!("unknown type '{}'", type_name)))
}

fn is_binary_schema(schema: &ShimSchema) -> bool {
    if let Some(encoding) = schema.extension_str("contentEncoding") {
        return matches!(encoding, "base64" | "base64url");
    }

    let Some(media) = schema.extension_str("contentMediaType") else {
        return false;
    };
    media == "application/octet-stream"
        || media == "application/pdf"
        || media.starts_with("image/")
        || media.starts_with("audio/")
        || media.starts_with("video/")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shim(yaml: &str) -> ShimSchema {
        serde_yaml::from_str(yaml).unwrap()
    }

    #[test]
    fn test_map_primitives() {
        assert_eq!(scalar_type("integer", None), Some("i32"));
        assert_eq!(scalar_type("integer", Some("int64")), Some("i64"));
        assert_eq!(scalar_type("number", Some("float")), Some("f32"));
        assert_eq!(scalar_type("number", Some("double")), Some("f64"));
        assert_eq!(scalar_type("boolean", None), Some("bool"));
        assert_eq!(scalar_type("string", Some("uuid")), Some("Uuid"));
        assert_eq!(scalar_type("string", Some("date-time")), Some("DateTime"));
        assert_eq!(scalar_type("string", Some("date")), Some("NaiveDate"));
        assert_eq!(scalar_type("string", Some("password")), Some("Secret<String>"));
        assert_eq!(scalar_type("string", Some("email")), Some("String"));
        assert_eq!(scalar_type("object", None), None);
    }

    #[test]
    fn test_binary_content_media_type() {
        let schema = shim("type: string\ncontentMediaType: image/png\n");
        let out = scalar_schema(&schema, "string", &[]).unwrap();
        assert_eq!(out.target_type, "Vec<u8>");

        let schema = shim("type: string\ncontentEncoding: base64\n");
        assert_eq!(scalar_schema(&schema, "string", &[]).unwrap().target_type, "Vec<u8>");
    }

    #[test]
    fn test_unknown_type_is_unsupported() {
        let schema = shim("type: file\n");
        let err = scalar_schema(&schema, "file", &["Upload".to_string()]).unwrap_err();
        assert!(matches!(err, AppError::UnsupportedSchemaShape { .. }));
    }
}
