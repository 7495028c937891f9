//! # Error Handling
//!
//! Provides the unified `AppError` enum used across the workspace.
//!
//! The four resolution failures (`RefResolution`, `SchemaComposition`, `NameCollision`,
//! `UnsupportedSchemaShape`) are always fatal: generation stops and no partial model
//! is returned.

use derive_more::{Display, From};

/// The Global Error Enum.
///
/// We use `derive_more` for boilerplate.
/// Note: String errors default to `InvalidDocument`.
#[derive(Debug, Display, From)]
pub enum AppError {
    /// Wrapper for standard IO errors.
    #[display("IO Error: {_0}")]
    Io(std::io::Error),

    /// Wrapper for YAML parsing errors.
    #[display("YAML Error: {_0}")]
    Yaml(serde_yaml::Error),

    /// Wrapper for JSON serialization errors.
    #[display("JSON Error: {_0}")]
    Json(serde_json::Error),

    /// A `$ref` could not be mapped to a type.
    #[from(ignore)]
    #[display("Reference Error at '{naming_path}': cannot resolve '{reference}': {reason}")]
    RefResolution {
        /// The raw `$ref` string.
        reference: String,
        /// Naming path of the node holding the reference, joined with `/`.
        naming_path: String,
        /// What went wrong.
        reason: String,
    },

    /// `allOf` branches cannot be unified.
    #[from(ignore)]
    #[display("Composition Error at '{naming_path}': {reason}")]
    SchemaComposition {
        /// Naming path of the composed schema.
        naming_path: String,
        /// What went wrong.
        reason: String,
    },

    /// An identifier could not be allocated.
    #[from(ignore)]
    #[display("Name Collision: '{name}' is already taken in {namespace}")]
    NameCollision {
        /// The identifier that clashed.
        name: String,
        /// Human readable namespace description (e.g. `types`, `fields of Pet`).
        namespace: String,
    },

    /// A schema construct that cannot be expressed.
    #[from(ignore)]
    #[display("Unsupported Schema at '{naming_path}': {reason}")]
    UnsupportedSchemaShape {
        /// Naming path of the schema.
        naming_path: String,
        /// What went wrong.
        reason: String,
    },

    /// Structural defects in the input document.
    #[display("Invalid Document: {_0}")]
    InvalidDocument(String),

    /// Invalid generator configuration.
    #[from(ignore)]
    #[display("Configuration Error: {_0}")]
    Configuration(String),
}

/// Manual implementation of the standard Error trait.
impl std::error::Error for AppError {}

/// Helper type alias for Result using AppError.
pub type AppResult<T> = Result<T, AppError>;

/// Joins a naming path for error messages.
pub(crate) fn display_path(path: &[String]) -> String {
    if path.is_empty() {
        "<root>".to_string()
    } else {
        path.join("/")
    }
}

impl AppError {
    pub(crate) fn ref_resolution(
        reference: &str,
        path: &[String],
        reason: impl Into<String>,
    ) -> Self {
        AppError::RefResolution {
            reference: reference.to_string(),
            naming_path: display_path(path),
            reason: reason.into(),
        }
    }

    pub(crate) fn composition(path: &[String], reason: impl Into<String>) -> Self {
        AppError::SchemaComposition {
            naming_path: display_path(path),
            reason: reason.into(),
        }
    }

    pub(crate) fn unsupported(path: &[String], reason: impl Into<String>) -> Self {
        AppError::UnsupportedSchemaShape {
            naming_path: display_path(path),
            reason: reason.into(),
        }
    }

    pub(crate) fn collision(name: &str, namespace: impl Into<String>) -> Self {
        AppError::NameCollision {
            name: name.to_string(),
            namespace: namespace.into(),
        }
    }
}
