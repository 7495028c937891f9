#![deny(missing_docs)]

//! # Resolver Module
//!
//! Describes the parts of an operation that carry schemas.
//!
//! Handles:
//! - Scalar type mapping (`types`).
//! - Parameter merging, ordering and typing (`params`).
//! - Request bodies per content type (`body`).
//! - Responses per status code, content type and header (`responses`).

pub mod body;
pub mod params;
pub mod responses;
pub mod types;

pub use body::{content_type_tag, is_json_media_type};
pub use params::path_template_names;
pub use types::scalar_type;
