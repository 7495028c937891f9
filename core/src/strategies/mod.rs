#![deny(missing_docs)]

//! # Strategies
//!
//! This module defines the architecture for pluggable rendering back-ends.
//!
//! - **traits**: Defines `RenderStrategy` and the `RenderInput` it consumes.
//! - **json**: The resolved model as JSON.
//! - **outline**: A Rust-flavoured outline of types and operations.

pub mod json;
pub mod outline;
pub mod traits;

// Re-export for easier access downstream
pub use json::JsonModelStrategy;
pub use outline::OutlineStrategy;
pub use traits::{RenderInput, RenderStrategy};
