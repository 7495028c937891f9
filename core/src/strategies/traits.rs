#![deny(missing_docs)]

//! # Render Strategy Trait
//!
//! Defines the interface a rendering back-end implements. Back-ends receive fully
//! resolved types and operations and hold no resolution logic of their own.

use crate::error::AppResult;
use crate::oas::models::{GeneratedModel, OperationDefinition, TypeDefinition};
use serde::Serialize;

/// The shapes of model a back-end can be asked to render.
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(untagged)]
pub enum RenderInput<'a> {
    /// Named types only.
    Types(&'a [TypeDefinition]),
    /// Operations only.
    Operations(&'a [OperationDefinition]),
    /// Both, types first.
    Combined {
        /// Named types.
        types: &'a [TypeDefinition],
        /// Operations.
        operations: &'a [OperationDefinition],
    },
}

impl<'a> RenderInput<'a> {
    /// The whole model.
    pub fn combined(model: &'a GeneratedModel) -> Self {
        RenderInput::Combined {
            types: &model.types,
            operations: &model.operations,
        }
    }

    /// The types carried by this input.
    pub fn types(&self) -> &'a [TypeDefinition] {
        match self {
            RenderInput::Types(types) | RenderInput::Combined { types, .. } => types,
            RenderInput::Operations(_) => &[],
        }
    }

    /// The operations carried by this input.
    pub fn operations(&self) -> &'a [OperationDefinition] {
        match self {
            RenderInput::Operations(operations) | RenderInput::Combined { operations, .. } => {
                operations
            }
            RenderInput::Types(_) => &[],
        }
    }
}

/// A strategy trait for decoupling output formats from resolution.
///
/// Implementors turn a [`RenderInput`] into text. The input is already ordered;
/// back-ends must not reorder or rename.
pub trait RenderStrategy {
    /// Short identifier used on the command line (e.g. `json`).
    fn name(&self) -> &str;

    /// Renders `input` to text.
    fn render(&self, input: RenderInput<'_>) -> AppResult<String>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accessors_follow_variant() {
        let model = GeneratedModel::default();
        let input = RenderInput::Operations(&model.operations);
        assert!(input.types().is_empty());
        assert!(input.operations().is_empty());

        let combined = RenderInput::combined(&model);
        assert!(matches!(combined, RenderInput::Combined { .. }));
    }
}
