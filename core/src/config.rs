#![deny(missing_docs)]

//! # Generator Configuration
//!
//! Options that steer naming, optionality and composition. Loaded from YAML with
//! kebab-case keys; every field has a default so an empty file is a valid configuration.

use crate::error::{AppError, AppResult};
use crate::oas::naming::NameNormalizer;
use serde::{Deserialize, Serialize};
use indexmap::IndexMap;

/// Maps an external document reference (as written before the `#` of a `$ref`) to the
/// module alias its types live under, in declaration order. The alias `-` marks the
/// current document.
pub type ImportMapping = IndexMap<String, String>;

/// Alias meaning "the same document".
pub const SELF_ALIAS: &str = "-";

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct Configuration {
    /// Which parts of the model to produce.
    pub generate: GenerateOptions,
    /// Flags that reproduce older generator behaviour.
    pub compatibility: CompatibilityOptions,
    /// Naming, optionality and filtering options.
    pub output_options: OutputOptions,
    /// External document aliases.
    pub import_mapping: ImportMapping,
}

/// Selects the parts of the model to produce.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct GenerateOptions {
    /// Generate named types for `components`.
    pub models: bool,
    /// Describe operations (and the types they spawn).
    pub operations: bool,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        Self {
            models: true,
            operations: true,
        }
    }
}

/// Compatibility switches.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct CompatibilityOptions {
    /// Use the legacy `allOf` merger, which embeds referenced types instead of
    /// flattening their fields.
    pub old_merge_schemas: bool,
    /// Required `readOnly`/`writeOnly` properties are not wrapped in `Option`.
    pub disable_required_read_only_as_wrapper: bool,
}

/// Output options.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct OutputOptions {
    /// Identifier normalization function.
    pub name_normalizer: NameNormalizer,
    /// Nullable properties use `Nullable<T>` instead of `Option<T>`.
    pub nullable_type: bool,
    /// Treat every schema as if it carried `x-skip-optional-wrapper: true`.
    pub prefer_skip_optional_wrapper: bool,
    /// Only keep operations carrying one of these tags.
    pub include_tags: Vec<String>,
    /// Drop operations carrying any of these tags.
    pub exclude_tags: Vec<String>,
    /// Only keep these operation ids.
    pub include_operation_ids: Vec<String>,
    /// Drop these operation ids.
    pub exclude_operation_ids: Vec<String>,
    /// Component schemas that get no type definition.
    pub exclude_schemas: Vec<String>,
}

/// Which `allOf` merge algorithm runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeAlgorithm {
    /// Flatten referenced fields into one object.
    Current,
    /// Embed referenced types by name.
    Legacy,
}

impl Configuration {
    /// Parses a YAML configuration file.
    ///
    /// An empty document yields the defaults.
    pub fn from_yaml(text: &str) -> AppResult<Self> {
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Configuration = serde_yaml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects contradictory options.
    pub fn validate(&self) -> AppResult<()> {
        let out = &self.output_options;
        if let Some(tag) = out.include_tags.iter().find(|t| out.exclude_tags.contains(t)) {
            return Err(AppError::Configuration(format!(
                "tag '{}' is both included and excluded",
                tag
            )));
        }
        if let Some(id) = out
            .include_operation_ids
            .iter()
            .find(|id| out.exclude_operation_ids.contains(id))
        {
            return Err(AppError::Configuration(format!(
                "operation id '{}' is both included and excluded",
                id
            )));
        }
        if let Some((doc, _)) = self.import_mapping.iter().find(|(_, a)| a.trim().is_empty()) {
            return Err(AppError::Configuration(format!(
                "import mapping for '{}' has an empty alias",
                doc
            )));
        }
        Ok(())
    }

    /// The configured `allOf` merge algorithm.
    pub fn merge_algorithm(&self) -> MergeAlgorithm {
        if self.compatibility.old_merge_schemas {
            MergeAlgorithm::Legacy
        } else {
            MergeAlgorithm::Current
        }
    }
}
