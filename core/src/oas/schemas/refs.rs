#![deny(missing_docs)]

//! # Reference Resolution
//!
//! Maps `$ref` strings to type names.
//!
//! - Same-document references must have the form `#/components/<section>/<name>`; the
//!   name comes from the registry's reservation, and the outcome reports whether the
//!   target is finished, pending, or currently being walked (a cycle).
//! - External references are looked up in the import mapping and become
//!   `alias::TypeName`; they are never loaded.
//! - Whole-document references (`money.yaml`) name the external module's root type and
//!   never produce a local type.

use crate::config::{ImportMapping, SELF_ALIAS};
use crate::error::{AppError, AppResult};
use crate::oas::naming::{schema_name_to_type_name, to_field_name, NameNormalizer};
use crate::oas::ref_utils::{
    document_stem, is_whole_document_reference, last_pointer_segment, normalize_ref_to_local,
    parse_component_pointer, split_reference,
};
use crate::oas::registry::{component_key, ComponentState, TypeRegistry};
use indexmap::IndexMap;
use utoipa::openapi::RefOr;

/// Maximum length of a `$ref` alias chain between components.
const MAX_ALIAS_DEPTH: usize = 32;

/// What a `$ref` resolved to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefOutcome {
    /// A finished local type.
    LocalResolved {
        /// Canonical component key.
        key: String,
        /// Type name.
        name: String,
    },
    /// A local type that is not finished yet.
    LocalPending {
        /// Canonical component key.
        key: String,
        /// Type name.
        name: String,
        /// The target is currently being walked, so this reference closes a cycle.
        in_flight: bool,
    },
    /// A type in another document.
    External {
        /// Module alias from the import mapping.
        alias: String,
        /// Type name inside that module.
        name: String,
    },
}

impl RefOutcome {
    /// The type expression to use at the reference site.
    pub fn type_name(&self) -> String {
        match self {
            RefOutcome::LocalResolved { name, .. } | RefOutcome::LocalPending { name, .. } => {
                name.clone()
            }
            RefOutcome::External { alias, name } => format!("{}::{}", alias, name),
        }
    }
}

/// Resolves references against one document and its import mapping.
#[derive(Debug, Clone)]
pub struct ReferenceResolver<'a> {
    import_mapping: &'a ImportMapping,
    self_uri: Option<&'a str>,
    normalizer: NameNormalizer,
}

impl<'a> ReferenceResolver<'a> {
    /// Creates a resolver for the document identified by `self_uri`.
    pub fn new(
        import_mapping: &'a ImportMapping,
        self_uri: Option<&'a str>,
        normalizer: NameNormalizer,
    ) -> Self {
        Self {
            import_mapping,
            self_uri,
            normalizer,
        }
    }

    /// The same-document pointer a reference designates, if it is local.
    ///
    /// References into a document mapped to `-` count as local.
    pub fn local_pointer(&self, reference: &str) -> Option<String> {
        if let Some(local) = normalize_ref_to_local(reference, self.self_uri) {
            return Some(local);
        }
        let split = split_reference(reference);
        match (self.import_mapping.get(split.document), split.fragment) {
            (Some(alias), Some(fragment)) if alias == SELF_ALIAS => Some(format!("#{}", fragment)),
            _ => None,
        }
    }

    /// The `(section, name)` of a local component reference.
    pub fn local_component(&self, reference: &str) -> Option<(String, String)> {
        let local = self.local_pointer(reference)?;
        parse_component_pointer(local.trim_start_matches('#'))
    }

    /// Resolves a reference that must designate an entry of `section`.
    ///
    /// `path` is the naming path of the referring node, used in errors.
    pub fn resolve(
        &self,
        reference: &str,
        section: &str,
        registry: &TypeRegistry,
        path: &[String],
    ) -> AppResult<RefOutcome> {
        if self.local_pointer(reference).is_some() {
            return self.resolve_local(reference, section, registry, path);
        }

        let split = split_reference(reference);
        if split.document.is_empty() {
            return Err(AppError::ref_resolution(reference, path, "empty reference"));
        }

        let whole = is_whole_document_reference(reference);
        match self.import_mapping.get(split.document) {
            Some(alias) if alias == SELF_ALIAS => Err(AppError::ref_resolution(
                reference,
                path,
                "the current document cannot be referenced as a whole",
            )),
            Some(alias) => Ok(RefOutcome::External {
                alias: alias.clone(),
                name: self.external_name(reference, whole, path)?,
            }),
            None if whole => {
                let stem = document_stem(split.document);
                Ok(RefOutcome::External {
                    alias: to_field_name(&stem),
                    name: schema_name_to_type_name(&stem, self.normalizer),
                })
            }
            None => Err(AppError::ref_resolution(
                reference,
                path,
                format!("no import mapping for external document '{}'", split.document),
            )),
        }
    }

    fn resolve_local(
        &self,
        reference: &str,
        section: &str,
        registry: &TypeRegistry,
        path: &[String],
    ) -> AppResult<RefOutcome> {
        let (found_section, name) = self.local_component(reference).ok_or_else(|| {
            AppError::ref_resolution(
                reference,
                path,
                "only '#/components/<section>/<name>' references are supported",
            )
        })?;
        if found_section != section {
            return Err(AppError::ref_resolution(
                reference,
                path,
                format!("expected a reference into components/{}", section),
            ));
        }

        let key = component_key(&found_section, &name);
        let type_name = registry.component_name(&key).ok_or_else(|| {
            AppError::ref_resolution(reference, path, "target does not exist in the document")
        })?;
        let type_name = type_name.to_string();

        Ok(match registry.component_state(&key) {
            Some(ComponentState::Finished) => RefOutcome::LocalResolved {
                key,
                name: type_name,
            },
            Some(ComponentState::InFlight) => RefOutcome::LocalPending {
                key,
                name: type_name,
                in_flight: true,
            },
            _ => RefOutcome::LocalPending {
                key,
                name: type_name,
                in_flight: false,
            },
        })
    }

    fn external_name(&self, reference: &str, whole: bool, path: &[String]) -> AppResult<String> {
        let split = split_reference(reference);
        let raw = if whole {
            document_stem(split.document)
        } else {
            split
                .fragment
                .filter(|f| f.starts_with('/'))
                .and_then(last_pointer_segment)
                .ok_or_else(|| {
                    AppError::ref_resolution(reference, path, "unparseable JSON pointer")
                })?
        };
        Ok(schema_name_to_type_name(&raw, self.normalizer))
    }

    /// Looks up a same-document component of `section`, following alias chains.
    ///
    /// Returns the final component's name and value.
    pub fn lookup_component<'m, T>(
        &self,
        entries: &'m IndexMap<String, RefOr<T>>,
        reference: &str,
        section: &str,
        path: &[String],
    ) -> AppResult<(String, &'m T)> {
        let mut current = reference.to_string();
        for _ in 0..MAX_ALIAS_DEPTH {
            let (found_section, name) = self.local_component(&current).ok_or_else(|| {
                AppError::ref_resolution(
                    reference,
                    path,
                    format!("only same-document components/{} references are supported", section),
                )
            })?;
            if found_section != section {
                return Err(AppError::ref_resolution(
                    reference,
                    path,
                    format!("expected a reference into components/{}", section),
                ));
            }
            match entries.get(&name) {
                Some(RefOr::T(value)) => return Ok((name, value)),
                Some(RefOr::Ref(next)) => current = next.ref_location.clone(),
                None => {
                    return Err(AppError::ref_resolution(
                        reference,
                        path,
                        "target does not exist in the document",
                    ))
                }
            }
        }
        Err(AppError::ref_resolution(
            reference,
            path,
            "alias chain is too long or cyclic",
        ))
    }
}
