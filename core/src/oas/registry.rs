#![deny(missing_docs)]

//! # Type Registry
//!
//! Owns every named type produced during one generation run.
//!
//! Component types are keyed by their canonical `$ref` and go through three states:
//! *reserved* (name allocated up front), *in flight* (being walked) and *finished*.
//! Inline and operation types are registered directly; a structurally equivalent type
//! under the same name is reused instead of duplicated.
//! Output order is the order in which slots were opened.

use crate::error::{AppError, AppResult};
use crate::oas::models::{SchemaKind, TypeDefinition};
use crate::oas::naming::Namespace;
use crate::oas::ref_utils::encode_pointer_segment;
use std::collections::HashMap;

/// Lifecycle state of a component type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComponentState {
    /// Name allocated, not walked yet.
    Reserved,
    /// Currently being walked.
    InFlight,
    /// Walked and stored.
    Finished,
}

/// Canonical key of a component: its same-document `$ref`.
pub fn component_key(section: &str, name: &str) -> String {
    format!("#/components/{}/{}", section, encode_pointer_segment(name))
}

#[derive(Debug)]
enum Slot {
    InFlight { name: String },
    Finished(TypeDefinition),
}

impl Slot {
    fn name(&self) -> &str {
        match self {
            Slot::InFlight { name } => name,
            Slot::Finished(def) => &def.name,
        }
    }
}

#[derive(Debug)]
struct ComponentEntry {
    name: String,
    slot: Option<usize>,
}

/// Arena of named types.
#[derive(Debug)]
pub struct TypeRegistry {
    names: Namespace,
    components: HashMap<String, ComponentEntry>,
    slots: Vec<Slot>,
    by_name: HashMap<String, usize>,
}

impl Default for TypeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl TypeRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self {
            names: Namespace::new("type names"),
            components: HashMap::new(),
            slots: Vec::new(),
            by_name: HashMap::new(),
        }
    }

    /// Allocates the type name of a component before anything is walked.
    ///
    /// An `explicit` name must be free. Otherwise `desired` is used; when it is taken and a
    /// `section_suffix` is given, the suffixed form is tried before numeric suffixes.
    pub fn reserve_component(
        &mut self,
        key: &str,
        explicit: Option<&str>,
        desired: &str,
        section_suffix: Option<&str>,
    ) -> AppResult<String> {
        if let Some(entry) = self.components.get(key) {
            return Ok(entry.name.clone());
        }

        let name = match explicit {
            Some(explicit) => {
                self.names.claim_exact(explicit)?;
                explicit.to_string()
            }
            None => {
                let base = match section_suffix {
                    Some(suffix) if self.names.contains(desired) => format!("{}{}", desired, suffix),
                    _ => desired.to_string(),
                };
                self.names.claim(&base)?
            }
        };

        self.components.insert(
            key.to_string(),
            ComponentEntry {
                name: name.clone(),
                slot: None,
            },
        );
        Ok(name)
    }

    /// The allocated name of a component.
    pub fn component_name(&self, key: &str) -> Option<&str> {
        self.components.get(key).map(|e| e.name.as_str())
    }

    /// The lifecycle state of a component, if it was reserved.
    pub fn component_state(&self, key: &str) -> Option<ComponentState> {
        let entry = self.components.get(key)?;
        Some(match entry.slot.map(|idx| &self.slots[idx]) {
            None => ComponentState::Reserved,
            Some(Slot::InFlight { .. }) => ComponentState::InFlight,
            Some(Slot::Finished(_)) => ComponentState::Finished,
        })
    }

    /// Opens the slot of a reserved component and marks it in flight.
    pub fn begin(&mut self, key: &str) -> AppResult<String> {
        let idx = self.slots.len();
        let entry = self
            .components
            .get_mut(key)
            .ok_or_else(|| AppError::InvalidDocument(format!("Component '{}' was never reserved", key)))?;
        if entry.slot.is_some() {
            return Err(AppError::InvalidDocument(format!(
                "Component '{}' was walked twice",
                key
            )));
        }
        entry.slot = Some(idx);
        let name = entry.name.clone();
        self.slots.push(Slot::InFlight { name: name.clone() });
        self.by_name.insert(name.to_lowercase(), idx);
        Ok(name)
    }

    /// Stores the finished definition of an in-flight component.
    pub fn promote(&mut self, key: &str, mut def: TypeDefinition) -> AppResult<()> {
        let idx = self
            .components
            .get(key)
            .and_then(|e| e.slot)
            .ok_or_else(|| AppError::InvalidDocument(format!("Component '{}' is not in flight", key)))?;
        def.name = self.slots[idx].name().to_string();
        name_own_type(&mut def);
        self.slots[idx] = Slot::Finished(def);
        Ok(())
    }

    /// Registers a non-component type and returns `(final_name, newly_created)`.
    ///
    /// `def.name` is the desired name. If a type with that name exists and is equivalent,
    /// its name is returned and nothing is stored. Otherwise the first free name of the
    /// `_2`, `_3`, ... sequence is used.
    pub fn register(&mut self, mut def: TypeDefinition) -> AppResult<(String, bool)> {
        let base = def.name.clone();
        for candidate in Namespace::candidates(&base) {
            if let Some(&idx) = self.by_name.get(&candidate.to_lowercase()) {
                if let Slot::Finished(existing) = &self.slots[idx] {
                    if existing.schema.is_equivalent(&def.schema) {
                        return Ok((existing.name.clone(), false));
                    }
                }
                continue;
            }
            if self.names.contains(&candidate) {
                continue;
            }

            self.names.claim_exact(&candidate)?;
            def.name = candidate.clone();
            name_own_type(&mut def);
            let idx = self.slots.len();
            self.slots.push(Slot::Finished(def));
            self.by_name.insert(candidate.to_lowercase(), idx);
            return Ok((candidate, true));
        }
        Err(AppError::collision(&base, "type names"))
    }

    /// A finished type by name.
    pub fn get(&self, name: &str) -> Option<&TypeDefinition> {
        match self.slots.get(*self.by_name.get(&name.to_lowercase())?)? {
            Slot::Finished(def) if def.name == name => Some(def),
            _ => None,
        }
    }

    /// Whether `name` belongs to a component that is still being walked.
    pub fn is_in_flight(&self, name: &str) -> bool {
        self.by_name
            .get(&name.to_lowercase())
            .and_then(|&idx| self.slots.get(idx))
            .is_some_and(|slot| matches!(slot, Slot::InFlight { name: n } if n == name))
    }

    /// Number of opened slots.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Whether no slot was opened.
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// All definitions in registration order.
    pub fn into_definitions(self) -> AppResult<Vec<TypeDefinition>> {
        self.slots
            .into_iter()
            .map(|slot| match slot {
                Slot::Finished(def) => Ok(def),
                Slot::InFlight { name } => Err(AppError::InvalidDocument(format!(
                    "Type '{}' was never completed",
                    name
                ))),
            })
            .collect()
    }
}

/// Named kinds carry their own name as target type.
fn name_own_type(def: &mut TypeDefinition) {
    if matches!(
        def.schema.kind,
        SchemaKind::Object | SchemaKind::Union | SchemaKind::MergedObject
    ) {
        def.schema.target_type = def.name.clone();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oas::models::{Property, Schema};

    fn object_def(name: &str, field_type: &str) -> TypeDefinition {
        let schema = Schema::object(vec![Property::new("id", Schema::primitive(field_type), true)]);
        TypeDefinition::inline(name.to_string(), &[name.to_string()], schema)
    }

    #[test]
    fn test_component_lifecycle() {
        let mut reg = TypeRegistry::new();
        let key = component_key("schemas", "Pet");
        assert_eq!(reg.component_state(&key), None);

        let name = reg.reserve_component(&key, None, "Pet", None).unwrap();
        assert_eq!(name, "Pet");
        assert_eq!(reg.component_state(&key), Some(ComponentState::Reserved));

        reg.begin(&key).unwrap();
        assert_eq!(reg.component_state(&key), Some(ComponentState::InFlight));
        assert!(reg.is_in_flight("Pet"));
        assert!(reg.get("Pet").is_none());

        reg.promote(&key, object_def("ignored", "i64")).unwrap();
        assert_eq!(reg.component_state(&key), Some(ComponentState::Finished));
        let def = reg.get("Pet").unwrap();
        assert_eq!(def.schema.target_type, "Pet");
        assert!(!reg.is_in_flight("Pet"));
    }

    #[test]
    fn test_section_suffix_on_collision() {
        let mut reg = TypeRegistry::new();
        reg.reserve_component(&component_key("schemas", "Pet"), None, "Pet", None)
            .unwrap();
        let name = reg
            .reserve_component(&component_key("responses", "Pet"), None, "Pet", Some("Response"))
            .unwrap();
        assert_eq!(name, "PetResponse");
    }

    #[test]
    fn test_explicit_name_collision_is_error() {
        let mut reg = TypeRegistry::new();
        reg.reserve_component(&component_key("schemas", "A"), None, "Shared", None)
            .unwrap();
        let err = reg
            .reserve_component(&component_key("schemas", "B"), Some("Shared"), "B", None)
            .unwrap_err();
        assert!(matches!(err, AppError::NameCollision { .. }));
    }

    #[test]
    fn test_register_deduplicates_equivalent() {
        let mut reg = TypeRegistry::new();
        let (first, created) = reg.register(object_def("Owner", "i64")).unwrap();
        assert_eq!((first.as_str(), created), ("Owner", true));

        let (again, created) = reg.register(object_def("Owner", "i64")).unwrap();
        assert_eq!((again.as_str(), created), ("Owner", false));

        let (other, created) = reg.register(object_def("Owner", "String")).unwrap();
        assert_eq!((other.as_str(), created), ("Owner_2", true));

        let (same_as_second, created) = reg.register(object_def("Owner", "String")).unwrap();
        assert_eq!((same_as_second.as_str(), created), ("Owner_2", false));
        assert_eq!(reg.len(), 2);
    }

    #[test]
    fn test_register_skips_reserved_component_names() {
        let mut reg = TypeRegistry::new();
        reg.reserve_component(&component_key("schemas", "PetOwner"), None, "PetOwner", None)
            .unwrap();
        let (name, _) = reg.register(object_def("PetOwner", "i64")).unwrap();
        assert_eq!(name, "PetOwner_2");
    }

    #[test]
    fn test_unfinished_slot_is_reported() {
        let mut reg = TypeRegistry::new();
        let key = component_key("schemas", "Loop");
        reg.reserve_component(&key, None, "Loop", None).unwrap();
        reg.begin(&key).unwrap();
        assert!(reg.into_definitions().is_err());
    }
}
