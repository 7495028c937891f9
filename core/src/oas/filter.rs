#![deny(missing_docs)]

//! # Operation Filtering
//!
//! Drops operations by tag or operation id before anything is walked. Ids are compared
//! as written in the document, before normalization.

use crate::config::OutputOptions;
use crate::oas::shims::{ShimOpenApi, ShimOperation};
use tracing::debug;

/// Whether an operation survives the tag and id filters.
pub fn keep_operation(op: &ShimOperation, options: &OutputOptions) -> bool {
    let has_tag = |tags: &[String]| op.tags.iter().any(|t| tags.contains(t));

    if !options.exclude_tags.is_empty() && has_tag(&options.exclude_tags) {
        return false;
    }
    if !options.include_tags.is_empty() && !has_tag(&options.include_tags) {
        return false;
    }

    let id = op.operation_id.as_deref();
    if let Some(id) = id {
        if options.exclude_operation_ids.iter().any(|e| e == id) {
            return false;
        }
    }
    if !options.include_operation_ids.is_empty() {
        return id.is_some_and(|id| options.include_operation_ids.iter().any(|i| i == id));
    }
    true
}

/// Removes filtered operations from `doc` in place. Emptied path items are kept.
pub fn filter_operations(doc: &mut ShimOpenApi, options: &OutputOptions) {
    for (path, item) in doc.paths.items.iter_mut() {
        for slot in item.operation_slots_mut() {
            let drop = slot.as_ref().is_some_and(|op| !keep_operation(op, options));
            if drop {
                let id = slot.as_ref().and_then(|op| op.operation_id.clone());
                debug!(path = %path, operation_id = ?id, "operation filtered out");
                *slot = None;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oas::shims::load_document;

    const DOC: &str = r#"
openapi: 3.0.0
paths:
  /pets:
    get:
      operationId: listPets
      tags: [pets]
      responses: {}
    post:
      operationId: addPet
      tags: [pets, admin]
      responses: {}
  /health:
    get:
      tags: [ops]
      responses: {}
"#;

    fn remaining(options: &OutputOptions) -> Vec<String> {
        let mut doc = load_document(DOC).unwrap();
        filter_operations(&mut doc, options);
        doc.paths
            .items
            .iter()
            .flat_map(|(path, item)| {
                item.operations()
                    .into_iter()
                    .map(move |(method, _)| format!("{} {}", method, path))
            })
            .collect()
    }

    #[test]
    fn test_no_filters_keep_everything() {
        assert_eq!(
            remaining(&OutputOptions::default()),
            vec!["GET /health", "GET /pets", "POST /pets"]
        );
    }

    #[test]
    fn test_tag_filters() {
        let options = OutputOptions {
            include_tags: vec!["pets".into()],
            exclude_tags: vec!["admin".into()],
            ..Default::default()
        };
        assert_eq!(remaining(&options), vec!["GET /pets"]);
    }

    #[test]
    fn test_operation_id_filters() {
        let options = OutputOptions {
            include_operation_ids: vec!["addPet".into()],
            ..Default::default()
        };
        assert_eq!(remaining(&options), vec!["POST /pets"]);

        let options = OutputOptions {
            exclude_operation_ids: vec!["addPet".into()],
            ..Default::default()
        };
        assert_eq!(remaining(&options), vec!["GET /health", "GET /pets"]);
    }
}
