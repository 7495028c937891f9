#![deny(missing_docs)]

//! # Outline Strategy
//!
//! Renders the model as Rust-flavoured declarations: structs for objects, enums for
//! value sets and unions, type aliases for everything else, followed by one comment
//! block per operation. The output is meant for reading and review, not compilation.

use crate::error::AppResult;
use crate::oas::models::{
    OperationDefinition, Property, Schema, SchemaKind, TypeDefinition, WrapperOptions,
};
use crate::oas::naming::{deprecation_comment, to_comment, to_field_name, Namespace};
use crate::strategies::traits::{RenderInput, RenderStrategy};

/// Renders types and operations as an outline.
#[derive(Debug, Clone, Copy, Default)]
pub struct OutlineStrategy {
    /// Optionality rules applied to fields.
    pub wrappers: WrapperOptions,
}

impl OutlineStrategy {
    /// Creates a strategy applying `wrappers` to fields.
    pub fn new(wrappers: WrapperOptions) -> Self {
        Self { wrappers }
    }

    fn render_type(&self, def: &TypeDefinition) -> AppResult<String> {
        let mut code = String::new();
        if let Some(doc) = def.doc_comment() {
            code.push_str(&doc);
            code.push('\n');
        }
        if def.schema.deprecated {
            code.push_str("#[deprecated]\n");
        }

        let schema = &def.schema;
        match schema.kind {
            SchemaKind::Object | SchemaKind::MergedObject => {
                code.push_str(&self.render_struct(&def.name, schema))
            }
            SchemaKind::Enum => code.push_str(&render_enum(&def.name, schema)),
            SchemaKind::Union => code.push_str(&render_union(&def.name, schema)?),
            _ => code.push_str(&format!("pub type {} = {};\n", def.name, alias_target(schema))),
        }
        Ok(code)
    }

    fn render_struct(&self, name: &str, schema: &Schema) -> String {
        let mut code = format!("pub struct {} {{\n", name);

        for embedded in &schema.embedded {
            code.push_str("    #[serde(flatten)]\n");
            code.push_str(&format!(
                "    pub {}: {},\n",
                to_field_name(embedded.rsplit("::").next().unwrap_or(embedded)),
                embedded
            ));
        }

        for prop in &schema.properties {
            code.push_str(&self.render_field(prop));
        }

        if let Some(ap) = &schema.additional_properties {
            code.push_str("    #[serde(flatten)]\n");
            code.push_str(&format!(
                "    pub additional_properties: HashMap<String, {}>,\n",
                ap.type_decl()
            ));
        } else if schema.deny_additional_properties {
            code.push_str("    // additional properties are rejected\n");
        }

        code.push_str("}\n");
        code
    }

    fn render_field(&self, prop: &Property) -> String {
        let mut code = String::new();
        if let Some(desc) = &prop.description {
            code.push_str(&indent(&to_comment(desc)));
        }
        if prop.deprecated {
            code.push_str(&indent(&deprecation_comment(None)));
        }

        let mut attrs = Vec::new();
        if prop.name != prop.json_name {
            attrs.push(format!("rename = \"{}\"", prop.json_name));
        }
        if prop.read_only {
            attrs.push("skip_deserializing".to_string());
        }
        if prop.write_only {
            attrs.push("skip_serializing".to_string());
        }
        if !attrs.is_empty() {
            code.push_str(&format!("    #[serde({})]\n", attrs.join(", ")));
        }

        code.push_str(&format!(
            "    pub {}: {},\n",
            prop.name,
            prop.type_decl(&self.wrappers)
        ));
        code
    }
}

/// Prefixes every line with four spaces.
fn indent(block: &str) -> String {
    block.lines().map(|line| format!("    {}\n", line)).collect()
}

fn alias_target(schema: &Schema) -> String {
    if schema.nullable {
        format!("Option<{}>", schema.type_decl())
    } else {
        schema.type_decl()
    }
}

fn render_enum(name: &str, schema: &Schema) -> String {
    let string_backed = schema.target_type == "String";
    let mut code = String::new();
    if !string_backed {
        code.push_str(&format!("/// Values of type `{}`.\n", schema.target_type));
    }
    code.push_str(&format!("pub enum {} {{\n", name));
    for value in &schema.enum_values {
        if string_backed {
            if value.ident != value.value {
                code.push_str(&format!("    #[serde(rename = \"{}\")]\n", value.value));
            }
            code.push_str(&format!("    {},\n", value.ident));
        } else {
            code.push_str(&format!("    {} = {},\n", value.ident, value.value));
        }
    }
    code.push_str("}\n");
    code
}

fn render_union(name: &str, schema: &Schema) -> AppResult<String> {
    let mut code = String::new();

    match &schema.discriminator {
        Some(disc) => {
            if !disc.mapping.is_empty() {
                code.push_str("///\n/// **Discriminator Mapping:**\n");
                for (key, val) in &disc.mapping {
                    code.push_str(&format!("/// * `{}` -> `{}`\n", key, val));
                }
            }
            code.push_str(&format!("#[serde(tag = \"{}\")]\n", disc.property_name));
        }
        None => code.push_str("#[serde(untagged)]\n"),
    }

    code.push_str(&format!("pub enum {} {{\n", name));
    let mut idents = Namespace::new(format!("variants of {}", name));
    for (idx, variant) in schema.variants.iter().enumerate() {
        let base = variant_ident(variant, idx);
        let ident = idents.claim(&base)?;
        code.push_str(&format!("    {}({}),\n", ident, variant.type_decl()));
    }
    code.push_str("}\n");
    Ok(code)
}

/// Variant identifier: the referenced type name, or a positional fallback.
fn variant_ident(variant: &Schema, idx: usize) -> String {
    let simple = |s: &str| !s.is_empty() && s.chars().all(|c| c.is_alphanumeric() || c == '_');
    match variant.ref_type.as_deref() {
        Some(name) => name.rsplit("::").next().unwrap_or(name).to_string(),
        None if simple(&variant.target_type) => {
            let mut chars = variant.target_type.chars();
            chars
                .next()
                .map(|first| first.to_uppercase().chain(chars).collect())
                .unwrap_or_default()
        }
        None => format!("Variant{}", idx),
    }
}

fn render_operation(op: &OperationDefinition) -> String {
    let mut lines = vec![format!("// {} {} -> {}", op.method, op.path, op.operation_id)];
    if let Some(summary) = &op.summary {
        lines.push(format!("//   summary: {}", summary.lines().next().unwrap_or_default()));
    }
    if op.deprecated {
        lines.push("//   deprecated".to_string());
    }
    for param in &op.parameters {
        lines.push(format!(
            "//   {} {}: {}",
            param.location,
            param.name,
            param.type_decl()
        ));
    }
    if let Some(params) = &op.params_type {
        lines.push(format!("//   params: {}", params));
    }
    for body in &op.request_bodies {
        let marker = if body.is_default { " (default)" } else { "" };
        lines.push(format!(
            "//   body {}{}: {}",
            body.content_type,
            marker,
            body.schema.type_decl()
        ));
    }
    for response in &op.responses {
        if response.contents.is_empty() {
            lines.push(format!("//   response {}", response.status_code));
        }
        for content in &response.contents {
            lines.push(format!(
                "//   response {} {}: {}",
                response.status_code,
                content.content_type,
                content.schema.type_decl()
            ));
        }
        for header in &response.headers {
            lines.push(format!(
                "//   response {} header {}: {}",
                response.status_code,
                header.name,
                header.schema.type_decl()
            ));
        }
    }
    for requirement in &op.security {
        if requirement.scopes.is_empty() {
            lines.push(format!("//   security {}", requirement.provider_name));
        } else {
            lines.push(format!(
                "//   security {} [{}]",
                requirement.provider_name,
                requirement.scopes.join(", ")
            ));
        }
    }
    let mut code = lines.join("\n");
    code.push('\n');
    code
}

impl RenderStrategy for OutlineStrategy {
    fn name(&self) -> &str {
        "outline"
    }

    fn render(&self, input: RenderInput<'_>) -> AppResult<String> {
        let mut blocks = input
            .types()
            .iter()
            .map(|def| self.render_type(def))
            .collect::<AppResult<Vec<String>>>()?;
        blocks.extend(input.operations().iter().map(render_operation));
        Ok(blocks.join("\n"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Configuration;
    use crate::oas::generator::generate_from_str;
    use pretty_assertions::assert_eq;

    const DOC: &str = r#"
openapi: 3.0.0
paths:
  /pets/{petId}:
    get:
      operationId: showPet
      parameters:
        - name: petId
          in: path
          required: true
          schema: {type: integer, format: int64}
      responses:
        '200':
          description: ok
          content:
            application/json:
              schema: {$ref: '#/components/schemas/Pet'}
components:
  schemas:
    Pet:
      description: A pet.
      type: object
      required: [id]
      properties:
        id: {type: integer, format: int64}
        petType:
          type: string
          enum: [cat, dog]
        nickname:
          type: string
          nullable: true
"#;

    fn render(input: fn(&crate::oas::models::GeneratedModel) -> String) -> String {
        let model = generate_from_str(DOC, &Configuration::default()).unwrap();
        input(&model)
    }

    #[test]
    fn test_struct_and_enum_outline() {
        let text = render(|model| {
            OutlineStrategy::default()
                .render(RenderInput::Types(&model.types))
                .unwrap()
        });
        let expected = r#"/// A pet.
pub struct Pet {
    pub id: i64,
    #[serde(rename = "petType")]
    pub pet_type: Option<PetPetType>,
    pub nickname: Option<String>,
}

pub enum PetPetType {
    #[serde(rename = "cat")]
    Cat,
    #[serde(rename = "dog")]
    Dog,
}
"#;
        assert_eq!(text, expected);
    }

    #[test]
    fn test_nullable_wrapper_mode() {
        let text = render(|model| {
            let wrappers = WrapperOptions {
                nullable_type: true,
                ..Default::default()
            };
            OutlineStrategy::new(wrappers)
                .render(RenderInput::Types(&model.types))
                .unwrap()
        });
        assert!(text.contains("pub nickname: Nullable<String>,"));
    }

    #[test]
    fn test_operation_outline() {
        let text = render(|model| {
            OutlineStrategy::default()
                .render(RenderInput::Operations(&model.operations))
                .unwrap()
        });
        assert_eq!(
            text,
            "// GET /pets/{petId} -> ShowPet\n\
             //   path petId: i64\n\
             //   response 200 application/json: Pet\n"
        );
    }

    #[test]
    fn test_union_variant_idents() {
        let mut cat = Schema::reference("Cat");
        cat.indirect = true;
        let union = Schema::union(
            vec![cat, Schema::primitive("String"), Schema::array(Schema::primitive("i32"))],
            None,
        );
        assert_eq!(
            render_union("Choice", &union).unwrap(),
            "#[serde(untagged)]\npub enum Choice {\n    Cat(Box<Cat>),\n    String(String),\n    Variant2(Vec<i32>),\n}\n"
        );
    }

    #[test]
    fn test_union_variant_idents_stay_distinct() {
        let union = Schema::union(
            vec![Schema::reference("Cat"), Schema::reference("zoo::Cat")],
            None,
        );
        assert_eq!(
            render_union("Pick", &union).unwrap(),
            "#[serde(untagged)]\npub enum Pick {\n    Cat(Cat),\n    Cat_2(zoo::Cat),\n}\n"
        );
    }

    const DOG: &str = r#"
openapi: 3.0.0
components:
  schemas:
    Pet:
      type: object
      required: [id]
      properties:
        id: {type: integer, format: int64}
        name: {type: string}
    Dog:
      allOf:
        - $ref: '#/components/schemas/Pet'
        - type: object
          required: [bark]
          properties:
            bark: {type: boolean}
"#;

    fn render_dog(old_merge_schemas: bool) -> String {
        let mut config = Configuration::default();
        config.compatibility.old_merge_schemas = old_merge_schemas;
        let model = generate_from_str(DOG, &config).unwrap();
        OutlineStrategy::default()
            .render(RenderInput::Types(&model.types))
            .unwrap()
    }

    #[test]
    fn test_flattened_merge_does_not_repeat_fields() {
        let text = render_dog(false);
        assert!(text.contains(
            "pub struct Dog {\n    pub id: i64,\n    pub name: Option<String>,\n    pub bark: bool,\n}\n"
        ));
        assert!(!text.contains("#[serde(flatten)]"));
    }

    #[test]
    fn test_legacy_merge_flattens_by_name() {
        let text = render_dog(true);
        assert!(text.contains(
            "pub struct Dog {\n    #[serde(flatten)]\n    pub pet: Pet,\n    pub bark: bool,\n}\n"
        ));
    }
}
