#![deny(missing_docs)]

//! # Check Command
//!
//! Resolves a document without rendering it and reports what would be generated.

use schemagraph_core::{generate_from_str, GeneratedModel};

use crate::error::CliResult;
use crate::options::ResolveArgs;

/// Arguments for the check command.
#[derive(clap::Args, Debug, Clone)]
pub struct CheckArgs {
    #[clap(flatten)]
    pub resolve: ResolveArgs,
}

/// One line summarizing a resolved model.
pub fn summary(model: &GeneratedModel) -> String {
    let operation_types: usize = model
        .operations
        .iter()
        .map(|op| op.type_definitions.len())
        .sum();
    format!(
        "{} types ({} spawned by operations), {} operations",
        model.types.len(),
        operation_types,
        model.operations.len()
    )
}

/// Executes the check command.
pub fn execute(args: &CheckArgs) -> CliResult<()> {
    let config = args.resolve.configuration()?;
    let text = args.resolve.read_spec()?;
    let model = generate_from_str(&text, &config)?;
    println!("{}", summary(&model));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use schemagraph_core::Configuration;

    #[test]
    fn test_summary() {
        let yaml = r#"
openapi: 3.0.0
paths:
  /things:
    post:
      operationId: createThing
      requestBody:
        content:
          application/json:
            schema:
              type: object
              properties:
                name: {type: string}
      responses:
        '204': {description: done}
components:
  schemas:
    Thing: {type: string}
"#;
        let model = generate_from_str(yaml, &Configuration::default()).unwrap();
        assert_eq!(summary(&model), "2 types (1 spawned by operations), 1 operations");
    }
}
