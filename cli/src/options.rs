#![deny(missing_docs)]

//! # Shared Options
//!
//! Arguments every command needs to load a document and its configuration.

use std::fs;
use std::path::PathBuf;

use schemagraph_core::Configuration;
use tracing::debug;

use crate::error::{CliError, CliResult};

/// Document and configuration arguments.
#[derive(clap::Args, Debug, Clone)]
pub struct ResolveArgs {
    /// Path to the OpenAPI document (YAML or JSON).
    pub spec: PathBuf,

    /// Path to a YAML configuration file.
    #[clap(long, short = 'c', env = "SCHEMAGRAPH_CONFIG")]
    pub config: Option<PathBuf>,

    /// Maps an external document to a module alias, e.g. `common.yaml=common`.
    /// Overrides entries of the configuration file. Repeatable.
    #[clap(long = "import-mapping", value_name = "DOC=ALIAS", value_parser = parse_mapping)]
    pub import_mapping: Vec<(String, String)>,
}

impl ResolveArgs {
    /// Reads the document text.
    pub fn read_spec(&self) -> CliResult<String> {
        if !self.spec.exists() {
            return Err(CliError::General(format!(
                "OpenAPI file not found: {:?}",
                self.spec
            )));
        }
        Ok(fs::read_to_string(&self.spec)?)
    }

    /// Loads the configuration file, if any, and applies command line mappings.
    pub fn configuration(&self) -> CliResult<Configuration> {
        let mut config = match &self.config {
            Some(path) => {
                debug!(path = %path.display(), "loading configuration");
                Configuration::from_yaml(&fs::read_to_string(path)?)?
            }
            None => Configuration::default(),
        };
        for (document, alias) in &self.import_mapping {
            config
                .import_mapping
                .insert(document.clone(), alias.clone());
        }
        config.validate()?;
        Ok(config)
    }
}

/// Parses `DOC=ALIAS`.
fn parse_mapping(raw: &str) -> Result<(String, String), String> {
    let (document, alias) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected DOC=ALIAS, got '{}'", raw))?;
    let (document, alias) = (document.trim(), alias.trim());
    if document.is_empty() || alias.is_empty() {
        return Err(format!("expected DOC=ALIAS, got '{}'", raw));
    }
    Ok((document.to_string(), alias.to_string()))
}
