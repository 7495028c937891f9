#![deny(missing_docs)]

//! # Generate Command
//!
//! Resolves a document and renders the model through a rendering strategy.

use std::fs;
use std::path::PathBuf;

use clap::ValueEnum;
use schemagraph_core::strategies::{JsonModelStrategy, OutlineStrategy, RenderInput, RenderStrategy};
use schemagraph_core::{generate_from_str, GeneratedModel, WrapperOptions};
use tracing::info;

use crate::error::CliResult;
use crate::options::ResolveArgs;

/// Output format.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Emit {
    /// The resolved model as JSON.
    Json,
    /// Rust-flavoured declarations for review.
    Outline,
}

/// Which part of the model to render.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    /// Named types only.
    Types,
    /// Operations only.
    Operations,
    /// Types, then operations.
    All,
}

/// Arguments for the generate command.
#[derive(clap::Args, Debug, Clone)]
pub struct GenerateArgs {
    #[clap(flatten)]
    pub resolve: ResolveArgs,

    /// Output format.
    #[clap(long, value_enum, default_value_t = Emit::Json)]
    pub emit: Emit,

    /// Part of the model to render.
    #[clap(long, value_enum, default_value_t = Selection::All)]
    pub select: Selection,

    /// Indent JSON output.
    #[clap(long)]
    pub pretty: bool,

    /// Write to this file instead of stdout.
    #[clap(long, short = 'o')]
    pub output: Option<PathBuf>,
}

fn select(model: &GeneratedModel, selection: Selection) -> RenderInput<'_> {
    match selection {
        Selection::Types => RenderInput::Types(&model.types),
        Selection::Operations => RenderInput::Operations(&model.operations),
        Selection::All => RenderInput::combined(model),
    }
}

/// Executes the generate command.
pub fn execute(args: &GenerateArgs) -> CliResult<()> {
    let config = args.resolve.configuration()?;
    let text = args.resolve.read_spec()?;
    let model = generate_from_str(&text, &config)?;

    let strategy: Box<dyn RenderStrategy> = match args.emit {
        Emit::Json => Box::new(JsonModelStrategy {
            pretty: args.pretty,
        }),
        Emit::Outline => Box::new(OutlineStrategy::new(WrapperOptions::from(&config))),
    };
    let rendered = strategy.render(select(&model, args.select))?;

    match &args.output {
        Some(path) => {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(path, rendered)?;
            info!(strategy = strategy.name(), output = %path.display(), "model written");
        }
        None => print!("{}", rendered),
    }
    Ok(())
}
