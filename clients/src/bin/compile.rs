//! `geem-compile`: Compiles one entity of a specification document into a
//! render tree and prints it as JSON.
//!
//! **Usage:**
//! ```text
//! geem-compile --document <path> --entity <focus> [--settings <toml>] [--out <path>] [--submission]
//! geem-compile --resources <dir> --resource <id> --entity <focus>
//! ```

#![deny(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    missing_docs,
    clippy::missing_errors_doc
)]

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use geem_clients::{init_tracing, report_problems, SettingsArgs, SourceArgs};
use geem_form::{compile_focus, extract, RenderState};

/// Compile a GEEM specification entity into a render tree.
#[derive(Parser)]
#[command(
    name = "geem-compile",
    about = "Compile a GEEM specification entity into a render tree"
)]
struct Args {
    #[command(flatten)]
    source: SourceArgs,

    #[command(flatten)]
    settings: SettingsArgs,

    /// Entity to render, optionally as a path `root/child/...`.
    #[arg(long)]
    entity: String,

    /// Print the (empty) submission the tree extracts to instead of the tree.
    #[arg(long)]
    submission: bool,

    /// Write the JSON here instead of standard output.
    #[arg(long)]
    out: Option<PathBuf>,
}

fn main() -> Result<()> {
    init_tracing();
    let args = Args::parse();

    let document = args.source.load()?;
    let settings = args.settings.load()?;
    report_problems(&document, &args.entity);

    let tree = compile_focus(&document, &args.entity, &settings, 1);
    if tree.state == RenderState::NoFieldSpecification {
        tracing::warn!(focus = %args.entity, "entity has no field specification");
    }

    let json = if args.submission {
        serde_json::to_string_pretty(&extract(&tree))?
    } else {
        serde_json::to_string_pretty(&tree)?
    };

    match &args.out {
        Some(path) => {
            fs::write(path, json).with_context(|| format!("Failed to write: {}", path.display()))?;
            println!("Render tree written to {}", path.display());
        }
        None => println!("{json}"),
    }
    Ok(())
}
