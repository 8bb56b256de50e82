//! `geem-html`: Renders one entity of a specification document as an HTML
//! form page, or a resource directory as a package listing.
//!
//! **Outputs:**
//! - `<out>`: the form page (or listing page with `--list`)
//! - `<template-out>`: `--template` with `@field.path` tokens filled from
//!   the form's submission
//!
//! **Usage:**
//! ```text
//! geem-html --document <path> --entity <focus> [--out <path>] [--minimal-form]
//! geem-html --resources <dir> --list [--public-only]
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

use anyhow::{bail, Context, Result};
use clap::Parser;
use geem_clients::{init_tracing, report_problems, SettingsArgs, SourceArgs};
use geem_form::compile_focus;
use geem_html::{fill_from_submission, render_listing, render_page, write_form, writer};
use geem_spec::{DirectoryLoader, ResourceFilter, ResourceLoader};

/// Render GEEM specification entities as HTML.
#[derive(Parser)]
#[command(name = "geem-html", about = "Render GEEM specification entities as HTML")]
struct Args {
    #[command(flatten)]
    source: SourceArgs,

    #[command(flatten)]
    settings: SettingsArgs,

    /// Entity to render, optionally as a path `root/child/...`.
    #[arg(long, required_unless_present = "list")]
    entity: Option<String>,

    /// Page title (default: the entity's label).
    #[arg(long)]
    title: Option<String>,

    /// Output page.
    #[arg(long, default_value = "public/form.html")]
    out: PathBuf,

    /// Prefix for stylesheet and script URLs.
    #[arg(long, env = "PUBLIC_BASE_PATH", default_value = "")]
    base_path: String,

    /// Markup template to fill from the form's submission.
    #[arg(long, requires = "template_out")]
    template: Option<PathBuf>,

    /// Where to write the filled template.
    #[arg(long)]
    template_out: Option<PathBuf>,

    /// Render the resource directory listing instead of a form.
    #[arg(long)]
    list: bool,

    /// Only list public packages.
    #[arg(long)]
    public_only: bool,
}

fn main() -> Result<()> {
    init_tracing();
    let args = Args::parse();
    let base_path = args.base_path.trim_end_matches('/');

    if args.list {
        let loader = DirectoryLoader::new(&args.source.resources);
        let summaries = loader
            .list()
            .with_context(|| format!("Failed to list resources: {}", args.source.resources.display()))?;
        let filter = ResourceFilter {
            public: args.public_only.then_some(true),
            ..ResourceFilter::default()
        };
        let page = render_page("Packages", &render_listing(&summaries, &filter), base_path);
        writer::write_html(&args.out, &page)?;
        println!("Listing of {} packages written to {}", summaries.len(), args.out.display());
        return Ok(());
    }

    let Some(focus) = args.entity.as_deref() else {
        bail!("--entity is required unless --list is given");
    };
    let document = args.source.load()?;
    let settings = args.settings.load()?;
    report_problems(&document, focus);

    let tree = compile_focus(&document, focus, &settings, 1);
    let title = args.title.clone().unwrap_or_else(|| {
        let root = focus.split('/').find(|s| !s.is_empty()).unwrap_or(focus);
        document
            .root(root)
            .and_then(|e| e.display_label())
            .unwrap_or(focus)
            .to_string()
    });
    write_form(&args.out, &tree, &title, base_path)?;
    println!("Form written to {}", args.out.display());

    if let (Some(template), Some(target)) = (&args.template, &args.template_out) {
        let markup = fs::read_to_string(template)
            .with_context(|| format!("Failed to read template: {}", template.display()))?;
        writer::write_text(target, &fill_from_submission(&markup, &tree))?;
        println!("Template written to {}", target.display());
    }
    Ok(())
}
