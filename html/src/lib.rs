//! GEEM markup writer.
//!
//! Turns a compiled [`RenderTree`] into an HTML page, and resource listings
//! into picker markup. The page carries the form body, the submission
//! button, and a `<pre>` block holding the extracted submission.
//!
//! # Entry Points
//!
//! ```no_run
//! use std::path::Path;
//! use geem_form::{compile_focus, FormSettings};
//! use geem_spec::SpecificationDocument;
//!
//! let doc = SpecificationDocument::from_path(Path::new("package.json"))?;
//! let tree = compile_focus(&doc, "GENEPIO:0001", &FormSettings::default(), 1);
//! geem_html::write_form(Path::new("public/form.html"), &tree, "Sample", "")?;
//! # Ok::<(), anyhow::Error>(())
//! ```

#![deny(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    missing_docs,
    clippy::missing_errors_doc
)]

pub mod fields;
pub mod listing;
pub mod renderer;
pub mod writer;

use std::path::Path;

use anyhow::Result;
use geem_form::{extract, fill_template, RenderTree};

pub use fields::{render_form, SUBMIT_BUTTON_ID, SUBMIT_BUTTON_LABEL};
pub use listing::render_listing;
pub use renderer::{escape_html, render_page};

/// Renders `tree` as a complete page.
pub fn render_form_page(tree: &RenderTree, title: &str, base_path: &str) -> String {
    let mut content = render_form(tree);
    content.push_str(&render_submission(tree));
    render_page(title, &content, base_path)
}

/// The extracted submission as an escaped, pretty-printed JSON block.
pub fn render_submission(tree: &RenderTree) -> String {
    let json = serde_json::to_string_pretty(&extract(tree)).unwrap_or_default();
    format!(
        "<pre id=\"formSubmission\" class=\"submission\">{}</pre>\n",
        escape_html(&json)
    )
}

/// Fills `@field.path` tokens in `template` from the tree's submission.
pub fn fill_from_submission(template: &str, tree: &RenderTree) -> String {
    fill_template(template, &extract(tree))
}

/// Renders `tree` and writes the page to `path`.
///
/// # Errors
///
/// Returns an error if the page cannot be written.
pub fn write_form(path: &Path, tree: &RenderTree, title: &str, base_path: &str) -> Result<()> {
    let page = render_form_page(tree, title, base_path);
    writer::write_html(path, &page)?;
    tracing::info!(path = %path.display(), focus = %tree.focus, "wrote form page");
    Ok(())
}
