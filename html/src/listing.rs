//! Resource picker markup.

use std::fmt::Write as _;

use geem_spec::{ResourceFilter, ResourceSummary};

use crate::renderer::{attr, escape_html};

/// Renders the summaries that pass `filter` as a picker list, titled
/// `name (version)` and sorted by title.
pub fn render_listing(summaries: &[ResourceSummary], filter: &ResourceFilter) -> String {
    let mut shown: Vec<&ResourceSummary> = summaries.iter().filter(|s| filter.accepts(s)).collect();
    shown.sort_by_key(|s| s.title());

    if shown.is_empty() {
        return "<p class=\"small\"><i>No packages match.</i></p>\n".to_string();
    }
    let mut out = String::from("<ul class=\"resource-list\">\n");
    for summary in shown {
        let _ = writeln!(
            out,
            "<li{}{}><a{}>{}</a></li>",
            attr("data-resource-id", &summary.id),
            attr("data-curation", &summary.curation),
            attr("href", &format!("#resource/{}", summary.id)),
            escape_html(&summary.title()),
        );
    }
    out.push_str("</ul>\n");
    out
}
