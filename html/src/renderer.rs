//! Page shell and escaping shared by every generated page.

/// Renders a page inside the standard shell.
///
/// `content_html` is inserted as-is; `title` is escaped.
pub fn render_page(title: &str, content_html: &str, base_path: &str) -> String {
    let css_url = format!("{}/css/geem.css", base_path);
    let js_url = format!("{}/js/geem_form.js", base_path);
    format!(
        r##"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1.0">
<title>{title} | GEEM</title>
<link rel="stylesheet" href="{css_url}">
</head>
<body>
<a href="#main-content" class="skip-link">Skip to main content</a>
<main id="main-content">
{content_html}
</main>
<script src="{js_url}" defer></script>
</body>
</html>"##,
        title = escape_html(title),
        css_url = escape_html(&css_url),
        content_html = content_html,
        js_url = escape_html(&js_url),
    )
}

/// Escapes HTML special characters in a string.
pub fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// `name="value"` with the value escaped, preceded by a space.
pub(crate) fn attr(name: &str, value: &str) -> String {
    format!(" {}=\"{}\"", name, escape_html(value))
}

/// [`attr`] for optional values; empty when `value` is `None`.
pub(crate) fn opt_attr<T: ToString>(name: &str, value: Option<T>) -> String {
    value.map_or_else(String::new, |v| attr(name, &v.to_string()))
}
