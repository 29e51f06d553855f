use crate::parser::html::escape_text;

/// Escape plain text into an HTML fragment, one `<p>` per paragraph.
pub fn to_html(content: &str) -> String {
    content
        .replace("\r\n", "\n")
        .split("\n\n")
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(|p| format!("<p>{}</p>\n", escape_text(p)))
        .collect()
}
