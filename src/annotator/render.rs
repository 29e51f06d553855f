use crate::parser::html::{escape_attr, Decoded};
use crate::tooltip::TIP_ATTR;
use crate::Match;

/// Rebuild one text node with its matches wrapped in annotation spans.
/// Text between matches (and the visible text of each match) is copied from
/// the raw source, so entities survive untouched.
pub fn render_node(raw: &str, decoded: &Decoded, matches: &[Match], class: &str) -> String {
    let mut out = String::with_capacity(raw.len() + matches.len() * 64);
    let mut cursor = 0;

    for m in matches {
        let start = decoded.source_offset(m.start);
        let end = decoded.source_offset(m.end);
        out.push_str(&raw[cursor..start]);
        out.push_str(&span(class, &m.definition, &raw[start..end]));
        cursor = end;
    }

    out.push_str(&raw[cursor..]);
    out
}

/// `inner_html` must already be valid markup.
pub fn span(class: &str, definition: &str, inner_html: &str) -> String {
    format!(
        r#"<span class="{}" {}="{}">{}</span>"#,
        escape_attr(class),
        TIP_ATTR,
        escape_attr(definition),
        inner_html
    )
}
