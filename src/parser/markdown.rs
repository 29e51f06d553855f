use pulldown_cmark::{html, Options, Parser};

/// Render markdown to an HTML fragment. Code blocks come out as
/// `<pre><code>` and inline code as `<code>`, both of which the scanner skips.
pub fn to_html(content: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);

    let parser = Parser::new_ext(content, options);
    let mut out = String::with_capacity(content.len() * 3 / 2);
    html::push_html(&mut out, parser);
    out
}
