pub mod render;
pub mod resolve;

use crate::glossary::Glossary;
use crate::matcher::{self, Matcher};
use crate::parser::html::{self, StartTag, TokenKind};
use crate::parser::{self, FileType};
use crate::{AnnotateResult, Annotation, Config, Match};
use anyhow::{Context, Result};
use regex::RegexSet;
use resolve::Budget;
use std::fs;
use std::path::{Path, PathBuf};
use unicode_segmentation::UnicodeSegmentation;

/// Elements that never hold rendered page text.
const NON_CONTENT: &[&str] = &["head", "template"];

/// Foreign content, where `/>` really does close an element.
const FOREIGN: &[&str] = &["svg", "math"];

/// Start tags that end an open `p`.
const CLOSES_P: &[&str] = &[
    "address", "article", "aside", "blockquote", "details", "dialog", "div", "dl", "fieldset",
    "figcaption", "figure", "footer", "form", "h1", "h2", "h3", "h4", "h5", "h6", "header",
    "hgroup", "hr", "main", "menu", "nav", "ol", "p", "pre", "section", "table", "ul",
];

/// Elements an open `p` cannot be closed across.
const P_SCOPE: &[&str] = &[
    "button", "caption", "html", "table", "td", "th", "template", "object", "marquee",
    "applet",
];

/// `(start tag, open elements it ends, elements that stop the search)`.
const IMPLIED_ENDS: &[(&str, &[&str], &[&str])] = &[
    ("li", &["li"], &["ul", "ol"]),
    ("dt", &["dt", "dd"], &["dl"]),
    ("dd", &["dt", "dd"], &["dl"]),
    ("option", &["option"], &["select", "datalist", "optgroup"]),
    ("tr", &["tr"], &["table", "thead", "tbody", "tfoot"]),
    ("td", &["td", "th"], &["tr", "table"]),
    ("th", &["td", "th"], &["tr", "table"]),
];

const CONTEXT_GRAPHEMES: usize = 20;

pub struct Annotator {
    matchers: Vec<Matcher>,
    prefilter: Option<RegexSet>,
    config: Config,
}

struct OpenElement {
    name: String,
    skip: bool,
}

impl Annotator {
    pub fn new(glossary: &Glossary, config: &Config) -> Self {
        let matchers = matcher::compile(glossary);
        let prefilter = matcher::prefilter(&matchers);
        tracing::debug!(matchers = matchers.len(), "annotator ready");

        Self {
            matchers,
            prefilter,
            config: config.clone(),
        }
    }

    pub fn matchers(&self) -> &[Matcher] {
        &self.matchers
    }

    pub fn budget(&self) -> Budget {
        Budget::new(self.config.max_per_term, self.config.max_total)
    }

    /// Every hit of every matcher in `text`, overlaps included.
    pub fn candidates(&self, text: &str) -> Vec<Match> {
        let active: Vec<usize> = match &self.prefilter {
            Some(set) => set.matches(text).into_iter().collect(),
            None => (0..self.matchers.len()).collect(),
        };

        let mut out = Vec::new();
        for index in active {
            let m = &self.matchers[index];
            for hit in m.regex.find_iter(text) {
                out.push(Match {
                    start: hit.start(),
                    end: hit.end(),
                    text: hit.as_str().to_string(),
                    definition: m.definition.clone(),
                    term: m.term,
                    matcher: index,
                });
            }
        }
        out
    }

    /// Non-overlapping matches in `text`, charged against `budget`.
    pub fn find_matches(&self, text: &str, budget: &mut Budget) -> Vec<Match> {
        if budget.is_exhausted() {
            return Vec::new();
        }
        resolve::resolve(self.candidates(text), budget)
    }

    fn skips(&self, tag: &StartTag) -> bool {
        self.config.is_skip_tag(&tag.name)
            || NON_CONTENT.contains(&tag.name.as_str())
            || tag.has_attribute(&self.config.skip_attribute)
            || tag.has_class(&self.config.term_class)
    }

    /// Annotate every eligible text node of an HTML document.
    pub fn annotate_html(&self, src: &str) -> AnnotateResult {
        let lines = LineIndex::new(src);
        let mut budget = self.budget();
        let mut stack: Vec<OpenElement> = Vec::new();
        let mut out = String::with_capacity(src.len() + src.len() / 8);
        let mut annotations = Vec::new();

        for token in html::tokenize(src) {
            let raw = token.slice(src);

            match &token.kind {
                TokenKind::StartTag(tag) => {
                    close_implied(&mut stack, &tag.name);

                    let foreign = FOREIGN.contains(&tag.name.as_str())
                        || stack.iter().any(|e| FOREIGN.contains(&e.name.as_str()));
                    if !tag.is_empty_element() && !(foreign && tag.self_closing) {
                        stack.push(OpenElement {
                            name: tag.name.clone(),
                            skip: self.skips(tag),
                        });
                    }
                }
                TokenKind::EndTag(name) => {
                    // Unmatched end tags are ignored; a match closes anything
                    // left open inside it.
                    if let Some(idx) = stack.iter().rposition(|e| &e.name == name) {
                        stack.truncate(idx);
                    }
                }
                TokenKind::Text
                    if !raw.trim().is_empty()
                        && !budget.is_exhausted()
                        && !stack.iter().any(|e| e.skip) =>
                {
                    let decoded = html::decode_entities(raw);
                    let matches = self.find_matches(&decoded.text, &mut budget);
                    if !matches.is_empty() {
                        for m in &matches {
                            let offset = token.start + decoded.source_offset(m.start);
                            let (line, column) = lines.position(offset);
                            annotations.push(Annotation {
                                text: m.text.clone(),
                                alias: self.matchers[m.matcher].alias.clone(),
                                definition: m.definition.clone(),
                                term: m.term,
                                line,
                                column,
                                context: context_snippet(&decoded.text, m.start, m.end),
                            });
                        }
                        out.push_str(&render::render_node(
                            raw,
                            &decoded,
                            &matches,
                            &self.config.term_class,
                        ));
                        continue;
                    }
                }
                _ => {}
            }

            out.push_str(raw);
        }

        AnnotateResult {
            annotation_count: annotations.len(),
            written: false,
            html: out,
            annotations,
        }
    }

    /// Annotate one file. With `write`, the result is stored next to the
    /// input (see [`output_path`]) when anything was annotated.
    pub fn annotate_file(&self, path: &Path, write: bool) -> Result<AnnotateResult> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read file: {}", path.display()))?;

        let file_type = FileType::from_path(path);
        let html = parser::to_html(path, &content);
        let mut result = self.annotate_html(&html);
        if file_type != FileType::Html {
            relocate(&mut result.annotations, &content);
        }

        if write && result.annotation_count > 0 {
            let target = output_path(path);
            fs::write(&target, &result.html)
                .with_context(|| format!("Failed to write file: {}", target.display()))?;
            result.written = true;
        }

        Ok(result)
    }
}

/// Close the elements that opening `name` ends implicitly, so an unclosed
/// `<p>` or `<li>` does not swallow the rest of the document.
fn close_implied(stack: &mut Vec<OpenElement>, name: &str) {
    let (ends, scope): (&[&str], &[&str]) = if CLOSES_P.contains(&name) {
        (&["p"], P_SCOPE)
    } else if let Some(&(_, ends, scope)) = IMPLIED_ENDS.iter().find(|(tag, _, _)| *tag == name) {
        (ends, scope)
    } else {
        return;
    };

    for idx in (0..stack.len()).rev() {
        let open = stack[idx].name.as_str();
        if ends.contains(&open) {
            stack.truncate(idx);
            return;
        }
        if scope.contains(&open) {
            return;
        }
    }
}

/// Point the annotations of a converted input back at its source text.
/// Each one is looked up after the previous one, so a position can land on
/// an earlier copy of the same text inside code the scanner skipped.
fn relocate(annotations: &mut [Annotation], source: &str) {
    let lines = LineIndex::new(source);
    let mut cursor = 0;

    for annotation in annotations {
        if let Some(i) = source[cursor..].find(annotation.text.as_str()) {
            let offset = cursor + i;
            (annotation.line, annotation.column) = lines.position(offset);
            cursor = offset + annotation.text.len();
        }
    }
}

/// HTML inputs are rewritten in place; other inputs get a sibling `.html`.
pub fn output_path(path: &Path) -> PathBuf {
    match FileType::from_path(path) {
        FileType::Html => path.to_path_buf(),
        _ => path.with_extension("html"),
    }
}

struct LineIndex<'a> {
    src: &'a str,
    starts: Vec<usize>,
}

impl<'a> LineIndex<'a> {
    fn new(src: &'a str) -> Self {
        let starts = std::iter::once(0)
            .chain(src.match_indices('\n').map(|(i, _)| i + 1))
            .collect();
        Self { src, starts }
    }

    /// 1-based line and column (in characters) of a byte offset.
    fn position(&self, offset: usize) -> (usize, usize) {
        let line = self.starts.partition_point(|&s| s <= offset);
        let line_start = self.starts[line - 1];
        let column = self.src[line_start..offset].chars().count() + 1;
        (line, column)
    }
}

fn context_snippet(text: &str, start: usize, end: usize) -> String {
    let begin = text[..start]
        .grapheme_indices(true)
        .rev()
        .nth(CONTEXT_GRAPHEMES - 1)
        .map(|(i, _)| i)
        .unwrap_or(0);
    let stop = text[end..]
        .grapheme_indices(true)
        .nth(CONTEXT_GRAPHEMES)
        .map(|(i, _)| end + i)
        .unwrap_or(text.len());

    let snippet = text[begin..stop].split_whitespace().collect::<Vec<_>>().join(" ");
    match (begin > 0, stop < text.len()) {
        (true, true) => format!("...{}...", snippet),
        (true, false) => format!("...{}", snippet),
        (false, true) => format!("{}...", snippet),
        (false, false) => snippet,
    }
}
