//! A small, forgiving HTML tokenizer.
//!
//! Every token records the byte range it was read from, so a document can be
//! rebuilt exactly by concatenating token slices. Only text tokens are ever
//! rewritten by the annotator.

use lazy_static::lazy_static;
use std::collections::HashMap;

pub const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param",
    "source", "track", "wbr",
];

/// Elements whose content is not markup; it is emitted as a single raw token.
const RAW_TEXT_ELEMENTS: &[&str] = &[
    "script", "style", "textarea", "title", "xmp", "noscript", "iframe", "noembed", "noframes",
];

lazy_static! {
    static ref NAMED_ENTITIES: HashMap<&'static str, char> = [
        ("amp", '&'),
        ("lt", '<'),
        ("gt", '>'),
        ("quot", '"'),
        ("apos", '\''),
        ("nbsp", '\u{a0}'),
        ("shy", '\u{ad}'),
        ("ndash", '\u{2013}'),
        ("mdash", '\u{2014}'),
        ("lsquo", '\u{2018}'),
        ("rsquo", '\u{2019}'),
        ("ldquo", '\u{201c}'),
        ("rdquo", '\u{201d}'),
        ("hellip", '\u{2026}'),
        ("middot", '\u{b7}'),
        ("times", '\u{d7}'),
        ("copy", '\u{a9}'),
        ("reg", '\u{ae}'),
        ("trade", '\u{2122}'),
    ]
    .into_iter()
    .collect();
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub name: String,
    pub value: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartTag {
    pub name: String,
    pub attributes: Vec<Attribute>,
    pub self_closing: bool,
}

impl StartTag {
    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        self.attributes.iter().find(|a| a.name == name)
    }

    pub fn has_attribute(&self, name: &str) -> bool {
        self.attribute(name).is_some()
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.attribute("class")
            .and_then(|a| a.value.as_deref())
            .map(|v| v.split_ascii_whitespace().any(|c| c == class))
            .unwrap_or(false)
    }

    /// Void elements never hold text. A trailing `/>` on any other HTML
    /// element is ignored, as browsers do; the element stays open.
    pub fn is_empty_element(&self) -> bool {
        VOID_ELEMENTS.contains(&self.name.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenKind {
    Text,
    /// Content of script, style and the other raw text elements.
    RawText,
    StartTag(StartTag),
    EndTag(String),
    /// Comments, doctypes, processing instructions.
    Markup,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub start: usize,
    pub end: usize,
}

impl Token {
    pub fn slice<'a>(&self, src: &'a str) -> &'a str {
        &src[self.start..self.end]
    }
}

pub fn tokenize(src: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut pos = 0;
    let mut text_start = 0;

    while let Some(offset) = src[pos..].find('<') {
        let lt = pos + offset;
        let Some((kind, end)) = read_markup(src, lt) else {
            // A stray '<' is just text.
            pos = lt + 1;
            continue;
        };

        push_text(&mut tokens, text_start, lt);

        let raw_element = match &kind {
            TokenKind::StartTag(tag) if RAW_TEXT_ELEMENTS.contains(&tag.name.as_str()) => {
                Some(tag.name.clone())
            }
            _ => None,
        };

        tokens.push(Token {
            kind,
            start: lt,
            end,
        });
        pos = end;

        if let Some(name) = raw_element {
            let close = find_close_tag(src, end, &name).unwrap_or(src.len());
            if close > end {
                tokens.push(Token {
                    kind: TokenKind::RawText,
                    start: end,
                    end: close,
                });
            }
            pos = close;
        }

        text_start = pos;
    }

    push_text(&mut tokens, text_start, src.len());
    tokens
}

fn push_text(tokens: &mut Vec<Token>, start: usize, end: usize) {
    if end > start {
        tokens.push(Token {
            kind: TokenKind::Text,
            start,
            end,
        });
    }
}

fn read_markup(src: &str, pos: usize) -> Option<(TokenKind, usize)> {
    let rest = &src[pos..];
    let bytes = rest.as_bytes();

    if rest.starts_with("<!--") {
        let end = rest[4..]
            .find("-->")
            .map(|i| pos + 4 + i + 3)
            .unwrap_or(src.len());
        return Some((TokenKind::Markup, end));
    }

    match bytes.get(1) {
        Some(b'!') | Some(b'?') => {
            let end = rest.find('>').map(|i| pos + i + 1).unwrap_or(src.len());
            Some((TokenKind::Markup, end))
        }
        Some(b'/') if bytes.get(2).is_some_and(|c| c.is_ascii_alphabetic()) => {
            let name_end = tag_name_end(rest, 2);
            let name = rest[2..name_end].to_ascii_lowercase();
            let end = rest[name_end..]
                .find('>')
                .map(|i| pos + name_end + i + 1)
                .unwrap_or(src.len());
            Some((TokenKind::EndTag(name), end))
        }
        Some(c) if c.is_ascii_alphabetic() => read_start_tag(rest).map(|(tag, len)| {
            (TokenKind::StartTag(tag), pos + len)
        }),
        _ => None,
    }
}

fn tag_name_end(s: &str, from: usize) -> usize {
    s.as_bytes()[from..]
        .iter()
        .position(|&b| b.is_ascii_whitespace() || b == b'/' || b == b'>')
        .map(|i| from + i)
        .unwrap_or(s.len())
}

/// Parse `<name attr=... >` at the start of `rest`. Returns the tag and its
/// length in bytes, or `None` when the tag is never closed.
fn read_start_tag(rest: &str) -> Option<(StartTag, usize)> {
    let b = rest.as_bytes();
    let name_end = tag_name_end(rest, 1);
    let name = rest[1..name_end].to_ascii_lowercase();

    let mut i = name_end;
    let mut attributes = Vec::new();
    let mut self_closing = false;

    loop {
        while i < b.len() && b[i].is_ascii_whitespace() {
            i += 1;
        }
        match *b.get(i)? {
            b'>' => {
                i += 1;
                break;
            }
            b'/' => {
                if b.get(i + 1) == Some(&b'>') {
                    self_closing = true;
                    i += 2;
                    break;
                }
                i += 1;
                continue;
            }
            _ => {}
        }

        let start = i;
        while i < b.len() && !b[i].is_ascii_whitespace() && !matches!(b[i], b'=' | b'>' | b'/') {
            i += 1;
        }
        if i == start {
            // leading '='
            i += 1;
        }
        let attr_name = rest[start..i].to_ascii_lowercase();

        let mut j = i;
        while j < b.len() && b[j].is_ascii_whitespace() {
            j += 1;
        }

        let mut value = None;
        if b.get(j) == Some(&b'=') {
            j += 1;
            while j < b.len() && b[j].is_ascii_whitespace() {
                j += 1;
            }
            match b.get(j) {
                Some(&q) if q == b'"' || q == b'\'' => {
                    let close = rest[j + 1..].find(q as char)?;
                    value = Some(decode_entities(&rest[j + 1..j + 1 + close]).text);
                    j += close + 2;
                }
                _ => {
                    let vs = j;
                    while j < b.len() && !b[j].is_ascii_whitespace() && b[j] != b'>' {
                        j += 1;
                    }
                    value = Some(decode_entities(&rest[vs..j]).text);
                }
            }
            i = j;
        }

        attributes.push(Attribute {
            name: attr_name,
            value,
        });
    }

    Some((
        StartTag {
            name,
            attributes,
            self_closing,
        },
        i,
    ))
}

/// Offset of the `</name` that ends a raw text element, compared without
/// regard to case.
fn find_close_tag(src: &str, from: usize, name: &str) -> Option<usize> {
    let bytes = src.as_bytes();
    let mut offset = from;

    while let Some(i) = src[offset..].find("</") {
        let at = offset + i;
        let name_end = at + 2 + name.len();
        let same_name = bytes
            .get(at + 2..name_end)
            .is_some_and(|n| n.eq_ignore_ascii_case(name.as_bytes()));

        if same_name {
            match bytes.get(name_end) {
                None | Some(b'>') | Some(b'/') => return Some(at),
                Some(c) if c.is_ascii_whitespace() => return Some(at),
                _ => {}
            }
        }
        offset = at + 2;
    }

    None
}

/// Entity-decoded text with a map back to the raw source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decoded {
    pub text: String,
    offsets: Vec<usize>,
}

impl Decoded {
    /// Raw byte offset for decoded byte `i`; `i == text.len()` maps to the
    /// raw length.
    pub fn source_offset(&self, i: usize) -> usize {
        self.offsets[i]
    }
}

pub fn decode_entities(raw: &str) -> Decoded {
    let mut text = String::with_capacity(raw.len());
    let mut offsets = Vec::with_capacity(raw.len() + 1);
    let mut i = 0;

    while i < raw.len() {
        if raw.as_bytes()[i] == b'&' {
            if let Some((ch, len)) = parse_entity(&raw[i..]) {
                let before = text.len();
                text.push(ch);
                offsets.extend(std::iter::repeat(i).take(text.len() - before));
                i += len;
                continue;
            }
        }

        let Some(ch) = raw[i..].chars().next() else {
            break;
        };
        text.push(ch);
        offsets.extend((0..ch.len_utf8()).map(|k| i + k));
        i += ch.len_utf8();
    }

    offsets.push(raw.len());
    Decoded { text, offsets }
}

/// `s` starts with '&'. Returns the character and the entity's length.
fn parse_entity(s: &str) -> Option<(char, usize)> {
    let semi = s.as_bytes().iter().take(33).position(|&b| b == b';')?;
    if semi < 2 {
        return None;
    }
    let body = &s[1..semi];

    let ch = if let Some(num) = body.strip_prefix('#') {
        let code = match num.strip_prefix(['x', 'X']) {
            Some(hex) => u32::from_str_radix(hex, 16).ok()?,
            None => num.parse::<u32>().ok()?,
        };
        if code == 0 {
            return None;
        }
        char::from_u32(code)?
    } else {
        *NAMED_ENTITIES.get(body)?
    };

    Some((ch, semi + 1))
}

pub fn escape_text(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    out
}

pub fn escape_attr(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
