pub mod html;
pub mod markdown;
pub mod plaintext;

use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileType {
    Html,
    Markdown,
    PlainText,
}

impl FileType {
    /// Detect file type from extension
    pub fn from_path(path: &Path) -> Self {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();

        match ext.as_str() {
            "html" | "htm" | "xhtml" => FileType::Html,
            "md" | "mdx" | "markdown" => FileType::Markdown,
            _ => FileType::PlainText,
        }
    }

    /// Whether a directory walk should pick this file up.
    pub fn is_scannable(path: &Path) -> bool {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();
        matches!(
            ext.as_str(),
            "html" | "htm" | "xhtml" | "md" | "mdx" | "markdown" | "txt"
        )
    }
}

/// Turn a file's content into the HTML the scanner works on.
pub fn to_html(path: &Path, content: &str) -> String {
    match FileType::from_path(path) {
        FileType::Html => content.to_string(),
        FileType::Markdown => markdown::to_html(content),
        FileType::PlainText => plaintext::to_html(content),
    }
}
