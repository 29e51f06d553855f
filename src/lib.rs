pub mod annotator;
pub mod cli;
pub mod config;
pub mod glossary;
pub mod matcher;
pub mod parser;
pub mod tooltip;

pub use annotator::Annotator;
pub use config::Config;
pub use glossary::{Glossary, Term};

#[derive(Debug, Clone, Default)]
pub struct AnnotateResult {
    pub annotation_count: usize,
    pub written: bool,
    pub html: String,
    pub annotations: Vec<Annotation>,
}

/// One annotated occurrence, located in the source document.
#[derive(Debug, Clone)]
pub struct Annotation {
    pub text: String,
    pub alias: String,
    pub definition: String,
    pub term: usize,
    pub line: usize,
    pub column: usize,
    pub context: String,
}

/// A hit inside a single text node. Offsets are byte offsets into the
/// decoded node text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Match {
    pub start: usize,
    pub end: usize,
    pub text: String,
    pub definition: String,
    pub term: usize,
    pub matcher: usize,
}

impl Match {
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    pub fn overlaps(&self, other: &Match) -> bool {
        self.start < other.end && other.start < self.end
    }
}
