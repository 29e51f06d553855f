use crate::glossary::Glossary;
use regex::{Regex, RegexSet};
use tracing::warn;

/// A compiled recognizer for one alias, bound to its term's definition.
#[derive(Debug, Clone)]
pub struct Matcher {
    pub regex: Regex,
    pub alias: String,
    pub definition: String,
    pub term: usize,
}

impl Matcher {
    pub fn new(
        alias: &str,
        definition: &str,
        term: usize,
        case_sensitive: bool,
        whole_word: bool,
    ) -> Result<Self, regex::Error> {
        let mut pattern = String::new();
        if !case_sensitive {
            pattern.push_str("(?i)");
        }
        if whole_word {
            pattern.push_str(&format!(r"\b{}\b", regex::escape(alias)));
        } else {
            pattern.push_str(&regex::escape(alias));
        }

        let regex = Regex::new(&pattern)?;

        Ok(Self {
            regex,
            alias: alias.to_string(),
            definition: definition.to_string(),
            term,
        })
    }

    fn alias_len(&self) -> usize {
        self.alias.chars().count()
    }
}

/// Compile one matcher per non-empty alias, longest alias first. Ties keep
/// glossary order.
pub fn compile(glossary: &Glossary) -> Vec<Matcher> {
    let mut matchers = Vec::new();

    for (index, term) in glossary.terms.iter().enumerate() {
        for alias in term.aliases.iter().filter(|a| !a.is_empty()) {
            match Matcher::new(
                alias,
                &term.definition,
                index,
                term.case_sensitive,
                term.whole_word,
            ) {
                Ok(matcher) => matchers.push(matcher),
                Err(e) => warn!(alias = %alias, error = %e, "skipping alias that failed to compile"),
            }
        }
    }

    matchers.sort_by_key(|m| std::cmp::Reverse(m.alias_len()));
    matchers
}

/// Prefilter telling which matchers can hit a given text at all. `None` when
/// the combined automaton would be too large to build.
pub fn prefilter(matchers: &[Matcher]) -> Option<RegexSet> {
    match RegexSet::new(matchers.iter().map(|m| m.regex.as_str())) {
        Ok(set) => Some(set),
        Err(e) => {
            warn!(error = %e, "matcher prefilter disabled");
            None
        }
    }
}
