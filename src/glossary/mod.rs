pub mod loader;
pub mod manager;

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashSet;

pub use loader::{load, load_or_none, GlossaryError, Source};

/// A glossary entry as served by the glossary endpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Term {
    #[serde(default, deserialize_with = "nullable_aliases")]
    pub aliases: Vec<String>,

    #[serde(default, rename = "defn", deserialize_with = "nullable_string")]
    pub definition: String,

    #[serde(default, rename = "cs")]
    pub case_sensitive: bool,

    #[serde(default, rename = "ww")]
    pub whole_word: bool,
}

impl Term {
    pub fn new(aliases: &[&str], definition: &str) -> Self {
        Self {
            aliases: aliases.iter().map(|a| a.to_string()).collect(),
            definition: definition.to_string(),
            ..Default::default()
        }
    }

    pub fn case_sensitive(mut self, yes: bool) -> Self {
        self.case_sensitive = yes;
        self
    }

    pub fn whole_word(mut self, yes: bool) -> Self {
        self.whole_word = yes;
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Glossary {
    #[serde(default, deserialize_with = "nullable_terms")]
    pub terms: Vec<Term>,
}

impl Glossary {
    pub fn new(terms: Vec<Term>) -> Self {
        Self { terms }
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    /// Build the endpoint payload from editable entries: inactive entries are
    /// dropped, the rest ordered by priority (highest first) then by term.
    pub fn from_entries(entries: &[GlossaryEntry]) -> Self {
        let mut active: Vec<&GlossaryEntry> = entries.iter().filter(|e| e.active).collect();
        active.sort_by(|a, b| b.priority.cmp(&a.priority).then_with(|| a.term.cmp(&b.term)));

        let terms = active
            .into_iter()
            .map(|e| Term {
                aliases: e.terms_list(),
                definition: e.definition.clone(),
                case_sensitive: e.case_sensitive,
                whole_word: e.whole_word,
            })
            .collect();

        Self { terms }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

/// The editable form of a glossary term: a base term plus comma-separated
/// aliases.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GlossaryEntry {
    pub term: String,
    pub definition: String,

    #[serde(default)]
    pub aliases: String,

    #[serde(default)]
    pub case_sensitive: bool,

    #[serde(default = "default_true")]
    pub whole_word: bool,

    #[serde(default = "default_true")]
    pub active: bool,

    #[serde(default)]
    pub priority: u16,
}

fn default_true() -> bool {
    true
}

impl GlossaryEntry {
    pub fn new(term: &str, definition: &str) -> Self {
        Self {
            term: term.to_string(),
            definition: definition.to_string(),
            aliases: String::new(),
            case_sensitive: false,
            whole_word: true,
            active: true,
            priority: 0,
        }
    }

    /// Base term followed by its aliases, trimmed, empty ones dropped,
    /// first occurrence kept.
    pub fn terms_list(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        std::iter::once(self.term.as_str())
            .chain(self.aliases.split(','))
            .map(str::trim)
            .filter(|w| !w.is_empty() && seen.insert(w.to_string()))
            .map(str::to_string)
            .collect()
    }
}

fn nullable_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

fn nullable_aliases<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Vec<Option<String>>>::deserialize(deserializer)?;
    Ok(raw.unwrap_or_default().into_iter().flatten().collect())
}

fn nullable_terms<'de, D>(deserializer: D) -> Result<Vec<Term>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<Term>>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_wire_format() {
        let json = r#"{"terms":[{"aliases":["On-hit","onhit"],"defn":"Triggers on hit.","cs":false,"ww":true}]}"#;
        let glossary: Glossary = serde_json::from_str(json).unwrap();

        assert_eq!(glossary.len(), 1);
        let term = &glossary.terms[0];
        assert_eq!(term.aliases, vec!["On-hit", "onhit"]);
        assert_eq!(term.definition, "Triggers on hit.");
        assert!(!term.case_sensitive);
        assert!(term.whole_word);
    }

    #[test]
    fn test_missing_and_null_fields() {
        let json = r#"{"terms":[{"aliases":["x", null]},{"defn":null,"aliases":null}]}"#;
        let glossary: Glossary = serde_json::from_str(json).unwrap();

        assert_eq!(glossary.terms[0].aliases, vec!["x"]);
        assert_eq!(glossary.terms[0].definition, "");
        assert!(glossary.terms[1].aliases.is_empty());

        let empty: Glossary = serde_json::from_str("{}").unwrap();
        assert!(empty.is_empty());
    }

    #[test]
    fn test_terms_list_dedup() {
        let mut entry = GlossaryEntry::new(" On hit ", "x");
        entry.aliases = "onhit, On hit,, on-hit ,onhit".to_string();

        assert_eq!(entry.terms_list(), vec!["On hit", "onhit", "on-hit"]);
    }

    #[test]
    fn test_from_entries_orders_and_filters() {
        let mut low = GlossaryEntry::new("Armor", "Protection.");
        low.priority = 1;
        let mut high = GlossaryEntry::new("Bleed", "Damage over time.");
        high.priority = 5;
        let mut inactive = GlossaryEntry::new("Crit", "Critical hit.");
        inactive.active = false;
        let tie = GlossaryEntry::new("Aura", "Area effect.");
        let tie_b = GlossaryEntry::new("Zeal", "Fervor.");

        let glossary = Glossary::from_entries(&[tie_b, low, inactive, high, tie]);
        let firsts: Vec<_> = glossary.terms.iter().map(|t| t.aliases[0].as_str()).collect();

        assert_eq!(firsts, vec!["Bleed", "Armor", "Aura", "Zeal"]);
        assert!(glossary.terms.iter().all(|t| t.whole_word));
    }

    #[test]
    fn test_to_json_uses_wire_names() {
        let glossary = Glossary::new(vec![Term::new(&["hit"], "A").whole_word(true)]);
        let json = glossary.to_json().unwrap();

        assert!(json.contains(r#""defn":"A""#));
        assert!(json.contains(r#""ww":true"#));
        assert!(json.contains(r#""cs":false"#));
    }
}
