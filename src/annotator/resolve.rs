use crate::Match;
use std::collections::HashMap;

/// Annotation allowance for one document.
#[derive(Debug, Clone)]
pub struct Budget {
    max_per_term: usize,
    max_total: usize,
    per_term: HashMap<usize, usize>,
    total: usize,
}

impl Budget {
    pub fn new(max_per_term: usize, max_total: usize) -> Self {
        Self {
            max_per_term,
            max_total,
            per_term: HashMap::new(),
            total: 0,
        }
    }

    pub fn is_exhausted(&self) -> bool {
        self.total >= self.max_total
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn used_by(&self, term: usize) -> usize {
        self.per_term.get(&term).copied().unwrap_or(0)
    }

    /// Charge one annotation to `term`. Returns false when either cap is hit.
    pub fn try_take(&mut self, term: usize) -> bool {
        if self.is_exhausted() || self.used_by(term) >= self.max_per_term {
            return false;
        }
        *self.per_term.entry(term).or_insert(0) += 1;
        self.total += 1;
        true
    }
}

/// Pick non-overlapping matches: earliest start wins, then the longest span,
/// then the matcher compiled first. Candidates refused by the budget do not
/// shadow the ones they overlap.
pub fn resolve(mut candidates: Vec<Match>, budget: &mut Budget) -> Vec<Match> {
    candidates.sort_by(|a, b| {
        a.start
            .cmp(&b.start)
            .then_with(|| b.len().cmp(&a.len()))
            .then_with(|| a.matcher.cmp(&b.matcher))
    });

    let mut kept: Vec<Match> = Vec::new();
    let mut frontier = 0;

    for candidate in candidates {
        if budget.is_exhausted() {
            break;
        }
        if !kept.is_empty() && candidate.start < frontier {
            continue;
        }
        if !budget.try_take(candidate.term) {
            continue;
        }
        frontier = candidate.end;
        kept.push(candidate);
    }

    kept
}
