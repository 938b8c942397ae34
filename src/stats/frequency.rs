//! Token frequency aggregation
//!
//! Counts exact-match token occurrences across a collection. Entries keep the
//! order in which tokens were first seen, which is also the tie-break order
//! for [`FrequencyTable::top_n`].

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

/// A token with its occurrence count
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenCount {
    pub token: String,
    pub count: u64,
}

/// Insertion-ordered token -> count table
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<TokenCount>", into = "Vec<TokenCount>")]
pub struct FrequencyTable {
    index: FxHashMap<String, usize>,
    entries: Vec<TokenCount>,
}

impl FrequencyTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count every token of every list
    pub fn aggregate<S: AsRef<str>>(token_lists: &[Vec<S>]) -> Self {
        let mut table = Self::new();
        for list in token_lists {
            table.add_tokens(list);
        }
        table
    }

    /// Add one occurrence of each token
    pub fn add_tokens<S: AsRef<str>>(&mut self, tokens: &[S]) {
        for token in tokens {
            self.add(token.as_ref(), 1);
        }
    }

    /// Add `count` occurrences of `token`
    pub fn add(&mut self, token: &str, count: u64) {
        if let Some(&i) = self.index.get(token) {
            self.entries[i].count += count;
            return;
        }

        self.index.insert(token.to_string(), self.entries.len());
        self.entries.push(TokenCount {
            token: token.to_string(),
            count,
        });
    }

    /// Fold another table into this one
    ///
    /// Tokens new to `self` are appended in `other`'s discovery order.
    pub fn merge(&mut self, other: &FrequencyTable) {
        for entry in &other.entries {
            self.add(&entry.token, entry.count);
        }
    }

    /// Count for a token (0 when absent)
    pub fn count(&self, token: &str) -> u64 {
        self.index
            .get(token)
            .map(|&i| self.entries[i].count)
            .unwrap_or(0)
    }

    /// Number of distinct tokens
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sum of all counts
    pub fn total(&self) -> u64 {
        self.entries.iter().map(|e| e.count).sum()
    }

    /// Entries in discovery order
    pub fn iter(&self) -> impl Iterator<Item = &TokenCount> {
        self.entries.iter()
    }

    /// The `n` most frequent tokens, count descending
    ///
    /// Ties keep discovery order (stable sort).
    pub fn top_n(&self, n: usize) -> Vec<TokenCount> {
        let mut sorted = self.entries.clone();
        sorted.sort_by(|a, b| b.count.cmp(&a.count));
        sorted.truncate(n);
        sorted
    }
}

impl From<Vec<TokenCount>> for FrequencyTable {
    fn from(entries: Vec<TokenCount>) -> Self {
        let mut table = Self::new();
        for entry in entries {
            table.add(&entry.token, entry.count);
        }
        table
    }
}

impl From<FrequencyTable> for Vec<TokenCount> {
    fn from(table: FrequencyTable) -> Self {
        table.entries
    }
}
