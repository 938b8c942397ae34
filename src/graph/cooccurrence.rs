//! Document-level co-occurrence counting
//!
//! Each document contributes at most one count to every unordered pair of
//! distinct tokens it contains. Tokens are deduplicated and sorted before
//! pairing, so repeated mentions never inflate a pair and pair orientation is
//! fixed lexicographically.

use rayon::prelude::*;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

/// An unordered pair of distinct tokens, stored with `first < second`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TokenPair {
    first: String,
    second: String,
}

impl TokenPair {
    /// Build the canonical pair, or `None` for identical tokens
    pub fn new(a: impl Into<String>, b: impl Into<String>) -> Option<Self> {
        let (a, b) = (a.into(), b.into());
        match a.cmp(&b) {
            std::cmp::Ordering::Less => Some(Self {
                first: a,
                second: b,
            }),
            std::cmp::Ordering::Greater => Some(Self {
                first: b,
                second: a,
            }),
            std::cmp::Ordering::Equal => None,
        }
    }

    pub fn first(&self) -> &str {
        &self.first
    }

    pub fn second(&self) -> &str {
        &self.second
    }

    pub fn contains(&self, token: &str) -> bool {
        self.first == token || self.second == token
    }
}

/// A pair with its document count
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeightedPair {
    pub source: String,
    pub target: String,
    pub weight: u32,
}

/// Unordered token pair -> number of documents containing both tokens
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CooccurrenceTable {
    counts: FxHashMap<TokenPair, u32>,
}

/// Sorted, deduplicated tokens of one document
fn unique_sorted<S: AsRef<str>>(tokens: &[S]) -> Vec<&str> {
    let mut unique: Vec<&str> = tokens.iter().map(|t| t.as_ref()).collect();
    unique.sort_unstable();
    unique.dedup();
    unique
}

impl CooccurrenceTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count pairs across a collection of token lists
    pub fn extract_pairs<S: AsRef<str>>(token_lists: &[Vec<S>]) -> Self {
        let mut table = Self::new();
        for tokens in token_lists {
            table.add_document(tokens);
        }
        table
    }

    /// Count pairs with one partial table per rayon split, merged at the end
    ///
    /// Produces the same table as [`Self::extract_pairs`].
    pub fn extract_pairs_parallel<S: AsRef<str> + Sync>(token_lists: &[Vec<S>]) -> Self {
        token_lists
            .par_iter()
            .fold(Self::new, |mut table, tokens| {
                table.add_document(tokens);
                table
            })
            .reduce(Self::new, |mut a, b| {
                a.merge(b);
                a
            })
    }

    /// Add one document: +1 to every pair of its distinct tokens
    ///
    /// Documents with fewer than two distinct tokens contribute nothing.
    pub fn add_document<S: AsRef<str>>(&mut self, tokens: &[S]) {
        let unique = unique_sorted(tokens);
        for (i, &a) in unique.iter().enumerate() {
            for &b in &unique[i + 1..] {
                let pair = TokenPair {
                    first: a.to_string(),
                    second: b.to_string(),
                };
                *self.counts.entry(pair).or_insert(0) += 1;
            }
        }
    }

    /// Additive union with another table
    pub fn merge(&mut self, other: CooccurrenceTable) {
        for (pair, count) in other.counts {
            *self.counts.entry(pair).or_insert(0) += count;
        }
    }

    /// Insert or overwrite a pair count; identical tokens are ignored
    pub fn insert(&mut self, a: &str, b: &str, count: u32) {
        if let Some(pair) = TokenPair::new(a, b) {
            self.counts.insert(pair, count);
        }
    }

    /// Count for a pair in either orientation (0 when absent)
    pub fn get(&self, a: &str, b: &str) -> u32 {
        TokenPair::new(a, b)
            .and_then(|pair| self.counts.get(&pair).copied())
            .unwrap_or(0)
    }

    /// Number of distinct pairs
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&TokenPair, u32)> {
        self.counts.iter().map(|(p, &c)| (p, c))
    }

    /// Pairs sorted by weight descending, then lexicographically
    pub fn sorted_edges(&self) -> Vec<WeightedPair> {
        let mut pairs: Vec<(&TokenPair, u32)> = self.iter().collect();
        pairs.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        pairs
            .into_iter()
            .map(|(pair, weight)| WeightedPair {
                source: pair.first.clone(),
                target: pair.second.clone(),
                weight,
            })
            .collect()
    }
}

impl FromIterator<WeightedPair> for CooccurrenceTable {
    fn from_iter<I: IntoIterator<Item = WeightedPair>>(iter: I) -> Self {
        let mut table = Self::new();
        for pair in iter {
            table.insert(&pair.source, &pair.target, pair.weight);
        }
        table
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pair_is_unordered() {
        assert_eq!(TokenPair::new("b", "a"), TokenPair::new("a", "b"));
        assert_eq!(TokenPair::new("a", "a"), None);

        let pair = TokenPair::new("서울", "날씨").unwrap();
        assert_eq!(pair.first(), "날씨");
        assert_eq!(pair.second(), "서울");
    }

    #[test]
    fn test_scenario_counts_once_per_document() {
        let lists = vec![
            vec!["서울", "맛집", "추천", "서울", "여행"],
            vec!["서울", "날씨", "오늘"],
        ];
        let table = CooccurrenceTable::extract_pairs(&lists);

        assert_eq!(table.get("날씨", "서울"), 1);
        assert_eq!(table.get("맛집", "서울"), 1);
        assert_eq!(table.get("서울", "맛집"), 1);
        assert_eq!(table.get("맛집", "추천"), 1);
        // C(4,2) + C(3,2)
        assert_eq!(table.len(), 6 + 3);
    }

    #[test]
    fn test_single_token_document_contributes_nothing() {
        let table = CooccurrenceTable::extract_pairs(&[vec!["x"], vec!["x", "x", "x"]]);
        assert!(table.is_empty());
    }

    #[test]
    fn test_count_bounded_by_shared_documents() {
        let lists = vec![
            vec!["a", "b", "a", "b", "a"],
            vec!["a", "b"],
            vec!["a", "c"],
        ];
        let table = CooccurrenceTable::extract_pairs(&lists);

        assert_eq!(table.get("a", "b"), 2);
        assert_eq!(table.get("a", "c"), 1);
        assert_eq!(table.get("b", "c"), 0);
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let lists: Vec<Vec<String>> = (0..200)
            .map(|i| {
                (0..(i % 7))
                    .map(|j| format!("t{}", (i + j * 3) % 11))
                    .collect()
            })
            .collect();

        let seq = CooccurrenceTable::extract_pairs(&lists);
        let par = CooccurrenceTable::extract_pairs_parallel(&lists);
        assert_eq!(seq, par);
    }

    #[test]
    fn test_merge_is_order_independent() {
        let a = CooccurrenceTable::extract_pairs(&[vec!["x", "y", "z"]]);
        let b = CooccurrenceTable::extract_pairs(&[vec!["y", "z"]]);

        let mut ab = a.clone();
        ab.merge(b.clone());
        let mut ba = b;
        ba.merge(a);

        assert_eq!(ab, ba);
        assert_eq!(ab.get("y", "z"), 2);
    }

    #[test]
    fn test_sorted_edges() {
        let lists = vec![vec!["b", "c"], vec!["a", "b"], vec!["c", "b"]];
        let edges = CooccurrenceTable::extract_pairs(&lists).sorted_edges();

        assert_eq!(
            edges,
            vec![
                WeightedPair {
                    source: "b".into(),
                    target: "c".into(),
                    weight: 2
                },
                WeightedPair {
                    source: "a".into(),
                    target: "b".into(),
                    weight: 1
                },
            ]
        );

        let rebuilt: CooccurrenceTable = edges.into_iter().collect();
        assert_eq!(rebuilt.get("c", "b"), 2);
    }
}
