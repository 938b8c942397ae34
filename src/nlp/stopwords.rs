//! Stopword filtering
//!
//! A [`StopwordSet`] is the union of a fixed base list and a user-supplied
//! list. Lookups are exact matches: tokens are never case-folded or otherwise
//! normalized here, the tokenizer has already done that.

use rustc_hash::FxHashSet;
use stop_words::{get, LANGUAGE};

/// Korean function words and high-frequency filler common in blog text
const KOREAN_BASE: &[&str] = &[
    "있다", "하다", "되다", "이다", "없다", "않다", "같다", "보다", "싶다", "주다", "받다", "이렇다",
    "그렇다", "어떻다", "것", "수", "등", "및", "때", "위", "중", "들", "그", "이", "저", "나", "너",
    "우리", "저희", "년", "월", "일", "개", "번", "곳", "분", "거", "게", "건", "데", "뭐", "좀",
    "또한", "그리고", "그러나", "하지만", "그래서", "이번", "다음", "여기", "거기", "지금", "요즘",
];

/// Exact-match stopword set built from a base list and a user list
#[derive(Debug, Clone)]
pub struct StopwordSet {
    base: FxHashSet<String>,
    user: FxHashSet<String>,
}

impl Default for StopwordSet {
    fn default() -> Self {
        Self::new("ko")
    }
}

impl StopwordSet {
    /// Create a stopword set with the base list for the given language
    ///
    /// `ko` (the default) combines the Korean list with English stopwords so
    /// that Latin words in mixed-script posts are filtered too.
    pub fn new(language: &str) -> Self {
        Self {
            base: Self::load_base(language),
            user: FxHashSet::default(),
        }
    }

    /// Create an empty stopword set (no filtering)
    pub fn empty() -> Self {
        Self {
            base: FxHashSet::default(),
            user: FxHashSet::default(),
        }
    }

    /// Create a stopword set whose base list is exactly `words`
    pub fn from_list(words: &[&str]) -> Self {
        Self {
            base: words.iter().map(|w| w.to_string()).collect(),
            user: FxHashSet::default(),
        }
    }

    /// Union the user list into this set
    pub fn with_user_stopwords<I, S>(mut self, words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.add_stopwords(words);
        self
    }

    /// Add user stopwords; blank entries are ignored
    pub fn add_stopwords<I, S>(&mut self, words: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for word in words {
            let word = word.as_ref().trim();
            if !word.is_empty() {
                self.user.insert(word.to_string());
            }
        }
    }

    /// Remove user stopwords
    pub fn remove_stopwords(&mut self, words: &[&str]) {
        for word in words {
            self.user.remove(*word);
        }
    }

    /// Check if a word is in either list
    pub fn is_stopword(&self, word: &str) -> bool {
        self.is_base_stopword(word) || self.is_user_stopword(word)
    }

    pub fn is_base_stopword(&self, word: &str) -> bool {
        self.base.contains(word)
    }

    pub fn is_user_stopword(&self, word: &str) -> bool {
        self.user.contains(word)
    }

    /// Get the number of distinct stopwords across both lists
    pub fn len(&self) -> usize {
        self.base.len() + self.user.iter().filter(|w| !self.base.contains(*w)).count()
    }

    /// Check if the set is empty
    pub fn is_empty(&self) -> bool {
        self.base.is_empty() && self.user.is_empty()
    }

    fn load_base(language: &str) -> FxHashSet<String> {
        let lang = match language.to_lowercase().as_str() {
            "ko" | "korean" => {
                let mut words = Self::english();
                words.extend(KOREAN_BASE.iter().map(|s| s.to_string()));
                return words;
            }
            "en" | "english" => LANGUAGE::English,
            "de" | "german" => LANGUAGE::German,
            "fr" | "french" => LANGUAGE::French,
            "es" | "spanish" => LANGUAGE::Spanish,
            _ => LANGUAGE::English,
        };

        get(lang).iter().map(|s| s.to_string()).collect()
    }

    fn english() -> FxHashSet<String> {
        get(LANGUAGE::English).iter().map(|s| s.to_string()).collect()
    }
}
