//! Text normalization ahead of morphological analysis
//!
//! Removes markup, e-mail addresses, stray Hangul jamo and symbols so that the
//! analyzer only sees Hangul syllables, Latin letters, digits and whitespace.

use regex::Regex;
use std::sync::LazyLock;

static EMAIL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[A-Za-z0-9._%+\-]+@[A-Za-z0-9.\-]+\.[A-Za-z]{2,}").expect("valid email pattern")
});

static MARKUP: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^>]*>").expect("valid markup pattern"));

// Compatibility jamo (ㄱ-ㅎ, ㅏ-ㅣ) and conjoining jamo that never formed a syllable block.
static JAMO: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[\u{3131}-\u{314E}\u{314F}-\u{3163}\u{1100}-\u{11FF}]+").expect("valid jamo pattern")
});

static DISALLOWED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[^\u{AC00}-\u{D7A3}A-Za-z0-9\s]").expect("valid character class")
});

/// Regex-based text cleaner
#[derive(Debug, Clone, Copy, Default)]
pub struct TextCleaner;

impl TextCleaner {
    pub fn new() -> Self {
        Self
    }

    /// Apply every normalization step in order
    pub fn clean(&self, text: &str) -> String {
        let text = self.strip_emails(text);
        let text = self.strip_markup(&text);
        let text = self.strip_jamo(&text);
        self.strip_symbols(&text)
    }

    /// Replace e-mail addresses with a space
    pub fn strip_emails(&self, text: &str) -> String {
        EMAIL.replace_all(text, " ").into_owned()
    }

    /// Replace `<...>` tags with a space
    pub fn strip_markup(&self, text: &str) -> String {
        MARKUP.replace_all(text, " ").into_owned()
    }

    /// Replace runs of isolated Hangul consonants/vowels with a space
    pub fn strip_jamo(&self, text: &str) -> String {
        JAMO.replace_all(text, " ").into_owned()
    }

    /// Drop every character that is not a Hangul syllable, Latin letter, digit or whitespace
    pub fn strip_symbols(&self, text: &str) -> String {
        DISALLOWED.replace_all(text, "").into_owned()
    }
}
