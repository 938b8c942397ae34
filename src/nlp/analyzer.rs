//! Morphological analysis
//!
//! The [`MorphAnalyzer`] trait is the seam for plugging in an external Korean
//! analyzer. [`RuleAnalyzer`] is a dictionary-free fallback that segments on
//! word boundaries, peels trailing particles off nouns and reduces common
//! verbal endings to the `-다` dictionary form.

use crate::errors::{NetworkError, Result};
use crate::types::{Morpheme, PosTag};
use unicode_segmentation::UnicodeSegmentation;

/// Produces (surface form, part-of-speech) pairs for a cleaned text.
///
/// Implementations must be `Send + Sync` so one analyzer can serve every
/// document of a parallel batch.
pub trait MorphAnalyzer: Send + Sync {
    /// Analyze `text`. With `stem` set, verbs and adjectives are returned in
    /// their dictionary form.
    fn analyze(&self, text: &str, stem: bool) -> Result<Vec<Morpheme>>;

    /// Name of this analyzer (for logging)
    fn name(&self) -> &'static str;
}

impl<A: MorphAnalyzer + ?Sized> MorphAnalyzer for Box<A> {
    fn analyze(&self, text: &str, stem: bool) -> Result<Vec<Morpheme>> {
        (**self).analyze(text, stem)
    }

    fn name(&self) -> &'static str {
        (**self).name()
    }
}

// Longest first so that compound particles win over their suffixes.
const PARTICLES: &[&str] = &[
    "에서는", "에게서", "으로는", "이라고", "에서", "에게", "한테", "까지", "부터", "처럼", "보다",
    "으로", "이나", "이랑", "라고", "와", "과", "은", "는", "이", "가", "을", "를", "의", "에", "도",
    "로", "만", "랑",
];

// (ending, replacement appended to the stem before `다`)
const HA_ENDINGS: &[(&str, &str)] = &[
    ("했습니다", "하"),
    ("합니다", "하"),
    ("했어요", "하"),
    ("해요", "하"),
    ("했다", "하"),
    ("한다", "하"),
    ("하다", "하"),
    ("하는", "하"),
    ("하고", "하"),
    ("해서", "하"),
    ("하며", "하"),
];

// Nouns that would otherwise match the bare `다` ending
const NOUN_EXCEPTIONS: &[&str] = &["바다", "소다", "사이다", "캐나다", "플로리다"];

const GENERIC_ENDINGS: &[&str] = &[
    "었습니다", "았습니다", "습니다", "었어요", "았어요", "었다", "았다", "였다", "어요", "아요",
    "는다", "다",
];

const ADJECTIVE_STEMS: &[&str] = &[
    "좋", "많", "크", "작", "예쁘", "맛있", "맛없", "재미있", "재밌", "멋있", "새롭", "아름답",
    "귀엽", "비싸", "싸", "높", "낮", "길", "짧", "넓", "좁", "춥", "덥", "따뜻하", "시원하",
    "행복하", "깨끗하", "조용하", "유명하", "편하", "편안하", "저렴하", "어렵", "쉽",
];

const ADVERBS: &[&str] = &[
    "매우", "정말", "너무", "아주", "진짜", "잘", "더", "가장", "많이", "함께", "같이", "다시", "특히",
    "바로", "조금", "항상", "벌써", "아직",
];

const DETERMINERS: &[&str] = &["이런", "그런", "저런", "모든", "어떤", "무슨", "각", "새"];

const CONJUNCTIONS: &[&str] = &["그리고", "그러나", "하지만", "또는", "그래서", "그런데", "및"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Script {
    Hangul,
    Latin,
    Digit,
    Other,
}

fn script_of(c: char) -> Script {
    match c {
        '\u{AC00}'..='\u{D7A3}' => Script::Hangul,
        'A'..='Z' | 'a'..='z' => Script::Latin,
        '0'..='9' => Script::Digit,
        _ => Script::Other,
    }
}

/// Split a word into maximal runs of the same script
fn script_runs(word: &str) -> Vec<(Script, &str)> {
    let mut runs = Vec::new();
    let mut start = 0;
    let mut current: Option<Script> = None;

    for (idx, c) in word.char_indices() {
        let script = script_of(c);
        if current != Some(script) {
            if let Some(prev) = current {
                runs.push((prev, &word[start..idx]));
            }
            start = idx;
            current = Some(script);
        }
    }
    if let Some(prev) = current {
        runs.push((prev, &word[start..]));
    }

    runs
}

/// Dictionary-free Korean analyzer
#[derive(Debug, Clone)]
pub struct RuleAnalyzer {
    /// Inputs longer than this many characters are rejected
    max_chars: Option<usize>,
}

impl Default for RuleAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl RuleAnalyzer {
    pub fn new() -> Self {
        Self { max_chars: None }
    }

    /// Reject inputs longer than `max_chars` characters
    pub fn with_max_chars(mut self, max_chars: usize) -> Self {
        self.max_chars = Some(max_chars);
        self
    }

    fn analyze_hangul(&self, word: &str, stem: bool, out: &mut Vec<Morpheme>) {
        if ADVERBS.contains(&word) {
            out.push(Morpheme::new(word, PosTag::Adverb));
            return;
        }
        if DETERMINERS.contains(&word) {
            out.push(Morpheme::new(word, PosTag::Determiner));
            return;
        }
        if CONJUNCTIONS.contains(&word) {
            out.push(Morpheme::new(word, PosTag::Conjunction));
            return;
        }

        if NOUN_EXCEPTIONS.contains(&word) {
            out.push(Morpheme::new(word, PosTag::Noun));
            return;
        }

        if let Some(morphemes) = Self::predicate(word, stem) {
            out.extend(morphemes);
            return;
        }

        match Self::split_particle(word) {
            Some((noun, particle)) => {
                out.push(Morpheme::new(noun, PosTag::Noun));
                out.push(Morpheme::new(particle, PosTag::Josa));
            }
            None => out.push(Morpheme::new(word, PosTag::Noun)),
        }
    }

    /// Recognize a verb or adjective by its ending
    fn predicate(word: &str, stem: bool) -> Option<Vec<Morpheme>> {
        for (ending, replacement) in HA_ENDINGS {
            if let Some(root) = word.strip_suffix(ending) {
                if root.is_empty() {
                    continue;
                }
                let base = format!("{root}{replacement}");
                return Some(Self::predicate_morphemes(word, &base, stem));
            }
        }

        for ending in GENERIC_ENDINGS {
            if let Some(root) = word.strip_suffix(ending) {
                if root.is_empty() {
                    continue;
                }
                return Some(Self::predicate_morphemes(word, root, stem));
            }
        }

        None
    }

    fn predicate_morphemes(word: &str, base: &str, stem: bool) -> Vec<Morpheme> {
        let pos = if ADJECTIVE_STEMS.iter().any(|s| base.ends_with(s)) {
            PosTag::Adjective
        } else {
            PosTag::Verb
        };

        if stem {
            vec![Morpheme::new(format!("{base}다"), pos)]
        } else {
            vec![Morpheme::new(word, pos)]
        }
    }

    /// Peel a trailing particle off a noun, keeping at least two syllables
    fn split_particle(word: &str) -> Option<(&str, &str)> {
        for particle in PARTICLES {
            if let Some(noun) = word.strip_suffix(particle) {
                if noun.chars().count() >= 2 {
                    return Some((noun, *particle));
                }
            }
        }
        None
    }
}

impl MorphAnalyzer for RuleAnalyzer {
    fn analyze(&self, text: &str, stem: bool) -> Result<Vec<Morpheme>> {
        if let Some(max) = self.max_chars {
            let len = text.chars().count();
            if len > max {
                return Err(NetworkError::analyzer(format!(
                    "input of {len} characters exceeds limit of {max}"
                )));
            }
        }

        let mut out = Vec::new();
        for word in text.unicode_words() {
            for (script, run) in script_runs(word) {
                match script {
                    Script::Hangul => self.analyze_hangul(run, stem, &mut out),
                    Script::Latin => out.push(Morpheme::new(run, PosTag::Alpha)),
                    Script::Digit => out.push(Morpheme::new(run, PosTag::Number)),
                    Script::Other => out.push(Morpheme::new(run, PosTag::Other)),
                }
            }
        }

        Ok(out)
    }

    fn name(&self) -> &'static str {
        "rule"
    }
}
