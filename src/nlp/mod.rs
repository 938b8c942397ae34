//! Natural Language Processing components
//!
//! This module provides text cleaning, morphological analysis, stopword
//! filtering and tokenization.

pub mod analyzer;
pub mod cleaner;
pub mod stopwords;
pub mod tokenizer;
