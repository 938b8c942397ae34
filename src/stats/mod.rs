//! Corpus statistics

pub mod frequency;
