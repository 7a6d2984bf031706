//! Signal extraction
//!
//! Computes the fixed set of textual features from one normalized record.
//! Pure function of its inputs and independent of record order, so batch
//! extraction needs no coordination.

use crate::config::{Lexicons, RuleWeights};
use crate::types::{NormalizedRecord, Signals};
use std::collections::BTreeSet;

/// Signal extractor over a shared lexicon/weight context
pub struct SignalExtractor;

impl SignalExtractor {
    /// Extract the signal set for one record.
    ///
    /// `category_keywords` enables the `category_relevance` signal; when it is
    /// absent (or empty) the signal is omitted entirely and scoring treats it
    /// as neutral.
    pub fn extract(
        record: &NormalizedRecord,
        lexicons: &Lexicons,
        weights: &RuleWeights,
        category_keywords: Option<&BTreeSet<String>>,
    ) -> Signals {
        let text = record.text.as_str();
        let lowered = text.to_ascii_lowercase();

        let word_count = text.split_whitespace().count();
        let char_count = text.chars().count();
        let (uppercase_ratio, letter_count) = uppercase_stats(text);
        let exclamation_count = text.matches('!').count();

        let has_url = lexicons.url_pattern.is_match(text);
        let promo_keyword_hits = lexicon_hits(&lowered, &lexicons.promo_phrases);
        let visit_negation_hits = lexicon_hits(&lowered, &lexicons.visit_negations);

        // Shouting and punctuation contribute independently, one hit each.
        let mut rant_phrase_hits = 0;
        if letter_count >= weights.min_rant_letters && uppercase_ratio > weights.uppercase_threshold
        {
            rant_phrase_hits += 1;
        }
        if exclamation_count >= weights.exclamation_threshold {
            rant_phrase_hits += 1;
        }

        let category_relevance = category_keywords
            .filter(|keywords| !keywords.is_empty())
            .map(|keywords| relevance(&lowered, keywords, &lexicons.stopwords));

        Signals {
            word_count,
            char_count,
            uppercase_ratio,
            exclamation_count,
            has_url,
            promo_keyword_hits,
            rant_phrase_hits,
            visit_negation_hits,
            category_relevance,
        }
    }
}

/// Uppercase-letter ratio and total letter count. Ratio is 0 when the text
/// has no letters at all.
fn uppercase_stats(text: &str) -> (f64, usize) {
    let mut upper = 0usize;
    let mut letters = 0usize;
    for ch in text.chars() {
        if ch.is_ascii_alphabetic() {
            letters += 1;
            if ch.is_ascii_uppercase() {
                upper += 1;
            }
        }
    }
    if letters == 0 {
        (0.0, 0)
    } else {
        (upper as f64 / letters as f64, letters)
    }
}

/// Count lexicon entries present in the (already lowercased) text, one hit per
/// entry regardless of how many times it occurs.
fn lexicon_hits(lowered: &str, entries: &[String]) -> usize {
    entries
        .iter()
        .filter(|entry| lowered.contains(entry.as_str()))
        .count()
}

/// Bounded 0-1 token-overlap relevance between the text and the keyword set.
/// Monotone: more shared meaningful tokens means a higher value.
fn relevance(lowered: &str, keywords: &BTreeSet<String>, stopwords: &BTreeSet<String>) -> f64 {
    let tokens: BTreeSet<&str> = lowered
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|t| t.len() >= 3 && !stopwords.contains(*t))
        .collect();

    let shared = keywords
        .iter()
        .filter(|k| tokens.contains(k.as_str()))
        .count();

    (shared as f64 / keywords.len() as f64).clamp(0.0, 1.0)
}
