//! Span highlighting
//!
//! Re-scans the original text against the same lexicons and pattern classes
//! the signal extractor used, this time recording character offsets instead of
//! counts. Only categories that contributed to the winning label are emitted,
//! so a valid result carries no spans.
//!
//! Within one category the leftmost-longest match wins and consumed regions
//! are not re-matched; spans of different categories may overlap freely.
//! Matching is case-insensitive, but offsets always index the original text.

use crate::config::Lexicons;
use crate::types::{Span, SpanCategory};

/// Span highlighter over a shared lexicon context
pub struct SpanHighlighter;

impl SpanHighlighter {
    /// Locate evidence spans for the given categories, ordered by start offset.
    pub fn highlight(
        text: &str,
        lexicons: &Lexicons,
        matched_categories: &[SpanCategory],
    ) -> Vec<Span> {
        let mut spans = Vec::new();

        for &category in matched_categories {
            let ranges = match category {
                SpanCategory::Url => url_ranges(text, lexicons),
                SpanCategory::Promo => lexicon_ranges(text, &lexicons.promo_phrases),
                SpanCategory::Rant => rant_ranges(text, lexicons),
                SpanCategory::Novisit => lexicon_ranges(text, &lexicons.visit_negations),
            };

            for (start, end) in select_leftmost_longest(ranges) {
                spans.push(Span(
                    category,
                    char_offset(text, start),
                    char_offset(text, end),
                ));
            }
        }

        spans.sort_by_key(|span| (span.start(), span.end()));
        spans
    }
}

/// URL matches with trailing sentence punctuation trimmed off
fn url_ranges(text: &str, lexicons: &Lexicons) -> Vec<(usize, usize)> {
    lexicons
        .url_pattern
        .find_iter(text)
        .map(|m| {
            let trimmed = m
                .as_str()
                .trim_end_matches(&['.', ',', '!', '?', ';', ':', ')'][..]);
            (m.start(), m.start() + trimmed.len())
        })
        .filter(|(start, end)| end > start)
        .collect()
}

/// All occurrences of every lexicon entry, matched case-insensitively against
/// an ASCII-lowercased copy (same byte layout as the original).
fn lexicon_ranges(text: &str, entries: &[String]) -> Vec<(usize, usize)> {
    let lowered = text.to_ascii_lowercase();
    let mut ranges = Vec::new();

    for entry in entries {
        let mut from = 0;
        while let Some(pos) = lowered[from..].find(entry.as_str()) {
            let start = from + pos;
            ranges.push((start, start + entry.len()));
            from = start + 1;
        }
    }

    ranges
}

/// Exclamation runs and shouted all-caps word runs
fn rant_ranges(text: &str, lexicons: &Lexicons) -> Vec<(usize, usize)> {
    let mut ranges: Vec<(usize, usize)> = lexicons
        .exclamation_run_pattern
        .find_iter(text)
        .map(|m| (m.start(), m.end()))
        .collect();
    ranges.extend(
        lexicons
            .shout_pattern
            .find_iter(text)
            .map(|m| (m.start(), m.end())),
    );
    ranges
}

/// Greedy leftmost-longest selection: sort by start ascending then end
/// descending, keep a match only if it starts at or after the previous
/// match's end.
fn select_leftmost_longest(mut ranges: Vec<(usize, usize)>) -> Vec<(usize, usize)> {
    ranges.sort_by(|a, b| a.0.cmp(&b.0).then(b.1.cmp(&a.1)));

    let mut selected: Vec<(usize, usize)> = Vec::new();
    for (start, end) in ranges {
        match selected.last() {
            Some(&(_, last_end)) if start < last_end => continue,
            _ => selected.push((start, end)),
        }
    }
    selected
}

/// Byte offset to character offset in the original text
fn char_offset(text: &str, byte_offset: usize) -> usize {
    text[..byte_offset].chars().count()
}
