//! Core types for the review-triage pipeline
//!
//! This module defines the data structures that flow through each stage of the
//! pipeline: raw rows, normalized records, extracted signals, and the final
//! classification result.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Classification label assigned to a review
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Label {
    Valid,
    Ad,
    Rant,
    Irrelevant,
}

impl Label {
    pub fn as_str(&self) -> &'static str {
        match self {
            Label::Valid => "valid",
            Label::Ad => "ad",
            Label::Rant => "rant",
            Label::Irrelevant => "irrelevant",
        }
    }

    /// All labels in tie-break priority order (`valid` wins exact ties, since a
    /// false violation flag is costlier than a missed one).
    pub const TIE_BREAK_ORDER: [Label; 4] =
        [Label::Valid, Label::Ad, Label::Rant, Label::Irrelevant];
}

/// A single raw cell value as uploaded by the caller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawValue {
    Text(String),
    Number(f64),
    Bool(bool),
    Empty,
}

impl RawValue {
    /// Convert from an arbitrary JSON value. Nested arrays/objects carry no
    /// tabular meaning and degrade to `Empty`.
    pub fn from_json(value: &serde_json::Value) -> Self {
        match value {
            serde_json::Value::String(s) => RawValue::Text(s.clone()),
            serde_json::Value::Number(n) => {
                n.as_f64().map(RawValue::Number).unwrap_or(RawValue::Empty)
            }
            serde_json::Value::Bool(b) => RawValue::Bool(*b),
            _ => RawValue::Empty,
        }
    }

    pub fn as_text(&self) -> Option<String> {
        match self {
            RawValue::Text(s) => Some(s.clone()),
            RawValue::Number(n) => Some(format_number(*n)),
            RawValue::Bool(b) => Some(b.to_string()),
            RawValue::Empty => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            RawValue::Number(n) => Some(*n),
            RawValue::Text(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            RawValue::Empty => true,
            RawValue::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }
}

/// Integral numbers round-trip without a trailing ".0"
fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}

/// The as-uploaded row: arbitrary column name to raw value
pub type RawRecord = HashMap<String, RawValue>;

/// Canonical, typed representation of a review row.
///
/// Invariants: `text` is never null (absent maps to empty string); `rating`,
/// when present, is in `[1, 5]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedRecord {
    /// Record identifier (defaults to the row index when no id column matches)
    pub id: String,
    /// Review text (required, may be empty)
    pub text: String,
    /// Star rating clamped to 1-5; None when missing or non-numeric
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating: Option<u8>,
    /// Reviewer name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
    /// Timestamp, RFC 3339 when the input was ISO-like, otherwise verbatim
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

impl NormalizedRecord {
    /// A record carrying only text, for callers using the plain-text contract
    pub fn from_text(id: impl Into<String>, text: impl Into<String>) -> Self {
        NormalizedRecord {
            id: id.into(),
            text: text.into(),
            rating: None,
            user: None,
            timestamp: None,
        }
    }
}

/// Signal set computed from one normalized record.
///
/// Every field is a pure function of the record text (and, for
/// `category_relevance`, the supplied keyword set). `category_relevance` is
/// absent when no keywords were supplied; scoring treats absence as neutral,
/// never as zero relevance.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Signals {
    /// Whitespace-delimited token count
    pub word_count: usize,
    /// Character count of the text
    pub char_count: usize,
    /// Uppercase letters / alphabetic letters (0 when no letters)
    pub uppercase_ratio: f64,
    /// Literal `!` occurrences
    pub exclamation_count: usize,
    /// Text contains a URL-like pattern (scheme-prefixed, `www.`, or bare domain)
    pub has_url: bool,
    /// Matches against the promotional lexicon, counted once per lexicon entry
    pub promo_keyword_hits: usize,
    /// Rant marker conditions that fired (uppercase ratio, exclamation count)
    pub rant_phrase_hits: usize,
    /// Matches against the visit-negation lexicon ("never been", ...)
    pub visit_negation_hits: usize,
    /// Token-overlap relevance to the supplied category keywords (0-1)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_relevance: Option<f64>,
}

/// Evidence span category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpanCategory {
    Url,
    Promo,
    Rant,
    Novisit,
}

impl SpanCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            SpanCategory::Url => "url",
            SpanCategory::Promo => "promo",
            SpanCategory::Rant => "rant",
            SpanCategory::Novisit => "novisit",
        }
    }
}

/// Evidence span: `(category, start, end)` half-open character offsets into the
/// original (not lower-cased) text. Serializes as a 3-element array.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Span(pub SpanCategory, pub usize, pub usize);

impl Span {
    pub fn category(&self) -> SpanCategory {
        self.0
    }

    pub fn start(&self) -> usize {
        self.1
    }

    pub fn end(&self) -> usize {
        self.2
    }
}

/// Confidence distribution over all four labels.
///
/// All four keys are always present, values are non-negative and sum to 1
/// within floating tolerance.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreDistribution {
    pub valid: f64,
    pub ad: f64,
    pub rant: f64,
    pub irrelevant: f64,
}

impl ScoreDistribution {
    pub fn get(&self, label: Label) -> f64 {
        match label {
            Label::Valid => self.valid,
            Label::Ad => self.ad,
            Label::Rant => self.rant,
            Label::Irrelevant => self.irrelevant,
        }
    }

    pub fn sum(&self) -> f64 {
        self.valid + self.ad + self.rant + self.irrelevant
    }

    /// Winning label with the fixed tie-break order
    /// `valid > ad > rant > irrelevant`.
    pub fn argmax(&self) -> Label {
        let mut best = Label::Valid;
        for label in Label::TIE_BREAK_ORDER {
            if self.get(label) > self.get(best) {
                best = label;
            }
        }
        best
    }
}

/// The sole durable output of classification, one per input record.
///
/// The serialized shape is exactly the batch-contract fields (`label`,
/// `scores`, `violations`, `spans`); the diagnostic `note` only appears on
/// fail-safe results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationResult {
    pub label: Label,
    pub scores: ScoreDistribution,
    pub violations: Vec<String>,
    pub spans: Vec<Span>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}
