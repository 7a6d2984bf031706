//! Classifier configuration
//!
//! One explicit, enumerated tuning surface: the lexicon sets and compiled
//! patterns shared by signal extraction and highlighting, the named rule
//! weights used by scoring, and the caller-facing options. Nothing in the
//! control flow hides a magic number.

use regex::Regex;
use std::collections::BTreeSet;

/// URL-like pattern: scheme-prefixed, bare `www.` host, or bare
/// domain-with-known-TLD optionally followed by a path.
const URL_PATTERN: &str =
    r"(?i)(?:https?://\S+|www\.\S+|\b[a-z0-9][a-z0-9-]*(?:\.[a-z0-9-]+)*\.(?:com|net|org|io|co|biz|info)(?:/\S*)?)";

/// Rant markers highlighted as evidence: runs of repeated exclamation marks
/// and shouted all-caps words.
const EXCLAMATION_RUN_PATTERN: &str = r"!{2,}";
const SHOUT_PATTERN: &str = r"\b[A-Z]{3,}(?:\s+[A-Z]{3,})*\b";

/// Lexicons and patterns shared by the signal extractor and the span
/// highlighter. Matching is case-insensitive; entries are stored lowercase.
#[derive(Debug, Clone)]
pub struct Lexicons {
    /// Promotional phrases (substring match, one count per entry)
    pub promo_phrases: Vec<String>,
    /// Admissions of non-attendance
    pub visit_negations: Vec<String>,
    /// Tokens ignored when computing category relevance
    pub stopwords: BTreeSet<String>,
    /// Compiled URL pattern
    pub url_pattern: Regex,
    /// Runs of repeated exclamation marks (rant evidence)
    pub exclamation_run_pattern: Regex,
    /// Shouted all-caps word runs (rant evidence)
    pub shout_pattern: Regex,
}

impl Default for Lexicons {
    fn default() -> Self {
        let promo_phrases = [
            "discount",
            "coupon",
            "promo",
            "sale",
            "deal",
            "offer",
            "% off",
            "check out our",
            "visit our website",
            "visit our",
        ];
        let visit_negations = [
            "never been",
            "haven't been",
            "havent been",
            "have not been",
            "never visited",
            "not visited",
        ];
        let stopwords = [
            "the", "and", "for", "was", "are", "but", "not", "with", "this", "that", "have",
            "has", "had", "they", "you", "your", "our", "out", "here", "there", "very",
        ];

        Lexicons {
            promo_phrases: promo_phrases.iter().map(|s| s.to_string()).collect(),
            visit_negations: visit_negations.iter().map(|s| s.to_string()).collect(),
            stopwords: stopwords.iter().map(|s| s.to_string()).collect(),
            // Built-in patterns are compile-time constants; a failure here is
            // a programming error, not a runtime condition.
            url_pattern: Regex::new(URL_PATTERN).expect("built-in URL pattern must compile"),
            exclamation_run_pattern: Regex::new(EXCLAMATION_RUN_PATTERN)
                .expect("built-in exclamation pattern must compile"),
            shout_pattern: Regex::new(SHOUT_PATTERN).expect("built-in shout pattern must compile"),
        }
    }
}

/// Named rule weights for the scorer. All contributions are additive on top of
/// a small positive base weight per label, so normalization never divides by
/// zero when no signal fires.
#[derive(Debug, Clone, PartialEq)]
pub struct RuleWeights {
    /// Base weight each accumulator starts at
    pub base: f64,
    /// Flat residual added to `valid` (prior belief that untagged text is fine)
    pub valid_residual: f64,
    /// Added to `ad` when a URL is present
    pub url: f64,
    /// Added to `ad` per promo lexicon hit
    pub promo_per_hit: f64,
    /// Cap on the total promo contribution
    pub promo_cap: f64,
    /// Added to `rant` per rant marker condition
    pub rant_per_hit: f64,
    /// Added to `irrelevant` per visit-negation hit
    pub negation_per_hit: f64,
    /// Cap on the total visit-negation contribution
    pub negation_cap: f64,
    /// Transfer weight for category relevance (into `valid`, out of `irrelevant`)
    pub relevance: f64,
    /// Multiplier applied to `valid` when the text is too short to judge and no
    /// other signal fired; depresses confidence without promoting another class
    pub short_text_damping: f64,
    /// Word count below which text counts as too short to judge
    pub min_word_count: usize,
    /// Uppercase ratio above which the shouting condition fires
    pub uppercase_threshold: f64,
    /// Minimum letters before the uppercase ratio is meaningful
    pub min_rant_letters: usize,
    /// Exclamation count at which the punctuation condition fires
    pub exclamation_threshold: usize,
    /// Contributions below this are not reported as violations
    pub violation_epsilon: f64,
}

impl Default for RuleWeights {
    fn default() -> Self {
        RuleWeights {
            base: 0.05,
            valid_residual: 1.0,
            url: 2.5,
            promo_per_hit: 1.2,
            promo_cap: 3.6,
            rant_per_hit: 1.5,
            negation_per_hit: 2.0,
            negation_cap: 4.0,
            relevance: 1.0,
            short_text_damping: 0.5,
            min_word_count: 3,
            uppercase_threshold: 0.6,
            min_rant_letters: 8,
            exclamation_threshold: 3,
            violation_epsilon: 0.01,
        }
    }
}

/// Caller-facing configuration surface.
#[derive(Debug, Clone, Default)]
pub struct ClassifierConfig {
    /// Below this score, a non-valid label is not counted as a flagged
    /// violation for reporting purposes. Applied by the caller-side helpers,
    /// never by the engine itself.
    pub confidence_threshold: Option<f64>,
    /// Caps records processed per batch; records beyond the cap are excluded
    /// from the output. Unbounded when None.
    pub max_rows: Option<usize>,
    /// Enables the `category_relevance` signal when present
    pub category_keywords: Option<BTreeSet<String>>,
}

impl ClassifierConfig {
    pub const DEFAULT_CONFIDENCE_THRESHOLD: f64 = 0.6;

    pub fn confidence_threshold(&self) -> f64 {
        self.confidence_threshold
            .unwrap_or(Self::DEFAULT_CONFIDENCE_THRESHOLD)
    }

    pub fn with_keywords<I, S>(mut self, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.category_keywords = Some(
            keywords
                .into_iter()
                .map(|k| k.into().to_lowercase())
                .collect(),
        );
        self
    }

    pub fn with_max_rows(mut self, max_rows: usize) -> Self {
        self.max_rows = Some(max_rows);
        self
    }

    pub fn with_confidence_threshold(mut self, threshold: f64) -> Self {
        self.confidence_threshold = Some(threshold.clamp(0.0, 1.0));
        self
    }
}
