//! Rule scoring
//!
//! Converts a signal set into a calibrated 4-way score distribution, a winning
//! label, and the violation reasons explaining a non-valid decision.
//!
//! Each label owns an accumulator initialized to a small positive base weight,
//! signals add saturating weighted contributions, and the accumulators are
//! normalized into a distribution. Absence of signal is never treated as
//! evidence for a specific negative label: short uninformative text depresses
//! `valid` confidence instead of promoting another class.

use crate::config::RuleWeights;
use crate::types::{Label, ScoreDistribution, Signals, SpanCategory};

/// Outcome of scoring one signal set
#[derive(Debug, Clone)]
pub struct ScoreOutcome {
    pub label: Label,
    pub scores: ScoreDistribution,
    pub violations: Vec<String>,
    /// Span categories that contributed to the winning label; drives the
    /// highlighter so a valid result carries no spans.
    pub matched_categories: Vec<SpanCategory>,
}

/// Rule scorer over a fixed weight table
pub struct RuleScorer;

impl RuleScorer {
    /// Score a signal set. Deterministic and order-independent; ties resolve
    /// in the fixed order `valid > ad > rant > irrelevant`.
    pub fn score(signals: &Signals, weights: &RuleWeights) -> ScoreOutcome {
        let mut valid = weights.base;
        let mut ad = weights.base;
        let mut rant = weights.base;
        let mut irrelevant = weights.base;

        // Per-category contributions are tracked so violations can report
        // which signals carried the decision.
        let url_contribution = if signals.has_url { weights.url } else { 0.0 };
        let promo_contribution = (signals.promo_keyword_hits as f64 * weights.promo_per_hit)
            .min(weights.promo_cap);
        ad += url_contribution + promo_contribution;

        let rant_contribution = signals.rant_phrase_hits as f64 * weights.rant_per_hit;
        rant += rant_contribution;

        let negation_contribution = (signals.visit_negation_hits as f64
            * weights.negation_per_hit)
            .min(weights.negation_cap);
        irrelevant += negation_contribution;

        // Relevance transfers weight from irrelevant into valid. Absence of
        // the signal is neutral, never zero-relevance. The floor keeps the
        // accumulator non-negative for normalization.
        if let Some(relevance) = signals.category_relevance {
            valid += weights.relevance * relevance;
            irrelevant = (irrelevant - weights.relevance * relevance).max(0.0);
        }

        // Prior belief that untagged text is legitimate
        valid += weights.valid_residual;

        let any_signal_fired = signals.has_url
            || signals.promo_keyword_hits > 0
            || signals.rant_phrase_hits > 0
            || signals.visit_negation_hits > 0;

        // Very short uninformative text lowers confidence in valid rather
        // than raising any other accumulator.
        if signals.word_count < weights.min_word_count && !any_signal_fired {
            valid *= weights.short_text_damping;
        }

        let total = valid + ad + rant + irrelevant;
        let scores = ScoreDistribution {
            valid: valid / total,
            ad: ad / total,
            rant: rant / total,
            irrelevant: irrelevant / total,
        };
        let label = scores.argmax();

        let (violations, matched_categories) = explain(
            label,
            signals,
            weights,
            url_contribution,
            promo_contribution,
            rant_contribution,
            negation_contribution,
        );

        ScoreOutcome {
            label,
            scores,
            violations,
            matched_categories,
        }
    }
}

/// One human-readable reason per signal category that contributed non-trivially
/// to a non-valid winning label. A valid result carries no violations and no
/// matched categories.
fn explain(
    label: Label,
    signals: &Signals,
    weights: &RuleWeights,
    url_contribution: f64,
    promo_contribution: f64,
    rant_contribution: f64,
    negation_contribution: f64,
) -> (Vec<String>, Vec<SpanCategory>) {
    let mut violations = Vec::new();
    let mut categories = Vec::new();
    let eps = weights.violation_epsilon;

    match label {
        Label::Valid => {}
        Label::Ad => {
            if promo_contribution > eps {
                violations.push("Contains promotional content".to_string());
                categories.push(SpanCategory::Promo);
            }
            if url_contribution > eps {
                violations.push("Contains external links".to_string());
                categories.push(SpanCategory::Url);
            }
        }
        Label::Rant => {
            if rant_contribution > eps {
                if signals.exclamation_count >= weights.exclamation_threshold {
                    violations.push("Excessive punctuation".to_string());
                }
                if signals.uppercase_ratio > weights.uppercase_threshold {
                    violations.push("Excessive capitalization".to_string());
                }
                categories.push(SpanCategory::Rant);
            }
        }
        Label::Irrelevant => {
            if negation_contribution > eps {
                violations.push("Review from non-visitor".to_string());
                categories.push(SpanCategory::Novisit);
            }
        }
    }

    (violations, categories)
}
