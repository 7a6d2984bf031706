//! Pipeline orchestration
//!
//! This module provides the public API for review-triage. It drives the
//! per-record pipeline (signal extraction → rule scoring → span highlighting)
//! over a batch of records, preserving input order and isolating per-record
//! failures behind a fail-safe result.

use crate::config::{ClassifierConfig, Lexicons, RuleWeights};
use crate::error::EngineError;
use crate::highlight::SpanHighlighter;
use crate::schema::{self, AliasTable};
use crate::scorer::RuleScorer;
use crate::signals::SignalExtractor;
use crate::types::{
    ClassificationResult, Label, NormalizedRecord, RawRecord, ScoreDistribution, Span,
};

/// Batch output: results in input order plus the counts a caller needs to
/// detect `max_rows` truncation.
#[derive(Debug, Clone)]
pub struct BatchOutput {
    /// One result per processed record, same order as the input
    pub results: Vec<ClassificationResult>,
    /// Number of records the caller submitted
    pub input_count: usize,
    /// Number of records actually processed (differs only under `max_rows`)
    pub processed_count: usize,
}

impl BatchOutput {
    pub fn truncated(&self) -> bool {
        self.processed_count < self.input_count
    }
}

/// Classification engine context: lexicons, weights, and configuration built
/// once and shared across every record. All methods take `&self`; the engine
/// holds no mutable state, so one instance can serve any number of batches
/// (or threads) without coordination.
pub struct ReviewClassifier {
    lexicons: Lexicons,
    weights: RuleWeights,
    config: ClassifierConfig,
    alias_table: AliasTable,
}

impl Default for ReviewClassifier {
    fn default() -> Self {
        Self::new()
    }
}

impl ReviewClassifier {
    /// Create a classifier with default lexicons, weights, and configuration
    pub fn new() -> Self {
        Self::with_config(ClassifierConfig::default())
    }

    /// Create a classifier with a specific configuration
    pub fn with_config(config: ClassifierConfig) -> Self {
        ReviewClassifier {
            lexicons: Lexicons::default(),
            weights: RuleWeights::default(),
            config,
            alias_table: AliasTable::default(),
        }
    }

    /// Create a classifier with explicit lexicons and weights (for tuning)
    pub fn with_rules(lexicons: Lexicons, weights: RuleWeights, config: ClassifierConfig) -> Self {
        ReviewClassifier {
            lexicons,
            weights,
            config,
            alias_table: AliasTable::default(),
        }
    }

    pub fn config(&self) -> &ClassifierConfig {
        &self.config
    }

    pub fn alias_table(&self) -> &AliasTable {
        &self.alias_table
    }

    /// Classify one normalized record.
    ///
    /// Never fails: an internal record-processing error degrades to the
    /// conservative fail-safe result (valid, nothing flagged, diagnostic note)
    /// rather than propagating.
    pub fn classify(&self, record: &NormalizedRecord) -> ClassificationResult {
        match self.classify_record(record) {
            Ok(result) => result,
            Err(e) => fail_safe_result(&e),
        }
    }

    /// Classify a batch of normalized records: one result per processed
    /// record, same order as the input. Records beyond the configured
    /// `max_rows` are not processed and are excluded from the output; the
    /// returned counts let the caller detect the truncation.
    pub fn classify_batch(&self, records: &[NormalizedRecord]) -> BatchOutput {
        let limit = self.config.max_rows.unwrap_or(records.len());
        let processed = records.len().min(limit);

        let results = records[..processed]
            .iter()
            .map(|record| self.classify(record))
            .collect();

        BatchOutput {
            results,
            input_count: records.len(),
            processed_count: processed,
        }
    }

    /// The batch classification contract: a sequence of raw text strings in,
    /// a same-length same-order sequence of results out.
    pub fn classify_texts(&self, texts: &[String]) -> Vec<ClassificationResult> {
        texts
            .iter()
            .enumerate()
            .map(|(index, text)| {
                let record = NormalizedRecord::from_text(index.to_string(), text.clone());
                self.classify(&record)
            })
            .collect()
    }

    /// Normalize raw tabular rows and classify them in one pass.
    pub fn classify_rows(&self, rows: &[RawRecord]) -> BatchOutput {
        let records = schema::normalize(rows, &self.alias_table);
        self.classify_batch(&records)
    }

    /// Caller-side flagging policy: a result counts as flagged when its label
    /// is non-valid and its winning score clears the confidence threshold.
    /// The engine itself always returns the full distribution.
    pub fn is_flagged(&self, result: &ClassificationResult) -> bool {
        result.label != Label::Valid
            && result.scores.get(result.label) >= self.config.confidence_threshold()
    }

    /// Number of flagged results in a batch under the configured threshold
    pub fn flagged_count(&self, results: &[ClassificationResult]) -> usize {
        results.iter().filter(|r| self.is_flagged(r)).count()
    }

    fn classify_record(
        &self,
        record: &NormalizedRecord,
    ) -> Result<ClassificationResult, EngineError> {
        let signals = SignalExtractor::extract(
            record,
            &self.lexicons,
            &self.weights,
            self.config.category_keywords.as_ref(),
        );

        let outcome = RuleScorer::score(&signals, &self.weights);

        let spans =
            SpanHighlighter::highlight(&record.text, &self.lexicons, &outcome.matched_categories);
        validate_spans(&record.text, &spans)?;

        Ok(ClassificationResult {
            label: outcome.label,
            scores: outcome.scores,
            violations: outcome.violations,
            spans,
            note: None,
        })
    }
}

/// Span invariant check: half-open, in-bounds, non-overlapping within a
/// category. A violation here is a record-processing error and triggers the
/// fail-safe path instead of handing the caller broken offsets.
fn validate_spans(text: &str, spans: &[Span]) -> Result<(), EngineError> {
    let char_len = text.chars().count();

    for span in spans {
        if span.start() >= span.end() || span.end() > char_len {
            return Err(EngineError::RecordProcessing(format!(
                "span [{}, {}) out of bounds for text of {} chars",
                span.start(),
                span.end(),
                char_len
            )));
        }
    }

    for (i, a) in spans.iter().enumerate() {
        for b in &spans[i + 1..] {
            if a.category() == b.category() && a.start() < b.end() && b.start() < a.end() {
                return Err(EngineError::RecordProcessing(format!(
                    "overlapping {} spans [{}, {}) and [{}, {})",
                    a.category().as_str(),
                    a.start(),
                    a.end(),
                    b.start(),
                    b.end()
                )));
            }
        }
    }

    Ok(())
}

/// Conservative fail-safe: treat as valid, flag nothing, record why. A missed
/// low-quality review is preferable to a crashed batch.
fn fail_safe_result(error: &EngineError) -> ClassificationResult {
    ClassificationResult {
        label: Label::Valid,
        scores: ScoreDistribution {
            valid: 0.7,
            ad: 0.1,
            rant: 0.1,
            irrelevant: 0.1,
        },
        violations: Vec::new(),
        spans: Vec::new(),
        note: Some(format!("record processing failed: {}", error)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SpanCategory;
    use pretty_assertions::assert_eq;

    fn classify_text(text: &str) -> ClassificationResult {
        let classifier = ReviewClassifier::new();
        classifier.classify(&NormalizedRecord::from_text("t", text))
    }

    #[test]
    fn test_ad_scenario() {
        let text = "Visit our website www.bestdeals.com for exclusive deals!";
        let result = classify_text(text);

        assert_eq!(result.label, Label::Ad);
        assert!(!result.violations.is_empty());

        // A url span covers the bare domain
        let url_span = result
            .spans
            .iter()
            .find(|s| s.category() == SpanCategory::Url)
            .expect("ad result must carry a url span");
        let covered: String = text
            .chars()
            .skip(url_span.start())
            .take(url_span.end() - url_span.start())
            .collect();
        assert_eq!(covered, "www.bestdeals.com");
    }

    #[test]
    fn test_rant_scenario() {
        let result = classify_text("TERRIBLE!!!! WORST PLACE EVER!!!!");

        assert_eq!(result.label, Label::Rant);
        assert!(result
            .violations
            .iter()
            .any(|v| v.contains("punctuation") || v.contains("capitalization")));
        assert!(!result.spans.is_empty());
    }

    #[test]
    fn test_irrelevant_scenario() {
        let result = classify_text("Never been here but heard bad things.");

        assert_eq!(result.label, Label::Irrelevant);
        assert_eq!(result.violations, vec!["Review from non-visitor"]);
        assert!(result
            .spans
            .iter()
            .all(|s| s.category() == SpanCategory::Novisit));
        assert!(!result.spans.is_empty());
    }

    #[test]
    fn test_valid_scenario() {
        let result = classify_text("Great food and amazing service!");

        assert_eq!(result.label, Label::Valid);
        assert!(result.violations.is_empty());
        assert!(result.spans.is_empty());
    }

    #[test]
    fn test_empty_text_is_valid_with_depressed_confidence() {
        let empty = classify_text("");
        let written = classify_text("The staff was friendly and the pasta was excellent");

        assert_eq!(empty.label, Label::Valid);
        assert!(empty.violations.is_empty());
        assert!(empty.spans.is_empty());
        assert!(empty.scores.valid < written.scores.valid);
    }

    #[test]
    fn test_scores_always_sum_to_one() {
        let texts = [
            "",
            "ok",
            "Great food and amazing service!",
            "Visit our website www.bestdeals.com for exclusive deals!",
            "TERRIBLE!!!! WORST PLACE EVER!!!!",
            "Never been here but heard bad things.",
        ];

        for text in texts {
            let result = classify_text(text);
            assert!(
                (result.scores.sum() - 1.0).abs() < 1e-6,
                "scores for {:?} sum to {}",
                text,
                result.scores.sum()
            );
            assert_eq!(result.label, result.scores.argmax());
        }
    }

    #[test]
    fn test_idempotence() {
        let text = "Never been, but www.spam.com has a sale!!!";
        let a = classify_text(text);
        let b = classify_text(text);
        assert_eq!(a, b);
    }

    #[test]
    fn test_batch_preserves_order() {
        let classifier = ReviewClassifier::new();
        let records: Vec<NormalizedRecord> = [
            "Great food and amazing service!",
            "Visit our website www.bestdeals.com for exclusive deals!",
            "Never been here but heard bad things.",
        ]
        .iter()
        .enumerate()
        .map(|(i, t)| NormalizedRecord::from_text(i.to_string(), *t))
        .collect();

        let output = classifier.classify_batch(&records);
        assert_eq!(output.results.len(), 3);
        assert_eq!(output.input_count, 3);
        assert_eq!(output.processed_count, 3);
        assert!(!output.truncated());

        assert_eq!(output.results[0].label, Label::Valid);
        assert_eq!(output.results[1].label, Label::Ad);
        assert_eq!(output.results[2].label, Label::Irrelevant);
    }

    #[test]
    fn test_max_rows_truncation() {
        let classifier =
            ReviewClassifier::with_config(ClassifierConfig::default().with_max_rows(2));
        let records: Vec<NormalizedRecord> = (0..5)
            .map(|i| NormalizedRecord::from_text(i.to_string(), "fine meal overall"))
            .collect();

        let output = classifier.classify_batch(&records);
        assert_eq!(output.results.len(), 2);
        assert_eq!(output.input_count, 5);
        assert_eq!(output.processed_count, 2);
        assert!(output.truncated());
    }

    #[test]
    fn test_classify_texts_contract_shape() {
        let classifier = ReviewClassifier::new();
        let texts: Vec<String> = vec![
            "Great food and amazing service!".into(),
            "Visit our website www.bestdeals.com for exclusive deals!".into(),
        ];

        let results = classifier.classify_texts(&texts);
        assert_eq!(results.len(), texts.len());

        let json = serde_json::to_value(&results).unwrap();
        for entry in json.as_array().unwrap() {
            let obj = entry.as_object().unwrap();
            assert!(obj.contains_key("label"));
            let scores = obj["scores"].as_object().unwrap();
            assert_eq!(scores.len(), 4);
            assert!(obj["violations"].is_array());
            assert!(obj["spans"].is_array());
        }
    }

    #[test]
    fn test_threshold_monotonicity() {
        let texts: Vec<String> = vec![
            "Visit our website www.bestdeals.com for exclusive deals!".into(),
            "TERRIBLE!!!! WORST PLACE EVER!!!!".into(),
            "Never been here but heard bad things.".into(),
            "Great food and amazing service!".into(),
            "so disappointing!!! never again!!!".into(),
        ];

        let mut previous = usize::MAX;
        for threshold in [0.0, 0.2, 0.4, 0.6, 0.8, 1.0] {
            let classifier = ReviewClassifier::with_config(
                ClassifierConfig::default().with_confidence_threshold(threshold),
            );
            let results = classifier.classify_texts(&texts);
            let flagged = classifier.flagged_count(&results);
            assert!(
                flagged <= previous,
                "raising the threshold to {} increased flagged count",
                threshold
            );
            previous = flagged;
        }
    }

    #[test]
    fn test_category_keywords_boost_valid() {
        let with_keywords = ReviewClassifier::with_config(
            ClassifierConfig::default().with_keywords(["pizza", "pasta", "service"]),
        );
        let without_keywords = ReviewClassifier::new();

        let record = NormalizedRecord::from_text("t", "The pizza and pasta were outstanding");
        let boosted = with_keywords.classify(&record);
        let base = without_keywords.classify(&record);

        assert_eq!(boosted.label, Label::Valid);
        assert!(boosted.scores.valid > base.scores.valid);
    }

    #[test]
    fn test_classify_rows_end_to_end() {
        let classifier = ReviewClassifier::new();
        let rows = schema::parse_ndjson_rows(concat!(
            r#"{"review_text": "Great food and amazing service!", "rating": 5}"#,
            "\n",
            r#"{"comment": "Visit our website www.bestdeals.com for exclusive deals!", "score": "5"}"#,
        ))
        .unwrap();

        let output = classifier.classify_rows(&rows);
        assert_eq!(output.results.len(), 2);
        assert_eq!(output.results[0].label, Label::Valid);
        assert_eq!(output.results[1].label, Label::Ad);
    }

    #[test]
    fn test_fail_safe_result_shape() {
        let result = fail_safe_result(&EngineError::RecordProcessing("boom".into()));

        assert_eq!(result.label, Label::Valid);
        assert!((result.scores.sum() - 1.0).abs() < 1e-6);
        assert!(result.violations.is_empty());
        assert!(result.spans.is_empty());
        assert!(result.note.as_deref().unwrap_or("").contains("boom"));
    }

    #[test]
    fn test_span_validation_rejects_overlap() {
        let spans = vec![Span(SpanCategory::Promo, 0, 5), Span(SpanCategory::Promo, 3, 8)];
        assert!(validate_spans("0123456789", &spans).is_err());

        let spans = vec![Span(SpanCategory::Promo, 0, 5), Span(SpanCategory::Url, 3, 8)];
        assert!(validate_spans("0123456789", &spans).is_ok());
    }
}
