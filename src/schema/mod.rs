//! Schema normalization
//!
//! Maps as-uploaded rows with heterogeneous column names and loosely-typed
//! fields onto the canonical record shape. The mapping is deliberately
//! permissive: rows are never dropped here, ratings are clamped rather than
//! rejected, and a batch with no recognizable text column still normalizes
//! (to empty-text records) so the pipeline never fails purely on schema
//! mismatch.

mod alias;

pub use alias::{AliasTable, CanonicalField};

use crate::error::EngineError;
use crate::types::{NormalizedRecord, RawRecord, RawValue};
use chrono::{DateTime, NaiveDate, NaiveDateTime};

/// Normalize a batch of raw rows into canonical records, one per input row,
/// in input order. Pure function; no row is ever dropped.
pub fn normalize(rows: &[RawRecord], table: &AliasTable) -> Vec<NormalizedRecord> {
    rows.iter()
        .enumerate()
        .map(|(index, row)| normalize_row(row, index, table))
        .collect()
}

/// Normalize one raw row. Missing fields fall back to defaults: the row index
/// for `id`, the empty string for `text`, and None elsewhere.
pub fn normalize_row(row: &RawRecord, index: usize, table: &AliasTable) -> NormalizedRecord {
    let id = table
        .resolve(CanonicalField::Id, row)
        .and_then(RawValue::as_text)
        .unwrap_or_else(|| index.to_string());

    let text = table
        .resolve(CanonicalField::Text, row)
        .and_then(RawValue::as_text)
        .unwrap_or_default();

    let rating = table
        .resolve(CanonicalField::Rating, row)
        .and_then(RawValue::as_number)
        .and_then(coerce_rating);

    let user = table
        .resolve(CanonicalField::User, row)
        .and_then(RawValue::as_text);

    let timestamp = table
        .resolve(CanonicalField::Timestamp, row)
        .and_then(RawValue::as_text)
        .map(|raw| normalize_timestamp(&raw));

    NormalizedRecord {
        id,
        text,
        rating,
        user,
        timestamp,
    }
}

/// Coerce a numeric rating: round to nearest integer, clamp to [1, 5].
/// Out-of-range values are clamped rather than rejected so a row is never
/// dropped solely for rating issues. Non-finite values coerce to None.
fn coerce_rating(value: f64) -> Option<u8> {
    if !value.is_finite() {
        return None;
    }
    Some(value.round().clamp(1.0, 5.0) as u8)
}

/// Re-emit ISO-like timestamps as RFC 3339; pass anything else through
/// verbatim so the caller still sees the original value.
fn normalize_timestamp(raw: &str) -> String {
    let trimmed = raw.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return dt.to_rfc3339();
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%d %H:%M:%S") {
        return dt.and_utc().to_rfc3339();
    }
    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        if let Some(dt) = date.and_hms_opt(0, 0, 0) {
            return dt.and_utc().to_rfc3339();
        }
    }

    raw.to_string()
}

/// Parse NDJSON rows (one JSON object per line, blank lines skipped).
pub fn parse_ndjson_rows(ndjson: &str) -> Result<Vec<RawRecord>, EngineError> {
    let mut rows = Vec::new();
    for (line_num, line) in ndjson.lines().enumerate() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        let value: serde_json::Value = serde_json::from_str(trimmed).map_err(|e| {
            EngineError::ParseError(format!("Failed to parse line {}: {}", line_num + 1, e))
        })?;
        rows.push(row_from_json(&value, line_num + 1)?);
    }
    Ok(rows)
}

/// Parse a JSON array of row objects.
pub fn parse_array_rows(json: &str) -> Result<Vec<RawRecord>, EngineError> {
    let values: Vec<serde_json::Value> = serde_json::from_str(json)?;
    values
        .iter()
        .enumerate()
        .map(|(i, v)| row_from_json(v, i + 1))
        .collect()
}

fn row_from_json(value: &serde_json::Value, position: usize) -> Result<RawRecord, EngineError> {
    let object = value.as_object().ok_or_else(|| {
        EngineError::ParseError(format!("Row {} is not a JSON object", position))
    })?;
    Ok(object
        .iter()
        .map(|(column, v)| (column.clone(), RawValue::from_json(v)))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;

    fn row(pairs: &[(&str, RawValue)]) -> RawRecord {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect::<HashMap<_, _>>()
    }

    #[test]
    fn test_text_alias_equivalence() {
        let table = AliasTable::default();
        let a = row(&[("review_text", RawValue::Text("nice spot".into()))]);
        let b = row(&[("text", RawValue::Text("nice spot".into()))]);

        let norm_a = normalize_row(&a, 0, &table);
        let norm_b = normalize_row(&b, 0, &table);
        assert_eq!(norm_a, norm_b);
    }

    #[test]
    fn test_rating_coercion() {
        let table = AliasTable::default();

        let r = row(&[("rating", RawValue::Text("4.6".into()))]);
        assert_eq!(normalize_row(&r, 0, &table).rating, Some(5));

        let r = row(&[("rating", RawValue::Number(9.0))]);
        assert_eq!(normalize_row(&r, 0, &table).rating, Some(5));

        let r = row(&[("rating", RawValue::Number(-2.0))]);
        assert_eq!(normalize_row(&r, 0, &table).rating, Some(1));

        let r = row(&[("rating", RawValue::Text("five stars".into()))]);
        assert_eq!(normalize_row(&r, 0, &table).rating, None);

        let r = row(&[("score", RawValue::Number(3.2))]);
        assert_eq!(normalize_row(&r, 0, &table).rating, Some(3));
    }

    #[test]
    fn test_missing_text_yields_empty_string() {
        let table = AliasTable::default();
        let r = row(&[("rating", RawValue::Number(4.0))]);
        let norm = normalize_row(&r, 7, &table);

        assert_eq!(norm.text, "");
        assert_eq!(norm.id, "7");
        assert_eq!(norm.rating, Some(4));
    }

    #[test]
    fn test_batch_with_no_text_column_still_succeeds() {
        let table = AliasTable::default();
        let rows = vec![
            row(&[("stars_given", RawValue::Number(5.0))]),
            row(&[("stars_given", RawValue::Number(2.0))]),
        ];

        let normalized = normalize(&rows, &table);
        assert_eq!(normalized.len(), 2);
        assert!(normalized.iter().all(|r| r.text.is_empty()));
    }

    #[test]
    fn test_timestamp_normalization() {
        assert_eq!(
            normalize_timestamp("2024-01-15"),
            "2024-01-15T00:00:00+00:00"
        );
        assert_eq!(
            normalize_timestamp("2024-01-15 08:30:00"),
            "2024-01-15T08:30:00+00:00"
        );
        // Non-ISO inputs pass through untouched
        assert_eq!(normalize_timestamp("last Tuesday"), "last Tuesday");
    }

    #[test]
    fn test_parse_ndjson_rows() {
        let input = r#"{"review_text": "good", "rating": 5}

{"text": "bad", "score": "1"}
"#;
        let rows = parse_ndjson_rows(input).unwrap();
        assert_eq!(rows.len(), 2);

        let table = AliasTable::default();
        let normalized = normalize(&rows, &table);
        assert_eq!(normalized[0].text, "good");
        assert_eq!(normalized[0].rating, Some(5));
        assert_eq!(normalized[1].text, "bad");
        assert_eq!(normalized[1].rating, Some(1));
    }

    #[test]
    fn test_parse_rejects_non_object_row() {
        let result = parse_ndjson_rows("[1, 2, 3]");
        assert!(result.is_err());
    }

    #[test]
    fn test_extra_columns_are_ignored() {
        let table = AliasTable::default();
        let r = row(&[
            ("review_text", RawValue::Text("ok".into())),
            ("place_name", RawValue::Text("Joe's".into())),
            ("helpful_votes", RawValue::Number(12.0)),
        ]);

        let norm = normalize_row(&r, 0, &table);
        assert_eq!(norm.text, "ok");
        assert_eq!(norm.user, None);
    }
}
