//! Column alias table
//!
//! Incoming tabular data uses heterogeneous column names. The alias table maps
//! each canonical field to an ordered list of accepted source-column names;
//! resolution is case-insensitive and first match wins.

use crate::types::{RawRecord, RawValue};

/// Canonical record fields
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CanonicalField {
    Id,
    Text,
    Rating,
    User,
    Timestamp,
}

/// Fixed mapping from canonical field to accepted source-column aliases.
/// Immutable and process-wide; construct once and share.
#[derive(Debug, Clone)]
pub struct AliasTable {
    entries: Vec<(CanonicalField, Vec<String>)>,
}

impl Default for AliasTable {
    fn default() -> Self {
        AliasTable {
            entries: vec![
                (CanonicalField::Id, to_owned(&["review_id", "id"])),
                (
                    CanonicalField::Text,
                    to_owned(&["review_text", "text", "comment", "body", "review", "content"]),
                ),
                (CanonicalField::Rating, to_owned(&["rating", "score", "stars"])),
                (
                    CanonicalField::User,
                    to_owned(&["user", "reviewer", "author", "user_name"]),
                ),
                (
                    CanonicalField::Timestamp,
                    to_owned(&["timestamp", "date", "time", "created_at"]),
                ),
            ],
        }
    }
}

fn to_owned(aliases: &[&str]) -> Vec<String> {
    aliases.iter().map(|s| s.to_string()).collect()
}

impl AliasTable {
    /// Accepted aliases for a canonical field, in resolution order
    pub fn aliases(&self, field: CanonicalField) -> &[String] {
        self.entries
            .iter()
            .find(|(f, _)| *f == field)
            .map(|(_, aliases)| aliases.as_slice())
            .unwrap_or(&[])
    }

    /// Resolve a canonical field against a raw row.
    ///
    /// Aliases are scanned in order against the row's column names
    /// (case-insensitively); the first alias with a non-empty value wins.
    /// Unrecognized extra columns are simply never consulted.
    pub fn resolve<'a>(&self, field: CanonicalField, row: &'a RawRecord) -> Option<&'a RawValue> {
        for alias in self.aliases(field) {
            let found = row
                .iter()
                .find(|(column, _)| column.eq_ignore_ascii_case(alias))
                .map(|(_, value)| value);
            match found {
                Some(value) if !value.is_empty() => return Some(value),
                _ => continue,
            }
        }
        None
    }
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
    fn test_first_alias_wins() {
        let table = AliasTable::default();
        let row = row(&[
            ("review_text", RawValue::Text("primary".into())),
            ("comment", RawValue::Text("secondary".into())),
        ]);

        let value = table.resolve(CanonicalField::Text, &row).unwrap();
        assert_eq!(value, &RawValue::Text("primary".into()));
    }

    #[test]
    fn test_resolution_is_case_insensitive() {
        let table = AliasTable::default();
        let row = row(&[("Review_Text", RawValue::Text("hello".into()))]);

        assert!(table.resolve(CanonicalField::Text, &row).is_some());
    }

    #[test]
    fn test_empty_values_are_skipped() {
        let table = AliasTable::default();
        let row = row(&[
            ("review_text", RawValue::Empty),
            ("comment", RawValue::Text("fallback".into())),
        ]);

        let value = table.resolve(CanonicalField::Text, &row).unwrap();
        assert_eq!(value, &RawValue::Text("fallback".into()));
    }

    #[test]
    fn test_no_match_returns_none() {
        let table = AliasTable::default();
        let row = row(&[("unrelated_column", RawValue::Text("x".into()))]);

        assert!(table.resolve(CanonicalField::Text, &row).is_none());
        assert!(table.resolve(CanonicalField::Rating, &row).is_none());
    }
}
