//! Free-text query and field-filter matching.

use serde::{Serialize, Serializer};

use super::TableRecord;

/// Restriction on a table's category field.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum FieldFilter {
    /// No restriction.
    #[default]
    All,
    /// Only records whose category equals this value (case-insensitive).
    Only(String),
}

impl FieldFilter {
    /// Parse a filter parameter. Missing, empty and `"all"` mean no
    /// restriction.
    #[must_use]
    pub fn parse(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            None | Some("") => Self::All,
            Some(v) if v.eq_ignore_ascii_case("all") => Self::All,
            Some(v) => Self::Only(v.to_lowercase()),
        }
    }

    /// Value used in URLs and select boxes.
    #[must_use]
    pub fn as_param(&self) -> &str {
        match self {
            Self::All => "all",
            Self::Only(value) => value,
        }
    }

    #[must_use]
    pub fn matches(&self, category: Option<&str>) -> bool {
        match self {
            Self::All => true,
            Self::Only(wanted) => category.is_some_and(|c| c.to_lowercase() == *wanted),
        }
    }
}

impl Serialize for FieldFilter {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_param())
    }
}

/// True when any searchable field contains `needle` (already lowercased).
fn matches_query<R: TableRecord>(record: &R, needle: &str) -> bool {
    needle.is_empty()
        || record
            .search_fields()
            .iter()
            .any(|field| field.to_lowercase().contains(needle))
}

/// Records matching both the free-text query and the field filter, in
/// snapshot order.
///
/// The query is a case-insensitive substring test over each record's
/// searchable fields, whitespace included; only the empty query matches
/// everything.
pub fn filter_records<'a, R: TableRecord>(
    records: &'a [R],
    query: &str,
    field_filter: &FieldFilter,
) -> Vec<&'a R> {
    let needle = query.to_lowercase();
    records
        .iter()
        .filter(|record| matches_query(*record, &needle))
        .filter(|record| field_filter.matches(record.category()))
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::table::fixtures::{log, ts, user};
    use crate::types::Emotion;

    #[test]
    fn test_parse_filter() {
        assert_eq!(FieldFilter::parse(None), FieldFilter::All);
        assert_eq!(FieldFilter::parse(Some("")), FieldFilter::All);
        assert_eq!(FieldFilter::parse(Some("ALL")), FieldFilter::All);
        assert_eq!(
            FieldFilter::parse(Some("Happy")),
            FieldFilter::Only("happy".to_string())
        );
        assert_eq!(FieldFilter::parse(Some("happy")).as_param(), "happy");
    }

    #[test]
    fn test_empty_query_and_all_filter_return_everything() {
        let logs = vec![
            log("a", Emotion::Happy, 0.9, ts(2024, 1, 1)),
            log("b", Emotion::Sad, 0.4, ts(2024, 1, 2)),
        ];
        let out = filter_records(&logs, "", &FieldFilter::All);
        assert_eq!(out.len(), 2);
        assert_eq!(out.first().unwrap().id.as_str(), "a");
    }

    #[test]
    fn test_query_matches_emotion_substring_case_insensitively() {
        let logs = vec![
            log("a", Emotion::Happy, 0.9, ts(2024, 1, 1)),
            log("b", Emotion::Sad, 0.4, ts(2024, 1, 2)),
        ];
        let out = filter_records(&logs, "HAP", &FieldFilter::All);
        assert_eq!(out.len(), 1);
        assert_eq!(out.first().unwrap().emotion, Emotion::Happy);
    }

    #[test]
    fn test_query_matches_timestamp_text() {
        let logs = vec![
            log("a", Emotion::Happy, 0.9, ts(2024, 1, 1)),
            log("b", Emotion::Sad, 0.4, ts(2024, 2, 2)),
        ];
        let out = filter_records(&logs, "2024-02", &FieldFilter::All);
        assert_eq!(out.len(), 1);
        assert_eq!(out.first().unwrap().id.as_str(), "b");
    }

    #[test]
    fn test_field_filter_restricts_category() {
        let logs = vec![
            log("a", Emotion::Happy, 0.9, ts(2024, 1, 1)),
            log("b", Emotion::Sad, 0.4, ts(2024, 1, 2)),
            log("c", Emotion::Happy, 0.7, ts(2024, 1, 3)),
        ];
        let out = filter_records(&logs, "", &FieldFilter::parse(Some("happy")));
        let ids: Vec<_> = out.iter().map(|l| l.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "c"]);
    }

    #[test]
    fn test_no_match_is_empty() {
        let logs = vec![log("a", Emotion::Happy, 0.9, ts(2024, 1, 1))];
        assert!(filter_records(&logs, "zzz", &FieldFilter::All).is_empty());
        assert!(filter_records(&logs, "", &FieldFilter::parse(Some("angry"))).is_empty());
    }

    #[test]
    fn test_result_is_subset_preserving_order() {
        let logs: Vec<_> = (0..10)
            .map(|i| {
                let emotion = if i % 2 == 0 { Emotion::Calm } else { Emotion::Angry };
                log(&format!("id{i}"), emotion, 0.5, ts(2024, 1, i + 1))
            })
            .collect();
        let out = filter_records(&logs, "calm", &FieldFilter::All);
        let ids: Vec<_> = out.iter().map(|l| l.id.as_str()).collect();
        assert_eq!(ids, vec!["id0", "id2", "id4", "id6", "id8"]);
    }

    #[test]
    fn test_whitespace_query_is_a_literal_substring() {
        let users = vec![
            user("u1", "Jane Smith", "jane@example.com", "user", ts(2024, 1, 1), 0),
            user("u2", "Bob", "bob@example.com", "user", ts(2024, 1, 1), 0),
        ];
        let out = filter_records(&users, " ", &FieldFilter::All);
        assert_eq!(out.len(), 1);
        assert_eq!(out.first().unwrap().name, "Jane Smith");

        assert_eq!(filter_records(&users, "bob ", &FieldFilter::All).len(), 0);
        assert_eq!(filter_records(&users, "", &FieldFilter::All).len(), 2);
    }
}
