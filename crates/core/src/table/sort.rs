//! Stable single-key ordering.

use std::cmp::Ordering;

use super::{SortDirection, SortValue, TableRecord};

/// Missing values order before present ones.
fn compare_optional(a: Option<&SortValue<'_>>, b: Option<&SortValue<'_>>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.compare(b),
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Order records by one key.
///
/// The sort is stable in both directions: records with equal keys keep their
/// input order. A key the record type does not know returns the input order
/// unchanged.
pub fn sort_records<'a, R, I>(records: I, key: &str, direction: SortDirection) -> Vec<&'a R>
where
    R: TableRecord + 'a,
    I: IntoIterator<Item = &'a R>,
{
    let mut sorted: Vec<&R> = records.into_iter().collect();
    if !R::SORT_KEYS.contains(&key) {
        return sorted;
    }

    sorted.sort_by(|a, b| {
        let ordering = compare_optional(a.sort_value(key).as_ref(), b.sort_value(key).as_ref());
        match direction {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    });
    sorted
}
