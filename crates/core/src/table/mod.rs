//! Table engine: filter, sort and paginate a record snapshot.
//!
//! Both dashboard tables (emotion logs and users) run through the same
//! pipeline:
//!
//! ```text
//! snapshot --filter_records--> matches --sort_records--> ordered --paginate--> page
//! ```
//!
//! Every stage is a pure function of its inputs. The snapshot is never
//! mutated; stages return borrowed views into it.

use std::borrow::Cow;
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use icu_collator::{Collator, CollatorOptions, Strength};
use serde::{Deserialize, Serialize};

pub mod controller;
#[cfg(test)]
mod fixtures;
pub mod paginate;
pub mod query;
pub mod sort;

pub use controller::{SortState, TableController, TableParams, TableState, TableView};
pub use paginate::{Page, PageLink, page_links, paginate, total_pages};
pub use query::{FieldFilter, filter_records};
pub use sort::sort_records;

/// A record that can be shown in a dashboard table.
pub trait TableRecord {
    /// Sort keys this record type understands. Any other key leaves the
    /// order untouched.
    const SORT_KEYS: &'static [&'static str];

    /// Stable identifier, unique within a snapshot.
    fn record_id(&self) -> &str;

    /// Field values the free-text query is matched against.
    fn search_fields(&self) -> Vec<Cow<'_, str>>;

    /// Value of the designated category field, compared by the field filter.
    fn category(&self) -> Option<&str>;

    /// Comparable value for `key`, or `None` when the key is unknown.
    fn sort_value(&self, key: &str) -> Option<SortValue<'_>>;
}

thread_local! {
    /// Root-locale collator at secondary strength: accents order, case does not.
    static COLLATOR: Option<Collator> = {
        let mut options = CollatorOptions::new();
        options.strength = Some(Strength::Secondary);
        Collator::try_new(&Default::default(), options).ok()
    };
}

/// Case-insensitive, locale-aware text ordering.
fn collate(a: &str, b: &str) -> Ordering {
    COLLATOR.with(|collator| match collator {
        Some(collator) => collator.compare(a, b),
        None => a
            .chars()
            .flat_map(char::to_lowercase)
            .cmp(b.chars().flat_map(char::to_lowercase)),
    })
}

/// A field value extracted for ordering.
#[derive(Debug, Clone, PartialEq)]
pub enum SortValue<'a> {
    /// Collated case-insensitively, accents ordered with their base letter.
    Text(Cow<'a, str>),
    /// Compared numerically, using IEEE total order.
    Number(f64),
    /// Compared chronologically.
    Time(DateTime<Utc>),
}

impl SortValue<'_> {
    const fn rank(&self) -> u8 {
        match self {
            Self::Text(_) => 0,
            Self::Number(_) => 1,
            Self::Time(_) => 2,
        }
    }

    /// Natural ascending ordering of two values.
    #[must_use]
    pub fn compare(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Text(a), Self::Text(b)) => collate(a, b),
            (Self::Number(a), Self::Number(b)) => a.total_cmp(b),
            (Self::Time(a), Self::Time(b)) => a.cmp(b),
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

/// Sort direction for a table column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    /// The opposite direction.
    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::Asc => Self::Desc,
            Self::Desc => Self::Asc,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortDirection {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "asc" => Ok(Self::Asc),
            "desc" => Ok(Self::Desc),
            _ => Err(()),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_text_compare_is_case_insensitive() {
        let a = SortValue::Text(Cow::Borrowed("alice"));
        let b = SortValue::Text(Cow::Borrowed("Bob"));
        assert_eq!(a.compare(&b), Ordering::Less);
        let upper = SortValue::Text(Cow::Borrowed("ALICE"));
        assert_eq!(a.compare(&upper), Ordering::Equal);
    }

    #[test]
    fn test_text_compare_orders_accented_letters_with_their_base() {
        let text = |s: &'static str| SortValue::Text(Cow::Borrowed(s));
        assert_eq!(text("Émile").compare(&text("Zoe")), Ordering::Less);
        assert_eq!(text("Adam").compare(&text("Émile")), Ordering::Less);
        assert_eq!(text("émile").compare(&text("ÉMILE")), Ordering::Equal);
        assert_eq!(text("Emile").compare(&text("Émile")), Ordering::Less);
    }

    #[test]
    fn test_number_compare() {
        let low = SortValue::Number(0.2);
        let high = SortValue::Number(0.9);
        assert_eq!(low.compare(&high), Ordering::Less);
        assert_eq!(high.compare(&low), Ordering::Greater);
    }

    #[test]
    fn test_direction_parse_and_toggle() {
        assert_eq!("DESC".parse::<SortDirection>(), Ok(SortDirection::Desc));
        assert!("sideways".parse::<SortDirection>().is_err());
        assert_eq!(SortDirection::Asc.toggled(), SortDirection::Desc);
        assert_eq!(SortDirection::Desc.toggled().as_str(), "asc");
    }
}
