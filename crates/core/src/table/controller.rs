//! Per-table view state and the controller that renders it.
//!
//! [`TableState`] holds what the viewer chose: query text, field filter,
//! sort and page. Dashboards keep it in the URL, so the state parses from
//! [`TableParams`] and renders back to a query string for every link.
//! [`TableController`] pairs a state with the last-known record snapshot.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::paginate::{PageLink, page_links, paginate};
use super::query::{FieldFilter, filter_records};
use super::sort::sort_records;
use super::{SortDirection, TableRecord};

/// Raw table parameters as they arrive in a query string.
///
/// Every field is kept as text so a malformed value falls back to its
/// default instead of rejecting the request.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TableParams {
    pub q: Option<String>,
    pub filter: Option<String>,
    pub sort: Option<String>,
    pub dir: Option<String>,
    pub page: Option<String>,
}

/// Active sort column and direction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SortState {
    pub key: String,
    pub direction: SortDirection,
}

impl SortState {
    #[must_use]
    pub fn new(key: impl Into<String>, direction: SortDirection) -> Self {
        Self {
            key: key.into(),
            direction,
        }
    }
}

/// What the viewer has chosen for one table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableState {
    query: String,
    filter: FieldFilter,
    sort: SortState,
    page: usize,
}

impl TableState {
    /// Fresh state: empty query, no filter, page 1.
    #[must_use]
    pub fn new(default_sort: SortState) -> Self {
        Self {
            query: String::new(),
            filter: FieldFilter::All,
            sort: default_sort,
            page: 1,
        }
    }

    /// Rebuild state from URL parameters.
    ///
    /// A missing or unparsable direction falls back to the default direction
    /// for the default key and to ascending for any other key. Page numbers
    /// below 1 or unparsable become 1.
    #[must_use]
    pub fn from_params(params: &TableParams, default_sort: SortState) -> Self {
        let key = params
            .sort
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .map_or_else(|| default_sort.key.clone(), str::to_string);

        let direction = params
            .dir
            .as_deref()
            .and_then(|d| d.parse::<SortDirection>().ok())
            .unwrap_or(if key == default_sort.key {
                default_sort.direction
            } else {
                SortDirection::Asc
            });

        let page = params
            .page
            .as_deref()
            .and_then(|p| p.trim().parse::<usize>().ok())
            .unwrap_or(1)
            .max(1);

        Self {
            query: params.q.clone().unwrap_or_default(),
            filter: FieldFilter::parse(params.filter.as_deref()),
            sort: SortState { key, direction },
            page,
        }
    }

    #[must_use]
    pub fn query(&self) -> &str {
        &self.query
    }

    #[must_use]
    pub const fn filter(&self) -> &FieldFilter {
        &self.filter
    }

    #[must_use]
    pub const fn sort(&self) -> &SortState {
        &self.sort
    }

    #[must_use]
    pub const fn page(&self) -> usize {
        self.page
    }

    /// Change the query text. Resets to page 1.
    pub fn set_query(&mut self, query: impl Into<String>) {
        self.query = query.into();
        self.page = 1;
    }

    /// Change the field filter. Resets to page 1.
    pub fn set_filter(&mut self, filter: FieldFilter) {
        self.filter = filter;
        self.page = 1;
    }

    /// Select a sort column.
    ///
    /// Selecting the active column flips its direction; any other column
    /// becomes active ascending. The page is left alone.
    pub fn select_sort(&mut self, key: &str) {
        if self.sort.key == key {
            self.sort.direction = self.sort.direction.toggled();
        } else {
            self.sort = SortState::new(key, SortDirection::Asc);
        }
    }

    pub fn set_page(&mut self, page: usize) {
        self.page = page.max(1);
    }

    /// Copy of this state after [`Self::select_sort`].
    #[must_use]
    pub fn with_sort(&self, key: &str) -> Self {
        let mut next = self.clone();
        next.select_sort(key);
        next
    }

    /// Copy of this state on another page.
    #[must_use]
    pub fn with_page(&self, page: usize) -> Self {
        let mut next = self.clone();
        next.set_page(page);
        next
    }

    /// URL query string (without the leading `?`) reproducing this state.
    #[must_use]
    pub fn to_query_string(&self) -> String {
        let mut serializer = url::form_urlencoded::Serializer::new(String::new());
        if !self.query.is_empty() {
            serializer.append_pair("q", &self.query);
        }
        if self.filter != FieldFilter::All {
            serializer.append_pair("filter", self.filter.as_param());
        }
        serializer.append_pair("sort", &self.sort.key);
        serializer.append_pair("dir", self.sort.direction.as_str());
        serializer.append_pair("page", &self.page.to_string());
        serializer.finish()
    }

    /// Filter, sort and paginate `snapshot` under this state.
    #[must_use]
    pub fn view<'a, R: TableRecord>(&self, snapshot: &'a [R], page_size: usize) -> TableView<'a, R> {
        let matches = filter_records(snapshot, &self.query, &self.filter);
        let ordered = sort_records(matches, &self.sort.key, self.sort.direction);
        let page = paginate(&ordered, page_size, self.page);

        TableView {
            links: page_links(page.page, page.total_pages),
            has_previous: page.has_previous(),
            has_next: page.has_next(),
            rows: page.items,
            page: page.page,
            page_size: page.page_size,
            total_pages: page.total_pages,
            total_matches: page.total_items,
            total_records: snapshot.len(),
        }
    }
}

/// The rendered slice of a table.
#[derive(Debug, Clone, PartialEq)]
pub struct TableView<'a, R> {
    pub rows: Vec<&'a R>,
    pub page: usize,
    pub page_size: usize,
    pub total_pages: usize,
    /// Records passing the query and filter.
    pub total_matches: usize,
    /// Records in the snapshot.
    pub total_records: usize,
    pub links: Vec<PageLink>,
    pub has_previous: bool,
    pub has_next: bool,
}

impl<R> TableView<'_, R> {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// A table's state plus its last-known snapshot.
#[derive(Debug, Clone)]
pub struct TableController<R> {
    snapshot: Arc<[R]>,
    state: TableState,
    page_size: usize,
}

impl<R: TableRecord> TableController<R> {
    /// Controller with an empty snapshot.
    #[must_use]
    pub fn new(state: TableState, page_size: usize) -> Self {
        Self {
            snapshot: Arc::from(Vec::new()),
            state,
            page_size,
        }
    }

    #[must_use]
    pub const fn snapshot(&self) -> &Arc<[R]> {
        &self.snapshot
    }

    #[must_use]
    pub const fn state(&self) -> &TableState {
        &self.state
    }

    pub const fn state_mut(&mut self) -> &mut TableState {
        &mut self.state
    }

    #[must_use]
    pub const fn page_size(&self) -> usize {
        self.page_size
    }

    /// Swap in a new snapshot. View state is kept.
    pub fn replace_snapshot(&mut self, snapshot: impl Into<Arc<[R]>>) {
        self.snapshot = snapshot.into();
    }

    /// Apply a fetch outcome.
    ///
    /// Success replaces the snapshot. Failure keeps the last-known snapshot
    /// and hands the error back for reporting.
    ///
    /// # Errors
    ///
    /// Returns the fetch error unchanged.
    pub fn apply_fetch<E>(&mut self, result: Result<Vec<R>, E>) -> Result<(), E> {
        let records = result?;
        self.replace_snapshot(records);
        Ok(())
    }

    /// Current view of the snapshot.
    #[must_use]
    pub fn view(&self) -> TableView<'_, R> {
        self.state.view(&self.snapshot, self.page_size)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::table::fixtures::{log, logs, ts};
    use crate::types::{Emotion, EmotionLog};

    fn default_sort() -> SortState {
        SortState::new("timestamp", SortDirection::Desc)
    }

    fn params(pairs: &[(&str, &str)]) -> TableParams {
        let mut params = TableParams::default();
        for (key, value) in pairs {
            let value = Some((*value).to_string());
            match *key {
                "q" => params.q = value,
                "filter" => params.filter = value,
                "sort" => params.sort = value,
                "dir" => params.dir = value,
                "page" => params.page = value,
                _ => {}
            }
        }
        params
    }

    #[test]
    fn test_defaults_from_empty_params() {
        let state = TableState::from_params(&TableParams::default(), default_sort());
        assert_eq!(state, TableState::new(default_sort()));
        assert_eq!(state.page(), 1);
        assert_eq!(state.sort().direction, SortDirection::Desc);
    }

    #[test]
    fn test_bad_page_falls_back_to_one() {
        let state = TableState::from_params(&params(&[("page", "abc")]), default_sort());
        assert_eq!(state.page(), 1);
        let state = TableState::from_params(&params(&[("page", "0")]), default_sort());
        assert_eq!(state.page(), 1);
    }

    #[test]
    fn test_query_param_is_kept_verbatim() {
        let state = TableState::from_params(&params(&[("q", " smith ")]), default_sort());
        assert_eq!(state.query(), " smith ");
    }

    #[test]
    fn test_new_sort_key_without_direction_is_ascending() {
        let state = TableState::from_params(&params(&[("sort", "confidence")]), default_sort());
        assert_eq!(state.sort(), &SortState::new("confidence", SortDirection::Asc));
    }

    #[test]
    fn test_select_same_key_toggles_direction() {
        let mut state = TableState::new(default_sort());
        state.select_sort("timestamp");
        assert_eq!(state.sort().direction, SortDirection::Asc);
        state.select_sort("timestamp");
        assert_eq!(state.sort().direction, SortDirection::Desc);
    }

    #[test]
    fn test_select_new_key_resets_to_ascending() {
        let mut state = TableState::new(default_sort());
        state.select_sort("confidence");
        assert_eq!(state.sort(), &SortState::new("confidence", SortDirection::Asc));
    }

    #[test]
    fn test_query_and_filter_reset_page() {
        let mut state = TableState::new(default_sort());
        state.set_page(3);
        state.set_query("happy");
        assert_eq!(state.page(), 1);

        state.set_page(2);
        state.set_filter(FieldFilter::parse(Some("sad")));
        assert_eq!(state.page(), 1);
    }

    #[test]
    fn test_query_string_round_trips_through_params() {
        let mut state = TableState::new(default_sort());
        state.set_query("a b&c");
        state.set_filter(FieldFilter::parse(Some("happy")));
        state.set_page(2);

        let qs = state.to_query_string();
        let pairs: Vec<(String, String)> = url::form_urlencoded::parse(qs.as_bytes())
            .into_owned()
            .collect();
        let lookup = |k: &str| {
            pairs
                .iter()
                .find(|(key, _)| key == k)
                .map(|(_, v)| v.clone())
        };
        let parsed = TableParams {
            q: lookup("q"),
            filter: lookup("filter"),
            sort: lookup("sort"),
            dir: lookup("dir"),
            page: lookup("page"),
        };
        assert_eq!(TableState::from_params(&parsed, default_sort()), state);
    }

    #[test]
    fn test_view_twelve_records_page_three() {
        let data = logs(12);
        let mut state = TableState::new(SortState::new("timestamp", SortDirection::Asc));
        state.set_page(3);
        let view = state.view(&data, 5);
        assert_eq!(view.rows.len(), 2);
        assert_eq!(view.total_pages, 3);
        assert_eq!(view.total_matches, 12);
        assert!(!view.has_next);
        assert_eq!(view.rows.first().unwrap().id.as_str(), "log10");
    }

    #[test]
    fn test_view_twelve_records_page_size_eight() {
        let data = logs(12);
        let mut state = TableState::new(SortState::new("timestamp", SortDirection::Asc));
        let view = state.view(&data, 8);
        assert_eq!(view.rows.len(), 8);
        assert_eq!(view.total_pages, 2);
        assert!(view.has_next);

        state.set_page(2);
        let view = state.view(&data, 8);
        assert_eq!(view.rows.len(), 4);
        assert!(!view.has_next);

        state.set_page(3);
        assert!(state.view(&data, 8).rows.is_empty());
    }

    #[test]
    fn test_view_counts_matches_after_filter() {
        let data = vec![
            log("a", Emotion::Happy, 0.9, ts(2024, 1, 1)),
            log("b", Emotion::Sad, 0.2, ts(2024, 1, 2)),
            log("c", Emotion::Happy, 0.5, ts(2024, 1, 3)),
        ];
        let mut state = TableState::new(default_sort());
        state.set_filter(FieldFilter::parse(Some("happy")));
        let view = state.view(&data, 5);
        assert_eq!(view.total_matches, 2);
        assert_eq!(view.total_records, 3);
        let ids: Vec<_> = view.rows.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["c", "a"]);
    }

    #[test]
    fn test_failed_fetch_keeps_last_snapshot() {
        let mut controller: TableController<EmotionLog> =
            TableController::new(TableState::new(default_sort()), 5);
        controller.apply_fetch::<String>(Ok(logs(3))).unwrap();
        assert_eq!(controller.snapshot().len(), 3);

        let err = controller
            .apply_fetch(Err("connection refused".to_string()))
            .unwrap_err();
        assert_eq!(err, "connection refused");
        assert_eq!(controller.snapshot().len(), 3);
        assert_eq!(controller.view().rows.len(), 3);
    }

    #[test]
    fn test_successful_fetch_keeps_view_state() {
        let mut controller: TableController<EmotionLog> =
            TableController::new(TableState::new(default_sort()), 5);
        controller.state_mut().set_query("happy");
        controller.apply_fetch::<()>(Ok(logs(18))).unwrap();
        assert_eq!(controller.state().query(), "happy");
        assert_eq!(controller.view().total_matches, 2);
    }
}
