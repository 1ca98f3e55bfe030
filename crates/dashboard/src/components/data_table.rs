//! Data table component types.
//!
//! A [`DataTableConfig`] describes one table: its columns, its category
//! filter and the defaults its view state starts from. [`TableChrome`] is
//! everything a template needs around the rows (sort headers, filter
//! options, page links), with every link carrying the full table state.

use serde::Serialize;

use ser_core::table::{
    FieldFilter, PageLink, SortDirection, SortState, TableController, TableParams, TableRecord,
    TableState, TableView,
};
use ser_core::{Emotion, UserStatus};

/// Column definition for a data table.
#[derive(Debug, Clone, Serialize)]
pub struct TableColumn {
    /// Sort key for sortable columns, or a display-only key.
    pub key: String,
    /// Display label for the column header.
    pub label: String,
    /// Whether the column is sortable.
    pub sortable: bool,
}

impl TableColumn {
    /// Create a new sortable column.
    #[must_use]
    pub fn sortable(key: &str, label: &str) -> Self {
        Self {
            key: key.to_string(),
            label: label.to_string(),
            sortable: true,
        }
    }

    /// Create a new non-sortable column.
    #[must_use]
    pub fn new(key: &str, label: &str) -> Self {
        Self {
            key: key.to_string(),
            label: label.to_string(),
            sortable: false,
        }
    }
}

/// Single-select category filter.
#[derive(Debug, Clone, Serialize)]
pub struct TableFilter {
    /// Display label.
    pub label: String,
    /// Available options, excluding "all".
    pub options: Vec<FilterOption>,
}

/// Option for the category filter.
#[derive(Debug, Clone, Serialize)]
pub struct FilterOption {
    /// Option value.
    pub value: String,
    /// Display label.
    pub label: String,
}

impl FilterOption {
    /// Create a new filter option.
    #[must_use]
    pub fn new(value: &str, label: &str) -> Self {
        Self {
            value: value.to_string(),
            label: label.to_string(),
        }
    }
}

impl TableFilter {
    /// Create a select filter.
    #[must_use]
    pub fn select(label: &str, options: Vec<FilterOption>) -> Self {
        Self {
            label: label.to_string(),
            options,
        }
    }
}

/// Configuration for a data table.
#[derive(Debug, Clone, Serialize)]
pub struct DataTableConfig {
    /// Unique table identifier.
    pub table_id: String,
    /// Column definitions.
    pub columns: Vec<TableColumn>,
    /// Category filter, if the table has one.
    pub filter: Option<TableFilter>,
    /// Search placeholder text.
    pub search_placeholder: String,
    /// Title for empty state.
    pub empty_title: String,
    /// Description for empty state.
    pub empty_description: Option<String>,
    /// Rows per page.
    pub page_size: usize,
    /// Sort applied when the URL names none.
    pub default_sort: SortState,
}

impl DataTableConfig {
    /// Create a new data table configuration.
    #[must_use]
    pub fn new(table_id: &str, default_sort: SortState) -> Self {
        Self {
            table_id: table_id.to_string(),
            columns: vec![],
            filter: None,
            search_placeholder: "Search...".to_string(),
            empty_title: "No items found".to_string(),
            empty_description: None,
            page_size: 10,
            default_sort,
        }
    }

    /// Add a column.
    #[must_use]
    pub fn column(mut self, column: TableColumn) -> Self {
        self.columns.push(column);
        self
    }

    /// Set the category filter.
    #[must_use]
    pub fn filter(mut self, filter: TableFilter) -> Self {
        self.filter = Some(filter);
        self
    }

    /// Set search placeholder.
    #[must_use]
    pub fn search_placeholder(mut self, placeholder: &str) -> Self {
        self.search_placeholder = placeholder.to_string();
        self
    }

    /// Set empty state configuration.
    #[must_use]
    pub fn empty_state(mut self, title: &str, description: Option<&str>) -> Self {
        self.empty_title = title.to_string();
        self.empty_description = description.map(ToString::to_string);
        self
    }

    /// Set rows per page.
    #[must_use]
    pub const fn page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }

    /// View state parsed from URL parameters with this table's defaults.
    #[must_use]
    pub fn state_from_params(&self, params: &TableParams) -> TableState {
        TableState::from_params(params, self.default_sort.clone())
    }

    /// A controller for `params` with an empty snapshot.
    #[must_use]
    pub fn controller<R: TableRecord>(&self, params: &TableParams) -> TableController<R> {
        TableController::new(self.state_from_params(params), self.page_size)
    }
}

/// Build the emotion log table configuration.
#[must_use]
pub fn emotion_log_table_config() -> DataTableConfig {
    let options = Emotion::ALL
        .iter()
        .map(|e| FilterOption::new(e.as_str(), e.label()))
        .collect();

    DataTableConfig::new(
        "emotion-logs",
        SortState::new("timestamp", SortDirection::Desc),
    )
    .column(TableColumn::sortable("emotion", "Emotion"))
    .column(TableColumn::sortable("confidence", "Confidence"))
    .column(TableColumn::sortable("timestamp", "Recorded"))
    .filter(TableFilter::select("Emotion", options))
    .search_placeholder("Search by emotion or date...")
    .empty_state(
        "No recordings yet",
        Some("Record or upload audio to see results here"),
    )
    .page_size(5)
}

/// Build the admin users table configuration.
#[must_use]
pub fn users_table_config() -> DataTableConfig {
    DataTableConfig::new("users", SortState::new("name", SortDirection::Asc))
        .column(TableColumn::sortable("name", "User"))
        .column(TableColumn::sortable("email", "Email"))
        .column(TableColumn::sortable("role", "Role"))
        .column(TableColumn::new("status", "Status"))
        .column(TableColumn::sortable("last_active", "Last Active"))
        .column(TableColumn::sortable("total_recordings", "Recordings"))
        .filter(TableFilter::select(
            "Status",
            vec![
                FilterOption::new(UserStatus::Active.as_str(), UserStatus::Active.label()),
                FilterOption::new(UserStatus::Inactive.as_str(), UserStatus::Inactive.label()),
            ],
        ))
        .search_placeholder("Search users by name, email or role...")
        .empty_state("No users found", Some("Try adjusting your search or filters"))
        .page_size(8)
}

// =============================================================================
// View models
// =============================================================================

/// A column header.
#[derive(Debug, Clone, Serialize)]
pub struct HeaderView {
    pub label: String,
    /// Link that sorts by this column; `None` for display-only columns.
    pub href: Option<String>,
    pub active: bool,
    /// `"▲"`, `"▼"` or empty.
    pub arrow: &'static str,
}

/// A category filter option with its selection state.
#[derive(Debug, Clone, Serialize)]
pub struct FilterOptionView {
    pub value: String,
    pub label: String,
    pub selected: bool,
}

/// An entry in the page-link strip.
#[derive(Debug, Clone, Serialize)]
pub struct PageLinkView {
    pub label: String,
    /// `None` for the current page and ellipses.
    pub href: Option<String>,
    pub current: bool,
}

/// Everything a template renders around the table rows.
#[derive(Debug, Clone, Serialize)]
pub struct TableChrome {
    pub table_id: String,
    pub action: String,
    pub query: String,
    pub search_placeholder: String,
    pub filter_label: String,
    pub filter_all_selected: bool,
    pub filter_options: Vec<FilterOptionView>,
    /// Current sort, carried as hidden form fields when searching.
    pub sort_key: String,
    pub sort_dir: &'static str,
    pub headers: Vec<HeaderView>,
    pub links: Vec<PageLinkView>,
    pub previous_href: Option<String>,
    pub next_href: Option<String>,
    /// `"Showing 6-10 of 23"`.
    pub summary: String,
    pub empty: bool,
    pub empty_title: String,
    pub empty_description: Option<String>,
}

impl TableChrome {
    /// Build the chrome for `view`, linking every control back to `path`.
    #[must_use]
    pub fn new<R>(
        config: &DataTableConfig,
        path: &str,
        state: &TableState,
        view: &TableView<'_, R>,
    ) -> Self {
        let href = |next: &TableState| format!("{path}?{}", next.to_query_string());

        let headers = config
            .columns
            .iter()
            .map(|column| {
                let active = column.sortable && state.sort().key == column.key;
                HeaderView {
                    label: column.label.clone(),
                    href: column
                        .sortable
                        .then(|| href(&state.with_sort(&column.key))),
                    active,
                    arrow: match (active, state.sort().direction) {
                        (false, _) => "",
                        (true, SortDirection::Asc) => "▲",
                        (true, SortDirection::Desc) => "▼",
                    },
                }
            })
            .collect();

        let selected = match state.filter() {
            FieldFilter::All => None,
            FieldFilter::Only(value) => Some(value.as_str()),
        };
        let (filter_label, filter_options) = config.filter.as_ref().map_or_else(
            || (String::new(), Vec::new()),
            |filter| {
                let options = filter
                    .options
                    .iter()
                    .map(|option| FilterOptionView {
                        value: option.value.clone(),
                        label: option.label.clone(),
                        selected: selected == Some(option.value.as_str()),
                    })
                    .collect();
                (filter.label.clone(), options)
            },
        );

        let links = view
            .links
            .iter()
            .map(|link| match *link {
                PageLink::Number { number, current } => PageLinkView {
                    label: number.to_string(),
                    href: (!current).then(|| href(&state.with_page(number))),
                    current,
                },
                PageLink::Ellipsis => PageLinkView {
                    label: "…".to_string(),
                    href: None,
                    current: false,
                },
            })
            .collect();

        Self {
            table_id: config.table_id.clone(),
            action: path.to_string(),
            query: state.query().to_string(),
            search_placeholder: config.search_placeholder.clone(),
            filter_label,
            filter_all_selected: selected.is_none(),
            filter_options,
            sort_key: state.sort().key.clone(),
            sort_dir: state.sort().direction.as_str(),
            headers,
            links,
            previous_href: view
                .has_previous
                .then(|| href(&state.with_page(view.page.saturating_sub(1)))),
            next_href: view.has_next.then(|| href(&state.with_page(view.page + 1))),
            summary: summary(view),
            empty: view.is_empty(),
            empty_title: config.empty_title.clone(),
            empty_description: config.empty_description.clone(),
        }
    }
}

fn summary<R>(view: &TableView<'_, R>) -> String {
    if view.rows.is_empty() {
        return format!("Showing 0 of {}", view.total_matches);
    }
    let first = (view.page - 1) * view.page_size + 1;
    let last = first + view.rows.len() - 1;
    format!("Showing {first}-{last} of {}", view.total_matches)
}
