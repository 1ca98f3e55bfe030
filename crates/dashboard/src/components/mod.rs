//! Reusable view components.

pub mod data_table;

pub use data_table::{
    DataTableConfig, FilterOption, HeaderView, PageLinkView, TableChrome, TableColumn,
    TableFilter, emotion_log_table_config, users_table_config,
};
