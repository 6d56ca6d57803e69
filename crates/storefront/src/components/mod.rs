//! Reusable view components for admin pages.

pub mod data_table;

pub use data_table::{DataTableConfig, SortDirection, SortOrder, TableColumn};
