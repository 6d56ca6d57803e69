//! Data table component types.
//!
//! A table config decides which columns an admin list shows and which of
//! them may be sorted. Sort requests arrive as `?sort=<key>` or
//! `?sort=-<key>`; keys that do not name a sortable column are ignored.

use serde::Serialize;

/// Column definition for a data table.
#[derive(Debug, Clone, Serialize)]
pub struct TableColumn {
    /// Unique key for the column, also its sort key.
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

/// Sort direction requested for a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SortDirection {
    Ascending,
    Descending,
}

/// A validated sort request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortOrder {
    pub column: String,
    pub direction: SortDirection,
}

/// Configuration for a data table.
#[derive(Debug, Clone, Serialize)]
pub struct DataTableConfig {
    /// Unique table identifier.
    pub table_id: String,
    /// Column definitions, in display order.
    pub columns: Vec<TableColumn>,
    /// Title for empty state.
    pub empty_title: String,
}

impl DataTableConfig {
    /// Create a new data table configuration.
    #[must_use]
    pub fn new(table_id: &str) -> Self {
        Self {
            table_id: table_id.to_string(),
            columns: vec![],
            empty_title: "No items found".to_string(),
        }
    }

    /// Add a column.
    #[must_use]
    pub fn column(mut self, column: TableColumn) -> Self {
        self.columns.push(column);
        self
    }

    /// Set the empty state title.
    #[must_use]
    pub fn empty_state(mut self, title: &str) -> Self {
        self.empty_title = title.to_string();
        self
    }

    /// Resolve a `sort` query value against the sortable columns.
    #[must_use]
    pub fn resolve_sort(&self, sort: Option<&str>) -> Option<SortOrder> {
        let sort = sort?.trim();
        let (key, direction) = match sort.strip_prefix('-') {
            Some(key) => (key, SortDirection::Descending),
            None => (sort, SortDirection::Ascending),
        };

        self.columns
            .iter()
            .find(|c| c.sortable && c.key == key)
            .map(|c| SortOrder {
                column: c.key.clone(),
                direction,
            })
    }

    /// Query value that sorts by `key`, flipping direction if it is already active.
    #[must_use]
    pub fn sort_link(key: &str, current: Option<&SortOrder>) -> String {
        match current {
            Some(order) if order.column == key && order.direction == SortDirection::Ascending => {
                format!("-{key}")
            }
            _ => key.to_string(),
        }
    }
}

/// Build the users table configuration: email only, sortable.
#[must_use]
pub fn users_table_config() -> DataTableConfig {
    DataTableConfig::new("users")
        .column(TableColumn::sortable("email", "Email address"))
        .empty_state("No users found")
}

/// Build the products table configuration.
#[must_use]
pub fn products_table_config() -> DataTableConfig {
    DataTableConfig::new("products")
        .column(TableColumn::new("name", "Name"))
        .column(TableColumn::new("sku", "SKU"))
        .column(TableColumn::new("category", "Category"))
        .column(TableColumn::new("price", "Price"))
        .empty_state("No products yet")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_users_table_shows_only_email() {
        let config = users_table_config();
        let keys: Vec<&str> = config.columns.iter().map(|c| c.key.as_str()).collect();
        assert_eq!(keys, ["email"]);
    }

    #[test]
    fn test_resolve_sort_accepts_only_sortable_columns() {
        let config = users_table_config();

        assert_eq!(
            config.resolve_sort(Some("email")),
            Some(SortOrder {
                column: "email".to_string(),
                direction: SortDirection::Ascending
            })
        );
        assert_eq!(
            config.resolve_sort(Some("-email")).map(|o| o.direction),
            Some(SortDirection::Descending)
        );
        assert_eq!(config.resolve_sort(Some("date_joined")), None);
        assert_eq!(config.resolve_sort(Some("-id")), None);
        assert_eq!(config.resolve_sort(None), None);
    }

    #[test]
    fn test_product_columns_are_not_sortable() {
        let config = products_table_config();
        assert!(config.columns.iter().all(|c| !c.sortable));
        assert_eq!(config.resolve_sort(Some("name")), None);
    }

    #[test]
    fn test_sort_link_flips_active_column() {
        let asc = SortOrder {
            column: "email".to_string(),
            direction: SortDirection::Ascending,
        };
        assert_eq!(DataTableConfig::sort_link("email", None), "email");
        assert_eq!(DataTableConfig::sort_link("email", Some(&asc)), "-email");
    }
}
