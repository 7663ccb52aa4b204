use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use crate::sort::compare_values;

pub const DEFAULT_COLUMN_WIDTH: u16 = 14;

/// How a column's raw string values are interpreted for filtering and sorting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    Text,
    Numeric,
    Date,
}

impl ColumnType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ColumnType::Text => "text",
            ColumnType::Numeric => "numeric",
            ColumnType::Date => "date",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ColumnDescriptor {
    pub id: String,
    pub title: String,
    pub column_type: ColumnType,
    pub width: u16,
}

impl ColumnDescriptor {
    pub fn new(id: impl Into<String>, title: impl Into<String>, column_type: ColumnType) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            column_type,
            width: DEFAULT_COLUMN_WIDTH,
        }
    }

    pub fn text(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self::new(id, title, ColumnType::Text)
    }

    pub fn numeric(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self::new(id, title, ColumnType::Numeric)
    }

    pub fn date(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self::new(id, title, ColumnType::Date)
    }

    pub fn with_width(mut self, width: u16) -> Self {
        self.width = width;
        self
    }

    /// Total order over two raw values of this column.
    pub fn compare(&self, a: &str, b: &str) -> Ordering {
        compare_values(self.column_type, a, b)
    }
}

/// The descriptor table a screen is configured with. Order is the default display order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ColumnSet {
    columns: Vec<ColumnDescriptor>,
}

impl ColumnSet {
    pub fn new(columns: Vec<ColumnDescriptor>) -> Self {
        Self { columns }
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ColumnDescriptor> {
        self.columns.iter()
    }

    pub fn position(&self, id: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.id == id)
    }

    pub fn get(&self, id: &str) -> Option<&ColumnDescriptor> {
        self.columns.iter().find(|c| c.id == id)
    }

    pub fn get_index(&self, index: usize) -> Option<&ColumnDescriptor> {
        self.columns.get(index)
    }

    pub fn ids(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.id.clone()).collect()
    }

    /// Returns the first duplicated identifier, if any.
    pub fn duplicate_id(&self) -> Option<&str> {
        self.columns.iter().enumerate().find_map(|(i, c)| {
            self.columns[..i]
                .iter()
                .any(|prev| prev.id == c.id)
                .then_some(c.id.as_str())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ColumnSet {
        ColumnSet::new(vec![
            ColumnDescriptor::text("name", "Name"),
            ColumnDescriptor::numeric("qty", "Quantity").with_width(8),
            ColumnDescriptor::date("createdOn", "Created On"),
        ])
    }

    #[test]
    fn test_lookup() {
        let columns = sample();
        assert_eq!(columns.len(), 3);
        assert_eq!(columns.position("qty"), Some(1));
        assert_eq!(columns.get("createdOn").unwrap().column_type, ColumnType::Date);
        assert_eq!(columns.get("qty").unwrap().width, 8);
        assert!(columns.get("missing").is_none());
        assert_eq!(columns.ids(), vec!["name", "qty", "createdOn"]);
    }

    #[test]
    fn test_duplicate_id() {
        assert_eq!(sample().duplicate_id(), None);
        let dup = ColumnSet::new(vec![
            ColumnDescriptor::text("a", "A"),
            ColumnDescriptor::text("b", "B"),
            ColumnDescriptor::numeric("a", "A again"),
        ]);
        assert_eq!(dup.duplicate_id(), Some("a"));
    }

    #[test]
    fn test_descriptor_compare_uses_type() {
        let qty = ColumnDescriptor::numeric("qty", "Quantity");
        assert_eq!(qty.compare("9", "10"), Ordering::Less);
        let name = ColumnDescriptor::text("name", "Name");
        assert_eq!(name.compare("9", "10"), Ordering::Greater);
    }
}
