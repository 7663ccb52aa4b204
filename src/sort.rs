use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use crate::column::ColumnType;
use crate::temporal::parse_datetime;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortDirection {
    #[serde(rename = "asc")]
    Ascending,
    #[serde(rename = "desc")]
    Descending,
}

impl SortDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortDirection::Ascending => "asc",
            SortDirection::Descending => "desc",
        }
    }

    /// Header indicator glyph.
    pub fn indicator(&self) -> &'static str {
        match self {
            SortDirection::Ascending => "▲",
            SortDirection::Descending => "▼",
        }
    }

    pub fn apply(&self, ordering: Ordering) -> Ordering {
        match self {
            SortDirection::Ascending => ordering,
            SortDirection::Descending => ordering.reverse(),
        }
    }
}

/// The single active sort. Setting a new one replaces the previous.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortSpec {
    pub column: String,
    pub direction: SortDirection,
}

impl SortSpec {
    pub fn new(column: impl Into<String>, direction: SortDirection) -> Self {
        Self {
            column: column.into(),
            direction,
        }
    }

    pub fn ascending(column: impl Into<String>) -> Self {
        Self::new(column, SortDirection::Ascending)
    }

    pub fn descending(column: impl Into<String>) -> Self {
        Self::new(column, SortDirection::Descending)
    }
}

/// A raw cell value prepared once for comparison.
///
/// Numeric and date columns keep values that fail to parse as `Unparsed`,
/// which orders after every parsed value.
#[derive(Debug, Clone, PartialEq)]
pub enum SortKey {
    Number(f64),
    Instant(NaiveDateTime),
    Text { folded: String, raw: String },
    Unparsed(String),
}

impl SortKey {
    pub fn new(column_type: ColumnType, raw: &str) -> Self {
        match column_type {
            ColumnType::Numeric => match raw.trim().parse::<f64>() {
                Ok(n) if !n.is_nan() => SortKey::Number(n),
                _ => SortKey::Unparsed(raw.to_string()),
            },
            ColumnType::Date => match parse_datetime(raw) {
                Some(dt) => SortKey::Instant(dt),
                None => SortKey::Unparsed(raw.to_string()),
            },
            ColumnType::Text => SortKey::Text {
                folded: raw.to_lowercase(),
                raw: raw.to_string(),
            },
        }
    }

    pub fn compare(&self, other: &SortKey) -> Ordering {
        match (self, other) {
            (SortKey::Number(a), SortKey::Number(b)) => a.total_cmp(b),
            (SortKey::Instant(a), SortKey::Instant(b)) => a.cmp(b),
            (
                SortKey::Text { folded: fa, raw: ra },
                SortKey::Text { folded: fb, raw: rb },
            ) => fa.cmp(fb).then_with(|| rb.cmp(ra)),
            (SortKey::Unparsed(a), SortKey::Unparsed(b)) => compare_text(a, b),
            (SortKey::Unparsed(_), _) => Ordering::Greater,
            (_, SortKey::Unparsed(_)) => Ordering::Less,
            _ => Ordering::Equal,
        }
    }
}

/// Locale-style text order: case-insensitive first, lowercase before uppercase on ties.
pub fn compare_text(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| b.cmp(a))
}

/// Ascending comparison of two raw values under a column's semantic type.
pub fn compare_values(column_type: ColumnType, a: &str, b: &str) -> Ordering {
    SortKey::new(column_type, a).compare(&SortKey::new(column_type, b))
}

/// Orders `(row, key)` pairs by key. Ties keep their incoming order.
pub fn sort_keyed(keyed: &mut [(usize, SortKey)], direction: SortDirection) {
    keyed.sort_by(|a, b| direction.apply(a.1.compare(&b.1)));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direction_serde() {
        let spec = SortSpec::descending("name");
        let json = serde_json::to_string(&spec).unwrap();
        assert_eq!(json, r#"{"column":"name","direction":"desc"}"#);
        let back: SortSpec = serde_json::from_str(r#"{"column":"qty","direction":"asc"}"#).unwrap();
        assert_eq!(back, SortSpec::ascending("qty"));
    }

    #[test]
    fn test_numeric_compare() {
        assert_eq!(compare_values(ColumnType::Numeric, "9", "10"), Ordering::Less);
        assert_eq!(compare_values(ColumnType::Numeric, "-1.5", "-1"), Ordering::Less);
        assert_eq!(compare_values(ColumnType::Numeric, "2", "2.0"), Ordering::Equal);
    }

    #[test]
    fn test_unparsed_sorts_last_ascending() {
        assert_eq!(compare_values(ColumnType::Numeric, "", "1"), Ordering::Greater);
        assert_eq!(compare_values(ColumnType::Numeric, "1", "n/a"), Ordering::Less);
        assert_eq!(compare_values(ColumnType::Date, "soon", "2025-01-01"), Ordering::Greater);
    }

    #[test]
    fn test_date_compare_uses_time() {
        assert_eq!(
            compare_values(
                ColumnType::Date,
                "2025-09-09 11:00:00 AM",
                "2025-09-09 01:00:00 PM"
            ),
            Ordering::Less
        );
        assert_eq!(
            compare_values(ColumnType::Date, "2025-09-10", "2025-09-09 11:59:00 PM"),
            Ordering::Greater
        );
    }

    #[test]
    fn test_text_compare_case_rules() {
        assert_eq!(compare_text("apple", "Banana"), Ordering::Less);
        assert_eq!(compare_text("Zebra", "apple"), Ordering::Greater);
        assert_eq!(compare_text("a", "A"), Ordering::Less);
        assert_eq!(compare_text("same", "same"), Ordering::Equal);
    }

    #[test]
    fn test_sort_keyed_descending() {
        let mut keyed: Vec<(usize, SortKey)> = ["b", "C", "a"]
            .iter()
            .enumerate()
            .map(|(i, r)| (i, SortKey::new(ColumnType::Text, r)))
            .collect();
        sort_keyed(&mut keyed, SortDirection::Descending);
        let order: Vec<usize> = keyed.iter().map(|(i, _)| *i).collect();
        assert_eq!(order, vec![1, 0, 2]);
    }
}
