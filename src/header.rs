use crate::column::ColumnType;
use crate::sort::SortDirection;

pub const FILTER_MARK: &str = "≡";

/// What the renderer needs to draw one column header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderAffordance {
    pub column_id: String,
    pub title: String,
    pub column_type: ColumnType,
    pub width: u16,
    pub sort: Option<SortDirection>,
    pub filtered: bool,
    pub can_move_left: bool,
    pub can_move_right: bool,
}

impl HeaderAffordance {
    /// Title followed by the filter mark and sort indicator when present.
    pub fn label(&self) -> String {
        let mut label = self.title.clone();
        if self.filtered {
            label.push(' ');
            label.push_str(FILTER_MARK);
        }
        if let Some(direction) = self.sort {
            label.push(' ');
            label.push_str(direction.indicator());
        }
        label
    }

    /// Column menu entries. Clear sort and clear filter only appear when they would do something.
    pub fn menu_items(&self) -> Vec<MenuItem> {
        let mut items = vec![
            MenuItem::new(
                HeaderAction::SortAscending,
                self.sort != Some(SortDirection::Ascending),
            ),
            MenuItem::new(
                HeaderAction::SortDescending,
                self.sort != Some(SortDirection::Descending),
            ),
        ];
        if self.sort.is_some() {
            items.push(MenuItem::new(HeaderAction::ClearSort, true));
        }
        items.push(MenuItem::new(HeaderAction::Filter, true));
        if self.filtered {
            items.push(MenuItem::new(HeaderAction::ClearFilter, true));
        }
        items.push(MenuItem::new(HeaderAction::MoveLeft, self.can_move_left));
        items.push(MenuItem::new(HeaderAction::MoveRight, self.can_move_right));
        items
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderAction {
    SortAscending,
    SortDescending,
    ClearSort,
    Filter,
    ClearFilter,
    MoveLeft,
    MoveRight,
}

impl HeaderAction {
    pub fn label(&self) -> &'static str {
        match self {
            HeaderAction::SortAscending => "Sort A to Z",
            HeaderAction::SortDescending => "Sort Z to A",
            HeaderAction::ClearSort => "Clear sort",
            HeaderAction::Filter => "Filter…",
            HeaderAction::ClearFilter => "Clear filter",
            HeaderAction::MoveLeft => "Move left",
            HeaderAction::MoveRight => "Move right",
        }
    }

    pub fn from_shortcut(key: char) -> Option<Self> {
        match key {
            's' => Some(HeaderAction::SortAscending),
            'S' => Some(HeaderAction::SortDescending),
            'c' => Some(HeaderAction::ClearSort),
            'f' => Some(HeaderAction::Filter),
            'x' => Some(HeaderAction::ClearFilter),
            '<' => Some(HeaderAction::MoveLeft),
            '>' => Some(HeaderAction::MoveRight),
            _ => None,
        }
    }

    pub fn shortcut(&self) -> &'static str {
        match self {
            HeaderAction::SortAscending => "s",
            HeaderAction::SortDescending => "S",
            HeaderAction::ClearSort => "c",
            HeaderAction::Filter => "f",
            HeaderAction::ClearFilter => "x",
            HeaderAction::MoveLeft => "<",
            HeaderAction::MoveRight => ">",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MenuItem {
    pub action: HeaderAction,
    pub enabled: bool,
}

impl MenuItem {
    pub fn new(action: HeaderAction, enabled: bool) -> Self {
        Self { action, enabled }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header() -> HeaderAffordance {
        HeaderAffordance {
            column_id: "name".to_string(),
            title: "Name".to_string(),
            column_type: ColumnType::Text,
            width: 14,
            sort: None,
            filtered: false,
            can_move_left: false,
            can_move_right: true,
        }
    }

    fn actions(items: &[MenuItem]) -> Vec<HeaderAction> {
        items.iter().map(|i| i.action).collect()
    }

    #[test]
    fn test_plain_header_menu() {
        let items = header().menu_items();
        assert_eq!(
            actions(&items),
            vec![
                HeaderAction::SortAscending,
                HeaderAction::SortDescending,
                HeaderAction::Filter,
                HeaderAction::MoveLeft,
                HeaderAction::MoveRight,
            ]
        );
        assert!(items[0].enabled && items[1].enabled);
        assert!(!items[3].enabled);
        assert!(items[4].enabled);
    }

    #[test]
    fn test_sorted_and_filtered_menu() {
        let h = HeaderAffordance {
            sort: Some(SortDirection::Ascending),
            filtered: true,
            ..header()
        };
        let items = h.menu_items();
        assert_eq!(
            actions(&items),
            vec![
                HeaderAction::SortAscending,
                HeaderAction::SortDescending,
                HeaderAction::ClearSort,
                HeaderAction::Filter,
                HeaderAction::ClearFilter,
                HeaderAction::MoveLeft,
                HeaderAction::MoveRight,
            ]
        );
        assert!(!items[0].enabled);
        assert!(items[1].enabled);
    }

    #[test]
    fn test_descending_disables_z_to_a() {
        let h = HeaderAffordance {
            sort: Some(SortDirection::Descending),
            ..header()
        };
        let items = h.menu_items();
        assert!(items[0].enabled);
        assert!(!items[1].enabled);
    }

    #[test]
    fn test_shortcuts_round_trip() {
        for action in [
            HeaderAction::SortAscending,
            HeaderAction::SortDescending,
            HeaderAction::ClearSort,
            HeaderAction::Filter,
            HeaderAction::ClearFilter,
            HeaderAction::MoveLeft,
            HeaderAction::MoveRight,
        ] {
            let key = action.shortcut().chars().next().unwrap();
            assert_eq!(HeaderAction::from_shortcut(key), Some(action));
        }
        assert_eq!(HeaderAction::from_shortcut('q'), None);
    }

    #[test]
    fn test_label() {
        assert_eq!(header().label(), "Name");
        let h = HeaderAffordance {
            sort: Some(SortDirection::Descending),
            filtered: true,
            ..header()
        };
        assert_eq!(h.label(), "Name ≡ ▼");
    }
}
