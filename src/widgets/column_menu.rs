use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, List, ListItem, ListState, StatefulWidget, Widget},
};

use crate::header::MenuItem;

/// Popup rect of `width` x `height` just below `anchor`, kept inside `bounds`.
///
/// Falls back to the top-left of `bounds` when there is no anchor.
pub fn popup_below(anchor: Option<Rect>, width: u16, height: u16, bounds: Rect) -> Rect {
    let width = width.min(bounds.width);
    let height = height.min(bounds.height);
    let (x, y) = match anchor {
        Some(a) => (a.x, a.bottom()),
        None => (bounds.x, bounds.y),
    };
    let x = x.min(bounds.right().saturating_sub(width)).max(bounds.x);
    let y = y.min(bounds.bottom().saturating_sub(height)).max(bounds.y);
    Rect::new(x, y, width, height)
}

/// Sort/filter/move actions for one column, drawn under its header.
pub struct ColumnMenu<'a> {
    title: &'a str,
    items: &'a [MenuItem],
    selected: usize,
    pub border_fg: Color,
    pub disabled_fg: Color,
}

impl<'a> ColumnMenu<'a> {
    pub fn new(title: &'a str, items: &'a [MenuItem], selected: usize) -> Self {
        Self {
            title,
            items,
            selected,
            border_fg: Color::Cyan,
            disabled_fg: Color::DarkGray,
        }
    }

    pub fn with_colors(mut self, border_fg: Color, disabled_fg: Color) -> Self {
        self.border_fg = border_fg;
        self.disabled_fg = disabled_fg;
        self
    }

    /// Outer size including borders.
    pub fn size(&self) -> (u16, u16) {
        let inner = self
            .items
            .iter()
            .map(|item| item.action.label().chars().count() + item.action.shortcut().len() + 3)
            .chain(std::iter::once(self.title.chars().count() + 2))
            .max()
            .unwrap_or(0) as u16;
        (inner + 2, self.items.len() as u16 + 2)
    }
}

impl Widget for ColumnMenu<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        Clear.render(area, buf);
        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(self.border_fg))
            .title(format!(" {} ", self.title));

        let label_width = area.width.saturating_sub(2) as usize;
        let items: Vec<ListItem> = self
            .items
            .iter()
            .map(|item| {
                let shortcut = item.action.shortcut();
                let label = item.action.label();
                let pad = label_width
                    .saturating_sub(label.chars().count() + shortcut.len() + 1)
                    .max(1);
                let style = if item.enabled {
                    Style::default()
                } else {
                    Style::default().fg(self.disabled_fg)
                };
                ListItem::new(Line::from(vec![
                    Span::raw(format!(" {}", label)),
                    Span::raw(" ".repeat(pad)),
                    Span::styled(shortcut, Style::default().fg(self.disabled_fg)),
                ]))
                .style(style)
            })
            .collect();

        let mut state = ListState::default().with_selected(Some(self.selected));
        StatefulWidget::render(
            List::new(items)
                .block(block)
                .highlight_style(Style::default().add_modifier(Modifier::REVERSED)),
            area,
            buf,
            &mut state,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::header::HeaderAction;

    #[test]
    fn test_popup_below_anchor() {
        let bounds = Rect::new(0, 0, 80, 24);
        let anchor = Rect::new(10, 0, 14, 1);
        assert_eq!(popup_below(Some(anchor), 20, 8, bounds), Rect::new(10, 1, 20, 8));
    }

    #[test]
    fn test_popup_stays_inside_bounds() {
        let bounds = Rect::new(0, 0, 40, 10);
        let anchor = Rect::new(35, 0, 5, 1);
        assert_eq!(popup_below(Some(anchor), 20, 8, bounds), Rect::new(20, 1, 20, 8));
        assert_eq!(popup_below(None, 60, 30, bounds), Rect::new(0, 0, 40, 10));
    }

    #[test]
    fn test_menu_size_fits_longest_item() {
        let items = vec![
            MenuItem::new(HeaderAction::SortAscending, true),
            MenuItem::new(HeaderAction::MoveRight, false),
        ];
        let menu = ColumnMenu::new("Qty", &items, 0);
        // "Sort A to Z" (11) + "s" (1) + 3 spacing, plus borders
        assert_eq!(menu.size(), (17, 4));
    }
}
