use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph, Widget},
};

use crate::filter::{FilterOperator, ValueKind};
use crate::filter_editor::FilterEditor;

pub const EDITOR_WIDTH: u16 = 44;

/// Operator rows shown at once; the list scrolls to keep the selection visible.
const OPERATOR_ROWS: usize = 7;

/// Example shown next to the value field for the selected operator.
fn value_hint(operator: FilterOperator) -> &'static str {
    match operator.value_kind() {
        ValueKind::Date => "YYYY-MM-DD",
        ValueKind::Count => "count, e.g. 7",
        ValueKind::FiscalYear => "year, e.g. 2025",
        ValueKind::FiscalPeriod => "period 1-4",
        ValueKind::FiscalPeriodAndYear => "P/YYYY, e.g. 2/2025",
        ValueKind::Number => "number",
        ValueKind::Text => "text",
        ValueKind::None => "",
    }
}

/// Popup for editing one column's filter condition.
pub struct FilterEditorPopup<'a> {
    editor: &'a FilterEditor,
    pub border_fg: Color,
    pub error_fg: Color,
    pub dimmed_fg: Color,
}

impl<'a> FilterEditorPopup<'a> {
    pub fn new(editor: &'a FilterEditor) -> Self {
        Self {
            editor,
            border_fg: Color::Yellow,
            error_fg: Color::Red,
            dimmed_fg: Color::DarkGray,
        }
    }

    pub fn with_colors(mut self, border_fg: Color, error_fg: Color, dimmed_fg: Color) -> Self {
        self.border_fg = border_fg;
        self.error_fg = error_fg;
        self.dimmed_fg = dimmed_fg;
        self
    }

    pub fn height(&self) -> u16 {
        let operators = self.editor.operators().len().min(OPERATOR_ROWS) as u16;
        // borders, operator list, separator, value label + field, error, help
        operators + 2 + 1 + 2 + 1 + 1
    }

    fn operator_window(&self) -> std::ops::Range<usize> {
        let total = self.editor.operators().len();
        let rows = total.min(OPERATOR_ROWS);
        let selected = self.editor.selected_index();
        let start = selected
            .saturating_sub(rows / 2)
            .min(total.saturating_sub(rows));
        start..start + rows
    }
}

impl Widget for FilterEditorPopup<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        Clear.render(area, buf);
        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(self.border_fg))
            .title(format!(" Filter: {} ", self.editor.column_title()));
        let inner = block.inner(area);
        block.render(area, buf);

        let window = self.operator_window();
        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(window.len() as u16),
                Constraint::Length(1),
                Constraint::Length(1),
                Constraint::Length(1),
                Constraint::Length(1),
                Constraint::Fill(1),
            ])
            .split(inner);

        let lines: Vec<Line> = window
            .clone()
            .map(|i| {
                let operator = self.editor.operators()[i];
                let selected = i == self.editor.selected_index();
                let marker = if selected { "▸ " } else { "  " };
                let style = if selected {
                    Style::default().add_modifier(Modifier::REVERSED)
                } else {
                    Style::default()
                };
                Line::from(Span::styled(format!("{}{}", marker, operator.label()), style))
            })
            .collect();
        Paragraph::new(lines).render(layout[0], buf);

        let position = format!(
            "{}/{}",
            self.editor.selected_index() + 1,
            self.editor.operators().len()
        );
        Paragraph::new(position)
            .style(Style::default().fg(self.dimmed_fg))
            .right_aligned()
            .render(layout[1], buf);

        if self.editor.needs_value() {
            Paragraph::new(Line::from(vec![
                Span::raw("Value "),
                Span::styled(
                    value_hint(self.editor.operator()),
                    Style::default().fg(self.dimmed_fg),
                ),
            ]))
            .render(layout[2], buf);
            self.editor.input().render(layout[3], buf);
        } else {
            Paragraph::new("No value needed")
                .style(Style::default().fg(self.dimmed_fg))
                .render(layout[2], buf);
        }

        if let Some(error) = self.editor.error() {
            Paragraph::new(error.to_string())
                .style(Style::default().fg(self.error_fg))
                .render(layout[4], buf);
        }

        Paragraph::new("Tab operator · Enter apply · Esc cancel")
            .style(Style::default().fg(self.dimmed_fg))
            .render(layout[5], buf);
    }
}
