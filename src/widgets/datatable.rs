use std::time::{Duration, Instant};

use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Cell, Paragraph, Row, StatefulWidget, Table, TableState, Widget},
};

use crate::dataset::Dataset;
use crate::header::{HeaderAffordance, FILTER_MARK};

const PLACEHOLDER: &str = "···";

/// Cursor, scroll window and last-rendered header positions of the grid.
#[derive(Debug, Default)]
pub struct DataTableState {
    pub table_state: TableState,
    /// First view row drawn
    pub start_row: usize,
    pub visible_rows: usize,
    /// Rows in the current view
    pub num_rows: usize,
    selected_row: usize,
    /// Index into the display order
    selected_column: usize,
    num_columns: usize,
    /// First display column drawn
    pub column_offset: usize,
    row_numbers: bool,
    last_scroll: Option<Instant>,
    scroll_placeholder: Duration,
    /// Column id and header rect from the last render, for anchoring popups
    header_areas: Vec<(String, Rect)>,
}

impl DataTableState {
    pub fn new(row_numbers: bool, scroll_placeholder_ms: u64) -> Self {
        let mut state = Self {
            row_numbers,
            scroll_placeholder: Duration::from_millis(scroll_placeholder_ms),
            ..Self::default()
        };
        state.table_state.select(Some(0));
        state
    }

    /// Updates the view size, keeping the cursor inside it.
    pub fn set_shape(&mut self, num_rows: usize, num_columns: usize) {
        self.num_rows = num_rows;
        self.num_columns = num_columns;
        self.selected_row = self.selected_row.min(num_rows.saturating_sub(1));
        self.selected_column = self.selected_column.min(num_columns.saturating_sub(1));
        self.column_offset = self.column_offset.min(self.selected_column);
        self.follow_selection();
    }

    /// Position of the cursor row within the view.
    pub fn selected_row(&self) -> Option<usize> {
        (self.num_rows > 0).then_some(self.selected_row)
    }

    pub fn selected_column(&self) -> usize {
        self.selected_column
    }

    pub fn select_column(&mut self, index: usize) {
        self.selected_column = index.min(self.num_columns.saturating_sub(1));
        self.column_offset = self.column_offset.min(self.selected_column);
    }

    pub fn select_next_column(&mut self) {
        self.select_column(self.selected_column + 1);
    }

    pub fn select_previous_column(&mut self) {
        self.select_column(self.selected_column.saturating_sub(1));
    }

    fn follow_selection(&mut self) {
        let window = self.visible_rows.max(1);
        if self.selected_row < self.start_row {
            self.start_row = self.selected_row;
        } else if self.selected_row >= self.start_row + window {
            self.start_row = self.selected_row + 1 - window;
        }
        let max_start = self.num_rows.saturating_sub(window);
        self.start_row = self.start_row.min(max_start);
        self.table_state
            .select(Some(self.selected_row.saturating_sub(self.start_row)));
    }

    fn move_rows(&mut self, delta: i64, now: Instant) {
        if self.num_rows == 0 {
            return;
        }
        let last = self.num_rows - 1;
        let target = (self.selected_row as i64 + delta).clamp(0, last as i64) as usize;
        if target != self.selected_row {
            self.selected_row = target;
            self.last_scroll = Some(now);
        }
        self.follow_selection();
    }

    pub fn select_next(&mut self, now: Instant) {
        self.move_rows(1, now);
    }

    pub fn select_previous(&mut self, now: Instant) {
        self.move_rows(-1, now);
    }

    pub fn page_down(&mut self, now: Instant) {
        self.move_rows(self.visible_rows.max(1) as i64, now);
    }

    pub fn page_up(&mut self, now: Instant) {
        self.move_rows(-(self.visible_rows.max(1) as i64), now);
    }

    pub fn scroll_to_start(&mut self, now: Instant) {
        self.move_rows(-(self.selected_row as i64), now);
    }

    pub fn scroll_to_end(&mut self, now: Instant) {
        self.move_rows(self.num_rows as i64, now);
    }

    /// True while scroll keys keep arriving within the placeholder threshold.
    pub fn is_scrolling(&self, now: Instant) -> bool {
        if self.scroll_placeholder.is_zero() {
            return false;
        }
        self.last_scroll
            .is_some_and(|t| now.saturating_duration_since(t) < self.scroll_placeholder)
    }

    /// Where the header of `column_id` was last drawn.
    pub fn header_area(&self, column_id: &str) -> Option<Rect> {
        self.header_areas
            .iter()
            .find(|(id, _)| id == column_id)
            .map(|(_, rect)| *rect)
    }
}

/// Windowed grid over a derived view. Only the rows inside the window are turned into cells.
pub struct DataTable<'a> {
    dataset: &'a Dataset,
    headers: &'a [HeaderAffordance],
    rows: &'a [usize],
    placeholder: bool,
    pub header_bg: Color,
    pub header_fg: Color,
    pub row_numbers_fg: Color,
    pub sort_fg: Color,
    pub filter_fg: Color,
    pub placeholder_fg: Color,
    pub table_cell_padding: u16,
}

impl<'a> DataTable<'a> {
    pub fn new(dataset: &'a Dataset, headers: &'a [HeaderAffordance], rows: &'a [usize]) -> Self {
        Self {
            dataset,
            headers,
            rows,
            placeholder: false,
            header_bg: Color::Indexed(236),
            header_fg: Color::White,
            row_numbers_fg: Color::DarkGray,
            sort_fg: Color::Yellow,
            filter_fg: Color::Green,
            placeholder_fg: Color::Indexed(238),
            table_cell_padding: 1,
        }
    }

    pub fn with_colors(
        mut self,
        header_bg: Color,
        header_fg: Color,
        row_numbers_fg: Color,
        sort_fg: Color,
        filter_fg: Color,
        placeholder_fg: Color,
    ) -> Self {
        self.header_bg = header_bg;
        self.header_fg = header_fg;
        self.row_numbers_fg = row_numbers_fg;
        self.sort_fg = sort_fg;
        self.filter_fg = filter_fg;
        self.placeholder_fg = placeholder_fg;
        self
    }

    /// Draw placeholders instead of cell text, used while the user scrolls fast.
    pub fn with_placeholder(mut self, placeholder: bool) -> Self {
        self.placeholder = placeholder;
        self
    }

    fn header_style(&self) -> Style {
        if self.header_bg == Color::Reset {
            Style::default().fg(self.header_fg)
        } else {
            Style::default().bg(self.header_bg).fg(self.header_fg)
        }
    }

    fn header_line(&self, header: &HeaderAffordance, selected: bool) -> Line<'a> {
        let title_style = if selected {
            Style::default().add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
        } else {
            Style::default().add_modifier(Modifier::BOLD)
        };
        let mut spans = vec![Span::styled(header.title.clone(), title_style)];
        if header.filtered {
            spans.push(Span::raw(" "));
            spans.push(Span::styled(FILTER_MARK, Style::default().fg(self.filter_fg)));
        }
        if let Some(direction) = header.sort {
            spans.push(Span::raw(" "));
            spans.push(Span::styled(
                direction.indicator(),
                Style::default().fg(self.sort_fg),
            ));
        }
        Line::from(spans)
    }

    /// Display columns that fit in `width` starting at `offset`.
    fn fitting_columns(&self, offset: usize, width: u16) -> usize {
        let mut used = 0u16;
        let mut count = 0;
        for header in self.headers.iter().skip(offset) {
            let needed = header.width + if count > 0 { self.table_cell_padding } else { 0 };
            if used + needed > width && count > 0 {
                break;
            }
            used = used.saturating_add(needed);
            count += 1;
        }
        count
    }

    fn render_row_numbers(&self, area: Rect, buf: &mut Buffer, state: &DataTableState) {
        Paragraph::new(" ".repeat(area.width as usize))
            .style(self.header_style())
            .render(Rect { height: 1, ..area }, buf);

        let end = (state.start_row + state.visible_rows).min(self.rows.len());
        let max_width = end.to_string().len();
        for (offset, position) in (state.start_row..end).enumerate() {
            let y = area.y + 1 + offset as u16;
            if y >= area.bottom() {
                break;
            }
            let style = if state.selected_row() == Some(position) {
                Style::default()
            } else {
                Style::default().fg(self.row_numbers_fg)
            };
            Paragraph::new(format!("{:>width$}", position + 1, width = max_width))
                .style(style)
                .render(
                    Rect {
                        x: area.x,
                        y,
                        width: area.width,
                        height: 1,
                    },
                    buf,
                );
        }
    }
}

impl StatefulWidget for DataTable<'_> {
    type State = DataTableState;

    fn render(self, area: Rect, buf: &mut Buffer, state: &mut Self::State) {
        state.visible_rows = area.height.saturating_sub(1) as usize;
        state.set_shape(self.rows.len(), self.headers.len());
        state.header_areas.clear();
        if area.width == 0 || area.height == 0 {
            return;
        }

        let mut table_area = area;
        if state.row_numbers {
            let width = self.rows.len().max(1).to_string().len() as u16 + 1;
            if width < area.width {
                self.render_row_numbers(Rect { width, ..area }, buf, state);
                table_area.x += width;
                table_area.width -= width;
            }
        }

        // scroll right until the selected column fits
        while state.column_offset < state.selected_column
            && state.column_offset + self.fitting_columns(state.column_offset, table_area.width)
                <= state.selected_column
        {
            state.column_offset += 1;
        }
        let shown = self.fitting_columns(state.column_offset, table_area.width);
        let headers = &self.headers[state.column_offset.min(self.headers.len())..]
            [..shown.min(self.headers.len().saturating_sub(state.column_offset))];

        let positions: Vec<Option<usize>> = headers
            .iter()
            .map(|h| self.dataset.columns().position(&h.column_id))
            .collect();
        let widths: Vec<Constraint> = headers.iter().map(|h| Constraint::Length(h.width)).collect();

        let mut x = table_area.x;
        for header in headers {
            let width = header.width.min(table_area.right().saturating_sub(x));
            state.header_areas.push((
                header.column_id.clone(),
                Rect::new(x, table_area.y, width, 1),
            ));
            x = x.saturating_add(header.width + self.table_cell_padding);
        }

        let header_row = Row::new(headers.iter().enumerate().map(|(i, h)| {
            Cell::from(self.header_line(h, state.column_offset + i == state.selected_column))
        }))
        .style(self.header_style());

        let end = (state.start_row + state.visible_rows).min(self.rows.len());
        let body: Vec<Row> = self.rows[state.start_row.min(end)..end]
            .iter()
            .map(|&row_index| {
                if self.placeholder {
                    return Row::new(
                        positions
                            .iter()
                            .map(|_| Cell::from(PLACEHOLDER).style(Style::default().fg(self.placeholder_fg))),
                    );
                }
                let row = self.dataset.row(row_index);
                Row::new(positions.iter().map(|pos| {
                    let text = match (row, pos) {
                        (Some(row), Some(pos)) => row.cell(*pos),
                        _ => "",
                    };
                    Cell::from(text.to_string())
                }))
            })
            .collect();

        StatefulWidget::render(
            Table::new(body, widths)
                .column_spacing(self.table_cell_padding)
                .header(header_row)
                .row_highlight_style(Style::default().add_modifier(Modifier::REVERSED)),
            table_area,
            buf,
            &mut state.table_state,
        );

        if self.rows.is_empty() && table_area.height > 2 {
            Paragraph::new("No rows match the current filters")
                .style(Style::default().fg(self.row_numbers_fg))
                .centered()
                .render(
                    Rect::new(table_area.x, table_area.y + 2, table_area.width, 1),
                    buf,
                );
        }
    }
}
