use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style, Stylize},
    widgets::{Paragraph, Widget},
};

const CONTROLS: [(&str, &str); 8] = [
    ("m", "Menu"),
    ("s", "Sort"),
    ("f", "Filter"),
    ("x", "Clear"),
    ("<>", "Move"),
    ("+-", "Width"),
    ("?", "Help"),
    ("q", "Quit"),
];

/// Key hints plus the visible/total row count.
#[derive(Default)]
pub struct Controls {
    pub visible_rows: Option<usize>,
    pub total_rows: usize,
    pub active_filters: usize,
    pub dimmed: bool,
    pub bg: Option<Color>,
}

impl Controls {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_row_count(visible_rows: usize, total_rows: usize) -> Self {
        Self {
            visible_rows: Some(visible_rows),
            total_rows,
            ..Self::default()
        }
    }

    pub fn with_active_filters(mut self, count: usize) -> Self {
        self.active_filters = count;
        self
    }

    pub fn with_dimmed(mut self, dimmed: bool) -> Self {
        self.dimmed = dimmed;
        self
    }

    pub fn with_bg(mut self, bg: Color) -> Self {
        self.bg = Some(bg);
        self
    }

    pub fn status(&self) -> Option<String> {
        let visible = self.visible_rows?;
        let mut text = if visible == self.total_rows {
            format!("Rows: {}", visible)
        } else {
            format!("Rows: {} of {}", visible, self.total_rows)
        };
        match self.active_filters {
            0 => {}
            1 => text.push_str(" · 1 filter"),
            n => text.push_str(&format!(" · {} filters", n)),
        }
        Some(text)
    }
}

impl Widget for &Controls {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let status = self.status();

        let mut constraints = CONTROLS.iter().fold(vec![], |mut acc, (key, action)| {
            acc.push(Constraint::Length(key.chars().count() as u16 + 2));
            acc.push(Constraint::Length(action.chars().count() as u16 + 1));
            acc
        });
        constraints.push(Constraint::Fill(1));
        if let Some(text) = &status {
            constraints.push(Constraint::Length(text.chars().count() as u16 + 1));
        }

        let layout = Layout::new(Direction::Horizontal, constraints).split(area);
        let bg = self.bg.unwrap_or(Color::DarkGray);
        let base_style = if self.dimmed {
            Style::default().fg(Color::DarkGray)
        } else {
            Style::default()
        };

        for (i, (key, action)) in CONTROLS.iter().enumerate() {
            let j = i * 2;
            Paragraph::new(*key)
                .style(base_style.bold())
                .centered()
                .render(layout[j], buf);
            Paragraph::new(*action)
                .style(base_style.bg(bg))
                .render(layout[j + 1], buf);
        }

        let fill = CONTROLS.len() * 2;
        Paragraph::new("")
            .style(base_style.bg(bg))
            .render(layout[fill], buf);
        if let Some(text) = status {
            let fg = if self.active_filters > 0 {
                Color::Cyan
            } else {
                Color::White
            };
            Paragraph::new(text)
                .style(base_style.bg(bg).fg(fg))
                .right_aligned()
                .render(layout[fill + 1], buf);
        }
    }
}
