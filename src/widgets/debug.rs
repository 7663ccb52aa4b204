use crossterm::event::{KeyEvent, KeyModifiers};
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    widgets::{Paragraph, Widget},
};

/// One-line diagnostics bar shown with `--debug`.
#[derive(Debug, Default)]
pub struct DebugState {
    pub enabled: bool,
    pub num_events: usize,
    pub num_frames: usize,
    pub last_key: Option<String>,
    pub recomputes: u64,
    pub visible_rows: usize,
    pub total_rows: usize,
    pub menu: &'static str,
}

impl DebugState {
    pub fn on_key(&mut self, event: &KeyEvent) {
        if !self.enabled {
            return;
        }
        let mut key = String::new();
        if event.modifiers.contains(KeyModifiers::CONTROL) {
            key.push_str("Ctrl+");
        }
        if event.modifiers.contains(KeyModifiers::ALT) {
            key.push_str("Alt+");
        }
        key.push_str(&event.code.to_string());
        self.last_key = Some(key);
    }

    pub fn line(&self) -> String {
        format!(
            "events: {} | frames: {} | key: {} | view: {}/{} | recomputes: {} | menu: {}",
            self.num_events,
            self.num_frames,
            self.last_key.as_deref().unwrap_or("-"),
            self.visible_rows,
            self.total_rows,
            self.recomputes,
            if self.menu.is_empty() { "-" } else { self.menu },
        )
    }

    pub fn render(&self, area: Rect, buf: &mut Buffer) {
        Paragraph::new(self.line())
            .style(Style::default().fg(Color::Black).bg(Color::Yellow))
            .render(area, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyCode;

    #[test]
    fn test_records_keys_only_when_enabled() {
        let mut debug = DebugState::default();
        let key = KeyEvent::new(KeyCode::Char('s'), KeyModifiers::CONTROL);
        debug.on_key(&key);
        assert_eq!(debug.last_key, None);
        debug.enabled = true;
        debug.on_key(&key);
        assert_eq!(debug.last_key.as_deref(), Some("Ctrl+s"));
        assert!(debug.line().contains("key: Ctrl+s"));
    }
}
