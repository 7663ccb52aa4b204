use color_eyre::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use std::sync::mpsc::Sender;
use std::time::Instant;
use tracing::{trace, warn};

use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::style::Style;
use ratatui::{buffer::Buffer, layout::Rect, widgets::Widget};

use ratatui::widgets::{Block, BorderType, Borders, Clear, Paragraph, StatefulWidget, Wrap};

pub mod column;
pub mod config;
pub mod dataset;
pub mod filter;
pub mod filter_editor;
pub mod grid;
pub mod header;
pub mod layout;
pub mod logging;
pub mod sort;
pub mod store;
pub mod temporal;
pub mod view;
pub mod widgets;

pub use config::{AppConfig, ColorParser, ConfigManager, Theme};
pub use dataset::Dataset;
pub use grid::{GridOptions, GridState, MenuState};
pub use gridview_cli::{Args, FileFormat};
pub use store::{FileStore, KeyValueStore, MemoryStore, ViewPersistence};

use header::HeaderAction;
use widgets::column_menu::{popup_below, ColumnMenu};
use widgets::controls::Controls;
use widgets::datatable::{DataTable, DataTableState};
use widgets::debug::DebugState;
use widgets::filter_editor::{FilterEditorPopup, EDITOR_WIDTH};

/// Application name used for config, state and log paths
pub const APP_NAME: &str = "gridview";

/// Screen name used for the built-in dataset
pub const DEMO_SCREEN: &str = "demo";

pub enum AppEvent {
    Key(KeyEvent),
    Exit,
    Crash(String),
    Resize(u16, u16),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    ColumnMenu,
    Editing,
    Help,
}

/// Key under which a screen's view state is stored: `--screen`, else the file stem, else `demo`.
pub fn screen_name(args: &Args) -> String {
    if let Some(screen) = args.screen.as_deref().filter(|s| !s.trim().is_empty()) {
        return screen.trim().to_string();
    }
    let Some(stem) = args
        .path
        .as_deref()
        .and_then(|p| p.file_stem())
        .and_then(|s| s.to_str())
    else {
        return DEMO_SCREEN.to_string();
    };
    let lower = stem.to_lowercase();
    if let Ok(re) = regex::Regex::new(r"[^a-z0-9_]+") {
        let name = re.replace_all(&lower, "-");
        let name = name.trim_matches('-');
        if !name.is_empty() {
            return name.to_string();
        }
    }
    DEMO_SCREEN.to_string()
}

/// Command line flags take precedence over the config file.
pub fn apply_args(config: &mut AppConfig, args: &Args) {
    if let Some(month) = args.fiscal_year_start {
        config.fiscal.year_start_month = month;
    }
    if args.row_numbers {
        config.display.row_numbers = true;
    }
}

pub fn state_store(config: &AppConfig) -> Result<FileStore> {
    match &config.storage.state_dir {
        Some(dir) => Ok(FileStore::with_dir(dir.clone())),
        None => FileStore::new(APP_NAME),
    }
}

/// Persistence for `screen`, or `None` when storage is disabled or unavailable.
pub fn open_persistence(config: &AppConfig, screen: &str) -> Option<ViewPersistence> {
    if !config.storage.enabled {
        return None;
    }
    match state_store(config) {
        Ok(store) => Some(ViewPersistence::new(store, screen)),
        Err(e) => {
            warn!(error = %e, "view state will not be remembered");
            None
        }
    }
}

/// The file named on the command line, or the demo dataset.
pub fn load_dataset(args: &Args, config: &AppConfig) -> Result<Dataset> {
    match &args.path {
        Some(path) => Ok(Dataset::load(path, args.format)?
            .with_column_width(config.display.default_column_width)),
        None => Ok(Dataset::demo()),
    }
}

const HELP_TEXT: &str = "\
Navigation
  ↑ ↓ / k j         Move between rows
  ← → / h l         Move between columns
  PgUp PgDn         Page up / down
  g G / Home End    First / last row

Column (selected column)
  Enter / m         Open column menu
  s / S             Sort A to Z / Z to A
  c                 Clear sort
  f                 Filter
  x                 Clear filter
  < / >             Move column left / right
  + / -             Widen / narrow column
  R                 Reset sort, filters and column order

Column menu
  ↑ ↓               Choose an action
  Enter             Apply it
  Esc               Close

Filter editor
  Tab / Shift+Tab   Next / previous operator
  Enter             Apply filter
  Esc               Cancel

  ?                 Toggle this help
  q                 Quit";

pub struct App {
    grid: GridState,
    table_state: DataTableState,
    events: Sender<AppEvent>,
    debug: DebugState,
    show_help: bool,
    help_scroll: u16,
    theme: Theme,
    placeholder_shown: bool,
}

impl App {
    pub fn new(events: Sender<AppEvent>, grid: GridState, theme: Theme, config: &AppConfig) -> App {
        let mut app = App {
            grid,
            table_state: DataTableState::new(
                config.display.row_numbers,
                config.display.scroll_placeholder_ms,
            ),
            events,
            debug: DebugState::default(),
            show_help: false,
            help_scroll: 0,
            theme,
            placeholder_shown: false,
        };
        app.sync_view();
        app
    }

    pub fn send_event(&mut self, event: AppEvent) -> Result<()> {
        self.events.send(event)?;
        Ok(())
    }

    pub fn enable_debug(&mut self) {
        self.debug.enabled = true;
    }

    fn color(&self, name: &str) -> ratatui::style::Color {
        self.theme.get(name)
    }

    pub fn grid(&self) -> &GridState {
        &self.grid
    }

    pub fn table_state(&self) -> &DataTableState {
        &self.table_state
    }

    pub fn input_mode(&self) -> InputMode {
        if self.show_help {
            return InputMode::Help;
        }
        match self.grid.menu() {
            MenuState::Closed => InputMode::Normal,
            MenuState::ColumnMenu { .. } => InputMode::ColumnMenu,
            MenuState::Editing(_) => InputMode::Editing,
        }
    }

    /// Column under the cursor.
    pub fn selected_column_id(&self) -> Option<String> {
        self.grid
            .column_order()
            .get(self.table_state.selected_column())
            .map(str::to_string)
    }

    /// Row index in the dataset under the cursor.
    pub fn selected_dataset_row(&self) -> Option<usize> {
        let position = self.table_state.selected_row()?;
        self.grid.cached_view().get(position).copied()
    }

    /// Rederives the view if needed and fits the cursor to it.
    fn sync_view(&mut self) {
        let ctx = self.grid.filter_context();
        let rows = self.grid.view(&ctx).len();
        let columns = self.grid.column_order().len();
        self.table_state.set_shape(rows, columns);
    }

    /// Keeps the cursor on `column_id` after it moved.
    fn follow_column(&mut self, column_id: &str) {
        if let Some(index) = self.grid.column_order().position(column_id) {
            self.table_state.select_column(index);
        }
    }

    fn run_action(&mut self, column_id: &str, action: HeaderAction) {
        self.grid.apply(column_id, action);
        if matches!(action, HeaderAction::MoveLeft | HeaderAction::MoveRight) {
            self.follow_column(column_id);
        }
    }

    /// Whether the last frame drew scroll placeholders that should now be replaced.
    pub fn needs_redraw(&self) -> bool {
        self.placeholder_shown && !self.table_state.is_scrolling(Instant::now())
    }

    fn key(&mut self, event: &KeyEvent) -> Option<AppEvent> {
        if event.kind == KeyEventKind::Release {
            return None;
        }
        self.debug.on_key(event);
        trace!(key = ?event.code, mode = ?self.input_mode(), "key");

        if event.modifiers.contains(KeyModifiers::CONTROL) && event.code == KeyCode::Char('c') {
            return Some(AppEvent::Exit);
        }

        let result = match self.input_mode() {
            InputMode::Help => {
                self.help_key(event);
                None
            }
            InputMode::Editing => {
                self.grid.editor_key(event);
                None
            }
            InputMode::ColumnMenu => {
                self.menu_key(event);
                None
            }
            InputMode::Normal => self.normal_key(event),
        };
        self.sync_view();
        result
    }

    fn help_key(&mut self, event: &KeyEvent) {
        match event.code {
            KeyCode::Esc | KeyCode::Char('?') | KeyCode::Char('q') => {
                self.show_help = false;
                self.help_scroll = 0;
            }
            KeyCode::Down | KeyCode::Char('j') => {
                self.help_scroll = self.help_scroll.saturating_add(1);
            }
            KeyCode::Up | KeyCode::Char('k') => {
                self.help_scroll = self.help_scroll.saturating_sub(1);
            }
            _ => {}
        }
    }

    fn menu_key(&mut self, event: &KeyEvent) {
        let Some(column) = self.grid.menu().column().map(str::to_string) else {
            return;
        };
        match event.code {
            KeyCode::Up | KeyCode::Char('k') | KeyCode::BackTab => self.grid.menu_prev(),
            KeyCode::Down | KeyCode::Char('j') | KeyCode::Tab => self.grid.menu_next(),
            KeyCode::Enter => {
                let action = self
                    .grid
                    .menu_selected()
                    .and_then(|i| self.grid.menu_items().get(i).copied())
                    .filter(|item| item.enabled)
                    .map(|item| item.action);
                if let Some(action) = action {
                    self.run_action(&column, action);
                }
            }
            KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('m') => self.grid.close_menu(),
            KeyCode::Char(c) => {
                let enabled = self
                    .grid
                    .menu_items()
                    .into_iter()
                    .find(|item| Some(item.action) == HeaderAction::from_shortcut(c))
                    .filter(|item| item.enabled);
                if let Some(item) = enabled {
                    self.run_action(&column, item.action);
                }
            }
            _ => {}
        }
    }

    fn normal_key(&mut self, event: &KeyEvent) -> Option<AppEvent> {
        let now = Instant::now();
        let column = self.selected_column_id();
        match event.code {
            KeyCode::Char('q') => return Some(AppEvent::Exit),
            KeyCode::Char('?') => self.show_help = true,
            KeyCode::Down | KeyCode::Char('j') => self.table_state.select_next(now),
            KeyCode::Up | KeyCode::Char('k') => self.table_state.select_previous(now),
            KeyCode::PageDown => self.table_state.page_down(now),
            KeyCode::PageUp => self.table_state.page_up(now),
            KeyCode::Home | KeyCode::Char('g') => self.table_state.scroll_to_start(now),
            KeyCode::End | KeyCode::Char('G') => self.table_state.scroll_to_end(now),
            KeyCode::Right | KeyCode::Char('l') => self.table_state.select_next_column(),
            KeyCode::Left | KeyCode::Char('h') => self.table_state.select_previous_column(),
            KeyCode::Char('R') => self.grid.reset_view(),
            KeyCode::Char('c') => {
                self.grid.clear_sort();
            }
            KeyCode::Enter | KeyCode::Char('m') => {
                if let Some(column) = column {
                    self.grid.open_menu(&column);
                }
            }
            KeyCode::Char('+') | KeyCode::Char('=') => {
                if let Some(column) = column {
                    self.grid.grow_column(&column);
                }
            }
            KeyCode::Char('-') => {
                if let Some(column) = column {
                    self.grid.shrink_column(&column);
                }
            }
            KeyCode::Char(c) => {
                if let (Some(action), Some(column)) = (HeaderAction::from_shortcut(c), column) {
                    self.run_action(&column, action);
                }
            }
            _ => {}
        }
        None
    }

    pub fn event(&mut self, event: &AppEvent) -> Option<AppEvent> {
        self.debug.num_events += 1;
        match event {
            AppEvent::Key(key) => self.key(key),
            AppEvent::Resize(_, _) => None,
            AppEvent::Exit | AppEvent::Crash(_) => None,
        }
    }

    fn render_help(&self, area: Rect, buf: &mut Buffer) {
        let popup = centered_rect(area, 60, 80);
        Clear.render(popup, buf);
        Paragraph::new(HELP_TEXT)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_type(BorderType::Rounded)
                    .border_style(Style::default().fg(self.color("modal_border")))
                    .title(" Help "),
            )
            .style(Style::default().fg(self.color("text_primary")))
            .wrap(Wrap { trim: false })
            .scroll((self.help_scroll, 0))
            .render(popup, buf);
    }

    fn render_popup(&self, area: Rect, buf: &mut Buffer) {
        match self.grid.menu() {
            MenuState::Closed => {}
            MenuState::ColumnMenu { column, selected } => {
                let items = self.grid.menu_items();
                let title = self
                    .grid
                    .columns()
                    .get(column)
                    .map(|c| c.title.as_str())
                    .unwrap_or(column.as_str());
                let menu = ColumnMenu::new(title, &items, *selected)
                    .with_colors(self.color("modal_border"), self.color("menu_disabled"));
                let (width, height) = menu.size();
                let rect = popup_below(self.table_state.header_area(column), width, height, area);
                menu.render(rect, buf);
            }
            MenuState::Editing(editor) => {
                let popup = FilterEditorPopup::new(editor).with_colors(
                    self.color("modal_border_active"),
                    self.color("modal_border_error"),
                    self.color("dimmed"),
                );
                let rect = popup_below(
                    self.table_state.header_area(editor.column_id()),
                    EDITOR_WIDTH,
                    popup.height(),
                    area,
                );
                popup.render(rect, buf);
            }
        }
    }
}

impl Widget for &mut App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        self.debug.num_frames += 1;

        Block::default()
            .style(Style::default().bg(self.color("background")))
            .render(area, buf);

        let mut constraints = vec![Constraint::Fill(1), Constraint::Length(1)];
        if self.debug.enabled {
            constraints.push(Constraint::Length(1));
        }
        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints(constraints)
            .split(area);
        let table_area = layout[0];

        let ctx = self.grid.filter_context();
        self.grid.view(&ctx);
        let placeholder = self.table_state.is_scrolling(Instant::now());
        self.placeholder_shown = placeholder;
        let headers = self.grid.header_affordances();
        let rows = self.grid.cached_view();

        DataTable::new(self.grid.dataset(), &headers, rows)
            .with_colors(
                self.theme.get("controls_bg"),
                self.theme.get("table_header"),
                self.theme.get("text_secondary"),
                self.theme.get("sort_indicator"),
                self.theme.get("filter_indicator"),
                self.theme.get("scroll_placeholder"),
            )
            .with_placeholder(placeholder)
            .render(table_area, buf, &mut self.table_state);

        let visible = rows.len();
        let total = self.grid.dataset().len();
        self.render_popup(table_area, buf);
        if self.show_help {
            self.render_help(table_area, buf);
        }

        let controls = Controls::with_row_count(visible, total)
            .with_active_filters(self.grid.filters().active_count())
            .with_dimmed(self.input_mode() != InputMode::Normal)
            .with_bg(self.color("controls_bg"));
        (&controls).render(layout[1], buf);

        if self.debug.enabled {
            self.debug.visible_rows = visible;
            self.debug.total_rows = total;
            self.debug.recomputes = self.grid.recompute_count();
            self.debug.menu = self.grid.menu().as_str();
            self.debug.render(layout[2], buf);
        }
    }
}

fn centered_rect(r: Rect, percent_x: u16, percent_y: u16) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
