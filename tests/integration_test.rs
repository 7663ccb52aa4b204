use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use gridview::filter::{FilterCondition, FilterOperator};
use gridview::sort::SortSpec;
use gridview::{App, AppConfig, AppEvent, Dataset, GridOptions, GridState, InputMode, Theme};
use ratatui::backend::TestBackend;
use ratatui::Terminal;
use std::sync::mpsc;

fn app() -> App {
    let (tx, _rx) = mpsc::channel();
    let grid = GridState::new(Dataset::demo(), None, GridOptions::default());
    App::new(tx, grid, Theme::default(), &AppConfig::default())
}

fn press(app: &mut App, code: KeyCode) -> Option<AppEvent> {
    app.event(&AppEvent::Key(KeyEvent::new(code, KeyModifiers::NONE)))
}

fn type_text(app: &mut App, text: &str) {
    for c in text.chars() {
        press(app, KeyCode::Char(c));
    }
}

fn select_column(app: &mut App, column: &str) {
    let index = app.grid().column_order().position(column).unwrap();
    for _ in 0..index {
        press(app, KeyCode::Right);
    }
    assert_eq!(app.selected_column_id().as_deref(), Some(column));
}

fn draw(app: &mut App) -> String {
    let mut terminal = Terminal::new(TestBackend::new(140, 30)).unwrap();
    terminal
        .draw(|frame| frame.render_widget(&mut *app, frame.area()))
        .unwrap();
    terminal
        .backend()
        .buffer()
        .content()
        .iter()
        .map(|cell| cell.symbol())
        .collect()
}

#[test]
fn test_app_creation() {
    let app = app();
    assert_eq!(app.input_mode(), InputMode::Normal);
    assert_eq!(app.selected_column_id().as_deref(), Some("name"));
    assert_eq!(app.selected_dataset_row(), Some(0));
}

#[test]
fn test_sort_shortcuts() {
    let mut app = app();
    press(&mut app, KeyCode::Char('s'));
    assert_eq!(app.grid().sort(), Some(&SortSpec::ascending("name")));
    press(&mut app, KeyCode::Char('S'));
    assert_eq!(app.grid().sort(), Some(&SortSpec::descending("name")));
    // First row of a descending name sort is an HVAC line.
    let row = app.selected_dataset_row().unwrap();
    assert_eq!(app.grid().dataset().value(row, "name"), Some("HVAC - Ceiling"));
    press(&mut app, KeyCode::Char('c'));
    assert_eq!(app.grid().sort(), None);
}

#[test]
fn test_column_menu_flow() {
    let mut app = app();
    press(&mut app, KeyCode::Enter);
    assert_eq!(app.input_mode(), InputMode::ColumnMenu);
    let screen = draw(&mut app);
    assert!(screen.contains("Sort A to Z"));
    assert!(screen.contains("Move right"));

    press(&mut app, KeyCode::Down);
    press(&mut app, KeyCode::Enter);
    assert_eq!(app.input_mode(), InputMode::Normal);
    assert_eq!(app.grid().sort(), Some(&SortSpec::descending("name")));

    press(&mut app, KeyCode::Char('m'));
    assert_eq!(app.input_mode(), InputMode::ColumnMenu);
    press(&mut app, KeyCode::Esc);
    assert_eq!(app.input_mode(), InputMode::Normal);
}

#[test]
fn test_filter_from_keyboard() {
    let mut app = app();
    select_column(&mut app, "lineStatus");
    press(&mut app, KeyCode::Char('f'));
    assert_eq!(app.input_mode(), InputMode::Editing);
    assert!(draw(&mut app).contains("Line Status"));

    type_text(&mut app, "used");
    press(&mut app, KeyCode::Enter);
    assert_eq!(app.input_mode(), InputMode::Normal);
    assert_eq!(
        app.grid().filters().get("lineStatus"),
        Some(&FilterCondition::new(FilterOperator::Equals, "used"))
    );
    assert_eq!(app.grid().cached_view().len(), 30);
    assert!(draw(&mut app).contains("Rows: 30 of 120"));

    press(&mut app, KeyCode::Char('x'));
    assert!(app.grid().filters().is_empty());
    assert_eq!(app.grid().cached_view().len(), 120);
}

#[test]
fn test_empty_value_keeps_editor_open() {
    let mut app = app();
    press(&mut app, KeyCode::Char('f'));
    press(&mut app, KeyCode::Enter);
    assert_eq!(app.input_mode(), InputMode::Editing);
    assert!(draw(&mut app).contains("Please enter a value"));
    press(&mut app, KeyCode::Esc);
    assert_eq!(app.input_mode(), InputMode::Normal);
    assert!(app.grid().filters().is_empty());
}

#[test]
fn test_move_column_keeps_cursor_on_it() {
    let mut app = app();
    press(&mut app, KeyCode::Char('>'));
    assert_eq!(app.grid().column_order().position("name"), Some(1));
    assert_eq!(app.selected_column_id().as_deref(), Some("name"));
    press(&mut app, KeyCode::Char('<'));
    press(&mut app, KeyCode::Char('<'));
    assert_eq!(app.grid().column_order().position("name"), Some(0));
}

#[test]
fn test_resize_and_reset() {
    let mut app = app();
    let width = app.grid().widths().get("name");
    press(&mut app, KeyCode::Char('+'));
    assert_eq!(app.grid().widths().get("name"), width + 1);
    press(&mut app, KeyCode::Char('-'));
    press(&mut app, KeyCode::Char('-'));
    assert_eq!(app.grid().widths().get("name"), width - 1);

    press(&mut app, KeyCode::Char('s'));
    press(&mut app, KeyCode::Char('>'));
    press(&mut app, KeyCode::Char('R'));
    assert_eq!(app.grid().sort(), None);
    assert_eq!(app.grid().column_order().get(0), Some("name"));
}

#[test]
fn test_help_and_quit() {
    let mut app = app();
    press(&mut app, KeyCode::Char('?'));
    assert_eq!(app.input_mode(), InputMode::Help);
    assert!(draw(&mut app).contains("Open column menu"));
    // Keys do not reach the table while help is open.
    assert!(press(&mut app, KeyCode::Char('q')).is_none());
    assert_eq!(app.input_mode(), InputMode::Normal);
    assert!(matches!(
        press(&mut app, KeyCode::Char('q')),
        Some(AppEvent::Exit)
    ));
    let ctrl_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
    assert!(matches!(app.event(&AppEvent::Key(ctrl_c)), Some(AppEvent::Exit)));
}

#[test]
fn test_row_navigation() {
    let mut app = app();
    draw(&mut app);
    press(&mut app, KeyCode::Down);
    press(&mut app, KeyCode::Down);
    assert_eq!(app.selected_dataset_row(), Some(2));
    press(&mut app, KeyCode::End);
    assert_eq!(app.selected_dataset_row(), Some(119));
    press(&mut app, KeyCode::Home);
    assert_eq!(app.selected_dataset_row(), Some(0));
}
