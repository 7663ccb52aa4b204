use crossterm::event::{KeyCode, KeyEvent};
use thiserror::Error;

use crate::column::{ColumnDescriptor, ColumnType};
use crate::filter::{FilterCondition, FilterOperator, Literal, ValueKind};
use crate::widgets::text_input::{TextInput, TextInputEvent};

/// Why the editor refused to apply a condition. Shown inline under the value field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum FilterValidationError {
    #[error("Please enter a value")]
    MissingValue,
    #[error("Enter a whole number, e.g. 7")]
    InvalidCount,
    #[error("Enter a date as YYYY-MM-DD")]
    InvalidDate,
    #[error("Enter a fiscal year, e.g. 2025")]
    InvalidYear,
    #[error("Enter a fiscal period from 1 to 4")]
    InvalidPeriod,
    #[error("Enter a period and year as P/YYYY, e.g. 2/2025")]
    InvalidPeriodAndYear,
}

/// Checks a condition before it is written into the filter map.
pub fn validate(condition: &FilterCondition) -> Result<(), FilterValidationError> {
    let kind = condition.operator.value_kind();
    if kind == ValueKind::None {
        return Ok(());
    }
    if condition.value.trim().is_empty() {
        return Err(FilterValidationError::MissingValue);
    }
    if Literal::parse(kind, &condition.value).is_valid() {
        return Ok(());
    }
    Err(match kind {
        ValueKind::Count => FilterValidationError::InvalidCount,
        ValueKind::Date => FilterValidationError::InvalidDate,
        ValueKind::FiscalYear => FilterValidationError::InvalidYear,
        ValueKind::FiscalPeriod => FilterValidationError::InvalidPeriod,
        ValueKind::FiscalPeriodAndYear => FilterValidationError::InvalidPeriodAndYear,
        // Text and numeric literals are not checked here; bad numbers exclude rows
        ValueKind::None | ValueKind::Text | ValueKind::Number => return Ok(()),
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorEvent {
    None,
    Commit,
    Cancel,
}

/// Operator picker plus value field for one column's condition.
pub struct FilterEditor {
    column_id: String,
    column_title: String,
    column_type: ColumnType,
    operators: Vec<FilterOperator>,
    selected: usize,
    input: TextInput,
    error: Option<FilterValidationError>,
}

impl FilterEditor {
    /// Opens on `existing` when the column already has a condition, else on the type's default.
    pub fn open(column: &ColumnDescriptor, existing: Option<&FilterCondition>) -> Self {
        let mut operators = FilterOperator::for_column_type(column.column_type);
        let operator = existing
            .map(|c| c.operator)
            .unwrap_or_else(|| FilterOperator::default_for(column.column_type));
        let selected = match operators.iter().position(|op| *op == operator) {
            Some(index) => index,
            None => {
                operators.insert(0, operator);
                0
            }
        };

        let mut input = TextInput::new();
        if let Some(condition) = existing {
            input.set_value(&condition.value);
        }
        input.set_focused(true);

        Self {
            column_id: column.id.clone(),
            column_title: column.title.clone(),
            column_type: column.column_type,
            operators,
            selected,
            input,
            error: None,
        }
    }

    pub fn column_id(&self) -> &str {
        &self.column_id
    }

    pub fn column_title(&self) -> &str {
        &self.column_title
    }

    pub fn column_type(&self) -> ColumnType {
        self.column_type
    }

    pub fn operators(&self) -> &[FilterOperator] {
        &self.operators
    }

    pub fn selected_index(&self) -> usize {
        self.selected
    }

    pub fn operator(&self) -> FilterOperator {
        self.operators[self.selected]
    }

    pub fn value(&self) -> &str {
        self.input.value()
    }

    pub fn set_value(&mut self, value: &str) {
        self.input.set_value(value);
        self.error = None;
    }

    pub fn input(&self) -> &TextInput {
        &self.input
    }

    pub fn error(&self) -> Option<FilterValidationError> {
        self.error
    }

    /// Whether the value field is shown for the selected operator.
    pub fn needs_value(&self) -> bool {
        self.operator().requires_value()
    }

    pub fn next_operator(&mut self) {
        self.selected = (self.selected + 1) % self.operators.len();
        self.error = None;
    }

    pub fn prev_operator(&mut self) {
        self.selected = (self.selected + self.operators.len() - 1) % self.operators.len();
        self.error = None;
    }

    pub fn select_operator(&mut self, operator: FilterOperator) -> bool {
        match self.operators.iter().position(|op| *op == operator) {
            Some(index) => {
                self.selected = index;
                self.error = None;
                true
            }
            None => false,
        }
    }

    pub fn handle_key(&mut self, event: &KeyEvent) -> EditorEvent {
        match event.code {
            KeyCode::Tab | KeyCode::Down => {
                self.next_operator();
                EditorEvent::None
            }
            KeyCode::BackTab | KeyCode::Up => {
                self.prev_operator();
                EditorEvent::None
            }
            _ => match self.input.handle_key(event) {
                TextInputEvent::Submit => EditorEvent::Commit,
                TextInputEvent::Cancel => EditorEvent::Cancel,
                TextInputEvent::Changed => {
                    self.error = None;
                    EditorEvent::None
                }
                TextInputEvent::None => EditorEvent::None,
            },
        }
    }

    /// Condition as currently edited. Operators without a value store an empty one.
    pub fn condition(&self) -> FilterCondition {
        let operator = self.operator();
        if operator.requires_value() {
            FilterCondition::new(operator, self.input.value())
        } else {
            FilterCondition::without_value(operator)
        }
    }

    /// Validated condition, or the error that now shows inline.
    pub fn commit(&mut self) -> Result<FilterCondition, FilterValidationError> {
        let condition = self.condition();
        match validate(&condition) {
            Ok(()) => {
                self.error = None;
                Ok(condition)
            }
            Err(e) => {
                self.error = Some(e);
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyModifiers;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_defaults_by_column_type() {
        let date = FilterEditor::open(&ColumnDescriptor::date("createdOn", "Created On"), None);
        assert_eq!(date.operator(), FilterOperator::On);
        assert_eq!(date.value(), "");
        let text = FilterEditor::open(&ColumnDescriptor::text("name", "Name"), None);
        assert_eq!(text.operator(), FilterOperator::Equals);
        let numeric = FilterEditor::open(&ColumnDescriptor::numeric("qty", "Qty"), None);
        assert_eq!(numeric.operator(), FilterOperator::Equals);
        assert!(numeric.operators().contains(&FilterOperator::LessThan));
    }

    #[test]
    fn test_prepopulates_existing_condition() {
        let existing = FilterCondition::new(FilterOperator::GreaterThan, "100");
        let editor = FilterEditor::open(&ColumnDescriptor::numeric("qty", "Qty"), Some(&existing));
        assert_eq!(editor.operator(), FilterOperator::GreaterThan);
        assert_eq!(editor.value(), "100");
        assert_eq!(editor.condition(), existing);
    }

    #[test]
    fn test_prepopulates_operator_outside_menu() {
        let existing = FilterCondition::new(FilterOperator::Unrecognized, "");
        let editor = FilterEditor::open(&ColumnDescriptor::text("name", "Name"), Some(&existing));
        assert_eq!(editor.operator(), FilterOperator::Unrecognized);
        assert_eq!(editor.selected_index(), 0);
    }

    #[test]
    fn test_empty_value_is_rejected_inline() {
        let mut editor = FilterEditor::open(&ColumnDescriptor::text("name", "Name"), None);
        editor.set_value("   ");
        assert_eq!(editor.commit(), Err(FilterValidationError::MissingValue));
        assert_eq!(
            editor.error().map(|e| e.to_string()),
            Some("Please enter a value".to_string())
        );
        editor.handle_key(&key(KeyCode::Char('x')));
        assert_eq!(editor.error(), None);
    }

    #[test]
    fn test_valueless_operator_commits_without_value() {
        let mut editor = FilterEditor::open(&ColumnDescriptor::date("createdOn", "Created On"), None);
        editor.set_value("leftover");
        assert!(editor.select_operator(FilterOperator::Today));
        assert!(!editor.needs_value());
        assert_eq!(
            editor.commit(),
            Ok(FilterCondition::without_value(FilterOperator::Today))
        );
    }

    #[test]
    fn test_count_and_date_validation() {
        let mut editor = FilterEditor::open(&ColumnDescriptor::date("createdOn", "Created On"), None);
        editor.set_value("09/09/2025");
        assert_eq!(editor.commit(), Err(FilterValidationError::InvalidDate));
        editor.set_value("2025-09-09");
        assert!(editor.commit().is_ok());

        editor.select_operator(FilterOperator::LastXDays);
        editor.set_value("a week");
        assert_eq!(editor.commit(), Err(FilterValidationError::InvalidCount));
        editor.set_value("7");
        assert!(editor.commit().is_ok());

        editor.select_operator(FilterOperator::InFiscalPeriodAndYear);
        editor.set_value("5/2025");
        assert_eq!(
            editor.commit(),
            Err(FilterValidationError::InvalidPeriodAndYear)
        );
    }

    #[test]
    fn test_operator_cycling_wraps() {
        let mut editor = FilterEditor::open(&ColumnDescriptor::text("name", "Name"), None);
        let count = editor.operators().len();
        editor.prev_operator();
        assert_eq!(editor.selected_index(), count - 1);
        editor.handle_key(&key(KeyCode::Tab));
        assert_eq!(editor.selected_index(), 0);
        editor.handle_key(&KeyEvent::new(KeyCode::BackTab, KeyModifiers::SHIFT));
        assert_eq!(editor.selected_index(), count - 1);
    }

    #[test]
    fn test_enter_and_esc_map_to_commit_and_cancel() {
        let mut editor = FilterEditor::open(&ColumnDescriptor::text("name", "Name"), None);
        assert_eq!(editor.handle_key(&key(KeyCode::Enter)), EditorEvent::Commit);
        assert_eq!(editor.handle_key(&key(KeyCode::Esc)), EditorEvent::Cancel);
    }

    #[test]
    fn test_numeric_literal_is_not_validated() {
        let condition = FilterCondition::new(FilterOperator::GreaterThan, "ten");
        assert_eq!(validate(&condition), Ok(()));
    }
}
