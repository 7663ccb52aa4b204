//! View state of one grid screen: sort, filters, column layout and the open menu.

use crossterm::event::KeyEvent;
use tracing::debug;

use crate::column::{ColumnDescriptor, ColumnSet};
use crate::dataset::Dataset;
use crate::filter::{ColumnFilters, FilterCondition, FilterContext};
use crate::filter_editor::{EditorEvent, FilterEditor, FilterValidationError};
use crate::header::{HeaderAction, HeaderAffordance, MenuItem};
use crate::layout::{ColumnOrder, ColumnWidths, MoveDirection};
use crate::sort::{SortDirection, SortSpec};
use crate::store::ViewPersistence;
use crate::temporal::FiscalCalendar;
use crate::view::ViewCache;

/// Which popup is open. At most one at a time.
pub enum MenuState {
    Closed,
    ColumnMenu { column: String, selected: usize },
    Editing(FilterEditor),
}

impl MenuState {
    pub fn is_closed(&self) -> bool {
        matches!(self, MenuState::Closed)
    }

    /// Column the open menu or editor belongs to.
    pub fn column(&self) -> Option<&str> {
        match self {
            MenuState::Closed => None,
            MenuState::ColumnMenu { column, .. } => Some(column),
            MenuState::Editing(editor) => Some(editor.column_id()),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MenuState::Closed => "closed",
            MenuState::ColumnMenu { .. } => "column-menu",
            MenuState::Editing(_) => "editing",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridOptions {
    pub fiscal: FiscalCalendar,
    pub min_column_width: u16,
    pub max_column_width: u16,
    /// Start from the default view instead of persisted state.
    pub reset_view: bool,
}

impl Default for GridOptions {
    fn default() -> Self {
        Self {
            fiscal: FiscalCalendar::default(),
            min_column_width: 4,
            max_column_width: 60,
            reset_view: false,
        }
    }
}

pub struct GridState {
    dataset: Dataset,
    filters: ColumnFilters,
    filters_revision: u64,
    sort: Option<SortSpec>,
    sort_revision: u64,
    order: ColumnOrder,
    widths: ColumnWidths,
    menu: MenuState,
    persistence: Option<ViewPersistence>,
    fiscal: FiscalCalendar,
    cache: ViewCache,
}

impl GridState {
    pub fn new(
        dataset: Dataset,
        persistence: Option<ViewPersistence>,
        options: GridOptions,
    ) -> Self {
        let columns = dataset.columns();
        let persisted = match (&persistence, options.reset_view) {
            (Some(p), false) => p.load(),
            _ => Default::default(),
        };
        let sort = persisted
            .sort
            .filter(|spec| columns.get(&spec.column).is_some());
        let order = ColumnOrder::reconcile(persisted.column_order, columns);
        let widths = ColumnWidths::new(
            columns,
            options.min_column_width,
            options.max_column_width,
        );
        debug!(
            columns = columns.len(),
            rows = dataset.len(),
            filters = persisted.filters.active_count(),
            sorted = sort.is_some(),
            "grid mounted"
        );

        Self {
            filters: persisted.filters,
            filters_revision: 0,
            sort,
            sort_revision: 0,
            order,
            widths,
            menu: MenuState::Closed,
            persistence,
            fiscal: options.fiscal,
            cache: ViewCache::new(),
            dataset,
        }
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    pub fn columns(&self) -> &ColumnSet {
        self.dataset.columns()
    }

    pub fn filters(&self) -> &ColumnFilters {
        &self.filters
    }

    pub fn sort(&self) -> Option<&SortSpec> {
        self.sort.as_ref()
    }

    pub fn column_order(&self) -> &ColumnOrder {
        &self.order
    }

    pub fn widths(&self) -> &ColumnWidths {
        &self.widths
    }

    pub fn menu(&self) -> &MenuState {
        &self.menu
    }

    pub fn fiscal(&self) -> FiscalCalendar {
        self.fiscal
    }

    pub fn filter_context(&self) -> FilterContext {
        FilterContext::now(self.fiscal)
    }

    /// Visible row indices for `ctx`, recomputed only when an input changed.
    pub fn view(&mut self, ctx: &FilterContext) -> &[usize] {
        self.cache.rows(
            &self.dataset,
            &self.filters,
            self.filters_revision,
            self.sort.as_ref(),
            self.sort_revision,
            ctx,
        )
    }

    /// Visible rows as of the last [`GridState::view`] call.
    pub fn cached_view(&self) -> &[usize] {
        self.cache.cached()
    }

    pub fn recompute_count(&self) -> u64 {
        self.cache.recompute_count()
    }

    /// Columns in display order.
    pub fn ordered_columns(&self) -> impl Iterator<Item = &ColumnDescriptor> {
        self.order
            .ids()
            .iter()
            .filter_map(|id| self.dataset.columns().get(id))
    }

    pub fn header(&self, column_id: &str) -> Option<HeaderAffordance> {
        let column = self.columns().get(column_id)?;
        Some(HeaderAffordance {
            column_id: column.id.clone(),
            title: column.title.clone(),
            column_type: column.column_type,
            width: self.widths.get(column_id),
            sort: self
                .sort
                .as_ref()
                .filter(|s| s.column == column_id)
                .map(|s| s.direction),
            filtered: self.filters.is_filtered(column_id),
            can_move_left: self.order.can_move(column_id, MoveDirection::Left),
            can_move_right: self.order.can_move(column_id, MoveDirection::Right),
        })
    }

    /// One affordance per column, in display order.
    pub fn header_affordances(&self) -> Vec<HeaderAffordance> {
        self.order
            .ids()
            .iter()
            .filter_map(|id| self.header(id))
            .collect()
    }

    fn has_column(&self, column_id: &str) -> bool {
        self.columns().get(column_id).is_some()
    }

    fn persist_sort(&self) {
        if let Some(p) = &self.persistence {
            p.save_sort(self.sort.as_ref());
        }
    }

    fn persist_filters(&self) {
        if let Some(p) = &self.persistence {
            p.save_filters(&self.filters);
        }
    }

    fn persist_order(&self) {
        if let Some(p) = &self.persistence {
            p.save_column_order(&self.order);
        }
    }

    pub fn sort_by(&mut self, column_id: &str, direction: SortDirection) -> bool {
        if !self.has_column(column_id) {
            return false;
        }
        let spec = SortSpec::new(column_id, direction);
        if self.sort.as_ref() == Some(&spec) {
            return false;
        }
        debug!(column = column_id, direction = direction.as_str(), "sort set");
        self.sort = Some(spec);
        self.sort_revision += 1;
        self.persist_sort();
        true
    }

    pub fn clear_sort(&mut self) -> bool {
        if self.sort.take().is_none() {
            return false;
        }
        debug!("sort cleared");
        self.sort_revision += 1;
        self.persist_sort();
        true
    }

    pub fn set_filter(&mut self, column_id: &str, condition: FilterCondition) -> bool {
        if !self.has_column(column_id) {
            return false;
        }
        debug!(column = column_id, filter = %condition.summary(), "filter set");
        self.filters.set(column_id, condition);
        self.filters_revision += 1;
        self.persist_filters();
        true
    }

    pub fn clear_filter(&mut self, column_id: &str) -> bool {
        if !self.filters.clear(column_id) {
            return false;
        }
        debug!(column = column_id, "filter cleared");
        self.filters_revision += 1;
        self.persist_filters();
        true
    }

    pub fn move_column(&mut self, column_id: &str, direction: MoveDirection) -> bool {
        if !self.order.can_move(column_id, direction) {
            return false;
        }
        self.order = self.order.moved(column_id, direction);
        debug!(column = column_id, order = ?self.order.ids(), "column moved");
        self.persist_order();
        true
    }

    pub fn grow_column(&mut self, column_id: &str) -> Option<u16> {
        self.widths.grow(column_id)
    }

    pub fn shrink_column(&mut self, column_id: &str) -> Option<u16> {
        self.widths.shrink(column_id)
    }

    /// Drops sort, filters and custom order, and stores the defaults.
    pub fn reset_view(&mut self) {
        self.sort = None;
        self.sort_revision += 1;
        self.filters = ColumnFilters::new();
        self.filters_revision += 1;
        self.order = ColumnOrder::default_for(self.dataset.columns());
        self.menu = MenuState::Closed;
        debug!("view reset");
        self.persist_sort();
        self.persist_filters();
        self.persist_order();
    }

    /// Runs a column menu action. Any open column menu closes; `Filter` opens the editor.
    pub fn apply(&mut self, column_id: &str, action: HeaderAction) -> bool {
        if matches!(self.menu, MenuState::ColumnMenu { .. }) {
            self.menu = MenuState::Closed;
        }
        match action {
            HeaderAction::SortAscending => self.sort_by(column_id, SortDirection::Ascending),
            HeaderAction::SortDescending => self.sort_by(column_id, SortDirection::Descending),
            HeaderAction::ClearSort => {
                let sorted_here = self.sort.as_ref().is_some_and(|s| s.column == column_id);
                sorted_here && self.clear_sort()
            }
            HeaderAction::Filter => self.open_filter_editor(column_id),
            HeaderAction::ClearFilter => self.clear_filter(column_id),
            HeaderAction::MoveLeft => self.move_column(column_id, MoveDirection::Left),
            HeaderAction::MoveRight => self.move_column(column_id, MoveDirection::Right),
        }
    }

    /// Opens the column menu, replacing whatever was open.
    pub fn open_menu(&mut self, column_id: &str) -> bool {
        let Some(header) = self.header(column_id) else {
            return false;
        };
        let selected = header
            .menu_items()
            .iter()
            .position(|item| item.enabled)
            .unwrap_or(0);
        debug!(column = column_id, from = self.menu.as_str(), "column menu opened");
        self.menu = MenuState::ColumnMenu {
            column: column_id.to_string(),
            selected,
        };
        true
    }

    /// Items of the open column menu.
    pub fn menu_items(&self) -> Vec<MenuItem> {
        match &self.menu {
            MenuState::ColumnMenu { column, .. } => self
                .header(column)
                .map(|h| h.menu_items())
                .unwrap_or_default(),
            _ => Vec::new(),
        }
    }

    pub fn menu_selected(&self) -> Option<usize> {
        match &self.menu {
            MenuState::ColumnMenu { selected, .. } => Some(*selected),
            _ => None,
        }
    }

    fn step_menu(&mut self, forward: bool) {
        let items = self.menu_items();
        let MenuState::ColumnMenu { selected, .. } = &mut self.menu else {
            return;
        };
        let len = items.len();
        if len == 0 {
            return;
        }
        let mut next = *selected;
        for _ in 0..len {
            next = if forward {
                (next + 1) % len
            } else {
                (next + len - 1) % len
            };
            if items[next].enabled {
                *selected = next;
                return;
            }
        }
    }

    /// Moves the menu highlight down, skipping disabled items.
    pub fn menu_next(&mut self) {
        self.step_menu(true);
    }

    pub fn menu_prev(&mut self) {
        self.step_menu(false);
    }

    /// Runs the highlighted menu item. Disabled items do nothing and keep the menu open.
    pub fn activate_menu(&mut self) -> bool {
        let MenuState::ColumnMenu { column, selected } = &self.menu else {
            return false;
        };
        let column = column.clone();
        let selected = *selected;
        match self.menu_items().get(selected) {
            Some(item) if item.enabled => self.apply(&column, item.action),
            _ => false,
        }
    }

    pub fn close_menu(&mut self) {
        if !self.menu.is_closed() {
            debug!(from = self.menu.as_str(), "menu closed");
        }
        self.menu = MenuState::Closed;
    }

    /// Opens the filter editor on the column's current condition, replacing whatever was open.
    pub fn open_filter_editor(&mut self, column_id: &str) -> bool {
        let Some(column) = self.columns().get(column_id) else {
            return false;
        };
        let editor = FilterEditor::open(column, self.filters.get(column_id));
        debug!(
            column = column_id,
            operator = editor.operator().as_str(),
            "filter editor opened"
        );
        self.menu = MenuState::Editing(editor);
        true
    }

    pub fn editor(&self) -> Option<&FilterEditor> {
        match &self.menu {
            MenuState::Editing(editor) => Some(editor),
            _ => None,
        }
    }

    pub fn editor_mut(&mut self) -> Option<&mut FilterEditor> {
        match &mut self.menu {
            MenuState::Editing(editor) => Some(editor),
            _ => None,
        }
    }

    /// Applies the edited condition and closes the editor. On a validation error the
    /// editor stays open showing it.
    pub fn commit_edit(&mut self) -> Result<(), FilterValidationError> {
        let Some(editor) = self.editor_mut() else {
            return Ok(());
        };
        let condition = editor.commit()?;
        let column = editor.column_id().to_string();
        self.menu = MenuState::Closed;
        self.set_filter(&column, condition);
        Ok(())
    }

    pub fn cancel_edit(&mut self) {
        if let MenuState::Editing(editor) = &self.menu {
            debug!(column = editor.column_id(), "filter edit cancelled");
            self.menu = MenuState::Closed;
        }
    }

    /// Feeds a key to the open editor.
    pub fn editor_key(&mut self, event: &KeyEvent) -> EditorEvent {
        let Some(editor) = self.editor_mut() else {
            return EditorEvent::None;
        };
        let outcome = editor.handle_key(event);
        match outcome {
            EditorEvent::Commit => {
                if self.commit_edit().is_err() {
                    return EditorEvent::None;
                }
            }
            EditorEvent::Cancel => self.cancel_edit(),
            EditorEvent::None => {}
        }
        outcome
    }
}
