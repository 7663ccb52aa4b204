use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

use crate::column::ColumnSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveDirection {
    Left,
    Right,
}

impl MoveDirection {
    pub fn offset(&self) -> isize {
        match self {
            MoveDirection::Left => -1,
            MoveDirection::Right => 1,
        }
    }

    pub fn opposite(&self) -> Self {
        match self {
            MoveDirection::Left => MoveDirection::Right,
            MoveDirection::Right => MoveDirection::Left,
        }
    }
}

/// Left-to-right display order of column ids.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ColumnOrder {
    ids: Vec<String>,
}

impl ColumnOrder {
    pub fn new(ids: Vec<String>) -> Self {
        Self { ids }
    }

    pub fn default_for(columns: &ColumnSet) -> Self {
        Self::new(columns.ids())
    }

    /// Uses `persisted` when it still names exactly the table's columns, else the default order.
    pub fn reconcile(persisted: Option<ColumnOrder>, columns: &ColumnSet) -> Self {
        match persisted {
            Some(order) if order.is_permutation_of(columns) => order,
            _ => Self::default_for(columns),
        }
    }

    pub fn ids(&self) -> &[String] {
        &self.ids
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.ids.get(index).map(String::as_str)
    }

    pub fn position(&self, column_id: &str) -> Option<usize> {
        self.ids.iter().position(|id| id == column_id)
    }

    pub fn is_permutation_of(&self, columns: &ColumnSet) -> bool {
        if self.ids.len() != columns.len() {
            return false;
        }
        let unique: HashSet<&str> = self.ids.iter().map(String::as_str).collect();
        unique.len() == self.ids.len() && self.ids.iter().all(|id| columns.get(id).is_some())
    }

    pub fn can_move(&self, column_id: &str, direction: MoveDirection) -> bool {
        self.target_index(column_id, direction).is_some()
    }

    fn target_index(&self, column_id: &str, direction: MoveDirection) -> Option<(usize, usize)> {
        let from = self.position(column_id)?;
        let to = from.checked_add_signed(direction.offset())?;
        (to < self.ids.len()).then_some((from, to))
    }

    /// Order with `column_id` swapped with its neighbour. Boundary moves and unknown ids return
    /// the order unchanged.
    pub fn moved(&self, column_id: &str, direction: MoveDirection) -> Self {
        let mut next = self.clone();
        if let Some((from, to)) = self.target_index(column_id, direction) {
            next.ids.swap(from, to);
        }
        next
    }
}

pub fn move_column(order: &ColumnOrder, column_id: &str, direction: MoveDirection) -> ColumnOrder {
    order.moved(column_id, direction)
}

/// Session column widths, clamped to the configured bounds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnWidths {
    widths: HashMap<String, u16>,
    min: u16,
    max: u16,
}

impl ColumnWidths {
    pub fn new(columns: &ColumnSet, min: u16, max: u16) -> Self {
        let max = max.max(min);
        let widths = columns
            .iter()
            .map(|c| (c.id.clone(), c.width.clamp(min, max)))
            .collect();
        Self { widths, min, max }
    }

    pub fn get(&self, column_id: &str) -> u16 {
        self.widths.get(column_id).copied().unwrap_or(self.min)
    }

    /// Adjusts a column's width by `delta` cells. Returns the new width.
    pub fn resize(&mut self, column_id: &str, delta: i32) -> Option<u16> {
        let width = self.widths.get_mut(column_id)?;
        let next = (*width as i32 + delta).clamp(self.min as i32, self.max as i32);
        *width = next as u16;
        Some(*width)
    }

    pub fn grow(&mut self, column_id: &str) -> Option<u16> {
        self.resize(column_id, 1)
    }

    pub fn shrink(&mut self, column_id: &str) -> Option<u16> {
        self.resize(column_id, -1)
    }
}
