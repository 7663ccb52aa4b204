//! Visible row derivation: filter, then sort, producing indices into the dataset.

use chrono::{NaiveDate, NaiveDateTime, Timelike};
use tracing::debug;

use crate::dataset::Dataset;
use crate::filter::{ColumnFilters, FilterContext, Predicate};
use crate::sort::{sort_keyed, SortKey, SortSpec};
use crate::temporal::FiscalCalendar;

/// Indices of the rows that pass every active filter, in display order.
///
/// Filters on columns the dataset does not have are ignored. Without a sort
/// the dataset order is kept.
pub fn derive_view(
    dataset: &Dataset,
    filters: &ColumnFilters,
    sort: Option<&SortSpec>,
    ctx: &FilterContext,
) -> Vec<usize> {
    let columns = dataset.columns();
    let predicates: Vec<(usize, Predicate)> = filters
        .active()
        .filter_map(|(id, condition)| {
            let index = columns.position(id)?;
            let column = columns.get_index(index)?;
            Some((index, Predicate::new(column.column_type, condition)))
        })
        .collect();

    let rows = dataset.rows();
    let visible = rows.iter().enumerate().filter(|(_, row)| {
        predicates
            .iter()
            .all(|(col, predicate)| predicate.evaluate(row.cell(*col), ctx))
    });

    let Some((spec, col)) = sort.and_then(|s| columns.position(&s.column).map(|col| (s, col)))
    else {
        return visible.map(|(i, _)| i).collect();
    };
    let column_type = columns
        .get_index(col)
        .map(|c| c.column_type)
        .unwrap_or(crate::column::ColumnType::Text);

    let mut keyed: Vec<(usize, SortKey)> = visible
        .map(|(i, row)| (i, SortKey::new(column_type, row.cell(col))))
        .collect();
    sort_keyed(&mut keyed, spec.direction);
    keyed.into_iter().map(|(i, _)| i).collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ViewKey {
    rows_id: usize,
    row_count: usize,
    filters_revision: u64,
    sort_revision: u64,
    today: NaiveDate,
    clock: Option<NaiveDateTime>,
    fiscal: FiscalCalendar,
}

/// Memoized [`derive_view`] result.
///
/// The cached rows are reused until the dataset, a revision counter, the
/// calendar date or the fiscal calendar changes. Filters with hour or minute
/// windows also key on the current minute.
#[derive(Debug, Default)]
pub struct ViewCache {
    key: Option<ViewKey>,
    rows: Vec<usize>,
    recomputes: u64,
}

impl ViewCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rows(
        &mut self,
        dataset: &Dataset,
        filters: &ColumnFilters,
        filters_revision: u64,
        sort: Option<&SortSpec>,
        sort_revision: u64,
        ctx: &FilterContext,
    ) -> &[usize] {
        let clock = filters
            .active()
            .any(|(_, c)| c.operator.is_clock_window())
            .then(|| {
                ctx.now
                    .with_second(0)
                    .and_then(|t| t.with_nanosecond(0))
                    .unwrap_or(ctx.now)
            });
        let key = ViewKey {
            rows_id: dataset.rows_id(),
            row_count: dataset.len(),
            filters_revision,
            sort_revision,
            today: ctx.today(),
            clock,
            fiscal: ctx.fiscal,
        };
        if self.key != Some(key) {
            self.rows = derive_view(dataset, filters, sort, ctx);
            self.key = Some(key);
            self.recomputes += 1;
            debug!(
                visible = self.rows.len(),
                total = dataset.len(),
                "view recomputed"
            );
        }
        &self.rows
    }

    /// Last derived rows without checking whether they are current.
    pub fn cached(&self) -> &[usize] {
        &self.rows
    }

    pub fn invalidate(&mut self) {
        self.key = None;
    }

    pub fn recompute_count(&self) -> u64 {
        self.recomputes
    }
}
