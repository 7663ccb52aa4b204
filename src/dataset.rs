use color_eyre::eyre::eyre;
use color_eyre::Result;
use polars::prelude::*;
use std::fs::File;
use std::path::Path;
use std::sync::Arc;

use crate::column::{ColumnDescriptor, ColumnSet, ColumnType};
use crate::temporal::parse_date;
use gridview_cli::FileFormat;

/// One record, cells aligned with the dataset's column table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Row {
    cells: Vec<String>,
}

impl Row {
    pub fn new(cells: Vec<String>) -> Self {
        Self { cells }
    }

    /// Cell text, or an empty string past the end of the row.
    pub fn cell(&self, index: usize) -> &str {
        self.cells.get(index).map(String::as_str).unwrap_or("")
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

impl<S: Into<String>> FromIterator<S> for Row {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self::new(iter.into_iter().map(Into::into).collect())
    }
}

/// Immutable rows plus their column table. Clones share the row storage.
#[derive(Debug, Clone)]
pub struct Dataset {
    columns: ColumnSet,
    rows: Arc<Vec<Row>>,
}

impl Dataset {
    pub fn new(columns: ColumnSet, rows: Vec<Row>) -> Result<Self> {
        if let Some(id) = columns.duplicate_id() {
            return Err(eyre!("Duplicate column id '{}'", id));
        }
        if let Some((index, row)) = rows
            .iter()
            .enumerate()
            .find(|(_, row)| row.len() != columns.len())
        {
            return Err(eyre!(
                "Row {} has {} cells but there are {} columns",
                index,
                row.len(),
                columns.len()
            ));
        }
        Ok(Self {
            columns,
            rows: Arc::new(rows),
        })
    }

    pub fn columns(&self) -> &ColumnSet {
        &self.columns
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn row(&self, index: usize) -> Option<&Row> {
        self.rows.get(index)
    }

    /// Cell of `row` under column `column_id`.
    pub fn value(&self, row: usize, column_id: &str) -> Option<&str> {
        let col = self.columns.position(column_id)?;
        self.rows.get(row).map(|r| r.cell(col))
    }

    /// Same rows with every column starting at `width` cells.
    pub fn with_column_width(mut self, width: u16) -> Self {
        self.columns = ColumnSet::new(
            self.columns
                .iter()
                .cloned()
                .map(|c| c.with_width(width))
                .collect(),
        );
        self
    }

    /// Identity of the row storage; equal for clones, different for every load.
    pub fn rows_id(&self) -> usize {
        Arc::as_ptr(&self.rows) as usize
    }

    /// Built-in line item table: four base items repeated over 120 rows.
    pub fn demo() -> Self {
        let columns = ColumnSet::new(vec![
            ColumnDescriptor::text("name", "Name").with_width(18),
            ColumnDescriptor::numeric("committedQty", "Committed Qty"),
            ColumnDescriptor::numeric("committedCost", "Committed Cost"),
            ColumnDescriptor::numeric("estimatedQty", "Estimated Qty"),
            ColumnDescriptor::numeric("estimatedCost", "Estimated Cost"),
            ColumnDescriptor::numeric("usedQty", "Used Qty"),
            ColumnDescriptor::numeric("usedCost", "Used Cost"),
            ColumnDescriptor::numeric("billingAmount", "Billing Amount"),
            ColumnDescriptor::text("lineStatus", "Line Status"),
            ColumnDescriptor::date("createdOn", "Created On").with_width(22),
        ]);
        let created = "2025-09-09 11:00:00 AM";
        let base: [[&str; 10]; 4] = [
            ["Boiler 2000", "1", "3500", "0", "0", "0", "0", "5000", "Committed", created],
            ["HVAC - Ceiling", "1", "3500", "0", "0", "0", "0", "5000", "Committed", created],
            ["Boiler 2500", "0", "0", "10", "5000", "0", "0", "5000", "Estimate", created],
            ["Damper", "0", "0", "0", "0", "1", "500", "1000", "Used", created],
        ];
        let rows: Vec<Row> = (0..120)
            .map(|i| base[i % base.len()].iter().copied().collect())
            .collect();
        Self {
            columns,
            rows: Arc::new(rows),
        }
    }

    /// Reads a data file. The format comes from `format` or else the file extension.
    pub fn load(path: &Path, format: Option<FileFormat>) -> Result<Self> {
        let format = format
            .or_else(|| FileFormat::from_path(path))
            .ok_or_else(|| eyre!("Unsupported file type: {}", path.display()))?;
        let pl_path = PlPath::Local(Arc::from(path));
        let lf = match format {
            FileFormat::Csv => LazyCsvReader::new(pl_path).finish()?,
            FileFormat::Tsv => LazyCsvReader::new(pl_path).with_separator(b'\t').finish()?,
            FileFormat::Parquet => LazyFrame::scan_parquet(pl_path, Default::default())?,
            FileFormat::Jsonl => LazyJsonLineReader::new(pl_path).finish()?,
            FileFormat::Json => JsonReader::new(File::open(path)?)
                .with_json_format(JsonFormat::Json)
                .finish()?
                .lazy(),
        };
        let df = lf.collect()?;
        Self::from_frame(&df)
    }

    /// Converts a polars frame, inferring each column's semantic type from its dtype.
    pub fn from_frame(df: &DataFrame) -> Result<Self> {
        let mut descriptors = Vec::with_capacity(df.width());
        let mut values: Vec<Vec<String>> = Vec::with_capacity(df.width());

        for column in df.get_columns() {
            let mut cells = Vec::with_capacity(df.height());
            for i in 0..column.len() {
                let value = column.get(i)?;
                cells.push(if matches!(value, AnyValue::Null) {
                    String::new()
                } else {
                    value.str_value().to_string()
                });
            }
            let column_type = infer_column_type(column.dtype(), &cells);
            let name = column.name().to_string();
            descriptors.push(ColumnDescriptor::new(name.clone(), name, column_type));
            values.push(cells);
        }

        let rows: Vec<Row> = (0..df.height())
            .map(|r| values.iter().map(|cells| cells[r].clone()).collect())
            .collect();
        Self::new(ColumnSet::new(descriptors), rows)
    }
}

fn is_numeric_type(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
            | DataType::Float32
            | DataType::Float64
    )
}

fn infer_column_type(dtype: &DataType, cells: &[String]) -> ColumnType {
    if is_numeric_type(dtype) {
        return ColumnType::Numeric;
    }
    if matches!(dtype, DataType::Date | DataType::Datetime(_, _)) {
        return ColumnType::Date;
    }
    let mut non_empty = cells.iter().filter(|c| !c.trim().is_empty()).peekable();
    if *dtype == DataType::String
        && non_empty.peek().is_some()
        && non_empty.all(|c| parse_date(c).is_some())
    {
        return ColumnType::Date;
    }
    ColumnType::Text
}
