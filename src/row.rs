//! Sparse rows and row visitation.

use crate::TableColumnId;
use crate::value::CellValue;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A sparse row: one time key plus values for any subset of a table's
/// columns.
///
/// Rows are the transfer format in both directions: callers fill one to add
/// data, and range scans build them back up from whichever columns hold a
/// value at each time.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TableRow {
    time: f64,
    cells: BTreeMap<TableColumnId, CellValue>,
}

impl TableRow {
    /// Empty row at time zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty row at the given time.
    pub fn with_time(time: f64) -> Self {
        Self {
            time,
            ..Self::default()
        }
    }

    /// Row time key.
    pub fn time(&self) -> f64 {
        self.time
    }

    /// Changes the row time key.
    pub fn set_time(&mut self, time: f64) {
        self.time = time;
    }

    /// Sets the value for one column, replacing any earlier value.
    pub fn set_value(&mut self, column_id: TableColumnId, value: impl Into<CellValue>) {
        self.cells.insert(column_id, value.into());
    }

    /// Value for one column, if the row carries it.
    pub fn value(&self, column_id: TableColumnId) -> Option<&CellValue> {
        self.cells.get(&column_id)
    }

    /// True when the row carries a value for the column.
    pub fn contains_column(&self, column_id: TableColumnId) -> bool {
        self.cells.contains_key(&column_id)
    }

    /// Number of cells carried.
    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    /// True when the row carries no cells.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Cells in ascending column-id order.
    pub fn cells(&self) -> impl Iterator<Item = (TableColumnId, &CellValue)> {
        self.cells.iter().map(|(&id, value)| (id, value))
    }

    /// Drops all cells, keeping the time.
    pub fn clear(&mut self) {
        self.cells.clear();
    }
}

/// Whether a visitation keeps going.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VisitControl {
    /// Visit the next row.
    Continue,
    /// Stop the scan early.
    Stop,
}

/// Receives rows from a time-ordered table scan.
pub trait RowVisitor {
    /// Called once per row in ascending time order.
    fn visit(&mut self, row: &TableRow) -> VisitControl;
}

impl<F> RowVisitor for F
where
    F: FnMut(&TableRow) -> VisitControl,
{
    fn visit(&mut self, row: &TableRow) -> VisitControl {
        self(row)
    }
}
