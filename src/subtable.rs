//! Null-less column groups and the row-add transaction.

use crate::TableColumnId;
use crate::column::{ColumnRef, DataColumn};
use crate::cursor::Cursor;
use crate::error::TableError;
use crate::flush::DelayedFlush;
use crate::row::TableRow;
use crate::time::{EraseBehavior, TimeCursor, TimeIndex, TimePosition};
use crate::value::{CellValue, ValueKind};

/// A group of columns that all hold a value at every time the group holds.
///
/// The null-less invariant is what lets one time index address every column
/// in the group with a single `(bin, position)` pair. It is preserved
/// structurally: adding a row that covers only part of the group splits the
/// uncovered columns off into a new subtable (see
/// [`RowTransaction::commit`]), and columns can only join while the group is
/// empty.
#[derive(Debug, Clone)]
pub struct SubTable {
    index: TimeIndex,
    columns: Vec<DataColumn>,
}

/// A sibling subtable produced by a split, handed back by value so the
/// owning table can adopt it and repoint the moved column ids.
#[derive(Debug)]
pub struct SubTableSplit {
    /// The new group, carrying the moved columns and their data.
    pub subtable: SubTable,
    /// Ids of the columns that moved.
    pub column_ids: Vec<TableColumnId>,
}

impl SubTable {
    /// Creates an empty subtable over the given time index.
    pub fn new(index: TimeIndex) -> Self {
        Self {
            index,
            columns: Vec::new(),
        }
    }

    /// Number of rows (indexed times).
    pub fn len(&self) -> usize {
        self.index.len()
    }

    /// True when no rows are stored.
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Number of columns in the group.
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Earliest and latest row times.
    pub fn time_range(&self) -> Option<(f64, f64)> {
        self.index.time_range()
    }

    /// The shared time index.
    pub fn index(&self) -> &TimeIndex {
        &self.index
    }

    /// True when the group contains the column.
    pub fn has_column(&self, column_id: TableColumnId) -> bool {
        self.columns.iter().any(|c| c.id() == column_id)
    }

    fn column_position(&self, column_id: TableColumnId) -> Option<usize> {
        self.columns.iter().position(|c| c.id() == column_id)
    }

    /// Readable view of one column.
    pub fn column(&self, column_id: TableColumnId) -> Option<ColumnRef<'_>> {
        let idx = self.column_position(column_id)?;
        Some(ColumnRef::new(&self.columns[idx], &self.index))
    }

    /// Readable views of every column in the group.
    pub fn columns(&self) -> impl Iterator<Item = ColumnRef<'_>> {
        self.columns
            .iter()
            .map(|c| ColumnRef::new(c, &self.index))
    }

    /// Ids of every column in the group.
    pub fn column_ids(&self) -> impl Iterator<Item = TableColumnId> + '_ {
        self.columns.iter().map(DataColumn::id)
    }

    /// Adds a column to the group. Only permitted while the group holds no
    /// rows; anything else would put nulls in the existing rows.
    pub fn add_column(
        &mut self,
        column_id: TableColumnId,
        name: impl Into<String>,
        kind: ValueKind,
    ) -> Result<(), TableError> {
        if !self.index.is_empty() {
            return Err(TableError::NonEmptySubTable);
        }
        debug_assert!(
            !self.has_column(column_id),
            "column id {column_id} already in subtable"
        );
        self.columns.push(DataColumn::new(column_id, name, kind));
        Ok(())
    }

    /// Removes a column, returning it. When the last column leaves, the row
    /// index empties with it.
    pub fn remove_column(&mut self, column_id: TableColumnId) -> Result<DataColumn, TableError> {
        let idx = self
            .column_position(column_id)
            .ok_or(TableError::ColumnNotFound(column_id))?;
        let column = self.columns.remove(idx);
        if self.columns.is_empty() {
            drop(self.index.take_all());
        }
        Ok(column)
    }

    /// Opens a row-add transaction at `time`. Cells written through the
    /// transaction land in this group; [`RowTransaction::commit`] restores
    /// the null-less invariant, splitting the group if the row covered only
    /// part of it.
    pub fn add_row(&mut self, time: f64) -> Result<RowTransaction<'_>, TableError> {
        let (at, inserted) = self.index.find_or_add(time)?;
        let written = vec![false; self.columns.len()];
        Ok(RowTransaction {
            subtable: self,
            at,
            inserted,
            written,
            committed: false,
        })
    }

    /// Applies point and age limits to the group; column buffers follow the
    /// index in lockstep.
    pub fn limit_data(
        &mut self,
        max_points: usize,
        latest_invalid_time: f64,
        on_pre_remove: &mut dyn FnMut(f64),
    ) {
        let outcome = self
            .index
            .limit(max_points, latest_invalid_time, on_pre_remove);
        for column in &mut self.columns {
            column.apply_limit(&outcome);
        }
    }

    /// Erases the row at exactly `time`. With [`EraseBehavior::Quick`] the
    /// cells stay allocated until the next swap or flush.
    pub fn erase_row(&mut self, time: f64, behavior: EraseBehavior) -> bool {
        let Some(at) = self.index.erase(time, behavior) else {
            return false;
        };
        if behavior == EraseBehavior::FixOffsets {
            for column in &mut self.columns {
                column.erase(at);
            }
        }
        true
    }

    /// Erases every row with `begin <= time < end`.
    pub fn erase_range(&mut self, begin: f64, end: f64) {
        let runs = self.index.erase_range(begin, end);
        for column in &mut self.columns {
            column.erase_runs(crate::time::Bin::Stale, &runs.stale);
            column.erase_runs(crate::time::Bin::Fresh, &runs.fresh);
        }
    }

    /// Steals every row into a deferred-deallocation handle. O(1) per
    /// buffer; the columns stay, empty.
    pub fn flush_all(&mut self, delayed: &mut DelayedFlush) {
        delayed.absorb_entries(self.index.take_all());
        for column in &mut self.columns {
            column.flush_into(delayed);
        }
    }

    /// Flushes one column's data. In a multi-column group the emptied
    /// column can no longer satisfy the null-less invariant here, so it
    /// moves out as a split; a single-column group just empties in place.
    pub fn flush_column(
        &mut self,
        column_id: TableColumnId,
        delayed: &mut DelayedFlush,
    ) -> Result<Option<SubTableSplit>, TableError> {
        let idx = self
            .column_position(column_id)
            .ok_or(TableError::ColumnNotFound(column_id))?;
        if self.columns.len() == 1 {
            self.flush_all(delayed);
            return Ok(None);
        }
        let mut column = self.columns.remove(idx);
        column.flush_into(delayed);
        let mut sibling = SubTable::new(self.index.empty_like());
        sibling.columns.push(column);
        Ok(Some(SubTableSplit {
            subtable: sibling,
            column_ids: vec![column_id],
        }))
    }

    /// Cursor yielding this group's rows in time order.
    pub fn cursor(&self) -> SubTableCursor<'_> {
        SubTableCursor {
            columns: &self.columns,
            times: self.index.cursor(),
        }
    }

    /// Cursor positioned before the first row at or after `time`.
    pub fn lower_bound(&self, time: f64) -> SubTableCursor<'_> {
        SubTableCursor {
            columns: &self.columns,
            times: self.index.lower_bound(time),
        }
    }

    fn finish_row(
        &mut self,
        at: TimePosition,
        inserted: bool,
        written: &[bool],
    ) -> Option<SubTableSplit> {
        if !inserted {
            // Existing row: all columns already held a value, every write
            // was an overwrite, the invariant never moved.
            return None;
        }
        if written.iter().all(|&w| w) {
            return None;
        }
        if written.iter().all(|&w| !w) {
            // Nothing was stored at the new time; retract it.
            self.index.erase(at.time, EraseBehavior::FixOffsets);
            return None;
        }
        // Partial cover: columns without a value at the new time move to a
        // sibling that indexes every time except the new one.
        let mut index = self.index.clone();
        index.erase(at.time, EraseBehavior::FixOffsets);
        let mut moved = Vec::new();
        let mut kept = Vec::new();
        for (column, &was_written) in self.columns.drain(..).zip(written) {
            if was_written {
                kept.push(column);
            } else {
                moved.push(column);
            }
        }
        self.columns = kept;
        let column_ids = moved.iter().map(DataColumn::id).collect();
        log::debug!(
            "subtable split at t={}: {} columns move, {} stay",
            at.time,
            moved.len(),
            self.columns.len()
        );
        Some(SubTableSplit {
            subtable: SubTable {
                index,
                columns: moved,
            },
            column_ids,
        })
    }
}

/// An in-progress row addition to one subtable.
///
/// Dropping a transaction without calling [`RowTransaction::commit`] is a
/// programming error (debug assertion): the index may hold a time the
/// columns never received.
#[derive(Debug)]
pub struct RowTransaction<'a> {
    subtable: &'a mut SubTable,
    at: TimePosition,
    inserted: bool,
    written: Vec<bool>,
    committed: bool,
}

impl RowTransaction<'_> {
    /// The row time this transaction writes at.
    pub fn time(&self) -> f64 {
        self.at.time
    }

    /// Writes one cell. Re-setting the same column within a transaction
    /// overwrites; the value converts to the column's kind.
    pub fn set_cell(
        &mut self,
        column_id: TableColumnId,
        value: &CellValue,
    ) -> Result<(), TableError> {
        let idx = self
            .subtable
            .column_position(column_id)
            .ok_or(TableError::ColumnNotFound(column_id))?;
        self.subtable.columns[idx].write(self.at, value)?;
        self.written[idx] = true;
        Ok(())
    }

    /// Closes the transaction, restoring the null-less invariant.
    ///
    /// Returns a [`SubTableSplit`] when the row covered only part of the
    /// group; the caller owns the sibling and must adopt it. A new time
    /// that received no cells is retracted.
    pub fn commit(mut self) -> Option<SubTableSplit> {
        self.committed = true;
        let written = std::mem::take(&mut self.written);
        self.subtable.finish_row(self.at, self.inserted, &written)
    }
}

impl Drop for RowTransaction<'_> {
    fn drop(&mut self) {
        debug_assert!(
            self.committed || std::thread::panicking(),
            "row transaction dropped without commit"
        );
    }
}

/// Time-ordered row cursor over one subtable.
#[derive(Debug, Clone)]
pub struct SubTableCursor<'a> {
    columns: &'a [DataColumn],
    times: TimeCursor<'a>,
}

impl SubTableCursor<'_> {
    fn build_row(&self, at: TimePosition) -> TableRow {
        let mut row = TableRow::with_time(at.time);
        for column in self.columns {
            if let Some(value) = column.value_at(at) {
                row.set_value(column.id(), value);
            } else {
                debug_assert!(false, "null cell in subtable at {at:?}");
            }
        }
        row
    }
}

impl Cursor for SubTableCursor<'_> {
    type Item = TableRow;

    fn next(&mut self) -> Option<TableRow> {
        self.times.next().map(|at| self.build_row(at))
    }

    fn peek_next(&self) -> Option<TableRow> {
        self.times.peek_next().map(|at| self.build_row(at))
    }

    fn previous(&mut self) -> Option<TableRow> {
        self.times.previous().map(|at| self.build_row(at))
    }

    fn peek_previous(&self) -> Option<TableRow> {
        self.times.peek_previous().map(|at| self.build_row(at))
    }

    fn to_front(&mut self) {
        self.times.to_front();
    }

    fn to_back(&mut self) {
        self.times.to_back();
    }
}
