//! Typed data columns and the borrowed views that read them.

use crate::TableColumnId;
use crate::container::DataContainer;
use crate::cursor::Cursor;
use crate::error::TableError;
use crate::flush::DelayedFlush;
use crate::interpolate::{Interpolator, LinearInterpolator};
use crate::time::{Bin, LimitOutcome, TimeCursor, TimeIndex, TimePosition};
use crate::value::{CellValue, ValueKind};

/// One typed column: a fresh/stale container pair mirroring the bins of the
/// owning subtable's time index.
///
/// A column holds no time information of its own. Cells are addressed by the
/// `(bin, position)` pairs the time index hands out, and the column's buffer
/// roles swap in lockstep with the index swap so those addresses stay valid
/// across data limiting.
#[derive(Debug, Clone)]
pub struct DataColumn {
    id: TableColumnId,
    name: String,
    containers: [DataContainer; 2],
    fresh: usize,
}

impl DataColumn {
    /// Creates an empty column.
    pub fn new(id: TableColumnId, name: impl Into<String>, kind: ValueKind) -> Self {
        Self {
            id,
            name: name.into(),
            containers: [DataContainer::new(kind), DataContainer::new(kind)],
            fresh: 0,
        }
    }

    /// Column id, unique within the owning table.
    pub fn id(&self) -> TableColumnId {
        self.id
    }

    /// Column name, unique within the owning table.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Storage kind of every cell in this column.
    pub fn kind(&self) -> ValueKind {
        self.containers[0].kind()
    }

    /// Total cells across both buffers.
    pub fn len(&self) -> usize {
        self.containers[0].len() + self.containers[1].len()
    }

    /// True when the column holds no cells.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn container_index(&self, bin: Bin) -> usize {
        match bin {
            Bin::Fresh => self.fresh,
            Bin::Stale => 1 - self.fresh,
        }
    }

    fn container(&self, bin: Bin) -> &DataContainer {
        &self.containers[self.container_index(bin)]
    }

    fn container_mut(&mut self, bin: Bin) -> &mut DataContainer {
        let idx = self.container_index(bin);
        &mut self.containers[idx]
    }

    /// Writes a cell at an index-resolved location: appends when the
    /// position is the buffer's current length, overwrites otherwise.
    pub fn write(&mut self, at: TimePosition, value: &CellValue) -> Result<(), TableError> {
        let container = self.container_mut(at.bin);
        if at.position == container.len() {
            container.insert(at.position, value)
        } else {
            container.replace(at.position, value)
        }
    }

    /// Reads the cell at an index-resolved location.
    pub fn value_at(&self, at: TimePosition) -> Option<CellValue> {
        self.container(at.bin).get(at.position)
    }

    /// Reads the cell at an index-resolved location as `f64`.
    pub fn value_at_f64(&self, at: TimePosition) -> Result<f64, TableError> {
        self.container(at.bin).get_f64(at.position)
    }

    /// Removes one cell. No-op with a debug assertion if the location is
    /// stale.
    pub fn erase(&mut self, at: TimePosition) {
        let result = self.container_mut(at.bin).erase(at.position, 1);
        debug_assert!(result.is_ok(), "column cell missing at {at:?}");
    }

    /// Removes the given `(position, count)` runs from one buffer. Runs must
    /// be ordered highest-position-first, as the time index reports them.
    pub fn erase_runs(&mut self, bin: Bin, runs: &[(usize, usize)]) {
        for &(position, count) in runs {
            let result = self.container_mut(bin).erase(position, count);
            debug_assert!(result.is_ok(), "column run missing at {position}+{count}");
        }
    }

    /// Trades buffer roles and empties the buffer that takes over as fresh.
    /// Must follow a time index swap exactly once.
    pub fn swap_buffers(&mut self) {
        self.container_mut(Bin::Stale).clear();
        self.fresh = 1 - self.fresh;
    }

    /// Applies the outcome of a time index limiting pass to this column.
    pub fn apply_limit(&mut self, outcome: &LimitOutcome) {
        match outcome {
            LimitOutcome::Unchanged => {}
            LimitOutcome::Swapped => self.swap_buffers(),
            LimitOutcome::Erased(runs) => self.erase_runs(Bin::Fresh, runs),
        }
    }

    /// Steals both buffers into a deferred-deallocation handle, leaving the
    /// column empty.
    pub fn flush_into(&mut self, delayed: &mut DelayedFlush) {
        let kind = self.kind();
        for container in &mut self.containers {
            delayed.absorb_container(std::mem::replace(container, DataContainer::new(kind)));
        }
        self.fresh = 0;
    }
}

/// A readable column paired with the time index that addresses it.
///
/// Subtables and tables hand these out; the pairing is rebuilt on every
/// borrow, so a column moved to a different subtable by a split simply pairs
/// with its new index next time.
#[derive(Debug, Clone, Copy)]
pub struct ColumnRef<'a> {
    column: &'a DataColumn,
    index: &'a TimeIndex,
}

impl<'a> ColumnRef<'a> {
    pub(crate) fn new(column: &'a DataColumn, index: &'a TimeIndex) -> Self {
        Self { column, index }
    }

    /// Column id.
    pub fn id(&self) -> TableColumnId {
        self.column.id()
    }

    /// Column name.
    pub fn name(&self) -> &'a str {
        self.column.name()
    }

    /// Storage kind.
    pub fn kind(&self) -> ValueKind {
        self.column.kind()
    }

    /// Number of stored samples.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    /// True when no samples are stored.
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Earliest and latest sample times.
    pub fn time_range(&self) -> Option<(f64, f64)> {
        self.index.time_range()
    }

    /// Value stored at exactly `time`.
    pub fn value_at_time(&self, time: f64) -> Option<CellValue> {
        self.column.value_at(self.index.find(time)?)
    }

    /// Value at the latest sample at or before `time`.
    pub fn value_at_or_before_time(&self, time: f64) -> Option<CellValue> {
        self.column.value_at(self.index.find_at_or_before(time)?)
    }

    /// Value at `time`, interpolating between the bracketing samples.
    ///
    /// An exact sample wins outright. Queries past the last sample clamp to
    /// its value; queries before the first fail with
    /// [`TableError::TimeBeforeStart`]. Between samples the supplied policy
    /// (or [`LinearInterpolator`]) computes the value. Text columns refuse.
    pub fn interpolate(
        &self,
        time: f64,
        interpolator: Option<&dyn Interpolator>,
    ) -> Result<f64, TableError> {
        if !self.kind().is_numeric() {
            return Err(TableError::NotInterpolatable(self.kind()));
        }
        if let Some(exact) = self.index.find(time) {
            return self.column.value_at_f64(exact);
        }
        let Some(before) = self.index.find_at_or_before(time) else {
            match self.index.begin_time() {
                Some(first) => {
                    return Err(TableError::TimeBeforeStart { query: time, first });
                }
                None => return Err(TableError::NoData),
            }
        };
        let Some(after) = self.index.lower_bound(time).peek_next() else {
            // Past the last sample: hold its value.
            return self.column.value_at_f64(before);
        };
        let v0 = self.column.value_at_f64(before)?;
        let v1 = self.column.value_at_f64(after)?;
        let value = match interpolator {
            Some(policy) => policy.compute(time, before.time, v0, after.time, v1),
            None => LinearInterpolator.compute(time, before.time, v0, after.time, v1),
        };
        Ok(value)
    }

    /// Cursor over `(time, value)` pairs in time order, at the front.
    pub fn cursor(&self) -> ColumnCursor<'a> {
        ColumnCursor {
            column: self.column,
            times: self.index.cursor(),
        }
    }

    /// Cursor before the first sample at or after `time`.
    pub fn lower_bound(&self, time: f64) -> ColumnCursor<'a> {
        ColumnCursor {
            column: self.column,
            times: self.index.lower_bound(time),
        }
    }

    /// Cursor after the last sample at or before `time`.
    pub fn upper_bound(&self, time: f64) -> ColumnCursor<'a> {
        ColumnCursor {
            column: self.column,
            times: self.index.upper_bound(time),
        }
    }
}

/// Bidirectional `(time, value)` cursor over one column.
#[derive(Debug, Clone)]
pub struct ColumnCursor<'a> {
    column: &'a DataColumn,
    times: TimeCursor<'a>,
}

impl ColumnCursor<'_> {
    fn resolve(&self, at: Option<TimePosition>) -> Option<(f64, CellValue)> {
        let at = at?;
        let value = self.column.value_at(at);
        debug_assert!(value.is_some(), "column cell missing at {at:?}");
        Some((at.time, value?))
    }
}

impl Cursor for ColumnCursor<'_> {
    type Item = (f64, CellValue);

    fn next(&mut self) -> Option<(f64, CellValue)> {
        let at = self.times.next();
        self.resolve(at)
    }

    fn peek_next(&self) -> Option<(f64, CellValue)> {
        self.resolve(self.times.peek_next())
    }

    fn previous(&mut self) -> Option<(f64, CellValue)> {
        let at = self.times.previous();
        self.resolve(at)
    }

    fn peek_previous(&self) -> Option<(f64, CellValue)> {
        self.resolve(self.times.peek_previous())
    }

    fn to_front(&mut self) {
        self.times.to_front();
    }

    fn to_back(&mut self) {
        self.times.to_back();
    }
}
