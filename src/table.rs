//! Tables: named column sets routed across null-less subtables.

use crate::column::ColumnRef;
use crate::cursor::Cursor;
use crate::error::TableError;
use crate::flush::DelayedFlush;
use crate::row::{RowVisitor, TableRow, VisitControl};
use crate::subtable::{SubTable, SubTableCursor, SubTableSplit};
use crate::time::{EraseBehavior, TimeIndex};
use crate::value::{CellValue, ValueKind};
use crate::{ObserverId, OwnerId, TableColumnId, TableId};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Retention limits for a table. Zero disables the respective check.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct DataLimits {
    /// Maximum rows to retain. With the double-buffered index this is an
    /// upper bound; retention floats between half the limit and the limit.
    pub max_points: usize,
    /// Maximum row age in seconds, measured against the table's end time.
    pub max_seconds: f64,
}

impl DataLimits {
    /// True when both checks are disabled.
    pub fn is_unlimited(&self) -> bool {
        self.max_points == 0 && self.max_seconds <= 0.0
    }
}

/// Receives structural and row events from one table.
///
/// Callbacks carry ids and payloads, never the table itself; re-entering
/// the table from a callback is therefore impossible by construction.
pub trait TableObserver {
    /// A column was added.
    fn on_add_column(&mut self, _table_id: TableId, _column_id: TableColumnId, _name: &str) {}
    /// A column is about to be removed.
    fn on_pre_remove_column(&mut self, _table_id: TableId, _column_id: TableColumnId, _name: &str) {
    }
    /// A row was added (fires before data limiting, which may evict it).
    fn on_add_row(&mut self, _table_id: TableId, _time: f64) {}
    /// A row is about to be evicted or erased.
    fn on_pre_remove_row(&mut self, _table_id: TableId, _time: f64) {}
}

/// A named table: columns keyed by id, rows keyed by time.
///
/// Internally the columns live in null-less subtables. A caller never sees
/// the grouping except through [`Table::subtable_count`]; rows go in and
/// come out whole, and the table re-routes column ids when a partial row
/// forces a split.
pub struct Table {
    id: TableId,
    owner: OwnerId,
    name: String,
    subtables: Vec<SubTable>,
    column_homes: HashMap<TableColumnId, usize>,
    column_names: HashMap<String, TableColumnId>,
    next_column_id: TableColumnId,
    limits: Option<DataLimits>,
    observers: Vec<(ObserverId, Box<dyn TableObserver>)>,
    next_observer_id: ObserverId,
}

impl std::fmt::Debug for Table {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Table")
            .field("id", &self.id)
            .field("owner", &self.owner)
            .field("name", &self.name)
            .field("columns", &self.column_homes.len())
            .field("subtables", &self.subtables.len())
            .finish_non_exhaustive()
    }
}

impl Table {
    /// Creates an empty table.
    pub fn new(id: TableId, owner: OwnerId, name: impl Into<String>) -> Self {
        Self {
            id,
            owner,
            name: name.into(),
            subtables: Vec::new(),
            column_homes: HashMap::new(),
            column_names: HashMap::new(),
            next_column_id: 1,
            limits: None,
            observers: Vec::new(),
            next_observer_id: 1,
        }
    }

    /// Table id.
    pub fn id(&self) -> TableId {
        self.id
    }

    /// Owning entity.
    pub fn owner(&self) -> OwnerId {
        self.owner
    }

    /// Table name, unique per owner.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of columns.
    pub fn column_count(&self) -> usize {
        self.column_homes.len()
    }

    /// Number of internal null-less groups.
    pub fn subtable_count(&self) -> usize {
        self.subtables.len()
    }

    /// True when no rows are stored.
    pub fn is_empty(&self) -> bool {
        self.subtables.iter().all(SubTable::is_empty)
    }

    /// Earliest and latest row times across all columns.
    pub fn time_range(&self) -> Option<(f64, f64)> {
        let mut range: Option<(f64, f64)> = None;
        for subtable in &self.subtables {
            if let Some((begin, end)) = subtable.time_range() {
                range = Some(match range {
                    Some((b, e)) => (b.min(begin), e.max(end)),
                    None => (begin, end),
                });
            }
        }
        range
    }

    /// Latest row time.
    pub fn end_time(&self) -> Option<f64> {
        self.time_range().map(|(_, end)| end)
    }

    /// Current retention limits.
    pub fn data_limits(&self) -> Option<DataLimits> {
        self.limits
    }

    /// Sets or clears the retention limits applied after each row add.
    pub fn set_data_limits(&mut self, limits: Option<DataLimits>) {
        self.limits = limits.filter(|l| !l.is_unlimited());
    }

    /// Adds a column. Names must be non-empty and unique within the table;
    /// the returned id is stable for the table's lifetime.
    pub fn add_column(
        &mut self,
        name: impl Into<String>,
        kind: ValueKind,
    ) -> Result<TableColumnId, TableError> {
        let name = name.into();
        if name.is_empty() {
            return Err(TableError::EmptyName);
        }
        if self.column_names.contains_key(&name) {
            return Err(TableError::DuplicateColumnName(name));
        }
        let column_id = self.next_column_id;
        self.next_column_id += 1;
        // An empty group can still accept columns; otherwise the new column
        // starts its own group so existing rows stay null-less.
        let slot = match self.subtables.iter().position(SubTable::is_empty) {
            Some(slot) => slot,
            None => {
                self.subtables.push(SubTable::new(TimeIndex::double_buffer()));
                self.subtables.len() - 1
            }
        };
        self.subtables[slot].add_column(column_id, name.clone(), kind)?;
        self.column_homes.insert(column_id, slot);
        self.column_names.insert(name.clone(), column_id);
        for (_, observer) in &mut self.observers {
            observer.on_add_column(self.id, column_id, &name);
        }
        Ok(column_id)
    }

    /// Removes a column and its data. The rest of its group is untouched.
    pub fn remove_column(&mut self, column_id: TableColumnId) -> Result<(), TableError> {
        let slot = *self
            .column_homes
            .get(&column_id)
            .ok_or(TableError::ColumnNotFound(column_id))?;
        let name = self.subtables[slot]
            .column(column_id)
            .map(|c| c.name().to_string())
            .ok_or(TableError::ColumnNotFound(column_id))?;
        for (_, observer) in &mut self.observers {
            observer.on_pre_remove_column(self.id, column_id, &name);
        }
        self.subtables[slot].remove_column(column_id)?;
        self.column_homes.remove(&column_id);
        self.column_names.remove(&name);
        if self.subtables[slot].column_count() == 0 {
            self.subtables.remove(slot);
            for home in self.column_homes.values_mut() {
                if *home > slot {
                    *home -= 1;
                }
            }
        }
        Ok(())
    }

    /// Readable view of one column.
    pub fn column(&self, column_id: TableColumnId) -> Option<ColumnRef<'_>> {
        let slot = *self.column_homes.get(&column_id)?;
        self.subtables[slot].column(column_id)
    }

    /// Readable view of one column, by name.
    pub fn column_by_name(&self, name: &str) -> Option<ColumnRef<'_>> {
        self.column(*self.column_names.get(name)?)
    }

    /// Id for a column name.
    pub fn column_id(&self, name: &str) -> Option<TableColumnId> {
        self.column_names.get(name).copied()
    }

    /// Readable views of every column, in no particular order.
    pub fn columns(&self) -> impl Iterator<Item = ColumnRef<'_>> {
        self.subtables.iter().flat_map(SubTable::columns)
    }

    /// Adds (or merges) a row.
    ///
    /// Cells route to their columns' groups; a group covered only partially
    /// by a new time splits, transparently to the caller. Observers see
    /// `on_add_row` before data limiting runs, so a row older than the
    /// retained window may be evicted immediately after it is added.
    ///
    /// On the first bad cell the row stops storing further cells but the
    /// already-stored cells stay, observers still fire, and limiting still
    /// runs; the error is returned.
    pub fn add_row(&mut self, row: &TableRow) -> Result<(), TableError> {
        if row.is_empty() {
            return Err(TableError::EmptyRow);
        }
        let time = row.time();
        crate::time::check_time(time)?;
        let mut by_slot: Vec<(usize, Vec<(TableColumnId, &CellValue)>)> = Vec::new();
        for (column_id, value) in row.cells() {
            let slot = *self
                .column_homes
                .get(&column_id)
                .ok_or(TableError::ColumnNotFound(column_id))?;
            match by_slot.iter_mut().find(|(s, _)| *s == slot) {
                Some((_, cells)) => cells.push((column_id, value)),
                None => by_slot.push((slot, vec![(column_id, value)])),
            }
        }
        let mut first_error = None;
        let mut splits: Vec<SubTableSplit> = Vec::new();
        'slots: for (slot, cells) in by_slot {
            let mut txn = self.subtables[slot].add_row(time)?;
            for (column_id, value) in cells {
                if let Err(err) = txn.set_cell(column_id, value) {
                    first_error = Some(err);
                    if let Some(split) = txn.commit() {
                        splits.push(split);
                    }
                    break 'slots;
                }
            }
            if let Some(split) = txn.commit() {
                splits.push(split);
            }
        }
        for split in splits {
            self.adopt_split(split);
        }
        for (_, observer) in &mut self.observers {
            observer.on_add_row(self.id, time);
        }
        self.limit_data();
        match first_error {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn adopt_split(&mut self, split: SubTableSplit) {
        let slot = self.subtables.len();
        self.subtables.push(split.subtable);
        for column_id in split.column_ids {
            self.column_homes.insert(column_id, slot);
        }
    }

    /// Applies the configured retention limits now. Called automatically
    /// after every row add.
    pub fn limit_data(&mut self) {
        let Some(limits) = self.limits else {
            return;
        };
        let Some(end_time) = self.end_time() else {
            return;
        };
        let max_points = match limits.max_points {
            0 => usize::MAX,
            n => n,
        };
        let latest_invalid_time = if limits.max_seconds > 0.0 {
            end_time - limits.max_seconds
        } else {
            0.0
        };
        let Self {
            id,
            subtables,
            observers,
            ..
        } = self;
        let mut notify = |time: f64| {
            for (_, observer) in observers.iter_mut() {
                observer.on_pre_remove_row(*id, time);
            }
        };
        for subtable in subtables {
            subtable.limit_data(max_points, latest_invalid_time, &mut notify);
        }
    }

    /// Erases the row at exactly `time` from every group that holds it.
    pub fn erase_row(&mut self, time: f64, behavior: EraseBehavior) -> bool {
        let mut erased = false;
        let Self {
            id,
            subtables,
            observers,
            ..
        } = self;
        for subtable in subtables.iter_mut() {
            if subtable.index().contains(time) {
                for (_, observer) in observers.iter_mut() {
                    observer.on_pre_remove_row(*id, time);
                }
                subtable.erase_row(time, behavior);
                erased = true;
            }
        }
        erased
    }

    /// Erases every row with `begin <= time < end`.
    pub fn flush_range(&mut self, begin: f64, end: f64) {
        for subtable in &mut self.subtables {
            subtable.erase_range(begin, end);
        }
    }

    /// Drops all rows in O(1) per buffer, returning the storage for
    /// deferred deallocation. Columns survive, empty.
    pub fn flush(&mut self) -> DelayedFlush {
        let mut delayed = DelayedFlush::new();
        for subtable in &mut self.subtables {
            subtable.flush_all(&mut delayed);
        }
        log::debug!("table {} ({}) flushed", self.id, self.name);
        delayed
    }

    /// Drops one column's data, returning the storage for deferred
    /// deallocation. The column survives, empty, in its own group.
    pub fn flush_column(&mut self, column_id: TableColumnId) -> Result<DelayedFlush, TableError> {
        let slot = *self
            .column_homes
            .get(&column_id)
            .ok_or(TableError::ColumnNotFound(column_id))?;
        let mut delayed = DelayedFlush::new();
        if let Some(split) = self.subtables[slot].flush_column(column_id, &mut delayed)? {
            self.adopt_split(split);
        }
        Ok(delayed)
    }

    /// Visits merged rows in `begin <= time < end` in ascending time order.
    /// Each visited row carries every column that holds a value at its time.
    pub fn accept(&self, begin: f64, end: f64, visitor: &mut dyn RowVisitor) {
        let mut cursors: Vec<SubTableCursor<'_>> = self
            .subtables
            .iter()
            .map(|s| s.lower_bound(begin))
            .collect();
        loop {
            let mut min_time: Option<f64> = None;
            for cursor in &cursors {
                if let Some(row) = cursor.peek_next() {
                    min_time = Some(match min_time {
                        Some(t) => t.min(row.time()),
                        None => row.time(),
                    });
                }
            }
            let Some(time) = min_time else {
                return;
            };
            if time >= end {
                return;
            }
            let mut merged = TableRow::with_time(time);
            for cursor in &mut cursors {
                if cursor.peek_next().map(|r| r.time()) == Some(time) {
                    if let Some(row) = cursor.next() {
                        for (column_id, value) in row.cells() {
                            merged.set_value(column_id, value.clone());
                        }
                    }
                }
            }
            if visitor.visit(&merged) == VisitControl::Stop {
                return;
            }
        }
    }

    /// Registers an observer; the id removes it later.
    pub fn add_observer(&mut self, observer: Box<dyn TableObserver>) -> ObserverId {
        let id = self.next_observer_id;
        self.next_observer_id += 1;
        self.observers.push((id, observer));
        id
    }

    /// Removes a previously registered observer.
    pub fn remove_observer(&mut self, observer_id: ObserverId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(id, _)| *id != observer_id);
        self.observers.len() != before
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table_with_columns(kinds: &[(&str, ValueKind)]) -> (Table, Vec<TableColumnId>) {
        let mut table = Table::new(1, 1, "test");
        let ids = kinds
            .iter()
            .map(|&(name, kind)| table.add_column(name, kind).unwrap())
            .collect();
        (table, ids)
    }

    #[test]
    fn test_columns_share_one_subtable_until_split() {
        let (mut table, ids) =
            table_with_columns(&[("a", ValueKind::F64), ("b", ValueKind::F64)]);
        assert_eq!(table.subtable_count(), 1);
        let mut row = TableRow::with_time(1.0);
        row.set_value(ids[0], 1.0);
        row.set_value(ids[1], 2.0);
        table.add_row(&row).unwrap();
        assert_eq!(table.subtable_count(), 1);
        // Partial row moves the uncovered column to its own group.
        let mut partial = TableRow::with_time(2.0);
        partial.set_value(ids[0], 3.0);
        table.add_row(&partial).unwrap();
        assert_eq!(table.subtable_count(), 2);
        // Both columns still read correctly through the table.
        assert_eq!(
            table.column(ids[0]).unwrap().value_at_time(2.0),
            Some(CellValue::F64(3.0))
        );
        assert_eq!(
            table.column(ids[1]).unwrap().value_at_time(1.0),
            Some(CellValue::F64(2.0))
        );
        assert!(table.column(ids[1]).unwrap().value_at_time(2.0).is_none());
    }

    #[test]
    fn test_add_column_name_rules() {
        let (mut table, _) = table_with_columns(&[("a", ValueKind::F64)]);
        assert_eq!(
            table.add_column("", ValueKind::F64).unwrap_err(),
            TableError::EmptyName
        );
        assert_eq!(
            table.add_column("a", ValueKind::U8).unwrap_err(),
            TableError::DuplicateColumnName("a".to_string())
        );
    }

    #[test]
    fn test_add_column_reuses_empty_group() {
        let (mut table, ids) =
            table_with_columns(&[("a", ValueKind::F64), ("b", ValueKind::F64)]);
        // Still empty: the new column joins the existing group.
        assert_eq!(table.subtable_count(), 1);
        let mut row = TableRow::with_time(1.0);
        row.set_value(ids[0], 1.0);
        row.set_value(ids[1], 2.0);
        table.add_row(&row).unwrap();
        // Non-empty now: the next column starts its own group.
        let c = table.add_column("c", ValueKind::U32).unwrap();
        assert_eq!(table.subtable_count(), 2);
        let mut row = TableRow::with_time(2.0);
        row.set_value(c, 7u32);
        table.add_row(&row).unwrap();
        assert_eq!(
            table.column(c).unwrap().value_at_time(2.0),
            Some(CellValue::U32(7))
        );
    }

    #[test]
    fn test_remove_column() {
        let (mut table, ids) =
            table_with_columns(&[("a", ValueKind::F64), ("b", ValueKind::F64)]);
        table.remove_column(ids[0]).unwrap();
        assert_eq!(table.column_count(), 1);
        assert!(table.column(ids[0]).is_none());
        assert!(table.column_by_name("b").is_some());
        assert_eq!(
            table.remove_column(ids[0]).unwrap_err(),
            TableError::ColumnNotFound(ids[0])
        );
    }

    #[test]
    fn test_add_row_rejects_bad_input() {
        let (mut table, ids) = table_with_columns(&[("a", ValueKind::F64)]);
        assert_eq!(
            table.add_row(&TableRow::with_time(1.0)).unwrap_err(),
            TableError::EmptyRow
        );
        let mut nan_row = TableRow::with_time(f64::NAN);
        nan_row.set_value(ids[0], 1.0);
        assert!(matches!(
            table.add_row(&nan_row).unwrap_err(),
            TableError::InvalidTime(_)
        ));
        let mut unknown = TableRow::with_time(1.0);
        unknown.set_value(99, 1.0);
        assert_eq!(
            table.add_row(&unknown).unwrap_err(),
            TableError::ColumnNotFound(99)
        );
        assert!(table.is_empty());
    }

    #[test]
    fn test_bad_cast_keeps_earlier_cells() {
        let (mut table, ids) =
            table_with_columns(&[("a", ValueKind::F64), ("b", ValueKind::F64)]);
        let mut row = TableRow::with_time(1.0);
        row.set_value(ids[0], 1.5);
        row.set_value(ids[1], "not a number");
        let err = table.add_row(&row).unwrap_err();
        assert!(matches!(err, TableError::BadCast { .. }));
        // The good cell stayed; the failed column split away without the row.
        assert_eq!(
            table.column(ids[0]).unwrap().value_at_time(1.0),
            Some(CellValue::F64(1.5))
        );
        assert!(table.column(ids[1]).unwrap().value_at_time(1.0).is_none());
    }

    #[test]
    fn test_point_limit_retention() {
        let (mut table, ids) = table_with_columns(&[("a", ValueKind::F64)]);
        table.set_data_limits(Some(DataLimits {
            max_points: 3,
            max_seconds: 0.0,
        }));
        for t in 1..=7 {
            let mut row = TableRow::with_time(f64::from(t));
            row.set_value(ids[0], f64::from(t) * 10.0);
            table.add_row(&row).unwrap();
        }
        let column = table.column(ids[0]).unwrap();
        assert_eq!(column.time_range(), Some((5.0, 7.0)));
        assert_eq!(column.len(), 3);
        assert_eq!(column.value_at_time(5.0), Some(CellValue::F64(50.0)));
        assert!(column.value_at_time(4.0).is_none());
    }

    #[test]
    fn test_seconds_limit_retention() {
        let (mut table, ids) = table_with_columns(&[("a", ValueKind::F64)]);
        table.set_data_limits(Some(DataLimits {
            max_points: 0,
            max_seconds: 5.0,
        }));
        for t in (1..=25).step_by(4) {
            let mut row = TableRow::with_time(f64::from(t));
            row.set_value(ids[0], f64::from(t));
            table.add_row(&row).unwrap();
        }
        // Swap-based limiting: everything older than the last swap is gone,
        // rows since then are retained even if older than the window.
        let column = table.column(ids[0]).unwrap();
        assert_eq!(column.time_range(), Some((13.0, 25.0)));
        assert_eq!(column.len(), 4);
    }

    #[test]
    fn test_observer_event_order() {
        #[derive(Default)]
        struct Recorder(std::rc::Rc<std::cell::RefCell<Vec<String>>>);
        impl TableObserver for Recorder {
            fn on_add_column(&mut self, _t: TableId, id: TableColumnId, name: &str) {
                self.0.borrow_mut().push(format!("+col {id} {name}"));
            }
            fn on_pre_remove_column(&mut self, _t: TableId, id: TableColumnId, _name: &str) {
                self.0.borrow_mut().push(format!("-col {id}"));
            }
            fn on_add_row(&mut self, _t: TableId, time: f64) {
                self.0.borrow_mut().push(format!("+row {time}"));
            }
            fn on_pre_remove_row(&mut self, _t: TableId, time: f64) {
                self.0.borrow_mut().push(format!("-row {time}"));
            }
        }
        let events = std::rc::Rc::new(std::cell::RefCell::new(Vec::new()));
        let mut table = Table::new(1, 1, "observed");
        table.add_observer(Box::new(Recorder(events.clone())));
        table.set_data_limits(Some(DataLimits {
            max_points: 1,
            max_seconds: 0.0,
        }));
        let a = table.add_column("a", ValueKind::F64).unwrap();
        for t in 1..=3 {
            let mut row = TableRow::with_time(f64::from(t));
            row.set_value(a, 0.0);
            table.add_row(&row).unwrap();
        }
        table.remove_column(a).unwrap();
        // Limit 1 halves to 1, so every add swaps; the row added at t=1 is
        // evicted while t=2 is added, and so on.
        assert_eq!(
            *events.borrow(),
            vec![
                "+col 1 a".to_string(),
                "+row 1".to_string(),
                "+row 2".to_string(),
                "-row 1".to_string(),
                "+row 3".to_string(),
                "-row 2".to_string(),
                "-col 1".to_string(),
            ]
        );
    }

    #[test]
    fn test_accept_merges_groups() {
        let (mut table, ids) =
            table_with_columns(&[("a", ValueKind::F64), ("b", ValueKind::F64)]);
        let mut row = TableRow::with_time(1.0);
        row.set_value(ids[0], 1.0);
        row.set_value(ids[1], 10.0);
        table.add_row(&row).unwrap();
        // Split the groups, then land a row in each at distinct times.
        let mut partial = TableRow::with_time(2.0);
        partial.set_value(ids[0], 2.0);
        table.add_row(&partial).unwrap();
        let mut other = TableRow::with_time(3.0);
        other.set_value(ids[1], 30.0);
        table.add_row(&other).unwrap();

        let mut seen: Vec<(f64, usize)> = Vec::new();
        let mut visitor = |row: &TableRow| {
            seen.push((row.time(), row.cell_count()));
            VisitControl::Continue
        };
        table.accept(0.0, f64::MAX, &mut visitor);
        assert_eq!(seen, vec![(1.0, 2), (2.0, 1), (3.0, 1)]);

        // End bound is exclusive; early stop works.
        seen.clear();
        let mut stopper = |row: &TableRow| {
            seen.push((row.time(), row.cell_count()));
            VisitControl::Stop
        };
        table.accept(1.5, 3.0, &mut stopper);
        assert_eq!(seen, vec![(2.0, 1)]);
    }

    #[test]
    fn test_flush_and_refill() {
        let (mut table, ids) = table_with_columns(&[("a", ValueKind::F64)]);
        let mut row = TableRow::with_time(1.0);
        row.set_value(ids[0], 1.0);
        table.add_row(&row).unwrap();
        let delayed = table.flush();
        assert!(!delayed.is_empty());
        assert!(table.is_empty());
        assert_eq!(table.column_count(), 1);
        // The emptied table accepts new rows normally.
        let mut row = TableRow::with_time(9.0);
        row.set_value(ids[0], 9.0);
        table.add_row(&row).unwrap();
        assert_eq!(
            table.column(ids[0]).unwrap().value_at_time(9.0),
            Some(CellValue::F64(9.0))
        );
    }

    #[test]
    fn test_flush_range() {
        let (mut table, ids) = table_with_columns(&[("a", ValueKind::F64)]);
        for t in 1..=5 {
            let mut row = TableRow::with_time(f64::from(t));
            row.set_value(ids[0], f64::from(t));
            table.add_row(&row).unwrap();
        }
        table.flush_range(2.0, 4.0);
        let column = table.column(ids[0]).unwrap();
        assert_eq!(column.len(), 3);
        assert!(column.value_at_time(2.0).is_none());
        assert!(column.value_at_time(3.0).is_none());
        assert_eq!(column.value_at_time(4.0), Some(CellValue::F64(4.0)));
    }

    #[test]
    fn test_erase_row() {
        let (mut table, ids) =
            table_with_columns(&[("a", ValueKind::F64), ("b", ValueKind::F64)]);
        for t in 1..=3 {
            let mut row = TableRow::with_time(f64::from(t));
            row.set_value(ids[0], f64::from(t));
            row.set_value(ids[1], f64::from(t) * 10.0);
            table.add_row(&row).unwrap();
        }
        assert!(table.erase_row(2.0, EraseBehavior::FixOffsets));
        assert!(!table.erase_row(2.0, EraseBehavior::FixOffsets));
        assert!(table.column(ids[1]).unwrap().value_at_time(2.0).is_none());
        assert_eq!(
            table.column(ids[1]).unwrap().value_at_time(3.0),
            Some(CellValue::F64(30.0))
        );
    }

    #[test]
    fn test_flush_column_isolates_it() {
        let (mut table, ids) =
            table_with_columns(&[("a", ValueKind::F64), ("b", ValueKind::F64)]);
        let mut row = TableRow::with_time(1.0);
        row.set_value(ids[0], 1.0);
        row.set_value(ids[1], 10.0);
        table.add_row(&row).unwrap();
        let delayed = table.flush_column(ids[1]).unwrap();
        assert!(!delayed.is_empty());
        assert!(table.column(ids[1]).unwrap().is_empty());
        assert_eq!(
            table.column(ids[0]).unwrap().value_at_time(1.0),
            Some(CellValue::F64(1.0))
        );
        // The flushed column is writable again at any time.
        let mut row = TableRow::with_time(0.5);
        row.set_value(ids[1], 5.0);
        table.add_row(&row).unwrap();
        assert_eq!(
            table.column(ids[1]).unwrap().value_at_time(0.5),
            Some(CellValue::F64(5.0))
        );
    }
}
