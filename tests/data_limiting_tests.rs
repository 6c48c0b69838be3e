//! Retention behavior of both time index variants under point and age
//! limits.

use timecourse::{
    CellValue, Cursor, DataLimits, SubTable, TableManager, TableRow, TimeIndex, ValueKind,
};

fn limited_table(
    manager: &mut TableManager,
    max_points: usize,
    max_seconds: f64,
) -> (timecourse::TableId, timecourse::TableColumnId) {
    manager.set_data_limits(
        1,
        Some(DataLimits {
            max_points,
            max_seconds,
        }),
    );
    let table_id = manager.add_table(1, "limited").unwrap();
    let col = manager
        .table_mut(table_id)
        .unwrap()
        .add_column("v", ValueKind::F64)
        .unwrap();
    (table_id, col)
}

fn retained_times(manager: &TableManager, table_id: timecourse::TableId) -> Vec<f64> {
    let table = manager.table(table_id).unwrap();
    let view = table.columns().next().unwrap();
    let mut cursor = view.cursor();
    let mut times = Vec::new();
    while let Some((time, _)) = cursor.next() {
        times.push(time);
    }
    times
}

#[test]
fn test_point_limit_retains_recent_rows() {
    let mut manager = TableManager::new();
    let (table_id, col) = limited_table(&mut manager, 3, 0.0);
    for t in 1..=7 {
        let mut row = TableRow::with_time(f64::from(t));
        row.set_value(col, f64::from(t));
        manager.add_row(table_id, &row).unwrap();
    }
    // Swap-based limiting with limit 3 keeps {5, 6} plus the newest row.
    assert_eq!(retained_times(&manager, table_id), vec![5.0, 6.0, 7.0]);
}

#[test]
fn test_point_limits_three_and_four_agree() {
    let mut managers: Vec<TableManager> = Vec::new();
    for max_points in [3, 4] {
        let mut manager = TableManager::new();
        let (table_id, col) = limited_table(&mut manager, max_points, 0.0);
        for t in 1..=30 {
            let mut row = TableRow::with_time(f64::from(t));
            row.set_value(col, f64::from(t));
            manager.add_row(table_id, &row).unwrap();
        }
        assert_eq!(retained_times(&manager, table_id).last(), Some(&30.0));
        managers.push(manager);
    }
    // The +1-then-halve admission bound makes limits 3 and 4 identical.
    assert_eq!(retained_times(&managers[0], 1), retained_times(&managers[1], 1));
}

#[test]
fn test_seconds_limit_swap_points() {
    let mut manager = TableManager::new();
    let (table_id, col) = limited_table(&mut manager, 0, 5.0);
    let expected: Vec<(i32, Vec<f64>)> = vec![
        (1, vec![1.0]),
        (5, vec![1.0, 5.0]),
        // t=9 ages t=1 out of the window and triggers a swap; everything
        // moves to the stale bin in one step, nothing is discarded yet.
        (9, vec![1.0, 5.0, 9.0]),
        (13, vec![1.0, 5.0, 9.0, 13.0]),
        (17, vec![1.0, 5.0, 9.0, 13.0, 17.0]),
        // t=21 ages t=13 out; the swap discards the pre-t=13 stale bin.
        (21, vec![13.0, 17.0, 21.0]),
        (25, vec![13.0, 17.0, 21.0, 25.0]),
    ];
    for (t, retained) in expected {
        let mut row = TableRow::with_time(f64::from(t));
        row.set_value(col, f64::from(t));
        manager.add_row(table_id, &row).unwrap();
        assert_eq!(
            retained_times(&manager, table_id),
            retained,
            "after adding t={t}"
        );
    }
}

#[test]
fn test_limited_rows_stay_readable_across_swaps() {
    let mut manager = TableManager::new();
    let (table_id, col) = limited_table(&mut manager, 10, 0.0);
    for t in 1..=100 {
        let mut row = TableRow::with_time(f64::from(t));
        row.set_value(col, f64::from(t) * 3.0);
        manager.add_row(table_id, &row).unwrap();
    }
    let table = manager.table(table_id).unwrap();
    let view = table.column(col).unwrap();
    // Retention floats between half the limit and the limit.
    assert!(view.len() <= 10, "kept {} rows", view.len());
    assert!(view.len() >= 5, "kept only {} rows", view.len());
    // Every survivor reads back its own value.
    let (begin, end) = view.time_range().unwrap();
    assert_eq!(end, 100.0);
    assert_eq!(
        view.value_at_time(begin),
        Some(CellValue::F64(begin * 3.0))
    );
    assert_eq!(view.value_at_time(end), Some(CellValue::F64(end * 3.0)));
}

#[test]
fn test_unlimited_table_keeps_everything() {
    let mut manager = TableManager::new();
    let table_id = manager.add_table(1, "unlimited").unwrap();
    let col = manager
        .table_mut(table_id)
        .unwrap()
        .add_column("v", ValueKind::F64)
        .unwrap();
    for t in 1..=500 {
        let mut row = TableRow::with_time(f64::from(t));
        row.set_value(col, 0.0);
        manager.add_row(table_id, &row).unwrap();
    }
    assert_eq!(manager.table(table_id).unwrap().column(col).unwrap().len(), 500);
}

#[test]
fn test_zero_limits_mean_unlimited() {
    let mut manager = TableManager::new();
    let (table_id, col) = limited_table(&mut manager, 0, 0.0);
    // Both fields zero: the limits are dropped entirely.
    assert!(manager.table(table_id).unwrap().data_limits().is_none());
    for t in 1..=50 {
        let mut row = TableRow::with_time(f64::from(t));
        row.set_value(col, 0.0);
        manager.add_row(table_id, &row).unwrap();
    }
    assert_eq!(manager.table(table_id).unwrap().column(col).unwrap().len(), 50);
}

#[test]
fn test_single_buffer_subtable_keeps_exact_count() {
    // The single-buffered index trades amortized cost for exact retention.
    let mut subtable = SubTable::new(TimeIndex::single_buffer());
    subtable.add_column(1, "v", ValueKind::F64).unwrap();
    for t in 1..=7 {
        let mut txn = subtable.add_row(f64::from(t)).unwrap();
        txn.set_cell(1, &CellValue::F64(f64::from(t) * 10.0)).unwrap();
        assert!(txn.commit().is_none());
        subtable.limit_data(3, 0.0, &mut |_| {});
    }
    assert_eq!(subtable.len(), 3);
    assert_eq!(subtable.time_range(), Some((5.0, 7.0)));
    let view = subtable.column(1).unwrap();
    for t in [5.0, 6.0, 7.0] {
        assert_eq!(view.value_at_time(t), Some(CellValue::F64(t * 10.0)));
    }
}

#[test]
fn test_single_buffer_age_limit_is_exact() {
    let mut subtable = SubTable::new(TimeIndex::single_buffer());
    subtable.add_column(1, "v", ValueKind::F64).unwrap();
    for t in (1..=25).step_by(4) {
        let time = f64::from(t);
        let mut txn = subtable.add_row(time).unwrap();
        txn.set_cell(1, &CellValue::F64(time)).unwrap();
        txn.commit();
        subtable.limit_data(usize::MAX, time - 5.0, &mut |_| {});
    }
    // Unlike the double-buffered variant, nothing older than the window
    // survives.
    assert_eq!(subtable.time_range(), Some((21.0, 25.0)));
    assert_eq!(subtable.len(), 2);
}
