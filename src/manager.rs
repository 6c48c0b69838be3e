//! Table ownership: creation, lookup, per-owner limits, and manager-level
//! observers.

use crate::error::TableError;
use crate::row::TableRow;
use crate::table::{DataLimits, Table};
use crate::{ObserverId, OwnerId, TableId};
use std::collections::HashMap;

/// Receives table lifecycle events from a [`TableManager`].
pub trait ManagerObserver {
    /// A table was created.
    fn on_add_table(&mut self, _table_id: TableId, _owner: OwnerId, _name: &str) {}
    /// A table is about to be removed.
    fn on_pre_remove_table(&mut self, _table_id: TableId, _owner: OwnerId, _name: &str) {}
}

/// Receives row notifications for rows added through the manager.
pub trait NewRowListener {
    /// A row was stored in the given table.
    fn on_new_row(&mut self, owner: OwnerId, table_id: TableId, time: f64);
}

/// Owns every table, keyed by id and by `(owner, name)`.
///
/// Per-owner [`DataLimits`] apply to all of an owner's tables, current and
/// future. Row listeners fire only for rows routed through
/// [`TableManager::add_row`]; rows added directly on a [`Table`] borrow do
/// not pass through the manager.
#[derive(Default)]
pub struct TableManager {
    tables: HashMap<TableId, Table>,
    names: HashMap<(OwnerId, String), TableId>,
    limits: HashMap<OwnerId, DataLimits>,
    next_table_id: TableId,
    observers: Vec<(ObserverId, Box<dyn ManagerObserver>)>,
    listeners: Vec<(ObserverId, Box<dyn NewRowListener>)>,
    next_observer_id: ObserverId,
}

impl std::fmt::Debug for TableManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TableManager")
            .field("tables", &self.tables.len())
            .finish_non_exhaustive()
    }
}

impl TableManager {
    /// Creates an empty manager.
    pub fn new() -> Self {
        Self {
            next_table_id: 1,
            next_observer_id: 1,
            ..Self::default()
        }
    }

    /// Number of tables.
    pub fn table_count(&self) -> usize {
        self.tables.len()
    }

    /// Creates an empty table for `owner`. Names must be non-empty and
    /// unique per owner.
    pub fn add_table(
        &mut self,
        owner: OwnerId,
        name: impl Into<String>,
    ) -> Result<TableId, TableError> {
        let name = name.into();
        if name.is_empty() {
            return Err(TableError::EmptyName);
        }
        if self.names.contains_key(&(owner, name.clone())) {
            return Err(TableError::DuplicateTableName(name));
        }
        let table_id = self.next_table_id;
        self.next_table_id += 1;
        let mut table = Table::new(table_id, owner, name.clone());
        if let Some(limits) = self.limits.get(&owner) {
            table.set_data_limits(Some(*limits));
        }
        self.tables.insert(table_id, table);
        self.names.insert((owner, name.clone()), table_id);
        log::debug!("added table {table_id} ({name}) for owner {owner}");
        for (_, observer) in &mut self.observers {
            observer.on_add_table(table_id, owner, &name);
        }
        Ok(table_id)
    }

    /// Looks up a table by id.
    pub fn table(&self, table_id: TableId) -> Option<&Table> {
        self.tables.get(&table_id)
    }

    /// Looks up a table by id, mutably.
    pub fn table_mut(&mut self, table_id: TableId) -> Option<&mut Table> {
        self.tables.get_mut(&table_id)
    }

    /// Looks up an owner's table by name.
    pub fn table_by_name(&self, owner: OwnerId, name: &str) -> Option<&Table> {
        let table_id = self.names.get(&(owner, name.to_string()))?;
        self.tables.get(table_id)
    }

    /// All tables belonging to `owner`, in no particular order.
    pub fn owner_tables(&self, owner: OwnerId) -> impl Iterator<Item = &Table> {
        self.tables.values().filter(move |t| t.owner() == owner)
    }

    /// Removes a table and all its data.
    pub fn remove_table(&mut self, table_id: TableId) -> Result<(), TableError> {
        let table = self.tables.get(&table_id).ok_or(TableError::TableNotFound)?;
        let owner = table.owner();
        let name = table.name().to_string();
        for (_, observer) in &mut self.observers {
            observer.on_pre_remove_table(table_id, owner, &name);
        }
        self.tables.remove(&table_id);
        self.names.remove(&(owner, name));
        Ok(())
    }

    /// Removes every table belonging to `owner`. Returns how many went.
    pub fn remove_tables_by_owner(&mut self, owner: OwnerId) -> usize {
        let ids: Vec<TableId> = self
            .tables
            .values()
            .filter(|t| t.owner() == owner)
            .map(Table::id)
            .collect();
        for table_id in &ids {
            // The id came straight out of the map.
            let _ = self.remove_table(*table_id);
        }
        ids.len()
    }

    /// Sets or clears retention limits for all of an owner's tables,
    /// current and future.
    pub fn set_data_limits(&mut self, owner: OwnerId, limits: Option<DataLimits>) {
        match limits {
            Some(limits) => {
                self.limits.insert(owner, limits);
            }
            None => {
                self.limits.remove(&owner);
            }
        }
        for table in self.tables.values_mut() {
            if table.owner() == owner {
                table.set_data_limits(limits);
            }
        }
    }

    /// Current retention limits for `owner`.
    pub fn data_limits(&self, owner: OwnerId) -> Option<DataLimits> {
        self.limits.get(&owner).copied()
    }

    /// Adds a row to a table by id, then notifies the row listeners.
    pub fn add_row(&mut self, table_id: TableId, row: &TableRow) -> Result<(), TableError> {
        let table = self
            .tables
            .get_mut(&table_id)
            .ok_or(TableError::TableNotFound)?;
        let owner = table.owner();
        table.add_row(row)?;
        for (_, listener) in &mut self.listeners {
            listener.on_new_row(owner, table_id, row.time());
        }
        Ok(())
    }

    /// Registers a lifecycle observer; the id removes it later.
    pub fn add_observer(&mut self, observer: Box<dyn ManagerObserver>) -> ObserverId {
        let id = self.next_observer_id;
        self.next_observer_id += 1;
        self.observers.push((id, observer));
        id
    }

    /// Removes a previously registered lifecycle observer.
    pub fn remove_observer(&mut self, observer_id: ObserverId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(id, _)| *id != observer_id);
        self.observers.len() != before
    }

    /// Registers a row listener; the id removes it later.
    pub fn add_row_listener(&mut self, listener: Box<dyn NewRowListener>) -> ObserverId {
        let id = self.next_observer_id;
        self.next_observer_id += 1;
        self.listeners.push((id, listener));
        id
    }

    /// Removes a previously registered row listener.
    pub fn remove_row_listener(&mut self, listener_id: ObserverId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(id, _)| *id != listener_id);
        self.listeners.len() != before
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::ValueKind;

    #[test]
    fn test_table_names_unique_per_owner() {
        let mut manager = TableManager::new();
        let a = manager.add_table(1, "track quality").unwrap();
        assert_eq!(
            manager.add_table(1, "track quality").unwrap_err(),
            TableError::DuplicateTableName("track quality".to_string())
        );
        // Same name under a different owner is fine.
        let b = manager.add_table(2, "track quality").unwrap();
        assert_ne!(a, b);
        assert_eq!(manager.table_count(), 2);
        assert_eq!(
            manager.table_by_name(1, "track quality").map(Table::id),
            Some(a)
        );
    }

    #[test]
    fn test_empty_table_name_rejected() {
        let mut manager = TableManager::new();
        assert_eq!(manager.add_table(1, "").unwrap_err(), TableError::EmptyName);
    }

    #[test]
    fn test_remove_tables_by_owner() {
        let mut manager = TableManager::new();
        manager.add_table(1, "a").unwrap();
        manager.add_table(1, "b").unwrap();
        let keep = manager.add_table(2, "c").unwrap();
        assert_eq!(manager.remove_tables_by_owner(1), 2);
        assert_eq!(manager.table_count(), 1);
        assert!(manager.table(keep).is_some());
        assert!(manager.table_by_name(1, "a").is_none());
        // Freed names are reusable.
        manager.add_table(1, "a").unwrap();
    }

    #[test]
    fn test_limits_apply_to_current_and_future_tables() {
        let mut manager = TableManager::new();
        let before = manager.add_table(1, "before").unwrap();
        manager.set_data_limits(
            1,
            Some(DataLimits {
                max_points: 10,
                max_seconds: 0.0,
            }),
        );
        let after = manager.add_table(1, "after").unwrap();
        let other = manager.add_table(2, "other").unwrap();
        assert_eq!(
            manager.table(before).unwrap().data_limits().map(|l| l.max_points),
            Some(10)
        );
        assert_eq!(
            manager.table(after).unwrap().data_limits().map(|l| l.max_points),
            Some(10)
        );
        assert!(manager.table(other).unwrap().data_limits().is_none());
        manager.set_data_limits(1, None);
        assert!(manager.table(before).unwrap().data_limits().is_none());
    }

    #[test]
    fn test_manager_observers_fire() {
        #[derive(Default)]
        struct Recorder(std::rc::Rc<std::cell::RefCell<Vec<String>>>);
        impl ManagerObserver for Recorder {
            fn on_add_table(&mut self, table_id: TableId, owner: OwnerId, name: &str) {
                self.0
                    .borrow_mut()
                    .push(format!("+{table_id} {owner} {name}"));
            }
            fn on_pre_remove_table(&mut self, table_id: TableId, _owner: OwnerId, _name: &str) {
                self.0.borrow_mut().push(format!("-{table_id}"));
            }
        }
        let events = std::rc::Rc::new(std::cell::RefCell::new(Vec::new()));
        let mut manager = TableManager::new();
        let observer_id = manager.add_observer(Box::new(Recorder(events.clone())));
        let t = manager.add_table(7, "platform data").unwrap();
        manager.remove_table(t).unwrap();
        assert!(manager.remove_observer(observer_id));
        manager.add_table(7, "unobserved").unwrap();
        assert_eq!(
            *events.borrow(),
            vec![format!("+{t} 7 platform data"), format!("-{t}")]
        );
    }

    #[test]
    fn test_row_listener_fires_through_manager_only() {
        struct Counter(std::rc::Rc<std::cell::Cell<usize>>);
        impl NewRowListener for Counter {
            fn on_new_row(&mut self, _owner: OwnerId, _table_id: TableId, _time: f64) {
                self.0.set(self.0.get() + 1);
            }
        }
        let count = std::rc::Rc::new(std::cell::Cell::new(0));
        let mut manager = TableManager::new();
        manager.add_row_listener(Box::new(Counter(count.clone())));
        let table_id = manager.add_table(1, "t").unwrap();
        let col = manager
            .table_mut(table_id)
            .unwrap()
            .add_column("a", ValueKind::F64)
            .unwrap();
        let mut row = TableRow::with_time(1.0);
        row.set_value(col, 1.0);
        manager.add_row(table_id, &row).unwrap();
        assert_eq!(count.get(), 1);
        // Direct table access bypasses the manager and its listeners.
        row.set_time(2.0);
        manager.table_mut(table_id).unwrap().add_row(&row).unwrap();
        assert_eq!(count.get(), 1);
        assert_eq!(
            manager.add_row(999, &row).unwrap_err(),
            TableError::TableNotFound
        );
    }
}
