//! # timecourse
//!
//! In-memory, per-entity, time-indexed data tables with columnar typed
//! storage, amortized-O(1) data limiting, and null-less column grouping.
//!
//! A [`Table`] stores rows keyed by a floating-point time. Each column holds
//! exactly one of eleven value kinds and is stored contiguously, so reads,
//! interpolation, and range scans stay type-stable and cache-friendly.
//! Internally a table partitions its columns into *subtables*: groups of
//! columns guaranteed to all have a value at every time the group holds.
//! When a row update supplies values for only some columns of a group, the
//! group splits so the guarantee never breaks.
//!
//! Old data is discarded through a double-buffered time index: new rows are
//! only ever appended to the *fresh* buffer, and once the fresh buffer
//! crosses the configured point or age threshold the buffers swap and the
//! stale contents are dropped wholesale. Inserts stay amortized O(1); the
//! cost of limiting is paid in bursts rather than per row.
//!
//! ## Quick start
//!
//! ```rust
//! use timecourse::{TableManager, TableRow, ValueKind};
//!
//! # fn main() -> Result<(), timecourse::TableError> {
//! let mut manager = TableManager::new();
//! let table_id = manager.add_table(1, "Fuel State")?;
//!
//! let table = manager.table_mut(table_id).expect("just created");
//! let mass = table.add_column("Fuel Mass", ValueKind::F64)?;
//! let tank = table.add_column("Active Tank", ValueKind::U8)?;
//!
//! let mut row = TableRow::with_time(10.0);
//! row.set_value(mass, 1824.5);
//! row.set_value(tank, 2u8);
//! table.add_row(&row)?;
//!
//! let column = table.column(mass).expect("column exists");
//! assert_eq!(column.interpolate(10.0, None)?, 1824.5);
//! # Ok(())
//! # }
//! ```
//!
//! ## Concurrency model
//!
//! Single writer, no internal locking: all structural mutation must be
//! serialized by the caller. Cursors borrow the structure they walk, so the
//! borrow checker rejects any attempt to retain one across a mutation.
//! Persistence, replication, and multi-writer access are out of scope.

#![deny(missing_docs)]
#![deny(clippy::all, clippy::pedantic)]
#![allow(
    clippy::module_name_repetitions,
    clippy::must_use_candidate,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::float_cmp,
    clippy::return_self_not_must_use,
    clippy::similar_names
)]

pub mod column;
pub mod container;
pub mod cursor;
pub mod double_buffer;
pub mod error;
pub mod flush;
pub mod interpolate;
pub mod manager;
pub mod row;
pub mod single_buffer;
pub mod subtable;
pub mod table;
pub mod time;
pub mod value;

pub use column::{ColumnCursor, ColumnRef, DataColumn};
pub use cursor::Cursor;
pub use double_buffer::DoubleBufferTimeIndex;
pub use error::TableError;
pub use flush::DelayedFlush;
pub use interpolate::{Interpolator, LinearInterpolator};
pub use manager::{ManagerObserver, NewRowListener, TableManager};
pub use row::{RowVisitor, TableRow, VisitControl};
pub use single_buffer::SingleBufferTimeIndex;
pub use subtable::{RowTransaction, SubTable, SubTableSplit};
pub use table::{DataLimits, Table, TableObserver};
pub use time::{Bin, EraseBehavior, TimeCursor, TimeIndex, TimePosition};
pub use value::{CellValue, ValueKind};

/// Identifies a column within its owning table. Assigned once at column
/// creation and never reused for the lifetime of the table.
pub type TableColumnId = u64;

/// Identifies a table within a [`TableManager`].
pub type TableId = u64;

/// Identifies the entity that owns a group of tables, typically the entity id
/// of a simulation data store.
pub type OwnerId = u64;

/// Identifies a registered observer, for later removal.
pub type ObserverId = u64;
