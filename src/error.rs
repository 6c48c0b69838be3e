//! Error type shared by all fallible table operations.

use crate::TableColumnId;
use crate::value::ValueKind;
use std::fmt;

/// Error type for table, column, and row operations.
///
/// Every variant represents a recoverable input error. Structurally
/// impossible states (position/time desynchronization, duplicate column id
/// reuse) are debug assertions inside the crate, not error values.
#[derive(Debug, Clone, PartialEq)]
pub enum TableError {
    /// A name (table or column) was empty where a non-empty name is required.
    EmptyName,
    /// A column with this name already exists in the table.
    DuplicateColumnName(String),
    /// A table with this name already exists for the owner.
    DuplicateTableName(String),
    /// No column with this id is known to the table or subtable.
    ColumnNotFound(TableColumnId),
    /// No column with this name is known to the table.
    ColumnNameNotFound(String),
    /// No table with the requested id exists.
    TableNotFound,
    /// Columns may only be added while the subtable holds no rows.
    NonEmptySubTable,
    /// A cell position was outside the storage bounds.
    PositionOutOfRange {
        /// Requested position.
        position: usize,
        /// Current storage length.
        len: usize,
    },
    /// A stored value could not be converted to the requested kind.
    BadCast {
        /// Kind of the stored value.
        from: ValueKind,
        /// Kind requested by the caller.
        to: ValueKind,
    },
    /// The column's value kind does not support interpolation.
    NotInterpolatable(ValueKind),
    /// The query time precedes the first stored sample.
    TimeBeforeStart {
        /// Requested time.
        query: f64,
        /// Earliest stored time.
        first: f64,
    },
    /// The operation requires at least one stored sample.
    NoData,
    /// The supplied time is not a valid row key (NaN).
    InvalidTime(f64),
    /// A row must carry at least one cell to be added.
    EmptyRow,
}

impl fmt::Display for TableError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyName => write!(f, "Empty name not permitted"),
            Self::DuplicateColumnName(name) => {
                write!(f, "Column name already exists: {name}")
            }
            Self::DuplicateTableName(name) => {
                write!(f, "Table with name already exists for owner: {name}")
            }
            Self::ColumnNotFound(id) => write!(f, "Column id {id} does not exist"),
            Self::ColumnNameNotFound(name) => write!(f, "Column \"{name}\" does not exist"),
            Self::TableNotFound => write!(f, "Table not found"),
            Self::NonEmptySubTable => write!(
                f,
                "Cannot add a column to a non-empty subtable; would violate the null-less state"
            ),
            Self::PositionOutOfRange { position, len } => {
                write!(f, "Position {position} out of range for length {len}")
            }
            Self::BadCast { from, to } => {
                write!(f, "Cannot convert {from} value to {to}")
            }
            Self::NotInterpolatable(kind) => {
                write!(f, "Columns of kind {kind} do not support interpolation")
            }
            Self::TimeBeforeStart { query, first } => {
                write!(f, "Requested time {query} precedes first sample at {first}")
            }
            Self::NoData => write!(f, "No data"),
            Self::InvalidTime(time) => write!(f, "Invalid row time: {time}"),
            Self::EmptyRow => write!(f, "Cannot add an empty row"),
        }
    }
}

impl std::error::Error for TableError {}
