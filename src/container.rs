//! Typed contiguous cell storage backing one buffer of a data column.

use crate::error::TableError;
use crate::value::{CellValue, ValueKind};
use std::collections::VecDeque;

/// One buffer of typed cell storage.
///
/// Every variant keeps its cells in a [`VecDeque`] so eviction from the
/// front is O(1). A container never changes kind after creation; values of
/// other kinds are converted on the way in by [`CellValue::cast_to`].
#[derive(Debug, Clone)]
pub enum DataContainer {
    /// `u8` cells.
    U8(VecDeque<u8>),
    /// `i8` cells.
    I8(VecDeque<i8>),
    /// `u16` cells.
    U16(VecDeque<u16>),
    /// `i16` cells.
    I16(VecDeque<i16>),
    /// `u32` cells.
    U32(VecDeque<u32>),
    /// `i32` cells.
    I32(VecDeque<i32>),
    /// `u64` cells.
    U64(VecDeque<u64>),
    /// `i64` cells.
    I64(VecDeque<i64>),
    /// `f32` cells.
    F32(VecDeque<f32>),
    /// `f64` cells.
    F64(VecDeque<f64>),
    /// Text cells.
    Text(VecDeque<String>),
}

/// Applies `$body` to the inner deque of any variant, binding it as `$deque`.
macro_rules! with_deque {
    ($container:expr, $deque:ident => $body:expr) => {
        match $container {
            DataContainer::U8($deque) => $body,
            DataContainer::I8($deque) => $body,
            DataContainer::U16($deque) => $body,
            DataContainer::I16($deque) => $body,
            DataContainer::U32($deque) => $body,
            DataContainer::I32($deque) => $body,
            DataContainer::U64($deque) => $body,
            DataContainer::I64($deque) => $body,
            DataContainer::F32($deque) => $body,
            DataContainer::F64($deque) => $body,
            DataContainer::Text($deque) => $body,
        }
    };
}

/// Matches a container against a [`CellValue`] of the same kind, binding the
/// deque and the typed cell. The caller must have already converted the
/// value to the container's kind.
macro_rules! with_matched {
    ($container:expr, $value:expr, $deque:ident, $cell:ident => $body:expr) => {
        match ($container, $value) {
            (DataContainer::U8($deque), CellValue::U8($cell)) => $body,
            (DataContainer::I8($deque), CellValue::I8($cell)) => $body,
            (DataContainer::U16($deque), CellValue::U16($cell)) => $body,
            (DataContainer::I16($deque), CellValue::I16($cell)) => $body,
            (DataContainer::U32($deque), CellValue::U32($cell)) => $body,
            (DataContainer::I32($deque), CellValue::I32($cell)) => $body,
            (DataContainer::U64($deque), CellValue::U64($cell)) => $body,
            (DataContainer::I64($deque), CellValue::I64($cell)) => $body,
            (DataContainer::F32($deque), CellValue::F32($cell)) => $body,
            (DataContainer::F64($deque), CellValue::F64($cell)) => $body,
            (DataContainer::Text($deque), CellValue::Text($cell)) => $body,
            _ => unreachable!("value kind does not match container kind"),
        }
    };
}

impl DataContainer {
    /// Creates an empty container of the given kind.
    pub fn new(kind: ValueKind) -> Self {
        match kind {
            ValueKind::U8 => Self::U8(VecDeque::new()),
            ValueKind::I8 => Self::I8(VecDeque::new()),
            ValueKind::U16 => Self::U16(VecDeque::new()),
            ValueKind::I16 => Self::I16(VecDeque::new()),
            ValueKind::U32 => Self::U32(VecDeque::new()),
            ValueKind::I32 => Self::I32(VecDeque::new()),
            ValueKind::U64 => Self::U64(VecDeque::new()),
            ValueKind::I64 => Self::I64(VecDeque::new()),
            ValueKind::F32 => Self::F32(VecDeque::new()),
            ValueKind::F64 => Self::F64(VecDeque::new()),
            ValueKind::Text => Self::Text(VecDeque::new()),
        }
    }

    /// The storage kind of this container.
    pub fn kind(&self) -> ValueKind {
        match self {
            Self::U8(_) => ValueKind::U8,
            Self::I8(_) => ValueKind::I8,
            Self::U16(_) => ValueKind::U16,
            Self::I16(_) => ValueKind::I16,
            Self::U32(_) => ValueKind::U32,
            Self::I32(_) => ValueKind::I32,
            Self::U64(_) => ValueKind::U64,
            Self::I64(_) => ValueKind::I64,
            Self::F32(_) => ValueKind::F32,
            Self::F64(_) => ValueKind::F64,
            Self::Text(_) => ValueKind::Text,
        }
    }

    /// Number of cells stored.
    pub fn len(&self) -> usize {
        with_deque!(self, d => d.len())
    }

    /// True when the container holds no cells.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drops all cells, keeping the allocation.
    pub fn clear(&mut self) {
        with_deque!(self, d => d.clear());
    }

    /// Inserts `value` at `position`, shifting later cells right. The value
    /// is converted to this container's kind; `position == len` appends.
    pub fn insert(&mut self, position: usize, value: &CellValue) -> Result<(), TableError> {
        if position > self.len() {
            return Err(TableError::PositionOutOfRange {
                position,
                len: self.len(),
            });
        }
        let converted = value.cast_to(self.kind())?;
        with_matched!(self, converted, d, cell => d.insert(position, cell));
        Ok(())
    }

    /// Overwrites the cell at `position` with `value`, converting it to this
    /// container's kind.
    pub fn replace(&mut self, position: usize, value: &CellValue) -> Result<(), TableError> {
        if position >= self.len() {
            return Err(TableError::PositionOutOfRange {
                position,
                len: self.len(),
            });
        }
        let converted = value.cast_to(self.kind())?;
        with_matched!(self, converted, d, cell => d[position] = cell);
        Ok(())
    }

    /// Reads the cell at `position` as a [`CellValue`] of this container's
    /// kind.
    pub fn get(&self, position: usize) -> Option<CellValue> {
        match self {
            Self::U8(d) => d.get(position).copied().map(CellValue::U8),
            Self::I8(d) => d.get(position).copied().map(CellValue::I8),
            Self::U16(d) => d.get(position).copied().map(CellValue::U16),
            Self::I16(d) => d.get(position).copied().map(CellValue::I16),
            Self::U32(d) => d.get(position).copied().map(CellValue::U32),
            Self::I32(d) => d.get(position).copied().map(CellValue::I32),
            Self::U64(d) => d.get(position).copied().map(CellValue::U64),
            Self::I64(d) => d.get(position).copied().map(CellValue::I64),
            Self::F32(d) => d.get(position).copied().map(CellValue::F32),
            Self::F64(d) => d.get(position).copied().map(CellValue::F64),
            Self::Text(d) => d.get(position).cloned().map(CellValue::Text),
        }
    }

    /// Reads the cell at `position` as `f64`. Fails for text cells that do
    /// not parse as a number.
    pub fn get_f64(&self, position: usize) -> Result<f64, TableError> {
        match self.get(position) {
            Some(value) => value.as_f64(),
            None => Err(TableError::PositionOutOfRange {
                position,
                len: self.len(),
            }),
        }
    }

    /// Removes `count` cells starting at `position`. Removal from the front
    /// pops in O(count) without shifting the remainder.
    pub fn erase(&mut self, position: usize, count: usize) -> Result<(), TableError> {
        let len = self.len();
        if position + count > len {
            return Err(TableError::PositionOutOfRange {
                position: position + count,
                len,
            });
        }
        with_deque!(self, d => {
            if position == 0 {
                for _ in 0..count {
                    d.pop_front();
                }
            } else {
                d.drain(position..position + count);
            }
        });
        Ok(())
    }
}
