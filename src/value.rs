//! Cell value kinds and the conversions between them.

use crate::error::TableError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The storage kind of a column, fixed at column creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ValueKind {
    /// Unsigned 8-bit integer.
    U8,
    /// Signed 8-bit integer.
    I8,
    /// Unsigned 16-bit integer.
    U16,
    /// Signed 16-bit integer.
    I16,
    /// Unsigned 32-bit integer.
    U32,
    /// Signed 32-bit integer.
    I32,
    /// Unsigned 64-bit integer.
    U64,
    /// Signed 64-bit integer.
    I64,
    /// 32-bit floating point.
    F32,
    /// 64-bit floating point.
    F64,
    /// UTF-8 text.
    Text,
}

impl ValueKind {
    /// Returns true for every kind except [`ValueKind::Text`].
    pub fn is_numeric(self) -> bool {
        !matches!(self, Self::Text)
    }

    /// Human-readable kind name.
    pub fn name(self) -> &'static str {
        match self {
            Self::U8 => "u8",
            Self::I8 => "i8",
            Self::U16 => "u16",
            Self::I16 => "i16",
            Self::U32 => "u32",
            Self::I32 => "i32",
            Self::U64 => "u64",
            Self::I64 => "i64",
            Self::F32 => "f32",
            Self::F64 => "f64",
            Self::Text => "text",
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A single cell value of any supported kind.
///
/// Numeric values convert freely between kinds, with the usual narrowing
/// behavior of `as` casts. Text converts to numeric kinds only when it
/// parses; numeric values always format to text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CellValue {
    /// Unsigned 8-bit integer.
    U8(u8),
    /// Signed 8-bit integer.
    I8(i8),
    /// Unsigned 16-bit integer.
    U16(u16),
    /// Signed 16-bit integer.
    I16(i16),
    /// Unsigned 32-bit integer.
    U32(u32),
    /// Signed 32-bit integer.
    I32(i32),
    /// Unsigned 64-bit integer.
    U64(u64),
    /// Signed 64-bit integer.
    I64(i64),
    /// 32-bit floating point.
    F32(f32),
    /// 64-bit floating point.
    F64(f64),
    /// UTF-8 text.
    Text(String),
}

impl CellValue {
    /// Returns the kind of this value.
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

    /// Integer view of the value. `None` for floats and text.
    fn as_i128(&self) -> Option<i128> {
        match self {
            Self::U8(v) => Some(i128::from(*v)),
            Self::I8(v) => Some(i128::from(*v)),
            Self::U16(v) => Some(i128::from(*v)),
            Self::I16(v) => Some(i128::from(*v)),
            Self::U32(v) => Some(i128::from(*v)),
            Self::I32(v) => Some(i128::from(*v)),
            Self::U64(v) => Some(i128::from(*v)),
            Self::I64(v) => Some(i128::from(*v)),
            Self::F32(_) | Self::F64(_) | Self::Text(_) => None,
        }
    }

    /// Converts the value to `f64`. Text parses or fails with
    /// [`TableError::BadCast`].
    pub fn as_f64(&self) -> Result<f64, TableError> {
        match self {
            Self::F32(v) => Ok(f64::from(*v)),
            Self::F64(v) => Ok(*v),
            Self::Text(s) => s.trim().parse::<f64>().map_err(|_| TableError::BadCast {
                from: ValueKind::Text,
                to: ValueKind::F64,
            }),
            // Integer kinds above u32 may round; that matches cast semantics.
            #[allow(clippy::cast_precision_loss)]
            other => Ok(other.as_i128().unwrap_or_default() as f64),
        }
    }

    /// Converts the value into the given storage kind.
    ///
    /// Integer-to-integer conversions truncate like `as`; float-to-integer
    /// conversions saturate. Text targets format the value; text sources must
    /// parse as the target kind.
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_possible_wrap,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss
    )]
    pub fn cast_to(&self, kind: ValueKind) -> Result<CellValue, TableError> {
        if self.kind() == kind {
            return Ok(self.clone());
        }
        let bad_cast = || TableError::BadCast {
            from: self.kind(),
            to: kind,
        };
        if let Self::Text(s) = self {
            let s = s.trim();
            return match kind {
                ValueKind::U8 => s.parse().map(CellValue::U8).map_err(|_| bad_cast()),
                ValueKind::I8 => s.parse().map(CellValue::I8).map_err(|_| bad_cast()),
                ValueKind::U16 => s.parse().map(CellValue::U16).map_err(|_| bad_cast()),
                ValueKind::I16 => s.parse().map(CellValue::I16).map_err(|_| bad_cast()),
                ValueKind::U32 => s.parse().map(CellValue::U32).map_err(|_| bad_cast()),
                ValueKind::I32 => s.parse().map(CellValue::I32).map_err(|_| bad_cast()),
                ValueKind::U64 => s.parse().map(CellValue::U64).map_err(|_| bad_cast()),
                ValueKind::I64 => s.parse().map(CellValue::I64).map_err(|_| bad_cast()),
                ValueKind::F32 => s.parse().map(CellValue::F32).map_err(|_| bad_cast()),
                ValueKind::F64 => s.parse().map(CellValue::F64).map_err(|_| bad_cast()),
                ValueKind::Text => unreachable!("same-kind handled above"),
            };
        }
        if kind == ValueKind::Text {
            return Ok(CellValue::Text(self.to_string()));
        }
        // Numeric-to-numeric: integers keep full 64-bit precision; floats
        // route through f64.
        let value = match self.as_i128() {
            Some(int) => match kind {
                ValueKind::U8 => CellValue::U8(int as u8),
                ValueKind::I8 => CellValue::I8(int as i8),
                ValueKind::U16 => CellValue::U16(int as u16),
                ValueKind::I16 => CellValue::I16(int as i16),
                ValueKind::U32 => CellValue::U32(int as u32),
                ValueKind::I32 => CellValue::I32(int as i32),
                ValueKind::U64 => CellValue::U64(int as u64),
                ValueKind::I64 => CellValue::I64(int as i64),
                ValueKind::F32 => CellValue::F32(int as f32),
                ValueKind::F64 => CellValue::F64(int as f64),
                ValueKind::Text => unreachable!("text handled above"),
            },
            None => {
                let float = self.as_f64()?;
                match kind {
                    ValueKind::U8 => CellValue::U8(float as u8),
                    ValueKind::I8 => CellValue::I8(float as i8),
                    ValueKind::U16 => CellValue::U16(float as u16),
                    ValueKind::I16 => CellValue::I16(float as i16),
                    ValueKind::U32 => CellValue::U32(float as u32),
                    ValueKind::I32 => CellValue::I32(float as i32),
                    ValueKind::U64 => CellValue::U64(float as u64),
                    ValueKind::I64 => CellValue::I64(float as i64),
                    ValueKind::F32 => CellValue::F32(float as f32),
                    ValueKind::F64 => CellValue::F64(float),
                    ValueKind::Text => unreachable!("text handled above"),
                }
            }
        };
        Ok(value)
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::U8(v) => write!(f, "{v}"),
            Self::I8(v) => write!(f, "{v}"),
            Self::U16(v) => write!(f, "{v}"),
            Self::I16(v) => write!(f, "{v}"),
            Self::U32(v) => write!(f, "{v}"),
            Self::I32(v) => write!(f, "{v}"),
            Self::U64(v) => write!(f, "{v}"),
            Self::I64(v) => write!(f, "{v}"),
            Self::F32(v) => write!(f, "{v}"),
            Self::F64(v) => write!(f, "{v}"),
            Self::Text(v) => f.write_str(v),
        }
    }
}

impl From<u8> for CellValue {
    fn from(v: u8) -> Self {
        Self::U8(v)
    }
}
impl From<i8> for CellValue {
    fn from(v: i8) -> Self {
        Self::I8(v)
    }
}
impl From<u16> for CellValue {
    fn from(v: u16) -> Self {
        Self::U16(v)
    }
}
impl From<i16> for CellValue {
    fn from(v: i16) -> Self {
        Self::I16(v)
    }
}
impl From<u32> for CellValue {
    fn from(v: u32) -> Self {
        Self::U32(v)
    }
}
impl From<i32> for CellValue {
    fn from(v: i32) -> Self {
        Self::I32(v)
    }
}
impl From<u64> for CellValue {
    fn from(v: u64) -> Self {
        Self::U64(v)
    }
}
impl From<i64> for CellValue {
    fn from(v: i64) -> Self {
        Self::I64(v)
    }
}
impl From<f32> for CellValue {
    fn from(v: f32) -> Self {
        Self::F32(v)
    }
}
impl From<f64> for CellValue {
    fn from(v: f64) -> Self {
        Self::F64(v)
    }
}
impl From<&str> for CellValue {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}
impl From<String> for CellValue {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}
