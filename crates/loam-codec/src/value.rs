use crate::error::{FormatError, FormatResult};
use crate::format::FieldType;

/// A decoded or to-be-encoded field value.
///
/// All integer widths share [`FieldValue::Int`]; encoding keeps the low
/// bytes of the two's-complement value and decoding sign-extends them.
#[derive(Clone, Debug, PartialEq)]
pub enum FieldValue {
    Bool(bool),
    Int(i64),
    F32(f32),
    F64(f64),
    Bytes(Vec<u8>),
}

impl FieldValue {
    /// Short name of the variant, used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::F32(_) => "f32",
            Self::F64(_) => "f64",
            Self::Bytes(_) => "bytes",
        }
    }

    /// Whether this value can be written into `field`.
    pub fn fits(&self, field: &FieldType) -> bool {
        matches!(
            (field, self),
            (FieldType::Bool, Self::Bool(_))
                | (FieldType::Short | FieldType::Word | FieldType::Long, Self::Int(_))
                | (FieldType::F32, Self::F32(_))
                | (FieldType::F64, Self::F64(_))
                | (FieldType::Bytes(_), Self::Bytes(_))
        )
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_f32(&self) -> Option<f32> {
        match self {
            Self::F32(x) => Some(*x),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::F64(x) => Some(*x),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Self::Bytes(b) => Some(b),
            _ => None,
        }
    }
}

impl From<bool> for FieldValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<i64> for FieldValue {
    fn from(n: i64) -> Self {
        Self::Int(n)
    }
}

impl From<i32> for FieldValue {
    fn from(n: i32) -> Self {
        Self::Int(n.into())
    }
}

impl From<u32> for FieldValue {
    fn from(n: u32) -> Self {
        Self::Int(n.into())
    }
}

impl From<u16> for FieldValue {
    fn from(n: u16) -> Self {
        Self::Int(n.into())
    }
}

impl From<f32> for FieldValue {
    fn from(x: f32) -> Self {
        Self::F32(x)
    }
}

impl From<f64> for FieldValue {
    fn from(x: f64) -> Self {
        Self::F64(x)
    }
}

impl From<Vec<u8>> for FieldValue {
    fn from(b: Vec<u8>) -> Self {
        Self::Bytes(b)
    }
}

impl From<&[u8]> for FieldValue {
    fn from(b: &[u8]) -> Self {
        Self::Bytes(b.to_vec())
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        Self::Bytes(s.as_bytes().to_vec())
    }
}

/// Sequential typed access to decoded values.
///
/// Each accessor consumes one value and fails with
/// [`FormatError::TypeMismatch`] if it has the wrong variant, or
/// [`FormatError::MissingValues`] once the values run out.
#[derive(Debug)]
pub struct FieldCursor {
    values: std::vec::IntoIter<FieldValue>,
    total: usize,
    index: usize,
}

impl FieldCursor {
    pub fn new(values: Vec<FieldValue>) -> Self {
        Self {
            total: values.len(),
            values: values.into_iter(),
            index: 0,
        }
    }

    /// Number of values not yet consumed.
    pub fn remaining(&self) -> usize {
        self.total - self.index
    }

    fn next(&mut self) -> FormatResult<(usize, FieldValue)> {
        let index = self.index;
        let value = self.values.next().ok_or(FormatError::MissingValues {
            expected: index + 1,
            actual: self.total,
        })?;
        self.index += 1;
        Ok((index, value))
    }

    pub fn bool(&mut self) -> FormatResult<bool> {
        match self.next()? {
            (_, FieldValue::Bool(b)) => Ok(b),
            (index, other) => Err(mismatch(index, FieldType::Bool, &other)),
        }
    }

    pub fn int(&mut self) -> FormatResult<i64> {
        match self.next()? {
            (_, FieldValue::Int(n)) => Ok(n),
            (index, other) => Err(mismatch(index, FieldType::Long, &other)),
        }
    }

    pub fn f32(&mut self) -> FormatResult<f32> {
        match self.next()? {
            (_, FieldValue::F32(x)) => Ok(x),
            (index, other) => Err(mismatch(index, FieldType::F32, &other)),
        }
    }

    pub fn f64(&mut self) -> FormatResult<f64> {
        match self.next()? {
            (_, FieldValue::F64(x)) => Ok(x),
            (index, other) => Err(mismatch(index, FieldType::F64, &other)),
        }
    }

    pub fn bytes(&mut self) -> FormatResult<Vec<u8>> {
        match self.next()? {
            (_, FieldValue::Bytes(b)) => Ok(b),
            (index, other) => Err(mismatch(index, FieldType::Bytes(0), &other)),
        }
    }
}

fn mismatch(index: usize, expected: FieldType, actual: &FieldValue) -> FormatError {
    FormatError::TypeMismatch {
        index,
        expected,
        actual: actual.type_name(),
    }
}
