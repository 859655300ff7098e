use std::fmt;

use crate::error::{FormatError, FormatResult};

/// A single fixed-width field in a record.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FieldType {
    /// `?`: one byte, zero is `false`.
    Bool,
    /// `h` / `H`: 2-byte integer.
    Short,
    /// `i` / `I` / `l` / `L`: 4-byte integer.
    Word,
    /// `q` / `Q`: 8-byte integer.
    Long,
    /// `f`: IEEE 754 single precision.
    F32,
    /// `d`: IEEE 754 double precision.
    F64,
    /// `Ns`: N-byte span, zero-padded on the right.
    Bytes(usize),
}

impl FieldType {
    /// Parse one format token.
    pub fn parse(token: &str) -> FormatResult<Self> {
        let field = match token {
            "?" => Self::Bool,
            "h" | "H" => Self::Short,
            "i" | "I" | "l" | "L" => Self::Word,
            "q" | "Q" => Self::Long,
            "f" => Self::F32,
            "d" => Self::F64,
            _ => {
                let count = token
                    .strip_suffix('s')
                    .filter(|n| !n.is_empty() && n.bytes().all(|b| b.is_ascii_digit()))
                    .ok_or_else(|| FormatError::UnknownToken(token.to_string()))?;
                let width = count
                    .parse()
                    .map_err(|_| FormatError::UnknownToken(token.to_string()))?;
                Self::Bytes(width)
            }
        };
        Ok(field)
    }

    /// Encoded width in bytes.
    pub fn width(&self) -> usize {
        match self {
            Self::Bool => 1,
            Self::Short => 2,
            Self::Word | Self::F32 => 4,
            Self::Long | Self::F64 => 8,
            Self::Bytes(n) => *n,
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool => f.write_str("?"),
            Self::Short => f.write_str("h"),
            Self::Word => f.write_str("i"),
            Self::Long => f.write_str("q"),
            Self::F32 => f.write_str("f"),
            Self::F64 => f.write_str("d"),
            Self::Bytes(n) => write!(f, "{n}s"),
        }
    }
}

/// Ordered list of fields describing one binary record.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct RecordFormat {
    fields: Vec<FieldType>,
}

impl RecordFormat {
    /// Build a descriptor from already-typed fields.
    pub fn new(fields: Vec<FieldType>) -> Self {
        Self { fields }
    }

    /// Build a descriptor from format tokens such as `["4s", "L", "L"]`.
    pub fn parse<S: AsRef<str>>(tokens: &[S]) -> FormatResult<Self> {
        let fields = tokens
            .iter()
            .map(|t| FieldType::parse(t.as_ref()))
            .collect::<FormatResult<Vec<_>>>()?;
        Ok(Self { fields })
    }

    /// The fields in order.
    pub fn fields(&self) -> &[FieldType] {
        &self.fields
    }

    /// Number of fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns `true` if the descriptor has no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Total encoded width in bytes.
    ///
    /// Fails with [`FormatError::FormatTooLarge`] if the widths sum past
    /// `isize::MAX`, the largest buffer a `Vec` can hold.
    pub fn size(&self) -> FormatResult<usize> {
        self.fields
            .iter()
            .try_fold(0usize, |total, field| total.checked_add(field.width()))
            .filter(|total| isize::try_from(*total).is_ok())
            .ok_or(FormatError::FormatTooLarge)
    }
}

impl fmt::Display for RecordFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        for (i, field) in self.fields.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{field}")?;
        }
        f.write_str("]")
    }
}
