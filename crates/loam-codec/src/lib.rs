//! Descriptor-driven binary record codec.
//!
//! A [`RecordFormat`] is an ordered list of fixed-width field types. The same
//! descriptor drives both [`encode`] and [`decode`], so a layout is written
//! down once and both directions stay symmetric. The staging index uses it for
//! its 4-byte header fields and its 8-byte entry fields.
//!
//! # Tokens
//!
//! | token | field | width |
//! |-------|-------|-------|
//! | `?` | boolean | 1 |
//! | `h` `H` | short integer | 2 |
//! | `i` `I` `l` `L` | word integer | 4 |
//! | `q` `Q` | long integer | 8 |
//! | `f` | 32-bit float | 4 |
//! | `d` | 64-bit float | 8 |
//! | `Ns` | byte span, zero-padded | N |

pub mod codec;
pub mod error;
pub mod format;
pub mod value;

pub use codec::{decode, encode, size_of, ByteOrder};
pub use error::{FormatError, FormatResult};
pub use format::{FieldType, RecordFormat};
pub use value::{FieldCursor, FieldValue};
