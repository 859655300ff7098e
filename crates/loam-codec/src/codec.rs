use crate::error::{FormatError, FormatResult};
use crate::format::{FieldType, RecordFormat};
use crate::value::FieldValue;

/// Byte order for integers and floats.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ByteOrder {
    #[default]
    Big,
    Little,
}

/// Total encoded width of `format` in bytes.
pub fn size_of(format: &RecordFormat) -> FormatResult<usize> {
    format.size()
}

/// Encode `values` according to `format`.
///
/// Every field needs a value of the matching variant; values past the end of
/// the descriptor are ignored. Byte spans shorter than their width are
/// zero-padded on the right.
pub fn encode(
    format: &RecordFormat,
    values: &[FieldValue],
    order: ByteOrder,
) -> FormatResult<Vec<u8>> {
    if values.len() < format.len() {
        return Err(FormatError::MissingValues {
            expected: format.len(),
            actual: values.len(),
        });
    }

    let mut buf = Vec::new();
    buf.try_reserve_exact(format.size()?).map_err(|_| FormatError::FormatTooLarge)?;
    for (index, (field, value)) in format.fields().iter().zip(values).enumerate() {
        match (field, value) {
            (FieldType::Bool, FieldValue::Bool(b)) => buf.push(u8::from(*b)),
            (FieldType::Short | FieldType::Word | FieldType::Long, FieldValue::Int(n)) => {
                put_int(&mut buf, *n, field.width(), order)
            }
            (FieldType::F32, FieldValue::F32(x)) => match order {
                ByteOrder::Big => buf.extend_from_slice(&x.to_be_bytes()),
                ByteOrder::Little => buf.extend_from_slice(&x.to_le_bytes()),
            },
            (FieldType::F64, FieldValue::F64(x)) => match order {
                ByteOrder::Big => buf.extend_from_slice(&x.to_be_bytes()),
                ByteOrder::Little => buf.extend_from_slice(&x.to_le_bytes()),
            },
            (FieldType::Bytes(width), FieldValue::Bytes(bytes)) => {
                if bytes.len() > *width {
                    return Err(FormatError::SpanOverflow {
                        index,
                        width: *width,
                        len: bytes.len(),
                    });
                }
                buf.extend_from_slice(bytes);
                buf.resize(buf.len() + (width - bytes.len()), 0);
            }
            (expected, actual) => {
                return Err(FormatError::TypeMismatch {
                    index,
                    expected: *expected,
                    actual: actual.type_name(),
                })
            }
        }
    }
    Ok(buf)
}

/// Decode one record laid out as `format` from the front of `bytes`.
///
/// Bytes past the format's width are ignored. Byte spans come back with their
/// right-hand zero padding removed.
pub fn decode(
    format: &RecordFormat,
    bytes: &[u8],
    order: ByteOrder,
) -> FormatResult<Vec<FieldValue>> {
    let expected = format.size()?;
    if bytes.len() < expected {
        return Err(FormatError::ShortBuffer {
            expected,
            actual: bytes.len(),
        });
    }

    let mut values = Vec::with_capacity(format.len());
    let mut rest = &bytes[..expected];
    for field in format.fields() {
        let (chunk, tail) = rest.split_at(field.width());
        rest = tail;
        let value = match field {
            FieldType::Bool => FieldValue::Bool(chunk[0] != 0),
            FieldType::Short | FieldType::Word | FieldType::Long => {
                FieldValue::Int(get_int(chunk, order))
            }
            FieldType::F32 => {
                let arr: [u8; 4] = chunk.try_into().unwrap_or_default();
                FieldValue::F32(match order {
                    ByteOrder::Big => f32::from_be_bytes(arr),
                    ByteOrder::Little => f32::from_le_bytes(arr),
                })
            }
            FieldType::F64 => {
                let arr: [u8; 8] = chunk.try_into().unwrap_or_default();
                FieldValue::F64(match order {
                    ByteOrder::Big => f64::from_be_bytes(arr),
                    ByteOrder::Little => f64::from_le_bytes(arr),
                })
            }
            FieldType::Bytes(_) => {
                let end = chunk.iter().rposition(|b| *b != 0).map_or(0, |i| i + 1);
                FieldValue::Bytes(chunk[..end].to_vec())
            }
        };
        values.push(value);
    }
    Ok(values)
}

/// Append the low `width` bytes of `n`.
fn put_int(buf: &mut Vec<u8>, n: i64, width: usize, order: ByteOrder) {
    match order {
        ByteOrder::Big => buf.extend_from_slice(&n.to_be_bytes()[8 - width..]),
        ByteOrder::Little => buf.extend_from_slice(&n.to_le_bytes()[..width]),
    }
}

/// Read a `chunk.len()`-byte integer and sign-extend it to 64 bits.
fn get_int(chunk: &[u8], order: ByteOrder) -> i64 {
    let width = chunk.len();
    let mut arr = [0u8; 8];
    let raw = match order {
        ByteOrder::Big => {
            arr[8 - width..].copy_from_slice(chunk);
            i64::from_be_bytes(arr)
        }
        ByteOrder::Little => {
            arr[..width].copy_from_slice(chunk);
            i64::from_le_bytes(arr)
        }
    };
    let shift = 64 - 8 * width as u32;
    (raw << shift) >> shift
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::collection::vec;
    use proptest::prelude::*;

    fn header_format() -> RecordFormat {
        RecordFormat::parse(&["4s", "L", "L"]).unwrap()
    }

    #[test]
    fn encode_header_big_endian() {
        let values = vec![FieldValue::from("DIRC"), 1i64.into(), 3i64.into()];
        let bytes = encode(&header_format(), &values, ByteOrder::Big).unwrap();
        assert_eq!(bytes, b"DIRC\x00\x00\x00\x01\x00\x00\x00\x03");
    }

    #[test]
    fn encode_little_endian() {
        let format = RecordFormat::parse(&["h", "L"]).unwrap();
        let values = [FieldValue::from(0x0102i64), FieldValue::from(0x0A0B_0C0Di64)];
        let bytes = encode(&format, &values, ByteOrder::Little).unwrap();
        assert_eq!(bytes, [0x02, 0x01, 0x0D, 0x0C, 0x0B, 0x0A]);
    }

    #[test]
    fn negative_integers_survive_truncation() {
        let format = RecordFormat::parse(&["h", "i", "q"]).unwrap();
        let values = vec![
            FieldValue::Int(-2),
            FieldValue::Int(-70_000),
            FieldValue::Int(i64::MIN),
        ];
        let bytes = encode(&format, &values, ByteOrder::Big).unwrap();
        assert_eq!(&bytes[..2], &[0xFF, 0xFE]);
        assert_eq!(decode(&format, &bytes, ByteOrder::Big).unwrap(), values);
    }

    #[test]
    fn unsigned_word_reads_back_sign_extended() {
        let format = RecordFormat::parse(&["L"]).unwrap();
        let bytes = encode(&format, &[FieldValue::from(u32::MAX)], ByteOrder::Big).unwrap();
        let value = decode(&format, &bytes, ByteOrder::Big).unwrap()[0].as_int().unwrap();
        assert_eq!(value, -1);
        assert_eq!(value as u32, u32::MAX);
    }

    #[test]
    fn short_span_is_zero_padded() {
        let format = RecordFormat::parse(&["6s"]).unwrap();
        let bytes = encode(&format, &[FieldValue::from("abc")], ByteOrder::Big).unwrap();
        assert_eq!(bytes, b"abc\0\0\0");
        assert_eq!(
            decode(&format, &bytes, ByteOrder::Big).unwrap(),
            vec![FieldValue::from("abc")]
        );
    }

    #[test]
    fn empty_span_roundtrips() {
        let format = RecordFormat::parse(&["4s"]).unwrap();
        let bytes = encode(&format, &[FieldValue::Bytes(Vec::new())], ByteOrder::Big).unwrap();
        assert_eq!(bytes, [0u8; 4]);
        assert_eq!(
            decode(&format, &bytes, ByteOrder::Big).unwrap(),
            vec![FieldValue::Bytes(Vec::new())]
        );
    }

    #[test]
    fn span_overflow_is_rejected() {
        let format = RecordFormat::parse(&["2s"]).unwrap();
        let err = encode(&format, &[FieldValue::from("abc")], ByteOrder::Big).unwrap_err();
        assert_eq!(err, FormatError::SpanOverflow { index: 0, width: 2, len: 3 });
    }

    #[test]
    fn too_few_values_is_rejected() {
        let values = [FieldValue::from("DIRC")];
        let err = encode(&header_format(), &values, ByteOrder::Big).unwrap_err();
        assert_eq!(err, FormatError::MissingValues { expected: 3, actual: 1 });
    }

    #[test]
    fn extra_values_are_ignored() {
        let format = RecordFormat::parse(&["?"]).unwrap();
        let values = [FieldValue::from(true), FieldValue::from(9i64)];
        let bytes = encode(&format, &values, ByteOrder::Big).unwrap();
        assert_eq!(bytes, [1]);
    }

    #[test]
    fn type_mismatch_is_rejected() {
        let values = vec![FieldValue::from("DIRC"), FieldValue::F32(1.0), 3i64.into()];
        let err = encode(&header_format(), &values, ByteOrder::Big).unwrap_err();
        assert_eq!(
            err,
            FormatError::TypeMismatch {
                index: 1,
                expected: FieldType::Word,
                actual: "f32"
            }
        );
    }

    #[test]
    fn short_buffer_is_rejected() {
        let err = decode(&header_format(), b"DIRC\0\0", ByteOrder::Big).unwrap_err();
        assert_eq!(err, FormatError::ShortBuffer { expected: 12, actual: 6 });
    }

    #[test]
    fn trailing_bytes_are_ignored_on_decode() {
        let format = RecordFormat::parse(&["h"]).unwrap();
        let values = decode(&format, &[0x00, 0x05, 0xFF, 0xFF], ByteOrder::Big).unwrap();
        assert_eq!(values, vec![FieldValue::Int(5)]);
    }

    #[test]
    fn bool_decodes_any_nonzero_as_true() {
        let format = RecordFormat::parse(&["?", "?"]).unwrap();
        let values = decode(&format, &[0x80, 0x00], ByteOrder::Big).unwrap();
        assert_eq!(values, vec![FieldValue::Bool(true), FieldValue::Bool(false)]);
    }

    #[test]
    fn floats_roundtrip_in_both_orders() {
        let format = RecordFormat::parse(&["f", "d"]).unwrap();
        let values = vec![FieldValue::F32(-3.25), FieldValue::F64(1.0e-300)];
        for order in [ByteOrder::Big, ByteOrder::Little] {
            let bytes = encode(&format, &values, order).unwrap();
            assert_eq!(Ok(bytes.len()), size_of(&format));
            assert_eq!(decode(&format, &bytes, order).unwrap(), values);
        }
    }

    #[test]
    fn overflowing_format_is_an_error_not_a_panic() {
        let max = format!("{}s", usize::MAX);
        let format = RecordFormat::parse(&[max.as_str(), max.as_str()]).unwrap();
        assert_eq!(size_of(&format), Err(FormatError::FormatTooLarge));
        assert_eq!(
            decode(&format, b"abc", ByteOrder::Big),
            Err(FormatError::FormatTooLarge)
        );
        let values = [FieldValue::from("a"), FieldValue::from("b")];
        assert_eq!(
            encode(&format, &values, ByteOrder::Big),
            Err(FormatError::FormatTooLarge)
        );
    }

    #[test]
    fn unallocatable_span_is_an_error() {
        let format = RecordFormat::parse(&[format!("{}s", isize::MAX)]).unwrap();
        let err = encode(&format, &[FieldValue::from("a")], ByteOrder::Big).unwrap_err();
        assert_eq!(err, FormatError::FormatTooLarge);
    }

    fn field() -> impl Strategy<Value = (FieldType, FieldValue)> {
        prop_oneof![
            any::<bool>().prop_map(|b| (FieldType::Bool, FieldValue::Bool(b))),
            any::<i16>().prop_map(|n| (FieldType::Short, FieldValue::Int(n.into()))),
            any::<i32>().prop_map(|n| (FieldType::Word, FieldValue::Int(n.into()))),
            any::<i64>().prop_map(|n| (FieldType::Long, FieldValue::Int(n))),
            (-1.0e6f32..1.0e6f32).prop_map(|x| (FieldType::F32, FieldValue::F32(x))),
            (-1.0e12f64..1.0e12f64).prop_map(|x| (FieldType::F64, FieldValue::F64(x))),
            (0usize..24)
                .prop_flat_map(|w| (Just(w), vec(1u8..=255, 0..=w)))
                .prop_map(|(w, b)| (FieldType::Bytes(w), FieldValue::Bytes(b))),
        ]
    }

    proptest! {
        #[test]
        fn decode_inverts_encode(fields in vec(field(), 0..16), big in any::<bool>()) {
            let order = if big { ByteOrder::Big } else { ByteOrder::Little };
            let (types, values): (Vec<_>, Vec<_>) = fields.into_iter().unzip();
            let format = RecordFormat::new(types);

            let bytes = encode(&format, &values, order).unwrap();
            prop_assert_eq!(Ok(bytes.len()), size_of(&format));
            prop_assert_eq!(decode(&format, &bytes, order).unwrap(), values);
        }
    }
}
