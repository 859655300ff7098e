//! The on-disk index file layout.
//!
//! ```text
//! header   4s L L         "DIRC", version, entry count
//! entry    q*8 20s H      ctime mtime dev ino mode uid gid size, blob id, flags
//!          path NUL...    zero padding to a multiple of 8 bytes
//! trailer  20 bytes       SHA-1 of everything above
//! ```
//!
//! All integers are big-endian.

use loam_codec::{decode, encode, ByteOrder, FieldCursor, FieldValue, RecordFormat};
use loam_crypto::{ContentHasher, DIGEST_LEN};
use loam_types::{ObjectId, OBJECT_ID_LEN};

use crate::entry::{sort_entries, validate_path, StagedEntry};
use crate::error::{IndexError, IndexResult};

/// Signature at the start of every index file.
pub const INDEX_SIGNATURE: &[u8; 4] = b"DIRC";

/// The only index version written and accepted.
pub const INDEX_VERSION: i64 = 1;

const HEADER_TOKENS: [&str; 3] = ["4s", "L", "L"];
const ENTRY_TOKENS: [&str; 10] = ["q", "q", "q", "q", "q", "q", "q", "q", "20s", "H"];

const HEADER_LEN: usize = 12;
const ENTRY_FIXED_LEN: usize = 86;
const ORDER: ByteOrder = ByteOrder::Big;

/// Bytes an entry occupies: fixed block, path, NUL, padding to 8.
fn entry_len(path_len: usize) -> usize {
    (ENTRY_FIXED_LEN + path_len + 1).div_ceil(8) * 8
}

/// Encode entries as a complete index file, sorted by path.
///
/// Fails with [`IndexError::InvalidPath`] or [`IndexError::DuplicatePath`]
/// before producing any output.
pub fn encode_index(entries: &[StagedEntry]) -> IndexResult<Vec<u8>> {
    let entries = sort_entries(entries.to_vec());
    for entry in &entries {
        validate_path(&entry.path)?;
    }
    if let Some(pair) = entries.windows(2).find(|w| w[0].path == w[1].path) {
        return Err(IndexError::DuplicatePath(pair[0].path.clone()));
    }

    let header_format = RecordFormat::parse(&HEADER_TOKENS)?;
    let entry_format = RecordFormat::parse(&ENTRY_TOKENS)?;

    let mut buf = encode(
        &header_format,
        &[
            FieldValue::from(&INDEX_SIGNATURE[..]),
            FieldValue::Int(INDEX_VERSION),
            FieldValue::Int(entries.len() as i64),
        ],
        ORDER,
    )?;

    for entry in &entries {
        let start = buf.len();
        buf.extend(encode(&entry_format, &entry_values(entry), ORDER)?);
        buf.extend_from_slice(entry.path.as_bytes());
        buf.resize(start + entry_len(entry.path.len()), 0);
    }

    let digest = ContentHasher::raw_hash(&buf);
    buf.extend_from_slice(&digest);
    Ok(buf)
}

/// Integer fields are written as their raw bits so unsigned values survive.
fn entry_values(entry: &StagedEntry) -> Vec<FieldValue> {
    vec![
        FieldValue::Int(entry.ctime),
        FieldValue::Int(entry.mtime),
        FieldValue::Int(entry.dev as i64),
        FieldValue::Int(entry.ino as i64),
        FieldValue::Int(entry.mode.into()),
        FieldValue::Int(entry.uid.into()),
        FieldValue::Int(entry.gid.into()),
        FieldValue::Int(entry.size as i64),
        FieldValue::Bytes(entry.object_id.as_bytes().to_vec()),
        FieldValue::Int(entry.flags.into()),
    ]
}

/// Decode and verify a complete index file.
pub fn decode_index(data: &[u8]) -> IndexResult<Vec<StagedEntry>> {
    if data.len() < HEADER_LEN + DIGEST_LEN {
        return Err(IndexError::BadHeader(format!(
            "index is {} bytes, too short for header and checksum",
            data.len()
        )));
    }

    let (content, stored) = data.split_at(data.len() - DIGEST_LEN);
    let computed = ContentHasher::raw_hash(content);
    if computed[..] != *stored {
        return Err(IndexError::ChecksumMismatch {
            stored: hex::encode(stored),
            computed: hex::encode(computed),
        });
    }

    let header_format = RecordFormat::parse(&HEADER_TOKENS)?;
    let mut header = FieldCursor::new(decode(&header_format, content, ORDER)?);
    let signature = header.bytes()?;
    if signature != INDEX_SIGNATURE {
        return Err(IndexError::BadHeader(format!(
            "invalid signature `{}`",
            String::from_utf8_lossy(&signature)
        )));
    }
    let version = header.int()? as u32;
    if i64::from(version) != INDEX_VERSION {
        return Err(IndexError::BadHeader(format!(
            "unknown index version {version}"
        )));
    }
    let declared = header.int()? as u32 as usize;

    let entry_format = RecordFormat::parse(&ENTRY_TOKENS)?;
    let body = &content[HEADER_LEN..];
    let mut entries = Vec::with_capacity(declared.min(body.len() / ENTRY_FIXED_LEN));
    let mut pos = 0;
    while pos < body.len() {
        let offset = HEADER_LEN + pos;
        let corrupt = |reason: &str| IndexError::CorruptEntry {
            offset,
            reason: reason.to_string(),
        };

        let rest = &body[pos..];
        if rest.len() <= ENTRY_FIXED_LEN {
            return Err(corrupt("entry runs past the end of the index"));
        }
        let mut fields = FieldCursor::new(decode(&entry_format, rest, ORDER)?);

        let path_region = &rest[ENTRY_FIXED_LEN..];
        let nul = path_region
            .iter()
            .position(|b| *b == 0)
            .ok_or_else(|| corrupt("path is not NUL-terminated"))?;
        let path = std::str::from_utf8(&path_region[..nul])
            .map_err(|_| corrupt("path is not valid UTF-8"))?;
        if path.is_empty() {
            return Err(corrupt("empty path"));
        }
        let len = entry_len(path.len());
        if len > rest.len() {
            return Err(corrupt("entry runs past the end of the index"));
        }

        let ctime = fields.int()?;
        let mtime = fields.int()?;
        let dev = fields.int()? as u64;
        let ino = fields.int()? as u64;
        let mode = fields.int()? as u32;
        let uid = fields.int()? as u32;
        let gid = fields.int()? as u32;
        let size = fields.int()? as u64;
        let mut raw_id = fields.bytes()?;
        raw_id.resize(OBJECT_ID_LEN, 0);
        let object_id = ObjectId::from_slice(&raw_id).map_err(|e| corrupt(&e.to_string()))?;
        let flags = fields.int()? as u16;

        entries.push(StagedEntry {
            ctime,
            mtime,
            dev,
            ino,
            mode,
            uid,
            gid,
            size,
            object_id,
            flags,
            path: path.to_string(),
        });
        pos += len;
    }

    if entries.len() != declared {
        return Err(IndexError::CountMismatch {
            declared,
            parsed: entries.len(),
        });
    }
    Ok(entries)
}
