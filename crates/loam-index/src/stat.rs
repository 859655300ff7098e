//! File metadata for index entries.

use std::fs;
use std::io;
use std::path::Path;

#[cfg(unix)]
const NANOS_PER_SEC: i64 = 1_000_000_000;

/// The subset of file metadata recorded in an index entry.
///
/// Times are nanoseconds since the UNIX epoch.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FileStat {
    pub ctime: i64,
    pub mtime: i64,
    pub dev: u64,
    pub ino: u64,
    pub mode: u32,
    pub uid: u32,
    pub gid: u32,
    pub size: u64,
    pub flags: u16,
}

/// Source of file metadata.
///
/// Staging and status go through this trait so tests can supply fixed
/// metadata instead of whatever the filesystem reports.
pub trait StatProvider {
    fn stat(&self, path: &Path) -> io::Result<FileStat>;
}

/// Reads metadata from the local filesystem without following symlinks.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemStat;

impl StatProvider for SystemStat {
    #[cfg(unix)]
    fn stat(&self, path: &Path) -> io::Result<FileStat> {
        use std::os::unix::fs::MetadataExt;

        let meta = fs::symlink_metadata(path)?;
        Ok(FileStat {
            ctime: to_nanos(meta.ctime(), meta.ctime_nsec()),
            mtime: to_nanos(meta.mtime(), meta.mtime_nsec()),
            dev: meta.dev(),
            ino: meta.ino(),
            mode: meta.mode(),
            uid: meta.uid(),
            gid: meta.gid(),
            size: meta.size(),
            flags: 0,
        })
    }

    #[cfg(not(unix))]
    fn stat(&self, path: &Path) -> io::Result<FileStat> {
        let meta = fs::symlink_metadata(path)?;
        let mtime = meta.modified().map(system_time_nanos).unwrap_or(0);
        let ctime = meta.created().map(system_time_nanos).unwrap_or(mtime);
        let mode = if meta.is_dir() { 0o040000 } else { 0o100644 };
        Ok(FileStat {
            ctime,
            mtime,
            mode,
            size: meta.len(),
            ..FileStat::default()
        })
    }
}

#[cfg(unix)]
fn to_nanos(secs: i64, nsec: i64) -> i64 {
    secs.saturating_mul(NANOS_PER_SEC).saturating_add(nsec)
}

#[cfg(not(unix))]
fn system_time_nanos(time: std::time::SystemTime) -> i64 {
    match time.duration_since(std::time::UNIX_EPOCH) {
        Ok(d) => i64::try_from(d.as_nanos()).unwrap_or(i64::MAX),
        Err(e) => -i64::try_from(e.duration().as_nanos()).unwrap_or(i64::MAX),
    }
}
