//! Stream codec
//!
//! Write/read primitives shared by every store operation.
//!
//! ## Write discipline
//! A write never streams into the target file directly. It fills a `.tmp`
//! sibling, syncs it, and renames it over the target, so a crash mid-write
//! leaves at worst an orphaned temp file, never a truncated record. The
//! `.tmp` suffix is reserved for this purpose; `FileStore::load` sweeps
//! leftovers.
//!
//! ## Compression
//! When enabled, the whole file is a single gzip member wrapping the
//! value's fixed-length buffer; there is no additional framing. Reads fill
//! the caller's pre-sized buffer exactly.

use std::fs::{self, File, OpenOptions};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;

use crate::error::{Result, StoreError};

/// Suffix of the transient sibling a write streams into before renaming.
pub(crate) const TMP_SUFFIX: &str = ".tmp";

/// How the write primitive treats an existing target file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum WriteMode {
    /// Fail with `Conflict` if the target already exists
    Create,
    /// Replace the target if it exists
    Overwrite,
}

/// Write `buf` to `path` according to `mode`.
///
/// `name` is the key's rendered file name, used for error context. The
/// caller must hold the store guard: the create-mode existence check and
/// the rename are only race-free under it.
pub(crate) fn write(
    path: &Path,
    name: &str,
    mode: WriteMode,
    buf: &[u8],
    compress: bool,
) -> Result<()> {
    if mode == WriteMode::Create && path.exists() {
        return Err(StoreError::Conflict(name.to_string()));
    }

    let tmp = tmp_path(path);
    if let Err(err) = fill_tmp(&tmp, buf, compress).and_then(|()| fs::rename(&tmp, path)) {
        // Best effort: don't leave debris behind for a failed write.
        let _ = fs::remove_file(&tmp);
        return Err(StoreError::Io(err));
    }

    Ok(())
}

/// Read `path`'s contents into `buf`, exactly filling it.
///
/// A file shorter than `buf` surfaces as `Io` (truncated read); bytes
/// beyond `buf.len()` are ignored, matching the fixed-length contract.
pub(crate) fn read(path: &Path, name: &str, buf: &mut [u8], compress: bool) -> Result<()> {
    let result = File::open(path).and_then(|file| {
        if compress {
            GzDecoder::new(file).read_exact(buf)
        } else {
            let mut file = file;
            file.read_exact(buf)
        }
    });

    result.map_err(|err| StoreError::from_io(err, name))
}

/// The `.tmp` sibling for a target path.
pub(crate) fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(TMP_SUFFIX);
    PathBuf::from(name)
}

/// Whether a directory entry is write debris rather than a record.
pub(crate) fn is_tmp_name(name: &std::ffi::OsStr) -> bool {
    name.to_string_lossy().ends_with(TMP_SUFFIX)
}

/// Stream `buf` into the temp file and sync it to disk.
fn fill_tmp(tmp: &Path, buf: &[u8], compress: bool) -> std::io::Result<()> {
    let file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(tmp)?;

    let file = if compress {
        let mut encoder = GzEncoder::new(file, Compression::default());
        encoder.write_all(buf)?;
        encoder.finish()?
    } else {
        let mut file = file;
        file.write_all(buf)?;
        file
    };

    file.sync_all()
}
