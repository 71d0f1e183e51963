//! File Store
//!
//! The core store: one file per record, directly under a root directory.
//!
//! ## Responsibilities
//! - Directory lifecycle (create on first load, recount on reopen)
//! - CRUD with exclusive-create, overwrite, and read-back-then-delete forms
//! - Advisory record counter kept in step with the directory
//! - Serializing every operation through the single guard
//!
//! ## Concurrency Model: Single Guard
//!
//! One `Mutex<()>` per store serializes *every* operation: reads, writes,
//! deletes, existence checks, and directory scans. There is no
//! reader/writer distinction and no lock-free fast path; at most one
//! operation touches the directory at a time. Operations block the calling
//! thread for the duration of their file I/O, with no timeout and no
//! cancellation.
//!
//! Value encoding happens *outside* the guard (it needs no file state), and
//! decoding does too, except in [`FileStore::take`], where a successful
//! decode is the precondition for the delete. Every file handle is closed
//! before the guard is released.
//!
//! The counter is an atomic mutated only while the guard is held. It
//! approximates the number of record files under the root: exact as long as
//! nothing outside this store mutates the directory, advisory otherwise
//! (external mutation is undefined behavior for the counter).

use std::fs;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

use parking_lot::Mutex;

use crate::codec::{self, WriteMode};
use crate::error::{Result, StoreError};
use crate::key::StoreKey;
use crate::value::{StoreValue, ValueFactory};

/// A persistent key-value store materializing each value as one file.
///
/// `V` is the value type the store holds; its key type follows from the
/// [`StoreValue`] implementation. The store owns the contents of its root
/// directory exclusively once created.
pub struct FileStore<V> {
    /// Root directory holding one file per record
    root: PathBuf,

    /// Whether record files are whole-file gzip compressed
    use_compression: bool,

    /// Advisory count of record files under the root
    count: AtomicUsize,

    /// Serializes every operation (see module docs)
    guard: Mutex<()>,

    _values: PhantomData<fn() -> V>,
}

impl<V: StoreValue> FileStore<V> {
    /// Create a store handle for `path`.
    ///
    /// Performs no I/O; call [`load`](Self::load) (or use
    /// [`open`](Self::open)) before the first operation.
    pub fn new(path: impl Into<PathBuf>, use_compression: bool) -> Self {
        Self {
            root: path.into(),
            use_compression,
            count: AtomicUsize::new(0),
            guard: Mutex::new(()),
            _values: PhantomData,
        }
    }

    /// Create a store handle and load it (convenience for `new` + `load`).
    pub fn open(path: impl Into<PathBuf>, use_compression: bool) -> Result<Self> {
        let store = Self::new(path, use_compression);
        store.load()?;
        Ok(store)
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Load the store.
    ///
    /// If the root directory exists, sweeps temp debris left by an
    /// interrupted write and recomputes the counter from the files present;
    /// otherwise creates the directory. Record contents are not validated.
    pub fn load(&self) -> Result<()> {
        let _guard = self.guard.lock();

        if self.root.is_dir() {
            self.sweep_temp_files()?;
            let count = self.count_records()?;
            self.count.store(count, Ordering::SeqCst);
            tracing::debug!(
                "loaded store at {} with {} records",
                self.root.display(),
                count
            );
        } else {
            fs::create_dir_all(&self.root)?;
            self.count.store(0, Ordering::SeqCst);
            tracing::debug!("created store directory at {}", self.root.display());
        }

        Ok(())
    }

    /// Release the store.
    ///
    /// A no-op: every write is synchronous and whole-file, so there is no
    /// buffered state to flush. Present for symmetry with lifecycle-managed
    /// collaborators.
    pub fn unload(&self) {}

    // =========================================================================
    // Queries
    // =========================================================================

    /// Whether a record file exists for `key`. No content validation.
    ///
    /// A key whose rendering the store rejects can never have a record,
    /// so it reports `false`.
    pub fn contains_key(&self, key: &V::Key) -> bool {
        let name = key.file_name();
        let path = match self.record_path(&name) {
            Ok(path) => path,
            Err(err) => {
                tracing::debug!("contains_key failed: {}", err);
                return false;
            }
        };

        let _guard = self.guard.lock();
        path.exists()
    }

    /// Read the value stored under `key`.
    ///
    /// Returns:
    /// - `Ok(value)` if the record was found and decoded
    /// - `Err(NotFound)` if no record file exists for this key
    /// - `Err(Io)` if the file could not be read (truncated files and
    ///   corrupt compressed streams included)
    /// - `Err(Serialization)` if the factory rejected the bytes
    pub fn get<F>(&self, key: &V::Key, factory: &F) -> Result<V>
    where
        F: ValueFactory<Value = V>,
    {
        let name = key.file_name();
        let path = self.record_path(&name)?;
        let mut buf = vec![0u8; factory.encoded_len()];

        {
            let _guard = self.guard.lock();
            codec::read(&path, &name, &mut buf, self.use_compression)?;
        }

        // Decoding touches no file state; the guard is not held for it.
        factory.decode(&buf)
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Insert a new record; fails if the key is already present.
    ///
    /// The value is serialized once, then written exclusively: an existing
    /// record file makes the operation fail with `Conflict` and leaves the
    /// stored data untouched. The counter is incremented only on success.
    pub fn insert(&self, value: &V) -> Result<()> {
        let name = value.key().file_name();
        let path = self.record_path(&name)?;
        let buf = encode(value);

        let _guard = self.guard.lock();
        codec::write(&path, &name, WriteMode::Create, &buf, self.use_compression)?;
        self.count.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    /// Overwrite the record for `value`'s key.
    ///
    /// Intended for keys that are already present, but a missing record is
    /// created rather than rejected (create-or-overwrite mode). The counter
    /// follows: it is incremented when the write created the file.
    pub fn update(&self, value: &V) -> Result<()> {
        self.upsert(value).map(|_created| ())
    }

    /// Insert or overwrite the record for `value`'s key.
    ///
    /// Returns `Ok(true)` when the key was newly created, `Ok(false)` when
    /// an existing record was overwritten. The counter is incremented only
    /// on the created path. Fails only if the write itself fails.
    pub fn upsert(&self, value: &V) -> Result<bool> {
        let name = value.key().file_name();
        let path = self.record_path(&name)?;
        let buf = encode(value);

        let _guard = self.guard.lock();
        let created = !path.exists();
        codec::write(
            &path,
            &name,
            WriteMode::Overwrite,
            &buf,
            self.use_compression,
        )?;
        if created {
            self.count.fetch_add(1, Ordering::SeqCst);
        }
        Ok(created)
    }

    /// Delete the record for `key`.
    ///
    /// Decrements the counter on success. A missing record is `NotFound`;
    /// the counter is left unchanged on any failure.
    pub fn remove(&self, key: &V::Key) -> Result<()> {
        let name = key.file_name();
        let path = self.record_path(&name)?;

        let _guard = self.guard.lock();
        fs::remove_file(&path).map_err(|err| StoreError::from_io(err, &name))?;
        self.count.fetch_sub(1, Ordering::SeqCst);
        Ok(())
    }

    /// Delete the record for `key` and hand its value back.
    ///
    /// Reads and decodes first; only if both succeed is the file deleted
    /// and the counter decremented. A failed read or decode leaves the
    /// record in place.
    pub fn take<F>(&self, key: &V::Key, factory: &F) -> Result<V>
    where
        F: ValueFactory<Value = V>,
    {
        let name = key.file_name();
        let path = self.record_path(&name)?;
        let mut buf = vec![0u8; factory.encoded_len()];

        let _guard = self.guard.lock();
        codec::read(&path, &name, &mut buf, self.use_compression)?;
        let value = factory.decode(&buf)?;
        fs::remove_file(&path).map_err(|err| StoreError::from_io(err, &name))?;
        self.count.fetch_sub(1, Ordering::SeqCst);
        Ok(value)
    }

    /// Delete every regular file directly under the root directory.
    ///
    /// Subdirectories are ignored (the store never creates any). The first
    /// deletion failure is propagated. Afterwards the counter is
    /// resynchronized from a recount of the directory; if the recount
    /// itself fails, the counter keeps its last known value and the
    /// failure surfaces as the result when the sweep was otherwise clean.
    pub fn clear(&self) -> Result<()> {
        let _guard = self.guard.lock();

        let swept = self.remove_all_files();

        // The counter only moves when the directory answers; a failed
        // recount must not force it to zero over files still on disk.
        let recounted = match self.count_records() {
            Ok(remaining) => {
                self.count.store(remaining, Ordering::SeqCst);
                if swept.is_err() {
                    tracing::warn!(
                        "clear left {} records behind at {}",
                        remaining,
                        self.root.display()
                    );
                }
                Ok(())
            }
            Err(err) => {
                tracing::warn!(
                    "clear could not recount {}: {}",
                    self.root.display(),
                    err
                );
                Err(err)
            }
        };

        swept.and(recounted)
    }

    // =========================================================================
    // Boolean convenience wrappers
    // =========================================================================
    // The classic surface collapses every failure to a boolean. These keep
    // that callsite ergonomics while logging the discarded cause.

    /// [`insert`](Self::insert), reported as a boolean.
    pub fn try_add(&self, value: &V) -> bool {
        match self.insert(value) {
            Ok(()) => true,
            Err(err) => {
                tracing::debug!("try_add failed: {}", err);
                false
            }
        }
    }

    /// [`update`](Self::update), reported as a boolean.
    pub fn try_update(&self, value: &V) -> bool {
        match self.update(value) {
            Ok(()) => true,
            Err(err) => {
                tracing::debug!("try_update failed: {}", err);
                false
            }
        }
    }

    /// [`upsert`](Self::upsert), reported as a boolean.
    ///
    /// True whether the record was created or overwritten; false only when
    /// the write failed.
    pub fn add_or_update(&self, value: &V) -> bool {
        match self.upsert(value) {
            Ok(_created) => true,
            Err(err) => {
                tracing::debug!("add_or_update failed: {}", err);
                false
            }
        }
    }

    /// [`remove`](Self::remove), reported as a boolean.
    pub fn try_remove(&self, key: &V::Key) -> bool {
        match self.remove(key) {
            Ok(()) => true,
            Err(err) => {
                tracing::debug!("try_remove failed: {}", err);
                false
            }
        }
    }

    /// [`take`](Self::take), reported as an `Option`.
    pub fn try_take<F>(&self, key: &V::Key, factory: &F) -> Option<V>
    where
        F: ValueFactory<Value = V>,
    {
        match self.take(key, factory) {
            Ok(value) => Some(value),
            Err(err) => {
                tracing::debug!("try_take failed: {}", err);
                None
            }
        }
    }

    /// [`get`](Self::get), reported as an `Option`.
    pub fn try_get_value<F>(&self, key: &V::Key, factory: &F) -> Option<V>
    where
        F: ValueFactory<Value = V>,
    {
        match self.get(key, factory) {
            Ok(value) => Some(value),
            Err(err) => {
                tracing::debug!("try_get_value failed: {}", err);
                None
            }
        }
    }

    /// [`clear`](Self::clear), reported as a boolean.
    pub fn try_clear(&self) -> bool {
        match self.clear() {
            Ok(()) => true,
            Err(err) => {
                tracing::debug!("try_clear failed: {}", err);
                false
            }
        }
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Advisory number of records in the store.
    ///
    /// Read without the guard; exact unless the directory is mutated
    /// outside this store.
    pub fn count(&self) -> usize {
        self.count.load(Ordering::SeqCst)
    }

    /// Root directory of the store.
    pub fn path(&self) -> &Path {
        &self.root
    }

    /// Whether records are written through the gzip codec.
    pub fn use_compression(&self) -> bool {
        self.use_compression
    }

    // =========================================================================
    // Private Helpers
    // =========================================================================

    /// File path for a rendered key name.
    ///
    /// Renderings ending in the reserved temp suffix are rejected before
    /// any I/O: such a file would be indistinguishable from write debris
    /// and would collide with the temp sibling of its stem key.
    fn record_path(&self, name: &str) -> Result<PathBuf> {
        if name.ends_with(codec::TMP_SUFFIX) {
            return Err(StoreError::InvalidKey(name.to_string()));
        }
        Ok(self.root.join(name))
    }

    /// Delete stale `.tmp` siblings left by an interrupted write.
    fn sweep_temp_files(&self) -> Result<()> {
        for entry in fs::read_dir(&self.root)? {
            let entry = entry?;
            if entry.file_type()?.is_file() && codec::is_tmp_name(&entry.file_name()) {
                tracing::warn!("removing stale temp file {}", entry.path().display());
                fs::remove_file(entry.path())?;
            }
        }
        Ok(())
    }

    /// Count record files directly under the root (temp debris excluded).
    fn count_records(&self) -> Result<usize> {
        let mut count = 0;
        for entry in fs::read_dir(&self.root)? {
            let entry = entry?;
            if entry.file_type()?.is_file() && !codec::is_tmp_name(&entry.file_name()) {
                count += 1;
            }
        }
        Ok(count)
    }

    /// Delete every regular file directly under the root.
    fn remove_all_files(&self) -> Result<()> {
        for entry in fs::read_dir(&self.root)? {
            let entry = entry?;
            if entry.file_type()?.is_file() {
                fs::remove_file(entry.path())?;
            }
        }
        Ok(())
    }
}

/// Serialize a value into a buffer of its declared length.
fn encode<V: StoreValue>(value: &V) -> Vec<u8> {
    let mut buf = vec![0u8; value.encoded_len()];
    value.encode_into(&mut buf);
    buf
}
