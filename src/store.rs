//! Generic write-through table and its builder.

use crate::codec::JsonCodec;
use crate::error::Result;
use crate::persist::{self, WriteMode};
use parking_lot::Mutex;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::BTreeMap;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Durable key-value table backed by a single JSON file.
///
/// Every operation holds one exclusive lock for its whole duration, reads
/// included. Mutations go through [`mutate`](Self::mutate), which persists
/// the new table before it becomes visible in memory: when the write fails
/// the caller gets the error and memory still matches the file.
///
/// Two stores opened on the same path do not coordinate. Keep one store per
/// file per process.
pub struct Store<K, V> {
    table: Mutex<BTreeMap<K, V>>,
    path: PathBuf,
    codec: JsonCodec,
    mode: WriteMode,
}

impl<K, V> Store<K, V>
where
    K: Ord + Clone + Serialize + DeserializeOwned,
    V: Clone + Serialize + DeserializeOwned,
{
    /// Open (or create) a store at `path` with compact JSON and in-place
    /// overwrites.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::builder(path).build()
    }

    /// Start configuring a new store. Call [`.build()`](StoreBuilder::build)
    /// when ready.
    pub fn builder(path: impl AsRef<Path>) -> StoreBuilder<K, V> {
        StoreBuilder::new(path)
    }

    // ---- reads ----

    /// Run `f` against the table while holding the lock.
    pub fn read<R>(&self, f: impl FnOnce(&BTreeMap<K, V>) -> R) -> R {
        f(&*self.table.lock())
    }

    /// Clone of the whole table.
    #[must_use]
    pub fn snapshot(&self) -> BTreeMap<K, V> {
        self.table.lock().clone()
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.table.lock().len()
    }

    /// `true` when the store has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Path to the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    // ---- writes ----

    /// Apply `f` to a staged copy of the table, persist the result, then
    /// commit it. If `f` fails or the write fails, nothing changes.
    pub fn mutate<R>(&self, f: impl FnOnce(&mut BTreeMap<K, V>) -> Result<R>) -> Result<R> {
        let mut table = self.table.lock();
        let mut staged = table.clone();
        let out = f(&mut staged)?;
        if let Err(e) = self.save(&staged) {
            warn!(path = %self.path.display(), error = %e, "write-through failed, mutation discarded");
            return Err(e);
        }
        *table = staged;
        Ok(out)
    }

    // ---- persistence ----

    /// Rewrite the backing file from the current in-memory table.
    pub fn flush(&self) -> Result<()> {
        let table = self.table.lock();
        self.save(&table)
    }

    fn save(&self, table: &BTreeMap<K, V>) -> Result<()> {
        let bytes = self.codec.encode(table)?;
        persist::write(&self.path, &bytes, self.mode)?;
        debug!(path = %self.path.display(), bytes = bytes.len(), entries = table.len(), "table saved");
        Ok(())
    }
}

impl<K, V> std::fmt::Debug for Store<K, V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Store")
            .field("path", &self.path)
            .field("pretty", &self.codec.is_pretty())
            .field("mode", &self.mode)
            .finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------------
// Builder
// ---------------------------------------------------------------------------

/// Configures and opens a [`Store`].
///
/// ```rust,no_run
/// use bank_ledger_store::{Store, WriteMode};
///
/// let store = Store::<String, u32>::builder("counts.db")
///     .pretty(true)
///     .write_mode(WriteMode::Atomic)
///     .build()
///     .unwrap();
/// ```
pub struct StoreBuilder<K, V> {
    path: PathBuf,
    pretty: bool,
    mode: WriteMode,
    _marker: PhantomData<(K, V)>,
}

impl<K, V> StoreBuilder<K, V>
where
    K: Ord + Clone + Serialize + DeserializeOwned,
    V: Clone + Serialize + DeserializeOwned,
{
    fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            pretty: false,
            mode: WriteMode::default(),
            _marker: PhantomData,
        }
    }

    /// Write human-readable JSON with indentation (default: compact).
    pub fn pretty(mut self, yes: bool) -> Self {
        self.pretty = yes;
        self
    }

    /// Choose how the file is rewritten (default: [`WriteMode::Overwrite`]).
    pub fn write_mode(mut self, mode: WriteMode) -> Self {
        self.mode = mode;
        self
    }

    /// Create the backing file if needed, load it, and return the store.
    /// Malformed content fails the whole open; nothing is partially loaded.
    pub fn build(self) -> Result<Store<K, V>> {
        let codec = if self.pretty {
            JsonCodec::pretty()
        } else {
            JsonCodec::new()
        };

        persist::ensure_file(&self.path)?;
        let bytes = persist::load(&self.path)?;
        let table: BTreeMap<K, V> = codec.decode(&bytes)?;
        info!(path = %self.path.display(), entries = table.len(), "store opened");

        Ok(Store {
            table: Mutex::new(table),
            path: self.path,
            codec,
            mode: self.mode,
        })
    }
}

impl<K, V> std::fmt::Debug for StoreBuilder<K, V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreBuilder")
            .field("path", &self.path)
            .field("pretty", &self.pretty)
            .field("mode", &self.mode)
            .finish()
    }
}
