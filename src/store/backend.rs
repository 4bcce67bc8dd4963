//! Key-value persistence backends
//!
//! The store only needs string keys mapped to JSON strings. `FileBackend`
//! keeps one file per key; `MemoryBackend` keeps everything in process and
//! can be told to refuse writes, which is how a full or read-only medium is
//! exercised in tests.

use crate::store::error::{StoreError, StoreResult};
use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

/// String-keyed persistence medium
pub trait KeyValueBackend: Send + Sync {
    /// Read the value for `key`; `Ok(None)` when it was never written
    fn get(&self, key: &str) -> StoreResult<Option<String>>;

    /// Replace the value for `key`
    fn set(&self, key: &str, value: &str) -> StoreResult<()>;

    /// Delete `key`; deleting a missing key succeeds
    fn remove(&self, key: &str) -> StoreResult<()>;
}

/// One `<key>.json` file per key inside a data directory
#[derive(Debug, Clone)]
pub struct FileBackend {
    dir: PathBuf,
}

impl FileBackend {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }
}

impl KeyValueBackend for FileBackend {
    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StoreError::io(key, e)),
        }
    }

    fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        fs::create_dir_all(&self.dir).map_err(|e| StoreError::io(key, e))?;

        // Temp file + rename: readers never see a partial value
        let final_path = self.path_for(key);
        let tmp_path = self.dir.join(format!(".{}.json.tmp", key));
        fs::write(&tmp_path, value).map_err(|e| StoreError::io(key, e))?;
        fs::rename(&tmp_path, &final_path).map_err(|e| {
            let _ = fs::remove_file(&tmp_path);
            StoreError::io(key, e)
        })
    }

    fn remove(&self, key: &str) -> StoreResult<()> {
        match fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StoreError::io(key, e)),
        }
    }
}

/// In-process backend
#[derive(Debug, Default)]
pub struct MemoryBackend {
    entries: Mutex<HashMap<String, String>>,
    reject_writes: AtomicBool,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Backend pre-populated with raw values, e.g. data left by an earlier run
    pub fn with_entries<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let backend = Self::new();
        {
            let mut map = backend.lock();
            for (k, v) in entries {
                map.insert(k.into(), v.into());
            }
        }
        backend
    }

    /// Make every subsequent `set`/`remove` fail as if the medium were full
    pub fn set_reject_writes(&self, reject: bool) {
        self.reject_writes.store(reject, Ordering::Release);
    }

    /// Raw stored value, bypassing the store's decoding
    pub fn raw(&self, key: &str) -> Option<String> {
        self.lock().get(key).cloned()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, String>> {
        self.entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn check_writable(&self) -> StoreResult<()> {
        if self.reject_writes.load(Ordering::Acquire) {
            return Err(StoreError::Unavailable {
                message: "storage quota exceeded".to_string(),
            });
        }
        Ok(())
    }
}

impl KeyValueBackend for MemoryBackend {
    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        Ok(self.lock().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        self.check_writable()?;
        self.lock().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> StoreResult<()> {
        self.check_writable()?;
        self.lock().remove(key);
        Ok(())
    }
}

impl<B: KeyValueBackend + ?Sized> KeyValueBackend for std::sync::Arc<B> {
    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> StoreResult<()> {
        (**self).remove(key)
    }
}
