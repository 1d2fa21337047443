//! JSON file backed key-value store

use std::{
    collections::BTreeMap,
    fs, io,
    path::{Path, PathBuf},
    sync::{Mutex, PoisonError},
    thread,
};
use thiserror::Error;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use super::KeyValueStore;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Malformed settings file {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

type Settings = BTreeMap<String, i64>;

/// Settings persisted as a flat JSON object of integers.
///
/// The whole file is cached in memory. `set` updates the cache and hands a
/// copy to a background writer thread, so callers never wait on the disk.
/// A file that cannot be read or parsed is treated as empty; failed writes
/// keep the cached value so the process carries on with in-memory state.
/// Dropping the store waits for pending writes to land.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    values: Mutex<Settings>,
    writer_tx: Option<mpsc::UnboundedSender<Settings>>,
    writer: Option<thread::JoinHandle<()>>,
}

impl FileStore {
    /// Open the store at `path`, degrading to an empty store on read errors
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let values = match load(&path) {
            Ok(values) => {
                debug!("Loaded {} setting(s) from {}", values.len(), path.display());
                values
            }
            Err(e) => {
                warn!("Starting with empty settings: {}", e);
                BTreeMap::new()
            }
        };

        let (writer_tx, writer_rx) = mpsc::unbounded_channel();
        let writer_path = path.clone();
        let writer = thread::Builder::new()
            .name("settings-writer".to_string())
            .spawn(move || run_writer(writer_path, writer_rx));

        let (writer_tx, writer) = match writer {
            Ok(handle) => (Some(writer_tx), Some(handle)),
            Err(e) => {
                warn!("Failed to start settings writer, writing inline: {}", e);
                (None, None)
            }
        };

        Self {
            path,
            values: Mutex::new(values),
            writer_tx,
            writer,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Option<i64> {
        self.values
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .copied()
    }

    fn set(&self, key: &str, value: i64) {
        let mut values = self.values.lock().unwrap_or_else(PoisonError::into_inner);
        values.insert(key.to_string(), value);

        // Sent under the cache lock so the writer sees snapshots in order
        let queued = match &self.writer_tx {
            Some(writer_tx) => writer_tx.send(values.clone()).is_ok(),
            None => false,
        };
        if !queued {
            if let Err(e) = flush(&self.path, &values) {
                warn!("Failed to persist {}={}: {}", key, value, e);
            }
        }
    }
}

impl Drop for FileStore {
    fn drop(&mut self) {
        // Closing the channel lets the writer drain and exit
        self.writer_tx.take();
        if let Some(writer) = self.writer.take() {
            if writer.join().is_err() {
                warn!("Settings writer for {} panicked", self.path.display());
            }
        }
    }
}

fn run_writer(path: PathBuf, mut writer_rx: mpsc::UnboundedReceiver<Settings>) {
    while let Some(mut values) = writer_rx.blocking_recv() {
        // Only the newest snapshot needs to reach the disk
        while let Ok(newer) = writer_rx.try_recv() {
            values = newer;
        }
        if let Err(e) = flush(&path, &values) {
            warn!("Failed to persist settings: {}", e);
        }
    }
    debug!("Settings writer for {} stopped", path.display());
}

fn load(path: &Path) -> Result<Settings, StorageError> {
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
        Err(source) => {
            return Err(StorageError::Io {
                path: path.to_path_buf(),
                source,
            })
        }
    };

    serde_json::from_str(&raw).map_err(|source| StorageError::Json {
        path: path.to_path_buf(),
        source,
    })
}

fn flush(path: &Path, values: &Settings) -> Result<(), StorageError> {
    let json = serde_json::to_string_pretty(values).map_err(|source| StorageError::Json {
        path: path.to_path_buf(),
        source,
    })?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|source| StorageError::Io {
            path: parent.to_path_buf(),
            source,
        })?;
    }

    // Write-then-rename so a crash never leaves a truncated file behind
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, json).map_err(|source| StorageError::Io {
        path: tmp.clone(),
        source,
    })?;
    fs::rename(&tmp, path).map_err(|source| StorageError::Io {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_is_empty() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::open(dir.path().join("counter.json"));
        assert_eq!(store.get("count"), None);
    }

    #[test]
    fn test_values_survive_reopen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("counter.json");

        let store = FileStore::open(&path);
        store.set("count", 12);
        drop(store);

        let reopened = FileStore::open(&path);
        assert_eq!(reopened.get("count"), Some(12));
        assert_eq!(reopened.path(), path.as_path());
    }

    #[test]
    fn test_corrupt_file_degrades_to_empty() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("counter.json");
        fs::write(&path, "{ not json").unwrap();

        let store = FileStore::open(&path);
        assert_eq!(store.get("count"), None);

        // The next write replaces the corrupt content
        store.set("count", 1);
        drop(store);
        assert_eq!(FileStore::open(&path).get("count"), Some(1));
    }

    #[test]
    fn test_unwritable_path_keeps_value_in_memory() {
        let dir = TempDir::new().unwrap();
        // A directory where the file should be makes every flush fail
        let path = dir.path().join("blocked");
        fs::create_dir(&path).unwrap();
        let store = FileStore::open(&path);

        store.set("count", 5);
        assert_eq!(store.get("count"), Some(5));
    }

    #[test]
    fn test_burst_of_writes_lands_last_value() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("counter.json");

        let store = FileStore::open(&path);
        for value in 1..=200 {
            store.set("count", value);
        }
        assert_eq!(store.get("count"), Some(200));
        drop(store);

        assert_eq!(FileStore::open(&path).get("count"), Some(200));
    }
}
