//! Key-value storage backends

use std::collections::HashMap;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use crate::persistence::PersistenceError;

/// Minimal blob storage contract: one opaque value per key
pub trait KeyValueStore {
    /// `Ok(None)` when nothing has been stored under `key`
    fn load(&self, key: &str) -> Result<Option<Vec<u8>>, PersistenceError>;

    /// Store `blob` under `key`, replacing any previous value
    fn save(&self, key: &str, blob: &[u8]) -> Result<(), PersistenceError>;
}

/// Stores each key as `<data_dir>/<key>.json`
#[derive(Debug, Clone)]
pub struct FileStore {
    data_dir: PathBuf,
}

impl FileStore {
    /// The directory is created on first save
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn path_for(&self, key: &str) -> Result<PathBuf, PersistenceError> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'))
            && !key.starts_with('.');
        if !valid {
            return Err(PersistenceError::InvalidKey(key.to_string()));
        }
        Ok(self.data_dir.join(format!("{key}.json")))
    }
}

impl KeyValueStore for FileStore {
    fn load(&self, key: &str) -> Result<Option<Vec<u8>>, PersistenceError> {
        let path = self.path_for(key)?;
        match fs::read(&path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    /// Write to a temporary sibling and rename it over the target, so a
    /// reader never sees a half-written blob.
    fn save(&self, key: &str, blob: &[u8]) -> Result<(), PersistenceError> {
        let path = self.path_for(key)?;
        fs::create_dir_all(&self.data_dir)?;

        let tmp = path.with_extension("json.tmp");
        let written = fs::File::create(&tmp)
            .and_then(|mut file| {
                file.write_all(blob)?;
                file.sync_all()
            })
            .and_then(|()| fs::rename(&tmp, &path));
        if let Err(err) = written {
            let _ = fs::remove_file(&tmp);
            return Err(err.into());
        }
        tracing::trace!(path = %path.display(), bytes = blob.len(), "wrote blob");
        Ok(())
    }
}

/// In-process store. Clones share the same entries.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: Arc<RwLock<HashMap<String, Vec<u8>>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a raw blob, bypassing snapshot encoding
    pub fn insert_raw(&self, key: &str, blob: impl Into<Vec<u8>>) -> Result<(), PersistenceError> {
        self.save(key, &blob.into())
    }

    pub fn raw(&self, key: &str) -> Option<Vec<u8>> {
        self.load(key).ok().flatten()
    }
}

impl KeyValueStore for MemoryStore {
    fn load(&self, key: &str) -> Result<Option<Vec<u8>>, PersistenceError> {
        let entries = self
            .entries
            .read()
            .map_err(|_| PersistenceError::Backend("memory store lock poisoned".into()))?;
        Ok(entries.get(key).cloned())
    }

    fn save(&self, key: &str, blob: &[u8]) -> Result<(), PersistenceError> {
        let mut entries = self
            .entries
            .write()
            .map_err(|_| PersistenceError::Backend("memory store lock poisoned".into()))?;
        entries.insert(key.to_string(), blob.to_vec());
        Ok(())
    }
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for Box<T> {
    fn load(&self, key: &str) -> Result<Option<Vec<u8>>, PersistenceError> {
        (**self).load(key)
    }

    fn save(&self, key: &str, blob: &[u8]) -> Result<(), PersistenceError> {
        (**self).save(key, blob)
    }
}
