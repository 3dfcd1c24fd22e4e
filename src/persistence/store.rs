//! # Save Stores
//!
//! Key-value storage behind the save slot.

use crate::RunehackResult;
use log::debug;
use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Durable string storage keyed by slot name.
pub trait SaveStore {
    /// Reads a slot. A missing slot is `Ok(None)`.
    fn read(&self, key: &str) -> RunehackResult<Option<String>>;

    /// Writes a slot, replacing any previous value.
    fn write(&mut self, key: &str, value: &str) -> RunehackResult<()>;

    /// Deletes a slot if it exists.
    fn remove(&mut self, key: &str) -> RunehackResult<()>;

    /// Name for logging.
    fn store_type(&self) -> &'static str;
}

/// Slots held in memory for the lifetime of the store.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    slots: BTreeMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SaveStore for MemoryStore {
    fn read(&self, key: &str) -> RunehackResult<Option<String>> {
        Ok(self.slots.get(key).cloned())
    }

    fn write(&mut self, key: &str, value: &str) -> RunehackResult<()> {
        self.slots.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> RunehackResult<()> {
        self.slots.remove(key);
        Ok(())
    }

    fn store_type(&self) -> &'static str {
        "MemoryStore"
    }
}

/// One `<key>.json` file per slot inside a directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    directory: PathBuf,
}

impl FileStore {
    /// Creates a store rooted at `directory`. The directory is created on first write.
    pub fn new(directory: impl AsRef<Path>) -> Self {
        Self {
            directory: directory.as_ref().to_path_buf(),
        }
    }

    /// Path of the file backing a slot.
    pub fn slot_path(&self, key: &str) -> PathBuf {
        self.directory.join(format!("{}.json", key))
    }
}

impl SaveStore for FileStore {
    fn read(&self, key: &str) -> RunehackResult<Option<String>> {
        match fs::read_to_string(self.slot_path(key)) {
            Ok(contents) => Ok(Some(contents)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    fn write(&mut self, key: &str, value: &str) -> RunehackResult<()> {
        fs::create_dir_all(&self.directory)?;
        let path = self.slot_path(key);
        fs::write(&path, value)?;
        debug!("Wrote {} bytes to {}", value.len(), path.display());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> RunehackResult<()> {
        match fs::remove_file(self.slot_path(key)) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }

    fn store_type(&self) -> &'static str {
        "FileStore"
    }
}
