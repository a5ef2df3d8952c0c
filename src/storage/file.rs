// SPDX-License-Identifier: MPL-2.0
//! File-backed key-value slots using CBOR format.
//!
//! The whole store is a single CBOR map in `storage.cbor` inside the
//! application data directory. Every read goes back to disk, so a value
//! written by another process (or another `FileStore` over the same file) is
//! seen on the next call; nothing is cached.
//!
//! Writes never modify the file in place: the new map is written to a
//! temporary file in the same directory and renamed over `storage.cbor`, so a
//! reader sees either the old map or the new one. Read-modify-write cycles
//! hold an exclusive lock on `storage.cbor.lock`, which serializes writers
//! across handles and processes.

use super::KeyValueStore;
use crate::error::Result;
use crate::paths;
use std::collections::BTreeMap;
use std::ffi::OsString;
use std::fs;
use std::io::{BufReader, BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Storage file name within the app data directory.
const STORAGE_FILE: &str = "storage.cbor";

const LOCK_SUFFIX: &str = ".lock";

type Entries = BTreeMap<String, String>;

#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    /// Opens the store at an explicit file path. The file is created lazily on
    /// the first write.
    pub fn at_path(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Opens the store in the application data directory.
    ///
    /// Returns `None` when no data directory can be determined.
    pub fn open() -> Option<Self> {
        Self::open_with_override(None)
    }

    /// Opens the store inside `base_dir`, or the default data directory.
    pub fn open_with_override(base_dir: Option<PathBuf>) -> Option<Self> {
        paths::get_app_data_dir_with_override(base_dir).map(|mut path| {
            path.push(STORAGE_FILE);
            Self::at_path(path)
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn directory(&self) -> &Path {
        match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        }
    }

    fn lock_path(&self) -> PathBuf {
        let mut name = OsString::from(self.path.as_os_str());
        name.push(LOCK_SUFFIX);
        PathBuf::from(name)
    }

    fn read_entries(&self) -> Result<Entries> {
        let file = match fs::File::open(&self.path) {
            Ok(file) => file,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Entries::new()),
            Err(err) => return Err(err.into()),
        };
        let entries = ciborium::from_reader(BufReader::new(file))?;
        Ok(entries)
    }

    /// Reads the current entries; unreadable files read as empty.
    fn load_lossy(&self) -> Entries {
        match self.read_entries() {
            Ok(entries) => entries,
            Err(error) => {
                tracing::warn!(path = %self.path.display(), %error, "ignoring unreadable storage file");
                Entries::new()
            }
        }
    }

    /// Replaces the storage file with `entries` in a single rename.
    fn write_entries(&self, entries: &Entries) -> Result<()> {
        let mut temp = NamedTempFile::new_in(self.directory())?;
        {
            let mut writer = BufWriter::new(temp.as_file_mut());
            ciborium::into_writer(entries, &mut writer)?;
            writer.flush()?;
        }
        temp.as_file().sync_all()?;
        temp.persist(&self.path).map_err(|err| err.error)?;
        Ok(())
    }

    fn update(&self, apply: impl FnOnce(&mut Entries)) -> Result<()> {
        fs::create_dir_all(self.directory())?;
        let lock = fs::OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(self.lock_path())?;
        // Released when `lock` is dropped.
        lock.lock()?;

        let mut entries = self.load_lossy();
        apply(&mut entries);
        self.write_entries(&entries)
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.load_lossy().remove(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.update(|entries| {
            entries.insert(key.to_string(), value.to_string());
        })
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.update(|entries| {
            entries.remove(key);
        })
    }
}
