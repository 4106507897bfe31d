//! JSON file document store.
//!
//! Stores the whole [`ConfigDocument`] as one pretty-printed JSON file,
//! `~/.multi-git/config.json` by default.
//!
//! # Durability
//!
//! Writes go to a sibling `*.tmp` file which is then renamed over the
//! target, so readers see either the old or the new document and never a
//! partial write. There is no locking: concurrent writers race and the last
//! rename wins.

use crate::models::ConfigDocument;
use crate::storage::traits::DocumentStore;
use crate::{Error, Result};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// File name of the store inside the config directory.
pub const CONFIG_FILE_NAME: &str = "config.json";

/// Maximum size of the store file (4MB).
/// Anything larger is not a document this tool wrote.
const MAX_FILE_SIZE: u64 = 4 * 1024 * 1024;

/// File-backed document store.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    /// Path of the JSON document.
    path: PathBuf,
}

impl JsonFileStore {
    /// Creates a store backed by the file at `path`.
    ///
    /// Nothing is touched on disk until the first [`save`](DocumentStore::save).
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Creates a store at `<dir>/config.json`.
    #[must_use]
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        Self::new(dir.as_ref().join(CONFIG_FILE_NAME))
    }

    /// Returns the path of the JSON document.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Path of the temporary file used for atomic replacement.
    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(std::ffi::OsStr::to_os_string)
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    fn read_contents(&self) -> Result<Option<String>> {
        let metadata = match fs::metadata(&self.path) {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(Error::file_system("read config file", &self.path, e)),
        };

        if metadata.len() > MAX_FILE_SIZE {
            return Err(Error::InvalidConfig(format!(
                "config file exceeds maximum size of {MAX_FILE_SIZE} bytes: {}",
                self.path.display()
            )));
        }

        fs::read_to_string(&self.path)
            .map(Some)
            .map_err(|e| Error::file_system("read config file", &self.path, e))
    }
}

impl DocumentStore for JsonFileStore {
    fn load(&self) -> Result<ConfigDocument> {
        let Some(contents) = self.read_contents()? else {
            tracing::debug!(path = %self.path.display(), "No config file yet, using defaults");
            return Ok(ConfigDocument::default());
        };

        serde_json::from_str(&contents).map_err(|e| {
            Error::InvalidConfig(format!(
                "failed to read config file {}: {e}",
                self.path.display()
            ))
        })
    }

    fn save(&self, document: &ConfigDocument) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .map_err(|e| Error::file_system("create config directory", parent, e))?;
        }

        let json = serde_json::to_string_pretty(document)
            .map_err(|e| Error::InvalidConfig(format!("failed to serialize config: {e}")))?;

        let temp = self.temp_path();
        if let Err(e) = fs::write(&temp, json) {
            let _ = fs::remove_file(&temp);
            return Err(Error::file_system("write config file", &temp, e));
        }

        fs::rename(&temp, &self.path).map_err(|e| {
            let _ = fs::remove_file(&temp);
            Error::file_system("write config file", &self.path, e)
        })?;

        tracing::debug!(
            path = %self.path.display(),
            configs = document.configs.len(),
            "Saved config document"
        );
        Ok(())
    }

    fn exists(&self) -> Result<bool> {
        match fs::metadata(&self.path) {
            Ok(_) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(Error::file_system("read config file", &self.path, e)),
        }
    }
}
