//! Persisted visitor preferences. The browser build keeps them in local
//! storage; host builds keep a small JSON file in the user's data directory.

use dioxus::logger::tracing::warn;
#[cfg(not(target_arch = "wasm32"))]
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::collections::HashMap;
#[cfg(not(target_arch = "wasm32"))]
use std::path::PathBuf;

#[cfg(target_arch = "wasm32")]
use gloo_storage::{LocalStorage, Storage};

pub const PREFERRED_LANGUAGE_KEY: &str = "preferredLanguage";

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum StorageError {
    #[error("storage is unavailable: {0}")]
    Unavailable(String),

    #[error("failed to read `{key}`: {reason}")]
    Read { key: String, reason: String },

    #[error("failed to write `{key}`: {reason}")]
    Write { key: String, reason: String },
}

/// Key/value preference storage.
pub trait PreferenceStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
}

/// The visitor's preference store: local storage when the page may use it,
/// otherwise an in-memory store that lasts for this visit.
pub fn open_preference_store() -> Box<dyn PreferenceStore> {
    with_fallback(LocalPreferenceStore::default())
}

fn with_fallback(local: LocalPreferenceStore) -> Box<dyn PreferenceStore> {
    if local.is_available() {
        return Box::new(local);
    }
    warn!("preference storage is unavailable; the language choice lasts for this visit only");
    Box::new(MemoryPreferenceStore::default())
}

/// In-memory store, used by tests and as a fallback when storage is blocked.
#[derive(Debug, Default)]
pub struct MemoryPreferenceStore {
    values: RefCell<HashMap<String, String>>,
}

impl MemoryPreferenceStore {
    pub fn with(key: &str, value: &str) -> Self {
        let store = Self::default();
        store
            .values
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        store
    }
}

impl PreferenceStore for MemoryPreferenceStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.values.borrow().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.values
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Browser local storage. Values are stored raw (not JSON encoded) so the
/// key stays readable by other scripts on the page.
#[cfg(target_arch = "wasm32")]
#[derive(Debug, Default, Clone, Copy)]
pub struct LocalPreferenceStore;

#[cfg(target_arch = "wasm32")]
impl LocalPreferenceStore {
    /// Blocked or missing storage would make every `LocalStorage` call throw.
    fn is_available(&self) -> bool {
        web_sys::window()
            .and_then(|window| window.local_storage().ok().flatten())
            .is_some()
    }
}

#[cfg(target_arch = "wasm32")]
impl PreferenceStore for LocalPreferenceStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        LocalStorage::raw()
            .get_item(key)
            .map_err(|err| StorageError::Read {
                key: key.to_string(),
                reason: format!("{err:?}"),
            })
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        LocalStorage::raw()
            .set_item(key, value)
            .map_err(|err| StorageError::Write {
                key: key.to_string(),
                reason: format!("{err:?}"),
            })
    }
}

#[cfg(not(target_arch = "wasm32"))]
#[derive(Debug, Default, Serialize, Deserialize)]
struct PreferenceFile {
    #[serde(default)]
    values: HashMap<String, String>,
}

/// Host fallback: `<data dir>/audiotour/preferences.json`.
#[cfg(not(target_arch = "wasm32"))]
#[derive(Debug, Clone)]
pub struct LocalPreferenceStore {
    path: Option<PathBuf>,
}

#[cfg(not(target_arch = "wasm32"))]
impl Default for LocalPreferenceStore {
    fn default() -> Self {
        let path = dirs::data_local_dir().map(|mut dir| {
            dir.push("audiotour");
            dir.push("preferences.json");
            dir
        });
        Self { path }
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl LocalPreferenceStore {
    #[cfg(test)]
    pub fn at(path: PathBuf) -> Self {
        Self { path: Some(path) }
    }

    fn is_available(&self) -> bool {
        self.path.is_some()
    }

    fn path(&self) -> Result<&PathBuf, StorageError> {
        self.path
            .as_ref()
            .ok_or_else(|| StorageError::Unavailable("no data directory".to_string()))
    }

    fn read_file(&self) -> Result<PreferenceFile, StorageError> {
        let path = self.path()?;
        if !path.exists() {
            return Ok(PreferenceFile::default());
        }
        let raw = std::fs::read_to_string(path).map_err(|err| StorageError::Read {
            key: path.display().to_string(),
            reason: err.to_string(),
        })?;
        serde_json::from_str(&raw).map_err(|err| StorageError::Read {
            key: path.display().to_string(),
            reason: err.to_string(),
        })
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl PreferenceStore for LocalPreferenceStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.read_file()?.values.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let path = self.path()?;
        let mut file = self.read_file().unwrap_or_default();
        file.values.insert(key.to_string(), value.to_string());

        let write_err = |reason: String| StorageError::Write {
            key: key.to_string(),
            reason,
        };
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|err| write_err(err.to_string()))?;
        }
        let body = serde_json::to_string_pretty(&file).map_err(|err| write_err(err.to_string()))?;
        std::fs::write(path, body).map_err(|err| write_err(err.to_string()))
    }
}
