use color_eyre::eyre::eyre;
use color_eyre::Result;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tracing::{debug, warn};

use crate::filter::ColumnFilters;
use crate::layout::ColumnOrder;
use crate::sort::SortSpec;

const SORT_KEY: &str = "sort";
const FILTERS_KEY: &str = "filters";
const COLUMN_ORDER_KEY: &str = "column_order";

/// Named string values that survive between runs.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
    fn remove(&self, key: &str) -> Result<()>;
}

/// One JSON file per key under the per-user data directory.
#[derive(Clone)]
pub struct FileStore {
    pub(crate) state_dir: PathBuf,
}

impl FileStore {
    pub fn new(app_name: &str) -> Result<Self> {
        let state_dir = dirs::data_local_dir()
            .ok_or_else(|| eyre!("Could not determine data directory"))?
            .join(app_name)
            .join("state");

        Ok(Self { state_dir })
    }

    pub fn with_dir(state_dir: PathBuf) -> Self {
        Self { state_dir }
    }

    pub fn state_dir(&self) -> &Path {
        &self.state_dir
    }

    /// Path backing `key`. Characters outside `[A-Za-z0-9._-]` become `_`.
    pub fn key_file(&self, key: &str) -> PathBuf {
        let name: String = key
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        self.state_dir.join(format!("{}.json", name))
    }

    pub fn ensure_state_dir(&self) -> Result<()> {
        if !self.state_dir.exists() {
            fs::create_dir_all(&self.state_dir)?;
        }
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.key_file(key);
        if !path.exists() {
            return Ok(None);
        }
        Ok(Some(fs::read_to_string(&path)?))
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.ensure_state_dir()?;
        let path = self.key_file(key);
        let mut file = fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(&path)?;
        if let Err(e) = fs2::FileExt::try_lock_exclusive(&file) {
            warn!(path = %path.display(), error = %e, "could not lock state file");
        }
        file.set_len(0)?;
        file.write_all(value.as_bytes())?;
        file.flush()?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let path = self.key_file(key);
        if path.exists() {
            fs::remove_file(&path)?;
        }
        Ok(())
    }
}

/// Process-local store. Clones share entries.
#[derive(Clone, Default)]
pub struct MemoryStore {
    entries: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn entries(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, String>>> {
        self.entries
            .lock()
            .map_err(|_| eyre!("memory store lock poisoned"))
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.entries()?.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.entries()?.remove(key);
        Ok(())
    }
}

/// View state read at mount.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PersistedView {
    pub sort: Option<SortSpec>,
    pub filters: ColumnFilters,
    pub column_order: Option<ColumnOrder>,
}

/// Sort, filters and column order of one screen, stored under `<prefix>.sort`,
/// `<prefix>.filters` and `<prefix>.column_order`.
///
/// Loading and saving never fail: unreadable or corrupt entries load as
/// defaults and failed writes are logged.
pub struct ViewPersistence {
    store: Box<dyn KeyValueStore>,
    prefix: String,
}

impl ViewPersistence {
    pub fn new(store: impl KeyValueStore + 'static, prefix: impl Into<String>) -> Self {
        Self {
            store: Box::new(store),
            prefix: prefix.into(),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn key(&self, name: &str) -> String {
        format!("{}.{}", self.prefix, name)
    }

    fn load_json<T: DeserializeOwned>(&self, name: &str) -> Option<T> {
        let key = self.key(name);
        match self.store.get(&key) {
            Ok(Some(text)) => match serde_json::from_str(&text) {
                Ok(value) => Some(value),
                Err(e) => {
                    warn!(key = %key, error = %e, "ignoring corrupt view state");
                    None
                }
            },
            Ok(None) => None,
            Err(e) => {
                warn!(key = %key, error = %e, "could not read view state");
                None
            }
        }
    }

    fn save_json<T: Serialize>(&self, name: &str, value: &T) {
        let key = self.key(name);
        let result = serde_json::to_string(value)
            .map_err(color_eyre::Report::from)
            .and_then(|text| self.store.set(&key, &text));
        match result {
            Ok(()) => debug!(key = %key, "view state saved"),
            Err(e) => warn!(key = %key, error = %e, "could not save view state"),
        }
    }

    pub fn load_sort(&self) -> Option<SortSpec> {
        self.load_json(SORT_KEY)
    }

    pub fn load_filters(&self) -> ColumnFilters {
        self.load_json(FILTERS_KEY).unwrap_or_default()
    }

    pub fn load_column_order(&self) -> Option<ColumnOrder> {
        self.load_json(COLUMN_ORDER_KEY)
    }

    pub fn load(&self) -> PersistedView {
        PersistedView {
            sort: self.load_sort(),
            filters: self.load_filters(),
            column_order: self.load_column_order(),
        }
    }

    /// Writes the sort, or removes the entry when nothing is sorted.
    pub fn save_sort(&self, sort: Option<&SortSpec>) {
        match sort {
            Some(spec) => self.save_json(SORT_KEY, spec),
            None => {
                let key = self.key(SORT_KEY);
                if let Err(e) = self.store.remove(&key) {
                    warn!(key = %key, error = %e, "could not remove view state");
                }
            }
        }
    }

    pub fn save_filters(&self, filters: &ColumnFilters) {
        self.save_json(FILTERS_KEY, filters);
    }

    pub fn save_column_order(&self, order: &ColumnOrder) {
        self.save_json(COLUMN_ORDER_KEY, order);
    }

    /// Removes all three entries. Unlike saving, failures are returned.
    pub fn clear(&self) -> Result<()> {
        for name in [SORT_KEY, FILTERS_KEY, COLUMN_ORDER_KEY] {
            self.store.remove(&self.key(name))?;
        }
        Ok(())
    }
}
