//! Key/value settings persistence with change notification.
//!
//! The storage contract mirrors a browser extension's sync storage: values
//! are read by key and written as a partial map. [`SettingsStore`] layers the
//! per-key defaults on top and publishes every successful write to
//! subscribers.

use async_trait::async_trait;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use summy_types::settings::{API_KEY_KEY, MODEL_KEY, SHOW_BUTTON_DEFAULT, SHOW_BUTTON_KEY};
use summy_types::{Settings, SettingsUpdate};
use tokio::sync::{watch, Mutex, RwLock};

use crate::error::{PersistError, Result};

const SETTINGS_KEYS: [&str; 3] = [MODEL_KEY, API_KEY_KEY, SHOW_BUTTON_KEY];

/// Physical storage behind the settings record
#[async_trait]
pub trait SettingsStorage: Send + Sync {
    /// Values for the requested keys; absent keys are simply missing from the map
    async fn get(&self, keys: &[&str]) -> Result<Map<String, Value>>;

    /// Merges `values` into the stored map
    async fn set(&self, values: Map<String, Value>) -> Result<()>;
}

/// Process-local storage, lost on exit
#[derive(Debug, Default)]
pub struct MemoryStorage {
    values: RwLock<HashMap<String, Value>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SettingsStorage for MemoryStorage {
    async fn get(&self, keys: &[&str]) -> Result<Map<String, Value>> {
        let values = self.values.read().await;
        Ok(keys
            .iter()
            .filter_map(|key| values.get(*key).map(|value| (key.to_string(), value.clone())))
            .collect())
    }

    async fn set(&self, values: Map<String, Value>) -> Result<()> {
        self.values.write().await.extend(values);
        Ok(())
    }
}

/// Single JSON object on disk. A missing file reads as empty.
#[derive(Debug)]
pub struct JsonFileStorage {
    path: PathBuf,
    // Serializes read-modify-write cycles
    lock: Mutex<()>,
}

impl JsonFileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn load(&self) -> Result<Map<String, Value>> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Map::new()),
            Err(e) => return Err(e.into()),
        };
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Map::new());
        }

        match serde_json::from_slice(&bytes)? {
            Value::Object(map) => Ok(map),
            other => Err(PersistError::Corrupt(format!(
                "{} holds {} instead of an object",
                self.path.display(),
                json_kind(&other)
            ))),
        }
    }

    async fn store(&self, map: &Map<String, Value>) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, serde_json::to_vec_pretty(map)?).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[async_trait]
impl SettingsStorage for JsonFileStorage {
    async fn get(&self, keys: &[&str]) -> Result<Map<String, Value>> {
        let _guard = self.lock.lock().await;
        let mut stored = self.load().await?;
        Ok(keys
            .iter()
            .filter_map(|key| stored.remove(*key).map(|value| (key.to_string(), value)))
            .collect())
    }

    async fn set(&self, values: Map<String, Value>) -> Result<()> {
        let _guard = self.lock.lock().await;
        let mut stored = self.load().await?;
        stored.extend(values);
        self.store(&stored).await
    }
}

/// The settings record on top of a [`SettingsStorage`]
pub struct SettingsStore {
    storage: Arc<dyn SettingsStorage>,
    tx: watch::Sender<Settings>,
    // A write and its notification happen as one step
    write_lock: Mutex<()>,
}

impl SettingsStore {
    /// Loads the current record and prepares change notification
    pub async fn open(storage: Arc<dyn SettingsStorage>) -> Result<Self> {
        let initial = read_record(storage.as_ref()).await?;
        let (tx, _rx) = watch::channel(initial);
        Ok(Self {
            storage,
            tx,
            write_lock: Mutex::new(()),
        })
    }

    pub async fn in_memory() -> Result<Self> {
        Self::open(Arc::new(MemoryStorage::new())).await
    }

    /// Reads the record from storage, applying per-key defaults
    pub async fn read(&self) -> Result<Settings> {
        read_record(self.storage.as_ref()).await
    }

    /// Persists the whole record, then notifies subscribers
    pub async fn write(&self, settings: Settings) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        self.write_locked(settings).await
    }

    /// Applies a partial update on top of the stored record.
    ///
    /// Read, apply and persist run under the write lock, so concurrent
    /// updates of different keys never erase each other.
    pub async fn update(&self, update: SettingsUpdate) -> Result<Settings> {
        let _guard = self.write_lock.lock().await;
        let next = update.apply(self.read().await?);
        self.write_locked(next.clone()).await?;
        Ok(next)
    }

    // Caller holds `write_lock`
    async fn write_locked(&self, settings: Settings) -> Result<()> {
        let mut values = Map::new();
        values.insert(MODEL_KEY.to_string(), Value::String(settings.model.clone()));
        values.insert(API_KEY_KEY.to_string(), Value::String(settings.credential.clone()));
        values.insert(SHOW_BUTTON_KEY.to_string(), Value::Bool(settings.show_button));
        self.storage.set(values).await?;

        tracing::info!(
            model = %settings.model,
            has_credential = settings.has_credential(),
            show_button = settings.show_button,
            "settings saved"
        );
        self.tx.send_replace(settings);
        Ok(())
    }

    /// Receiver that observes every successful write
    pub fn subscribe(&self) -> watch::Receiver<Settings> {
        self.tx.subscribe()
    }

    /// Last written (or initially loaded) record, without touching storage
    pub fn current(&self) -> Settings {
        self.tx.borrow().clone()
    }
}

async fn read_record(storage: &dyn SettingsStorage) -> Result<Settings> {
    let values = storage.get(&SETTINGS_KEYS).await?;
    let text = |key: &str| {
        values
            .get(key)
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_default()
    };

    Ok(Settings {
        model: text(MODEL_KEY),
        credential: text(API_KEY_KEY),
        show_button: values
            .get(SHOW_BUTTON_KEY)
            .and_then(Value::as_bool)
            .unwrap_or(SHOW_BUTTON_DEFAULT),
    })
}
