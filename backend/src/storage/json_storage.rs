//! JSON file-based parameter store.

use super::{ParameterStore, Result, StorageError, StoredParameter};
use async_trait::async_trait;
use devdiag_types::ParameterType;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info};

/// JSON file storage format.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct StorageFormat {
    version: u32,
    parameters: BTreeMap<String, StoredParameter>,
}

impl Default for StorageFormat {
    fn default() -> Self {
        Self {
            version: 1,
            parameters: BTreeMap::new(),
        }
    }
}

/// Parameter store persisted to a single JSON document.
pub struct JsonParameterStore {
    path: PathBuf,
    cache: RwLock<Option<BTreeMap<String, StoredParameter>>>,
    /// Serializes read-modify-write cycles
    write_lock: Mutex<()>,
}

impl JsonParameterStore {
    /// Create a new JSON parameter store.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            cache: RwLock::new(None),
            write_lock: Mutex::new(()),
        }
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load parameters from file, using cache if available.
    async fn load(&self) -> Result<BTreeMap<String, StoredParameter>> {
        {
            let cache = self.cache.read().await;
            if let Some(parameters) = cache.as_ref() {
                return Ok(parameters.clone());
            }
        }

        debug!("Loading parameters from {:?}", self.path);

        let parameters = if !self.path.exists() {
            info!("Parameter file does not exist, starting empty");
            BTreeMap::new()
        } else {
            let contents = fs::read_to_string(&self.path).await?;
            if contents.trim().is_empty() {
                BTreeMap::new()
            } else {
                let storage: StorageFormat = serde_json::from_str(&contents)?;
                storage.parameters
            }
        };

        *self.cache.write().await = Some(parameters.clone());
        Ok(parameters)
    }

    /// Write parameters to file and update cache.
    async fn write(&self, parameters: BTreeMap<String, StoredParameter>) -> Result<()> {
        debug!("Writing {} parameters to {:?}", parameters.len(), self.path);

        let storage = StorageFormat {
            version: 1,
            parameters,
        };
        let json = serde_json::to_string_pretty(&storage)?;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent).await?;
            }
        }

        // Write to temporary file first, then rename (atomic operation)
        let temp_path = self.path.with_extension("tmp");
        fs::write(&temp_path, json).await?;
        fs::rename(&temp_path, &self.path).await?;

        *self.cache.write().await = Some(storage.parameters);
        Ok(())
    }
}

#[async_trait]
impl ParameterStore for JsonParameterStore {
    async fn set_parameter(
        &self,
        caller_id: &str,
        name: &str,
        value: &str,
        kind: ParameterType,
    ) -> Result<()> {
        if !kind.accepts(value) {
            return Err(StorageError::InvalidValue {
                name: name.to_string(),
                value: value.to_string(),
                kind,
            });
        }

        let _guard = self.write_lock.lock().await;
        let mut parameters = self.load().await?;
        parameters.insert(
            name.to_string(),
            StoredParameter {
                value: value.to_string(),
                kind,
                caller_id: caller_id.to_string(),
            },
        );
        self.write(parameters).await?;

        info!("{} set {} = {} ({})", caller_id, name, value, kind);
        Ok(())
    }

    async fn get_parameter(&self, name: &str) -> Result<StoredParameter> {
        self.load()
            .await?
            .remove(name)
            .ok_or_else(|| StorageError::NotFound(name.to_string()))
    }
}
