use crate::core::settings::{PreferencesStore, UserSettings, now_millis};
use anyhow::{Context, Result};
use async_trait::async_trait;
use fjall::{Config, Keyspace, PartitionCreateOptions, PartitionHandle, PersistMode};
use std::path::Path;
use tracing::{debug, warn};

const PARTITION: &str = "settings";
const SETTINGS_KEY: &str = "user_settings";

/// Settings persisted in a fjall keyspace as a single JSON value.
pub struct DiskSettingsStore {
    keyspace: Keyspace,
    partition: PartitionHandle,
}

impl DiskSettingsStore {
    pub fn open(path: &Path) -> Result<Self> {
        std::fs::create_dir_all(path)
            .with_context(|| format!("Failed to create directory: {}", path.display()))?;

        let keyspace = Config::new(path)
            .open()
            .with_context(|| format!("Failed to open settings store at {}", path.display()))?;
        let partition = keyspace
            .open_partition(PARTITION, PartitionCreateOptions::default())
            .context("Failed to open settings partition")?;

        debug!(path = %path.display(), "Opened settings store");
        Ok(Self {
            keyspace,
            partition,
        })
    }
}

#[async_trait]
impl PreferencesStore for DiskSettingsStore {
    async fn get_settings(&self) -> Result<UserSettings> {
        let Some(value) = self
            .partition
            .get(SETTINGS_KEY)
            .context("Failed to read settings")?
        else {
            debug!("No stored settings, using defaults");
            return Ok(UserSettings::starter(now_millis()));
        };

        match serde_json::from_slice(&value) {
            Ok(settings) => Ok(settings),
            Err(e) => {
                warn!(error = %e, "Stored settings are unreadable, using defaults");
                Ok(UserSettings::starter(now_millis()))
            }
        }
    }

    async fn replace_settings(&self, settings: &UserSettings) -> Result<()> {
        let value = serde_json::to_vec(settings)?;
        self.partition
            .insert(SETTINGS_KEY, value)
            .context("Failed to write settings")?;
        self.keyspace
            .persist(PersistMode::SyncAll)
            .context("Failed to flush settings")?;
        debug!(last_updated = settings.last_updated, "Settings PUT");
        Ok(())
    }

    async fn has_stored_settings(&self) -> Result<bool> {
        self.partition
            .contains_key(SETTINGS_KEY)
            .context("Failed to read settings")
    }
}
