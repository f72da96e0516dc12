use crate::core::settings::{PreferencesStore, RemoteSettings, UserSettings, now_millis};
use anyhow::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::Mutex;
use tracing::debug;

/// Settings kept only for the lifetime of the process.
#[derive(Default)]
pub struct MemorySettingsStore {
    inner: Mutex<Option<UserSettings>>,
}

impl MemorySettingsStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_settings(settings: UserSettings) -> Self {
        Self {
            inner: Mutex::new(Some(settings)),
        }
    }
}

#[async_trait]
impl PreferencesStore for MemorySettingsStore {
    async fn get_settings(&self) -> Result<UserSettings> {
        let settings = self.inner.lock().await;
        Ok(settings
            .clone()
            .unwrap_or_else(|| UserSettings::starter(now_millis())))
    }

    async fn replace_settings(&self, settings: &UserSettings) -> Result<()> {
        debug!(last_updated = settings.last_updated, "Settings PUT");
        *self.inner.lock().await = Some(settings.clone());
        Ok(())
    }

    async fn has_stored_settings(&self) -> Result<bool> {
        Ok(self.inner.lock().await.is_some())
    }
}

/// In-memory stand-in for a remote settings service.
#[derive(Default)]
pub struct MemoryRemoteSettings {
    inner: Mutex<HashMap<String, UserSettings>>,
}

impl MemoryRemoteSettings {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RemoteSettings for MemoryRemoteSettings {
    async fn fetch(&self, identity: &str) -> Result<Option<UserSettings>> {
        Ok(self.inner.lock().await.get(identity).cloned())
    }

    async fn push(&self, identity: &str, settings: &UserSettings) -> Result<()> {
        self.inner
            .lock()
            .await
            .insert(identity.to_string(), settings.clone());
        Ok(())
    }
}
