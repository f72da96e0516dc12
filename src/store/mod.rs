//! Settings persistence: local stores and remote copies used for sync.

pub mod disk;
pub mod memory;
pub mod shared_dir;

use crate::core::config::AppConfig;
use anyhow::Result;
use disk::DiskSettingsStore;
use shared_dir::SharedDirRemote;
use std::sync::Arc;

/// Opens the on-disk settings store under the configured data path.
pub fn open_settings_store(config: &AppConfig) -> Result<Arc<DiskSettingsStore>> {
    let path = config.data_path()?.join("settings");
    Ok(Arc::new(DiskSettingsStore::open(&path)?))
}

/// Remote settings and the identity to sync under, if sync is configured.
pub fn open_remote(config: &AppConfig) -> Option<(SharedDirRemote, String)> {
    config
        .sync
        .as_ref()
        .map(|sync| (SharedDirRemote::new(&sync.remote_path), sync.identity.clone()))
}
