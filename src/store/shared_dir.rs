use crate::core::settings::{RemoteSettings, UserSettings};
use anyhow::{Context, Result, bail};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Remote settings kept as `<identity>.json` files in a directory that is
/// shared between machines, such as a synced folder or network mount.
pub struct SharedDirRemote {
    root: PathBuf,
}

impl SharedDirRemote {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    fn file_for(&self, identity: &str) -> Result<PathBuf> {
        let valid = !identity.is_empty()
            && identity
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            bail!("Invalid sync identity: {identity:?}");
        }
        Ok(self.root.join(format!("{identity}.json")))
    }
}

#[async_trait]
impl RemoteSettings for SharedDirRemote {
    async fn fetch(&self, identity: &str) -> Result<Option<UserSettings>> {
        let path = self.file_for(identity)?;
        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "No remote settings yet");
                return Ok(None);
            }
            Err(e) => {
                return Err(e).with_context(|| format!("Failed to read {}", path.display()));
            }
        };
        let settings = serde_json::from_slice(&bytes)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        Ok(Some(settings))
    }

    async fn push(&self, identity: &str, settings: &UserSettings) -> Result<()> {
        let path = self.file_for(identity)?;
        tokio::fs::create_dir_all(&self.root)
            .await
            .with_context(|| format!("Failed to create directory: {}", self.root.display()))?;

        // Write then rename so readers on other machines never see a partial file
        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, serde_json::to_vec_pretty(settings)?)
            .await
            .with_context(|| format!("Failed to write {}", tmp.display()))?;
        tokio::fs::rename(&tmp, &path)
            .await
            .with_context(|| format!("Failed to replace {}", path.display()))?;

        debug!(path = %path.display(), "Pushed settings");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::settings::{PreferencesStore, SyncOutcome, sync_settings};
    use crate::store::memory::MemorySettingsStore;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_fetch_missing_identity() {
        let dir = tempdir().unwrap();
        let remote = SharedDirRemote::new(dir.path());
        assert!(remote.fetch("alex").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_push_then_fetch() {
        let dir = tempdir().unwrap();
        let remote = SharedDirRemote::new(dir.path().join("nested"));
        let settings = UserSettings::starter(7);

        remote.push("alex", &settings).await.unwrap();
        assert_eq!(remote.fetch("alex").await.unwrap(), Some(settings));
        assert!(dir.path().join("nested").join("alex.json").exists());
    }

    #[tokio::test]
    async fn test_rejects_path_like_identity() {
        let dir = tempdir().unwrap();
        let remote = SharedDirRemote::new(dir.path());
        assert!(remote.fetch("../etc").await.is_err());
        assert!(remote.push("", &UserSettings::starter(1)).await.is_err());
    }

    #[tokio::test]
    async fn test_two_machines_converge() {
        let dir = tempdir().unwrap();
        let remote = SharedDirRemote::new(dir.path());

        let mut laptop_settings = UserSettings::starter(500);
        laptop_settings.base_currency = "EUR".to_string();
        let laptop = MemorySettingsStore::with_settings(laptop_settings.clone());
        let desktop = MemorySettingsStore::with_settings(UserSettings::starter(100));

        assert_eq!(
            sync_settings(&laptop, &remote, "alex").await.unwrap(),
            SyncOutcome::PushedLocal
        );
        assert_eq!(
            sync_settings(&desktop, &remote, "alex").await.unwrap(),
            SyncOutcome::PulledRemote
        );
        assert_eq!(desktop.get_settings().await.unwrap(), laptop_settings);
    }
}
