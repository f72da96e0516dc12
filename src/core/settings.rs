//! User preferences: base currency and ordered favorites.
//!
//! [`UserSettings`] and [`FavoritesList`] are values. Every change produces a
//! new value which is then handed to a [`PreferencesStore`].

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

pub const MAX_FAVORITES: usize = 20;

pub const DEFAULT_BASE_CURRENCY: &str = "JPY";
pub const DEFAULT_FAVORITES: [&str; 5] = ["USD", "TWD", "EUR", "CNY", "KRW"];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FavoritesRejection {
    #[error("{0} is already a favorite")]
    Duplicate(String),
    #[error("favorites are full ({} max)", MAX_FAVORITES)]
    CapacityExceeded,
    #[error("{0} is not a favorite")]
    NotAMember(String),
    #[error("new order must contain exactly the current favorites")]
    MembershipMismatch,
    #[error("{0:?} is not a currency code")]
    InvalidCode(String),
}

/// Ordered, duplicate-free list of at most [`MAX_FAVORITES`] currency codes.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct FavoritesList(Vec<String>);

impl FavoritesList {
    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, code: &str) -> bool {
        self.0.iter().any(|c| c == code)
    }

    pub fn add(&self, code: &str) -> Result<Self, FavoritesRejection> {
        if self.contains(code) {
            return Err(FavoritesRejection::Duplicate(code.to_string()));
        }
        if self.0.len() >= MAX_FAVORITES {
            return Err(FavoritesRejection::CapacityExceeded);
        }
        let mut codes = self.0.clone();
        codes.push(code.to_string());
        Ok(Self(codes))
    }

    pub fn remove(&self, code: &str) -> Result<Self, FavoritesRejection> {
        if !self.contains(code) {
            return Err(FavoritesRejection::NotAMember(code.to_string()));
        }
        Ok(Self(self.0.iter().filter(|c| *c != code).cloned().collect()))
    }

    /// Replaces the order. `order` must be a permutation of the current list.
    pub fn reorder(&self, order: Vec<String>) -> Result<Self, FavoritesRejection> {
        if order.len() != self.0.len() {
            return Err(FavoritesRejection::MembershipMismatch);
        }
        let mut current = self.0.clone();
        let mut proposed = order.clone();
        current.sort();
        proposed.sort();
        if current != proposed {
            return Err(FavoritesRejection::MembershipMismatch);
        }
        Ok(Self(order))
    }

    /// Moves `code` to position `index`, clamped to the end of the list.
    pub fn move_to(&self, code: &str, index: usize) -> Result<Self, FavoritesRejection> {
        let mut order: Vec<String> = self.remove(code)?.0;
        order.insert(index.min(order.len()), code.to_string());
        self.reorder(order)
    }
}

impl TryFrom<Vec<String>> for FavoritesList {
    type Error = FavoritesRejection;

    fn try_from(codes: Vec<String>) -> Result<Self, Self::Error> {
        codes
            .iter()
            .try_fold(FavoritesList::default(), |list, code| list.add(code))
    }
}

impl From<FavoritesList> for Vec<String> {
    fn from(list: FavoritesList) -> Self {
        list.0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSettings {
    pub base_currency: String,
    pub favorite_currencies: FavoritesList,
    /// Unix milliseconds of the last write. Greater wins on sync.
    pub last_updated: i64,
}

impl UserSettings {
    pub fn starter(now: i64) -> Self {
        Self {
            base_currency: DEFAULT_BASE_CURRENCY.to_string(),
            favorite_currencies: FavoritesList(
                DEFAULT_FAVORITES.iter().map(|c| c.to_string()).collect(),
            ),
            last_updated: now,
        }
    }

    /// Returns a copy with `patch` merged in and `last_updated` set to `now`.
    pub fn apply(&self, patch: SettingsPatch, now: i64) -> Self {
        Self {
            base_currency: patch
                .base_currency
                .unwrap_or_else(|| self.base_currency.clone()),
            favorite_currencies: patch
                .favorite_currencies
                .unwrap_or_else(|| self.favorite_currencies.clone()),
            last_updated: now,
        }
    }
}

/// Partial update for [`PreferencesStore::save_settings`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SettingsPatch {
    pub base_currency: Option<String>,
    pub favorite_currencies: Option<FavoritesList>,
}

impl SettingsPatch {
    pub fn base_currency(code: impl Into<String>) -> Self {
        Self {
            base_currency: Some(code.into()),
            ..Self::default()
        }
    }

    pub fn favorites(list: FavoritesList) -> Self {
        Self {
            favorite_currencies: Some(list),
            ..Self::default()
        }
    }
}

pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

#[async_trait]
pub trait PreferencesStore: Send + Sync {
    /// Persisted settings, or [`UserSettings::starter`] when there are none.
    async fn get_settings(&self) -> Result<UserSettings>;

    /// Writes `settings` as-is, keeping its `last_updated`.
    async fn replace_settings(&self, settings: &UserSettings) -> Result<()>;

    /// Whether settings were ever written, as opposed to served as defaults.
    async fn has_stored_settings(&self) -> Result<bool> {
        Ok(true)
    }

    /// Merges `patch` over the current settings and stamps `last_updated`.
    async fn save_settings(&self, patch: SettingsPatch) -> Result<UserSettings> {
        let updated = self.get_settings().await?.apply(patch, now_millis());
        self.replace_settings(&updated).await?;
        Ok(updated)
    }
}

/// Remote copy of a user's settings, keyed by identity.
#[async_trait]
pub trait RemoteSettings: Send + Sync {
    async fn fetch(&self, identity: &str) -> Result<Option<UserSettings>>;
    async fn push(&self, identity: &str, settings: &UserSettings) -> Result<()>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    PushedLocal,
    PulledRemote,
    Unchanged,
}

/// Last-writer-wins decision between a local and an optional remote copy.
pub fn reconcile(local: &UserSettings, remote: Option<&UserSettings>) -> SyncOutcome {
    match remote {
        None => SyncOutcome::PushedLocal,
        Some(remote) if local.last_updated > remote.last_updated => SyncOutcome::PushedLocal,
        Some(remote) if local.last_updated < remote.last_updated => SyncOutcome::PulledRemote,
        Some(_) => SyncOutcome::Unchanged,
    }
}

pub async fn sync_settings(
    local: &dyn PreferencesStore,
    remote: &dyn RemoteSettings,
    identity: &str,
) -> Result<SyncOutcome> {
    let local_settings = local.get_settings().await?;
    let remote_settings = remote
        .fetch(identity)
        .await
        .with_context(|| format!("Failed to fetch remote settings for {identity}"))?;

    // Defaults on a fresh machine must not overwrite an existing shared copy
    let outcome = if remote_settings.is_some() && !local.has_stored_settings().await? {
        SyncOutcome::PulledRemote
    } else {
        reconcile(&local_settings, remote_settings.as_ref())
    };
    match (outcome, remote_settings) {
        (SyncOutcome::PushedLocal, _) => {
            remote
                .push(identity, &local_settings)
                .await
                .with_context(|| format!("Failed to push settings for {identity}"))?;
        }
        (SyncOutcome::PulledRemote, Some(remote_settings)) => {
            local.replace_settings(&remote_settings).await?;
        }
        _ => {}
    }

    info!(?outcome, identity, "Settings sync finished");
    debug!(last_updated = local_settings.last_updated, "Local settings timestamp");
    Ok(outcome)
}
