//! Rate session: loads rate tables, tracks favorites and exposes derived values.
//!
//! Every fetch takes a request token while holding the state lock. A response
//! is applied only if its token is still the latest one for its slot, so a
//! slow response for an old base never overwrites a newer one. The lock is
//! never held across a fetch.

use super::currency::{currency_name, currency_symbol, normalize_code};
use super::error::SessionError;
use super::filter::filter_currencies;
use super::rates::{RateTable, calculate_exchange};
use super::settings::{FavoritesList, FavoritesRejection, PreferencesStore, SettingsPatch};
use super::source::RateSource;
use super::trend::{RateChange, get_rate_change};
use anyhow::{Result, anyhow};
use chrono::{Days, NaiveDate, Utc};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, instrument, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    Idle,
    Loading,
    Ready,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HistoryPoint {
    pub date: NaiveDate,
    pub rate: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FavoritesUpdate {
    Applied(FavoritesList),
    Rejected(FavoritesRejection),
}

/// One line of the currency list as shown to the user.
#[derive(Debug, Clone, PartialEq)]
pub struct CurrencyRow {
    pub code: String,
    pub name: String,
    pub symbol: Option<&'static str>,
    pub rate: Option<f64>,
    pub converted: Option<f64>,
    pub trend: Option<RateChange>,
}

struct SessionState {
    status: SessionStatus,
    base: String,
    current: Option<RateTable>,
    previous: Option<RateTable>,
    error: Option<SessionError>,
    favorites: FavoritesList,
    history: Vec<HistoryPoint>,
    history_pair: Option<(String, String)>,
    load_token: u64,
    history_token: u64,
    closed: bool,
}

type Today = Box<dyn Fn() -> NaiveDate + Send + Sync>;

pub struct RateSession {
    source: Arc<dyn RateSource>,
    store: Arc<dyn PreferencesStore>,
    state: Mutex<SessionState>,
    today: Today,
}

impl RateSession {
    /// Creates an idle session seeded from the stored settings.
    pub async fn new(source: Arc<dyn RateSource>, store: Arc<dyn PreferencesStore>) -> Result<Self> {
        let settings = store.get_settings().await?;
        debug!(?settings, "Opening rate session");

        Ok(Self {
            source,
            store,
            state: Mutex::new(SessionState {
                status: SessionStatus::Idle,
                base: settings.base_currency,
                current: None,
                previous: None,
                error: None,
                favorites: settings.favorite_currencies,
                history: Vec::new(),
                history_pair: None,
                load_token: 0,
                history_token: 0,
                closed: false,
            }),
            today: Box::new(|| Utc::now().date_naive()),
        })
    }

    /// Overrides the clock used for history ranges.
    pub fn with_today(mut self, today: impl Fn() -> NaiveDate + Send + Sync + 'static) -> Self {
        self.today = Box::new(today);
        self
    }

    /// Initial load for the stored base currency.
    pub async fn start(&self) {
        let base = self.state.lock().await.base.clone();
        self.load(base).await;
    }

    pub async fn refresh(&self) {
        self.start().await;
    }

    /// Switches the base currency and reloads. Unchanged or invalid codes are ignored.
    pub async fn set_base_currency(&self, code: &str) {
        let Some(code) = normalize_code(code) else {
            warn!(code, "Ignoring invalid base currency");
            return;
        };
        {
            let mut state = self.state.lock().await;
            if state.base == code && state.status != SessionStatus::Idle {
                debug!(%code, "Base currency unchanged");
                return;
            }
            state.base = code.clone();
        }
        self.persist(SettingsPatch::base_currency(code.clone())).await;
        self.load(code).await;
    }

    /// Ends the session. In-flight results are dropped and later loads do nothing.
    pub async fn close(&self) {
        let mut state = self.state.lock().await;
        state.closed = true;
        state.load_token += 1;
        state.history_token += 1;
        debug!("Rate session closed");
    }

    #[instrument(name = "RateSessionLoad", skip(self))]
    async fn load(&self, base: String) {
        let token = {
            let mut state = self.state.lock().await;
            if state.closed {
                debug!("Session closed, skipping load");
                return;
            }
            state.load_token += 1;
            state.status = SessionStatus::Loading;
            state.load_token
        };

        let result = self.source.get_latest(&base).await.and_then(|table| {
            if table.base() == base {
                Ok(table)
            } else {
                Err(anyhow!("expected base {base}, got {}", table.base()))
            }
        });

        let current = {
            let mut state = self.state.lock().await;
            if state.load_token != token {
                debug!(token, "Discarding superseded rate response");
                return;
            }
            match result {
                Ok(table) => {
                    if state
                        .previous
                        .as_ref()
                        .is_some_and(|p| p.base() != table.base())
                    {
                        state.previous = None;
                    }
                    info!(date = %table.date(), rates = table.rates().len(), "Rates loaded");
                    state.current = Some(table.clone());
                    state.status = SessionStatus::Ready;
                    state.error = None;
                    table
                }
                Err(e) => {
                    let err = SessionError::SourceUnavailable(format!("{e:#}"));
                    warn!(error = %err, "Rate load failed");
                    state.status = SessionStatus::Error;
                    state.error = Some(err);
                    return;
                }
            }
        };

        self.load_previous(token, &current).await;
    }

    async fn load_previous(&self, token: u64, current: &RateTable) {
        let Some(day_before) = current.date().pred_opt() else {
            return;
        };

        let result = self.source.get_historical(current.base(), day_before).await;

        let mut state = self.state.lock().await;
        if state.load_token != token {
            debug!(token, "Discarding superseded previous-day response");
            return;
        }
        let failure = match result {
            Ok(table) if table.base() == current.base() => {
                state.previous = Some(table);
                return;
            }
            Ok(table) => format!("expected base {}, got {}", current.base(), table.base()),
            Err(e) => format!("{e:#}"),
        };

        let err = SessionError::TrendUnavailable(failure);
        warn!(error = %err, "Trend data unavailable");
        if state
            .previous
            .as_ref()
            .is_some_and(|p| p.date() != day_before)
        {
            state.previous = None;
        }
    }

    /// Loads the `target` rate in `base` for the last `days` days.
    ///
    /// Returns whether the stored history was replaced. An empty series keeps
    /// the previous history.
    #[instrument(name = "RateSessionHistory", skip(self))]
    pub async fn fetch_history(&self, base: &str, target: &str, days: u32) -> bool {
        let token = {
            let mut state = self.state.lock().await;
            if state.closed {
                return false;
            }
            state.history_token += 1;
            state.history_token
        };

        let end = (self.today)();
        let Some(start) = end.checked_sub_days(Days::new(u64::from(days))) else {
            let err = SessionError::HistoryUnavailable {
                base: base.to_string(),
                target: target.to_string(),
            };
            warn!(error = %err, days, "History range starts before the earliest date");
            return false;
        };
        let series = self.source.get_time_series(base, start, end, target).await;

        let mut state = self.state.lock().await;
        if state.history_token != token {
            debug!(token, "Discarding superseded history response");
            return false;
        }
        if series.is_empty() {
            let err = SessionError::HistoryUnavailable {
                base: base.to_string(),
                target: target.to_string(),
            };
            warn!(error = %err, %start, %end, "History fetch returned nothing");
            return false;
        }

        let mut points: Vec<HistoryPoint> = series
            .into_iter()
            .map(|(date, rate)| HistoryPoint { date, rate })
            .collect();
        points.sort_by_key(|p| p.date);
        debug!(points = points.len(), "History loaded");

        state.history = points;
        state.history_pair = Some((base.to_string(), target.to_string()));
        true
    }

    pub async fn status(&self) -> SessionStatus {
        self.state.lock().await.status
    }

    pub async fn is_loading(&self) -> bool {
        self.status().await == SessionStatus::Loading
    }

    pub async fn error(&self) -> Option<SessionError> {
        self.state.lock().await.error.clone()
    }

    pub async fn base_currency(&self) -> String {
        self.state.lock().await.base.clone()
    }

    pub async fn current(&self) -> Option<RateTable> {
        self.state.lock().await.current.clone()
    }

    pub async fn previous(&self) -> Option<RateTable> {
        self.state.lock().await.previous.clone()
    }

    pub async fn favorites(&self) -> FavoritesList {
        self.state.lock().await.favorites.clone()
    }

    pub async fn history(&self) -> Vec<HistoryPoint> {
        self.state.lock().await.history.clone()
    }

    /// `(base, target)` of the stored history, if any.
    pub async fn history_pair(&self) -> Option<(String, String)> {
        self.state.lock().await.history_pair.clone()
    }

    pub async fn filtered_currencies(&self, search: &str) -> Vec<String> {
        let state = self.state.lock().await;
        filter_currencies(state.current.as_ref(), &state.favorites, search, currency_name)
    }

    /// Converts through the current table. `None` until rates are loaded.
    pub async fn convert(&self, amount: f64, from: &str, to: &str) -> Option<f64> {
        let state = self.state.lock().await;
        state
            .current
            .as_ref()
            .map(|table| calculate_exchange(table, amount, from, to))
    }

    pub async fn rate_change(&self, code: &str) -> Option<RateChange> {
        let state = self.state.lock().await;
        get_rate_change(code, state.current.as_ref(), state.previous.as_ref())
    }

    /// Rows for the filtered list, with `amount` of `source` converted into each.
    pub async fn rows(&self, amount: f64, source: &str, search: &str) -> Vec<CurrencyRow> {
        let state = self.state.lock().await;
        let current = state.current.as_ref();

        filter_currencies(current, &state.favorites, search, currency_name)
            .into_iter()
            .map(|code| {
                let rate = current.and_then(|t| t.rate(&code));
                let converted = current
                    .filter(|_| rate.is_some())
                    .map(|t| calculate_exchange(t, amount, source, &code));
                CurrencyRow {
                    name: currency_name(&code)
                        .map(str::to_string)
                        .unwrap_or_else(|| code.clone()),
                    symbol: currency_symbol(&code),
                    trend: get_rate_change(&code, current, state.previous.as_ref()),
                    rate,
                    converted,
                    code,
                }
            })
            .collect()
    }

    pub async fn add_favorite(&self, code: &str) -> FavoritesUpdate {
        let Some(code) = normalize_code(code) else {
            return FavoritesUpdate::Rejected(FavoritesRejection::InvalidCode(code.to_string()));
        };
        self.update_favorites(|favorites| favorites.add(&code)).await
    }

    pub async fn remove_favorite(&self, code: &str) -> FavoritesUpdate {
        let code = normalize_code(code).unwrap_or_else(|| code.to_string());
        self.update_favorites(|favorites| favorites.remove(&code))
            .await
    }

    pub async fn reorder_favorites(&self, order: Vec<String>) -> FavoritesUpdate {
        self.update_favorites(|favorites| favorites.reorder(order))
            .await
    }

    pub async fn move_favorite(&self, code: &str, index: usize) -> FavoritesUpdate {
        let code = normalize_code(code).unwrap_or_else(|| code.to_string());
        self.update_favorites(|favorites| favorites.move_to(&code, index))
            .await
    }

    async fn update_favorites<F>(&self, change: F) -> FavoritesUpdate
    where
        F: FnOnce(&FavoritesList) -> Result<FavoritesList, FavoritesRejection>,
    {
        let updated = {
            let mut state = self.state.lock().await;
            match change(&state.favorites) {
                Ok(list) => {
                    state.favorites = list.clone();
                    list
                }
                Err(reason) => {
                    info!(%reason, "Favorites unchanged");
                    return FavoritesUpdate::Rejected(reason);
                }
            }
        };

        self.persist(SettingsPatch::favorites(updated.clone())).await;
        FavoritesUpdate::Applied(updated)
    }

    async fn persist(&self, patch: SettingsPatch) {
        if let Err(e) = self.store.save_settings(patch).await {
            warn!(error = %e, "Failed to persist settings");
        }
    }
}
