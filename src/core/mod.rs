//! Core rate logic and collaborator abstractions

pub mod cache;
pub mod config;
pub mod currency;
pub mod error;
pub mod filter;
pub mod log;
pub mod rates;
pub mod session;
pub mod settings;
pub mod source;
pub mod trend;

// Re-export main types for cleaner imports
pub use error::SessionError;
pub use rates::{RateTable, calculate_exchange, convert};
pub use session::{CurrencyRow, FavoritesUpdate, HistoryPoint, RateSession, SessionStatus};
pub use settings::{FavoritesList, PreferencesStore, RemoteSettings, SettingsPatch, UserSettings};
pub use source::RateSource;
pub use trend::{RateChange, get_rate_change};
