pub mod favorites;
pub mod history;
pub mod rates;
pub mod setup;
pub mod sync;
pub mod ui;
