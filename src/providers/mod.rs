pub mod caching;
pub mod frankfurter;
pub mod util;

pub use caching::CachingRateSource;
pub use frankfurter::FrankfurterSource;
