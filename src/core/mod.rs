//! Core business logic abstractions

pub mod analytics;
pub mod cache;
pub mod config;
pub mod log;
pub mod metal;
pub mod records;
pub mod spot;
pub mod valuation;

// Re-export main types for cleaner imports
pub use metal::{Metal, WeightUnit};
pub use records::{ArbitrageCoin, Coin, RecordSource, UserContext};
pub use spot::{
    Clock, SpotPriceError, SpotPriceProvider, SpotPriceSnapshot, SpotPriceSource, SpotQuote,
    SystemClock,
};
