pub mod arbitrage;
pub mod inventory;
pub mod prices;
pub mod setup;
pub mod summary;
pub mod ui;
pub mod validate;
