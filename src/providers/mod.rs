pub mod caching;
pub mod metals_dev;
