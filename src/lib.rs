pub mod app;
pub mod config;
pub mod error;
pub mod events;
pub mod export;
pub mod filter;
pub mod format;
pub mod geocoding;
pub mod loader;
pub mod logging;
pub mod models;
pub mod stats;
pub mod ui;
