pub mod config;
pub mod database;
pub mod error;
pub mod fetcher;
pub mod finder;
pub mod history;
pub mod models;
pub mod notify;
pub mod politeness;
pub mod query;
pub mod scrapers;
pub mod traits;
