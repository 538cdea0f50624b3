//! Books-Catalog: a bookstore scraper and read-only catalog service
//!
//! This crate crawls a paginated, multi-category bookstore site, extracts one
//! record per listed book, downloads cover images, and persists the catalog as
//! a CSV file. A small query service loads that file once and answers lookups.

pub mod catalog;
pub mod config;
pub mod crawler;
pub mod output;
pub mod query;
pub mod url;

use thiserror::Error;

/// Main error type for catalog operations
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("HTTP error for {url}: {source}")]
    Http { url: String, source: reqwest::Error },

    #[error("HTTP status {status} for {url}")]
    HttpStatus { url: String, status: u16 },

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("Failed to parse price from '{0}'")]
    PriceParse(String),

    #[error("Listing item is missing {what}")]
    MissingElement { what: &'static str },

    #[error("Invalid CSS selector: {0}")]
    Selector(&'static str),

    #[error("Cannot write an empty catalog: no header can be derived")]
    EmptyCatalog,

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Result type alias for catalog operations
pub type Result<T> = std::result::Result<T, CatalogError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use catalog::{BookRecord, Rating};
pub use config::Config;
pub use query::CatalogIndex;
