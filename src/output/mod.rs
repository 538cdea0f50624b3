//! Output module for catalog summaries
//!
//! This module handles computing and printing statistics over a catalog,
//! either straight after a crawl or from an existing catalog file.

pub mod stats;

pub use stats::{print_statistics, CatalogStatistics, PriceSummary};
