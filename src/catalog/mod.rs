//! Catalog module: the book record and its flat-file persistence
//!
//! This module handles:
//! - The `BookRecord` row type and its `Rating` vocabulary
//! - Writing the full record list as a CSV snapshot
//! - Reading a snapshot back for the query service

mod csv_store;
mod record;
mod traits;

pub use csv_store::{read_catalog, CsvCatalog};
pub use record::{BookRecord, Rating, ScrapedBook};
pub use traits::CatalogSink;
