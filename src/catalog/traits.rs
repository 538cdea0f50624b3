//! Catalog sink trait
//!
//! A sink receives the complete, id-assigned record list of one crawl run and
//! replaces whatever snapshot it held before.

use crate::catalog::BookRecord;
use crate::Result;

/// Destination for a finished crawl's catalog
pub trait CatalogSink {
    /// Replaces the stored catalog with `records`
    ///
    /// Implementations must reject an empty list with
    /// [`CatalogError::EmptyCatalog`](crate::CatalogError::EmptyCatalog)
    /// and leave any previous snapshot untouched in that case.
    fn write_catalog(&mut self, records: &[BookRecord]) -> Result<()>;
}
