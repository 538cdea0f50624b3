//! CSV catalog storage
//!
//! The catalog file is UTF-8, comma-delimited, with a header row taken from
//! the `BookRecord` field order. Every write replaces the file wholesale.

use crate::catalog::{BookRecord, CatalogSink};
use crate::{CatalogError, Result};
use serde::Serialize;
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

/// CSV file catalog
#[derive(Debug, Clone)]
pub struct CsvCatalog {
    path: PathBuf,
}

impl CsvCatalog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Sibling path the snapshot is staged at before it replaces the target
    fn staging_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(OsString::from)
            .unwrap_or_else(|| OsString::from("catalog"));
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    /// Writes `rows` to the staging path and returns it
    ///
    /// On failure the partial staging file is removed.
    fn stage<T: Serialize>(&self, rows: &[T]) -> Result<PathBuf> {
        let staging = self.staging_path();
        if let Err(e) = write_rows(&staging, rows) {
            if let Err(cleanup) = fs::remove_file(&staging) {
                tracing::debug!("Could not remove {}: {}", staging.display(), cleanup);
            }
            return Err(e);
        }
        Ok(staging)
    }
}

impl CatalogSink for CsvCatalog {
    fn write_catalog(&mut self, records: &[BookRecord]) -> Result<()> {
        if records.is_empty() {
            return Err(CatalogError::EmptyCatalog);
        }

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let staging = self.stage(records)?;
        fs::rename(&staging, &self.path)?;

        tracing::info!(
            "{} books saved to {}",
            records.len(),
            self.path.display()
        );
        Ok(())
    }
}

fn write_rows<T: Serialize>(path: &Path, rows: &[T]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}

/// Reads a catalog snapshot back into memory, in file order
pub fn read_catalog(path: &Path) -> Result<Vec<BookRecord>> {
    let mut reader = csv::Reader::from_path(path)?;
    let mut records = Vec::new();
    for row in reader.deserialize() {
        records.push(row?);
    }
    Ok(records)
}
