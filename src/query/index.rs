use crate::catalog::{read_catalog, BookRecord};
use crate::query::{QueryError, QueryResult};
use crate::Result;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

/// Optional filters for a catalog search
///
/// Both fields match as case-insensitive substrings. When both are given a
/// book must match both; an absent or blank field does not filter.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchCriteria {
    pub title: Option<String>,
    pub category: Option<String>,
}

/// In-memory catalog with an id lookup table
#[derive(Debug, Clone, Default)]
pub struct CatalogIndex {
    records: Vec<BookRecord>,
    by_id: HashMap<u32, usize>,
}

impl CatalogIndex {
    /// Builds an index over `records`, keeping their order
    ///
    /// Should an id repeat, lookups resolve to its first occurrence.
    pub fn new(records: Vec<BookRecord>) -> Self {
        let mut by_id = HashMap::with_capacity(records.len());
        for (position, record) in records.iter().enumerate() {
            by_id.entry(record.id).or_insert(position);
        }
        Self { records, by_id }
    }

    /// Loads a catalog file and indexes it
    pub fn load(path: &Path) -> Result<Self> {
        let records = read_catalog(path)?;
        tracing::info!("Loaded {} books from {}", records.len(), path.display());
        Ok(Self::new(records))
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[BookRecord] {
        &self.records
    }

    /// Titles of every book, in catalog order
    pub fn titles(&self) -> Vec<&str> {
        self.records.iter().map(|r| r.title.as_str()).collect()
    }

    /// Looks up one book by id
    pub fn get(&self, id: u32) -> QueryResult<&BookRecord> {
        self.by_id
            .get(&id)
            .map(|&position| &self.records[position])
            .ok_or(QueryError::NotFound(id))
    }

    /// Books matching `criteria`, in catalog order
    ///
    /// With no criteria every book matches. An empty result is
    /// `QueryError::NoMatch`, never an empty list.
    pub fn search(&self, criteria: &SearchCriteria) -> QueryResult<Vec<&BookRecord>> {
        let title = needle(criteria.title.as_deref());
        let category = needle(criteria.category.as_deref());

        let matches: Vec<&BookRecord> = self
            .records
            .iter()
            .filter(|r| title.as_deref().map_or(true, |t| contains_folded(&r.title, t)))
            .filter(|r| {
                category
                    .as_deref()
                    .map_or(true, |c| contains_folded(&r.category, c))
            })
            .collect();

        if matches.is_empty() {
            return Err(QueryError::NoMatch);
        }
        Ok(matches)
    }

    /// Distinct categories, in order of first appearance
    pub fn categories(&self) -> Vec<&str> {
        let mut seen: Vec<&str> = Vec::new();
        for record in &self.records {
            if !seen.contains(&record.category.as_str()) {
                seen.push(&record.category);
            }
        }
        seen
    }
}

fn needle(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_lowercase)
}

fn contains_folded(haystack: &str, lowered_needle: &str) -> bool {
    haystack.to_lowercase().contains(lowered_needle)
}

/// Checks that the catalog file exists and parses
pub fn health(path: &Path) -> QueryResult<()> {
    if !path.is_file() {
        return Err(QueryError::Unavailable(format!(
            "catalog file not found: {}",
            path.display()
        )));
    }
    read_catalog(path)
        .map(|_| ())
        .map_err(|e| QueryError::Unavailable(format!("failed to read catalog: {}", e)))
}
