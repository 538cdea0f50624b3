//! Crawler module for scraping the bookstore
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching of listing pages and cover images
//! - HTML parsing of the category sidebar and listing pages
//! - Overall crawl coordination and id assignment

mod coordinator;
mod fetcher;
mod parser;

pub use coordinator::{Coordinator, CrawlReport};
pub use fetcher::{
    build_http_client, category_slug, download_image, fetch_page, ImageOutcome, ImageStore,
};
pub use parser::{
    parse_categories, parse_listing, parse_price, rating_from_class_list, Category, ListingItem,
    ParsedListing,
};

use crate::catalog::{CatalogSink, CsvCatalog};
use crate::config::Config;
use crate::Result;

/// Runs a complete crawl and replaces the catalog file
///
/// This is the main entry point for a crawl run. It will:
/// 1. Discover categories from the site root
/// 2. Crawl every listing page of every category, downloading covers
/// 3. Write the id-assigned records to the configured catalog path
///
/// Nothing is written if the crawl fails or yields no books.
pub async fn crawl(config: &Config) -> Result<CrawlReport> {
    let coordinator = Coordinator::new(config)?;
    let report = coordinator.run().await?;

    let mut catalog = CsvCatalog::new(&config.output.catalog_path);
    catalog.write_catalog(&report.records)?;

    Ok(report)
}
