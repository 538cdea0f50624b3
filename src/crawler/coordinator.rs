//! Crawler coordinator - main crawl orchestration logic
//!
//! This module drives one full crawl run:
//! - Discovering categories from the site root's sidebar
//! - Walking each category's listing pages in order
//! - Downloading covers and assigning sequential ids
//!
//! Everything runs on one task, one request at a time. Pagination is a hard
//! sequential dependency and categories are visited in sidebar order so ids
//! come out the same on every run over the same content.

use crate::catalog::{BookRecord, ScrapedBook};
use crate::config::{Config, FailurePolicy};
use crate::crawler::fetcher::{build_http_client, download_image, fetch_page, ImageStore};
use crate::crawler::parser::{parse_categories, parse_listing, Category, ListingItem};
use crate::{CatalogError, ConfigError, Result};
use chrono::{DateTime, Utc};
use encoding_rs::Encoding;
use reqwest::Client;
use url::Url;

/// Outcome of a complete crawl run
#[derive(Debug, Clone)]
pub struct CrawlReport {
    /// All records, ids 1..=n in visitation order
    pub records: Vec<BookRecord>,

    /// Category names in the order they were crawled
    pub categories: Vec<String>,

    /// Listing pages fetched (the root page is not counted)
    pub pages_fetched: usize,

    /// Cover images that could not be downloaded
    pub images_missing: usize,

    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

/// Running totals for one crawl
#[derive(Debug, Default)]
struct CrawlTally {
    pages_fetched: usize,
    images_missing: usize,
}

/// Main crawler coordinator structure
pub struct Coordinator {
    client: Client,
    base_url: Url,
    image_base_url: String,
    encoding: &'static Encoding,
    images: ImageStore,
    image_policy: FailurePolicy,
}

impl Coordinator {
    /// Creates a new coordinator instance
    ///
    /// # Arguments
    ///
    /// * `config` - The crawler configuration
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - Successfully created coordinator
    /// * `Err(CatalogError)` - Invalid site settings or HTTP client failure
    pub fn new(config: &Config) -> Result<Self> {
        let base_url = Url::parse(&config.site.base_url)?;

        let encoding = Encoding::for_label(config.site.page_encoding.as_bytes()).ok_or_else(|| {
            ConfigError::Validation(format!(
                "Unknown page_encoding '{}'",
                config.site.page_encoding
            ))
        })?;

        let client = build_http_client(&config.crawler, &config.user_agent).map_err(|source| {
            CatalogError::Http {
                url: config.site.base_url.clone(),
                source,
            }
        })?;

        Ok(Self {
            client,
            base_url,
            image_base_url: config.site.image_base_url.clone(),
            encoding,
            images: ImageStore::new(&config.output.image_dir, config.crawler.image_naming),
            image_policy: config.crawler.image_failure_policy,
        })
    }

    /// Fetches the site root and returns its categories in sidebar order
    pub async fn discover_categories(&self) -> Result<Vec<Category>> {
        let html = fetch_page(&self.client, &self.base_url, self.encoding).await?;
        let categories = parse_categories(&html, &self.base_url)?;
        tracing::info!("Discovered {} categories", categories.len());
        Ok(categories)
    }

    /// Runs a full crawl and returns every record with its id
    ///
    /// Any page fetch or extraction failure aborts the run; no partial
    /// catalog is returned.
    pub async fn run(&self) -> Result<CrawlReport> {
        let started_at = Utc::now();
        let categories = self.discover_categories().await?;

        let mut records = Vec::new();
        let mut tally = CrawlTally::default();
        let mut next_id = 1;

        for category in &categories {
            tracing::info!("Collecting books from category: {}", category.name);
            let (books, after) = self.crawl_category(category, next_id, &mut tally).await?;
            tracing::debug!(
                "Category {} yielded {} books (ids {}..{})",
                category.name,
                books.len(),
                next_id,
                after
            );
            records.extend(books);
            next_id = after;
        }

        let finished_at = Utc::now();
        tracing::info!(
            "Crawl completed: {} books from {} pages in {}s",
            records.len(),
            tally.pages_fetched,
            (finished_at - started_at).num_seconds()
        );

        Ok(CrawlReport {
            records,
            categories: categories.into_iter().map(|c| c.name).collect(),
            pages_fetched: tally.pages_fetched,
            images_missing: tally.images_missing,
            started_at,
            finished_at,
        })
    }

    /// Crawls every listing page of one category
    ///
    /// Ids are assigned from `next_id` upward; the first unused id is
    /// returned alongside the records.
    async fn crawl_category(
        &self,
        category: &Category,
        mut next_id: u32,
        tally: &mut CrawlTally,
    ) -> Result<(Vec<BookRecord>, u32)> {
        let mut records = Vec::new();
        let mut page_url = Some(category.url.clone());

        while let Some(url) = page_url.take() {
            tracing::debug!("Fetching listing page: {}", url);
            let html = fetch_page(&self.client, &url, self.encoding).await?;
            tally.pages_fetched += 1;

            let listing = parse_listing(&html, &category.url, &self.base_url)?;
            for item in listing.items {
                let book = self.build_book(item, &category.name, tally).await?;
                records.push(book.with_id(next_id));
                next_id += 1;
            }

            page_url = listing.next_page;
        }

        Ok((records, next_id))
    }

    /// Downloads the cover for `item` and fills in the public image URL
    async fn build_book(
        &self,
        item: ListingItem,
        category: &str,
        tally: &mut CrawlTally,
    ) -> Result<ScrapedBook> {
        let outcome = download_image(
            &self.client,
            &item.image_url,
            category,
            &self.images,
            self.image_policy,
        )
        .await?;

        if outcome.is_missing() {
            tally.images_missing += 1;
        }

        Ok(ScrapedBook {
            title: item.title,
            price: item.price,
            availability: item.availability,
            rating: item.rating,
            category: category.to_string(),
            image_path: format!("{}{}", self.image_base_url, outcome.file_name()),
        })
    }
}
