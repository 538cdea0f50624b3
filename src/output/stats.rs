//! Statistics over a set of catalog records

use crate::catalog::{BookRecord, Rating};
use std::collections::BTreeMap;

/// Price range of a catalog
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceSummary {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
}

/// Catalog statistics summary
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogStatistics {
    /// Total number of books
    pub total_books: u64,

    /// Books per category, in order of first appearance
    pub books_by_category: Vec<(String, u64)>,

    /// Books per rating
    pub books_by_rating: BTreeMap<Rating, u64>,

    /// `None` for an empty catalog
    pub price: Option<PriceSummary>,
}

impl CatalogStatistics {
    pub fn from_records(records: &[BookRecord]) -> Self {
        let mut books_by_category: Vec<(String, u64)> = Vec::new();
        let mut books_by_rating = BTreeMap::new();

        for record in records {
            match books_by_category
                .iter_mut()
                .find(|(name, _)| *name == record.category)
            {
                Some((_, count)) => *count += 1,
                None => books_by_category.push((record.category.clone(), 1)),
            }
            *books_by_rating.entry(record.rating).or_insert(0) += 1;
        }

        let price = if records.is_empty() {
            None
        } else {
            let (min, max, sum) = records.iter().fold(
                (f64::INFINITY, f64::NEG_INFINITY, 0.0),
                |(min, max, sum), r| (min.min(r.price), max.max(r.price), sum + r.price),
            );
            Some(PriceSummary {
                min,
                max,
                mean: sum / records.len() as f64,
            })
        };

        Self {
            total_books: records.len() as u64,
            books_by_category,
            books_by_rating,
            price,
        }
    }
}

/// Prints statistics to stdout in a formatted manner
pub fn print_statistics(stats: &CatalogStatistics) {
    println!("=== Catalog Statistics ===\n");

    println!("Overview:");
    println!("  Total books: {}", stats.total_books);
    println!("  Categories: {}", stats.books_by_category.len());
    if let Some(price) = &stats.price {
        println!(
            "  Price: min {:.2}, max {:.2}, mean {:.2}",
            price.min, price.max, price.mean
        );
    }
    println!();

    println!("Books by Rating:");
    for (rating, count) in &stats.books_by_rating {
        let percentage = if stats.total_books > 0 {
            (*count as f64 / stats.total_books as f64) * 100.0
        } else {
            0.0
        };
        println!("  {}: {} ({:.1}%)", rating, count, percentage);
    }
    println!();

    println!("Books by Category:");
    let mut category_counts: Vec<_> = stats.books_by_category.iter().collect();
    category_counts.sort_by(|a, b| b.1.cmp(&a.1));
    for (category, count) in category_counts {
        println!("  {}: {}", category, count);
    }
}
