use serde::{Deserialize, Serialize};
use std::fmt;

/// Star rating as published by the bookstore
///
/// The site encodes it as the second class token of the rating container
/// (`star-rating Three`). `Unrated` is stored as the literal `None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Rating {
    One,
    Two,
    Three,
    Four,
    Five,
    #[serde(rename = "None")]
    Unrated,
}

impl Rating {
    /// Maps a rating class token to a rating, `None` for anything outside the vocabulary
    pub fn from_class_token(token: &str) -> Option<Self> {
        match token {
            "One" => Some(Self::One),
            "Two" => Some(Self::Two),
            "Three" => Some(Self::Three),
            "Four" => Some(Self::Four),
            "Five" => Some(Self::Five),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::One => "One",
            Self::Two => "Two",
            Self::Three => "Three",
            Self::Four => "Four",
            Self::Five => "Five",
            Self::Unrated => "None",
        }
    }
}

impl fmt::Display for Rating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A book as extracted from one listing page, before an id is assigned
#[derive(Debug, Clone, PartialEq)]
pub struct ScrapedBook {
    pub title: String,
    pub price: f64,
    pub availability: String,
    pub rating: Rating,
    pub category: String,
    pub image_path: String,
}

impl ScrapedBook {
    /// Stamps the crawl-order id onto this book
    pub fn with_id(self, id: u32) -> BookRecord {
        BookRecord {
            id,
            title: self.title,
            price: self.price,
            availability: self.availability,
            rating: self.rating,
            category: self.category,
            image_path: self.image_path,
        }
    }
}

/// One row of the catalog
///
/// Field order is the column order of the CSV header.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookRecord {
    pub id: u32,
    pub title: String,
    pub price: f64,
    pub availability: String,
    pub rating: Rating,
    pub category: String,
    pub image_path: String,
}
