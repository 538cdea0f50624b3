//! HTML parser for the bookstore's category and listing pages
//!
//! This module handles parsing HTML content to extract:
//! - The category list from the root page's navigation sidebar
//! - One `ListingItem` per book on a listing page
//! - The "next" pagination link, resolved against the category root
//!
//! Parsing is pure; downloading covers and assigning ids happen in the
//! coordinator.

use crate::catalog::Rating;
use crate::url::{resolve_image_src, resolve_listing_link};
use crate::{CatalogError, Result};
use scraper::{ElementRef, Html, Selector};
use url::Url;

const CATEGORY_LINKS: &str = ".side_categories ul li ul li a";
const PRODUCT: &str = "article.product_pod";
const TITLE_LINK: &str = "h3 a";
const PRICE: &str = ".price_color";
const AVAILABILITY: &str = ".availability";
const RATING: &str = "p.star-rating";
const THUMBNAIL: &str = "div.image_container img";
const NEXT_LINK: &str = "li.next a";

/// A category found in the navigation sidebar
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Category {
    pub name: String,
    /// First listing page of the category
    pub url: Url,
}

/// One book as it appears on a listing page
#[derive(Debug, Clone, PartialEq)]
pub struct ListingItem {
    pub title: String,
    pub price: f64,
    pub availability: String,
    pub rating: Rating,
    /// Absolute URL of the cover thumbnail
    pub image_url: Url,
}

/// Everything extracted from one listing page
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedListing {
    /// Items in document order
    pub items: Vec<ListingItem>,

    /// Next listing page of the same category, if any
    pub next_page: Option<Url>,
}

fn selector(css: &'static str) -> Result<Selector> {
    Selector::parse(css).map_err(|_| CatalogError::Selector(css))
}

/// Extracts the category list from the site root page
///
/// Categories are returned in sidebar document order. A name that appears
/// twice keeps its first position but takes the URL of its last link.
///
/// # Example
///
/// ```
/// use books_catalog::crawler::parse_categories;
/// use url::Url;
///
/// let html = r#"<div class="side_categories"><ul><li><a href="index.html">Books</a><ul>
///     <li><a href="catalogue/category/books/travel_2/index.html"> Travel </a></li>
/// </ul></li></ul></div>"#;
/// let base = Url::parse("https://books.toscrape.com/").unwrap();
/// let categories = parse_categories(html, &base).unwrap();
/// assert_eq!(categories[0].name, "Travel");
/// ```
pub fn parse_categories(html: &str, base_url: &Url) -> Result<Vec<Category>> {
    let document = Html::parse_document(html);
    let links = selector(CATEGORY_LINKS)?;

    let mut categories: Vec<Category> = Vec::new();
    for element in document.select(&links) {
        let Some(href) = element.value().attr("href") else {
            continue;
        };
        let name = text_of(&element);
        if name.is_empty() {
            continue;
        }
        let url = base_url.join(href.trim())?;
        if let Some(existing) = categories.iter_mut().find(|c| c.name == name) {
            tracing::warn!("Duplicate category '{}' in sidebar, using {}", name, url);
            existing.url = url;
            continue;
        }
        categories.push(Category { name, url });
    }

    Ok(categories)
}

/// Parses one listing page of `category_url`
///
/// # Arguments
///
/// * `html` - The listing page markup
/// * `category_url` - First page of the category; the next link is resolved against it
/// * `base_url` - Site root; thumbnail sources are resolved against it
///
/// # Errors
///
/// An item without a non-blank title attribute, price, availability or
/// thumbnail is an error, as is a price with no digits.
pub fn parse_listing(html: &str, category_url: &Url, base_url: &Url) -> Result<ParsedListing> {
    let document = Html::parse_document(html);
    let product = selector(PRODUCT)?;

    let mut items = Vec::new();
    for element in document.select(&product) {
        items.push(parse_item(&element, base_url)?);
    }

    let next_page = match document.select(&selector(NEXT_LINK)?).next() {
        Some(link) => match link.value().attr("href") {
            Some(href) => Some(resolve_listing_link(category_url, href)?),
            None => None,
        },
        None => None,
    };

    Ok(ParsedListing { items, next_page })
}

fn parse_item(element: &ElementRef<'_>, base_url: &Url) -> Result<ListingItem> {
    let title = element
        .select(&selector(TITLE_LINK)?)
        .next()
        .and_then(|a| a.value().attr("title"))
        .filter(|t| !t.trim().is_empty())
        .map(str::to_string)
        .ok_or(CatalogError::MissingElement {
            what: "a title link",
        })?;

    let price_text = element
        .select(&selector(PRICE)?)
        .next()
        .map(|e| text_of(&e))
        .ok_or(CatalogError::MissingElement { what: "a price" })?;
    let price = parse_price(&price_text)?;

    let availability = element
        .select(&selector(AVAILABILITY)?)
        .next()
        .map(|e| text_of(&e))
        .ok_or(CatalogError::MissingElement {
            what: "an availability status",
        })?;

    let rating = element
        .select(&selector(RATING)?)
        .next()
        .and_then(|p| p.value().attr("class"))
        .map(rating_from_class_list)
        .unwrap_or(Rating::Unrated);

    let src = element
        .select(&selector(THUMBNAIL)?)
        .next()
        .and_then(|img| img.value().attr("src"))
        .ok_or(CatalogError::MissingElement { what: "a thumbnail" })?;
    let image_url = resolve_image_src(base_url, src)?;

    Ok(ListingItem {
        title,
        price,
        availability,
        rating,
        image_url,
    })
}

/// Reads the rating from a class attribute such as `"star-rating Three"`
///
/// The first token is the marker class; the second is the rating word.
/// Fewer than two tokens, or a word outside the vocabulary, yields `Unrated`.
pub fn rating_from_class_list(class_attr: &str) -> Rating {
    match class_attr.split_whitespace().nth(1) {
        Some(token) => Rating::from_class_token(token).unwrap_or_else(|| {
            tracing::debug!("Unknown rating class '{}'", token);
            Rating::Unrated
        }),
        None => Rating::Unrated,
    }
}

/// Parses a currency-formatted price, keeping only digits and the decimal point
///
/// # Examples
///
/// ```
/// use books_catalog::crawler::parse_price;
///
/// assert_eq!(parse_price("£51.77").unwrap(), 51.77);
/// assert!(parse_price("free").is_err());
/// ```
pub fn parse_price(text: &str) -> Result<f64> {
    let cleaned: String = text
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect();

    if !cleaned.chars().any(|c| c.is_ascii_digit()) {
        return Err(CatalogError::PriceParse(text.to_string()));
    }

    cleaned
        .parse::<f64>()
        .map_err(|_| CatalogError::PriceParse(text.to_string()))
}

fn text_of(element: &ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}
