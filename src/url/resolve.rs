use url::Url;

/// Resolves a pagination link against a category's listing root
///
/// The final path segment of the category URL is replaced by `href`. Pages
/// after the first live next to the category index, so this holds no matter
/// which page of the category the link was found on.
///
/// # Examples
///
/// ```
/// use books_catalog::url::resolve_listing_link;
/// use url::Url;
///
/// let root = Url::parse("https://books.toscrape.com/catalogue/category/books/mystery_3/index.html").unwrap();
/// let next = resolve_listing_link(&root, "page-2.html").unwrap();
/// assert_eq!(
///     next.as_str(),
///     "https://books.toscrape.com/catalogue/category/books/mystery_3/page-2.html"
/// );
/// ```
pub fn resolve_listing_link(category_url: &Url, href: &str) -> Result<Url, url::ParseError> {
    let root = category_url.as_str();
    let dir = match root.rsplit_once('/') {
        Some((dir, _)) => dir,
        None => root,
    };
    Url::parse(&format!("{}/{}", dir, href.trim()))
}

/// Resolves a thumbnail `src` against the site base URL
///
/// Leading `../` markers are dropped before joining, since listing pages sit
/// at varying depths below the site root but images always live under it.
pub fn resolve_image_src(base_url: &Url, src: &str) -> Result<Url, url::ParseError> {
    let mut relative = src.trim();
    while let Some(rest) = relative.strip_prefix("../") {
        relative = rest;
    }
    base_url.join(relative)
}

/// Final path segment of a URL, if it has a non-empty one
pub fn file_name_of(url: &Url) -> Option<&str> {
    url.path_segments()
        .and_then(|mut segments| segments.next_back())
        .filter(|segment| !segment.is_empty())
}
