//! URL handling module for Books-Catalog
//!
//! The bookstore uses relative links everywhere. This module turns them into
//! absolute URLs the same way the site's own navigation resolves them.

mod resolve;

pub use resolve::{file_name_of, resolve_image_src, resolve_listing_link};
