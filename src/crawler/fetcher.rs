//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the crawler:
//! - Building the HTTP client with a descriptive user agent string
//! - GET requests for listing pages, decoded with a single-byte encoding
//! - Cover image downloads written to the local image directory
//!
//! There is no retry logic. A failed page fetch is returned as an error and
//! ends the run; a failed image download is governed by a [`FailurePolicy`].

use crate::config::{CrawlerConfig, FailurePolicy, ImageNaming, UserAgentConfig};
use crate::url::file_name_of;
use crate::{CatalogError, Result};
use encoding_rs::Encoding;
use reqwest::Client;
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `crawler` - Crawler settings (request timeout)
/// * `user_agent` - The user agent configuration
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
pub fn build_http_client(
    crawler: &CrawlerConfig,
    user_agent: &UserAgentConfig,
) -> std::result::Result<Client, reqwest::Error> {
    // Format: CrawlerName/Version (+ContactURL; ContactEmail)
    let user_agent = format!(
        "{}/{} (+{}; {})",
        user_agent.crawler_name,
        user_agent.crawler_version,
        user_agent.contact_url,
        user_agent.contact_email
    );

    Client::builder()
        .user_agent(user_agent)
        .timeout(Duration::from_secs(crawler.request_timeout))
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches a page and decodes its body with `encoding`
///
/// The body is decoded with the given single-byte encoding regardless of any
/// charset the server declares.
///
/// # Errors
///
/// * `CatalogError::Http` - Transport failure (connect, timeout, body read)
/// * `CatalogError::HttpStatus` - Any non-2xx response
pub async fn fetch_page(client: &Client, url: &Url, encoding: &'static Encoding) -> Result<String> {
    let response = client
        .get(url.clone())
        .send()
        .await
        .map_err(|source| CatalogError::Http {
            url: url.to_string(),
            source,
        })?;

    let status = response.status();
    if !status.is_success() {
        return Err(CatalogError::HttpStatus {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }

    let bytes = response.bytes().await.map_err(|source| CatalogError::Http {
        url: url.to_string(),
        source,
    })?;

    let (text, had_errors) = encoding.decode_without_bom_handling(&bytes);
    if had_errors {
        tracing::debug!("Replacement characters while decoding {}", url);
    }
    Ok(text.into_owned())
}

/// Result of a cover image download
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageOutcome {
    /// The image was written to `path`
    Saved(PathBuf),

    /// The download failed under a best-effort policy; nothing was written
    Missing {
        /// Where the image would have been written
        path: PathBuf,
        /// Why the download failed
        reason: String,
    },
}

impl ImageOutcome {
    /// Local path of the image, whether or not it was written
    pub fn path(&self) -> &Path {
        match self {
            Self::Saved(path) => path,
            Self::Missing { path, .. } => path,
        }
    }

    /// File name the image is (or would be) stored under
    pub fn file_name(&self) -> String {
        self.path()
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, Self::Missing { .. })
    }
}

/// Local directory cover images are stored in, and how they are named
#[derive(Debug, Clone)]
pub struct ImageStore {
    dir: PathBuf,
    naming: ImageNaming,
}

impl ImageStore {
    pub fn new(dir: impl Into<PathBuf>, naming: ImageNaming) -> Self {
        Self {
            dir: dir.into(),
            naming,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File name for an image under this store's naming scheme
    ///
    /// `content` is the downloaded payload when there is one. Content-hash
    /// naming falls back to hashing the image URL when it is `None`.
    pub fn file_name(&self, image_url: &Url, category: &str, content: Option<&[u8]>) -> String {
        let basename = file_name_of(image_url)
            .map(str::to_string)
            .unwrap_or_else(|| format!("{}.img", short_hash(image_url.as_str().as_bytes())));

        match self.naming {
            ImageNaming::Basename => basename,
            ImageNaming::Category => format!("{}-{}", category_slug(category), basename),
            ImageNaming::ContentHash => {
                let digest = match content {
                    Some(bytes) => hex::encode(Sha256::digest(bytes)),
                    None => hex::encode(Sha256::digest(image_url.as_str().as_bytes())),
                };
                match basename.rsplit_once('.') {
                    Some((_, ext)) if !ext.is_empty() => format!("{}.{}", digest, ext),
                    _ => digest,
                }
            }
        }
    }
}

/// Downloads a cover image into `store`
///
/// The image directory is created first if it does not exist. Under
/// `FailurePolicy::BestEffort` a failed download is logged and reported as
/// `ImageOutcome::Missing`; under `FailurePolicy::FailFast` it is an error.
pub async fn download_image(
    client: &Client,
    image_url: &Url,
    category: &str,
    store: &ImageStore,
    policy: FailurePolicy,
) -> Result<ImageOutcome> {
    tokio::fs::create_dir_all(store.dir()).await?;

    let payload = match fetch_image_bytes(client, image_url).await {
        Ok(bytes) => bytes,
        Err(error) => {
            if policy == FailurePolicy::FailFast {
                return Err(error);
            }
            let path = store.dir().join(store.file_name(image_url, category, None));
            tracing::warn!("Failed to download image {}: {}", image_url, error);
            return Ok(ImageOutcome::Missing {
                path,
                reason: error.to_string(),
            });
        }
    };

    let path = store
        .dir()
        .join(store.file_name(image_url, category, Some(payload.as_slice())));
    tokio::fs::write(&path, &payload).await?;
    tracing::trace!("Saved image {} -> {}", image_url, path.display());

    Ok(ImageOutcome::Saved(path))
}

async fn fetch_image_bytes(client: &Client, image_url: &Url) -> Result<Vec<u8>> {
    let response = client
        .get(image_url.clone())
        .send()
        .await
        .map_err(|source| CatalogError::Http {
            url: image_url.to_string(),
            source,
        })?;

    let status = response.status();
    if !status.is_success() {
        return Err(CatalogError::HttpStatus {
            url: image_url.to_string(),
            status: status.as_u16(),
        });
    }

    let bytes = response.bytes().await.map_err(|source| CatalogError::Http {
        url: image_url.to_string(),
        source,
    })?;
    Ok(bytes.to_vec())
}

/// Lowercase, hyphen-separated form of a category name
///
/// `"Sequential Art"` becomes `"sequential-art"`.
pub fn category_slug(category: &str) -> String {
    let mut slug = String::with_capacity(category.len());
    for c in category.chars() {
        if c.is_alphanumeric() {
            slug.extend(c.to_lowercase());
        } else if !slug.is_empty() && !slug.ends_with('-') {
            slug.push('-');
        }
    }
    while slug.ends_with('-') {
        slug.pop();
    }
    if slug.is_empty() {
        slug.push_str("uncategorized");
    }
    slug
}

fn short_hash(bytes: &[u8]) -> String {
    hex::encode(&Sha256::digest(bytes)[..8])
}
