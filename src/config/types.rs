use serde::Deserialize;

/// Main configuration structure for Books-Catalog
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub site: SiteConfig,
    #[serde(default)]
    pub crawler: CrawlerConfig,
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    pub output: OutputConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

/// Source site configuration
#[derive(Debug, Clone, Deserialize)]
pub struct SiteConfig {
    /// Root of the bookstore; categories are discovered here and image
    /// sources are resolved against it
    #[serde(rename = "base-url")]
    pub base_url: String,

    /// Public prefix substituted for the local image directory in `image_path`
    #[serde(rename = "image-base-url")]
    pub image_base_url: String,

    /// WHATWG label of the single-byte encoding listing pages are decoded with
    #[serde(rename = "page-encoding", default = "default_page_encoding")]
    pub page_encoding: String,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// Per-request timeout (seconds)
    #[serde(rename = "request-timeout", default = "default_request_timeout")]
    pub request_timeout: u64,

    /// What a failed cover download does to the run
    #[serde(rename = "image-failure-policy", default)]
    pub image_failure_policy: FailurePolicy,

    /// How downloaded cover images are named on disk
    #[serde(rename = "image-naming", default)]
    pub image_naming: ImageNaming,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            request_timeout: default_request_timeout(),
            image_failure_policy: FailurePolicy::default(),
            image_naming: ImageNaming::default(),
        }
    }
}

/// Failure handling for a single fetch
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FailurePolicy {
    /// Abort the whole run
    FailFast,
    /// Log and carry on
    #[default]
    BestEffort,
}

/// File naming scheme for downloaded cover images
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ImageNaming {
    /// Final URL path segment only; covers sharing a name overwrite each other
    Basename,
    /// Category slug prefixed to the final URL path segment
    #[default]
    Category,
    /// SHA-256 of the image bytes plus the original extension
    ContentHash,
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
pub struct UserAgentConfig {
    /// Name of the crawler
    #[serde(rename = "crawler-name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(rename = "crawler-version")]
    pub crawler_version: String,

    /// URL with information about the crawler
    #[serde(rename = "contact-url")]
    pub contact_url: String,

    /// Email address for crawler-related contact
    #[serde(rename = "contact-email")]
    pub contact_email: String,
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Path to the CSV catalog file
    #[serde(rename = "catalog-path")]
    pub catalog_path: String,

    /// Directory cover images are written to
    #[serde(rename = "image-dir")]
    pub image_dir: String,
}

/// Query service configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(rename = "bind-address", default = "default_bind_address")]
    pub bind_address: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
        }
    }
}

fn default_page_encoding() -> String {
    "ISO-8859-1".to_string()
}

fn default_request_timeout() -> u64 {
    30
}

fn default_bind_address() -> String {
    "127.0.0.1:8000".to_string()
}
