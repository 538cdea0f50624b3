//! Integration tests for the crawler
//!
//! These tests use wiremock to stand up a miniature bookstore and run the
//! full crawl cycle against it end-to-end.

use books_catalog::catalog::read_catalog;
use books_catalog::config::{
    Config, CrawlerConfig, FailurePolicy, ImageNaming, OutputConfig, ServerConfig, SiteConfig,
    UserAgentConfig,
};
use books_catalog::crawler::{crawl, Coordinator};
use books_catalog::{CatalogError, Rating};
use std::time::Duration;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const IMAGE_BASE: &str = "https://cdn.example.org/images/";

/// Creates a test configuration pointing at the mock site
fn create_test_config(base_url: &str, workdir: &TempDir) -> Config {
    Config {
        site: SiteConfig {
            base_url: format!("{}/", base_url),
            image_base_url: IMAGE_BASE.to_string(),
            page_encoding: "ISO-8859-1".to_string(),
        },
        crawler: CrawlerConfig {
            request_timeout: 5,
            image_failure_policy: FailurePolicy::BestEffort,
            image_naming: ImageNaming::Category,
        },
        user_agent: UserAgentConfig {
            crawler_name: "TestBot".to_string(),
            crawler_version: "1.0.0".to_string(),
            contact_url: "https://example.com/contact".to_string(),
            contact_email: "test@example.com".to_string(),
        },
        output: OutputConfig {
            catalog_path: workdir
                .path()
                .join("data")
                .join("books.csv")
                .to_string_lossy()
                .into_owned(),
            image_dir: workdir.path().join("images").to_string_lossy().into_owned(),
        },
        server: ServerConfig::default(),
    }
}

fn root_page(categories: &[(&str, &str)]) -> String {
    let items: String = categories
        .iter()
        .map(|(name, slug)| {
            format!(
                r#"<li><a href="catalogue/category/books/{slug}/index.html">
                    {name}
                </a></li>"#
            )
        })
        .collect();
    format!(
        r#"<html><body><div class="side_categories"><ul><li>
            <a href="catalogue/category/books_1/index.html">Books</a>
            <ul>{items}</ul>
        </li></ul></div></body></html>"#
    )
}

fn article(title: &str, price: &str, rating_class: &str, image: &str) -> String {
    format!(
        r#"<article class="product_pod">
            <div class="image_container">
                <a href="../../../x/index.html"><img src="../../../../media/cache/{image}" class="thumbnail"></a>
            </div>
            <p class="{rating_class}"></p>
            <h3><a href="../../../x/index.html" title="{title}">{title}</a></h3>
            <div class="product_price">
                <p class="price_color">{price}</p>
                <p class="instock availability"> In stock </p>
            </div>
        </article>"#
    )
}

fn listing_page(articles: &[String], next: Option<&str>) -> String {
    let pager = next
        .map(|href| format!(r#"<ul class="pager"><li class="next"><a href="{href}">next</a></li></ul>"#))
        .unwrap_or_default();
    format!(
        "<html><body><ol class=\"row\">{}</ol>{}</body></html>",
        articles.join("\n"),
        pager
    )
}

async fn mount_html(server: &MockServer, route: &str, body: String, expected: u64) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(body)
                .insert_header("content-type", "text/html"),
        )
        .expect(expected)
        .mount(server)
        .await;
}

async fn mount_image(server: &MockServer, name: &str) {
    Mock::given(method("GET"))
        .and(path(format!("/media/cache/{name}")))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(format!("jpeg:{name}").into_bytes()))
        .mount(server)
        .await;
}

/// Two categories: Travel spans two listing pages, Mystery one.
/// The cover `m2.jpg` is not served.
async fn mount_bookstore(server: &MockServer, runs: u64) {
    mount_html(
        server,
        "/",
        root_page(&[("Travel", "travel_2"), ("Mystery", "mystery_3")]),
        runs,
    )
    .await;

    mount_html(
        server,
        "/catalogue/category/books/travel_2/index.html",
        listing_page(
            &[
                article("It's Only the Himalayas", "£45.17", "star-rating Two", "t1.jpg"),
                article("Full Moon over Noah's Ark", "£49.43", "star-rating Four", "t2.jpg"),
            ],
            Some("page-2.html"),
        ),
        runs,
    )
    .await;

    mount_html(
        server,
        "/catalogue/category/books/travel_2/page-2.html",
        listing_page(
            &[article("See America", "£48.87", "star-rating", "t3.jpg")],
            None,
        ),
        runs,
    )
    .await;

    mount_html(
        server,
        "/catalogue/category/books/mystery_3/index.html",
        listing_page(
            &[
                article("Sharp Objects", "£47.82", "star-rating Four", "m1.jpg"),
                article("In a Dark, Dark Wood", "£19.63", "star-rating One", "m2.jpg"),
            ],
            None,
        ),
        runs,
    )
    .await;

    for image in ["t1.jpg", "t2.jpg", "t3.jpg", "m1.jpg"] {
        mount_image(server, image).await;
    }
}

#[tokio::test]
async fn test_full_crawl_writes_catalog() {
    let mock_server = MockServer::start().await;
    mount_bookstore(&mock_server, 1).await;

    let workdir = TempDir::new().unwrap();
    let config = create_test_config(&mock_server.uri(), &workdir);

    let report = crawl(&config).await.expect("Crawl failed");

    // Ids are contiguous from 1 in visitation order
    let ids: Vec<u32> = report.records.iter().map(|r| r.id).collect();
    assert_eq!(ids, vec![1, 2, 3, 4, 5]);

    let titles: Vec<&str> = report.records.iter().map(|r| r.title.as_str()).collect();
    assert_eq!(
        titles,
        vec![
            "It's Only the Himalayas",
            "Full Moon over Noah's Ark",
            "See America",
            "Sharp Objects",
            "In a Dark, Dark Wood",
        ]
    );

    assert_eq!(report.categories, vec!["Travel", "Mystery"]);
    assert_eq!(report.pages_fetched, 3);
    assert_eq!(report.images_missing, 1);

    let first = &report.records[0];
    assert_eq!(first.price, 45.17);
    assert_eq!(first.availability, "In stock");
    assert_eq!(first.rating, Rating::Two);
    assert_eq!(first.category, "Travel");
    assert_eq!(first.image_path, format!("{IMAGE_BASE}travel-t1.jpg"));

    assert_eq!(report.records[2].rating, Rating::Unrated);
    assert_eq!(report.records[3].category, "Mystery");

    // Covers land on disk, except the one the site failed to serve
    let image_dir = workdir.path().join("images");
    assert_eq!(
        std::fs::read(image_dir.join("travel-t1.jpg")).unwrap(),
        b"jpeg:t1.jpg"
    );
    assert!(image_dir.join("mystery-m1.jpg").is_file());
    assert!(!image_dir.join("mystery-m2.jpg").exists());
    assert_eq!(
        report.records[4].image_path,
        format!("{IMAGE_BASE}mystery-m2.jpg")
    );

    // The catalog file holds exactly the crawled records
    let written = read_catalog(std::path::Path::new(&config.output.catalog_path)).unwrap();
    assert_eq!(written, report.records);
}

#[tokio::test]
async fn test_crawl_is_deterministic() {
    let mock_server = MockServer::start().await;
    mount_bookstore(&mock_server, 2).await;

    let workdir = TempDir::new().unwrap();
    let config = create_test_config(&mock_server.uri(), &workdir);
    let coordinator = Coordinator::new(&config).unwrap();

    let first = coordinator.run().await.unwrap();
    let second = coordinator.run().await.unwrap();

    assert_eq!(first.categories, second.categories);
    assert_eq!(first.records, second.records);
}

#[tokio::test]
async fn test_basename_naming_reproduces_site_file_names() {
    let mock_server = MockServer::start().await;
    mount_bookstore(&mock_server, 1).await;

    let workdir = TempDir::new().unwrap();
    let mut config = create_test_config(&mock_server.uri(), &workdir);
    config.crawler.image_naming = ImageNaming::Basename;

    let report = Coordinator::new(&config).unwrap().run().await.unwrap();

    assert_eq!(report.records[0].image_path, format!("{IMAGE_BASE}t1.jpg"));
    assert!(workdir.path().join("images").join("t1.jpg").is_file());
}

#[tokio::test]
async fn test_root_page_failure_aborts_run() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&mock_server)
        .await;

    let workdir = TempDir::new().unwrap();
    let config = create_test_config(&mock_server.uri(), &workdir);

    let result = crawl(&config).await;
    assert!(matches!(
        result,
        Err(CatalogError::HttpStatus { status: 503, .. })
    ));
    assert!(!std::path::Path::new(&config.output.catalog_path).exists());
}

#[tokio::test]
async fn test_listing_failure_keeps_previous_catalog() {
    let mock_server = MockServer::start().await;

    mount_html(
        &mock_server,
        "/",
        root_page(&[("Travel", "travel_2")]),
        1,
    )
    .await;
    mount_html(
        &mock_server,
        "/catalogue/category/books/travel_2/index.html",
        listing_page(
            &[article("See America", "£48.87", "star-rating One", "t3.jpg")],
            Some("page-2.html"),
        ),
        1,
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/catalogue/category/books/travel_2/page-2.html"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&mock_server)
        .await;
    mount_image(&mock_server, "t3.jpg").await;

    let workdir = TempDir::new().unwrap();
    let config = create_test_config(&mock_server.uri(), &workdir);

    let catalog_path = std::path::Path::new(&config.output.catalog_path);
    std::fs::create_dir_all(catalog_path.parent().unwrap()).unwrap();
    std::fs::write(catalog_path, "previous snapshot").unwrap();

    let result = crawl(&config).await;
    assert!(matches!(
        result,
        Err(CatalogError::HttpStatus { status: 500, .. })
    ));
    assert_eq!(
        std::fs::read_to_string(catalog_path).unwrap(),
        "previous snapshot"
    );
}

#[tokio::test]
async fn test_listing_timeout_aborts_run_and_keeps_previous_catalog() {
    let mock_server = MockServer::start().await;

    mount_html(
        &mock_server,
        "/",
        root_page(&[("Travel", "travel_2")]),
        1,
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/catalogue/category/books/travel_2/index.html"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(listing_page(
                    &[article("See America", "£48.87", "star-rating One", "t3.jpg")],
                    None,
                ))
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&mock_server)
        .await;

    let workdir = TempDir::new().unwrap();
    let mut config = create_test_config(&mock_server.uri(), &workdir);
    config.crawler.request_timeout = 1;

    let catalog_path = std::path::Path::new(&config.output.catalog_path);
    std::fs::create_dir_all(catalog_path.parent().unwrap()).unwrap();
    std::fs::write(catalog_path, "previous snapshot").unwrap();

    let result = crawl(&config).await;
    match result {
        Err(CatalogError::Http { url, source }) => {
            assert!(url.ends_with("/catalogue/category/books/travel_2/index.html"));
            assert!(source.is_timeout());
        }
        other => panic!("expected a transport error, got {:?}", other.map(|r| r.records.len())),
    }
    assert_eq!(
        std::fs::read_to_string(catalog_path).unwrap(),
        "previous snapshot"
    );
}

#[tokio::test]
async fn test_unreachable_site_aborts_run() {
    // Bind then release a port so nothing is listening on it
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let workdir = TempDir::new().unwrap();
    let config = create_test_config(&format!("http://{}", addr), &workdir);

    let result = crawl(&config).await;
    assert!(matches!(result, Err(CatalogError::Http { .. })));
    assert!(!std::path::Path::new(&config.output.catalog_path).exists());
}

#[tokio::test]
async fn test_fail_fast_image_policy_aborts_run() {
    let mock_server = MockServer::start().await;
    mount_bookstore(&mock_server, 1).await;

    let workdir = TempDir::new().unwrap();
    let mut config = create_test_config(&mock_server.uri(), &workdir);
    config.crawler.image_failure_policy = FailurePolicy::FailFast;

    let result = Coordinator::new(&config).unwrap().run().await;
    assert!(matches!(
        result,
        Err(CatalogError::HttpStatus { status: 404, .. })
    ));
}

#[tokio::test]
async fn test_crawl_without_books_is_an_empty_catalog_error() {
    let mock_server = MockServer::start().await;
    mount_html(&mock_server, "/", root_page(&[("Poetry", "poetry_23")]), 1).await;
    mount_html(
        &mock_server,
        "/catalogue/category/books/poetry_23/index.html",
        listing_page(&[], None),
        1,
    )
    .await;

    let workdir = TempDir::new().unwrap();
    let config = create_test_config(&mock_server.uri(), &workdir);

    let result = crawl(&config).await;
    assert!(matches!(result, Err(CatalogError::EmptyCatalog)));
    assert!(!std::path::Path::new(&config.output.catalog_path).exists());
}

#[tokio::test]
async fn test_pages_are_decoded_as_latin1() {
    let mock_server = MockServer::start().await;
    mount_html(&mock_server, "/", root_page(&[("Travel", "travel_2")]), 1).await;

    // "Café" with a single 0xE9 byte, which is not valid UTF-8
    let mut body = listing_page(
        &[article("CAFE_TITLE", "£10.00", "star-rating Five", "t1.jpg")],
        None,
    )
    .into_bytes();
    let marker = b"CAFE_TITLE";
    while let Some(pos) = body.windows(marker.len()).position(|w| w == marker) {
        body.splice(pos..pos + marker.len(), b"Caf\xe9".iter().copied());
    }
    Mock::given(method("GET"))
        .and(path("/catalogue/category/books/travel_2/index.html"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_bytes(body)
                .insert_header("content-type", "text/html"),
        )
        .mount(&mock_server)
        .await;
    mount_image(&mock_server, "t1.jpg").await;

    let workdir = TempDir::new().unwrap();
    let config = create_test_config(&mock_server.uri(), &workdir);

    let report = Coordinator::new(&config).unwrap().run().await.unwrap();
    assert_eq!(report.records[0].title, "Café");
    assert_eq!(report.records[0].price, 10.0);
}
