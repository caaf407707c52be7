//! Page metadata extraction for saved links
//!
//! Given a URL, performs a single outbound GET and derives a best-effort
//! `{title, description, image_url}` from the returned HTML. Each field is
//! resolved through an ordered fallback chain over meta tags, evaluated until
//! one yields non-empty text. Network and parse failures never escape this
//! module; they degrade to an all-absent result and a warning log.

use anyhow::Result;
use scraper::{Html, Selector};
use std::time::Duration;
use tracing::warn;

/// Browser-identifying User-Agent; many sites reject unidentified clients.
const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                          (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// Per-fetch timeout bounding worst-case latency of the outbound call.
const FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// Extracted page metadata; any field may be absent
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageMetadata {
    pub title: Option<String>,
    pub description: Option<String>,
    pub image_url: Option<String>,
}

/// A single step in a fallback chain
#[derive(Debug, Clone, Copy)]
enum MetaLookup {
    /// `<meta property="..." content="...">`
    Property(&'static str),
    /// `<meta name="..." content="...">`
    Name(&'static str),
    /// `<title>` element text
    TitleText,
}

const TITLE_CHAIN: &[MetaLookup] = &[
    MetaLookup::Property("og:title"),
    MetaLookup::TitleText,
    MetaLookup::Name("title"),
];

const DESCRIPTION_CHAIN: &[MetaLookup] = &[
    MetaLookup::Property("og:description"),
    MetaLookup::Name("description"),
];

const IMAGE_CHAIN: &[MetaLookup] = &[
    MetaLookup::Property("og:image"),
    MetaLookup::Property("og:image:url"),
];

/// Lookup capability over a parsed document
///
/// The fallback chains are plain data evaluated against this trait, so they
/// can be exercised with synthetic documents independently of any fetch.
trait MetaDocument {
    fn meta_content(&self, attr: &str, value: &str) -> Option<String>;
    fn title_text(&self) -> Option<String>;
}

/// Evaluate a fallback chain, returning the first non-empty trimmed value
fn resolve_chain(doc: &impl MetaDocument, chain: &[MetaLookup]) -> Option<String> {
    chain.iter().find_map(|lookup| {
        let raw = match lookup {
            MetaLookup::Property(name) => doc.meta_content("property", name),
            MetaLookup::Name(name) => doc.meta_content("name", name),
            MetaLookup::TitleText => doc.title_text(),
        }?;
        let trimmed = raw.trim();
        (!trimmed.is_empty()).then(|| trimmed.to_string())
    })
}

/// Parsed HTML document backed by `scraper`, tolerant of malformed markup
struct HtmlDocument {
    html: Html,
}

impl HtmlDocument {
    fn parse(body: &str) -> Self {
        Self {
            html: Html::parse_document(body),
        }
    }
}

impl MetaDocument for HtmlDocument {
    fn meta_content(&self, attr: &str, value: &str) -> Option<String> {
        let selector = Selector::parse(&format!(r#"meta[{attr}="{value}"]"#)).ok()?;
        self.html
            .select(&selector)
            .next()?
            .value()
            .attr("content")
            .map(str::to_string)
    }

    fn title_text(&self) -> Option<String> {
        let selector = Selector::parse("title").ok()?;
        let element = self.html.select(&selector).next()?;
        Some(element.text().collect::<String>())
    }
}

/// Derive page metadata from an HTML body
pub fn parse_page_metadata(body: &str) -> PageMetadata {
    let doc = HtmlDocument::parse(body);

    PageMetadata {
        title: resolve_chain(&doc, TITLE_CHAIN),
        description: resolve_chain(&doc, DESCRIPTION_CHAIN),
        image_url: resolve_chain(&doc, IMAGE_CHAIN),
    }
}

/// Fetches remote pages and extracts their metadata
#[derive(Clone)]
pub struct MetadataExtractor {
    client: reqwest::Client,
}

impl MetadataExtractor {
    /// Create a new extractor with a browser User-Agent and a defensive timeout
    pub fn new() -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(FETCH_TIMEOUT)
            .build()?;

        Ok(Self { client })
    }

    /// Fetch `url` and extract its metadata
    ///
    /// Never fails: any network error, timeout, or unreadable body yields an
    /// all-absent `PageMetadata` and a warning log entry.
    pub async fn extract(&self, url: &str) -> PageMetadata {
        match self.fetch(url).await {
            Ok(metadata) => metadata,
            Err(e) => {
                warn!("Failed to scrape {}: {}", url, e);
                PageMetadata::default()
            }
        }
    }

    async fn fetch(&self, url: &str) -> Result<PageMetadata> {
        // Error pages carry titles like "404 Not Found"; a non-2xx response
        // is not a metadata source.
        let body = self
            .client
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;
        Ok(parse_page_metadata(&body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_og_title_preferred_over_document_title() {
        let html = r#"
            <html><head>
                <meta property="og:title" content="OG Title">
                <title>Document Title</title>
            </head><body></body></html>
        "#;
        let metadata = parse_page_metadata(html);
        assert_eq!(metadata.title.as_deref(), Some("OG Title"));
    }

    #[test]
    fn test_document_title_fallback() {
        let html = "<html><head><title>Document Title</title></head><body></body></html>";
        let metadata = parse_page_metadata(html);
        assert_eq!(metadata.title.as_deref(), Some("Document Title"));
    }

    #[test]
    fn test_meta_name_title_fallback() {
        let html = r#"<html><head><meta name="title" content="Named Title"></head></html>"#;
        let metadata = parse_page_metadata(html);
        assert_eq!(metadata.title.as_deref(), Some("Named Title"));
    }

    #[test]
    fn test_no_title_bearing_tags_yields_absent() {
        let html = "<html><head></head><body><p>hello</p></body></html>";
        let metadata = parse_page_metadata(html);
        assert_eq!(metadata.title, None);
        assert_eq!(metadata.description, None);
        assert_eq!(metadata.image_url, None);
    }

    #[test]
    fn test_empty_og_title_falls_through_to_document_title() {
        let html = r#"
            <html><head>
                <meta property="og:title" content="   ">
                <title>Document Title</title>
            </head></html>
        "#;
        let metadata = parse_page_metadata(html);
        assert_eq!(metadata.title.as_deref(), Some("Document Title"));
    }

    #[test]
    fn test_values_are_trimmed() {
        let html = "<html><head><title>  Padded Title  </title></head></html>";
        let metadata = parse_page_metadata(html);
        assert_eq!(metadata.title.as_deref(), Some("Padded Title"));
    }

    #[test]
    fn test_description_fallback_order() {
        let og = r#"
            <html><head>
                <meta property="og:description" content="OG Description">
                <meta name="description" content="Named Description">
            </head></html>
        "#;
        assert_eq!(
            parse_page_metadata(og).description.as_deref(),
            Some("OG Description")
        );

        let named = r#"<html><head><meta name="description" content="Named Description"></head></html>"#;
        assert_eq!(
            parse_page_metadata(named).description.as_deref(),
            Some("Named Description")
        );
    }

    #[test]
    fn test_image_fallback_order() {
        let og = r#"
            <html><head>
                <meta property="og:image" content="https://example.com/a.png">
                <meta property="og:image:url" content="https://example.com/b.png">
            </head></html>
        "#;
        assert_eq!(
            parse_page_metadata(og).image_url.as_deref(),
            Some("https://example.com/a.png")
        );

        let variant =
            r#"<html><head><meta property="og:image:url" content="https://example.com/b.png"></head></html>"#;
        assert_eq!(
            parse_page_metadata(variant).image_url.as_deref(),
            Some("https://example.com/b.png")
        );
    }

    #[test]
    fn test_relative_image_url_stored_as_found() {
        let html = r#"<html><head><meta property="og:image" content="/img/preview.png"></head></html>"#;
        let metadata = parse_page_metadata(html);
        assert_eq!(metadata.image_url.as_deref(), Some("/img/preview.png"));
    }

    #[test]
    fn test_malformed_markup_is_tolerated() {
        let html = "<html><head><title>Broken</title><div><p></head>";
        let metadata = parse_page_metadata(html);
        assert_eq!(metadata.title.as_deref(), Some("Broken"));
    }

    #[tokio::test]
    async fn test_extract_from_live_server() {
        use axum::{Router, response::Html, routing::get};

        let app = Router::new().route(
            "/page",
            get(|| async {
                Html(
                    r#"<html><head>
                        <meta property="og:title" content="Served Title">
                        <meta property="og:description" content="Served Description">
                        <meta property="og:image" content="https://example.com/served.png">
                    </head></html>"#,
                )
            }),
        );

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        let extractor = MetadataExtractor::new().unwrap();
        let metadata = extractor.extract(&format!("http://{addr}/page")).await;

        assert_eq!(metadata.title.as_deref(), Some("Served Title"));
        assert_eq!(metadata.description.as_deref(), Some("Served Description"));
        assert_eq!(
            metadata.image_url.as_deref(),
            Some("https://example.com/served.png")
        );
    }

    #[tokio::test]
    async fn test_extract_non_html_body_yields_absent_fields() {
        use axum::{Json, Router, routing::get};

        let app = Router::new().route(
            "/data",
            get(|| async { Json(serde_json::json!({"title": "not html"})) }),
        );

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        let extractor = MetadataExtractor::new().unwrap();
        let metadata = extractor.extract(&format!("http://{addr}/data")).await;

        assert_eq!(metadata, PageMetadata::default());
    }

    #[tokio::test]
    async fn test_extract_http_error_page_yields_absent_fields() {
        use axum::{Router, http::StatusCode, response::Html, routing::get};

        let app = Router::new().route(
            "/gone",
            get(|| async {
                (
                    StatusCode::NOT_FOUND,
                    Html("<html><head><title>404 Not Found - Example Site</title></head></html>"),
                )
            }),
        );

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        let extractor = MetadataExtractor::new().unwrap();
        let metadata = extractor.extract(&format!("http://{addr}/gone")).await;

        // An error page's title must not become the saved link's title
        assert_eq!(metadata, PageMetadata::default());
    }

    #[tokio::test]
    async fn test_extract_connection_refused_degrades_to_empty() {
        // Bind and drop to get a port with nothing listening on it
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let extractor = MetadataExtractor::new().unwrap();
        let metadata = extractor.extract(&format!("http://{addr}/")).await;

        assert_eq!(metadata, PageMetadata::default());
    }
}
