//! Full-text extraction with a two-stage fallback chain.
//!
//! Stage one reads the page like a readability tool: find the first
//! article-shaped container and take its paragraphs. When that yields a
//! suspiciously short body, stage two re-fetches the raw page and scrapes
//! every substantial `<p>` on it; the longer candidate wins outright, the
//! two are never merged. Whatever survives is scrubbed of boilerplate lines
//! and must clear a minimum length, or extraction reports no usable content.
//!
//! Every network or parse failure is that stage's failure only; the
//! extractor itself never errors out.

use once_cell::sync::Lazy;
use scraper::{Html, Selector};
use tracing::{debug, instrument, warn};

/// Primary bodies shorter than this trigger the paragraph scrape.
const PRIMARY_FLOOR_CHARS: usize = 200;
/// Paragraphs at or under this length are menus, bylines, and captions.
const PARAGRAPH_FLOOR_CHARS: usize = 30;
/// Cleaned bodies shorter than this are not worth keeping.
const FINAL_FLOOR_CHARS: usize = 50;

const FETCH_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(15);

/// The Googlebot identity gets past most cookie walls and paywalled
/// interstitials that plain clients hit.
const USER_AGENT: &str = "Mozilla/5.0 (compatible; Googlebot/2.1; +http://www.google.com/bot.html)";

/// Lines containing any of these are dropped from extracted bodies.
const GARBAGE_PHRASES: &[&str] = &[
    "We use cookies",
    "cookie policy",
    "Accept all",
    "Manage preferences",
    "This website uses cookies",
    "All rights reserved",
    "로그인이 필요합니다",
    "무단 전재 및 재배포 금지",
    "기자 구독",
];

/// Containers tried in order for the readability-style pass.
static CONTAINER_SELECTORS: Lazy<Vec<Selector>> = Lazy::new(|| {
    [
        "article",
        "[itemprop='articleBody']",
        "div.article-body",
        "main",
    ]
    .iter()
    .map(|s| Selector::parse(s).unwrap())
    .collect()
});

static PARAGRAPH: Lazy<Selector> = Lazy::new(|| Selector::parse("p").unwrap());

pub struct Extractor {
    http: reqwest::Client,
}

impl Extractor {
    pub fn new() -> Result<Self, reqwest::Error> {
        Ok(Self {
            http: reqwest::Client::builder()
                .user_agent(USER_AGENT)
                .timeout(FETCH_TIMEOUT)
                .build()?,
        })
    }

    /// Run the full fallback chain against a URL.
    ///
    /// `None` means no usable content; the caller falls back to the feed's
    /// own summary.
    #[instrument(level = "debug", skip(self))]
    pub async fn extract(&self, url: &str) -> Option<String> {
        let mut body = match self.fetch(url).await {
            Ok(html) => primary_body(&html),
            Err(e) => {
                warn!(%url, error = %e, "primary fetch failed");
                String::new()
            }
        };

        if body.chars().count() < PRIMARY_FLOOR_CHARS {
            match self.fetch(url).await {
                Ok(html) => {
                    let scraped = paragraph_body(&html);
                    if scraped.chars().count() > body.chars().count() {
                        debug!(
                            primary_chars = body.chars().count(),
                            scraped_chars = scraped.chars().count(),
                            "paragraph scrape replaced primary body"
                        );
                        body = scraped;
                    }
                }
                Err(e) => debug!(%url, error = %e, "secondary fetch failed; keeping primary body"),
            }
        }

        let cleaned = strip_garbage_lines(&body);
        if cleaned.chars().count() < FINAL_FLOOR_CHARS {
            None
        } else {
            Some(cleaned)
        }
    }

    async fn fetch(&self, url: &str) -> Result<String, reqwest::Error> {
        self.http
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await
    }
}

/// Readability-style pass: paragraphs of the first article-shaped container.
fn primary_body(html: &str) -> String {
    let document = Html::parse_document(html);

    for selector in CONTAINER_SELECTORS.iter() {
        if let Some(container) = document.select(selector).next() {
            let paragraphs: Vec<String> = container
                .select(&PARAGRAPH)
                .map(|p| p.text().collect::<String>().trim().to_string())
                .filter(|text| !text.is_empty())
                .collect();

            let body = if paragraphs.is_empty() {
                container.text().collect::<String>().trim().to_string()
            } else {
                paragraphs.join("\n\n")
            };

            if !body.is_empty() {
                return body;
            }
        }
    }

    String::new()
}

/// Brute-force pass: every substantial paragraph on the page.
fn paragraph_body(html: &str) -> String {
    let document = Html::parse_document(html);

    document
        .select(&PARAGRAPH)
        .map(|p| p.text().collect::<String>().trim().to_string())
        .filter(|text| text.chars().count() > PARAGRAPH_FLOOR_CHARS)
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Drop every line that carries a boilerplate phrase.
fn strip_garbage_lines(body: &str) -> String {
    body.lines()
        .filter(|line| !GARBAGE_PHRASES.iter().any(|phrase| line.contains(phrase)))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    #[test]
    fn test_primary_body_prefers_article_container() {
        let html = r#"
            <html><body>
            <nav><p>Home | World | Sports with enough length to look like text</p></nav>
            <article>
                <p>First paragraph of the story, long enough to matter here.</p>
                <p>Second paragraph of the story body.</p>
            </article>
            </body></html>
        "#;
        let body = primary_body(html);
        assert!(body.starts_with("First paragraph"));
        assert!(body.contains("\n\nSecond paragraph"));
        assert!(!body.contains("Home | World"));
    }

    #[test]
    fn test_primary_body_without_container_is_empty() {
        let html = "<html><body><div><p>Loose text outside any known container.</p></div></body></html>";
        assert_eq!(primary_body(html), "");
    }

    #[test]
    fn test_paragraph_body_drops_short_paragraphs() {
        let long_a = "a".repeat(40);
        let long_b = "b".repeat(40);
        let html = format!(
            "<html><body><p>menu</p><p>{long_a}</p><p>short one</p><p>{long_b}</p></body></html>"
        );
        let body = paragraph_body(&html);
        assert_eq!(body, format!("{long_a}\n\n{long_b}"));
    }

    #[test]
    fn test_strip_garbage_lines() {
        let body = "Real reporting line.\nWe value your privacy and our cookie policy applies.\nMore reporting.";
        let cleaned = strip_garbage_lines(body);
        assert_eq!(cleaned, "Real reporting line.\nMore reporting.");
        assert!(!cleaned.contains("cookie policy"));
    }

    #[tokio::test]
    async fn test_longer_secondary_candidate_wins() {
        // Primary container holds 150 chars; loose paragraphs add up to 400.
        let primary_text = "p".repeat(150);
        let loose_a = "x".repeat(200);
        let loose_b = "y".repeat(200);
        let html = format!(
            "<html><body><article><p>{primary_text}</p></article>\
             <div><p>{loose_a}</p><p>{loose_b}</p></div></body></html>"
        );

        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/story");
            then.status(200).body(&html);
        });

        let extractor = Extractor::new().unwrap();
        let body = extractor
            .extract(&format!("{}/story", server.url("")))
            .await
            .expect("extraction should succeed");

        assert!(body.contains(&loose_a));
        assert!(body.contains(&loose_b));
        // Candidates are replaced wholesale, never merged, but the scrape
        // picks up every substantial paragraph, including the primary one.
        assert_eq!(body.chars().count(), 150 + 200 + 200 + 4);
    }

    #[tokio::test]
    async fn test_adequate_primary_body_skips_scrape() {
        let primary_text = "p".repeat(300);
        let html = format!(
            "<html><body><article><p>{primary_text}</p></article>\
             <div><p>{}</p></div></body></html>",
            "x".repeat(500)
        );

        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET).path("/story");
            then.status(200).body(&html);
        });

        let extractor = Extractor::new().unwrap();
        let body = extractor
            .extract(&format!("{}/story", server.url("")))
            .await
            .unwrap();

        assert_eq!(body, primary_text);
        mock.assert_hits(1);
    }

    #[tokio::test]
    async fn test_too_short_after_cleanup_is_failure() {
        let html = "<html><body><article><p>Barely anything here at all, sadly.</p></article></body></html>";
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/story");
            then.status(200).body(html);
        });

        let extractor = Extractor::new().unwrap();
        // Under the 50-char floor: the caller must fall back to the summary.
        assert!(
            extractor
                .extract(&format!("{}/story", server.url("")))
                .await
                .is_none()
        );
    }

    #[tokio::test]
    async fn test_server_error_is_extraction_failure_not_panic() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/story");
            then.status(503);
        });

        let extractor = Extractor::new().unwrap();
        assert!(
            extractor
                .extract(&format!("{}/story", server.url("")))
                .await
                .is_none()
        );
    }
}
