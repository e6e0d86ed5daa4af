//! The harvest pipeline.
//!
//! One pass over the configured sources, strictly sequential: fetch the
//! feed, filter out-of-region entries, extract full text (falling back to
//! the feed summary), classify, assemble, then deliver the whole batch in
//! one bulk ingest and/or a local snapshot.
//!
//! A source that cannot be fetched or parsed aborts only itself; the run
//! carries on with the remaining sources. Re-running is safe: the store
//! dedups on content hash, so an article harvested twice lands once.

use std::error::Error;
use std::time::Duration;

use chrono::Local;
use rss::Channel;
use tokio::time::sleep;
use tracing::{debug, error, info, instrument, warn};
use url::Url;

use crate::assemble::Assembler;
use crate::classify;
use crate::config::{self, ArticleSource};
use crate::extract::Extractor;
use crate::filter::ForeignFilter;
use crate::models::{Article, ArticleBatch, RawArticle};
use crate::normalize::{DatePolicy, NormalizedDate, normalize_date};
use crate::oracle::Oracle;
use crate::snapshot;
use crate::store::StoreClient;
use crate::utils::strip_html_tags;

/// Marks a body that is the feed's own summary rather than extracted text.
const SUMMARY_MARKER: &str = "[summary] ";
/// Entries whose best-available body is shorter than this are dropped.
const MIN_CONTENT_CHARS: usize = 50;

const FEED_TIMEOUT: Duration = Duration::from_secs(30);

/// Flat pause between articles. Keeps feed hosts and the oracle happy;
/// deliberately not adaptive.
pub const ARTICLE_DELAY: Duration = Duration::from_millis(500);

pub struct HarvestOptions {
    pub sources_path: String,
    pub store_url: Option<String>,
    pub snapshot_path: Option<String>,
    /// Skip entries published more than this many days ago. 0 disables.
    pub days_limit: u32,
    pub date_policy: DatePolicy,
    pub article_delay: Duration,
}

/// Run one harvest pass. Returns the number of articles delivered.
pub async fn run<O: Oracle>(oracle: &O, opts: &HarvestOptions) -> Result<usize, Box<dyn Error>> {
    if opts.store_url.is_none() && opts.snapshot_path.is_none() {
        return Err("harvest needs a store URL or a snapshot path to deliver to".into());
    }

    let sources = config::load_sources(&opts.sources_path)?;
    info!(count = sources.len(), "loaded feed sources");

    let feed_client = reqwest::Client::builder().timeout(FEED_TIMEOUT).build()?;
    let extractor = Extractor::new()?;
    let filter = ForeignFilter::default();
    let mut assembler = Assembler::new(opts.date_policy);

    let mut articles: Vec<Article> = Vec::new();
    for source in &sources {
        info!(source = %source.name, feed = %source.feed_url, "harvesting source");
        match harvest_source(oracle, &feed_client, &extractor, &filter, &mut assembler, source, opts)
            .await
        {
            Ok(harvested) => {
                info!(source = %source.name, count = harvested.len(), "source harvested");
                articles.extend(harvested);
            }
            Err(e) => {
                error!(source = %source.name, error = %e, "source failed; continuing with the rest");
            }
        }
    }

    let total = articles.len();
    info!(total, "harvest complete");

    let batch = ArticleBatch { articles };
    if let Some(path) = &opts.snapshot_path {
        snapshot::write_json(&batch, path).await?;
    }
    if let Some(url) = &opts.store_url {
        StoreClient::new(url)?.ingest(batch.articles).await?;
    }

    Ok(total)
}

/// Harvest every usable entry of a single feed, in feed-iteration order.
#[instrument(level = "info", skip_all, fields(source = %source.name))]
async fn harvest_source<O: Oracle>(
    oracle: &O,
    feed_client: &reqwest::Client,
    extractor: &Extractor,
    filter: &ForeignFilter,
    assembler: &mut Assembler,
    source: &ArticleSource,
    opts: &HarvestOptions,
) -> Result<Vec<Article>, Box<dyn Error>> {
    let bytes = feed_client
        .get(&source.feed_url)
        .send()
        .await?
        .error_for_status()?
        .bytes()
        .await?;
    let channel = Channel::read_from(&bytes[..])?;
    let feed_base = Url::parse(&source.feed_url)?;

    let cutoff = (opts.days_limit > 0)
        .then(|| Local::now().fixed_offset() - chrono::Duration::days(opts.days_limit as i64));

    let mut articles = Vec::new();
    for item in channel.items() {
        let Some(link) = item.link() else {
            continue;
        };
        // Some feeds carry item links relative to the feed URL.
        let Ok(link) = feed_base.join(link) else {
            debug!(%link, "skipping entry with unparseable link");
            continue;
        };
        let raw = RawArticle {
            title: item.title().unwrap_or_default().trim().to_string(),
            link: link.to_string(),
            raw_published: item.pub_date().unwrap_or_default().to_string(),
            summary: item.description().unwrap_or_default().to_string(),
            author: item.author().map(str::to_string),
            tags: item.categories().iter().map(|c| c.name().to_string()).collect(),
        };

        if filter.is_foreign(&raw.link, &raw.title, &raw.tags) {
            debug!(link = %raw.link, "skipping out-of-region entry");
            continue;
        }

        if let Some(cutoff) = cutoff {
            if let NormalizedDate::Known(published) = normalize_date(&raw.raw_published) {
                if published < cutoff {
                    debug!(link = %raw.link, "skipping entry older than the recency cutoff");
                    continue;
                }
            }
        }

        let content = match extractor.extract(&raw.link).await {
            Some(body) => body,
            None => {
                debug!(link = %raw.link, "extraction failed; falling back to feed summary");
                format!("{SUMMARY_MARKER}{}", strip_html_tags(&raw.summary))
            }
        };

        if content.chars().count() < MIN_CONTENT_CHARS {
            warn!(link = %raw.link, "skipping entry with no usable content");
            continue;
        }

        let category = classify::classify(oracle, &raw.title, &content).await;
        if let Some(article) = assembler.assemble(&source.name, &raw, content, category) {
            articles.push(article);
        }

        sleep(opts.article_delay).await;
    }

    Ok(articles)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Category;
    use crate::oracle::testing::ScriptedOracle;
    use httpmock::prelude::*;

    fn feed_xml(base: &str) -> String {
        format!(
            r#"<rss version="2.0"><channel>
                <title>Example Press</title>
                <link>{base}</link>
                <description>test feed</description>
                <item>
                    <title>Cabinet approves budget</title>
                    <link>{base}/politics/budget</link>
                    <description>short</description>
                    <pubDate>Fri, 19 Dec 2025 16:50:00 +0900</pubDate>
                </item>
                <item>
                    <title>Leaders meet abroad</title>
                    <link>{base}/world/summit</link>
                    <description>filtered before any fetch</description>
                </item>
                <item>
                    <title>Chip plant breaks ground</title>
                    <link>{base}/tech/chip-plant</link>
                    <description>&lt;p&gt;A very long feed summary about the new chip plant, easily past the fifty character floor.&lt;/p&gt;</description>
                </item>
            </channel></rss>"#
        )
    }

    fn write_sources(test_name: &str, base: &str) -> String {
        let path = std::env::temp_dir()
            .join(format!("newsflow-harvest-{}-{test_name}-sources.yaml", std::process::id()))
            .to_string_lossy()
            .into_owned();
        std::fs::write(
            &path,
            format!("sources:\n  - name: Example Press\n    feed_url: {base}/rss.xml\n"),
        )
        .unwrap();
        path
    }

    #[tokio::test]
    async fn test_harvest_filters_extracts_and_ingests() {
        let server = MockServer::start();
        let base = server.url("");

        server.mock(|when, then| {
            when.method(GET).path("/rss.xml");
            then.status(200).body(feed_xml(&base));
        });
        // Full text available for the first story only.
        let story_body = "b".repeat(300);
        server.mock(|when, then| {
            when.method(GET).path("/politics/budget");
            then.status(200)
                .body(format!("<html><body><article><p>{story_body}</p></article></body></html>"));
        });
        server.mock(|when, then| {
            when.method(GET).path("/tech/chip-plant");
            then.status(404);
        });
        let ingest = server.mock(|when, then| {
            when.method(POST).path("/ingest");
            then.status(200);
        });

        // One classification per surviving entry; the foreign one never
        // reaches the oracle.
        let oracle = ScriptedOracle::new(vec![Ok("Politics".to_string()), Ok("Tech".to_string())]);

        let snapshot_path = std::env::temp_dir()
            .join(format!("newsflow-harvest-{}-batch.json", std::process::id()))
            .to_string_lossy()
            .into_owned();
        let opts = HarvestOptions {
            sources_path: write_sources("full-run", &base),
            store_url: Some(base.clone()),
            snapshot_path: Some(snapshot_path.clone()),
            days_limit: 0,
            date_policy: DatePolicy::FetchTime,
            article_delay: Duration::ZERO,
        };

        let delivered = run(&oracle, &opts).await.unwrap();
        assert_eq!(delivered, 2);
        assert_eq!(oracle.calls(), 2);
        ingest.assert_hits(1);

        let written = std::fs::read_to_string(&snapshot_path).unwrap();
        let batch: ArticleBatch = serde_json::from_str(&written).unwrap();
        assert_eq!(batch.articles.len(), 2);

        let budget = &batch.articles[0];
        assert_eq!(budget.category_code, Category::Politics);
        assert_eq!(budget.content, story_body);
        assert_eq!(budget.published_at.to_rfc3339(), "2025-12-19T16:50:00+09:00");

        // Extraction failed for the chip story: summary fallback, marked,
        // HTML stripped.
        let chip = &batch.articles[1];
        assert!(chip.content.starts_with(SUMMARY_MARKER));
        assert!(chip.content.contains("new chip plant"));
        assert!(!chip.content.contains("<p>"));
        assert_eq!(chip.category_code, Category::Tech);

        std::fs::remove_file(&snapshot_path).ok();
        std::fs::remove_file(&opts.sources_path).ok();
    }

    #[tokio::test]
    async fn test_unreachable_feed_does_not_abort_run() {
        let server = MockServer::start();
        let base = server.url("");
        server.mock(|when, then| {
            when.method(GET).path("/rss.xml");
            then.status(500);
        });

        let oracle = ScriptedOracle::new(vec![]);
        let snapshot_path = std::env::temp_dir()
            .join(format!("newsflow-harvest-{}-empty.json", std::process::id()))
            .to_string_lossy()
            .into_owned();
        let opts = HarvestOptions {
            sources_path: write_sources("bad-feed", &base),
            store_url: None,
            snapshot_path: Some(snapshot_path.clone()),
            days_limit: 0,
            date_policy: DatePolicy::FetchTime,
            article_delay: Duration::ZERO,
        };

        // The lone source fails; the run still completes with zero articles.
        let delivered = run(&oracle, &opts).await.unwrap();
        assert_eq!(delivered, 0);
        assert_eq!(oracle.calls(), 0);

        std::fs::remove_file(&snapshot_path).ok();
        std::fs::remove_file(&opts.sources_path).ok();
    }

    #[tokio::test]
    async fn test_run_without_delivery_target_is_an_error() {
        let oracle = ScriptedOracle::new(vec![]);
        let opts = HarvestOptions {
            sources_path: "unused.yaml".to_string(),
            store_url: None,
            snapshot_path: None,
            days_limit: 0,
            date_policy: DatePolicy::Now,
            article_delay: Duration::ZERO,
        };
        assert!(run(&oracle, &opts).await.is_err());
    }
}
