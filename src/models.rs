//! Data models for harvested articles and the translation work queue.
//!
//! This module defines the core data structures used throughout the pipeline:
//! - [`RawArticle`]: a transient feed entry before extraction and assembly
//! - [`Article`]: the canonical, deduplicatable record sent to the store
//! - [`TranslationTask`] / [`TranslationResult`]: the pull/push work-queue pair
//!
//! Serialized field names use camelCase to match the wire contract of the
//! remote store, so the structs carry `#[serde(rename_all = "camelCase")]`.

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

/// How an article entered the pipeline. Feeds are the only source today.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SourceType {
    Rss,
}

/// The closed category set every article is classified into.
///
/// The oracle is asked to answer with one of these names; anything it says
/// that cannot be matched degrades to [`Category::Others`]. Serialized
/// lowercase (`politics`, `economy`, `tech`, `others`) per the store schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Politics,
    Economy,
    Tech,
    Others,
}

impl Category {
    /// Match priority order: first hit wins when scanning oracle output.
    pub const ALL: [Category; 4] = [
        Category::Politics,
        Category::Economy,
        Category::Tech,
        Category::Others,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Politics => "politics",
            Category::Economy => "economy",
            Category::Tech => "tech",
            Category::Others => "others",
        }
    }
}

/// A feed entry as parsed from an RSS item, before extraction and assembly.
///
/// Discarded once the corresponding [`Article`] is built (or the entry is
/// filtered/dropped). `summary` is kept around as the fallback body when
/// full-text extraction fails.
#[derive(Debug, Clone)]
pub struct RawArticle {
    pub title: String,
    pub link: String,
    /// The feed's publication date string, in whatever shape the feed used.
    pub raw_published: String,
    /// The feed's own summary/description, HTML and all.
    pub summary: String,
    pub author: Option<String>,
    /// Feed category terms, used by the foreign-content filter.
    pub tags: Vec<String>,
}

/// The canonical article record pushed to the remote store.
///
/// `content_hash` is the sole dedup identity: SHA-256 over the normalized
/// title and content, lowercase hex, always 64 characters. `external_id` is
/// a human-traceable identifier (`{source}-{unixTimestamp}-{sequence}`) and
/// deliberately not unique in the cryptographic sense.
///
/// Immutable once assembled; identity persists across runs via the hash.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Article {
    pub source_type: SourceType,
    pub source_name: String,
    pub content_hash: String,
    pub external_id: String,
    pub category_code: Category,
    pub url: String,
    pub title: String,
    pub content: String,
    pub author: String,
    pub published_at: DateTime<FixedOffset>,
    pub fetched_at: DateTime<FixedOffset>,
}

/// The shape of both the store's bulk-ingest body and the local snapshot.
#[derive(Debug, Deserialize, Serialize)]
pub struct ArticleBatch {
    pub articles: Vec<Article>,
}

/// A pending translation task as returned by the store's pull endpoint.
///
/// Owned by the store; the work-queue client only reads it. Fields beyond
/// these are ignored on deserialization.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslationTask {
    pub article_id: String,
    #[serde(default)]
    pub language_target: Option<String>,
    pub title: String,
    pub content: String,
}

/// A completed translation, pushed to the store's results endpoint.
///
/// Built only after a successful oracle call; a failed task never produces
/// a partial or empty result.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslationResult {
    pub article_id: String,
    pub language_target: String,
    pub translated_title: String,
    pub translated_content: String,
    pub summary_text: String,
    pub model_name: String,
}
