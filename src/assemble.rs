//! Article assembly: the last, pure step of the harvest pipeline.
//!
//! Composes normalizer and classifier outputs into the canonical
//! [`Article`]. No I/O happens here; everything the assembler needs has
//! already been fetched, extracted, and classified.

use chrono::{Local, Utc};
use tracing::warn;

use crate::models::{Article, Category, RawArticle, SourceType};
use crate::normalize::{DatePolicy, content_hash, normalize_date, normalize_text};

pub struct Assembler {
    policy: DatePolicy,
    /// Per-run sequence number folded into `external_id`.
    sequence: usize,
}

impl Assembler {
    pub fn new(policy: DatePolicy) -> Self {
        Self {
            policy,
            sequence: 0,
        }
    }

    /// Build the canonical record for one extracted article.
    ///
    /// Returns `None` when both title and content normalize to empty:
    /// there is nothing to hash or display, so the entry is dropped rather
    /// than emitted with empty fields.
    pub fn assemble(
        &mut self,
        source_name: &str,
        raw: &RawArticle,
        content: String,
        category: Category,
    ) -> Option<Article> {
        if normalize_text(&raw.title).is_empty() && normalize_text(&content).is_empty() {
            warn!(link = %raw.link, "dropping entry with no title and no content");
            return None;
        }

        let fetched_at = Local::now().fixed_offset();
        let published_at = self.policy.resolve(normalize_date(&raw.raw_published), fetched_at);

        // Human-traceable, not cryptographically unique; dedup identity is
        // the content hash.
        let external_id = format!("{}-{}-{}", source_name, Utc::now().timestamp(), self.sequence);
        self.sequence += 1;

        Some(Article {
            source_type: SourceType::Rss,
            source_name: source_name.to_string(),
            content_hash: content_hash(&raw.title, &content),
            external_id,
            category_code: category,
            url: raw.link.clone(),
            title: raw.title.clone(),
            author: raw.author.clone().unwrap_or_else(|| source_name.to_string()),
            content,
            published_at,
            fetched_at,
        })
    }
}
