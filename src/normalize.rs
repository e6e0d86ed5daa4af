//! Text and date normalization, and the content fingerprint.
//!
//! Everything here is deterministic and total: the text normalizer never
//! fails, and the temporal normalizer reports unparseable input as
//! [`NormalizedDate::Unknown`] instead of raising or inventing a value.
//! Substituting a fabricated time is the caller's decision, made through a
//! named [`DatePolicy`].

use chrono::{DateTime, FixedOffset, Local};
use clap::ValueEnum;
use once_cell::sync::Lazy;
use regex::Regex;
use sha2::{Digest, Sha256};
use tracing::warn;
use unicode_normalization::UnicodeNormalization;

static WHITESPACE_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Canonicalize a title or content string for hashing.
///
/// Applies Unicode NFKC normalization, trims leading/trailing whitespace,
/// and collapses every whitespace run to a single space. Empty input maps
/// to the empty string.
pub fn normalize_text(text: &str) -> String {
    let composed: String = text.nfkc().collect();
    WHITESPACE_RUN.replace_all(composed.trim(), " ").into_owned()
}

/// Compute the dedup fingerprint for an article.
///
/// `SHA-256(normalize(title) + "\n" + normalize(content))`, lowercase hex,
/// always 64 characters. This is the article's sole identity for
/// deduplication and is never shown to readers.
pub fn content_hash(title: &str, content: &str) -> String {
    let payload = format!("{}\n{}", normalize_text(title), normalize_text(content));
    hex::encode(Sha256::digest(payload.as_bytes()))
}

/// Outcome of temporal normalization.
///
/// `Unknown` means the feed gave us nothing we could parse. It is a real
/// state, not an error: the original publish time is simply lost.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NormalizedDate {
    Known(DateTime<FixedOffset>),
    Unknown,
}

/// Convert a raw feed date string into a timestamp with an explicit offset.
///
/// Branch order:
/// 1. RFC 3339 / ISO-8601 (a trailing `Z` becomes `+00:00`)
/// 2. RFC 2822 (the RSS `pubDate` shape), offset preserved
/// 3. A "local" `YYYY-MM-DD HH:MM:SS` shape: the space becomes `T` and the
///    process-local offset is appended when none is present
/// 4. Everything else, including empty input, is [`NormalizedDate::Unknown`]
pub fn normalize_date(raw: &str) -> NormalizedDate {
    let raw = raw.trim();
    if raw.is_empty() {
        return NormalizedDate::Unknown;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return NormalizedDate::Known(dt);
    }

    if let Ok(dt) = DateTime::parse_from_rfc2822(raw) {
        return NormalizedDate::Known(dt);
    }

    if raw.contains(' ') && !raw.contains('T') {
        let candidate = raw.replacen(' ', "T", 1);
        if let Ok(dt) = DateTime::parse_from_rfc3339(&candidate) {
            return NormalizedDate::Known(dt);
        }
        let with_offset = format!("{}{}", candidate, Local::now().offset());
        if let Ok(dt) = DateTime::parse_from_rfc3339(&with_offset) {
            return NormalizedDate::Known(dt);
        }
    }

    NormalizedDate::Unknown
}

/// What to substitute when an article's publish time is unknown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DatePolicy {
    /// Substitute the current wall-clock time with the local offset.
    Now,
    /// Substitute the moment the article was fetched.
    FetchTime,
}

impl DatePolicy {
    /// Resolve a normalization outcome into a concrete timestamp.
    ///
    /// The substitution branch is logged so fabricated publish times remain
    /// visible in the run output.
    pub fn resolve(
        self,
        date: NormalizedDate,
        fetched_at: DateTime<FixedOffset>,
    ) -> DateTime<FixedOffset> {
        match date {
            NormalizedDate::Known(dt) => dt,
            NormalizedDate::Unknown => {
                let substitute = match self {
                    DatePolicy::Now => Local::now().fixed_offset(),
                    DatePolicy::FetchTime => fetched_at,
                };
                warn!(policy = ?self, %substitute, "publish time unknown; substituting");
                substitute
            }
        }
    }
}
