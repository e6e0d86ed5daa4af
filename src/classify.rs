//! Category classification through the oracle.
//!
//! The oracle is asked for exactly one of four category names; whatever
//! comes back is matched defensively. Classification never fails: oracle
//! errors and unrecognizable answers both degrade to [`Category::Others`],
//! each through its own logged branch.

use std::time::Duration;

use tracing::{debug, warn};

use crate::models::Category;
use crate::oracle::{Oracle, RetryOracle};
use crate::utils::truncate_for_log;

/// One retry after a flat one-second delay, then give up.
const MAX_RETRIES: usize = 1;
const RETRY_DELAY: Duration = Duration::from_secs(1);

/// Only this much content goes to the oracle. Bounds the request size; the
/// stored article keeps its full content.
const CONTENT_PREVIEW_CHARS: usize = 500;

/// Build the fixed classification prompt for an article.
pub fn build_prompt(title: &str, content: &str) -> String {
    let preview: String = content.chars().take(CONTENT_PREVIEW_CHARS).collect();
    format!(
        "Analyze the following news article and classify it into exactly one of these 4 categories:\n\
         [Politics, Economy, Tech, Others]\n\
         \n\
         - Output ONLY the category name. Do not add any explanation.\n\
         - If it's about government, laws, diplomacy -> Politics\n\
         - If it's about markets, stock, inflation, companies -> Economy\n\
         - If it's about AI, software, gadgets, science -> Tech\n\
         - Everything else -> Others\n\
         \n\
         Article:\n\
         Title: {title}\n\
         Content: {preview}"
    )
}

/// Match an oracle answer against the closed category set.
///
/// Strips quoting characters, lowercases, and substring-matches the four
/// category tokens in priority order; first hit wins. `None` means nothing
/// matched, and the caller owns the default.
pub fn parse_category(response: &str) -> Option<Category> {
    let cleaned = response.replace(['\'', '"', '`'], "").to_lowercase();
    Category::ALL
        .into_iter()
        .find(|category| cleaned.contains(category.as_str()))
}

/// Classify an article, degrading to [`Category::Others`] on any failure.
pub async fn classify<O: Oracle>(oracle: &O, title: &str, content: &str) -> Category {
    let prompt = build_prompt(title, content);
    let retry = RetryOracle::new(oracle, MAX_RETRIES, RETRY_DELAY);

    match retry.ask(&prompt).await {
        Ok(response) => match parse_category(&response) {
            Some(category) => {
                debug!(category = category.as_str(), "classified article");
                category
            }
            None => {
                warn!(
                    response_preview = %truncate_for_log(&response, 120),
                    "oracle answer matched no category; defaulting to others"
                );
                Category::Others
            }
        },
        Err(e) => {
            warn!(error = %e, "classification failed after retry; defaulting to others");
            Category::Others
        }
    }
}
