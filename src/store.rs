//! HTTP client for the remote article store.
//!
//! Three endpoints, three methods: bulk ingest of harvested articles,
//! pulling pending translation tasks, and pushing finished translations.
//! The store owns deduplication: the client sends every assembled article
//! and relies on the store comparing content hashes against what it already
//! holds.

use serde::Deserialize;
use thiserror::Error;
use tracing::{info, instrument};

use crate::models::{Article, ArticleBatch, TranslationResult, TranslationTask};

const REQUEST_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(30);

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store request to {endpoint} failed: {detail}")]
    Transport {
        endpoint: &'static str,
        detail: String,
    },
    #[error("store returned status {status} from {endpoint}")]
    Status { endpoint: &'static str, status: u16 },
    #[error("store response from {endpoint} was not the expected shape: {detail}")]
    Malformed {
        endpoint: &'static str,
        detail: String,
    },
}

pub struct StoreClient {
    http: reqwest::Client,
    base_url: String,
}

#[derive(Deserialize)]
struct PullResponse {
    items: Vec<TranslationTask>,
}

impl StoreClient {
    pub fn new(base_url: &str) -> Result<Self, reqwest::Error> {
        Ok(Self {
            http: reqwest::Client::builder().timeout(REQUEST_TIMEOUT).build()?,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Push one run's worth of articles in a single bulk request.
    ///
    /// No client-side dedup happens here; partial acceptance is the store's
    /// concern and is surfaced only through the call's status.
    #[instrument(level = "info", skip_all, fields(count = articles.len()))]
    pub async fn ingest(&self, articles: Vec<Article>) -> Result<(), StoreError> {
        const ENDPOINT: &str = "/ingest";

        let batch = ArticleBatch { articles };
        let response = self
            .http
            .post(format!("{}{}", self.base_url, ENDPOINT))
            .json(&batch)
            .send()
            .await
            .map_err(|e| StoreError::Transport {
                endpoint: ENDPOINT,
                detail: e.to_string(),
            })?;

        if !response.status().is_success() {
            return Err(StoreError::Status {
                endpoint: ENDPOINT,
                status: response.status().as_u16(),
            });
        }

        info!(count = batch.articles.len(), "ingested article batch");
        Ok(())
    }

    /// Fetch up to `limit` pending translation tasks for a target language.
    ///
    /// An empty item list is a normal outcome, not an error.
    #[instrument(level = "info", skip(self))]
    pub async fn pull(
        &self,
        language_target: &str,
        limit: u32,
    ) -> Result<Vec<TranslationTask>, StoreError> {
        const ENDPOINT: &str = "/pull";

        let response = self
            .http
            .get(format!("{}{}", self.base_url, ENDPOINT))
            .query(&[
                ("languageTarget", language_target.to_string()),
                ("limit", limit.to_string()),
            ])
            .send()
            .await
            .map_err(|e| StoreError::Transport {
                endpoint: ENDPOINT,
                detail: e.to_string(),
            })?;

        if !response.status().is_success() {
            return Err(StoreError::Status {
                endpoint: ENDPOINT,
                status: response.status().as_u16(),
            });
        }

        let parsed: PullResponse = response.json().await.map_err(|e| StoreError::Malformed {
            endpoint: ENDPOINT,
            detail: e.to_string(),
        })?;

        info!(count = parsed.items.len(), "pulled pending translation tasks");
        Ok(parsed.items)
    }

    /// Push one finished translation to the results endpoint.
    pub async fn push_result(&self, result: &TranslationResult) -> Result<(), StoreError> {
        const ENDPOINT: &str = "/results";

        let response = self
            .http
            .post(format!("{}{}", self.base_url, ENDPOINT))
            .json(result)
            .send()
            .await
            .map_err(|e| StoreError::Transport {
                endpoint: ENDPOINT,
                detail: e.to_string(),
            })?;

        if !response.status().is_success() {
            return Err(StoreError::Status {
                endpoint: ENDPOINT,
                status: response.status().as_u16(),
            });
        }

        Ok(())
    }
}
