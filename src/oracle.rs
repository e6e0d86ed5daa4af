//! The text-generation oracle: capability trait, HTTP client, retry decorator.
//!
//! The oracle (translation/classification model) is an external collaborator
//! reached over an OpenAI-compatible chat-completions endpoint. Components
//! never talk to a global client; they receive an [`Oracle`] implementation,
//! which keeps a scripted test double one constructor away.
//!
//! # Error taxonomy
//!
//! [`OracleError`] separates retryable transport failures (timeouts, refused
//! connections, 5xx) from non-retryable malformed payloads (a response body
//! that is not the shape we asked for). Callers decide per call site whether
//! to retry, degrade, or skip; there is no catch-all.

use std::time::{Duration, Instant};

use serde::Deserialize;
use thiserror::Error;
use tokio::time::sleep;
use tracing::{instrument, warn};

#[derive(Debug, Error)]
pub enum OracleError {
    /// The request never produced a usable response: network failure,
    /// timeout, or a non-success status from the endpoint.
    #[error("oracle transport failure: {0}")]
    Transport(String),
    /// The endpoint answered, but not with what we asked for.
    #[error("oracle returned a malformed payload: {0}")]
    Malformed(String),
}

impl OracleError {
    pub fn is_retryable(&self) -> bool {
        matches!(self, OracleError::Transport(_))
    }
}

/// Capability interface for the text-generation oracle.
///
/// One method, one exchange: send a prompt, get the model's text back.
/// Prompt construction and response parsing belong to the callers.
pub trait Oracle {
    async fn ask(&self, prompt: &str) -> Result<String, OracleError>;

    /// The model identifier reported in translation results.
    fn model_name(&self) -> &str;
}

impl<T: Oracle> Oracle for &T {
    async fn ask(&self, prompt: &str) -> Result<String, OracleError> {
        (**self).ask(prompt).await
    }

    fn model_name(&self) -> &str {
        (**self).model_name()
    }
}

/// Oracle backed by an OpenAI-compatible chat-completions endpoint.
pub struct ChatClient {
    http: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    model: String,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Deserialize)]
struct ChatMessage {
    content: String,
}

impl ChatClient {
    pub fn new(
        base_url: &str,
        api_key: Option<String>,
        model: &str,
    ) -> Result<Self, reqwest::Error> {
        Ok(Self {
            http: reqwest::Client::builder().build()?,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            model: model.to_string(),
        })
    }
}

impl Oracle for ChatClient {
    #[instrument(level = "info", skip_all)]
    async fn ask(&self, prompt: &str) -> Result<String, OracleError> {
        let t0 = Instant::now();

        let body = serde_json::json!({
            "model": self.model,
            "messages": [{ "role": "user", "content": prompt }],
        });

        let mut request = self
            .http
            .post(format!("{}/chat/completions", self.base_url))
            .json(&body);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| {
                warn!(elapsed_ms = t0.elapsed().as_millis() as u128, error = %e, "oracle call failed");
                OracleError::Transport(e.to_string())
            })?;

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| OracleError::Malformed(e.to_string()))?;

        parsed
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| OracleError::Malformed("response carried no choices".to_string()))
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

/// Decorator that retries a failed ask a bounded number of times.
///
/// The delay between attempts is flat. Rate limiting in this pipeline is a
/// fixed sleep, never an adaptive backoff.
pub struct RetryOracle<T> {
    inner: T,
    max_retries: usize,
    delay: Duration,
}

impl<T: Oracle> RetryOracle<T> {
    pub fn new(inner: T, max_retries: usize, delay: Duration) -> Self {
        Self {
            inner,
            max_retries,
            delay,
        }
    }
}

impl<T: Oracle> Oracle for RetryOracle<T> {
    async fn ask(&self, prompt: &str) -> Result<String, OracleError> {
        let mut attempt = 0usize;
        loop {
            match self.inner.ask(prompt).await {
                Ok(response) => return Ok(response),
                Err(e) => {
                    attempt += 1;
                    if attempt > self.max_retries {
                        return Err(e);
                    }
                    warn!(
                        attempt,
                        max = self.max_retries,
                        retryable = e.is_retryable(),
                        error = %e,
                        "oracle ask failed; retrying after fixed delay"
                    );
                    sleep(self.delay).await;
                }
            }
        }
    }

    fn model_name(&self) -> &str {
        self.inner.model_name()
    }
}
