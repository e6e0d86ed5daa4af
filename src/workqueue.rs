//! The translation work-queue client.
//!
//! Pulls a bounded batch of pending tasks, drives the oracle through each
//! one sequentially, and pushes every finished translation straight back.
//! The batch is at-least-once and best-effort: a task whose oracle call or
//! JSON parse fails is skipped without retry and stays pending server-side,
//! so a future pull will offer it again. Nothing is lost, some work may be
//! attempted twice.
//!
//! A run terminates when every pulled task has been attempted exactly once.

use std::error::Error;
use std::time::Duration;

use serde::Deserialize;
use tokio::time::sleep;
use tracing::{info, instrument, warn};

use crate::models::{TranslationResult, TranslationTask};
use crate::oracle::{Oracle, OracleError};
use crate::snapshot;
use crate::store::StoreClient;
use crate::utils::{looks_truncated, strip_code_fence, truncate_for_log};

/// Flat pause between tasks, for the oracle's rate limits. Not adaptive,
/// no backoff on failure.
pub const TASK_DELAY: Duration = Duration::from_secs(1);

pub struct TranslateOptions {
    pub store_url: String,
    pub language_target: String,
    pub limit: u32,
    pub snapshot_path: Option<String>,
    pub task_delay: Duration,
}

/// Counts for one run, logged at the end.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub pulled: usize,
    pub translated: usize,
    pub pushed: usize,
    pub skipped: usize,
}

/// The exact shape the oracle must answer with.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct OracleTranslation {
    translated_title: String,
    translated_content: String,
    summary_text: String,
}

/// Build the fixed translate-and-summarize prompt for one task.
pub fn build_prompt(language_target: &str, title: &str, content: &str) -> String {
    format!(
        "You are a professional translator and news editor.\n\
         \n\
         [Original title]\n\
         {title}\n\
         \n\
         [Original content]\n\
         {content}\n\
         \n\
         [Instructions]\n\
         1. Translate the title naturally into the target language ({language_target}). (translatedTitle)\n\
         2. Translate the entire content into the target language, leaving nothing out. (translatedContent)\n\
         3. Summarize the content in the target language in three lines or fewer. (summaryText)\n\
         \n\
         [Output format]\n\
         Respond with ONLY this JSON object, no markdown:\n\
         {{\"translatedTitle\": \"...\", \"translatedContent\": \"...\", \"summaryText\": \"...\"}}"
    )
}

/// Drive the oracle through one task and shape the result.
async fn translate_task<O: Oracle>(
    oracle: &O,
    language_target: &str,
    task: &TranslationTask,
) -> Result<TranslationResult, OracleError> {
    let response = oracle
        .ask(&build_prompt(language_target, &task.title, &task.content))
        .await?;

    let cleaned = strip_code_fence(&response);
    let parsed: OracleTranslation = serde_json::from_str(&cleaned).map_err(|e| {
        let kind = if looks_truncated(&e) { "truncated" } else { "malformed" };
        OracleError::Malformed(format!(
            "{kind} translation JSON: {e}; response: {}",
            truncate_for_log(&cleaned, 120)
        ))
    })?;

    Ok(TranslationResult {
        article_id: task.article_id.clone(),
        language_target: language_target.to_string(),
        translated_title: parsed.translated_title,
        translated_content: parsed.translated_content,
        summary_text: parsed.summary_text,
        model_name: oracle.model_name().to_string(),
    })
}

/// Run one pull-translate-push batch.
///
/// A pull failure is fatal to the phase and propagates; everything after
/// the pull degrades per task.
#[instrument(level = "info", skip_all, fields(language = %opts.language_target, limit = opts.limit))]
pub async fn run<O: Oracle>(oracle: &O, opts: &TranslateOptions) -> Result<RunSummary, Box<dyn Error>> {
    let store = StoreClient::new(&opts.store_url)?;
    let tasks = store.pull(&opts.language_target, opts.limit).await?;

    let mut summary = RunSummary {
        pulled: tasks.len(),
        ..Default::default()
    };
    if tasks.is_empty() {
        info!("nothing pending; run ends");
        return Ok(summary);
    }

    let mut results: Vec<TranslationResult> = Vec::new();
    for (index, task) in tasks.iter().enumerate() {
        info!(index, article_id = %task.article_id, "processing task");

        match translate_task(oracle, &opts.language_target, task).await {
            Ok(result) => {
                summary.translated += 1;
                match store.push_result(&result).await {
                    Ok(()) => summary.pushed += 1,
                    // The push is not retried this run; the store still has
                    // the task pending, so nothing is lost.
                    Err(e) => warn!(article_id = %task.article_id, error = %e, "result push failed"),
                }
                results.push(result);
            }
            Err(e) => {
                summary.skipped += 1;
                warn!(
                    article_id = %task.article_id,
                    retryable = e.is_retryable(),
                    error = %e,
                    "task skipped; it stays pending for a future pull"
                );
            }
        }

        sleep(opts.task_delay).await;
    }

    if let Some(path) = &opts.snapshot_path {
        snapshot::write_json(&results, path).await?;
    }

    info!(
        pulled = summary.pulled,
        translated = summary.translated,
        pushed = summary.pushed,
        skipped = summary.skipped,
        "translation run complete"
    );
    Ok(summary)
}
