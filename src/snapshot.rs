//! Atomic JSON file artifacts.
//!
//! End-of-run snapshots (harvested batches, translation results) are
//! written through a temp file and renamed into place, so a crash mid-write
//! never leaves a half-serialized artifact behind. Output is UTF-8,
//! pretty-printed for humans.

use std::error::Error;
use std::path::Path;

use serde::Serialize;
use tokio::fs;
use tracing::{info, instrument};

/// Serialize `value` to `path`, atomically.
#[instrument(level = "info", skip(value), fields(path = %path))]
pub async fn write_json<T: Serialize>(value: &T, path: &str) -> Result<(), Box<dyn Error>> {
    let json = serde_json::to_string_pretty(value)?;

    if let Some(parent) = Path::new(path).parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).await?;
        }
    }

    let tmp_path = format!("{path}.tmp");
    fs::write(&tmp_path, json.as_bytes()).await?;
    fs::rename(&tmp_path, path).await?;

    info!("wrote snapshot");
    Ok(())
}
