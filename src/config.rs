//! Feed-source configuration.
//!
//! Sources live in a YAML file so runs are reproducible and the binary
//! stays free of hardcoded publishers:
//!
//! ```yaml
//! sources:
//!   - name: Example Press
//!     feed_url: https://example.com/rss.xml
//! ```

use std::error::Error;

use serde::Deserialize;

/// One configured feed. Static, read-only for the pipeline.
#[derive(Debug, Clone, Deserialize)]
pub struct ArticleSource {
    pub name: String,
    pub feed_url: String,
}

#[derive(Debug, Deserialize)]
struct SourcesFile {
    sources: Vec<ArticleSource>,
}

/// Load the source list. A missing or malformed file is fatal to the run.
pub fn load_sources(path: &str) -> Result<Vec<ArticleSource>, Box<dyn Error>> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| format!("cannot read sources file {path}: {e}"))?;
    let parsed: SourcesFile = serde_yaml::from_str(&text)
        .map_err(|e| format!("cannot parse sources file {path}: {e}"))?;
    Ok(parsed.sources)
}
