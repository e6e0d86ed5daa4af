//! Command-line interface definitions.
//!
//! Two subcommands mirror the pipeline's two phases: `harvest` collects and
//! delivers articles, `translate` works the pull-based translation queue.
//! Both are thin configuration-driven callers of the shared core; all
//! options can come from flags or environment variables.

use clap::{Args, Parser, Subcommand};

use crate::normalize::DatePolicy;

/// Harvest news feeds and synchronize translation work against a remote store.
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Collect articles from the configured feed sources and deliver them
    /// to the store and/or a local snapshot file
    Harvest {
        /// Path to the YAML feed-source list
        #[arg(short, long)]
        sources: String,

        /// Base URL of the remote article store
        #[arg(long, env = "NEWSFLOW_STORE_URL")]
        store_url: Option<String>,

        /// Path for a local JSON snapshot of the harvested batch
        #[arg(long)]
        snapshot: Option<String>,

        /// Skip entries published more than this many days ago (0 disables)
        #[arg(long, default_value_t = 3)]
        days_limit: u32,

        /// What to substitute when an entry's publish time cannot be parsed
        #[arg(long, value_enum, default_value = "now")]
        date_policy: DatePolicy,

        #[command(flatten)]
        oracle: OracleOpts,
    },

    /// Pull pending translation tasks, drive the oracle, and push results
    Translate {
        /// Base URL of the remote article store
        #[arg(long, env = "NEWSFLOW_STORE_URL")]
        store_url: String,

        /// Target language code requested from the store
        #[arg(short, long, default_value = "ko")]
        language: String,

        /// Maximum number of tasks to pull for this run
        #[arg(long, default_value_t = 10)]
        limit: u32,

        /// Path for a local JSON snapshot of this run's results
        #[arg(long)]
        snapshot: Option<String>,

        #[command(flatten)]
        oracle: OracleOpts,
    },
}

/// Connection settings for the text-generation oracle.
#[derive(Args, Debug, Clone)]
pub struct OracleOpts {
    /// Base URL of the OpenAI-compatible completions endpoint
    #[arg(long, env = "NEWSFLOW_ORACLE_URL")]
    pub oracle_url: String,

    /// API key for the oracle endpoint
    #[arg(long, env = "NEWSFLOW_ORACLE_KEY")]
    pub oracle_key: Option<String>,

    /// Model name, also reported in translation results
    #[arg(long, env = "NEWSFLOW_ORACLE_MODEL", default_value = "gemini-2.0-flash")]
    pub oracle_model: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_harvest_parsing() {
        let cli = Cli::parse_from([
            "newsflow",
            "harvest",
            "--sources",
            "./sources.yaml",
            "--snapshot",
            "./batch.json",
            "--oracle-url",
            "http://localhost:8000/v1",
        ]);

        match cli.command {
            Command::Harvest { sources, snapshot, days_limit, date_policy, oracle, .. } => {
                assert_eq!(sources, "./sources.yaml");
                assert_eq!(snapshot.as_deref(), Some("./batch.json"));
                assert_eq!(days_limit, 3);
                assert_eq!(date_policy, DatePolicy::Now);
                assert_eq!(oracle.oracle_model, "gemini-2.0-flash");
            }
            other => panic!("expected harvest, got {other:?}"),
        }
    }

    #[test]
    fn test_translate_parsing_with_date_policy_and_limit() {
        let cli = Cli::parse_from([
            "newsflow",
            "translate",
            "--store-url",
            "http://localhost:8080/api",
            "--language",
            "ja",
            "--limit",
            "25",
            "--oracle-url",
            "http://localhost:8000/v1",
            "--oracle-model",
            "test-model",
        ]);

        match cli.command {
            Command::Translate { store_url, language, limit, oracle, .. } => {
                assert_eq!(store_url, "http://localhost:8080/api");
                assert_eq!(language, "ja");
                assert_eq!(limit, 25);
                assert_eq!(oracle.oracle_model, "test-model");
            }
            other => panic!("expected translate, got {other:?}"),
        }
    }

    #[test]
    fn test_date_policy_value_enum() {
        let cli = Cli::parse_from([
            "newsflow",
            "harvest",
            "--sources",
            "s.yaml",
            "--date-policy",
            "fetch-time",
            "--oracle-url",
            "http://localhost:8000/v1",
        ]);
        match cli.command {
            Command::Harvest { date_policy, .. } => assert_eq!(date_policy, DatePolicy::FetchTime),
            other => panic!("expected harvest, got {other:?}"),
        }
    }
}
