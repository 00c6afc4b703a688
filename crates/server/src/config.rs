//! Server configuration from `TTHARVEST_*` environment variables.

use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::Context;

pub const DEFAULT_ADDR: &str = "127.0.0.1:8000";
pub const DEFAULT_PROMPT: &str = "app/prompts/article_to_json_prompt.txt";
pub const DEFAULT_OUTPUT_DIR: &str = "processed";
pub const DEFAULT_MODEL: &str = "llama3";
pub const DEFAULT_RUNNER: &str = "ollama";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// `TTHARVEST_ADDR`
    pub addr: SocketAddr,
    /// `TTHARVEST_PROMPT`
    pub prompt_path: PathBuf,
    /// `TTHARVEST_OUTPUT_DIR`
    pub output_dir: PathBuf,
    /// `TTHARVEST_MODEL`
    pub model: String,
    /// `TTHARVEST_RUNNER`, the program invoked as `<runner> run <model>`.
    pub runner: String,
}

impl ServerConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key lookup. Unset or blank keys take
    /// their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let get = |key: &str, default: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .unwrap_or_else(|| default.to_string())
        };

        let addr = get("TTHARVEST_ADDR", DEFAULT_ADDR);
        let addr = addr
            .parse()
            .with_context(|| format!("TTHARVEST_ADDR is not a socket address: {addr}"))?;

        Ok(Self {
            addr,
            prompt_path: PathBuf::from(get("TTHARVEST_PROMPT", DEFAULT_PROMPT)),
            output_dir: PathBuf::from(get("TTHARVEST_OUTPUT_DIR", DEFAULT_OUTPUT_DIR)),
            model: get("TTHARVEST_MODEL", DEFAULT_MODEL),
            runner: get("TTHARVEST_RUNNER", DEFAULT_RUNNER),
        })
    }
}
