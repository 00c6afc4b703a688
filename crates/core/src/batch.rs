//! Batch client for the processing server.
//!
//! Reads a batch file written by the crawls, splits it into article blocks
//! and posts them one by one to the server's `/process` endpoint.

use std::path::Path;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

use crate::article::split_batch;
use crate::{HarvestError, Result};

/// Default endpoint of a locally running `ttharvest-server`.
pub const DEFAULT_API_URL: &str = "http://127.0.0.1:8000/process";

/// Request body of `POST /process`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleInput {
    /// Identifier for the persisted output; the server picks one when absent.
    #[serde(default)]
    pub article_id: Option<String>,
    /// One article block.
    pub text: String,
}

/// Outcome of one submitted block.
#[derive(Debug, Clone, PartialEq)]
pub struct Submission {
    pub article_id: String,
    /// HTTP status code of the reply.
    pub http_status: u16,
    /// `status` field of the JSON reply, if any.
    pub api_status: Option<String>,
    /// Parsed reply, or `{"raw_response": <body>}` when it was not JSON.
    pub response: Value,
}

/// Identifier of the `index`-th (1-based) block of a batch.
pub fn article_id(index: usize) -> String {
    format!("article-{index:04}")
}

/// Builds the request bodies for a raw batch.
pub fn batch_inputs(raw: &str) -> Vec<ArticleInput> {
    split_batch(raw)
        .into_iter()
        .enumerate()
        .map(|(i, text)| ArticleInput { article_id: Some(article_id(i + 1)), text })
        .collect()
}

/// Posts every block of the batch file at `path` to `api_url`, in order.
///
/// Replies are recorded whatever their status; only transport failures and
/// unreadable input stop the batch.
pub async fn submit_batch(client: &Client, path: &Path, api_url: &str) -> Result<Vec<Submission>> {
    if !path.exists() {
        return Err(HarvestError::FileNotFound(path.to_path_buf()));
    }
    let bytes = std::fs::read(path)?;
    let raw = String::from_utf8_lossy(&bytes);

    let inputs = batch_inputs(&raw);
    info!("Found {} article(s) in {}", inputs.len(), path.display());

    let mut submissions = Vec::with_capacity(inputs.len());
    for (idx, input) in inputs.into_iter().enumerate() {
        let response = client.post(api_url).json(&input).send().await?;
        let http_status = response.status().as_u16();
        let body = response.text().await?;
        let response = parse_reply(&body);
        let api_status = response.get("status").and_then(Value::as_str).map(str::to_string);

        info!(
            "[{}] status={}, api_status={}",
            idx + 1,
            http_status,
            api_status.as_deref().unwrap_or("None")
        );

        submissions.push(Submission {
            article_id: input.article_id.unwrap_or_default(),
            http_status,
            api_status,
            response,
        });
    }

    Ok(submissions)
}

fn parse_reply(body: &str) -> Value {
    serde_json::from_str(body).unwrap_or_else(|_| serde_json::json!({ "raw_response": body }))
}
