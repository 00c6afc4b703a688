//! Turning article blocks into structured JSON with a language model.
//!
//! A [`PromptTemplate`] wraps the article text, a [`ModelRunner`] produces
//! the reply and [`persist_output`] stores it as `<article_id>.json`.

use std::future::Future;
use std::path::{Path, PathBuf};
use std::process::Stdio;

use serde_json::Value;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{debug, warn};

use crate::{HarvestError, Result};

/// Placeholder replaced by the article text.
pub const ARTICLE_PLACEHOLDER: &str = "{{ARTICLE_TEXT}}";

/// A prompt with an [`ARTICLE_PLACEHOLDER`] slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptTemplate {
    text: String,
}

impl PromptTemplate {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    /// Reads a template from a UTF-8 text file.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(HarvestError::FileNotFound(path.to_path_buf()));
        }
        Ok(Self::new(std::fs::read_to_string(path)?))
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Replaces every placeholder with `article_text`.
    ///
    /// # Errors
    ///
    /// [`HarvestError::PromptError`] if the template has no placeholder, or
    /// if one is still present after replacement.
    pub fn render(&self, article_text: &str) -> Result<String> {
        if !self.text.contains(ARTICLE_PLACEHOLDER) {
            return Err(HarvestError::PromptError(format!(
                "template has no {ARTICLE_PLACEHOLDER} placeholder"
            )));
        }

        let prompt = self.text.replace(ARTICLE_PLACEHOLDER, article_text);
        if prompt.contains(ARTICLE_PLACEHOLDER) {
            return Err(HarvestError::PromptError(format!(
                "{ARTICLE_PLACEHOLDER} still present after rendering"
            )));
        }

        Ok(prompt)
    }
}

/// Runs a prompt through a model and returns its raw stdout.
pub trait ModelRunner {
    fn run(&self, prompt: &str) -> impl Future<Output = Result<String>> + Send;
}

/// A model behind an external program that reads the prompt on stdin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandRunner {
    pub program: String,
    pub args: Vec<String>,
}

impl CommandRunner {
    pub fn new(program: impl Into<String>, args: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self { program: program.into(), args: args.into_iter().map(Into::into).collect() }
    }

    /// `ollama run <model>`.
    pub fn ollama(model: &str) -> Self {
        Self::new("ollama", ["run", model])
    }
}

impl Default for CommandRunner {
    fn default() -> Self {
        Self::ollama("llama3")
    }
}

impl ModelRunner for CommandRunner {
    async fn run(&self, prompt: &str) -> Result<String> {
        debug!("Running {} {:?} ({} prompt bytes)", self.program, self.args, prompt.len());

        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| HarvestError::ModelError(format!("failed to start {}: {e}", self.program)))?;

        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| HarvestError::ModelError("child stdin unavailable".to_string()))?;

        // stdin is closed when `feed` finishes so the model sees EOF.
        let feed = async move {
            stdin.write_all(prompt.as_bytes()).await?;
            stdin.shutdown().await
        };
        let (fed, output) = tokio::join!(feed, child.wait_with_output());

        let output = output.map_err(|e| HarvestError::ModelError(format!("{} failed: {e}", self.program)))?;
        fed.map_err(|e| HarvestError::ModelError(format!("writing prompt to {}: {e}", self.program)))?;

        let stderr = String::from_utf8_lossy(&output.stderr);
        if !stderr.trim().is_empty() {
            warn!("{} stderr: {}", self.program, stderr.trim());
        }
        if !output.status.success() {
            warn!("{} exited with {}", self.program, output.status);
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

/// Parses model stdout as JSON, or wraps it as `{"raw_output": stdout}`.
pub fn parse_model_output(stdout: &str) -> Value {
    serde_json::from_str(stdout).unwrap_or_else(|_| serde_json::json!({ "raw_output": stdout }))
}

/// Writes `value` as pretty JSON to `<dir>/<article_id>.json`, creating
/// `dir` if needed.
pub fn persist_output(dir: &Path, article_id: &str, value: &Value) -> Result<PathBuf> {
    if article_id.is_empty() || article_id.contains(['/', '\\']) || article_id == ".." {
        return Err(HarvestError::ConfigError(format!("invalid article id: {article_id:?}")));
    }

    std::fs::create_dir_all(dir)?;
    let path = dir.join(format!("{article_id}.json"));
    let json = serde_json::to_string_pretty(value).map_err(|e| HarvestError::ModelError(e.to_string()))?;
    std::fs::write(&path, json)?;

    Ok(path)
}

/// Renders, runs, parses and persists one article. Returns the parsed output.
pub async fn process_article<R: ModelRunner>(
    runner: &R, template: &PromptTemplate, output_dir: &Path, article_id: &str, text: &str,
) -> Result<Value> {
    let prompt = template.render(text)?;
    let stdout = runner.run(&prompt).await?;
    let parsed = parse_model_output(&stdout);
    let path = persist_output(output_dir, article_id, &parsed)?;
    debug!("Wrote {}", path.display());
    Ok(parsed)
}
