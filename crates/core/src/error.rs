//! Error types for harvesting operations.
//!
//! This module defines the main error type [`HarvestError`] which represents
//! everything that can go wrong while locating sections, fetching pages,
//! writing batches and running the extraction model.
//!
//! # Example
//!
//! ```rust
//! use ttharvest_core::{HarvestConfig, HarvestError, harvest_links, Document};
//!
//! let doc = Document::parse("<p>No markers here</p>").unwrap();
//! let config = HarvestConfig::builder("Improving").build();
//!
//! match harvest_links(&doc, &config) {
//!     Err(HarvestError::SectionNotFound { label }) => assert_eq!(label, "Improving"),
//!     other => panic!("unexpected: {other:?}"),
//! }
//! ```

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for harvesting operations.
#[derive(Error, Debug)]
pub enum HarvestError {
    /// HTTP request errors from reqwest.
    ///
    /// Wraps network errors, DNS failures, non-success status codes and
    /// body decoding problems.
    #[cfg(feature = "fetch")]
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    /// Request timeout.
    #[error("Request timed out after {timeout} seconds")]
    Timeout { timeout: u64 },

    /// Invalid URL provided.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// HTML parsing errors, usually an invalid CSS selector.
    #[error("Failed to parse HTML: {0}")]
    HtmlParseError(String),

    /// The required start marker could not be located in the document.
    ///
    /// No meaningful link set exists without it, so callers abort the crawl.
    #[error("Could not find section marker: \"{label}\"")]
    SectionNotFound { label: String },

    /// File not found.
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    /// File write errors.
    #[error("Failed to write to file: {0}")]
    WriteError(#[from] std::io::Error),

    /// Invalid configuration values.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Prompt template problems (missing or unreplaced placeholder).
    #[error("Prompt error: {0}")]
    PromptError(String),

    /// The model runner could not be started or exited abnormally.
    #[error("Model runner error: {0}")]
    ModelError(String),
}

/// Result type alias for HarvestError.
pub type Result<T> = std::result::Result<T, HarvestError>;
