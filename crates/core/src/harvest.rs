//! Section-bounded link harvesting.
//!
//! Collects the links that sit between two section markers of an index
//! page. The walk starts at the sibling after the start marker and stops at
//! the stop marker (by node identity) or at any `<p>` whose bold text reads
//! like the stop label, whichever comes first. Only block containers
//! (`ul`, `ol`, `li`, `p`, `div`) are scanned for `a[href]`.
//!
//! # Example
//!
//! ```rust
//! use ttharvest_core::{Document, HarvestConfig, harvest_links};
//!
//! let html = r#"
//!     <p><strong>Improving</strong></p>
//!     <ul><li><a href="/a">A</a></li><li><a href="https://youtube.com/x">Video</a></li></ul>
//!     <p><strong>Playing in Tournaments</strong></p>
//!     <ul><li><a href="/c">C</a></li></ul>
//! "#;
//!
//! let doc = Document::parse(html).unwrap();
//! let config = HarvestConfig::builder("Improving")
//!     .stop_label("Playing in Tournaments")
//!     .base_url("http://www.tabletenniscoaching.com/articles")
//!     .unwrap()
//!     .build();
//!
//! let links = harvest_links(&doc, &config).unwrap();
//! assert_eq!(links.len(), 1);
//! assert_eq!(links[0].as_str(), "http://www.tabletenniscoaching.com/a");
//! ```

use std::collections::HashSet;

use ego_tree::NodeRef;
use scraper::Node;
use tracing::{debug, trace};
use url::Url;

use crate::links::{Blocklist, resolve_href};
use crate::marker::{MARKER_BLOCK_TAG, MARKER_EMPHASIS_TAG, Marker, find_section_marker, normalize_label};
use crate::parse::{Document, Element};
use crate::walk::walk_until;
use crate::{HarvestError, Result};

/// Elements scanned for links while walking a section.
pub const CONTAINER_TAGS: [&str; 5] = ["ul", "ol", "li", "p", "div"];

const LINK_SELECTOR: &str = "a[href]";

/// Configuration for one harvesting call.
///
/// # Example
///
/// ```rust
/// use ttharvest_core::HarvestConfig;
///
/// let config = HarvestConfig::builder("Improving")
///     .stop_label("Playing in Tournaments")
///     .max_links(10)
///     .build();
///
/// assert_eq!(config.max_links, Some(10));
/// ```
#[derive(Debug, Clone)]
pub struct HarvestConfig {
    /// Label of the section to start after (required).
    pub start_label: String,

    /// Label of the section to stop before. `None` collects to the end.
    pub stop_label: Option<String>,

    /// Base URL for resolving relative hrefs. Falls back to the document's
    /// own base URL when unset.
    pub base_url: Option<Url>,

    /// Hosts whose links are dropped (default: the social/video blocklist).
    pub blocked_hosts: Blocklist,

    /// Keep at most this many links (default: unbounded).
    pub max_links: Option<usize>,
}

impl HarvestConfig {
    /// Creates a new builder for a section starting at `start_label`.
    pub fn builder(start_label: impl Into<String>) -> HarvestConfigBuilder {
        HarvestConfigBuilder::new(start_label)
    }
}

/// Builder for HarvestConfig.
pub struct HarvestConfigBuilder {
    config: HarvestConfig,
}

impl HarvestConfigBuilder {
    /// Creates a new builder with default values.
    pub fn new(start_label: impl Into<String>) -> Self {
        Self {
            config: HarvestConfig {
                start_label: start_label.into(),
                stop_label: None,
                base_url: None,
                blocked_hosts: Blocklist::social(),
                max_links: None,
            },
        }
    }

    /// Sets the stop label.
    pub fn stop_label(mut self, value: impl Into<String>) -> Self {
        self.config.stop_label = Some(value.into());
        self
    }

    /// Parses and sets the base URL.
    ///
    /// # Errors
    ///
    /// Returns [`HarvestError::InvalidUrl`] if `value` is not an absolute URL.
    pub fn base_url(mut self, value: &str) -> Result<Self> {
        let url = Url::parse(value).map_err(|e| HarvestError::InvalidUrl(format!("{value}: {e}")))?;
        self.config.base_url = Some(url);
        Ok(self)
    }

    /// Sets an already parsed base URL.
    pub fn base(mut self, value: Url) -> Self {
        self.config.base_url = Some(value);
        self
    }

    /// Replaces the blocklist.
    pub fn blocked_hosts(mut self, value: Blocklist) -> Self {
        self.config.blocked_hosts = value;
        self
    }

    /// Sets the maximum number of links.
    pub fn max_links(mut self, value: usize) -> Self {
        self.config.max_links = Some(value);
        self
    }

    /// Builds the config.
    pub fn build(self) -> HarvestConfig {
        self.config
    }
}

/// Reusable harvester bound to one configuration.
#[derive(Debug, Clone)]
pub struct SectionHarvester {
    config: HarvestConfig,
}

impl SectionHarvester {
    pub fn new(config: HarvestConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &HarvestConfig {
        &self.config
    }

    /// Harvests the configured section of `doc`.
    pub fn harvest(&self, doc: &Document) -> Result<Vec<Url>> {
        harvest_links(doc, &self.config)
    }
}

/// Collects the links between the start and stop markers of `doc`.
///
/// # Errors
///
/// - [`HarvestError::SectionNotFound`] when the start marker is missing.
/// - [`HarvestError::ConfigError`] when neither the config nor the document
///   provides a base URL.
pub fn harvest_links(doc: &Document, config: &HarvestConfig) -> Result<Vec<Url>> {
    let start = find_section_marker(doc, &config.start_label)
        .ok_or_else(|| HarvestError::SectionNotFound { label: config.start_label.clone() })?;

    let base = config
        .base_url
        .as_ref()
        .or(doc.base_url())
        .ok_or_else(|| HarvestError::ConfigError("a base URL is required to resolve links".to_string()))?;

    let stop_label = config.stop_label.as_deref().map(normalize_label);
    if stop_label.as_deref() == Some(normalize_label(&config.start_label).as_str()) {
        debug!(label = %config.start_label, "start and stop labels are the same; section is empty");
        return Ok(Vec::new());
    }

    let stop = config
        .stop_label
        .as_deref()
        .and_then(|label| find_section_marker(doc, label));
    if config.stop_label.is_some() && stop.is_none() {
        debug!(label = ?config.stop_label, "stop marker not found; collecting to the end");
    }

    let mut links = Vec::new();
    let mut seen: HashSet<String> = HashSet::new();

    let outcome = walk_until(
        start.node().next_siblings(),
        |node| is_section_boundary(*node, stop.as_ref(), stop_label.as_deref()),
        |node| {
            let Some(container) = Element::wrap(node).filter(is_container) else {
                return;
            };
            for anchor in container.select(LINK_SELECTOR).unwrap_or_default() {
                let Some(href) = anchor.attr("href") else { continue };
                let Some(url) = resolve_href(base, href) else {
                    trace!(href, "skipping unresolvable href");
                    continue;
                };
                if seen.contains(url.as_str()) {
                    continue;
                }
                if config.blocked_hosts.matches(&url) {
                    debug!(url = %url, "skipping blocked link");
                    continue;
                }
                seen.insert(url.as_str().to_string());
                links.push(url);
            }
        },
    );

    debug!(
        visited = outcome.visited,
        hit_boundary = outcome.hit_boundary,
        collected = links.len(),
        "section walk finished"
    );

    if let Some(max) = config.max_links {
        links.truncate(max);
    }

    Ok(links)
}

fn is_container(el: &Element<'_>) -> bool {
    CONTAINER_TAGS.iter().any(|tag| el.is(tag))
}

fn is_section_boundary(node: NodeRef<'_, Node>, stop: Option<&Marker<'_>>, stop_label: Option<&str>) -> bool {
    if stop.is_some_and(|marker| marker.is_node(node)) {
        return true;
    }

    let Some(el) = Element::wrap(node) else {
        return false;
    };

    match stop_label {
        Some(label) if el.is(MARKER_BLOCK_TAG) => el
            .find_descendant(MARKER_EMPHASIS_TAG)
            .is_some_and(|strong| normalize_label(&strong.joined_text("")) == label),
        _ => false,
    }
}
