//! Section marker location.
//!
//! Index pages on the coaching sites mark their sections with a bold line,
//! `<p><strong>Section Name</strong></p>`. Real markup is inconsistent
//! (nested spans, stray whitespace, labels with trailing punctuation, the odd
//! missing wrapper), so a marker is looked up in three tiers:
//!
//! 1. [`MatchTier::Exact`]: a `p > strong` whose text equals the label.
//! 2. [`MatchTier::Contains`]: a `p > strong` whose text contains the label.
//! 3. [`MatchTier::Pattern`]: any text node containing the label as a whole
//!    word. This tier can land on decorative text that merely repeats the
//!    label, so its markers report [`Marker::is_low_confidence`].
//!
//! All comparisons are case-insensitive on trimmed text.

use ego_tree::NodeRef;
use regex::RegexBuilder;
use scraper::Node;
use tracing::debug;

use crate::parse::{Document, Element, joined_text};

/// Paragraph-like element that wraps a marker.
pub const MARKER_BLOCK_TAG: &str = "p";

/// Short-emphasis element carrying the marker text.
pub const MARKER_EMPHASIS_TAG: &str = "strong";

const MARKER_SELECTOR: &str = "p > strong";

/// Which lookup tier located a marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchTier {
    Exact,
    Contains,
    Pattern,
}

/// A located section marker.
#[derive(Debug, Clone, Copy)]
pub struct Marker<'a> {
    node: NodeRef<'a, Node>,
    tier: MatchTier,
}

impl<'a> Marker<'a> {
    /// The marker node, usually the enclosing `<p>`.
    pub fn node(&self) -> NodeRef<'a, Node> {
        self.node
    }

    /// The marker as an element, `None` when the pattern tier landed on a
    /// bare text node.
    pub fn element(&self) -> Option<Element<'a>> {
        Element::wrap(self.node)
    }

    pub fn tier(&self) -> MatchTier {
        self.tier
    }

    /// True for markers found by the whole-tree pattern search.
    pub fn is_low_confidence(&self) -> bool {
        self.tier == MatchTier::Pattern
    }

    /// Node identity, not text equality.
    pub fn is_node(&self, node: NodeRef<'_, Node>) -> bool {
        self.node.id() == node.id()
    }

    /// The marker's text, pieces joined with a space.
    pub fn text(&self) -> String {
        joined_text(self.node, " ")
    }
}

/// Normalizes a label or marker text for comparison: trimmed and lowercased.
pub fn normalize_label(label: &str) -> String {
    label.trim().to_lowercase()
}

/// Locates the marker for `label`, trying the exact, contains and pattern
/// tiers in that order.
///
/// # Example
///
/// ```rust
/// use ttharvest_core::marker::{MatchTier, find_section_marker};
/// use ttharvest_core::parse::Document;
///
/// let doc = Document::parse("<p><strong> Improving: </strong></p>").unwrap();
/// let marker = find_section_marker(&doc, "improving").unwrap();
///
/// assert_eq!(marker.tier(), MatchTier::Contains);
/// assert_eq!(marker.element().unwrap().tag_name(), "p");
/// ```
pub fn find_section_marker<'a>(doc: &'a Document, label: &str) -> Option<Marker<'a>> {
    let target = normalize_label(label);
    if target.is_empty() {
        return None;
    }

    let candidates = doc.select(MARKER_SELECTOR).unwrap_or_default();

    if let Some(hit) = candidates
        .iter()
        .find(|strong| normalize_label(&strong.joined_text("")) == target)
    {
        return Some(Marker { node: enclosing_block(hit), tier: MatchTier::Exact });
    }

    if let Some(hit) = candidates
        .iter()
        .find(|strong| normalize_label(&strong.joined_text(" ")).contains(&target))
    {
        debug!(label, "section marker matched by containment");
        return Some(Marker { node: enclosing_block(hit), tier: MatchTier::Contains });
    }

    let marker = find_by_pattern(doc, label)?;
    debug!(label, "section marker matched by whole-tree pattern (low confidence)");
    Some(marker)
}

/// Texts of every `p > strong` marker candidate, in document order.
pub fn marker_labels(doc: &Document) -> Vec<String> {
    doc.select(MARKER_SELECTOR)
        .unwrap_or_default()
        .iter()
        .map(|strong| strong.joined_text(""))
        .collect()
}

fn enclosing_block<'a>(emphasis: &Element<'a>) -> NodeRef<'a, Node> {
    emphasis
        .find_ancestor(|el| el.is(MARKER_BLOCK_TAG))
        .unwrap_or(*emphasis)
        .node()
}

fn find_by_pattern<'a>(doc: &'a Document, label: &str) -> Option<Marker<'a>> {
    let pattern = RegexBuilder::new(&format!(r"\b{}\b", regex::escape(label.trim())))
        .case_insensitive(true)
        .build()
        .ok()?;

    let hit = doc
        .nodes()
        .find(|node| matches!(node.value(), Node::Text(text) if pattern.is_match(text)))?;

    let node = match hit.parent().and_then(Element::wrap) {
        Some(parent) if parent.is(MARKER_BLOCK_TAG) => parent.node(),
        Some(parent) => parent
            .find_ancestor(|el| el.is(MARKER_BLOCK_TAG))
            .unwrap_or(parent)
            .node(),
        None => hit,
    };

    Some(Marker { node, tier: MatchTier::Pattern })
}
