//! HTML parsing and DOM access.
//!
//! This module provides the [`Document`] and [`Element`] types used by the
//! marker locator, the harvester and the article extractors. Both wrap
//! `scraper` types; the raw tree is reachable through [`Document::html`]
//! for code that needs to walk nodes directly.
//!
//! # Example
//!
//! ```rust
//! use ttharvest_core::parse::Document;
//!
//! let html = r#"
//!     <html>
//!         <body>
//!             <h1 class="node__title">Title</h1>
//!             <p><strong>Improving</strong></p>
//!         </body>
//!     </html>
//! "#;
//!
//! let doc = Document::parse(html).unwrap();
//! let title = doc.select_first("h1.node__title").unwrap().unwrap();
//! assert_eq!(title.text(), "Title");
//! ```

use ego_tree::NodeRef;
use scraper::{ElementRef, Html, Node, Selector};
use url::Url;

use crate::{HarvestError, PreprocessConfig, Result, preprocess};

/// Represents a parsed HTML document.
pub struct Document {
    html: Html,
    base_url: Option<Url>,
}

impl Document {
    /// Parses HTML from a string without preprocessing.
    pub fn parse(html: &str) -> Result<Self> {
        let html = Html::parse_document(html);
        Ok(Self { html, base_url: None })
    }

    /// Parses HTML after stripping page chrome.
    ///
    /// The base URL is remembered so callers can resolve relative links
    /// against the page the document came from.
    pub fn parse_with_preprocessing(html: &str, base_url: Option<Url>, config: &PreprocessConfig) -> Result<Self> {
        let cleaned = preprocess::preprocess_html(html, config);
        let html = Html::parse_document(&cleaned);

        Ok(Self { html, base_url })
    }

    /// Gets the base URL the document was fetched from, if known.
    pub fn base_url(&self) -> Option<&Url> {
        self.base_url.as_ref()
    }

    /// Gets the underlying `scraper::Html`.
    pub fn html(&self) -> &Html {
        &self.html
    }

    /// Gets the entire HTML as a string.
    pub fn as_string(&self) -> String {
        self.html.html()
    }

    /// Selects elements using a CSS selector.
    ///
    /// # Errors
    ///
    /// Returns [`HarvestError::HtmlParseError`] if the selector is invalid.
    ///
    /// # Example
    ///
    /// ```rust
    /// use ttharvest_core::parse::Document;
    ///
    /// let html = r#"<p class="content">First</p><p class="content">Second</p>"#;
    /// let doc = Document::parse(html).unwrap();
    /// let elements = doc.select("p.content").unwrap();
    /// assert_eq!(elements.len(), 2);
    /// ```
    pub fn select(&'_ self, selector: &str) -> Result<Vec<Element<'_>>> {
        let sel = parse_selector(selector)?;
        Ok(self.html.select(&sel).map(Element::new).collect())
    }

    /// Selects the first element matching a CSS selector, in document order.
    pub fn select_first(&'_ self, selector: &str) -> Result<Option<Element<'_>>> {
        let sel = parse_selector(selector)?;
        Ok(self.html.select(&sel).next().map(Element::new))
    }

    /// Gets the title of the document.
    pub fn title(&self) -> Option<String> {
        let selector = Selector::parse("title").ok()?;
        self.html
            .select(&selector)
            .next()
            .map(|el| el.text().collect::<String>())
    }

    /// Iterates every node of the tree in document order.
    pub fn nodes(&self) -> impl Iterator<Item = NodeRef<'_, Node>> {
        self.html.tree.root().descendants()
    }
}

/// A wrapper around scraper's `ElementRef`.
///
/// # Example
///
/// ```rust
/// use ttharvest_core::parse::Document;
///
/// let html = r#"<a href="/node/12">  Forehand   <em>loop</em> </a>"#;
/// let doc = Document::parse(html).unwrap();
/// let link = &doc.select("a").unwrap()[0];
///
/// assert_eq!(link.attr("href"), Some("/node/12"));
/// assert_eq!(link.joined_text(" "), "Forehand loop");
/// ```
#[derive(Clone, Copy, Debug)]
pub struct Element<'a> {
    element: ElementRef<'a>,
}

impl<'a> Element<'a> {
    pub(crate) fn new(element: ElementRef<'a>) -> Self {
        Self { element }
    }

    /// Wraps a tree node if it is an element.
    pub fn wrap(node: NodeRef<'a, Node>) -> Option<Self> {
        ElementRef::wrap(node).map(Self::new)
    }

    /// Gets the underlying tree node.
    pub fn node(&self) -> NodeRef<'a, Node> {
        *self.element
    }

    /// Gets the outer HTML of this element.
    pub fn outer_html(&self) -> String {
        self.element.html()
    }

    /// Gets the raw concatenation of all text nodes within this element.
    pub fn text(&self) -> String {
        self.element.text().collect()
    }

    /// Gets the text pieces of this element, each trimmed, empties dropped,
    /// joined with `separator`.
    pub fn joined_text(&self, separator: &str) -> String {
        joined_text(self.node(), separator)
    }

    /// Gets the text as one line per text piece.
    pub fn text_lines(&self) -> String {
        self.joined_text("\n")
    }

    /// Gets the value of an attribute.
    pub fn attr(&self, name: &str) -> Option<&'a str> {
        self.element.value().attr(name)
    }

    /// Gets the lowercase tag name.
    pub fn tag_name(&self) -> String {
        self.element.value().name().to_lowercase()
    }

    /// Checks the tag name without allocating.
    pub fn is(&self, tag: &str) -> bool {
        self.element.value().name().eq_ignore_ascii_case(tag)
    }

    /// Checks whether the element carries a class.
    pub fn has_class(&self, class: &str) -> bool {
        self.element.value().classes().any(|c| c == class)
    }

    /// Selects descendant elements using a CSS selector.
    pub fn select(&self, selector: &str) -> Result<Vec<Element<'a>>> {
        let sel = parse_selector(selector)?;
        Ok(self.element.select(&sel).map(Element::new).collect())
    }

    /// Selects the first descendant matching a CSS selector.
    pub fn select_first(&self, selector: &str) -> Result<Option<Element<'a>>> {
        let sel = parse_selector(selector)?;
        Ok(self.element.select(&sel).next().map(Element::new))
    }

    /// Finds the first descendant element with the given tag name.
    pub fn find_descendant(&self, tag: &str) -> Option<Element<'a>> {
        self.element
            .descendants()
            .skip(1)
            .filter_map(Element::wrap)
            .find(|el| el.is(tag))
    }

    /// Finds the nearest ancestor matching a predicate.
    pub fn find_ancestor(&self, predicate: impl Fn(&Element<'a>) -> bool) -> Option<Element<'a>> {
        self.element.ancestors().filter_map(Element::wrap).find(|el| predicate(el))
    }
}

/// Collects the text pieces under `node` (or the node itself, for a text
/// node), trimming each, dropping empty ones and joining with `separator`.
pub fn joined_text(node: NodeRef<'_, Node>, separator: &str) -> String {
    node.descendants()
        .filter_map(|n| match n.value() {
            Node::Text(text) => {
                let trimmed = text.trim();
                (!trimmed.is_empty()).then_some(trimmed)
            }
            _ => None,
        })
        .collect::<Vec<_>>()
        .join(separator)
}

fn parse_selector(selector: &str) -> Result<Selector> {
    Selector::parse(selector).map_err(|e| HarvestError::HtmlParseError(format!("Invalid selector: {}", e)))
}
