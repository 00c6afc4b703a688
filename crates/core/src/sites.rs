//! Crawl configurations for the supported coaching sites.
//!
//! Each crawl shape is an immutable value. `Default` gives the live site
//! settings; override single fields with struct update syntax:
//!
//! ```rust
//! use std::time::Duration;
//! use ttharvest_core::sites::SectionCrawl;
//!
//! let crawl = SectionCrawl { max_links: Some(3), pause: Duration::ZERO, ..Default::default() };
//! assert_eq!(crawl.start_label, "Improving");
//! ```

use std::path::PathBuf;
use std::time::Duration;

use crate::extract::ArticleRules;
use crate::links::{Blocklist, HostSet};
use crate::preprocess::PreprocessConfig;

/// TableTennisCoaching.com hosts fetched by the crawls.
pub const TTC_HOSTS: [&str; 2] = ["tabletenniscoaching.com", "www.tabletenniscoaching.com"];

/// Crawl of an index page section: harvest the links between two section
/// markers, then fetch the internal ones as articles.
#[derive(Debug, Clone)]
pub struct SectionCrawl {
    /// Index page holding the section markers.
    pub index_url: String,
    /// Section to start after.
    pub start_label: String,
    /// Section to stop before.
    pub stop_label: Option<String>,
    /// Hosts treated as internal (exact match); other links are reported
    /// as external and not fetched.
    pub allowed_hosts: HostSet,
    /// Hosts never collected.
    pub blocked_hosts: Blocklist,
    /// How to read each article page.
    pub article: ArticleRules,
    /// Chrome stripped before any page is read.
    pub preprocess: PreprocessConfig,
    /// Keep at most this many harvested links.
    pub max_links: Option<usize>,
    /// Politeness delay between fetches.
    pub pause: Duration,
    /// When set, the cleaned index page is written here as
    /// `debug_index.html` and the marker labels are logged.
    pub debug_dir: Option<PathBuf>,
}

impl Default for SectionCrawl {
    fn default() -> Self {
        Self {
            index_url: "http://www.tabletenniscoaching.com/articles".to_string(),
            start_label: "Improving".to_string(),
            stop_label: Some("Playing in Tournaments".to_string()),
            allowed_hosts: HostSet::new(TTC_HOSTS),
            blocked_hosts: Blocklist::social(),
            article: ArticleRules::table_tennis_coaching(),
            preprocess: PreprocessConfig::default(),
            max_links: None,
            pause: Duration::from_secs(1),
            debug_dir: None,
        }
    }
}

/// Crawl of a paginated archive whose index pages carry the full posts.
#[derive(Debug, Clone)]
pub struct PagedCrawl {
    /// Index URL with a `{n}` placeholder for the zero-based page number.
    pub index_template: String,
    /// One element per post.
    pub row_selector: String,
    /// Title link selectors within a row, tried in order.
    pub title_selectors: Vec<String>,
    /// Body container selectors within a row, tried in order; the row
    /// itself is the last resort.
    pub body_selectors: Vec<String>,
    /// Hosts accepted for post URLs. URLs without a host are accepted too.
    pub allowed_hosts: HostSet,
    /// Chrome stripped before any page is read.
    pub preprocess: PreprocessConfig,
    /// Stop after this many index pages (default: until an empty page).
    pub max_pages: Option<usize>,
    /// Politeness delay after each written post and each page.
    pub pause: Duration,
}

impl PagedCrawl {
    /// Index URL of page `n`.
    pub fn page_url(&self, n: usize) -> String {
        self.index_template.replace("{n}", &n.to_string())
    }
}

impl Default for PagedCrawl {
    fn default() -> Self {
        Self {
            index_template: "http://www.tabletenniscoaching.com/TipOfTheWeek?page={n}".to_string(),
            row_selector: "div.view-content div.views-row".to_string(),
            title_selectors: vec![
                "div.views-field.views-field-title h1.field-content a[href]".to_string(),
                "div.views-field.views-field-title h2.field-content a[href]".to_string(),
            ],
            body_selectors: vec![
                "div.views-field.views-field-body div.field-content".to_string(),
                "div.views-field.views-field-body".to_string(),
            ],
            allowed_hosts: HostSet::new(TTC_HOSTS),
            preprocess: PreprocessConfig::default(),
            max_pages: None,
            pause: Duration::from_millis(800),
        }
    }
}

/// Crawl of a listing page: every link matching a selector is an article.
#[derive(Debug, Clone)]
pub struct ListingCrawl {
    /// Listing page. Only links on its host are followed.
    pub index_url: String,
    /// Anchors pointing at articles.
    pub link_selector: String,
    /// Required path prefix of article URLs.
    pub path_prefix: String,
    /// Hosts never collected.
    pub blocked_hosts: Blocklist,
    /// How to read each article page.
    pub article: ArticleRules,
    /// Chrome stripped before any page is read.
    pub preprocess: PreprocessConfig,
    /// Keep at most this many links.
    pub max_links: Option<usize>,
    /// Politeness delay between fetches.
    pub pause: Duration,
}

impl Default for ListingCrawl {
    fn default() -> Self {
        Self {
            index_url: "https://www.pingskills.com/blog".to_string(),
            link_selector: "div.regular-blogs a[href^='/blog/']".to_string(),
            path_prefix: "/blog/".to_string(),
            blocked_hosts: Blocklist::social(),
            article: ArticleRules::pingskills(),
            preprocess: PreprocessConfig::without_header(),
            max_links: None,
            pause: Duration::from_millis(1200),
        }
    }
}
