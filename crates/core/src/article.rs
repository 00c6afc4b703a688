//! Scraped articles and the plain-text batch format.
//!
//! Every crawl writes one block per article:
//!
//! ```text
//! ===ARTICLE===
//! source_url: http://www.tabletenniscoaching.com/node/1234
//! title: Forehand Loop Basics
//! date_accessed: 2025-11-02
//! TEXT:
//! First line of the body
//! ...
//!
//! ```
//!
//! The batch client splits a file of such blocks back into single articles
//! with [`split_batch`].

use std::io::Write;

use serde::Serialize;
use time::Date;
use time::macros::format_description;

use crate::{HarvestError, Result};

/// Line that opens every article block.
pub const ARTICLE_SEPARATOR: &str = "===ARTICLE===";

const UNKNOWN_TITLE: &str = "Unknown";

/// An extracted article.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Article {
    /// Page the article was read from.
    pub source_url: String,

    /// Title as shown on the page, empty when none was found.
    pub title: String,

    /// Body text, one text piece per line.
    pub text: String,
}

impl Article {
    pub fn new(source_url: impl Into<String>, title: impl Into<String>, text: impl Into<String>) -> Self {
        Self { source_url: source_url.into(), title: title.into(), text: text.into() }
    }

    /// Whether the body is empty after trimming. Such articles are skipped.
    pub fn is_empty(&self) -> bool {
        self.text.trim().is_empty()
    }

    /// Renders the article as a batch block.
    pub fn to_block(&self, date_accessed: Date) -> String {
        let title = if self.title.is_empty() { UNKNOWN_TITLE } else { self.title.as_str() };
        format!(
            "{ARTICLE_SEPARATOR}\nsource_url: {}\ntitle: {}\ndate_accessed: {}\nTEXT:\n{}\n\n",
            self.source_url,
            title,
            format_date(date_accessed),
            self.text.trim()
        )
    }
}

/// Writes one article block.
pub fn write_block<W: Write>(out: &mut W, article: &Article, date_accessed: Date) -> Result<()> {
    out.write_all(article.to_block(date_accessed).as_bytes())?;
    Ok(())
}

/// ISO `YYYY-MM-DD`.
pub fn format_date(date: Date) -> String {
    let format = format_description!("[year]-[month]-[day]");
    date.format(&format).unwrap_or_else(|_| date.to_string())
}

/// Splits a batch file into blocks, each re-prefixed with the separator.
///
/// Text before the first separator becomes a block of its own.
///
/// # Example
///
/// ```rust
/// use ttharvest_core::article::split_batch;
///
/// let raw = "===ARTICLE===\ntitle: A\n\n===ARTICLE===\ntitle: B\n";
/// let blocks = split_batch(raw);
///
/// assert_eq!(blocks, vec!["===ARTICLE===\ntitle: A", "===ARTICLE===\ntitle: B"]);
/// ```
pub fn split_batch(raw: &str) -> Vec<String> {
    raw.split(ARTICLE_SEPARATOR)
        .map(str::trim)
        .filter(|chunk| !chunk.is_empty())
        .map(|chunk| format!("{ARTICLE_SEPARATOR}\n{chunk}"))
        .collect()
}

/// A block read back from a batch file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArticleBlock {
    pub source_url: String,
    pub title: String,
    pub date_accessed: String,
    pub text: String,
}

impl ArticleBlock {
    /// Parses the header fields and body of one block.
    ///
    /// # Errors
    ///
    /// Returns [`HarvestError::ConfigError`] when the block does not start
    /// with the separator or has no `TEXT:` line.
    pub fn parse(block: &str) -> Result<Self> {
        let body = block
            .trim_start()
            .strip_prefix(ARTICLE_SEPARATOR)
            .ok_or_else(|| HarvestError::ConfigError("block does not start with the article separator".to_string()))?;

        let (header, text) = match body.split_once("\nTEXT:") {
            Some((header, text)) => (header, text),
            None => return Err(HarvestError::ConfigError("block has no TEXT: section".to_string())),
        };

        let mut parsed = Self {
            source_url: String::new(),
            title: String::new(),
            date_accessed: String::new(),
            text: text.trim().to_string(),
        };

        for line in header.lines() {
            if let Some((key, value)) = line.split_once(':') {
                let value = value.trim().to_string();
                match key.trim() {
                    "source_url" => parsed.source_url = value,
                    "title" => parsed.title = value,
                    "date_accessed" => parsed.date_accessed = value,
                    _ => {}
                }
            }
        }

        Ok(parsed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    fn article() -> Article {
        Article::new(
            "http://www.tabletenniscoaching.com/node/42",
            "Serve Tips",
            "  Toss the ball up.\nContact it low.\n",
        )
    }

    #[test]
    fn test_to_block_layout() {
        let block = article().to_block(date!(2025 - 03 - 07));

        assert_eq!(
            block,
            "===ARTICLE===\n\
             source_url: http://www.tabletenniscoaching.com/node/42\n\
             title: Serve Tips\n\
             date_accessed: 2025-03-07\n\
             TEXT:\n\
             Toss the ball up.\nContact it low.\n\n"
        );
    }

    #[test]
    fn test_missing_title_is_unknown() {
        let article = Article::new("https://www.pingskills.com/blog/x", "", "Body");
        assert!(article.to_block(date!(2025 - 01 - 01)).contains("\ntitle: Unknown\n"));
    }

    #[test]
    fn test_is_empty() {
        assert!(Article::new("u", "t", " \n ").is_empty());
        assert!(!article().is_empty());
    }

    #[test]
    fn test_written_batch_splits_back() {
        let mut out = Vec::new();
        let day = date!(2025 - 03 - 07);
        write_block(&mut out, &article(), day).unwrap();
        write_block(&mut out, &Article::new("https://www.pingskills.com/blog/y", "Footwork", "Move."), day).unwrap();

        let raw = String::from_utf8(out).unwrap();
        let blocks = split_batch(&raw);

        assert_eq!(blocks.len(), 2);
        assert!(blocks.iter().all(|b| b.starts_with("===ARTICLE===\n")));

        let second = ArticleBlock::parse(&blocks[1]).unwrap();
        assert_eq!(second.source_url, "https://www.pingskills.com/blog/y");
        assert_eq!(second.title, "Footwork");
        assert_eq!(second.date_accessed, "2025-03-07");
        assert_eq!(second.text, "Move.");
    }

    #[test]
    fn test_split_batch_ignores_blank_chunks() {
        assert!(split_batch("").is_empty());
        assert!(split_batch("===ARTICLE===\n\n===ARTICLE===").is_empty());
        assert_eq!(split_batch("stray text"), vec!["===ARTICLE===\nstray text"]);
    }

    #[test]
    fn test_parse_rejects_malformed_blocks() {
        assert!(ArticleBlock::parse("title: x\nTEXT:\nbody").is_err());
        assert!(ArticleBlock::parse("===ARTICLE===\ntitle: x").is_err());
    }

    #[test]
    fn test_source_url_with_colons_survives_parse() {
        let block = ArticleBlock::parse("===ARTICLE===\nsource_url: http://x.com:8080/a\nTEXT:\nbody").unwrap();
        assert_eq!(block.source_url, "http://x.com:8080/a");
    }
}
