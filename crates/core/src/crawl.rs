//! Sequential crawls that turn site pages into article blocks.
//!
//! Every crawl fetches one page at a time through a [`PageSource`] and
//! sleeps the configured pause between fetches. Parsed documents never
//! live across an `.await`; each page is parsed and reduced to plain data
//! in a synchronous helper.
//!
//! Per-article failures are logged and counted, never fatal. Failing to
//! read the index page (or to find its start marker) aborts the crawl.

use std::collections::HashSet;
use std::fs;
use std::io::Write;
use std::time::Duration;

use time::Date;
use tracing::{debug, error, info, warn};
use url::Url;

use crate::article::{Article, write_block};
use crate::extract::{ArticleRules, extract_article};
use crate::fetch::PageSource;
use crate::harvest::{HarvestConfig, harvest_links};
use crate::links::{host_of, resolve_href};
use crate::marker::marker_labels;
use crate::parse::Document;
use crate::preprocess::PreprocessConfig;
use crate::sites::{ListingCrawl, PagedCrawl, SectionCrawl};
use crate::{HarvestError, Result};

const MARKER_DEBUG_LIMIT: usize = 60;
const TITLE_LOG_WIDTH: usize = 80;

/// What a crawl did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CrawlReport {
    /// Candidate articles found (links or posts).
    pub discovered: usize,
    /// Blocks written.
    pub written: usize,
    /// Articles with an empty body.
    pub skipped: usize,
    /// Articles that could not be fetched or extracted.
    pub failed: usize,
    /// Links outside the allowed hosts, reported instead of fetched.
    pub external: Vec<Url>,
}

/// Harvests the configured section of the index page and writes every
/// internal article it links to.
///
/// # Errors
///
/// Fails when the index cannot be fetched or parsed, when the start marker
/// is missing, or when writing to `out` fails.
pub async fn crawl_section<S, W>(source: &S, crawl: &SectionCrawl, date_accessed: Date, out: &mut W) -> Result<CrawlReport>
where
    S: PageSource,
    W: Write,
{
    let index_url = parse_url(&crawl.index_url)?;
    let html = source.fetch(&index_url).await?;
    let links = section_links(&html, &index_url, crawl)?;

    let (internal, external): (Vec<Url>, Vec<Url>) = links
        .into_iter()
        .partition(|url| crawl.allowed_hosts.contains_exact(&host_of(url)));

    let stop = crawl.stop_label.as_deref().unwrap_or("the end of the page");
    info!(
        "Discovered {} links between '{}' and before '{}'.",
        internal.len() + external.len(),
        crawl.start_label,
        stop
    );
    info!("- Internal (to fetch): {}", internal.len());
    info!("- External (skipped for now): {}", external.len());

    let mut report = fetch_articles(
        source,
        &internal,
        &crawl.article,
        &crawl.preprocess,
        crawl.pause,
        date_accessed,
        out,
    )
    .await?;
    report.discovered += external.len();
    report.external = external;

    Ok(report)
}

/// Walks the archive pages, writing every post found on them.
///
/// # Errors
///
/// Only write failures are errors. A page that cannot be fetched ends the
/// crawl with what was written so far.
pub async fn crawl_pages<S, W>(source: &S, crawl: &PagedCrawl, date_accessed: Date, out: &mut W) -> Result<CrawlReport>
where
    S: PageSource,
    W: Write,
{
    let mut report = CrawlReport::default();
    let mut seen: HashSet<String> = HashSet::new();
    let mut page_n = 0usize;

    loop {
        if crawl.max_pages.is_some_and(|max| page_n >= max) {
            break;
        }

        let index_url = crawl.page_url(page_n);
        let posts = match parse_url(&index_url) {
            Ok(url) => match source.fetch(&url).await {
                Ok(html) => collect_posts(&html, &url, crawl),
                Err(e) => Err(e),
            },
            Err(e) => Err(e),
        };
        let posts = match posts {
            Ok(posts) => posts,
            Err(e) => {
                error!("index page {page_n} ({index_url}) -> {e}");
                break;
            }
        };

        if posts.is_empty() {
            debug!("No posts on page {page_n}; stopping.");
            break;
        }

        for (i, post) in posts.iter().enumerate() {
            let i = i + 1;
            if !seen.insert(post.source_url.clone()) {
                debug!("Duplicate URL (skipping): {}", post.source_url);
                continue;
            }
            report.discovered += 1;

            write_block(out, post, date_accessed)?;
            info!("{page_n:03}:{i:02}  OK  {}", short_title(&post.title));
            report.written += 1;
            tokio::time::sleep(crawl.pause).await;
        }

        page_n += 1;
        tokio::time::sleep(crawl.pause).await;
    }

    Ok(report)
}

/// Collects article links from the listing page and writes each article.
///
/// # Errors
///
/// Fails when the listing cannot be fetched or parsed, or when writing to
/// `out` fails.
pub async fn crawl_listing<S, W>(source: &S, crawl: &ListingCrawl, date_accessed: Date, out: &mut W) -> Result<CrawlReport>
where
    S: PageSource,
    W: Write,
{
    let index_url = parse_url(&crawl.index_url)?;
    let html = source.fetch(&index_url).await?;
    let links = listing_links(&html, &index_url, crawl)?;

    info!("Found {} candidate links.", links.len());

    fetch_articles(
        source,
        &links,
        &crawl.article,
        &crawl.preprocess,
        crawl.pause,
        date_accessed,
        out,
    )
    .await
}

/// Harvests the section links of an already fetched index page.
pub fn section_links(html: &str, index_url: &Url, crawl: &SectionCrawl) -> Result<Vec<Url>> {
    let doc = Document::parse_with_preprocessing(html, Some(index_url.clone()), &crawl.preprocess)?;

    if let Some(dir) = &crawl.debug_dir {
        fs::create_dir_all(dir)?;
        fs::write(dir.join("debug_index.html"), doc.as_string())?;
        let labels = marker_labels(&doc);
        debug!(
            "<p><strong>...</strong></p> texts: {:?}",
            &labels[..labels.len().min(MARKER_DEBUG_LIMIT)]
        );
    }

    let mut builder = HarvestConfig::builder(crawl.start_label.clone())
        .base(index_url.clone())
        .blocked_hosts(crawl.blocked_hosts.clone());
    if let Some(stop) = &crawl.stop_label {
        builder = builder.stop_label(stop.clone());
    }
    if let Some(max) = crawl.max_links {
        builder = builder.max_links(max);
    }

    harvest_links(&doc, &builder.build())
}

/// Collects the article links of an already fetched listing page.
pub fn listing_links(html: &str, index_url: &Url, crawl: &ListingCrawl) -> Result<Vec<Url>> {
    let doc = Document::parse_with_preprocessing(html, Some(index_url.clone()), &crawl.preprocess)?;
    let index_host = host_of(index_url);

    let mut links = Vec::new();
    let mut seen: HashSet<String> = HashSet::new();

    for anchor in doc.select(&crawl.link_selector)? {
        let Some(url) = anchor.attr("href").and_then(|href| resolve_href(index_url, href)) else {
            continue;
        };
        if crawl.blocked_hosts.matches(&url) {
            continue;
        }
        if host_of(&url) != index_host {
            continue;
        }
        if !url.path().starts_with(&crawl.path_prefix) {
            continue;
        }
        if seen.insert(url.as_str().to_string()) {
            links.push(url);
        }
    }

    if let Some(max) = crawl.max_links {
        links.truncate(max);
    }

    Ok(links)
}

/// Reads the posts of one archive page.
pub fn collect_posts(html: &str, page_url: &Url, crawl: &PagedCrawl) -> Result<Vec<Article>> {
    let doc = Document::parse_with_preprocessing(html, Some(page_url.clone()), &crawl.preprocess)?;
    let mut posts = Vec::new();

    for row in doc.select(&crawl.row_selector)? {
        let mut link = None;
        for selector in &crawl.title_selectors {
            if let Some(found) = row.select_first(selector)? {
                link = Some(found);
                break;
            }
        }
        let Some(link) = link else {
            debug!("No title link on {page_url}");
            continue;
        };

        let Some(node_url) = link.attr("href").and_then(|href| resolve_href(page_url, href)) else {
            continue;
        };
        let host = host_of(&node_url);
        if !host.is_empty() && !crawl.allowed_hosts.contains_exact(&host) {
            continue;
        }

        let mut body = None;
        for selector in &crawl.body_selectors {
            if let Some(found) = row.select_first(selector)? {
                body = Some(found);
                break;
            }
        }
        let text = body.unwrap_or(row).text_lines();
        if text.trim().is_empty() {
            debug!("Empty body on {node_url}");
            continue;
        }

        posts.push(Article::new(node_url.as_str(), link.joined_text(""), text.trim()));
    }

    Ok(posts)
}

async fn fetch_articles<S, W>(
    source: &S, links: &[Url], rules: &ArticleRules, preprocess: &PreprocessConfig, pause: Duration,
    date_accessed: Date, out: &mut W,
) -> Result<CrawlReport>
where
    S: PageSource,
    W: Write,
{
    let mut report = CrawlReport { discovered: links.len(), ..Default::default() };
    let total = links.len();

    for (i, url) in links.iter().enumerate() {
        let i = i + 1;
        let article = match source.fetch(url).await {
            Ok(html) => read_article(&html, url, rules, preprocess),
            Err(e) => Err(e),
        };

        match article {
            Ok(article) if article.is_empty() => {
                warn!("{i:03}/{total}  SKIP (no body)  {url}");
                report.skipped += 1;
            }
            Ok(article) => {
                write_block(out, &article, date_accessed)?;
                info!("{i:03}/{total}  OK  {}", short_title(&article.title));
                report.written += 1;
            }
            Err(e) => {
                warn!("{i:03}/{total}  ERROR  {url} -> {e}");
                report.failed += 1;
            }
        }

        tokio::time::sleep(pause).await;
    }

    Ok(report)
}

fn read_article(html: &str, url: &Url, rules: &ArticleRules, preprocess: &PreprocessConfig) -> Result<Article> {
    let doc = Document::parse_with_preprocessing(html, Some(url.clone()), preprocess)?;
    extract_article(&doc, url.as_str(), rules)
}

fn parse_url(url: &str) -> Result<Url> {
    Url::parse(url).map_err(|e| HarvestError::InvalidUrl(format!("{url}: {e}")))
}

fn short_title(title: &str) -> String {
    title.chars().take(TITLE_LOG_WIDTH).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_listing_links_filters_and_dedupes() {
        let html = r#"
            <div class="regular-blogs">
                <a href="/blog/one">One</a>
                <a href="/blog/one">One again</a>
                <a href="/blog/two">Two</a>
                <a href="https://www.youtube.com/blog/video">Video</a>
            </div>
            <div class="sidebar"><a href="/blog/three">Not in grid</a></div>
        "#;
        let index = Url::parse("https://www.pingskills.com/blog").unwrap();
        let links = listing_links(html, &index, &ListingCrawl::default()).unwrap();
        let links: Vec<&str> = links.iter().map(Url::as_str).collect();

        assert_eq!(
            links,
            vec!["https://www.pingskills.com/blog/one", "https://www.pingskills.com/blog/two"]
        );
    }

    #[test]
    fn test_listing_links_respects_max() {
        let html = r#"<div class="regular-blogs"><a href="/blog/a">A</a><a href="/blog/b">B</a></div>"#;
        let index = Url::parse("https://www.pingskills.com/blog").unwrap();
        let crawl = ListingCrawl { max_links: Some(1), ..Default::default() };

        assert_eq!(listing_links(html, &index, &crawl).unwrap().len(), 1);
    }

    #[test]
    fn test_collect_posts_uses_fallbacks() {
        let html = r#"
            <div class="view-content">
                <div class="views-row">
                    <div class="views-field views-field-title"><h1 class="field-content"><a href="/node/10"> Tip A </a></h1></div>
                    <div class="views-field views-field-body"><div class="field-content"><p>Body A</p></div></div>
                </div>
                <div class="views-row">
                    <div class="views-field views-field-title"><h2 class="field-content"><a href="/node/11">Tip B</a></h2></div>
                    <div class="views-field views-field-body"><p>Body B</p></div>
                </div>
                <div class="views-row"><p>No title here</p></div>
                <div class="views-row">
                    <div class="views-field views-field-title"><h1 class="field-content"><a href="https://elsewhere.com/x">Away</a></h1></div>
                </div>
            </div>
        "#;
        let page = Url::parse("http://www.tabletenniscoaching.com/TipOfTheWeek?page=0").unwrap();
        let posts = collect_posts(html, &page, &PagedCrawl::default()).unwrap();

        assert_eq!(posts.len(), 2);
        assert_eq!(posts[0].source_url, "http://www.tabletenniscoaching.com/node/10");
        assert_eq!(posts[0].title, "Tip A");
        assert_eq!(posts[0].text, "Body A");
        assert_eq!(posts[1].title, "Tip B");
        assert_eq!(posts[1].text, "Body B");
    }

    #[test]
    fn test_section_links_writes_debug_dump() {
        let dir = tempfile::tempdir().unwrap();
        let crawl = SectionCrawl { debug_dir: Some(dir.path().to_path_buf()), ..Default::default() };
        let index = Url::parse(&crawl.index_url).unwrap();
        let html = r#"<p><strong>Improving</strong></p><ul><li><a href="/node/1">One</a></li></ul>"#;

        let links = section_links(html, &index, &crawl).unwrap();

        assert_eq!(links.len(), 1);
        assert!(dir.path().join("debug_index.html").exists());
    }

    #[test]
    fn test_short_title() {
        let long = "x".repeat(200);
        assert_eq!(short_title(&long).len(), TITLE_LOG_WIDTH);
        assert_eq!(short_title("Short"), "Short");
    }
}
