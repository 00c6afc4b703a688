//! Crawls run against saved pages served from memory.
use std::collections::HashMap;
use std::time::Duration;

use time::macros::date;
use ttharvest_core::*;
use url::Url;

fn fixture(name: &str) -> String {
    std::fs::read_to_string(format!("../../tests/fixtures/{}", name)).unwrap()
}

#[derive(Default)]
struct CannedSource {
    pages: HashMap<String, String>,
}

impl CannedSource {
    fn page(mut self, url: &str, fixture_name: &str) -> Self {
        self.pages.insert(url.to_string(), fixture(fixture_name));
        self
    }
}

impl PageSource for CannedSource {
    async fn fetch(&self, url: &Url) -> Result<String> {
        self.pages
            .get(url.as_str())
            .cloned()
            .ok_or_else(|| HarvestError::InvalidUrl(format!("no canned page for {url}")))
    }
}

fn blocks(out: Vec<u8>) -> Vec<ArticleBlock> {
    split_batch(&String::from_utf8(out).unwrap())
        .iter()
        .map(|b| ArticleBlock::parse(b).unwrap())
        .collect()
}

#[tokio::test]
async fn test_section_crawl_writes_internal_articles() {
    let source = CannedSource::default()
        .page("http://www.tabletenniscoaching.com/articles", "ttc_articles_index.html")
        .page("http://www.tabletenniscoaching.com/node/201", "ttc_article.html");
    let crawl = SectionCrawl { pause: Duration::ZERO, ..Default::default() };
    let mut out = Vec::new();

    let report = crawl_section(&source, &crawl, date!(2025 - 11 - 02), &mut out).await.unwrap();

    assert_eq!(report.discovered, 4);
    assert_eq!(report.written, 1);
    assert_eq!(report.failed, 2);
    assert_eq!(report.skipped, 0);
    assert_eq!(report.external.len(), 1);
    assert_eq!(report.external[0].as_str(), "https://www.usatt.org/coaching/serve");

    let blocks = blocks(out);
    assert_eq!(blocks.len(), 1);
    assert_eq!(blocks[0].source_url, "http://www.tabletenniscoaching.com/node/201");
    assert_eq!(blocks[0].title, "Ten Steps to a Great Forehand");
    assert_eq!(blocks[0].date_accessed, "2025-11-02");
    assert!(blocks[0].text.starts_with("Start in a balanced ready stance."));
    assert!(blocks[0].text.ends_with("Finish with the racket near the forehead."));
}

#[tokio::test]
async fn test_section_crawl_max_links() {
    let source = CannedSource::default()
        .page("http://www.tabletenniscoaching.com/articles", "ttc_articles_index.html")
        .page("http://www.tabletenniscoaching.com/node/201", "ttc_article.html");
    let crawl = SectionCrawl { pause: Duration::ZERO, max_links: Some(1), ..Default::default() };
    let mut out = Vec::new();

    let report = crawl_section(&source, &crawl, date!(2025 - 11 - 02), &mut out).await.unwrap();

    assert_eq!(report.discovered, 1);
    assert_eq!(report.written, 1);
    assert!(report.external.is_empty());
}

#[tokio::test]
async fn test_section_crawl_missing_start_aborts() {
    let source = CannedSource::default().page("http://www.tabletenniscoaching.com/articles", "ttc_article.html");
    let crawl = SectionCrawl { pause: Duration::ZERO, ..Default::default() };
    let mut out = Vec::new();

    let result = crawl_section(&source, &crawl, date!(2025 - 11 - 02), &mut out).await;

    assert!(matches!(result, Err(HarvestError::SectionNotFound { .. })));
    assert!(out.is_empty());
}

#[tokio::test]
async fn test_paged_crawl_dedupes_and_stops_on_missing_page() {
    let source = CannedSource::default()
        .page("http://www.tabletenniscoaching.com/TipOfTheWeek?page=0", "ttc_tips_page0.html")
        .page("http://www.tabletenniscoaching.com/TipOfTheWeek?page=1", "ttc_tips_page1.html");
    let crawl = PagedCrawl { pause: Duration::ZERO, ..Default::default() };
    let mut out = Vec::new();

    let report = crawl_pages(&source, &crawl, date!(2025 - 11 - 02), &mut out).await.unwrap();

    assert_eq!(report.written, 3);
    let blocks = blocks(out);
    let titles: Vec<&str> = blocks.iter().map(|b| b.title.as_str()).collect();
    assert_eq!(titles, vec!["Serve Short to the Forehand", "Watch the Ball", "Relax Between Points"]);
    assert_eq!(
        blocks[0].text,
        "A short serve to the forehand pulls your opponent in.\nFollow it with a deep serve to the backhand."
    );
}

#[tokio::test]
async fn test_paged_crawl_max_pages() {
    let source = CannedSource::default()
        .page("http://www.tabletenniscoaching.com/TipOfTheWeek?page=0", "ttc_tips_page0.html")
        .page("http://www.tabletenniscoaching.com/TipOfTheWeek?page=1", "ttc_tips_page1.html");
    let crawl = PagedCrawl { pause: Duration::ZERO, max_pages: Some(1), ..Default::default() };
    let mut out = Vec::new();

    let report = crawl_pages(&source, &crawl, date!(2025 - 11 - 02), &mut out).await.unwrap();

    assert_eq!(report.written, 2);
}

#[tokio::test]
async fn test_listing_crawl_counts_outcomes() {
    let source = CannedSource::default()
        .page("https://www.pingskills.com/blog", "pingskills_blog.html")
        .page("https://www.pingskills.com/blog/forehand-topspin-against-backspin", "pingskills_post.html")
        .page("https://www.pingskills.com/blog/empty-post", "pingskills_empty_post.html");
    let crawl = ListingCrawl { pause: Duration::ZERO, ..Default::default() };
    let mut out = Vec::new();

    let report = crawl_listing(&source, &crawl, date!(2025 - 11 - 02), &mut out).await.unwrap();

    assert_eq!(report.discovered, 3);
    assert_eq!(report.written, 1);
    assert_eq!(report.skipped, 1);
    assert_eq!(report.failed, 1);

    let blocks = blocks(out);
    assert_eq!(blocks[0].title, "Forehand Topspin Against Backspin");
    assert_eq!(blocks[0].text, "Drop your racket below the ball.\nLift up and forward through contact.");
}
