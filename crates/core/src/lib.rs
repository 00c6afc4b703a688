pub mod article;
#[cfg(feature = "fetch")]
pub mod batch;
#[cfg(feature = "fetch")]
pub mod crawl;
pub mod error;
pub mod extract;
#[cfg(feature = "fetch")]
pub mod fetch;
pub mod harvest;
pub mod links;
pub mod marker;
pub mod parse;
pub mod preprocess;
#[cfg(feature = "process")]
pub mod process;
pub mod sites;
pub mod walk;

pub use article::{ARTICLE_SEPARATOR, Article, ArticleBlock, split_batch, write_block};
#[cfg(feature = "fetch")]
pub use batch::{ArticleInput, Submission, submit_batch};
#[cfg(feature = "fetch")]
pub use crawl::{CrawlReport, crawl_listing, crawl_pages, crawl_section};
pub use error::{HarvestError, Result};
pub use extract::{ArticleRules, BodyRule, extract_article};
#[cfg(feature = "fetch")]
pub use fetch::{FetchConfig, HttpSource, PageSource, fetch_file, fetch_stdin, fetch_url};
pub use harvest::{HarvestConfig, HarvestConfigBuilder, SectionHarvester, harvest_links};
pub use links::{Blocklist, HostSet};
pub use marker::{Marker, MatchTier, find_section_marker};
pub use parse::{Document, Element};
pub use preprocess::{PreprocessConfig, preprocess_html};
#[cfg(feature = "process")]
pub use process::{CommandRunner, ModelRunner, PromptTemplate, parse_model_output, persist_output, process_article};
pub use sites::{ListingCrawl, PagedCrawl, SectionCrawl};
pub use walk::{WalkOutcome, walk_until};
