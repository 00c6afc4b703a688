//! Article extraction from article pages.
//!
//! Each site gets an [`ArticleRules`] value naming where its title and body
//! live. Layouts drift, so every rule set carries fallback selectors that
//! are tried in order when the primary body rule finds nothing.

use crate::article::Article;
use crate::parse::{Document, Element};
use crate::Result;

/// Where an article body lives relative to the page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BodyRule {
    /// Every element matching the selector, in document order.
    All(String),

    /// Blocks inside the nearest `div` ancestor of the title that carries
    /// `container_class`.
    NearTitle { container_class: String, blocks: String },
}

/// Configuration for extracting one site's articles.
#[derive(Debug, Clone)]
pub struct ArticleRules {
    /// Selector for the title element; the first match wins.
    pub title: String,

    /// Primary body rule.
    pub body: BodyRule,

    /// Selectors tried in order when the body rule yields nothing; the first
    /// matching element's text is used.
    pub fallbacks: Vec<String>,

    /// Joins the text of multiple body blocks.
    pub separator: String,
}

impl ArticleRules {
    /// TableTennisCoaching.com node pages.
    pub fn table_tennis_coaching() -> Self {
        Self {
            title: "h1.node__title".to_string(),
            body: BodyRule::All(
                "div.node__content div.field--name-body div.field__items div.field__item".to_string(),
            ),
            fallbacks: vec!["div.node__content".to_string(), "article, main".to_string()],
            separator: "\n\n".to_string(),
        }
    }

    /// PingSkills blog posts.
    pub fn pingskills() -> Self {
        Self {
            title: "h1.text-center, h1".to_string(),
            body: BodyRule::NearTitle { container_class: "container".to_string(), blocks: "div.mb-3".to_string() },
            fallbacks: vec!["div.container .mb-3, article, main".to_string()],
            separator: "\n".to_string(),
        }
    }
}

/// Extracts title and body from a parsed article page.
///
/// # Errors
///
/// Returns [`crate::HarvestError::HtmlParseError`] if one of the configured
/// selectors is invalid. A page with no body is not an error; the returned
/// article is simply empty.
pub fn extract_article(doc: &Document, source_url: &str, rules: &ArticleRules) -> Result<Article> {
    let title_el = doc.select_first(&rules.title)?;
    let title = title_el.map(|el| el.joined_text("")).unwrap_or_default();

    let mut text = match &rules.body {
        BodyRule::All(selector) => join_blocks(&doc.select(selector)?, &rules.separator),
        BodyRule::NearTitle { container_class, blocks } => match title_el
            .and_then(|el| el.find_ancestor(|a| a.is("div") && a.has_class(container_class)))
        {
            Some(container) => join_blocks(&container.select(blocks)?, &rules.separator),
            None => String::new(),
        },
    };

    if text.is_empty() {
        for selector in &rules.fallbacks {
            if let Some(el) = doc.select_first(selector)? {
                text = el.text_lines();
                break;
            }
        }
    }

    Ok(Article::new(source_url, title, text.trim()))
}

fn join_blocks(blocks: &[Element<'_>], separator: &str) -> String {
    blocks
        .iter()
        .map(Element::text_lines)
        .collect::<Vec<_>>()
        .join(separator)
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    const TTC_ARTICLE: &str = r#"
        <html><body>
            <h1 class="node__title"> Backhand Banana Flip </h1>
            <div class="node__content">
                <div class="field--name-body"><div class="field__items">
                    <div class="field__item"><p>Step one.</p><p>Step <em>two</em>.</p></div>
                    <div class="field__item"><p>Summary.</p></div>
                </div></div>
            </div>
        </body></html>
    "#;

    #[test]
    fn test_ttc_blocks_are_joined() {
        let doc = Document::parse(TTC_ARTICLE).unwrap();
        let article = extract_article(&doc, "http://www.tabletenniscoaching.com/node/7", &ArticleRules::table_tennis_coaching())
            .unwrap();

        assert_eq!(article.title, "Backhand Banana Flip");
        assert_eq!(article.text, "Step one.\nStep\ntwo\n.\n\nSummary.");
        assert_eq!(article.source_url, "http://www.tabletenniscoaching.com/node/7");
    }

    #[test]
    fn test_ttc_falls_back_to_node_content() {
        let html = r#"<h1 class="node__title">Old Layout</h1><div class="node__content"><p>Legacy body</p></div>"#;
        let doc = Document::parse(html).unwrap();
        let article = extract_article(&doc, "u", &ArticleRules::table_tennis_coaching()).unwrap();

        assert_eq!(article.text, "Legacy body");
    }

    #[test]
    fn test_ttc_falls_back_to_main() {
        let html = r#"<main><p>Main body</p></main>"#;
        let doc = Document::parse(html).unwrap();
        let article = extract_article(&doc, "u", &ArticleRules::table_tennis_coaching()).unwrap();

        assert_eq!(article.title, "");
        assert_eq!(article.text, "Main body");
    }

    #[test]
    fn test_pingskills_body_near_title() {
        let html = r#"
            <div class="container"><div class="mb-3">Sidebar promo</div></div>
            <div class="container">
                <div class="row"><h1 class="text-center">Forehand Topspin</h1></div>
                <div class="mb-3">Bend your knees.</div>
                <div class="mb-3">Brush the ball.</div>
            </div>
        "#;
        let doc = Document::parse(html).unwrap();
        let article = extract_article(&doc, "https://www.pingskills.com/blog/x", &ArticleRules::pingskills()).unwrap();

        assert_eq!(article.title, "Forehand Topspin");
        assert_eq!(article.text, "Bend your knees.\nBrush the ball.");
    }

    #[test]
    fn test_pingskills_falls_back_without_title_container() {
        let html = r#"<h1>Loose Title</h1><article><p>Article body</p></article>"#;
        let doc = Document::parse(html).unwrap();
        let article = extract_article(&doc, "u", &ArticleRules::pingskills()).unwrap();

        assert_eq!(article.title, "Loose Title");
        assert_eq!(article.text, "Article body");
    }

    #[test]
    fn test_empty_page_is_empty_article() {
        let doc = Document::parse("<p>nothing relevant</p>").unwrap();
        let article = extract_article(&doc, "u", &ArticleRules::table_tennis_coaching()).unwrap();
        assert!(article.is_empty());
    }

    #[test]
    fn test_invalid_selector_is_an_error() {
        let doc = Document::parse(TTC_ARTICLE).unwrap();
        let rules = ArticleRules { title: "[[".to_string(), ..ArticleRules::table_tennis_coaching() };
        assert!(extract_article(&doc, "u", &rules).is_err());
    }
}
