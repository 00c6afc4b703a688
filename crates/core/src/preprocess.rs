/// Configuration for stripping page chrome before a page is queried
#[derive(Debug, Clone)]
pub struct PreprocessConfig {
    /// Whether to remove nav tags
    pub remove_nav: bool,
    /// Whether to remove header tags
    pub remove_header: bool,
    /// Whether to remove footer tags
    pub remove_footer: bool,
    /// Whether to remove script tags
    pub remove_scripts: bool,
    /// Whether to remove style tags
    pub remove_styles: bool,
    /// Whether to remove form tags
    pub remove_forms: bool,
    /// Whether to remove aside tags
    pub remove_asides: bool,
}

impl Default for PreprocessConfig {
    /// Section titles on TableTennisCoaching.com sit next to the `<header>`,
    /// so it is kept unless asked otherwise.
    fn default() -> Self {
        Self {
            remove_nav: true,
            remove_header: false,
            remove_footer: true,
            remove_scripts: true,
            remove_styles: true,
            remove_forms: true,
            remove_asides: true,
        }
    }
}

impl PreprocessConfig {
    /// Default chrome removal plus `<header>`.
    pub fn without_header() -> Self {
        Self { remove_header: true, ..Default::default() }
    }

    /// Tags whose elements are removed along with their content.
    pub fn removed_tags(&self) -> Vec<&'static str> {
        [
            (self.remove_nav, "nav"),
            (self.remove_header, "header"),
            (self.remove_footer, "footer"),
            (self.remove_scripts, "script"),
            (self.remove_styles, "style"),
            (self.remove_forms, "form"),
            (self.remove_asides, "aside"),
        ]
        .into_iter()
        .filter_map(|(enabled, tag)| enabled.then_some(tag))
        .collect()
    }
}

/// Strip page chrome (navigation, footers, scripts, forms...) from HTML
///
/// Rewriting failures leave the input untouched.
pub fn preprocess_html(html: &str, config: &PreprocessConfig) -> String {
    let tags = config.removed_tags();
    if tags.is_empty() {
        return html.to_string();
    }

    let mut output = String::with_capacity(html.len());
    let handlers = tags
        .iter()
        .map(|tag| {
            lol_html::element!(tag, |el| {
                el.remove();
                Ok(())
            })
        })
        .collect();

    let mut rewriter = lol_html::HtmlRewriter::new(
        lol_html::Settings { element_content_handlers: handlers, ..Default::default() },
        |c: &[u8]| output.push_str(&String::from_utf8_lossy(c)),
    );

    if rewriter.write(html.as_bytes()).is_err() || rewriter.end().is_err() {
        return html.to_string();
    }

    if output.is_empty() { html.to_string() } else { output }
}
