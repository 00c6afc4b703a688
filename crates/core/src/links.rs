//! URL resolution and host filtering.

use std::collections::BTreeSet;

use url::Url;

/// Social and video hosts whose links are never collected.
pub const DEFAULT_BLOCKED_HOSTS: [&str; 9] = [
    "youtube.com",
    "www.youtube.com",
    "youtu.be",
    "twitter.com",
    "x.com",
    "facebook.com",
    "www.facebook.com",
    "instagram.com",
    "www.instagram.com",
];

/// A set of hostnames.
///
/// A URL matches when its host equals an entry or is a subdomain of one,
/// compared case-insensitively, so `m.youtube.com` matches `youtube.com`
/// but `notx.com` does not match `x.com`.
///
/// This is stricter than a substring test on the host: a substring test
/// would also drop `dropbox.com` for the entry `x.com`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HostSet {
    hosts: BTreeSet<String>,
}

/// Hosts whose links are dropped during harvesting.
pub type Blocklist = HostSet;

impl HostSet {
    pub fn new<I, S>(hosts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let hosts = hosts
            .into_iter()
            .map(|h| h.as_ref().trim().trim_end_matches('.').to_ascii_lowercase())
            .filter(|h| !h.is_empty())
            .collect();
        Self { hosts }
    }

    /// The social/video blocklist used by every crawl.
    pub fn social() -> Self {
        Self::new(DEFAULT_BLOCKED_HOSTS)
    }

    pub fn insert(&mut self, host: &str) {
        let host = host.trim().trim_end_matches('.').to_ascii_lowercase();
        if !host.is_empty() {
            self.hosts.insert(host);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.hosts.is_empty()
    }

    pub fn len(&self) -> usize {
        self.hosts.len()
    }

    /// Checks a bare hostname.
    pub fn matches_host(&self, host: &str) -> bool {
        let host = host.trim_end_matches('.').to_ascii_lowercase();
        self.hosts.iter().any(|entry| {
            host == *entry
                || host
                    .strip_suffix(entry.as_str())
                    .is_some_and(|prefix| prefix.ends_with('.'))
        })
    }

    /// Checks a URL's host. URLs without a host never match.
    pub fn matches(&self, url: &Url) -> bool {
        url.host_str().is_some_and(|host| self.matches_host(host))
    }

    /// Exact membership, no subdomain matching.
    pub fn contains_exact(&self, host: &str) -> bool {
        self.hosts.contains(&host.to_ascii_lowercase())
    }
}

impl<S: AsRef<str>> FromIterator<S> for HostSet {
    fn from_iter<T: IntoIterator<Item = S>>(iter: T) -> Self {
        Self::new(iter)
    }
}

/// Resolves an href against a base URL.
///
/// Returns `None` for empty or unresolvable references; those links are
/// skipped rather than failing the walk.
pub fn resolve_href(base: &Url, href: &str) -> Option<Url> {
    let trimmed = href.trim();
    if trimmed.is_empty() {
        return None;
    }
    base.join(trimmed).ok()
}

/// Lowercased host of a URL, empty when the URL has none.
pub fn host_of(url: &Url) -> String {
    url.host_str().unwrap_or_default().to_ascii_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("https://www.youtube.com/watch?v=1", true)]
    #[case("https://m.youtube.com/watch?v=1", true)]
    #[case("https://youtu.be/abc", true)]
    #[case("https://X.com/pingpong", true)]
    #[case("https://notx.com/", false)]
    #[case("https://www.dropbox.com/s/drill.pdf", false)]
    #[case("http://www.tabletenniscoaching.com/node/1", false)]
    #[case("mailto:coach@example.com", false)]
    fn test_social_blocklist(#[case] url: &str, #[case] blocked: bool) {
        let url = Url::parse(url).unwrap();
        assert_eq!(HostSet::social().matches(&url), blocked);
    }

    #[test]
    fn test_host_set_normalizes_entries() {
        let set: HostSet = ["  Example.COM. ", ""].into_iter().collect();
        assert_eq!(set.len(), 1);
        assert!(set.matches_host("example.com"));
        assert!(set.contains_exact("EXAMPLE.com"));
        assert!(!set.contains_exact("www.example.com"));
    }

    #[rstest]
    #[case("/a", Some("http://www.tabletenniscoaching.com/a"))]
    #[case("node/5", Some("http://www.tabletenniscoaching.com/node/5"))]
    #[case(" /b ", Some("http://www.tabletenniscoaching.com/b"))]
    #[case("https://pingskills.com/blog/x", Some("https://pingskills.com/blog/x"))]
    #[case("", None)]
    #[case("http://[bad", None)]
    fn test_resolve_href(#[case] href: &str, #[case] expected: Option<&str>) {
        let base = Url::parse("http://www.tabletenniscoaching.com/articles").unwrap();
        let resolved = resolve_href(&base, href);
        assert_eq!(resolved.as_ref().map(Url::as_str), expected);
    }
}
