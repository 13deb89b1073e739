//! Detection of allow-listed deep links in messages without structured data.

use std::sync::LazyLock;

use regex::Regex;

/// A web URL: `http(s)://` or a bare `www.` host, then everything up to a
/// line break, quote, angle bracket or whitespace.
static WEB_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)\b(?:https?://|www\.)[^\s"'<>^]+"#).expect("valid regex")
});

/// One allow-listed URL occurrence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlMatch {
    /// Byte range of the URL in the scanned string.
    pub start: usize,
    pub end: usize,
    /// The URL with HTML entities decoded.
    pub url: String,
}

/// URL fragments eligible for "load cards" enrichment.
#[derive(Debug, Clone, Default)]
pub struct Allowlist {
    entries: Vec<String>,
}

impl Allowlist {
    pub fn new<S: Into<String>>(entries: impl IntoIterator<Item = S>) -> Self {
        Self {
            entries: entries
                .into_iter()
                .map(Into::into)
                .filter(|e: &String| !e.trim().is_empty())
                .collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Membership is a substring test against every entry.
    pub fn allows(&self, url: &str) -> bool {
        self.entries.iter().any(|entry| url.contains(entry.as_str()))
    }

    /// Every allow-listed URL occurrence in `haystack`, in order.
    pub fn matches(&self, haystack: &str) -> Vec<UrlMatch> {
        if self.is_empty() {
            return Vec::new();
        }
        WEB_URL
            .find_iter(haystack)
            .filter_map(|m| {
                let url = html_escape::decode_html_entities(m.as_str()).into_owned();
                self.allows(&url).then_some(UrlMatch {
                    start: m.start(),
                    end: m.end(),
                    url,
                })
            })
            .collect()
    }

    /// Distinct allow-listed URLs across `sources`, first-seen order.
    pub fn find_urls(&self, sources: &[&str]) -> Vec<String> {
        let mut urls: Vec<String> = Vec::new();
        for source in sources {
            for m in self.matches(source) {
                if !urls.contains(&m.url) {
                    urls.push(m.url);
                }
            }
        }
        urls
    }
}
