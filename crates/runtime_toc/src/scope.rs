//! Which URLs the panel augments.
//!
//! In scope means exactly `https://{host}/{owner}/scraps/{id}`: three
//! non-empty path segments, the middle one literally `scraps`. A trailing
//! slash, query and fragment are tolerated; anything deeper is not.

use serde::Deserialize;
use url::Url;

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ScopePattern {
    pub host: String,
    pub section: String,
}

impl Default for ScopePattern {
    fn default() -> Self {
        Self {
            host: "zenn.dev".into(),
            section: "scraps".into(),
        }
    }
}

impl ScopePattern {
    pub fn for_host(host: &str) -> Self {
        Self {
            host: host.to_string(),
            ..Self::default()
        }
    }

    pub fn contains(&self, raw: &str) -> bool {
        let Some(url) = self.same_site(raw) else {
            return false;
        };
        let Some(segments) = url.path_segments() else {
            return false;
        };
        let mut segments = segments.collect::<Vec<_>>();
        if segments.len() == 4 && segments[3].is_empty() {
            segments.pop();
        }
        matches!(
            segments.as_slice(),
            [owner, section, id] if !owner.is_empty() && *section == self.section && !id.is_empty()
        )
    }

    /// Link targets on the augmented site, in or out of scope.
    pub fn is_same_site(&self, raw: &str) -> bool {
        self.same_site(raw).is_some()
    }

    fn same_site(&self, raw: &str) -> Option<Url> {
        let url = Url::parse(raw).ok()?;
        (url.scheme() == "https" && url.host_str() == Some(self.host.as_str())).then_some(url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pattern() -> ScopePattern {
        ScopePattern::for_host("example.dev")
    }

    #[test]
    fn scrap_page_is_in_scope() {
        assert!(pattern().contains("https://example.dev/alice/scraps/abc123"));
    }

    #[test]
    fn other_shapes_are_out_of_scope() {
        let p = pattern();
        assert!(!p.contains("https://example.dev/alice/articles/abc123"));
        assert!(!p.contains("https://example.dev/scraps/abc123"));
        assert!(!p.contains("https://other.dev/alice/scraps/abc123"));
        assert!(!p.contains("http://example.dev/alice/scraps/abc123"));
        assert!(!p.contains("https://example.dev/alice/scraps/"));
        assert!(!p.contains("https://example.dev/alice/scraps/abc123/edit"));
        assert!(!p.contains("not a url"));
    }

    #[test]
    fn trailing_slash_query_and_fragment_are_tolerated() {
        let p = pattern();
        assert!(p.contains("https://example.dev/alice/scraps/abc123/"));
        assert!(p.contains("https://example.dev/alice/scraps/abc123?tab=1"));
        assert!(p.contains("https://example.dev/alice/scraps/abc123#hello-world"));
    }

    #[test]
    fn same_site_check_ignores_path() {
        let p = pattern();
        assert!(p.is_same_site("https://example.dev/"));
        assert!(!p.is_same_site("https://evil.example/alice/scraps/x"));
        assert!(!p.is_same_site("/relative"));
    }
}
