//! Item counting from GitHub's `Link` pagination header.
//!
//! A query issued with `per_page=1` makes GitHub report the true item count as
//! the index of the `rel="last"` page. One extra request for that page then
//! gives an exact total in two requests instead of walking every page.

use log::{debug, warn};
use reqwest::header::{HeaderMap, LINK};
use url::Url;

use super::client::GitHubClient;

/// Page size GitHub applies when a request does not set `per_page`.
pub const DEFAULT_PER_PAGE: u64 = 30;

/// Location and geometry of the final page of a paginated query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LastPage {
    pub url: Url,
    pub page: u64,
    pub per_page: u64,
}

impl LastPage {
    /// Parses the `rel="last"` target out of a `Link` header value.
    ///
    /// Returns `None` for anything malformed: a missing last relation, an
    /// unparsable URL, a missing or non-numeric `page`, or a non-numeric
    /// `per_page`. Callers treat that as "no pagination metadata".
    pub fn from_link_header(header: &str) -> Option<Self> {
        let target = last_link_target(header)?;
        let url = Url::parse(target).ok()?;

        let page = query_param(&url, "page")?.parse::<u64>().ok()?;
        if page == 0 {
            return None;
        }

        let per_page = match query_param(&url, "per_page") {
            Some(value) => value.parse::<u64>().ok()?,
            None => DEFAULT_PER_PAGE,
        };

        Some(Self {
            url,
            page,
            per_page,
        })
    }

    /// Total item count given how many items the last page holds.
    pub fn total_with(&self, items_on_last_page: u64) -> u64 {
        (self.page - 1)
            .saturating_mul(self.per_page)
            .saturating_add(items_on_last_page)
    }
}

/// Returns the URL between angle brackets of the `rel="last"` segment.
fn last_link_target(header: &str) -> Option<&str> {
    header.split(',').find_map(|segment| {
        let mut parts = segment.split(';');
        let target = parts.next()?.trim();
        if !parts.any(|param| param.trim() == r#"rel="last""#) {
            return None;
        }
        target.strip_prefix('<')?.strip_suffix('>')
    })
}

fn query_param(url: &Url, name: &str) -> Option<String> {
    url.query_pairs()
        .find(|(key, _)| key == name)
        .map(|(_, value)| value.into_owned())
}

impl GitHubClient {
    /// Counts the items a query matches across all of its pages.
    ///
    /// `headers` come from the query issued with `per_page=1`; `base_url` is the
    /// same query without pagination parameters. Uses the last-page link when
    /// present and falls back to counting a single default-sized page of
    /// `base_url`. Never fails: a request failure on the fallback yields 0.
    ///
    /// A last-page link pointing at another origin than `base_url` is not
    /// followed, since requests carry the client's authorization header.
    pub async fn count_from_pagination(&self, headers: &HeaderMap, base_url: &Url) -> u64 {
        let last_page = headers
            .get(LINK)
            .and_then(|value| value.to_str().ok())
            .and_then(LastPage::from_link_header)
            .filter(|last_page| {
                let same_origin = last_page.url.origin() == base_url.origin();
                if !same_origin {
                    warn!("Ignoring last page link to foreign origin: {}", last_page.url);
                }
                same_origin
            });

        if let Some(last_page) = last_page {
            match self.count_items(last_page.url.clone()).await {
                Ok(items) => return last_page.total_with(items),
                Err(e) => debug!(
                    "Last page request {} failed ({e}), counting first page instead",
                    last_page.url
                ),
            }
        }

        match self.count_items(base_url.clone()).await {
            Ok(items) => items,
            Err(e) => {
                debug!("Fallback count for {base_url} failed: {e}");
                0
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_last_page_among_segments() {
        let header = r#"<https://api.github.com/repositories/1/issues?state=open&per_page=1&page=2>; rel="next", <https://api.github.com/repositories/1/issues?state=open&per_page=1&page=57>; rel="last""#;

        let last = LastPage::from_link_header(header).unwrap();
        assert_eq!(last.page, 57);
        assert_eq!(last.per_page, 1);
        assert_eq!(last.url.path(), "/repositories/1/issues");
        assert_eq!(last.total_with(1), 57);
    }

    #[test]
    fn test_page_is_not_confused_with_per_page() {
        let header = r#"<https://api.github.com/repos/o/r/pulls?per_page=1&page=9>; rel="last""#;
        let last = LastPage::from_link_header(header).unwrap();
        assert_eq!(last.page, 9);
        assert_eq!(last.per_page, 1);
    }

    #[test]
    fn test_per_page_defaults_to_thirty() {
        let header = r#"<https://api.github.com/repos/o/r/contributors?page=4>; rel="last""#;
        let last = LastPage::from_link_header(header).unwrap();
        assert_eq!(last.per_page, DEFAULT_PER_PAGE);
        assert_eq!(last.total_with(12), 102);
    }

    #[test]
    fn test_total_from_page_five_of_thirty() {
        let header = r#"<https://api.github.com/repos/o/r/issues?state=closed&page=5&per_page=30>; rel="last""#;
        let last = LastPage::from_link_header(header).unwrap();
        assert_eq!(last.total_with(7), 127);
    }

    #[test]
    fn test_no_last_relation() {
        let header = r#"<https://api.github.com/repos/o/r/issues?page=2>; rel="next""#;
        assert!(LastPage::from_link_header(header).is_none());
    }

    #[test]
    fn test_malformed_links_are_rejected() {
        let cases = [
            "",
            "garbage",
            r#"https://api.github.com/repos/o/r/issues?page=3; rel="last""#,
            r#"<not a url>; rel="last""#,
            r#"<https://api.github.com/repos/o/r/issues?page=abc>; rel="last""#,
            r#"<https://api.github.com/repos/o/r/issues?page=3&per_page=many>; rel="last""#,
            r#"<https://api.github.com/repos/o/r/issues?per_page=30>; rel="last""#,
            r#"<https://api.github.com/repos/o/r/issues?page=0>; rel="last""#,
        ];

        for header in cases {
            assert!(
                LastPage::from_link_header(header).is_none(),
                "expected no last page for {header:?}"
            );
        }
    }
}
