use chrono::{DateTime, Duration, SecondsFormat, Utc};
use log::{debug, warn};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, USER_AGENT};
use reqwest::Response;
use serde::de::IgnoredAny;
use serde::Deserialize;
use url::Url;

use crate::auth::Token;
use crate::error::{RepoPulseError, Result};

use super::types::{GitHubRepository, IssueStats, PullRequestStats};

/// Page size used when walking recent commits.
pub const COMMITS_PER_PAGE: u64 = 100;
/// Upper bound on commit pages fetched per repository.
pub const MAX_COMMIT_PAGES: u64 = 10;
/// Trailing window for `recent_commits_30d`.
pub const RECENT_COMMITS_DAYS: i64 = 30;

/// GitHub REST API client.
///
/// Built once with the identifying and authorization headers and then shared
/// read-only for every request of a batch.
pub struct GitHubClient {
    client: reqwest::Client,
    base_url: Url,
}

impl GitHubClient {
    /// Create a new GitHub API client.
    ///
    /// # Arguments
    ///
    /// * `base_url` - GitHub API base URL (e.g., "https://api.github.com")
    /// * `user_agent` - Value sent as `User-Agent`, which GitHub requires
    /// * `token` - Optional GitHub personal access token
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL is invalid, the token is not a valid
    /// header value, or the HTTP client cannot be built.
    pub fn new(base_url: &str, user_agent: &str, token: Option<Token>) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/vnd.github+json"),
        );
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(user_agent)
                .map_err(|e| RepoPulseError::Config(format!("Invalid user agent: {e}")))?,
        );

        if let Some(token) = token {
            let mut value = HeaderValue::from_str(&format!("Bearer {}", token.as_str()))
                .map_err(|e| RepoPulseError::Config(format!("Invalid token: {e}")))?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()
            .map_err(|e| RepoPulseError::Config(format!("Failed to create HTTP client: {e}")))?;

        // Keep a trailing slash so joins preserve paths like `/api/v3`.
        let normalized = if base_url.ends_with('/') {
            base_url.to_string()
        } else {
            format!("{base_url}/")
        };
        let base_url = Url::parse(&normalized)
            .map_err(|e| RepoPulseError::Config(format!("Invalid base URL: {e}")))?;

        Ok(Self { client, base_url })
    }

    /// URL of `repos/{repo}` or one of its sub-resources.
    pub fn repo_url(&self, repo: &str, resource: Option<&str>) -> Result<Url> {
        let path = match resource {
            Some(resource) => format!("repos/{repo}/{resource}"),
            None => format!("repos/{repo}"),
        };
        self.base_url
            .join(&path)
            .map_err(|e| RepoPulseError::Config(format!("Invalid repository URL: {e}")))
    }

    /// Issues a GET and turns any non-2xx status into [`RepoPulseError::Api`].
    pub(super) async fn get(&self, url: Url) -> Result<Response> {
        debug!("GET {url}");
        let response = self.client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read error response".to_string());
            return Err(RepoPulseError::Api {
                status: status.as_u16(),
                message: error_message(&body),
            });
        }

        Ok(response)
    }

    /// Fetches a list endpoint and returns how many items it holds.
    pub(super) async fn count_items(&self, url: Url) -> Result<u64> {
        let items: Vec<IgnoredAny> = self.get(url).await?.json().await?;
        Ok(items.len() as u64)
    }

    /// Fetches the core repository information.
    ///
    /// A body that is not a repository object fails with [`RepoPulseError::Json`].
    pub async fn fetch_repository(&self, repo: &str) -> Result<GitHubRepository> {
        let url = self.repo_url(repo, None)?;
        let body = self.get(url).await?.text().await?;
        Ok(serde_json::from_str(&body)?)
    }

    /// Number of contributors, or 0 when it cannot be determined.
    pub async fn contributors_count(&self, repo: &str) -> u64 {
        self.try_contributors_count(repo)
            .await
            .unwrap_or_else(|e| {
                warn!("Failed to count contributors for {repo}: {e}");
                0
            })
    }

    async fn try_contributors_count(&self, repo: &str) -> Result<u64> {
        let endpoint = self.repo_url(repo, Some("contributors"))?;
        self.count_matching(&endpoint, &[]).await
    }

    /// Number of commits since `now - 30 days`.
    ///
    /// Walks at most [`MAX_COMMIT_PAGES`] pages of [`COMMITS_PER_PAGE`] items, so
    /// very active repositories are undercounted past 1000 commits. Any failed
    /// request makes the whole count 0 rather than a partial sum.
    pub async fn recent_commits_count(&self, repo: &str, now: DateTime<Utc>) -> u64 {
        let since = now - Duration::days(RECENT_COMMITS_DAYS);
        self.try_recent_commits_count(repo, since)
            .await
            .unwrap_or_else(|e| {
                warn!("Failed to count recent commits for {repo}: {e}");
                0
            })
    }

    async fn try_recent_commits_count(&self, repo: &str, since: DateTime<Utc>) -> Result<u64> {
        let endpoint = self.repo_url(repo, Some("commits"))?;
        let since = since.to_rfc3339_opts(SecondsFormat::Secs, true);
        let per_page = COMMITS_PER_PAGE.to_string();

        let mut total = 0;
        for page in 1..=MAX_COMMIT_PAGES {
            let url = with_query(
                &endpoint,
                &[
                    ("since", since.as_str()),
                    ("per_page", per_page.as_str()),
                    ("page", page.to_string().as_str()),
                ],
            );
            let items = self.count_items(url).await?;
            total += items;

            if items < COMMITS_PER_PAGE {
                break;
            }
        }

        Ok(total)
    }

    /// Open, closed, estimated merged and total pull requests.
    pub async fn pull_request_stats(&self, repo: &str) -> PullRequestStats {
        match self.state_counts(repo, "pulls").await {
            Ok((open, closed)) => PullRequestStats::from_counts(open, closed),
            Err(e) => {
                warn!("Failed to fetch pull requests for {repo}: {e}");
                PullRequestStats::default()
            }
        }
    }

    /// Open, closed and total issues (pull requests included).
    pub async fn issue_stats(&self, repo: &str) -> IssueStats {
        match self.state_counts(repo, "issues").await {
            Ok((open, closed)) => IssueStats::from_counts(open, closed),
            Err(e) => {
                warn!("Failed to fetch issues for {repo}: {e}");
                IssueStats::default()
            }
        }
    }

    async fn state_counts(&self, repo: &str, resource: &str) -> Result<(u64, u64)> {
        let endpoint = self.repo_url(repo, Some(resource))?;
        let open = self.count_matching(&endpoint, &[("state", "open")]).await?;
        let closed = self.count_matching(&endpoint, &[("state", "closed")]).await?;
        Ok((open, closed))
    }

    /// Requests `endpoint` with `per_page=1` and counts through its pagination.
    ///
    /// Fails only when that first request fails; the counting step is best-effort.
    async fn count_matching(&self, endpoint: &Url, filters: &[(&str, &str)]) -> Result<u64> {
        let mut single_item_query = filters.to_vec();
        single_item_query.push(("per_page", "1"));

        let response = self.get(with_query(endpoint, &single_item_query)).await?;
        let headers = response.headers().clone();
        drop(response);

        let base_url = with_query(endpoint, filters);
        Ok(self.count_from_pagination(&headers, &base_url).await)
    }
}

fn with_query(endpoint: &Url, params: &[(&str, &str)]) -> Url {
    let mut url = endpoint.clone();
    if !params.is_empty() {
        url.query_pairs_mut().extend_pairs(params);
    }
    url
}

/// Extracts GitHub's `{"message": ...}` from an error body when present.
fn error_message(body: &str) -> String {
    #[derive(Deserialize)]
    struct ErrorBody {
        message: String,
    }

    serde_json::from_str::<ErrorBody>(body)
        .map(|parsed| parsed.message)
        .unwrap_or_else(|_| body.trim().to_string())
}
