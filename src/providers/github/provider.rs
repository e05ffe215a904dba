use chrono::{DateTime, Utc};
use log::{info, warn};

use crate::auth::Token;
use crate::error::Result;
use crate::metrics::{fetched_stamp, RepositoryMetrics, UNKNOWN_LANGUAGE};

use super::client::GitHubClient;
use super::types::GitHubRepository;

/// Collects [`RepositoryMetrics`] for GitHub repositories.
///
/// Owns the API client; repositories are fetched one at a time and nothing is
/// retained between them.
pub struct MetricsFetcher {
    client: GitHubClient,
}

impl MetricsFetcher {
    /// Create a new metrics fetcher.
    ///
    /// # Arguments
    ///
    /// * `base_url` - GitHub API base URL
    /// * `user_agent` - Identifying `User-Agent` header value
    /// * `token` - Optional GitHub personal access token
    pub fn new(base_url: &str, user_agent: &str, token: Option<Token>) -> Result<Self> {
        let client = GitHubClient::new(base_url, user_agent, token)?;
        Ok(Self { client })
    }

    /// Fetches every metric for `repo` (in `owner/name` form).
    ///
    /// Never fails. If the core repository query fails the result is an
    /// all-zero record carrying the error; each category after that degrades
    /// to zero on its own without affecting the others.
    pub async fn fetch(&self, repo: &str) -> RepositoryMetrics {
        self.fetch_at(repo, Utc::now()).await
    }

    /// Like [`fetch`](Self::fetch) with an explicit fetch time, used for the
    /// recent-commits window and for `last_fetched`.
    pub async fn fetch_at(&self, repo: &str, now: DateTime<Utc>) -> RepositoryMetrics {
        if let Err(message) = validate_repo(repo) {
            warn!("Skipping {repo}: {message}");
            return RepositoryMetrics::failed(repo, message, now);
        }

        info!("Fetching metrics for {repo}");

        let core = match self.client.fetch_repository(repo).await {
            Ok(core) => core,
            Err(e) => {
                warn!("Error fetching data for {repo}: {e}");
                return RepositoryMetrics::failed(repo, e.to_string(), now);
            }
        };

        let contributors = self.client.contributors_count(repo).await;
        let recent_commits = self.client.recent_commits_count(repo, now).await;
        let prs = self.client.pull_request_stats(repo).await;
        let issues = self.client.issue_stats(repo).await;

        let GitHubRepository {
            stargazers_count,
            forks_count,
            watchers_count,
            size,
            language,
            created_at,
            updated_at,
        } = core;

        RepositoryMetrics {
            repo: repo.to_string(),
            stars: stargazers_count,
            forks: forks_count,
            watchers: watchers_count,
            contributors,
            open_issues: issues.open,
            total_issues: issues.total,
            closed_issues: issues.closed,
            open_prs: prs.open,
            total_prs: prs.total,
            closed_prs: prs.closed,
            merged_prs: prs.merged,
            recent_commits_30d: recent_commits,
            size_kb: size,
            language: language.unwrap_or_else(|| UNKNOWN_LANGUAGE.to_string()),
            created_at: created_at.unwrap_or_default(),
            updated_at: updated_at.unwrap_or_default(),
            last_fetched: fetched_stamp(now),
            error: None,
        }
    }
}

fn validate_repo(repo: &str) -> std::result::Result<(), String> {
    let mut parts = repo.split('/');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(owner), Some(name), None) if !owner.is_empty() && !name.is_empty() => Ok(()),
        _ => Err("Repository must be in format 'owner/name'".to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_repo() {
        assert!(validate_repo("octo/demo").is_ok());
        assert!(validate_repo("octo").is_err());
        assert!(validate_repo("octo/demo/extra").is_err());
        assert!(validate_repo("/demo").is_err());
        assert!(validate_repo("octo/").is_err());
    }
}
