use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Language reported when the platform has not detected one.
pub const UNKNOWN_LANGUAGE: &str = "Unknown";

/// Normalized metrics for one tracked repository.
///
/// Field order matches the CSV column order. A record is assembled once per
/// fetch cycle and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositoryMetrics {
    pub repo: String,
    pub stars: u64,
    pub forks: u64,
    pub watchers: u64,
    pub contributors: u64,
    pub open_issues: u64,
    pub total_issues: u64,
    pub closed_issues: u64,
    pub open_prs: u64,
    pub total_prs: u64,
    pub closed_prs: u64,
    /// Estimated, see [`PullRequestStats::from_counts`](crate::providers::github::PullRequestStats::from_counts).
    pub merged_prs: u64,
    pub recent_commits_30d: u64,
    pub size_kb: u64,
    pub language: String,
    pub created_at: String,
    pub updated_at: String,
    pub last_fetched: String,
    /// Set only when the core repository query failed. Not persisted.
    #[serde(skip)]
    pub error: Option<String>,
}

impl RepositoryMetrics {
    /// Builds the all-zero record returned when the core repository query fails.
    pub fn failed(repo: &str, error: impl Into<String>, fetched_at: DateTime<Utc>) -> Self {
        Self {
            repo: repo.to_string(),
            stars: 0,
            forks: 0,
            watchers: 0,
            contributors: 0,
            open_issues: 0,
            total_issues: 0,
            closed_issues: 0,
            open_prs: 0,
            total_prs: 0,
            closed_prs: 0,
            merged_prs: 0,
            recent_commits_30d: 0,
            size_kb: 0,
            language: UNKNOWN_LANGUAGE.to_string(),
            created_at: String::new(),
            updated_at: String::new(),
            last_fetched: fetched_stamp(fetched_at),
            error: Some(error.into()),
        }
    }

    pub fn is_degraded(&self) -> bool {
        self.error.is_some()
    }
}

/// Formats the `last_fetched` timestamp.
pub fn fetched_stamp(fetched_at: DateTime<Utc>) -> String {
    fetched_at.to_rfc3339()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failed_record_is_fully_zeroed() {
        let fetched_at = Utc::now();
        let record = RepositoryMetrics::failed("owner/repo", "404 Not Found", fetched_at);

        assert_eq!(record.repo, "owner/repo");
        assert_eq!(record.language, UNKNOWN_LANGUAGE);
        assert_eq!(record.error.as_deref(), Some("404 Not Found"));
        assert!(record.is_degraded());
        assert_eq!(record.last_fetched, fetched_at.to_rfc3339());
        for value in [
            record.stars,
            record.forks,
            record.watchers,
            record.contributors,
            record.open_issues,
            record.total_issues,
            record.closed_issues,
            record.open_prs,
            record.total_prs,
            record.closed_prs,
            record.merged_prs,
            record.recent_commits_30d,
            record.size_kb,
        ] {
            assert_eq!(value, 0);
        }
    }

    #[test]
    fn test_error_is_not_serialized() {
        let record = RepositoryMetrics::failed("owner/repo", "boom", Utc::now());
        let json = serde_json::to_string(&record).unwrap();
        assert!(!json.contains("boom"));
        assert!(json.contains("\"language\":\"Unknown\""));
    }
}
