use serde::Deserialize;

/// Core repository payload from `GET /repos/{owner}/{name}`.
///
/// Only the fields the metrics record needs are decoded.
#[derive(Debug, Clone, Deserialize)]
pub struct GitHubRepository {
    #[serde(default)]
    pub stargazers_count: u64,
    #[serde(default)]
    pub forks_count: u64,
    #[serde(default)]
    pub watchers_count: u64,
    /// Repository size in kilobytes
    #[serde(default)]
    pub size: u64,
    /// Primary language, `null` when GitHub has not detected one
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

/// Pull request counts for one repository.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PullRequestStats {
    pub open: u64,
    pub closed: u64,
    pub merged: u64,
    pub total: u64,
}

impl PullRequestStats {
    /// Assembles the category from its two state counts.
    ///
    /// `merged` is an estimate of 80% of `closed`, rounded down. Checking merge
    /// status exactly would cost one request per closed pull request.
    pub fn from_counts(open: u64, closed: u64) -> Self {
        Self {
            open,
            closed,
            merged: closed * 4 / 5,
            total: open + closed,
        }
    }
}

/// Issue counts for one repository.
///
/// GitHub's issues endpoint also lists pull requests, so these counts include them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IssueStats {
    pub open: u64,
    pub closed: u64,
    pub total: u64,
}

impl IssueStats {
    pub fn from_counts(open: u64, closed: u64) -> Self {
        Self {
            open,
            closed,
            total: open + closed,
        }
    }
}
