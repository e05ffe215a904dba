mod client;
mod pagination;
mod provider;
mod types;


pub use client::{GitHubClient, COMMITS_PER_PAGE, MAX_COMMIT_PAGES};
pub use provider::MetricsFetcher;
pub use types::{IssueStats, PullRequestStats};
