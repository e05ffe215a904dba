pub mod github;

pub use github::MetricsFetcher;
