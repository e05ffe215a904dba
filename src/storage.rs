use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Duration, Utc};
use log::{debug, info, warn};

use crate::error::{RepoPulseError, Result};
use crate::metrics::RepositoryMetrics;

const METRICS_FILE: &str = "github_metrics.csv";
const LAST_UPDATE_FILE: &str = "last_update.txt";

/// Aggregate view over the saved metrics.
#[derive(Debug, Clone)]
pub struct MetricsSummary {
    pub total_repositories: usize,
    pub total_stars: u64,
    pub total_forks: u64,
    pub total_contributors: u64,
    pub last_update: Option<DateTime<Utc>>,
    pub csv_file: PathBuf,
}

/// CSV-backed store for the latest metrics batch.
///
/// Layout inside the data directory:
/// - `github_metrics.csv` - one row per repository, rewritten on every batch
/// - `last_update.txt` - RFC 3339 timestamp of the last completed batch
pub struct DataStore {
    csv_file: PathBuf,
    last_update_file: PathBuf,
    refresh_interval: Duration,
}

impl DataStore {
    /// Opens the store, creating `data_dir` if needed.
    pub fn new(data_dir: &Path, refresh_interval: Duration) -> Result<Self> {
        fs::create_dir_all(data_dir)?;

        Ok(Self {
            csv_file: data_dir.join(METRICS_FILE),
            last_update_file: data_dir.join(LAST_UPDATE_FILE),
            refresh_interval,
        })
    }

    pub fn csv_file(&self) -> &Path {
        &self.csv_file
    }

    /// Timestamp of the last completed batch, if one is recorded and readable.
    pub fn last_update(&self) -> Option<DateTime<Utc>> {
        let contents = fs::read_to_string(&self.last_update_file).ok()?;
        DateTime::parse_from_rfc3339(contents.trim())
            .inspect_err(|e| warn!("Ignoring unreadable update stamp: {e}"))
            .ok()
            .map(|stamp| stamp.with_timezone(&Utc))
    }

    /// Whether a new batch is due at `now`.
    ///
    /// True when no stamp exists, the stamp cannot be parsed, or the refresh
    /// interval has elapsed since it was written.
    pub fn should_update(&self, now: DateTime<Utc>) -> bool {
        match self.last_update() {
            Some(last) => now - last >= self.refresh_interval,
            None => true,
        }
    }

    /// Replaces the saved metrics with `records`.
    pub fn save(&self, records: &[RepositoryMetrics]) -> Result<()> {
        let mut writer = csv::Writer::from_path(&self.csv_file)?;
        for record in records {
            writer.serialize(record)?;
        }
        writer.flush()?;

        info!(
            "Saved {} records to {}",
            records.len(),
            self.csv_file.display()
        );
        Ok(())
    }

    /// Records `now` as the time of the last completed batch.
    pub fn mark_updated(&self, now: DateTime<Utc>) -> Result<()> {
        fs::write(&self.last_update_file, now.to_rfc3339())?;
        debug!("Update stamp written to {}", self.last_update_file.display());
        Ok(())
    }

    /// Loads the saved metrics.
    ///
    /// # Errors
    ///
    /// Returns [`RepoPulseError::NoData`] when nothing has been collected yet.
    pub fn load(&self) -> Result<Vec<RepositoryMetrics>> {
        if !self.csv_file.exists() {
            return Err(RepoPulseError::NoData(
                "No data file found. Run data collection first.".to_string(),
            ));
        }

        let mut reader = csv::Reader::from_path(&self.csv_file)?;
        let records = reader
            .deserialize()
            .collect::<std::result::Result<Vec<RepositoryMetrics>, _>>()?;

        if records.is_empty() {
            return Err(RepoPulseError::NoData("No data in CSV file.".to_string()));
        }

        Ok(records)
    }

    /// Totals over the saved metrics.
    pub fn summary(&self) -> Result<MetricsSummary> {
        let records = self.load()?;

        Ok(MetricsSummary {
            total_repositories: records.len(),
            total_stars: records.iter().map(|r| r.stars).sum(),
            total_forks: records.iter().map(|r| r.forks).sum(),
            total_contributors: records.iter().map(|r| r.contributors).sum(),
            last_update: self.last_update(),
            csv_file: self.csv_file.clone(),
        })
    }
}
