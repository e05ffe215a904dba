use anyhow::Result;
use chrono::{Duration, Utc};
use clap::{Parser, Subcommand};
use log::info;
use std::path::PathBuf;

use crate::auth::Token;
use crate::config::{Config, OutputFormat};
use crate::error::RepoPulseError;
use crate::output::{self, BatchProgress};
use crate::providers::MetricsFetcher;
use crate::repos::{load_repositories, seed_repositories};
use crate::storage::DataStore;

#[derive(Parser)]
#[command(name = "repopulse")]
#[command(author, version, about = "GitHub Repository Dashboard", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Configuration file (defaults to ./repopulse.{toml,json,yaml,yml})
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// GitHub personal access token, for higher rate limits
    #[arg(short, long, global = true, env = "GITHUB_TOKEN", hide_env_values = true)]
    token: Option<String>,

    #[arg(long, global = true)]
    base_url: Option<String>,

    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    #[arg(long, global = true)]
    repos_file: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch metrics for every tracked repository and save them
    Collect {
        /// Ignore the refresh cycle and fetch now
        #[arg(short, long, default_value_t = false)]
        force: bool,
    },
    /// Display the saved metrics
    Show {
        #[arg(short, long, value_enum)]
        format: Option<OutputFormat>,

        #[arg(short, long, default_value_t = false)]
        pretty: bool,
    },
    /// Show totals over the saved metrics
    Summary,
}

/// Effective settings after layering CLI flags over the config file.
struct Settings {
    token: Option<Token>,
    base_url: String,
    user_agent: String,
    repos_file: PathBuf,
    format: OutputFormat,
    pretty: bool,
}

impl Cli {
    fn settings(&self, config: Config) -> Settings {
        let token = self
            .token
            .clone()
            .or(config.github.token)
            .filter(|token| !token.trim().is_empty())
            .map(Token::from);

        Settings {
            token,
            base_url: self.base_url.clone().unwrap_or(config.github.base_url),
            user_agent: config.github.user_agent,
            repos_file: self
                .repos_file
                .clone()
                .unwrap_or(config.storage.repos_file),
            format: config.output.format,
            pretty: config.output.pretty,
        }
    }

    async fn execute_collect(
        &self,
        settings: &Settings,
        store: &DataStore,
        force: bool,
    ) -> Result<()> {
        if !force && !store.should_update(Utc::now()) {
            eprintln!(
                "{}",
                output::muted("Data is up to date. Use `collect --force` to refresh anyway.")
            );
            return Ok(());
        }

        let repos = load_repositories(&settings.repos_file)?;
        if repos.is_empty() {
            eprintln!(
                "No repositories configured. Please add repositories to {}",
                settings.repos_file.display()
            );
            return Ok(());
        }

        info!("Collecting data for {} repositories", repos.len());

        let fetcher = MetricsFetcher::new(
            &settings.base_url,
            &settings.user_agent,
            settings.token.clone(),
        )?;

        let progress = BatchProgress::start(repos.len());
        let mut records = Vec::with_capacity(repos.len());
        for repo in &repos {
            progress.fetching(repo);
            let record = fetcher.fetch(repo).await;
            progress.finished(repo, record.error.as_deref());
            records.push(record);
        }
        let failed = records.iter().filter(|record| record.is_degraded()).count();
        progress.finish(failed);

        store.save(&records)?;
        store.mark_updated(Utc::now())?;

        eprintln!(
            "{} {}",
            output::success("Data collection complete. Results saved to"),
            store.csv_file().display()
        );

        Ok(())
    }

    fn execute_show(
        settings: &Settings,
        store: &DataStore,
        format: OutputFormat,
        pretty: bool,
    ) -> Result<()> {
        let records = match store.load() {
            Ok(records) => records,
            Err(RepoPulseError::NoData(message)) => {
                eprintln!("{}", output::notice(message));
                return Ok(());
            }
            Err(e) => return Err(e.into()),
        };

        match format {
            OutputFormat::Json => {
                output::export_json(&records, pretty || settings.pretty, &mut std::io::stdout())?;
            }
            OutputFormat::Table => {
                output::print_metrics(&records);
                output::print_summary(&store.summary()?);
            }
        }

        Ok(())
    }

    fn execute_summary(store: &DataStore) -> Result<()> {
        match store.summary() {
            Ok(summary) => output::print_summary(&summary),
            Err(RepoPulseError::NoData(message)) => {
                eprintln!("{}", output::notice(message));
            }
            Err(e) => return Err(e.into()),
        }
        Ok(())
    }

    pub async fn execute(&self) -> Result<()> {
        let config = Config::load(self.config.as_deref())?;
        let data_dir = self
            .data_dir
            .clone()
            .unwrap_or_else(|| config.storage.data_dir.clone());
        let refresh_interval = Duration::days(i64::from(config.storage.refresh_days));
        let settings = self.settings(config);

        let store = DataStore::new(&data_dir, refresh_interval)?;

        match &self.command {
            Some(Commands::Collect { force }) => {
                seed_repositories(&settings.repos_file)?;
                self.execute_collect(&settings, &store, *force).await
            }
            Some(Commands::Show { format, pretty }) => {
                Self::execute_show(&settings, &store, format.unwrap_or(settings.format), *pretty)
            }
            Some(Commands::Summary) => Self::execute_summary(&store),
            None => {
                seed_repositories(&settings.repos_file)?;
                if store.should_update(Utc::now()) {
                    eprintln!(
                        "{}",
                        output::notice("Data needs updating (stale or missing).")
                    );
                    self.execute_collect(&settings, &store, true).await?;
                } else {
                    eprintln!("{}", output::muted("Data is up to date."));
                }
                Self::execute_show(&settings, &store, OutputFormat::Table, false)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_defaults_to_no_subcommand() {
        let cli = Cli::try_parse_from(["repopulse"]).unwrap();
        assert!(cli.command.is_none());
        assert!(cli.base_url.is_none());
    }

    #[test]
    fn test_collect_force_flag() {
        let cli = Cli::try_parse_from(["repopulse", "collect", "--force"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::Collect { force: true })));
    }

    #[test]
    fn test_show_json_format() {
        let cli = Cli::try_parse_from(["repopulse", "show", "--format", "json", "-p"]).unwrap();
        assert!(matches!(
            cli.command,
            Some(Commands::Show {
                format: Some(OutputFormat::Json),
                pretty: true
            })
        ));
    }

    #[test]
    fn test_cli_flags_override_config() {
        let cli = Cli::try_parse_from([
            "repopulse",
            "--token",
            "ghp_cli",
            "--base-url",
            "http://localhost:8080",
            "--repos-file",
            "tracked.txt",
            "summary",
        ])
        .unwrap();

        let mut config = Config::default();
        config.github.token = Some("ghp_config".to_string());
        config.output.format = OutputFormat::Json;

        let settings = cli.settings(config);
        assert_eq!(settings.token, Some(Token::from("ghp_cli")));
        assert_eq!(settings.base_url, "http://localhost:8080");
        assert_eq!(settings.repos_file, PathBuf::from("tracked.txt"));
        assert_eq!(settings.format, OutputFormat::Json);
    }

    #[test]
    fn test_blank_token_is_ignored() {
        let cli = Cli::try_parse_from(["repopulse", "--token", "  ", "summary"]).unwrap();
        let settings = cli.settings(Config::default());
        assert!(settings.token.is_none());
        assert_eq!(settings.base_url, "https://api.github.com");
    }
}
