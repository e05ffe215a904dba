use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Configuration file structure for repopulse.
///
/// Lets users keep their token, storage locations and output preferences in
/// one place. Command-line flags override anything set here.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Config {
    /// GitHub API settings
    #[serde(default)]
    pub github: GitHubConfig,

    /// Where metrics and the repository list live
    #[serde(default)]
    pub storage: StorageConfig,

    /// Output format preferences
    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct GitHubConfig {
    /// GitHub personal access token
    pub token: Option<String>,

    /// GitHub API base URL
    #[serde(default = "default_github_base_url")]
    pub base_url: String,

    /// `User-Agent` sent with every request
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct StorageConfig {
    /// Directory holding the metrics CSV and the update stamp
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// File listing tracked repositories, one `owner/name` per line
    #[serde(default = "default_repos_file")]
    pub repos_file: PathBuf,

    /// Days before saved metrics are considered stale
    #[serde(default = "default_refresh_days")]
    pub refresh_days: u32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct OutputConfig {
    /// Default format for `show`
    #[serde(default)]
    pub format: OutputFormat,

    /// Pretty-print JSON output
    #[serde(default)]
    pub pretty: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            token: None,
            base_url: default_github_base_url(),
            user_agent: default_user_agent(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            repos_file: default_repos_file(),
            refresh_days: default_refresh_days(),
        }
    }
}

fn default_github_base_url() -> String {
    "https://api.github.com".to_string()
}

fn default_user_agent() -> String {
    format!("repopulse/{}", env!("CARGO_PKG_VERSION"))
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("data")
}

fn default_repos_file() -> PathBuf {
    PathBuf::from("env").join("repos.txt")
}

fn default_refresh_days() -> u32 {
    7
}

impl Config {
    /// Load configuration from a file.
    ///
    /// Searches for configuration files in this order:
    /// 1. Specified path
    /// 2. ./repopulse.toml
    /// 3. ./repopulse.json
    /// 4. ./repopulse.yaml
    /// 5. ./repopulse.yml
    ///
    /// Returns default configuration if no file is found.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        if let Some(path) = path {
            if !path.exists() {
                anyhow::bail!("Config file not found: {}", path.display());
            }
            return Self::load_from_path(path);
        }

        let candidates = [
            "repopulse.toml",
            "repopulse.json",
            "repopulse.yaml",
            "repopulse.yml",
        ];

        for candidate in &candidates {
            let path = Path::new(candidate);
            if path.exists() {
                return Self::load_from_path(path);
            }
        }

        Ok(Self::default())
    }

    /// Load configuration from a specific file path.
    fn load_from_path(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let extension = path.extension().and_then(|ext| ext.to_str()).unwrap_or("");

        match extension {
            "toml" => toml::from_str(&contents)
                .with_context(|| format!("Failed to parse TOML config: {}", path.display())),
            "json" => serde_json::from_str(&contents)
                .with_context(|| format!("Failed to parse JSON config: {}", path.display())),
            "yaml" | "yml" => serde_yaml::from_str(&contents)
                .with_context(|| format!("Failed to parse YAML config: {}", path.display())),
            _ => toml::from_str(&contents)
                .or_else(|_| serde_json::from_str(&contents))
                .or_else(|_| serde_yaml::from_str(&contents))
                .with_context(|| format!("Failed to parse config file: {}", path.display())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.github.base_url, "https://api.github.com");
        assert!(config.github.user_agent.starts_with("repopulse/"));
        assert!(config.github.token.is_none());
        assert_eq!(config.storage.data_dir, PathBuf::from("data"));
        assert_eq!(config.storage.repos_file, PathBuf::from("env/repos.txt"));
        assert_eq!(config.storage.refresh_days, 7);
        assert_eq!(config.output.format, OutputFormat::Table);
        assert!(!config.output.pretty);
    }

    #[test]
    fn test_load_toml_config() {
        let mut temp_file = NamedTempFile::with_suffix(".toml").unwrap();
        let toml_content = r#"
[github]
token = "ghp_test_token"
base-url = "https://ghe.example.com/api/v3"

[storage]
data-dir = "/var/lib/repopulse"
refresh-days = 1

[output]
format = "json"
pretty = true
"#;
        write!(temp_file, "{}", toml_content).unwrap();

        let config = Config::load_from_path(temp_file.path()).unwrap();
        assert_eq!(config.github.token, Some("ghp_test_token".to_string()));
        assert_eq!(config.github.base_url, "https://ghe.example.com/api/v3");
        assert!(config.github.user_agent.starts_with("repopulse/"));
        assert_eq!(config.storage.data_dir, PathBuf::from("/var/lib/repopulse"));
        assert_eq!(config.storage.repos_file, PathBuf::from("env/repos.txt"));
        assert_eq!(config.storage.refresh_days, 1);
        assert_eq!(config.output.format, OutputFormat::Json);
        assert!(config.output.pretty);
    }

    #[test]
    fn test_load_json_config() {
        let mut temp_file = NamedTempFile::with_suffix(".json").unwrap();
        let json_content = r#"{
  "github": {
    "user-agent": "dashboard-bot"
  },
  "storage": {
    "repos-file": "tracked.txt"
  }
}"#;
        write!(temp_file, "{}", json_content).unwrap();

        let config = Config::load_from_path(temp_file.path()).unwrap();
        assert_eq!(config.github.user_agent, "dashboard-bot");
        assert_eq!(config.storage.repos_file, PathBuf::from("tracked.txt"));
        assert_eq!(config.storage.refresh_days, 7);
    }

    #[test]
    fn test_load_yaml_without_extension() {
        let mut temp_file = NamedTempFile::new().unwrap();
        write!(temp_file, "storage:\n  refresh-days: 14\n").unwrap();

        let config = Config::load_from_path(temp_file.path()).unwrap();
        assert_eq!(config.storage.refresh_days, 14);
    }

    #[test]
    fn test_load_missing_explicit_path() {
        let result = Config::load(Some(Path::new("nonexistent-repopulse.toml")));
        assert!(result.is_err());
    }

    #[test]
    fn test_load_invalid_config() {
        let mut temp_file = NamedTempFile::with_suffix(".toml").unwrap();
        write!(temp_file, "[storage]\nrefresh-days = \"soon\"\n").unwrap();

        let err = Config::load_from_path(temp_file.path()).unwrap_err();
        assert!(err.to_string().contains("Failed to parse TOML config"));
    }
}
