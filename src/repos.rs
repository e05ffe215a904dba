use std::fs;
use std::path::Path;

use log::{info, warn};

use crate::error::Result;

/// Written to a missing or empty repository list on first run.
const EXAMPLE_REPOSITORIES: &str = "\
# Example repositories - replace with your own
microsoft/vscode
facebook/react
python/cpython
";

/// Reads tracked repositories from a list file.
///
/// One `owner/name` per line. Blank lines and `#` comments are skipped. A
/// missing file yields an empty list.
pub fn load_repositories(path: &Path) -> Result<Vec<String>> {
    if !path.exists() {
        warn!("Repository configuration file not found: {}", path.display());
        return Ok(Vec::new());
    }

    let contents = fs::read_to_string(path)?;
    Ok(parse_repositories(&contents))
}

fn parse_repositories(contents: &str) -> Vec<String> {
    contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect()
}

/// Seeds `path` with example repositories unless it already lists some.
///
/// Returns whether the file was written.
pub fn seed_repositories(path: &Path) -> Result<bool> {
    if !load_repositories(path)?.is_empty() {
        return Ok(false);
    }

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, EXAMPLE_REPOSITORIES)?;
    info!("Set up example repositories in {}", path.display());

    Ok(true)
}
