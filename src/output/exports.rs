use anyhow::Result;
use std::io::Write;

use crate::metrics::RepositoryMetrics;

/// Writes the saved metrics as a JSON array.
pub fn export_json(
    records: &[RepositoryMetrics],
    pretty: bool,
    output: &mut dyn Write,
) -> Result<()> {
    let json = if pretty {
        serde_json::to_string_pretty(records)?
    } else {
        serde_json::to_string(records)?
    };
    writeln!(output, "{}", json)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_export_json_compact() {
        let records = vec![RepositoryMetrics {
            stars: 42,
            error: None,
            ..RepositoryMetrics::failed("octo/demo", "", Utc::now())
        }];
        let mut buffer = Vec::new();

        export_json(&records, false, &mut buffer).unwrap();

        let output = String::from_utf8(buffer).unwrap();
        assert!(output.starts_with("[{\"repo\":\"octo/demo\",\"stars\":42,"));
        assert!(output.ends_with("}]\n"));
    }

    #[test]
    fn test_export_json_pretty_parses_back() {
        let records = vec![RepositoryMetrics::failed("octo/demo", "ignored", Utc::now())];
        let mut buffer = Vec::new();

        export_json(&records, true, &mut buffer).unwrap();

        let parsed: Vec<RepositoryMetrics> = serde_json::from_slice(&buffer).unwrap();
        assert_eq!(parsed[0].repo, "octo/demo");
        assert!(parsed[0].error.is_none());
    }
}
