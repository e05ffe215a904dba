use std::fmt::Write;

use crate::metrics::RepositoryMetrics;
use crate::storage::MetricsSummary;
use comfy_table::Cell;

use super::styling::{heading, icon, location, muted, notice};
use super::tables::{count_cell, create_table, estimate_cell, format_count, header_cells};

/// Prints the saved metrics as a table, one row per repository.
///
/// Merged pull requests are an estimate and are rendered dimmed with a `~`.
pub fn print_metrics(records: &[RepositoryMetrics]) {
    println!("{}", render_metrics(records));
}

/// Prints the totals block.
pub fn print_summary(summary: &MetricsSummary) {
    println!("{}", render_summary(summary));
}

fn add_section_header(output: &mut String, emoji: &str, title: &str) {
    let _ = writeln!(output, "{} {}", icon(emoji), heading(title));
}

fn render_metrics(records: &[RepositoryMetrics]) -> String {
    let mut output = String::new();
    add_section_header(&mut output, "📊", "Repositories");

    let mut table = create_table();
    table.set_header(header_cells(&[
        "Repository",
        "Stars",
        "Forks",
        "Contributors",
        "Open PRs",
        "Merged PRs",
        "Open Issues",
        "Commits (30d)",
        "Language",
    ]));

    for record in records {
        table.add_row(vec![
            Cell::new(&record.repo),
            count_cell(record.stars),
            count_cell(record.forks),
            count_cell(record.contributors),
            count_cell(record.open_prs),
            estimate_cell(record.merged_prs),
            count_cell(record.open_issues),
            count_cell(record.recent_commits_30d),
            Cell::new(&record.language),
        ]);
    }

    let _ = writeln!(output, "{table}");
    output
}

fn render_summary(summary: &MetricsSummary) -> String {
    let mut output = String::new();
    add_section_header(&mut output, "🧮", "Summary");

    let last_update = summary
        .last_update
        .map_or_else(|| "Unknown".to_string(), |stamp| stamp.to_rfc3339());

    let _ = write!(
        output,
        "  {} {}\n  {} {}\n  {} {}\n  {} {}\n  {} {}\n  {} {}\n",
        muted("Total Repositories:"),
        notice(summary.total_repositories),
        muted("Total Stars:"),
        notice(format_count(summary.total_stars)),
        muted("Total Forks:"),
        notice(format_count(summary.total_forks)),
        muted("Total Contributors:"),
        notice(format_count(summary.total_contributors)),
        muted("Last Updated:"),
        location(last_update),
        muted("Data File:"),
        location(summary.csv_file.display()),
    );

    output
}
