mod exports;
mod progress;
mod styling;
mod summary;
mod tables;

pub use exports::export_json;
pub use progress::BatchProgress;
pub use styling::{brand, muted, notice, success};
pub use summary::{print_metrics, print_summary};

/// Prints the `repopulse` banner to stderr.
pub fn print_banner() {
    eprintln!(
        r"
{} {}
  {}
",
        brand("📈 repopulse"),
        muted(env!("CARGO_PKG_VERSION")),
        muted("GitHub Repository Dashboard")
    );
}
