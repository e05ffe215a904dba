use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};

use super::styling::{failure, heading, icon, notice, success};

/// Progress tracking for one collection batch
pub struct BatchProgress {
    pb: ProgressBar,
}

impl BatchProgress {
    pub fn start(total: usize) -> Self {
        eprintln!("{}  {}", icon("⚙️"), heading("Collecting"));

        let pb = ProgressBar::new(total as u64);
        pb.set_draw_target(ProgressDrawTarget::stderr());
        pb.set_style(
            ProgressStyle::default_bar()
                .template("  {msg} [{bar:30.yellow/dim}] {pos}/{len}")
                .unwrap()
                .progress_chars("=> "),
        );
        pb.enable_steady_tick(std::time::Duration::from_millis(100));

        Self { pb }
    }

    pub fn fetching(&self, repo: &str) {
        self.pb
            .set_message(notice(format!("Fetching {repo}")).to_string());
    }

    /// Advances the bar, printing an inline notice above it on failure.
    pub fn finished(&self, repo: &str, error: Option<&str>) {
        if let Some(error) = error {
            self.pb.println(format!(
                "  {} {}",
                failure("✗"),
                failure(format!("Error fetching data for {repo}: {error}"))
            ));
        }
        self.pb.inc(1);
    }

    pub fn finish(self, failed: usize) {
        let total = self.pb.length().unwrap_or_default();
        let message = if failed == 0 {
            success(format!("Collected {total} repositories ✓")).to_string()
        } else {
            notice(format!("Collected {total} repositories ({failed} failed)")).to_string()
        };
        self.pb.finish_with_message(message);
        eprintln!();
    }
}
