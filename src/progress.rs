//! Progress bar display for downloads and plan execution

use indicatif::{ProgressBar, ProgressStyle};

/// Progress over the steps of an install or uninstall plan
pub struct ProgressDisplay {
    step_pb: ProgressBar,
}

impl ProgressDisplay {
    /// Create a new progress display with total step count
    pub fn new(total_steps: u64, visible: bool) -> Self {
        let step_pb = if visible {
            ProgressBar::new(total_steps)
        } else {
            ProgressBar::hidden()
        };
        step_pb.set_style(
            ProgressStyle::default_bar()
                .template("[{bar:40.cyan/blue}] {pos}/{len} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("#>-"),
        );
        Self { step_pb }
    }

    /// Update to show the step being worked on
    pub fn update_step(&self, label: &str) {
        self.step_pb.set_message(label.to_string());
    }

    pub fn inc_step(&self) {
        self.step_pb.inc(1);
    }

    pub fn finish(&self) {
        self.step_pb.finish_and_clear();
    }

    /// Abandon on error
    pub fn abandon(&self) {
        self.step_pb.abandon();
    }
}

/// Byte progress for one asset download; hidden when `visible` is false
pub fn download_bar(name: &str, total_bytes: Option<u64>, visible: bool) -> ProgressBar {
    if !visible {
        return ProgressBar::hidden();
    }

    let pb = match total_bytes {
        Some(total) => ProgressBar::new(total),
        None => ProgressBar::new_spinner(),
    };
    pb.set_style(
        ProgressStyle::default_bar()
            .template("  [{bar:40.green/yellow}] {bytes}/{total_bytes} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▉▊▋▌▍▎▏  "),
    );
    // Truncate long names for display
    let chars = name.chars().count();
    let display_name = if chars > 50 {
        format!("...{}", name.chars().skip(chars - 47).collect::<String>())
    } else {
        name.to_string()
    };
    pb.set_message(display_name);
    pb
}
