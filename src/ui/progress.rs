use crate::extractor::ExtractionProgress;
use crate::ui::output::format_duration;
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use std::time::Duration;

const FILE_BAR_TEMPLATE: &str =
    "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos:>4}/{len:4} pages {msg}";

/// Owns the terminal bars of a run. Disabled managers hand out hidden bars.
pub struct ProgressManager {
    bars: MultiProgress,
    enabled: bool,
}

impl ProgressManager {
    pub fn new(enabled: bool) -> Self {
        Self {
            bars: MultiProgress::new(),
            enabled,
        }
    }

    /// One tick per calendar page.
    pub fn create_file_progress(&self, total_files: u64) -> ProgressBar {
        if !self.enabled || total_files == 0 {
            return ProgressBar::hidden();
        }

        let style = ProgressStyle::with_template(FILE_BAR_TEMPLATE)
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=> ");

        let bar = self
            .bars
            .add(ProgressBar::new(total_files).with_style(style));
        bar.set_message("starting");
        bar.tick();
        bar
    }

    /// Hides the bars while `f` writes to the terminal.
    pub fn suspend<F, R>(&self, f: F) -> R
    where
        F: FnOnce() -> R,
    {
        match self.enabled {
            true => self.bars.suspend(f),
            false => f(),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }
}

impl Default for ProgressManager {
    fn default() -> Self {
        Self::new(true)
    }
}

pub fn update_file_progress(bar: &ProgressBar, progress: &ExtractionProgress) {
    bar.set_position(progress.files_processed as u64);
    bar.set_message(format!("{} records", progress.records_extracted));
    // Redraws happen on the caller's thread only.
    bar.tick();
}

pub fn finish_progress_with_summary(bar: &ProgressBar, message: &str, duration: Duration) {
    bar.finish_with_message(format!("{} in {}", message, format_duration(duration)));
}
