//! Terminal progress bars for downloads

use std::time::Duration;
use indicatif::{ProgressBar, ProgressStyle};
use parking_lot::Mutex;

use model_manager::downloader::{artifact_file_name, DownloadObserver};

const BAR_TEMPLATE: &str =
    "{msg:30!} [{elapsed_precise}] [{wide_bar}] {bytes}/{total_bytes} ({bytes_per_sec}, {eta})";
const SPINNER_TEMPLATE: &str = "{spinner} {msg:30!} [{elapsed_precise}] {bytes} ({bytes_per_sec})";

/// Shows one progress bar per download
///
/// Falls back to a byte-counting spinner when the server sends no
/// `Content-Length`.
#[derive(Default)]
pub struct ProgressReporter {
    /// Bar of the download in flight
    current: Mutex<Option<ProgressBar>>,
}

impl ProgressReporter {
    /// Creates a new progress reporter
    pub fn new() -> Self {
        Self::default()
    }

    fn bar_for(total_bytes: Option<u64>) -> ProgressBar {
        match total_bytes {
            Some(total) => {
                let bar = ProgressBar::new(total);
                if let Ok(style) = ProgressStyle::with_template(BAR_TEMPLATE) {
                    bar.set_style(style.progress_chars("=> "));
                }
                bar
            }
            None => {
                let bar = ProgressBar::new_spinner();
                if let Ok(style) = ProgressStyle::with_template(SPINNER_TEMPLATE) {
                    bar.set_style(style);
                }
                bar.enable_steady_tick(Duration::from_millis(120));
                bar
            }
        }
    }
}

impl DownloadObserver for ProgressReporter {
    fn on_start(&self, url: &str, total_bytes: Option<u64>) {
        let bar = Self::bar_for(total_bytes);
        bar.set_message(artifact_file_name(url).unwrap_or(url).to_string());

        if let Some(previous) = self.current.lock().replace(bar) {
            previous.abandon();
        }
    }

    fn on_progress(&self, downloaded_bytes: u64) {
        if let Some(bar) = self.current.lock().as_ref() {
            bar.set_position(downloaded_bytes);
        }
    }

    fn on_finish(&self, success: bool) {
        if let Some(bar) = self.current.lock().take() {
            if success {
                bar.finish_and_clear();
            } else {
                bar.abandon();
            }
        }
    }
}
