//! Terminal progress monitor for JSONL generation logs.
//!
//! Polls the line count of a line-delimited record file and redraws a status
//! table at a fixed cadence. Nothing is persisted; the only state carried
//! between cycles is the previous successful count, used for delta
//! reporting. A missing file is reported and skipped, never fatal.

use chrono::Local;
use std::fs::File;
use std::io::{self, BufRead, BufReader, ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tabled::settings::Style;
use tabled::{Table, Tabled};
use tracing::{debug, warn};

/// ANSI erase-screen + cursor-home sequence, written before each redraw.
const CLEAR_SCREEN: &str = "\x1b[2J\x1b[1;1H";

/// Count the newline-delimited records in `path`.
///
/// Returns `None` when the file cannot be opened; the monitor does not
/// distinguish an absent file from one it cannot read, it just skips the
/// cycle either way.
#[must_use]
pub fn count_jsonl_items(path: &Path) -> Option<u64> {
    match File::open(path) {
        Ok(file) => {
            let mut count = 0u64;
            for _ in BufReader::new(file).lines() {
                count += 1;
            }
            Some(count)
        }
        Err(e) if e.kind() == ErrorKind::NotFound => {
            debug!(path = %path.display(), "file not found");
            None
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "failed to read file");
            None
        }
    }
}

/// Relative progress metric for a sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Progress {
    /// Fraction of a fixed expected total, as a percentage.
    Percent(f64),
    /// Change since the previous successful sample.
    Delta(i64),
    /// First sample, with no expected total configured.
    Unknown,
}

impl std::fmt::Display for Progress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Percent(pct) => write!(f, "{pct:.2}%"),
            Self::Delta(delta) => write!(f, "{delta}"),
            Self::Unknown => write!(f, "N/A"),
        }
    }
}

#[allow(clippy::cast_possible_wrap)]
fn progress_for(count: u64, previous: Option<u64>, expected_total: Option<u64>) -> Progress {
    match (expected_total, previous) {
        (Some(total), _) if total > 0 => {
            Progress::Percent(count as f64 / total as f64 * 100.0)
        }
        (_, Some(previous)) => Progress::Delta(count as i64 - previous as i64),
        _ => Progress::Unknown,
    }
}

/// One polling observation. Recomputed and discarded every cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct MonitorSample {
    /// Wall-clock time of the observation, `YYYY-MM-DD HH:MM:SS`.
    pub timestamp: String,
    /// Current record count.
    pub count: u64,
    /// Relative metric for this sample.
    pub progress: Progress,
}

#[derive(Tabled)]
struct StatusRow {
    #[tabled(rename = "Time")]
    time: String,
    #[tabled(rename = "Count")]
    count: u64,
    #[tabled(rename = "Progress")]
    progress: String,
}

/// Polling monitor that redraws a status table for a JSONL log.
///
/// Runs until the process is terminated; there is no cooperative
/// cancellation beyond killing it.
#[derive(Debug, Clone)]
pub struct Monitor {
    path: PathBuf,
    interval: Duration,
    expected_total: Option<u64>,
}

impl Monitor {
    /// Create a monitor for `path`, polling every `interval`.
    ///
    /// Without an expected total the Progress column reports the delta since
    /// the previous successful sample.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>, interval: Duration) -> Self {
        Self {
            path: path.into(),
            interval,
            expected_total: None,
        }
    }

    /// Report progress as a percentage of `total` instead of a delta.
    #[must_use]
    pub const fn with_expected_total(mut self, total: u64) -> Self {
        self.expected_total = Some(total);
        self
    }

    /// Take one sample, or `None` when the file could not be read.
    ///
    /// `previous` is the count from the last successful cycle; it feeds the
    /// delta metric and is left to the caller to carry forward across failed
    /// reads.
    #[must_use]
    pub fn sample(&self, previous: Option<u64>) -> Option<MonitorSample> {
        let count = count_jsonl_items(&self.path)?;

        Some(MonitorSample {
            timestamp: Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
            count,
            progress: progress_for(count, previous, self.expected_total),
        })
    }

    fn render(sample: &MonitorSample) -> String {
        let row = StatusRow {
            time: sample.timestamp.clone(),
            count: sample.count,
            progress: sample.progress.to_string(),
        };
        Table::new([row]).with(Style::rounded()).to_string()
    }

    /// Poll forever at the configured cadence.
    ///
    /// Each cycle with a readable file clears the terminal and redraws the
    /// table; a missing file is reported and the previous count carries
    /// forward unchanged into the next cycle.
    pub async fn run(&self) {
        let mut previous = None;
        let mut out = io::stdout();

        loop {
            match self.sample(previous) {
                Some(sample) => {
                    let table = Self::render(&sample);
                    let _ = writeln!(out, "{CLEAR_SCREEN}{table}");
                    let _ = out.flush();
                    previous = Some(sample.count);
                }
                None => {
                    let _ = writeln!(out, "File {} not found.", self.path.display());
                    let _ = out.flush();
                }
            }
            tokio::time::sleep(self.interval).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_fs::prelude::*;

    #[test]
    fn test_count_jsonl_items() {
        let file = assert_fs::NamedTempFile::new("records.jsonl").unwrap();
        file.write_str("{\"id\": 1}\n{\"id\": 2}\n{\"id\": 3}\n").unwrap();

        assert_eq!(count_jsonl_items(file.path()), Some(3));
    }

    #[test]
    fn test_count_empty_file() {
        let file = assert_fs::NamedTempFile::new("empty.jsonl").unwrap();
        file.touch().unwrap();

        assert_eq!(count_jsonl_items(file.path()), Some(0));
    }

    #[test]
    fn test_count_missing_file_is_none() {
        assert_eq!(count_jsonl_items(Path::new("no/such/file.jsonl")), None);
    }

    #[test]
    fn test_delta_between_consecutive_samples() {
        assert_eq!(progress_for(25, Some(10), None), Progress::Delta(15));
    }

    #[test]
    fn test_first_sample_has_no_delta() {
        let progress = progress_for(10, None, None);
        assert_eq!(progress, Progress::Unknown);
        assert_eq!(progress.to_string(), "N/A");
    }

    #[test]
    fn test_percentage_of_expected_total() {
        let progress = progress_for(960, None, Some(1920));
        assert_eq!(progress.to_string(), "50.00%");
    }

    #[test]
    fn test_shrinking_file_reports_negative_delta() {
        assert_eq!(progress_for(5, Some(10), None), Progress::Delta(-5));
    }

    #[test]
    fn test_sample_after_failed_read_uses_carried_count() {
        let file = assert_fs::NamedTempFile::new("records.jsonl").unwrap();
        file.write_str("{}\n{}\n{}\n{}\n").unwrap();

        let monitor = Monitor::new(file.path(), Duration::from_secs(5));
        // previous=1 survived an unreadable cycle; the delta spans it.
        let sample = monitor.sample(Some(1)).unwrap();
        assert_eq!(sample.count, 4);
        assert_eq!(sample.progress, Progress::Delta(3));
    }

    #[test]
    fn test_render_has_all_columns() {
        let sample = MonitorSample {
            timestamp: "2026-08-28 12:00:00".to_string(),
            count: 42,
            progress: Progress::Percent(2.19),
        };
        let table = Monitor::render(&sample);

        assert!(table.contains("Time"));
        assert!(table.contains("Count"));
        assert!(table.contains("Progress"));
        assert!(table.contains("42"));
        assert!(table.contains("2.19%"));
    }
}
