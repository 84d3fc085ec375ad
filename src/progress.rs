//! Console output: log initialization and the per-invocation progress bar.

use indicatif::{MultiProgress, ProgressBar, ProgressDrawTarget, ProgressStyle};
use indicatif_log_bridge::LogWrapper;
use log::LevelFilter;
use serde::{Deserialize, Serialize};
use std::sync::Mutex;
use ytdlp_engine::model::progress::{Progress, ProgressStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Verbosity {
    None,
    Error,
    Info,
    Debug,
    Full,
}

impl Verbosity {
    fn apply(self, builder: &mut env_logger::Builder) {
        match self {
            Verbosity::None => builder.filter_level(LevelFilter::Off),
            Verbosity::Error => builder.filter_level(LevelFilter::Error),
            Verbosity::Info => builder
                .filter_level(LevelFilter::Warn)
                .filter_module("tubefetch", LevelFilter::Info),
            Verbosity::Debug => builder
                .filter_level(LevelFilter::Warn)
                .filter_module("tubefetch", LevelFilter::Debug)
                .filter_module("ytdlp_engine", LevelFilter::Debug),
            Verbosity::Full => builder.filter_level(LevelFilter::Trace),
        };
    }
}

/// Installs `env_logger` behind the progress bars. `RUST_LOG` wins over `verbosity`.
pub fn init_logging(verbosity: Verbosity) -> MultiProgress {
    let mut builder = env_logger::Builder::new();
    verbosity.apply(&mut builder);
    builder.format_timestamp(None);
    builder.parse_env(env_logger::Env::default());

    let logger = builder.build();
    let level = logger.filter();
    let multi = MultiProgress::new();

    if LogWrapper::new(multi.clone(), logger).try_init().is_ok() {
        log::set_max_level(level);
    }

    multi
}

/// Draws one bar per transfer from the engine's progress reports.
pub struct ProgressDisplay {
    multi: MultiProgress,
    bar: Mutex<Option<ProgressBar>>,
}

impl ProgressDisplay {
    pub fn new(multi: MultiProgress) -> Self {
        Self {
            multi,
            bar: Mutex::new(None),
        }
    }

    pub fn hidden() -> Self {
        Self::new(MultiProgress::with_draw_target(ProgressDrawTarget::hidden()))
    }

    pub fn update(&self, progress: &Progress) {
        let Ok(mut current) = self.bar.lock() else {
            return;
        };

        match progress.status {
            ProgressStatus::Downloading => {
                let bar = current.get_or_insert_with(|| self.multi.add(new_bar()));
                if let Some(percent) = progress.percent() {
                    bar.set_position((percent * 10.0).round() as u64);
                }
                bar.set_message(describe(progress));
            }
            ProgressStatus::Finished => {
                if let Some(bar) = current.take() {
                    bar.set_position(1000);
                    bar.finish_with_message("done, processing...");
                }
            }
            ProgressStatus::Error => {
                if let Some(bar) = current.take() {
                    bar.abandon_with_message("failed");
                }
            }
            ProgressStatus::Other => {}
        }
    }

    /// Drops a bar left over by an interrupted or failed invocation.
    pub fn clear(&self) {
        if let Ok(mut current) = self.bar.lock() {
            if let Some(bar) = current.take() {
                bar.finish_and_clear();
            }
        }
    }
}

fn new_bar() -> ProgressBar {
    let style = ProgressStyle::with_template(
        "  {spinner:.green} [{bar:40.cyan/blue}] {percent:>3}% | {msg}",
    )
    .unwrap_or_else(|_| ProgressStyle::default_bar())
    .progress_chars("=> ");

    ProgressBar::new(1000).with_style(style)
}

fn describe(progress: &Progress) -> String {
    let speed = progress
        .speed
        .map_or_else(|| String::from("N/A"), |s| format!("{:.2} MB/s", s / 1_048_576.0));
    let eta = progress
        .eta
        .map_or_else(|| String::from("N/A"), |e| format_eta(e as u64));

    format!("speed {} | eta {}", speed, eta)
}

fn format_eta(seconds: u64) -> String {
    let (hours, minutes, seconds) = (seconds / 3600, seconds / 60 % 60, seconds % 60);
    if hours > 0 {
        format!("{hours}:{minutes:02}:{seconds:02}")
    } else {
        format!("{minutes:02}:{seconds:02}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn downloading(done: f64, total: f64) -> Progress {
        Progress {
            downloaded_bytes: Some(done),
            total_bytes: Some(total),
            speed: Some(2.0 * 1_048_576.0),
            eta: Some(75.0),
            ..Progress::new(ProgressStatus::Downloading)
        }
    }

    #[test]
    fn formats_speed_and_eta() {
        assert_eq!(describe(&downloading(1.0, 2.0)), "speed 2.00 MB/s | eta 01:15");
        assert_eq!(
            describe(&Progress::new(ProgressStatus::Downloading)),
            "speed N/A | eta N/A"
        );
        assert_eq!(format_eta(3725), "1:02:05");
    }

    #[test]
    fn one_bar_per_transfer() {
        let display = ProgressDisplay::hidden();

        display.update(&downloading(1.0, 4.0));
        let first = display.bar.lock().unwrap().clone().unwrap();
        assert_eq!(first.position(), 250);

        display.update(&Progress::new(ProgressStatus::Finished));
        assert!(first.is_finished());
        assert!(display.bar.lock().unwrap().is_none());

        display.update(&downloading(1.0, 2.0));
        assert_eq!(display.bar.lock().unwrap().as_ref().unwrap().position(), 500);

        display.clear();
        assert!(display.bar.lock().unwrap().is_none());
    }
}
