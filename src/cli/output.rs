//! CLI output formatting utilities.

use crate::error::RecapError;
use crate::orchestrator::{BatchObserver, BatchReport, Stage};
use crate::speech::{Playback, SpeechOutcome};
use crate::transcript::TranscriptRecord;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::Mutex;

/// Output helper for CLI formatting.
pub struct Output;

impl Output {
    /// Print an info message.
    pub fn info(msg: &str) {
        println!("{} {}", style(">>").cyan().bold(), msg);
    }

    /// Print a success message.
    pub fn success(msg: &str) {
        println!("{} {}", style(">>").green().bold(), msg);
    }

    /// Print a warning message.
    pub fn warning(msg: &str) {
        eprintln!("{} {}", style(">>").yellow().bold(), msg);
    }

    /// Print an error message.
    pub fn error(msg: &str) {
        eprintln!("{} {}", style(">>").red().bold(), msg);
    }

    /// Print a header.
    pub fn header(msg: &str) {
        println!("\n{}", style(msg).bold().underlined());
    }

    /// Print a key-value pair.
    pub fn kv(key: &str, value: &str) {
        println!("  {}: {}", style(key).dim(), value);
    }

    /// Print a list item.
    pub fn list_item(msg: &str) {
        println!("  {} {}", style("*").cyan(), msg);
    }

    /// Print a summary between rules.
    pub fn summary(index: usize, title: &str, body: &str) {
        let rule = "=".repeat(80);
        println!("\n{}", style(&rule).dim());
        println!("{}", style(format!("SUMMARY {} - {}", index, title)).bold());
        println!("{}", style(&rule).dim());
        println!("{}", body);
    }

    /// Create a spinner.
    pub fn spinner(msg: &str) -> ProgressBar {
        let pb = ProgressBar::new_spinner();
        let style = ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner());
        pb.set_style(style);
        pb.set_message(msg.to_string());
        pb.enable_steady_tick(std::time::Duration::from_millis(100));
        pb
    }

    /// Print the end-of-batch tally.
    pub fn report(report: &BatchReport) {
        println!();
        let line = format!(
            "{} completed, {} skipped, {} failed",
            report.completed(),
            report.skipped(),
            report.failed()
        );
        if report.failed() > 0 {
            Output::warning(&line);
        } else {
            Output::success(&line);
        }
        if report.quit {
            Output::info("Stopped early.");
        }
    }
}

/// Presents batch progress on the terminal.
///
/// A spinner runs from the start of a video until its summary is ready.
#[derive(Default)]
pub struct ConsoleObserver {
    spinner: Mutex<Option<ProgressBar>>,
}

impl ConsoleObserver {
    pub fn new() -> Self {
        Self::default()
    }

    fn set_spinner(&self, msg: Option<&str>) {
        if let Ok(mut slot) = self.spinner.lock() {
            if let Some(pb) = slot.take() {
                pb.finish_and_clear();
            }
            *slot = msg.map(Output::spinner);
        }
    }
}

impl BatchObserver for ConsoleObserver {
    fn preview(&self, total: usize, titles: &[String]) {
        Output::header(&format!("Found {} video(s)", total));
        for (i, title) in titles.iter().enumerate() {
            println!("  {}. {}", i + 1, title);
        }
        if total > titles.len() {
            println!("  {}", style(format!("... and {} more", total - titles.len())).dim());
        }
        println!();
    }

    fn video_started(&self, index: usize, total: usize, video_id: &str) {
        self.set_spinner(Some(&format!("[{}/{}] Fetching transcript for {}", index, total, video_id)));
    }

    fn transcript_ready(&self, record: &TranscriptRecord, cached: bool) {
        let source = if cached { "cached" } else { "downloaded" };
        self.set_spinner(Some(&format!(
            "Summarizing '{}' ({} transcript, {})",
            record.title,
            source,
            format_duration(record.duration_seconds())
        )));
    }

    fn awaiting_confirmation(&self, _index: usize, _record: &TranscriptRecord) {
        self.set_spinner(None);
    }

    fn summary_ready(&self, index: usize, record: &TranscriptRecord, summary: &str) {
        self.set_spinner(None);
        Output::summary(index, &record.title, summary);
        Output::kv("Channel", &record.channel);
        Output::kv("URL", &record.watch_url());
    }

    fn audio_ready(&self, outcome: &SpeechOutcome) {
        let origin = if outcome.cached { "cached" } else { "new" };
        match &outcome.playback {
            Playback::Played(player) => Output::kv(
                "Audio",
                &format!("{} ({}, played with {})", outcome.path.display(), origin, player),
            ),
            Playback::NoPlayer(wanted) => {
                Output::kv("Audio", &format!("{} ({})", outcome.path.display(), origin));
                Output::warning(&format!("No audio player found ({}); audio saved only.", wanted));
            }
            Playback::Failed(reason) => {
                Output::kv("Audio", &format!("{} ({})", outcome.path.display(), origin));
                Output::warning(&format!("Playback failed: {}", reason));
            }
        }
    }

    fn video_skipped(&self, index: usize, video_id: &str) {
        self.set_spinner(None);
        Output::info(&format!("Skipped video {} ({}).", index, video_id));
    }

    fn video_failed(&self, index: usize, video_id: &str, stage: Stage, error: &RecapError) {
        self.set_spinner(None);
        Output::error(&format!(
            "Video {} ({}) failed while {}: {}",
            index, video_id, stage, error
        ));
    }
}

/// Format duration in seconds to a human-readable string.
fn format_duration(seconds: f64) -> String {
    let total_seconds = seconds as u32;
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let secs = total_seconds % 60;

    if hours > 0 {
        format!("{}h {}m {}s", hours, minutes, secs)
    } else if minutes > 0 {
        format!("{}m {}s", minutes, secs)
    } else {
        format!("{}s", secs)
    }
}
