//! List command implementation.

use crate::cache::{EntryKind, FileCache};
use crate::cli::Output;
use crate::config::Settings;
use anyhow::Result;

/// Run the list command.
pub fn run_list(settings: &Settings) -> Result<()> {
    let cache = FileCache::new(settings.transcripts_dir(), settings.audio_dir());
    let entries = cache.entries()?;

    if entries.is_empty() {
        Output::info("Nothing cached yet. Use 'recap video <url>' to add content.");
        return Ok(());
    }

    for kind in [EntryKind::Transcript, EntryKind::Audio] {
        let group: Vec<_> = entries.iter().filter(|e| e.kind == kind).collect();
        if group.is_empty() {
            continue;
        }

        let label = match kind {
            EntryKind::Transcript => "Transcripts",
            EntryKind::Audio => "Audio",
        };
        Output::header(&format!("{} ({})", label, group.len()));
        for entry in &group {
            Output::list_item(&format!("{} ({})", entry.name, format_size(entry.size)));
        }
    }

    let total: u64 = entries.iter().map(|e| e.size).sum();
    println!();
    Output::kv("Total files", &entries.len().to_string());
    Output::kv("Total size", &format_size(total));

    Ok(())
}

/// Format file size in human-readable format.
fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;

    if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}
