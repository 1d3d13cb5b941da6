//! Pre-flight checks before a batch starts.
//!
//! Missing credentials stop the run before any network call. A missing audio
//! player only produces a warning, since audio is still synthesized and cached.

use crate::cli::Output;
use crate::config::{Credentials, Settings};
use crate::error::Result;
use std::process::Command;

/// Validate the environment for a summarize command and return the keys.
pub fn check_summarize(settings: &Settings, play_audio: bool) -> Result<Credentials> {
    let credentials = Credentials::from_env()?;

    if play_audio && find_player(&settings.speech.players).is_none() {
        Output::warning(&format!(
            "No audio player found (looked for {}). Audio will be saved but not played.",
            settings.speech.players.join(", ")
        ));
    }

    Ok(credentials)
}

/// First configured player that is installed.
pub fn find_player(players: &[String]) -> Option<String> {
    players.iter().find(|p| tool_available(p)).cloned()
}

/// Check if an external tool can be started.
pub fn tool_available(name: &str) -> bool {
    // ffmpeg-family tools use -version (single dash), others use --version
    let version_arg = match name {
        "ffplay" | "ffmpeg" | "ffprobe" => "-version",
        _ => "--version",
    };
    match Command::new(name).arg(version_arg).output() {
        Ok(output) => output.status.success(),
        Err(_) => false,
    }
}
