//! Playback through locally installed command-line players.

use super::AudioPlayer;
use crate::error::{RecapError, Result};
use async_trait::async_trait;
use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;
use tracing::{debug, instrument, warn};

/// Tries each configured player in order until one starts.
pub struct SystemPlayer {
    players: Vec<String>,
}

impl SystemPlayer {
    pub fn new(players: &[String]) -> Self {
        Self {
            players: players.to_vec(),
        }
    }

    /// Arguments that make `player` play `path` once without a window.
    fn args_for(player: &str, path: &Path) -> Vec<String> {
        let file = path.to_string_lossy().into_owned();
        match player {
            "mpv" => vec!["--really-quiet".into(), "--no-video".into(), file],
            "ffplay" => vec![
                "-nodisp".into(),
                "-autoexit".into(),
                "-loglevel".into(),
                "quiet".into(),
                file,
            ],
            _ => vec![file],
        }
    }
}

#[async_trait]
impl AudioPlayer for SystemPlayer {
    #[instrument(skip(self))]
    async fn play(&self, path: &Path) -> Result<String> {
        let mut last_failure = None;

        for player in &self.players {
            let result = Command::new(player)
                .args(Self::args_for(player, path))
                .stdin(Stdio::null())
                .stdout(Stdio::null())
                .stderr(Stdio::piped())
                .output()
                .await;

            match result {
                Ok(out) if out.status.success() => return Ok(player.clone()),
                Ok(out) => {
                    let err = String::from_utf8_lossy(&out.stderr);
                    warn!("{} exited with {}, trying next player", player, out.status);
                    last_failure = Some(RecapError::ToolFailed(format!(
                        "{} exited with {}: {}",
                        player,
                        out.status,
                        err.trim()
                    )));
                }
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                    debug!("{} not installed", player);
                }
                Err(e) => {
                    warn!("{} could not start: {}", player, e);
                    last_failure = Some(RecapError::ToolFailed(format!("{}: {}", player, e)));
                }
            }
        }

        if let Some(err) = last_failure {
            return Err(err);
        }
        Err(RecapError::ToolNotFound(if self.players.is_empty() {
            "no audio players configured".to_string()
        } else {
            self.players.join(" or ")
        }))
    }
}
