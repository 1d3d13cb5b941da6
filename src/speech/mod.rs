//! Spoken summaries.
//!
//! Audio is cached per (video id, template name) in `audio/` and played
//! through whichever local player is installed.

mod openai;
mod player;

pub use openai::OpenAISpeech;
pub use player::SystemPlayer;

use crate::cache::{CacheKey, CacheProbe, FileCache};
use crate::error::{RecapError, Result};
use async_trait::async_trait;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{instrument, warn};

/// Voices offered by the TTS provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Voice {
    #[default]
    Alloy,
    Echo,
    Fable,
    Onyx,
    Nova,
    Shimmer,
}

impl std::str::FromStr for Voice {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "alloy" => Ok(Voice::Alloy),
            "echo" => Ok(Voice::Echo),
            "fable" => Ok(Voice::Fable),
            "onyx" => Ok(Voice::Onyx),
            "nova" => Ok(Voice::Nova),
            "shimmer" => Ok(Voice::Shimmer),
            _ => Err(format!(
                "Unknown voice: {} (expected alloy, echo, fable, onyx, nova or shimmer)",
                s
            )),
        }
    }
}

impl std::fmt::Display for Voice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Voice::Alloy => "alloy",
            Voice::Echo => "echo",
            Voice::Fable => "fable",
            Voice::Onyx => "onyx",
            Voice::Nova => "nova",
            Voice::Shimmer => "shimmer",
        };
        write!(f, "{}", name)
    }
}

/// Text-to-speech endpoint producing MP3 bytes.
#[async_trait]
pub trait SpeechProvider: Send + Sync {
    async fn synthesize(&self, text: &str, voice: Voice) -> Result<Vec<u8>>;
}

/// Local audio playback.
#[async_trait]
pub trait AudioPlayer: Send + Sync {
    /// Play `path` to completion, returning the player used.
    ///
    /// Returns `ToolNotFound` when no player is installed.
    async fn play(&self, path: &Path) -> Result<String>;
}

/// What happened when playback was attempted.
#[derive(Debug, Clone, PartialEq)]
pub enum Playback {
    Played(String),
    NoPlayer(String),
    Failed(String),
}

/// Result of speaking one summary.
#[derive(Debug, Clone)]
pub struct SpeechOutcome {
    pub path: PathBuf,
    /// True when the audio came from the cache.
    pub cached: bool,
    pub playback: Playback,
}

/// Cache-first speech synthesis plus playback.
pub struct AudioSynthesizer {
    cache: FileCache,
    provider: Arc<dyn SpeechProvider>,
    player: Arc<dyn AudioPlayer>,
}

impl AudioSynthesizer {
    pub fn new(
        cache: FileCache,
        provider: Arc<dyn SpeechProvider>,
        player: Arc<dyn AudioPlayer>,
    ) -> Self {
        Self {
            cache,
            provider,
            player,
        }
    }

    /// Synthesize (or reuse) audio for `summary` and play it.
    ///
    /// Playback problems are reported in the outcome, never as errors; the
    /// audio is cached either way.
    #[instrument(skip(self, summary))]
    pub async fn speak(
        &self,
        summary: &str,
        video_id: &str,
        template: &str,
        voice: Voice,
    ) -> Result<SpeechOutcome> {
        let key = CacheKey::Audio {
            video_id: video_id.to_string(),
            template: template.to_string(),
        };
        let probe = CacheProbe::Key(key.clone());
        let provider = &self.provider;

        let cached = self
            .cache
            .memoize::<Vec<u8>, _, _>(&probe, move || async move {
                if summary.trim().is_empty() {
                    return Err(RecapError::InvalidInput("Nothing to synthesize".into()));
                }
                let audio = provider.synthesize(summary, voice).await?;
                Ok((key, audio))
            })
            .await?;

        let playback = match self.player.play(&cached.path).await {
            Ok(player) => Playback::Played(player),
            Err(RecapError::ToolNotFound(what)) => {
                warn!("No audio player available: {}", what);
                Playback::NoPlayer(what)
            }
            Err(e) => {
                warn!("Playback failed: {}", e);
                Playback::Failed(e.to_string())
            }
        };

        Ok(SpeechOutcome {
            path: cached.path,
            cached: cached.hit,
            playback,
        })
    }
}
