//! Configuration settings for Recap.

use crate::error::{RecapError, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Environment variable holding the YouTube Data API key.
pub const YOUTUBE_API_KEY_ENV: &str = "YOUTUBE_API_KEY";
/// Environment variable holding the OpenAI API key.
pub const OPENAI_API_KEY_ENV: &str = "OPENAI_API_KEY";

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct Settings {
    pub general: GeneralSettings,
    pub storage: StorageSettings,
    pub summary: SummarySettings,
    pub speech: SpeechSettings,
    pub youtube: YoutubeSettings,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralSettings {
    /// Directory that transcripts, audio and prompts live under.
    pub base_dir: String,
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            base_dir: ".".to_string(),
            log_level: "warn".to_string(),
        }
    }
}

/// Directory names inside the base directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageSettings {
    pub transcripts_dir: String,
    pub audio_dir: String,
    pub prompts_dir: String,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            transcripts_dir: "transcripts".to_string(),
            audio_dir: "audio".to_string(),
            prompts_dir: "prompts".to_string(),
        }
    }
}

/// Summary generation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SummarySettings {
    /// Chat model used for summaries.
    pub model: String,
    /// Maximum completion tokens per summary.
    pub max_tokens: u32,
    /// Sampling temperature.
    pub temperature: f32,
    /// System message sent with every summary request.
    pub system_prompt: String,
}

impl Default for SummarySettings {
    fn default() -> Self {
        Self {
            model: "gpt-4o-mini".to_string(),
            max_tokens: 1000,
            temperature: 0.3,
            system_prompt: "You are a helpful assistant that creates concise and informative summaries of video transcripts.".to_string(),
        }
    }
}

/// Text-to-speech settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SpeechSettings {
    /// TTS model.
    pub model: String,
    /// Voice used when --voice is not given.
    pub voice: String,
    /// Players tried in order for playback.
    pub players: Vec<String>,
}

impl Default for SpeechSettings {
    fn default() -> Self {
        Self {
            model: "tts-1-hd".to_string(),
            voice: "alloy".to_string(),
            players: vec!["mpv".to_string(), "ffplay".to_string()],
        }
    }
}

/// YouTube-specific settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct YoutubeSettings {
    /// Preferred transcript languages, in order.
    pub languages: Vec<String>,
    /// Timeout for Data API requests, in seconds.
    pub request_timeout_secs: u64,
}

impl Default for YoutubeSettings {
    fn default() -> Self {
        Self {
            languages: vec!["en".to_string()],
            request_timeout_secs: 30,
        }
    }
}

/// API keys read from the environment.
#[derive(Clone)]
pub struct Credentials {
    pub youtube_api_key: String,
    pub openai_api_key: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("youtube_api_key", &"<redacted>")
            .field("openai_api_key", &"<redacted>")
            .finish()
    }
}

impl Credentials {
    /// Read both API keys from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read both API keys through `lookup`, reporting every missing key at once.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let youtube = read(YOUTUBE_API_KEY_ENV);
        let openai = read(OPENAI_API_KEY_ENV);

        match (youtube, openai) {
            (Some(youtube_api_key), Some(openai_api_key)) => Ok(Self {
                youtube_api_key,
                openai_api_key,
            }),
            (youtube, openai) => {
                let missing: Vec<&str> = [
                    youtube.is_none().then_some(YOUTUBE_API_KEY_ENV),
                    openai.is_none().then_some(OPENAI_API_KEY_ENV),
                ]
                .into_iter()
                .flatten()
                .collect();
                Err(RecapError::Config(format!(
                    "{} not set. Export it or add it to a .env file in the working directory",
                    missing.join(" and ")
                )))
            }
        }
    }
}

impl Settings {
    /// Load settings from a specific path, or default location if None.
    pub fn load_from(path: Option<&PathBuf>) -> Result<Self> {
        let config_path = match path {
            Some(p) => p.clone(),
            None => Self::default_config_path(),
        };

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let settings: Settings = toml::from_str(&content)?;
            Ok(settings)
        } else {
            Ok(Settings::default())
        }
    }

    /// Get the default configuration file path.
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("recap")
            .join("config.toml")
    }

    /// Expand shell variables in paths (e.g., ~).
    pub fn expand_path(path: &str) -> PathBuf {
        PathBuf::from(shellexpand::tilde(path).to_string())
    }

    /// Get the expanded base directory path.
    pub fn base_dir(&self) -> PathBuf {
        Self::expand_path(&self.general.base_dir)
    }

    /// Directory holding cached transcripts.
    pub fn transcripts_dir(&self) -> PathBuf {
        self.base_dir().join(&self.storage.transcripts_dir)
    }

    /// Directory holding cached audio summaries.
    pub fn audio_dir(&self) -> PathBuf {
        self.base_dir().join(&self.storage.audio_dir)
    }

    /// Directory holding prompt templates.
    pub fn prompts_dir(&self) -> PathBuf {
        self.base_dir().join(&self.storage.prompts_dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_default_paths() {
        let settings = Settings::default();
        assert_eq!(settings.transcripts_dir(), PathBuf::from("./transcripts"));
        assert_eq!(settings.audio_dir(), PathBuf::from("./audio"));
        assert_eq!(settings.prompts_dir(), PathBuf::from("./prompts"));
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let settings: Settings = toml::from_str(
            r#"
            [general]
            base_dir = "/srv/recap"

            [summary]
            model = "gpt-4o"
            "#,
        )
        .unwrap();

        assert_eq!(settings.base_dir(), PathBuf::from("/srv/recap"));
        assert_eq!(settings.summary.model, "gpt-4o");
        assert_eq!(settings.summary.max_tokens, 1000);
        assert_eq!(settings.speech.players, vec!["mpv", "ffplay"]);
    }

    #[test]
    fn test_missing_config_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.toml");
        let settings = Settings::load_from(Some(&path)).unwrap();
        assert_eq!(settings.summary.model, "gpt-4o-mini");
    }

    #[test]
    fn test_credentials_require_both_keys() {
        let mut env = HashMap::new();
        env.insert(OPENAI_API_KEY_ENV, "sk-test".to_string());

        let err = Credentials::from_lookup(|k| env.get(k).cloned()).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains(YOUTUBE_API_KEY_ENV));
        assert!(!msg.contains(OPENAI_API_KEY_ENV));

        env.insert(YOUTUBE_API_KEY_ENV, "yt-test".to_string());
        let creds = Credentials::from_lookup(|k| env.get(k).cloned()).unwrap();
        assert_eq!(creds.youtube_api_key, "yt-test");
        assert_eq!(creds.openai_api_key, "sk-test");
    }

    #[test]
    fn test_blank_key_counts_as_missing() {
        let err = Credentials::from_lookup(|_| Some("  ".to_string())).unwrap_err();
        assert!(err.to_string().contains(YOUTUBE_API_KEY_ENV));
        assert!(err.to_string().contains(OPENAI_API_KEY_ENV));
    }
}
