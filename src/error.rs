//! Error types for Recap.

use thiserror::Error;

/// Library-level error type for Recap operations.
#[derive(Error, Debug)]
pub enum RecapError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("No videos found for {0}")]
    NoVideos(String),

    #[error("Prompt template '{name}' not found at {path}")]
    TemplateNotFound { name: String, path: String },

    #[error("Video not found or unavailable: {0}")]
    VideoNotFound(String),

    #[error("No transcript available for {video_id}: {reason}")]
    TranscriptUnavailable { video_id: String, reason: String },

    #[error("YouTube API error: {0}")]
    YouTubeApi(String),

    #[error("OpenAI API error: {0}")]
    OpenAI(String),

    #[error("Clipboard error: {0}")]
    Clipboard(String),

    #[error("External tool not found: {0}. Please install it and ensure it's in your PATH.")]
    ToolNotFound(String),

    #[error("External tool failed: {0}")]
    ToolFailed(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

impl RecapError {
    /// Whether this error stops the whole batch rather than a single video.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            RecapError::Config(_)
                | RecapError::InvalidInput(_)
                | RecapError::NoVideos(_)
                | RecapError::TemplateNotFound { .. }
        )
    }
}

/// Result type alias for Recap operations.
pub type Result<T> = std::result::Result<T, RecapError>;
