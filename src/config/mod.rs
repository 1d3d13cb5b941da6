//! Configuration module for Recap.
//!
//! Handles loading application settings, API credentials and prompt templates.

mod prompts;
mod settings;

pub use prompts::{PromptTemplate, DEFAULT_TEMPLATE_NAME, TRANSCRIPT_PLACEHOLDER};
pub use settings::{
    Credentials, GeneralSettings, Settings, SpeechSettings, StorageSettings, SummarySettings,
    YoutubeSettings, OPENAI_API_KEY_ENV, YOUTUBE_API_KEY_ENV,
};
