//! Caption download through `yt-transcript-rs`.

use super::{TranscriptProvider, TranscriptSegment};
use crate::error::{RecapError, Result};
use async_trait::async_trait;
use tracing::{debug, instrument};
use yt_transcript_rs::api::YouTubeTranscriptApi;

/// Transcript provider backed by YouTube's caption tracks.
pub struct YtTranscriptProvider {
    api: YouTubeTranscriptApi,
    languages: Vec<String>,
}

impl YtTranscriptProvider {
    /// Create a provider preferring `languages`, in order.
    pub fn new(languages: &[String]) -> Result<Self> {
        let api = YouTubeTranscriptApi::new(None, None, None).map_err(|e| {
            RecapError::Config(format!("Failed to initialize transcript client: {}", e))
        })?;

        let languages = if languages.is_empty() {
            vec!["en".to_string()]
        } else {
            languages.to_vec()
        };

        Ok(Self { api, languages })
    }
}

#[async_trait]
impl TranscriptProvider for YtTranscriptProvider {
    #[instrument(skip(self))]
    async fn fetch(&self, video_id: &str) -> Result<Vec<TranscriptSegment>> {
        let languages: Vec<&str> = self.languages.iter().map(String::as_str).collect();

        let fetched = self
            .api
            .fetch_transcript(video_id, &languages, false)
            .await
            .map_err(|e| RecapError::TranscriptUnavailable {
                video_id: video_id.to_string(),
                reason: e.to_string(),
            })?;

        debug!("Received {} snippets", fetched.snippets.len());

        Ok(fetched
            .snippets
            .into_iter()
            .map(|s| TranscriptSegment {
                text: s.text,
                start: s.start,
                duration: s.duration,
            })
            .collect())
    }
}
