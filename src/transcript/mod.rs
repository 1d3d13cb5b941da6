//! Transcript acquisition.
//!
//! Transcripts are fetched once per video and kept in the file cache under
//! `transcripts/<channel>/<video_id>_<title>.json`.

mod provider;

pub use provider::YtTranscriptProvider;

use crate::cache::{CacheCodec, CacheKey, CacheProbe, Cached, FileCache};
use crate::error::Result;
use crate::youtube::VideoCatalog;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument};

/// One timed caption line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptSegment {
    pub text: String,
    /// Start time in seconds.
    pub start: f64,
    /// Duration in seconds.
    pub duration: f64,
}

/// A transcript with the metadata used to file it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptRecord {
    pub video_id: String,
    pub title: String,
    pub channel: String,
    #[serde(default)]
    pub published_at: Option<DateTime<Utc>>,
    #[serde(rename = "transcript")]
    pub segments: Vec<TranscriptSegment>,
    pub full_text: String,
}

impl TranscriptRecord {
    pub fn new(
        video_id: &str,
        title: &str,
        channel: &str,
        published_at: Option<DateTime<Utc>>,
        segments: Vec<TranscriptSegment>,
    ) -> Self {
        let full_text = segments
            .iter()
            .map(|s| s.text.trim())
            .filter(|t| !t.is_empty())
            .collect::<Vec<_>>()
            .join(" ");

        Self {
            video_id: video_id.to_string(),
            title: title.to_string(),
            channel: channel.to_string(),
            published_at,
            segments,
            full_text,
        }
    }

    /// Cache key this record is stored under.
    pub fn cache_key(&self) -> CacheKey {
        CacheKey::Transcript {
            video_id: self.video_id.clone(),
            channel: self.channel.clone(),
            title: self.title.clone(),
        }
    }

    pub fn watch_url(&self) -> String {
        format!("https://www.youtube.com/watch?v={}", self.video_id)
    }

    /// End of the last segment, in seconds.
    pub fn duration_seconds(&self) -> f64 {
        self.segments
            .last()
            .map(|s| s.start + s.duration)
            .unwrap_or(0.0)
    }
}

impl CacheCodec for TranscriptRecord {
    fn encode(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec_pretty(self)?)
    }

    fn decode(bytes: &[u8]) -> Result<Self> {
        Ok(serde_json::from_slice(bytes)?)
    }
}

/// Source of caption segments for a video.
#[async_trait]
pub trait TranscriptProvider: Send + Sync {
    async fn fetch(&self, video_id: &str) -> Result<Vec<TranscriptSegment>>;
}

/// Cache-first transcript lookup.
pub struct TranscriptAcquirer {
    cache: FileCache,
    catalog: Arc<dyn VideoCatalog>,
    provider: Arc<dyn TranscriptProvider>,
}

impl TranscriptAcquirer {
    pub fn new(
        cache: FileCache,
        catalog: Arc<dyn VideoCatalog>,
        provider: Arc<dyn TranscriptProvider>,
    ) -> Self {
        Self {
            cache,
            catalog,
            provider,
        }
    }

    /// Return the transcript for `video_id`, fetching and caching it on a miss.
    ///
    /// A hit touches neither the metadata catalog nor the transcript provider.
    #[instrument(skip(self))]
    pub async fn acquire(&self, video_id: &str) -> Result<Cached<TranscriptRecord>> {
        let probe = CacheProbe::TranscriptFor(video_id.to_string());
        self.cache
            .memoize(&probe, move || self.fetch_record(video_id))
            .await
    }

    async fn fetch_record(&self, video_id: &str) -> Result<(CacheKey, TranscriptRecord)> {
        let segments = self.provider.fetch(video_id).await?;
        let metadata = self.catalog.video_metadata(video_id).await?;
        info!(
            "Fetched {} transcript segments for '{}'",
            segments.len(),
            metadata.title
        );

        let record = TranscriptRecord::new(
            video_id,
            &metadata.title,
            &metadata.channel,
            metadata.published_at,
            segments,
        );
        Ok((record.cache_key(), record))
    }
}
