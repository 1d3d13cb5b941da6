//! YouTube target resolution.
//!
//! Turns a user reference (video URL or id, channel, playlist, search phrase)
//! into an ordered list of video ids, using the Data API for everything
//! except single videos.

mod data_api;
mod reference;

pub use data_api::DataApiClient;
pub use reference::{
    is_youtube_url, parse_channel, parse_playlist_id, parse_video_id, sanitize_id, ChannelRef,
};

use crate::error::{RecapError, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::{info, instrument};

/// What kind of reference the user supplied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetMode {
    Video,
    Channel,
    Playlist,
    Search,
}

impl std::fmt::Display for TargetMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TargetMode::Video => write!(f, "video"),
            TargetMode::Channel => write!(f, "channel"),
            TargetMode::Playlist => write!(f, "playlist"),
            TargetMode::Search => write!(f, "search"),
        }
    }
}

/// Metadata about a single video.
#[derive(Debug, Clone, PartialEq)]
pub struct VideoMetadata {
    pub id: String,
    pub title: String,
    pub channel: String,
    pub published_at: Option<DateTime<Utc>>,
}

/// Video metadata and listing provider.
#[async_trait]
pub trait VideoCatalog: Send + Sync {
    /// Fetch title and channel for one video.
    async fn video_metadata(&self, video_id: &str) -> Result<VideoMetadata>;

    /// Resolve an `@handle` to a channel id.
    async fn channel_id_for_handle(&self, handle: &str) -> Result<String>;

    /// Resolve a legacy username to a channel id.
    async fn channel_id_for_username(&self, username: &str) -> Result<String>;

    /// Most recent uploads of a channel, newest first, at most `max`.
    async fn channel_uploads(&self, channel_id: &str, max: usize) -> Result<Vec<String>>;

    /// Videos of a playlist in playlist order, at most `max`.
    async fn playlist_items(&self, playlist_id: &str, max: usize) -> Result<Vec<String>>;

    /// Video search results in relevance order, at most `max`.
    async fn search(&self, query: &str, max: usize) -> Result<Vec<String>>;
}

/// Expands references into video ids.
pub struct TargetResolver {
    catalog: Arc<dyn VideoCatalog>,
}

impl TargetResolver {
    pub fn new(catalog: Arc<dyn VideoCatalog>) -> Self {
        Self { catalog }
    }

    /// Resolve `reference` to at most `max` video ids, preserving provider order.
    ///
    /// Single videos are parsed locally without a network call.
    #[instrument(skip(self), fields(mode = %mode))]
    pub async fn resolve(
        &self,
        reference: &str,
        mode: TargetMode,
        max: usize,
    ) -> Result<Vec<String>> {
        let reference = reference.trim();
        if reference.is_empty() {
            return Err(RecapError::InvalidInput(format!(
                "Empty {} reference",
                mode
            )));
        }

        let mut ids = match mode {
            TargetMode::Video => vec![parse_video_id(reference)?],
            TargetMode::Channel => {
                let channel_id = match parse_channel(reference)? {
                    ChannelRef::Id(id) => id,
                    ChannelRef::Handle(handle) => {
                        self.catalog.channel_id_for_handle(&handle).await?
                    }
                    ChannelRef::Username(name) => {
                        self.catalog.channel_id_for_username(&name).await?
                    }
                };
                self.catalog.channel_uploads(&channel_id, max).await?
            }
            TargetMode::Playlist => {
                let playlist_id = parse_playlist_id(reference)?;
                self.catalog.playlist_items(&playlist_id, max).await?
            }
            TargetMode::Search => self.catalog.search(reference, max).await?,
        };

        ids.truncate(max);

        if ids.is_empty() {
            return Err(RecapError::NoVideos(format!("{} '{}'", mode, reference)));
        }

        info!("Resolved {} video(s)", ids.len());
        Ok(ids)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Catalog returning a fixed number of ids for every listing call.
    struct FixedCatalog {
        count: usize,
        calls: Mutex<Vec<String>>,
    }

    impl FixedCatalog {
        fn new(count: usize) -> Self {
            Self {
                count,
                calls: Mutex::new(Vec::new()),
            }
        }

        fn ids(&self) -> Vec<String> {
            (0..self.count).map(|i| format!("vid{}", i)).collect()
        }

        fn record(&self, call: String) {
            self.calls.lock().unwrap().push(call);
        }
    }

    #[async_trait]
    impl VideoCatalog for FixedCatalog {
        async fn video_metadata(&self, video_id: &str) -> Result<VideoMetadata> {
            self.record(format!("metadata:{}", video_id));
            Ok(VideoMetadata {
                id: video_id.to_string(),
                title: "t".into(),
                channel: "c".into(),
                published_at: None,
            })
        }

        async fn channel_id_for_handle(&self, handle: &str) -> Result<String> {
            self.record(format!("handle:{}", handle));
            Ok("UCresolved".into())
        }

        async fn channel_id_for_username(&self, username: &str) -> Result<String> {
            self.record(format!("user:{}", username));
            Ok("UClegacy".into())
        }

        async fn channel_uploads(&self, channel_id: &str, _max: usize) -> Result<Vec<String>> {
            self.record(format!("channel:{}", channel_id));
            Ok(self.ids())
        }

        async fn playlist_items(&self, playlist_id: &str, _max: usize) -> Result<Vec<String>> {
            self.record(format!("playlist:{}", playlist_id));
            Ok(self.ids())
        }

        async fn search(&self, query: &str, _max: usize) -> Result<Vec<String>> {
            self.record(format!("search:{}", query));
            Ok(self.ids())
        }
    }

    #[tokio::test]
    async fn test_single_video_needs_no_network() {
        let catalog = Arc::new(FixedCatalog::new(5));
        let resolver = TargetResolver::new(catalog.clone());

        let ids = resolver
            .resolve("https://youtu.be/abc123", TargetMode::Video, 10)
            .await
            .unwrap();

        assert_eq!(ids, vec!["abc123"]);
        assert!(catalog.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_max_videos_caps_every_listing_mode() {
        let catalog = Arc::new(FixedCatalog::new(20));
        let resolver = TargetResolver::new(catalog.clone());

        for (reference, mode) in [
            ("UCabc", TargetMode::Channel),
            ("PLabc", TargetMode::Playlist),
            ("rust async", TargetMode::Search),
        ] {
            let ids = resolver.resolve(reference, mode, 3).await.unwrap();
            assert_eq!(ids, vec!["vid0", "vid1", "vid2"]);
        }

        assert_eq!(
            *catalog.calls.lock().unwrap(),
            vec!["channel:UCabc", "playlist:PLabc", "search:rust async"]
        );
    }

    #[tokio::test]
    async fn test_handle_is_resolved_first() {
        let catalog = Arc::new(FixedCatalog::new(2));
        let resolver = TargetResolver::new(catalog.clone());

        resolver
            .resolve("https://www.youtube.com/@someone", TargetMode::Channel, 10)
            .await
            .unwrap();

        assert_eq!(
            *catalog.calls.lock().unwrap(),
            vec!["handle:someone", "channel:UCresolved"]
        );
    }

    #[tokio::test]
    async fn test_legacy_username_uses_username_lookup() {
        let catalog = Arc::new(FixedCatalog::new(1));
        let resolver = TargetResolver::new(catalog.clone());

        resolver
            .resolve("https://www.youtube.com/user/oldname", TargetMode::Channel, 10)
            .await
            .unwrap();

        assert_eq!(
            *catalog.calls.lock().unwrap(),
            vec!["user:oldname", "channel:UClegacy"]
        );
    }

    #[tokio::test]
    async fn test_zero_results_is_fatal() {
        let resolver = TargetResolver::new(Arc::new(FixedCatalog::new(0)));
        let err = resolver
            .resolve("nothing matches", TargetMode::Search, 5)
            .await
            .unwrap_err();
        assert!(matches!(err, RecapError::NoVideos(_)));
        assert!(err.is_fatal());
    }

    #[tokio::test]
    async fn test_unparseable_reference_is_fatal() {
        let resolver = TargetResolver::new(Arc::new(FixedCatalog::new(1)));
        let err = resolver
            .resolve("https://example.com/nope", TargetMode::Video, 1)
            .await
            .unwrap_err();
        assert!(err.is_fatal());
    }
}
