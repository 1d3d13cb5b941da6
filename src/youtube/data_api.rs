//! YouTube Data API v3 client.

use super::{VideoCatalog, VideoMetadata};
use crate::error::{RecapError, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, instrument};

const DEFAULT_BASE_URL: &str = "https://www.googleapis.com/youtube/v3";

/// The API caps `maxResults` at 50 per page.
const MAX_PAGE_SIZE: usize = 50;

#[derive(Debug, Deserialize)]
struct ListResponse<T> {
    #[serde(default = "Vec::new")]
    items: Vec<T>,
    #[serde(rename = "nextPageToken")]
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct VideoItem {
    id: String,
    snippet: VideoSnippet,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VideoSnippet {
    title: String,
    channel_title: String,
    published_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
struct ChannelIdItem {
    id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChannelItem {
    content_details: ChannelContentDetails,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChannelContentDetails {
    related_playlists: RelatedPlaylists,
}

#[derive(Debug, Deserialize)]
struct RelatedPlaylists {
    uploads: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PlaylistItem {
    content_details: PlaylistItemDetails,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PlaylistItemDetails {
    video_id: String,
}

#[derive(Debug, Deserialize)]
struct SearchItem {
    id: SearchId,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchId {
    video_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

/// HTTP client for the YouTube Data API.
pub struct DataApiClient {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl DataApiClient {
    /// Create a client with the given API key and request timeout.
    pub fn new(api_key: &str, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            api_key: api_key.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
        })
    }

    async fn get<T: DeserializeOwned>(&self, resource: &str, params: &[(&str, String)]) -> Result<T> {
        let url = format!("{}/{}", self.base_url, resource);
        debug!("GET {} {:?}", url, params);

        let response = self
            .http
            .get(&url)
            .query(params)
            .query(&[("key", self.api_key.as_str())])
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let message = serde_json::from_str::<ErrorEnvelope>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            return Err(RecapError::YouTubeApi(format!(
                "{} returned {}: {}",
                resource, status, message
            )));
        }

        Ok(serde_json::from_str(&body)?)
    }

    /// Follow `nextPageToken` through a playlist until `max` ids are collected.
    async fn collect_playlist(&self, playlist_id: &str, max: usize) -> Result<Vec<String>> {
        let mut videos = Vec::new();
        let mut page_token: Option<String> = None;

        while videos.len() < max {
            let page_size = MAX_PAGE_SIZE.min(max - videos.len());
            let mut params = vec![
                ("part", "contentDetails".to_string()),
                ("playlistId", playlist_id.to_string()),
                ("maxResults", page_size.to_string()),
            ];
            if let Some(token) = &page_token {
                params.push(("pageToken", token.clone()));
            }

            let page: ListResponse<PlaylistItem> = self.get("playlistItems", &params).await?;
            videos.extend(page.items.into_iter().map(|i| i.content_details.video_id));

            match page.next_page_token {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }

        videos.truncate(max);
        Ok(videos)
    }
}

#[async_trait]
impl VideoCatalog for DataApiClient {
    #[instrument(skip(self))]
    async fn video_metadata(&self, video_id: &str) -> Result<VideoMetadata> {
        let response: ListResponse<VideoItem> = self
            .get(
                "videos",
                &[("part", "snippet".to_string()), ("id", video_id.to_string())],
            )
            .await?;

        let item = response
            .items
            .into_iter()
            .next()
            .ok_or_else(|| RecapError::VideoNotFound(video_id.to_string()))?;

        Ok(VideoMetadata {
            id: item.id,
            title: item.snippet.title,
            channel: item.snippet.channel_title,
            published_at: item.snippet.published_at,
        })
    }

    #[instrument(skip(self))]
    async fn channel_id_for_handle(&self, handle: &str) -> Result<String> {
        let response: ListResponse<ChannelIdItem> = self
            .get(
                "channels",
                &[("part", "id".to_string()), ("forHandle", format!("@{}", handle))],
            )
            .await?;

        response
            .items
            .into_iter()
            .next()
            .map(|c| c.id)
            .ok_or_else(|| RecapError::InvalidInput(format!("Channel not found: @{}", handle)))
    }

    #[instrument(skip(self))]
    async fn channel_id_for_username(&self, username: &str) -> Result<String> {
        let response: ListResponse<ChannelIdItem> = self
            .get(
                "channels",
                &[("part", "id".to_string()), ("forUsername", username.to_string())],
            )
            .await?;

        response
            .items
            .into_iter()
            .next()
            .map(|c| c.id)
            .ok_or_else(|| RecapError::InvalidInput(format!("Channel not found: user/{}", username)))
    }

    #[instrument(skip(self))]
    async fn channel_uploads(&self, channel_id: &str, max: usize) -> Result<Vec<String>> {
        let response: ListResponse<ChannelItem> = self
            .get(
                "channels",
                &[
                    ("part", "contentDetails".to_string()),
                    ("id", channel_id.to_string()),
                ],
            )
            .await?;

        let uploads = response
            .items
            .into_iter()
            .next()
            .map(|c| c.content_details.related_playlists.uploads)
            .ok_or_else(|| RecapError::InvalidInput(format!("Channel not found: {}", channel_id)))?;

        self.collect_playlist(&uploads, max).await
    }

    #[instrument(skip(self))]
    async fn playlist_items(&self, playlist_id: &str, max: usize) -> Result<Vec<String>> {
        self.collect_playlist(playlist_id, max).await
    }

    #[instrument(skip(self))]
    async fn search(&self, query: &str, max: usize) -> Result<Vec<String>> {
        let response: ListResponse<SearchItem> = self
            .get(
                "search",
                &[
                    ("part", "id".to_string()),
                    ("q", query.to_string()),
                    ("type", "video".to_string()),
                    ("maxResults", max.clamp(1, MAX_PAGE_SIZE).to_string()),
                ],
            )
            .await?;

        Ok(response
            .items
            .into_iter()
            .filter_map(|i| i.id.video_id)
            .take(max)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_video_response() {
        let body = r#"{
            "items": [{
                "id": "abc123",
                "snippet": {
                    "title": "A Talk",
                    "channelTitle": "Conf Channel",
                    "publishedAt": "2024-03-01T12:00:00Z",
                    "description": "ignored"
                }
            }]
        }"#;
        let parsed: ListResponse<VideoItem> = serde_json::from_str(body).unwrap();
        let item = &parsed.items[0];
        assert_eq!(item.snippet.channel_title, "Conf Channel");
        assert!(item.snippet.published_at.is_some());
        assert!(parsed.next_page_token.is_none());
    }

    #[test]
    fn test_parse_playlist_page() {
        let body = r#"{
            "nextPageToken": "CAUQAA",
            "items": [
                {"contentDetails": {"videoId": "v1"}},
                {"contentDetails": {"videoId": "v2"}}
            ]
        }"#;
        let parsed: ListResponse<PlaylistItem> = serde_json::from_str(body).unwrap();
        let ids: Vec<_> = parsed.items.into_iter().map(|i| i.content_details.video_id).collect();
        assert_eq!(ids, vec!["v1", "v2"]);
        assert_eq!(parsed.next_page_token.as_deref(), Some("CAUQAA"));
    }

    #[test]
    fn test_parse_search_skips_non_videos() {
        let body = r#"{"items": [
            {"id": {"kind": "youtube#video", "videoId": "v1"}},
            {"id": {"kind": "youtube#channel", "channelId": "UC1"}}
        ]}"#;
        let parsed: ListResponse<SearchItem> = serde_json::from_str(body).unwrap();
        let ids: Vec<_> = parsed.items.into_iter().filter_map(|i| i.id.video_id).collect();
        assert_eq!(ids, vec!["v1"]);
    }

    #[test]
    fn test_empty_list_response() {
        let parsed: ListResponse<ChannelItem> = serde_json::from_str("{}").unwrap();
        assert!(parsed.items.is_empty());
    }

    #[test]
    fn test_error_envelope() {
        let body = r#"{"error": {"code": 403, "message": "quotaExceeded"}}"#;
        let parsed: ErrorEnvelope = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.error.message, "quotaExceeded");
    }
}
