//! Parsing of user-supplied video, playlist and channel references.

use crate::error::{RecapError, Result};
use regex::Regex;
use std::sync::OnceLock;
use url::Url;

const MAX_ID_LEN: usize = 128;

/// Channel reference after parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelRef {
    /// A `UC...` channel id.
    Id(String),
    /// An `@handle`, without the `@`.
    Handle(String),
    /// A legacy `/user/<name>` username.
    Username(String),
}

fn video_url_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"(?x)
            (?:https?://)?
            (?:www\.|m\.)?
            (?:
                youtube\.com/(?:watch\?(?:.*&)?v=|embed/|v/|shorts/|live/)
                |
                youtu\.be/
            )
            ([A-Za-z0-9_-]+)
            ",
        )
        .expect("Invalid regex")
    })
}

fn channel_url_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"youtube\.com/(?:(channel)/([A-Za-z0-9_-]+)|@([A-Za-z0-9_.-]+)|user/([^/?#]+)|c/([^/?#]+))",
        )
            .expect("Invalid regex")
    })
}

/// Ensure an identifier only holds characters YouTube ids use.
pub fn sanitize_id(raw: &str) -> Result<String> {
    let trimmed = raw.trim();

    if trimmed.is_empty() {
        return Err(RecapError::InvalidInput("Identifier cannot be empty".into()));
    }

    if trimmed.len() > MAX_ID_LEN {
        return Err(RecapError::InvalidInput(
            "Identifier is unexpectedly long".into(),
        ));
    }

    if !trimmed
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_'))
    {
        return Err(RecapError::InvalidInput(format!(
            "'{}' contains unsupported characters; expected only letters, numbers, '-' or '_'",
            trimmed
        )));
    }

    Ok(trimmed.to_string())
}

/// Extract a video id from a watch/short/embed URL or a bare id.
pub fn parse_video_id(input: &str) -> Result<String> {
    let input = input.trim();

    if let Some(caps) = video_url_regex().captures(input) {
        return sanitize_id(&caps[1]);
    }

    if looks_like_url(input) {
        return Err(RecapError::InvalidInput(format!(
            "Could not extract video ID from: {}",
            input
        )));
    }

    sanitize_id(input).map_err(|_| {
        RecapError::InvalidInput(format!("Could not extract video ID from: {}", input))
    })
}

/// Extract a playlist id from a URL carrying `list=` or a bare id.
pub fn parse_playlist_id(input: &str) -> Result<String> {
    let input = input.trim();

    if is_channel_url(input) {
        return Err(RecapError::InvalidInput(
            "This appears to be a channel URL, not a playlist URL. Use the 'channel' command instead."
                .into(),
        ));
    }

    if let Some(list) = query_param(input, "list") {
        return sanitize_id(&list);
    }

    if !looks_like_url(input)
        && ["PL", "UU", "LL", "FL", "OL", "RD"]
            .iter()
            .any(|p| input.starts_with(p))
    {
        return sanitize_id(input);
    }

    Err(RecapError::InvalidInput(format!(
        "Could not extract playlist ID from: {}",
        input
    )))
}

/// Parse a channel id, channel URL or `@handle`.
pub fn parse_channel(input: &str) -> Result<ChannelRef> {
    let input = input.trim();

    if is_playlist_url(input) {
        return Err(RecapError::InvalidInput(
            "This appears to be a playlist URL, not a channel URL. Use the 'playlist' command instead."
                .into(),
        ));
    }

    if let Some(caps) = channel_url_regex().captures(input) {
        if let Some(id) = caps.get(2) {
            return Ok(ChannelRef::Id(sanitize_id(id.as_str())?));
        }
        if let Some(handle) = caps.get(3) {
            return Ok(ChannelRef::Handle(handle.as_str().to_string()));
        }
        if let Some(user) = caps.get(4) {
            return Ok(ChannelRef::Username(user.as_str().to_string()));
        }
        if let Some(custom) = caps.get(5) {
            return Err(RecapError::InvalidInput(format!(
                "Custom channel URLs (/c/{}) cannot be looked up through the YouTube API. \
                 Use the channel's @handle or its UC... id instead.",
                custom.as_str()
            )));
        }
    }

    if let Some(handle) = input.strip_prefix('@') {
        if !handle.is_empty() && !handle.contains(['/', ' ']) {
            return Ok(ChannelRef::Handle(handle.to_string()));
        }
    }

    if !looks_like_url(input) {
        if let Ok(id) = sanitize_id(input) {
            return Ok(ChannelRef::Id(id));
        }
    }

    Err(RecapError::InvalidInput(format!(
        "Could not extract channel ID from: {}",
        input
    )))
}

/// Whether the text mentions a YouTube host.
pub fn is_youtube_url(input: &str) -> bool {
    input.contains("youtube.com") || input.contains("youtu.be")
}

fn is_channel_url(input: &str) -> bool {
    channel_url_regex().is_match(input)
}

fn is_playlist_url(input: &str) -> bool {
    input.contains("list=") || input.contains("/playlist")
}

fn looks_like_url(input: &str) -> bool {
    input.contains("://") || input.contains('/') || is_youtube_url(input)
}

fn query_param(input: &str, name: &str) -> Option<String> {
    let with_scheme = if input.contains("://") {
        input.to_string()
    } else {
        format!("https://{}", input)
    };

    Url::parse(&with_scheme)
        .ok()?
        .query_pairs()
        .find(|(k, _)| k == name)
        .map(|(_, v)| v.into_owned())
}
