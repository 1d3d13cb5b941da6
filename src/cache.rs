//! File-backed cache for transcripts and audio summaries.
//!
//! Entries are addressed only by their key. Nothing is ever expired or
//! revalidated: once a file is written it is trusted until someone deletes it.

use crate::error::{RecapError, Result};
use regex::Regex;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use std::time::SystemTime;
use tracing::{debug, info};

const TRANSCRIPT_EXT: &str = "json";
const AUDIO_SUFFIX: &str = "_openai.mp3";

/// Deterministic address of a cached artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheKey {
    /// `transcripts/<channel>/<video_id>_<title>.json`
    Transcript {
        video_id: String,
        channel: String,
        title: String,
    },
    /// `audio/<video_id>_<template>_openai.mp3`
    Audio { video_id: String, template: String },
}

/// How to look an entry up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheProbe {
    /// Exact key.
    Key(CacheKey),
    /// Any transcript stored for this video id, whatever its channel and title.
    TranscriptFor(String),
}

/// Byte encoding of a cacheable artifact.
pub trait CacheCodec: Sized {
    fn encode(&self) -> Result<Vec<u8>>;
    fn decode(bytes: &[u8]) -> Result<Self>;
}

/// Result of a memoized lookup.
#[derive(Debug)]
pub struct Cached<T> {
    pub value: T,
    pub path: PathBuf,
    /// True when the value came from disk and no fetch happened.
    pub hit: bool,
}

/// Kind of cached file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    Transcript,
    Audio,
}

/// A file found in the cache.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub kind: EntryKind,
    pub path: PathBuf,
    pub name: String,
    pub size: u64,
    pub modified: SystemTime,
}

/// Cache rooted at a transcripts directory and an audio directory.
#[derive(Debug, Clone)]
pub struct FileCache {
    transcripts_dir: PathBuf,
    audio_dir: PathBuf,
}

impl FileCache {
    pub fn new(transcripts_dir: impl Into<PathBuf>, audio_dir: impl Into<PathBuf>) -> Self {
        Self {
            transcripts_dir: transcripts_dir.into(),
            audio_dir: audio_dir.into(),
        }
    }

    pub fn transcripts_dir(&self) -> &Path {
        &self.transcripts_dir
    }

    pub fn audio_dir(&self) -> &Path {
        &self.audio_dir
    }

    /// File path for a key.
    pub fn path_for(&self, key: &CacheKey) -> PathBuf {
        match key {
            CacheKey::Transcript {
                video_id,
                channel,
                title,
            } => self
                .transcripts_dir
                .join(sanitize_component(channel))
                .join(format!(
                    "{}_{}.{}",
                    video_id,
                    sanitize_component(title),
                    TRANSCRIPT_EXT
                )),
            CacheKey::Audio { video_id, template } => self
                .audio_dir
                .join(format!("{}_{}{}", video_id, template, AUDIO_SUFFIX)),
        }
    }

    /// Locate an existing, non-empty entry.
    pub fn locate(&self, probe: &CacheProbe) -> Result<Option<PathBuf>> {
        match probe {
            CacheProbe::Key(key) => {
                let path = self.path_for(key);
                Ok(is_populated(&path).then_some(path))
            }
            CacheProbe::TranscriptFor(video_id) => self.find_transcript(video_id),
        }
    }

    /// Read and decode an entry, if present.
    pub fn get<T: CacheCodec>(&self, probe: &CacheProbe) -> Result<Option<(T, PathBuf)>> {
        match self.locate(probe)? {
            Some(path) => {
                let bytes = std::fs::read(&path)?;
                Ok(Some((T::decode(&bytes)?, path)))
            }
            None => Ok(None),
        }
    }

    /// Encode and write an entry, creating parent directories as needed.
    pub fn put<T: CacheCodec>(&self, key: &CacheKey, value: &T) -> Result<PathBuf> {
        let path = self.path_for(key);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&path, value.encode()?)?;
        debug!("Wrote cache entry {}", path.display());
        Ok(path)
    }

    /// Return the cached value for `probe`, or run `fetch` and store its result.
    ///
    /// `fetch` yields the value together with the key it should be stored
    /// under, since some keys (transcripts) are only known after fetching.
    pub async fn memoize<T, F, Fut>(&self, probe: &CacheProbe, fetch: F) -> Result<Cached<T>>
    where
        T: CacheCodec,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<(CacheKey, T)>>,
    {
        if let Some((value, path)) = self.get::<T>(probe)? {
            info!("Cache hit: {}", path.display());
            return Ok(Cached {
                value,
                path,
                hit: true,
            });
        }

        debug!("Cache miss: {:?}", probe);
        let (key, value) = fetch().await?;
        let path = self.put(&key, &value)?;

        Ok(Cached {
            value,
            path,
            hit: false,
        })
    }

    /// Scan channel directories for `<video_id>_*.json`.
    fn find_transcript(&self, video_id: &str) -> Result<Option<PathBuf>> {
        if !self.transcripts_dir.is_dir() {
            return Ok(None);
        }

        let prefix = format!("{}_", video_id);
        let mut channels: Vec<PathBuf> = std::fs::read_dir(&self.transcripts_dir)?
            .flatten()
            .map(|e| e.path())
            .filter(|p| p.is_dir())
            .collect();
        channels.sort();

        for channel in channels {
            let mut matches: Vec<PathBuf> = std::fs::read_dir(&channel)?
                .flatten()
                .map(|e| e.path())
                .filter(|p| {
                    p.extension().and_then(|e| e.to_str()) == Some(TRANSCRIPT_EXT)
                        && p
                            .file_name()
                            .and_then(|n| n.to_str())
                            .is_some_and(|n| n.starts_with(&prefix))
                        && is_populated(p)
                })
                .collect();
            matches.sort();
            // Ids may contain '_', so "abc_" also prefixes "abc_def_<title>.json".
            if let Some(found) = matches.into_iter().find(|p| stored_video_id(p).as_deref() == Some(video_id)) {
                return Ok(Some(found));
            }
        }

        Ok(None)
    }

    /// List every cached transcript and audio file, newest first.
    pub fn entries(&self) -> Result<Vec<CacheEntry>> {
        let mut entries = Vec::new();

        if self.transcripts_dir.is_dir() {
            for channel in std::fs::read_dir(&self.transcripts_dir)?.flatten() {
                if !channel.path().is_dir() {
                    continue;
                }
                for file in std::fs::read_dir(channel.path())?.flatten() {
                    let path = file.path();
                    if path.extension().and_then(|e| e.to_str()) == Some(TRANSCRIPT_EXT) {
                        entries.push(entry_for(EntryKind::Transcript, path)?);
                    }
                }
            }
        }

        if self.audio_dir.is_dir() {
            for file in std::fs::read_dir(&self.audio_dir)?.flatten() {
                let path = file.path();
                let is_audio = path
                    .file_name()
                    .and_then(|n| n.to_str())
                    .is_some_and(|n| n.ends_with(AUDIO_SUFFIX));
                if is_audio {
                    entries.push(entry_for(EntryKind::Audio, path)?);
                }
            }
        }

        entries.sort_by(|a, b| b.modified.cmp(&a.modified));
        Ok(entries)
    }
}

fn entry_for(kind: EntryKind, path: PathBuf) -> Result<CacheEntry> {
    let metadata = std::fs::metadata(&path)?;
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .map(str::to_string)
        .ok_or_else(|| RecapError::InvalidInput(format!("Bad file name: {}", path.display())))?;
    Ok(CacheEntry {
        kind,
        name,
        size: metadata.len(),
        modified: metadata.modified()?,
        path,
    })
}

/// The `video_id` recorded inside a transcript file.
fn stored_video_id(path: &Path) -> Option<String> {
    #[derive(serde::Deserialize)]
    struct IdOnly {
        video_id: String,
    }

    let bytes = std::fs::read(path).ok()?;
    serde_json::from_slice::<IdOnly>(&bytes).ok().map(|r| r.video_id)
}

fn is_populated(path: &Path) -> bool {
    std::fs::metadata(path).is_ok_and(|m| m.is_file() && m.len() > 0)
}

/// Replace characters that are not allowed in file names.
pub fn sanitize_component(raw: &str) -> String {
    static UNSAFE: OnceLock<Regex> = OnceLock::new();
    let re = UNSAFE.get_or_init(|| Regex::new(r#"[<>:"/\\|?*\x00-\x1f]"#).expect("valid regex"));
    let cleaned = re.replace_all(raw.trim(), "_").into_owned();
    if cleaned.trim_matches('.').is_empty() {
        "_".to_string()
    } else {
        cleaned
    }
}

impl CacheCodec for Vec<u8> {
    fn encode(&self) -> Result<Vec<u8>> {
        Ok(self.clone())
    }

    fn decode(bytes: &[u8]) -> Result<Self> {
        Ok(bytes.to_vec())
    }
}
