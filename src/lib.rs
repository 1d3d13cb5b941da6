//! Recap - YouTube transcript summarizer
//!
//! A CLI tool that pulls transcripts for YouTube videos, summarizes them with
//! an LLM using prompt templates, and can read the summaries aloud.
//!
//! # Overview
//!
//! Recap allows you to:
//! - Summarize a single video, a channel's latest uploads, a playlist or a search
//! - Reuse transcripts and spoken summaries from a local file cache
//! - Shape summaries with plain-text prompt templates
//!
//! # Architecture
//!
//! - `config` - Settings, credentials and prompt templates
//! - `cache` - File cache for transcripts and audio
//! - `youtube` - Reference parsing, Data API client and target resolution
//! - `transcript` - Cache-first transcript acquisition
//! - `summary` - LLM summary generation
//! - `speech` - Text-to-speech synthesis and playback
//! - `orchestrator` - Per-batch pipeline
//!
//! # Example
//!
//! ```rust,no_run
//! use recap::config::PromptTemplate;
//! use std::path::Path;
//!
//! let template = PromptTemplate::load(Path::new("prompts"), "default")?;
//! println!("{}", template.render("transcript text"));
//! # Ok::<(), recap::RecapError>(())
//! ```

pub mod cache;
pub mod cli;
pub mod config;
pub mod error;
pub mod openai;
pub mod orchestrator;
pub mod speech;
pub mod summary;
pub mod transcript;
pub mod youtube;

pub use error::{RecapError, Result};
