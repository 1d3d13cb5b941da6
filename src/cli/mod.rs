//! CLI module for Recap.

pub mod clipboard;
pub mod commands;
pub mod confirm;
mod output;
pub mod preflight;

pub use output::{ConsoleObserver, Output};

use crate::error::RecapError;
use crate::speech::Voice;
use crate::youtube::TargetMode;
use clap::{Args, Parser, Subcommand};

/// Recap - YouTube transcript summarizer
///
/// Fetches transcripts for a video, channel, playlist or search, summarizes
/// them with an LLM and can read the summaries aloud.
#[derive(Parser, Debug)]
#[command(name = "recap")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(long, global = true, env = "RECAP_CONFIG")]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Options shared by every summarize command.
#[derive(Args, Debug, Clone)]
pub struct SummarizeArgs {
    /// Prompt template name (prompts/<name>.txt)
    #[arg(short, long, default_value = "default")]
    pub template: String,

    /// Read the reference from the system clipboard
    #[arg(short, long)]
    pub clipboard: bool,

    /// Read each summary aloud
    #[arg(short, long)]
    pub play_audio: bool,

    /// Voice for spoken summaries (defaults to speech.voice in config)
    #[arg(long, value_enum)]
    pub voice: Option<Voice>,

    /// Skip confirmation prompts
    #[arg(short = 'y', long)]
    pub auto_confirm: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Summarize a single video
    Video {
        /// Video URL or id
        reference: Option<String>,

        #[command(flatten)]
        args: SummarizeArgs,
    },

    /// Summarize the latest uploads of a channel
    Channel {
        /// Channel URL, @handle or id
        reference: Option<String>,

        /// Maximum number of videos
        #[arg(short, long, default_value_t = 10)]
        max_videos: usize,

        #[command(flatten)]
        args: SummarizeArgs,
    },

    /// Summarize the videos of a playlist
    Playlist {
        /// Playlist URL or id
        reference: Option<String>,

        /// Maximum number of videos
        #[arg(short, long, default_value_t = 50)]
        max_videos: usize,

        #[command(flatten)]
        args: SummarizeArgs,
    },

    /// Summarize the top results of a search
    Search {
        /// Search query
        query: Option<String>,

        /// Maximum number of videos
        #[arg(short, long, default_value_t = 5)]
        max_videos: usize,

        #[command(flatten)]
        args: SummarizeArgs,
    },

    /// Check API keys, players and directories
    Doctor,

    /// List cached transcripts and audio
    List,

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

impl Commands {
    /// Split a summarize command into its parts.
    ///
    /// Returns `None` for the maintenance commands.
    pub fn summarize_parts(&self) -> Option<(TargetMode, Option<&str>, usize, &SummarizeArgs)> {
        match self {
            Commands::Video { reference, args } => {
                Some((TargetMode::Video, reference.as_deref(), 1, args))
            }
            Commands::Channel {
                reference,
                max_videos,
                args,
            } => Some((TargetMode::Channel, reference.as_deref(), *max_videos, args)),
            Commands::Playlist {
                reference,
                max_videos,
                args,
            } => Some((TargetMode::Playlist, reference.as_deref(), *max_videos, args)),
            Commands::Search {
                query,
                max_videos,
                args,
            } => Some((TargetMode::Search, query.as_deref(), *max_videos, args)),
            _ => None,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show effective configuration
    Show,

    /// Show configuration file path
    Path,
}

/// Exit status for a command that returned an error.
///
/// Errors the user can fix before retrying (bad input, missing keys or
/// templates, nothing to summarize) exit with 2. Runtime failures exit with 1.
pub fn exit_status(err: &anyhow::Error) -> u8 {
    match err.downcast_ref::<RecapError>() {
        Some(e) if e.is_fatal() => 2,
        _ => 1,
    }
}
