//! Summarize command - shared by video, channel, playlist and search.

use crate::cache::FileCache;
use crate::cli::clipboard::{ignored_argument, resolve_reference};
use crate::cli::confirm::StdinConfirmer;
use crate::cli::{preflight, ConsoleObserver, Output, SummarizeArgs};
use crate::config::{Credentials, Settings};
use crate::error::RecapError;
use crate::orchestrator::{AutoConfirm, BatchReport, BatchRequest, Confirmer, Orchestrator};
use crate::speech::{AudioSynthesizer, OpenAISpeech, SystemPlayer, Voice};
use crate::summary::{OpenAICompletion, SummaryGenerator};
use crate::transcript::{TranscriptAcquirer, YtTranscriptProvider};
use crate::youtube::{DataApiClient, TargetMode};
use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Run one summarize command end to end.
pub async fn run_summarize(
    mode: TargetMode,
    reference: Option<&str>,
    max_videos: usize,
    args: &SummarizeArgs,
    settings: Settings,
) -> Result<BatchReport> {
    let credentials = preflight::check_summarize(&settings, args.play_audio)?;
    if let Some(arg) = ignored_argument(reference, args.clipboard) {
        Output::warning(&format!("Ignoring '{}' and using the clipboard instead.", arg));
    }
    let reference = resolve_reference(reference, args.clipboard, mode)?;
    if args.clipboard {
        Output::info(&format!("Using {} from clipboard: {}", mode, reference));
    }

    let request = BatchRequest {
        reference,
        mode,
        max_videos,
        template: args.template.clone(),
        play_audio: args.play_audio,
        voice: pick_voice(args.voice, &settings)?,
        auto_confirm: args.auto_confirm,
    };
    debug!("Batch request: {:?}", request);

    let orchestrator = build_orchestrator(&settings, &credentials)?;
    let confirmer: &dyn Confirmer = if request.auto_confirm {
        &AutoConfirm
    } else {
        &StdinConfirmer
    };
    let observer = ConsoleObserver::new();

    let report = orchestrator.run(&request, confirmer, &observer).await?;
    if mode != TargetMode::Video || report.failed() > 0 {
        Output::report(&report);
    }
    Ok(report)
}

/// Wire the production providers together.
fn build_orchestrator(settings: &Settings, credentials: &Credentials) -> Result<Orchestrator> {
    let cache = FileCache::new(settings.transcripts_dir(), settings.audio_dir());

    let catalog = Arc::new(DataApiClient::new(
        &credentials.youtube_api_key,
        Duration::from_secs(settings.youtube.request_timeout_secs),
    )?);
    let transcripts = Arc::new(YtTranscriptProvider::new(&settings.youtube.languages)?);
    let completion = Arc::new(OpenAICompletion::new(
        &credentials.openai_api_key,
        &settings.summary,
    )?);
    let speech = Arc::new(OpenAISpeech::new(&credentials.openai_api_key, &settings.speech)?);
    let player = Arc::new(SystemPlayer::new(&settings.speech.players));

    Ok(Orchestrator::new(
        settings.prompts_dir(),
        catalog.clone(),
        TranscriptAcquirer::new(cache.clone(), catalog, transcripts),
        SummaryGenerator::new(completion, &settings.summary.system_prompt),
        AudioSynthesizer::new(cache, speech, player),
    ))
}

/// `--voice` wins over the configured default.
fn pick_voice(flag: Option<Voice>, settings: &Settings) -> std::result::Result<Voice, RecapError> {
    match flag {
        Some(v) => Ok(v),
        None => settings
            .speech
            .voice
            .parse()
            .map_err(|e: String| RecapError::Config(format!("speech.voice: {}", e))),
    }
}
