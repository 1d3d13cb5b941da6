//! Pipeline orchestrator for Recap.
//!
//! Runs one batch: load the template, resolve the reference, then walk each
//! video through `Fetching -> Summarizing -> [Confirming] -> [Synthesizing]`.
//! A failing video is recorded and the batch moves on; only setup and
//! resolution errors end the run.

use crate::config::PromptTemplate;
use crate::error::{RecapError, Result};
use crate::speech::{AudioSynthesizer, SpeechOutcome, Voice};
use crate::summary::SummaryGenerator;
use crate::transcript::{TranscriptAcquirer, TranscriptRecord};
use crate::youtube::{TargetMode, TargetResolver, VideoCatalog};
use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// Number of titles shown before a multi-video batch starts.
pub const PREVIEW_LIMIT: usize = 5;

/// One summarize invocation.
#[derive(Debug, Clone)]
pub struct BatchRequest {
    pub reference: String,
    pub mode: TargetMode,
    pub max_videos: usize,
    pub template: String,
    pub play_audio: bool,
    pub voice: Voice,
    pub auto_confirm: bool,
}

/// Per-video pipeline stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Fetching,
    Summarizing,
    Confirming,
    Synthesizing,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Stage::Fetching => write!(f, "fetching transcript"),
            Stage::Summarizing => write!(f, "summarizing"),
            Stage::Confirming => write!(f, "confirming"),
            Stage::Synthesizing => write!(f, "synthesizing audio"),
        }
    }
}

/// Answer to a per-video confirmation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Yes,
    Skip,
    Quit,
}

/// Interactive gate between summarizing and output.
#[async_trait]
pub trait Confirmer: Send + Sync {
    /// Asked once after the preview of a multi-video batch.
    async fn confirm_batch(&self, total: usize) -> Result<bool>;

    /// Asked for each video once its summary is ready.
    async fn confirm_video(&self, index: usize, total: usize, title: &str) -> Result<Decision>;
}

/// Progress notifications for whoever is presenting the batch.
///
/// Every method defaults to doing nothing.
pub trait BatchObserver: Send + Sync {
    fn preview(&self, _total: usize, _titles: &[String]) {}
    fn video_started(&self, _index: usize, _total: usize, _video_id: &str) {}
    fn transcript_ready(&self, _record: &TranscriptRecord, _cached: bool) {}
    fn awaiting_confirmation(&self, _index: usize, _record: &TranscriptRecord) {}
    fn summary_ready(&self, _index: usize, _record: &TranscriptRecord, _summary: &str) {}
    fn audio_ready(&self, _outcome: &SpeechOutcome) {}
    fn video_skipped(&self, _index: usize, _video_id: &str) {}
    fn video_failed(&self, _index: usize, _video_id: &str, _stage: Stage, _error: &RecapError) {}
}

/// What happened to one video.
#[derive(Debug, Clone, PartialEq)]
pub enum VideoOutcome {
    Completed {
        video_id: String,
        title: String,
        summary: String,
        audio: Option<PathBuf>,
    },
    Skipped {
        video_id: String,
    },
    Failed {
        video_id: String,
        stage: Stage,
        message: String,
    },
}

/// Result of a whole batch.
#[derive(Debug, Clone, Default)]
pub struct BatchReport {
    pub outcomes: Vec<VideoOutcome>,
    /// True if the user stopped the batch early.
    pub quit: bool,
}

impl BatchReport {
    pub fn completed(&self) -> usize {
        self.count(|o| matches!(o, VideoOutcome::Completed { .. }))
    }

    pub fn skipped(&self) -> usize {
        self.count(|o| matches!(o, VideoOutcome::Skipped { .. }))
    }

    pub fn failed(&self) -> usize {
        self.count(|o| matches!(o, VideoOutcome::Failed { .. }))
    }

    fn count(&self, pred: impl Fn(&VideoOutcome) -> bool) -> usize {
        self.outcomes.iter().filter(|o| pred(o)).count()
    }
}

/// Confirmer that approves everything, used for `--auto-confirm`.
pub struct AutoConfirm;

#[async_trait]
impl Confirmer for AutoConfirm {
    async fn confirm_batch(&self, _total: usize) -> Result<bool> {
        Ok(true)
    }

    async fn confirm_video(&self, _index: usize, _total: usize, _title: &str) -> Result<Decision> {
        Ok(Decision::Yes)
    }
}

/// Observer that reports nothing.
pub struct SilentObserver;

impl BatchObserver for SilentObserver {}

/// Coordinates resolver, acquirer, summarizer and synthesizer for a batch.
pub struct Orchestrator {
    prompts_dir: PathBuf,
    catalog: Arc<dyn VideoCatalog>,
    resolver: TargetResolver,
    acquirer: TranscriptAcquirer,
    summarizer: SummaryGenerator,
    synthesizer: AudioSynthesizer,
}

impl Orchestrator {
    pub fn new(
        prompts_dir: PathBuf,
        catalog: Arc<dyn VideoCatalog>,
        acquirer: TranscriptAcquirer,
        summarizer: SummaryGenerator,
        synthesizer: AudioSynthesizer,
    ) -> Self {
        Self {
            prompts_dir,
            resolver: TargetResolver::new(catalog.clone()),
            catalog,
            acquirer,
            summarizer,
            synthesizer,
        }
    }

    /// Run one batch.
    ///
    /// Returns `Err` only for failures that affect every video: a missing
    /// template or an unresolvable reference. Everything else lands in the
    /// report.
    #[instrument(skip(self, confirmer, observer), fields(mode = %request.mode, template = %request.template))]
    pub async fn run(
        &self,
        request: &BatchRequest,
        confirmer: &dyn Confirmer,
        observer: &dyn BatchObserver,
    ) -> Result<BatchReport> {
        let template = PromptTemplate::load(&self.prompts_dir, &request.template)?;

        let video_ids = self
            .resolver
            .resolve(&request.reference, request.mode, request.max_videos)
            .await?;
        let total = video_ids.len();
        let mut report = BatchReport::default();

        if request.mode != TargetMode::Video {
            let titles = self.preview_titles(&video_ids).await;
            observer.preview(total, &titles);

            if !request.auto_confirm && !confirmer.confirm_batch(total).await? {
                info!("Batch declined");
                report.quit = true;
                return Ok(report);
            }
        }

        // A single explicit video has nothing to choose between.
        let ask_per_video = !request.auto_confirm && request.mode != TargetMode::Video;

        for (i, video_id) in video_ids.iter().enumerate() {
            let index = i + 1;
            observer.video_started(index, total, video_id);

            match self
                .process_video(request, &template, video_id, index, total, ask_per_video, confirmer, observer)
                .await
            {
                Ok(Some(outcome)) => report.outcomes.push(outcome),
                Ok(None) => {
                    info!("Stopped by user at video {}/{}", index, total);
                    report.quit = true;
                    break;
                }
                Err((stage, err)) => {
                    warn!("Video {} failed while {}: {}", video_id, stage, err);
                    observer.video_failed(index, video_id, stage, &err);
                    report.outcomes.push(VideoOutcome::Failed {
                        video_id: video_id.clone(),
                        stage,
                        message: err.to_string(),
                    });
                }
            }
        }

        info!(
            "Batch finished: {} completed, {} skipped, {} failed",
            report.completed(),
            report.skipped(),
            report.failed()
        );
        Ok(report)
    }

    /// Walk one video through the stages. `Ok(None)` means the user quit.
    #[allow(clippy::too_many_arguments)]
    async fn process_video(
        &self,
        request: &BatchRequest,
        template: &PromptTemplate,
        video_id: &str,
        index: usize,
        total: usize,
        ask: bool,
        confirmer: &dyn Confirmer,
        observer: &dyn BatchObserver,
    ) -> std::result::Result<Option<VideoOutcome>, (Stage, RecapError)> {
        let at = |stage: Stage| move |e: RecapError| (stage, e);

        let cached = self
            .acquirer
            .acquire(video_id)
            .await
            .map_err(at(Stage::Fetching))?;
        let record = cached.value;
        observer.transcript_ready(&record, cached.hit);

        let summary = self
            .summarizer
            .summarize(template, &record)
            .await
            .map_err(at(Stage::Summarizing))?;

        if ask {
            observer.awaiting_confirmation(index, &record);
            match confirmer
                .confirm_video(index, total, &record.title)
                .await
                .map_err(at(Stage::Confirming))?
            {
                Decision::Yes => {}
                Decision::Skip => {
                    observer.video_skipped(index, video_id);
                    return Ok(Some(VideoOutcome::Skipped {
                        video_id: video_id.to_string(),
                    }));
                }
                Decision::Quit => return Ok(None),
            }
        }

        observer.summary_ready(index, &record, &summary);

        let audio = if request.play_audio {
            let outcome = self
                .synthesizer
                .speak(&summary, video_id, &template.name, request.voice)
                .await
                .map_err(at(Stage::Synthesizing))?;
            observer.audio_ready(&outcome);
            Some(outcome.path)
        } else {
            None
        };

        Ok(Some(VideoOutcome::Completed {
            video_id: video_id.to_string(),
            title: record.title,
            summary,
            audio,
        }))
    }

    /// Titles of the first few videos, falling back to the bare id.
    async fn preview_titles(&self, video_ids: &[String]) -> Vec<String> {
        let mut titles = Vec::new();
        for id in video_ids.iter().take(PREVIEW_LIMIT) {
            match self.catalog.video_metadata(id).await {
                Ok(meta) => titles.push(meta.title),
                Err(e) => {
                    warn!("No title for {}: {}", id, e);
                    titles.push(id.clone());
                }
            }
        }
        titles
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::FileCache;
    use crate::speech::tests::{CountingSpeech, RecordingPlayer};
    use crate::summary::tests::RecordingCompletion;
    use crate::transcript::tests::{CountingProvider, StubCatalog};
    use crate::transcript::TranscriptSegment;
    use std::path::Path;
    use std::sync::Mutex;

    struct Harness {
        _dir: tempfile::TempDir,
        base: PathBuf,
        provider: Arc<CountingProvider>,
        catalog: Arc<StubCatalog>,
        completion: Arc<RecordingCompletion>,
        speech: Arc<CountingSpeech>,
        orchestrator: Orchestrator,
    }

    fn harness_with(
        listing: &[&str],
        provider: CountingProvider,
        completion: RecordingCompletion,
    ) -> Harness {
        let dir = tempfile::tempdir().unwrap();
        let base = dir.path().to_path_buf();
        let provider = Arc::new(provider);
        let catalog = Arc::new(StubCatalog::new(listing));
        let completion = Arc::new(completion);
        let speech = Arc::new(CountingSpeech::new());

        let cache = FileCache::new(base.join("transcripts"), base.join("audio"));
        let acquirer = TranscriptAcquirer::new(cache.clone(), catalog.clone(), provider.clone());
        let summarizer = SummaryGenerator::new(completion.clone(), "system");
        let synthesizer =
            AudioSynthesizer::new(cache, speech.clone(), Arc::new(RecordingPlayer::new()));
        let orchestrator = Orchestrator::new(
            base.join("prompts"),
            catalog.clone(),
            acquirer,
            summarizer,
            synthesizer,
        );

        Harness {
            _dir: dir,
            base,
            provider,
            catalog,
            completion,
            speech,
            orchestrator,
        }
    }

    fn harness(listing: &[&str]) -> Harness {
        harness_with(listing, CountingProvider::new(), RecordingCompletion::new())
    }

    fn write_template(base: &Path, name: &str, body: &str) {
        let dir = base.join("prompts");
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join(format!("{}.txt", name)), body).unwrap();
    }

    fn request(reference: &str, mode: TargetMode) -> BatchRequest {
        BatchRequest {
            reference: reference.to_string(),
            mode,
            max_videos: 10,
            template: "default".into(),
            play_audio: false,
            voice: Voice::Alloy,
            auto_confirm: true,
        }
    }

    /// Confirmer replaying scripted answers, then approving.
    struct Scripted {
        batch: bool,
        answers: Mutex<Vec<Decision>>,
        asked: Mutex<Vec<String>>,
    }

    impl Scripted {
        fn new(batch: bool, answers: &[Decision]) -> Self {
            let mut answers = answers.to_vec();
            answers.reverse();
            Self {
                batch,
                answers: Mutex::new(answers),
                asked: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl Confirmer for Scripted {
        async fn confirm_batch(&self, _total: usize) -> Result<bool> {
            Ok(self.batch)
        }

        async fn confirm_video(&self, _index: usize, _total: usize, title: &str) -> Result<Decision> {
            self.asked.lock().unwrap().push(title.to_string());
            Ok(self.answers.lock().unwrap().pop().unwrap_or(Decision::Yes))
        }
    }

    fn seed_transcript(base: &Path, video_id: &str) {
        let cache = FileCache::new(base.join("transcripts"), base.join("audio"));
        let record = TranscriptRecord::new(
            video_id,
            "Cached Talk",
            "Cached Channel",
            None,
            vec![TranscriptSegment {
                text: "cached words".into(),
                start: 0.0,
                duration: 3.0,
            }],
        );
        cache.put(&record.cache_key(), &record).unwrap();
    }

    #[tokio::test]
    async fn test_missing_template_aborts_before_any_provider_call() {
        let h = harness(&["a1", "b2"]);
        let mut req = request("some query", TargetMode::Search);
        req.template = "nope".into();

        let err = h
            .orchestrator
            .run(&req, &AutoConfirm, &SilentObserver)
            .await
            .unwrap_err();

        assert!(matches!(err, RecapError::TemplateNotFound { .. }));
        assert!(err.is_fatal());
        assert_eq!(h.catalog.total_calls(), 0);
        assert_eq!(h.provider.count(), 0);
        assert_eq!(h.completion.count(), 0);
    }

    #[tokio::test]
    async fn test_max_videos_caps_the_batch() {
        let h = harness(&["a1", "b2", "c3", "d4", "e5", "f6"]);
        let mut req = request("UCxxxxxxxxxxxxxxxxxxxxxx", TargetMode::Channel);
        req.max_videos = 3;

        let report = h
            .orchestrator
            .run(&req, &AutoConfirm, &SilentObserver)
            .await
            .unwrap();

        assert_eq!(report.outcomes.len(), 3);
        assert_eq!(report.completed(), 3);
        assert_eq!(h.provider.count(), 3);
    }

    #[tokio::test]
    async fn test_failure_and_skip_continue_the_batch() {
        let h = harness_with(
            &["a1", "b2", "c3"],
            CountingProvider::new(),
            RecordingCompletion::failing_on("hello from b2"),
        );
        let mut req = request("PLtestplaylist", TargetMode::Playlist);
        req.auto_confirm = false;
        let confirmer = Scripted::new(true, &[Decision::Skip, Decision::Yes]);

        let report = h
            .orchestrator
            .run(&req, &confirmer, &SilentObserver)
            .await
            .unwrap();

        assert!(!report.quit);
        assert_eq!(report.outcomes.len(), 3);
        assert!(matches!(report.outcomes[0], VideoOutcome::Skipped { .. }));
        assert!(matches!(
            report.outcomes[1],
            VideoOutcome::Failed { stage: Stage::Summarizing, .. }
        ));
        assert!(matches!(report.outcomes[2], VideoOutcome::Completed { .. }));
        // b2 failed before it reached the prompt.
        assert_eq!(confirmer.asked.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_transcript_failure_is_recorded_per_video() {
        let h = harness_with(&["a1", "b2"], CountingProvider::failing(), RecordingCompletion::new());
        let req = request("query", TargetMode::Search);

        let report = h
            .orchestrator
            .run(&req, &AutoConfirm, &SilentObserver)
            .await
            .unwrap();

        assert_eq!(report.failed(), 2);
        assert!(matches!(
            report.outcomes[0],
            VideoOutcome::Failed { stage: Stage::Fetching, .. }
        ));
        assert_eq!(h.completion.count(), 0);
    }

    #[tokio::test]
    async fn test_quit_stops_remaining_videos() {
        let h = harness(&["a1", "b2", "c3"]);
        let mut req = request("query", TargetMode::Search);
        req.auto_confirm = false;
        let confirmer = Scripted::new(true, &[Decision::Yes, Decision::Quit]);

        let report = h
            .orchestrator
            .run(&req, &confirmer, &SilentObserver)
            .await
            .unwrap();

        assert!(report.quit);
        assert_eq!(report.outcomes.len(), 1);
        assert_eq!(h.provider.count(), 2);
    }

    #[tokio::test]
    async fn test_declined_batch_processes_nothing() {
        let h = harness(&["a1", "b2"]);
        let mut req = request("query", TargetMode::Search);
        req.auto_confirm = false;

        let report = h
            .orchestrator
            .run(&req, &Scripted::new(false, &[]), &SilentObserver)
            .await
            .unwrap();

        assert!(report.quit);
        assert!(report.outcomes.is_empty());
        assert_eq!(h.provider.count(), 0);
    }

    #[tokio::test]
    async fn test_single_video_never_prompts() {
        let h = harness(&[]);
        let mut req = request("https://youtu.be/a1b2c3", TargetMode::Video);
        req.auto_confirm = false;
        let confirmer = Scripted::new(false, &[Decision::Quit]);

        let report = h
            .orchestrator
            .run(&req, &confirmer, &SilentObserver)
            .await
            .unwrap();

        assert_eq!(report.completed(), 1);
        assert!(confirmer.asked.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_cached_transcript_end_to_end_with_audio() {
        let h = harness(&[]);
        seed_transcript(&h.base, "abc123");
        write_template(&h.base, "compact", "Summarize briefly:\n{transcript}");

        let mut req = request("abc123", TargetMode::Video);
        req.template = "compact".into();
        req.play_audio = true;

        let first = h
            .orchestrator
            .run(&req, &AutoConfirm, &SilentObserver)
            .await
            .unwrap();

        assert_eq!(h.provider.count(), 0);
        assert_eq!(h.catalog.total_calls(), 0);
        assert_eq!(h.speech.count(), 1);
        let audio_path = h.base.join("audio").join("abc123_compact_openai.mp3");
        assert!(audio_path.exists());
        match &first.outcomes[0] {
            VideoOutcome::Completed { title, audio, .. } => {
                assert_eq!(title, "Cached Talk");
                assert_eq!(audio.as_deref(), Some(audio_path.as_path()));
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
        let prompts = h.completion.prompts.lock().unwrap().clone();
        assert_eq!(prompts[0].1, "Summarize briefly:\ncached words");

        h.orchestrator
            .run(&req, &AutoConfirm, &SilentObserver)
            .await
            .unwrap();
        assert_eq!(h.speech.count(), 1);
        assert_eq!(h.provider.count(), 0);
    }

    #[tokio::test]
    async fn test_bare_id_and_url_share_cache_entries() {
        let h = harness(&[]);
        let req = request("abc123", TargetMode::Video);
        h.orchestrator
            .run(&req, &AutoConfirm, &SilentObserver)
            .await
            .unwrap();

        let req = request("https://www.youtube.com/watch?v=abc123&t=42", TargetMode::Video);
        h.orchestrator
            .run(&req, &AutoConfirm, &SilentObserver)
            .await
            .unwrap();

        assert_eq!(h.provider.count(), 1);
        assert_eq!(h.completion.count(), 2);
    }

    #[tokio::test]
    async fn test_preview_shows_at_most_five_titles() {
        struct Recorder(Mutex<Vec<String>>);
        impl BatchObserver for Recorder {
            fn preview(&self, _total: usize, titles: &[String]) {
                self.0.lock().unwrap().extend(titles.iter().cloned());
            }
        }

        let h = harness(&["a1", "b2", "c3", "d4", "e5", "f6", "g7"]);
        let recorder = Recorder(Mutex::new(Vec::new()));
        h.orchestrator
            .run(&request("query", TargetMode::Search), &AutoConfirm, &recorder)
            .await
            .unwrap();

        let titles = recorder.0.lock().unwrap();
        assert_eq!(titles.len(), PREVIEW_LIMIT);
        assert_eq!(titles[0], "Title of a1");
    }
}
