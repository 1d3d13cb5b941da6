//! Summary generation.
//!
//! Summaries are never cached: every call renders the template and asks the
//! completion provider again.

mod openai;

pub use openai::OpenAICompletion;

use crate::config::PromptTemplate;
use crate::error::Result;
use crate::transcript::TranscriptRecord;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, instrument};

/// A chat completion endpoint.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Send one system and one user message, returning the reply text.
    async fn complete(&self, system: &str, user: &str) -> Result<String>;
}

/// Renders a template over a transcript and asks for a summary.
pub struct SummaryGenerator {
    provider: Arc<dyn CompletionProvider>,
    system_prompt: String,
}

impl SummaryGenerator {
    pub fn new(provider: Arc<dyn CompletionProvider>, system_prompt: &str) -> Self {
        Self {
            provider,
            system_prompt: system_prompt.to_string(),
        }
    }

    /// Summarize `record` with `template`.
    #[instrument(skip(self, template, record), fields(template = %template.name, video_id = %record.video_id))]
    pub async fn summarize(&self, template: &PromptTemplate, record: &TranscriptRecord) -> Result<String> {
        let prompt = template.render(&record.full_text);
        debug!("Rendered prompt of {} chars", prompt.len());

        let summary = self.provider.complete(&self.system_prompt, &prompt).await?;
        Ok(summary.trim().to_string())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::error::RecapError;
    use std::sync::Mutex;

    /// Completion provider that records prompts and echoes a fixed reply.
    pub(crate) struct RecordingCompletion {
        pub prompts: Mutex<Vec<(String, String)>>,
        pub fail_on: Option<String>,
    }

    impl RecordingCompletion {
        pub fn new() -> Self {
            Self {
                prompts: Mutex::new(Vec::new()),
                fail_on: None,
            }
        }

        /// Fail whenever the user prompt contains `needle`.
        pub fn failing_on(needle: &str) -> Self {
            Self {
                prompts: Mutex::new(Vec::new()),
                fail_on: Some(needle.to_string()),
            }
        }

        pub fn count(&self) -> usize {
            self.prompts.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl CompletionProvider for RecordingCompletion {
        async fn complete(&self, system: &str, user: &str) -> Result<String> {
            self.prompts
                .lock()
                .unwrap()
                .push((system.to_string(), user.to_string()));
            if let Some(needle) = &self.fail_on {
                if user.contains(needle.as_str()) {
                    return Err(RecapError::OpenAI("model overloaded".into()));
                }
            }
            Ok(format!("  summary #{}  ", self.count()))
        }
    }

    #[tokio::test]
    async fn test_summarize_renders_template_every_time() {
        let provider = Arc::new(RecordingCompletion::new());
        let generator = SummaryGenerator::new(provider.clone(), "be brief");
        let template = PromptTemplate {
            name: "compact".into(),
            body: "TL;DR:\n{transcript}".into(),
        };
        let record = TranscriptRecord::new("abc123", "t", "c", None, vec![
            crate::transcript::TranscriptSegment { text: "words here".into(), start: 0.0, duration: 1.0 },
        ]);

        let first = generator.summarize(&template, &record).await.unwrap();
        let second = generator.summarize(&template, &record).await.unwrap();

        assert_eq!(first, "summary #1");
        assert_eq!(second, "summary #2");

        let prompts = provider.prompts.lock().unwrap();
        assert_eq!(prompts.len(), 2);
        assert_eq!(prompts[0].0, "be brief");
        assert_eq!(prompts[0].1, "TL;DR:\nwords here");
    }
}
