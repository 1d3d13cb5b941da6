//! OpenAI chat completion implementation.

use super::CompletionProvider;
use crate::config::SummarySettings;
use crate::error::{RecapError, Result};
use crate::openai::create_client;
use async_openai::types::{
    ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
    ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs,
};
use async_trait::async_trait;
use tracing::{debug, instrument};

/// Chat completions against the OpenAI API.
pub struct OpenAICompletion {
    client: async_openai::Client<async_openai::config::OpenAIConfig>,
    model: String,
    max_tokens: u32,
    temperature: f32,
}

impl OpenAICompletion {
    pub fn new(api_key: &str, settings: &SummarySettings) -> Result<Self> {
        Ok(Self {
            client: create_client(api_key)?,
            model: settings.model.clone(),
            max_tokens: settings.max_tokens,
            temperature: settings.temperature,
        })
    }
}

#[async_trait]
impl CompletionProvider for OpenAICompletion {
    #[instrument(skip(self, system, user), fields(model = %self.model))]
    async fn complete(&self, system: &str, user: &str) -> Result<String> {
        let messages: Vec<ChatCompletionRequestMessage> = vec![
            ChatCompletionRequestSystemMessageArgs::default()
                .content(system)
                .build()
                .map_err(|e| RecapError::OpenAI(e.to_string()))?
                .into(),
            ChatCompletionRequestUserMessageArgs::default()
                .content(user)
                .build()
                .map_err(|e| RecapError::OpenAI(e.to_string()))?
                .into(),
        ];

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(messages)
            .max_completion_tokens(self.max_tokens)
            .temperature(self.temperature)
            .build()
            .map_err(|e| RecapError::OpenAI(e.to_string()))?;

        let response = self.client.chat().create(request).await.map_err(|e| {
            RecapError::OpenAI(format!("Failed to generate summary: {}", e))
        })?;

        if let Some(usage) = &response.usage {
            debug!("Token usage: {} total", usage.total_tokens);
        }

        response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| RecapError::OpenAI("Empty response from model".to_string()))
    }
}
