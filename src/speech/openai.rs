//! OpenAI text-to-speech implementation.

use super::{SpeechProvider, Voice};
use crate::config::SpeechSettings;
use crate::error::{RecapError, Result};
use crate::openai::create_client;
use async_openai::types::{CreateSpeechRequestArgs, SpeechModel, SpeechResponseFormat};
use async_trait::async_trait;
use tracing::{debug, instrument};

/// Speech synthesis against the OpenAI audio API.
pub struct OpenAISpeech {
    client: async_openai::Client<async_openai::config::OpenAIConfig>,
    model: String,
}

impl OpenAISpeech {
    pub fn new(api_key: &str, settings: &SpeechSettings) -> Result<Self> {
        Ok(Self {
            client: create_client(api_key)?,
            model: settings.model.clone(),
        })
    }

    fn speech_model(&self) -> SpeechModel {
        match self.model.as_str() {
            "tts-1" => SpeechModel::Tts1,
            "tts-1-hd" => SpeechModel::Tts1Hd,
            other => SpeechModel::Other(other.to_string()),
        }
    }
}

fn api_voice(voice: Voice) -> async_openai::types::Voice {
    use async_openai::types::Voice as Api;
    match voice {
        Voice::Alloy => Api::Alloy,
        Voice::Echo => Api::Echo,
        Voice::Fable => Api::Fable,
        Voice::Onyx => Api::Onyx,
        Voice::Nova => Api::Nova,
        Voice::Shimmer => Api::Shimmer,
    }
}

#[async_trait]
impl SpeechProvider for OpenAISpeech {
    #[instrument(skip(self, text), fields(model = %self.model, chars = text.len()))]
    async fn synthesize(&self, text: &str, voice: Voice) -> Result<Vec<u8>> {
        let request = CreateSpeechRequestArgs::default()
            .input(text)
            .model(self.speech_model())
            .voice(api_voice(voice))
            .response_format(SpeechResponseFormat::Mp3)
            .build()
            .map_err(|e| RecapError::OpenAI(e.to_string()))?;

        let response = self
            .client
            .audio()
            .speech(request)
            .await
            .map_err(|e| RecapError::OpenAI(format!("Speech synthesis failed: {}", e)))?;

        debug!("Received {} bytes of audio", response.bytes.len());
        Ok(response.bytes.to_vec())
    }
}
