// Gemini API client

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::time::Duration;
use thiserror::Error;

use crate::models::{AppConfig, ArtStyle, StoryParams};

const STORYTELLER_SYSTEM_PROMPT: &str = "You are a master storyteller. \
Create a captivating story based on the user's prompt, genre, and desired art style. \
Also provide a detailed image prompt that describes a key scene from the story, \
suitable for an AI image generator. The story should be around 200-300 words.";

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("GEMINI_API_KEY environment variable not set")]
    MissingApiKey,
    #[error("failed to create HTTP client: {0}")]
    ClientCreation(#[source] reqwest::Error),
    #[error("{operation} request failed: {source}")]
    Request {
        operation: &'static str,
        #[source]
        source: reqwest::Error,
    },
    #[error("{operation} request returned {status}: {body}")]
    Status {
        operation: &'static str,
        status: StatusCode,
        body: String,
    },
    #[error("{operation} response had no usable content")]
    EmptyResponse { operation: &'static str },
    #[error("failed to parse story JSON: {0}")]
    StoryParse(#[source] serde_json::Error),
    #[error("invalid base64 image payload: {0}")]
    Base64(#[from] base64::DecodeError),
}

pub type ApiResult<T> = Result<T, ApiError>;

/// Structured output of the text stage.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct StoryText {
    pub title: String,
    pub content: String,
    #[serde(rename = "imagePrompt")]
    pub image_prompt: String,
}

/// Decoded inline image returned by the image stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoryImage {
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone)]
pub struct GeminiClient {
    base_url: String,
    api_key: String,
    client: Client,
    text_model: String,
    image_model: String,
    tts_model: String,
    voice: String,
}

impl GeminiClient {
    pub fn new(config: &AppConfig, api_key: String) -> ApiResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout))
            .build()
            .map_err(ApiError::ClientCreation)?;

        Ok(Self {
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            api_key,
            client,
            text_model: config.text_model.clone(),
            image_model: config.image_model.clone(),
            tts_model: config.tts_model.clone(),
            voice: config.voice.clone(),
        })
    }

    /// Build a client with the key from `GEMINI_API_KEY` (a `.env` file is
    /// honored if present).
    pub fn from_env(config: &AppConfig) -> ApiResult<Self> {
        let _ = dotenvy::dotenv();
        let api_key = std::env::var("GEMINI_API_KEY").map_err(|_| ApiError::MissingApiKey)?;
        Self::new(config, api_key)
    }

    /// Text stage: story title, content, and an image prompt for a key scene.
    pub async fn generate_story_text(&self, params: &StoryParams) -> ApiResult<StoryText> {
        let request = GenerateContentRequest {
            contents: vec![Content::text(format!(
                "Genre: {}. Art Style: {}. User Prompt: {}",
                params.genre.label(),
                params.art_style.label(),
                params.prompt
            ))],
            system_instruction: Some(Content::text(STORYTELLER_SYSTEM_PROMPT.to_string())),
            generation_config: Some(GenerationConfig {
                response_mime_type: Some("application/json".to_string()),
                response_schema: Some(story_schema()),
                ..GenerationConfig::default()
            }),
        };

        let operation = "text generation";
        let response = self.post_generate(&self.text_model, operation, &request).await?;
        let text = response
            .first_text()
            .ok_or(ApiError::EmptyResponse { operation })?;

        serde_json::from_str(&text).map_err(ApiError::StoryParse)
    }

    /// Image stage. Returns `None` when the model produced no inline image;
    /// the story stays valid without one.
    pub async fn generate_story_image(
        &self,
        image_prompt: &str,
        art_style: ArtStyle,
    ) -> ApiResult<Option<StoryImage>> {
        let prompt = format!(
            "{image_prompt}. Art Style: {}. High quality, detailed, cinematic lighting.",
            art_style.label()
        );
        let request = GenerateContentRequest {
            contents: vec![Content::text(prompt)],
            system_instruction: None,
            generation_config: None,
        };

        let response = self
            .post_generate(&self.image_model, "image generation", &request)
            .await?;

        match response.first_inline_data() {
            Some(inline) => {
                let bytes = BASE64.decode(&inline.data)?;
                Ok(Some(StoryImage {
                    mime_type: inline.mime_type.clone(),
                    bytes,
                }))
            }
            None => Ok(None),
        }
    }

    /// Speech stage. Returns the base64 PCM payload, or `None` when the model
    /// produced no audio.
    pub async fn generate_story_speech(&self, text: &str) -> ApiResult<Option<String>> {
        let request = GenerateContentRequest {
            contents: vec![Content::text(text.to_string())],
            system_instruction: None,
            generation_config: Some(GenerationConfig {
                response_modalities: Some(vec!["AUDIO".to_string()]),
                speech_config: Some(SpeechConfig {
                    voice_config: VoiceConfig {
                        prebuilt_voice_config: PrebuiltVoiceConfig {
                            voice_name: self.voice.clone(),
                        },
                    },
                }),
                ..GenerationConfig::default()
            }),
        };

        let response = self
            .post_generate(&self.tts_model, "speech synthesis", &request)
            .await?;

        Ok(response.first_inline_data().map(|d| d.data.clone()))
    }

    async fn post_generate(
        &self,
        model: &str,
        operation: &'static str,
        request: &GenerateContentRequest,
    ) -> ApiResult<GenerateContentResponse> {
        let url = format!("{}/v1beta/models/{model}:generateContent", self.base_url);

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(request)
            .send()
            .await
            .map_err(|source| ApiError::Request { operation, source })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::Status {
                operation,
                status,
                body,
            });
        }

        response
            .json::<GenerateContentResponse>()
            .await
            .map_err(|source| ApiError::Request { operation, source })
    }
}

/// Response schema forcing the text model to emit title/content/imagePrompt.
fn story_schema() -> serde_json::Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "title": { "type": "STRING", "description": "A catchy title for the story" },
            "content": { "type": "STRING", "description": "The full story text" },
            "imagePrompt": {
                "type": "STRING",
                "description": "A detailed visual description of a key scene for image generation"
            }
        },
        "required": ["title", "content", "imagePrompt"]
    })
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Content {
    parts: Vec<Part>,
}

impl Content {
    fn text(text: String) -> Self {
        Self {
            parts: vec![Part {
                text: Some(text),
                inline_data: None,
            }],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    inline_data: Option<InlineData>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    mime_type: String,
    data: String,
}

#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    response_mime_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_schema: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_modalities: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    speech_config: Option<SpeechConfig>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SpeechConfig {
    voice_config: VoiceConfig,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct VoiceConfig {
    prebuilt_voice_config: PrebuiltVoiceConfig,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PrebuiltVoiceConfig {
    voice_name: String,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<Content>,
}

impl GenerateContentResponse {
    fn first_text(&self) -> Option<String> {
        self.candidates
            .first()?
            .content
            .as_ref()?
            .parts
            .iter()
            .find_map(|p| p.text.clone())
    }

    fn first_inline_data(&self) -> Option<&InlineData> {
        self.candidates
            .first()?
            .content
            .as_ref()?
            .parts
            .iter()
            .find_map(|p| p.inline_data.as_ref())
    }
}
