use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};

use crate::application::ports::{
    ApiCredential, Candidate, ContentPart, ContentResponse, ImageGenerationRequest,
    ImageGenerator, PromptFeedback, ProviderError, TextGenerationRequest, TextGenerator,
    UsageMetadata,
};
use crate::application::services::{GEMINI_IMAGE_MODEL, GEMINI_TEXT_MODEL};
use crate::domain::{ConversationTurn, DEFAULT_IMAGE_MIME_TYPE, InlineImage, TurnRole};

pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";
const API_KEY_HEADER: &str = "x-goog-api-key";

/// Thin client for the `generateContent` REST endpoint.
#[derive(Clone)]
pub struct GeminiClient {
    client: Client,
    base_url: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<WireContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<WireContent>,
    generation_config: GenerationConfig,
}

#[derive(Serialize, Deserialize, Default)]
struct WireContent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<WirePart>,
}

#[derive(Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct WirePart {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    inline_data: Option<WireBlob>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    thought_signature: Option<String>,
    #[serde(default, skip_serializing)]
    thought: bool,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireBlob {
    #[serde(default)]
    mime_type: Option<String>,
    data: String,
}

#[derive(Serialize, Default)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_output_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_modalities: Option<Vec<&'static str>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    image_config: Option<ImageConfig>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ImageConfig {
    aspect_ratio: String,
    image_size: &'static str,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<WireCandidate>,
    #[serde(default)]
    prompt_feedback: Option<WirePromptFeedback>,
    #[serde(default)]
    usage_metadata: Option<WireUsage>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireCandidate {
    #[serde(default)]
    content: Option<WireContent>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct WirePromptFeedback {
    #[serde(default)]
    block_reason: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireUsage {
    #[serde(default)]
    prompt_token_count: Option<i64>,
    #[serde(default)]
    candidates_token_count: Option<i64>,
}

impl GeminiClient {
    pub fn new(base_url: Option<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url
                .unwrap_or_else(|| DEFAULT_GEMINI_BASE_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
        }
    }

    async fn generate_content(
        &self,
        model: &str,
        body: &GenerateContentRequest,
        credential: &ApiCredential,
    ) -> Result<ContentResponse, ProviderError> {
        let url = format!("{}/v1beta/models/{}:generateContent", self.base_url, model);

        tracing::debug!(model = %model, tier = %credential.tier, turns = body.contents.len(), "Sending generateContent request");

        let response = self
            .client
            .post(&url)
            .header(API_KEY_HEADER, &credential.api_key)
            .json(body)
            .send()
            .await
            .map_err(|e| ProviderError::ApiRequestFailed(e.to_string()))?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(ProviderError::RateLimited);
        }
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::Unauthorized(format!("HTTP {}: {}", status, body)));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::ApiRequestFailed(format!(
                "HTTP {}: {}",
                status, body
            )));
        }

        let wire: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::InvalidResponse(e.to_string()))?;

        into_content_response(wire)
    }
}

fn into_content_response(wire: GenerateContentResponse) -> Result<ContentResponse, ProviderError> {
    let candidates = wire
        .candidates
        .into_iter()
        .map(|candidate| {
            let parts = candidate
                .content
                .map(|c| c.parts)
                .unwrap_or_default()
                .into_iter()
                .map(from_wire_part)
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Candidate {
                parts,
                finish_reason: candidate.finish_reason,
            })
        })
        .collect::<Result<Vec<_>, ProviderError>>()?;

    Ok(ContentResponse {
        candidates,
        prompt_feedback: wire.prompt_feedback.map(|f| PromptFeedback {
            block_reason: f.block_reason,
        }),
        usage: wire.usage_metadata.map(|u| UsageMetadata {
            prompt_token_count: u.prompt_token_count,
            candidates_token_count: u.candidates_token_count,
        }),
    })
}

fn from_wire_part(part: WirePart) -> Result<ContentPart, ProviderError> {
    let inline_data = part
        .inline_data
        .map(|blob| {
            let data = decode(&blob.data, "inlineData")?;
            let mime_type = blob
                .mime_type
                .unwrap_or_else(|| DEFAULT_IMAGE_MIME_TYPE.to_string());
            Ok::<_, ProviderError>(InlineImage::new(mime_type, data))
        })
        .transpose()?;
    let thought_signature = part
        .thought_signature
        .map(|s| decode(&s, "thoughtSignature"))
        .transpose()?;

    Ok(ContentPart {
        text: part.text,
        inline_data,
        thought_signature,
        thought: part.thought,
    })
}

fn decode(value: &str, field: &str) -> Result<Vec<u8>, ProviderError> {
    BASE64
        .decode(value)
        .map_err(|e| ProviderError::InvalidResponse(format!("{field}: {e}")))
}

fn to_wire_turn(turn: &ConversationTurn) -> WireContent {
    let role = match turn.role {
        TurnRole::User => "user",
        TurnRole::Model => "model",
    };
    let mut parts = Vec::new();
    if let Some(text) = &turn.text {
        parts.push(WirePart {
            text: Some(text.clone()),
            ..Default::default()
        });
    }
    if let Some(image) = &turn.image {
        parts.push(WirePart {
            inline_data: Some(WireBlob {
                mime_type: Some(image.mime_type.clone()),
                data: BASE64.encode(&image.data),
            }),
            thought_signature: turn.continuation_token.as_ref().map(|t| BASE64.encode(t)),
            ..Default::default()
        });
    }
    WireContent {
        role: Some(role.to_string()),
        parts,
    }
}

fn user_text(text: &str) -> WireContent {
    WireContent {
        role: Some("user".to_string()),
        parts: vec![WirePart {
            text: Some(text.to_string()),
            ..Default::default()
        }],
    }
}

fn system_text(text: Option<&str>) -> Option<WireContent> {
    text.map(|t| WireContent {
        role: None,
        parts: vec![WirePart {
            text: Some(t.to_string()),
            ..Default::default()
        }],
    })
}

pub struct GeminiTextGenerator {
    client: GeminiClient,
    model: String,
}

impl GeminiTextGenerator {
    pub fn new(client: GeminiClient, model: Option<String>) -> Self {
        Self {
            client,
            model: model.unwrap_or_else(|| GEMINI_TEXT_MODEL.to_string()),
        }
    }
}

#[async_trait]
impl TextGenerator for GeminiTextGenerator {
    fn model(&self) -> &str {
        &self.model
    }

    async fn generate(
        &self,
        request: &TextGenerationRequest,
        credential: &ApiCredential,
    ) -> Result<ContentResponse, ProviderError> {
        let body = GenerateContentRequest {
            contents: vec![user_text(&request.prompt)],
            system_instruction: system_text(request.system_instruction.as_deref()),
            generation_config: GenerationConfig {
                temperature: Some(request.sampling.temperature),
                max_output_tokens: Some(request.sampling.max_output_tokens),
                ..Default::default()
            },
        };
        self.client
            .generate_content(&self.model, &body, credential)
            .await
    }
}

pub struct GeminiImageGenerator {
    client: GeminiClient,
    model: String,
}

impl GeminiImageGenerator {
    pub fn new(client: GeminiClient, model: Option<String>) -> Self {
        Self {
            client,
            model: model.unwrap_or_else(|| GEMINI_IMAGE_MODEL.to_string()),
        }
    }
}

#[async_trait]
impl ImageGenerator for GeminiImageGenerator {
    fn model(&self) -> &str {
        &self.model
    }

    async fn generate(
        &self,
        request: &ImageGenerationRequest,
        credential: &ApiCredential,
    ) -> Result<ContentResponse, ProviderError> {
        let mut contents: Vec<WireContent> = request.history.iter().map(to_wire_turn).collect();
        contents.push(user_text(&request.prompt));

        let body = GenerateContentRequest {
            contents,
            system_instruction: system_text(request.system_instruction.as_deref()),
            generation_config: GenerationConfig {
                response_modalities: Some(vec!["TEXT", "IMAGE"]),
                image_config: Some(ImageConfig {
                    aspect_ratio: request.aspect_ratio.clone(),
                    image_size: request.resolution.provider_size(),
                }),
                ..Default::default()
            },
        };
        self.client
            .generate_content(&self.model, &body, credential)
            .await
    }
}
