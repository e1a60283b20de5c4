use std::sync::{Arc, Mutex};

use axum::Router;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::Json;
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde_json::{Value, json};

use diktat::application::ports::{
    ApiCredential, ImageGenerationRequest, ImageGenerator, ProviderError, SamplingParams,
    TextGenerationRequest, TextGenerator,
};
use diktat::domain::{ApiTier, ConversationTurn, ImageResolution, InlineImage};
use diktat::infrastructure::llm::{GeminiClient, GeminiImageGenerator, GeminiTextGenerator};

#[derive(Clone, Debug)]
struct Captured {
    path: String,
    api_key: Option<String>,
    body: Value,
}

#[derive(Clone)]
struct MockGemini {
    status: StatusCode,
    reply: Value,
    captured: Arc<Mutex<Vec<Captured>>>,
}

async fn record(
    State(mock): State<MockGemini>,
    uri: Uri,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    mock.captured.lock().unwrap().push(Captured {
        path: uri.path().to_string(),
        api_key: headers
            .get("x-goog-api-key")
            .and_then(|v| v.to_str().ok())
            .map(String::from),
        body,
    });
    (mock.status, Json(mock.reply.clone())).into_response()
}

async fn spawn_gemini(status: StatusCode, reply: Value) -> (String, Arc<Mutex<Vec<Captured>>>) {
    let captured = Arc::new(Mutex::new(Vec::new()));
    let mock = MockGemini {
        status,
        reply,
        captured: captured.clone(),
    };
    let router = Router::new().fallback(record).with_state(mock);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    (format!("http://{addr}"), captured)
}

fn credential() -> ApiCredential {
    ApiCredential::new(ApiTier::Free, "test-gemini-key")
}

fn text_request() -> TextGenerationRequest {
    TextGenerationRequest {
        prompt: "Rewrite this".to_string(),
        system_instruction: None,
        sampling: SamplingParams {
            temperature: 0.3,
            max_output_tokens: 8000,
        },
    }
}

#[tokio::test]
async fn given_text_request_when_generating_then_posts_to_model_endpoint_with_key_header() {
    let reply = json!({
        "candidates": [{
            "content": {"role": "model", "parts": [{"text": "Rewritten"}]},
            "finishReason": "STOP"
        }],
        "usageMetadata": {"promptTokenCount": 12, "candidatesTokenCount": 3}
    });
    let (base_url, captured) = spawn_gemini(StatusCode::OK, reply).await;
    let generator = GeminiTextGenerator::new(GeminiClient::new(Some(base_url)), None);

    let response = generator.generate(&text_request(), &credential()).await.unwrap();

    let captured = captured.lock().unwrap().clone();
    assert_eq!(captured.len(), 1);
    assert_eq!(
        captured[0].path,
        "/v1beta/models/gemini-2.0-flash:generateContent"
    );
    assert_eq!(captured[0].api_key.as_deref(), Some("test-gemini-key"));
    let config = &captured[0].body["generationConfig"];
    assert!((config["temperature"].as_f64().unwrap() - 0.3).abs() < 1e-6);
    assert_eq!(config["maxOutputTokens"], 8000);
    assert_eq!(
        captured[0].body["contents"][0]["parts"][0]["text"],
        "Rewrite this"
    );

    assert_eq!(
        response.candidates[0].parts[0].text.as_deref(),
        Some("Rewritten")
    );
    let usage = response.usage.unwrap();
    assert_eq!(usage.prompt_token_count, Some(12));
    assert_eq!(usage.candidates_token_count, Some(3));
}

#[tokio::test]
async fn given_image_request_with_history_when_generating_then_replays_signature_and_config() {
    let reply = json!({
        "candidates": [{
            "content": {"parts": [
                {"text": "thinking", "thought": true},
                {"text": "Here you go"},
                {"inlineData": {"mimeType": "image/png", "data": BASE64.encode(b"new-image")},
                 "thoughtSignature": BASE64.encode(b"new-sig")}
            ]},
            "finishReason": "STOP"
        }]
    });
    let (base_url, captured) = spawn_gemini(StatusCode::OK, reply).await;
    let generator = GeminiImageGenerator::new(
        GeminiClient::new(Some(base_url)),
        Some("gemini-3-pro-image-preview".to_string()),
    );
    let request = ImageGenerationRequest {
        prompt: "make it blue".to_string(),
        history: vec![
            ConversationTurn::user("a cube"),
            ConversationTurn::model_image(
                InlineImage::new("image/png", b"old-image".to_vec()),
                Some(b"old-sig".to_vec()),
            ),
        ],
        system_instruction: Some("be creative".to_string()),
        aspect_ratio: "16:9".to_string(),
        resolution: ImageResolution::FourK,
    };

    let response = generator.generate(&request, &credential()).await.unwrap();

    let captured = captured.lock().unwrap().clone();
    let body = &captured[0].body;
    assert_eq!(body["contents"].as_array().unwrap().len(), 3);
    assert_eq!(body["contents"][1]["role"], "model");
    let replayed = &body["contents"][1]["parts"][0];
    assert_eq!(replayed["inlineData"]["data"], BASE64.encode(b"old-image"));
    assert_eq!(replayed["thoughtSignature"], BASE64.encode(b"old-sig"));
    assert_eq!(body["contents"][2]["parts"][0]["text"], "make it blue");
    assert_eq!(body["systemInstruction"]["parts"][0]["text"], "be creative");
    assert_eq!(
        body["generationConfig"]["responseModalities"],
        json!(["TEXT", "IMAGE"])
    );
    assert_eq!(body["generationConfig"]["imageConfig"]["aspectRatio"], "16:9");
    assert_eq!(body["generationConfig"]["imageConfig"]["imageSize"], "4K");

    let parts = &response.candidates[0].parts;
    assert!(parts[0].thought);
    let image_part = &parts[2];
    assert_eq!(image_part.inline_data.as_ref().unwrap().data, b"new-image".to_vec());
    assert_eq!(image_part.thought_signature, Some(b"new-sig".to_vec()));
}

#[tokio::test]
async fn given_rate_limited_response_when_generating_then_rate_limited_error() {
    let (base_url, _captured) =
        spawn_gemini(StatusCode::TOO_MANY_REQUESTS, json!({"error": "quota"})).await;
    let generator = GeminiTextGenerator::new(GeminiClient::new(Some(base_url)), None);

    let result = generator.generate(&text_request(), &credential()).await;

    assert_eq!(result, Err(ProviderError::RateLimited));
}

#[tokio::test]
async fn given_forbidden_response_when_generating_then_unauthorized_error() {
    let (base_url, _captured) =
        spawn_gemini(StatusCode::FORBIDDEN, json!({"error": "bad key"})).await;
    let generator = GeminiTextGenerator::new(GeminiClient::new(Some(base_url)), None);

    let result = generator.generate(&text_request(), &credential()).await;

    assert!(matches!(result, Err(ProviderError::Unauthorized(_))));
}

#[tokio::test]
async fn given_server_error_when_generating_then_request_failed_error() {
    let (base_url, _captured) =
        spawn_gemini(StatusCode::INTERNAL_SERVER_ERROR, json!({"error": "boom"})).await;
    let generator = GeminiTextGenerator::new(GeminiClient::new(Some(base_url)), None);

    let result = generator.generate(&text_request(), &credential()).await;

    assert!(matches!(result, Err(ProviderError::ApiRequestFailed(_))));
}

#[tokio::test]
async fn given_malformed_base64_when_generating_then_invalid_response_error() {
    let reply = json!({
        "candidates": [{"content": {"parts": [
            {"inlineData": {"mimeType": "image/png", "data": "***not base64***"}}
        ]}}]
    });
    let (base_url, _captured) = spawn_gemini(StatusCode::OK, reply).await;
    let generator = GeminiImageGenerator::new(GeminiClient::new(Some(base_url)), None);
    let request = ImageGenerationRequest {
        prompt: "x".to_string(),
        history: Vec::new(),
        system_instruction: None,
        aspect_ratio: "1:1".to_string(),
        resolution: ImageResolution::TwoK,
    };

    let result = generator.generate(&request, &credential()).await;

    assert!(matches!(result, Err(ProviderError::InvalidResponse(_))));
}

#[tokio::test]
async fn given_prompt_block_when_generating_then_feedback_is_surfaced() {
    let reply = json!({"promptFeedback": {"blockReason": "SAFETY"}});
    let (base_url, _captured) = spawn_gemini(StatusCode::OK, reply).await;
    let generator = GeminiTextGenerator::new(GeminiClient::new(Some(base_url)), None);

    let response = generator.generate(&text_request(), &credential()).await.unwrap();

    assert!(response.candidates.is_empty());
    assert_eq!(
        response.prompt_feedback.unwrap().block_reason.as_deref(),
        Some("SAFETY")
    );
}
