use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::current_user::CurrentUser;
use super::error::ApiError;
use super::pagination::Pagination;
use super::transcriptions::MessageResponse;
use crate::application::services::{DEFAULT_ASPECT_RATIO, ImageRequest};
use crate::domain::{ImageGenerationId, ImageGenerationRecord, ImageResolution, TranscriptionId};
use crate::infrastructure::observability::sanitize_prompt;
use crate::presentation::state::AppState;

const DEFAULT_PAGE_SIZE: i64 = 20;

#[derive(Deserialize)]
pub struct GenerateImageRequest {
    pub prompt: String,
    pub session_id: Option<Uuid>,
    pub transcription_id: Option<Uuid>,
    #[serde(default = "default_aspect_ratio")]
    pub aspect_ratio: String,
    #[serde(default = "default_resolution")]
    pub resolution: String,
}

fn default_aspect_ratio() -> String {
    DEFAULT_ASPECT_RATIO.to_string()
}

fn default_resolution() -> String {
    ImageResolution::default().as_str().to_string()
}

#[derive(Serialize)]
pub struct ImageGenerationResponse {
    pub id: Uuid,
    pub prompt: String,
    pub image_url: String,
    pub has_image: bool,
    pub text_response: Option<String>,
    pub turn_number: i32,
    pub parent_id: Option<Uuid>,
    pub transcription_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl From<ImageGenerationRecord> for ImageGenerationResponse {
    fn from(record: ImageGenerationRecord) -> Self {
        Self {
            id: record.id.as_uuid(),
            image_url: format!("/api/images/{}/data", record.id.as_uuid()),
            has_image: record.image.as_ref().is_some_and(|image| !image.is_empty()),
            prompt: record.prompt,
            text_response: record.text_response,
            turn_number: record.turn_number,
            parent_id: record.parent_id.map(|id| id.as_uuid()),
            transcription_id: record.transcription_id.map(|id| id.as_uuid()),
            created_at: record.created_at,
        }
    }
}

#[derive(Serialize)]
pub struct ImageHistoryResponse {
    pub generations: Vec<ImageGenerationResponse>,
    pub total: i64,
}

#[tracing::instrument(skip(state, body), fields(user = %user.0))]
pub async fn generate_image_handler(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(body): Json<GenerateImageRequest>,
) -> Result<impl IntoResponse, ApiError> {
    tracing::debug!(
        prompt = %sanitize_prompt(&body.prompt),
        aspect_ratio = %body.aspect_ratio,
        resolution = %body.resolution,
        "Image generation requested"
    );

    let record = state
        .image_generation_service
        .generate(
            user.0,
            ImageRequest {
                prompt: body.prompt,
                session_id: body.session_id.map(ImageGenerationId::from_uuid),
                transcription_id: body.transcription_id.map(TranscriptionId::from_uuid),
                aspect_ratio: body.aspect_ratio,
                resolution: ImageResolution::parse_or_default(&body.resolution),
            },
        )
        .await?;

    Ok(Json(ImageGenerationResponse::from(record)))
}

pub async fn list_images_handler(
    State(state): State<AppState>,
    user: CurrentUser,
    Query(pagination): Query<Pagination>,
) -> Result<impl IntoResponse, ApiError> {
    let (skip, limit) = pagination.resolve(DEFAULT_PAGE_SIZE);
    let (records, total) = state
        .image_generation_service
        .list(user.0, skip, limit)
        .await?;

    Ok(Json(ImageHistoryResponse {
        generations: records
            .into_iter()
            .map(ImageGenerationResponse::from)
            .collect(),
        total,
    }))
}

pub async fn get_image_handler(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let record = state
        .image_generation_service
        .get(user.0, ImageGenerationId::from_uuid(id))
        .await?;
    Ok(Json(ImageGenerationResponse::from(record)))
}

pub async fn get_image_data_handler(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Response, ApiError> {
    let record = state
        .image_generation_service
        .get(user.0, ImageGenerationId::from_uuid(id))
        .await?;

    let image = record
        .image
        .filter(|image| !image.is_empty())
        .ok_or_else(|| ApiError::not_found("image data not found"))?;

    Ok(([(header::CONTENT_TYPE, image.mime_type)], image.data).into_response())
}

pub async fn list_images_for_transcription_handler(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(transcription_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let records = state
        .image_generation_service
        .list_for_transcription(user.0, TranscriptionId::from_uuid(transcription_id))
        .await?;
    Ok(Json(
        records
            .into_iter()
            .map(ImageGenerationResponse::from)
            .collect::<Vec<_>>(),
    ))
}

pub async fn delete_image_handler(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .image_generation_service
        .delete(user.0, ImageGenerationId::from_uuid(id))
        .await?;
    Ok(Json(MessageResponse {
        message: "image deleted".to_string(),
    }))
}
