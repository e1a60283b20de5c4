use axum::Json;
use axum::extract::{Multipart, Path, Query, State};
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::current_user::CurrentUser;
use super::error::ApiError;
use super::pagination::Pagination;
use crate::application::services::AudioUpload;
use crate::domain::{StyleGuideId, Transcription, TranscriptionId};
use crate::infrastructure::observability::sanitize_prompt;
use crate::presentation::state::AppState;

const DEFAULT_PAGE_SIZE: i64 = 50;

#[derive(Serialize)]
pub struct TranscriptionResponse {
    pub id: Uuid,
    pub filename: Option<String>,
    pub duration_seconds: f64,
    pub duration_formatted: String,
    pub raw_text: String,
    pub instruction: Option<String>,
    pub processed_text: Option<String>,
    pub has_audio: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Transcription> for TranscriptionResponse {
    fn from(t: Transcription) -> Self {
        Self {
            id: t.id.as_uuid(),
            duration_formatted: t.duration_formatted(),
            has_audio: t.audio_path.is_some(),
            filename: t.filename,
            duration_seconds: t.duration_seconds,
            raw_text: t.raw_text,
            instruction: t.instruction,
            processed_text: t.processed_text,
            created_at: t.created_at,
            updated_at: t.updated_at,
        }
    }
}

#[derive(Serialize)]
pub struct TranscriptionListResponse {
    pub transcriptions: Vec<TranscriptionResponse>,
    pub total: i64,
}

#[derive(Serialize)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Deserialize)]
pub struct UpdateTranscriptionRequest {
    pub raw_text: Option<String>,
}

#[derive(Deserialize)]
pub struct ProcessRequest {
    pub instruction: String,
    pub style_guide_id: Option<Uuid>,
}

#[tracing::instrument(skip(state, multipart), fields(user = %user.0))]
pub async fn transcribe_handler(
    State(state): State<AppState>,
    user: CurrentUser,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, ApiError> {
    let mut file: Option<(String, bytes::Bytes)> = None;
    let mut context: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::new(e.status(), e.body_text()))?
    {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("file") => {
                let filename = field.file_name().unwrap_or_default().to_string();
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::new(e.status(), e.body_text()))?;
                file = Some((filename, data));
            }
            Some("context") => {
                context = Some(
                    field
                        .text()
                        .await
                        .map_err(|e| ApiError::new(e.status(), e.body_text()))?,
                );
            }
            _ => {}
        }
    }

    let (filename, data) = file.ok_or_else(|| {
        tracing::warn!("Transcribe request with no file");
        ApiError::bad_request("no file uploaded")
    })?;

    tracing::debug!(
        filename = %filename,
        bytes = data.len(),
        context = %sanitize_prompt(context.as_deref().unwrap_or_default()),
        "Audio upload received"
    );

    let transcription = state
        .transcription_service
        .transcribe_upload(
            user.0,
            AudioUpload {
                filename,
                data,
                context,
            },
        )
        .await?;

    Ok((
        StatusCode::OK,
        Json(TranscriptionResponse::from(transcription)),
    ))
}

pub async fn list_transcriptions_handler(
    State(state): State<AppState>,
    user: CurrentUser,
    Query(pagination): Query<Pagination>,
) -> Result<impl IntoResponse, ApiError> {
    let (skip, limit) = pagination.resolve(DEFAULT_PAGE_SIZE);
    let (items, total) = state
        .transcription_service
        .list(user.0, skip, limit)
        .await?;

    Ok(Json(TranscriptionListResponse {
        transcriptions: items.into_iter().map(TranscriptionResponse::from).collect(),
        total,
    }))
}

pub async fn get_transcription_handler(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let transcription = state
        .transcription_service
        .get(user.0, TranscriptionId::from_uuid(id))
        .await?;
    Ok(Json(TranscriptionResponse::from(transcription)))
}

pub async fn update_transcription_handler(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateTranscriptionRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let transcription = state
        .transcription_service
        .update_raw_text(user.0, TranscriptionId::from_uuid(id), body.raw_text)
        .await?;
    Ok(Json(TranscriptionResponse::from(transcription)))
}

pub async fn delete_transcription_handler(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .transcription_service
        .delete(user.0, TranscriptionId::from_uuid(id))
        .await?;
    Ok(Json(MessageResponse {
        message: "transcription deleted".to_string(),
    }))
}

#[tracing::instrument(skip(state, body), fields(user = %user.0, transcription = %id))]
pub async fn process_transcription_handler(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
    Json(body): Json<ProcessRequest>,
) -> Result<impl IntoResponse, ApiError> {
    tracing::debug!(instruction = %sanitize_prompt(&body.instruction), "Processing transcription");

    let transcription = state
        .text_processing_service
        .process(
            user.0,
            TranscriptionId::from_uuid(id),
            &body.instruction,
            body.style_guide_id.map(StyleGuideId::from_uuid),
        )
        .await?;
    Ok(Json(TranscriptionResponse::from(transcription)))
}

pub async fn get_audio_handler(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Response, ApiError> {
    let audio = state
        .transcription_service
        .fetch_audio(user.0, TranscriptionId::from_uuid(id))
        .await?;

    let disposition = format!(
        "inline; filename=\"{}\"",
        audio
            .filename
            .replace(|c: char| c == '"' || c == '\\' || c.is_control(), "_")
    );

    Ok((
        [
            (header::CONTENT_TYPE, audio.content_type.to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        audio.data,
    )
        .into_response())
}

pub async fn delete_audio_handler(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .transcription_service
        .delete_audio(user.0, TranscriptionId::from_uuid(id))
        .await?;
    Ok(Json(MessageResponse {
        message: "audio deleted".to_string(),
    }))
}
