use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::current_user::CurrentUser;
use super::error::ApiError;
use super::transcriptions::MessageResponse;
use crate::application::services::StyleGuideChanges;
use crate::domain::{StyleGuide, StyleGuideId};
use crate::presentation::state::AppState;

#[derive(Serialize)]
pub struct StyleGuideResponse {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub examples: Option<String>,
    pub guide_content: Option<String>,
    pub is_default: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<StyleGuide> for StyleGuideResponse {
    fn from(guide: StyleGuide) -> Self {
        Self {
            id: guide.id.as_uuid(),
            name: guide.name,
            description: guide.description,
            examples: guide.examples,
            guide_content: guide.guide_content,
            is_default: guide.is_default,
            created_at: guide.created_at,
            updated_at: guide.updated_at,
        }
    }
}

#[derive(Deserialize)]
pub struct CreateStyleGuideRequest {
    pub name: String,
    pub description: Option<String>,
    pub examples: Option<String>,
}

#[derive(Deserialize, Default)]
pub struct UpdateStyleGuideRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub examples: Option<String>,
    pub guide_content: Option<String>,
}

impl From<UpdateStyleGuideRequest> for StyleGuideChanges {
    fn from(request: UpdateStyleGuideRequest) -> Self {
        Self {
            name: request.name,
            description: request.description,
            examples: request.examples,
            guide_content: request.guide_content,
        }
    }
}

pub async fn list_style_guides_handler(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<impl IntoResponse, ApiError> {
    let guides = state.style_guide_service.list(user.0).await?;
    Ok(Json(
        guides
            .into_iter()
            .map(StyleGuideResponse::from)
            .collect::<Vec<_>>(),
    ))
}

pub async fn create_style_guide_handler(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(body): Json<CreateStyleGuideRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let guide = state
        .style_guide_service
        .create(user.0, &body.name, body.description, body.examples)
        .await?;
    Ok((StatusCode::CREATED, Json(StyleGuideResponse::from(guide))))
}

pub async fn get_style_guide_handler(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let guide = state
        .style_guide_service
        .get(user.0, StyleGuideId::from_uuid(id))
        .await?;
    Ok(Json(StyleGuideResponse::from(guide)))
}

pub async fn update_style_guide_handler(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateStyleGuideRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let guide = state
        .style_guide_service
        .update(user.0, StyleGuideId::from_uuid(id), body.into())
        .await?;
    Ok(Json(StyleGuideResponse::from(guide)))
}

pub async fn delete_style_guide_handler(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .style_guide_service
        .delete(user.0, StyleGuideId::from_uuid(id))
        .await?;
    Ok(Json(MessageResponse {
        message: "style guide deleted".to_string(),
    }))
}

#[tracing::instrument(skip(state), fields(user = %user.0, style_guide = %id))]
pub async fn generate_style_guide_handler(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let guide = state
        .style_guide_service
        .generate(user.0, StyleGuideId::from_uuid(id))
        .await?;
    Ok(Json(StyleGuideResponse::from(guide)))
}

pub async fn set_default_style_guide_handler(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let guide = state
        .style_guide_service
        .set_default(user.0, StyleGuideId::from_uuid(id))
        .await?;
    Ok(Json(StyleGuideResponse::from(guide)))
}
