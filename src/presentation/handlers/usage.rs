use axum::Json;
use axum::extract::{Query, State};
use axum::response::IntoResponse;
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use super::current_user::CurrentUser;
use super::error::ApiError;
use super::pagination::Pagination;
use crate::application::services::{CostCalculator, CostGroup, UsageSummary};
use crate::domain::UsageEvent;
use crate::presentation::state::AppState;

const DEFAULT_PAGE_SIZE: i64 = 100;

#[derive(Serialize)]
pub struct UsageResponse {
    pub id: Uuid,
    pub provider: String,
    pub model: String,
    pub operation: String,
    pub api_tier: String,
    pub audio_seconds: Option<f64>,
    pub input_tokens: Option<i64>,
    pub output_tokens: Option<i64>,
    pub images_generated: Option<i32>,
    pub image_resolution: Option<String>,
    pub cost_usd: f64,
    pub cost_display: f64,
    pub display_currency: String,
    pub transcription_id: Option<Uuid>,
    pub style_guide_id: Option<Uuid>,
    pub image_generation_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl UsageResponse {
    fn from_event(event: UsageEvent, calculator: &CostCalculator) -> Self {
        Self {
            id: event.id.as_uuid(),
            operation: event.operation.as_str().to_string(),
            api_tier: event.tier.as_str().to_string(),
            audio_seconds: event.quantities.audio_seconds(),
            input_tokens: event.quantities.input_tokens(),
            output_tokens: event.quantities.output_tokens(),
            images_generated: event.quantities.images_generated(),
            image_resolution: event
                .quantities
                .image_resolution()
                .map(|r| r.as_str().to_string()),
            cost_usd: event.cost_usd,
            cost_display: calculator.to_display_currency(event.cost_usd),
            display_currency: calculator.display_currency().to_string(),
            transcription_id: event.transcription_id().map(|id| id.as_uuid()),
            style_guide_id: event.style_guide_id().map(|id| id.as_uuid()),
            image_generation_id: event.image_generation_id().map(|id| id.as_uuid()),
            provider: event.provider,
            model: event.model,
            created_at: event.created_at,
        }
    }
}

#[derive(Serialize)]
pub struct OperationSummary {
    pub operation: String,
    pub count: usize,
    pub total_cost_usd: f64,
    pub total_cost_display: f64,
}

#[derive(Serialize)]
pub struct MonthlySummary {
    pub month: String,
    pub count: usize,
    pub total_cost_usd: f64,
    pub total_cost_display: f64,
}

#[derive(Serialize)]
pub struct UsageSummaryResponse {
    pub total_cost_usd: f64,
    pub total_cost_display: f64,
    pub display_currency: String,
    pub exchange_rate: f64,
    pub total_requests: usize,
    pub by_operation: Vec<OperationSummary>,
    pub by_month: Vec<MonthlySummary>,
}

impl From<UsageSummary> for UsageSummaryResponse {
    fn from(summary: UsageSummary) -> Self {
        Self {
            total_cost_usd: summary.total_cost_usd,
            total_cost_display: summary.total_cost_display,
            display_currency: summary.display_currency,
            exchange_rate: summary.exchange_rate,
            total_requests: summary.total_requests,
            by_operation: summary
                .by_operation
                .into_iter()
                .map(|group: CostGroup<_>| OperationSummary {
                    operation: group.key.as_str().to_string(),
                    count: group.count,
                    total_cost_usd: group.total_cost_usd,
                    total_cost_display: group.total_cost_display,
                })
                .collect(),
            by_month: summary
                .by_month
                .into_iter()
                .map(|group| MonthlySummary {
                    month: group.key,
                    count: group.count,
                    total_cost_usd: group.total_cost_usd,
                    total_cost_display: group.total_cost_display,
                })
                .collect(),
        }
    }
}

pub async fn list_usage_handler(
    State(state): State<AppState>,
    user: CurrentUser,
    Query(pagination): Query<Pagination>,
) -> Result<impl IntoResponse, ApiError> {
    let (skip, limit) = pagination.resolve(DEFAULT_PAGE_SIZE);
    let events = state.usage_service.list(user.0, skip, limit).await?;
    let calculator = state.usage_service.calculator();

    Ok(Json(
        events
            .into_iter()
            .map(|event| UsageResponse::from_event(event, calculator))
            .collect::<Vec<_>>(),
    ))
}

pub async fn usage_summary_handler(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<impl IntoResponse, ApiError> {
    let summary = state.usage_service.summary(user.0).await?;
    Ok(Json(UsageSummaryResponse::from(summary)))
}
