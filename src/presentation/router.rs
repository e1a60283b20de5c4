use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::middleware;
use axum::routing::{get, post, put};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

use crate::infrastructure::observability::request_id_middleware;
use crate::presentation::handlers::{
    create_style_guide_handler, delete_audio_handler, delete_image_handler,
    delete_style_guide_handler, delete_transcription_handler, generate_image_handler,
    generate_style_guide_handler, get_audio_handler, get_image_data_handler, get_image_handler,
    get_style_guide_handler, get_transcription_handler, health_handler,
    list_images_for_transcription_handler, list_images_handler, list_style_guides_handler,
    list_transcriptions_handler, list_usage_handler, process_transcription_handler,
    set_default_style_guide_handler, transcribe_handler, update_style_guide_handler,
    update_transcription_handler, usage_summary_handler,
};
use crate::presentation::state::AppState;

/// Room for multipart boundaries and the `context` field on top of the file.
const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
        .on_response(DefaultOnResponse::new().level(Level::INFO));

    let body_limit = state
        .max_upload_bytes
        .saturating_add(MULTIPART_OVERHEAD_BYTES);

    let transcriptions = Router::new()
        .route("/transcribe", post(transcribe_handler))
        .route("/transcriptions", get(list_transcriptions_handler))
        .route(
            "/transcriptions/{id}",
            get(get_transcription_handler)
                .put(update_transcription_handler)
                .delete(delete_transcription_handler),
        )
        .route(
            "/transcriptions/{id}/audio",
            get(get_audio_handler).delete(delete_audio_handler),
        )
        .route(
            "/transcriptions/{id}/process",
            post(process_transcription_handler),
        );

    let style_guides = Router::new()
        .route(
            "/settings/style-guides",
            get(list_style_guides_handler).post(create_style_guide_handler),
        )
        .route(
            "/settings/style-guides/{id}",
            get(get_style_guide_handler)
                .put(update_style_guide_handler)
                .delete(delete_style_guide_handler),
        )
        .route(
            "/settings/style-guides/{id}/generate",
            post(generate_style_guide_handler),
        )
        .route(
            "/settings/style-guides/{id}/default",
            put(set_default_style_guide_handler),
        );

    let images = Router::new()
        .route("/images/generate", post(generate_image_handler))
        .route("/images", get(list_images_handler))
        .route(
            "/images/{id}",
            get(get_image_handler).delete(delete_image_handler),
        )
        .route("/images/{id}/data", get(get_image_data_handler))
        .route(
            "/images/transcription/{transcription_id}",
            get(list_images_for_transcription_handler),
        );

    let usage = Router::new()
        .route("/usage", get(list_usage_handler))
        .route("/usage/summary", get(usage_summary_handler));

    let api = transcriptions
        .merge(style_guides)
        .merge(images)
        .merge(usage);

    Router::new()
        .route("/health", get(health_handler))
        .nest("/api", api)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(middleware::from_fn(request_id_middleware))
        .layer(trace_layer)
        .layer(cors)
        .with_state(state)
}
