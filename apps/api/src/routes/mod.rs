pub mod config;
pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    handler::HandlerWithoutStateExt,
    routing::{get, post},
    Router,
};
use tower_http::services::ServeDir;

use crate::cards::handlers as cards;
use crate::cards::images::MAX_IMAGE_BYTES;
use crate::errors::AppError;
use crate::prompt::handlers as prompt;
use crate::state::AppState;

/// Headroom over the image limit for multipart framing, so oversized images
/// reach our own size check and get a JSON 413.
const UPLOAD_BODY_LIMIT: usize = MAX_IMAGE_BYTES + 1024 * 1024;

async fn not_found() -> AppError {
    AppError::NotFound("Not found".to_string())
}

pub fn build_router(state: AppState) -> Router {
    let uploads = ServeDir::new(&state.config.uploads_dir);
    let static_files =
        ServeDir::new(&state.config.static_dir).not_found_service(not_found.into_service());

    Router::new()
        .route("/health", get(health::health_handler))
        .route("/api/config", get(config::handle_get_config))
        // Prompt builder
        .route("/api/templates", get(prompt::handle_list_templates))
        .route("/api/generate-prompt", post(prompt::handle_generate_prompt))
        .route("/api/execute-prompt", post(prompt::handle_execute_prompt))
        // Business-card reader
        .route("/api/upload-image", post(cards::handle_upload_image))
        .route(
            "/api/business-card/process",
            post(cards::handle_process_card),
        )
        .route("/api/business-card/export", post(cards::handle_export_card))
        .route(
            "/api/business-cards",
            get(cards::handle_list_cards).post(cards::handle_save_card),
        )
        .layer(DefaultBodyLimit::max(UPLOAD_BODY_LIMIT))
        .nest_service("/uploads", uploads)
        .fallback_service(static_files)
        .with_state(state)
}
