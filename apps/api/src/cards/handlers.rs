//! Axum route handlers for the business-card reader.

use axum::{
    extract::{Multipart, Query, State},
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::cards::export::{self, ExportFormat};
use crate::cards::extract::extract_contact;
use crate::cards::images::read_image_upload;
use crate::cards::models::{ContactRecord, PersistedRecord};
use crate::cards::store::RECENT_PAGE_SIZE;
use crate::errors::AppError;
use crate::llm_client::prompts::BUSINESS_CARD_EXTRACT_PROMPT;
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadImageResponse {
    pub success: bool,
    pub image_url: String,
    pub filename: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessCardResponse {
    pub success: bool,
    pub image_url: String,
    pub record: ContactRecord,
    /// JSON view of the extracted fields.
    pub json: String,
    /// CSV view of the extracted fields.
    pub csv: String,
}

#[derive(Debug, Serialize)]
pub struct SaveCardResponse {
    pub success: bool,
    /// False when the record store is unavailable and nothing was written.
    pub persisted: bool,
    pub record: Option<PersistedRecord>,
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct ListCardsResponse {
    pub records: Vec<PersistedRecord>,
}

#[derive(Debug, Deserialize)]
pub struct ExportQuery {
    pub format: ExportFormat,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/upload-image
///
/// Stores an uploaded image and returns its public URL.
pub async fn handle_upload_image(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<UploadImageResponse>, AppError> {
    let upload = read_image_upload(multipart).await?;
    let stored = state.images.store_image(&upload).await?;

    Ok(Json(UploadImageResponse {
        success: true,
        image_url: stored.image_url,
        filename: stored.filename,
    }))
}

/// POST /api/business-card/process
///
/// Asks the vision model to read the image, then stores the image and
/// returns the extracted fields. A failed model call writes nothing.
/// Nothing is saved to the record store here.
pub async fn handle_process_card(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<ProcessCardResponse>, AppError> {
    let upload = read_image_upload(multipart).await?;
    if !state.llm.is_configured() {
        return Err(AppError::NotConfigured(
            "OpenAI API key not configured".to_string(),
        ));
    }

    let reply = state
        .llm
        .complete(BUSINESS_CARD_EXTRACT_PROMPT, Some(&upload.to_image_input()))
        .await?;
    let stored = state.images.store_image(&upload).await?;

    let mut record = extract_contact(&reply);
    record.image_url = stored.image_url.clone();
    if record.is_blank() {
        warn!("No contact fields recognised on {}", stored.filename);
    } else {
        info!("Extracted business card fields from {}", stored.filename);
    }

    Ok(Json(ProcessCardResponse {
        success: true,
        image_url: stored.image_url,
        json: export::to_json(&record)?,
        csv: export::to_csv(&record)?,
        record,
    }))
}

/// POST /api/business-cards
///
/// Appends a record to the store. An all-empty record is still a record.
pub async fn handle_save_card(
    State(state): State<AppState>,
    Json(record): Json<ContactRecord>,
) -> Result<Json<SaveCardResponse>, AppError> {
    let store = state.store.clone();
    let saved = tokio::task::spawn_blocking(move || store.insert(record))
        .await
        .map_err(|e| AppError::Internal(e.into()))??;

    Ok(Json(SaveCardResponse {
        success: true,
        persisted: saved.is_some(),
        record: saved,
    }))
}

/// GET /api/business-cards?limit=N
///
/// Most recent records first, at most one page.
pub async fn handle_list_cards(
    State(state): State<AppState>,
    Query(params): Query<ListQuery>,
) -> Result<Json<ListCardsResponse>, AppError> {
    let limit = params
        .limit
        .unwrap_or(RECENT_PAGE_SIZE)
        .min(RECENT_PAGE_SIZE);

    let store = state.store.clone();
    let records = tokio::task::spawn_blocking(move || store.list_recent(limit))
        .await
        .map_err(|e| AppError::Internal(e.into()))?;

    Ok(Json(ListCardsResponse { records }))
}

/// POST /api/business-card/export?format=json|csv
///
/// Returns the record as a downloadable file.
pub async fn handle_export_card(
    Query(params): Query<ExportQuery>,
    Json(record): Json<ContactRecord>,
) -> Result<Response, AppError> {
    let format = params.format;
    let filename = format.filename(chrono::Utc::now().timestamp_millis());
    let body = format.render(&record)?;

    Ok((
        [
            (header::CONTENT_TYPE, format.mime_type().to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{filename}\""),
            ),
        ],
        body,
    )
        .into_response())
}
