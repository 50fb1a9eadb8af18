use axum::{extract::State, Json};
use serde::Serialize;

use crate::errors::AppError;
use crate::state::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientConfigResponse {
    pub openai_api_key: String,
}

/// GET /api/config
/// Hands the configured API key to the browser client.
pub async fn handle_get_config(
    State(state): State<AppState>,
) -> Result<Json<ClientConfigResponse>, AppError> {
    let key = state.config.openai_api_key.clone().ok_or_else(|| {
        AppError::NotConfigured(
            "OpenAI API key not configured. Please create a .env file with OPENAI_API_KEY."
                .to_string(),
        )
    })?;
    Ok(Json(ClientConfigResponse {
        openai_api_key: key,
    }))
}
