use std::sync::Arc;

use crate::cards::images::ImageStore;
use crate::cards::store::RecordStore;
use crate::config::Config;
use crate::llm_client::CompletionClient;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Chat-completion backend. Default: `LlmClient` against OpenAI.
    pub llm: Arc<dyn CompletionClient>,
    /// Where uploaded card images are written.
    pub images: Arc<dyn ImageStore>,
    /// Saved business cards. May be disabled if storage was unavailable at startup.
    pub store: Arc<RecordStore>,
}
