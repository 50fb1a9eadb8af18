//! Axum route handlers for the prompt builder.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::prompt::assembler::{assemble, join_task_options, PromptFields};
use crate::prompt::templates::{find_template, PromptTemplate, CUSTOM_TEMPLATE_ID, TEMPLATES};
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

/// Prompt builder form. With a catalogue `template`, the task comes from
/// `selected_tasks`; otherwise from the free-text `task`.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GeneratePromptRequest {
    pub template: Option<String>,
    /// Omitted role falls back to the template's default role.
    pub role: Option<String>,
    pub task: String,
    pub selected_tasks: Vec<String>,
    pub context: String,
    pub requirements: String,
    pub output: String,
}

impl GeneratePromptRequest {
    pub fn into_fields(self) -> Result<PromptFields, AppError> {
        let template = self.template()?;

        let task = match template {
            Some(_) => {
                let selected: Vec<&str> = self
                    .selected_tasks
                    .iter()
                    .map(|t| t.trim())
                    .filter(|t| !t.is_empty())
                    .collect();
                join_task_options(&selected)
            }
            None => self.task.trim().to_string(),
        };
        if task.is_empty() {
            return Err(AppError::Validation("Task is required".to_string()));
        }

        let role = match self.role {
            Some(role) => role.trim().to_string(),
            None => template.map(|t| t.role.to_string()).unwrap_or_default(),
        };

        Ok(PromptFields {
            role,
            task,
            context: self.context.trim().to_string(),
            requirements: self.requirements.trim().to_string(),
            output: self.output.trim().to_string(),
        })
    }

    fn template(&self) -> Result<Option<&'static PromptTemplate>, AppError> {
        match self.template.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(id) if id == CUSTOM_TEMPLATE_ID => Ok(None),
            Some(id) => find_template(id)
                .map(Some)
                .ok_or_else(|| AppError::Validation(format!("Unknown template: {id}"))),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct GeneratePromptResponse {
    pub success: bool,
    pub prompt: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ExecutePromptRequest {
    pub prompt: String,
}

#[derive(Debug, Serialize)]
pub struct ExecutePromptResponse {
    pub success: bool,
    pub response: String,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// GET /api/templates
pub async fn handle_list_templates() -> Json<&'static [PromptTemplate]> {
    Json(TEMPLATES)
}

/// POST /api/generate-prompt
///
/// Builds the prompt text from the form without calling the model.
pub async fn handle_generate_prompt(
    Json(request): Json<GeneratePromptRequest>,
) -> Result<Json<GeneratePromptResponse>, AppError> {
    let fields = request.into_fields()?;
    Ok(Json(GeneratePromptResponse {
        success: true,
        prompt: assemble(&fields),
    }))
}

/// POST /api/execute-prompt
///
/// Sends a prompt to the chat model and returns its reply.
pub async fn handle_execute_prompt(
    State(state): State<AppState>,
    Json(request): Json<ExecutePromptRequest>,
) -> Result<Json<ExecutePromptResponse>, AppError> {
    if !state.llm.is_configured() {
        return Err(AppError::NotConfigured(
            "OpenAI API key not configured".to_string(),
        ));
    }
    let prompt = request.prompt.trim();
    if prompt.is_empty() {
        return Err(AppError::Validation("No prompt provided".to_string()));
    }

    let response = state.llm.complete(prompt, None).await?;

    Ok(Json(ExecutePromptResponse {
        success: true,
        response,
    }))
}
