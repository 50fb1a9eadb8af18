// Prompt builder: form fields (free text or template options) → prompt text.
// Executing the prompt goes through llm_client like every other model call.

pub mod assembler;
pub mod handlers;
pub mod templates;
