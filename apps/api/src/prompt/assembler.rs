//! Prompt assembly: labeled fields in, one prompt string out.

/// Appended after every assembled prompt.
pub const CLOSING_SENTENCE: &str = "上記の内容に基づいて、適切な回答をお願いします。";

/// Bullet used when a task is built from selected template options.
const TASK_BULLET: &str = "• ";

/// Form fields of the prompt builder. `task` is mandatory; callers validate
/// it before calling [`assemble`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PromptFields {
    pub role: String,
    pub task: String,
    pub context: String,
    pub requirements: String,
    pub output: String,
}

impl PromptFields {
    /// Fields with their section labels, in output order.
    fn sections(&self) -> [(&'static str, &str); 5] {
        [
            ("役割", self.role.as_str()),
            ("タスク", self.task.as_str()),
            ("コンテキスト", self.context.as_str()),
            ("要件・制約", self.requirements.as_str()),
            ("出力形式", self.output.as_str()),
        ]
    }
}

/// Builds the prompt text.
///
/// Each non-blank field becomes `# <label>\n<value>\n\n`; blank fields are
/// left out entirely. [`CLOSING_SENTENCE`] always comes last.
///
/// Precondition: `fields.task` is non-blank. An empty task is a caller bug.
pub fn assemble(fields: &PromptFields) -> String {
    debug_assert!(
        !fields.task.trim().is_empty(),
        "assemble called without a task"
    );

    let mut prompt = String::new();
    for (label, value) in fields.sections() {
        let value = value.trim();
        if value.is_empty() {
            continue;
        }
        prompt.push_str(&format!("# {label}\n{value}\n\n"));
    }
    prompt.push_str(CLOSING_SENTENCE);
    prompt
}

/// Task text for selected template options: one bulleted line per option,
/// in the order given. No options yields an empty string.
pub fn join_task_options<S: AsRef<str>>(options: &[S]) -> String {
    if options.is_empty() {
        return String::new();
    }
    let joined = options
        .iter()
        .map(|o| o.as_ref())
        .collect::<Vec<_>>()
        .join(&format!("\n{TASK_BULLET}"));
    format!("{TASK_BULLET}{joined}")
}
