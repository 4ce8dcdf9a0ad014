//! Interview prep chatbot. Free-text answers; no JSON is expected.

use crate::generation::template::{PromptFields, CHAT};
use crate::generation::{GenerationResult, Orchestrator};

pub async fn answer_question(orchestrator: &Orchestrator, question: &str) -> GenerationResult<String> {
    let mut fields = PromptFields::new();
    fields.insert("question".to_string(), question.to_string());
    orchestrator.complete_text(CHAT, &fields).await
}
