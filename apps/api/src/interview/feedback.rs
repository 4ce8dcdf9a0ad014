//! Post-interview feedback generated from the session transcript.

use serde::{Deserialize, Serialize};

use crate::generation::template::INTERVIEW_FEEDBACK;
use crate::generation::{
    FieldType, GenerationRequest, GenerationResult, ObjectSchema, Orchestrator, ResponseSchema,
};

const MIN_SCORE: f64 = 1.0;
const MAX_SCORE: f64 = 10.0;

/// One question asked by the voice assistant and the candidate's transcribed answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranscriptTurn {
    pub question: String,
    #[serde(default)]
    pub answer: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InterviewFeedback {
    pub strengths: String,
    pub improvements: String,
    pub communication_clarity_score: f64,
    pub relevance_score: f64,
    pub overall_score: f64,
    pub detailed_feedback: String,
}

impl InterviewFeedback {
    /// Pulls every score into 1..=10.
    pub fn clamped(mut self) -> Self {
        for score in [
            &mut self.communication_clarity_score,
            &mut self.relevance_score,
            &mut self.overall_score,
        ] {
            *score = score.clamp(MIN_SCORE, MAX_SCORE);
        }
        self
    }
}

/// Every key is required; an answer missing any of them is a validation failure.
pub fn schema() -> ResponseSchema {
    ResponseSchema::Object(
        ObjectSchema::new()
            .required("strengths", FieldType::String)
            .required("improvements", FieldType::String)
            .required("communicationClarityScore", FieldType::Number)
            .required("relevanceScore", FieldType::Number)
            .required("overallScore", FieldType::Number)
            .required("detailedFeedback", FieldType::String),
    )
}

/// `Q1: ...\nA: ...` blocks separated by blank lines.
pub fn format_transcript(turns: &[TranscriptTurn]) -> String {
    turns
        .iter()
        .enumerate()
        .map(|(i, turn)| {
            let answer = turn
                .answer
                .as_deref()
                .filter(|a| !a.trim().is_empty())
                .unwrap_or("No answer provided");
            format!("Q{}: {}\nA: {}", i + 1, turn.question, answer)
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

pub fn request(position: &str, turns: &[TranscriptTurn]) -> GenerationRequest {
    GenerationRequest::new(INTERVIEW_FEEDBACK, schema())
        .field("position", position)
        .field("transcript", format_transcript(turns))
}

pub async fn generate_feedback(
    orchestrator: &Orchestrator,
    position: &str,
    turns: &[TranscriptTurn],
) -> GenerationResult<InterviewFeedback> {
    let feedback: InterviewFeedback = orchestrator.run_typed(&request(position, turns)).await?;
    Ok(feedback.clamped())
}
