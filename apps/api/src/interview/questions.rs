//! Interview question generation: topic Q&A and profile-based prep questions.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::generation::template::{INTERVIEW_QA, INTERVIEW_QUESTIONS};
use crate::generation::{FieldType, GenerationRequest, ObjectSchema, ResponseSchema};

pub const MAX_QUESTIONS: u32 = 50;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QaPair {
    pub question: String,
    pub answer: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QuestionsError {
    #[error("numQuestions must be between 1 and 50, got {0}")]
    CountOutOfRange(u32),

    #[error("Please select at least one interview type")]
    NoInterviewTypes,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InterviewType {
    Behavioral,
    Technical,
    Hr,
    Aptitude,
    Coding,
}

impl InterviewType {
    fn bullet(self) -> &'static str {
        match self {
            InterviewType::Behavioral => "- Behavioral questions (e.g., teamwork, communication)",
            InterviewType::Technical => "- Technical questions related to the position",
            InterviewType::Hr => "- HR questions (e.g., motivation, company culture)",
            InterviewType::Aptitude => "- Aptitude questions (logical reasoning, quantitative)",
            InterviewType::Coding => "- Coding or programming problems",
        }
    }
}

/// What the candidate filled in on the prep form.
#[derive(Debug, Clone, Deserialize)]
pub struct CandidateProfile {
    pub name: String,
    pub position: String,
    pub skills: String,
    pub experience: String,
    pub interview_types: Vec<InterviewType>,
}

pub fn qa_schema() -> ResponseSchema {
    ResponseSchema::array_of(
        ObjectSchema::new()
            .required("question", FieldType::String)
            .required("answer", FieldType::String),
    )
    .with_min_items(1)
}

pub fn topic_request(topic: &str, num_questions: u32) -> Result<GenerationRequest, QuestionsError> {
    if !(1..=MAX_QUESTIONS).contains(&num_questions) {
        return Err(QuestionsError::CountOutOfRange(num_questions));
    }
    Ok(GenerationRequest::new(INTERVIEW_QA, qa_schema())
        .field("topic", topic)
        .field("numQuestions", num_questions.to_string()))
}

/// One bullet line per selected type, first occurrence wins.
pub fn render_interview_types(types: &[InterviewType]) -> String {
    let mut seen = Vec::with_capacity(types.len());
    for &t in types {
        if !seen.contains(&t) {
            seen.push(t);
        }
    }
    seen.into_iter()
        .map(InterviewType::bullet)
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn profile_request(profile: &CandidateProfile) -> Result<GenerationRequest, QuestionsError> {
    if profile.interview_types.is_empty() {
        return Err(QuestionsError::NoInterviewTypes);
    }
    Ok(GenerationRequest::new(INTERVIEW_QUESTIONS, qa_schema())
        .field("name", profile.name.as_str())
        .field("position", profile.position.as_str())
        .field("skills", profile.skills.as_str())
        .field("experience", profile.experience.as_str())
        .field("interviewTypes", render_interview_types(&profile.interview_types)))
}
