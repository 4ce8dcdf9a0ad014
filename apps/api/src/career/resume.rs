//! Resume Analyzer: scores a resume and lists improvements.

use serde::{Deserialize, Serialize};

use crate::generation::schema::ValidationError;
use crate::generation::template::RESUME_ANALYSIS;
use crate::generation::{
    FieldType, GenerationError, GenerationRequest, GenerationResult, ObjectSchema, Orchestrator,
    ResponseSchema,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResumeAnalysis {
    /// 0 to 100
    pub resume_score: f64,
    /// 0 to 100
    pub ats_compatibility: f64,
    pub improvements: Vec<String>,
    pub suggestions: Vec<String>,
    pub weaknesses: Vec<String>,
    pub strengths: Vec<String>,
    pub recommended_roles: Vec<String>,
}

/// The model answers with a one-element array.
pub fn schema() -> ResponseSchema {
    let strings = || FieldType::array_of(FieldType::String);
    ResponseSchema::array_of(
        ObjectSchema::new()
            .required("resumeScore", FieldType::Number)
            .required("atsCompatibility", FieldType::Number)
            .required("improvements", strings())
            .required("suggestions", strings())
            .required("weaknesses", strings())
            .required("strengths", strings())
            .required("recommendedRoles", strings()),
    )
    .with_min_items(1)
}

pub fn request(resume_text: &str) -> GenerationRequest {
    GenerationRequest::new(RESUME_ANALYSIS, schema()).field("resumeText", resume_text)
}

pub async fn analyze_resume(
    orchestrator: &Orchestrator,
    resume_text: &str,
) -> GenerationResult<ResumeAnalysis> {
    let analyses: Vec<ResumeAnalysis> = orchestrator.run_typed(&request(resume_text)).await?;
    analyses.into_iter().next().ok_or_else(|| {
        GenerationError::Validation(ValidationError::Decode {
            message: "resume analysis array was empty".to_string(),
        })
    })
}
