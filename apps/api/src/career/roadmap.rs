//! Career Roadmap Generator: ordered steps from the current role to a target role.

use serde::{Deserialize, Serialize};

use crate::generation::template::CAREER_ROADMAP;
use crate::generation::{
    FieldType, GenerationRequest, GenerationResult, ObjectSchema, Orchestrator, ResponseSchema,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoadmapStep {
    pub step: u32,
    pub title: String,
    pub description: String,
    pub duration: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CareerRoadmap {
    pub career_path: Vec<RoadmapStep>,
}

pub fn schema() -> ResponseSchema {
    let step = ObjectSchema::new()
        .required("step", FieldType::Number)
        .required("title", FieldType::String)
        .required("description", FieldType::String)
        .required("duration", FieldType::String);
    ResponseSchema::Object(
        ObjectSchema::new().required("careerPath", FieldType::array_of(FieldType::Object(step))),
    )
}

pub fn request(current_role: &str, target_role: &str, skills: Option<&str>) -> GenerationRequest {
    GenerationRequest::new(CAREER_ROADMAP, schema())
        .field("currentRole", current_role)
        .field("targetRole", target_role)
        .field("skills", skills.unwrap_or_default())
}

pub async fn generate_roadmap(
    orchestrator: &Orchestrator,
    current_role: &str,
    target_role: &str,
    skills: Option<&str>,
) -> GenerationResult<CareerRoadmap> {
    let mut roadmap: CareerRoadmap = orchestrator
        .run_typed(&request(current_role, target_role, skills))
        .await?;
    roadmap.career_path.sort_by_key(|s| s.step);
    Ok(roadmap)
}
