//! Cover Letter Generator.

use serde::{Deserialize, Serialize};

use crate::generation::template::COVER_LETTER;
use crate::generation::{
    FieldType, GenerationRequest, GenerationResult, ObjectSchema, Orchestrator, ResponseSchema,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoverLetter {
    pub cover_letter: String,
}

pub fn schema() -> ResponseSchema {
    ResponseSchema::Object(ObjectSchema::new().required("coverLetter", FieldType::String))
}

pub fn request(job_title: &str, company_name: &str, additional_info: Option<&str>) -> GenerationRequest {
    GenerationRequest::new(COVER_LETTER, schema())
        .field("jobTitle", job_title)
        .field("companyName", company_name)
        .field("additionalInfo", additional_info.unwrap_or_default())
}

pub async fn write_cover_letter(
    orchestrator: &Orchestrator,
    job_title: &str,
    company_name: &str,
    additional_info: Option<&str>,
) -> GenerationResult<CoverLetter> {
    let mut letter: CoverLetter = orchestrator
        .run_typed(&request(job_title, company_name, additional_info))
        .await?;
    letter.cover_letter = normalize_paragraphs(&letter.cover_letter);
    Ok(letter)
}

/// Trims each line and collapses runs of blank lines to one paragraph break.
fn normalize_paragraphs(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut blank_run = false;
    for line in text.trim().lines().map(str::trim) {
        if line.is_empty() {
            blank_run = true;
            continue;
        }
        if !out.is_empty() {
            out.push_str(if blank_run { "\n\n" } else { "\n" });
        }
        out.push_str(line);
        blank_run = false;
    }
    out
}
