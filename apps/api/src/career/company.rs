//! Company Overview: research tabs (overview, culture, news, financials, ...).

use serde::{Deserialize, Serialize};

use crate::generation::template::COMPANY_OVERVIEW;
use crate::generation::{
    FieldType, GenerationRequest, GenerationResult, ObjectSchema, Orchestrator, ResponseSchema,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompanySection {
    pub section: String,
    pub content: String,
}

pub fn schema() -> ResponseSchema {
    ResponseSchema::array_of(
        ObjectSchema::new()
            .required("section", FieldType::String)
            .required("content", FieldType::String),
    )
    .with_min_items(1)
}

pub fn request(company: &str) -> GenerationRequest {
    GenerationRequest::new(COMPANY_OVERVIEW, schema()).field("company", company)
}

pub async fn company_overview(
    orchestrator: &Orchestrator,
    company: &str,
) -> GenerationResult<Vec<CompanySection>> {
    orchestrator.run_typed(&request(company)).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generation::schema::validate;
    use serde_json::json;

    #[test]
    fn test_sections_validate() {
        let value = json!([
            {"section": "Overview", "content": "Search and ads."},
            {"section": "Competitors", "content": "Microsoft, Apple."}
        ]);
        let sections: Vec<CompanySection> =
            serde_json::from_value(validate(value, &schema()).unwrap()).unwrap();
        assert_eq!(sections[1].section, "Competitors");
    }

    #[test]
    fn test_numeric_content_is_rejected() {
        let value = json!([{"section": "Financials", "content": 1_000_000}]);
        assert!(validate(value, &schema()).is_err());
    }
}
