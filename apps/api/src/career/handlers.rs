//! Axum route handlers for the career tools.

use axum::{
    extract::{Multipart, State},
    Json,
};
use bytes::Bytes;
use serde::Deserialize;
use tracing::info;

use crate::career::company::{company_overview, CompanySection};
use crate::career::cover_letter::{write_cover_letter, CoverLetter};
use crate::career::resume::{analyze_resume, ResumeAnalysis};
use crate::career::roadmap::{generate_roadmap, CareerRoadmap};
use crate::errors::AppError;
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct AnalyzeResumeRequest {
    pub resume_text: String,
}

#[derive(Debug, Deserialize)]
pub struct RoadmapRequest {
    pub current_role: String,
    pub target_role: String,
    #[serde(default)]
    pub skills: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CoverLetterRequest {
    pub job_title: String,
    pub company_name: String,
    #[serde(default)]
    pub additional_info: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CompanyRequest {
    pub company: String,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/resume/analyze
pub async fn handle_analyze_resume(
    State(state): State<AppState>,
    Json(request): Json<AnalyzeResumeRequest>,
) -> Result<Json<ResumeAnalysis>, AppError> {
    let analysis = analyze_resume(&state.orchestrator, &request.resume_text).await?;
    Ok(Json(analysis))
}

/// POST /api/v1/resume/analyze/upload
///
/// Multipart form with a `file` part: PDF (text layer extracted) or plain text.
pub async fn handle_analyze_resume_upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<ResumeAnalysis>, AppError> {
    let mut upload: Option<(Option<String>, Bytes)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Invalid multipart body: {e}")))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let content_type = field.content_type().map(str::to_string);
        let data = field
            .bytes()
            .await
            .map_err(|e| AppError::Validation(format!("Failed to read upload: {e}")))?;
        upload = Some((content_type, data));
        break;
    }

    let (content_type, data) =
        upload.ok_or_else(|| AppError::Validation("Missing 'file' part".to_string()))?;
    let resume_text = extract_resume_text(content_type.as_deref(), data).await?;
    info!("Extracted {} chars of resume text from upload", resume_text.len());

    let analysis = analyze_resume(&state.orchestrator, &resume_text).await?;
    Ok(Json(analysis))
}

/// POST /api/v1/roadmap
pub async fn handle_roadmap(
    State(state): State<AppState>,
    Json(request): Json<RoadmapRequest>,
) -> Result<Json<CareerRoadmap>, AppError> {
    let roadmap = generate_roadmap(
        &state.orchestrator,
        &request.current_role,
        &request.target_role,
        request.skills.as_deref(),
    )
    .await?;
    Ok(Json(roadmap))
}

/// POST /api/v1/cover-letter
pub async fn handle_cover_letter(
    State(state): State<AppState>,
    Json(request): Json<CoverLetterRequest>,
) -> Result<Json<CoverLetter>, AppError> {
    let letter = write_cover_letter(
        &state.orchestrator,
        &request.job_title,
        &request.company_name,
        request.additional_info.as_deref(),
    )
    .await?;
    Ok(Json(letter))
}

/// POST /api/v1/company
pub async fn handle_company(
    State(state): State<AppState>,
    Json(request): Json<CompanyRequest>,
) -> Result<Json<Vec<CompanySection>>, AppError> {
    let sections = company_overview(&state.orchestrator, &request.company).await?;
    Ok(Json(sections))
}

/// `text/plain; charset=utf-8` -> `text/plain`
fn media_type(content_type: &str) -> String {
    content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase()
}

async fn extract_resume_text(content_type: Option<&str>, data: Bytes) -> Result<String, AppError> {
    let media_type = content_type.map(media_type);
    let is_pdf = media_type.as_deref() == Some("application/pdf") || data.starts_with(b"%PDF");

    let text = if is_pdf {
        // PDF parsing is CPU-bound, keep it off the async executor.
        tokio::task::spawn_blocking(move || pdf_extract::extract_text_from_mem(&data))
            .await
            .map_err(|e| {
                AppError::Internal(anyhow::anyhow!("spawn_blocking failed in PDF extraction: {e}"))
            })?
            .map_err(|e| AppError::Validation(format!("Failed to extract text from PDF: {e}")))?
    } else {
        match media_type.as_deref() {
            None | Some("text/plain") => String::from_utf8(data.to_vec())
                .map_err(|_| AppError::Validation("Uploaded text is not valid UTF-8".to_string()))?,
            Some(_) => {
                return Err(AppError::Validation(format!(
                    "Unsupported file format '{}'. Please upload PDF or TXT files.",
                    content_type.unwrap_or_default()
                )))
            }
        }
    };

    if text.trim().is_empty() {
        return Err(AppError::Validation(
            "No readable text found in the uploaded file".to_string(),
        ));
    }
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_plain_text_upload() {
        let text = extract_resume_text(Some("text/plain"), Bytes::from_static(b"Jane Doe\nRust"))
            .await
            .unwrap();
        assert_eq!(text, "Jane Doe\nRust");
    }

    #[tokio::test]
    async fn test_plain_text_with_charset_parameter() {
        let text = extract_resume_text(
            Some("Text/Plain; charset=utf-8"),
            Bytes::from_static(b"Jane Doe"),
        )
        .await
        .unwrap();
        assert_eq!(text, "Jane Doe");
    }

    #[tokio::test]
    async fn test_unknown_content_type_is_rejected() {
        let err = extract_resume_text(Some("image/png"), Bytes::from_static(b"\x89PNG"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(msg) if msg.contains("Unsupported")));
    }

    #[tokio::test]
    async fn test_blank_text_is_rejected() {
        assert!(extract_resume_text(None, Bytes::from_static(b"  \n ")).await.is_err());
    }

    #[tokio::test]
    async fn test_malformed_pdf_is_rejected() {
        let result = extract_resume_text(
            Some("application/pdf; name=resume.pdf"),
            Bytes::from_static(b"%PDF-1.4\nnot really a pdf"),
        )
        .await;
        assert!(result.is_err());
    }

    #[test]
    fn test_media_type_strips_parameters() {
        assert_eq!(media_type("application/PDF ; x=1"), "application/pdf");
        assert_eq!(media_type("text/plain"), "text/plain");
    }
}
