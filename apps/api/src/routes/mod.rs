pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::career::handlers as career;
use crate::interview::handlers as interview;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Career tools
        .route("/api/v1/resume/analyze", post(career::handle_analyze_resume))
        .route(
            "/api/v1/resume/analyze/upload",
            post(career::handle_analyze_resume_upload),
        )
        .route("/api/v1/roadmap", post(career::handle_roadmap))
        .route("/api/v1/cover-letter", post(career::handle_cover_letter))
        .route("/api/v1/company", post(career::handle_company))
        // Interview prep
        .route("/api/v1/interview/qa", post(interview::handle_topic_qa))
        .route(
            "/api/v1/interview/questions",
            post(interview::handle_profile_questions),
        )
        .route("/api/v1/chat", post(interview::handle_chat))
        // Voice interview sessions
        .route(
            "/api/v1/interview/sessions",
            post(interview::handle_create_session),
        )
        .route(
            "/api/v1/interview/sessions/:id",
            get(interview::handle_get_session).delete(interview::handle_delete_session),
        )
        .route(
            "/api/v1/interview/sessions/:id/transcript",
            post(interview::handle_append_transcript),
        )
        .route(
            "/api/v1/interview/sessions/:id/feedback",
            get(interview::handle_get_feedback)
                .post(interview::handle_request_feedback)
                .delete(interview::handle_cancel_feedback),
        )
        .route(
            "/api/v1/interview/sessions/:id/feedback/retry",
            post(interview::handle_retry_feedback),
        )
        .route(
            "/api/v1/interview/sessions/:id/feedback/reset",
            post(interview::handle_reset_feedback),
        )
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use axum::{
        body::Body,
        http::{Request, StatusCode},
        response::Response,
    };
    use serde_json::{json, Value};
    use tokio::sync::Notify;
    use tower::ServiceExt;

    use super::*;
    use crate::config::{Config, ProviderKind};
    use crate::generation::template::TemplateRegistry;
    use crate::generation::Orchestrator;
    use crate::interview::session::SessionStore;
    use crate::llm_client::scripted::{ScriptedProvider, Step};
    use crate::llm_client::CompletionClient;

    const FEEDBACK: &str = r#"{"strengths": "Clear", "improvements": "Depth",
        "communicationClarityScore": 8, "relevanceScore": 11, "overallScore": 7,
        "detailedFeedback": "Solid."}"#;

    fn app(steps: Vec<Step>) -> Router {
        let config = Config {
            provider: ProviderKind::Gemini,
            api_key: "test-key".to_string(),
            model: "test-model".to_string(),
            timeout_ms: 1_000,
            max_retries: 0,
            backoff_base_ms: 10,
            port: 0,
            rust_log: "debug".to_string(),
            session_ttl_secs: 3_600,
            max_sessions: 100,
        };
        let orchestrator = Orchestrator::new(
            CompletionClient::new(Arc::new(ScriptedProvider::new(steps))),
            Arc::new(TemplateRegistry::builtin()),
            config.completion_options(),
        );
        build_router(AppState {
            orchestrator,
            sessions: SessionStore::new(config.session_ttl(), config.max_sessions),
            config,
        })
    }

    async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> Response {
        let request = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => request
                .header("content-type", "application/json")
                .body(Body::from(body.to_string())),
            None => request.body(Body::empty()),
        }
        .unwrap();
        app.clone().oneshot(request).await.unwrap()
    }

    async fn json_body(response: Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    async fn create_session(app: &Router) -> String {
        let response = send(
            app,
            "POST",
            "/api/v1/interview/sessions",
            Some(json!({
                "name": "Ada",
                "position": "Backend Engineer",
                "questions": [{"question": "What is ownership?", "answer": "One owner."}]
            })),
        )
        .await;
        assert_eq!(response.status(), StatusCode::CREATED);
        let body = json_body(response).await;
        assert!(body["assistant_prompt"]
            .as_str()
            .unwrap()
            .contains("1. What is ownership?"));
        let id = body["session_id"].as_str().unwrap().to_string();

        let response = send(
            app,
            "POST",
            &format!("/api/v1/interview/sessions/{id}/transcript"),
            Some(json!({"question": "What is ownership?", "answer": "Each value has one owner."})),
        )
        .await;
        assert_eq!(json_body(response).await["turns"], 1);
        id
    }

    async fn wait_for_status(app: &Router, id: &str, status: &str) -> Value {
        for _ in 0..100 {
            let response = send(app, "GET", &format!("/api/v1/interview/sessions/{id}"), None).await;
            let body = json_body(response).await;
            if body["feedback"]["status"] == status {
                return body;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        panic!("session {id} never reached feedback status {status}");
    }

    #[tokio::test]
    async fn test_health_reports_provider_and_model() {
        let app = app(vec![]);
        let body = json_body(send(&app, "GET", "/health", None).await).await;
        assert_eq!(body["status"], "ok");
        assert_eq!(body["provider"], "scripted");
        assert_eq!(body["model"], "test-model");
    }

    #[tokio::test]
    async fn test_roadmap_endpoint_returns_validated_steps() {
        let app = app(vec![Step::reply(
            r#"Sure! {"careerPath":[{"step":1,"title":"Learn Python","description":"...","duration":"3 months"}]} Hope that helps!"#,
        )]);

        let response = send(
            &app,
            "POST",
            "/api/v1/roadmap",
            Some(json!({"current_role": "QA Tester", "target_role": "SDET", "skills": "Selenium"})),
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["careerPath"][0]["title"], "Learn Python");
    }

    #[tokio::test]
    async fn test_prose_answer_is_unprocessable_with_stage() {
        let app = app(vec![Step::reply("Acme is a great company to work for.")]);

        let response = send(&app, "POST", "/api/v1/company", Some(json!({"company": "Acme"}))).await;

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let body = json_body(response).await;
        assert_eq!(body["error"]["code"], "UNUSABLE_RESPONSE");
        assert_eq!(body["error"]["stage"], "extracting");
    }

    #[tokio::test]
    async fn test_blank_required_field_is_bad_request() {
        let app = app(vec![]);
        let response = send(
            &app,
            "POST",
            "/api/v1/cover-letter",
            Some(json!({"job_title": "  ", "company_name": "Acme"})),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(response).await["error"]["code"], "PROMPT_ERROR");
    }

    #[tokio::test]
    async fn test_question_count_out_of_range() {
        let app = app(vec![]);
        let response = send(
            &app,
            "POST",
            "/api/v1/interview/qa",
            Some(json!({"topic": "Rust", "num_questions": 51})),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(response).await["error"]["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_profile_questions() {
        let app = app(vec![Step::reply(
            r#"[{"question": "Describe a conflict.", "answer": "Use STAR."}]"#,
        )]);
        let response = send(
            &app,
            "POST",
            "/api/v1/interview/questions",
            Some(json!({
                "name": "Ada", "position": "SRE", "skills": "Linux",
                "experience": "2", "interview_types": ["behavioral", "technical"]
            })),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await[0]["answer"], "Use STAR.");
    }

    #[tokio::test]
    async fn test_chat_returns_free_text() {
        let app = app(vec![Step::reply("Practice out loud.")]);
        let response = send(&app, "POST", "/api/v1/chat", Some(json!({"question": "Tips?"}))).await;
        assert_eq!(json_body(response).await["answer"], "Practice out loud.");
    }

    #[tokio::test]
    async fn test_feedback_lifecycle() {
        let app = app(vec![Step::reply(FEEDBACK)]);
        let id = create_session(&app).await;
        let feedback_uri = format!("/api/v1/interview/sessions/{id}/feedback");

        let response = send(&app, "POST", &feedback_uri, None).await;
        assert_eq!(response.status(), StatusCode::ACCEPTED);

        let body = wait_for_status(&app, &id, "succeeded").await;
        assert_eq!(body["feedback"]["feedback"]["relevanceScore"], 10.0);
        assert_eq!(body["transcript"][0]["answer"], "Each value has one owner.");

        // a held result must be reset before a plain trigger
        let response = send(&app, "POST", &feedback_uri, None).await;
        assert_eq!(response.status(), StatusCode::CONFLICT);
        assert_eq!(json_body(response).await["error"]["code"], "NOT_IDLE");

        let response = send(&app, "POST", &format!("{feedback_uri}/reset"), None).await;
        assert_eq!(json_body(response).await["status"], "idle");
    }

    #[tokio::test]
    async fn test_duplicate_feedback_request_conflicts_and_cancel_discards() {
        let gate = Arc::new(Notify::new());
        let app = app(vec![Step::gated(gate.clone(), FEEDBACK)]);
        let id = create_session(&app).await;
        let feedback_uri = format!("/api/v1/interview/sessions/{id}/feedback");

        assert_eq!(
            send(&app, "POST", &feedback_uri, None).await.status(),
            StatusCode::ACCEPTED
        );
        let response = send(&app, "POST", &feedback_uri, None).await;
        assert_eq!(response.status(), StatusCode::CONFLICT);
        assert_eq!(json_body(response).await["error"]["code"], "ALREADY_PENDING");

        let response = send(&app, "DELETE", &feedback_uri, None).await;
        assert_eq!(json_body(response).await["cancelled"], true);

        gate.notify_one();
        tokio::time::sleep(Duration::from_millis(20)).await;
        wait_for_status(&app, &id, "idle").await;
    }

    #[tokio::test]
    async fn test_retry_after_failure() {
        let app = app(vec![Step::reply("no json here"), Step::reply(FEEDBACK)]);
        let id = create_session(&app).await;
        let feedback_uri = format!("/api/v1/interview/sessions/{id}/feedback");

        send(&app, "POST", &feedback_uri, None).await;
        let body = wait_for_status(&app, &id, "failed").await;
        assert_eq!(body["feedback"]["stage"], "extracting");

        let response = send(&app, "POST", &format!("{feedback_uri}/retry"), None).await;
        assert_eq!(response.status(), StatusCode::ACCEPTED);
        wait_for_status(&app, &id, "succeeded").await;
    }

    #[tokio::test]
    async fn test_feedback_long_poll_waits_for_result() {
        let app = app(vec![Step::delayed(Duration::from_millis(50), FEEDBACK)]);
        let id = create_session(&app).await;
        let feedback_uri = format!("/api/v1/interview/sessions/{id}/feedback");

        send(&app, "POST", &feedback_uri, None).await;
        let immediate = json_body(send(&app, "GET", &feedback_uri, None).await).await;
        assert_eq!(immediate["status"], "pending");

        let response = send(&app, "GET", &format!("{feedback_uri}?wait_ms=5000"), None).await;
        let body = json_body(response).await;
        assert_eq!(body["status"], "succeeded");
        assert_eq!(body["feedback"]["overallScore"], 7.0);
    }

    #[tokio::test]
    async fn test_deleted_session_is_gone() {
        let app = app(vec![]);
        let id = create_session(&app).await;
        let uri = format!("/api/v1/interview/sessions/{id}");

        assert_eq!(
            send(&app, "DELETE", &uri, None).await.status(),
            StatusCode::NO_CONTENT
        );
        assert_eq!(send(&app, "GET", &uri, None).await.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            send(&app, "DELETE", &uri, None).await.status(),
            StatusCode::NOT_FOUND
        );
    }

    #[tokio::test]
    async fn test_unknown_session_is_not_found() {
        let app = app(vec![]);
        let response = send(
            &app,
            "GET",
            "/api/v1/interview/sessions/00000000-0000-0000-0000-000000000000",
            None,
        )
        .await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
