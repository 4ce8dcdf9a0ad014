//! In-memory AI interview sessions.
//!
//! The voice assistant runs outside this service; it posts transcript turns
//! here and the candidate asks for feedback once the call ends. Each session
//! owns one `RequestController` for its feedback slot, so a second feedback
//! request while one is in flight is rejected and a cancelled one never lands.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinHandle;
use tracing::{debug, info};
use uuid::Uuid;

use crate::generation::template::{PromptFields, VOICE_ASSISTANT};
use crate::generation::{
    Delivery, GenerationResult, Orchestrator, RequestController, RequestState, RequestToken,
    Stage, TriggerError,
};
use crate::interview::feedback::{generate_feedback, InterviewFeedback, TranscriptTurn};
use crate::interview::questions::QaPair;

/// Turns kept per transcript. Further turns are rejected.
pub const MAX_TRANSCRIPT_TURNS: usize = 200;

pub struct InterviewSession {
    pub id: Uuid,
    pub name: String,
    pub position: String,
    pub questions: Vec<QaPair>,
    pub created_at: DateTime<Utc>,
    transcript: Mutex<Vec<TranscriptTurn>>,
    feedback: RequestController<InterviewFeedback>,
}

impl InterviewSession {
    pub fn new(name: String, position: String, questions: Vec<QaPair>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
            position,
            questions,
            created_at: Utc::now(),
            transcript: Mutex::new(Vec::new()),
            feedback: RequestController::new(),
        }
    }

    /// Appends a turn and returns the new length, or `None` once the
    /// transcript holds `MAX_TRANSCRIPT_TURNS` turns.
    pub async fn record_turn(&self, turn: TranscriptTurn) -> Option<usize> {
        let mut transcript = self.transcript.lock().await;
        if transcript.len() >= MAX_TRANSCRIPT_TURNS {
            return None;
        }
        transcript.push(turn);
        Some(transcript.len())
    }

    pub async fn transcript(&self) -> Vec<TranscriptTurn> {
        self.transcript.lock().await.clone()
    }

    pub fn feedback(&self) -> &RequestController<InterviewFeedback> {
        &self.feedback
    }

    /// Numbered question list handed to the voice assistant.
    pub fn formatted_questions(&self) -> String {
        self.questions
            .iter()
            .enumerate()
            .map(|(i, qa)| format!("{}. {}", i + 1, qa.question))
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn first_message(&self) -> String {
        format!(
            "Hi {}, how are you? Ready for your interview on {}?",
            self.name, self.position
        )
    }

    /// System prompt for the external voice assistant.
    pub fn assistant_prompt(&self, orchestrator: &Orchestrator) -> GenerationResult<String> {
        let mut fields = PromptFields::new();
        fields.insert("position".to_string(), self.position.clone());
        fields.insert("questions".to_string(), self.formatted_questions());
        orchestrator.render(VOICE_ASSISTANT, &fields)
    }

    pub async fn view(&self) -> SessionView {
        SessionView {
            id: self.id,
            name: self.name.clone(),
            position: self.position.clone(),
            questions: self.questions.clone(),
            created_at: self.created_at,
            transcript: self.transcript().await,
            feedback: FeedbackView::from(self.feedback.snapshot()),
        }
    }
}

/// Generates feedback for `session` in the background.
///
/// `retry` selects between a strict trigger (rejected unless the slot is
/// idle) and a retry (rejected only while pending).
pub fn start_feedback(
    orchestrator: Orchestrator,
    session: Arc<InterviewSession>,
    retry: bool,
) -> Result<(RequestToken, JoinHandle<Delivery>), TriggerError> {
    let token = if retry {
        session.feedback.retry()?
    } else {
        session.feedback.trigger()?
    };
    info!("Generating feedback for session {} (request {token})", session.id);

    let handle = tokio::spawn(async move {
        let turns = session.transcript().await;
        let delivery = session
            .feedback
            .run(token, generate_feedback(&orchestrator, &session.position, &turns))
            .await;
        if delivery == Delivery::Discarded {
            info!("Feedback request {token} for session {} was cancelled", session.id);
        }
        delivery
    });

    Ok((token, handle))
}

// ────────────────────────────────────────────────────────────────────────────
// Views
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FeedbackView {
    Idle,
    Pending {
        request_id: RequestToken,
        started_at: DateTime<Utc>,
    },
    Succeeded {
        feedback: InterviewFeedback,
    },
    Failed {
        stage: Stage,
        message: &'static str,
        detail: String,
    },
}

impl From<RequestState<InterviewFeedback>> for FeedbackView {
    fn from(state: RequestState<InterviewFeedback>) -> Self {
        match state {
            RequestState::Idle => FeedbackView::Idle,
            RequestState::Pending { token, started_at } => FeedbackView::Pending {
                request_id: token,
                started_at,
            },
            RequestState::Succeeded(feedback) => FeedbackView::Succeeded { feedback },
            RequestState::Failed(e) => FeedbackView::Failed {
                stage: e.stage(),
                message: e.user_message(),
                detail: e.to_string(),
            },
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SessionView {
    pub id: Uuid,
    pub name: String,
    pub position: String,
    pub questions: Vec<QaPair>,
    pub created_at: DateTime<Utc>,
    pub transcript: Vec<TranscriptTurn>,
    pub feedback: FeedbackView,
}

// ────────────────────────────────────────────────────────────────────────────
// Store
// ────────────────────────────────────────────────────────────────────────────

/// Sessions expire `ttl` after creation. Expired sessions are dropped on the
/// next insert, and the oldest live session is evicted once `capacity` is
/// reached.
#[derive(Clone)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<Uuid, Arc<InterviewSession>>>>,
    ttl: Duration,
    capacity: usize,
}

impl SessionStore {
    pub fn new(ttl: Duration, capacity: usize) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            ttl,
            capacity: capacity.max(1),
        }
    }

    fn is_live(&self, session: &InterviewSession, now: DateTime<Utc>) -> bool {
        now - session.created_at < self.ttl
    }

    pub async fn insert(&self, session: InterviewSession) -> Arc<InterviewSession> {
        let session = Arc::new(session);
        let now = Utc::now();
        let mut sessions = self.sessions.write().await;

        let before = sessions.len();
        sessions.retain(|_, s| self.is_live(s, now));
        let expired = before - sessions.len();
        if expired > 0 {
            debug!("Dropped {expired} expired interview sessions");
        }

        if sessions.len() >= self.capacity {
            let oldest = sessions
                .values()
                .min_by_key(|s| s.created_at)
                .map(|s| s.id);
            if let Some(id) = oldest {
                sessions.remove(&id);
                info!("Session store full ({} sessions), evicted {id}", self.capacity);
            }
        }

        sessions.insert(session.id, session.clone());
        session
    }

    pub async fn get(&self, id: Uuid) -> Option<Arc<InterviewSession>> {
        let now = Utc::now();
        self.sessions
            .read()
            .await
            .get(&id)
            .filter(|s| self.is_live(s, now))
            .cloned()
    }

    pub async fn remove(&self, id: Uuid) -> Option<Arc<InterviewSession>> {
        self.sessions.write().await.remove(&id)
    }
}

#[cfg(test)]
mod tests {
    use tokio::sync::Notify;

    use super::*;
    use crate::generation::template::TemplateRegistry;
    use crate::llm_client::scripted::{ScriptedProvider, Step};
    use crate::llm_client::{CompletionClient, CompletionOptions};

    const FEEDBACK: &str = r#"{"strengths": "Clear", "improvements": "Depth",
        "communicationClarityScore": 8, "relevanceScore": 7, "overallScore": 7,
        "detailedFeedback": "Solid."}"#;

    fn orchestrator(steps: Vec<Step>) -> Orchestrator {
        Orchestrator::new(
            CompletionClient::new(Arc::new(ScriptedProvider::new(steps))),
            Arc::new(TemplateRegistry::builtin()),
            CompletionOptions::new("test-model"),
        )
    }

    async fn session_with_turn() -> Arc<InterviewSession> {
        let session = Arc::new(InterviewSession::new(
            "Ada".to_string(),
            "Backend Engineer".to_string(),
            vec![QaPair {
                question: "What is ownership?".to_string(),
                answer: "Each value has one owner.".to_string(),
            }],
        ));
        session
            .record_turn(TranscriptTurn {
                question: "What is ownership?".to_string(),
                answer: Some("One owner per value".to_string()),
            })
            .await;
        session
    }

    #[tokio::test]
    async fn test_feedback_is_delivered_to_the_session() {
        let session = session_with_turn().await;
        let (_, handle) =
            start_feedback(orchestrator(vec![Step::reply(FEEDBACK)]), session.clone(), false).unwrap();

        assert_eq!(handle.await.unwrap(), Delivery::Delivered);
        match session.view().await.feedback {
            FeedbackView::Succeeded { feedback } => assert_eq!(feedback.overall_score, 7.0),
            other => panic!("expected succeeded, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_second_request_while_pending_is_rejected() {
        let gate = Arc::new(Notify::new());
        let orchestrator = orchestrator(vec![Step::gated(gate.clone(), FEEDBACK)]);
        let session = session_with_turn().await;

        let (_, handle) = start_feedback(orchestrator.clone(), session.clone(), false).unwrap();
        assert_eq!(
            start_feedback(orchestrator.clone(), session.clone(), true).unwrap_err(),
            TriggerError::AlreadyPending
        );

        gate.notify_one();
        assert_eq!(handle.await.unwrap(), Delivery::Delivered);
        assert_eq!(
            start_feedback(orchestrator, session, false).unwrap_err(),
            TriggerError::NotIdle
        );
    }

    #[tokio::test]
    async fn test_cancelled_feedback_is_discarded() {
        let gate = Arc::new(Notify::new());
        let session = session_with_turn().await;
        let (_, handle) = start_feedback(
            orchestrator(vec![Step::gated(gate.clone(), FEEDBACK)]),
            session.clone(),
            false,
        )
        .unwrap();

        assert!(session.feedback().cancel());
        gate.notify_one();

        assert_eq!(handle.await.unwrap(), Delivery::Discarded);
        assert!(matches!(session.view().await.feedback, FeedbackView::Idle));
    }

    #[tokio::test]
    async fn test_failed_feedback_view_carries_stage() {
        let session = session_with_turn().await;
        let (_, handle) = start_feedback(
            orchestrator(vec![Step::reply("I could not evaluate this.")]),
            session.clone(),
            false,
        )
        .unwrap();
        handle.await.unwrap();

        let view = serde_json::to_value(session.view().await).unwrap();
        assert_eq!(view["feedback"]["status"], "failed");
        assert_eq!(view["feedback"]["stage"], "extracting");
    }

    #[tokio::test]
    async fn test_assistant_prompt_lists_questions() {
        let session = session_with_turn().await;
        let prompt = session.assistant_prompt(&orchestrator(vec![])).unwrap();
        assert!(prompt.contains("Questions: 1. What is ownership?"));
        assert!(prompt.contains("Welcome to your Backend Engineer interview"));
        assert_eq!(
            session.first_message(),
            "Hi Ada, how are you? Ready for your interview on Backend Engineer?"
        );
    }

    fn blank_session() -> InterviewSession {
        InterviewSession::new("A".into(), "B".into(), vec![])
    }

    #[tokio::test]
    async fn test_store_round_trip() {
        let store = SessionStore::new(Duration::hours(1), 10);
        let session = store.insert(blank_session()).await;
        assert!(store.get(session.id).await.is_some());
        assert!(store.get(Uuid::new_v4()).await.is_none());

        assert!(store.remove(session.id).await.is_some());
        assert!(store.get(session.id).await.is_none());
    }

    #[tokio::test]
    async fn test_store_evicts_oldest_at_capacity() {
        let store = SessionStore::new(Duration::hours(1), 2);
        let first = store.insert(blank_session()).await;
        tokio::time::sleep(std::time::Duration::from_millis(2)).await;
        let second = store.insert(blank_session()).await;
        tokio::time::sleep(std::time::Duration::from_millis(2)).await;
        let third = store.insert(blank_session()).await;

        assert!(store.get(first.id).await.is_none());
        assert!(store.get(second.id).await.is_some());
        assert!(store.get(third.id).await.is_some());
    }

    #[tokio::test]
    async fn test_expired_sessions_are_unreachable_and_purged() {
        let store = SessionStore::new(Duration::zero(), 10);
        let stale = store.insert(blank_session()).await;
        assert!(store.get(stale.id).await.is_none());

        store.insert(blank_session()).await;
        assert!(!store.sessions.read().await.contains_key(&stale.id));
    }

    #[tokio::test]
    async fn test_transcript_is_capped() {
        let session = blank_session();
        for n in 1..=MAX_TRANSCRIPT_TURNS {
            let turn = TranscriptTurn {
                question: format!("Q{n}"),
                answer: None,
            };
            assert_eq!(session.record_turn(turn).await, Some(n));
        }
        let overflow = TranscriptTurn {
            question: "one more".to_string(),
            answer: None,
        };
        assert_eq!(session.record_turn(overflow).await, None);
        assert_eq!(session.transcript().await.len(), MAX_TRANSCRIPT_TURNS);
    }
}
