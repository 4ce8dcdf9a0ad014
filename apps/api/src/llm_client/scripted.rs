//! Scripted provider used by tests in place of a real completion API.
//!
//! Each call pops the next `Step`. An exhausted script answers with
//! `MalformedResponse` so a test that makes too many calls fails loudly.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Notify;

use super::{CompletionError, CompletionProvider};

pub enum Step {
    Now(Result<String, CompletionError>),
    Delayed(Duration, Result<String, CompletionError>),
    /// Waits until the gate is notified before answering.
    Gated(Arc<Notify>, Result<String, CompletionError>),
}

impl Step {
    pub fn reply(text: &str) -> Self {
        Step::Now(Ok(text.to_string()))
    }

    pub fn fail(error: CompletionError) -> Self {
        Step::Now(Err(error))
    }

    pub fn delayed(after: Duration, text: &str) -> Self {
        Step::Delayed(after, Ok(text.to_string()))
    }

    pub fn gated(gate: Arc<Notify>, text: &str) -> Self {
        Step::Gated(gate, Ok(text.to_string()))
    }
}

pub struct ScriptedProvider {
    steps: Mutex<VecDeque<Step>>,
    calls: AtomicUsize,
    seen: Mutex<Vec<(String, String)>>,
}

impl ScriptedProvider {
    pub fn new(steps: Vec<Step>) -> Self {
        Self {
            steps: Mutex::new(steps.into()),
            calls: AtomicUsize::new(0),
            seen: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn prompts(&self) -> Vec<String> {
        self.seen.lock().unwrap().iter().map(|(p, _)| p.clone()).collect()
    }

    pub fn models(&self) -> Vec<String> {
        self.seen.lock().unwrap().iter().map(|(_, m)| m.clone()).collect()
    }
}

#[async_trait]
impl CompletionProvider for ScriptedProvider {
    fn name(&self) -> &'static str {
        "scripted"
    }

    async fn complete(&self, prompt: &str, model: &str) -> Result<String, CompletionError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.seen
            .lock()
            .unwrap()
            .push((prompt.to_string(), model.to_string()));

        let step = self.steps.lock().unwrap().pop_front();
        match step {
            Some(Step::Now(result)) => result,
            Some(Step::Delayed(after, result)) => {
                tokio::time::sleep(after).await;
                result
            }
            Some(Step::Gated(gate, result)) => {
                gate.notified().await;
                result
            }
            None => Err(CompletionError::MalformedResponse(
                "script exhausted".to_string(),
            )),
        }
    }
}
