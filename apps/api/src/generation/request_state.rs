/// Request State Machine: the per-slot lifecycle of one user-triggered generation.
///
/// Idle -> Pending -> (Succeeded | Failed), and back to Idle on reset, retry
/// or cancel. Every trigger mints a fresh `RequestToken`; a result is only
/// delivered if its token still matches the pending one, so a result that
/// arrives after a cancel (or after a retry replaced the request) is dropped.
///
/// State lives in a `tokio::sync::watch` channel. All transitions go through
/// `send_if_modified`, which makes each check-and-set atomic and wakes
/// subscribers only when something actually changed.
use std::fmt;
use std::future::Future;

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;
use tokio::sync::watch;
use tracing::debug;
use uuid::Uuid;

use crate::generation::orchestrator::{GenerationError, GenerationResult};

/// Identity of one triggered request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct RequestToken(Uuid);

impl RequestToken {
    fn mint() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for RequestToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RequestState<T> {
    Idle,
    Pending {
        token: RequestToken,
        started_at: DateTime<Utc>,
    },
    Succeeded(T),
    Failed(GenerationError),
}

impl<T> RequestState<T> {
    pub fn status(&self) -> &'static str {
        match self {
            RequestState::Idle => "idle",
            RequestState::Pending { .. } => "pending",
            RequestState::Succeeded(_) => "succeeded",
            RequestState::Failed(_) => "failed",
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, RequestState::Pending { .. })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TriggerError {
    #[error("a request is already pending for this slot")]
    AlreadyPending,

    #[error("the previous result must be reset before triggering again")]
    NotIdle,
}

/// What `resolve` did with a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    Delivered,
    /// The token no longer matches the pending request.
    Discarded,
}

pub struct RequestController<T> {
    state: watch::Sender<RequestState<T>>,
}

impl<T> Default for RequestController<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> RequestController<T> {
    pub fn new() -> Self {
        let (state, _) = watch::channel(RequestState::Idle);
        Self { state }
    }

    /// Idle -> Pending. Rejected while a request is in flight or a result is
    /// still displayed.
    pub fn trigger(&self) -> Result<RequestToken, TriggerError> {
        let token = RequestToken::mint();
        let mut outcome = Ok(token);
        self.state.send_if_modified(|state| match state {
            RequestState::Idle => {
                *state = RequestState::Pending {
                    token,
                    started_at: Utc::now(),
                };
                true
            }
            RequestState::Pending { .. } => {
                outcome = Err(TriggerError::AlreadyPending);
                false
            }
            RequestState::Succeeded(_) | RequestState::Failed(_) => {
                outcome = Err(TriggerError::NotIdle);
                false
            }
        });
        if outcome.is_ok() {
            debug!("Request {token} pending");
        }
        outcome
    }

    /// Settles the pending request if `token` is still the current one.
    pub fn resolve(&self, token: RequestToken, result: GenerationResult<T>) -> Delivery {
        let mut settled_as = "discarded";
        let delivered = self.state.send_if_modified(|state| match state {
            RequestState::Pending { token: current, .. } if *current == token => {
                *state = match result {
                    Ok(value) => RequestState::Succeeded(value),
                    Err(e) => RequestState::Failed(e),
                };
                settled_as = state.status();
                true
            }
            _ => false,
        });

        if delivered {
            debug!("Request {token} {settled_as}");
            Delivery::Delivered
        } else {
            debug!("Discarding late result for request {token}");
            Delivery::Discarded
        }
    }

    /// Pending -> Idle. Returns false if nothing was pending.
    pub fn cancel(&self) -> bool {
        self.state.send_if_modified(|state| {
            if state.is_pending() {
                *state = RequestState::Idle;
                true
            } else {
                false
            }
        })
    }

    /// Any state -> Idle. A pending request's eventual result is discarded.
    pub fn reset(&self) {
        self.state.send_if_modified(|state| {
            if matches!(state, RequestState::Idle) {
                false
            } else {
                *state = RequestState::Idle;
                true
            }
        });
    }

    /// Reset then trigger, as one step. Only rejected while pending.
    pub fn retry(&self) -> Result<RequestToken, TriggerError> {
        let token = RequestToken::mint();
        let mut outcome = Ok(token);
        self.state.send_if_modified(|state| {
            if state.is_pending() {
                outcome = Err(TriggerError::AlreadyPending);
                false
            } else {
                *state = RequestState::Pending {
                    token,
                    started_at: Utc::now(),
                };
                true
            }
        });
        outcome
    }

    pub fn subscribe(&self) -> watch::Receiver<RequestState<T>> {
        self.state.subscribe()
    }

    /// Awaits `work` for a triggered request and resolves `token` with its output.
    pub async fn run<F>(&self, token: RequestToken, work: F) -> Delivery
    where
        F: Future<Output = GenerationResult<T>>,
    {
        let result = work.await;
        self.resolve(token, result)
    }
}

impl<T: Clone> RequestController<T> {
    pub fn snapshot(&self) -> RequestState<T> {
        self.state.borrow().clone()
    }

    /// Waits until the slot is not pending and returns that state.
    pub async fn settled(&self) -> RequestState<T> {
        let mut rx = self.subscribe();
        loop {
            let pending = rx.borrow_and_update().is_pending();
            if !pending || rx.changed().await.is_err() {
                break;
            }
        }
        let state = rx.borrow().clone();
        state
    }
}
