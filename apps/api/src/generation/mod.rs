// Structured generation engine.
// Implements: JSON extraction, schema validation, prompt templates, the
// render/complete/extract/validate pipeline, and per-slot request state.
// All provider calls go through llm_client; nothing here talks HTTP.

pub mod extract;
pub mod orchestrator;
pub mod prompts;
pub mod request_state;
pub mod schema;
pub mod template;

pub use orchestrator::{GenerationError, GenerationRequest, GenerationResult, Orchestrator, Stage};
pub use request_state::{Delivery, RequestController, RequestState, RequestToken, TriggerError};
pub use schema::{FieldType, ObjectSchema, ResponseSchema};
