//! Structured Generation Orchestrator: one call from prompt fields to validated JSON.
//!
//! Flow: render template → complete → extract JSON → validate schema.
//!
//! Each stage short-circuits into a `GenerationError` tagged with the stage
//! that failed. Exactly one `CompletionClient::complete` call is made per run;
//! any retrying happens inside the client. The orchestrator holds no mutable
//! state and is cheap to clone, so concurrent runs need no coordination.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::generation::extract::{extract_value, ExtractionError};
use crate::generation::schema::{validate, ResponseSchema, ValidationError};
use crate::generation::template::{PromptError, PromptFields, TemplateRegistry};
use crate::llm_client::{CompletionClient, CompletionError, CompletionOptions};

/// Pipeline stage that produced a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Rendering,
    Requesting,
    Extracting,
    Validating,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenerationError {
    #[error("prompt rendering failed: {0}")]
    Prompt(#[from] PromptError),

    #[error("completion failed: {0}")]
    Completion(#[from] CompletionError),

    #[error("JSON extraction failed: {0}")]
    Extraction(#[from] ExtractionError),

    #[error("response validation failed: {0}")]
    Validation(#[from] ValidationError),
}

impl GenerationError {
    pub fn stage(&self) -> Stage {
        match self {
            GenerationError::Prompt(_) => Stage::Rendering,
            GenerationError::Completion(_) => Stage::Requesting,
            GenerationError::Extraction(_) => Stage::Extracting,
            GenerationError::Validation(_) => Stage::Validating,
        }
    }

    /// Stage-specific guidance suitable for showing to an end user.
    pub fn user_message(&self) -> &'static str {
        match self {
            GenerationError::Prompt(PromptError::MissingField(_)) => {
                "Please fill in all required fields before generating."
            }
            GenerationError::Prompt(PromptError::UnknownTemplate(_)) => {
                "This feature is not configured correctly."
            }
            GenerationError::Completion(CompletionError::Unauthorized(_)) => {
                "The AI service rejected our credentials. Please contact support."
            }
            GenerationError::Completion(CompletionError::RateLimited(_)) => {
                "The AI service is busy right now. Please try again in a minute."
            }
            GenerationError::Completion(CompletionError::Timeout { .. }) => {
                "The request to the AI service timed out. Please try again."
            }
            GenerationError::Completion(_) => {
                "The AI service could not be reached. Please try again."
            }
            GenerationError::Extraction(_) => {
                "The AI's answer was not understandable JSON. Generating again usually helps."
            }
            GenerationError::Validation(_) => {
                "The AI's answer was missing expected information. Generating again usually helps."
            }
        }
    }
}

pub type GenerationResult<T = Value> = Result<T, GenerationError>;

/// A template id, its field values, and the shape the answer must have.
/// Built once and only read afterwards.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    template_id: String,
    fields: PromptFields,
    schema: ResponseSchema,
}

impl GenerationRequest {
    pub fn new(template_id: impl Into<String>, schema: ResponseSchema) -> Self {
        Self {
            template_id: template_id.into(),
            fields: BTreeMap::new(),
            schema,
        }
    }

    pub fn field(mut self, name: &str, value: impl Into<String>) -> Self {
        self.fields.insert(name.to_string(), value.into());
        self
    }

    pub fn template_id(&self) -> &str {
        &self.template_id
    }

    pub fn fields(&self) -> &PromptFields {
        &self.fields
    }

    pub fn schema(&self) -> &ResponseSchema {
        &self.schema
    }
}

#[derive(Clone)]
pub struct Orchestrator {
    client: CompletionClient,
    templates: Arc<TemplateRegistry>,
    options: CompletionOptions,
}

impl Orchestrator {
    pub fn new(
        client: CompletionClient,
        templates: Arc<TemplateRegistry>,
        options: CompletionOptions,
    ) -> Self {
        Self {
            client,
            templates,
            options,
        }
    }

    pub fn provider_name(&self) -> &'static str {
        self.client.provider_name()
    }

    /// Runs the full pipeline and returns the validated JSON value.
    pub async fn run(&self, request: &GenerationRequest) -> GenerationResult {
        let outcome = self.execute(request).await;
        match &outcome {
            Ok(_) => info!("Structured generation '{}' succeeded", request.template_id()),
            Err(GenerationError::Validation(e)) => warn!(
                "Structured generation '{}' failed validation at {}: {e}",
                request.template_id(),
                e.path()
            ),
            Err(e) => warn!(
                "Structured generation '{}' failed at {:?}: {e}",
                request.template_id(),
                e.stage()
            ),
        }
        outcome
    }

    /// Runs the pipeline, then decodes the validated value into `T`.
    pub async fn run_typed<T: DeserializeOwned>(
        &self,
        request: &GenerationRequest,
    ) -> GenerationResult<T> {
        let value = self.run(request).await?;
        serde_json::from_value(value).map_err(|e| {
            GenerationError::Validation(ValidationError::Decode {
                message: e.to_string(),
            })
        })
    }

    /// Renders a template and returns the provider's free text, skipping
    /// extraction and validation. Used for conversational features.
    pub async fn complete_text(
        &self,
        template_id: &str,
        fields: &PromptFields,
    ) -> GenerationResult<String> {
        let prompt = self.templates.render(template_id, fields)?;
        let text = self.client.complete(&prompt, &self.options).await?;
        Ok(text.trim().to_string())
    }

    /// Renders a template without calling the provider.
    pub fn render(&self, template_id: &str, fields: &PromptFields) -> GenerationResult<String> {
        Ok(self.templates.render(template_id, fields)?)
    }

    async fn execute(&self, request: &GenerationRequest) -> GenerationResult {
        debug!("[{}] rendering prompt", request.template_id());
        let prompt = self.templates.render(request.template_id(), request.fields())?;

        debug!(
            "[{}] requesting completion ({} chars, model {})",
            request.template_id(),
            prompt.len(),
            self.options.model
        );
        let raw = self.client.complete(&prompt, &self.options).await?;

        debug!("[{}] extracting JSON", request.template_id());
        let value = extract_value(&raw)?;

        debug!("[{}] validating response", request.template_id());
        Ok(validate(value, request.schema())?)
    }
}
