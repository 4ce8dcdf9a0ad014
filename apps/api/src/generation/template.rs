//! Prompt Template Builder: named templates with declared fields.
//!
//! Rendering is pure: it checks every required field is present and
//! non-blank, then substitutes `{field}` placeholders in a single pass.
//! Substituted values are never re-scanned, so user text containing
//! `{otherField}` is inserted verbatim.

use std::collections::{BTreeMap, HashMap};

use thiserror::Error;

use crate::generation::prompts::{
    CAREER_ROADMAP_PROMPT, CHAT_PROMPT_TEMPLATE, COMPANY_OVERVIEW_PROMPT, COVER_LETTER_PROMPT,
    INTERVIEW_FEEDBACK_PROMPT, INTERVIEW_QA_PROMPT, INTERVIEW_QUESTIONS_PROMPT,
    RESUME_ANALYSIS_PROMPT, VOICE_ASSISTANT_PROMPT_TEMPLATE,
};

pub const RESUME_ANALYSIS: &str = "resume-analysis";
pub const CAREER_ROADMAP: &str = "career-roadmap";
pub const COVER_LETTER: &str = "cover-letter";
pub const COMPANY_OVERVIEW: &str = "company-overview";
pub const INTERVIEW_QA: &str = "interview-qa";
pub const INTERVIEW_QUESTIONS: &str = "interview-questions";
pub const INTERVIEW_FEEDBACK: &str = "interview-feedback";
pub const CHAT: &str = "chat";
pub const VOICE_ASSISTANT: &str = "voice-assistant";

/// Substituted for optional fields that are absent or blank.
const OPTIONAL_PLACEHOLDER: &str = "N/A";

/// Field values keyed by placeholder name.
pub type PromptFields = BTreeMap<String, String>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PromptError {
    #[error("required prompt field `{0}` is missing or blank")]
    MissingField(String),

    #[error("unknown prompt template `{0}`")]
    UnknownTemplate(String),
}

#[derive(Debug, Clone)]
pub struct PromptTemplate {
    pub id: &'static str,
    /// Checked in this order; the first missing one is reported.
    pub required: &'static [&'static str],
    pub optional: &'static [&'static str],
    pub body: &'static str,
}

impl PromptTemplate {
    pub fn render(&self, fields: &PromptFields) -> Result<String, PromptError> {
        for &name in self.required {
            match fields.get(name) {
                Some(value) if !value.trim().is_empty() => {}
                _ => return Err(PromptError::MissingField(name.to_string())),
            }
        }

        Ok(fill_placeholders(self.body, |name| {
            if self.required.iter().any(|r| *r == name) {
                fields.get(name).map(String::as_str)
            } else if self.optional.iter().any(|o| *o == name) {
                Some(
                    fields
                        .get(name)
                        .map(String::as_str)
                        .filter(|v| !v.trim().is_empty())
                        .unwrap_or(OPTIONAL_PLACEHOLDER),
                )
            } else {
                None
            }
        }))
    }
}

/// Single-pass `{name}` substitution. Braces whose content `lookup` does not
/// recognise are copied through.
fn fill_placeholders<'a>(body: &str, lookup: impl Fn(&str) -> Option<&'a str>) -> String {
    let mut out = String::with_capacity(body.len());
    let mut rest = body;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let hit = after
            .find('}')
            .and_then(|close| lookup(&after[..close]).map(|value| (close, value)));
        match hit {
            Some((close, value)) => {
                out.push_str(value);
                rest = &after[close + 1..];
            }
            None => {
                out.push('{');
                rest = after;
            }
        }
    }

    out.push_str(rest);
    out
}

/// Templates addressable by id.
#[derive(Debug, Clone, Default)]
pub struct TemplateRegistry {
    templates: HashMap<&'static str, PromptTemplate>,
}

impl TemplateRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every template the feature screens use.
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        registry.register(PromptTemplate {
            id: RESUME_ANALYSIS,
            required: &["resumeText"],
            optional: &[],
            body: RESUME_ANALYSIS_PROMPT,
        });
        registry.register(PromptTemplate {
            id: CAREER_ROADMAP,
            required: &["currentRole", "targetRole"],
            optional: &["skills"],
            body: CAREER_ROADMAP_PROMPT,
        });
        registry.register(PromptTemplate {
            id: COVER_LETTER,
            required: &["jobTitle", "companyName"],
            optional: &["additionalInfo"],
            body: COVER_LETTER_PROMPT,
        });
        registry.register(PromptTemplate {
            id: COMPANY_OVERVIEW,
            required: &["company"],
            optional: &[],
            body: COMPANY_OVERVIEW_PROMPT,
        });
        registry.register(PromptTemplate {
            id: INTERVIEW_QA,
            required: &["topic", "numQuestions"],
            optional: &[],
            body: INTERVIEW_QA_PROMPT,
        });
        registry.register(PromptTemplate {
            id: INTERVIEW_QUESTIONS,
            required: &["name", "position", "skills", "experience", "interviewTypes"],
            optional: &[],
            body: INTERVIEW_QUESTIONS_PROMPT,
        });
        registry.register(PromptTemplate {
            id: INTERVIEW_FEEDBACK,
            required: &["position", "transcript"],
            optional: &[],
            body: INTERVIEW_FEEDBACK_PROMPT,
        });
        registry.register(PromptTemplate {
            id: CHAT,
            required: &["question"],
            optional: &[],
            body: CHAT_PROMPT_TEMPLATE,
        });
        registry.register(PromptTemplate {
            id: VOICE_ASSISTANT,
            required: &["position", "questions"],
            optional: &[],
            body: VOICE_ASSISTANT_PROMPT_TEMPLATE,
        });
        registry
    }

    /// Replaces any template already registered under the same id.
    pub fn register(&mut self, template: PromptTemplate) {
        self.templates.insert(template.id, template);
    }

    pub fn get(&self, id: &str) -> Result<&PromptTemplate, PromptError> {
        self.templates
            .get(id)
            .ok_or_else(|| PromptError::UnknownTemplate(id.to_string()))
    }

    pub fn render(&self, id: &str, fields: &PromptFields) -> Result<String, PromptError> {
        self.get(id)?.render(fields)
    }
}
