//! JSON extraction. Locates the JSON payload embedded in a free-text model response.
//!
//! Models wrap their JSON in greetings, markdown fences and closing remarks,
//! and those remarks can contain brace characters of their own. Slicing from
//! the first `{` to the last `}` breaks on exactly that, so the scanner here
//! tracks bracket depth per candidate span and ignores brackets inside string
//! literals.
//!
//! Candidates are tried in order of their opening bracket. A balanced span
//! that is not valid JSON (e.g. `[see below]` in the prose) is skipped and
//! scanning resumes at the next opening bracket. A span that never closes
//! ends the scan: the response was cut off.

use serde::de::IgnoredAny;
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExtractionError {
    #[error("no JSON object or array found in the response")]
    NoJsonFound,

    #[error("JSON value opened at byte {offset} never closes")]
    UnbalancedSpan { offset: usize },

    #[error("span at byte {offset} is not valid JSON: {message}")]
    InvalidJson { offset: usize, message: String },
}

enum Scan<'a> {
    Balanced(&'a str),
    Unbalanced,
    Mismatched { at: usize },
}

/// Scans from the opening bracket at `start` to its matching closer.
///
/// All delimiters are ASCII, so scanning bytes is safe on UTF-8 input: no
/// multi-byte sequence contains an ASCII byte.
fn scan_span(text: &str, start: usize) -> Scan<'_> {
    let bytes = text.as_bytes();
    let mut closers: Vec<u8> = Vec::new();
    let mut in_string = false;
    let mut escaped = false;

    for (i, &b) in bytes.iter().enumerate().skip(start) {
        if in_string {
            if escaped {
                escaped = false;
            } else if b == b'\\' {
                escaped = true;
            } else if b == b'"' {
                in_string = false;
            }
            continue;
        }

        match b {
            b'"' => in_string = true,
            b'{' => closers.push(b'}'),
            b'[' => closers.push(b']'),
            b'}' | b']' => {
                if closers.pop() != Some(b) {
                    return Scan::Mismatched { at: i };
                }
                if closers.is_empty() {
                    return Scan::Balanced(&text[start..=i]);
                }
            }
            _ => {}
        }
    }

    Scan::Unbalanced
}

/// Returns the first balanced `{...}` or `[...]` span in `text` that is valid JSON.
///
/// A span that never closes runs to the end of the input, so every later
/// opener sits inside it and scanning stops there. A balanced span that
/// does not parse is skipped. When nothing parses the error names the first
/// such span, or `NoJsonFound` when there are no brackets at all.
pub fn extract_json(text: &str) -> Result<&str, ExtractionError> {
    let mut invalid: Option<(usize, String)> = None;

    for (offset, _) in text.match_indices(|c: char| c == '{' || c == '[') {
        match scan_span(text, offset) {
            Scan::Balanced(span) => match serde_json::from_str::<IgnoredAny>(span) {
                Ok(_) => return Ok(span),
                Err(e) => {
                    invalid.get_or_insert((offset, e.to_string()));
                }
            },
            Scan::Unbalanced => return Err(ExtractionError::UnbalancedSpan { offset }),
            Scan::Mismatched { at } => {
                invalid.get_or_insert((offset, format!("mismatched closing bracket at byte {at}")));
            }
        }
    }

    match invalid {
        Some((offset, message)) => Err(ExtractionError::InvalidJson { offset, message }),
        None => Err(ExtractionError::NoJsonFound),
    }
}

/// Like [`extract_json`], but returns the parsed value.
pub fn extract_value(text: &str) -> Result<Value, ExtractionError> {
    let span = extract_json(text)?;
    serde_json::from_str(span).map_err(|e| ExtractionError::InvalidJson {
        // `span` is a subslice of `text`
        offset: span.as_ptr() as usize - text.as_ptr() as usize,
        message: e.to_string(),
    })
}
