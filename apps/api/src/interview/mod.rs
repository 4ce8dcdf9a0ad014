// Interview preparation: question generation, the prep chatbot, and
// voice-interview sessions with transcript-based feedback.

pub mod chat;
pub mod feedback;
pub mod handlers;
pub mod questions;
pub mod session;
