// Career tools: resume review, roadmap, cover letter, company research.
// Each module owns its response type and schema; handlers wire them to HTTP.

pub mod company;
pub mod cover_letter;
pub mod handlers;
pub mod resume;
pub mod roadmap;
