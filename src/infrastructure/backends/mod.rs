pub mod gemini;
pub mod retry;
