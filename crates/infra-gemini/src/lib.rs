// Gemini Adapter - implements the EvaluationProvider port

mod client;
mod prompt;

pub use client::GeminiClient;
pub use prompt::build_prompt;
