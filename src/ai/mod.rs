//! AI orchestration for test-case summarisation and code generation.
//!
//! The orchestrator builds deterministic prompts from selected files, invokes
//! a generative-text API exactly once per operation, and parses the response
//! into structured results. Malformed summary output is recovered locally via
//! a synthetic fallback entry and is never surfaced as an error; generated
//! code has no downstream structural consumer, so it is treated as opaque
//! text.

pub mod error;
pub mod gemini;
pub mod model;
pub mod service;

pub use error::AiError;
pub use gemini::{GeminiClient, GeminiConfig, GenerativeClient};
pub use model::{SourceFile, TestSummary};
pub use service::{
    GENERATION_CONTEXT_CHAR_CAP, SUMMARY_CONTEXT_CHAR_CAP, SUMMARY_COUNT, TestGenerationService,
};

#[cfg(test)]
pub use gemini::MockGenerativeClient;
