//! Domain models shared by the summarisation and code-generation operations.

use serde::{Deserialize, Serialize};

/// One selected source file submitted for summarisation or generation.
///
/// Held only for the duration of a single request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceFile {
    /// Path relative to the repository root.
    pub path: String,
    /// Decoded text content.
    pub content: String,
}

/// A proposed test case produced by the summarisation operation.
///
/// The wire shape (`targetFiles`) matches what the model is instructed to
/// emit and what the front end consumes between the summarisation and
/// code-generation requests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestSummary {
    /// Short unique string id.
    pub id: String,
    /// Clear name for the test case.
    pub title: String,
    /// One-to-two line description of what the test validates.
    pub description: String,
    /// File paths relevant to this test.
    pub target_files: Vec<String>,
}
