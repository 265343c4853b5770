//! Prompt construction and response handling for test generation.

use super::error::AiError;
use super::gemini::GenerativeClient;
use super::model::{SourceFile, TestSummary};

/// Per-file content prefix embedded in summarisation prompts.
pub const SUMMARY_CONTEXT_CHAR_CAP: usize = 2_000;

/// Per-file content prefix embedded in code-generation prompts.
pub const GENERATION_CONTEXT_CHAR_CAP: usize = 3_000;

/// Number of test-case summaries requested from the model.
pub const SUMMARY_COUNT: usize = 6;

/// Longest raw-response prefix carried by a fallback summary description.
const FALLBACK_DESCRIPTION_CHAR_CAP: usize = 500;

const FALLBACK_SUMMARY_ID: &str = "raw-1";
const FALLBACK_SUMMARY_TITLE: &str = "AI-output";

/// Orchestrates summarisation and code generation over a generative client.
///
/// Both operations are idempotent in intent but non-deterministic in
/// practice because the underlying model is non-deterministic. Each makes
/// exactly one upstream call.
pub struct TestGenerationService<'client> {
    client: &'client dyn GenerativeClient,
}

impl<'client> TestGenerationService<'client> {
    /// Creates a service over the provided generative client.
    #[must_use]
    pub const fn new(client: &'client dyn GenerativeClient) -> Self {
        Self { client }
    }

    /// Proposes test-case summaries for a group of related source files.
    ///
    /// The model is instructed to return exactly [`SUMMARY_COUNT`] summaries
    /// as a JSON array. A response that parses into the documented shape is
    /// returned unchanged; anything else is replaced by a single synthetic
    /// entry carrying a prefix of the raw response, so this operation never
    /// fails on malformed model output.
    ///
    /// # Errors
    ///
    /// Returns [`AiError`] only when the upstream call itself fails; there is
    /// no partial result.
    pub async fn summarise(&self, files: &[SourceFile]) -> Result<Vec<TestSummary>, AiError> {
        let prompt = build_summary_prompt(files);
        let raw = self.client.generate_text(&prompt).await?;
        Ok(parse_summaries(&raw, files))
    }

    /// Generates test source code for a chosen summary.
    ///
    /// The trimmed raw model output is returned verbatim; no parsing and no
    /// validation of syntactic correctness is performed, since the generated
    /// text has no downstream structural consumer here.
    ///
    /// # Errors
    ///
    /// Returns [`AiError`] when the upstream call fails.
    pub async fn generate_code(
        &self,
        files: &[SourceFile],
        summary_description: &str,
    ) -> Result<String, AiError> {
        let prompt = build_generation_prompt(files, summary_description);
        let raw = self.client.generate_text(&prompt).await?;
        Ok(raw.trim().to_owned())
    }
}

/// Builds the summarisation prompt.
///
/// File order follows the caller-supplied selection so the prompt stays
/// deterministic for a given selection.
fn build_summary_prompt(files: &[SourceFile]) -> String {
    let context = build_file_context(files, SUMMARY_CONTEXT_CHAR_CAP, "FILE: ");

    let mut prompt = String::new();
    prompt.push_str(concat!(
        "You are a senior test engineer assisting in building a ",
        "GitHub-integrated test case generator.\n\n",
    ));
    prompt.push_str(concat!(
        "You will be given a group of related source code files.\n\n",
        "Your task:\n",
        "1. Review the provided files together as a group.\n",
    ));
    prompt.push_str(&format!(
        "2. Propose exactly {SUMMARY_COUNT} concise test case summaries for this group of files.\n"
    ));
    prompt.push_str(concat!(
        "3. Each summary should include:\n",
        "   - id: a short unique string id.\n",
        "   - title: a clear name for the test case.\n",
        "   - description: 1-2 line description of what the test will validate.\n",
        "   - targetFiles: an array of file paths relevant to this test.\n",
        "4. Keep descriptions short and focused on the main intent of the test.\n",
        "5. Choose an appropriate test framework based on the given files, ",
        "but do not write any test code here.\n\n",
        "Return ONLY a valid JSON array in the format:\n",
        "[\n",
        "  { \"id\": \"tc1\", \"title\": \"...\", \"description\": \"...\", ",
        "\"targetFiles\": [\"file1.js\", \"file2.js\"] }\n",
        "]\n",
        "No explanations, no markdown. Only valid JSON.\n\n",
        "Source Files:\n",
    ));
    prompt.push_str(&context);
    prompt
}

/// Builds the code-generation prompt for one summary.
fn build_generation_prompt(files: &[SourceFile], summary_description: &str) -> String {
    let context = build_file_context(files, GENERATION_CONTEXT_CHAR_CAP, "// FILE: ");

    let mut prompt = String::new();
    prompt.push_str(concat!(
        "You are an expert test engineer.\n",
        "Write a complete test file for the following test description:\n\n",
    ));
    prompt.push_str(summary_description);
    prompt.push_str("\n\nContext (source files for reference):\n");
    prompt.push_str(&context);
    prompt.push_str(concat!(
        "\n\nReturn ONLY the complete test code with no explanations, ",
        "no markdown, no JSON. Just the ready-to-paste code.\n",
    ));
    prompt
}

/// Embeds each file's path and a bounded-length content prefix.
///
/// The per-file cap bounds total prompt size.
fn build_file_context(files: &[SourceFile], char_cap: usize, label: &str) -> String {
    let mut context = String::new();
    for (index, file) in files.iter().enumerate() {
        if index > 0 {
            context.push_str("\n\n---\n");
        }
        context.push_str(label);
        context.push_str(&file.path);
        context.push('\n');
        context.extend(file.content.chars().take(char_cap));
    }
    context
}

/// Parses the raw model response into summaries, falling back to a single
/// synthetic entry when the response is not a JSON array of the documented
/// shape.
///
/// Shape validation happens through Serde: missing or mistyped fields route
/// the response into the same fallback path as unparseable text.
fn parse_summaries(raw: &str, files: &[SourceFile]) -> Vec<TestSummary> {
    serde_json::from_str::<Vec<TestSummary>>(raw)
        .unwrap_or_else(|_| vec![fallback_summary(raw, files)])
}

/// Synthesises the single fallback entry substituted for malformed output.
///
/// The description carries a prefix of the raw response and the target files
/// reference every input path, so callers always receive a usable shape at
/// the cost of losing structure.
fn fallback_summary(raw: &str, files: &[SourceFile]) -> TestSummary {
    TestSummary {
        id: FALLBACK_SUMMARY_ID.to_owned(),
        title: FALLBACK_SUMMARY_TITLE.to_owned(),
        description: raw.chars().take(FALLBACK_DESCRIPTION_CHAR_CAP).collect(),
        target_files: files.iter().map(|file| file.path.clone()).collect(),
    }
}
