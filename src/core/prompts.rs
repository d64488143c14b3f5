//! Prompt templates for the completion-backed stages.
//!
//! Templates use `{name}` placeholders filled by [`render`]. The JSON
//! format instructions are baked into each template; the clients parse
//! the model output with a fence-tolerant JSON reader.

/// Locates the table of contents in leading-page markdown and maps each
/// top-level section to its printed page range.
pub const CONTENT_SEARCHING_PROMPT: &str = r#"You are a document analyzer. Your job is to analyze the document content to find out the respective page for each section.

You will be given a markdown rendering of the report's leading pages.

<EXAMPLE STARTS HERE>
# CONTENTS

# OVERVIEW

2 Chairman's Letter to Shareholders
6 Significant Events
7 Three-year Financial Highlights
16 Our Strategy for the Future

# GOVERNANCE

68 Statement on Risk Management
71 Corporate Governance Report
91 Further Information on Board of Directors
</EXAMPLE ENDS HERE>

<TASK STARTS HERE>
Find the content page and extract it as JSON in this shape:
{"OVERVIEW": {"start": "2", "end": "16", "sections": ["Chairman's Letter to Shareholders", "Significant Events", "..."]}, "GOVERNANCE": {"start": "68", "end": "91", "sections": ["Statement on Risk Management", "Corporate Governance Report", "..."]}}

- You MUST provide "start" and "end" pages. Only the last section may have an empty "end".
- Respond with the JSON object only.
</TASK ENDS HERE>

<INPUT MARKDOWN STARTS HERE>
{input_markdown}
</INPUT MARKDOWN ENDS HERE>
"#;

/// Extracts retrieval keywords from one chunk of report text.
pub const KEYWORD_PROMPT: &str = r#"You are a financial-document analyst. Extract the most important keywords and key phrases from the chunk below: named entities, financial metrics, products, and topics a reader would search for.

Respond with a JSON object of the shape {"keywords": "<comma-separated keywords>"} and nothing else.

<CHUNK STARTS HERE>
{chunk_text}
<CHUNK ENDS HERE>
"#;

/// Generates question/answer pairs grounded in one chunk of report text.
pub const QA_GENERATION_PROMPT: &str = r#"You are a financial-document analyst. Write question and answer pairs that the chunk below can fully answer. Each pair must be answerable from the chunk alone, with no outside knowledge.

Respond with a JSON object of the shape {"qa_session": ["Q: ... A: ...", "Q: ... A: ..."]} and nothing else.

<CHUNK STARTS HERE>
{chunk_text}
<CHUNK ENDS HERE>
"#;

/// Substitute a single `{placeholder}` occurrence in a template.
pub fn render(template: &str, placeholder: &str, value: &str) -> String {
    template.replace(&format!("{{{placeholder}}}"), value)
}
