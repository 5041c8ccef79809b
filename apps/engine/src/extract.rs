//! Response extraction — isolates the JSON candidate inside a raw model reply.
//!
//! Purely textual: this step never parses JSON. A candidate that is not valid
//! JSON passes through and fails later at the validation stage with a parse
//! error, which keeps "model wrapped its answer in prose" distinguishable
//! from "model produced no answer at all".

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ExtractionError {
    #[error("empty candidate")]
    EmptyCandidate,
}

/// Isolates the JSON candidate from raw model output.
///
/// If the text contains a fenced block (three backticks, optionally followed
/// by a language tag, closed by three backticks), the content of the first
/// such block wins. Otherwise the whole trimmed text is the candidate. An
/// empty candidate is an error.
pub fn extract(raw: &str) -> Result<&str, ExtractionError> {
    let candidate = fenced_block(raw).unwrap_or(raw).trim();
    if candidate.is_empty() {
        return Err(ExtractionError::EmptyCandidate);
    }
    Ok(candidate)
}

/// Content strictly between the first ``` fence and its closing ```.
/// Returns None when no fence opens, or when the first fence never closes.
fn fenced_block(text: &str) -> Option<&str> {
    let open = text.find("```")?;
    let after_fence = &text[open + 3..];

    // An optional language tag (e.g. `json`) sits on the fence line itself.
    let tag_len = after_fence
        .find(|c: char| !c.is_ascii_alphanumeric())
        .unwrap_or(after_fence.len());
    let body = &after_fence[tag_len..];

    let close = body.find("```")?;
    Some(&body[..close])
}
