//! Removes a Markdown code-fence wrapper from generated text.
//!
//! Models frequently answer with ```` ```html ... ``` ```` even when told not
//! to. The markup inside is what the rest of the pipeline wants.

const FENCE: &str = "```";

/// Strip a leading/trailing fenced-code-block wrapper, if present.
///
/// The input is trimmed first. When it then starts with a triple backtick,
/// the first line (fence plus optional language tag) and the last line
/// (closing fence) are dropped and the remainder is trimmed again. Text
/// without a fence is only trimmed.
pub fn strip_code_fence(raw: &str) -> String {
    let trimmed = raw.trim();
    if !trimmed.starts_with(FENCE) {
        return trimmed.to_string();
    }

    let lines: Vec<&str> = trimmed.split('\n').collect();
    if lines.len() <= 2 {
        // Only the fence lines themselves.
        return String::new();
    }
    lines[1..lines.len() - 1].join("\n").trim().to_string()
}
