use once_cell::sync::Lazy;
use regex::Regex;

static JSON_FENCE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"```json\s*([\s\S]*?)\s*```").expect("fence pattern is valid")
});

/// Return the body of the first fenced block tagged `json` in `text`, trimmed.
///
/// Returns `None` when there is no such block. The body is not parsed.
pub fn extract_json_block(text: &str) -> Option<String> {
    JSON_FENCE
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|body| body.as_str().trim().to_string())
}
