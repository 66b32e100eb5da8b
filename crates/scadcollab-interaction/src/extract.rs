//! Code extraction from provider responses.

use once_cell::sync::Lazy;
use regex::Regex;

// Matches a fenced block with an optional language tag; the interior
// is captured without the fence-adjacent newlines.
static FENCED_BLOCK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"```(?:[a-zA-Z0-9_-]+)?\n([\s\S]*?)\n```").expect("fence pattern is valid")
});

/// Extracts the code payload from a provider's free-text response.
///
/// If the text contains a fenced block, its interior is taken
/// verbatim; otherwise the whole response is the code. No further
/// sanitization is performed.
pub fn extract_code(response: &str) -> String {
    match FENCED_BLOCK.captures(response) {
        Some(captures) => captures[1].to_string(),
        None => response.to_string(),
    }
}
