//! Field extraction helpers for structured logging

use crate::envelope::{DispatchRequest, DispatchResponse};

/// Characters kept by [`message_preview`].
pub const PREVIEW_CHARS: usize = 100;

/// Outcome label and error text of a response, for the completion log line.
///
/// # Examples
///
/// ```
/// use conduit::envelope::DispatchResponse;
/// use conduit::logging::response_status;
///
/// let response = DispatchResponse::failure("llm_local", "timed out");
/// assert_eq!(response_status(&response), ("error", Some("timed out")));
/// ```
pub fn response_status(response: &DispatchResponse) -> (&'static str, Option<&str>) {
    if response.ok() {
        ("success", None)
    } else {
        ("error", response.error())
    }
}

/// Truncated request text for logging, or `None` when content logging is off.
///
/// Uses `message`, falling back to `payload.prompt`.
///
/// # Examples
///
/// ```
/// use conduit::envelope::DispatchRequest;
/// use conduit::logging::message_preview;
///
/// let request = DispatchRequest::new("chat", "bot").with_message("Hello, world!");
/// assert_eq!(message_preview(&request, true).as_deref(), Some("Hello, world!"));
/// assert_eq!(message_preview(&request, false), None);
/// ```
pub fn message_preview(request: &DispatchRequest, enable_content_logging: bool) -> Option<String> {
    if !enable_content_logging {
        return None;
    }

    let text = request
        .message
        .as_deref()
        .filter(|m| !m.is_empty())
        .or_else(|| request.payload_str("prompt"))?;

    Some(truncate_chars(text, PREVIEW_CHARS))
}

fn truncate_chars(s: &str, max_chars: usize) -> String {
    match s.char_indices().nth(max_chars) {
        None => s.to_string(),
        Some((end, _)) => format!("{}...", &s[..end]),
    }
}
