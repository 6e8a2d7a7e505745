//! Label sanitizing for analytics events.
//!
//! Anything read from the page (section ids, anchor fragments, link text) is
//! passed through [`sanitize`] before it becomes an event label.

/// Maximum length of a sanitized label, in characters.
pub const MAX_LABEL_CHARS: usize = 100;

/// Characters stripped from labels.
const STRIPPED: [char; 4] = ['<', '>', '"', '\''];

/// Strip markup-significant characters and truncate to [`MAX_LABEL_CHARS`].
///
/// Returns an empty string for `None` or empty input. Truncation happens after
/// stripping and counts characters, never splitting a code point.
pub fn sanitize(input: Option<&str>) -> String {
    match input {
        Some(s) if !s.is_empty() => s
            .chars()
            .filter(|c| !STRIPPED.contains(c))
            .take(MAX_LABEL_CHARS)
            .collect(),
        _ => String::new(),
    }
}
