//! String helpers
//!
//! Character-count truncation used when embedding bundle files into prompts.

/// Cut `s` to at most `max_chars` characters.
///
/// Counts Unicode scalar values, so a multi-byte character is never split.
/// Returns `None` when `s` already fits.
///
/// # Example
/// ```ignore
/// assert_eq!(truncate_chars("abcdef", 3), Some("abc"));
/// assert_eq!(truncate_chars("abc", 3), None);
/// ```
#[inline]
pub fn truncate_chars(s: &str, max_chars: usize) -> Option<&str> {
    s.char_indices().nth(max_chars).map(|(cut, _)| &s[..cut])
}

/// String truncation extension trait
pub trait StringExt {
    /// Truncate to `max_chars` characters and append `marker` if anything was cut.
    ///
    /// Returns the (possibly unchanged) string and whether truncation happened.
    fn truncated_with_marker(&self, max_chars: usize, marker: &str) -> (String, bool);
}

impl StringExt for str {
    fn truncated_with_marker(&self, max_chars: usize, marker: &str) -> (String, bool) {
        match truncate_chars(self, max_chars) {
            Some(head) => {
                let mut out = String::with_capacity(head.len() + marker.len());
                out.push_str(head);
                out.push_str(marker);
                (out, true)
            },
            None => (self.to_string(), false),
        }
    }
}

impl StringExt for String {
    #[inline]
    fn truncated_with_marker(&self, max_chars: usize, marker: &str) -> (String, bool) {
        self.as_str().truncated_with_marker(max_chars, marker)
    }
}
