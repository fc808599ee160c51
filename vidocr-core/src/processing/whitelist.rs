//! Character whitelist filtering applied to every recognized string.

use std::collections::HashSet;

/// Set of characters retained in recognized text.
///
/// Keeps the configured string verbatim for metadata output alongside the
/// lookup set. An empty whitelist disables filtering.
#[derive(Debug, Clone)]
pub struct Whitelist {
    raw: String,
    allowed: HashSet<char>,
}

impl Whitelist {
    pub fn new(chars: &str) -> Self {
        Self {
            raw: chars.to_string(),
            allowed: chars.chars().collect(),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn is_empty(&self) -> bool {
        self.allowed.is_empty()
    }

    /// Keeps only whitelisted characters, preserving order and repetition.
    pub fn filter(&self, text: &str) -> String {
        if self.is_empty() {
            return text.to_string();
        }
        text.chars().filter(|c| self.allowed.contains(c)).collect()
    }
}

/// Convenience wrapper around [`Whitelist::filter`].
pub fn filter_text(text: &str, whitelist: &str) -> String {
    Whitelist::new(whitelist).filter(text)
}
