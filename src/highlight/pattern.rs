//! SearchPattern: literal, case-insensitive query matching.
//!
//! The query is never a user-facing regex language: every metacharacter
//! is escaped before compilation, so matching is a plain substring
//! search with an optional whole-word constraint.
//!
//! Note: Rust regex doesn't support lookbehind, so whole-word mode can't
//! use the `(?<!\w)...(?!\w)` shape directly. Candidate matches are
//! post-filtered on their adjacent characters instead, and a rejected
//! candidate only advances the scan by one character so a later
//! overlapping occurrence is still found.

use regex::{Regex, RegexBuilder};

/// Compiled literal search pattern
#[derive(Debug, Clone)]
pub struct SearchPattern {
    regex: Regex,
    whole_word: bool,
}

impl SearchPattern {
    /// Compile a raw query. Metacharacters are escaped, matching is
    /// case-insensitive. Never fails on metacharacter-only input.
    pub fn compile(query: &str, whole_word: bool) -> Result<Self, String> {
        let literal = regex::escape(query);
        let regex = RegexBuilder::new(&literal)
            .case_insensitive(true)
            .build()
            .map_err(|e| format!("Failed to compile search pattern: {}", e))?;
        Ok(Self { regex, whole_word })
    }

    pub fn whole_word(&self) -> bool {
        self.whole_word
    }

    /// True for the empty query, which matches nothing
    pub fn is_empty(&self) -> bool {
        self.regex.as_str().is_empty()
    }

    /// Byte ranges of matches in `text`, leftmost, non-overlapping
    pub fn find_ranges(&self, text: &str) -> Vec<(usize, usize)> {
        let mut ranges = Vec::new();
        let mut pos = 0;
        while let Some(range) = self.next_range(text, pos) {
            pos = range.1;
            ranges.push(range);
        }
        ranges
    }

    /// Whether `text` contains at least one match under the configured mode
    pub fn is_match(&self, text: &str) -> bool {
        if !self.whole_word {
            return !self.is_empty() && self.regex.is_match(text);
        }
        self.next_range(text, 0).is_some()
    }

    /// Substring check ignoring whole-word mode. Used as the container
    /// level coarse filter: a node-level match in any mode implies a
    /// substring hit in the concatenated text, so this is a non-strict
    /// superset check.
    pub fn is_substring_match(&self, text: &str) -> bool {
        !self.is_empty() && self.regex.is_match(text)
    }

    fn next_range(&self, text: &str, mut pos: usize) -> Option<(usize, usize)> {
        if self.is_empty() {
            return None;
        }
        while pos <= text.len() {
            let m = self.regex.find_at(text, pos)?;
            if !self.whole_word || has_word_boundaries(text, m.start(), m.end()) {
                return Some((m.start(), m.end()));
            }
            pos = m.start() + next_char_len(text, m.start());
        }
        None
    }
}

/// Word class mirroring the page script's `\w`: ASCII alphanumerics
/// and underscore
fn is_word_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// String boundaries count as non-word context
fn has_word_boundaries(text: &str, start: usize, end: usize) -> bool {
    let before_ok = text[..start]
        .chars()
        .next_back()
        .map_or(true, |c| !is_word_char(c));
    let after_ok = text[end..].chars().next().map_or(true, |c| !is_word_char(c));
    before_ok && after_ok
}

fn next_char_len(text: &str, at: usize) -> usize {
    text[at..].chars().next().map_or(1, char::len_utf8)
}

// =============================================================================
// Tests
// =============================================================================
