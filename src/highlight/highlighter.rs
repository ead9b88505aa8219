//! Highlighter: match-and-wrap over the document tree.
//!
//! One synchronous pass per query:
//! 1. Unwrap every existing marker (idempotent reset; visible text is
//!    restored byte-identically, no empty or split text nodes left)
//! 2. Compile the literal pattern
//! 3. Coarse-filter containers on their full rendered text
//! 4. Rewrite matching text leaves in place: plain segments stay text,
//!    matched spans are wrapped in `<mark class="gpt-highlight">`
//! 5. Report the first marker in document order as the scroll target
//!
//! Leaves with no match keep their `NodeId`, so host-side listeners on
//! untouched nodes survive a pass.

use instant::Instant;
use serde::{Deserialize, Serialize};

use crate::dom::{Document, NodeId};
use crate::highlight::pattern::SearchPattern;

/// Tag of the wrapper inserted around matched text
pub const MARKER_TAG: &str = "mark";

/// Class carried by every marker
pub const MARKER_CLASS: &str = "gpt-highlight";

// =============================================================================
// Types
// =============================================================================

/// Timing and volume statistics for one highlight pass
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct HighlightStats {
    pub total_us: u64,
    pub containers_scanned: usize,
    pub candidates: usize,
    pub nodes_rewritten: usize,
    pub markers_created: usize,
    pub markers_cleared: usize,
}

/// Result of one highlight pass
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct HighlightOutcome {
    /// First marker in document order; the host scrolls it into view
    /// (smooth, centered). `None` means no scroll.
    pub first_marker: Option<NodeId>,
    pub marker_count: usize,
    /// Container indices that received at least one marker
    pub matched_containers: Vec<usize>,
    /// Container indices whose subtree changed (cleared or rewritten);
    /// the host re-syncs exactly these
    pub touched_containers: Vec<usize>,
    pub stats: HighlightStats,
}

// =============================================================================
// Highlighter
// =============================================================================

pub struct Highlighter;

impl Highlighter {
    /// Remove all existing markers, restoring each marker's text into its
    /// parent. Returns the number of markers unwrapped and the indices of
    /// the containers they sat in.
    pub fn clear(doc: &mut Document) -> Result<(usize, Vec<usize>), String> {
        let markers = Self::markers(doc);
        let mut touched = Vec::new();
        let mut parents = Vec::new();

        for marker in &markers {
            if let Some(index) = doc.container_index_of(*marker) {
                if !touched.contains(&index) {
                    touched.push(index);
                }
            }
            let parent = doc
                .parent(*marker)
                .ok_or_else(|| format!("marker {} has no parent", marker.index()))?;
            let content = doc.text_of(*marker);
            let restored = doc.create_text(&content);
            doc.replace_with(*marker, &[restored])?;
            if !parents.contains(&parent) {
                parents.push(parent);
            }
        }

        // merge the restored text back into its siblings so a repeated
        // pass sees the same leaves as the original page
        for parent in parents {
            doc.normalize(parent);
        }

        touched.sort_unstable();
        Ok((markers.len(), touched))
    }

    /// All markers currently in the document, in document order
    pub fn markers(doc: &Document) -> Vec<NodeId> {
        doc.elements_matching(|tag, attrs| {
            tag == MARKER_TAG
                && attrs
                    .get("class")
                    .map(|c| c.split_whitespace().any(|part| part == MARKER_CLASS))
                    .unwrap_or(false)
        })
    }

    /// One full highlight pass. An empty (or whitespace) query clears and
    /// performs no new search; this is not an error.
    pub fn highlight(
        doc: &mut Document,
        query: &str,
        whole_word: bool,
    ) -> Result<HighlightOutcome, String> {
        let pass_start = Instant::now();
        let mut outcome = HighlightOutcome::default();

        let (cleared, cleared_containers) = Self::clear(doc)?;
        outcome.stats.markers_cleared = cleared;
        outcome.touched_containers = cleared_containers;

        let trimmed = query.trim();
        if trimmed.is_empty() {
            outcome.stats.total_us = pass_start.elapsed().as_micros() as u64;
            return Ok(outcome);
        }

        let pattern = SearchPattern::compile(trimmed, whole_word)?;
        let containers = doc.containers();
        outcome.stats.containers_scanned = containers.len();

        for (index, &container) in containers.iter().enumerate() {
            // message-level check keeps long transcripts cheap; substring
            // mode, so node-level matches are never filtered out
            if !pattern.is_substring_match(&doc.text_of(container)) {
                continue;
            }
            outcome.stats.candidates += 1;

            let mut container_matched = false;
            for leaf in doc.text_leaves(container) {
                let content = match doc.text_value(leaf) {
                    Some(content) => content.to_string(),
                    None => continue,
                };
                let matches = pattern.find_ranges(&content);
                if matches.is_empty() {
                    continue;
                }

                let markers = Self::rewrite_leaf(doc, leaf, &content, &matches)?;
                outcome.stats.nodes_rewritten += 1;
                outcome.marker_count += markers.len();
                if outcome.first_marker.is_none() {
                    outcome.first_marker = markers.first().copied();
                }
                container_matched = true;
            }

            if container_matched {
                outcome.matched_containers.push(index);
                if !outcome.touched_containers.contains(&index) {
                    outcome.touched_containers.push(index);
                }
            }
        }

        outcome.touched_containers.sort_unstable();
        outcome.stats.markers_created = outcome.marker_count;
        outcome.stats.total_us = pass_start.elapsed().as_micros() as u64;
        Ok(outcome)
    }

    /// Replace one text leaf with plain segments and marker elements.
    /// Returns the created markers in order.
    fn rewrite_leaf(
        doc: &mut Document,
        leaf: NodeId,
        content: &str,
        matches: &[(usize, usize)],
    ) -> Result<Vec<NodeId>, String> {
        let mut replacements = Vec::new();
        let mut markers = Vec::new();
        let mut cursor = 0;

        for &(start, end) in matches {
            if start > cursor {
                let plain = doc.create_text(&content[cursor..start]);
                replacements.push(plain);
            }
            let marker = doc.create_element_with_attr(MARKER_TAG, "class", MARKER_CLASS);
            let matched = doc.create_text(&content[start..end]);
            doc.append_child(marker, matched);
            markers.push(marker);
            replacements.push(marker);
            cursor = end;
        }
        if cursor < content.len() {
            let plain = doc.create_text(&content[cursor..]);
            replacements.push(plain);
        }

        doc.replace_with(leaf, &replacements)?;
        Ok(markers)
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::{NodeSpec, MESSAGE_ATTR};
    use std::collections::HashMap;

    fn message(children: Vec<NodeSpec>) -> NodeSpec {
        let mut attrs = HashMap::new();
        attrs.insert(MESSAGE_ATTR.to_string(), "assistant".to_string());
        NodeSpec::Element {
            tag: "div".to_string(),
            attrs,
            children,
        }
    }

    fn page(messages: Vec<NodeSpec>) -> Document {
        let mut doc = Document::new();
        for spec in &messages {
            doc.insert_spec(doc.root(), spec);
        }
        doc
    }

    fn container_texts(doc: &Document) -> Vec<String> {
        doc.containers().iter().map(|&c| doc.text_of(c)).collect()
    }

    // -------------------------------------------------------------------------
    // Requirement 1: two-container scenario from the contract
    // -------------------------------------------------------------------------
    #[test]
    fn test_two_container_scenario() {
        let mut doc = page(vec![
            message(vec![NodeSpec::text("I like cats")]),
            message(vec![NodeSpec::text("No match here")]),
        ]);
        let second_leaves = doc.text_leaves(doc.containers()[1]);

        let outcome = Highlighter::highlight(&mut doc, "cats", true).unwrap();

        assert_eq!(outcome.marker_count, 1);
        assert_eq!(outcome.matched_containers, vec![0]);
        assert!(outcome.first_marker.is_some());

        let markers = Highlighter::markers(&doc);
        assert_eq!(markers.len(), 1);
        assert_eq!(doc.text_of(markers[0]), "cats");
        assert_eq!(outcome.first_marker, Some(markers[0]));

        // second container completely untouched, same node identity
        assert_eq!(doc.text_leaves(doc.containers()[1]), second_leaves);
    }

    // -------------------------------------------------------------------------
    // Requirement 2: idempotent reset / round-trip restore
    // -------------------------------------------------------------------------
    #[test]
    fn test_empty_query_restores_original_text() {
        let original = "cats and more cats, categorically";
        let mut doc = page(vec![message(vec![NodeSpec::text(original)])]);

        Highlighter::highlight(&mut doc, "cats", false).unwrap();
        assert!(Highlighter::markers(&doc).len() > 1);

        let outcome = Highlighter::highlight(&mut doc, "", false).unwrap();
        assert!(Highlighter::markers(&doc).is_empty());
        assert_eq!(outcome.marker_count, 0);
        assert_eq!(container_texts(&doc), vec![original.to_string()]);

        // a single merged text leaf, not fragments
        let container = doc.containers()[0];
        assert_eq!(doc.text_leaves(container).len(), 1);
    }

    #[test]
    fn test_round_trip_unicode_and_punctuation() {
        let original = "déjà vu — cats! 猫 (cats?) …";
        let mut doc = page(vec![message(vec![NodeSpec::text(original)])]);

        Highlighter::highlight(&mut doc, "cats", false).unwrap();
        Highlighter::highlight(&mut doc, "", false).unwrap();

        assert_eq!(container_texts(&doc), vec![original.to_string()]);
    }

    #[test]
    fn test_repeated_queries_keep_single_marker_set() {
        let mut doc = page(vec![message(vec![NodeSpec::text("cats chase dogs")])]);

        Highlighter::highlight(&mut doc, "cats", true).unwrap();
        let outcome = Highlighter::highlight(&mut doc, "dogs", true).unwrap();

        let markers = Highlighter::markers(&doc);
        assert_eq!(markers.len(), 1);
        assert_eq!(doc.text_of(markers[0]), "dogs");
        assert_eq!(outcome.stats.markers_cleared, 1);
        assert_eq!(container_texts(&doc), vec!["cats chase dogs".to_string()]);
    }

    // -------------------------------------------------------------------------
    // Requirement 3: metacharacter queries stay literal end to end
    // -------------------------------------------------------------------------
    #[test]
    fn test_metacharacter_query_highlights_literally() {
        let mut doc = page(vec![
            message(vec![NodeSpec::text("escape ..*+? sequence")]),
            message(vec![NodeSpec::text("nothing to see")]),
        ]);

        let outcome = Highlighter::highlight(&mut doc, "..*+?", false).unwrap();

        assert_eq!(outcome.marker_count, 1);
        let markers = Highlighter::markers(&doc);
        assert_eq!(doc.text_of(markers[0]), "..*+?");
    }

    // -------------------------------------------------------------------------
    // Requirement 4: whole-word vs substring through the full pass
    // -------------------------------------------------------------------------
    #[test]
    fn test_whole_word_skips_interior_matches() {
        let mut doc = page(vec![message(vec![NodeSpec::text("start of art class")])]);

        let whole = Highlighter::highlight(&mut doc, "art", true).unwrap();
        assert_eq!(whole.marker_count, 1);
        assert_eq!(doc.text_of(Highlighter::markers(&doc)[0]), "art");

        let substring = Highlighter::highlight(&mut doc, "art", false).unwrap();
        assert_eq!(substring.marker_count, 2);
    }

    #[test]
    fn test_case_insensitive_whole_word_pass() {
        let mut doc = page(vec![message(vec![NodeSpec::text("Cat, cat and CAT in a category")])]);

        let outcome = Highlighter::highlight(&mut doc, "Cat", true).unwrap();
        assert_eq!(outcome.marker_count, 3);
    }

    // -------------------------------------------------------------------------
    // Requirement 5: node-level rewrite preserves structure
    // -------------------------------------------------------------------------
    #[test]
    fn test_rewrite_preserves_sibling_structure() {
        let mut doc = page(vec![message(vec![
            NodeSpec::text("I like "),
            NodeSpec::element("code", vec![NodeSpec::text("cats")]),
            NodeSpec::text(" and cats outside code"),
        ])]);

        let outcome = Highlighter::highlight(&mut doc, "cats", true).unwrap();
        assert_eq!(outcome.marker_count, 2);

        // the code element survives with a marker inside it
        let container = doc.containers()[0];
        let code = doc
            .children(container)
            .iter()
            .copied()
            .find(|&c| doc.tag(c) == Some("code"))
            .unwrap();
        assert_eq!(doc.text_of(code), "cats");
        assert_eq!(container_texts(&doc), vec!["I like cats and cats outside code".to_string()]);
    }

    #[test]
    fn test_match_spanning_leaves_is_not_found() {
        // matching is per text node; a word split across inline leaves
        // is invisible to the rewrite, as on the host page
        let mut doc = page(vec![message(vec![
            NodeSpec::text("ca"),
            NodeSpec::text("ts"),
        ])]);

        let outcome = Highlighter::highlight(&mut doc, "cats", false).unwrap();
        assert_eq!(outcome.marker_count, 0);
        assert!(outcome.first_marker.is_none());
    }

    // -------------------------------------------------------------------------
    // Requirement 6: coarse filter is a superset check
    // -------------------------------------------------------------------------
    #[test]
    fn test_coarse_filter_does_not_drop_whole_word_node_matches() {
        // concatenated container text is "cats" + "uffix" = "catsuffix",
        // where a whole-word check would fail; the node-level match in the
        // first leaf must still be found
        let mut doc = page(vec![message(vec![
            NodeSpec::element("b", vec![NodeSpec::text("cats")]),
            NodeSpec::text("uffix"),
        ])]);

        let outcome = Highlighter::highlight(&mut doc, "cats", true).unwrap();
        assert_eq!(outcome.marker_count, 1);
    }

    #[test]
    fn test_candidate_with_zero_node_matches_is_harmless() {
        // "ca" + "ts" makes the container text contain the substring, so
        // it is scanned, finds nothing, and stays untouched
        let mut doc = page(vec![message(vec![
            NodeSpec::text("ca"),
            NodeSpec::text("ts"),
        ])]);

        let outcome = Highlighter::highlight(&mut doc, "cats", true).unwrap();
        assert_eq!(outcome.stats.candidates, 1);
        assert_eq!(outcome.marker_count, 0);
        assert_eq!(container_texts(&doc), vec!["cats".to_string()]);
    }

    // -------------------------------------------------------------------------
    // Requirement 7: first marker is first in document order
    // -------------------------------------------------------------------------
    #[test]
    fn test_first_marker_document_order() {
        let mut doc = page(vec![
            message(vec![NodeSpec::text("nothing")]),
            message(vec![NodeSpec::text("first cats here, more cats")]),
            message(vec![NodeSpec::text("cats again")]),
        ]);

        let outcome = Highlighter::highlight(&mut doc, "cats", true).unwrap();
        let markers = Highlighter::markers(&doc);
        assert_eq!(markers.len(), 3);
        assert_eq!(outcome.first_marker, Some(markers[0]));
        assert_eq!(doc.container_index_of(markers[0]), Some(1));
        assert_eq!(outcome.matched_containers, vec![1, 2]);
    }

    // -------------------------------------------------------------------------
    // Requirement 8: touched containers cover clears and rewrites
    // -------------------------------------------------------------------------
    #[test]
    fn test_touched_containers_track_clear_and_match() {
        let mut doc = page(vec![
            message(vec![NodeSpec::text("cats here")]),
            message(vec![NodeSpec::text("dogs here")]),
        ]);

        Highlighter::highlight(&mut doc, "cats", true).unwrap();
        let outcome = Highlighter::highlight(&mut doc, "dogs", true).unwrap();

        // container 0 was cleared, container 1 was rewritten
        assert_eq!(outcome.touched_containers, vec![0, 1]);
        assert_eq!(outcome.matched_containers, vec![1]);
    }

    #[test]
    fn test_whitespace_query_is_clear_only() {
        let mut doc = page(vec![message(vec![NodeSpec::text("cats")])]);
        Highlighter::highlight(&mut doc, "cats", true).unwrap();

        let outcome = Highlighter::highlight(&mut doc, "   ", true).unwrap();
        assert_eq!(outcome.stats.markers_cleared, 1);
        assert_eq!(outcome.marker_count, 0);
        assert!(Highlighter::markers(&doc).is_empty());
    }
}
