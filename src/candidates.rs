//! Candidate antecedent generation.
//!
//! This is the quadratic-blowup control point: for every mention (the
//! anaphor) it produces the bounded, ordered list of plausible antecedents
//! that the pairwise scorer will consider. Two independent cutoffs apply:
//!
//! - a hard window of `max_mention_distance` mentions, inside which every
//!   preceding mention is a candidate;
//! - a wider window of `max_mention_distance_with_string_match`, inside
//!   which a mention qualifies only on strong lexical evidence (head word
//!   or full-extent string match).
//!
//! Ordering is closest-first: window candidates nearest the anaphor come
//! first, then string-matched long-distance candidates, again
//! closest-first. Downstream code treats list positions as fixed during
//! scoring, and with the linker's strict `>` rule this ordering makes
//! score ties resolve toward the closer antecedent.

use std::collections::HashMap;

use crate::mention::{Document, MentionId};

/// Per-anaphor ordered candidate lists. Every mention in the document has
/// an entry; the first mention's list (and any mention with no candidate
/// in either window) is empty, which is normal — such mentions still
/// receive an anaphoricity-only score.
#[must_use]
pub fn candidate_antecedents(
    doc: &Document,
    max_mention_distance: usize,
    max_mention_distance_with_string_match: usize,
) -> HashMap<MentionId, Vec<MentionId>> {
    let mentions = doc.mentions();

    // Lexical index for the long-distance extension.
    let mut by_head: HashMap<String, Vec<usize>> = HashMap::new();
    let mut by_span: HashMap<String, Vec<usize>> = HashMap::new();
    for (i, m) in mentions.iter().enumerate() {
        by_head.entry(m.head_string()).or_default().push(i);
        by_span.entry(m.span_string()).or_default().push(i);
    }

    let mut candidates = HashMap::with_capacity(mentions.len());
    for (i, m) in mentions.iter().enumerate() {
        let window_start = i.saturating_sub(max_mention_distance);
        let mut list: Vec<MentionId> = (window_start..i)
            .rev()
            .map(|j| mentions[j].id)
            .collect();

        if max_mention_distance < i {
            let far_start = i.saturating_sub(max_mention_distance_with_string_match);
            let mut far: Vec<usize> = Vec::new();
            for (index, key) in [(&by_head, m.head_string()), (&by_span, m.span_string())] {
                if let Some(matches) = index.get(&key) {
                    far.extend(
                        matches
                            .iter()
                            .copied()
                            .filter(|&j| j >= far_start && j < window_start),
                    );
                }
            }
            far.sort_unstable_by(|a, b| b.cmp(a));
            far.dedup();
            list.extend(far.into_iter().map(|j| mentions[j].id));
        }

        candidates.insert(m.id, list);
    }
    candidates
}
