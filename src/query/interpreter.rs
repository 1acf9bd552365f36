// Query interpretation
// Turns free-text queries into an ordered list of distinct sound targets

use serde::{Deserialize, Serialize};

use crate::query::vocabulary::{are_related, SOUND_KEYWORDS};

/// Words that separate sub-queries when they appear on their own
const WORD_SEPARATORS: &[&str] = &["and", "or"];

/// A normalized, lowercase sound term extracted from a query
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SoundTarget {
    /// Normalized term (e.g., "dog", "speech")
    pub term: String,

    /// True when no vocabulary keyword matched and the raw sub-query was used
    pub literal: bool,
}

impl SoundTarget {
    pub fn keyword(term: &str) -> Self {
        SoundTarget {
            term: term.to_string(),
            literal: false,
        }
    }

    pub fn literal(term: &str) -> Self {
        SoundTarget {
            term: term.to_string(),
            literal: true,
        }
    }
}

/// Split a query into trimmed, non-empty sub-queries
/// Commas, semicolons and the whole words "and"/"or" act as separators
pub fn split_query(query: &str) -> Vec<String> {
    let normalized = query.trim().to_lowercase();
    let mut pieces = Vec::new();

    for chunk in normalized.split([',', ';']) {
        let mut current: Vec<&str> = Vec::new();
        for word in chunk.split_whitespace() {
            if WORD_SEPARATORS.contains(&word) {
                if !current.is_empty() {
                    pieces.push(current.join(" "));
                    current.clear();
                }
            } else {
                current.push(word);
            }
        }
        if !current.is_empty() {
            pieces.push(current.join(" "));
        }
    }

    pieces
}

/// Parse a query into ordered, distinct sound targets
///
/// Each sub-query is scanned against the keyword vocabulary in vocabulary
/// order. A keyword is skipped when it is related (substring or synonym) to a
/// keyword already collected. When no sub-query contains any keyword, every
/// sub-query becomes a literal target instead.
///
/// Returns an empty list only when the query has no sub-queries at all
/// (e.g. ", and ;"); callers reject such queries before processing.
pub fn parse_query(query: &str) -> Vec<SoundTarget> {
    let sub_queries = split_query(query);
    let mut targets: Vec<SoundTarget> = Vec::new();

    for sub_query in &sub_queries {
        for keyword in SOUND_KEYWORDS {
            if !sub_query.contains(keyword) {
                continue;
            }
            if targets.iter().any(|t| are_related(&t.term, keyword)) {
                continue;
            }
            targets.push(SoundTarget::keyword(keyword));
        }
    }

    if targets.is_empty() {
        for sub_query in &sub_queries {
            if !targets.iter().any(|t| &t.term == sub_query) {
                log::warn!("No known sound in '{}', using it literally", sub_query);
                targets.push(SoundTarget::literal(sub_query));
            }
        }
    }

    log::debug!(
        "Parsed query '{}' into {:?}",
        query.trim(),
        targets.iter().map(|t| t.term.as_str()).collect::<Vec<_>>()
    );

    targets
}
