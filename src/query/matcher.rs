// Detected sound matching
// Cross-references sound targets with labels from an external detector

use crate::query::interpreter::SoundTarget;
use crate::query::vocabulary::are_related;

/// Labels related to a single target term, deduplicated, in label order
pub fn matched_labels_for(term: &str, labels: &[String]) -> Vec<String> {
    let mut matched: Vec<String> = Vec::new();
    for label in labels {
        let label = label.trim();
        if label.is_empty() {
            continue;
        }
        if are_related(term, label) && !matched.iter().any(|m| m.eq_ignore_ascii_case(label)) {
            matched.push(label.to_string());
        }
    }
    matched
}

/// Labels related to any of the targets, deduplicated, in label order
pub fn match_detected_labels(targets: &[SoundTarget], labels: &[String]) -> Vec<String> {
    let mut matched: Vec<String> = Vec::new();
    for target in targets {
        for label in matched_labels_for(&target.term, labels) {
            if !matched.iter().any(|m| m.eq_ignore_ascii_case(&label)) {
                matched.push(label);
            }
        }
    }

    // Restore label order after per-target collection
    matched.sort_by_key(|m| {
        labels
            .iter()
            .position(|l| l.trim().eq_ignore_ascii_case(m))
            .unwrap_or(usize::MAX)
    });
    matched
}

/// True when any matched label and the term contain one another
/// Synonym-only matches do not count
pub fn has_direct_match(term: &str, matched: &[String]) -> bool {
    let term = term.to_lowercase();
    matched.iter().any(|label| {
        let label = label.to_lowercase();
        label.contains(&term) || term.contains(&label)
    })
}
