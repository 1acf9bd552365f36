// Query module
// Free-text query parsing, sound vocabulary, and detected-label matching

pub mod interpreter;
pub mod matcher;
pub mod vocabulary;

pub use interpreter::{parse_query, split_query, SoundTarget};
pub use matcher::{has_direct_match, match_detected_labels, matched_labels_for};
pub use vocabulary::{are_related, are_synonyms, SOUND_KEYWORDS, SYNONYM_GROUPS};
