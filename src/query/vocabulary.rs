// Sound vocabulary
// Fixed keyword list and synonym groups shared by query parsing and label matching

/// Recognized sound keywords, in scan order
/// Earlier entries win when several keywords of one synonym group appear in a query
pub const SOUND_KEYWORDS: &[&str] = &[
    // Speech and voice
    "speech",
    "voice",
    "talking",
    "speaking",
    "conversation",
    "vocals",
    "singing",
    // Music and instruments
    "music",
    "song",
    "melody",
    "guitar",
    "piano",
    "violin",
    "drums",
    "drum",
    "bass",
    "instrument",
    // Percussive and impact sounds
    "clap",
    "knock",
    "footsteps",
    "explosion",
    // Animals
    "dog",
    "bark",
    "barking",
    "cat",
    "meow",
    "bird",
    "chirp",
    "animal",
    // Vehicles
    "car",
    "engine",
    "vehicle",
    "traffic",
    "siren",
    "horn",
    // Weather and liquids
    "rain",
    "water",
    "flowing",
    "wind",
    "thunder",
    // Household
    "door",
    "phone",
    "alarm",
    // Ambience
    "noise",
    "background",
    "ambient",
];

/// Groups of interchangeable terms
/// Matching is symmetric inside a group and never chains across groups
pub const SYNONYM_GROUPS: &[&[&str]] = &[
    &["speech", "voice", "talking", "speaking", "conversation"],
    &["music", "song", "melody", "instrument"],
    &["dog", "bark", "barking", "animal"],
    &["car", "vehicle", "engine"],
    &["water", "flowing", "rain"],
    &["noise", "background", "ambient"],
];

/// True when both terms appear in one synonym group
pub fn are_synonyms(a: &str, b: &str) -> bool {
    let a = a.to_lowercase();
    let b = b.to_lowercase();
    SYNONYM_GROUPS
        .iter()
        .any(|group| group.contains(&a.as_str()) && group.contains(&b.as_str()))
}

/// Relatedness used for duplicate suppression and label matching:
/// either string contains the other (case-insensitive) or they are synonyms
pub fn are_related(a: &str, b: &str) -> bool {
    let a = a.trim().to_lowercase();
    let b = b.trim().to_lowercase();
    if a.is_empty() || b.is_empty() {
        return false;
    }
    a.contains(&b) || b.contains(&a) || are_synonyms(&a, &b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_synonyms_within_group() {
        assert!(are_synonyms("speech", "voice"));
        assert!(are_synonyms("Voice", "CONVERSATION"));
        assert!(are_synonyms("dog", "barking"));
        assert!(!are_synonyms("dog", "music"));
    }

    #[test]
    fn test_no_chaining_across_groups() {
        // "rain" and "water" share a group, "water" and "noise" do not
        assert!(are_synonyms("rain", "water"));
        assert!(!are_synonyms("rain", "noise"));
    }

    #[test]
    fn test_related_by_substring() {
        assert!(are_related("dog", "dog barking"));
        assert!(are_related("Barking Dog", "dog"));
        assert!(!are_related("", "dog"));
        assert!(!are_related("piano", "guitar"));
    }

    #[test]
    fn test_vocabulary_is_lowercase_and_unique() {
        for (i, keyword) in SOUND_KEYWORDS.iter().enumerate() {
            assert_eq!(*keyword, keyword.to_lowercase());
            assert!(!SOUND_KEYWORDS[i + 1..].contains(keyword));
        }
    }
}
