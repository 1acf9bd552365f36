// Sound profile catalog
// Static lookup from target terms to separation parameters

use super::types::{ProfileSummary, ProfileTemplate, SeparationAlgorithm, SeparationProfile};

/// Catalog rows, scanned in order; the first key found inside the target wins
const CATALOG: &[ProfileTemplate] = &[
    ProfileTemplate {
        name: "speech",
        keys: &["speech", "voice", "talking", "speaking", "conversation", "vocal", "singing"],
        low_hz: 85.0,
        high_hz: 4000.0,
        emphasis: &[150.0, 500.0, 1500.0, 2500.0],
        algorithm: SeparationAlgorithm::Harmonic,
        gain: 3.0,
        attenuation: 0.15,
    },
    ProfileTemplate {
        name: "music",
        keys: &["music", "song", "melody", "instrument"],
        low_hz: 60.0,
        high_hz: 12000.0,
        emphasis: &[220.0, 440.0, 880.0, 1760.0],
        algorithm: SeparationAlgorithm::Harmonic,
        gain: 2.5,
        attenuation: 0.3,
    },
    ProfileTemplate {
        name: "guitar",
        keys: &["guitar"],
        low_hz: 80.0,
        high_hz: 5000.0,
        emphasis: &[196.0, 330.0, 660.0],
        algorithm: SeparationAlgorithm::Harmonic,
        gain: 2.8,
        attenuation: 0.2,
    },
    ProfileTemplate {
        name: "piano",
        keys: &["piano"],
        low_hz: 27.0,
        high_hz: 4200.0,
        emphasis: &[262.0, 523.0, 1047.0],
        algorithm: SeparationAlgorithm::Harmonic,
        gain: 2.8,
        attenuation: 0.2,
    },
    ProfileTemplate {
        name: "violin",
        keys: &["violin", "string"],
        low_hz: 196.0,
        high_hz: 3500.0,
        emphasis: &[440.0, 880.0, 1320.0],
        algorithm: SeparationAlgorithm::Harmonic,
        gain: 2.8,
        attenuation: 0.2,
    },
    ProfileTemplate {
        name: "bass",
        keys: &["bass"],
        low_hz: 40.0,
        high_hz: 400.0,
        emphasis: &[55.0, 110.0, 220.0],
        algorithm: SeparationAlgorithm::Harmonic,
        gain: 3.0,
        attenuation: 0.15,
    },
    ProfileTemplate {
        name: "percussion",
        keys: &["drum", "percussion", "clap", "knock", "footstep"],
        low_hz: 40.0,
        high_hz: 8000.0,
        emphasis: &[60.0, 200.0, 3000.0],
        algorithm: SeparationAlgorithm::Spectral,
        gain: 2.5,
        attenuation: 0.25,
    },
    ProfileTemplate {
        name: "animal_bark",
        keys: &["dog", "bark", "animal"],
        low_hz: 200.0,
        high_hz: 4000.0,
        emphasis: &[500.0, 1000.0, 2000.0],
        algorithm: SeparationAlgorithm::Harmonic,
        gain: 3.0,
        attenuation: 0.15,
    },
    ProfileTemplate {
        name: "cat",
        keys: &["cat", "meow"],
        low_hz: 300.0,
        high_hz: 3000.0,
        emphasis: &[600.0, 1200.0],
        algorithm: SeparationAlgorithm::Harmonic,
        gain: 3.0,
        attenuation: 0.15,
    },
    ProfileTemplate {
        name: "bird",
        keys: &["bird", "chirp", "tweet"],
        low_hz: 1000.0,
        high_hz: 8000.0,
        emphasis: &[2000.0, 4000.0, 6000.0],
        algorithm: SeparationAlgorithm::Harmonic,
        gain: 3.0,
        attenuation: 0.1,
    },
    ProfileTemplate {
        name: "vehicle",
        keys: &["car", "engine", "vehicle", "traffic", "motor"],
        low_hz: 20.0,
        high_hz: 2000.0,
        emphasis: &[60.0, 120.0, 400.0],
        algorithm: SeparationAlgorithm::Spectral,
        gain: 2.5,
        attenuation: 0.2,
    },
    ProfileTemplate {
        name: "siren",
        keys: &["siren", "alarm", "horn"],
        low_hz: 500.0,
        high_hz: 3000.0,
        emphasis: &[800.0, 1600.0],
        algorithm: SeparationAlgorithm::Harmonic,
        gain: 2.8,
        attenuation: 0.2,
    },
    ProfileTemplate {
        name: "water",
        keys: &["water", "rain", "flowing", "stream"],
        low_hz: 200.0,
        high_hz: 10000.0,
        emphasis: &[1000.0, 4000.0],
        algorithm: SeparationAlgorithm::Spectral,
        gain: 2.2,
        attenuation: 0.3,
    },
    ProfileTemplate {
        name: "wind",
        keys: &["wind"],
        low_hz: 20.0,
        high_hz: 1000.0,
        emphasis: &[100.0, 300.0],
        algorithm: SeparationAlgorithm::Spectral,
        gain: 2.2,
        attenuation: 0.3,
    },
    ProfileTemplate {
        name: "impact",
        keys: &["thunder", "explosion"],
        low_hz: 20.0,
        high_hz: 300.0,
        emphasis: &[40.0, 80.0],
        algorithm: SeparationAlgorithm::Spectral,
        gain: 3.0,
        attenuation: 0.15,
    },
    ProfileTemplate {
        name: "door",
        keys: &["door"],
        low_hz: 50.0,
        high_hz: 5000.0,
        emphasis: &[150.0, 1000.0],
        algorithm: SeparationAlgorithm::Spectral,
        gain: 2.5,
        attenuation: 0.2,
    },
    ProfileTemplate {
        name: "phone",
        keys: &["phone"],
        low_hz: 400.0,
        high_hz: 4000.0,
        emphasis: &[440.0, 480.0, 1000.0],
        algorithm: SeparationAlgorithm::Harmonic,
        gain: 2.8,
        attenuation: 0.2,
    },
    ProfileTemplate {
        name: "ambience",
        keys: &["noise", "background", "ambient"],
        low_hz: 20.0,
        high_hz: 20000.0,
        emphasis: &[1000.0],
        algorithm: SeparationAlgorithm::Multiband,
        gain: 2.0,
        attenuation: 0.5,
    },
];

/// Used when no catalog key occurs in the target term
const DEFAULT_PROFILE: ProfileTemplate = ProfileTemplate {
    name: "default",
    keys: &[],
    low_hz: 100.0,
    high_hz: 8000.0,
    emphasis: &[1000.0],
    algorithm: SeparationAlgorithm::Spectral,
    gain: 2.5,
    attenuation: 0.2,
};

/// Find the catalog row for a term, if any key matches
fn find_template(term: &str) -> Option<&'static ProfileTemplate> {
    let term = term.to_lowercase();
    CATALOG
        .iter()
        .find(|entry| entry.keys.iter().any(|key| term.contains(key)))
}

/// Look up the separation profile for a target term
/// Deterministic and pure; unknown terms get the default profile
pub fn lookup_profile(term: &str) -> SeparationProfile {
    match find_template(term) {
        Some(entry) => entry.to_profile(),
        None => {
            log::warn!("No sound profile for '{}', using default", term);
            default_profile()
        }
    }
}

/// Name of the profile family a term resolves to ("default" when unmatched)
pub fn profile_name(term: &str) -> &'static str {
    find_template(term).map(|entry| entry.name).unwrap_or(DEFAULT_PROFILE.name)
}

/// The fallback profile for unrecognized terms
pub fn default_profile() -> SeparationProfile {
    DEFAULT_PROFILE.to_profile()
}

/// List every catalog entry, in lookup order, followed by the default
pub fn list_profiles() -> Vec<ProfileSummary> {
    CATALOG
        .iter()
        .chain(std::iter::once(&DEFAULT_PROFILE))
        .map(|entry| ProfileSummary {
            name: entry.name.to_string(),
            keys: entry.keys.iter().map(|k| k.to_string()).collect(),
            profile: entry.to_profile(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_profiles_valid() {
        for summary in list_profiles() {
            assert!(summary.profile.is_valid(), "invalid profile {}", summary.name);
            for f in &summary.profile.emphasis_frequencies {
                assert!(
                    summary.profile.contains(*f),
                    "{} emphasis {} out of range",
                    summary.name,
                    f
                );
            }
        }
    }

    #[test]
    fn test_synonyms_share_profile() {
        assert_eq!(lookup_profile("dog"), lookup_profile("barking"));
        assert_eq!(profile_name("barking"), "animal_bark");
        assert_eq!(lookup_profile("speech"), lookup_profile("voice"));
        assert_eq!(lookup_profile("car"), lookup_profile("engine"));
    }

    #[test]
    fn test_lookup_is_pure() {
        let first = lookup_profile("bird");
        for _ in 0..5 {
            assert_eq!(lookup_profile("bird"), first);
        }
    }

    #[test]
    fn test_case_insensitive_substring() {
        assert_eq!(profile_name("Barking DOG"), "animal_bark");
        assert_eq!(profile_name("vocals"), "speech");
    }

    #[test]
    fn test_default_profile() {
        let profile = lookup_profile("glass shattering");
        assert_eq!(profile_name("glass shattering"), "default");
        assert_eq!(profile.frequency_range, (100.0, 8000.0));
        assert_eq!(profile.emphasis_frequencies, vec![1000.0]);
        assert_eq!(profile.algorithm, SeparationAlgorithm::Spectral);
        assert!(profile.gain >= 2.0 && profile.gain <= 3.0);
        assert!(profile.noise_floor_attenuation >= 0.1 && profile.noise_floor_attenuation <= 0.3);
    }

    #[test]
    fn test_algorithms_assigned() {
        assert_eq!(lookup_profile("speech").algorithm, SeparationAlgorithm::Harmonic);
        assert_eq!(lookup_profile("rain").algorithm, SeparationAlgorithm::Spectral);
        assert_eq!(lookup_profile("background").algorithm, SeparationAlgorithm::Multiband);
    }
}
