// Profiles Module
// Acoustic separation parameters per sound family

pub mod catalog;
pub mod types;

pub use catalog::{default_profile, list_profiles, lookup_profile, profile_name};
pub use types::{ProfileSummary, ProfileTemplate, SeparationAlgorithm, SeparationProfile};
