//! Character profiles, resolvable by agent id.

use std::collections::BTreeMap;

use hamlet_contracts::agent::CharacterProfile;

/// Lookup table of character profiles keyed by lowercase id.
#[derive(Debug, Clone, Default)]
pub struct CharacterRoster {
    profiles: BTreeMap<String, CharacterProfile>,
}

impl CharacterRoster {
    pub fn new(profiles: impl IntoIterator<Item = CharacterProfile>) -> Self {
        let mut roster = Self::default();
        for profile in profiles {
            roster.insert(profile);
        }
        roster
    }

    /// Add or replace a profile. Returns the profile it replaced, if any.
    pub fn insert(&mut self, profile: CharacterProfile) -> Option<CharacterProfile> {
        self.profiles.insert(profile.id.to_lowercase(), profile)
    }

    /// Resolve a profile by id, ignoring case.
    pub fn get(&self, id: &str) -> Option<&CharacterProfile> {
        self.profiles.get(&id.to_lowercase())
    }

    pub fn profiles(&self) -> impl Iterator<Item = &CharacterProfile> {
        self.profiles.values()
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }
}
