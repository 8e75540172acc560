//! Activity selection: a character's own special activities first, then
//! the shared weighted pool.

use hamlet_contracts::{
    agent::CharacterProfile,
    config::{ParserConfig, PoolActivity},
    decision::Decision,
};
use hamlet_core::random::RandomSource;

/// The global weighted list of everyday activities.
#[derive(Debug, Clone, Default)]
pub struct ActivityPool {
    entries: Vec<PoolActivity>,
}

impl ActivityPool {
    pub fn new(entries: Vec<PoolActivity>) -> Self {
        Self { entries }
    }

    pub fn is_empty(&self) -> bool {
        self.total_weight() == 0
    }

    pub fn entries(&self) -> &[PoolActivity] {
        &self.entries
    }

    fn total_weight(&self) -> usize {
        self.entries.iter().map(|e| e.weight as usize).sum()
    }

    /// Weighted pick. `None` when the pool is empty or all weights are zero.
    pub fn choose(&self, random: &dyn RandomSource) -> Option<&PoolActivity> {
        let total = self.total_weight();
        if total == 0 {
            return None;
        }
        let mut roll = random.next_below(total);
        for entry in &self.entries {
            let weight = entry.weight as usize;
            if roll < weight {
                return Some(entry);
            }
            roll -= weight;
        }
        None
    }
}

/// Roll each special activity in order; the first that triggers wins.
/// Falls through to the pool, whose durations come from the parser bounds.
pub fn pick_activity(
    character: &CharacterProfile,
    pool: &ActivityPool,
    bounds: &ParserConfig,
    random: &dyn RandomSource,
) -> Option<Decision> {
    if let Some(special) = character
        .special_activities
        .iter()
        .find(|special| random.chance(special.chance))
    {
        return Some(Decision::activity(
            &special.description,
            special.emoji.clone(),
            special.duration_ms,
        ));
    }

    pool.choose(random).map(|entry| {
        let duration_ms = random.range_inclusive(bounds.activity_min_ms, bounds.activity_max_ms);
        Decision::activity(&entry.description, entry.emoji.clone(), duration_ms)
    })
}
