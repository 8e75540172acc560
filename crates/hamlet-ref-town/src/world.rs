//! An in-memory world.
//!
//! Agents occupy points on a flat plane partitioned into rectangular zones.
//! Moves complete instantly, so no agent is ever observed mid-walk. "Nearby"
//! means within `nearby_radius` of the agent, ordered closest first.

use std::{
    collections::BTreeMap,
    sync::{Arc, Mutex},
};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::debug;

use hamlet_contracts::{
    agent::AgentId,
    decision::Emotion,
    error::{HamletError, HamletResult},
    world::{ActivityUpdate, CurrentActivity, Position, WorldSnapshot},
};
use hamlet_core::{clock::Clock, random::RandomSource, traits::WorldSync};

use crate::town::Zone;

/// Default distance within which two agents see each other.
pub const DEFAULT_NEARBY_RADIUS: f64 = 15.0;

/// Something an agent said, as heard by the world.
#[derive(Debug, Clone, PartialEq)]
pub struct SpeechEvent {
    pub speaker: AgentId,
    pub message: String,
    pub emotion: Emotion,
    pub at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
struct Resident {
    position: Position,
    is_moving: bool,
    activity: Option<(CurrentActivity, String)>,
    last_conversation_at: Option<DateTime<Utc>>,
    last_activity_at: Option<DateTime<Utc>>,
}

impl Resident {
    fn at(position: Position) -> Self {
        Self {
            position,
            is_moving: false,
            activity: None,
            last_conversation_at: None,
            last_activity_at: None,
        }
    }
}

#[derive(Default)]
struct WorldState {
    residents: BTreeMap<AgentId, Resident>,
    clients: usize,
    speech: Vec<SpeechEvent>,
}

pub struct InMemoryWorld {
    zones: Vec<Zone>,
    default_zone: String,
    nearby_radius: f64,
    clock: Arc<dyn Clock>,
    random: Arc<dyn RandomSource>,
    state: Mutex<WorldState>,
}

impl InMemoryWorld {
    pub fn new(
        zones: Vec<Zone>,
        default_zone: impl Into<String>,
        clock: Arc<dyn Clock>,
        random: Arc<dyn RandomSource>,
    ) -> Self {
        Self {
            zones,
            default_zone: default_zone.into(),
            nearby_radius: DEFAULT_NEARBY_RADIUS,
            clock,
            random,
            state: Mutex::new(WorldState::default()),
        }
    }

    pub fn with_nearby_radius(mut self, radius: f64) -> Self {
        self.nearby_radius = radius;
        self
    }

    pub fn set_client_count(&self, clients: usize) {
        self.lock().clients = clients;
    }

    /// Put an agent at an exact position, registering it if needed.
    pub fn place_agent(&self, agent: &AgentId, position: Position) {
        let mut state = self.lock();
        state
            .residents
            .entry(agent.clone())
            .and_modify(|r| r.position = position)
            .or_insert_with(|| Resident::at(position));
    }

    pub fn set_moving(&self, agent: &AgentId, moving: bool) -> bool {
        match self.lock().residents.get_mut(agent) {
            Some(resident) => {
                resident.is_moving = moving;
                true
            }
            None => false,
        }
    }

    pub fn position_of(&self, agent: &AgentId) -> Option<Position> {
        self.lock().residents.get(agent).map(|r| r.position)
    }

    pub fn zone_of(&self, agent: &AgentId) -> Option<String> {
        let position = self.position_of(agent)?;
        Some(self.zone_at(position).to_string())
    }

    /// The emoji of the agent's current activity, if one is running.
    pub fn activity_emoji(&self, agent: &AgentId) -> Option<String> {
        let now = self.clock.now();
        let state = self.lock();
        let (activity, emoji) = state.residents.get(agent)?.activity.as_ref()?;
        (activity.until > now).then(|| emoji.clone())
    }

    /// Everything said so far, oldest first.
    pub fn speech_log(&self) -> Vec<SpeechEvent> {
        self.lock().speech.clone()
    }

    pub fn zones(&self) -> &[Zone] {
        &self.zones
    }

    fn zone_at(&self, position: Position) -> &str {
        self.zones
            .iter()
            .find(|z| z.contains(position))
            .map(|z| z.name.as_str())
            .unwrap_or(&self.default_zone)
    }

    fn zone_named(&self, name: &str) -> Option<&Zone> {
        self.zones.iter().find(|z| z.name == name)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, WorldState> {
        self.state.lock().expect("world state lock poisoned")
    }

    fn with_resident<T>(
        &self,
        agent: &AgentId,
        f: impl FnOnce(&mut Resident) -> T,
    ) -> HamletResult<T> {
        let mut state = self.lock();
        let resident = state
            .residents
            .get_mut(agent)
            .ok_or_else(|| unknown_agent(agent))?;
        Ok(f(resident))
    }
}

fn unknown_agent(agent: &AgentId) -> HamletError {
    HamletError::WorldSync {
        reason: format!("unknown agent '{}'", agent),
    }
}

fn distance(a: Position, b: Position) -> f64 {
    ((a.x - b.x).powi(2) + (a.y - b.y).powi(2)).sqrt()
}

#[async_trait]
impl WorldSync for InMemoryWorld {
    async fn get_agent_state(&self, agent: &AgentId) -> HamletResult<Option<WorldSnapshot>> {
        let state = self.lock();
        let Some(me) = state.residents.get(agent) else {
            return Ok(None);
        };

        let mut nearby: Vec<(f64, &AgentId)> = state
            .residents
            .iter()
            .filter(|(id, _)| *id != agent)
            .map(|(id, other)| (distance(me.position, other.position), id))
            .filter(|(d, _)| *d <= self.nearby_radius)
            .collect();
        nearby.sort_by(|a, b| a.0.total_cmp(&b.0));

        Ok(Some(WorldSnapshot {
            position: me.position,
            zone: self.zone_at(me.position).to_string(),
            nearby_agents: nearby.into_iter().map(|(_, id)| id.clone()).collect(),
            is_moving: me.is_moving,
            current_activity: me.activity.as_ref().map(|(a, _)| a.clone()),
            last_conversation_at: me.last_conversation_at,
            last_activity_at: me.last_activity_at,
        }))
    }

    /// New agents start at the center of their preferred zone. Re-registering
    /// an agent leaves it where it is.
    async fn register_agent(&self, agent: &AgentId, preferred_zone: &str) -> HamletResult<()> {
        let start = self
            .zone_named(preferred_zone)
            .or_else(|| self.zone_named(&self.default_zone))
            .map(Zone::center)
            .unwrap_or(Position { x: 0.0, y: 0.0 });

        let mut state = self.lock();
        state
            .residents
            .entry(agent.clone())
            .or_insert_with(|| Resident::at(start));
        debug!(agent_id = %agent, zone = %preferred_zone, "resident placed");
        Ok(())
    }

    async fn send_move(&self, agent: &AgentId, x: f64, y: f64) -> HamletResult<()> {
        self.with_resident(agent, |r| {
            r.position = Position { x, y };
            r.is_moving = false;
        })
    }

    /// Step right next to the target.
    async fn send_approach(&self, agent: &AgentId, target: &AgentId) -> HamletResult<()> {
        let destination = self
            .position_of(target)
            .ok_or_else(|| unknown_agent(target))?;
        self.with_resident(agent, |r| {
            r.position = Position {
                x: destination.x + 1.0,
                y: destination.y,
            };
        })
    }

    async fn send_speak(
        &self,
        agent: &AgentId,
        message: &str,
        emotion: Emotion,
    ) -> HamletResult<()> {
        let mut state = self.lock();
        if !state.residents.contains_key(agent) {
            return Err(unknown_agent(agent));
        }
        state.speech.push(SpeechEvent {
            speaker: agent.clone(),
            message: message.to_string(),
            emotion,
            at: self.clock.now(),
        });
        Ok(())
    }

    async fn update_agent_activity(
        &self,
        agent: &AgentId,
        update: ActivityUpdate,
    ) -> HamletResult<()> {
        let now = self.clock.now();
        self.with_resident(agent, |r| {
            r.activity = Some((
                CurrentActivity {
                    description: update.description,
                    until: update.until,
                },
                update.emoji,
            ));
            r.last_activity_at = Some(now);
        })
    }

    /// A uniformly random point inside `zone`, or inside the default zone
    /// when `zone` is unknown.
    async fn get_wander_destination(&self, zone: &str) -> HamletResult<Position> {
        let target = self
            .zone_named(zone)
            .or_else(|| self.zone_named(&self.default_zone))
            .ok_or_else(|| HamletError::WorldSync {
                reason: format!("no zone named '{}' and no default zone", zone),
            })?;
        Ok(target.point_at(self.random.next_f64(), self.random.next_f64()))
    }

    async fn record_conversation_end(&self, agent: &AgentId) -> HamletResult<()> {
        let now = self.clock.now();
        self.with_resident(agent, |r| r.last_conversation_at = Some(now))
    }

    async fn get_client_count(&self) -> HamletResult<usize> {
        Ok(self.lock().clients)
    }
}
