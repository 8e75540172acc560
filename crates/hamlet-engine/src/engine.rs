//! The agent tick engine.
//!
//! Every cycle the engine walks all registered agents in fixed-size batches.
//! Batch members are decided concurrently; batches run one after another, so
//! at most `batch_size` agents talk to the world or the model at once.
//!
//! Per agent:
//!
//!   claim → snapshot → skip checks → decide → execute → publish
//!
//! Decision rules, first match wins:
//!
//! 1. Urgent inbox message: relayed as speech, significant, ignores cooldowns.
//!    Messages not acted on stay queued on the agent for later cycles, and an
//!    urgent message the world refuses goes back to the front of that queue.
//! 2. Social: nearby agents, not just out of a conversation, interaction roll.
//!    A second roll (gated by the rate limiter and model availability) hands
//!    the choice to the language model; otherwise approach the closest agent.
//! 3. Activity: no recent activity, activity roll. Special activities first,
//!    then the shared pool.
//! 4. Wander: sometimes home to the preferred zone, otherwise around here.
//!
//! No error leaves a cycle. Collaborator failures degrade the one agent they
//! touch: a decision the world refuses is replaced by a wander in the current
//! zone, and only a failed wander (or an unreadable snapshot) marks the agent
//! failed. A panic while deciding one agent is caught and reported as a failure.

use std::{
    collections::{BTreeMap, VecDeque},
    panic::AssertUnwindSafe,
    sync::{Arc, Mutex},
    time::Duration as StdDuration,
};

use chrono::{DateTime, Duration, Utc};
use futures::{future::join_all, FutureExt};
use serde_json::json;
use tokio::{
    sync::watch,
    task::JoinHandle,
    time::{interval, MissedTickBehavior},
};
use tracing::{debug, error, info, warn};

use hamlet_alerts::DedupStore;
use hamlet_contracts::{
    agent::{AgentId, AgentRuntimeState, CharacterProfile, InProgressOperation},
    config::{ParserConfig, RateLimitConfig, TickConfig},
    decision::{Decision, DecisionOutcome, DecisionSource},
    error::{HamletError, HamletResult},
    message::{CoordinatorMessage, InteractionRecord},
    world::{ActivityUpdate, WorldSnapshot},
};
use hamlet_core::{
    clock::{Clock, SystemClock},
    random::{RandomSource, SeededRandom},
    rate_limit::RateLimiter,
    sink::BestEffortSinks,
    traits::{Coordinator, InteractionSink, LanguageModel, WorldSync},
};
use hamlet_parser::{detect_emotion, DecisionParser};

use crate::{
    activity::{pick_activity, ActivityPool},
    prompt::build_request,
    report::{CycleReport, SkipReason},
    roster::CharacterRoster,
};

/// Operation name the engine claims while deciding for an agent.
pub const DECIDE_OPERATION: &str = "decide";

/// Coordinator broadcast kind used for significant speech.
const SPEECH_BROADCAST_KIND: &str = "speech";

enum AgentStep {
    Decided(DecisionOutcome),
    Skipped(SkipReason),
}

/// The context one decision is made in.
struct DecisionInputs<'a> {
    agent_id: &'a AgentId,
    character: &'a CharacterProfile,
    snapshot: &'a WorldSnapshot,
    now: DateTime<Utc>,
}

type Registry = Mutex<BTreeMap<AgentId, AgentRuntimeState>>;

struct EngineInner {
    config: TickConfig,
    world: Arc<dyn WorldSync>,
    model: Option<Arc<dyn LanguageModel>>,
    coordinator: Option<Arc<dyn Coordinator>>,
    sinks: BestEffortSinks,
    limiter: Arc<RateLimiter>,
    parser: DecisionParser,
    roster: CharacterRoster,
    pool: ActivityPool,
    dedup: Option<Arc<DedupStore>>,
    random: Arc<dyn RandomSource>,
    clock: Arc<dyn Clock>,
    agents: Registry,
}

struct Lifecycle {
    stop_tx: watch::Sender<bool>,
    // Retained but never aborted: an in-flight cycle always completes.
    _handle: JoinHandle<()>,
}

/// Drives every registered agent on a fixed-period clock.
///
/// Construct with [`AgentTickEngine::builder`]. Step it manually with
/// [`run_cycle`](Self::run_cycle), or let [`start`](Self::start) run cycles
/// on the configured interval.
pub struct AgentTickEngine {
    inner: Arc<EngineInner>,
    lifecycle: Mutex<Option<Lifecycle>>,
}

impl AgentTickEngine {
    pub fn builder(world: Arc<dyn WorldSync>, roster: CharacterRoster) -> EngineBuilder {
        EngineBuilder::new(world, roster)
    }

    /// Attach runtime state for `agent_id` and announce its preferred zone.
    ///
    /// The profile is `character` if given, otherwise the roster entry for
    /// the id. With neither, nothing is registered and `false` is returned.
    pub async fn register_agent(
        &self,
        agent_id: AgentId,
        character: Option<CharacterProfile>,
    ) -> bool {
        let Some(character) =
            character.or_else(|| self.inner.roster.get(agent_id.as_str()).cloned())
        else {
            let err = HamletError::UnknownCharacter {
                agent_id: agent_id.to_string(),
            };
            error!(agent_id = %agent_id, error = %err, "agent registration skipped");
            return false;
        };

        let preferred_zone = character.preferred_zone.clone();
        self.inner
            .agents
            .lock()
            .expect("agent registry lock poisoned")
            .insert(agent_id.clone(), AgentRuntimeState::new(agent_id.clone(), character));

        if let Err(e) = self.inner.world.register_agent(&agent_id, &preferred_zone).await {
            warn!(agent_id = %agent_id, error = %e, "world did not accept agent registration");
        }

        info!(agent_id = %agent_id, preferred_zone = %preferred_zone, "agent registered");
        true
    }

    /// Run one cycle now, independent of the timer.
    pub async fn run_cycle(&self) -> CycleReport {
        self.inner.run_cycle().await
    }

    /// Mark an agent busy with an external operation (e.g. a conversation).
    ///
    /// Refused while another operation is still within its timeout.
    pub fn begin_operation(&self, agent_id: &AgentId, name: &str) -> bool {
        let now = self.inner.clock.now();
        let timeout = self.inner.config.operation_timeout();
        let mut agents = self.inner.agents.lock().expect("agent registry lock poisoned");
        let Some(state) = agents.get_mut(agent_id) else {
            return false;
        };
        if state
            .in_progress
            .as_ref()
            .is_some_and(|op| !op.is_expired(now, timeout))
        {
            return false;
        }
        state.in_progress = Some(InProgressOperation {
            name: name.to_string(),
            started_at: now,
        });
        true
    }

    /// Clear an agent's operation. Returns whether one was set.
    pub fn end_operation(&self, agent_id: &AgentId) -> bool {
        let mut agents = self.inner.agents.lock().expect("agent registry lock poisoned");
        agents
            .get_mut(agent_id)
            .and_then(|state| state.in_progress.take())
            .is_some()
    }

    pub fn agent_state(&self, agent_id: &AgentId) -> Option<AgentRuntimeState> {
        let agents = self.inner.agents.lock().expect("agent registry lock poisoned");
        agents.get(agent_id).cloned()
    }

    pub fn agent_ids(&self) -> Vec<AgentId> {
        let agents = self.inner.agents.lock().expect("agent registry lock poisoned");
        agents.keys().cloned().collect()
    }

    pub fn limiter(&self) -> &Arc<RateLimiter> {
        &self.inner.limiter
    }

    /// Start cycling on the configured interval. A no-op when running.
    ///
    /// Must be called from inside a tokio runtime.
    pub fn start(&self) {
        let mut lifecycle = self.lifecycle.lock().expect("lifecycle lock poisoned");
        if lifecycle.is_some() {
            debug!("tick engine already running");
            return;
        }

        let (stop_tx, mut stop_rx) = watch::channel(false);
        let inner = Arc::clone(&self.inner);
        let period = inner.config.interval().max(StdDuration::from_millis(1));

        let handle = tokio::spawn(async move {
            let mut ticker = interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            ticker.tick().await;

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        inner.run_cycle().await;
                    }
                    changed = stop_rx.changed() => {
                        if changed.is_err() || *stop_rx.borrow() {
                            break;
                        }
                    }
                }
            }
            debug!("tick loop exited");
        });

        info!(
            interval_ms = self.inner.config.interval_ms,
            batch_size = self.inner.config.batch_size,
            "tick engine started"
        );
        *lifecycle = Some(Lifecycle {
            stop_tx,
            _handle: handle,
        });
    }

    /// Prevent future cycles. Safe to call when already stopped.
    pub fn stop(&self) {
        let mut lifecycle = self.lifecycle.lock().expect("lifecycle lock poisoned");
        if let Some(running) = lifecycle.take() {
            let _ = running.stop_tx.send(true);
            info!("tick engine stopped");
        }
    }

    pub fn is_running(&self) -> bool {
        self.lifecycle
            .lock()
            .expect("lifecycle lock poisoned")
            .is_some()
    }
}

impl Drop for AgentTickEngine {
    fn drop(&mut self) {
        self.stop();
    }
}

// ── Cycle ─────────────────────────────────────────────────────────────────────

impl EngineInner {
    async fn run_cycle(&self) -> CycleReport {
        let mut report = CycleReport::new(self.clock.now());

        if self.config.pause_without_clients {
            match self.world.get_client_count().await {
                Ok(0) => {
                    debug!("no clients connected, cycle paused");
                    report.paused = true;
                    return report;
                }
                Ok(_) => {}
                Err(e) => warn!(error = %e, "client count unavailable, running cycle anyway"),
            }
        }

        let ids: Vec<AgentId> = {
            let agents = self.agents.lock().expect("agent registry lock poisoned");
            agents.keys().cloned().collect()
        };
        report.considered = ids.len();

        for batch in ids.chunks(self.config.batch_size.max(1)) {
            let results = join_all(batch.iter().map(|agent_id| async move {
                let step = AssertUnwindSafe(self.process_agent(agent_id))
                    .catch_unwind()
                    .await;
                (agent_id, step)
            }))
            .await;

            for (agent_id, step) in results {
                match step {
                    Ok(Ok(AgentStep::Decided(outcome))) => report.decided.push(outcome),
                    Ok(Ok(AgentStep::Skipped(reason))) => {
                        debug!(agent_id = %agent_id, reason = ?reason, "agent skipped");
                        report.skipped.push((agent_id.clone(), reason));
                    }
                    Ok(Err(e)) => {
                        warn!(agent_id = %agent_id, error = %e, "agent processing failed");
                        report.failed.push(agent_id.clone());
                    }
                    Err(_) => {
                        warn!(agent_id = %agent_id, "agent processing panicked");
                        report.failed.push(agent_id.clone());
                    }
                }
            }
        }

        info!(
            considered = report.considered,
            decided = report.decided.len(),
            skipped = report.skipped.len(),
            failed = report.failed.len(),
            "tick cycle complete"
        );
        report
    }

    async fn process_agent(&self, agent_id: &AgentId) -> HamletResult<AgentStep> {
        let now = self.clock.now();

        let character = {
            let mut agents = self.agents.lock().expect("agent registry lock poisoned");
            let state = agents
                .get_mut(agent_id)
                .ok_or_else(|| HamletError::UnknownCharacter {
                    agent_id: agent_id.to_string(),
                })?;

            if let Some(op) = &state.in_progress {
                if !op.is_expired(now, self.config.operation_timeout()) {
                    return Ok(AgentStep::Skipped(SkipReason::Busy));
                }
                warn!(
                    agent_id = %agent_id,
                    operation = %op.name,
                    started_at = %op.started_at,
                    "stale operation cleared"
                );
            }
            state.in_progress = Some(InProgressOperation {
                name: DECIDE_OPERATION.to_string(),
                started_at: now,
            });
            state.character.clone()
        };
        let _claim = DecisionClaim {
            agents: &self.agents,
            agent_id,
            started_at: now,
        };

        let Some(snapshot) = self.world.get_agent_state(agent_id).await? else {
            return Ok(AgentStep::Skipped(SkipReason::NoSnapshot));
        };
        if snapshot.is_mid_activity(now) {
            return Ok(AgentStep::Skipped(SkipReason::MidActivity));
        }
        if snapshot.is_moving {
            return Ok(AgentStep::Skipped(SkipReason::Moving));
        }

        let inputs = DecisionInputs {
            agent_id,
            character: &character,
            snapshot: &snapshot,
            now,
        };
        let mut inbox = self.collect_inbox(agent_id).await;
        let executed = self.decide_and_execute(&inputs, &mut inbox).await;
        self.keep_pending(agent_id, inbox);
        let outcome = executed?;

        {
            let mut agents = self.agents.lock().expect("agent registry lock poisoned");
            if let Some(state) = agents.get_mut(agent_id) {
                state.last_decision_time = Some(now);
            }
        }
        self.publish(&inputs, &outcome).await;

        debug!(
            agent_id = %agent_id,
            decision = outcome.decision.kind(),
            source = ?outcome.source,
            "agent decided"
        );
        Ok(AgentStep::Decided(outcome))
    }

    // ── Decide ────────────────────────────────────────────────────────────────

    async fn decide_and_execute(
        &self,
        inputs: &DecisionInputs<'_>,
        inbox: &mut VecDeque<CoordinatorMessage>,
    ) -> HamletResult<DecisionOutcome> {
        let (outcome, relayed) = self.decide(inputs, inbox).await;
        let Err(e) = self.execute(inputs, &outcome).await else {
            return Ok(outcome);
        };
        if let Some(message) = relayed {
            inbox.push_front(message);
        }
        if matches!(outcome.decision, Decision::Wander { .. }) {
            return Err(e);
        }
        warn!(
            agent_id = %inputs.agent_id,
            decision = outcome.decision.kind(),
            error = %e,
            "decision not executed, wandering instead"
        );
        let fallback = DecisionOutcome {
            agent_id: inputs.agent_id.clone(),
            decision: Decision::wander(inputs.snapshot.zone.clone()),
            source: DecisionSource::Fallback,
            significant: false,
        };
        self.execute(inputs, &fallback).await?;
        Ok(fallback)
    }

    /// Choose a decision for one agent. An urgent message relayed as speech
    /// is removed from `inbox` and returned alongside the outcome; a model
    /// turn consumes the whole inbox as history.
    async fn decide(
        &self,
        inputs: &DecisionInputs<'_>,
        inbox: &mut VecDeque<CoordinatorMessage>,
    ) -> (DecisionOutcome, Option<CoordinatorMessage>) {
        let DecisionInputs {
            agent_id,
            character,
            snapshot,
            now,
        } = *inputs;
        let outcome = |decision, source, significant| DecisionOutcome {
            agent_id: agent_id.clone(),
            decision,
            source,
            significant,
        };

        let urgent_index = inbox.iter().position(|m| m.priority.is_urgent());
        if let Some(urgent) = urgent_index.and_then(|index| inbox.remove(index)) {
            let decision = Decision::speak(&urgent.content, detect_emotion(&urgent.content));
            return (outcome(decision, DecisionSource::Inbox, true), Some(urgent));
        }

        let just_left_conversation = snapshot
            .last_conversation_at
            .is_some_and(|at| now - at < self.config.conversation_cooldown());
        let recent_activity = snapshot
            .last_activity_at
            .is_some_and(|at| now - at < self.config.activity_cooldown());

        if let Some(closest) = snapshot.nearby_agents.first() {
            if !just_left_conversation && self.random.chance(character.interaction_chance) {
                if let Some(model) = self.model_for_social_turn() {
                    let (decision, source) =
                        self.consult_model(model, inputs, inbox.make_contiguous()).await;
                    inbox.clear();
                    return (outcome(decision, source, false), None);
                }
                let decision = Decision::approach(closest.clone());
                return (outcome(decision, DecisionSource::Rule, false), None);
            }
        }

        if !recent_activity && self.random.chance(character.activity_chance) {
            if let Some(decision) = pick_activity(
                character,
                &self.pool,
                self.parser.config(),
                self.random.as_ref(),
            ) {
                return (outcome(decision, DecisionSource::Rule, false), None);
            }
        }

        let zone = if snapshot.zone != character.preferred_zone
            && self.random.chance(self.config.return_home_chance)
        {
            &character.preferred_zone
        } else {
            &snapshot.zone
        };
        let decision = Decision::wander(zone.clone());
        (outcome(decision, DecisionSource::Rule, false), None)
    }

    /// Roll for a model-assisted turn. The rate limiter slot is only taken
    /// once the roll has passed and a model is available.
    fn model_for_social_turn(&self) -> Option<&Arc<dyn LanguageModel>> {
        if !self.random.chance(self.config.llm_probability) {
            return None;
        }
        let model = self.model.as_ref().filter(|m| m.is_available())?;
        if !self.limiter.try_acquire() {
            debug!("model call budget exhausted for this window");
            return None;
        }
        Some(model)
    }

    async fn consult_model(
        &self,
        model: &Arc<dyn LanguageModel>,
        inputs: &DecisionInputs<'_>,
        inbox: &[CoordinatorMessage],
    ) -> (Decision, DecisionSource) {
        let request = build_request(
            inputs.character,
            inputs.snapshot,
            inbox,
            &self.parser.config().zones,
            self.config.max_tokens,
            inputs.now,
        );

        let response = match model.generate(request).await {
            Ok(response) => response,
            Err(e) => {
                warn!(agent_id = %inputs.agent_id, error = %e, "model call failed, wandering instead");
                return (
                    Decision::wander(inputs.snapshot.zone.clone()),
                    DecisionSource::Fallback,
                );
            }
        };

        let decision = self.parser.parse(&response.text, Some(inputs.snapshot));
        if let Decision::Speak { message, .. } = &decision {
            let repeated = self
                .dedup
                .as_ref()
                .is_some_and(|dedup| dedup.check_and_remember(message));
            if repeated {
                if let Some(closest) = inputs.snapshot.nearby_agents.first() {
                    debug!(agent_id = %inputs.agent_id, "repeated model speech replaced by approach");
                    return (Decision::approach(closest.clone()), DecisionSource::Rule);
                }
            }
        }
        (decision, DecisionSource::Model)
    }

    /// Messages queued from earlier cycles, followed by a fresh read from the
    /// coordinator. The fresh read is skipped while a queued urgent message
    /// is still waiting to be relayed.
    async fn collect_inbox(&self, agent_id: &AgentId) -> VecDeque<CoordinatorMessage> {
        let mut inbox = {
            let mut agents = self.agents.lock().expect("agent registry lock poisoned");
            agents
                .get_mut(agent_id)
                .map(|state| std::mem::take(&mut state.pending_messages))
                .unwrap_or_default()
        };
        if !inbox.iter().any(|m| m.priority.is_urgent()) {
            inbox.extend(self.read_inbox(agent_id).await);
        }
        inbox
    }

    /// Store what the cycle did not act on. Beyond `inbox_limit` entries the
    /// oldest non-urgent messages are dropped first.
    fn keep_pending(&self, agent_id: &AgentId, mut inbox: VecDeque<CoordinatorMessage>) {
        let limit = self.config.inbox_limit.max(1);
        let mut dropped = 0usize;
        while inbox.len() > limit {
            let oldest_routine = inbox.iter().position(|m| !m.priority.is_urgent());
            match oldest_routine {
                Some(index) => inbox.remove(index),
                None => inbox.pop_front(),
            };
            dropped += 1;
        }
        if dropped > 0 {
            warn!(agent_id = %agent_id, dropped, "pending inbox full, oldest messages dropped");
        }

        let mut agents = self.agents.lock().expect("agent registry lock poisoned");
        if let Some(state) = agents.get_mut(agent_id) {
            state.pending_messages = inbox;
        }
    }

    async fn read_inbox(&self, agent_id: &AgentId) -> Vec<CoordinatorMessage> {
        let Some(coordinator) = &self.coordinator else {
            return Vec::new();
        };
        match coordinator.get_messages(agent_id, self.config.inbox_limit).await {
            Ok(messages) => messages,
            Err(e) => {
                warn!(agent_id = %agent_id, error = %e, "inbox unavailable");
                Vec::new()
            }
        }
    }

    // ── Execute ───────────────────────────────────────────────────────────────

    async fn execute(
        &self,
        inputs: &DecisionInputs<'_>,
        outcome: &DecisionOutcome,
    ) -> HamletResult<()> {
        let agent_id = inputs.agent_id;
        let snapshot = inputs.snapshot;

        match &outcome.decision {
            Decision::Wander { zone } => {
                let destination = self.world.get_wander_destination(zone).await?;
                self.world.send_move(agent_id, destination.x, destination.y).await?;
                if !snapshot.nearby_agents.is_empty() {
                    if let Err(e) = self.world.record_conversation_end(agent_id).await {
                        warn!(agent_id = %agent_id, error = %e, "conversation end not recorded");
                    }
                }
            }
            Decision::Approach { target } => {
                self.world.send_approach(agent_id, target).await?;
            }
            Decision::Speak { message, emotion } => {
                self.world.send_speak(agent_id, message, *emotion).await?;
                for listener in &snapshot.nearby_agents {
                    self.sinks.offer(InteractionRecord {
                        speaker: agent_id.clone(),
                        listener: listener.clone(),
                        message: message.clone(),
                        emotion: *emotion,
                        significant: outcome.significant,
                        at: inputs.now,
                    });
                }
                if outcome.significant {
                    if let Some(coordinator) = &self.coordinator {
                        let data = json!({ "emotion": emotion, "zone": snapshot.zone });
                        if let Err(e) = coordinator
                            .broadcast(agent_id, SPEECH_BROADCAST_KIND, message, data)
                            .await
                        {
                            warn!(agent_id = %agent_id, error = %e, "speech broadcast failed");
                        }
                    }
                }
            }
            Decision::Activity {
                description,
                emoji,
                duration_ms,
            } => {
                let until = inputs
                    .now
                    .checked_add_signed(millis(*duration_ms))
                    .unwrap_or(DateTime::<Utc>::MAX_UTC);
                let update = ActivityUpdate {
                    description: description.clone(),
                    emoji: emoji.clone(),
                    until,
                };
                self.world.update_agent_activity(agent_id, update).await?;
            }
            Decision::Idle => {}
        }
        Ok(())
    }

    /// Share the executed decision with other agents, best-effort.
    async fn publish(&self, inputs: &DecisionInputs<'_>, outcome: &DecisionOutcome) {
        let Some(coordinator) = &self.coordinator else {
            return;
        };
        let key = format!("agent:{}:last_decision", inputs.agent_id);
        let value = json!({
            "decision": outcome.decision,
            "source": outcome.source,
            "at": inputs.now,
        });
        if let Err(e) = coordinator.set_shared_context(&key, value).await {
            warn!(agent_id = %inputs.agent_id, error = %e, "shared context not updated");
        }
    }
}

/// Releases the engine's own decide claim when processing ends, however it
/// ends. A claim that was superseded in the meantime is left alone.
struct DecisionClaim<'a> {
    agents: &'a Registry,
    agent_id: &'a AgentId,
    started_at: DateTime<Utc>,
}

impl Drop for DecisionClaim<'_> {
    fn drop(&mut self) {
        let Ok(mut agents) = self.agents.lock() else {
            return;
        };
        if let Some(state) = agents.get_mut(self.agent_id) {
            let ours = state
                .in_progress
                .as_ref()
                .is_some_and(|op| op.name == DECIDE_OPERATION && op.started_at == self.started_at);
            if ours {
                state.in_progress = None;
            }
        }
    }
}

fn millis(ms: u64) -> Duration {
    Duration::milliseconds(i64::try_from(ms).unwrap_or(i64::MAX))
}

// ── Builder ───────────────────────────────────────────────────────────────────

/// Assembles an [`AgentTickEngine`]. Only the world and the roster are
/// required; everything else has a working default.
pub struct EngineBuilder {
    world: Arc<dyn WorldSync>,
    roster: CharacterRoster,
    config: TickConfig,
    parser_config: ParserConfig,
    model: Option<Arc<dyn LanguageModel>>,
    coordinator: Option<Arc<dyn Coordinator>>,
    sinks: BestEffortSinks,
    limiter: Option<Arc<RateLimiter>>,
    pool: ActivityPool,
    dedup: Option<Arc<DedupStore>>,
    random: Option<Arc<dyn RandomSource>>,
    clock: Option<Arc<dyn Clock>>,
}

impl EngineBuilder {
    fn new(world: Arc<dyn WorldSync>, roster: CharacterRoster) -> Self {
        Self {
            world,
            roster,
            config: TickConfig::default(),
            parser_config: ParserConfig::default(),
            model: None,
            coordinator: None,
            sinks: BestEffortSinks::new(),
            limiter: None,
            pool: ActivityPool::default(),
            dedup: None,
            random: None,
            clock: None,
        }
    }

    pub fn config(mut self, config: TickConfig) -> Self {
        self.config = config;
        self
    }

    pub fn parser_config(mut self, config: ParserConfig) -> Self {
        self.parser_config = config;
        self
    }

    pub fn model(mut self, model: Arc<dyn LanguageModel>) -> Self {
        self.model = Some(model);
        self
    }

    pub fn coordinator(mut self, coordinator: Arc<dyn Coordinator>) -> Self {
        self.coordinator = Some(coordinator);
        self
    }

    pub fn sink(mut self, sink: Arc<dyn InteractionSink>) -> Self {
        self.sinks.push(sink);
        self
    }

    /// Share a limiter with other model callers (e.g. task handlers).
    pub fn limiter(mut self, limiter: Arc<RateLimiter>) -> Self {
        self.limiter = Some(limiter);
        self
    }

    pub fn activity_pool(mut self, pool: ActivityPool) -> Self {
        self.pool = pool;
        self
    }

    pub fn dedup(mut self, dedup: Arc<DedupStore>) -> Self {
        self.dedup = Some(dedup);
        self
    }

    pub fn random(mut self, random: Arc<dyn RandomSource>) -> Self {
        self.random = Some(random);
        self
    }

    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    pub fn build(self) -> AgentTickEngine {
        let clock: Arc<dyn Clock> = match self.clock {
            Some(clock) => clock,
            None => Arc::new(SystemClock),
        };
        let random: Arc<dyn RandomSource> = match self.random {
            Some(random) => random,
            None => Arc::new(SeededRandom::from_entropy()),
        };
        let limiter = self.limiter.unwrap_or_else(|| {
            Arc::new(RateLimiter::new(&RateLimitConfig::default(), Arc::clone(&clock)))
        });

        AgentTickEngine {
            inner: Arc::new(EngineInner {
                config: self.config,
                world: self.world,
                model: self.model,
                coordinator: self.coordinator,
                sinks: self.sinks,
                limiter,
                parser: DecisionParser::new(self.parser_config, Arc::clone(&random)),
                roster: self.roster,
                pool: self.pool,
                dedup: self.dedup,
                random,
                clock,
                agents: Mutex::new(BTreeMap::new()),
            }),
            lifecycle: Mutex::new(None),
        }
    }
}
