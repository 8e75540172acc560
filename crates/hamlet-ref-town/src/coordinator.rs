//! An in-process coordinator: per-agent inboxes, a shared context map, and
//! logs of everything broadcast or alerted.

use std::{
    collections::{BTreeMap, HashMap, VecDeque},
    sync::{Arc, Mutex},
};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use tracing::debug;

use hamlet_contracts::{
    agent::AgentId,
    error::HamletResult,
    message::{CoordinatorMessage, MessagePriority},
};
use hamlet_core::{clock::Clock, traits::Coordinator};

#[derive(Debug, Clone, PartialEq)]
pub struct Broadcast {
    pub sender: AgentId,
    pub kind: String,
    pub text: String,
    pub data: Value,
    pub at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RaisedAlert {
    pub source: String,
    pub text: String,
    pub data: Value,
    pub at: DateTime<Utc>,
}

#[derive(Default)]
struct CoordinatorState {
    inboxes: HashMap<AgentId, VecDeque<CoordinatorMessage>>,
    context: BTreeMap<String, Value>,
    broadcasts: Vec<Broadcast>,
    alerts: Vec<RaisedAlert>,
}

pub struct InMemoryCoordinator {
    clock: Arc<dyn Clock>,
    state: Mutex<CoordinatorState>,
}

impl InMemoryCoordinator {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            state: Mutex::new(CoordinatorState::default()),
        }
    }

    /// Queue a message for `to`.
    pub fn send(
        &self,
        from: &AgentId,
        to: &AgentId,
        kind: &str,
        content: &str,
        priority: MessagePriority,
    ) {
        let message = CoordinatorMessage {
            from: from.clone(),
            kind: kind.to_string(),
            content: content.to_string(),
            priority,
            created_at: self.clock.now(),
        };
        self.lock()
            .inboxes
            .entry(to.clone())
            .or_default()
            .push_back(message);
    }

    pub fn pending(&self, agent: &AgentId) -> usize {
        self.lock().inboxes.get(agent).map_or(0, VecDeque::len)
    }

    pub fn context(&self, key: &str) -> Option<Value> {
        self.lock().context.get(key).cloned()
    }

    pub fn context_keys(&self) -> Vec<String> {
        self.lock().context.keys().cloned().collect()
    }

    pub fn broadcasts(&self) -> Vec<Broadcast> {
        self.lock().broadcasts.clone()
    }

    pub fn alerts(&self) -> Vec<RaisedAlert> {
        self.lock().alerts.clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, CoordinatorState> {
        self.state.lock().expect("coordinator state lock poisoned")
    }
}

#[async_trait]
impl Coordinator for InMemoryCoordinator {
    /// Reading drains: a message is delivered at most once.
    async fn get_messages(
        &self,
        agent: &AgentId,
        limit: usize,
    ) -> HamletResult<Vec<CoordinatorMessage>> {
        let mut state = self.lock();
        let Some(inbox) = state.inboxes.get_mut(agent) else {
            return Ok(Vec::new());
        };
        let take = limit.min(inbox.len());
        Ok(inbox.drain(..take).collect())
    }

    async fn set_shared_context(&self, key: &str, value: Value) -> HamletResult<()> {
        self.lock().context.insert(key.to_string(), value);
        Ok(())
    }

    async fn broadcast(
        &self,
        sender: &AgentId,
        kind: &str,
        text: &str,
        data: Value,
    ) -> HamletResult<()> {
        debug!(sender = %sender, kind = %kind, "broadcast");
        let at = self.clock.now();
        self.lock().broadcasts.push(Broadcast {
            sender: sender.clone(),
            kind: kind.to_string(),
            text: text.to_string(),
            data,
            at,
        });
        Ok(())
    }

    async fn alert(&self, source: &str, text: &str, data: Value) -> HamletResult<()> {
        let at = self.clock.now();
        self.lock().alerts.push(RaisedAlert {
            source: source.to_string(),
            text: text.to_string(),
            data,
            at,
        });
        Ok(())
    }
}
