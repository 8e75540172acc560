//! A memory sink that keeps every interaction it is offered.

use std::sync::Mutex;

use async_trait::async_trait;

use hamlet_contracts::{agent::AgentId, error::HamletResult, message::InteractionRecord};
use hamlet_core::traits::InteractionSink;

pub struct RecordingSink {
    name: String,
    records: Mutex<Vec<InteractionRecord>>,
}

impl RecordingSink {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            records: Mutex::new(Vec::new()),
        }
    }

    pub fn records(&self) -> Vec<InteractionRecord> {
        self.records.lock().expect("sink lock poisoned").clone()
    }

    pub fn len(&self) -> usize {
        self.records.lock().expect("sink lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Interactions `listener` has heard, oldest first.
    pub fn heard_by(&self, listener: &AgentId) -> Vec<InteractionRecord> {
        self.records
            .lock()
            .expect("sink lock poisoned")
            .iter()
            .filter(|r| &r.listener == listener)
            .cloned()
            .collect()
    }
}

#[async_trait]
impl InteractionSink for RecordingSink {
    fn name(&self) -> &str {
        &self.name
    }

    async fn record(&self, interaction: &InteractionRecord) -> HamletResult<()> {
        self.records
            .lock()
            .expect("sink lock poisoned")
            .push(interaction.clone());
        Ok(())
    }
}
