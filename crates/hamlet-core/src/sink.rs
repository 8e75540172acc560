//! Best-effort fan-out to memory and relationship sinks.
//!
//! Writes are detached onto the tokio runtime: the caller never waits for a
//! sink and never sees its failure. Failures are logged at `warn`.

use std::sync::Arc;

use tracing::{debug, warn};

use hamlet_contracts::message::InteractionRecord;

use crate::traits::InteractionSink;

#[derive(Clone, Default)]
pub struct BestEffortSinks {
    sinks: Vec<Arc<dyn InteractionSink>>,
}

impl BestEffortSinks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, sink: Arc<dyn InteractionSink>) {
        self.sinks.push(sink);
    }

    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }

    /// Offer `record` to every sink without waiting.
    ///
    /// Must be called from inside a tokio runtime.
    pub fn offer(&self, record: InteractionRecord) {
        for sink in &self.sinks {
            let sink = Arc::clone(sink);
            let record = record.clone();
            tokio::spawn(async move {
                match sink.record(&record).await {
                    Ok(()) => debug!(
                        sink = sink.name(),
                        speaker = %record.speaker,
                        listener = %record.listener,
                        "interaction recorded"
                    ),
                    Err(e) => warn!(
                        sink = sink.name(),
                        speaker = %record.speaker,
                        error = %e,
                        "interaction sink write failed"
                    ),
                }
            });
        }
    }
}
