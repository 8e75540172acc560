//! A language model that replays canned replies.

use std::sync::{
    atomic::{AtomicBool, AtomicUsize, Ordering},
    Mutex,
};

use async_trait::async_trait;

use hamlet_contracts::{
    error::{HamletError, HamletResult},
    message::{GenerateRequest, GenerateResponse},
};
use hamlet_core::traits::LanguageModel;

/// Returns its replies in order, wrapping around at the end. Every request is
/// kept for inspection.
pub struct ScriptedModel {
    replies: Vec<String>,
    cursor: AtomicUsize,
    failing: AtomicBool,
    requests: Mutex<Vec<GenerateRequest>>,
}

impl ScriptedModel {
    pub fn new(replies: Vec<String>) -> Self {
        Self {
            replies,
            cursor: AtomicUsize::new(0),
            failing: AtomicBool::new(false),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// While failing, every call returns `HamletError::Model`.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn calls(&self) -> usize {
        self.requests.lock().expect("request log lock poisoned").len()
    }

    pub fn requests(&self) -> Vec<GenerateRequest> {
        self.requests
            .lock()
            .expect("request log lock poisoned")
            .clone()
    }
}

#[async_trait]
impl LanguageModel for ScriptedModel {
    async fn generate(&self, request: GenerateRequest) -> HamletResult<GenerateResponse> {
        self.requests
            .lock()
            .expect("request log lock poisoned")
            .push(request);

        if self.failing.load(Ordering::SeqCst) {
            return Err(HamletError::Model {
                reason: "scripted outage".to_string(),
            });
        }
        if self.replies.is_empty() {
            return Err(HamletError::Model {
                reason: "no scripted replies".to_string(),
            });
        }

        let index = self.cursor.fetch_add(1, Ordering::SeqCst) % self.replies.len();
        Ok(GenerateResponse {
            text: self.replies[index].clone(),
        })
    }
}
