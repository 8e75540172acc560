//! The unit of scheduled work.

use std::{future::Future, sync::Arc};

use async_trait::async_trait;

use hamlet_contracts::{agent::AgentId, error::HamletResult};

/// An arbitrary asynchronous job: polling a feed, posting a summary,
/// checking thresholds. An `Err` (or a panic) marks the run as failed.
#[async_trait]
pub trait TaskHandler: Send + Sync {
    async fn run(&self) -> HamletResult<()>;
}

/// Adapter that lets a closure returning a future act as a `TaskHandler`.
pub struct FnTask<F>(F);

#[async_trait]
impl<F, Fut> TaskHandler for FnTask<F>
where
    F: Fn() -> Fut + Send + Sync,
    Fut: Future<Output = HamletResult<()>> + Send,
{
    async fn run(&self) -> HamletResult<()> {
        (self.0)().await
    }
}

/// Wrap a closure as a shareable handler.
///
/// ```rust,ignore
/// let handler = task_fn(move || {
///     let feed = feed.clone();
///     async move { feed.poll().await }
/// });
/// ```
pub fn task_fn<F, Fut>(f: F) -> Arc<dyn TaskHandler>
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = HamletResult<()>> + Send + 'static,
{
    Arc::new(FnTask(f))
}

/// Everything needed to register a task.
#[derive(Clone)]
pub struct TaskSpec {
    pub name: String,
    /// The agent on whose behalf the task runs.
    pub agent_id: AgentId,
    pub interval_ms: u64,
    pub handler: Arc<dyn TaskHandler>,
}

impl TaskSpec {
    pub fn new(
        name: impl Into<String>,
        agent_id: impl Into<AgentId>,
        interval_ms: u64,
        handler: Arc<dyn TaskHandler>,
    ) -> Self {
        Self {
            name: name.into(),
            agent_id: agent_id.into(),
            interval_ms,
            handler,
        }
    }
}
