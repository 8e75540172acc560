//! The scheduled task runner.
//!
//! Owns a static registry of named jobs, each with its own interval. A
//! periodic sweep runs every enabled job whose `next_run` has arrived:
//!
//! - success: `last_run = now`, `next_run = now + interval`
//! - failure: `last_run` untouched, `next_run = now + interval / 2`
//!
//! A failing or panicking handler never stops the sweep from reaching the
//! remaining tasks. Manual triggers ignore `enabled` and `next_run` and only
//! ever move `last_run`.

use std::{
    any::Any,
    collections::VecDeque,
    panic::AssertUnwindSafe,
    sync::{Arc, Mutex},
    time::Duration as StdDuration,
};

use chrono::{DateTime, Duration, Utc};
use futures::FutureExt;
use tokio::{
    sync::watch,
    task::JoinHandle,
    time::{interval, MissedTickBehavior},
};
use tracing::{debug, info, warn};

use hamlet_contracts::{
    config::SchedulerConfig,
    error::{HamletError, HamletResult},
    task::{TaskId, TaskInfo, TaskRunRecord, TaskTrigger},
};
use hamlet_core::clock::Clock;

use crate::handler::{TaskHandler, TaskSpec};

/// Counts for one pass of the periodic sweep.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepReport {
    pub ran: usize,
    pub succeeded: usize,
    pub failed: usize,
}

struct TaskEntry {
    info: TaskInfo,
    handler: Arc<dyn TaskHandler>,
}

struct RunnerInner {
    config: SchedulerConfig,
    clock: Arc<dyn Clock>,
    // Registration order is kept; name lookups resolve to the earliest entry.
    tasks: Mutex<Vec<TaskEntry>>,
    history: Mutex<VecDeque<TaskRunRecord>>,
}

struct Lifecycle {
    stop_tx: watch::Sender<bool>,
    // Retained but never aborted: an in-flight sweep always completes.
    _handle: JoinHandle<()>,
}

pub struct TaskRunner {
    inner: Arc<RunnerInner>,
    lifecycle: Mutex<Option<Lifecycle>>,
}

impl TaskRunner {
    pub fn new(config: SchedulerConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            inner: Arc::new(RunnerInner {
                config,
                clock,
                tasks: Mutex::new(Vec::new()),
                history: Mutex::new(VecDeque::new()),
            }),
            lifecycle: Mutex::new(None),
        }
    }

    /// Register a task. It first becomes due one interval from now.
    pub fn register_task(&self, spec: TaskSpec) -> TaskId {
        let id = TaskId::new();
        let now = self.inner.clock.now();
        let info = TaskInfo {
            id,
            name: spec.name,
            agent_id: spec.agent_id,
            interval_ms: spec.interval_ms,
            last_run: None,
            next_run: after(now, spec.interval_ms),
            enabled: true,
        };

        info!(
            task = %info.name,
            task_id = %id,
            agent_id = %info.agent_id,
            interval_ms = info.interval_ms,
            "task registered"
        );

        self.inner
            .tasks
            .lock()
            .expect("task registry lock poisoned")
            .push(TaskEntry {
                info,
                handler: spec.handler,
            });
        id
    }

    /// Toggle sweep eligibility. Returns `false` for an unknown id.
    pub fn set_task_enabled(&self, id: TaskId, enabled: bool) -> bool {
        let mut tasks = self.inner.tasks.lock().expect("task registry lock poisoned");
        match tasks.iter_mut().find(|t| t.info.id == id) {
            Some(entry) => {
                entry.info.enabled = enabled;
                debug!(task = %entry.info.name, enabled, "task eligibility changed");
                true
            }
            None => false,
        }
    }

    /// Run a task's handler now, regardless of `enabled` or `next_run`.
    ///
    /// Returns `false` if no task has that name or the handler fails.
    pub async fn trigger_task(&self, name: &str) -> bool {
        self.try_trigger_task(name).await.is_ok()
    }

    /// Like [`trigger_task`](Self::trigger_task), but says why it failed.
    pub async fn try_trigger_task(&self, name: &str) -> HamletResult<()> {
        let (id, handler) = {
            let tasks = self.inner.tasks.lock().expect("task registry lock poisoned");
            let entry = tasks
                .iter()
                .find(|t| t.info.name == name)
                .ok_or_else(|| HamletError::TaskNotFound {
                    name: name.to_string(),
                })?;
            (entry.info.id, Arc::clone(&entry.handler))
        };

        let outcome = self.inner.execute(id, name, handler, TaskTrigger::Manual).await;
        outcome.map_err(|reason| HamletError::TaskFailed {
            name: name.to_string(),
            reason,
        })
    }

    /// One pass over every enabled task whose `next_run` has arrived.
    pub async fn run_sweep(&self) -> SweepReport {
        self.inner.run_sweep().await
    }

    pub fn list_tasks(&self) -> Vec<TaskInfo> {
        let tasks = self.inner.tasks.lock().expect("task registry lock poisoned");
        tasks.iter().map(|t| t.info.clone()).collect()
    }

    pub fn task(&self, id: TaskId) -> Option<TaskInfo> {
        let tasks = self.inner.tasks.lock().expect("task registry lock poisoned");
        tasks.iter().find(|t| t.info.id == id).map(|t| t.info.clone())
    }

    /// Most recent run records, newest first.
    pub fn history(&self, limit: usize) -> Vec<TaskRunRecord> {
        let history = self.inner.history.lock().expect("history lock poisoned");
        history.iter().rev().take(limit).cloned().collect()
    }

    /// Start the periodic sweep. A no-op when already running.
    ///
    /// Must be called from inside a tokio runtime.
    pub fn start(&self) {
        let mut lifecycle = self.lifecycle.lock().expect("lifecycle lock poisoned");
        if lifecycle.is_some() {
            debug!("task runner already running");
            return;
        }

        let (stop_tx, mut stop_rx) = watch::channel(false);
        let inner = Arc::clone(&self.inner);
        let period = inner.config.sweep_interval().max(StdDuration::from_millis(1));

        let handle = tokio::spawn(async move {
            let mut ticker = interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // The first tick completes immediately; the first sweep waits a full period.
            ticker.tick().await;

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        let report = inner.run_sweep().await;
                        if report.ran > 0 {
                            debug!(
                                ran = report.ran,
                                succeeded = report.succeeded,
                                failed = report.failed,
                                "sweep complete"
                            );
                        }
                    }
                    changed = stop_rx.changed() => {
                        if changed.is_err() || *stop_rx.borrow() {
                            break;
                        }
                    }
                }
            }
            debug!("task sweep loop exited");
        });

        info!(
            sweep_interval_ms = self.inner.config.sweep_interval_ms,
            "task runner started"
        );
        *lifecycle = Some(Lifecycle {
            stop_tx,
            _handle: handle,
        });
    }

    /// Stop future sweeps. Safe to call when already stopped.
    pub fn stop(&self) {
        let mut lifecycle = self.lifecycle.lock().expect("lifecycle lock poisoned");
        if let Some(running) = lifecycle.take() {
            // A closed receiver means the loop already exited.
            let _ = running.stop_tx.send(true);
            info!("task runner stopped");
        }
    }

    pub fn is_running(&self) -> bool {
        self.lifecycle
            .lock()
            .expect("lifecycle lock poisoned")
            .is_some()
    }
}

impl Drop for TaskRunner {
    fn drop(&mut self) {
        self.stop();
    }
}

impl RunnerInner {
    async fn run_sweep(&self) -> SweepReport {
        let now = self.clock.now();
        let due: Vec<(TaskId, String, Arc<dyn TaskHandler>)> = {
            let tasks = self.tasks.lock().expect("task registry lock poisoned");
            tasks
                .iter()
                .filter(|t| t.info.enabled && t.info.next_run <= now)
                .map(|t| (t.info.id, t.info.name.clone(), Arc::clone(&t.handler)))
                .collect()
        };

        let mut report = SweepReport::default();
        for (id, name, handler) in due {
            report.ran += 1;
            match self.execute(id, &name, handler, TaskTrigger::Sweep).await {
                Ok(()) => report.succeeded += 1,
                Err(_) => report.failed += 1,
            }
        }
        report
    }

    /// Run one handler, apply the schedule update for `trigger`, and append
    /// a history record. The error is the failure message.
    async fn execute(
        &self,
        id: TaskId,
        name: &str,
        handler: Arc<dyn TaskHandler>,
        trigger: TaskTrigger,
    ) -> Result<(), String> {
        let started_at = self.clock.now();
        debug!(task = %name, trigger = ?trigger, "task run starting");

        let outcome = match AssertUnwindSafe(handler.run()).catch_unwind().await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(e)) => Err(e.to_string()),
            Err(panic) => Err(format!("handler panicked: {}", panic_message(panic.as_ref()))),
        };

        let finished_at = self.clock.now();
        self.apply_outcome(id, name, trigger, finished_at, &outcome);
        self.record(TaskRunRecord {
            task_id: id,
            name: name.to_string(),
            trigger,
            started_at,
            finished_at,
            ok: outcome.is_ok(),
            error: outcome.as_ref().err().cloned(),
        });
        outcome
    }

    fn apply_outcome(
        &self,
        id: TaskId,
        name: &str,
        trigger: TaskTrigger,
        now: DateTime<Utc>,
        outcome: &Result<(), String>,
    ) {
        let mut tasks = self.tasks.lock().expect("task registry lock poisoned");
        let Some(entry) = tasks.iter_mut().find(|t| t.info.id == id) else {
            return;
        };
        let info = &mut entry.info;

        match (outcome, trigger) {
            (Ok(()), TaskTrigger::Sweep) => {
                info.last_run = Some(now);
                info.next_run = after(now, info.interval_ms);
            }
            (Ok(()), TaskTrigger::Manual) => {
                info.last_run = Some(now);
            }
            (Err(reason), TaskTrigger::Sweep) => {
                // Halved, not exponential, and never capped.
                let retry_in = millis(info.interval_ms / 2);
                info.next_run = after(now, info.interval_ms / 2);
                warn!(
                    task = %name,
                    error = %reason,
                    retry_in_ms = retry_in.num_milliseconds(),
                    "task failed, retrying at half interval"
                );
            }
            (Err(reason), TaskTrigger::Manual) => {
                warn!(task = %name, error = %reason, "manually triggered task failed");
            }
        }
    }

    fn record(&self, run: TaskRunRecord) {
        let capacity = self.config.history_capacity;
        if capacity == 0 {
            return;
        }
        let mut history = self.history.lock().expect("history lock poisoned");
        while history.len() >= capacity {
            history.pop_front();
        }
        history.push_back(run);
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

fn millis(ms: u64) -> Duration {
    Duration::milliseconds(i64::try_from(ms).unwrap_or(i64::MAX))
}

/// `now + ms`, pinned to the end of time instead of overflowing.
fn after(now: DateTime<Utc>, ms: u64) -> DateTime<Utc> {
    now.checked_add_signed(millis(ms))
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}
