// src/orchestrator.rs
//
// Single owner of the client-side pipeline state. All mutation funnels
// through refresh() and trigger_stage(); renderers only read cloned views.
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::engine::{EngineError, PipelineEngine};
use crate::models::{Lead, Stage, StageAck, StageRequest};
use crate::stats::{aggregate, StatusSnapshot};

/// Last-known-good picture of the engine's registry. Replaced wholesale on
/// every successful refresh, left untouched on failure.
#[derive(Debug, Clone, Default)]
pub struct PipelineView {
    pub leads: Vec<Lead>,
    pub snapshot: StatusSnapshot,
    pub engine_stats: HashMap<String, u64>,
    pub last_refreshed: Option<DateTime<Utc>>,
    pub last_failure: Option<String>,
}

impl PipelineView {
    /// Total as the engine reports it, which can exceed the windowed lead
    /// list the fetch endpoint returns.
    pub fn engine_total(&self) -> u64 {
        self.engine_stats.values().sum()
    }

    pub fn is_windowed(&self) -> bool {
        self.engine_total() > self.leads.len() as u64
    }
}

#[derive(Debug, Clone)]
pub enum Notice {
    Refreshed { total: u64 },
    RefreshFailed { error: String },
    StageAccepted { stage: Stage, ack: StageAck },
    StageFailed { stage: Stage, error: String },
    TriggerRejected { stage: Stage },
}

/// Where the orchestrator reports what happened. The console logs, tests
/// record.
pub trait PipelineObserver: Send + Sync {
    fn notice(&self, notice: Notice);
}

/// Default observer: everything goes to tracing, nothing to stdout.
pub struct LogObserver;

impl PipelineObserver for LogObserver {
    fn notice(&self, notice: Notice) {
        match notice {
            Notice::Refreshed { total } => debug!("🔄 State refreshed, {} leads tracked", total),
            Notice::RefreshFailed { error } => error!("❌ Refresh failed: {}", error),
            Notice::StageAccepted { stage, ack } => {
                info!("✅ Stage {} acknowledged: {}", stage, ack.summary())
            }
            Notice::StageFailed { stage, error } => {
                error!("❌ Stage {} failed: {}", stage, error)
            }
            Notice::TriggerRejected { stage } => {
                warn!("🚧 Stage {} rejected, another trigger is in flight", stage)
            }
        }
    }
}

/// Outcome of one trigger call. Failures are absorbed into the outcome so a
/// stage error never tears the console down.
#[derive(Debug, Clone)]
pub enum TriggerOutcome {
    Completed { ack: StageAck },
    Rejected,
    Failed { error: String },
}

// Releases the busy flag on every exit path, failed dispatches included.
struct BusyGuard<'a> {
    flag: &'a AtomicBool,
}

impl<'a> BusyGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
            .then_some(Self { flag })
    }
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::SeqCst);
    }
}

pub struct Orchestrator {
    engine: Box<dyn PipelineEngine>,
    view: Mutex<PipelineView>,
    busy: AtomicBool,
    observer: Arc<dyn PipelineObserver>,
    trigger_grace: Duration,
}

impl Orchestrator {
    pub fn new(engine: Box<dyn PipelineEngine>, trigger_grace: Duration) -> Self {
        Self::with_observer(engine, trigger_grace, Arc::new(LogObserver))
    }

    pub fn with_observer(
        engine: Box<dyn PipelineEngine>,
        trigger_grace: Duration,
        observer: Arc<dyn PipelineObserver>,
    ) -> Self {
        Self {
            engine,
            view: Mutex::new(PipelineView::default()),
            busy: AtomicBool::new(false),
            observer,
            trigger_grace,
        }
    }

    pub fn engine(&self) -> &dyn PipelineEngine {
        self.engine.as_ref()
    }

    /// True exactly while a trigger is being dispatched and awaiting its ack.
    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::SeqCst)
    }

    pub fn view(&self) -> PipelineView {
        self.lock_view().clone()
    }

    fn lock_view(&self) -> MutexGuard<'_, PipelineView> {
        self.view.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Fetch the current lead set and replace local state wholesale. An empty
    /// response clears prior state; a failed fetch leaves it untouched and
    /// surfaces exactly one notice.
    pub async fn refresh(&self) -> std::result::Result<(), EngineError> {
        match self.engine.fetch_leads().await {
            Ok(response) => {
                let snapshot = aggregate(&response.leads);
                let total = response.leads.len() as u64;
                {
                    let mut view = self.lock_view();
                    view.leads = response.leads;
                    view.snapshot = snapshot;
                    view.engine_stats = response.stats;
                    view.last_refreshed = Some(Utc::now());
                    view.last_failure = None;
                }
                self.observer.notice(Notice::Refreshed { total });
                Ok(())
            }
            Err(e) => {
                debug!("Refresh failed ({}): {}", e.category(), e);
                self.lock_view().last_failure = Some(e.to_string());
                self.observer.notice(Notice::RefreshFailed {
                    error: e.to_string(),
                });
                Err(e)
            }
        }
    }

    /// Invoke one pipeline stage in two phases: dispatch and await the ack
    /// under the busy guard, then resync once after the grace delay. While a
    /// trigger is in flight every further trigger is rejected before it
    /// reaches the network.
    pub async fn trigger_stage(&self, request: StageRequest) -> TriggerOutcome {
        let stage = request.stage();
        let Some(guard) = BusyGuard::acquire(&self.busy) else {
            self.observer.notice(Notice::TriggerRejected { stage });
            return TriggerOutcome::Rejected;
        };

        let trigger_id = Uuid::new_v4();
        info!(
            "📤 Dispatching {} trigger {} (batch size {})",
            stage,
            trigger_id,
            request.batch_size()
        );

        let ack = match self.engine.run_stage(&request).await {
            Ok(ack) => ack,
            Err(e) => {
                error!(
                    "❌ Trigger {} ({}) failed [{}]: {}",
                    trigger_id,
                    stage,
                    e.category(),
                    e
                );
                self.lock_view().last_failure = Some(e.to_string());
                self.observer.notice(Notice::StageFailed {
                    stage,
                    error: e.to_string(),
                });
                return TriggerOutcome::Failed {
                    error: e.to_string(),
                };
            }
        };
        // Ack in hand: release the guard before the grace-delay resync so
        // controls re-enable while the engine settles.
        drop(guard);

        info!(
            "✅ Trigger {} ({}) acknowledged: {}",
            trigger_id,
            stage,
            ack.summary()
        );
        self.observer.notice(Notice::StageAccepted {
            stage,
            ack: ack.clone(),
        });

        tokio::time::sleep(self.trigger_grace).await;
        // The resync reports its own failures; the trigger itself succeeded.
        let _ = self.refresh().await;

        TriggerOutcome::Completed { ack }
    }

    /// Background resync on a fixed cadence. The first tick fires
    /// immediately. The returned handle owns the task: `stop()` ends the
    /// loop, dropping the handle aborts it.
    pub fn spawn_poller(self: &Arc<Self>, period: Duration) -> PollerHandle {
        let orchestrator = Arc::clone(self);
        let (stop_tx, mut stop_rx) = watch::channel(());
        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        if let Err(e) = orchestrator.refresh().await {
                            debug!("⏱️ Background resync failed: {}", e);
                        }
                    }
                    _ = stop_rx.changed() => break,
                }
            }
            debug!("⏱️ Background resync loop stopped");
        });
        PollerHandle {
            stop: Some(stop_tx),
            task: Some(task),
        }
    }
}

pub struct PollerHandle {
    stop: Option<watch::Sender<()>>,
    task: Option<JoinHandle<()>>,
}

impl PollerHandle {
    pub async fn stop(mut self) {
        if let Some(stop) = self.stop.take() {
            let _ = stop.send(());
        }
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
    }
}

impl Drop for PollerHandle {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}
