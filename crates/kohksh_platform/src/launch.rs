//! Cancellable delayed launch of the native engine
//!
//! One worker thread per shell: wait out the loading delay, post the
//! "starting" label, then call `nativeInit` followed by `startKohksh`.
//! Cancellation wakes the delay immediately; once the engine is running it
//! is forwarded to [`NativeBridge::request_stop`].

use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crate::bridge::{call_guarded, NativeBridge, NATIVE_INIT, START_KOHKSH};
use crate::config::EngineMode;
use crate::error::{PlatformError, Result};
use crate::ui::UiHandle;

/// Where the launch sequence currently is
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LaunchPhase {
    /// Waiting out the loading delay
    Pending,
    /// Delay elapsed, `nativeInit` in flight
    Starting,
    /// `nativeInit` returned
    Initialized,
    /// `startKohksh` in flight (or detached engine running)
    EngineRunning,
    /// Blocking engine returned
    Finished,
    Failed,
    Cancelled,
}

impl LaunchPhase {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Finished | Self::Failed | Self::Cancelled)
    }
}

/// Final result of the launch worker
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LaunchOutcome {
    Completed,
    Cancelled,
    Failed(String),
}

/// What the worker needs, handed over explicitly at spawn
pub struct LaunchPlan {
    pub delay: Duration,
    pub starting_message: String,
    pub mode: EngineMode,
}

struct Status {
    phase: LaunchPhase,
    cancelled: bool,
}

struct Shared {
    status: Mutex<Status>,
    wake: Condvar,
    outcome: Mutex<Option<LaunchOutcome>>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl Shared {
    fn status(&self) -> MutexGuard<'_, Status> {
        self.status.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn set_phase(&self, phase: LaunchPhase) {
        self.status().phase = phase;
    }

    /// Sleep for `delay` unless cancelled first. Returns true on cancel.
    fn wait_cancelled(&self, delay: Duration) -> bool {
        let guard = self.status();
        let (guard, _) = self
            .wake
            .wait_timeout_while(guard, delay, |s| !s.cancelled)
            .unwrap_or_else(PoisonError::into_inner);
        guard.cancelled
    }

    fn finish(&self, outcome: LaunchOutcome) {
        *self.outcome.lock().unwrap_or_else(PoisonError::into_inner) = Some(outcome);
    }
}

/// Handle to a scheduled launch. Clones share the same task.
#[derive(Clone)]
pub struct LaunchHandle {
    shared: Arc<Shared>,
    bridge: Arc<dyn NativeBridge>,
}

impl std::fmt::Debug for LaunchHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LaunchHandle").finish_non_exhaustive()
    }
}

impl LaunchHandle {
    /// Schedule the launch sequence on a dedicated `kohksh-launch` thread
    pub fn spawn(plan: LaunchPlan, bridge: Arc<dyn NativeBridge>, ui: UiHandle) -> Result<Self> {
        let shared = Arc::new(Shared {
            status: Mutex::new(Status {
                phase: LaunchPhase::Pending,
                cancelled: false,
            }),
            wake: Condvar::new(),
            outcome: Mutex::new(None),
            worker: Mutex::new(None),
        });

        let worker_shared = Arc::clone(&shared);
        let worker_bridge = Arc::clone(&bridge);
        let worker = thread::Builder::new()
            .name("kohksh-launch".to_string())
            .spawn(move || {
                let outcome = run_launch(&worker_shared, worker_bridge.as_ref(), plan, ui);
                worker_shared.finish(outcome);
            })
            .map_err(|e| PlatformError::Spawn(e.to_string()))?;

        *shared.worker.lock().unwrap_or_else(PoisonError::into_inner) = Some(worker);
        Ok(Self { shared, bridge })
    }

    pub fn phase(&self) -> LaunchPhase {
        self.shared.status().phase
    }

    pub fn is_cancelled(&self) -> bool {
        self.shared.status().cancelled
    }

    /// Whether the worker has produced its outcome
    pub fn is_finished(&self) -> bool {
        self.outcome().is_some()
    }

    pub fn outcome(&self) -> Option<LaunchOutcome> {
        self.shared
            .outcome
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Cancel the launch. Idempotent.
    ///
    /// A pending delay wakes at once and no native call is made. If the
    /// engine is already running it is asked to stop.
    pub fn cancel(&self) {
        let stop_engine = {
            let mut status = self.shared.status();
            if status.cancelled || status.phase.is_terminal() {
                status.cancelled = true;
                return;
            }
            status.cancelled = true;
            status.phase == LaunchPhase::EngineRunning
        };
        self.shared.wake.notify_all();
        tracing::info!(stop_engine, "launch cancelled");

        if stop_engine {
            self.bridge.request_stop();
        }
    }

    /// Wait for the worker to exit and return its outcome
    pub fn join(&self) -> LaunchOutcome {
        let worker = self
            .shared
            .worker
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(worker) = worker {
            if worker.join().is_err() {
                self.shared
                    .finish(LaunchOutcome::Failed("launch worker panicked".to_string()));
            }
        }
        self.outcome()
            .unwrap_or_else(|| LaunchOutcome::Failed("launch worker still running".to_string()))
    }

    /// Like [`join`](Self::join) but gives up after `timeout`
    pub fn join_timeout(&self, timeout: Duration) -> Option<LaunchOutcome> {
        let deadline = Instant::now() + timeout;
        while !self.is_finished() {
            if Instant::now() >= deadline {
                return None;
            }
            thread::sleep(Duration::from_millis(5));
        }
        Some(self.join())
    }
}

fn run_launch(
    shared: &Shared,
    bridge: &dyn NativeBridge,
    plan: LaunchPlan,
    ui: UiHandle,
) -> LaunchOutcome {
    let started = Instant::now();
    if shared.wait_cancelled(plan.delay) {
        shared.set_phase(LaunchPhase::Cancelled);
        tracing::info!("launch cancelled during loading delay");
        return LaunchOutcome::Cancelled;
    }
    tracing::info!(waited_ms = started.elapsed().as_millis() as u64, "loading delay elapsed");

    shared.set_phase(LaunchPhase::Starting);
    if let Err(e) = ui.set_text(plan.starting_message) {
        tracing::warn!("starting label dropped: {}", e);
    }

    if let Err(e) = call_guarded(NATIVE_INIT, || bridge.native_init()) {
        return fail(shared, e);
    }

    {
        let mut status = shared.status();
        if status.cancelled {
            status.phase = LaunchPhase::Cancelled;
            tracing::info!("launch cancelled after {}", NATIVE_INIT);
            return LaunchOutcome::Cancelled;
        }
        status.phase = LaunchPhase::EngineRunning;
    }

    tracing::info!(mode = ?plan.mode, "calling {}", START_KOHKSH);
    if let Err(e) = call_guarded(START_KOHKSH, || bridge.start()) {
        return fail(shared, e);
    }

    match plan.mode {
        EngineMode::Blocking => {
            shared.set_phase(LaunchPhase::Finished);
            tracing::info!("engine loop returned");
        }
        EngineMode::Detached => tracing::info!("engine detached"),
    }
    LaunchOutcome::Completed
}

fn fail(shared: &Shared, err: PlatformError) -> LaunchOutcome {
    tracing::error!("startup sequence failed: {}", err);
    shared.set_phase(LaunchPhase::Failed);
    LaunchOutcome::Failed(err.to_string())
}
