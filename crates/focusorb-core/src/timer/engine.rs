//! Pomodoro timer engine.
//!
//! The timer runs its own thread. Each cycle is one work interval followed
//! by a break; every Nth break is long.
//!
//! ## State Transitions
//!
//! ```text
//! Idle -> Working -> OnBreak -> Working -> ... -> Idle (on stop)
//! ```
//!
//! Waits block on a cancellation channel, so `stop()` wakes the loop
//! immediately instead of after the current interval. A stop during work
//! credits nothing and skips the break.
//!
//! ## Usage
//!
//! ```ignore
//! let timer = PomodoroTimer::new(registry, notifier, TimerSettings::default());
//! timer.start(Some(Box::new(|mins, long| ...)), Some(Box::new(|n| ...)))?;
//! // later
//! timer.stop();
//! ```

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread::{self, JoinHandle};
use tracing::{debug, info, warn};

use super::schedule::{BreakKind, TimerSettings};
use crate::error::Result;
use crate::integrations::Notifier;
use crate::task::TaskRegistry;
use crate::worker::{cancel_pair, deliver, guarded, CancelHandle, CancelToken};

/// Called with the 1-based interval number when work starts.
pub type WorkCallback = Box<dyn Fn(u32) + Send + Sync>;
/// Called with the break length in minutes and whether it is a long break.
pub type BreakCallback = Box<dyn Fn(u32, bool) + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimerState {
    Idle,
    Working,
    OnBreak,
}

/// Result of a start request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartOutcome {
    Started,
    /// A session is already active; nothing changed.
    AlreadyRunning,
}

/// State visible to both the owner and the loop thread.
#[derive(Debug)]
struct Shared {
    state: Mutex<TimerState>,
    interval: AtomicU32,
    running: AtomicBool,
}

impl Shared {
    fn set_state(&self, state: TimerState) {
        *self.state.lock().unwrap_or_else(|p| p.into_inner()) = state;
    }

    fn state(&self) -> TimerState {
        *self.state.lock().unwrap_or_else(|p| p.into_inner())
    }
}

struct Session {
    cancel: CancelHandle,
    handle: Option<JoinHandle<()>>,
}

/// Interruptible work/break scheduler.
pub struct PomodoroTimer {
    settings: TimerSettings,
    registry: Arc<TaskRegistry>,
    notifier: Arc<dyn Notifier>,
    shared: Arc<Shared>,
    session: Mutex<Option<Session>>,
}

impl PomodoroTimer {
    pub fn new(
        registry: Arc<TaskRegistry>,
        notifier: Arc<dyn Notifier>,
        settings: TimerSettings,
    ) -> Self {
        Self {
            settings,
            registry,
            notifier,
            shared: Arc::new(Shared {
                state: Mutex::new(TimerState::Idle),
                interval: AtomicU32::new(0),
                running: AtomicBool::new(false),
            }),
            session: Mutex::new(None),
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state(&self) -> TimerState {
        self.shared.state()
    }

    /// Interval counter of the current (or last) session. 0 before the first.
    pub fn current_interval(&self) -> u32 {
        self.shared.interval.load(Ordering::SeqCst)
    }

    /// True until the loop thread has actually exited.
    pub fn is_running(&self) -> bool {
        self.shared.running.load(Ordering::SeqCst)
    }

    pub fn settings(&self) -> &TimerSettings {
        &self.settings
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Start a new session on its own thread.
    ///
    /// Returns [`StartOutcome::AlreadyRunning`] without touching the running
    /// session if one is active. A session that was stopped but whose thread
    /// is still winding down is joined first.
    ///
    /// # Errors
    ///
    /// Returns an error only if the OS refuses to spawn the thread.
    pub fn start(
        &self,
        on_break: Option<BreakCallback>,
        on_work: Option<WorkCallback>,
    ) -> Result<StartOutcome> {
        // Joined outside the lock: a callback of the exiting loop may call stop().
        let stale = match self.lock_session().as_mut() {
            Some(previous) if previous.cancel.is_cancelled() => previous.handle.take(),
            _ => None,
        };
        if let Some(handle) = stale {
            join_loop(handle);
        }

        let mut session = self.lock_session();
        if self
            .shared
            .running
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            info!("timer already running");
            return Ok(StartOutcome::AlreadyRunning);
        }

        self.shared.interval.store(0, Ordering::SeqCst);
        let (cancel, token) = cancel_pair();
        let worker = Worker {
            settings: self.settings.clone(),
            registry: Arc::clone(&self.registry),
            notifier: Arc::clone(&self.notifier),
            shared: Arc::clone(&self.shared),
            token,
            on_break,
            on_work,
        };

        let spawned = thread::Builder::new()
            .name("focusorb-timer".into())
            .spawn(move || worker.run());
        let handle = match spawned {
            Ok(handle) => handle,
            Err(e) => {
                self.shared.running.store(false, Ordering::SeqCst);
                return Err(e.into());
            }
        };

        info!(
            work = self.settings.work_minutes,
            short_break = self.settings.short_break_minutes,
            long_break = self.settings.long_break_minutes,
            "timer started"
        );
        *session = Some(Session {
            cancel,
            handle: Some(handle),
        });
        Ok(StartOutcome::Started)
    }

    /// Ask the loop to stop. Returns immediately; the loop exits as soon as
    /// it observes the signal. Safe to call when idle or repeatedly.
    pub fn stop(&self) {
        let mut session = self.lock_session();
        if let Some(active) = session.as_mut() {
            if !active.cancel.is_cancelled() {
                info!("timer stopping");
            }
            active.cancel.cancel();
        }
    }

    /// Block until the loop thread of the latest session has exited.
    ///
    /// Must not be called from inside a timer callback.
    pub fn wait(&self) {
        let handle = self.lock_session().as_mut().and_then(|s| s.handle.take());
        if let Some(handle) = handle {
            join_loop(handle);
        }
    }

    fn lock_session(&self) -> MutexGuard<'_, Option<Session>> {
        self.session.lock().unwrap_or_else(|p| p.into_inner())
    }
}

fn join_loop(handle: JoinHandle<()>) {
    if handle.thread().id() == thread::current().id() {
        warn!("timer joined from its own thread; ignoring");
        return;
    }
    if handle.join().is_err() {
        warn!("timer thread panicked");
    }
}

impl Drop for PomodoroTimer {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Clears the running flag however the loop exits.
struct RunningGuard(Arc<Shared>);

impl Drop for RunningGuard {
    fn drop(&mut self) {
        self.0.set_state(TimerState::Idle);
        self.0.running.store(false, Ordering::SeqCst);
        info!("timer loop ended");
    }
}

struct Worker {
    settings: TimerSettings,
    registry: Arc<TaskRegistry>,
    notifier: Arc<dyn Notifier>,
    shared: Arc<Shared>,
    token: CancelToken,
    on_break: Option<BreakCallback>,
    on_work: Option<WorkCallback>,
}

impl Worker {
    fn run(self) {
        let _guard = RunningGuard(Arc::clone(&self.shared));

        while !self.token.is_cancelled() {
            let interval = self.shared.interval.fetch_add(1, Ordering::SeqCst) + 1;
            let task = self.registry.current_task_name();
            info!(interval, task = %task, "work interval started");

            if let Some(on_work) = &self.on_work {
                guarded("on_work", || on_work(interval));
            }
            deliver(
                self.notifier.as_ref(),
                "Work time!",
                &format!("{task} - interval {interval}. Stay focused!"),
            );

            self.shared.set_state(TimerState::Working);
            if self.token.wait(self.settings.work_duration()) {
                debug!(interval, "stopped during work; nothing credited");
                break;
            }

            self.registry.credit_progress(self.settings.work_minutes);

            let kind = self.settings.break_kind(interval);
            let minutes = self.settings.break_minutes(kind);
            info!(%kind, minutes, "break started");
            deliver(
                self.notifier.as_ref(),
                &format!("{kind}!"),
                &format!("Great work! Take {minutes} minutes."),
            );
            if let Some(on_break) = &self.on_break {
                guarded("on_break", || on_break(minutes, kind == BreakKind::Long));
            }

            self.shared.set_state(TimerState::OnBreak);
            if self.token.wait(self.settings.break_duration(kind)) {
                break;
            }
            deliver(self.notifier.as_ref(), "Break over!", "Back to work!");
        }
    }
}
