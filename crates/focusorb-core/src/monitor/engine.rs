//! Focus monitor loop.
//!
//! Every sampling interval the monitor asks the activity source what is on
//! screen, asks the oracle how that fits the current task, reports the score
//! and, after enough consecutive low scores, raises an alert listing the
//! block-listed activity it saw.
//!
//! ```text
//! Stopped -> Running -> Stopped
//! ```
//!
//! `stop()` wakes a sleeping loop at once. A sample already in flight (a
//! slow oracle call, say) is allowed to finish, callbacks included; oracle
//! calls are not cancellable.

use chrono::Utc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::{debug, info, warn};

use super::blocklist::Blocklist;
use super::hysteresis::LowScoreTracker;
use super::verdict::Verdict;
use crate::error::Result;
use crate::integrations::{ActivitySource, Notifier, ProductivityOracle, Snapshot};
use crate::storage::SessionLog;
use crate::task::TaskRegistry;
use crate::worker::{cancel_pair, deliver, guarded, CancelHandle, CancelToken};

/// Called with every sample's score.
pub type ScoreCallback = Box<dyn Fn(u8) + Send + Sync>;
/// Called with the flagged activity labels when an alert fires.
pub type AlertCallback = Box<dyn Fn(&[String]) + Send + Sync>;

/// Sampling and alerting parameters.
#[derive(Debug, Clone)]
pub struct MonitorSettings {
    pub sample_interval: Duration,
    /// Scores strictly below this are low.
    pub low_score_threshold: u8,
    /// Consecutive low scores needed to raise an alert.
    pub consecutive_low_before_alert: u32,
    pub blocklist: Blocklist,
}

impl Default for MonitorSettings {
    fn default() -> Self {
        Self {
            sample_interval: Duration::from_secs(5),
            low_score_threshold: 4,
            consecutive_low_before_alert: 3,
            blocklist: Blocklist::default(),
        }
    }
}

/// Outcome of one sampling pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sample {
    pub task_name: String,
    pub verdict: Verdict,
    pub activity: Vec<String>,
    pub flagged: Vec<String>,
}

/// Everything one sample needs. Cheap to clone into the loop thread.
#[derive(Clone)]
struct Sampler {
    activity: Arc<dyn ActivitySource>,
    oracle: Arc<dyn ProductivityOracle>,
    blocklist: Blocklist,
}

impl Sampler {
    /// Never fails: collaborator errors degrade to empty activity and a
    /// neutral verdict.
    fn sample(&self, task_name: &str) -> Sample {
        let activity = self.activity.list_activity_labels().unwrap_or_else(|e| {
            warn!(error = %e, "activity source failed");
            Vec::new()
        });
        let image = self.activity.capture_image().unwrap_or_else(|e| {
            warn!(error = %e, "screen capture failed");
            None
        });
        let snapshot = Snapshot {
            captured_at: Utc::now(),
            activity_labels: activity,
            image,
        };

        let verdict = match self.oracle.score(&snapshot, task_name) {
            Ok(raw) => Verdict::parse(&raw),
            Err(e) => {
                warn!(oracle = self.oracle.name(), error = %e, "oracle failed");
                Verdict::default()
            }
        };
        let flagged = self.blocklist.flagged(&snapshot.activity_labels);

        Sample {
            task_name: task_name.to_string(),
            verdict,
            activity: snapshot.activity_labels,
            flagged,
        }
    }
}

struct Session {
    cancel: CancelHandle,
    handle: Option<JoinHandle<()>>,
    alive: Arc<AtomicBool>,
}

/// Periodic focus monitor.
pub struct Monitor {
    settings: MonitorSettings,
    registry: Arc<TaskRegistry>,
    sampler: Sampler,
    notifier: Arc<dyn Notifier>,
    session_log: Option<Arc<SessionLog>>,
    /// Explicit task label; `None` follows the registry's top task.
    task_hint: Arc<Mutex<Option<String>>>,
    session: Mutex<Option<Session>>,
}

impl Monitor {
    pub fn new(
        registry: Arc<TaskRegistry>,
        activity: Arc<dyn ActivitySource>,
        oracle: Arc<dyn ProductivityOracle>,
        notifier: Arc<dyn Notifier>,
        settings: MonitorSettings,
    ) -> Self {
        let sampler = Sampler {
            activity,
            oracle,
            blocklist: settings.blocklist.clone(),
        };
        Self {
            settings,
            registry,
            sampler,
            notifier,
            session_log: None,
            task_hint: Arc::new(Mutex::new(None)),
            session: Mutex::new(None),
        }
    }

    /// Record every sample into `log`.
    pub fn with_session_log(mut self, log: Arc<SessionLog>) -> Self {
        self.session_log = Some(log);
        self
    }

    pub fn settings(&self) -> &MonitorSettings {
        &self.settings
    }

    /// Whether a session is active and has not been asked to stop.
    pub fn is_running(&self) -> bool {
        self.lock_session()
            .as_ref()
            .map(|s| !s.cancel.is_cancelled() && s.alive.load(Ordering::SeqCst))
            .unwrap_or(false)
    }

    /// Label the next sample will be scored against.
    pub fn task_name(&self) -> String {
        resolve_task_name(&self.task_hint, &self.registry)
    }

    /// Start sampling. If already running, the running session is stopped
    /// and replaced, which also zeroes the low-score counter.
    ///
    /// An empty `task_hint` makes every sample use the registry's current
    /// top task.
    ///
    /// # Errors
    ///
    /// Returns an error only if the OS refuses to spawn the thread.
    pub fn start(
        &self,
        task_hint: &str,
        on_score: Option<ScoreCallback>,
        on_alert: Option<AlertCallback>,
    ) -> Result<()> {
        let mut session = self.lock_session();
        if let Some(mut previous) = session.take() {
            if !previous.cancel.is_cancelled() {
                info!("monitor restarting");
            }
            previous.cancel.cancel();
        }
        self.update_task_hint(task_hint);

        let (cancel, token) = cancel_pair();
        let alive = Arc::new(AtomicBool::new(true));
        let worker = Worker {
            settings: self.settings.clone(),
            registry: Arc::clone(&self.registry),
            sampler: self.sampler.clone(),
            notifier: Arc::clone(&self.notifier),
            session_log: self.session_log.clone(),
            task_hint: Arc::clone(&self.task_hint),
            token,
            alive: Arc::clone(&alive),
            on_score,
            on_alert,
        };

        let handle = thread::Builder::new()
            .name("focusorb-monitor".into())
            .spawn(move || worker.run())?;

        info!(
            every_secs = self.settings.sample_interval.as_secs_f64(),
            "monitor started"
        );
        *session = Some(Session {
            cancel,
            handle: Some(handle),
            alive,
        });
        Ok(())
    }

    /// Stop sampling. Returns immediately; safe when already stopped.
    pub fn stop(&self) {
        if let Some(active) = self.lock_session().as_mut() {
            if !active.cancel.is_cancelled() {
                info!("monitor stopped");
            }
            active.cancel.cancel();
        }
    }

    /// Change the task label used from the next sample on. Empty follows
    /// the registry.
    pub fn update_task_hint(&self, name: &str) {
        let name = name.trim();
        let hint = (!name.is_empty()).then(|| name.to_string());
        *self.task_hint.lock().unwrap_or_else(|p| p.into_inner()) = hint;
    }

    /// Block until the latest session's thread has exited, including any
    /// in-flight sample. Must not be called from a monitor callback.
    pub fn wait(&self) {
        let handle = self.lock_session().as_mut().and_then(|s| s.handle.take());
        if let Some(handle) = handle {
            if handle.thread().id() == thread::current().id() {
                warn!("wait() called from the monitor thread; ignoring");
                return;
            }
            if handle.join().is_err() {
                warn!("monitor thread panicked");
            }
        }
    }

    fn lock_session(&self) -> MutexGuard<'_, Option<Session>> {
        self.session.lock().unwrap_or_else(|p| p.into_inner())
    }
}

impl Drop for Monitor {
    fn drop(&mut self) {
        self.stop();
    }
}

fn resolve_task_name(hint: &Mutex<Option<String>>, registry: &TaskRegistry) -> String {
    let hint = hint.lock().unwrap_or_else(|p| p.into_inner()).clone();
    hint.unwrap_or_else(|| registry.current_task_name())
}

struct AliveGuard(Arc<AtomicBool>);

impl Drop for AliveGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
        debug!("monitor loop ended");
    }
}

struct Worker {
    settings: MonitorSettings,
    registry: Arc<TaskRegistry>,
    sampler: Sampler,
    notifier: Arc<dyn Notifier>,
    session_log: Option<Arc<SessionLog>>,
    task_hint: Arc<Mutex<Option<String>>>,
    token: CancelToken,
    alive: Arc<AtomicBool>,
    on_score: Option<ScoreCallback>,
    on_alert: Option<AlertCallback>,
}

impl Worker {
    fn run(self) {
        let _guard = AliveGuard(Arc::clone(&self.alive));
        let mut tracker = LowScoreTracker::new(
            self.settings.low_score_threshold,
            self.settings.consecutive_low_before_alert,
        );

        loop {
            if self.token.wait(self.settings.sample_interval) {
                break;
            }

            let task_name = resolve_task_name(&self.task_hint, &self.registry);
            let sample = guarded("sample", || self.sampler.sample(&task_name)).unwrap_or_else(|| {
                Sample {
                    task_name: task_name.clone(),
                    verdict: Verdict::default(),
                    activity: Vec::new(),
                    flagged: Vec::new(),
                }
            });
            self.handle(&mut tracker, &sample);
        }
    }

    fn handle(&self, tracker: &mut LowScoreTracker, sample: &Sample) {
        let Verdict { score, reason } = &sample.verdict;
        info!(score, reason = %reason, task = %sample.task_name, "focus score");

        if let Some(log) = &self.session_log {
            log.record(*score, reason, &sample.activity);
        }
        if let Some(on_score) = &self.on_score {
            guarded("on_score", || on_score(*score));
        }

        if tracker.observe(*score) {
            info!(flagged = sample.flagged.len(), "focus alert");
            let message = if reason.is_empty() {
                "You seem distracted.".to_string()
            } else {
                reason.clone()
            };
            deliver(self.notifier.as_ref(), "Hey, focus up!", &message);
            if let Some(on_alert) = &self.on_alert {
                guarded("on_alert", || on_alert(&sample.flagged));
            }
        }
    }
}
