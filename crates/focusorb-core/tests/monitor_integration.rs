//! Integration tests for the focus monitor loop.
//!
//! A scripted oracle replays a fixed sequence of responses, then reports a
//! high score forever. Scores and alerts are funneled through one channel so
//! their relative order is preserved.

use crossbeam_channel::{unbounded, Receiver};
use focusorb_core::error::CapabilityError;
use focusorb_core::{
    ActivitySource, Blocklist, Monitor, MonitorSettings, Notifier, ProductivityOracle,
    SessionLog, Snapshot, TaskRegistry,
};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

const HIGH: u8 = 9;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Seen {
    Score(u8),
    Alert(Vec<String>),
}

struct StaticActivity(Vec<String>);

impl ActivitySource for StaticActivity {
    fn list_activity_labels(&self) -> Result<Vec<String>, CapabilityError> {
        Ok(self.0.clone())
    }
}

struct ScriptedOracle {
    script: Mutex<VecDeque<Result<u8, CapabilityError>>>,
    tasks: Mutex<Vec<String>>,
}

impl ScriptedOracle {
    fn new(script: Vec<Result<u8, CapabilityError>>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            tasks: Mutex::new(Vec::new()),
        }
    }
}

impl ProductivityOracle for ScriptedOracle {
    fn name(&self) -> &str {
        "scripted"
    }

    fn score(&self, _snapshot: &Snapshot, task_name: &str) -> Result<String, CapabilityError> {
        self.tasks.lock().unwrap().push(task_name.to_string());
        let next = self.script.lock().unwrap().pop_front().unwrap_or(Ok(HIGH));
        next.map(|score| format!(r#"{{"score": {score}, "reason": "scripted {score}"}}"#))
    }
}

#[derive(Default)]
struct RecordingNotifier {
    sent: Mutex<Vec<(String, String)>>,
}

impl Notifier for RecordingNotifier {
    fn notify(&self, title: &str, message: &str) -> Result<(), CapabilityError> {
        self.sent
            .lock()
            .unwrap()
            .push((title.to_string(), message.to_string()));
        Ok(())
    }
}

struct Harness {
    monitor: Monitor,
    oracle: Arc<ScriptedOracle>,
    notifier: Arc<RecordingNotifier>,
    log: Arc<SessionLog>,
    rx: Receiver<Seen>,
}

fn harness(registry: Arc<TaskRegistry>, script: Vec<Result<u8, CapabilityError>>, hint: &str) -> Harness {
    let oracle = Arc::new(ScriptedOracle::new(script));
    let notifier = Arc::new(RecordingNotifier::default());
    let log = Arc::new(SessionLog::new());
    let monitor = Monitor::new(
        registry,
        Arc::new(StaticActivity(vec![
            "Overleaf - Essay".into(),
            "reddit.com - Firefox".into(),
        ])),
        oracle.clone(),
        notifier.clone(),
        MonitorSettings {
            sample_interval: Duration::from_millis(5),
            low_score_threshold: 4,
            consecutive_low_before_alert: 3,
            blocklist: Blocklist::new(["reddit.com"]),
        },
    )
    .with_session_log(Arc::clone(&log));

    let (tx, rx) = unbounded();
    let alert_tx = tx.clone();
    monitor
        .start(
            hint,
            Some(Box::new(move |score| {
                let _ = tx.send(Seen::Score(score));
            })),
            Some(Box::new(move |flagged: &[String]| {
                let _ = alert_tx.send(Seen::Alert(flagged.to_vec()));
            })),
        )
        .unwrap();

    Harness {
        monitor,
        oracle,
        notifier,
        log,
        rx,
    }
}

/// Collect events up to and including the first high score.
fn until_high(rx: &Receiver<Seen>) -> Vec<Seen> {
    let mut seen = Vec::new();
    loop {
        let event = rx.recv_timeout(Duration::from_secs(5)).unwrap();
        let done = event == Seen::Score(HIGH);
        seen.push(event);
        if done {
            return seen;
        }
    }
}

fn flagged() -> Seen {
    Seen::Alert(vec!["reddit.com - Firefox".to_string()])
}

#[test]
fn test_three_lows_alert_once_then_need_three_more() {
    let h = harness(Arc::new(TaskRegistry::new(25)), (0..7).map(|_| Ok(3)).collect(), "Essay");
    let seen = until_high(&h.rx);
    h.monitor.stop();
    h.monitor.wait();

    use Seen::Score;
    assert_eq!(
        seen,
        vec![
            Score(3),
            Score(3),
            Score(3),
            flagged(),
            Score(3),
            Score(3),
            Score(3),
            flagged(),
            Score(3),
            Score(HIGH),
        ]
    );

    let sent = h.notifier.sent.lock().unwrap().clone();
    assert_eq!(sent.len(), 2);
    assert_eq!(sent[0], ("Hey, focus up!".to_string(), "scripted 3".to_string()));
}

#[test]
fn test_oracle_failure_counts_as_neutral_and_resets_run() {
    let script = vec![
        Ok(3),
        Ok(3),
        Err(CapabilityError::Other("rate limited".into())),
        Ok(3),
        Ok(3),
        Ok(3),
    ];
    let h = harness(Arc::new(TaskRegistry::new(25)), script, "Essay");
    let seen = until_high(&h.rx);
    h.monitor.stop();
    h.monitor.wait();

    use Seen::Score;
    assert_eq!(
        seen,
        vec![
            Score(3),
            Score(3),
            Score(5),
            Score(3),
            Score(3),
            Score(3),
            flagged(),
            Score(HIGH),
        ]
    );
}

#[test]
fn test_samples_are_logged() {
    let h = harness(Arc::new(TaskRegistry::new(25)), vec![Ok(2), Ok(6)], "Essay");
    let seen = until_high(&h.rx);
    h.monitor.stop();
    h.monitor.wait();

    assert_eq!(seen.len(), 3);
    let entries = h.log.entries();
    let scores: Vec<u8> = entries.iter().take(3).map(|e| e.score).collect();
    assert_eq!(scores, vec![2, 6, HIGH]);
    assert_eq!(entries[0].reason, "scripted 2");
    assert_eq!(entries[0].activity.len(), 2);

    let stats = h.log.stats(4);
    assert!(stats.total_checks >= 3);
    assert_eq!(stats.low_count, 1);
}

#[test]
fn test_empty_hint_follows_registry_top_task() {
    let registry = Arc::new(TaskRegistry::new(25));
    registry.add("Reading", "30", None, Some("low"));
    let h = harness(Arc::clone(&registry), vec![Ok(6)], "");
    until_high(&h.rx);

    registry.add("Essay", "60", None, Some("high"));
    h.monitor.update_task_hint("Lab report");
    let deadline = std::time::Instant::now() + Duration::from_secs(5);
    while !h.oracle.tasks.lock().unwrap().iter().any(|t| t == "Lab report")
        && std::time::Instant::now() < deadline
    {
        std::thread::sleep(Duration::from_millis(5));
    }
    h.monitor.stop();
    h.monitor.wait();

    let tasks = h.oracle.tasks.lock().unwrap().clone();
    assert_eq!(tasks[0], "Reading");
    assert!(tasks.iter().any(|t| t == "Lab report"));
}

#[test]
fn test_restart_replaces_running_session() {
    let h = harness(Arc::new(TaskRegistry::new(25)), vec![], "Essay");
    until_high(&h.rx);
    assert!(h.monitor.is_running());

    h.monitor.start("Essay", None, None).unwrap();
    assert!(h.monitor.is_running());
    h.monitor.stop();
    h.monitor.wait();
    assert!(!h.monitor.is_running());
}
