//! Foreground session: timer and monitor threads feeding one event stream.
//!
//! Every timer and monitor callback forwards an [`Event`] over a channel;
//! the main thread prints each one as a JSON line until Ctrl+C, then stops
//! both loops and persists tasks and the session log.

use clap::Args;
use crossbeam_channel::{select, unbounded, Sender};
use focusorb_core::integrations::{
    CommandActivitySource, DesktopNotifier, KeywordOracle, TracingNotifier,
};
use focusorb_core::storage::sessions_path;
use focusorb_core::{Config, Event, Monitor, Notifier, PomodoroTimer, SessionLog, StartOutcome};
use std::sync::Arc;
use tracing::{info, warn};

use super::{load_registry, save_registry, CliResult};

#[derive(Args)]
pub struct RunArgs {
    /// Only run the focus monitor
    #[arg(long, conflicts_with = "no_monitor")]
    no_timer: bool,
    /// Only run the pomodoro timer
    #[arg(long)]
    no_monitor: bool,
    /// Task the monitor scores against (defaults to the top-ranked task)
    #[arg(long)]
    task: Option<String>,
    /// Only consider browser windows as activity
    #[arg(long)]
    browser_only: bool,
}

fn notifier_for(config: &Config) -> Arc<dyn Notifier> {
    if config.notifications.enabled && config.notifications.desktop {
        Arc::new(DesktopNotifier)
    } else {
        Arc::new(TracingNotifier)
    }
}

fn forward(tx: &Sender<Event>, event: Event) {
    // The receiver only goes away during shutdown.
    let _ = tx.send(event);
}

pub fn run(args: RunArgs) -> CliResult {
    let config = Config::load()?;
    let registry = Arc::new(load_registry(&config)?);
    let notifier = notifier_for(&config);
    let session_log = Arc::new(SessionLog::new());

    let (event_tx, event_rx) = unbounded::<Event>();
    let (stop_tx, stop_rx) = unbounded::<()>();
    ctrlc::set_handler(move || {
        let _ = stop_tx.send(());
    })?;

    let timer = PomodoroTimer::new(
        Arc::clone(&registry),
        Arc::clone(&notifier),
        config.timer_settings(),
    );
    if !args.no_timer {
        let on_break = event_tx.clone();
        let on_work = event_tx.clone();
        let outcome = timer.start(
            Some(Box::new(move |minutes, is_long| {
                forward(&on_break, Event::break_started(minutes, is_long))
            })),
            Some(Box::new(move |interval| {
                forward(&on_work, Event::work_started(interval))
            })),
        )?;
        if outcome == StartOutcome::AlreadyRunning {
            warn!("timer was already running");
        }
    }

    let activity = CommandActivitySource::new()
        .browser_only(args.browser_only || config.monitor.browser_only);
    let monitor = Monitor::new(
        Arc::clone(&registry),
        Arc::new(activity),
        Arc::new(KeywordOracle::new(config.blocklist())),
        Arc::clone(&notifier),
        config.monitor_settings(),
    )
    .with_session_log(Arc::clone(&session_log));
    if !args.no_monitor {
        let on_score = event_tx.clone();
        let on_alert = event_tx.clone();
        monitor.start(
            args.task.as_deref().unwrap_or_default(),
            Some(Box::new(move |score| {
                forward(&on_score, Event::score_updated(score))
            })),
            Some(Box::new(move |flagged: &[String]| {
                forward(&on_alert, Event::alert_raised(flagged))
            })),
        )?;
    }
    drop(event_tx);

    info!(task = %monitor.task_name(), "session running; press Ctrl+C to stop");
    loop {
        select! {
            recv(event_rx) -> event => match event {
                Ok(event) => println!("{}", serde_json::to_string(&event)?),
                Err(_) => break,
            },
            recv(stop_rx) -> _ => break,
        }
    }

    timer.stop();
    monitor.stop();
    timer.wait();
    monitor.wait();
    for event in event_rx.try_iter() {
        println!("{}", serde_json::to_string(&event)?);
    }

    save_registry(&registry)?;
    let stats = session_log.stats(config.monitor.low_score_threshold);
    if session_log.save(&sessions_path()?)? {
        eprintln!(
            "session saved: {} checks, average score {}",
            stats.total_checks, stats.avg_score
        );
    }
    Ok(())
}
