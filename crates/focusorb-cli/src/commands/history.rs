use clap::Args;
use focusorb_core::storage::{load_history, sessions_path};
use serde_json::json;

use super::CliResult;

#[derive(Args)]
pub struct HistoryArgs {
    /// Only show the most recent sessions
    #[arg(long, short = 'n')]
    limit: Option<usize>,
    /// Include every logged sample
    #[arg(long)]
    full: bool,
}

pub fn run(args: HistoryArgs) -> CliResult {
    let sessions = load_history(&sessions_path()?)?;
    let skip = args
        .limit
        .map(|n| sessions.len().saturating_sub(n))
        .unwrap_or(0);
    let recent = &sessions[skip..];

    if args.full {
        println!("{}", serde_json::to_string_pretty(recent)?);
        return Ok(());
    }

    let rows: Vec<_> = recent
        .iter()
        .map(|s| {
            json!({
                "session_start": s.session_start,
                "session_end": s.session_end,
                "checks": s.entries.len(),
                "avg_score": s.average_score(),
            })
        })
        .collect();
    println!("{}", serde_json::to_string_pretty(&rows)?);
    Ok(())
}
