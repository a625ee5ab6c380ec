use clap::Subcommand;
use focusorb_core::Config;

use super::{load_registry, save_registry, CliResult};

#[derive(Subcommand)]
pub enum TaskAction {
    /// Add a new task
    Add {
        /// Task name
        name: String,
        /// Estimated minutes (defaults to one work interval)
        #[arg(long, short)]
        minutes: Option<String>,
        /// Due date (YYYY-MM-DD)
        #[arg(long)]
        due: Option<String>,
        /// high, medium or low
        #[arg(long, short)]
        priority: Option<String>,
    },
    /// List tasks as JSON
    List {
        /// Most important first, active tasks only
        #[arg(long)]
        ranked: bool,
        /// Include completed tasks
        #[arg(long, conflicts_with = "ranked")]
        all: bool,
    },
    /// Mark a task as completed
    Complete {
        /// Task name (case-insensitive)
        name: String,
    },
    /// Remove every task with this name
    Remove {
        /// Task name (case-insensitive)
        name: String,
    },
    /// Print the task the timer would credit next
    Current,
    /// Print progress totals as JSON
    Stats,
    /// Human-readable task overview
    Summary,
}

pub fn run(action: TaskAction) -> CliResult {
    let config = Config::load()?;
    let registry = load_registry(&config)?;

    match action {
        TaskAction::Add {
            name,
            minutes,
            due,
            priority,
        } => {
            let task = registry.add(
                &name,
                minutes.as_deref().unwrap_or_default(),
                due.as_deref(),
                priority.as_deref(),
            );
            save_registry(&registry)?;
            println!("{}", serde_json::to_string_pretty(&task)?);
        }
        TaskAction::List { ranked, all } => {
            let tasks = if ranked {
                registry.select_ranked()
            } else if all {
                registry.all()
            } else {
                registry.list_active()
            };
            println!("{}", serde_json::to_string_pretty(&tasks)?);
        }
        TaskAction::Complete { name } => {
            if !registry.complete(&name) {
                return Err(format!("task not found: {name}").into());
            }
            save_registry(&registry)?;
            println!("ok");
        }
        TaskAction::Remove { name } => {
            let removed = registry.remove(&name);
            if removed == 0 {
                return Err(format!("task not found: {name}").into());
            }
            save_registry(&registry)?;
            println!("removed {removed}");
        }
        TaskAction::Current => {
            println!("{}", registry.current_task_name());
        }
        TaskAction::Stats => {
            println!("{}", serde_json::to_string_pretty(&registry.stats())?);
        }
        TaskAction::Summary => {
            println!("{}", registry.summary());
            let work = config.timer.work_minutes;
            let intervals: u32 = registry
                .list_active()
                .iter()
                .map(|t| t.estimate_intervals(work))
                .sum();
            if intervals > 0 {
                println!("\n{intervals} work intervals of {work} min left");
            }
        }
    }
    Ok(())
}
