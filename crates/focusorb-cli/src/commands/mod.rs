pub mod config;
pub mod history;
pub mod run;
pub mod task;

use focusorb_core::storage::tasks_path;
use focusorb_core::{Config, Task, TaskRegistry};
use std::path::Path;

pub type CliResult = Result<(), Box<dyn std::error::Error>>;

/// Load the persisted task list into a fresh registry.
pub fn load_registry(config: &Config) -> Result<TaskRegistry, Box<dyn std::error::Error>> {
    let tasks = read_tasks(&tasks_path()?)?;
    Ok(TaskRegistry::from_tasks(config.timer.work_minutes, tasks))
}

pub fn save_registry(registry: &TaskRegistry) -> CliResult {
    write_tasks(&tasks_path()?, &registry.all())
}

fn read_tasks(path: &Path) -> Result<Vec<Task>, Box<dyn std::error::Error>> {
    match std::fs::read_to_string(path) {
        Ok(content) => Ok(serde_json::from_str(&content)?),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Vec::new()),
        Err(e) => Err(e.into()),
    }
}

fn write_tasks(path: &Path, tasks: &[Task]) -> CliResult {
    std::fs::write(path, serde_json::to_string_pretty(tasks)?)?;
    Ok(())
}
