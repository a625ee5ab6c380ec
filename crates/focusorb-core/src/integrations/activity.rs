//! Window-title activity source backed by platform helper commands.
//!
//! - Linux: `wmctrl -l`
//! - macOS: AppleScript via `osascript`
//! - Windows: PowerShell `Get-Process` main window titles

use std::process::Command;

use crate::error::CapabilityError;
use crate::integrations::traits::ActivitySource;

/// Label reported when no window titles survive filtering.
pub const NO_ACTIVITY_LABEL: &str = "(No activity detected)";

const BROWSER_MARKERS: [&str; 6] = ["chrome", "firefox", "edge", "safari", "brave", "opera"];

#[derive(Debug, Clone, Default)]
pub struct CommandActivitySource {
    browser_only: bool,
}

impl CommandActivitySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Only report windows whose title names a known browser.
    pub fn browser_only(mut self, browser_only: bool) -> Self {
        self.browser_only = browser_only;
        self
    }

    fn filter(&self, titles: Vec<String>) -> Vec<String> {
        let titles: Vec<String> = titles
            .into_iter()
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .filter(|t| !self.browser_only || is_browser_title(t))
            .collect();
        if titles.is_empty() {
            vec![NO_ACTIVITY_LABEL.to_string()]
        } else {
            titles
        }
    }
}

impl ActivitySource for CommandActivitySource {
    fn list_activity_labels(&self) -> Result<Vec<String>, CapabilityError> {
        Ok(self.filter(window_titles()?))
    }
}

fn is_browser_title(title: &str) -> bool {
    let lower = title.to_lowercase();
    BROWSER_MARKERS.iter().any(|b| lower.contains(b))
}

fn run(program: &str, args: &[&str]) -> Result<String, CapabilityError> {
    let output = Command::new(program)
        .args(args)
        .output()
        .map_err(|e| CapabilityError::CommandFailed {
            command: program.to_string(),
            message: e.to_string(),
        })?;
    if !output.status.success() {
        return Err(CapabilityError::CommandFailed {
            command: program.to_string(),
            message: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }
    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

#[cfg(target_os = "linux")]
fn window_titles() -> Result<Vec<String>, CapabilityError> {
    run("wmctrl", &["-l"]).map(|out| parse_wmctrl(&out))
}

#[cfg(target_os = "macos")]
fn window_titles() -> Result<Vec<String>, CapabilityError> {
    let script = "tell application \"System Events\" to get name of every window of every process";
    run("osascript", &["-e", script]).map(|out| parse_applescript_list(&out))
}

#[cfg(target_os = "windows")]
fn window_titles() -> Result<Vec<String>, CapabilityError> {
    let cmd = "Get-Process | Where-Object {$_.MainWindowTitle} | Select-Object -ExpandProperty MainWindowTitle";
    run("powershell", &["-command", cmd]).map(|out| parse_lines(&out))
}

#[cfg(not(any(target_os = "linux", target_os = "macos", target_os = "windows")))]
fn window_titles() -> Result<Vec<String>, CapabilityError> {
    Err(CapabilityError::Unsupported {
        capability: "window listing",
        platform: std::env::consts::OS,
    })
}

/// `wmctrl -l` prints `<id> <desktop> <host> <title...>` per window.
#[cfg_attr(not(target_os = "linux"), allow(dead_code))]
fn parse_wmctrl(out: &str) -> Vec<String> {
    out.lines()
        .map(|line| line.split_whitespace().skip(3).collect::<Vec<_>>().join(" "))
        .filter(|t| !t.is_empty())
        .collect()
}

/// AppleScript flattens nested lists into `a, b, c`.
#[cfg_attr(not(target_os = "macos"), allow(dead_code))]
fn parse_applescript_list(out: &str) -> Vec<String> {
    out.split(", ")
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .collect()
}

#[cfg_attr(not(target_os = "windows"), allow(dead_code))]
fn parse_lines(out: &str) -> Vec<String> {
    out.lines()
        .map(|l| l.trim().to_string())
        .filter(|l| !l.is_empty())
        .collect()
}
