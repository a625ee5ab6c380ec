//! Notifier implementations.

use std::process::Command;
use tracing::info;

use crate::error::CapabilityError;
use crate::integrations::traits::Notifier;

/// Writes notifications to the log only.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, title: &str, message: &str) -> Result<(), CapabilityError> {
        info!(title, message, "notification");
        Ok(())
    }
}

/// Desktop notifications through the platform's notification helper.
#[derive(Debug, Clone, Copy, Default)]
pub struct DesktopNotifier;

impl Notifier for DesktopNotifier {
    fn notify(&self, title: &str, message: &str) -> Result<(), CapabilityError> {
        let (program, args) = desktop_command(title, message)?;
        let status = Command::new(program)
            .args(&args)
            .status()
            .map_err(|e| CapabilityError::CommandFailed {
                command: program.to_string(),
                message: e.to_string(),
            })?;
        if status.success() {
            Ok(())
        } else {
            Err(CapabilityError::CommandFailed {
                command: program.to_string(),
                message: format!("exited with {status}"),
            })
        }
    }
}

#[cfg(target_os = "linux")]
fn desktop_command(title: &str, message: &str) -> Result<(&'static str, Vec<String>), CapabilityError> {
    Ok(("notify-send", vec![title.to_string(), message.to_string()]))
}

#[cfg(target_os = "macos")]
fn desktop_command(title: &str, message: &str) -> Result<(&'static str, Vec<String>), CapabilityError> {
    let script = format!(
        "display notification \"{}\" with title \"{}\"",
        applescript_escape(message),
        applescript_escape(title)
    );
    Ok(("osascript", vec!["-e".to_string(), script]))
}

#[cfg(not(any(target_os = "linux", target_os = "macos")))]
fn desktop_command(_title: &str, _message: &str) -> Result<(&'static str, Vec<String>), CapabilityError> {
    Err(CapabilityError::Unsupported {
        capability: "desktop notifications",
        platform: std::env::consts::OS,
    })
}

#[cfg_attr(not(target_os = "macos"), allow(dead_code))]
fn applescript_escape(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}
