/// Desktop notifications through `notify-send`
use crate::config::NotificationSettings;
use std::process::{Command, Stdio};
use tracing::debug;

const SUMMARY: &str = "riff";

#[derive(Debug, Clone)]
pub struct Notifier {
    enabled: bool,
    program: String,
}

impl Notifier {
    pub fn new(settings: &NotificationSettings) -> Self {
        Self {
            enabled: settings.enabled,
            program: settings.program.clone(),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Fire and forget; failures are only logged
    pub fn notify(&self, message: &str) {
        if !self.enabled {
            return;
        }

        let mut command = Command::new(&self.program);
        command
            .args([SUMMARY, message])
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());

        let program = self.program.clone();
        let spawned = std::thread::Builder::new()
            .name("riff-notify".to_string())
            .spawn(move || match command.status() {
                Ok(status) if !status.success() => {
                    debug!(program = %program, %status, "Notification command failed");
                }
                Ok(_) => {}
                Err(e) => debug!(program = %program, error = %e, "Notification command unavailable"),
            });

        if let Err(e) = spawned {
            debug!(error = %e, "Failed to spawn notification thread");
        }
    }
}
