//! Configuration and CLI argument handling

use std::{path::PathBuf, time::Duration};
use clap::{Parser, ValueEnum};
use serde::{Deserialize, Serialize};

use crate::error::{ReminderError, ReminderResult};

/// What happens when the user dismisses an alert instead of opening it
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DismissPolicy {
    /// Restart the full interval right away
    Rearm,
    /// Leave the schedule alone and wait for the next natural wake-up
    Wait,
}

/// How alerts reach the user
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum NotifierKind {
    /// Desktop notifications through the notification server
    Desktop,
    /// Log only; respond through the HTTP API
    Log,
}

/// CLI argument parsing structure
#[derive(Parser, Debug, Clone)]
#[command(name = "break-reminder")]
#[command(about = "Periodic break reminders with a short countdown")]
#[command(version)]
pub struct Config {
    /// Seconds between reminders
    #[arg(short, long, default_value = "1200")]
    pub interval: u64,

    /// Length of the break countdown in seconds
    #[arg(short, long, default_value = "20")]
    pub countdown: u64,

    /// What a dismissed alert does to the schedule
    #[arg(long, value_enum, default_value_t = DismissPolicy::Rearm)]
    pub dismiss_policy: DismissPolicy,

    /// How alerts are delivered
    #[arg(long, value_enum, default_value_t = NotifierKind::Desktop)]
    pub notifier: NotifierKind,

    /// Sound played when a countdown completes
    #[arg(long, default_value = "/usr/share/sounds/freedesktop/stereo/complete.oga")]
    pub sound: PathBuf,

    /// Program used to play the completion sound
    #[arg(long, default_value = "paplay")]
    pub sound_player: String,

    /// Port for the control API
    #[arg(short, long, default_value = "20554")]
    pub port: u16,

    /// Host address for the control API
    #[arg(long, default_value = "127.0.0.1")]
    pub host: String,

    /// Do not arm the schedule at start-up
    #[arg(long)]
    pub no_autostart: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Config {
    /// Parse configuration from command line arguments
    pub fn parse() -> Self {
        Parser::parse()
    }

    /// Reject values the scheduler cannot work with
    pub fn validate(&self) -> ReminderResult<()> {
        if self.interval == 0 {
            return Err(ReminderError::config("reminder interval must be at least one second"));
        }
        if self.countdown == 0 {
            return Err(ReminderError::config("countdown duration must be at least one second"));
        }
        Ok(())
    }

    pub fn reminder_interval(&self) -> Duration {
        Duration::from_secs(self.interval)
    }

    /// Get the server address as a formatted string
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Get the appropriate log level based on verbose flag
    pub fn log_level(&self) -> &'static str {
        if self.verbose { "debug" } else { "info" }
    }
}
