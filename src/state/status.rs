//! Status snapshot published after every handled event

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{CountdownPhase, SchedulerState};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusSnapshot {
    pub scheduler: SchedulerState,
    pub interval_seconds: u64,
    pub next_alert_at: Option<DateTime<Utc>>,
    pub countdown: CountdownPhase,
    pub countdown_seconds: u64,
    /// Seconds left, only while a countdown is running
    pub countdown_remaining: Option<u64>,
    pub alerts_fired: u64,
    pub delivery_failures: u64,
    pub last_error: Option<String>,
    pub last_action: Option<String>,
    pub last_action_time: Option<DateTime<Utc>>,
}

impl StatusSnapshot {
    pub fn is_armed(&self) -> bool {
        self.scheduler == SchedulerState::Armed
    }

    pub fn on_break(&self) -> bool {
        self.countdown == CountdownPhase::Running
    }

    /// Short label for API responses
    pub fn label(&self) -> &'static str {
        if self.on_break() {
            "break"
        } else if self.is_armed() {
            "armed"
        } else {
            "idle"
        }
    }
}
