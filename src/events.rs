//! Event vocabulary consumed by the coordinator loop
//!
//! Timers, the notification gateway and the HTTP control surface never call
//! into the reminder core directly. They push events into one channel and
//! the coordinator task handles them one at a time.

use serde::{Deserialize, Serialize};
use tokio::sync::{mpsc, oneshot};

use crate::{services::timers::TimerToken, state::StatusSnapshot};

/// Identity of the break alert; a new alert always replaces the pending one
pub const BREAK_ALERT_ID: &str = "break-reminder";

/// How the user responded to a delivered alert
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserAction {
    Opened,
    Dismissed,
}

/// Manual requests coming from the control surface
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Arm (or re-arm) the reminder schedule
    Start,
    /// Disarm the reminder schedule
    Stop,
    /// Fire an alert right now without touching the schedule
    SendNow,
    /// Cancel a running countdown
    CancelCountdown,
    /// No-op, used to read a consistent snapshot
    Status,
}

impl Command {
    pub fn name(&self) -> &'static str {
        match self {
            Command::Start => "start",
            Command::Stop => "stop",
            Command::SendNow => "send-now",
            Command::CancelCountdown => "cancel-countdown",
            Command::Status => "status",
        }
    }
}

/// Outcome of a control command
#[derive(Debug, Clone)]
pub struct CommandReply {
    /// Status right after the command was applied
    pub snapshot: StatusSnapshot,
    /// Why the command did not take effect, e.g. an undelivered alert
    pub error: Option<String>,
}

#[derive(Debug)]
pub enum Event {
    /// A repeating timer fired
    Tick(TimerToken),
    /// The user acted on a delivered alert
    UserAction { alert_id: String, action: UserAction },
    /// A manual command; the reply receives the outcome once it was applied
    Control {
        command: Command,
        reply: Option<oneshot::Sender<CommandReply>>,
    },
    /// Stop everything and leave the loop
    Shutdown,
}

impl Event {
    /// Control event without a reply channel
    pub fn command(command: Command) -> Self {
        Event::Control { command, reply: None }
    }

    /// User action on the break alert
    pub fn user_action(action: UserAction) -> Self {
        Event::UserAction {
            alert_id: BREAK_ALERT_ID.to_string(),
            action,
        }
    }
}

pub type EventSender = mpsc::UnboundedSender<Event>;
pub type EventReceiver = mpsc::UnboundedReceiver<Event>;

/// Create the coordinator event channel
pub fn event_channel() -> (EventSender, EventReceiver) {
    mpsc::unbounded_channel()
}
