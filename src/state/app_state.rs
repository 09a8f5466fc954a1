//! Shared handle used by the control surface

use std::time::Instant;
use tokio::sync::{oneshot, watch};
use tracing::warn;

use super::StatusSnapshot;
use crate::{
    error::{ReminderError, ReminderResult},
    events::{Command, CommandReply, Event, EventSender, UserAction},
};

/// Application state shared with the HTTP handlers.
///
/// Handlers never touch the scheduler or the countdown. They send events to
/// the coordinator and read the snapshot it publishes.
#[derive(Debug)]
pub struct AppState {
    /// Server metadata
    pub start_time: Instant,
    pub port: u16,
    pub host: String,
    /// Channel into the coordinator loop
    events: EventSender,
    /// Latest published status
    status_tx: watch::Sender<StatusSnapshot>,
    /// Keep the receiver alive to prevent channel closure
    _status_rx: watch::Receiver<StatusSnapshot>,
}

impl AppState {
    pub fn new(port: u16, host: String, events: EventSender, initial: StatusSnapshot) -> Self {
        let (status_tx, status_rx) = watch::channel(initial);

        Self {
            start_time: Instant::now(),
            port,
            host,
            events,
            status_tx,
            _status_rx: status_rx,
        }
    }

    /// Send a command and wait for its outcome
    pub async fn request(&self, command: Command) -> ReminderResult<CommandReply> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.events
            .send(Event::Control {
                command,
                reply: Some(reply_tx),
            })
            .map_err(|_| ReminderError::ChannelClosed)?;

        reply_rx.await.map_err(|_| ReminderError::ChannelClosed)
    }

    /// Report a user action on the break alert
    pub fn user_action(&self, action: UserAction) -> ReminderResult<()> {
        self.events
            .send(Event::user_action(action))
            .map_err(|_| ReminderError::ChannelClosed)
    }

    /// Ask the coordinator loop to stop
    pub fn shutdown(&self) -> ReminderResult<()> {
        self.events
            .send(Event::Shutdown)
            .map_err(|_| ReminderError::ChannelClosed)
    }

    /// Publish a new snapshot to watchers
    pub fn publish(&self, snapshot: StatusSnapshot) {
        if let Err(e) = self.status_tx.send(snapshot) {
            warn!("Failed to publish status update: {}", e);
        }
    }

    /// Latest published snapshot
    pub fn status(&self) -> StatusSnapshot {
        self.status_tx.borrow().clone()
    }

    /// Calculate server uptime as a formatted string
    pub fn get_uptime(&self) -> String {
        let duration = self.start_time.elapsed();
        let hours = duration.as_secs() / 3600;
        let minutes = (duration.as_secs() % 3600) / 60;
        let seconds = duration.as_secs() % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}s", seconds)
        }
    }
}
