//! Error types for the reminder daemon

use thiserror::Error;

/// Errors produced by the reminder core and its collaborators.
///
/// None of these ever stop the scheduler: collaborator failures are logged
/// and counted, and the next natural tick proceeds as usual.
#[derive(Error, Debug)]
pub enum ReminderError {
    /// The notification could not be handed to the host
    #[error("Notification delivery failed: {0}")]
    DeliveryFailure(String),

    /// The host refuses notifications (no permission or no notification service)
    #[error("Notification permission denied")]
    PermissionDenied,

    /// Invalid configuration detected at start-up
    #[error("Configuration error: {0}")]
    Config(String),

    /// The coordinator event loop is no longer running
    #[error("Coordinator is not running")]
    ChannelClosed,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ReminderError {
    pub fn delivery<S: Into<String>>(msg: S) -> Self {
        ReminderError::DeliveryFailure(msg.into())
    }

    pub fn config<S: Into<String>>(msg: S) -> Self {
        ReminderError::Config(msg.into())
    }
}

/// Result alias used across the crate
pub type ReminderResult<T> = Result<T, ReminderError>;
