//! Break Reminder - periodic break alerts with a short countdown
//!
//! A repeating wake-up fires a desktop alert. Opening the alert starts a
//! countdown; when the countdown finishes (or the alert is dismissed) the
//! reminder interval starts over. An HTTP API offers manual control.

pub mod api;
pub mod config;
pub mod error;
pub mod events;
pub mod services;
pub mod state;
pub mod tasks;
pub mod utils;

// Re-export commonly used types
pub use api::create_router;
pub use config::{Config, DismissPolicy};
pub use error::{ReminderError, ReminderResult};
pub use events::{event_channel, Command, CommandReply, Event, UserAction};
pub use state::AppState;
pub use tasks::{coordinator_task, Coordinator};
pub use utils::signals::shutdown_signal;
