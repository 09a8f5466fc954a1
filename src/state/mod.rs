//! State management module
//!
//! This module contains the reminder schedule, the countdown state machine
//! and the shared state handed to the control surface.

pub mod app_state;
pub mod countdown;
pub mod reminder_scheduler;
pub mod status;

// Re-export main types
pub use app_state::AppState;
pub use countdown::{Countdown, CountdownCompleted, CountdownPhase, CountdownSession, CountdownStep};
pub use reminder_scheduler::{Alert, ReminderScheduler, SchedulerState};
pub use status::StatusSnapshot;
