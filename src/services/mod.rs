//! Host platform collaborators
//!
//! This module contains the services the reminder core talks to: timers,
//! notification delivery, the countdown surface and the completion sound.

pub mod audio;
#[cfg(all(unix, not(target_os = "macos")))]
pub mod desktop;
pub mod notification;
pub mod presentation;
pub mod timers;

// Re-export main types
pub use audio::{AudioCue, SystemAudioCue};
#[cfg(all(unix, not(target_os = "macos")))]
pub use desktop::{check_notification_server, DesktopNotifier};
pub use notification::{build_notifier, Delivered, LogNotifier, NotificationGateway};
pub use presentation::{PresentationSurface, TerminalSurface};
pub use timers::{TimerKind, TimerRegistry, TimerToken, TokioTimers};
