//! Countdown presentation

use tracing::info;

/// Displays the countdown while a break is running.
///
/// The reminder core only tells the surface what to show; it never renders.
pub trait PresentationSurface: Send + Sync {
    fn show(&self);

    /// Reflect a new remaining value
    fn render(&self, remaining_seconds: u64);

    fn hide(&self);
}

/// Surface that writes the countdown to the log
#[derive(Debug, Default)]
pub struct TerminalSurface;

impl PresentationSurface for TerminalSurface {
    fn show(&self) {
        info!("Break started, step away from the screen");
    }

    fn render(&self, remaining_seconds: u64) {
        info!("Break: {}s remaining", remaining_seconds);
    }

    fn hide(&self) {
        info!("Break surface dismissed");
    }
}
