//! Break countdown
//!
//! [`Countdown`] is the pure state machine:
//!
//! ```text
//! Inactive --start--> Running --tick to 0--> Completed --acknowledge--> Inactive
//!                     Running --cancel-----> Inactive
//! ```
//!
//! [`CountdownSession`] drives it with a one-second timer and talks to the
//! presentation surface and the completion sound.

use std::{sync::Arc, time::Duration};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::services::{AudioCue, PresentationSurface, TimerKind, TimerRegistry, TimerToken};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CountdownPhase {
    Inactive,
    Running,
    Completed,
}

/// Outcome of a single tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountdownStep {
    /// Not running, nothing changed
    Idle,
    /// Still running with this many seconds left
    Remaining(u64),
    /// Reached zero on this tick
    Completed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Countdown {
    remaining: u64,
    phase: CountdownPhase,
}

impl Countdown {
    pub fn new() -> Self {
        Self {
            remaining: 0,
            phase: CountdownPhase::Inactive,
        }
    }

    /// Start from `duration` seconds. Returns false if already running.
    pub fn start(&mut self, duration: u64) -> bool {
        if self.phase == CountdownPhase::Running {
            return false;
        }
        self.remaining = duration;
        self.phase = CountdownPhase::Running;
        true
    }

    /// Advance by one second
    pub fn tick(&mut self) -> CountdownStep {
        if self.phase != CountdownPhase::Running {
            return CountdownStep::Idle;
        }

        self.remaining = self.remaining.saturating_sub(1);
        if self.remaining == 0 {
            self.phase = CountdownPhase::Completed;
            CountdownStep::Completed
        } else {
            CountdownStep::Remaining(self.remaining)
        }
    }

    /// Stop a running countdown. Returns false if it was not running.
    pub fn cancel(&mut self) -> bool {
        if self.phase != CountdownPhase::Running {
            return false;
        }
        self.remaining = 0;
        self.phase = CountdownPhase::Inactive;
        true
    }

    /// Mark a completed countdown as handled
    pub fn acknowledge(&mut self) {
        if self.phase == CountdownPhase::Completed {
            self.phase = CountdownPhase::Inactive;
        }
    }

    pub fn phase(&self) -> CountdownPhase {
        self.phase
    }

    pub fn remaining(&self) -> u64 {
        self.remaining
    }

    pub fn is_running(&self) -> bool {
        self.phase == CountdownPhase::Running
    }
}

impl Default for Countdown {
    fn default() -> Self {
        Self::new()
    }
}

/// Emitted once when a countdown reaches zero
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CountdownCompleted {
    pub duration_seconds: u64,
}

/// Runs one countdown at a time
pub struct CountdownSession {
    countdown: Countdown,
    duration_seconds: u64,
    timers: Box<dyn TimerRegistry>,
    tick: Option<TimerToken>,
    surface: Arc<dyn PresentationSurface>,
    audio: Arc<dyn AudioCue>,
    completions: u64,
}

impl CountdownSession {
    pub fn new(
        timers: Box<dyn TimerRegistry>,
        surface: Arc<dyn PresentationSurface>,
        audio: Arc<dyn AudioCue>,
    ) -> Self {
        Self {
            countdown: Countdown::new(),
            duration_seconds: 0,
            timers,
            tick: None,
            surface,
            audio,
            completions: 0,
        }
    }

    /// Start a countdown and present it. A second start while running is
    /// ignored and returns false.
    pub fn start(&mut self, duration_seconds: u64) -> bool {
        if !self.countdown.start(duration_seconds) {
            debug!("Countdown already running, ignoring start");
            return false;
        }

        self.duration_seconds = duration_seconds;
        self.surface.show();
        self.surface.render(duration_seconds);
        self.tick = Some(self.timers.install(TimerKind::Countdown, Duration::from_secs(1)));
        info!("Countdown started for {}s", duration_seconds);
        true
    }

    /// Handle a one-second tick. Returns the completion exactly once, on
    /// the tick that reaches zero.
    pub fn on_tick(&mut self, token: TimerToken) -> Option<CountdownCompleted> {
        if self.tick != Some(token) {
            debug!("Ignoring stale countdown tick #{}", token.generation);
            return None;
        }

        match self.countdown.tick() {
            CountdownStep::Idle => None,
            CountdownStep::Remaining(remaining) => {
                self.surface.render(remaining);
                None
            }
            CountdownStep::Completed => {
                self.stop_ticking();
                self.surface.render(0);
                self.audio.play_completion();
                self.surface.hide();
                self.completions += 1;
                info!("Countdown completed");
                Some(CountdownCompleted {
                    duration_seconds: self.duration_seconds,
                })
            }
        }
    }

    /// Cancel a running countdown without the completion cue. Does nothing
    /// when no countdown is running.
    pub fn cancel(&mut self) -> bool {
        if !self.countdown.cancel() {
            debug!("No countdown running, nothing to cancel");
            return false;
        }

        self.stop_ticking();
        self.surface.hide();
        info!("Countdown cancelled");
        true
    }

    /// Return a completed countdown to inactive
    pub fn acknowledge(&mut self) {
        self.countdown.acknowledge();
    }

    fn stop_ticking(&mut self) {
        if let Some(token) = self.tick.take() {
            self.timers.cancel(token);
        }
    }

    pub fn phase(&self) -> CountdownPhase {
        self.countdown.phase()
    }

    pub fn remaining(&self) -> u64 {
        self.countdown.remaining()
    }

    pub fn is_running(&self) -> bool {
        self.countdown.is_running()
    }

    pub fn completions(&self) -> u64 {
        self.completions
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn twenty_ticks_complete_once() {
        let mut countdown = Countdown::new();
        assert!(countdown.start(20));

        let mut completed = 0;
        for _ in 0..20 {
            if countdown.tick() == CountdownStep::Completed {
                completed += 1;
            }
        }
        assert_eq!(completed, 1);
        assert_eq!(countdown.phase(), CountdownPhase::Completed);
        assert_eq!(countdown.remaining(), 0);

        assert_eq!(countdown.tick(), CountdownStep::Idle);
        assert_eq!(countdown.remaining(), 0);
        assert_eq!(countdown.phase(), CountdownPhase::Completed);
    }

    #[test]
    fn nineteenth_tick_leaves_one_second() {
        let mut countdown = Countdown::new();
        countdown.start(20);
        for _ in 0..18 {
            countdown.tick();
        }
        assert_eq!(countdown.tick(), CountdownStep::Remaining(1));
        assert!(countdown.is_running());
    }

    #[test]
    fn start_while_running_changes_nothing() {
        let mut countdown = Countdown::new();
        countdown.start(20);
        countdown.tick();
        countdown.tick();

        let before = countdown.clone();
        assert!(!countdown.start(20));
        assert_eq!(countdown, before);
        assert_eq!(countdown.remaining(), 18);
    }

    #[test]
    fn zero_duration_completes_on_first_tick() {
        let mut countdown = Countdown::new();
        countdown.start(0);
        assert_eq!(countdown.tick(), CountdownStep::Completed);
    }

    #[test]
    fn cancel_only_affects_running() {
        let mut countdown = Countdown::new();
        assert!(!countdown.cancel());
        assert_eq!(countdown.phase(), CountdownPhase::Inactive);

        countdown.start(5);
        assert!(countdown.cancel());
        assert_eq!(countdown.phase(), CountdownPhase::Inactive);
        assert_eq!(countdown.tick(), CountdownStep::Idle);
    }

    #[test]
    fn acknowledge_returns_to_inactive_and_allows_restart() {
        let mut countdown = Countdown::new();
        countdown.start(1);
        assert_eq!(countdown.tick(), CountdownStep::Completed);

        countdown.acknowledge();
        assert_eq!(countdown.phase(), CountdownPhase::Inactive);
        assert!(countdown.start(20));
        assert_eq!(countdown.remaining(), 20);
    }
}
