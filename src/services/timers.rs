//! Repeating timers that report their firings through the event channel

use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
    time::Duration,
};
use tokio::{
    task::JoinHandle,
    time::{interval_at, Instant, MissedTickBehavior},
};
use tracing::debug;

use crate::events::{Event, EventSender};

/// Which component a timer belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimerKind {
    /// The reminder schedule's repeating wake-up
    WakeUp,
    /// The one-second countdown tick
    Countdown,
}

/// Identifies one installed timer.
///
/// Generations never repeat, so a firing that was queued before its timer
/// got cancelled can always be told apart from the replacement timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerToken {
    pub kind: TimerKind,
    pub generation: u64,
}

/// Installs and cancels repeating timers
pub trait TimerRegistry: Send {
    /// Install a timer that first fires one `period` from now, then every `period`
    fn install(&mut self, kind: TimerKind, period: Duration) -> TimerToken;

    /// Cancel a timer. Unknown or already cancelled tokens are ignored.
    fn cancel(&mut self, token: TimerToken);

    /// Number of timers currently installed through this registry
    fn active(&self) -> usize;
}

/// Timer registry backed by tokio tasks
pub struct TokioTimers {
    events: EventSender,
    generations: Arc<AtomicU64>,
    handles: HashMap<TimerToken, JoinHandle<()>>,
}

impl TokioTimers {
    pub fn new(events: EventSender) -> Self {
        Self {
            events,
            generations: Arc::new(AtomicU64::new(0)),
            handles: HashMap::new(),
        }
    }

    /// A second registry sharing the channel and generation counter but
    /// owning its own timers
    pub fn sibling(&self) -> Self {
        Self {
            events: self.events.clone(),
            generations: Arc::clone(&self.generations),
            handles: HashMap::new(),
        }
    }
}

impl TimerRegistry for TokioTimers {
    fn install(&mut self, kind: TimerKind, period: Duration) -> TimerToken {
        let generation = self.generations.fetch_add(1, Ordering::Relaxed) + 1;
        let token = TimerToken { kind, generation };
        let events = self.events.clone();

        let handle = tokio::spawn(async move {
            let mut interval = interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                interval.tick().await;
                if events.send(Event::Tick(token)).is_err() {
                    debug!("Event channel closed, stopping {:?} timer", kind);
                    break;
                }
            }
        });

        debug!("Installed {:?} timer #{} every {:?}", kind, generation, period);
        self.handles.insert(token, handle);
        token
    }

    fn cancel(&mut self, token: TimerToken) {
        if let Some(handle) = self.handles.remove(&token) {
            handle.abort();
            debug!("Cancelled {:?} timer #{}", token.kind, token.generation);
        }
    }

    fn active(&self) -> usize {
        self.handles.len()
    }
}

impl Drop for TokioTimers {
    fn drop(&mut self) {
        for (_, handle) in self.handles.drain() {
            handle.abort();
        }
    }
}
