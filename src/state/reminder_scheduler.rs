//! Repeating break reminder schedule

use std::{sync::Arc, time::Duration};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::{
    error::ReminderResult,
    events::BREAK_ALERT_ID,
    services::{Delivered, NotificationGateway, TimerKind, TimerRegistry, TimerToken},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SchedulerState {
    /// No wake-up installed
    Idle,
    /// A repeating wake-up is installed
    Armed,
}

/// Content of the alert sent on every wake-up
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alert {
    pub id: String,
    pub title: String,
    pub body: String,
}

impl Alert {
    pub fn break_reminder(countdown_seconds: u64) -> Self {
        Self {
            id: BREAK_ALERT_ID.to_string(),
            title: "Time for a break!".to_string(),
            body: format!("Click to start your {}-second timer", countdown_seconds),
        }
    }
}

/// Owns the repeating wake-up and fires alerts.
///
/// At most one wake-up is installed at a time: arming always cancels the
/// previous wake-up before installing the next one.
pub struct ReminderScheduler {
    interval: Duration,
    alert: Alert,
    timers: Box<dyn TimerRegistry>,
    gateway: Arc<dyn NotificationGateway>,
    wake_up: Option<TimerToken>,
    next_alert_at: Option<DateTime<Utc>>,
    alerts_fired: u64,
    delivery_failures: u64,
    last_error: Option<String>,
}

impl ReminderScheduler {
    pub fn new(
        interval: Duration,
        alert: Alert,
        timers: Box<dyn TimerRegistry>,
        gateway: Arc<dyn NotificationGateway>,
    ) -> Self {
        Self {
            interval,
            alert,
            timers,
            gateway,
            wake_up: None,
            next_alert_at: None,
            alerts_fired: 0,
            delivery_failures: 0,
            last_error: None,
        }
    }

    /// Arm the schedule, replacing any wake-up that is already installed
    pub fn start(&mut self) {
        self.disarm();
        self.wake_up = Some(self.timers.install(TimerKind::WakeUp, self.interval));
        self.schedule_next();
        info!("Reminder schedule armed, next alert in {}s", self.interval.as_secs());
    }

    /// Disarm the schedule. Does nothing when already idle.
    pub fn stop(&mut self) {
        if self.disarm() {
            info!("Reminder schedule stopped");
        } else {
            debug!("Reminder schedule already idle");
        }
    }

    fn disarm(&mut self) -> bool {
        self.next_alert_at = None;
        match self.wake_up.take() {
            Some(token) => {
                self.timers.cancel(token);
                true
            }
            None => false,
        }
    }

    /// Handle a wake-up firing. Returns false for firings of a wake-up
    /// that is no longer installed.
    pub fn on_tick(&mut self, token: TimerToken) -> bool {
        if self.wake_up != Some(token) {
            debug!("Ignoring stale wake-up #{}", token.generation);
            return false;
        }

        self.schedule_next();
        // Failures are already recorded by fire_alert
        let _ = self.fire_alert();
        true
    }

    /// Replace any pending alert with a fresh one.
    ///
    /// Delivery failures are recorded and logged but never disarm the
    /// schedule; the next attempt is the next natural wake-up.
    pub fn fire_alert(&mut self) -> ReminderResult<Delivered> {
        self.gateway.clear_pending(&self.alert.id);

        match self.gateway.notify(&self.alert.id, &self.alert.title, &self.alert.body) {
            Ok(delivered) => {
                self.alerts_fired += 1;
                self.last_error = None;
                info!("Break alert delivered ({} so far)", self.alerts_fired);
                Ok(delivered)
            }
            Err(e) => {
                self.delivery_failures += 1;
                warn!("Break alert not delivered: {}", e);
                self.last_error = Some(e.to_string());
                Err(e)
            }
        }
    }

    fn schedule_next(&mut self) {
        self.next_alert_at = chrono::Duration::from_std(self.interval)
            .ok()
            .map(|interval| Utc::now() + interval);
    }

    pub fn state(&self) -> SchedulerState {
        if self.wake_up.is_some() {
            SchedulerState::Armed
        } else {
            SchedulerState::Idle
        }
    }

    pub fn is_armed(&self) -> bool {
        self.wake_up.is_some()
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn alert(&self) -> &Alert {
        &self.alert
    }

    pub fn next_alert_at(&self) -> Option<DateTime<Utc>> {
        self.next_alert_at
    }

    pub fn alerts_fired(&self) -> u64 {
        self.alerts_fired
    }

    pub fn delivery_failures(&self) -> u64 {
        self.delivery_failures
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ReminderError, ReminderResult};
    use std::sync::Mutex;

    #[derive(Default)]
    struct CountingTimers {
        next: u64,
        installed: Vec<TimerToken>,
        cancels: usize,
    }

    impl TimerRegistry for CountingTimers {
        fn install(&mut self, kind: TimerKind, _period: Duration) -> TimerToken {
            self.next += 1;
            let token = TimerToken { kind, generation: self.next };
            self.installed.push(token);
            token
        }

        fn cancel(&mut self, token: TimerToken) {
            if let Some(pos) = self.installed.iter().position(|t| *t == token) {
                self.installed.remove(pos);
                self.cancels += 1;
            }
        }

        fn active(&self) -> usize {
            self.installed.len()
        }
    }

    #[derive(Default)]
    struct FlakyGateway {
        fail: bool,
        calls: Mutex<Vec<String>>,
    }

    impl NotificationGateway for FlakyGateway {
        fn notify(&self, id: &str, title: &str, _body: &str) -> ReminderResult<Delivered> {
            self.calls.lock().unwrap().push(format!("notify:{}:{}", id, title));
            if self.fail {
                Err(ReminderError::PermissionDenied)
            } else {
                Ok(Delivered::now(id))
            }
        }

        fn clear_pending(&self, id: &str) {
            self.calls.lock().unwrap().push(format!("clear:{}", id));
        }
    }

    fn scheduler(gateway: Arc<FlakyGateway>) -> ReminderScheduler {
        ReminderScheduler::new(
            Duration::from_secs(10),
            Alert::break_reminder(20),
            Box::new(CountingTimers::default()),
            gateway,
        )
    }

    #[test]
    fn alert_text_mentions_countdown() {
        let alert = Alert::break_reminder(20);
        assert_eq!(alert.title, "Time for a break!");
        assert_eq!(alert.body, "Click to start your 20-second timer");
    }

    #[test]
    fn start_twice_keeps_single_wake_up() {
        let mut scheduler = scheduler(Arc::new(FlakyGateway::default()));
        scheduler.start();
        let first = scheduler.wake_up;
        scheduler.start();

        assert_eq!(scheduler.state(), SchedulerState::Armed);
        assert_eq!(scheduler.timers.active(), 1);
        assert_ne!(scheduler.wake_up, first);
        assert!(scheduler.next_alert_at().is_some());
    }

    #[test]
    fn stop_is_idempotent() {
        let mut scheduler = scheduler(Arc::new(FlakyGateway::default()));
        scheduler.stop();
        assert_eq!(scheduler.state(), SchedulerState::Idle);

        scheduler.start();
        scheduler.stop();
        scheduler.stop();
        assert_eq!(scheduler.state(), SchedulerState::Idle);
        assert_eq!(scheduler.timers.active(), 0);
        assert!(scheduler.next_alert_at().is_none());
    }

    #[test]
    fn stale_wake_up_is_ignored() {
        let gateway = Arc::new(FlakyGateway::default());
        let mut scheduler = scheduler(Arc::clone(&gateway));
        scheduler.start();
        let old = scheduler.wake_up.unwrap();
        scheduler.start();

        assert!(!scheduler.on_tick(old));
        assert!(gateway.calls.lock().unwrap().is_empty());

        let current = scheduler.wake_up.unwrap();
        assert!(scheduler.on_tick(current));
        assert_eq!(scheduler.alerts_fired(), 1);
    }

    #[test]
    fn fire_alert_clears_before_notifying() {
        let gateway = Arc::new(FlakyGateway::default());
        let mut scheduler = scheduler(Arc::clone(&gateway));

        assert!(scheduler.fire_alert().is_ok());
        let calls = gateway.calls.lock().unwrap().clone();
        assert_eq!(
            calls,
            vec![
                format!("clear:{}", BREAK_ALERT_ID),
                format!("notify:{}:Time for a break!", BREAK_ALERT_ID),
            ]
        );
    }

    #[test]
    fn delivery_failure_keeps_schedule_armed() {
        let gateway = Arc::new(FlakyGateway { fail: true, ..Default::default() });
        let mut scheduler = scheduler(gateway);
        scheduler.start();
        let token = scheduler.wake_up.unwrap();

        assert!(scheduler.on_tick(token));
        assert!(scheduler.on_tick(token));

        assert_eq!(scheduler.state(), SchedulerState::Armed);
        assert_eq!(scheduler.alerts_fired(), 0);
        assert_eq!(scheduler.delivery_failures(), 2);
        assert_eq!(scheduler.last_error(), Some("Notification permission denied"));
    }
}
