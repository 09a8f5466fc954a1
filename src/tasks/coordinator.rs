//! Coordinator: wires alerts, user actions and countdown completion together

use std::sync::Arc;
use chrono::{DateTime, Utc};
use tracing::{debug, info};

use crate::{
    config::DismissPolicy,
    events::{Command, CommandReply, Event, EventReceiver, UserAction},
    services::TimerKind,
    state::{AppState, CountdownCompleted, CountdownSession, ReminderScheduler, StatusSnapshot},
};

/// Whether the loop should keep running after an event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Shutdown,
}

/// Owns the scheduler and the countdown session and reacts to events.
///
/// All state changes happen inside [`Coordinator::handle`], one event at a
/// time, so a tick can never race a cancellation.
pub struct Coordinator {
    scheduler: ReminderScheduler,
    countdown: CountdownSession,
    countdown_seconds: u64,
    dismiss_policy: DismissPolicy,
    last_action: Option<String>,
    last_action_time: Option<DateTime<Utc>>,
}

impl Coordinator {
    pub fn new(
        scheduler: ReminderScheduler,
        countdown: CountdownSession,
        countdown_seconds: u64,
        dismiss_policy: DismissPolicy,
    ) -> Self {
        Self {
            scheduler,
            countdown,
            countdown_seconds,
            dismiss_policy,
            last_action: None,
            last_action_time: None,
        }
    }

    pub fn handle(&mut self, event: Event) -> Flow {
        match event {
            Event::Tick(token) => match token.kind {
                TimerKind::WakeUp => {
                    self.scheduler.on_tick(token);
                }
                TimerKind::Countdown => {
                    if let Some(completed) = self.countdown.on_tick(token) {
                        self.on_countdown_completed(completed);
                    }
                }
            },
            Event::UserAction { alert_id, action } => {
                if alert_id != self.scheduler.alert().id {
                    debug!("Ignoring {:?} for unknown alert {}", action, alert_id);
                } else {
                    self.on_user_action(action);
                }
            }
            Event::Control { command, reply } => {
                let outcome = self.run(command);
                if let Some(reply) = reply {
                    if reply.send(outcome).is_err() {
                        debug!("Requester went away before the {} reply", command.name());
                    }
                }
            }
            Event::Shutdown => {
                self.shutdown();
                return Flow::Shutdown;
            }
        }
        Flow::Continue
    }

    fn on_user_action(&mut self, action: UserAction) {
        match action {
            UserAction::Opened => {
                self.record_action("opened");
                if !self.countdown.start(self.countdown_seconds) {
                    debug!("Alert opened while a countdown is running");
                }
            }
            UserAction::Dismissed => {
                self.record_action("dismissed");
                if self.countdown.cancel() {
                    info!("Alert dismissed, countdown cancelled");
                }
                match self.dismiss_policy {
                    DismissPolicy::Rearm => self.scheduler.start(),
                    DismissPolicy::Wait => info!("Alert dismissed, waiting for the next reminder"),
                }
            }
        }
    }

    fn on_countdown_completed(&mut self, completed: CountdownCompleted) {
        info!("Break of {}s finished, restarting the reminder interval", completed.duration_seconds);
        self.countdown.acknowledge();
        self.scheduler.start();
    }

    /// Apply a manual command
    pub fn apply(&mut self, command: Command) {
        if let Some(error) = self.execute(command) {
            debug!("{} did not take effect: {}", command.name(), error);
        }
    }

    /// Apply a manual command and report its outcome
    pub fn run(&mut self, command: Command) -> CommandReply {
        let error = self.execute(command);
        CommandReply {
            snapshot: self.snapshot(),
            error,
        }
    }

    fn execute(&mut self, command: Command) -> Option<String> {
        let mut error = None;
        match command {
            Command::Start => self.scheduler.start(),
            Command::Stop => self.scheduler.stop(),
            Command::SendNow => {
                error = self.scheduler.fire_alert().err().map(|e| e.to_string());
            }
            Command::CancelCountdown => {
                self.countdown.cancel();
            }
            Command::Status => return None,
        }
        self.record_action(command.name());
        error
    }

    fn shutdown(&mut self) {
        info!("Shutting down reminder schedule");
        self.countdown.cancel();
        self.scheduler.stop();
    }

    fn record_action(&mut self, action: &str) {
        self.last_action = Some(action.to_string());
        self.last_action_time = Some(Utc::now());
    }

    pub fn snapshot(&self) -> StatusSnapshot {
        StatusSnapshot {
            scheduler: self.scheduler.state(),
            interval_seconds: self.scheduler.interval().as_secs(),
            next_alert_at: self.scheduler.next_alert_at(),
            countdown: self.countdown.phase(),
            countdown_seconds: self.countdown_seconds,
            countdown_remaining: self
                .countdown
                .is_running()
                .then(|| self.countdown.remaining()),
            alerts_fired: self.scheduler.alerts_fired(),
            delivery_failures: self.scheduler.delivery_failures(),
            last_error: self.scheduler.last_error().map(str::to_string),
            last_action: self.last_action.clone(),
            last_action_time: self.last_action_time,
        }
    }

    pub fn scheduler(&self) -> &ReminderScheduler {
        &self.scheduler
    }

    pub fn countdown(&self) -> &CountdownSession {
        &self.countdown
    }
}

/// Background task that feeds events to the coordinator and publishes the
/// resulting status
pub async fn coordinator_task(mut coordinator: Coordinator, mut events: EventReceiver, state: Arc<AppState>) {
    info!("Starting coordinator task");
    state.publish(coordinator.snapshot());

    while let Some(event) = events.recv().await {
        // Publish before replying so a requester never reads an older snapshot
        if let Event::Control { command, reply } = event {
            let outcome = coordinator.run(command);
            state.publish(outcome.snapshot.clone());
            if let Some(reply) = reply {
                if reply.send(outcome).is_err() {
                    debug!("Requester went away before the {} reply", command.name());
                }
            }
            continue;
        }

        let flow = coordinator.handle(event);
        state.publish(coordinator.snapshot());
        if flow == Flow::Shutdown {
            break;
        }
    }

    info!("Coordinator task stopped");
}
