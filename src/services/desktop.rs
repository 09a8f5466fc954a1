//! Desktop notifications through the freedesktop notification server

use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc, Mutex,
};
use notify_rust::{Notification, Timeout};
use tracing::{debug, info, warn};

use super::notification::{Delivered, NotificationGateway};
use crate::{
    error::{ReminderError, ReminderResult},
    events::{Event, EventSender, UserAction},
};

const APP_NAME: &str = "Break Reminder";

/// Button on the alert; invoking it (or clicking the alert body) opens the break
const OPEN_ACTION: &str = "open";
const DEFAULT_ACTION: &str = "default";
/// Reported by `wait_for_action` when the alert closes without an action
const CLOSED_ACTION: &str = "__closed";

/// Map a notification server action key to a user action
pub fn action_for(key: &str) -> Option<UserAction> {
    match key {
        OPEN_ACTION | DEFAULT_ACTION => Some(UserAction::Opened),
        CLOSED_ACTION => Some(UserAction::Dismissed),
        _ => None,
    }
}

/// Forwards responses to the coordinator, dropping responses to alerts
/// that were replaced or withdrawn in the meantime
#[derive(Debug, Clone)]
struct ResponseRouter {
    events: EventSender,
    current: Arc<AtomicU64>,
}

impl ResponseRouter {
    /// Start a new alert generation; responses of older ones become stale
    fn advance(&self) -> u64 {
        self.current.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn deliver(&self, generation: u64, alert_id: String, key: &str) -> bool {
        if self.current.load(Ordering::SeqCst) != generation {
            debug!("Dropping response '{}' to a replaced alert", key);
            return false;
        }

        let Some(action) = action_for(key) else {
            debug!("Ignoring unknown notification action '{}'", key);
            return false;
        };

        debug!("Notification {} closed with {:?}", alert_id, action);
        self.events.send(Event::UserAction { alert_id, action }).is_ok()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PendingAlert {
    server_id: u32,
}

/// Gateway backed by notify-rust.
///
/// Every alert reuses the server id of the previous one, so a new alert
/// replaces the old one on screen instead of stacking up.
pub struct DesktopNotifier {
    available: bool,
    router: ResponseRouter,
    pending: Mutex<Option<(String, PendingAlert)>>,
    last_server_id: Mutex<Option<u32>>,
}

impl DesktopNotifier {
    pub fn new(available: bool, events: EventSender) -> Self {
        Self {
            available,
            router: ResponseRouter {
                events,
                current: Arc::new(AtomicU64::new(0)),
            },
            pending: Mutex::new(None),
            last_server_id: Mutex::new(None),
        }
    }

    fn replace_id(&self) -> Option<u32> {
        self.last_server_id.lock().ok().and_then(|id| *id)
    }

    fn build_notification(&self, title: &str, body: &str) -> Notification {
        let mut notification = Notification::new();
        notification
            .appname(APP_NAME)
            .summary(title)
            .body(body)
            .action(DEFAULT_ACTION, "Start timer")
            .action(OPEN_ACTION, "Start timer");

        if let Some(replace_id) = self.replace_id() {
            notification.id(replace_id);
        }
        notification
    }

    /// Forget the pending alert with this id and invalidate its responses
    fn take_pending(&self, id: &str) -> Option<PendingAlert> {
        let mut pending = match self.pending.lock() {
            Ok(pending) => pending,
            Err(e) => {
                warn!("Failed to lock pending alert: {}", e);
                return None;
            }
        };

        if pending.as_ref().is_some_and(|(pending_id, _)| pending_id == id) {
            self.router.advance();
            pending.take().map(|(_, alert)| alert)
        } else {
            None
        }
    }
}

impl NotificationGateway for DesktopNotifier {
    fn notify(&self, id: &str, title: &str, body: &str) -> ReminderResult<Delivered> {
        if !self.available {
            return Err(ReminderError::PermissionDenied);
        }

        let generation = self.router.advance();
        let handle = self
            .build_notification(title, body)
            .show()
            .map_err(|e| ReminderError::delivery(e.to_string()))?;

        let server_id = handle.id();
        debug!(server_id, "Desktop notification shown");
        if let Ok(mut last) = self.last_server_id.lock() {
            *last = Some(server_id);
        }
        if let Ok(mut pending) = self.pending.lock() {
            *pending = Some((id.to_string(), PendingAlert { server_id }));
        }

        let router = self.router.clone();
        let alert_id = id.to_string();
        tokio::task::spawn_blocking(move || {
            handle.wait_for_action(|key| {
                router.deliver(generation, alert_id, key);
            });
        });

        Ok(Delivered::now(id))
    }

    fn clear_pending(&self, id: &str) {
        let Some(alert) = self.take_pending(id) else {
            return;
        };

        // Withdraw from screen by replacing it with an alert that expires at once
        let result = Notification::new()
            .appname(APP_NAME)
            .summary("Break reminder withdrawn")
            .id(alert.server_id)
            .timeout(Timeout::Milliseconds(1))
            .show();

        match result {
            Ok(_) => debug!(server_id = alert.server_id, "Cleared pending alert {}", id),
            Err(e) => debug!("Could not withdraw alert {}: {}", id, e),
        }
    }
}

/// Check whether a notification server is reachable
pub async fn check_notification_server() -> Result<(), String> {
    let server = tokio::task::spawn_blocking(notify_rust::get_server_information)
        .await
        .map_err(|e| format!("Notification server check failed: {}", e))?
        .map_err(|e| format!("No notification server, notifications will be denied: {}", e))?;

    info!("Notification server: {} {} ({})", server.name, server.version, server.vendor);
    Ok(())
}
