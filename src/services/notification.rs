//! Notification delivery

use std::sync::Arc;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, warn};

use crate::{
    config::{Config, NotifierKind},
    error::ReminderResult,
    events::EventSender,
};

/// Receipt for an alert handed to the host
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Delivered {
    pub id: String,
    pub at: DateTime<Utc>,
}

impl Delivered {
    pub fn now(id: &str) -> Self {
        Self {
            id: id.to_string(),
            at: Utc::now(),
        }
    }
}

/// Delivers alerts to the user.
///
/// Delivery is fire-and-forget. User responses are not returned here; they
/// arrive later on the event channel as [`crate::events::Event::UserAction`].
pub trait NotificationGateway: Send + Sync {
    fn notify(&self, id: &str, title: &str, body: &str) -> ReminderResult<Delivered>;

    /// Withdraw a pending alert with this id, if any
    fn clear_pending(&self, id: &str);
}

/// Gateway for headless hosts: alerts only go to the log, user actions
/// come from the control API
#[derive(Debug, Default)]
pub struct LogNotifier;

impl NotificationGateway for LogNotifier {
    fn notify(&self, id: &str, title: &str, body: &str) -> ReminderResult<Delivered> {
        info!("[{}] {} - {}", id, title, body);
        Ok(Delivered::now(id))
    }

    fn clear_pending(&self, _id: &str) {}
}

/// Build the gateway selected by the configuration
pub async fn build_notifier(config: &Config, events: EventSender) -> Arc<dyn NotificationGateway> {
    match config.notifier {
        NotifierKind::Desktop => desktop_notifier(events).await,
        NotifierKind::Log => Arc::new(LogNotifier),
    }
}

#[cfg(all(unix, not(target_os = "macos")))]
async fn desktop_notifier(events: EventSender) -> Arc<dyn NotificationGateway> {
    use super::desktop::{check_notification_server, DesktopNotifier};

    let available = match check_notification_server().await {
        Ok(()) => true,
        Err(e) => {
            warn!("{}", e);
            false
        }
    };
    Arc::new(DesktopNotifier::new(available, events))
}

#[cfg(not(all(unix, not(target_os = "macos"))))]
async fn desktop_notifier(_events: EventSender) -> Arc<dyn NotificationGateway> {
    warn!("Desktop notifications are not supported on this platform, alerts go to the log");
    Arc::new(LogNotifier)
}
