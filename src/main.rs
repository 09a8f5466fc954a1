//! Break Reminder - periodic break alerts with a short countdown
//!
//! This is the main entry point for the break-reminder daemon.

use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info, warn};

use break_reminder::{
    api::create_router,
    config::Config,
    events::{event_channel, Command},
    services::{build_notifier, PresentationSurface, SystemAudioCue, TerminalSurface, TokioTimers},
    state::{Alert, AppState, CountdownSession, ReminderScheduler},
    tasks::{coordinator_task, Coordinator},
    utils::shutdown_signal,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    // Initialize tracing with appropriate log level
    tracing_subscriber::fmt()
        .with_env_filter(format!("break_reminder={},tower_http=info", config.log_level()))
        .init();

    info!("Starting break-reminder v{}", env!("CARGO_PKG_VERSION"));
    info!(
        "Configuration: interval={}s, countdown={}s, dismiss_policy={:?}, notifier={:?}",
        config.interval, config.countdown, config.dismiss_policy, config.notifier
    );
    config.validate()?;

    let (events_tx, events_rx) = event_channel();

    // Collaborators
    let gateway = build_notifier(&config, events_tx.clone()).await;
    let surface: Arc<dyn PresentationSurface> = Arc::new(TerminalSurface);
    let audio = Arc::new(SystemAudioCue::new(config.sound_player.clone(), config.sound.clone()));

    // Scheduler and countdown each own their timers
    let countdown_timers = TokioTimers::new(events_tx.clone());
    let wake_up_timers = countdown_timers.sibling();

    let scheduler = ReminderScheduler::new(
        config.reminder_interval(),
        Alert::break_reminder(config.countdown),
        Box::new(wake_up_timers),
        gateway,
    );
    let countdown = CountdownSession::new(Box::new(countdown_timers), surface, audio);
    let mut coordinator = Coordinator::new(scheduler, countdown, config.countdown, config.dismiss_policy);

    if config.no_autostart {
        info!("Autostart disabled, POST /start to arm the schedule");
    } else {
        coordinator.apply(Command::Start);
    }

    let state = Arc::new(AppState::new(
        config.port,
        config.host.clone(),
        events_tx,
        coordinator.snapshot(),
    ));

    let coordinator_handle = tokio::spawn(coordinator_task(coordinator, events_rx, Arc::clone(&state)));

    // Create HTTP router with all endpoints
    let app = create_router(Arc::clone(&state));

    let addr = config.address();
    let listener = TcpListener::bind(&addr).await?;

    info!("Control API running on http://{}", addr);
    info!("Endpoints:");
    info!("  POST /start            - Arm the reminder schedule");
    info!("  POST /stop             - Disarm the reminder schedule");
    info!("  POST /send             - Send a break alert now");
    info!("  POST /open             - Open the alert (start the countdown)");
    info!("  POST /dismiss          - Dismiss the alert");
    info!("  POST /countdown/cancel - Cancel a running countdown");
    info!("  GET  /status           - Current schedule and countdown");
    info!("  GET  /health           - Health check");

    let server = axum::serve(listener, app);

    tokio::select! {
        result = server => {
            if let Err(e) = result {
                error!("Server error: {}", e);
            }
        }
        result = shutdown_signal() => {
            match result {
                Ok(_) => info!("Shutdown signal received"),
                Err(e) => error!("Signal handling failed: {:#}", e),
            }
        }
    }

    if let Err(e) = state.shutdown() {
        warn!("Failed to stop coordinator: {}", e);
    }
    if let Err(e) = coordinator_handle.await {
        error!("Coordinator task failed: {}", e);
    }

    info!("Shutdown complete");
    Ok(())
}
