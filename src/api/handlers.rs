//! HTTP endpoint handlers

use std::sync::Arc;
use axum::{
    extract::State,
    http::StatusCode,
    response::Json,
};
use tracing::{error, info, warn};

use crate::{
    events::{Command, CommandReply, UserAction},
    state::AppState,
};
use super::responses::{ApiResponse, HealthResponse, StatusResponse};

/// Run a command through the coordinator and wrap the resulting snapshot
async fn run_command(
    state: &AppState,
    command: Command,
    message: &str,
) -> Result<Json<ApiResponse>, StatusCode> {
    match state.request(command).await {
        Ok(reply) => {
            info!("{}", message);
            Ok(Json(ApiResponse::ok(message.to_string(), reply.snapshot)))
        }
        Err(e) => {
            error!("Failed to run {}: {}", command.name(), e);
            Err(StatusCode::SERVICE_UNAVAILABLE)
        }
    }
}

/// Handle POST /start - Arm the reminder schedule
pub async fn start_handler(State(state): State<Arc<AppState>>) -> Result<Json<ApiResponse>, StatusCode> {
    run_command(&state, Command::Start, "Reminder schedule armed").await
}

/// Handle POST /stop - Disarm the reminder schedule
pub async fn stop_handler(State(state): State<Arc<AppState>>) -> Result<Json<ApiResponse>, StatusCode> {
    run_command(&state, Command::Stop, "Reminder schedule stopped").await
}

/// Handle POST /send - Send a break alert now
pub async fn send_handler(State(state): State<Arc<AppState>>) -> Result<Json<ApiResponse>, StatusCode> {
    match state.request(Command::SendNow).await {
        Ok(CommandReply { snapshot, error: Some(reason) }) => {
            warn!("Send endpoint called - alert not delivered: {}", reason);
            Ok(Json(ApiResponse::error(
                format!("Break alert not delivered: {}", reason),
                snapshot,
            )))
        }
        Ok(CommandReply { snapshot, error: None }) => {
            info!("Send endpoint called - break alert sent");
            Ok(Json(ApiResponse::ok("Break alert sent".to_string(), snapshot)))
        }
        Err(e) => {
            error!("Failed to send break alert: {}", e);
            Err(StatusCode::SERVICE_UNAVAILABLE)
        }
    }
}

/// Report a user action and return the snapshot once it was handled
async fn report_action(
    state: &AppState,
    action: UserAction,
    message: &str,
) -> Result<Json<ApiResponse>, StatusCode> {
    if let Err(e) = state.user_action(action) {
        error!("Failed to report {:?}: {}", action, e);
        return Err(StatusCode::SERVICE_UNAVAILABLE);
    }

    // Events are handled in order, so this snapshot already reflects the action
    run_command(state, Command::Status, message).await
}

/// Handle POST /open - The user opened the alert
pub async fn open_handler(State(state): State<Arc<AppState>>) -> Result<Json<ApiResponse>, StatusCode> {
    report_action(&state, UserAction::Opened, "Break alert opened").await
}

/// Handle POST /dismiss - The user dismissed the alert
pub async fn dismiss_handler(State(state): State<Arc<AppState>>) -> Result<Json<ApiResponse>, StatusCode> {
    report_action(&state, UserAction::Dismissed, "Break alert dismissed").await
}

/// Handle POST /countdown/cancel - Cancel a running countdown
pub async fn cancel_countdown_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse>, StatusCode> {
    run_command(&state, Command::CancelCountdown, "Countdown cancelled").await
}

/// Handle GET /status - Return current status
pub async fn status_handler(State(state): State<Arc<AppState>>) -> Json<StatusResponse> {
    Json(StatusResponse {
        snapshot: state.status(),
        uptime: state.get_uptime(),
        port: state.port,
        host: state.host.clone(),
    })
}

/// Handle GET /health - Health check endpoint
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::ok())
}
