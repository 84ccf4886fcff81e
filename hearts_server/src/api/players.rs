//! Player registration and ticket API handlers.
//!
//! Both endpoints hand back a connection ticket to present in the `auth`
//! command of a game connection.
//!
//! # Examples
//!
//! Create a player:
//! ```bash
//! curl -X POST http://localhost:6969/api/v1/players \
//!   -H "Content-Type: application/json" \
//!   -d '{"name": "alice", "password": "secret"}'
//! ```
//!
//! Get a fresh ticket:
//! ```bash
//! curl -X POST http://localhost:6969/api/v1/tickets \
//!   -H "Content-Type: application/json" \
//!   -d '{"name": "alice", "password": "secret"}'
//! ```

use axum::{Json, extract::State, http::StatusCode};
use hearts::auth::{AuthError, PlayerId};
use serde::{Deserialize, Serialize};

use super::AppState;
use crate::{logging::log_security_event, metrics};

#[derive(Debug, Deserialize)]
pub struct CredentialsPayload {
    pub name: String,
    pub password: String,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct TicketResponse {
    pub player_id: PlayerId,
    pub name: String,
    pub ticket: String,
    /// Seconds until the ticket expires
    pub expires_in: i64,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn error_response(status: StatusCode, error: impl Into<String>) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            error: error.into(),
        }),
    )
}

fn auth_error_status(e: &AuthError) -> StatusCode {
    match e {
        AuthError::NameTaken => StatusCode::CONFLICT,
        AuthError::InvalidName(_) | AuthError::WeakPassword(_) => StatusCode::BAD_REQUEST,
        AuthError::InvalidPassword | AuthError::PlayerNotFound => StatusCode::UNAUTHORIZED,
        AuthError::HashingFailed | AuthError::JwtError(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn ticket_for(
    state: &AppState,
    player_id: PlayerId,
    name: String,
) -> Result<TicketResponse, ApiError> {
    let ticket = state.tickets.issue_ticket(player_id).map_err(|e| {
        log::error!("Couldn't issue a ticket for player {}: {}", player_id, e);
        error_response(auth_error_status(&e), e.client_message())
    })?;
    Ok(TicketResponse {
        player_id,
        name,
        ticket,
        expires_in: state.tickets.ttl().num_seconds(),
    })
}

/// Register a new player and issue its first ticket.
///
/// # Errors
///
/// - `400 Bad Request`: Invalid name or empty password
/// - `409 Conflict`: Name already taken
pub async fn create_player(
    State(state): State<AppState>,
    Json(payload): Json<CredentialsPayload>,
) -> Result<(StatusCode, Json<TicketResponse>), ApiError> {
    let player_id = state
        .directory
        .create_player(&payload.name, &payload.password)
        .await
        .map_err(|e| error_response(auth_error_status(&e), e.client_message()))?;

    let response = ticket_for(&state, player_id, payload.name)?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// Exchange a name and password for a ticket.
///
/// # Errors
///
/// - `401 Unauthorized`: Unknown name or wrong password
pub async fn issue_ticket(
    State(state): State<AppState>,
    Json(payload): Json<CredentialsPayload>,
) -> Result<Json<TicketResponse>, ApiError> {
    let authenticated = match state.directory.find_player_id(&payload.name).await {
        Some(id) => state
            .directory
            .authenticate(id, &payload.password)
            .await
            .then_some(id),
        None => None,
    };
    metrics::ticket_requests_total(authenticated.is_some());

    let Some(player_id) = authenticated else {
        log_security_event(
            "failed_ticket",
            None,
            &format!("Bad credentials for {}", payload.name),
        );
        return Err(error_response(
            StatusCode::UNAUTHORIZED,
            "Invalid name or password",
        ));
    };

    Ok(Json(ticket_for(&state, player_id, payload.name)?))
}
