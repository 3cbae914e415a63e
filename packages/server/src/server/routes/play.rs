use axum::extract::{Path, State};
use axum::Json;
use serde::Serialize;

use crate::domains::tickets::{create_ticket, wait_for_assignment, PlayerAttributes, ServerInfo};
use crate::server::{ApiError, AppState};

#[derive(Debug, Serialize)]
pub struct MatchedResponse {
    pub status: &'static str,
    pub ticket_id: String,
    pub server: ServerInfo,
    pub player: PlayerAttributes,
    pub jwt: String,
}

/// Create a ticket for `region`, wait for its server and hand out a token.
pub async fn play_handler(
    State(state): State<AppState>,
    Path(region): Path<String>,
) -> Result<Json<MatchedResponse>, ApiError> {
    let player = PlayerAttributes::random(&region);
    let ticket = create_ticket(state.frontend.as_ref(), player.to_ticket()).await?;
    let ticket_id = ticket.id;

    tracing::info!(ticket_id = %ticket_id, region = %region, "Waiting for match");

    let Some(server) =
        wait_for_assignment(state.frontend.as_ref(), &ticket_id, state.assignment_timeout).await
    else {
        return Err(ApiError::AssignmentTimeout { ticket_id });
    };

    let jwt = state.signer.issue(&ticket_id, &server, &player)?;

    tracing::info!(
        ticket_id = %ticket_id,
        connection = %server.connection,
        "Match found"
    );

    Ok(Json(MatchedResponse {
        status: "matched",
        ticket_id,
        server,
        player,
        jwt,
    }))
}
