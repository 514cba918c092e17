//! # Battle API
//!
//! `POST /api/v1/battle` validates the form, starts a battle and streams
//! its snapshots as server-sent events. Closing the connection abandons
//! the battle.

use axum::{
    extract::State,
    http::StatusCode,
    response::{
        sse::{Event, KeepAlive, Sse},
        IntoResponse, Json, Response,
    },
};
use futures::StreamExt;
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::sync::Arc;
use utoipa::ToSchema;

use pitch_battle_core::pitch::PitchForm;
use pitch_battle_core::swarm::{
    spawn_battle, BattleCoordinator, BattleOutcome, LlmCrewRuntime, Snapshot,
};

use super::{ApiError, SharedState};

/// Startup concept to battle over
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct StartBattleRequest {
    #[serde(default)]
    pub startup_name: String,
    #[serde(default)]
    pub industry: String,
    #[serde(default)]
    pub mission: String,
    #[serde(default)]
    pub product: String,
    #[serde(default)]
    pub target_market: String,
    #[serde(default)]
    pub funding_stage: String,
}

impl From<StartBattleRequest> for PitchForm {
    fn from(req: StartBattleRequest) -> Self {
        PitchForm {
            startup_name: req.startup_name,
            industry: req.industry,
            mission: req.mission,
            product: req.product,
            target_market: req.target_market,
            funding_stage: req.funding_stage,
        }
    }
}

/// Data of one `snapshot` event
#[derive(Debug, Serialize, ToSchema)]
pub struct SnapshotPayload {
    /// All eight slots: v1 pitch/financials/tech, v2 pitch/financials/tech,
    /// verdict, error
    pub slots: Vec<String>,
    /// Empty unless the battle failed
    pub status: String,
}

impl From<Snapshot> for SnapshotPayload {
    fn from(snapshot: Snapshot) -> Self {
        let status = snapshot.status_line().to_string();
        Self {
            slots: snapshot.into_slots().to_vec(),
            status,
        }
    }
}

fn snapshot_event(snapshot: Snapshot) -> Event {
    let payload = SnapshotPayload::from(snapshot);
    let json = serde_json::to_string(&payload).unwrap_or_default();
    Event::default().event("snapshot").data(json)
}

/// Start a battle and stream its snapshots
#[utoipa::path(
    post,
    path = "/api/v1/battle",
    tag = "battle",
    request_body = StartBattleRequest,
    responses(
        (status = 200, description = "SSE stream of `snapshot` events", body = SnapshotPayload, content_type = "text/event-stream"),
        (status = 422, description = "Required fields missing", body = ApiError)
    )
)]
pub async fn start_battle(
    State(state): State<SharedState>,
    Json(req): Json<StartBattleRequest>,
) -> Response {
    let request = match PitchForm::from(req).into_request() {
        Ok(request) => request,
        Err(e) => {
            return ApiError {
                error: e.to_string(),
                missing: e.missing.iter().map(|field| field.to_string()).collect(),
            }
            .with_status(StatusCode::UNPROCESSABLE_ENTITY)
        }
    };

    tracing::info!(startup = %request.startup_name, "Battle requested");
    let config = state.config.read().await.clone();
    let coordinator = BattleCoordinator::new(Arc::new(LlmCrewRuntime::new(config)));
    let (snapshots, handle) = spawn_battle(coordinator, request);

    tokio::spawn(async move {
        match handle.await {
            Ok(Ok(BattleOutcome::Completed)) => tracing::info!("Battle stream finished"),
            Ok(Ok(outcome)) => tracing::info!(?outcome, "Battle stream ended early"),
            Ok(Err(e)) => tracing::error!(error = %e, "Battle aborted by internal error"),
            Err(e) => tracing::error!(error = %e, "Battle task failed"),
        }
    });

    let stream = snapshots.map(|snapshot| Ok::<_, Infallible>(snapshot_event(snapshot)));
    Sse::new(stream)
        .keep_alive(KeepAlive::default())
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::AppState;
    use pitch_battle_core::state::BattleConfig;
    use pitch_battle_core::swarm::OutputSlots;
    use std::path::PathBuf;

    #[tokio::test]
    async fn test_blank_fields_are_rejected() {
        let state = AppState::new(BattleConfig::default(), PathBuf::from("unused.json"));
        let req = StartBattleRequest {
            startup_name: "Brewly".to_string(),
            industry: "  ".to_string(),
            ..Default::default()
        };

        let response = start_battle(State(state), Json(req)).await;
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn test_snapshot_payload() {
        let mut slots = OutputSlots::new();
        slots.set(0, "pitch").unwrap();
        slots.set(7, "boom").unwrap();

        let payload = SnapshotPayload::from(slots.snapshot());
        assert_eq!(payload.slots.len(), 8);
        assert_eq!(payload.slots[0], "pitch");
        assert_eq!(payload.status, "❌ See Errors tab ❌");

        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["slots"][7], "boom");
    }
}
