//! # HTTP API
//!
//! v1 routes of the Pitch Battle server.

use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Json},
    routing::{get, post},
    Router,
};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::RwLock;
use utoipa::{OpenApi, ToSchema};

use pitch_battle_core::state::BattleConfig;

pub mod battle;
pub mod catalog;
pub mod config;

/// Application state
pub struct AppState {
    /// Config used by battles started from now on
    pub config: RwLock<BattleConfig>,
    /// Where `PATCH /config` persists to
    pub config_path: PathBuf,
}

pub type SharedState = Arc<AppState>;

impl AppState {
    pub fn new(config: BattleConfig, config_path: PathBuf) -> SharedState {
        Arc::new(Self {
            config: RwLock::new(config),
            config_path,
        })
    }
}

/// Error body for non-2xx responses
#[derive(Debug, Serialize, ToSchema)]
pub struct ApiError {
    pub error: String,
    /// Form fields left blank, for 422 responses
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub missing: Vec<String>,
}

impl ApiError {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            missing: Vec::new(),
        }
    }

    pub fn with_status(self, status: StatusCode) -> axum::response::Response {
        (status, Json(self)).into_response()
    }
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Pitch Battle API",
        version = "1.0.0",
        description = "Two pitch variations, one jury verdict"
    ),
    paths(
        battle::start_battle,
        catalog::list_presets,
        catalog::list_industries,
        catalog::list_providers,
        config::get_config,
        config::update_config
    ),
    components(schemas(
        ApiError,
        battle::StartBattleRequest,
        battle::SnapshotPayload,
        catalog::PresetResponse,
        catalog::ProviderInfo,
        config::ConfigResponse,
        config::ConfigPatch
    )),
    tags(
        (name = "battle", description = "Run a pitch battle"),
        (name = "catalog", description = "Presets, industries and providers"),
        (name = "config", description = "Model configuration")
    )
)]
pub struct ApiDoc;

async fn serve_openapi() -> impl IntoResponse {
    let doc = ApiDoc::openapi().to_json().unwrap_or_default();
    ([(header::CONTENT_TYPE, "application/json")], doc)
}

/// All v1 routes, state applied
pub fn router(state: SharedState) -> Router {
    Router::new()
        .route("/api/v1/battle", post(battle::start_battle))
        .route("/api/v1/presets", get(catalog::list_presets))
        .route("/api/v1/industries", get(catalog::list_industries))
        .route("/api/v1/providers", get(catalog::list_providers))
        .route(
            "/api/v1/config",
            get(config::get_config).patch(config::update_config),
        )
        .route("/api/v1/openapi.json", get(serve_openapi))
        .with_state(state)
}
