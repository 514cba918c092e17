//! # Config API
//!
//! Read and patch the model configuration. Patches are merged into the
//! in-memory config and persisted; running battles keep the config they
//! started with.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use utoipa::ToSchema;

use pitch_battle_core::models::LlmProvider;
use pitch_battle_core::skills::crews::{ENGINEER, FINANCIAL_ANALYST, JURY, VISIONARY};
use pitch_battle_core::state::{BattleConfig, ConfigUpdate};

use super::catalog::{provider_info, ProviderInfo};
use super::{ApiError, SharedState};

/// Current configuration plus what each agent resolves to
#[derive(Debug, Serialize, ToSchema)]
pub struct ConfigResponse {
    #[schema(value_type = Object)]
    pub config: BattleConfig,
    /// agent_id -> resolved model name
    pub resolved_models: HashMap<String, String>,
    pub providers: Vec<ProviderInfo>,
}

impl ConfigResponse {
    fn new(config: BattleConfig) -> Self {
        let resolved_models = [VISIONARY, FINANCIAL_ANALYST, ENGINEER, JURY]
            .iter()
            .map(|agent| (agent.id.to_string(), config.model_config_for(agent.id).model))
            .collect();
        Self {
            config,
            resolved_models,
            providers: provider_info(),
        }
    }
}

/// Partial update; providers are given by wire name (`anthropic`, `openai`, ...)
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct ConfigPatch {
    pub global_provider: Option<String>,
    pub global_model: Option<String>,
    pub base_url: Option<String>,
    #[serde(default)]
    pub per_agent_providers: HashMap<String, String>,
    /// Empty string removes an override
    #[serde(default)]
    pub per_agent_models: HashMap<String, String>,
    #[serde(default)]
    pub per_agent_base_urls: HashMap<String, String>,
}

fn parse_provider(name: &str) -> Result<LlmProvider, String> {
    LlmProvider::from_name(name).ok_or_else(|| format!("Unknown provider: {}", name))
}

impl TryFrom<ConfigPatch> for ConfigUpdate {
    type Error = String;

    fn try_from(patch: ConfigPatch) -> Result<Self, Self::Error> {
        let global_provider = patch
            .global_provider
            .as_deref()
            .map(parse_provider)
            .transpose()?;

        let per_agent_providers = patch
            .per_agent_providers
            .iter()
            .map(|(agent, name)| parse_provider(name).map(|provider| (agent.clone(), provider)))
            .collect::<Result<HashMap<_, _>, String>>()?;

        Ok(ConfigUpdate {
            global_provider,
            global_model: patch.global_model,
            base_url: patch.base_url,
            per_agent_providers,
            per_agent_models: patch.per_agent_models,
            per_agent_base_urls: patch.per_agent_base_urls,
        })
    }
}

/// Get current configuration
#[utoipa::path(
    get,
    path = "/api/v1/config",
    tag = "config",
    responses(
        (status = 200, description = "Current configuration", body = ConfigResponse)
    )
)]
pub async fn get_config(State(state): State<SharedState>) -> Json<ConfigResponse> {
    let config = state.config.read().await.clone();
    Json(ConfigResponse::new(config))
}

/// Update configuration (partial merge)
#[utoipa::path(
    patch,
    path = "/api/v1/config",
    tag = "config",
    request_body = ConfigPatch,
    responses(
        (status = 200, description = "Updated configuration", body = ConfigResponse),
        (status = 400, description = "Unknown provider", body = ApiError),
        (status = 500, description = "Config could not be saved", body = ApiError)
    )
)]
pub async fn update_config(
    State(state): State<SharedState>,
    Json(patch): Json<ConfigPatch>,
) -> Response {
    let update = match ConfigUpdate::try_from(patch) {
        Ok(update) => update,
        Err(e) => return ApiError::new(e).with_status(StatusCode::BAD_REQUEST),
    };

    // Write lock held across the save; the live config changes only once it succeeds
    let mut current = state.config.write().await;
    let mut config = (*current).clone();
    config.merge(update);

    if let Err(e) = config.save_to(&state.config_path).await {
        tracing::error!(error = ?e, "Failed to save config");
        return ApiError::new(format!("Failed to save config: {}", e))
            .with_status(StatusCode::INTERNAL_SERVER_ERROR);
    }
    *current = config.clone();
    drop(current);

    tracing::info!(path = %state.config_path.display(), "Config updated");
    Json(ConfigResponse::new(config)).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::AppState;

    #[tokio::test]
    async fn test_patch_merges_and_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        let state = AppState::new(BattleConfig::default(), path.clone());

        let patch = ConfigPatch {
            global_provider: Some("openai".to_string()),
            per_agent_models: [("jury".to_string(), "gpt-4.1".to_string())]
                .into_iter()
                .collect(),
            ..Default::default()
        };
        let response = update_config(State(state.clone()), Json(patch)).await;
        assert_eq!(response.status(), StatusCode::OK);

        let Json(current) = get_config(State(state)).await;
        assert_eq!(current.config.global_provider, LlmProvider::OpenAI);
        assert_eq!(current.resolved_models["jury"], "gpt-4.1");
        assert_eq!(current.resolved_models["visionary"], "gpt-4o");

        let saved = BattleConfig::load_from(&path).await.unwrap();
        assert_eq!(saved, current.config);
    }

    #[tokio::test]
    async fn test_unknown_provider_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let state = AppState::new(BattleConfig::default(), dir.path().join("config.json"));

        let patch = ConfigPatch {
            per_agent_providers: [("engineer".to_string(), "skynet".to_string())]
                .into_iter()
                .collect(),
            ..Default::default()
        };
        let response = update_config(State(state.clone()), Json(patch)).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(*state.config.read().await, BattleConfig::default());
    }

    #[tokio::test]
    async fn test_failed_save_keeps_previous_config() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("not-a-dir");
        std::fs::write(&blocker, "file").unwrap();
        let state = AppState::new(BattleConfig::default(), blocker.join("config.json"));

        let patch = ConfigPatch {
            global_model: Some("gpt-4.1".to_string()),
            ..Default::default()
        };
        let response = update_config(State(state.clone()), Json(patch)).await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(state.config.read().await.global_model, None);
    }
}
