//! Read-only lookups for the form: presets, industries, providers.

use axum::response::Json;
use serde::Serialize;
use utoipa::ToSchema;

use pitch_battle_core::models::LlmProvider;
use pitch_battle_core::pitch::{presets, COMMON_INDUSTRIES};

#[derive(Debug, Serialize, ToSchema)]
pub struct PresetResponse {
    pub key: String,
    pub label: String,
    pub startup_name: String,
    pub industry: String,
    pub mission: String,
    pub product: String,
    pub target_market: String,
    pub funding_stage: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ProviderInfo {
    pub id: String,
    pub name: String,
    pub default_model: String,
    pub supports_base_url: bool,
}

/// List bundled presets
#[utoipa::path(
    get,
    path = "/api/v1/presets",
    tag = "catalog",
    responses(
        (status = 200, description = "Ready-made startup concepts", body = [PresetResponse])
    )
)]
pub async fn list_presets() -> Json<Vec<PresetResponse>> {
    let presets = presets()
        .into_iter()
        .map(|preset| PresetResponse {
            key: preset.key.to_string(),
            label: preset.label.to_string(),
            startup_name: preset.form.startup_name,
            industry: preset.form.industry,
            mission: preset.form.mission,
            product: preset.form.product,
            target_market: preset.form.target_market,
            funding_stage: preset.form.funding_stage,
        })
        .collect();
    Json(presets)
}

/// List industries offered by the form
#[utoipa::path(
    get,
    path = "/api/v1/industries",
    tag = "catalog",
    responses(
        (status = 200, description = "Industry choices", body = [String])
    )
)]
pub async fn list_industries() -> Json<Vec<String>> {
    Json(COMMON_INDUSTRIES.iter().map(|s| s.to_string()).collect())
}

/// Get available LLM providers
#[utoipa::path(
    get,
    path = "/api/v1/providers",
    tag = "catalog",
    responses(
        (status = 200, description = "Supported LLM providers", body = [ProviderInfo])
    )
)]
pub async fn list_providers() -> Json<Vec<ProviderInfo>> {
    Json(provider_info())
}

pub fn provider_info() -> Vec<ProviderInfo> {
    LlmProvider::all()
        .into_iter()
        .map(|provider| ProviderInfo {
            id: serde_json::to_value(provider)
                .ok()
                .and_then(|v| v.as_str().map(str::to_string))
                .unwrap_or_default(),
            name: provider.display_name().to_string(),
            default_model: provider.default_model().to_string(),
            supports_base_url: provider.supports_base_url(),
        })
        .collect()
}
