//! Persistent model configuration for battle agents.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::Path;
use tokio::fs;

use super::io;
use crate::models::{LlmProvider, ModelConfig};

/// Which provider and model each agent runs on
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BattleConfig {
    /// Global LLM provider (default: Anthropic)
    #[serde(default)]
    pub global_provider: LlmProvider,
    /// Global model to use for all agents
    #[serde(default)]
    pub global_model: Option<String>,
    /// Base URL override for OpenAI-compatible endpoints
    #[serde(default)]
    pub base_url: Option<String>,
    /// Per-agent provider overrides (agent_id -> provider)
    #[serde(default)]
    pub per_agent_providers: HashMap<String, LlmProvider>,
    /// Per-agent model overrides (agent_id -> model name)
    #[serde(default)]
    pub per_agent_models: HashMap<String, String>,
    /// Per-agent base URL overrides (agent_id -> base_url)
    #[serde(default)]
    pub per_agent_base_urls: HashMap<String, String>,
}

/// Partial update applied by [`BattleConfig::merge`]
///
/// Map fields are merged key by key; an empty string value removes the
/// override for that agent.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConfigUpdate {
    pub global_provider: Option<LlmProvider>,
    pub global_model: Option<String>,
    pub base_url: Option<String>,
    #[serde(default)]
    pub per_agent_providers: HashMap<String, LlmProvider>,
    #[serde(default)]
    pub per_agent_models: HashMap<String, String>,
    #[serde(default)]
    pub per_agent_base_urls: HashMap<String, String>,
}

impl BattleConfig {
    /// Resolve the model for an agent: per-agent override, then global,
    /// then the provider's default.
    pub fn model_config_for(&self, agent_id: &str) -> ModelConfig {
        let provider = self
            .per_agent_providers
            .get(agent_id)
            .copied()
            .unwrap_or(self.global_provider);

        let model = self
            .per_agent_models
            .get(agent_id)
            .or(self.global_model.as_ref())
            .cloned()
            .unwrap_or_else(|| provider.default_model().to_string());

        let base_url = if provider.supports_base_url() {
            self.per_agent_base_urls
                .get(agent_id)
                .or(self.base_url.as_ref())
                .cloned()
        } else {
            None
        };

        ModelConfig {
            provider,
            model,
            base_url,
        }
    }

    /// Load from the runtime directory's `config.json`
    pub async fn load() -> Result<Self> {
        Self::load_from(&io::config_path()).await
    }

    /// Load from an explicit path. A missing file yields the defaults.
    pub async fn load_from(path: &Path) -> Result<Self> {
        let data = match fs::read_to_string(path).await {
            Ok(data) => data,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "No config file, using defaults");
                return Ok(Self::default());
            }
            Err(e) => {
                return Err(e).with_context(|| format!("Failed to read config: {:?}", path))
            }
        };
        serde_json::from_str(&data).with_context(|| format!("Malformed config: {:?}", path))
    }

    /// Save to the runtime directory's `config.json`
    pub async fn save(&self) -> Result<()> {
        io::ensure_runtime_dir().await?;
        self.save_to(&io::config_path()).await
    }

    pub async fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        let data = serde_json::to_string_pretty(self)?;
        fs::write(path, data)
            .await
            .with_context(|| format!("Failed to write config: {:?}", path))
    }

    /// Apply a partial update in place
    pub fn merge(&mut self, update: ConfigUpdate) {
        if let Some(provider) = update.global_provider {
            self.global_provider = provider;
        }
        if let Some(model) = update.global_model {
            self.global_model = non_empty(model);
        }
        if let Some(url) = update.base_url {
            self.base_url = non_empty(url);
        }

        self.per_agent_providers.extend(update.per_agent_providers);
        merge_overrides(&mut self.per_agent_models, update.per_agent_models);
        merge_overrides(&mut self.per_agent_base_urls, update.per_agent_base_urls);
    }
}

fn non_empty(value: String) -> Option<String> {
    if value.trim().is_empty() {
        None
    } else {
        Some(value)
    }
}

fn merge_overrides(target: &mut HashMap<String, String>, updates: HashMap<String, String>) {
    for (agent, value) in updates {
        match non_empty(value) {
            Some(value) => {
                target.insert(agent, value);
            }
            None => {
                target.remove(&agent);
            }
        }
    }
}
