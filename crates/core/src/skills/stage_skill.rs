//! # Stage Skill
//!
//! Runs one crew task against the configured LLM: the agent's role prompt
//! as system instructions, the rendered task template as input.

use radkit::macros::LLMOutput;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::models::ModelConfig;
use crate::run_llm_function;
use crate::skills::crews::AgentProfile;

/// Output of one stage
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, LLMOutput)]
pub struct StageDraft {
    /// The complete Markdown deliverable for the task
    pub content: String,
}

/// Executes a single task for an agent
pub struct StageSkill;

impl StageSkill {
    /// SDK-style call used by the crew runtime.
    ///
    /// Provider errors are returned untouched; classification happens in
    /// the runtime.
    #[tracing::instrument(skip_all, fields(agent = agent.id, model = %config.model))]
    pub async fn run(
        agent: &AgentProfile,
        prompt: String,
        config: &ModelConfig,
    ) -> anyhow::Result<StageDraft> {
        run_llm_function!(config, StageDraft, agent.system_prompt, prompt)
    }
}
