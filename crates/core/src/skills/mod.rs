//! # Pitch Battle Skills
//!
//! Agents, tasks and the LLM call that executes them.
//!
//! ## Crews
//!
//! **Pitch crew** (runs once per variation):
//! - `visionary` - `pitch_task`
//! - `financial_analyst` - `financial_task`
//! - `engineer` - `engineering_task`
//!
//! **Jury crew:**
//! - `jury` - `evaluation_task`

pub mod crews;
pub mod llm_helpers;
pub mod prompts;
pub mod stage_skill;

pub use crews::{jury_crew, pitch_crew, AgentProfile, CrewDefinition, CrewKind, TaskDefinition};
pub use stage_skill::{StageDraft, StageSkill};
