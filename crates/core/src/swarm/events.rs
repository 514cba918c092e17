//! # Swarm Events
//!
//! Two event families live here:
//!
//! - [`CrewStep`] - what the agent runtime streams while a crew executes.
//!   The core only consumes [`CrewStep::TasksOutput`]; every other variant
//!   is discarded explicitly by the pipeline runners.
//! - [`BattleEvent`] - lifecycle notifications emitted by the coordinator
//!   for observers (logs, dashboards). They never affect the slots.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::skills::crews::CrewKind;

/// Result of one completed task
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskOutput {
    /// Task name (`pitch_task`, ...). Runtimes may emit unnamed outputs,
    /// which the router skips.
    #[serde(default)]
    pub name: Option<String>,
    /// Text body produced by the agent
    pub raw: String,
    /// Role of the agent that produced it
    #[serde(default)]
    pub agent: String,
}

impl TaskOutput {
    pub fn named(name: impl Into<String>, raw: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            raw: raw.into(),
            agent: String::new(),
        }
    }

    pub fn with_agent(mut self, agent: impl Into<String>) -> Self {
        self.agent = agent.into();
        self
    }
}

/// One step streamed by the agent runtime during a crew kickoff
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CrewStep {
    /// Kickoff accepted
    CrewStarted { crew: CrewKind },
    /// An agent picked up a task
    TaskStarted { task: String, agent: String },
    /// Intermediate reasoning text
    AgentThought { agent: String, text: String },
    /// Every task output completed so far, in task order
    TasksOutput { outputs: Vec<TaskOutput> },
    /// Token accounting for the last call
    TokenUsage { prompt: u64, completion: u64 },
    /// All tasks done
    CrewFinished { crew: CrewKind },
}

impl CrewStep {
    /// Short name for logs
    pub fn kind(&self) -> &'static str {
        match self {
            CrewStep::CrewStarted { .. } => "crew_started",
            CrewStep::TaskStarted { .. } => "task_started",
            CrewStep::AgentThought { .. } => "agent_thought",
            CrewStep::TasksOutput { .. } => "tasks_output",
            CrewStep::TokenUsage { .. } => "token_usage",
            CrewStep::CrewFinished { .. } => "crew_finished",
        }
    }
}

/// Kind of battle lifecycle event
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum BattleEventKind {
    /// Coordinator accepted a request
    BattleStarted,
    /// A variation pipeline was kicked off
    VariationStarted,
    /// A stage of a variation pipeline produced its result
    StageCompleted,
    /// A stage of a variation pipeline raised instead of reporting
    StageFailed,
    /// Both variations done, jury kicked off
    EvaluationStarted,
    /// Jury verdict written
    VerdictReady,
    /// Run ended in a failure branch
    BattleFailed,
    /// Run ended normally
    BattleCompleted,
}

/// A lifecycle event of one battle run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BattleEvent {
    /// Unique event ID
    pub id: String,
    /// Battle the event belongs to
    pub battle_id: String,
    pub timestamp: DateTime<Utc>,
    pub kind: BattleEventKind,
    /// Variation number (1 or 2) when the event is variation-scoped
    #[serde(default)]
    pub variation: Option<u8>,
    /// Task name when the event is stage-scoped
    #[serde(default)]
    pub task: Option<String>,
    #[serde(default)]
    pub data: Option<serde_json::Value>,
}

impl BattleEvent {
    pub fn new(kind: BattleEventKind, battle_id: &str) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            battle_id: battle_id.to_string(),
            timestamp: Utc::now(),
            kind,
            variation: None,
            task: None,
            data: None,
        }
    }

    pub fn with_variation(mut self, variation: u8) -> Self {
        self.variation = Some(variation);
        self
    }

    pub fn with_task(mut self, task: &str) -> Self {
        self.task = Some(task.to_string());
        self
    }

    pub fn with_data(mut self, data: serde_json::Value) -> Self {
        self.data = Some(data);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_creation() {
        let event = BattleEvent::new(BattleEventKind::StageCompleted, "battle-1")
            .with_variation(2)
            .with_task("financial_task");

        assert_eq!(event.battle_id, "battle-1");
        assert_eq!(event.variation, Some(2));
        assert_eq!(event.task.as_deref(), Some("financial_task"));
    }

    #[test]
    fn test_crew_step_is_tagged() {
        let step = CrewStep::TasksOutput {
            outputs: vec![TaskOutput::named("pitch_task", "Hello investors")],
        };
        let json = serde_json::to_value(&step).unwrap();
        assert_eq!(json["type"], "tasks_output");
        assert_eq!(json["outputs"][0]["name"], "pitch_task");
        assert_eq!(step.kind(), "tasks_output");
    }

    #[test]
    fn test_unnamed_output_deserializes() {
        let output: TaskOutput = serde_json::from_str(r#"{"raw": "text"}"#).unwrap();
        assert_eq!(output.name, None);
        assert_eq!(output.agent, "");
    }
}
