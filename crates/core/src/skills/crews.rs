//! # Crew Definitions
//!
//! Composes agents and tasks into the two crews of a battle:
//!
//! ```text
//! Pitch crew:  visionary → financial_analyst → engineer
//! Jury crew:   jury
//! ```
//!
//! Tasks run strictly in the listed order. Each task is parameterized from
//! the crew's inputs only, never from a previous task's output.

use serde::{Deserialize, Serialize};

use super::prompts;
use crate::swarm::pipeline::{ENGINEERING_TASK, EVALUATION_TASK, FINANCIAL_TASK, PITCH_TASK};

/// Which crew a kickoff runs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CrewKind {
    /// Three-stage variation pipeline
    Pitch,
    /// Single-stage evaluation pipeline
    Jury,
}

impl CrewKind {
    pub fn definition(self) -> CrewDefinition {
        match self {
            CrewKind::Pitch => pitch_crew(),
            CrewKind::Jury => jury_crew(),
        }
    }
}

/// An agent: identity used for per-agent model overrides, plus its role prompt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AgentProfile {
    /// Config key (`visionary`, `financial_analyst`, ...)
    pub id: &'static str,
    /// Human-readable role
    pub role: &'static str,
    /// System instructions
    pub system_prompt: &'static str,
}

/// A named task bound to the agent that executes it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskDefinition {
    pub name: &'static str,
    pub agent: AgentProfile,
    /// Description template with `{placeholder}` inputs
    pub template: &'static str,
}

/// Ordered tasks of one crew
#[derive(Debug, Clone)]
pub struct CrewDefinition {
    pub kind: CrewKind,
    pub tasks: Vec<TaskDefinition>,
}

impl CrewDefinition {
    pub fn task_names(&self) -> Vec<&'static str> {
        self.tasks.iter().map(|task| task.name).collect()
    }
}

/// The Visionary Agent
///
/// First stage. Drafts the investor narrative.
pub const VISIONARY: AgentProfile = AgentProfile {
    id: "visionary",
    role: "Startup Visionary",
    system_prompt: prompts::VISIONARY,
};

/// The Financial Analyst Agent
pub const FINANCIAL_ANALYST: AgentProfile = AgentProfile {
    id: "financial_analyst",
    role: "Financial Analyst",
    system_prompt: prompts::FINANCIAL_ANALYST,
};

/// The Engineer Agent
pub const ENGINEER: AgentProfile = AgentProfile {
    id: "engineer",
    role: "Engineering Lead",
    system_prompt: prompts::ENGINEER,
};

/// The Jury Agent
///
/// Only member of the jury crew.
pub const JURY: AgentProfile = AgentProfile {
    id: "jury",
    role: "Investment Jury",
    system_prompt: prompts::JURY,
};

/// Pitch crew: vision, financials, engineering
pub fn pitch_crew() -> CrewDefinition {
    CrewDefinition {
        kind: CrewKind::Pitch,
        tasks: vec![
            TaskDefinition {
                name: PITCH_TASK,
                agent: VISIONARY,
                template: prompts::PITCH_TASK,
            },
            TaskDefinition {
                name: FINANCIAL_TASK,
                agent: FINANCIAL_ANALYST,
                template: prompts::FINANCIAL_TASK,
            },
            TaskDefinition {
                name: ENGINEERING_TASK,
                agent: ENGINEER,
                template: prompts::ENGINEERING_TASK,
            },
        ],
    }
}

/// Jury crew: one evaluation task
pub fn jury_crew() -> CrewDefinition {
    CrewDefinition {
        kind: CrewKind::Jury,
        tasks: vec![TaskDefinition {
            name: EVALUATION_TASK,
            agent: JURY,
            template: prompts::EVALUATION_TASK,
        }],
    }
}
