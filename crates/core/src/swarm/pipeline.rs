//! # Pipeline Stages
//!
//! The three-stage variation pipeline (pitch → financial → engineering),
//! the single-stage jury pipeline, and the runners that turn a crew's
//! step stream into a stream of completed task batches.
//!
//! Runners never catch errors; recovery happens once, in the coordinator.

use futures::stream::{BoxStream, StreamExt};
use serde::{Deserialize, Serialize};

use crate::error::CrewError;
use crate::pitch::{EvaluationInput, PitchRequest};
use crate::skills::crews::CrewKind;
use crate::swarm::events::{CrewStep, TaskOutput};
use crate::swarm::runtime::{CrewRuntime, CrewStepStream};

pub const PITCH_TASK: &str = "pitch_task";
pub const FINANCIAL_TASK: &str = "financial_task";
pub const ENGINEERING_TASK: &str = "engineering_task";
pub const EVALUATION_TASK: &str = "evaluation_task";

/// Cumulative task outputs, one item per completed task
pub type TaskBatchStream = BoxStream<'static, Result<Vec<TaskOutput>, CrewError>>;

/// Stage of a variation pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineStage {
    /// Visionary drafting the pitch
    Pitch,
    /// Financial analyst modelling the numbers
    Financial,
    /// Engineer assessing feasibility
    Engineering,
    /// Complete
    Complete,
    /// Failed
    Failed,
}

impl PipelineStage {
    /// Task whose output completes this stage
    pub fn task_name(&self) -> Option<&'static str> {
        match self {
            PipelineStage::Pitch => Some(PITCH_TASK),
            PipelineStage::Financial => Some(FINANCIAL_TASK),
            PipelineStage::Engineering => Some(ENGINEERING_TASK),
            PipelineStage::Complete | PipelineStage::Failed => None,
        }
    }
}

/// Progress of one variation pipeline
#[derive(Debug, Clone)]
pub struct Pipeline {
    /// Current stage
    pub stage: PipelineStage,
}

impl Default for Pipeline {
    fn default() -> Self {
        Self {
            stage: PipelineStage::Pitch,
        }
    }
}

impl Pipeline {
    /// Create a new pipeline
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance to the next stage
    pub fn advance(&mut self) {
        self.stage = match self.stage {
            PipelineStage::Pitch => PipelineStage::Financial,
            PipelineStage::Financial => PipelineStage::Engineering,
            PipelineStage::Engineering => PipelineStage::Complete,
            PipelineStage::Complete => PipelineStage::Complete,
            PipelineStage::Failed => PipelineStage::Failed,
        };
    }

    /// Fail the pipeline, returning the task that was running
    pub fn fail(&mut self) -> Option<&'static str> {
        let task = self.stage.task_name();
        self.stage = PipelineStage::Failed;
        task
    }

    /// Advance past every stage whose task appears in `outputs`.
    ///
    /// Batches are cumulative, so stages already recorded are not
    /// reported again. Returns the stages completed by this batch.
    pub fn record(&mut self, outputs: &[TaskOutput]) -> Vec<PipelineStage> {
        let mut completed = Vec::new();
        while let Some(task) = self.stage.task_name() {
            let done = outputs
                .iter()
                .any(|output| output.name.as_deref() == Some(task));
            if !done {
                break;
            }
            completed.push(self.stage);
            self.advance();
        }
        completed
    }

    /// Check if pipeline succeeded
    pub fn is_success(&self) -> bool {
        self.stage == PipelineStage::Complete
    }
}

/// Runs the pitch crew for one variation
pub struct VariationPipeline;

impl VariationPipeline {
    /// Fresh kickoff; nothing is retained between calls.
    pub fn run(runtime: &dyn CrewRuntime, request: &PitchRequest) -> TaskBatchStream {
        task_batches(runtime.kickoff(CrewKind::Pitch, request.template_inputs()))
    }
}

/// Runs the jury crew over both variations
pub struct EvaluationPipeline;

impl EvaluationPipeline {
    pub fn run(runtime: &dyn CrewRuntime, input: &EvaluationInput) -> TaskBatchStream {
        task_batches(runtime.kickoff(CrewKind::Jury, input.template_inputs()))
    }
}

/// Keep `TasksOutput` payloads and errors; drop every other step.
fn task_batches(steps: CrewStepStream) -> TaskBatchStream {
    steps
        .filter_map(|step| async move {
            match step {
                Ok(CrewStep::TasksOutput { outputs }) => Some(Ok(outputs)),
                Ok(
                    other @ (CrewStep::CrewStarted { .. }
                    | CrewStep::TaskStarted { .. }
                    | CrewStep::AgentThought { .. }
                    | CrewStep::TokenUsage { .. }
                    | CrewStep::CrewFinished { .. }),
                ) => {
                    tracing::debug!(step = other.kind(), "Discarding crew step");
                    None
                }
                Err(e) => Some(Err(e)),
            }
        })
        .boxed()
}
