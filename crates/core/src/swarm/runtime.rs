//! # Crew Runtime
//!
//! The agent-execution capability behind both pipelines. A kickoff returns
//! a lazy step stream: nothing runs until the stream is polled, and
//! dropping it abandons whatever call is in flight.
//!
//! ```text
//! CrewStarted → (TaskStarted → TasksOutput)* → CrewFinished
//! ```
//!
//! `TasksOutput` is cumulative: after the n-th task it carries n outputs.

use std::sync::Arc;

use futures::future::{BoxFuture, FutureExt};
use futures::stream::{self, BoxStream, StreamExt};

use crate::error::{classify_provider_error, CrewError};
use crate::pitch::TemplateInputs;
use crate::skills::crews::{CrewDefinition, CrewKind, TaskDefinition};
use crate::skills::prompts::render_template;
use crate::skills::stage_skill::StageSkill;
use crate::state::BattleConfig;
use crate::swarm::events::{CrewStep, TaskOutput};

/// Steps of one crew kickoff
pub type CrewStepStream = BoxStream<'static, Result<CrewStep, CrewError>>;

/// Executes crews on behalf of the pipeline runners
pub trait CrewRuntime: Send + Sync {
    /// Start a fresh run of `crew` bound to `inputs`
    fn kickoff(&self, crew: CrewKind, inputs: TemplateInputs) -> CrewStepStream;
}

/// Runs one task to completion
type TaskExecutor = Arc<
    dyn Fn(TaskDefinition, Arc<TemplateInputs>) -> BoxFuture<'static, Result<TaskOutput, CrewError>>
        + Send
        + Sync,
>;

/// Production runtime: every task is one LLM call through radkit
#[derive(Debug, Clone)]
pub struct LlmCrewRuntime {
    config: Arc<BattleConfig>,
}

impl LlmCrewRuntime {
    pub fn new(config: BattleConfig) -> Self {
        Self {
            config: Arc::new(config),
        }
    }

    pub fn config(&self) -> &BattleConfig {
        &self.config
    }
}

impl CrewRuntime for LlmCrewRuntime {
    fn kickoff(&self, crew: CrewKind, inputs: TemplateInputs) -> CrewStepStream {
        let config = Arc::clone(&self.config);
        let executor: TaskExecutor =
            Arc::new(move |task: TaskDefinition, inputs: Arc<TemplateInputs>| {
                let config = Arc::clone(&config);
                async move { execute_task(&task, &inputs, &config).await }.boxed()
            });
        sequential_steps(crew.definition(), inputs, executor)
    }
}

/// Render the task prompt, resolve the agent's model and run it.
async fn execute_task(
    task: &TaskDefinition,
    inputs: &TemplateInputs,
    config: &BattleConfig,
) -> Result<TaskOutput, CrewError> {
    let prompt = render_template(task.template, inputs).map_err(|placeholder| {
        CrewError::Template {
            task: task.name.to_string(),
            placeholder,
        }
    })?;

    let model = config.model_config_for(task.agent.id);
    tracing::info!(
        task = task.name,
        agent = task.agent.id,
        provider = model.provider.display_name(),
        model = %model.model,
        "Running task"
    );

    let draft = StageSkill::run(&task.agent, prompt, &model)
        .await
        .map_err(classify_provider_error)?;

    Ok(TaskOutput::named(task.name, draft.content).with_agent(task.agent.role))
}

enum Phase {
    Start,
    Announce(usize),
    Execute(usize),
    Done,
}

struct Kickoff {
    crew: CrewDefinition,
    inputs: Arc<TemplateInputs>,
    executor: TaskExecutor,
    outputs: Vec<TaskOutput>,
    phase: Phase,
}

impl Kickoff {
    /// Produce the next step, or `None` once the crew has finished or failed.
    async fn step(&mut self) -> Option<Result<CrewStep, CrewError>> {
        match self.phase {
            Phase::Start => {
                self.phase = Phase::Announce(0);
                Some(Ok(CrewStep::CrewStarted {
                    crew: self.crew.kind,
                }))
            }
            Phase::Announce(index) => match self.crew.tasks.get(index) {
                Some(task) => {
                    self.phase = Phase::Execute(index);
                    Some(Ok(CrewStep::TaskStarted {
                        task: task.name.to_string(),
                        agent: task.agent.role.to_string(),
                    }))
                }
                None => {
                    self.phase = Phase::Done;
                    Some(Ok(CrewStep::CrewFinished {
                        crew: self.crew.kind,
                    }))
                }
            },
            Phase::Execute(index) => {
                let task = *self.crew.tasks.get(index)?;
                match (self.executor)(task, Arc::clone(&self.inputs)).await {
                    Ok(output) => {
                        self.outputs.push(output);
                        self.phase = Phase::Announce(index + 1);
                        Some(Ok(CrewStep::TasksOutput {
                            outputs: self.outputs.clone(),
                        }))
                    }
                    Err(e) => {
                        tracing::warn!(task = task.name, error = %e, "Task failed");
                        self.phase = Phase::Done;
                        Some(Err(e))
                    }
                }
            }
            Phase::Done => None,
        }
    }
}

/// Run the crew's tasks one after another; the first error ends the stream.
fn sequential_steps(
    crew: CrewDefinition,
    inputs: TemplateInputs,
    executor: TaskExecutor,
) -> CrewStepStream {
    let kickoff = Kickoff {
        crew,
        inputs: Arc::new(inputs),
        executor,
        outputs: Vec::new(),
        phase: Phase::Start,
    };

    stream::unfold(kickoff, |mut kickoff| async move {
        let step = kickoff.step().await?;
        Some((step, kickoff))
    })
    .boxed()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn echo_executor(calls: Arc<AtomicUsize>) -> TaskExecutor {
        Arc::new(move |task: TaskDefinition, inputs: Arc<TemplateInputs>| {
            calls.fetch_add(1, Ordering::SeqCst);
            async move {
                let body = format!("{} for {}", task.name, inputs["name"]);
                Ok::<_, CrewError>(TaskOutput::named(task.name, body).with_agent(task.agent.role))
            }
            .boxed()
        })
    }

    fn inputs() -> TemplateInputs {
        [("name".to_string(), "Brewly".to_string())]
            .into_iter()
            .collect()
    }

    #[tokio::test]
    async fn test_steps_are_ordered_and_cumulative() {
        let calls = Arc::new(AtomicUsize::new(0));
        let steps: Vec<_> = sequential_steps(
            CrewKind::Pitch.definition(),
            inputs(),
            echo_executor(calls.clone()),
        )
        .collect()
        .await;

        let kinds: Vec<_> = steps
            .iter()
            .map(|step| step.as_ref().unwrap().kind())
            .collect();
        assert_eq!(
            kinds,
            vec![
                "crew_started",
                "task_started",
                "tasks_output",
                "task_started",
                "tasks_output",
                "task_started",
                "tasks_output",
                "crew_finished",
            ]
        );

        match steps[6].as_ref().unwrap() {
            CrewStep::TasksOutput { outputs } => {
                assert_eq!(outputs.len(), 3);
                assert_eq!(outputs[2].raw, "engineering_task for Brewly");
                assert_eq!(outputs[0].agent, "Startup Visionary");
            }
            other => panic!("unexpected step {:?}", other),
        }
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_nothing_runs_until_polled() {
        let calls = Arc::new(AtomicUsize::new(0));
        let mut steps = sequential_steps(
            CrewKind::Pitch.definition(),
            inputs(),
            echo_executor(calls.clone()),
        );
        assert_eq!(calls.load(Ordering::SeqCst), 0);

        // crew_started, task_started, tasks_output
        for _ in 0..3 {
            steps.next().await;
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_first_error_ends_the_stream() {
        let executor: TaskExecutor = Arc::new(|task: TaskDefinition, _| {
            async move {
                if task.name == "financial_task" {
                    Err(CrewError::ServiceOverloaded {
                        detail: "HTTP 503".to_string(),
                    })
                } else {
                    Ok(TaskOutput::named(task.name, "ok"))
                }
            }
            .boxed()
        });

        let steps: Vec<_> = sequential_steps(CrewKind::Pitch.definition(), inputs(), executor)
            .collect()
            .await;

        assert_eq!(steps.len(), 5);
        assert!(matches!(
            steps.last(),
            Some(Err(CrewError::ServiceOverloaded { .. }))
        ));
    }

    #[tokio::test]
    async fn test_llm_runtime_reports_missing_template_input() {
        let runtime = LlmCrewRuntime::new(BattleConfig::default());
        let steps: Vec<_> = runtime
            .kickoff(CrewKind::Pitch, TemplateInputs::new())
            .collect()
            .await;

        match steps.last() {
            Some(Err(CrewError::Template { task, placeholder })) => {
                assert_eq!(task, "pitch_task");
                assert_eq!(placeholder, "plugin_context");
            }
            other => panic!("expected template error, got {:?}", other),
        }
    }
}
