//! # Battle Coordinator
//!
//! Drives one battle from request to verdict and publishes a full
//! [`Snapshot`] of the output slots after every routed batch.
//!
//! ```text
//! Variation 1 (slots 0-2) → Variation 2 (slots 3-5) → Jury (slot 6)
//! ```
//!
//! All failure recovery happens here, once:
//! - transient provider overload keeps what was already produced and puts
//!   [`OVERLOADED_MESSAGE`] into the error slot
//! - any other crew failure clears every slot and puts the diagnostic into
//!   the error slot
//! - a [`SlotError`] is a coordinator bug and is returned as `Err`
//!
//! A run stops at its next emission once the snapshot receiver is dropped.

use std::sync::Arc;

use futures::StreamExt;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::task::JoinHandle;
use tokio_stream::wrappers::ReceiverStream;
use uuid::Uuid;

use crate::error::{CrewError, SlotError};
use crate::pitch::{EvaluationInput, PitchRequest, Variation};
use crate::swarm::events::{BattleEvent, BattleEventKind, TaskOutput};
use crate::swarm::pipeline::{EvaluationPipeline, Pipeline, TaskBatchStream, VariationPipeline};
use crate::swarm::router;
use crate::swarm::runtime::CrewRuntime;
use crate::swarm::slots::{OutputSlots, Snapshot, ERROR};

/// Advisory placed in the error slot when the model provider is overloaded
pub const OVERLOADED_MESSAGE: &str = "⚠️ The AI model is currently overloaded (503 Service Unavailable). Please try again in a few seconds.";

/// How a run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BattleOutcome {
    /// Verdict written, error slot empty
    Completed,
    /// Provider overloaded; partial output kept
    Overloaded,
    /// Unclassified failure; output discarded
    Failed,
    /// Snapshot receiver dropped mid-run
    Abandoned,
}

/// Why the stage loop stopped early
enum Halt {
    Crew(CrewError),
    Defect(SlotError),
    Abandoned,
}

impl From<CrewError> for Halt {
    fn from(e: CrewError) -> Self {
        Halt::Crew(e)
    }
}

impl From<SlotError> for Halt {
    fn from(e: SlotError) -> Self {
        Halt::Defect(e)
    }
}

/// Per-run state: private slots plus the channel they are published on
struct Battle {
    id: String,
    slots: OutputSlots,
    snapshots: mpsc::Sender<Snapshot>,
}

impl Battle {
    /// Next batch from a pipeline, unless the consumer went away first
    async fn next_batch(
        &self,
        batches: &mut TaskBatchStream,
    ) -> Result<Option<Vec<TaskOutput>>, Halt> {
        tokio::select! {
            biased;
            _ = self.snapshots.closed() => Err(Halt::Abandoned),
            batch = batches.next() => Ok(batch.transpose()?),
        }
    }

    async fn publish(&self) -> Result<(), Halt> {
        self.snapshots
            .send(self.slots.snapshot())
            .await
            .map_err(|_| Halt::Abandoned)
    }
}

/// Runs battles against a crew runtime
pub struct BattleCoordinator {
    runtime: Arc<dyn CrewRuntime>,
    event_tx: Option<mpsc::Sender<BattleEvent>>,
}

impl BattleCoordinator {
    pub fn new(runtime: Arc<dyn CrewRuntime>) -> Self {
        Self {
            runtime,
            event_tx: None,
        }
    }

    /// Set event channel for lifecycle events
    pub fn with_event_channel(mut self, tx: mpsc::Sender<BattleEvent>) -> Self {
        self.event_tx = Some(tx);
        self
    }

    /// Best effort; a slow or absent observer never holds up the run.
    fn emit(&self, event: BattleEvent) {
        let Some(tx) = &self.event_tx else {
            return;
        };
        match tx.try_send(event) {
            Ok(()) => {}
            Err(TrySendError::Full(event)) => {
                tracing::debug!(kind = ?event.kind, "Event channel full, dropping event");
            }
            Err(TrySendError::Closed(_)) => {
                tracing::debug!("Event channel closed");
            }
        }
    }

    /// Run one battle, publishing snapshots on `snapshots`.
    ///
    /// The last snapshot sent is the final state of the run.
    #[tracing::instrument(skip_all, fields(startup = %request.startup_name, battle_id = tracing::field::Empty))]
    pub async fn run(
        &self,
        request: PitchRequest,
        snapshots: mpsc::Sender<Snapshot>,
    ) -> Result<BattleOutcome, SlotError> {
        let mut battle = Battle {
            id: Uuid::new_v4().to_string(),
            slots: OutputSlots::new(),
            snapshots,
        };
        tracing::Span::current().record("battle_id", battle.id.as_str());
        tracing::info!(industry = %request.industry, "Battle started");
        self.emit(BattleEvent::new(BattleEventKind::BattleStarted, &battle.id));

        let error = match self.run_stages(&mut battle, &request).await {
            Ok(()) => {
                tracing::info!("Battle completed");
                self.emit(BattleEvent::new(BattleEventKind::BattleCompleted, &battle.id));
                return Ok(BattleOutcome::Completed);
            }
            Err(Halt::Abandoned) => {
                tracing::info!("Snapshot receiver dropped, abandoning battle");
                return Ok(BattleOutcome::Abandoned);
            }
            Err(Halt::Defect(e)) => return Err(e),
            Err(Halt::Crew(e)) => e,
        };

        let outcome = if error.is_transient() {
            tracing::warn!(error = %error, "Model provider overloaded, keeping partial output");
            battle.slots.set(ERROR, OVERLOADED_MESSAGE)?;
            BattleOutcome::Overloaded
        } else {
            tracing::warn!(error = %error, "Battle failed, discarding output");
            battle.slots.clear();
            battle
                .slots
                .set(ERROR, format!("❌ Error:\n```\n{}\n```", error.diagnostic()))?;
            BattleOutcome::Failed
        };

        self.emit(
            BattleEvent::new(BattleEventKind::BattleFailed, &battle.id).with_data(
                serde_json::json!({
                    "outcome": outcome,
                    "error": error.to_string(),
                }),
            ),
        );

        match battle.publish().await {
            Ok(()) => Ok(outcome),
            Err(_) => Ok(BattleOutcome::Abandoned),
        }
    }

    async fn run_stages(&self, battle: &mut Battle, request: &PitchRequest) -> Result<(), Halt> {
        for variation in Variation::all() {
            self.run_variation(battle, &request.with_variation(variation))
                .await?;
        }

        let input = EvaluationInput::from_slots(&request.startup_name, &battle.slots.snapshot());
        tracing::info!("Both variations done, starting evaluation");
        self.emit(BattleEvent::new(BattleEventKind::EvaluationStarted, &battle.id));

        let mut batches = EvaluationPipeline::run(self.runtime.as_ref(), &input);
        while let Some(batch) = battle.next_batch(&mut batches).await? {
            for output in &batch {
                if router::route_evaluation_output(&mut battle.slots, output)?.is_some() {
                    self.emit(BattleEvent::new(BattleEventKind::VerdictReady, &battle.id));
                }
            }
            battle.publish().await?;
        }

        Ok(())
    }

    async fn run_variation(&self, battle: &mut Battle, request: &PitchRequest) -> Result<(), Halt> {
        let variation = request.variation;
        let offset = variation.slot_offset();
        tracing::info!(variation = variation.number(), "Starting variation");
        self.emit(
            BattleEvent::new(BattleEventKind::VariationStarted, &battle.id)
                .with_variation(variation.number()),
        );

        let mut pipeline = Pipeline::new();
        let mut batches = VariationPipeline::run(self.runtime.as_ref(), request);
        loop {
            let batch = match battle.next_batch(&mut batches).await {
                Ok(Some(batch)) => batch,
                Ok(None) => break,
                Err(Halt::Crew(e)) => {
                    let task = pipeline.fail().unwrap_or_default();
                    tracing::warn!(variation = variation.number(), task, "Stage failed");
                    self.emit(
                        BattleEvent::new(BattleEventKind::StageFailed, &battle.id)
                            .with_variation(variation.number())
                            .with_task(task),
                    );
                    return Err(Halt::Crew(e));
                }
                Err(halt) => return Err(halt),
            };
            for output in &batch {
                router::route_task_output(&mut battle.slots, output, offset)?;
            }
            for stage in pipeline.record(&batch) {
                let task = stage.task_name().unwrap_or_default();
                tracing::info!(variation = variation.number(), task, "Stage completed");
                self.emit(
                    BattleEvent::new(BattleEventKind::StageCompleted, &battle.id)
                        .with_variation(variation.number())
                        .with_task(task),
                );
            }
            battle.publish().await?;
        }

        if !pipeline.is_success() {
            tracing::warn!(
                variation = variation.number(),
                stage = ?pipeline.stage,
                "Variation ended before all stages reported"
            );
        }
        Ok(())
    }
}

/// Start a battle on the runtime and return its snapshot stream.
///
/// The channel holds one snapshot, so the run advances only as fast as the
/// stream is consumed. Dropping the stream abandons the run.
pub fn spawn_battle(
    coordinator: BattleCoordinator,
    request: PitchRequest,
) -> (
    ReceiverStream<Snapshot>,
    JoinHandle<Result<BattleOutcome, SlotError>>,
) {
    let (tx, rx) = mpsc::channel(1);
    let handle = tokio::spawn(async move { coordinator.run(request, tx).await });
    (ReceiverStream::new(rx), handle)
}
