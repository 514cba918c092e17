//! # Battle Orchestration
//!
//! Coordinates the pitch crew and the jury for one battle.
//!
//! ## Pipeline Flow
//!
//! ```text
//! PitchRequest → Variation 1 → Variation 2 → Jury → Verdict
//!                  (visionary → financial_analyst → engineer)
//! ```

pub mod coordinator;
pub mod events;
pub mod pipeline;
pub mod router;
pub mod runtime;
pub mod slots;

pub use coordinator::{spawn_battle, BattleCoordinator, BattleOutcome, OVERLOADED_MESSAGE};
pub use events::{BattleEvent, BattleEventKind, CrewStep, TaskOutput};
pub use pipeline::{EvaluationPipeline, Pipeline, PipelineStage, VariationPipeline};
pub use runtime::{CrewRuntime, CrewStepStream, LlmCrewRuntime};
pub use slots::{OutputSlots, Snapshot, SLOT_COUNT, SLOT_LABELS};
