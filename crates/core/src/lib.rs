//! # Pitch Battle Core
//!
//! The "Brain" of Pitch Battle - generates two pitch variations for a
//! startup concept and asks a jury to pick between them.
//!
//! ## Architecture
//!
//! - `pitch` - Immutable request model, persona lookup, presets, form validation
//! - `models` - Centralized LLM provider configuration
//! - `skills` - Crew definitions, bundled prompts and the LLM-backed stage skill
//! - `state` - Runtime directory and persisted configuration
//! - `swarm` - Slot buffer, router, pipeline runners and the battle coordinator
//! - `error` - Failure taxonomy and provider error classification
//!
//! ## Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use pitch_battle_core::pitch::{PitchForm, PitchRequest};
//! use pitch_battle_core::state::BattleConfig;
//! use pitch_battle_core::swarm::{spawn_battle, BattleCoordinator, LlmCrewRuntime};
//!
//! let runtime = Arc::new(LlmCrewRuntime::new(BattleConfig::load().await?));
//! let (mut snapshots, handle) = spawn_battle(BattleCoordinator::new(runtime), PitchRequest::new(form));
//! while let Some(snapshot) = snapshots.next().await {
//!     render(&snapshot);
//! }
//! ```

pub mod error;
pub mod models;
pub mod pitch;
pub mod skills;
pub mod state;
pub mod swarm;

pub use error::{CrewError, SlotError};
