//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (obstacles kept in spawn order)
//! - No rendering or platform dependencies

pub mod collision;
pub mod difficulty;
pub mod motion;
pub mod spawner;
pub mod state;
pub mod tick;

pub use collision::{check_collisions, check_goal, overlaps};
pub use difficulty::{DifficultyRamp, apply_speed};
pub use motion::{ControlSignal, HandSampler, advance_player};
pub use spawner::{Spawner, try_spawn_goal};
pub use state::{
    CollisionState, Entity, EntityKind, FeedbackMessage, GameEvent, GamePhase, GameState, Goal,
    PhaseEvent,
};
pub use tick::{TickInput, TickOutcome, step};
