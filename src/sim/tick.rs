//! Fixed timestep simulation step
//!
//! Order within a step: player motion, obstacle/goal advance, spawning,
//! obstacle collisions, goal contact, feedback decay.

use super::collision::{check_collisions, check_goal, update_feedback};
use super::motion::{ControlSignal, advance_player};
use super::spawner::{Spawner, try_spawn_goal};
use super::state::GameState;
use crate::consts::{FIXED_STEP_MS, SPEED_REFERENCE_MS};

/// Input commands for a single step
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    pub control: ControlSignal,
    /// External level progress, 0-100
    pub progress: f32,
}

/// What happened during one step
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickOutcome {
    pub spawned: bool,
    pub collided: bool,
    pub goal_reached: bool,
}

/// Move obstacles and the goal left; drop anything fully off-screen
pub fn advance_obstacles(state: &mut GameState) {
    let scale = FIXED_STEP_MS / SPEED_REFERENCE_MS;

    state.obstacles.retain_mut(|obstacle| {
        obstacle.pos.x -= obstacle.speed * scale;
        !obstacle.is_off_screen()
    });

    if let Some(goal) = state.goal.as_mut() {
        goal.entity.pos.x -= goal.entity.speed * scale;
        if goal.entity.is_off_screen() {
            log::debug!("Goal left the screen");
            state.goal = None;
        }
    }
}

/// Advance the game state by one fixed step
///
/// `spawn_check` is only set on the first step of a rendered frame, which
/// bounds spawn checks to one per frame.
pub fn step(
    state: &mut GameState,
    spawner: &mut Spawner,
    input: &TickInput,
    spawn_check: bool,
) -> TickOutcome {
    if !state.phase.is_running() {
        return TickOutcome::default();
    }

    let now = state.clock_ms;
    state.time_steps += 1;
    state.set_progress(input.progress);

    advance_player(state, &input.control, now);
    advance_obstacles(state);

    try_spawn_goal(state);
    let spawned = spawn_check && spawner.try_spawn(now, state);

    let collided = check_collisions(state, now);
    let goal_reached = check_goal(state);
    update_feedback(state);

    TickOutcome {
        spawned,
        collided,
        goal_reached,
    }
}
