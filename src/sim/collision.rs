//! Collision and goal detection
//!
//! Everything is an axis-aligned box. Touching edges do not count.

use glam::Vec2;

use super::state::{Entity, FeedbackMessage, GameEvent, GameState};

/// Text shown next to the player on a hit
pub const HIT_MESSAGE: &str = "Ouch!";
/// Message rise per step (px)
const MESSAGE_RISE: f32 = 1.0;
/// Message fade per step
const MESSAGE_FADE: f32 = 0.02;

/// Strict AABB overlap
#[inline]
pub fn overlaps(a: &Entity, b: &Entity) -> bool {
    a.pos.x < b.right() && a.right() > b.pos.x && a.pos.y < b.bottom() && a.bottom() > b.pos.y
}

/// Check the player against every obstacle, at most one hit per cooldown
///
/// Returns true if a collision was triggered this step.
pub fn check_collisions(state: &mut GameState, now_ms: f64) -> bool {
    // Poll the deadline instead of waiting on a timer
    if state.collision.cooldown_until.is_some_and(|until| now_ms >= until) {
        state.collision.cooldown_until = None;
    }
    if state.collision.cooling_down(now_ms) {
        return false;
    }

    let player = state.player;
    if !state.obstacles.iter().any(|o| overlaps(&player, o)) {
        return false;
    }

    let collision = &mut state.collision;
    collision.cooldown_until = Some(now_ms + state.config.collision_cooldown_ms);
    collision.flash_steps = state.config.flash_steps;
    collision.message = Some(FeedbackMessage {
        text: HIT_MESSAGE.to_string(),
        pos: Vec2::new(player.right(), player.pos.y),
        opacity: 1.0,
    });
    state.events.push(GameEvent::Collision { at: player.pos });
    log::debug!("Collision at ({:.0}, {:.0})", player.pos.x, player.pos.y);
    true
}

/// Check the player against the goal; fires once per goal spawn
pub fn check_goal(state: &mut GameState) -> bool {
    let player = state.player;
    let Some(goal) = state.goal.as_mut() else {
        return false;
    };
    if goal.reached || !overlaps(&player, &goal.entity) {
        return false;
    }

    goal.reached = true;
    state.events.push(GameEvent::LevelComplete);
    log::info!("Goal reached");
    true
}

/// Decay the hit flash and float the message away
pub fn update_feedback(state: &mut GameState) {
    let collision = &mut state.collision;
    collision.flash_steps = collision.flash_steps.saturating_sub(1);

    if let Some(msg) = collision.message.as_mut() {
        msg.pos.y -= MESSAGE_RISE;
        msg.opacity -= MESSAGE_FADE;
        if msg.opacity <= 0.0 {
            collision.message = None;
        }
    }
}
