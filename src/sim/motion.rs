//! Player motion from control input
//!
//! x is not under player control: it eases toward a position derived from
//! level progress. y follows either the held keys or a smoothed hand target.

use super::state::GameState;
use crate::lerp;
use crate::settings::GameConfig;

/// Control input for one step
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ControlSignal {
    /// Key states; both may be held at once
    Discrete { up: bool, down: bool },
    /// Normalized hand y in [0, 1] plus presence flag
    Continuous { detected: bool, y: f32 },
}

impl Default for ControlSignal {
    fn default() -> Self {
        ControlSignal::Discrete { up: false, down: false }
    }
}

/// Throttles the hand signal into a vertical target
///
/// A sample is accepted at most once per interval and only when it moved more
/// than epsilon from the last accepted one.
#[derive(Debug, Clone, Default)]
pub struct HandSampler {
    last_sample_ms: Option<f64>,
    last_y: Option<f32>,
    /// Player y the avatar eases toward
    pub target_y: Option<f32>,
}

impl HandSampler {
    /// Offer a raw sample; returns true if it replaced the target
    pub fn offer(&mut self, now_ms: f64, detected: bool, y: f32, config: &GameConfig) -> bool {
        if !detected || !y.is_finite() {
            return false;
        }
        if self
            .last_sample_ms
            .is_some_and(|t| now_ms - t < config.hand_sample_interval_ms)
        {
            return false;
        }
        if self.last_y.is_some_and(|last| (y - last).abs() <= config.hand_epsilon) {
            return false;
        }

        self.last_sample_ms = Some(now_ms);
        self.last_y = Some(y);
        let target = y * config.canvas_height * config.hand_gain - config.player_size / 2.0;
        self.target_y = Some(target.clamp(0.0, config.player_max_y()));
        true
    }
}

/// Advance the player by one fixed step
pub fn advance_player(state: &mut GameState, signal: &ControlSignal, now_ms: f64) {
    let config = &state.config;
    let player = &mut state.player;
    let max_y = config.player_max_y();

    // Horizontal: ease toward the progress position, never back
    let max_x = (config.canvas_width - player.size.x).max(0.0);
    let target_x = state.progress / 100.0 * max_x;
    let eased = lerp(player.pos.x, target_x, config.horizontal_smoothing);
    player.pos.x = player.pos.x.max(eased).clamp(0.0, max_x);

    match *signal {
        ControlSignal::Discrete { up, down } => {
            if up {
                player.pos.y = (player.pos.y - player.speed).max(0.0);
            }
            if down {
                player.pos.y = (player.pos.y + player.speed).min(max_y);
            }
        }
        ControlSignal::Continuous { detected, y } => {
            state.hand.offer(now_ms, detected, y, config);
            if let Some(target) = state.hand.target_y {
                player.pos.y = lerp(player.pos.y, target, config.vertical_smoothing);
            }
        }
    }

    player.pos.y = player.pos.y.clamp(0.0, max_y);
}
