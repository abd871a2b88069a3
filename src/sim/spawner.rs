//! Procedural obstacle and goal spawning
//!
//! Two shapes of obstacle:
//! - tunnel: a top and bottom piece leaving a gap in one third of the canvas
//! - solid: a single block placed in one of five vertical zones
//!
//! Zones 0 and 4 are pinned to the edges so the whole height gets covered over
//! time. A solid block whose center lands too close to the previous block's
//! center is moved to the half opposite that previous block.
//!
//! A spawn never takes the live count past the mode's cap: when a tunnel only
//! has room for one piece, the top piece is kept.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::state::{Entity, EntityKind, GameEvent, GamePhase, GameState, Goal};
use crate::settings::SpawnProfile;

/// Obstacle spawner with its own timing refs and seeded RNG
#[derive(Debug, Clone)]
pub struct Spawner {
    rng: Pcg32,
    /// Run-clock time of the last spawn
    pub last_spawn_ms: f64,
    /// Wait before the next spawn is allowed
    pub next_delay_ms: f64,
    /// Vertical center of the last solid obstacle
    pub last_center: Option<f32>,
}

/// Uniform draw in `[lo, hi)`; an inverted range collapses toward `lo`
fn uniform(rng: &mut Pcg32, lo: f32, hi: f32) -> f32 {
    lo + rng.random::<f32>() * (hi - lo)
}

impl Spawner {
    pub fn new(seed: u64, first_delay_ms: f32) -> Self {
        Self {
            rng: Pcg32::seed_from_u64(seed),
            last_spawn_ms: 0.0,
            next_delay_ms: first_delay_ms as f64,
            last_center: None,
        }
    }

    /// Spawn an obstacle group if the cap and timer allow it
    pub fn try_spawn(&mut self, now_ms: f64, state: &mut GameState) -> bool {
        let profile = *state.config.profile(state.mode);
        if state.obstacles.len() >= profile.max_obstacles {
            return false;
        }
        if now_ms - self.last_spawn_ms < self.next_delay_ms {
            return false;
        }

        let pieces = if self.rng.random::<f32>() < profile.tunnel_chance {
            self.tunnel(state, &profile)
        } else {
            vec![self.solid(state)]
        };

        let min_height = state.config.min_piece_height;
        let before = state.obstacles.len();
        let room = profile.max_obstacles - before;
        state.obstacles.extend(
            pieces
                .into_iter()
                .filter(|p| p.size.y > min_height)
                .take(room),
        );
        log::debug!(
            "Spawned {} obstacle(s) at t={:.0}ms ({} live)",
            state.obstacles.len() - before,
            now_ms,
            state.obstacles.len()
        );

        let (lo, hi) = profile.spawn_delay_ms;
        self.next_delay_ms = uniform(&mut self.rng, lo, hi) as f64;
        self.last_spawn_ms = now_ms;
        true
    }

    /// Two pieces around a gap in the top, middle or bottom third
    fn tunnel(&mut self, state: &GameState, profile: &SpawnProfile) -> Vec<Entity> {
        let config = &state.config;
        let height = config.canvas_height;
        let third = height / 3.0;
        let margin = config.min_piece_height;

        let gap = uniform(&mut self.rng, profile.tunnel_gap.0, profile.tunnel_gap.1);
        let section = self.rng.random_range(0..3u32);
        let gap_y = section as f32 * third + self.rng.random::<f32>() * (third - gap).max(0.0);

        let mut pieces = Vec::with_capacity(2);
        if gap_y > margin {
            pieces.push(self.obstacle(state, 0.0, gap_y));
        }
        let gap_bottom = gap_y + gap;
        if gap_bottom < height - margin {
            pieces.push(self.obstacle(state, gap_bottom, height - gap_bottom));
        }
        pieces
    }

    /// One block in a random zone, nudged away from the previous block
    fn solid(&mut self, state: &GameState) -> Entity {
        let config = &state.config;
        let canvas = config.canvas_height;
        let (lo, hi) = config.solid_height;
        let h = uniform(&mut self.rng, lo, hi).min(canvas);
        let max_y = canvas - h;

        let zone = self.rng.random_range(0..5u32);
        let zone_height = canvas / 5.0;
        let mut y = match zone {
            0 => 0.0,
            4 => max_y,
            _ => zone as f32 * zone_height + self.rng.random::<f32>() * (zone_height - h),
        };
        y = y.clamp(0.0, max_y);

        if let Some(last) = self
            .last_center
            .filter(|last| (y + h / 2.0 - last).abs() < config.repeat_threshold)
        {
            let mid = canvas / 2.0;
            y = if last < mid {
                mid + self.rng.random::<f32>() * (canvas - mid - h).max(0.0)
            } else {
                self.rng.random::<f32>() * (mid - h).max(0.0)
            };
            y = y.clamp(0.0, max_y);
        }

        self.last_center = Some(y + h / 2.0);
        self.obstacle(state, y, h)
    }

    fn obstacle(&self, state: &GameState, y: f32, height: f32) -> Entity {
        Entity::new(
            EntityKind::Obstacle,
            state.config.canvas_width,
            y,
            state.config.obstacle_width,
            height,
            state.speed,
        )
    }
}

/// Create the goal once progress crosses the threshold
pub fn try_spawn_goal(state: &mut GameState) -> bool {
    if state.progress < state.config.goal_threshold
        || state.goal.is_some()
        || state.phase == GamePhase::Over
    {
        return false;
    }

    let config = &state.config;
    state.goal = Some(Goal {
        entity: Entity::new(
            EntityKind::Goal,
            config.canvas_width,
            0.0,
            config.goal_width,
            config.canvas_height,
            state.speed,
        ),
        reached: false,
    });
    state.events.push(GameEvent::GoalSpawned);
    log::info!("Goal spawned at {:.0}% progress", state.progress);
    true
}
