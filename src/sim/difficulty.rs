//! Time-based obstacle speed ramp

use super::state::{GameEvent, GameState};
use crate::settings::{GameConfig, MapConfig};

/// Steps obstacle speed up every `period_s` seconds of run time
#[derive(Debug, Clone)]
pub struct DifficultyRamp {
    base: f32,
    increment: f32,
    period_s: f32,
    increasing: bool,
    check_interval_ms: f64,
    last_check_ms: f64,
    current: f32,
}

impl DifficultyRamp {
    pub fn new(map: &MapConfig, config: &GameConfig) -> Self {
        Self {
            base: map.obstacle_speed,
            increment: config.speed_increment,
            period_s: config.speed_ramp_period_s,
            increasing: map.increasing_speed,
            check_interval_ms: config.ramp_check_interval_ms,
            last_check_ms: 0.0,
            current: map.obstacle_speed,
        }
    }

    pub fn speed(&self) -> f32 {
        self.current
    }

    /// Speed for a given elapsed run time, ignoring the check interval
    pub fn speed_at(&self, elapsed_ms: f64) -> f32 {
        if !self.increasing || self.period_s <= 0.0 {
            return self.base;
        }
        let steps = (elapsed_ms / 1000.0 / self.period_s as f64).floor() as f32;
        self.base + steps * self.increment
    }

    /// Recompute at most once per check interval; returns the new speed on change
    pub fn update(&mut self, elapsed_ms: f64) -> Option<f32> {
        if !self.increasing || elapsed_ms - self.last_check_ms <= self.check_interval_ms {
            return None;
        }
        self.last_check_ms = elapsed_ms;

        let speed = self.speed_at(elapsed_ms);
        if speed == self.current {
            return None;
        }
        self.current = speed;
        Some(speed)
    }
}

/// Set the spawn speed and push it onto everything already moving
pub fn apply_speed(state: &mut GameState, speed: f32) {
    state.speed = speed;
    for obstacle in &mut state.obstacles {
        obstacle.speed = speed;
    }
    if let Some(goal) = state.goal.as_mut() {
        goal.entity.speed = speed;
    }
    state.events.push(GameEvent::SpeedChanged { speed });
    log::info!("Obstacle speed now {speed}");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::ControlMode;
    use crate::sim::state::{Entity, EntityKind, Goal};

    fn ramp(speed: f32, increasing: bool) -> DifficultyRamp {
        let map = MapConfig { obstacle_speed: speed, increasing_speed: increasing };
        DifficultyRamp::new(&map, &GameConfig::default())
    }

    #[test]
    fn test_speed_after_25_seconds() {
        let ramp = ramp(6.0, true);
        assert_eq!(ramp.speed_at(25_000.0), 7.0);
        assert_eq!(ramp.speed_at(9_999.0), 6.0);
        assert_eq!(ramp.speed_at(10_000.0), 6.5);
    }

    #[test]
    fn test_update_once_per_interval() {
        let mut ramp = ramp(6.0, true);
        let mut changes = Vec::new();
        let mut t = 0.0;
        while t <= 25_000.0 {
            if let Some(speed) = ramp.update(t) {
                changes.push(speed);
            }
            t += 16.0;
        }
        assert_eq!(changes, vec![6.5, 7.0]);
        assert_eq!(ramp.speed(), 7.0);
    }

    #[test]
    fn test_flat_map_never_changes() {
        let mut ramp = ramp(7.0, false);
        assert_eq!(ramp.update(120_000.0), None);
        assert_eq!(ramp.speed_at(120_000.0), 7.0);
    }

    #[test]
    fn test_apply_is_retroactive() {
        let map = MapConfig::MAP3;
        let mut state = GameState::new(GameConfig::default(), map, ControlMode::Keyboard);
        state.obstacles.push(Entity::new(EntityKind::Obstacle, 500.0, 0.0, 20.0, 50.0, 7.0));
        state.obstacles.push(Entity::new(EntityKind::Obstacle, 700.0, 90.0, 20.0, 50.0, 7.0));
        state.goal = Some(Goal {
            entity: Entity::new(EntityKind::Goal, 800.0, 0.0, 30.0, 300.0, 7.0),
            reached: false,
        });

        apply_speed(&mut state, 7.5);
        assert_eq!(state.speed, 7.5);
        assert!(state.obstacles.iter().all(|o| o.speed == 7.5));
        assert_eq!(state.goal.map(|g| g.entity.speed), Some(7.5));
        assert_eq!(state.drain_events(), vec![GameEvent::SpeedChanged { speed: 7.5 }]);
    }
}
