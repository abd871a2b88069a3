//! Game balance, map presets and control modes
//!
//! Everything a level needs to know before the first frame. Loadable from
//! JSON so balance can be tweaked without rebuilding.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from loading or validating configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// How the player steers the avatar
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ControlMode {
    /// Up/down key states
    #[default]
    Keyboard,
    /// Normalized vertical hand coordinate
    Camera,
}

impl ControlMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ControlMode::Keyboard => "keyboard",
            ControlMode::Camera => "camera",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "keyboard" | "keys" => Some(ControlMode::Keyboard),
            "camera" | "hand" => Some(ControlMode::Camera),
            _ => None,
        }
    }

    /// Camera mode must see a hand before the run starts
    pub fn awaits_hand(&self) -> bool {
        matches!(self, ControlMode::Camera)
    }
}

/// Base obstacle speed and whether it ramps up over time
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapConfig {
    pub obstacle_speed: f32,
    pub increasing_speed: bool,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self::MAP1
    }
}

impl MapConfig {
    pub const MAP1: Self = Self { obstacle_speed: 6.0, increasing_speed: false };
    pub const MAP2: Self = Self { obstacle_speed: 7.0, increasing_speed: false };
    pub const MAP3: Self = Self { obstacle_speed: 7.0, increasing_speed: true };
    pub const MAP4: Self = Self { obstacle_speed: 8.0, increasing_speed: true };

    /// Look up a built-in map by id (`map1`..`map4`)
    pub fn preset(id: &str) -> Option<Self> {
        match id.to_lowercase().as_str() {
            "map1" => Some(Self::MAP1),
            "map2" => Some(Self::MAP2),
            "map3" => Some(Self::MAP3),
            "map4" => Some(Self::MAP4),
            _ => None,
        }
    }

    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let map: Self = serde_json::from_str(json)?;
        if !(map.obstacle_speed.is_finite() && map.obstacle_speed > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "obstacle speed must be positive, got {}",
                map.obstacle_speed
            )));
        }
        Ok(map)
    }
}

/// Obstacle generation parameters for one control mode
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpawnProfile {
    /// Concurrent obstacle cap
    pub max_obstacles: usize,
    /// Probability that a spawn is a tunnel instead of a solid block
    pub tunnel_chance: f32,
    /// Tunnel gap height range (px)
    pub tunnel_gap: (f32, f32),
    /// Delay range between spawns (ms)
    pub spawn_delay_ms: (f32, f32),
}

impl SpawnProfile {
    /// Keys react fast, so keyboard runs get denser traffic
    pub const KEYBOARD: Self = Self {
        max_obstacles: 8,
        tunnel_chance: 0.2,
        tunnel_gap: (60.0, 90.0),
        spawn_delay_ms: (400.0, 800.0),
    };

    /// Hand input is noisy and laggy: fewer, wider, slower
    pub const CAMERA: Self = Self {
        max_obstacles: 5,
        tunnel_chance: 0.1,
        tunnel_gap: (75.0, 100.0),
        spawn_delay_ms: (700.0, 1200.0),
    };

    fn validate(&self, name: &str) -> Result<(), ConfigError> {
        let ordered = |(lo, hi): (f32, f32)| lo.is_finite() && hi.is_finite() && lo >= 0.0 && lo <= hi;
        if !(0.0..=1.0).contains(&self.tunnel_chance) {
            return Err(ConfigError::Invalid(format!("{name}: tunnel_chance out of [0, 1]")));
        }
        if !ordered(self.tunnel_gap) || !ordered(self.spawn_delay_ms) {
            return Err(ConfigError::Invalid(format!("{name}: range bounds out of order")));
        }
        Ok(())
    }
}

/// Gameplay tunables
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    // === Canvas ===
    pub canvas_width: f32,
    pub canvas_height: f32,

    // === Player ===
    pub player_size: f32,
    /// Vertical displacement per step with a key held
    pub player_speed: f32,
    pub player_start: (f32, f32),
    /// Per-step lerp factor toward the progress-derived x
    pub horizontal_smoothing: f32,
    /// Per-step lerp factor toward the hand-derived y
    pub vertical_smoothing: f32,

    // === Hand input ===
    pub hand_sample_interval_ms: f64,
    pub hand_epsilon: f32,
    /// Hand y is scaled up so the avatar reaches the edges without a full arm sweep
    pub hand_gain: f32,

    // === Obstacles ===
    pub obstacle_width: f32,
    pub solid_height: (f32, f32),
    /// Pieces at or below this height are dropped
    pub min_piece_height: f32,
    /// Solid obstacles closer than this to the previous one get moved
    pub repeat_threshold: f32,
    pub first_spawn_delay_ms: f32,
    pub keyboard: SpawnProfile,
    pub camera: SpawnProfile,

    // === Goal ===
    pub goal_width: f32,
    pub goal_threshold: f32,

    // === Collisions ===
    pub collision_cooldown_ms: f64,
    pub flash_steps: u32,

    // === Difficulty ===
    pub speed_increment: f32,
    pub speed_ramp_period_s: f32,
    pub ramp_check_interval_ms: f64,

    // === Session ===
    pub max_health: u8,
    /// Run length that maps to 100% progress
    pub level_duration_ms: f64,
    pub hand_confirm_ms: f64,
    pub hand_lost_ms: f64,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            canvas_width: 800.0,
            canvas_height: 300.0,

            player_size: 20.0,
            player_speed: 8.0,
            player_start: (50.0, 150.0),
            horizontal_smoothing: 0.01,
            vertical_smoothing: 0.3,

            hand_sample_interval_ms: 50.0,
            hand_epsilon: 0.01,
            hand_gain: 1.2,

            obstacle_width: 20.0,
            solid_height: (40.0, 180.0),
            min_piece_height: 10.0,
            repeat_threshold: 40.0,
            first_spawn_delay_ms: 1000.0,
            keyboard: SpawnProfile::KEYBOARD,
            camera: SpawnProfile::CAMERA,

            goal_width: 30.0,
            goal_threshold: 80.0,

            collision_cooldown_ms: 1000.0,
            flash_steps: 10,

            speed_increment: 0.5,
            speed_ramp_period_s: 10.0,
            ramp_check_interval_ms: 1000.0,

            max_health: 3,
            level_duration_ms: 60_000.0,
            hand_confirm_ms: 1000.0,
            hand_lost_ms: 500.0,
        }
    }
}

impl GameConfig {
    /// Parse and validate a JSON config; missing fields take defaults
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Spawn profile for a control mode
    pub fn profile(&self, mode: ControlMode) -> &SpawnProfile {
        match mode {
            ControlMode::Keyboard => &self.keyboard,
            ControlMode::Camera => &self.camera,
        }
    }

    /// Highest y the player may occupy
    pub fn player_max_y(&self) -> f32 {
        (self.canvas_height - self.player_size).max(0.0)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.canvas_width > 0.0 && self.canvas_height > 0.0) {
            return Err(ConfigError::Invalid("canvas must have positive size".into()));
        }
        if !(self.player_size > 0.0)
            || self.player_size > self.canvas_height
            || self.player_size > self.canvas_width
        {
            return Err(ConfigError::Invalid("player must fit inside the canvas".into()));
        }
        let (lo, hi) = self.solid_height;
        if !(lo > 0.0 && lo <= hi && hi <= self.canvas_height) {
            return Err(ConfigError::Invalid("solid_height range out of order".into()));
        }
        if !(0.0..=1.0).contains(&self.horizontal_smoothing)
            || !(0.0..=1.0).contains(&self.vertical_smoothing)
        {
            return Err(ConfigError::Invalid("smoothing factors must be in [0, 1]".into()));
        }
        if self.max_health == 0 {
            return Err(ConfigError::Invalid("max_health must be at least 1".into()));
        }
        self.keyboard.validate("keyboard")?;
        self.camera.validate("camera")?;
        Ok(())
    }
}
