//! Handwave - side-scrolling obstacle dodge core
//!
//! Core modules:
//! - `sim`: Deterministic simulation (motion, spawning, collisions, difficulty)
//! - `governor`: Fixed-timestep loop with adaptive step budget
//! - `session`: Health, progress clock and hand-presence gating
//! - `platform`: Host input mapping (keys, hand samples)
//! - `settings`: Data-driven game balance and map presets

pub mod governor;
pub mod platform;
pub mod session;
pub mod settings;
pub mod sim;

pub use governor::{FpsClass, FrameReport, Governor, RenderView};
pub use session::Session;
pub use settings::{ConfigError, ControlMode, GameConfig, MapConfig, SpawnProfile};

/// Loop timing constants
pub mod consts {
    /// Fixed simulation step in milliseconds (~60 Hz)
    pub const FIXED_STEP_MS: f32 = 16.0;
    /// Step length that entity speeds are expressed against
    pub const SPEED_REFERENCE_MS: f32 = 16.0;

    /// Frame delta cap, absorbs tab switches and debugger stalls
    pub const MAX_FRAME_DELTA_MS: f32 = 100.0;
    /// Most time a single frame may add to the accumulator
    pub const MAX_ACCUMULATE_MS: f32 = 50.0;
    /// Leftover debt above this is dropped instead of caught up
    pub const ACCUMULATOR_RESET_MS: f32 = FIXED_STEP_MS * 3.0;

    /// Simulation steps per rendered frame
    pub const MIN_STEPS_PER_FRAME: u32 = 1;
    pub const DEFAULT_STEPS_PER_FRAME: u32 = 2;
    pub const MAX_STEPS_PER_FRAME: u32 = 4;

    /// Frame rate measurement window
    pub const FPS_WINDOW_MS: f64 = 1000.0;
    pub const LOW_FPS: f32 = 30.0;
    pub const HIGH_FPS: f32 = 55.0;
}

/// Linear interpolation between `start` and `end`
#[inline]
pub fn lerp(start: f32, end: f32, t: f32) -> f32 {
    start + (end - start) * t
}

/// Player opacity for the remaining health (renderer hint)
pub fn player_opacity(health: u8) -> f32 {
    match health {
        3 => 1.0,
        2 => 0.66,
        1 => 0.33,
        _ => 1.0,
    }
}
