//! Game state and core simulation types
//!
//! Everything the fixed step reads or writes lives in [`GameState`], owned by
//! the governor and handed to the step functions by `&mut`.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::motion::HandSampler;
use crate::settings::{ControlMode, GameConfig, MapConfig};

/// Lifecycle of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Not started
    Idle,
    /// Camera mode waiting for a steady hand
    AwaitingInput,
    /// Active gameplay
    Running,
    /// Game is paused
    Paused,
    /// Run ended (out of health or goal reached)
    Over,
}

/// Inputs to the phase machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhaseEvent {
    Start { awaiting_hand: bool },
    HandConfirmed,
    HandLost,
    Pause,
    Resume,
    Died,
    Completed,
    Restart,
}

impl GamePhase {
    /// Transition table. `None` means the event is not valid in this phase.
    pub fn next(self, event: PhaseEvent) -> Option<GamePhase> {
        use GamePhase::*;
        match (self, event) {
            (_, PhaseEvent::Restart) => Some(Idle),
            (Idle, PhaseEvent::Start { awaiting_hand: true }) => Some(AwaitingInput),
            (Idle, PhaseEvent::Start { awaiting_hand: false }) => Some(Running),
            (AwaitingInput, PhaseEvent::HandConfirmed) => Some(Running),
            (Running, PhaseEvent::Pause | PhaseEvent::HandLost) => Some(Paused),
            (Paused, PhaseEvent::Resume) => Some(Running),
            (Running | Paused, PhaseEvent::Died | PhaseEvent::Completed) => Some(Over),
            _ => None,
        }
    }

    pub fn is_running(self) -> bool {
        self == GamePhase::Running
    }
}

/// Entity categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntityKind {
    Player,
    Obstacle,
    Goal,
}

/// Axis-aligned box with a per-step speed
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    /// Top-left corner
    pub pos: Vec2,
    pub size: Vec2,
    /// Player: pixels per step of vertical movement.
    /// Obstacle/goal: pixels removed from x per normalized step.
    pub speed: f32,
    pub kind: EntityKind,
}

impl Entity {
    pub fn new(kind: EntityKind, x: f32, y: f32, width: f32, height: f32, speed: f32) -> Self {
        Self {
            pos: Vec2::new(x, y),
            size: Vec2::new(width, height),
            speed,
            kind,
        }
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.pos.x + self.size.x
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.pos.y + self.size.y
    }

    #[inline]
    pub fn center_y(&self) -> f32 {
        self.pos.y + self.size.y / 2.0
    }

    /// Fully past the left edge
    #[inline]
    pub fn is_off_screen(&self) -> bool {
        self.right() < 0.0
    }
}

/// The goal marker plus its one-shot latch
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Goal {
    pub entity: Entity,
    /// Set on first contact so the level completes once per spawn
    pub reached: bool,
}

/// Floating "Ouch!" text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedbackMessage {
    pub text: String,
    pub pos: Vec2,
    pub opacity: f32,
}

/// Collision debounce and feedback timers
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CollisionState {
    /// Run-clock deadline until which collisions are ignored
    pub cooldown_until: Option<f64>,
    /// Steps of red flash left
    pub flash_steps: u32,
    pub message: Option<FeedbackMessage>,
}

impl CollisionState {
    pub fn cooling_down(&self, now_ms: f64) -> bool {
        self.cooldown_until.is_some_and(|until| now_ms < until)
    }
}

/// Outward notifications, drained by the host once per frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    /// Player hit an obstacle (one per overlap episode)
    Collision { at: Vec2 },
    /// Player touched the goal
    LevelComplete,
    /// Goal marker entered from the right edge
    GoalSpawned,
    /// Difficulty ramp changed the obstacle speed
    SpeedChanged { speed: f32 },
}

/// Complete simulation state
#[derive(Debug, Clone)]
pub struct GameState {
    pub config: GameConfig,
    pub map: MapConfig,
    pub mode: ControlMode,
    pub phase: GamePhase,
    /// Milliseconds of (capped) frame time spent Running
    pub clock_ms: f64,
    /// Simulation step counter
    pub time_steps: u64,
    /// External level progress, 0-100
    pub progress: f32,
    /// Speed given to newly spawned obstacles
    pub speed: f32,
    pub player: Entity,
    /// Spawn order, oldest first
    pub obstacles: Vec<Entity>,
    pub goal: Option<Goal>,
    pub collision: CollisionState,
    /// Throttled hand target (camera mode)
    pub hand: HandSampler,
    /// Pending outward events
    pub events: Vec<GameEvent>,
}

impl GameState {
    pub fn new(config: GameConfig, map: MapConfig, mode: ControlMode) -> Self {
        let (x, y) = config.player_start;
        let player = Entity::new(
            EntityKind::Player,
            x,
            y.clamp(0.0, config.player_max_y()),
            config.player_size,
            config.player_size,
            config.player_speed,
        );
        Self {
            speed: map.obstacle_speed,
            config,
            map,
            mode,
            phase: GamePhase::Idle,
            clock_ms: 0.0,
            time_steps: 0,
            progress: 0.0,
            player,
            obstacles: Vec::new(),
            goal: None,
            collision: CollisionState::default(),
            hand: HandSampler::default(),
            events: Vec::new(),
        }
    }

    /// Apply a phase event; invalid transitions are logged and ignored
    pub fn transition(&mut self, event: PhaseEvent) -> bool {
        match self.phase.next(event) {
            Some(next) => {
                log::info!("Phase {:?} -> {:?} ({:?})", self.phase, next, event);
                self.phase = next;
                true
            }
            None => {
                log::warn!("Ignoring {:?} while {:?}", event, self.phase);
                false
            }
        }
    }

    /// Store external progress; NaN becomes 0, everything else is clamped
    pub fn set_progress(&mut self, progress: f32) {
        self.progress = if progress.is_nan() { 0.0 } else { progress.clamp(0.0, 100.0) };
    }

    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }
}
