//! Fixed-timestep loop governor
//!
//! Decouples display refresh from simulation steps. Each rendered frame feeds
//! its (capped) delta into an accumulator that is drained in `FIXED_STEP_MS`
//! steps, up to a per-frame budget picked from the measured frame rate. Debt
//! that still remains after draining is dropped rather than caught up.

use crate::consts::*;
use crate::settings::{ControlMode, GameConfig, MapConfig};
use crate::sim::{
    DifficultyRamp, Entity, FeedbackMessage, GameEvent, GamePhase, GameState, PhaseEvent, Spawner,
    TickInput, apply_speed, step,
};

/// Frame rate bracket from the last measurement window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FpsClass {
    Low,
    Normal,
    High,
}

impl FpsClass {
    pub fn classify(fps: f32) -> Self {
        if fps < LOW_FPS {
            FpsClass::Low
        } else if fps > HIGH_FPS {
            FpsClass::High
        } else {
            FpsClass::Normal
        }
    }

    /// Simulation steps allowed per rendered frame
    pub fn step_budget(self) -> u32 {
        match self {
            FpsClass::Low => MIN_STEPS_PER_FRAME,
            FpsClass::Normal => DEFAULT_STEPS_PER_FRAME,
            FpsClass::High => MAX_STEPS_PER_FRAME,
        }
    }
}

/// Counts frames over fixed windows
#[derive(Debug, Clone)]
pub struct FrameRateMonitor {
    window_start: Option<f64>,
    frames: u32,
    pub fps: Option<f32>,
    pub class: FpsClass,
}

impl Default for FrameRateMonitor {
    fn default() -> Self {
        Self {
            window_start: None,
            frames: 0,
            fps: None,
            class: FpsClass::Normal,
        }
    }
}

impl FrameRateMonitor {
    /// Record a frame; returns the new class when a window closes
    pub fn record(&mut self, now_ms: f64) -> Option<FpsClass> {
        let Some(start) = self.window_start else {
            self.window_start = Some(now_ms);
            return None;
        };
        self.frames += 1;

        let elapsed = now_ms - start;
        if elapsed < FPS_WINDOW_MS {
            return None;
        }
        let fps = (self.frames as f64 * 1000.0 / elapsed) as f32;
        self.frames = 0;
        self.window_start = Some(now_ms);
        self.fps = Some(fps);

        let class = FpsClass::classify(fps);
        if class != self.class {
            log::debug!("Frame rate {fps:.1} fps, step budget {}", class.step_budget());
        }
        self.class = class;
        Some(class)
    }

    /// Start a fresh window (after a pause)
    pub fn restart_window(&mut self) {
        self.window_start = None;
        self.frames = 0;
    }
}

/// What a frame did
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrameReport {
    /// False when the loop was stopped and nothing ran
    pub ran: bool,
    pub steps: u32,
    pub step_budget: u32,
    pub spawned: bool,
    /// Accumulated debt was dropped
    pub accumulator_reset: bool,
    pub events: Vec<GameEvent>,
}

/// Everything a renderer needs for one frame
#[derive(Debug, Clone)]
pub struct RenderView<'a> {
    pub player: &'a Entity,
    pub obstacles: &'a [Entity],
    pub goal: Option<&'a Entity>,
    /// Red/white flash is active
    pub flash: bool,
    /// Flash parity, alternates red and white
    pub flash_red: bool,
    pub message: Option<&'a FeedbackMessage>,
    pub player_opacity: f32,
    /// Frame rate is struggling; drop glow and trails
    pub reduced_effects: bool,
}

/// Owns the simulation and drives it from frame callbacks
#[derive(Debug, Clone)]
pub struct Governor {
    state: GameState,
    spawner: Spawner,
    ramp: DifficultyRamp,
    monitor: FrameRateMonitor,
    accumulator: f32,
    last_time: Option<f64>,
    seed: u64,
}

impl Governor {
    pub fn new(config: GameConfig, map: MapConfig, mode: ControlMode, seed: u64) -> Self {
        let spawner = Spawner::new(seed, config.first_spawn_delay_ms);
        let ramp = DifficultyRamp::new(&map, &config);
        Self {
            state: GameState::new(config, map, mode),
            spawner,
            ramp,
            monitor: FrameRateMonitor::default(),
            accumulator: 0.0,
            last_time: None,
            seed,
        }
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut GameState {
        &mut self.state
    }

    pub fn phase(&self) -> GamePhase {
        self.state.phase
    }

    pub fn step_budget(&self) -> u32 {
        self.monitor.class.step_budget()
    }

    pub fn fps(&self) -> Option<f32> {
        self.monitor.fps
    }

    pub fn accumulator(&self) -> f32 {
        self.accumulator
    }

    /// Apply a phase event; leaving Running stops the loop and Restart
    /// rebuilds the run from scratch
    pub fn transition(&mut self, event: PhaseEvent) -> bool {
        let changed = self.state.transition(event);
        if changed && event == PhaseEvent::Restart {
            self.reset();
        }
        if !self.state.phase.is_running() {
            self.stop();
        }
        changed
    }

    /// Fresh state, spawner and ramp with the same config, map, mode and seed
    fn reset(&mut self) {
        let config = self.state.config.clone();
        *self = Self::new(config, self.state.map, self.state.mode, self.seed);
    }

    /// Forget frame timing so the next frame starts from zero delta
    pub fn stop(&mut self) {
        self.last_time = None;
        self.accumulator = 0.0;
        self.monitor.restart_window();
    }

    /// Run one rendered frame
    pub fn frame(&mut self, now_ms: f64, input: &TickInput) -> FrameReport {
        if !self.state.phase.is_running() {
            self.stop();
            return FrameReport::default();
        }

        let delta = match self.last_time {
            Some(last) => ((now_ms - last).max(0.0) as f32).min(MAX_FRAME_DELTA_MS),
            None => 0.0,
        };
        self.last_time = Some(now_ms);
        self.state.clock_ms += delta as f64;
        self.monitor.record(now_ms);
        self.accumulator += delta.min(MAX_ACCUMULATE_MS);

        let budget = self.step_budget();
        let mut report = FrameReport {
            ran: true,
            step_budget: budget,
            ..Default::default()
        };

        while self.accumulator >= FIXED_STEP_MS && report.steps < budget {
            let outcome = step(&mut self.state, &mut self.spawner, input, report.steps == 0);
            report.spawned |= outcome.spawned;
            self.accumulator -= FIXED_STEP_MS;
            report.steps += 1;
        }

        if self.accumulator > ACCUMULATOR_RESET_MS {
            log::debug!("Dropping {:.1}ms of simulation debt", self.accumulator);
            self.accumulator = 0.0;
            report.accumulator_reset = true;
        }

        if let Some(speed) = self.ramp.update(self.state.clock_ms) {
            apply_speed(&mut self.state, speed);
        }

        report.events = self.state.drain_events();
        report
    }

    /// Snapshot for the renderer, read after the frame's steps
    pub fn view(&self, health: u8) -> RenderView<'_> {
        let collision = &self.state.collision;
        RenderView {
            player: &self.state.player,
            obstacles: &self.state.obstacles,
            goal: self.state.goal.as_ref().map(|g| &g.entity),
            flash: collision.flash_steps > 0,
            flash_red: collision.flash_steps % 2 == 0,
            message: collision.message.as_ref(),
            player_opacity: crate::player_opacity(health),
            reduced_effects: self.step_budget() <= MIN_STEPS_PER_FRAME,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn running(mode: ControlMode) -> Governor {
        let mut governor = Governor::new(GameConfig::default(), MapConfig::MAP1, mode, 12345);
        governor.transition(PhaseEvent::Start { awaiting_hand: false });
        governor
    }

    #[test]
    fn test_fps_classes() {
        assert_eq!(FpsClass::classify(20.0), FpsClass::Low);
        assert_eq!(FpsClass::classify(30.0), FpsClass::Normal);
        assert_eq!(FpsClass::classify(55.0), FpsClass::Normal);
        assert_eq!(FpsClass::classify(60.0), FpsClass::High);
        assert_eq!(FpsClass::Low.step_budget(), 1);
        assert_eq!(FpsClass::Normal.step_budget(), 2);
        assert_eq!(FpsClass::High.step_budget(), 4);
    }

    #[test]
    fn test_monitor_windows() {
        let mut monitor = FrameRateMonitor::default();
        assert_eq!(monitor.record(0.0), None);
        let mut class = None;
        let mut t = 0.0;
        for _ in 0..70 {
            t += 16.0;
            class = class.or(monitor.record(t));
        }
        assert_eq!(class, Some(FpsClass::High));

        let mut class = None;
        for _ in 0..20 {
            t += 50.0;
            class = class.or(monitor.record(t));
        }
        assert_eq!(class, Some(FpsClass::Low));
    }

    #[test]
    fn test_stopped_frame_does_nothing() {
        let mut governor = Governor::new(GameConfig::default(), MapConfig::MAP1, ControlMode::Keyboard, 1);
        let report = governor.frame(0.0, &TickInput::default());
        assert!(!report.ran);
        assert_eq!(governor.state().time_steps, 0);
    }

    #[test]
    fn test_long_frame_capped_by_budget() {
        let mut governor = running(ControlMode::Keyboard);
        governor.frame(1000.0, &TickInput::default());
        let report = governor.frame(1500.0, &TickInput::default());
        assert!(report.ran);
        assert_eq!(report.step_budget, 2);
        assert_eq!(report.steps, 2);
        // 50ms accumulated, 32ms drained
        assert!((governor.accumulator() - 18.0).abs() < 1e-3);
        // Only the capped 100ms reaches the run clock
        assert_eq!(governor.state().clock_ms, 100.0);
    }

    #[test]
    fn test_steps_never_exceed_budget() {
        let mut governor = running(ControlMode::Keyboard);
        let mut t = 0.0;
        for i in 0..400 {
            t += if i % 7 == 0 { 480.0 } else { 9.0 };
            let report = governor.frame(t, &TickInput::default());
            assert!(report.steps <= report.step_budget);
            assert!(report.step_budget <= MAX_STEPS_PER_FRAME);
            assert!(governor.accumulator() <= ACCUMULATOR_RESET_MS);
        }
    }

    #[test]
    fn test_sixty_fps_runs_one_step_per_frame() {
        let mut governor = running(ControlMode::Keyboard);
        let mut steps = 0;
        let mut t = 0.0;
        for _ in 0..600 {
            t += 16.0;
            steps += governor.frame(t, &TickInput::default()).steps;
        }
        // First frame has no delta
        assert_eq!(steps, 599);
        assert_eq!(governor.step_budget(), 4);
    }

    #[test]
    fn test_pause_resets_timing() {
        let mut governor = running(ControlMode::Keyboard);
        governor.frame(0.0, &TickInput::default());
        governor.frame(30.0, &TickInput::default());
        governor.transition(PhaseEvent::Pause);
        assert_eq!(governor.accumulator(), 0.0);

        assert!(!governor.frame(5_000.0, &TickInput::default()).ran);
        governor.transition(PhaseEvent::Resume);
        let clock = governor.state().clock_ms;
        let report = governor.frame(10_000.0, &TickInput::default());
        assert_eq!(report.steps, 0);
        // Paused time never reaches the run clock
        assert_eq!(governor.state().clock_ms, clock);
    }

    #[test]
    fn test_ramp_applied_from_run_clock() {
        let mut governor = Governor::new(GameConfig::default(), MapConfig::MAP4, ControlMode::Keyboard, 9);
        governor.transition(PhaseEvent::Start { awaiting_hand: false });
        let mut speeds = Vec::new();
        let mut t = 0.0;
        while governor.state().clock_ms < 25_000.0 {
            t += 16.0;
            for event in governor.frame(t, &TickInput::default()).events {
                if let GameEvent::SpeedChanged { speed } = event {
                    speeds.push(speed);
                }
            }
        }
        assert_eq!(speeds, vec![8.5, 9.0]);
        assert!(governor.state().obstacles.iter().all(|o| o.speed == 9.0));
    }

    #[test]
    fn test_restart_starts_a_fresh_run() {
        let mut governor = running(ControlMode::Keyboard);
        let mut t = 0.0;
        for _ in 0..300 {
            t += 16.0;
            governor.frame(t, &TickInput::default());
        }
        assert!(!governor.state().obstacles.is_empty());
        let first_run = governor.state().obstacles.clone();

        governor.transition(PhaseEvent::Died);
        assert!(governor.transition(PhaseEvent::Restart));
        assert_eq!(governor.phase(), GamePhase::Idle);
        let state = governor.state();
        assert_eq!(state.clock_ms, 0.0);
        assert_eq!(state.time_steps, 0);
        assert!(state.obstacles.is_empty());
        assert!(state.goal.is_none());
        assert_eq!(state.speed, MapConfig::MAP1.obstacle_speed);

        // Same seed replays the same obstacles
        governor.transition(PhaseEvent::Start { awaiting_hand: false });
        let mut t = 0.0;
        for _ in 0..300 {
            t += 16.0;
            governor.frame(t, &TickInput::default());
        }
        assert_eq!(governor.state().obstacles, first_run);
    }

    #[test]
    fn test_view_reflects_state() {
        let mut governor = running(ControlMode::Keyboard);
        governor.state_mut().collision.flash_steps = 4;
        let view = governor.view(2);
        assert!(view.flash);
        assert!(view.flash_red);
        assert_eq!(view.player_opacity, 0.66);
        assert!(!view.reduced_effects);
        assert!(view.goal.is_none());
    }
}
