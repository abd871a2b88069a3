//! Level session: health, progress and hand gating around the governor
//!
//! The host forwards raw input and frame callbacks here. The session turns
//! simulation events into health loss and level completion, and moves the
//! phase machine on hand presence:
//! - camera runs start once a hand has been held steady for `hand_confirm_ms`
//! - a hand missing for `hand_lost_ms` pauses the run

use crate::governor::{FrameReport, Governor, RenderView};
use crate::platform::{HandSample, Key, KeyState};
use crate::settings::{ControlMode, GameConfig, MapConfig};
use crate::sim::{GameEvent, GamePhase, PhaseEvent, TickInput};

/// How a run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Completed,
    Died,
}

#[derive(Debug, Clone)]
pub struct Session {
    governor: Governor,
    config: GameConfig,
    mode: ControlMode,
    health: u8,
    keys: KeyState,
    hand: HandSample,
    /// Wall time the hand (re)appeared
    hand_seen_since: Option<f64>,
    /// Wall time the hand went missing
    hand_lost_since: Option<f64>,
    outcome: Option<Outcome>,
}

impl Session {
    pub fn new(config: GameConfig, map: MapConfig, mode: ControlMode, seed: u64) -> Self {
        Self {
            governor: Governor::new(config.clone(), map, mode, seed),
            health: config.max_health,
            config,
            mode,
            keys: KeyState::default(),
            hand: HandSample::missing(),
            hand_seen_since: None,
            hand_lost_since: None,
            outcome: None,
        }
    }

    pub fn phase(&self) -> GamePhase {
        self.governor.phase()
    }

    pub fn health(&self) -> u8 {
        self.health
    }

    pub fn outcome(&self) -> Option<Outcome> {
        self.outcome
    }

    pub fn mode(&self) -> ControlMode {
        self.mode
    }

    pub fn governor(&self) -> &Governor {
        &self.governor
    }

    pub fn governor_mut(&mut self) -> &mut Governor {
        &mut self.governor
    }

    /// Level progress (0-100) from run time; 100 only once the goal is reached
    pub fn progress(&self) -> f32 {
        if self.outcome == Some(Outcome::Completed) {
            return 100.0;
        }
        let ratio = self.governor.state().clock_ms / self.config.level_duration_ms;
        ((ratio * 100.0).floor() as f32).clamp(0.0, 99.0)
    }

    /// Leave Idle: keyboard runs start now, camera runs wait for a hand
    pub fn start(&mut self) -> bool {
        self.governor.transition(PhaseEvent::Start {
            awaiting_hand: self.mode.awaits_hand(),
        })
    }

    pub fn pause(&mut self) -> bool {
        self.keys.clear();
        self.governor.transition(PhaseEvent::Pause)
    }

    pub fn resume(&mut self) -> bool {
        self.hand_lost_since = None;
        self.governor.transition(PhaseEvent::Resume)
    }

    /// Fresh run with the same map, mode and seed
    pub fn restart(&mut self) {
        log::info!("Restarting {} run", self.mode.as_str());
        self.governor.transition(PhaseEvent::Restart);
        self.health = self.config.max_health;
        self.keys.clear();
        self.hand = HandSample::missing();
        self.hand_seen_since = None;
        self.hand_lost_since = None;
        self.outcome = None;
    }

    pub fn key_down(&mut self, key: Key) {
        if !self.phase().is_running() {
            return;
        }
        match key {
            Key::Pause => {
                self.pause();
            }
            _ if self.mode == ControlMode::Keyboard => self.keys.press(key),
            _ => {}
        }
    }

    /// Releases always apply so keys can't stick across a pause
    pub fn key_up(&mut self, key: Key) {
        self.keys.release(key);
    }

    /// Latest hand tracker reading, at whatever cadence the tracker runs
    pub fn hand_update(&mut self, now_ms: f64, sample: HandSample) {
        if sample.detected {
            self.hand_seen_since.get_or_insert(now_ms);
            self.hand_lost_since = None;
        } else {
            self.hand_seen_since = None;
            self.hand_lost_since.get_or_insert(now_ms);
        }
        self.hand = sample;
    }

    fn update_hand_gating(&mut self, now_ms: f64) {
        if self.mode != ControlMode::Camera {
            return;
        }
        match self.phase() {
            GamePhase::AwaitingInput => {
                if self
                    .hand_seen_since
                    .is_some_and(|since| now_ms - since >= self.config.hand_confirm_ms)
                {
                    self.governor.transition(PhaseEvent::HandConfirmed);
                }
            }
            GamePhase::Running => {
                if self
                    .hand_lost_since
                    .is_some_and(|since| now_ms - since >= self.config.hand_lost_ms)
                {
                    log::info!("Hand not detected, pausing");
                    self.governor.transition(PhaseEvent::HandLost);
                }
            }
            _ => {}
        }
    }

    /// Run one rendered frame and apply its events
    pub fn frame(&mut self, now_ms: f64) -> FrameReport {
        self.update_hand_gating(now_ms);

        let control = match self.mode {
            ControlMode::Keyboard => self.keys.signal(),
            ControlMode::Camera => self.hand.signal(),
        };
        let input = TickInput {
            control,
            progress: self.progress(),
        };
        let report = self.governor.frame(now_ms, &input);

        for event in &report.events {
            if self.outcome.is_some() {
                break;
            }
            match event {
                GameEvent::Collision { .. } => {
                    self.health = self.health.saturating_sub(1);
                    log::info!("Hit! {} health left", self.health);
                    if self.health == 0 {
                        self.finish(Outcome::Died);
                    }
                }
                GameEvent::LevelComplete => self.finish(Outcome::Completed),
                _ => {}
            }
        }
        report
    }

    fn finish(&mut self, outcome: Outcome) {
        let event = match outcome {
            Outcome::Completed => PhaseEvent::Completed,
            Outcome::Died => PhaseEvent::Died,
        };
        if self.governor.transition(event) {
            self.outcome = Some(outcome);
            self.keys.clear();
            log::info!("Run over: {:?} at {:.0}%", outcome, self.progress());
        }
    }

    pub fn view(&self) -> RenderView<'_> {
        self.governor.view(self.health)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::{Entity, EntityKind, Goal};

    /// No random spawns, so tests place every obstacle themselves
    fn quiet_config() -> GameConfig {
        let mut config = GameConfig::default();
        config.keyboard.max_obstacles = 0;
        config.camera.max_obstacles = 0;
        config
    }

    fn keyboard_session() -> Session {
        let mut session = Session::new(quiet_config(), MapConfig::MAP1, ControlMode::Keyboard, 1);
        assert!(session.start());
        session
    }

    /// Run frames every 16ms; returns the time of the last frame
    fn run_for(session: &mut Session, mut t: f64, ms: f64) -> f64 {
        let end = t + ms;
        while t < end {
            t += 16.0;
            session.frame(t);
        }
        t
    }

    fn drop_obstacle_on_player(session: &mut Session) {
        let state = session.governor_mut().state_mut();
        let player = state.player;
        state.obstacles.clear();
        state.obstacles.push(Entity::new(
            EntityKind::Obstacle,
            player.pos.x + 6.0,
            player.pos.y,
            20.0,
            20.0,
            6.0,
        ));
    }

    #[test]
    fn test_keyboard_starts_running() {
        let session = keyboard_session();
        assert_eq!(session.phase(), GamePhase::Running);
        assert_eq!(session.health(), 3);
    }

    #[test]
    fn test_three_hits_end_the_run() {
        let mut session = keyboard_session();
        let mut t = 0.0;
        session.frame(t);
        for expected in [2, 1, 0] {
            drop_obstacle_on_player(&mut session);
            t = run_for(&mut session, t, 16.0);
            assert_eq!(session.health(), expected);
            // Outlast the cooldown
            session.governor_mut().state_mut().obstacles.clear();
            t = run_for(&mut session, t, 1100.0);
        }
        assert_eq!(session.phase(), GamePhase::Over);
        assert_eq!(session.outcome(), Some(Outcome::Died));
        assert!(!session.frame(t + 16.0).ran);
    }

    #[test]
    fn test_goal_completes_level() {
        let mut session = keyboard_session();
        session.frame(0.0);
        {
            let state = session.governor_mut().state_mut();
            let player = state.player;
            state.goal = Some(Goal {
                entity: Entity::new(EntityKind::Goal, player.pos.x + 5.0, 0.0, 30.0, 300.0, 6.0),
                reached: false,
            });
        }
        session.frame(16.0);
        assert_eq!(session.outcome(), Some(Outcome::Completed));
        assert_eq!(session.phase(), GamePhase::Over);
        assert_eq!(session.progress(), 100.0);
    }

    #[test]
    fn test_progress_from_run_clock() {
        let mut session = keyboard_session();
        session.frame(0.0);
        run_for(&mut session, 0.0, 30_000.0);
        assert_eq!(session.governor().state().clock_ms, 30_000.0);
        assert_eq!(session.progress(), 50.0);

        session.governor_mut().state_mut().clock_ms = 90_000.0;
        assert_eq!(session.progress(), 99.0);
    }

    #[test]
    fn test_keys_ignored_unless_running() {
        let mut session = Session::new(quiet_config(), MapConfig::MAP1, ControlMode::Keyboard, 1);
        session.key_down(Key::Up);
        session.start();
        session.frame(0.0);
        let y = session.governor().state().player.pos.y;
        session.frame(16.0);
        assert_eq!(session.governor().state().player.pos.y, y);

        session.key_down(Key::Up);
        session.frame(32.0);
        assert_eq!(session.governor().state().player.pos.y, y - 8.0);
        session.key_up(Key::Up);
        session.frame(48.0);
        assert_eq!(session.governor().state().player.pos.y, y - 8.0);
    }

    #[test]
    fn test_escape_pauses() {
        let mut session = keyboard_session();
        session.key_down(Key::Down);
        session.key_down(Key::Pause);
        assert_eq!(session.phase(), GamePhase::Paused);
        assert!(session.resume());
        assert_eq!(session.phase(), GamePhase::Running);
        // Held keys were dropped on pause
        let y = session.governor().state().player.pos.y;
        session.frame(0.0);
        session.frame(16.0);
        assert_eq!(session.governor().state().player.pos.y, y);
    }

    #[test]
    fn test_camera_waits_for_steady_hand() {
        let mut session = Session::new(quiet_config(), MapConfig::MAP1, ControlMode::Camera, 1);
        session.start();
        assert_eq!(session.phase(), GamePhase::AwaitingInput);

        session.hand_update(0.0, HandSample { detected: true, y: 0.5 });
        session.frame(500.0);
        assert_eq!(session.phase(), GamePhase::AwaitingInput);

        // Flicker resets the timer
        session.hand_update(600.0, HandSample::missing());
        session.hand_update(700.0, HandSample { detected: true, y: 0.5 });
        session.frame(1_200.0);
        assert_eq!(session.phase(), GamePhase::AwaitingInput);

        session.frame(1_700.0);
        assert_eq!(session.phase(), GamePhase::Running);
    }

    #[test]
    fn test_lost_hand_pauses() {
        let mut session = Session::new(quiet_config(), MapConfig::MAP1, ControlMode::Camera, 1);
        session.start();
        session.hand_update(0.0, HandSample { detected: true, y: 0.5 });
        session.frame(1_000.0);
        assert!(session.phase().is_running());

        session.hand_update(1_100.0, HandSample::missing());
        session.frame(1_400.0);
        assert!(session.phase().is_running());
        session.frame(1_600.0);
        assert_eq!(session.phase(), GamePhase::Paused);
    }

    #[test]
    fn test_restart_resets_everything() {
        let mut session = keyboard_session();
        session.frame(0.0);
        drop_obstacle_on_player(&mut session);
        session.frame(16.0);
        assert_eq!(session.health(), 2);

        session.restart();
        assert_eq!(session.phase(), GamePhase::Idle);
        assert_eq!(session.health(), 3);
        assert_eq!(session.progress(), 0.0);
        assert!(session.governor().state().obstacles.is_empty());
        assert_eq!(session.outcome(), None);

        assert!(session.start());
        assert_eq!(session.governor().state().clock_ms, 0.0);
        assert_eq!(session.governor().state().time_steps, 0);
    }
}
