//! Handwave headless runner
//!
//! Plays one level against a simulated 60 Hz display with a simple autopilot
//! and prints a JSON summary. Useful for balance tuning and soak runs.
//!
//! Usage: `handwave [map] [keyboard|camera] [seed] [config.json]`

#[cfg(not(target_arch = "wasm32"))]
mod headless {
    use serde::Serialize;

    use handwave::platform::{HandSample, Key};
    use handwave::session::Outcome;
    use handwave::sim::{Entity, GameEvent, GamePhase};
    use handwave::{ConfigError, ControlMode, GameConfig, MapConfig, Session};

    /// Simulated display refresh
    const FRAME_MS: f64 = 1000.0 / 60.0;
    /// Give up after this much wall time
    const TIME_LIMIT_MS: f64 = 120_000.0;
    /// Dead zone around the autopilot target (px)
    const STEER_SLACK: f32 = 4.0;

    #[derive(Debug, Serialize)]
    struct Summary {
        map: String,
        mode: ControlMode,
        seed: u64,
        outcome: &'static str,
        health: u8,
        progress: f32,
        steps: u64,
        frames: u64,
        clock_ms: f64,
        collisions: u32,
        final_speed: f32,
        fps: Option<f32>,
    }

    struct Args {
        map_id: String,
        map: MapConfig,
        mode: ControlMode,
        seed: u64,
        config: GameConfig,
    }

    fn parse_args() -> Result<Args, ConfigError> {
        let mut args = std::env::args().skip(1);

        let map_id = args.next().unwrap_or_else(|| "map1".to_string());
        let map = MapConfig::preset(&map_id).unwrap_or_else(|| {
            log::warn!("Unknown map '{map_id}', using map1");
            MapConfig::MAP1
        });

        let mode = match args.next() {
            Some(name) => ControlMode::from_str(&name).unwrap_or_else(|| {
                log::warn!("Unknown control mode '{name}', using keyboard");
                ControlMode::Keyboard
            }),
            None => ControlMode::Keyboard,
        };

        let seed = match args.next() {
            Some(raw) => raw.parse().unwrap_or_else(|_| {
                log::warn!("Seed '{raw}' is not a number, using 42");
                42
            }),
            None => 42,
        };

        let config = match args.next() {
            Some(path) => {
                let json = std::fs::read_to_string(&path)
                    .map_err(|e| ConfigError::Invalid(format!("cannot read {path}: {e}")))?;
                GameConfig::from_json(&json)?
            }
            None => GameConfig::default(),
        };

        Ok(Args { map_id, map, mode, seed, config })
    }

    /// Center of the widest free band in the nearest obstacle column ahead
    fn safe_center(player: &Entity, obstacles: &[Entity], height: f32) -> Option<f32> {
        let next_x = obstacles
            .iter()
            .filter(|o| o.right() > player.pos.x)
            .map(|o| o.pos.x)
            .min_by(|a, b| a.total_cmp(b))?;

        let mut pieces: Vec<(f32, f32)> = obstacles
            .iter()
            .filter(|o| (o.pos.x - next_x).abs() < 1.0)
            .map(|o| (o.pos.y, o.bottom()))
            .collect();
        pieces.sort_by(|a, b| a.0.total_cmp(&b.0));

        let mut best: Option<(f32, f32)> = None;
        let mut free_from = 0.0_f32;
        for (top, bottom) in pieces.into_iter().chain(std::iter::once((height, height))) {
            let band = (free_from, top);
            if band.1 - band.0 > best.map_or(0.0, |b| b.1 - b.0) {
                best = Some(band);
            }
            free_from = free_from.max(bottom);
        }
        best.map(|(top, bottom)| (top + bottom) / 2.0)
    }

    fn steer(session: &mut Session, now_ms: f64) {
        let (player, target, config) = {
            let state = session.governor().state();
            let target = safe_center(&state.player, &state.obstacles, state.config.canvas_height)
                .unwrap_or(state.config.canvas_height / 2.0);
            (state.player, target, state.config.clone())
        };

        match session.mode() {
            ControlMode::Keyboard => {
                let center = player.center_y();
                for key in [Key::Up, Key::Down] {
                    session.key_up(key);
                }
                if center > target + STEER_SLACK {
                    session.key_down(Key::Up);
                } else if center < target - STEER_SLACK {
                    session.key_down(Key::Down);
                }
            }
            ControlMode::Camera => {
                let y = target / (config.canvas_height * config.hand_gain);
                session.hand_update(now_ms, HandSample { detected: true, y: y.clamp(0.0, 1.0) });
            }
        }
    }

    pub fn run() -> Result<(), ConfigError> {
        let args = parse_args()?;
        log::info!(
            "Handwave headless run: {} / {} / seed {}",
            args.map_id,
            args.mode.as_str(),
            args.seed
        );

        let mut session = Session::new(args.config, args.map, args.mode, args.seed);
        session.start();

        let mut now = 0.0;
        let mut frames = 0u64;
        let mut collisions = 0u32;
        while session.phase() != GamePhase::Over && now < TIME_LIMIT_MS {
            steer(&mut session, now);
            let report = session.frame(now);
            for event in &report.events {
                match event {
                    GameEvent::Collision { at } => {
                        collisions += 1;
                        log::info!("Collision at ({:.0}, {:.0})", at.x, at.y);
                    }
                    GameEvent::SpeedChanged { speed } => log::info!("Speed now {speed:.1}"),
                    GameEvent::GoalSpawned => log::info!("Goal in sight"),
                    GameEvent::LevelComplete => {}
                }
            }
            frames += 1;
            now += FRAME_MS;
        }

        let state = session.governor().state();
        let summary = Summary {
            map: args.map_id,
            mode: args.mode,
            seed: args.seed,
            outcome: match session.outcome() {
                Some(Outcome::Completed) => "completed",
                Some(Outcome::Died) => "died",
                None => "timeout",
            },
            health: session.health(),
            progress: session.progress(),
            steps: state.time_steps,
            frames,
            clock_ms: state.clock_ms,
            collisions,
            final_speed: state.speed,
            fps: session.governor().fps(),
        };
        match serde_json::to_string_pretty(&summary) {
            Ok(json) => println!("{json}"),
            Err(e) => log::error!("Failed to encode summary: {e}"),
        }
        Ok(())
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    if let Err(e) = headless::run() {
        log::error!("{e}");
        std::process::exit(1);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // The web host drives `Session` directly
}
