//! Harbor Bros headless runner
//!
//! Plays the built-in levels on autopilot and logs how the run went. Pass a
//! tuning JSON file as the first argument to try balance changes without a
//! browser. The playable build is the wasm library (`harbor_bros::web`).

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("Harbor Bros (native) starting...");

    if let Err(e) = native::run() {
        log::error!("{e}");
        std::process::exit(1);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is harbor_bros::web::start, this is just to satisfy the compiler
}

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use std::error::Error;

    use harbor_bros::Tuning;
    use harbor_bros::consts::SIM_HZ;
    use harbor_bros::sim::{GameEvent, GameState, LevelCatalog, TickInput, tick};

    /// Five minutes of play at the simulation rate
    const RUN_FRAMES: u64 = 5 * 60 * 60;
    const SEED: u64 = 0x5eed;

    /// What happened over the run
    #[derive(Debug, Default)]
    struct Tally {
        levels_won: u32,
        game_overs: u32,
        lives_lost: u32,
        stomps: u32,
        best_combo: u32,
        coins: u32,
        souvenirs: u32,
        power_ups: u32,
        bricks: u32,
    }

    impl Tally {
        fn record(&mut self, event: &GameEvent) {
            match event {
                GameEvent::LevelWon { level } => {
                    self.levels_won += 1;
                    log::info!("Cleared level {}", level);
                }
                GameEvent::GameOver => self.game_overs += 1,
                GameEvent::LifeLost { .. } => self.lives_lost += 1,
                GameEvent::EnemyStomped { combo, .. } => {
                    self.stomps += 1;
                    self.best_combo = self.best_combo.max(*combo);
                }
                GameEvent::CoinCollected { .. } | GameEvent::BlockCoin { .. } => self.coins += 1,
                GameEvent::SouvenirCollected { .. } => self.souvenirs += 1,
                GameEvent::PowerUpCollected { .. } => self.power_ups += 1,
                GameEvent::BrickBroken => self.bricks += 1,
                _ => {}
            }
        }
    }

    fn load_tuning() -> Result<Tuning, Box<dyn Error>> {
        let Some(path) = std::env::args().nth(1) else {
            return Ok(Tuning::default());
        };
        let json = std::fs::read_to_string(&path)?;
        let tuning = Tuning::from_json(&json)?;
        log::info!("Loaded tuning from {}", path);
        Ok(tuning)
    }

    pub fn run() -> Result<(), Box<dyn Error>> {
        let tuning = load_tuning()?;
        let catalog = LevelCatalog::builtin()?;
        log::info!("{} levels loaded", catalog.len());

        let mut state = GameState::new(catalog, tuning, SEED);
        let input = TickInput {
            autopilot: true,
            ..Default::default()
        };

        let mut tally = Tally::default();
        for _ in 0..RUN_FRAMES {
            for event in tick(&mut state, &input) {
                tally.record(&event);
            }
        }

        log::info!(
            "Autopilot ran {} frames ({:.0}s): score={}, level={}, lives={}",
            state.frame,
            state.frame as f64 / SIM_HZ,
            state.score,
            state.world.level_index,
            state.lives
        );
        log::info!("{:?}", tally);
        Ok(())
    }
}
