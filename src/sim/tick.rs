//! Per-frame simulation tick
//!
//! One call advances the game exactly one frame. There is no delta time:
//! every timer is a frame countdown, so the same seed and input sequence
//! always produce the same state.

use super::autopilot;
use super::collision::{FrameHistory, resolve_interactions};
use super::enemy::update_enemies;
use super::player::{FallOutcome, step_player, step_respawn_fall};
use super::state::{GameEvent, GamePhase, GameState};
use crate::consts::*;

/// Input for a single frame (key state, not edges, except `start`/`pause`)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickInput {
    pub left: bool,
    pub right: bool,
    pub jump: bool,
    /// Start / restart / next level from the menu, game-over or win screens
    pub start: bool,
    /// Pause toggle
    pub pause: bool,
    /// Attract mode: the autopilot supplies movement and start presses
    pub autopilot: bool,
}

/// Advance the game by one frame and return what happened
pub fn tick(state: &mut GameState, input: &TickInput) -> Vec<GameEvent> {
    let mut events = Vec::new();

    let mut input = *input;
    if input.autopilot {
        let pause = input.pause;
        input = autopilot::drive(state);
        input.pause = pause;
    }

    if input.start && state.phase != GamePhase::Playing {
        handle_start(state, &mut events);
        return events;
    }

    if input.pause && state.phase == GamePhase::Playing {
        state.paused = !state.paused;
        log::info!("{}", if state.paused { "Paused" } else { "Resumed" });
    }

    if state.phase != GamePhase::Playing || state.paused {
        return events;
    }

    tick_timers(state);

    // Edges before any movement, for the swept stomp and head-bump tests
    let history = FrameHistory::capture(&state.player);

    if state.player.is_respawning() {
        step_respawn(state, &mut events);
        finish_frame(state);
        return events;
    }

    let accept_input = !state.flag.reached;
    let tolerance = state.tuning.physics.landing_tolerance;
    if step_player(&mut state.player, &state.world, &input, accept_input, tolerance) {
        events.push(GameEvent::Jump);
    }

    update_enemies(&mut state.world.enemies, state.frame, &state.player);
    resolve_interactions(state, history, &mut events);

    check_flag(state, &mut events);
    update_camera(state);
    finish_frame(state);
    events
}

/// Menu starts level 0, game over retries the same level, win advances
fn handle_start(state: &mut GameState, events: &mut Vec<GameEvent>) {
    let (index, reset_progress) = match state.phase {
        GamePhase::Menu => (0, true),
        GamePhase::GameOver => (state.world.level_index, true),
        GamePhase::Win => (state.catalog.next_index(state.world.level_index), false),
        GamePhase::Playing => return,
    };
    state.start_level(index, reset_progress);
    events.push(GameEvent::GameStarted {
        level: state.world.level_index,
    });
}

fn tick_timers(state: &mut GameState) {
    let player = &mut state.player;
    player.invulnerable_frames = player.invulnerable_frames.saturating_sub(1);

    if state.combo_timer > 0 {
        state.combo_timer -= 1;
        if state.combo_timer == 0 {
            state.combo = 0;
        }
    }
    state.souvenir_popup = state.souvenir_popup.saturating_sub(1);
}

fn step_respawn(state: &mut GameState, events: &mut Vec<GameEvent>) {
    match step_respawn_fall(&mut state.player, state.tuning.respawn_gravity_scale) {
        FallOutcome::Falling => {}
        FallOutcome::Respawn => {
            state.respawn_player();
            events.push(GameEvent::Respawned);
        }
        FallOutcome::GameOver => {
            state.player.respawn = None;
            state.phase = GamePhase::GameOver;
            log::info!(
                "Game over on level {}: score={}",
                state.world.level_index,
                state.score
            );
            events.push(GameEvent::GameOver);
        }
    }
}

/// Start the flag sequence at the win line, then finish the level once the
/// flag is fully raised
fn check_flag(state: &mut GameState, events: &mut Vec<GameEvent>) {
    if !state.flag.reached
        && !state.player.is_respawning()
        && state.player.pos.x >= state.world.win_x()
    {
        state.flag.reached = true;
        log::info!("Flag reached on level {}", state.world.level_index);
        events.push(GameEvent::FlagReached);
    }

    if !state.flag.reached {
        return;
    }
    if state.flag.frames < FLAG_RAISE_FRAMES {
        state.flag.frames += 1;
    } else {
        state.phase = GamePhase::Win;
        log::info!(
            "Level {} complete: score={}, lives={}",
            state.world.level_index,
            state.score,
            state.lives
        );
        events.push(GameEvent::LevelWon {
            level: state.world.level_index,
        });
    }
}

/// Follow the player, never showing past either end of the world
pub fn update_camera(state: &mut GameState) {
    let max_x = (state.world.width - CANVAS_WIDTH).max(0.0);
    state.camera_x = (state.player.pos.x - CANVAS_WIDTH / 2.0).clamp(0.0, max_x);
}

fn finish_frame(state: &mut GameState) {
    state.update_particles();
    state.frame += 1;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::level::LevelCatalog;
    use crate::sim::state::PlayerSize;
    use crate::tuning::Tuning;

    fn new_state(seed: u64) -> GameState {
        let catalog = LevelCatalog::builtin().expect("built-in levels parse");
        GameState::new(catalog, Tuning::default(), seed)
    }

    fn press_start() -> TickInput {
        TickInput {
            start: true,
            ..Default::default()
        }
    }

    /// Playing on level 0 with every hazard and pickup removed
    fn quiet_state() -> GameState {
        let mut state = new_state(3);
        tick(&mut state, &press_start());
        let world = &mut state.world;
        world.enemies.clear();
        world.coins.clear();
        world.souvenirs.clear();
        world.growth_power_ups.clear();
        state
    }

    fn settle(state: &mut GameState) {
        for _ in 0..20 {
            tick(state, &TickInput::default());
        }
    }

    #[test]
    fn test_start_from_menu() {
        let mut state = new_state(1);
        let idle = tick(&mut state, &TickInput::default());
        assert!(idle.is_empty());
        assert_eq!(state.phase, GamePhase::Menu);
        assert_eq!(state.frame, 0);

        let events = tick(&mut state, &press_start());
        assert_eq!(state.phase, GamePhase::Playing);
        assert_eq!(events, vec![GameEvent::GameStarted { level: 0 }]);
    }

    #[test]
    fn test_pause_freezes_simulation() {
        let mut state = quiet_state();
        let pause = TickInput {
            pause: true,
            ..Default::default()
        };
        tick(&mut state, &pause);
        assert!(state.paused);
        let frame = state.frame;
        let pos = state.player.pos;

        let run = TickInput {
            right: true,
            ..Default::default()
        };
        tick(&mut state, &run);
        assert_eq!(state.frame, frame);
        assert_eq!(state.player.pos, pos);

        tick(&mut state, &pause);
        assert!(!state.paused);
        tick(&mut state, &run);
        assert!(state.player.pos.x > pos.x);
    }

    #[test]
    fn test_jump_from_ground() {
        let mut state = quiet_state();
        settle(&mut state);
        assert!(state.player.grounded);
        assert_eq!(state.player.bottom(), GROUND_Y);

        let jump = TickInput {
            jump: true,
            ..Default::default()
        };
        let events = tick(&mut state, &jump);
        assert!(events.contains(&GameEvent::Jump));
        assert!(!state.player.grounded);
        assert!(state.player.vel.y < 0.0);
    }

    #[test]
    fn test_combo_decays_after_timeout() {
        let mut state = quiet_state();
        settle(&mut state);
        state.combo = 3;
        state.combo_timer = state.tuning.combo_timeout;

        for _ in 0..state.tuning.combo_timeout - 1 {
            tick(&mut state, &TickInput::default());
            assert_eq!(state.combo, 3);
        }
        tick(&mut state, &TickInput::default());
        assert_eq!(state.combo, 0);
        assert_eq!(state.combo_timer, 0);
    }

    #[test]
    fn test_life_loss_respawns_at_start() {
        let mut state = quiet_state();
        state.player.pos.x = 400.0;
        settle(&mut state);
        state.lives = 2;
        state.player.start_respawn_fall(6.0, 30, false);

        let mut respawned = false;
        for _ in 0..300 {
            let events = tick(&mut state, &TickInput::default());
            if events.contains(&GameEvent::Respawned) {
                respawned = true;
                break;
            }
        }
        assert!(respawned);
        assert_eq!(state.phase, GamePhase::Playing);
        assert!(!state.player.is_respawning());
        assert_eq!(state.player.pos.x, PLAYER_SPAWN_X);
        assert_eq!(state.player.invulnerable_frames, 90);
        assert_eq!(state.lives, 2);
    }

    #[test]
    fn test_final_fall_ends_game_and_start_retries() {
        let mut state = quiet_state();
        settle(&mut state);
        state.score = 120;
        state.lives = 0;
        state.player.start_respawn_fall(6.0, 30, true);

        for _ in 0..300 {
            tick(&mut state, &TickInput::default());
            if state.phase == GamePhase::GameOver {
                break;
            }
        }
        assert_eq!(state.phase, GamePhase::GameOver);

        tick(&mut state, &press_start());
        assert_eq!(state.phase, GamePhase::Playing);
        assert_eq!(state.world.level_index, 0);
        assert_eq!(state.lives, 3);
        assert_eq!(state.score, 0);
        assert_eq!(state.player.size, PlayerSize::Small);
    }

    #[test]
    fn test_flag_raise_then_win_then_next_level() {
        let mut state = quiet_state();
        state.player.pos.x = state.world.win_x() + 1.0;
        state.score = 500;

        let events = tick(&mut state, &TickInput::default());
        assert!(events.contains(&GameEvent::FlagReached));
        assert!(state.flag.is_raising());

        // Controls are locked during the raise
        let x = state.player.pos.x;
        let run = TickInput {
            left: true,
            ..Default::default()
        };
        for _ in 1..FLAG_RAISE_FRAMES {
            tick(&mut state, &run);
        }
        assert_eq!(state.player.pos.x, x);
        assert_eq!(state.phase, GamePhase::Playing);
        assert!((state.flag.offset() - (FLAG_POLE_HEIGHT - FLAG_HEIGHT)).abs() < 0.001);

        let events = tick(&mut state, &TickInput::default());
        assert_eq!(state.phase, GamePhase::Win);
        assert_eq!(events, vec![GameEvent::LevelWon { level: 0 }]);

        tick(&mut state, &press_start());
        assert_eq!(state.world.level_index, 1);
        assert_eq!(state.score, 500);
        assert_eq!(state.lives, 3);
        assert!(!state.flag.reached);
    }

    #[test]
    fn test_win_on_last_level_wraps() {
        let mut state = quiet_state();
        let last = state.catalog.len() - 1;
        state.start_level(last, false);
        state.phase = GamePhase::Win;
        tick(&mut state, &press_start());
        assert_eq!(state.world.level_index, 0);
    }

    #[test]
    fn test_camera_clamped_to_world() {
        let mut state = quiet_state();
        state.player.pos.x = 10.0;
        update_camera(&mut state);
        assert_eq!(state.camera_x, 0.0);

        state.player.pos.x = 700.0;
        update_camera(&mut state);
        assert_eq!(state.camera_x, 300.0);

        state.player.pos.x = state.world.width - PLAYER_WIDTH;
        update_camera(&mut state);
        assert_eq!(state.camera_x, state.world.width - CANVAS_WIDTH);
    }

    #[test]
    fn test_determinism() {
        let mut a = new_state(99);
        let mut b = new_state(99);
        let input = TickInput {
            autopilot: true,
            ..Default::default()
        };

        for _ in 0..900 {
            let ea = tick(&mut a, &input);
            let eb = tick(&mut b, &input);
            assert_eq!(ea, eb);
        }
        assert_eq!(
            a.snapshot_json().expect("snapshot"),
            b.snapshot_json().expect("snapshot")
        );
        assert!(a.frame > 0);
    }
}
