//! Property tests for simulation invariants

use glam::Vec2;
use proptest::prelude::*;

use harbor_bros::Tuning;
use harbor_bros::sim::collision::collect_coins;
use harbor_bros::sim::{
    Enemy, EnemyBehavior, EnemyStatus, GamePhase, GameState, LevelCatalog, Player, TickInput,
    tick, update_enemies,
};

fn new_state(seed: u64) -> GameState {
    let catalog = LevelCatalog::builtin().expect("built-in levels parse");
    GameState::new(catalog, Tuning::default(), seed)
}

fn playing(seed: u64, level: usize) -> GameState {
    let mut state = new_state(seed);
    state.start_level(level, true);
    state
}

fn arb_input() -> impl Strategy<Value = TickInput> {
    (any::<bool>(), any::<bool>(), any::<bool>()).prop_map(|(left, right, jump)| TickInput {
        left,
        right,
        jump,
        ..Default::default()
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn test_player_stays_inside_world(
        seed in any::<u64>(),
        level in 0usize..3,
        inputs in prop::collection::vec(arb_input(), 1..400),
    ) {
        let mut state = playing(seed, level);
        for input in &inputs {
            tick(&mut state, input);
            if state.phase != GamePhase::Playing || state.player.is_respawning() {
                continue;
            }
            let max_x = state.world.width - state.player.width();
            prop_assert!(state.player.pos.x >= 0.0);
            prop_assert!(state.player.pos.x <= max_x);
        }
    }

    #[test]
    fn test_score_never_decreases_without_restart(
        seed in any::<u64>(),
        level in 0usize..3,
        inputs in prop::collection::vec(arb_input(), 1..600),
    ) {
        let mut state = playing(seed, level);
        let mut last = state.score;
        for input in &inputs {
            tick(&mut state, input);
            prop_assert!(state.score >= last);
            last = state.score;
        }
    }

    #[test]
    fn test_patrol_stays_within_bounds(
        left in 0.0f32..1000.0,
        range in 60.0f32..600.0,
        width in 10.0f32..50.0,
        speed in 0.5f32..4.0,
        start in 0.0f32..1.0,
        heading_left in any::<bool>(),
        frames in 1u64..800,
    ) {
        let right = left + range;
        let x = left + start * (range - width);
        let mut enemies = vec![Enemy {
            pos: Vec2::new(x, 324.0),
            size: Vec2::new(width, 26.0),
            vel_x: if heading_left { -speed } else { speed },
            speed,
            left_bound: left,
            right_bound: right,
            phase_offset: 0.0,
            behavior: EnemyBehavior::Crab { platform_y: 350.0 },
            status: EnemyStatus::Active,
        }];
        let player = Player::new(playing(0, 0).player.movement);

        for frame in 0..frames {
            update_enemies(&mut enemies, frame, &player);
            let e = &enemies[0];
            prop_assert!(e.pos.x >= left);
            prop_assert!(e.pos.x <= right - width);
        }
    }

    #[test]
    fn test_coin_collection_is_idempotent(seed in any::<u64>(), pick in any::<prop::sample::Index>()) {
        let mut state = playing(seed, 0);
        let coin = pick.get(&state.world.coins).rect;
        state.player.pos = coin.center() - Vec2::splat(state.player.width() / 2.0);

        let mut events = Vec::new();
        collect_coins(&mut state, &mut events);
        prop_assert!(!events.is_empty());
        let score = state.score;

        let mut again = Vec::new();
        collect_coins(&mut state, &mut again);
        prop_assert!(again.is_empty());
        prop_assert_eq!(state.score, score);
    }

    #[test]
    fn test_combo_resets_exactly_at_timeout(combo in 1u32..10, remaining in 1u32..180) {
        let mut state = playing(7, 0);
        state.world.enemies.clear();
        state.world.coins.clear();
        state.world.souvenirs.clear();
        state.world.growth_power_ups.clear();
        state.combo = combo;
        state.combo_timer = remaining;

        for _ in 1..remaining {
            tick(&mut state, &TickInput::default());
            prop_assert_eq!(state.combo, combo);
        }
        tick(&mut state, &TickInput::default());
        prop_assert_eq!(state.combo, 0);
    }
}
