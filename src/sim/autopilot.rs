//! Attract-mode autopilot
//!
//! Runs right, hops over whatever is in the way, and punches question
//! blocks it passes under. Purely a function of the current state, so an
//! autopilot session is as deterministic as a recorded one.

use super::rect::Rect;
use super::state::{GamePhase, GameState};
use super::tick::TickInput;

/// Start jumping when an enemy is this close ahead
const JUMP_LOOKAHEAD: f32 = 70.0;
/// Enemies whose top is this far above the player's head are ignored
const HEAD_CLEARANCE: f32 = 40.0;
/// Question blocks within this height above the player get punched
const BLOCK_REACH: f32 = 100.0;

/// Input the autopilot would press this frame
pub fn drive(state: &GameState) -> TickInput {
    match state.phase {
        GamePhase::Menu | GamePhase::GameOver | GamePhase::Win => TickInput {
            start: true,
            ..Default::default()
        },
        GamePhase::Playing => TickInput {
            right: true,
            jump: state.player.grounded && (enemy_ahead(state) || block_overhead(state)),
            ..Default::default()
        },
    }
}

fn enemy_ahead(state: &GameState) -> bool {
    let player = &state.player;
    state
        .world
        .enemies
        .iter()
        .filter(|e| e.is_active())
        .any(|e| {
            let gap = e.pos.x - (player.pos.x + player.width());
            (0.0..JUMP_LOOKAHEAD).contains(&gap) && e.pos.y > player.top() - HEAD_CLEARANCE
        })
}

fn block_overhead(state: &GameState) -> bool {
    let body = state.player.rect();
    let reach = Rect::new(body.left(), body.top() - BLOCK_REACH, body.size.x, BLOCK_REACH);
    state
        .world
        .question_blocks
        .iter()
        .any(|b| !b.used && b.rect.overlaps(&reach))
}
