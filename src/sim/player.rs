//! Player controller
//!
//! Instant horizontal velocity, single jump, constant gravity and a
//! from-above-only landing model: surfaces only catch a falling player whose
//! feet are within a small band below the surface top. There is no side
//! collision against platforms, so the player can jump up through floors.

use super::rect::Rect;
use super::state::{Facing, Player, RespawnFall, World};
use super::tick::TickInput;
use crate::consts::*;

/// Below this horizontal speed the facing direction is left alone
const FACING_DEADZONE: f32 = 0.05;

/// Outcome of a respawn-fall step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FallOutcome {
    /// Still pausing or falling
    Falling,
    /// Fell past the canvas with lives remaining
    Respawn,
    /// Fell past the canvas on the last life
    GameOver,
}

impl Player {
    /// Enter the life-lost fall: a short hang, then a knockback hop and a
    /// fall through the floor
    pub fn start_respawn_fall(&mut self, knockback: f32, pause_frames: u32, game_over: bool) {
        self.vel.x = 0.0;
        self.vel.y = -knockback;
        self.grounded = false;
        self.respawn = Some(RespawnFall {
            pause_frames,
            triggers_game_over: game_over,
        });
    }
}

/// One normal movement step. Returns true if the player jumped.
///
/// With `accept_input` false (flag sequence) the player keeps falling and
/// landing but ignores the controls.
pub fn step_player(
    player: &mut Player,
    world: &World,
    input: &TickInput,
    accept_input: bool,
    landing_tolerance: f32,
) -> bool {
    let movement = player.movement;

    player.vel.x = 0.0;
    let mut jumped = false;
    if accept_input {
        if input.left {
            player.vel.x = -movement.speed;
        }
        if input.right {
            player.vel.x = movement.speed;
        }
        if input.jump && player.grounded {
            player.vel.y = -movement.jump_strength;
            player.grounded = false;
            jumped = true;
        }
    }

    player.vel.y += movement.gravity;
    player.pos += player.vel;

    if player.vel.x.abs() > FACING_DEADZONE {
        player.facing = Facing::from_sign(player.vel.x);
    }

    clamp_to_world(player, world.width);
    resolve_vertical(player, world, landing_tolerance);
    jumped
}

/// Keep the player inside `[0, world_width - width]`
pub fn clamp_to_world(player: &mut Player, world_width: f32) {
    let max_x = (world_width - player.width()).max(0.0);
    player.pos.x = player.pos.x.clamp(0.0, max_x);
}

/// Land on the first surface that catches the player, in priority order:
/// ground plane, platforms, question blocks, unbroken bricks.
pub fn resolve_vertical(player: &mut Player, world: &World, landing_tolerance: f32) {
    if player.bottom() >= GROUND_Y {
        land_on(player, GROUND_Y);
        return;
    }

    let body = player.rect();
    let falling = player.vel.y >= 0.0;
    let surfaces = world
        .platforms
        .iter()
        .chain(world.question_blocks.iter().map(|q| &q.rect))
        .chain(world.bricks.iter().filter(|b| !b.broken).map(|b| &b.rect));

    let landing = surfaces
        .filter(|_| falling)
        .find(|surface| catches(&body, surface, landing_tolerance))
        .map(Rect::top);

    match landing {
        Some(top) => land_on(player, top),
        None => player.grounded = false,
    }
}

#[inline]
fn catches(body: &Rect, surface: &Rect, tolerance: f32) -> bool {
    body.overlaps_x(surface)
        && body.bottom() >= surface.top()
        && body.bottom() <= surface.top() + tolerance
}

#[inline]
fn land_on(player: &mut Player, surface_top: f32) {
    player.pos.y = surface_top - player.height();
    player.vel.y = 0.0;
    player.grounded = true;
}

/// Advance the life-lost fall one frame
pub fn step_respawn_fall(player: &mut Player, gravity_scale: f32) -> FallOutcome {
    let Some(fall) = player.respawn.as_mut() else {
        return FallOutcome::Falling;
    };
    if fall.pause_frames > 0 {
        fall.pause_frames -= 1;
        return FallOutcome::Falling;
    }
    let game_over = fall.triggers_game_over;

    player.vel.y += player.movement.gravity * gravity_scale;
    player.pos.y += player.vel.y;

    if player.pos.y > CANVAS_HEIGHT + FALL_OUT_MARGIN {
        if game_over {
            FallOutcome::GameOver
        } else {
            FallOutcome::Respawn
        }
    } else {
        FallOutcome::Falling
    }
}
