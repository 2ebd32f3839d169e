//! Enemy behavior update
//!
//! Runs before the interaction pass so collision sees this frame's
//! positions. All periodic motion is driven by the shared frame counter,
//! never wall time, so a replay of the same inputs is bit-identical.

use super::state::{Enemy, EnemyBehavior, EnemyStatus, Player};
use crate::consts::CANVAS_HEIGHT;

/// Default vertical swing when a level doesn't give one
pub const BAT_DEFAULT_AMPLITUDE: f32 = 20.0;
pub const JELLYFISH_DEFAULT_AMPLITUDE: f32 = 24.0;
pub const UFO_DEFAULT_AMPLITUDE: f32 = 8.0;

/// Phase advance per frame for each sinusoid
const BAT_WAVE_RATE: f64 = 0.15;
const CRAB_BOB_RATE: f64 = 0.12;
const JELLYFISH_BOB_RATE: f64 = 0.05;
const UFO_BOB_RATE: f64 = 0.1;

const CRAB_BOB_AMPLITUDE: f32 = 2.0;

/// Bat dive: triggered when the player passes above within this range
const BAT_DIVE_RANGE: f32 = 120.0;
const BAT_DIVE_FRAMES: u32 = 45;
const BAT_DIVE_DEPTH: f32 = 2.0;
const BAT_DIVE_WOBBLE: f32 = 2.0;

/// Armadillo charge after each bounce
const ROLL_FRAMES: u32 = 90;
const ROLL_SPEED_MULTIPLIER: f32 = 2.0;

/// Defeat animation: squash pause, then fall out of the world
const DEFEAT_DELAY_FRAMES: u32 = 12;
const DEFEAT_GRAVITY: f32 = 0.5;

/// Sinusoid sampled at an integer frame; computed in f64 so long sessions
/// don't lose phase precision
#[inline]
fn wave(frame: u64, rate: f64, phase: f32) -> f32 {
    (frame as f64 * rate + phase as f64).sin() as f32
}

impl Enemy {
    /// Squash this enemy: it stops colliding and starts its fall-out animation
    pub fn defeat(&mut self) {
        if self.is_active() {
            self.vel_x = 0.0;
            self.status = EnemyStatus::Defeated {
                delay: DEFEAT_DELAY_FRAMES,
                fall_speed: 0.0,
            };
        }
    }
}

/// Advance every enemy one frame
pub fn update_enemies(enemies: &mut [Enemy], frame: u64, player: &Player) {
    for enemy in enemies.iter_mut() {
        match enemy.status {
            EnemyStatus::Dead => {}
            EnemyStatus::Defeated { .. } => update_defeated(enemy),
            EnemyStatus::Active => update_active(enemy, frame, player),
        }
    }
}

fn update_defeated(enemy: &mut Enemy) {
    enemy.vel_x = 0.0;
    if let EnemyStatus::Defeated { delay, fall_speed } = &mut enemy.status {
        if *delay > 0 {
            *delay -= 1;
            return;
        }
        *fall_speed += DEFEAT_GRAVITY;
        enemy.pos.y += *fall_speed;
    }
    if enemy.pos.y > CANVAS_HEIGHT {
        enemy.status = EnemyStatus::Dead;
    }
}

fn update_active(enemy: &mut Enemy, frame: u64, player: &Player) {
    let Enemy {
        pos,
        size,
        vel_x,
        speed,
        left_bound,
        right_bound,
        phase_offset,
        behavior,
        ..
    } = enemy;
    let phase = *phase_offset;

    match behavior {
        EnemyBehavior::Crab { platform_y } => {
            *vel_x = *speed * crate::direction_sign(*vel_x);
            patrol(&mut pos.x, vel_x, size.x, *left_bound, *right_bound);
            pos.y = *platform_y - size.y + wave(frame, CRAB_BOB_RATE, phase) * CRAB_BOB_AMPLITUDE;
        }

        EnemyBehavior::Armadillo {
            platform_y,
            roll_timer,
        } => {
            *roll_timer = roll_timer.saturating_sub(1);
            let multiplier = if *roll_timer > 0 {
                ROLL_SPEED_MULTIPLIER
            } else {
                1.0
            };
            *vel_x = *speed * multiplier * crate::direction_sign(*vel_x);
            if patrol(&mut pos.x, vel_x, size.x, *left_bound, *right_bound) {
                *roll_timer = ROLL_FRAMES;
            }
            pos.y = *platform_y - size.y;
            if *roll_timer > 0 {
                // Cosmetic wobble while charging
                pos.y += (*roll_timer as f32 / 10.0 + phase).sin();
            }
        }

        EnemyBehavior::Bat {
            base_y,
            amplitude,
            dive_timer,
        } => {
            *vel_x = *speed * crate::direction_sign(*vel_x);
            patrol(&mut pos.x, vel_x, size.x, *left_bound, *right_bound);

            let mut y = *base_y + wave(frame, BAT_WAVE_RATE, phase) * *amplitude;
            if *dive_timer > 0 {
                *dive_timer -= 1;
                y += BAT_DIVE_DEPTH + (*dive_timer as f32 * 0.3).sin() * BAT_DIVE_WOBBLE;
            } else {
                let bat_center = pos.x + size.x / 2.0;
                if (player.center_x() - bat_center).abs() < BAT_DIVE_RANGE && player.top() < pos.y
                {
                    *dive_timer = BAT_DIVE_FRAMES;
                }
            }
            pos.y = y;
        }

        EnemyBehavior::Jellyfish { base_y, amplitude } => {
            *vel_x = *speed * crate::direction_sign(*vel_x);
            patrol(&mut pos.x, vel_x, size.x, *left_bound, *right_bound);
            pos.y = *base_y + wave(frame, JELLYFISH_BOB_RATE, phase) * *amplitude;
        }

        EnemyBehavior::Ufo { base_y, amplitude } => {
            *vel_x = *speed * crate::direction_sign(*vel_x);
            patrol(&mut pos.x, vel_x, size.x, *left_bound, *right_bound);
            pos.y = *base_y + wave(frame, UFO_BOB_RATE, phase) * *amplitude;
        }

        EnemyBehavior::Inert => {
            *vel_x = 0.0;
        }
    }
}

/// Move along a bounded patrol; on reaching a bound, clamp and reverse.
/// Returns true when a bound was hit this frame.
fn patrol(x: &mut f32, vel_x: &mut f32, width: f32, left: f32, right: f32) -> bool {
    *x += *vel_x;
    if *x <= left {
        *x = left;
        *vel_x = vel_x.abs();
        true
    } else if *x + width >= right {
        *x = right - width;
        *vel_x = -vel_x.abs();
        true
    } else {
        false
    }
}
