//! Collision & interaction resolver
//!
//! Runs once per frame after the player and enemies have moved. Every test
//! is an AABB overlap; the stomp and head-bump checks additionally look at
//! where the player's edges were at the start of the frame so a fast body
//! can't tunnel through an edge between two frames.

use glam::Vec2;

use super::rect::Rect;
use super::state::*;
use crate::consts::*;

/// Player edges captured before any movement this frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameHistory {
    pub prev_top: f32,
    pub prev_bottom: f32,
}

impl FrameHistory {
    pub fn capture(player: &Player) -> Self {
        Self {
            prev_top: player.top(),
            prev_bottom: player.bottom(),
        }
    }
}

/// How an enemy contact was resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContactOutcome {
    Stomp,
    Damage,
    /// Overlap during the post-hit grace period
    Ignored,
}

const COIN_BURST: Burst = Burst {
    count: 8,
    spread: 4.0,
    life: 30,
    color: COLOR_SPARKLE,
    upward: false,
};

const SOUVENIR_BURST: Burst = Burst {
    count: 12,
    spread: 4.0,
    life: 30,
    color: COLOR_SOUVENIR,
    upward: false,
};

const BLOCK_COIN_BURST: Burst = Burst {
    count: 8,
    spread: 3.0,
    life: 25,
    color: COLOR_SPARKLE,
    upward: true,
};

const BRICK_BURST: Burst = Burst {
    count: 12,
    spread: 4.0,
    life: 20,
    color: COLOR_BRICK,
    upward: true,
};

const CAPSULE_BURST: Burst = Burst {
    count: 10,
    spread: 3.0,
    life: 25,
    color: COLOR_CAPSULE,
    upward: false,
};

const CAPPED_BURST: Burst = Burst {
    count: 6,
    spread: 2.5,
    life: 18,
    color: COLOR_CAPPED,
    upward: false,
};

/// Run the full interaction pass in order: collectibles, enemy contact,
/// head bumps, growth capsules
pub fn resolve_interactions(
    state: &mut GameState,
    history: FrameHistory,
    events: &mut Vec<GameEvent>,
) {
    collect_coins(state, events);
    collect_souvenirs(state, events);
    resolve_enemy_contact(state, history, events);
    if state.player.is_respawning() {
        return;
    }
    resolve_head_bumps(state, history, events);
    update_growth_power_ups(state, events);
}

pub fn collect_coins(state: &mut GameState, events: &mut Vec<GameEvent>) {
    let body = state.player.rect();
    let points = state.tuning.score.coin;

    for i in 0..state.world.coins.len() {
        let coin = &mut state.world.coins[i];
        if coin.collected || !coin.rect.overlaps(&body) {
            continue;
        }
        coin.collected = true;
        let center = coin.rect.center();

        state.add_score(points);
        state.spawn_burst(center, COIN_BURST);
        events.push(GameEvent::CoinCollected { points });
    }
}

pub fn collect_souvenirs(state: &mut GameState, events: &mut Vec<GameEvent>) {
    let body = state.player.rect();
    let points = state.tuning.score.souvenir;

    for i in 0..state.world.souvenirs.len() {
        let souvenir = &mut state.world.souvenirs[i];
        if souvenir.collected || !souvenir.rect.overlaps(&body) {
            continue;
        }
        souvenir.collected = true;
        let (center, kind) = (souvenir.rect.center(), souvenir.kind);

        state.add_score(points);
        state.souvenir_popup = state.tuning.souvenir_popup_frames;
        state.spawn_burst(center, SOUVENIR_BURST);
        events.push(GameEvent::SouvenirCollected { kind, points });
    }
}

/// Landing test against an enemy's top edge.
///
/// The player must be falling with its center over the enemy, and its feet
/// must have started the frame within a margin of the enemy top that widens
/// with fall speed.
fn is_stomp(player: &Player, enemy: &Rect, history: FrameHistory, margin: f32) -> bool {
    let vy = player.vel.y;
    let top = enemy.top();
    vy > 0.0
        && enemy.contains_x(player.center_x())
        && history.prev_bottom <= top + margin + vy
        && player.bottom() >= top + 1.0
}

/// Resolve at most one enemy contact this frame (first in list order).
///
/// Contacts while invulnerable are skipped, so a later enemy may still be
/// stomped. Returns `None` when nothing overlapped.
pub fn resolve_enemy_contact(
    state: &mut GameState,
    history: FrameHistory,
    events: &mut Vec<GameEvent>,
) -> Option<ContactOutcome> {
    let body = state.player.rect();
    let margin = state.tuning.physics.stomp_margin;
    let mut ignored = false;

    for i in 0..state.world.enemies.len() {
        let enemy = &state.world.enemies[i];
        let rect = enemy.rect();
        if !enemy.is_active() || !rect.overlaps(&body) {
            continue;
        }

        let from_above = is_stomp(&state.player, &rect, history, margin);
        if from_above && !enemy.behavior.is_stomp_immune() {
            stomp(state, i, events);
            return Some(ContactOutcome::Stomp);
        }

        if state.player.invulnerable_frames > 0 {
            ignored = true;
            continue;
        }

        if from_above {
            // Spikes: bounce off, and still get hurt
            state.player.vel.y = -state.player.movement.jump_strength * state.tuning.bounce_spikes;
            state.player.grounded = false;
            events.push(GameEvent::SpikeBounce);
        }
        damage_player(state, events);
        return Some(ContactOutcome::Damage);
    }

    ignored.then_some(ContactOutcome::Ignored)
}

fn stomp(state: &mut GameState, index: usize, events: &mut Vec<GameEvent>) {
    let enemy = &mut state.world.enemies[index];
    enemy.defeat();
    let (airborne, name, rect) = (enemy.behavior.is_airborne(), enemy.behavior.name(), enemy.rect());

    state.combo = (state.combo + 1).min(state.tuning.max_combo);
    state.combo_timer = state.tuning.combo_timeout;

    let table = &state.tuning.score;
    let base = if airborne {
        table.stomp_airborne
    } else {
        table.stomp_ground
    };
    let bonus = if state.combo > 1 {
        u64::from(state.combo) * table.combo_bonus
    } else {
        0
    };
    let points = base + bonus;
    let bounce = if airborne {
        state.tuning.bounce_airborne
    } else {
        state.tuning.bounce_ground
    };

    state.add_score(points);
    let player = &mut state.player;
    player.vel.y = -player.movement.jump_strength * bounce;
    player.grounded = false;
    player.pos.y = rect.top() - player.height();

    let burst = if airborne {
        Burst {
            count: 12,
            spread: 3.0,
            life: 25,
            color: COLOR_AIR_ENEMY,
            upward: false,
        }
    } else {
        Burst {
            count: 8,
            spread: 3.0,
            life: 25,
            color: COLOR_GROUND_ENEMY,
            upward: false,
        }
    };
    state.spawn_burst(rect.center(), burst);

    log::debug!(
        "Stomped {} at x={:.0}: combo={}, points={}",
        name,
        rect.left(),
        state.combo,
        points
    );
    events.push(GameEvent::EnemyStomped {
        enemy: name,
        combo: state.combo,
        points,
    });
}

/// Big players shrink; small players lose a life and start the death fall
pub fn damage_player(state: &mut GameState, events: &mut Vec<GameEvent>) {
    let grace = state.tuning.hit_invulnerability;

    if state.player.shrink() {
        state.player.invulnerable_frames = grace;
        events.push(GameEvent::PlayerShrunk);
        return;
    }

    state.lives = state.lives.saturating_sub(1);
    let game_over = state.lives == 0;
    state
        .player
        .start_respawn_fall(state.tuning.knockback, state.tuning.respawn_pause, game_over);
    state.player.invulnerable_frames = grace;

    log::debug!("Life lost: lives={}, game_over={}", state.lives, game_over);
    events.push(GameEvent::LifeLost {
        lives_left: state.lives,
        game_over,
    });
}

#[inline]
fn bumped_from_below(body: &Rect, block: &Rect, prev_top: f32) -> bool {
    body.overlaps_x(block) && body.top() <= block.bottom() && prev_top > block.bottom()
}

/// Question blocks and bricks hit from below while rising
pub fn resolve_head_bumps(
    state: &mut GameState,
    history: FrameHistory,
    events: &mut Vec<GameEvent>,
) {
    if state.player.vel.y >= 0.0 {
        return;
    }
    let body = state.player.rect();

    for i in 0..state.world.question_blocks.len() {
        let block = &mut state.world.question_blocks[i];
        if !bumped_from_below(&body, &block.rect, history.prev_top) {
            continue;
        }
        state.player.pos.y = block.rect.bottom();
        state.player.vel.y = 0.0;
        if block.used {
            continue;
        }
        block.used = true;
        let (rect, reward) = (block.rect, block.reward);

        match reward {
            BlockReward::Coin => {
                let points = state.tuning.score.block_coin;
                state.add_score(points);
                state.spawn_burst(Vec2::new(rect.center().x, rect.top()), BLOCK_COIN_BURST);
                events.push(GameEvent::BlockCoin { points });
            }
            BlockReward::Growth => dispense_growth(state, rect, events),
        }
    }

    for i in 0..state.world.bricks.len() {
        let brick = &mut state.world.bricks[i];
        if brick.broken || !bumped_from_below(&body, &brick.rect, history.prev_top) {
            continue;
        }
        state.player.pos.y = brick.rect.bottom();
        state.player.vel.y = 0.0;

        if state.player.size == PlayerSize::Big {
            brick.broken = true;
            let center = brick.rect.center();
            state.spawn_burst(center, BRICK_BURST);
            events.push(GameEvent::BrickBroken);
        } else {
            events.push(GameEvent::BrickBumped);
        }
    }
}

/// Spawn a capsule above `block`, or pay out a consolation coin when the
/// level already has as many uncollected capsules as allowed
fn dispense_growth(state: &mut GameState, block: Rect, events: &mut Vec<GameEvent>) {
    let spawn = Vec2::new(
        block.center().x - GROWTH_WIDTH / 2.0,
        block.top() - GROWTH_HEIGHT,
    );

    if state.world.uncollected_growth_count() >= state.tuning.max_growth_power_ups {
        let points = state.tuning.score.capped_growth;
        state.add_score(points);
        state.spawn_burst(spawn + Vec2::new(GROWTH_WIDTH / 2.0, 0.0), CAPPED_BURST);
        log::debug!("Growth capsule cap reached, awarding {} points", points);
        events.push(GameEvent::PowerUpCapped { points });
        return;
    }

    let direction = state.player.facing;
    state.world.growth_power_ups.push(GrowthPowerUp {
        rect: Rect::new(spawn.x, spawn.y, GROWTH_WIDTH, GROWTH_HEIGHT),
        vel_x: state.tuning.growth_speed * direction.sign(),
        direction,
        active: true,
        collected: false,
    });
    events.push(GameEvent::PowerUpSpawned);
}

/// Wake, move and collect growth capsules
pub fn update_growth_power_ups(state: &mut GameState, events: &mut Vec<GameEvent>) {
    let speed = state.tuning.growth_speed;
    let wake_distance = state.tuning.growth_activation_distance;
    let points = state.tuning.score.growth;
    let world_width = state.world.width;

    for i in 0..state.world.growth_power_ups.len() {
        let body = state.player.rect();
        let capsule = &mut state.world.growth_power_ups[i];
        if capsule.collected {
            continue;
        }

        if !capsule.active && (body.left() - capsule.rect.left()).abs() < wake_distance {
            capsule.active = true;
            capsule.vel_x = speed * capsule.direction.sign();
        }

        if capsule.active {
            let rect = &mut capsule.rect;
            rect.pos.x += capsule.vel_x;
            if rect.left() < 0.0 {
                rect.pos.x = 0.0;
                capsule.vel_x = capsule.vel_x.abs();
            }
            if rect.right() > world_width {
                rect.pos.x = world_width - rect.size.x;
                capsule.vel_x = -capsule.vel_x.abs();
            }
        }
        // Capsules ride along the ground
        capsule.rect.pos.y = GROUND_Y - capsule.rect.size.y;

        if !capsule.rect.overlaps(&body) {
            continue;
        }
        capsule.collected = true;
        capsule.active = false;
        let center = capsule.rect.center();

        state.player.grow();
        state.add_score(points);
        state.spawn_burst(center, CAPSULE_BURST);
        events.push(GameEvent::PowerUpCollected { points });
    }
}
