//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must stay pure and deterministic:
//! - One `tick` per frame, no delta time
//! - Seeded RNG only (particles)
//! - Stable iteration order (level data order)
//! - No rendering or platform dependencies

pub mod autopilot;
pub mod collision;
pub mod enemy;
pub mod level;
pub mod player;
pub mod rect;
pub mod state;
pub mod tick;

pub use collision::{ContactOutcome, FrameHistory, resolve_interactions};
pub use enemy::update_enemies;
pub use level::{LevelCatalog, LevelError, LevelTemplate, load_level};
pub use player::{FallOutcome, resolve_vertical, step_player, step_respawn_fall};
pub use rect::Rect;
pub use state::{
    Character, Enemy, EnemyBehavior, EnemyStatus, Facing, GameEvent, GamePhase, GameState,
    Player, PlayerSize, World,
};
pub use tick::{TickInput, tick};
