//! Harbor Bros - a side-scrolling platformer
//!
//! Core modules:
//! - `sim`: Deterministic per-frame simulation (player, enemies, interactions, progress)
//! - `tuning`: Data-driven game balance
//! - `audio`: Event-to-sound-cue mapping for the host's synthesizer
//! - `web`: Browser host glue (wasm32 only)
//!
//! Rendering lives outside this crate: the host reads [`sim::GameState`]
//! (or its JSON snapshot) after each tick and draws it.

pub mod audio;
pub mod sim;
pub mod tuning;

#[cfg(target_arch = "wasm32")]
pub mod web;

pub use tuning::{Tuning, TuningError};

/// World and geometry constants
pub mod consts {
    /// Simulation rate the host drives `tick` at (one tick per animation frame)
    pub const SIM_HZ: f64 = 60.0;
    /// Maximum ticks per host frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 4;

    /// Visible canvas size (pixels)
    pub const CANVAS_WIDTH: f32 = 800.0;
    pub const CANVAS_HEIGHT: f32 = 400.0;

    /// Y coordinate of the ground plane's top edge
    pub const GROUND_Y: f32 = 350.0;

    /// Tile grid
    pub const TILE_SIZE: f32 = 40.0;
    pub const LEVEL_ROWS: usize = 10;
    /// Height of the thin collider derived from a run of solid tiles
    pub const PLATFORM_LIP_HEIGHT: f32 = 20.0;

    /// Player body
    pub const PLAYER_WIDTH: f32 = 32.0;
    pub const PLAYER_SMALL_HEIGHT: f32 = 32.0;
    pub const PLAYER_BIG_HEIGHT: f32 = PLAYER_SMALL_HEIGHT * 2.0;
    pub const PLAYER_SPAWN_X: f32 = 50.0;
    pub const PLAYER_SPAWN_Y: f32 = 300.0;

    /// Player falls this far below the canvas before the respawn resolves
    pub const FALL_OUT_MARGIN: f32 = 100.0;

    /// Distance from the world's right edge that triggers the flag sequence
    pub const WIN_OFFSET: f32 = 100.0;
    /// Enemies may not patrol within this distance of the right edge
    pub const FLAG_SAFE_MARGIN: f32 = 160.0;
    /// Flag-safe X never drops below this (very short levels)
    pub const FLAG_SAFE_MIN_X: f32 = 200.0;
    /// Smallest patrol range the loader will leave behind
    pub const MIN_PATROL_RANGE: f32 = 40.0;

    /// Flagpole geometry for the raise animation
    pub const FLAG_POLE_HEIGHT: f32 = 100.0;
    pub const FLAG_HEIGHT: f32 = 40.0;
    /// Frames the flag takes to travel the full pole (0.4 px per frame)
    pub const FLAG_RAISE_FRAMES: u32 = 150;

    /// Growth capsule body
    pub const GROWTH_WIDTH: f32 = 26.0;
    pub const GROWTH_HEIGHT: f32 = 34.0;
}

/// Sign of a horizontal direction (+1 or -1), treating zero as +1
#[inline]
pub fn direction_sign(v: f32) -> f32 {
    if v < 0.0 { -1.0 } else { 1.0 }
}
