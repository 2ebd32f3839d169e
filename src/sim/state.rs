//! Game state and core simulation types
//!
//! Everything the renderer needs to draw a frame lives in [`GameState`].
//! The simulation is the only writer; hosts read it after `tick` returns.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::level::{LevelCatalog, PhysicsOverrides, Theme, load_level};
use super::rect::Rect;
use crate::consts::*;
use crate::tuning::Tuning;

/// Overall game state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum GamePhase {
    /// Title screen, waiting for a start input
    Menu,
    /// Active gameplay (including the flag-raise sequence)
    Playing,
    /// Out of lives
    GameOver,
    /// Flag raised, level complete
    Win,
}

/// Player power state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PlayerSize {
    Small,
    Big,
}

impl PlayerSize {
    pub fn height(self) -> f32 {
        match self {
            PlayerSize::Small => PLAYER_SMALL_HEIGHT,
            PlayerSize::Big => PLAYER_BIG_HEIGHT,
        }
    }
}

/// Horizontal facing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Facing {
    Left,
    Right,
}

impl Facing {
    pub fn sign(self) -> f32 {
        match self {
            Facing::Left => -1.0,
            Facing::Right => 1.0,
        }
    }

    pub fn from_sign(v: f32) -> Self {
        if v < 0.0 { Facing::Left } else { Facing::Right }
    }
}

/// Movement tuning in effect for the current level (defaults plus level overrides)
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Movement {
    pub speed: f32,
    pub jump_strength: f32,
    pub gravity: f32,
}

impl Movement {
    pub fn resolve(tuning: &Tuning, overrides: &PhysicsOverrides) -> Self {
        Self {
            speed: overrides.player_speed.unwrap_or(tuning.physics.player_speed),
            jump_strength: overrides
                .jump_strength
                .unwrap_or(tuning.physics.jump_strength),
            gravity: tuning.physics.gravity * overrides.gravity_scale.unwrap_or(1.0),
        }
    }
}

/// Death-fall animation state, entered when the last hit point is lost
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RespawnFall {
    /// Frames spent hanging before the fall starts
    pub pause_frames: u32,
    /// Captured at the moment of the hit: no lives remained
    pub triggers_game_over: bool,
}

/// The player character
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Player {
    pub pos: Vec2,
    pub vel: Vec2,
    pub size: PlayerSize,
    pub facing: Facing,
    pub grounded: bool,
    /// Post-hit grace period; enemy contact is ignored while non-zero
    pub invulnerable_frames: u32,
    /// Some while the life-lost fall is playing
    pub respawn: Option<RespawnFall>,
    pub movement: Movement,
}

impl Player {
    pub fn new(movement: Movement) -> Self {
        Self {
            pos: Vec2::new(PLAYER_SPAWN_X, PLAYER_SPAWN_Y),
            vel: Vec2::ZERO,
            size: PlayerSize::Small,
            facing: Facing::Right,
            grounded: false,
            invulnerable_frames: 0,
            respawn: None,
            movement,
        }
    }

    #[inline]
    pub fn width(&self) -> f32 {
        PLAYER_WIDTH
    }

    #[inline]
    pub fn height(&self) -> f32 {
        self.size.height()
    }

    #[inline]
    pub fn top(&self) -> f32 {
        self.pos.y
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.pos.y + self.height()
    }

    #[inline]
    pub fn center_x(&self) -> f32 {
        self.pos.x + self.width() / 2.0
    }

    pub fn rect(&self) -> Rect {
        Rect::new(self.pos.x, self.pos.y, self.width(), self.height())
    }

    pub fn is_respawning(&self) -> bool {
        self.respawn.is_some()
    }

    /// Grow to big, keeping the feet in place. Returns false if already big.
    pub fn grow(&mut self) -> bool {
        if self.size == PlayerSize::Big {
            return false;
        }
        self.pos.y -= PLAYER_BIG_HEIGHT - PLAYER_SMALL_HEIGHT;
        self.size = PlayerSize::Big;
        true
    }

    /// Shrink to small, keeping the feet in place. Returns false if already small.
    pub fn shrink(&mut self) -> bool {
        if self.size == PlayerSize::Small {
            return false;
        }
        self.pos.y += PLAYER_BIG_HEIGHT - PLAYER_SMALL_HEIGHT;
        self.size = PlayerSize::Small;
        true
    }

    /// Put the player back at the level start, motionless
    pub fn reset_to_spawn(&mut self) {
        self.pos = Vec2::new(PLAYER_SPAWN_X, PLAYER_SPAWN_Y);
        self.vel = Vec2::ZERO;
        self.grounded = false;
        self.respawn = None;
    }
}

/// Per-type enemy behavior; each variant carries only the state its motion rule needs
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EnemyBehavior {
    /// Ground patroller with a cosmetic bob
    Crab { platform_y: f32 },
    /// Ground patroller that charges at double speed after each bounce; spiked on top
    Armadillo { platform_y: f32, roll_timer: u32 },
    /// Sinusoidal flier that dives when the player passes above it
    Bat {
        base_y: f32,
        amplitude: f32,
        dive_timer: u32,
    },
    /// Slow drifter with a wide vertical bob
    Jellyfish { base_y: f32, amplitude: f32 },
    /// Hovering patroller with a shallow vertical bob
    Ufo { base_y: f32, amplitude: f32 },
    /// Fallback for unknown enemy types: stands still
    Inert,
}

impl EnemyBehavior {
    /// Airborne enemies pay more and bounce the player higher when stomped
    pub fn is_airborne(&self) -> bool {
        matches!(
            self,
            EnemyBehavior::Bat { .. } | EnemyBehavior::Jellyfish { .. } | EnemyBehavior::Ufo { .. }
        )
    }

    /// Spiked enemies cannot be defeated by landing on them
    pub fn is_stomp_immune(&self) -> bool {
        matches!(self, EnemyBehavior::Armadillo { .. })
    }

    /// Enemies that walk patrol bounds along a surface
    pub fn is_ground_patrol(&self) -> bool {
        matches!(
            self,
            EnemyBehavior::Crab { .. } | EnemyBehavior::Armadillo { .. }
        )
    }

    pub fn name(&self) -> &'static str {
        match self {
            EnemyBehavior::Crab { .. } => "crab",
            EnemyBehavior::Armadillo { .. } => "armadillo",
            EnemyBehavior::Bat { .. } => "bat",
            EnemyBehavior::Jellyfish { .. } => "jellyfish",
            EnemyBehavior::Ufo { .. } => "ufo",
            EnemyBehavior::Inert => "inert",
        }
    }
}

/// Enemy lifecycle: Active -> Defeated -> Dead, never backwards
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum EnemyStatus {
    Active,
    /// Squashed: no longer collidable, playing the fall-out animation
    Defeated { delay: u32, fall_speed: f32 },
    /// Terminal; skipped by update, collision and rendering
    Dead,
}

/// An enemy entity
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Enemy {
    pub pos: Vec2,
    pub size: Vec2,
    /// Signed horizontal velocity (sign is the travel direction)
    pub vel_x: f32,
    /// Base patrol speed (unsigned)
    pub speed: f32,
    pub left_bound: f32,
    pub right_bound: f32,
    /// Per-enemy phase for sinusoidal motion
    pub phase_offset: f32,
    pub behavior: EnemyBehavior,
    pub status: EnemyStatus,
}

impl Enemy {
    pub fn rect(&self) -> Rect {
        Rect::from_pos_size(self.pos, self.size)
    }

    pub fn is_active(&self) -> bool {
        self.status == EnemyStatus::Active
    }

    pub fn is_dead(&self) -> bool {
        self.status == EnemyStatus::Dead
    }
}

/// A coin
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Coin {
    pub rect: Rect,
    pub collected: bool,
}

/// Souvenir icon variants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SouvenirKind {
    Helm,
    Anchor,
    Compass,
}

/// A rare collectible worth more than a coin
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Souvenir {
    pub rect: Rect,
    pub kind: SouvenirKind,
    pub collected: bool,
}

/// What a question block dispenses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlockReward {
    Coin,
    Growth,
}

/// A question block; solid from above, dispenses once from below
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuestionBlock {
    pub rect: Rect,
    pub reward: BlockReward,
    pub used: bool,
}

/// A brick; big players break it from below
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Brick {
    pub rect: Rect,
    pub broken: bool,
}

/// A growth capsule
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GrowthPowerUp {
    pub rect: Rect,
    pub vel_x: f32,
    /// Launch direction once activated
    pub direction: Facing,
    /// Dormant capsules wait for the player to come near
    pub active: bool,
    pub collected: bool,
}

/// Per-level mutable world, rebuilt wholesale by the level loader
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct World {
    pub level_index: usize,
    pub name: String,
    /// Pixel width of the level (longest tile row)
    pub width: f32,
    pub tiles: Vec<String>,
    /// Read-only colliders derived from the tile grid
    pub platforms: Vec<Rect>,
    pub coins: Vec<Coin>,
    pub souvenirs: Vec<Souvenir>,
    pub question_blocks: Vec<QuestionBlock>,
    pub bricks: Vec<Brick>,
    pub enemies: Vec<Enemy>,
    pub growth_power_ups: Vec<GrowthPowerUp>,
    pub theme: Theme,
    pub physics: PhysicsOverrides,
}

impl World {
    /// X position at which the flag sequence starts
    pub fn win_x(&self) -> f32 {
        self.width - WIN_OFFSET
    }

    /// Capsules still in play (dormant or moving)
    pub fn uncollected_growth_count(&self) -> usize {
        self.growth_power_ups.iter().filter(|g| !g.collected).count()
    }
}

/// Flag-raise animation at the end of a level
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct FlagState {
    /// Player reached the flag zone this level
    pub reached: bool,
    /// Frames elapsed since the raise started
    pub frames: u32,
}

impl FlagState {
    pub fn is_raising(&self) -> bool {
        self.reached && self.frames < FLAG_RAISE_FRAMES
    }

    /// Flag offset from the top of the pole, linear in frames
    pub fn offset(&self) -> f32 {
        let max_offset = FLAG_POLE_HEIGHT - FLAG_HEIGHT;
        max_offset * (self.frames.min(FLAG_RAISE_FRAMES) as f32 / FLAG_RAISE_FRAMES as f32)
    }
}

/// Playable brothers, rotated per level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Character {
    Mateo,
    Nick,
    Vas,
}

impl Character {
    pub fn for_level(index: usize) -> Self {
        match index % 3 {
            0 => Character::Mateo,
            1 => Character::Nick,
            _ => Character::Vas,
        }
    }
}

/// A particle for visual effects
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Particle {
    pub pos: Vec2,
    pub vel: Vec2,
    /// Frames remaining
    pub life: u32,
    pub max_life: u32,
    /// 0xRRGGBB
    pub color: u32,
}

/// Maximum particles
pub const MAX_PARTICLES: usize = 256;
/// Downward acceleration applied to particles each frame
pub const PARTICLE_GRAVITY: f32 = 0.2;

/// Particle colors
pub const COLOR_SPARKLE: u32 = 0xffe066;
pub const COLOR_SOUVENIR: u32 = 0x66e0ff;
pub const COLOR_GROUND_ENEMY: u32 = 0xffb380;
pub const COLOR_AIR_ENEMY: u32 = 0xf7e46a;
pub const COLOR_BRICK: u32 = 0xc46a2b;
pub const COLOR_CAPSULE: u32 = 0x8bff6b;
pub const COLOR_CAPPED: u32 = 0xffd54f;

/// Shape of a decorative burst
#[derive(Debug, Clone, Copy)]
pub struct Burst {
    pub count: usize,
    /// Velocity range on each axis is `[-spread/2, spread/2]`
    pub spread: f32,
    pub life: u32,
    pub color: u32,
    /// Force the vertical component upward (debris knocked out of a block)
    pub upward: bool,
}

/// Something that happened during a tick; consumed by audio and HUD
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum GameEvent {
    GameStarted { level: usize },
    Jump,
    CoinCollected { points: u64 },
    SouvenirCollected { kind: SouvenirKind, points: u64 },
    EnemyStomped { enemy: &'static str, combo: u32, points: u64 },
    SpikeBounce,
    PlayerShrunk,
    LifeLost { lives_left: u8, game_over: bool },
    Respawned,
    BlockCoin { points: u64 },
    PowerUpSpawned,
    PowerUpCapped { points: u64 },
    PowerUpCollected { points: u64 },
    BrickBroken,
    BrickBumped,
    FlagReached,
    LevelWon { level: usize },
    GameOver,
}

/// Complete game state (deterministic for a given seed and input sequence)
#[derive(Debug, Clone, Serialize)]
pub struct GameState {
    /// Run seed for reproducibility
    pub seed: u64,
    /// Particle RNG
    #[serde(skip)]
    rng: Pcg32,
    #[serde(skip)]
    pub catalog: LevelCatalog,
    #[serde(skip)]
    pub tuning: Tuning,

    pub phase: GamePhase,
    pub paused: bool,
    /// Monotonic animation counter driving all sinusoidal motion
    pub frame: u64,

    pub world: World,
    pub player: Player,
    pub character: Character,

    /// Score (never decreases within a run)
    pub score: u64,
    pub lives: u8,
    /// Horizontal camera offset, clamped to the world
    pub camera_x: f32,
    /// Consecutive stomps inside the combo window
    pub combo: u32,
    /// Frames until the combo resets
    pub combo_timer: u32,
    pub flag: FlagState,
    /// HUD popup countdown after a souvenir pickup
    pub souvenir_popup: u32,

    /// Visual particles (not gameplay-affecting)
    pub particles: Vec<Particle>,
}

impl GameState {
    /// Create a session sitting on the title screen with level 0 loaded
    pub fn new(catalog: LevelCatalog, tuning: Tuning, seed: u64) -> Self {
        let world = load_level(&catalog, 0);
        let player = Player::new(Movement::resolve(&tuning, &world.physics));
        let lives = tuning.max_lives;
        Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            catalog,
            tuning,
            phase: GamePhase::Menu,
            paused: false,
            frame: 0,
            character: Character::for_level(world.level_index),
            world,
            player,
            score: 0,
            lives,
            camera_x: 0.0,
            combo: 0,
            combo_timer: 0,
            flag: FlagState::default(),
            souvenir_popup: 0,
            particles: Vec::new(),
        }
    }

    /// Load a level and enter `Playing`.
    ///
    /// With `reset_progress` the run starts over (score and lives reset);
    /// otherwise score and lives carry into the new level.
    pub fn start_level(&mut self, index: usize, reset_progress: bool) {
        self.world = load_level(&self.catalog, index);
        self.character = Character::for_level(self.world.level_index);

        let movement = Movement::resolve(&self.tuning, &self.world.physics);
        self.player = Player::new(movement);
        self.player.invulnerable_frames = 0;

        if reset_progress {
            self.score = 0;
            self.lives = self.tuning.max_lives;
        }
        self.combo = 0;
        self.combo_timer = 0;
        self.camera_x = 0.0;
        self.flag = FlagState::default();
        self.souvenir_popup = 0;
        self.particles.clear();
        self.paused = false;
        self.phase = GamePhase::Playing;

        log::info!(
            "Started level {} ({}) as {:?}: score={}, lives={}",
            self.world.level_index,
            self.world.name,
            self.character,
            self.score,
            self.lives
        );
    }

    /// Return the player to the level start after a life loss
    pub fn respawn_player(&mut self) {
        self.player.reset_to_spawn();
        self.player.invulnerable_frames = self.tuning.respawn_invulnerability;
        self.combo = 0;
        self.combo_timer = 0;
        self.camera_x = 0.0;
    }

    /// Award points; the score only ever grows
    pub fn add_score(&mut self, points: u64) {
        self.score = self.score.saturating_add(points);
    }

    /// Spawn a burst of decorative particles around `center`
    pub fn spawn_burst(&mut self, center: Vec2, burst: Burst) {
        let half = burst.spread / 2.0;
        for _ in 0..burst.count {
            if self.particles.len() >= MAX_PARTICLES {
                self.particles.remove(0);
            }
            let vx = if half > 0.0 {
                self.rng.random_range(-half..half)
            } else {
                0.0
            };
            let mut vy = if half > 0.0 {
                self.rng.random_range(-half..half)
            } else {
                0.0
            };
            if burst.upward {
                vy = -vy.abs();
            }
            self.particles.push(Particle {
                pos: center,
                vel: Vec2::new(vx, vy),
                life: burst.life,
                max_life: burst.life,
                color: burst.color,
            });
        }
    }

    /// Advance particles one frame and drop expired ones
    pub fn update_particles(&mut self) {
        for particle in &mut self.particles {
            particle.pos += particle.vel;
            particle.vel.y += PARTICLE_GRAVITY;
            particle.life = particle.life.saturating_sub(1);
        }
        self.particles.retain(|p| p.life > 0);
    }

    /// Serialize the readable state for an external renderer
    pub fn snapshot_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::level::LevelCatalog;

    fn state() -> GameState {
        let catalog = LevelCatalog::builtin().expect("built-in levels parse");
        GameState::new(catalog, Tuning::default(), 7)
    }

    #[test]
    fn test_new_state_waits_in_menu() {
        let state = state();
        assert_eq!(state.phase, GamePhase::Menu);
        assert_eq!(state.lives, 3);
        assert_eq!(state.score, 0);
        assert_eq!(state.player.size, PlayerSize::Small);
    }

    #[test]
    fn test_grow_and_shrink_keep_feet_planted() {
        let mut player = Player::new(Movement::resolve(
            &Tuning::default(),
            &PhysicsOverrides::default(),
        ));
        let feet = player.bottom();
        assert!(player.grow());
        assert_eq!(player.bottom(), feet);
        assert_eq!(player.height(), PLAYER_BIG_HEIGHT);
        assert!(!player.grow());
        assert!(player.shrink());
        assert_eq!(player.bottom(), feet);
        assert!(!player.shrink());
    }

    #[test]
    fn test_movement_overrides() {
        let overrides = PhysicsOverrides {
            gravity_scale: Some(0.5),
            player_speed: Some(4.0),
            jump_strength: None,
            helmet: true,
        };
        let movement = Movement::resolve(&Tuning::default(), &overrides);
        assert_eq!(movement.speed, 4.0);
        assert_eq!(movement.jump_strength, 10.0);
        assert!((movement.gravity - 0.25).abs() < f32::EPSILON);
    }

    #[test]
    fn test_add_score_saturates() {
        let mut state = state();
        state.score = u64::MAX - 1;
        state.add_score(10);
        assert_eq!(state.score, u64::MAX);
    }

    #[test]
    fn test_particles_capped_and_expire() {
        let mut state = state();
        let burst = Burst {
            count: MAX_PARTICLES + 20,
            spread: 4.0,
            life: 2,
            color: COLOR_SPARKLE,
            upward: true,
        };
        state.spawn_burst(Vec2::new(100.0, 100.0), burst);
        assert_eq!(state.particles.len(), MAX_PARTICLES);
        assert!(state.particles.iter().all(|p| p.vel.y <= 0.0));

        state.update_particles();
        assert_eq!(state.particles.len(), MAX_PARTICLES);
        state.update_particles();
        assert!(state.particles.is_empty());
    }

    #[test]
    fn test_flag_offset_is_linear() {
        let mut flag = FlagState {
            reached: true,
            frames: 0,
        };
        assert_eq!(flag.offset(), 0.0);
        flag.frames = FLAG_RAISE_FRAMES / 2;
        assert!((flag.offset() - 30.0).abs() < 0.001);
        assert!(flag.is_raising());
        flag.frames = FLAG_RAISE_FRAMES;
        assert!((flag.offset() - 60.0).abs() < 0.001);
        assert!(!flag.is_raising());
    }

    #[test]
    fn test_character_rotates_per_level() {
        assert_eq!(Character::for_level(0), Character::Mateo);
        assert_eq!(Character::for_level(1), Character::Nick);
        assert_eq!(Character::for_level(2), Character::Vas);
        assert_eq!(Character::for_level(3), Character::Mateo);
    }

    #[test]
    fn test_snapshot_serializes() {
        let state = state();
        let json = state.snapshot_json().expect("snapshot");
        assert!(json.contains("\"phase\":\"Menu\""));
        assert!(json.contains("\"platforms\""));
    }
}
