//! Level templates and the level loader
//!
//! Level content is authored as JSON (one document per level) and parsed
//! into typed templates once. Loading a level builds a fresh [`World`] from
//! its template, so replays never share mutable state with the template.
//!
//! Tile legend: `X` = solid tile, space = empty. Each horizontal run of
//! solid tiles becomes one thin platform collider.

use glam::Vec2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::enemy::{BAT_DEFAULT_AMPLITUDE, JELLYFISH_DEFAULT_AMPLITUDE, UFO_DEFAULT_AMPLITUDE};
use super::rect::Rect;
use super::state::{
    BlockReward, Brick, Coin, Enemy, EnemyBehavior, EnemyStatus, Facing, GrowthPowerUp,
    QuestionBlock, Souvenir, SouvenirKind, World,
};
use crate::consts::*;
use crate::direction_sign;

/// Errors from parsing or validating level content
#[derive(Debug, Error)]
pub enum LevelError {
    #[error("failed to parse level {index}: {source}")]
    Parse {
        index: usize,
        #[source]
        source: serde_json::Error,
    },
    #[error("level catalog is empty")]
    Empty,
    #[error("level {level} ({name}) has no tiles")]
    EmptyGrid { level: usize, name: String },
    #[error("level {level}: unknown tile {ch:?} at row {row}, column {col}")]
    UnknownTile {
        level: usize,
        row: usize,
        col: usize,
        ch: char,
    },
    #[error("level {level}: {kind} #{index} has a non-positive size")]
    DegenerateSize {
        level: usize,
        kind: &'static str,
        index: usize,
    },
}

/// Colors handed through to the renderer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Theme {
    pub sky_color: String,
    pub ground_color: String,
    pub ground_dark: String,
    pub ground_highlight: String,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            sky_color: "#87ceeb".into(),
            ground_color: "#6b3a1e".into(),
            ground_dark: "#3f2916".into(),
            ground_highlight: "#8b5a2b".into(),
        }
    }
}

/// Optional per-level physics changes
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsOverrides {
    pub gravity_scale: Option<f32>,
    pub player_speed: Option<f32>,
    pub jump_strength: Option<f32>,
    /// Cosmetic: draw the player with a diving helmet
    pub helmet: bool,
}

/// Position and size of a placed object
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct BoxTemplate {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl BoxTemplate {
    fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }

    fn is_degenerate(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SouvenirTemplate {
    #[serde(flatten)]
    pub bounds: BoxTemplate,
    pub kind: SouvenirKind,
}

#[derive(Debug, Clone, Deserialize)]
pub struct QuestionBlockTemplate {
    #[serde(flatten)]
    pub bounds: BoxTemplate,
    pub reward: BlockReward,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GrowthTemplate {
    pub x: f32,
    #[serde(default = "default_growth_y")]
    pub y: f32,
    #[serde(default = "default_growth_direction")]
    pub direction: Facing,
}

fn default_growth_y() -> f32 {
    GROUND_Y - GROWTH_HEIGHT
}

fn default_growth_direction() -> Facing {
    Facing::Right
}

/// Enemy placement. `kind` is matched against the known behaviors at load
/// time; unknown kinds load as inert rectangles.
#[derive(Debug, Clone, Deserialize)]
pub struct EnemyTemplate {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(flatten)]
    pub bounds: BoxTemplate,
    pub speed: f32,
    /// Initial signed velocity; only its sign is used. Defaults to `speed`.
    #[serde(default)]
    pub vx: Option<f32>,
    pub left_bound: f32,
    pub right_bound: f32,
    #[serde(default)]
    pub platform_y: Option<f32>,
    #[serde(default)]
    pub base_y: Option<f32>,
    #[serde(default)]
    pub amplitude: Option<f32>,
    #[serde(default)]
    pub phase_offset: f32,
}

/// One authored level
#[derive(Debug, Clone, Deserialize)]
pub struct LevelTemplate {
    pub name: String,
    #[serde(default)]
    pub theme: Theme,
    #[serde(default)]
    pub physics: PhysicsOverrides,
    pub tiles: Vec<String>,
    #[serde(default)]
    pub coins: Vec<BoxTemplate>,
    #[serde(default)]
    pub souvenirs: Vec<SouvenirTemplate>,
    #[serde(default)]
    pub question_blocks: Vec<QuestionBlockTemplate>,
    #[serde(default)]
    pub bricks: Vec<BoxTemplate>,
    #[serde(default)]
    pub enemies: Vec<EnemyTemplate>,
    #[serde(default)]
    pub growth_power_ups: Vec<GrowthTemplate>,
}

impl LevelTemplate {
    fn validate(&self, level: usize) -> Result<(), LevelError> {
        if self.tiles.iter().all(|row| row.is_empty()) {
            return Err(LevelError::EmptyGrid {
                level,
                name: self.name.clone(),
            });
        }
        for (row, line) in self.tiles.iter().enumerate() {
            for (col, ch) in line.chars().enumerate() {
                if ch != 'X' && ch != ' ' {
                    return Err(LevelError::UnknownTile {
                        level,
                        row,
                        col,
                        ch,
                    });
                }
            }
        }

        let boxes = [
            ("coin", self.coins.iter().collect::<Vec<_>>()),
            ("souvenir", self.souvenirs.iter().map(|s| &s.bounds).collect()),
            (
                "question block",
                self.question_blocks.iter().map(|q| &q.bounds).collect(),
            ),
            ("brick", self.bricks.iter().collect()),
            ("enemy", self.enemies.iter().map(|e| &e.bounds).collect()),
        ];
        for (kind, list) in boxes {
            if let Some(index) = list.iter().position(|b| b.is_degenerate()) {
                return Err(LevelError::DegenerateSize { level, kind, index });
            }
        }
        Ok(())
    }
}

/// Ordered, non-empty list of levels
#[derive(Debug, Clone)]
pub struct LevelCatalog {
    levels: Vec<LevelTemplate>,
}

impl LevelCatalog {
    /// Build a catalog from parsed templates, validating each
    pub fn new(levels: Vec<LevelTemplate>) -> Result<Self, LevelError> {
        if levels.is_empty() {
            return Err(LevelError::Empty);
        }
        for (i, level) in levels.iter().enumerate() {
            level.validate(i)?;
        }
        Ok(Self { levels })
    }

    /// Parse one JSON document per level
    pub fn from_json_documents(documents: &[&str]) -> Result<Self, LevelError> {
        let levels = documents
            .iter()
            .enumerate()
            .map(|(index, doc)| {
                serde_json::from_str::<LevelTemplate>(doc)
                    .map_err(|source| LevelError::Parse { index, source })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(levels)
    }

    /// The levels shipped with the game
    pub fn builtin() -> Result<Self, LevelError> {
        Self::from_json_documents(&[
            include_str!("../../levels/01_harbor.json"),
            include_str!("../../levels/02_sunset_cliffs.json"),
            include_str!("../../levels/03_night_lagoon.json"),
        ])
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    /// Clamp an index into range; out-of-range falls back to the last level
    pub fn clamp_index(&self, index: usize) -> usize {
        index.min(self.levels.len() - 1)
    }

    /// Index after `index`, wrapping to the first level after the last
    pub fn next_index(&self, index: usize) -> usize {
        let index = self.clamp_index(index);
        if index + 1 < self.levels.len() { index + 1 } else { 0 }
    }

    pub fn get(&self, index: usize) -> &LevelTemplate {
        &self.levels[self.clamp_index(index)]
    }
}

/// Build a fresh world for `index` (clamped to the last level)
pub fn load_level(catalog: &LevelCatalog, index: usize) -> World {
    let level_index = catalog.clamp_index(index);
    if level_index != index {
        log::warn!(
            "Level {} out of range, loading level {} instead",
            index,
            level_index
        );
    }
    let template = catalog.get(level_index);

    let width = world_width(&template.tiles);
    let mut enemies: Vec<Enemy> = template.enemies.iter().map(enemy_from_template).collect();
    enforce_flag_safe_zone(&mut enemies, width);

    let world = World {
        level_index,
        name: template.name.clone(),
        width,
        tiles: template.tiles.clone(),
        platforms: build_platforms(&template.tiles),
        coins: template
            .coins
            .iter()
            .map(|c| Coin {
                rect: c.rect(),
                collected: false,
            })
            .collect(),
        souvenirs: template
            .souvenirs
            .iter()
            .map(|s| Souvenir {
                rect: s.bounds.rect(),
                kind: s.kind,
                collected: false,
            })
            .collect(),
        question_blocks: template
            .question_blocks
            .iter()
            .map(|q| QuestionBlock {
                rect: q.bounds.rect(),
                reward: q.reward,
                used: false,
            })
            .collect(),
        bricks: template
            .bricks
            .iter()
            .map(|b| Brick {
                rect: b.rect(),
                broken: false,
            })
            .collect(),
        enemies,
        growth_power_ups: template
            .growth_power_ups
            .iter()
            .map(|g| GrowthPowerUp {
                rect: Rect::new(g.x, g.y, GROWTH_WIDTH, GROWTH_HEIGHT),
                vel_x: 0.0,
                direction: g.direction,
                active: false,
                collected: false,
            })
            .collect(),
        theme: template.theme.clone(),
        physics: template.physics.clone(),
    };

    log::info!(
        "Loaded level {} ({}): width={}, platforms={}, enemies={}, coins={}",
        level_index,
        world.name,
        world.width,
        world.platforms.len(),
        world.enemies.len(),
        world.coins.len()
    );
    world
}

/// Pixel width of the longest tile row
pub fn world_width(tiles: &[String]) -> f32 {
    let longest = tiles.iter().map(|row| row.chars().count()).max().unwrap_or(0);
    longest as f32 * TILE_SIZE
}

/// Turn each horizontal run of solid tiles into a thin platform collider
pub fn build_platforms(tiles: &[String]) -> Vec<Rect> {
    let mut platforms = Vec::new();

    for (row, line) in tiles.iter().enumerate() {
        let y = row as f32 * TILE_SIZE;
        let mut run_start: Option<usize> = None;
        let mut len = 0;

        for (col, ch) in line.chars().enumerate() {
            len = col + 1;
            match (ch == 'X', run_start) {
                (true, None) => run_start = Some(col),
                (false, Some(start)) => {
                    platforms.push(run_rect(start, col, y));
                    run_start = None;
                }
                _ => {}
            }
        }
        if let Some(start) = run_start {
            platforms.push(run_rect(start, len, y));
        }
    }

    platforms
}

fn run_rect(start_col: usize, end_col: usize, y: f32) -> Rect {
    Rect::new(
        start_col as f32 * TILE_SIZE,
        y,
        (end_col - start_col) as f32 * TILE_SIZE,
        PLATFORM_LIP_HEIGHT,
    )
}

fn enemy_from_template(t: &EnemyTemplate) -> Enemy {
    let speed = if t.speed != 0.0 {
        t.speed.abs()
    } else {
        t.vx.map(f32::abs).filter(|v| *v > 0.0).unwrap_or(1.0)
    };
    let direction = direction_sign(t.vx.unwrap_or(t.speed));
    let platform_y = t.platform_y.unwrap_or(GROUND_Y);
    let base_y = t.base_y.unwrap_or(t.bounds.y);

    let behavior = match t.kind.as_str() {
        "crab" => EnemyBehavior::Crab { platform_y },
        "armadillo" => EnemyBehavior::Armadillo {
            platform_y,
            roll_timer: 0,
        },
        "bat" => EnemyBehavior::Bat {
            base_y,
            amplitude: t.amplitude.unwrap_or(BAT_DEFAULT_AMPLITUDE),
            dive_timer: 0,
        },
        "jellyfish" => EnemyBehavior::Jellyfish {
            base_y,
            amplitude: t.amplitude.unwrap_or(JELLYFISH_DEFAULT_AMPLITUDE),
        },
        "ufo" => EnemyBehavior::Ufo {
            base_y,
            amplitude: t.amplitude.unwrap_or(UFO_DEFAULT_AMPLITUDE),
        },
        other => {
            log::warn!("Unknown enemy type {:?}, using an inert placeholder", other);
            EnemyBehavior::Inert
        }
    };

    Enemy {
        pos: Vec2::new(t.bounds.x, t.bounds.y),
        size: Vec2::new(t.bounds.width, t.bounds.height),
        vel_x: if matches!(behavior, EnemyBehavior::Inert) {
            0.0
        } else {
            direction * speed
        },
        speed,
        left_bound: t.left_bound,
        right_bound: t.right_bound,
        phase_offset: t.phase_offset,
        behavior,
        status: EnemyStatus::Active,
    }
}

/// Armadillos keep this much further from the flag than other enemies
const ARMADILLO_FLAG_BUFFER: f32 = 120.0;
/// Armadillos need room to charge
const ARMADILLO_MIN_RANGE: f32 = 160.0;

/// Keep patrol bounds out of the flag zone and wide enough to hold the enemy.
///
/// Hand-authored bounds may run past the world's right edge or collapse to
/// nothing once clamped; afterwards every enemy satisfies
/// `0 <= left_bound <= x <= right_bound - width`.
pub fn enforce_flag_safe_zone(enemies: &mut [Enemy], world_width: f32) {
    let flag_safe_x = FLAG_SAFE_MIN_X.max(world_width - FLAG_SAFE_MARGIN);

    for enemy in enemies.iter_mut() {
        let width = enemy.size.x;
        let before = (enemy.left_bound, enemy.right_bound);

        enemy.right_bound = enemy.right_bound.min(flag_safe_x);
        let target_range = MIN_PATROL_RANGE.max(width);
        if enemy.right_bound - enemy.left_bound < target_range {
            enemy.left_bound = (enemy.right_bound - target_range).max(0.0);
        } else {
            enemy.left_bound = enemy
                .left_bound
                .min(enemy.right_bound - target_range)
                .max(0.0);
        }

        if matches!(enemy.behavior, EnemyBehavior::Armadillo { .. }) {
            let desired_range = ARMADILLO_MIN_RANGE.max(width * 3.0);
            let limit = flag_safe_x - ARMADILLO_FLAG_BUFFER;
            if enemy.right_bound > limit {
                enemy.right_bound = limit.min(enemy.right_bound).max(0.0);
                enemy.left_bound = (enemy.right_bound - desired_range).max(0.0);
            } else if enemy.right_bound - enemy.left_bound < desired_range {
                enemy.left_bound = (enemy.right_bound - desired_range).max(0.0);
            }
        }

        // Degenerate leftovers (bounds near the origin): widen to the right
        if enemy.right_bound - enemy.left_bound < target_range {
            enemy.right_bound = enemy.left_bound + target_range;
        }

        enemy.pos.x = enemy
            .pos
            .x
            .min(enemy.right_bound - width)
            .max(enemy.left_bound);

        if before != (enemy.left_bound, enemy.right_bound) {
            log::debug!(
                "Adjusted {} patrol bounds {:?} -> ({}, {})",
                enemy.behavior.name(),
                before,
                enemy.left_bound,
                enemy.right_bound
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows(lines: &[&str]) -> Vec<String> {
        lines.iter().map(|s| s.to_string()).collect()
    }

    fn enemy(kind: &str, x: f32, width: f32, left: f32, right: f32) -> Enemy {
        enemy_from_template(&EnemyTemplate {
            kind: kind.into(),
            bounds: BoxTemplate {
                x,
                y: GROUND_Y - 26.0,
                width,
                height: 26.0,
            },
            speed: 1.2,
            vx: None,
            left_bound: left,
            right_bound: right,
            platform_y: None,
            base_y: None,
            amplitude: None,
            phase_offset: 0.0,
        })
    }

    #[test]
    fn test_build_platforms_run_length() {
        let tiles = rows(&["  XXX  X", "XX", "        "]);
        let platforms = build_platforms(&tiles);
        assert_eq!(
            platforms,
            vec![
                Rect::new(80.0, 0.0, 120.0, PLATFORM_LIP_HEIGHT),
                Rect::new(280.0, 0.0, 40.0, PLATFORM_LIP_HEIGHT),
                Rect::new(0.0, 40.0, 80.0, PLATFORM_LIP_HEIGHT),
            ]
        );
    }

    #[test]
    fn test_world_width_uses_longest_row() {
        let tiles = rows(&["XX", "XXXXX", "X"]);
        assert_eq!(world_width(&tiles), 200.0);
    }

    #[test]
    fn test_out_of_range_index_loads_last_level() {
        let catalog = LevelCatalog::builtin().expect("built-in levels parse");
        let last = catalog.len() - 1;
        assert_eq!(load_level(&catalog, last + 5), load_level(&catalog, last));
        assert_eq!(load_level(&catalog, usize::MAX).level_index, last);
    }

    #[test]
    fn test_reload_does_not_share_state() {
        let catalog = LevelCatalog::builtin().expect("built-in levels parse");
        let mut first = load_level(&catalog, 0);
        first.coins[0].collected = true;
        first.enemies[0].status = EnemyStatus::Dead;
        let second = load_level(&catalog, 0);
        assert!(!second.coins[0].collected);
        assert!(second.enemies[0].is_active());
    }

    #[test]
    fn test_next_index_wraps() {
        let catalog = LevelCatalog::builtin().expect("built-in levels parse");
        assert_eq!(catalog.next_index(0), 1);
        assert_eq!(catalog.next_index(catalog.len() - 1), 0);
    }

    #[test]
    fn test_flag_zone_clamps_right_bound() {
        let mut enemies = vec![enemy("crab", 1500.0, 34.0, 1300.0, 1600.0)];
        enforce_flag_safe_zone(&mut enemies, 1600.0);
        let e = &enemies[0];
        assert_eq!(e.right_bound, 1440.0);
        assert_eq!(e.left_bound, 1300.0);
        assert_eq!(e.pos.x, 1440.0 - 34.0);
    }

    #[test]
    fn test_degenerate_bounds_keep_min_range() {
        // Entire patrol range sits inside the flag zone
        let mut enemies = vec![enemy("crab", 1550.0, 34.0, 1500.0, 1580.0)];
        enforce_flag_safe_zone(&mut enemies, 1600.0);
        let e = &enemies[0];
        assert!(e.left_bound <= e.right_bound - MIN_PATROL_RANGE);
        assert!(e.left_bound >= 0.0);
        assert!(e.pos.x >= e.left_bound && e.pos.x <= e.right_bound - e.size.x);
    }

    #[test]
    fn test_tiny_bounds_near_origin_widen() {
        let mut enemies = vec![enemy("crab", 0.0, 34.0, 0.0, 10.0)];
        enforce_flag_safe_zone(&mut enemies, 1600.0);
        let e = &enemies[0];
        assert_eq!(e.left_bound, 0.0);
        assert_eq!(e.right_bound, MIN_PATROL_RANGE);
        assert_eq!(e.pos.x, 0.0);
    }

    #[test]
    fn test_armadillo_keeps_extra_buffer() {
        let mut enemies = vec![enemy("armadillo", 1380.0, 26.0, 1300.0, 1440.0)];
        enforce_flag_safe_zone(&mut enemies, 1600.0);
        let e = &enemies[0];
        assert_eq!(e.right_bound, 1440.0 - 120.0);
        assert_eq!(e.left_bound, 1320.0 - 160.0);
        assert!(e.pos.x <= e.right_bound - e.size.x);
    }

    #[test]
    fn test_unknown_enemy_type_is_inert() {
        let e = enemy("kraken", 400.0, 30.0, 300.0, 600.0);
        assert_eq!(e.behavior, EnemyBehavior::Inert);
        assert_eq!(e.vel_x, 0.0);
    }

    #[test]
    fn test_rejects_unknown_tile() {
        let doc = r#"{ "name": "bad", "tiles": ["X?X"] }"#;
        let err = LevelCatalog::from_json_documents(&[doc]).unwrap_err();
        assert!(matches!(
            err,
            LevelError::UnknownTile {
                row: 0,
                col: 1,
                ch: '?',
                ..
            }
        ));
    }

    #[test]
    fn test_rejects_empty_catalog_and_grid() {
        assert!(matches!(LevelCatalog::new(Vec::new()), Err(LevelError::Empty)));
        let doc = r#"{ "name": "void", "tiles": [] }"#;
        assert!(matches!(
            LevelCatalog::from_json_documents(&[doc]),
            Err(LevelError::EmptyGrid { .. })
        ));
    }

    #[test]
    fn test_rejects_degenerate_coin() {
        let doc = r#"{ "name": "bad", "tiles": ["XX"],
            "coins": [{ "x": 0, "y": 0, "width": 0, "height": 20 }] }"#;
        assert!(matches!(
            LevelCatalog::from_json_documents(&[doc]),
            Err(LevelError::DegenerateSize { kind: "coin", index: 0, .. })
        ));
    }

    #[test]
    fn test_parse_error_reports_index() {
        let good = r#"{ "name": "ok", "tiles": ["XX"] }"#;
        let err = LevelCatalog::from_json_documents(&[good, "{"]).unwrap_err();
        assert!(matches!(err, LevelError::Parse { index: 1, .. }));
    }
}
