//! Data-driven game balance
//!
//! Every gameplay number that a designer might tweak lives here instead of
//! in `consts`. Missing keys in a tuning file fall back to the defaults, so a
//! file only needs to name what it changes.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from loading a tuning file
#[derive(Debug, Error)]
pub enum TuningError {
    #[error("failed to parse tuning JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid tuning value `{field}`: {reason}")]
    Invalid { field: &'static str, reason: &'static str },
}

/// Player movement and collision
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsTuning {
    /// Downward acceleration per frame
    pub gravity: f32,
    /// Horizontal speed while a direction key is held
    pub player_speed: f32,
    /// Upward velocity applied on jump
    pub jump_strength: f32,
    /// How far below a surface's top the player's feet may be and still land
    pub landing_tolerance: f32,
    /// Base downward margin for the stomp test (grows with fall speed)
    pub stomp_margin: f32,
}

impl Default for PhysicsTuning {
    fn default() -> Self {
        Self {
            gravity: 0.5,
            player_speed: 3.0,
            jump_strength: 10.0,
            landing_tolerance: 10.0,
            stomp_margin: 10.0,
        }
    }
}

/// Point values
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoreTable {
    pub coin: u64,
    pub souvenir: u64,
    pub growth: u64,
    /// Coin dispensed from a question block
    pub block_coin: u64,
    /// Awarded instead of a capsule when the power-up cap is reached
    pub capped_growth: u64,
    pub stomp_ground: u64,
    pub stomp_airborne: u64,
    /// Multiplied by the combo count once the combo exceeds 1
    pub combo_bonus: u64,
}

impl Default for ScoreTable {
    fn default() -> Self {
        Self {
            coin: 10,
            souvenir: 100,
            growth: 50,
            block_coin: 10,
            capped_growth: 10,
            stomp_ground: 50,
            stomp_airborne: 75,
            combo_bonus: 5,
        }
    }
}

/// Complete balance sheet
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub physics: PhysicsTuning,
    pub score: ScoreTable,

    // === Lives & damage ===
    pub max_lives: u8,
    /// Grace period after shrinking from big to small
    pub hit_invulnerability: u32,
    /// Grace period after a respawn
    pub respawn_invulnerability: u32,
    /// Frames the player hangs in the air before the death fall
    pub respawn_pause: u32,
    /// Gravity multiplier during the death fall
    pub respawn_gravity_scale: f32,
    /// Upward velocity applied when a life is lost
    pub knockback: f32,

    // === Stomp combo ===
    pub combo_timeout: u32,
    pub max_combo: u32,
    /// Fraction of jump strength used for the stomp bounce
    pub bounce_ground: f32,
    pub bounce_airborne: f32,
    pub bounce_spikes: f32,

    // === Growth power-ups ===
    /// Uncollected capsules allowed in a level at once
    pub max_growth_power_ups: usize,
    pub growth_activation_distance: f32,
    pub growth_speed: f32,

    /// HUD popup after a souvenir pickup
    pub souvenir_popup_frames: u32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            physics: PhysicsTuning::default(),
            score: ScoreTable::default(),

            max_lives: 3,
            hit_invulnerability: 60,
            respawn_invulnerability: 90,
            respawn_pause: 30,
            respawn_gravity_scale: 1.5,
            knockback: 6.0,

            combo_timeout: 180,
            max_combo: 10,
            bounce_ground: 0.7,
            bounce_airborne: 0.9,
            bounce_spikes: 0.5,

            max_growth_power_ups: 1,
            growth_activation_distance: 150.0,
            growth_speed: 1.5,

            souvenir_popup_frames: 120,
        }
    }
}

impl Tuning {
    /// Parse a tuning file; absent keys keep their defaults
    pub fn from_json(json: &str) -> Result<Self, TuningError> {
        let tuning: Tuning = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Reject values the simulation cannot run with
    pub fn validate(&self) -> Result<(), TuningError> {
        if self.max_lives == 0 {
            return Err(TuningError::Invalid {
                field: "max_lives",
                reason: "must be at least 1",
            });
        }
        if self.physics.gravity <= 0.0 {
            return Err(TuningError::Invalid {
                field: "physics.gravity",
                reason: "must be positive",
            });
        }
        if self.physics.landing_tolerance < 0.0 {
            return Err(TuningError::Invalid {
                field: "physics.landing_tolerance",
                reason: "must not be negative",
            });
        }
        if self.max_combo == 0 {
            return Err(TuningError::Invalid {
                field: "max_combo",
                reason: "must be at least 1",
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_file_keeps_defaults() {
        let tuning = Tuning::from_json(r#"{ "max_lives": 5, "physics": { "gravity": 0.4 } }"#)
            .expect("valid tuning");
        assert_eq!(tuning.max_lives, 5);
        assert!((tuning.physics.gravity - 0.4).abs() < f32::EPSILON);
        assert!((tuning.physics.jump_strength - 10.0).abs() < f32::EPSILON);
        assert_eq!(tuning.combo_timeout, 180);
        assert_eq!(tuning.score.coin, 10);
    }

    #[test]
    fn test_rejects_zero_lives() {
        let err = Tuning::from_json(r#"{ "max_lives": 0 }"#).unwrap_err();
        assert!(matches!(err, TuningError::Invalid { field: "max_lives", .. }));
    }

    #[test]
    fn test_rejects_malformed_json() {
        assert!(matches!(
            Tuning::from_json("{ not json"),
            Err(TuningError::Parse(_))
        ));
    }
}
