//! Data-driven game balance
//!
//! Every gameplay constant that a designer might want to tweak lives here.
//! Sections default individually, so a JSON file only needs the keys it
//! overrides.

use serde::{Deserialize, Serialize};

use crate::sim::{AbilityKind, ObstacleKind};

/// Player movement
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerTuning {
    /// Forward speed at difficulty 0 (px/s)
    pub base_run_speed: f32,
    /// Forward speed at difficulty 1 (px/s)
    pub max_run_speed: f32,
    /// Extra horizontal speed from full left/right input (px/s)
    pub strafe_speed: f32,
    /// Downward acceleration (px/s²)
    pub gravity: f32,
    /// Upward velocity applied on jump (px/s)
    pub jump_speed: f32,
}

impl Default for PlayerTuning {
    fn default() -> Self {
        Self {
            base_run_speed: 260.0,
            max_run_speed: 460.0,
            strafe_speed: 120.0,
            gravity: 1800.0,
            jump_speed: 720.0,
        }
    }
}

/// Health, energy and damage
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VitalsTuning {
    pub max_health: f32,
    pub max_energy: f32,
    /// Energy at session start
    pub start_energy: f32,
    /// Passive energy gain per second while playing
    pub energy_regen: f32,
    /// Post-hit invulnerability (seconds)
    pub grace_window: f32,
    pub spike_damage: f32,
    pub laser_damage: f32,
    pub drone_damage: f32,
}

impl Default for VitalsTuning {
    fn default() -> Self {
        Self {
            max_health: 10.0,
            max_energy: 100.0,
            start_energy: 50.0,
            energy_regen: 2.0,
            grace_window: 1.0,
            spike_damage: 4.0,
            laser_damage: 3.0,
            drone_damage: 5.0,
        }
    }
}

impl VitalsTuning {
    pub fn damage(&self, kind: ObstacleKind) -> f32 {
        match kind {
            ObstacleKind::Spike => self.spike_damage,
            ObstacleKind::Laser => self.laser_damage,
            ObstacleKind::Drone => self.drone_damage,
        }
    }
}

/// Score and combo
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringTuning {
    /// Score for passing an obstacle (before multiplier)
    pub pass_bonus: u64,
    /// Combo steps per multiplier tier
    pub combo_step: u32,
    /// Highest multiplier tier
    pub max_multiplier: u32,
    /// Combo resets if no obstacle is passed within this window (seconds)
    pub combo_timeout: f32,
}

impl Default for ScoringTuning {
    fn default() -> Self {
        Self {
            pass_bonus: 10,
            combo_step: 5,
            max_multiplier: 5,
            combo_timeout: 4.0,
        }
    }
}

impl ScoringTuning {
    /// Multiplier tier for a combo count (non-decreasing, capped)
    pub fn multiplier_for(&self, combo: u32) -> u32 {
        let step = self.combo_step.max(1);
        let max = self.max_multiplier.max(1);
        1 + (combo / step).min(max - 1)
    }
}

/// Relative obstacle weights at one end of the difficulty curve
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ObstacleWeights {
    pub spike: f32,
    pub laser: f32,
    pub drone: f32,
}

impl ObstacleWeights {
    pub fn get(&self, kind: ObstacleKind) -> f32 {
        match kind {
            ObstacleKind::Spike => self.spike,
            ObstacleKind::Laser => self.laser,
            ObstacleKind::Drone => self.drone,
        }
    }
}

/// Procedural spawning
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SpawnerTuning {
    /// Entities appear at least this far ahead of the player
    pub lead_distance: f32,
    /// Random extra distance on top of the lead
    pub lead_jitter: f32,
    /// Gap between spawns at difficulty 0
    pub max_gap: f32,
    /// Gap between spawns at difficulty 1
    pub min_gap: f32,
    /// Placement attempts before the tick's spawn is skipped
    pub retries: u32,
    /// Probability that a spawn is a collectible
    pub collectible_chance: f64,
    /// Score that contributes a full unit of difficulty
    pub difficulty_score_scale: f32,
    /// Difficulty added per wave after the first
    pub difficulty_per_wave: f32,
    pub easy_weights: ObstacleWeights,
    pub hard_weights: ObstacleWeights,
    /// Oscillation speed range (rad/s) for lasers and drones
    pub oscillation_speed: (f32, f32),
    /// Oscillation amplitude range (px)
    pub oscillation_amplitude: (f32, f32),
}

impl Default for SpawnerTuning {
    fn default() -> Self {
        Self {
            lead_distance: 900.0,
            lead_jitter: 120.0,
            max_gap: 420.0,
            min_gap: 200.0,
            retries: 4,
            collectible_chance: 0.3,
            difficulty_score_scale: 2000.0,
            difficulty_per_wave: 0.1,
            easy_weights: ObstacleWeights {
                spike: 6.0,
                laser: 2.0,
                drone: 1.0,
            },
            hard_weights: ObstacleWeights {
                spike: 2.0,
                laser: 4.0,
                drone: 5.0,
            },
            oscillation_speed: (1.5, 3.5),
            oscillation_amplitude: (30.0, 90.0),
        }
    }
}

/// One ability's cost and timings
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct AbilityTuning {
    /// Energy debited on activation
    pub cost: f32,
    /// Seconds the ability stays active
    pub duration: f32,
    /// Seconds before it can be used again after expiring
    pub cooldown: f32,
}

/// All abilities plus ability-specific parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AbilityTunings {
    pub shield: AbilityTuning,
    pub dash: AbilityTuning,
    pub magnet: AbilityTuning,
    /// Forward speed multiplier while dashing
    pub dash_speed_mult: f32,
    /// Extra pickup reach while the magnet is active (px)
    pub magnet_radius: f32,
    /// Seconds between successive shield rings appearing
    pub shield_ring_interval: f32,
    pub shield_max_rings: u32,
    pub shield_base_radius: f32,
    pub shield_ring_spacing: f32,
    /// Angular speed of the innermost ring (rad/s)
    pub shield_spin: f32,
}

impl Default for AbilityTunings {
    fn default() -> Self {
        Self {
            shield: AbilityTuning {
                cost: 40.0,
                duration: 3.0,
                cooldown: 6.0,
            },
            dash: AbilityTuning {
                cost: 25.0,
                duration: 1.0,
                cooldown: 3.0,
            },
            magnet: AbilityTuning {
                cost: 30.0,
                duration: 5.0,
                cooldown: 8.0,
            },
            dash_speed_mult: 1.8,
            magnet_radius: 140.0,
            shield_ring_interval: 0.4,
            shield_max_rings: 3,
            shield_base_radius: 38.0,
            shield_ring_spacing: 10.0,
            shield_spin: 2.5,
        }
    }
}

impl AbilityTunings {
    pub fn get(&self, kind: AbilityKind) -> &AbilityTuning {
        match kind {
            AbilityKind::Shield => &self.shield,
            AbilityKind::Dash => &self.dash,
            AbilityKind::Magnet => &self.magnet,
        }
    }
}

/// Camera shake strengths (intensity px, duration s)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ShakeTuning {
    pub hit: (f32, f32),
    pub absorb: (f32, f32),
    pub game_over: (f32, f32),
}

impl Default for ShakeTuning {
    fn default() -> Self {
        Self {
            hit: (14.0, 0.35),
            absorb: (5.0, 0.15),
            game_over: (24.0, 0.6),
        }
    }
}

/// Complete balance sheet
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub player: PlayerTuning,
    pub vitals: VitalsTuning,
    pub scoring: ScoringTuning,
    pub spawner: SpawnerTuning,
    pub abilities: AbilityTunings,
    pub shake: ShakeTuning,
    /// Seconds each wave lasts
    pub wave_duration: f32,
    /// Largest dt a single tick will integrate
    pub max_step: f32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            player: PlayerTuning::default(),
            vitals: VitalsTuning::default(),
            scoring: ScoringTuning::default(),
            spawner: SpawnerTuning::default(),
            abilities: AbilityTunings::default(),
            shake: ShakeTuning::default(),
            wave_duration: 30.0,
            max_step: 0.1,
        }
    }
}

impl Tuning {
    /// Parse a (possibly partial) tuning document
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let tuning: Tuning = serde_json::from_str(json)?;
        Ok(tuning.sanitized())
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Parse, falling back to defaults on malformed input
    pub fn load_or_default(json: &str) -> Self {
        match Self::from_json(json) {
            Ok(tuning) => {
                log::info!("Loaded tuning overrides");
                tuning
            }
            Err(err) => {
                log::warn!("Ignoring malformed tuning ({}), using defaults", err);
                Self::default()
            }
        }
    }

    /// Replace zero/negative fields that would break the simulation
    pub(crate) fn sanitized(mut self) -> Self {
        let defaults = Self::default();
        if self.wave_duration <= 0.0 {
            self.wave_duration = defaults.wave_duration;
        }
        if self.max_step <= 0.0 {
            self.max_step = defaults.max_step;
        }
        if self.vitals.max_health <= 0.0 {
            self.vitals.max_health = defaults.vitals.max_health;
        }
        self.vitals.max_energy = self.vitals.max_energy.max(0.0);
        self.vitals.start_energy = self.vitals.start_energy.clamp(0.0, self.vitals.max_energy);
        if self.spawner.min_gap > self.spawner.max_gap {
            std::mem::swap(&mut self.spawner.min_gap, &mut self.spawner.max_gap);
        }
        self.spawner.collectible_chance = if self.spawner.collectible_chance.is_nan() {
            defaults.spawner.collectible_chance
        } else {
            self.spawner.collectible_chance.clamp(0.0, 1.0)
        };
        self
    }
}
