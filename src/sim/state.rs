//! Game state and core simulation types
//!
//! Everything the simulation mutates per tick lives here. Visual-only state
//! (particles, camera shake) is owned by the loop instead.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::aabb::Aabb;
use super::ability::{Abilities, AbilityKind};
use crate::consts::*;
use crate::tuning::Tuning;

/// Current phase of the session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Waiting for a start command
    Menu,
    /// Active gameplay
    Playing,
    /// Frozen; the last snapshot stays readable
    Paused,
    /// Run ended; only a reset leaves this phase
    GameOver,
}

impl GamePhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            GamePhase::Menu => "menu",
            GamePhase::Playing => "playing",
            GamePhase::Paused => "paused",
            GamePhase::GameOver => "gameOver",
        }
    }
}

/// Trail point for player rendering
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TrailPoint {
    pub pos: Vec2,
    pub speed: f32,
}

/// Visual effects attached to the player
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlayerEffects {
    /// Trail history (newest first)
    pub trail: Vec<TrailPoint>,
    /// Ids of pool particles emitted by the player that are still alive
    pub particle_ids: Vec<u64>,
}

/// The player avatar
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub bounds: Aabb,
    pub vel: Vec2,
    pub grounded: bool,
    /// Seconds of post-hit invulnerability left
    pub invulnerable: f32,
    pub abilities: Abilities,
    pub effects: PlayerEffects,
}

impl Player {
    pub fn new(tuning: &Tuning) -> Self {
        Self {
            bounds: Aabb::new(PLAYER_SCREEN_X, 0.0, PLAYER_WIDTH, PLAYER_HEIGHT),
            vel: Vec2::ZERO,
            grounded: true,
            invulnerable: 0.0,
            abilities: Abilities::new(&tuning.abilities),
            effects: PlayerEffects::default(),
        }
    }

    #[inline]
    pub fn pos(&self) -> Vec2 {
        self.bounds.min
    }

    #[inline]
    pub fn is_invulnerable(&self) -> bool {
        self.invulnerable > 0.0
    }

    /// Record current position to trail (call each tick while moving)
    pub fn record_trail(&mut self) {
        let speed = self.vel.length();
        self.effects.trail.insert(
            0,
            TrailPoint {
                pos: self.bounds.center(),
                speed,
            },
        );
        if self.effects.trail.len() > TRAIL_LENGTH {
            self.effects.trail.pop();
        }
    }

    pub fn clear_trail(&mut self) {
        self.effects.trail.clear();
    }
}

/// Obstacle types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ObstacleKind {
    /// Static, on the ground
    Spike,
    /// Thin horizontal beam, oscillates
    Laser,
    /// Hovering box, oscillates
    Drone,
}

impl ObstacleKind {
    pub const ALL: [ObstacleKind; 3] = [ObstacleKind::Spike, ObstacleKind::Laser, ObstacleKind::Drone];

    /// Box size (width, height)
    pub fn size(&self) -> Vec2 {
        match self {
            ObstacleKind::Spike => Vec2::new(32.0, 32.0),
            ObstacleKind::Laser => Vec2::new(96.0, 10.0),
            ObstacleKind::Drone => Vec2::new(40.0, 36.0),
        }
    }

    pub fn oscillates(&self) -> bool {
        !matches!(self, ObstacleKind::Spike)
    }
}

/// Vertical sinusoid applied to an obstacle's base height
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Oscillation {
    /// Radians per second
    pub speed: f32,
    /// Pixels
    pub amplitude: f32,
    /// Radians
    pub phase: f32,
}

impl Oscillation {
    /// Offset from base height at time `t`
    #[inline]
    pub fn offset_at(&self, t: f32) -> f32 {
        self.amplitude * (self.phase + self.speed * t).sin()
    }
}

/// An obstacle entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Obstacle {
    pub id: u32,
    pub kind: ObstacleKind,
    pub bounds: Aabb,
    /// Height of the box bottom at zero oscillation
    pub base_y: f32,
    /// Scored once when the player gets past it
    pub passed: bool,
    /// Dealt its damage (or was absorbed); removed after the collision pass
    pub consumed: bool,
    pub oscillation: Option<Oscillation>,
}

impl Obstacle {
    /// Space the obstacle can occupy over its whole oscillation
    pub fn envelope(&self) -> Aabb {
        let base = Aabb {
            min: Vec2::new(self.bounds.min.x, self.base_y),
            size: self.bounds.size,
        };
        match self.oscillation {
            Some(osc) => base.swept_vertically(osc.amplitude),
            None => base,
        }
    }

    /// Move to this tick's oscillation height
    pub fn oscillate(&mut self, t: f32) {
        if let Some(osc) = self.oscillation {
            self.bounds.min.y = self.base_y + osc.offset_at(t);
        }
    }
}

/// Collectible types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CollectibleKind {
    Energy,
    Health,
    Score,
    Powerup,
}

/// Named effects a power-up can carry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PowerupEffect {
    /// Fill energy to max
    EnergyRefill,
    /// Raise the shield for free
    ShieldCharge,
    /// Clear every ability cooldown
    CooldownReset,
}

/// Size of every collectible box
pub const COLLECTIBLE_SIZE: f32 = 24.0;

/// A collectible entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Collectible {
    pub id: u32,
    pub kind: CollectibleKind,
    pub bounds: Aabb,
    /// Amount applied to the matching stat (before multiplier)
    pub value: f32,
    pub collected: bool,
    pub effect: Option<PowerupEffect>,
}

/// Notifications for collaborators outside the core (navigation, ads, audio)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    PhaseChanged { from: GamePhase, to: GamePhase },
    SessionStarted { seed: u64 },
    SessionEnded { score: u64, distance: f32 },
    ObstacleHit { id: u32, kind: ObstacleKind, damage: f32 },
    ShieldAbsorbed { id: u32, kind: ObstacleKind },
    ObstaclePassed { id: u32, combo: u32 },
    Collected { id: u32, kind: CollectibleKind },
    AbilityActivated { kind: AbilityKind },
    AbilityEnded { kind: AbilityKind },
    AbilityReady { kind: AbilityKind },
}

/// Complete simulation state for one session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    /// Run seed for reproducibility
    pub seed: u64,
    pub phase: GamePhase,
    pub score: u64,
    pub high_score: u64,
    /// Consecutive obstacles passed without a hit
    pub combo: u32,
    /// Current multiplier tier (≥ 1)
    pub multiplier: u32,
    /// Seconds since the last obstacle pass
    pub combo_idle: f32,
    /// World distance covered this run
    pub distance: f32,
    /// Seconds of `Playing` simulated this run
    pub elapsed: f32,
    health: f32,
    pub max_health: f32,
    energy: f32,
    pub max_energy: f32,
    pub player: Player,
    /// Active obstacles (sorted by id)
    pub obstacles: Vec<Obstacle>,
    /// Active collectibles (sorted by id)
    pub collectibles: Vec<Collectible>,
    /// Next entity ID
    next_id: u32,
}

impl GameState {
    pub fn new(seed: u64, tuning: &Tuning) -> Self {
        let max_health = tuning.vitals.max_health.max(0.0);
        let max_energy = tuning.vitals.max_energy.max(0.0);
        Self {
            seed,
            phase: GamePhase::Menu,
            score: 0,
            high_score: 0,
            combo: 0,
            multiplier: 1,
            combo_idle: 0.0,
            distance: 0.0,
            elapsed: 0.0,
            health: max_health,
            max_health,
            energy: tuning.vitals.start_energy.clamp(0.0, max_energy),
            max_energy,
            player: Player::new(tuning),
            obstacles: Vec::new(),
            collectibles: Vec::new(),
            next_id: 1,
        }
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    #[inline]
    pub fn health(&self) -> f32 {
        self.health
    }

    #[inline]
    pub fn energy(&self) -> f32 {
        self.energy
    }

    /// Add (or with a negative delta, remove) health, clamped to [0, max]
    pub fn change_health(&mut self, delta: f32) {
        if delta.is_finite() {
            self.health = (self.health + delta).clamp(0.0, self.max_health);
        }
    }

    /// Add or remove energy, clamped to [0, max]
    pub fn change_energy(&mut self, delta: f32) {
        if delta.is_finite() {
            self.energy = (self.energy + delta).clamp(0.0, self.max_energy);
        }
    }

    pub fn refill_energy(&mut self) {
        self.energy = self.max_energy;
    }

    /// Activate an ability using this state's energy pool
    pub fn activate_ability(&mut self, kind: AbilityKind, tuning: &Tuning) -> bool {
        let mut energy = self.energy;
        let activated = self.player.abilities.activate(kind, &mut energy, &tuning.abilities);
        self.energy = energy.clamp(0.0, self.max_energy);
        activated
    }

    pub fn add_score(&mut self, points: u64) {
        self.score = self.score.saturating_add(points);
        self.high_score = self.high_score.max(self.score);
    }

    /// Left edge of the camera in world space
    pub fn camera_left(&self) -> f32 {
        self.player.bounds.left() - PLAYER_SCREEN_X
    }

    /// Wave number (1-based) for the elapsed time
    pub fn wave(&self, tuning: &Tuning) -> u32 {
        1 + (self.elapsed / tuning.wave_duration.max(f32::EPSILON)).floor() as u32
    }

    /// Seconds left in the current wave
    pub fn wave_time_remaining(&self, tuning: &Tuning) -> f32 {
        let duration = tuning.wave_duration.max(f32::EPSILON);
        duration - self.elapsed.rem_euclid(duration)
    }

    /// Drop entities that scrolled fully behind the camera, plus anything
    /// consumed or collected this tick
    pub fn cull(&mut self) {
        let camera_left = self.camera_left();
        self.obstacles
            .retain(|o| !o.consumed && o.bounds.right() >= camera_left);
        self.collectibles
            .retain(|c| !c.collected && c.bounds.right() >= camera_left);
    }

    /// Ensure entities are sorted by ID for deterministic iteration
    pub fn normalize_order(&mut self) {
        self.obstacles.sort_by_key(|o| o.id);
        self.collectibles.sort_by_key(|c| c.id);
    }
}
