//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Variable dt in, clamped to a maximum step
//! - Seeded RNG only, one stream per concern
//! - Stable iteration order (by entity ID)
//! - No rendering or platform dependencies

pub mod aabb;
pub mod ability;
pub mod collision;
pub mod particles;
pub mod shake;
pub mod snapshot;
pub mod spawner;
pub mod state;
pub mod tick;

pub use aabb::Aabb;
pub use ability::{Abilities, AbilityKind, AbilityPhase, ShieldRing};
pub use collision::{CollisionOutcome, resolve};
pub use particles::{Particle, ParticleKind, ParticlePool, ParticleSpec};
pub use shake::ScreenShake;
pub use snapshot::{AbilityStats, FrameTimer, GameStats, ShieldStats};
pub use spawner::{Spawned, Spawner};
pub use state::{
    Collectible, CollectibleKind, GameEvent, GamePhase, GameState, Obstacle, ObstacleKind,
    Player, PowerupEffect,
};
pub use tick::{Command, InputState, Simulation};
