//! Collision detection and scoring
//!
//! One pass per tick over every live obstacle and collectible. Each entity is
//! resolved at most once: obstacles are `consumed` by a hit (or shield
//! absorb) and flagged `passed` when scored, collectibles are flagged
//! `collected`. Visual consequences are returned as requests; this module
//! never touches the particle pool or the camera directly.

use glam::Vec2;

use super::ability::AbilityKind;
use super::particles::ParticleKind;
use super::state::{CollectibleKind, GameEvent, GamePhase, GameState, ObstacleKind, PowerupEffect};
use crate::tuning::Tuning;

/// Particles per explosion burst
const EXPLOSION_COUNT: u32 = 18;
/// Particles per spark burst
const SPARK_COUNT: u32 = 10;

/// A particle burst the loop should emit
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BurstRequest {
    pub kind: ParticleKind,
    pub origin: Vec2,
    pub count: u32,
}

/// A camera shake the loop should trigger
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShakeRequest {
    pub intensity: f32,
    pub duration: f32,
}

impl From<(f32, f32)> for ShakeRequest {
    fn from((intensity, duration): (f32, f32)) -> Self {
        Self {
            intensity,
            duration,
        }
    }
}

/// Everything a collision pass asks the rest of the loop to do
#[derive(Debug, Clone, Default)]
pub struct CollisionOutcome {
    pub bursts: Vec<BurstRequest>,
    /// Strongest shake requested this pass (shakes don't stack)
    pub shake: Option<ShakeRequest>,
    pub events: Vec<GameEvent>,
    /// Health reached zero during this pass
    pub game_over: bool,
}

impl CollisionOutcome {
    fn request_shake(&mut self, shake: ShakeRequest) {
        let stronger = self
            .shake
            .is_none_or(|current| shake.intensity >= current.intensity);
        if stronger {
            self.shake = Some(shake);
        }
    }
}

struct Hit {
    id: u32,
    kind: ObstacleKind,
    contact: Vec2,
}

struct Pickup {
    id: u32,
    kind: CollectibleKind,
    value: f32,
    effect: Option<PowerupEffect>,
    at: Vec2,
}

/// Run the collision and scoring pass for one tick
pub fn resolve(state: &mut GameState, tuning: &Tuning, dt: f32) -> CollisionOutcome {
    let mut outcome = CollisionOutcome::default();

    state.player.invulnerable = (state.player.invulnerable - dt).max(0.0);
    state.combo_idle += dt;

    let player_box = state.player.bounds;
    let shielded = state.player.abilities.is_active(AbilityKind::Shield);
    let mut invulnerable = state.player.invulnerable;

    let mut hits = Vec::new();
    let mut absorbed = Vec::new();
    let mut passed = Vec::new();

    for obstacle in state.obstacles.iter_mut() {
        if obstacle.consumed {
            continue;
        }

        if let Some(contact) = obstacle.bounds.intersection(&player_box) {
            if shielded {
                obstacle.consumed = true;
                absorbed.push(Hit {
                    id: obstacle.id,
                    kind: obstacle.kind,
                    contact: contact.center(),
                });
            } else if invulnerable <= 0.0 {
                obstacle.consumed = true;
                invulnerable = tuning.vitals.grace_window.max(0.0);
                hits.push(Hit {
                    id: obstacle.id,
                    kind: obstacle.kind,
                    contact: contact.center(),
                });
            }
            // Overlaps inside the grace window do no damage, but a touched
            // obstacle no longer counts as cleared
            obstacle.passed = true;
            continue;
        }

        if !obstacle.passed && obstacle.bounds.right() < player_box.left() {
            obstacle.passed = true;
            passed.push(obstacle.id);
        }
    }

    // Passes first so a hit in the same tick still leaves the combo at zero
    for id in passed {
        let bonus = tuning.scoring.pass_bonus.saturating_mul(state.multiplier as u64);
        state.add_score(bonus);
        state.combo += 1;
        state.multiplier = tuning.scoring.multiplier_for(state.combo);
        state.combo_idle = 0.0;
        outcome.events.push(GameEvent::ObstaclePassed {
            id,
            combo: state.combo,
        });
    }

    for hit in absorbed {
        outcome.bursts.push(BurstRequest {
            kind: ParticleKind::Spark,
            origin: hit.contact,
            count: SPARK_COUNT,
        });
        outcome.request_shake(tuning.shake.absorb.into());
        outcome.events.push(GameEvent::ShieldAbsorbed {
            id: hit.id,
            kind: hit.kind,
        });
    }

    for hit in hits {
        let damage = tuning.vitals.damage(hit.kind).max(0.0);
        state.change_health(-damage);
        state.combo = 0;
        state.multiplier = tuning.scoring.multiplier_for(0);
        outcome.bursts.push(BurstRequest {
            kind: ParticleKind::Explosion,
            origin: hit.contact,
            count: EXPLOSION_COUNT,
        });
        outcome.request_shake(tuning.shake.hit.into());
        outcome.events.push(GameEvent::ObstacleHit {
            id: hit.id,
            kind: hit.kind,
            damage,
        });
    }
    state.player.invulnerable = invulnerable;

    collect(state, tuning, &mut outcome);

    if state.combo > 0 && state.combo_idle >= tuning.scoring.combo_timeout {
        log::debug!("Combo {} expired", state.combo);
        state.combo = 0;
        state.multiplier = tuning.scoring.multiplier_for(0);
    }

    if state.health() <= 0.0 && state.phase == GamePhase::Playing {
        state.phase = GamePhase::GameOver;
        state.high_score = state.high_score.max(state.score);
        outcome.game_over = true;
        outcome.request_shake(tuning.shake.game_over.into());
        outcome.events.push(GameEvent::PhaseChanged {
            from: GamePhase::Playing,
            to: GamePhase::GameOver,
        });
    }

    outcome
}

fn collect(state: &mut GameState, tuning: &Tuning, outcome: &mut CollisionOutcome) {
    let reach = if state.player.abilities.is_active(AbilityKind::Magnet) {
        tuning.abilities.magnet_radius.max(0.0)
    } else {
        0.0
    };
    let reach_box = state.player.bounds.expanded(reach);

    let mut pickups = Vec::new();
    for item in state.collectibles.iter_mut() {
        if item.collected || !item.bounds.intersects(&reach_box) {
            continue;
        }
        item.collected = true;
        pickups.push(Pickup {
            id: item.id,
            kind: item.kind,
            value: item.value,
            effect: item.effect,
            at: item.bounds.center(),
        });
    }

    let multiplier = state.multiplier as f32;
    for pickup in pickups {
        let amount = pickup.value.max(0.0) * multiplier;
        match pickup.kind {
            CollectibleKind::Energy => state.change_energy(amount),
            CollectibleKind::Health => state.change_health(amount),
            CollectibleKind::Score => state.add_score(amount.round() as u64),
            CollectibleKind::Powerup => match pickup.effect {
                Some(PowerupEffect::EnergyRefill) => state.refill_energy(),
                Some(PowerupEffect::ShieldCharge) => {
                    let was_active = state.player.abilities.is_active(AbilityKind::Shield);
                    state
                        .player
                        .abilities
                        .force_activate(AbilityKind::Shield, &tuning.abilities);
                    if !was_active {
                        outcome.events.push(GameEvent::AbilityActivated {
                            kind: AbilityKind::Shield,
                        });
                    }
                }
                Some(PowerupEffect::CooldownReset) => state.player.abilities.reset_cooldowns(),
                None => {}
            },
        }
        outcome.bursts.push(BurstRequest {
            kind: ParticleKind::Spark,
            origin: pickup.at,
            count: SPARK_COUNT,
        });
        outcome.events.push(GameEvent::Collected {
            id: pickup.id,
            kind: pickup.kind,
        });
    }
}
