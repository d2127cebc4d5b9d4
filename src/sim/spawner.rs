//! Procedural obstacle and collectible placement
//!
//! Entities are placed a lead distance ahead of the player so they never pop
//! into view. Obstacle mix shifts toward lasers and drones as difficulty
//! rises; the gap between spawns shrinks.

use glam::Vec2;
use rand::distr::Distribution;
use rand::distr::weighted::WeightedIndex;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::aabb::Aabb;
use super::state::{
    COLLECTIBLE_SIZE, Collectible, CollectibleKind, GameState, Obstacle, ObstacleKind,
    Oscillation, PowerupEffect,
};
use crate::consts::WORLD_HEIGHT;
use crate::lerp;
use crate::tuning::{SpawnerTuning, Tuning};

/// Stream offset so spawns don't share a sequence with other seeded RNGs
const SPAWN_STREAM: u64 = 0x5EED_0B57_AC1E;

/// Highest point (box top) that airborne entities are placed at
const AIR_CEILING: f32 = WORLD_HEIGHT * 0.6;

/// What a spawn attempt produced
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Spawned {
    Obstacle { id: u32, kind: ObstacleKind },
    Collectible { id: u32, kind: CollectibleKind },
}

/// Difficulty in [0, 1]; non-decreasing in both score and wave
pub fn difficulty(score: u64, wave: u32, tuning: &SpawnerTuning) -> f32 {
    let from_score = score as f32 / tuning.difficulty_score_scale.max(1.0);
    let from_wave = wave.saturating_sub(1) as f32 * tuning.difficulty_per_wave.max(0.0);
    (from_score + from_wave).clamp(0.0, 1.0)
}

/// Weighted obstacle choice; weights slide from easy to hard with difficulty
pub fn pick_obstacle_kind<R: Rng>(difficulty: f32, rng: &mut R, tuning: &SpawnerTuning) -> ObstacleKind {
    let t = difficulty.clamp(0.0, 1.0);
    let weights = ObstacleKind::ALL.map(|kind| {
        lerp(tuning.easy_weights.get(kind), tuning.hard_weights.get(kind), t).max(0.0)
    });
    match WeightedIndex::new(weights) {
        Ok(dist) => ObstacleKind::ALL[dist.sample(rng)],
        Err(_) => ObstacleKind::Spike,
    }
}

/// Places new entities ahead of the player
#[derive(Debug, Clone)]
pub struct Spawner {
    rng: Pcg32,
    /// Player x at which the next spawn is due
    next_spawn_x: f32,
}

impl Spawner {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Pcg32::seed_from_u64(seed ^ SPAWN_STREAM),
            next_spawn_x: f32::NEG_INFINITY,
        }
    }

    /// Player x at which the next spawn is due
    pub fn next_spawn_x(&self) -> f32 {
        self.next_spawn_x
    }

    /// Maybe spawn one entity this tick
    pub fn update(&mut self, state: &mut GameState, tuning: &Tuning) -> Option<Spawned> {
        let player_x = state.player.bounds.left();
        if player_x < self.next_spawn_x {
            return None;
        }

        let cfg = &tuning.spawner;
        let difficulty = difficulty(state.score, state.wave(tuning), cfg);
        let spawned = if self.rng.random_bool(cfg.collectible_chance) {
            self.place_collectible(state, cfg)
        } else {
            self.place_obstacle(state, difficulty, cfg)
        };

        match spawned {
            Some(_) => {
                let gap = lerp(cfg.max_gap, cfg.min_gap, difficulty) * self.rng.random_range(0.8..=1.2);
                self.next_spawn_x = player_x + gap.max(1.0);
            }
            None => {
                log::debug!(
                    "Spawn skipped at x={:.0}: no free slot after {} tries",
                    player_x,
                    cfg.retries
                );
            }
        }
        spawned
    }

    fn spawn_x(&mut self, player_x: f32, cfg: &SpawnerTuning) -> f32 {
        let jitter = if cfg.lead_jitter > 0.0 {
            self.rng.random_range(0.0..=cfg.lead_jitter)
        } else {
            0.0
        };
        player_x + cfg.lead_distance + jitter
    }

    fn place_obstacle(&mut self, state: &mut GameState, difficulty: f32, cfg: &SpawnerTuning) -> Option<Spawned> {
        let kind = pick_obstacle_kind(difficulty, &mut self.rng, cfg);
        let size = kind.size();
        let player_x = state.player.bounds.left();

        for _ in 0..cfg.retries.max(1) {
            let x = self.spawn_x(player_x, cfg);
            let (base_y, oscillation) = if kind.oscillates() {
                let amplitude = self.range(cfg.oscillation_amplitude);
                let lo = amplitude;
                let hi = (AIR_CEILING - size.y - amplitude).max(lo);
                let osc = Oscillation {
                    speed: self.range(cfg.oscillation_speed),
                    amplitude,
                    phase: self.rng.random_range(0.0..std::f32::consts::TAU),
                };
                (self.rng.random_range(lo..=hi), Some(osc))
            } else {
                (0.0, None)
            };

            let mut obstacle = Obstacle {
                id: 0,
                kind,
                bounds: Aabb {
                    min: Vec2::new(x, base_y),
                    size,
                },
                base_y,
                passed: false,
                consumed: false,
                oscillation,
            };
            obstacle.oscillate(state.elapsed);

            if is_free(state, &obstacle.envelope()) {
                obstacle.id = state.next_entity_id();
                let id = obstacle.id;
                state.obstacles.push(obstacle);
                return Some(Spawned::Obstacle { id, kind });
            }
        }
        None
    }

    fn place_collectible(&mut self, state: &mut GameState, cfg: &SpawnerTuning) -> Option<Spawned> {
        let (kind, value, effect) = self.roll_collectible();
        let player_x = state.player.bounds.left();

        for _ in 0..cfg.retries.max(1) {
            let x = self.spawn_x(player_x, cfg);
            let y = self.rng.random_range(8.0..=AIR_CEILING - COLLECTIBLE_SIZE);
            let bounds = Aabb::new(x, y, COLLECTIBLE_SIZE, COLLECTIBLE_SIZE);
            if is_free(state, &bounds) {
                let id = state.next_entity_id();
                state.collectibles.push(Collectible {
                    id,
                    kind,
                    bounds,
                    value,
                    collected: false,
                    effect,
                });
                return Some(Spawned::Collectible { id, kind });
            }
        }
        None
    }

    fn roll_collectible(&mut self) -> (CollectibleKind, f32, Option<PowerupEffect>) {
        let roll = self.rng.random_range(0..100u32);
        match roll {
            0..35 => (CollectibleKind::Energy, 15.0, None),
            35..70 => (CollectibleKind::Score, 50.0, None),
            70..85 => (CollectibleKind::Health, 2.0, None),
            _ => {
                let effect = match self.rng.random_range(0..3u32) {
                    0 => PowerupEffect::EnergyRefill,
                    1 => PowerupEffect::ShieldCharge,
                    _ => PowerupEffect::CooldownReset,
                };
                (CollectibleKind::Powerup, 0.0, Some(effect))
            }
        }
    }

    fn range(&mut self, (lo, hi): (f32, f32)) -> f32 {
        if hi > lo {
            self.rng.random_range(lo..=hi)
        } else {
            lo
        }
    }
}

/// True if `area` overlaps no live entity (obstacles by their full
/// oscillation envelope)
fn is_free(state: &GameState, area: &Aabb) -> bool {
    state.obstacles.iter().all(|o| !o.envelope().intersects(area))
        && state.collectibles.iter().all(|c| !c.bounds.intersects(area))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn boxes(state: &GameState) -> Vec<Aabb> {
        state
            .obstacles
            .iter()
            .map(|o| o.bounds)
            .chain(state.collectibles.iter().map(|c| c.bounds))
            .collect()
    }

    #[test]
    fn test_difficulty_is_monotonic_and_clamped() {
        let cfg = SpawnerTuning::default();
        assert_eq!(difficulty(0, 1, &cfg), 0.0);
        let mut last = 0.0;
        for score in (0..5000).step_by(100) {
            let d = difficulty(score, 1, &cfg);
            assert!(d >= last);
            last = d;
        }
        assert!(difficulty(0, 3, &cfg) > difficulty(0, 2, &cfg));
        assert_eq!(difficulty(u64::MAX, 1000, &cfg), 1.0);
    }

    #[test]
    fn test_harder_mix_has_more_drones() {
        let cfg = SpawnerTuning::default();
        let mut rng = Pcg32::seed_from_u64(11);
        let count = |d: f32, rng: &mut Pcg32| {
            (0..2000)
                .filter(|_| pick_obstacle_kind(d, rng, &cfg) == ObstacleKind::Drone)
                .count()
        };
        let easy = count(0.0, &mut rng);
        let hard = count(1.0, &mut rng);
        assert!(hard > easy * 2, "easy={} hard={}", easy, hard);
    }

    #[test]
    fn test_zero_weights_fall_back_to_spike() {
        let mut cfg = SpawnerTuning::default();
        cfg.easy_weights = crate::tuning::ObstacleWeights {
            spike: 0.0,
            laser: 0.0,
            drone: 0.0,
        };
        let mut rng = Pcg32::seed_from_u64(1);
        assert_eq!(pick_obstacle_kind(0.0, &mut rng, &cfg), ObstacleKind::Spike);
    }

    #[test]
    fn test_spawns_ahead_of_player() {
        let tuning = Tuning::default();
        let mut state = GameState::new(9, &tuning);
        let mut spawner = Spawner::new(9);
        let player_x = state.player.bounds.left();

        let spawned = spawner.update(&mut state, &tuning);
        assert!(spawned.is_some());
        for b in boxes(&state) {
            assert!(b.left() >= player_x + tuning.spawner.lead_distance);
        }
        // Not due again until the player covers the gap
        assert!(spawner.update(&mut state, &tuning).is_none());
        assert!(spawner.next_spawn_x() > player_x);
    }

    #[test]
    fn test_oscillating_obstacles_get_patterns() {
        let mut tuning = Tuning::default();
        tuning.spawner.collectible_chance = 0.0;
        let mut state = GameState::new(4, &tuning);
        let mut spawner = Spawner::new(4);
        for step in 0..400 {
            state.player.bounds.min.x = step as f32 * 500.0;
            spawner.update(&mut state, &tuning);
            state.cull();
        }
        assert!(!state.obstacles.is_empty());
        for o in &state.obstacles {
            assert_eq!(o.oscillation.is_some(), o.kind.oscillates());
            assert!(o.envelope().bottom() >= -1e-3);
        }
    }

    #[test]
    fn test_skips_when_no_room() {
        let mut tuning = Tuning::default();
        tuning.spawner.lead_jitter = 0.0;
        tuning.spawner.collectible_chance = 1.0;
        let mut state = GameState::new(2, &tuning);
        let id = state.next_entity_id();
        // A wall covering the whole spawn column
        state.obstacles.push(Obstacle {
            id,
            kind: ObstacleKind::Drone,
            bounds: Aabb::new(state.player.bounds.left() + 800.0, -100.0, 400.0, 1000.0),
            base_y: -100.0,
            passed: false,
            consumed: false,
            oscillation: None,
        });
        let mut spawner = Spawner::new(2);
        assert!(spawner.update(&mut state, &tuning).is_none());
        assert_eq!(state.obstacles.len(), 1);
        assert!(state.collectibles.is_empty());
    }

    proptest! {
        #[test]
        fn prop_spawns_never_overlap(seed in any::<u64>(), speed in 50.0f32..2000.0) {
            let mut tuning = Tuning::default();
            tuning.spawner.min_gap = 10.0;
            tuning.spawner.max_gap = 40.0;
            let mut state = GameState::new(seed, &tuning);
            let mut spawner = Spawner::new(seed);
            for _ in 0..200 {
                state.player.bounds.min.x += speed * 0.05;
                state.elapsed += 0.05;
                for o in state.obstacles.iter_mut() {
                    o.oscillate(state.elapsed);
                }
                if spawner.update(&mut state, &tuning).is_some() {
                    let all = boxes(&state);
                    for i in 0..all.len() {
                        for j in (i + 1)..all.len() {
                            prop_assert!(!all[i].intersects(&all[j]));
                        }
                    }
                }
                state.cull();
            }
        }
    }
}
