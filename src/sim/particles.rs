//! Bounded particle pool
//!
//! Visual only; nothing here feeds back into gameplay. When the pool is full
//! new requests are dropped so effects already on screen finish their
//! animation instead of vanishing mid-fade.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Visual particle kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParticleKind {
    Circle,
    Spark,
    Trail,
    Explosion,
}

impl ParticleKind {
    /// Draw order (higher draws on top)
    pub fn z_index(&self) -> i32 {
        match self {
            ParticleKind::Trail => 0,
            ParticleKind::Circle => 1,
            ParticleKind::Explosion => 2,
            ParticleKind::Spark => 3,
        }
    }
}

/// One color stop of a radial gradient, color packed as 0xRRGGBBAA
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GradientStop {
    pub offset: f32,
    pub color: u32,
}

/// A live particle
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Particle {
    pub id: u64,
    pub pos: Vec2,
    pub vel: Vec2,
    /// Fraction of velocity lost per second
    pub drag: f32,
    pub rotation: f32,
    pub rotation_speed: f32,
    pub scale: f32,
    /// Derived from life / max_life
    pub alpha: f32,
    /// Seconds left; counts down to retirement
    pub life: f32,
    pub max_life: f32,
    pub kind: ParticleKind,
    pub gradient: Option<Vec<GradientStop>>,
    pub size: f32,
    /// Pool clock (seconds) when spawned
    pub created_at: f64,
    pub z_index: i32,
    pub active: bool,
}

/// Caller-supplied parameters for a spawn
#[derive(Debug, Clone)]
pub struct ParticleSpec {
    pub kind: ParticleKind,
    pub pos: Vec2,
    pub vel: Vec2,
    pub drag: f32,
    pub rotation: f32,
    pub rotation_speed: f32,
    pub scale: f32,
    pub life: f32,
    pub size: f32,
    pub gradient: Option<Vec<GradientStop>>,
    /// Overrides the kind's default z-index
    pub z_index: Option<i32>,
}

impl ParticleSpec {
    pub fn new(kind: ParticleKind, pos: Vec2, vel: Vec2, life: f32) -> Self {
        Self {
            kind,
            pos,
            vel,
            drag: 0.0,
            rotation: 0.0,
            rotation_speed: 0.0,
            scale: 1.0,
            life,
            size: 4.0,
            gradient: None,
            z_index: None,
        }
    }
}

/// Emission preset for a burst of one kind
struct BurstPreset {
    speed: (f32, f32),
    life: (f32, f32),
    size: (f32, f32),
    drag: f32,
    spin: f32,
    gradient: Option<&'static [GradientStop]>,
}

const EXPLOSION_GRADIENT: &[GradientStop] = &[
    GradientStop { offset: 0.0, color: 0xFFF4C2FF },
    GradientStop { offset: 0.4, color: 0xFF8A2AFF },
    GradientStop { offset: 1.0, color: 0x7A101000 },
];

const SPARK_GRADIENT: &[GradientStop] = &[
    GradientStop { offset: 0.0, color: 0xFFFFFFFF },
    GradientStop { offset: 1.0, color: 0x3FD8FF00 },
];

fn preset(kind: ParticleKind) -> BurstPreset {
    match kind {
        ParticleKind::Explosion => BurstPreset {
            speed: (120.0, 320.0),
            life: (0.45, 0.8),
            size: (6.0, 14.0),
            drag: 2.5,
            spin: 4.0,
            gradient: Some(EXPLOSION_GRADIENT),
        },
        ParticleKind::Spark => BurstPreset {
            speed: (80.0, 220.0),
            life: (0.3, 0.55),
            size: (2.0, 4.0),
            drag: 3.0,
            spin: 8.0,
            gradient: Some(SPARK_GRADIENT),
        },
        ParticleKind::Trail => BurstPreset {
            speed: (10.0, 40.0),
            life: (0.25, 0.4),
            size: (8.0, 12.0),
            drag: 4.0,
            spin: 0.0,
            gradient: None,
        },
        ParticleKind::Circle => BurstPreset {
            speed: (30.0, 90.0),
            life: (0.4, 0.7),
            size: (3.0, 6.0),
            drag: 1.5,
            spin: 0.0,
            gradient: None,
        },
    }
}

/// Owns every transient particle for one session
#[derive(Debug, Clone)]
pub struct ParticlePool {
    particles: Vec<Particle>,
    capacity: usize,
    next_id: u64,
    /// Seconds of particle time simulated so far
    clock: f64,
}

impl ParticlePool {
    pub fn new(capacity: usize) -> Self {
        Self {
            particles: Vec::with_capacity(capacity.min(1024)),
            capacity,
            next_id: 1,
            clock: 0.0,
        }
    }

    /// Spawn a particle. Returns `None` (and drops the request) when full.
    pub fn spawn(&mut self, spec: ParticleSpec) -> Option<u64> {
        if self.particles.len() >= self.capacity {
            return None;
        }
        if !(spec.life > 0.0) {
            return None;
        }

        let id = self.next_id;
        self.next_id += 1;
        self.particles.push(Particle {
            id,
            pos: spec.pos,
            vel: spec.vel,
            drag: spec.drag.max(0.0),
            rotation: spec.rotation,
            rotation_speed: spec.rotation_speed,
            scale: spec.scale,
            alpha: 1.0,
            life: spec.life,
            max_life: spec.life,
            kind: spec.kind,
            gradient: spec.gradient,
            size: spec.size,
            created_at: self.clock,
            z_index: spec.z_index.unwrap_or_else(|| spec.kind.z_index()),
            active: true,
        });
        Some(id)
    }

    /// Radial burst of `count` particles around `origin`.
    /// Returns how many were accepted.
    pub fn burst<R: Rng>(&mut self, kind: ParticleKind, origin: Vec2, count: u32, rng: &mut R) -> usize {
        let preset = preset(kind);
        let mut spawned = 0;
        for _ in 0..count {
            if self.particles.len() >= self.capacity {
                break;
            }
            let angle = rng.random_range(0.0..std::f32::consts::TAU);
            let speed = rng.random_range(preset.speed.0..=preset.speed.1);
            let mut spec = ParticleSpec::new(
                kind,
                origin,
                Vec2::new(angle.cos(), angle.sin()) * speed,
                rng.random_range(preset.life.0..=preset.life.1),
            );
            spec.drag = preset.drag;
            spec.size = rng.random_range(preset.size.0..=preset.size.1);
            spec.rotation = angle;
            if preset.spin > 0.0 {
                spec.rotation_speed = rng.random_range(-preset.spin..=preset.spin);
            }
            spec.gradient = preset.gradient.map(|stops| stops.to_vec());
            if self.spawn(spec).is_some() {
                spawned += 1;
            }
        }
        spawned
    }

    /// Advance every particle and retire the expired ones in the same pass
    pub fn update(&mut self, dt: f32) {
        let dt = dt.max(0.0);
        self.clock += dt as f64;

        for p in self.particles.iter_mut() {
            p.pos += p.vel * dt;
            p.vel *= (1.0 - p.drag * dt).max(0.0);
            p.life -= dt;
            p.rotation += p.rotation_speed * dt;
            p.alpha = if p.max_life > 0.0 {
                (p.life / p.max_life).clamp(0.0, 1.0)
            } else {
                0.0
            };
            if p.life <= 0.0 {
                p.active = false;
            }
        }
        self.particles.retain(|p| p.active);
    }

    /// Active particles in spawn order
    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Ids are handed out in increasing order and the list keeps spawn order,
    /// so a binary search finds them.
    pub fn is_alive(&self, id: u64) -> bool {
        self.particles.binary_search_by_key(&id, |p| p.id).is_ok()
    }

    pub fn clear(&mut self) {
        self.particles.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn spark(life: f32) -> ParticleSpec {
        ParticleSpec::new(ParticleKind::Spark, Vec2::ZERO, Vec2::new(10.0, 0.0), life)
    }

    #[test]
    fn test_spawn_assigns_ids_and_timestamps() {
        let mut pool = ParticlePool::new(8);
        let a = pool.spawn(spark(1.0)).unwrap();
        pool.update(0.25);
        let b = pool.spawn(spark(1.0)).unwrap();
        assert!(b > a);
        assert_eq!(pool.particles()[0].created_at, 0.0);
        assert_eq!(pool.particles()[1].created_at, 0.25);
        assert_eq!(pool.particles()[1].z_index, ParticleKind::Spark.z_index());
    }

    #[test]
    fn test_overflow_drops_newest() {
        let mut pool = ParticlePool::new(3);
        let ids: Vec<_> = (0..3).filter_map(|_| pool.spawn(spark(1.0))).collect();
        assert_eq!(ids.len(), 3);

        assert_eq!(pool.spawn(spark(1.0)), None);
        assert_eq!(pool.spawn(spark(1.0)), None);
        assert_eq!(pool.len(), 3);
        let kept: Vec<_> = pool.particles().iter().map(|p| p.id).collect();
        assert_eq!(kept, ids);
    }

    #[test]
    fn test_update_kinematics() {
        let mut pool = ParticlePool::new(4);
        let mut spec = spark(2.0);
        spec.drag = 0.5;
        spec.rotation_speed = 1.0;
        pool.spawn(spec);
        pool.update(0.5);

        let p = &pool.particles()[0];
        assert!((p.pos.x - 5.0).abs() < 1e-4);
        assert!((p.vel.x - 7.5).abs() < 1e-4);
        assert!((p.life - 1.5).abs() < 1e-6);
        assert!((p.rotation - 0.5).abs() < 1e-6);
        assert!((p.alpha - 0.75).abs() < 1e-6);
    }

    #[test]
    fn test_expired_particles_leave_same_tick() {
        let mut pool = ParticlePool::new(4);
        pool.spawn(spark(0.1));
        let keep = pool.spawn(spark(1.0)).unwrap();
        pool.spawn(spark(0.05));
        pool.update(0.1);
        assert_eq!(pool.len(), 1);
        assert_eq!(pool.particles()[0].id, keep);
        assert!(pool.is_alive(keep));
    }

    #[test]
    fn test_huge_drag_does_not_reverse_velocity() {
        let mut pool = ParticlePool::new(1);
        let mut spec = spark(1.0);
        spec.drag = 50.0;
        pool.spawn(spec);
        pool.update(0.1);
        assert_eq!(pool.particles()[0].vel, Vec2::ZERO);
    }

    #[test]
    fn test_burst_respects_capacity() {
        let mut pool = ParticlePool::new(10);
        let mut rng = Pcg32::seed_from_u64(5);
        assert_eq!(pool.burst(ParticleKind::Explosion, Vec2::ZERO, 6, &mut rng), 6);
        assert_eq!(pool.burst(ParticleKind::Spark, Vec2::ZERO, 6, &mut rng), 4);
        assert_eq!(pool.len(), 10);
        assert!(pool.particles()[0].gradient.is_some());
    }

    #[test]
    fn test_zero_capacity_rejects_everything() {
        let mut pool = ParticlePool::new(0);
        assert_eq!(pool.spawn(spark(1.0)), None);
        assert!(pool.is_empty());
    }

    proptest! {
        #[test]
        fn prop_life_never_increases_and_dead_particles_leave(
            lives in proptest::collection::vec(0.01f32..2.0, 1..40),
            steps in proptest::collection::vec(0.0f32..0.1, 1..60),
        ) {
            let mut pool = ParticlePool::new(64);
            for life in lives {
                pool.spawn(spark(life));
            }
            let mut last: std::collections::HashMap<u64, f32> =
                pool.particles().iter().map(|p| (p.id, p.life)).collect();
            for dt in steps {
                pool.update(dt);
                for p in pool.particles() {
                    prop_assert!(p.life > 0.0);
                    prop_assert!(p.active);
                    prop_assert!(p.life <= last[&p.id]);
                }
                last = pool.particles().iter().map(|p| (p.id, p.life)).collect();
            }
        }
    }
}
