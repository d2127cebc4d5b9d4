//! Camera shake
//!
//! Produces a per-frame jitter offset for the renderer. Physics never reads it.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

/// A single re-triggerable camera shake
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScreenShake {
    pub duration: f32,
    pub intensity: f32,
    /// Intensity lost per second (intensity / duration)
    pub decay_rate: f32,
    pub elapsed: f32,
    pub offset: Vec2,
    pub active: bool,
    #[serde(skip, default = "default_rng")]
    rng: Pcg32,
}

fn default_rng() -> Pcg32 {
    Pcg32::seed_from_u64(0)
}

impl ScreenShake {
    pub fn new(seed: u64) -> Self {
        Self {
            duration: 0.0,
            intensity: 0.0,
            decay_rate: 0.0,
            elapsed: 0.0,
            offset: Vec2::ZERO,
            active: false,
            rng: Pcg32::seed_from_u64(seed),
        }
    }

    /// Arm a new shake. Overwrites whatever is in progress; shakes never stack.
    pub fn trigger(&mut self, intensity: f32, duration: f32) {
        if !(duration > 0.0) || !intensity.is_finite() {
            self.reset();
            return;
        }
        let intensity = intensity.abs();
        self.intensity = intensity;
        self.duration = duration;
        self.decay_rate = intensity / duration;
        self.elapsed = 0.0;
        self.offset = Vec2::ZERO;
        self.active = true;
    }

    /// Advance by `dt` and return this frame's offset
    pub fn update(&mut self, dt: f32) -> Vec2 {
        if !self.active {
            self.offset = Vec2::ZERO;
            return self.offset;
        }

        self.elapsed += dt.max(0.0);
        if self.elapsed >= self.duration {
            self.active = false;
            self.offset = Vec2::ZERO;
            return self.offset;
        }

        let current = self.current_intensity();
        self.offset = Vec2::new(
            self.rng.random_range(-current..=current),
            self.rng.random_range(-current..=current),
        );
        self.offset
    }

    /// Linearly decayed intensity at the current elapsed time
    pub fn current_intensity(&self) -> f32 {
        if !self.active || self.duration <= 0.0 {
            return 0.0;
        }
        (self.intensity * (1.0 - self.elapsed / self.duration)).max(0.0)
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Offset produced by the last update
    #[inline]
    pub fn offset(&self) -> Vec2 {
        self.offset
    }

    pub fn reset(&mut self) {
        self.duration = 0.0;
        self.intensity = 0.0;
        self.decay_rate = 0.0;
        self.elapsed = 0.0;
        self.offset = Vec2::ZERO;
        self.active = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_half_way_offset_is_bounded_by_half_intensity() {
        let mut shake = ScreenShake::new(7);
        shake.trigger(20.0, 0.5);
        assert_eq!(shake.decay_rate, 40.0);

        let mut offset = Vec2::ZERO;
        for _ in 0..25 {
            offset = shake.update(0.01);
        }
        assert!(shake.is_active());
        assert!(offset.x.abs() <= 10.0 + 1e-3);
        assert!(offset.y.abs() <= 10.0 + 1e-3);
        assert!(offset.length() > 0.0);
    }

    #[test]
    fn test_expires_with_zero_offset() {
        let mut shake = ScreenShake::new(1);
        shake.trigger(20.0, 0.5);
        assert_ne!(shake.update(0.3), Vec2::ZERO);
        assert_eq!(shake.update(0.3), Vec2::ZERO);
        assert!(!shake.is_active());
        assert_eq!(shake.update(0.1), Vec2::ZERO);
    }

    #[test]
    fn test_retrigger_overwrites() {
        let mut shake = ScreenShake::new(3);
        shake.trigger(30.0, 1.0);
        shake.update(0.9);
        shake.trigger(5.0, 0.2);
        assert_eq!(shake.intensity, 5.0);
        assert_eq!(shake.elapsed, 0.0);
        let offset = shake.update(0.05);
        assert!(offset.x.abs() <= 5.0 && offset.y.abs() <= 5.0);
        assert_eq!(shake.update(0.2), Vec2::ZERO);
    }

    #[test]
    fn test_reset_and_bad_duration() {
        let mut shake = ScreenShake::new(3);
        shake.trigger(10.0, 1.0);
        shake.reset();
        assert!(!shake.is_active());
        shake.trigger(10.0, 0.0);
        assert!(!shake.is_active());
        shake.trigger(10.0, -1.0);
        assert!(!shake.is_active());
    }

    proptest! {
        #[test]
        fn prop_shake_ends_exactly_at_duration(
            intensity in 0.0f32..100.0,
            duration in 0.01f32..2.0,
            steps in proptest::collection::vec(0.001f32..0.1, 1..400),
            seed in any::<u64>(),
        ) {
            let mut shake = ScreenShake::new(seed);
            shake.trigger(intensity, duration);
            let mut total = 0.0f32;
            for dt in steps {
                let was_active = shake.is_active();
                total += dt;
                let offset = shake.update(dt);
                if total >= duration {
                    prop_assert!(!shake.is_active());
                    prop_assert_eq!(offset, Vec2::ZERO);
                    break;
                }
                prop_assert!(was_active);
                let bound = intensity * (1.0 - total / duration) + 1e-3;
                prop_assert!(offset.x.abs() <= bound);
                prop_assert!(offset.y.abs() <= bound);
            }
        }
    }
}
