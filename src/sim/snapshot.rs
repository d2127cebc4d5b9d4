//! Read-only per-tick output for the renderer and UI

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::aabb::Aabb;
use super::ability::{AbilityKind, AbilityPhase, ShieldRing};
use super::particles::Particle;
use super::state::{Collectible, GamePhase, GameState, Obstacle};
use crate::tuning::Tuning;

/// Shield status for the HUD and renderer
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ShieldStats {
    pub active: bool,
    pub rings: Vec<ShieldRing>,
}

/// Per-ability HUD entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AbilityStats {
    pub kind: AbilityKind,
    pub phase: AbilityPhase,
    pub remaining: f32,
    pub cooldown: f32,
    pub cost: f32,
    pub level: u8,
    /// Idle and affordable right now
    pub ready: bool,
}

/// Everything a frame needs, assembled once per tick
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameStats {
    pub phase: GamePhase,
    pub score: u64,
    pub high_score: u64,
    pub level: u32,
    pub health: f32,
    pub max_health: f32,
    pub energy: f32,
    pub max_energy: f32,
    pub shield: ShieldStats,
    pub abilities: Vec<AbilityStats>,
    pub obstacle_count: usize,
    pub collectible_count: usize,
    pub combo: u32,
    pub multiplier: u32,
    pub fps: u32,
    /// Seconds left in the current wave
    pub time_remaining: f32,
    pub distance: f32,
    pub camera_x: f32,
    pub shake_offset: Vec2,
    pub player: Aabb,
    pub invulnerable: bool,
    pub obstacles: Vec<Obstacle>,
    pub collectibles: Vec<Collectible>,
    pub particles: Vec<Particle>,
}

impl GameStats {
    pub fn capture(
        state: &GameState,
        tuning: &Tuning,
        particles: &[Particle],
        shake_offset: Vec2,
        fps: u32,
    ) -> Self {
        let abilities = &state.player.abilities;
        Self {
            phase: state.phase,
            score: state.score,
            high_score: state.high_score,
            level: state.wave(tuning),
            health: state.health(),
            max_health: state.max_health,
            energy: state.energy(),
            max_energy: state.max_energy,
            shield: ShieldStats {
                active: abilities.is_active(AbilityKind::Shield),
                rings: abilities.shield_rings().to_vec(),
            },
            abilities: AbilityKind::ALL
                .iter()
                .map(|&kind| {
                    let s = abilities.state(kind);
                    AbilityStats {
                        kind,
                        phase: s.phase(),
                        remaining: s.remaining,
                        cooldown: s.cooldown,
                        cost: s.cost,
                        level: s.level,
                        ready: abilities.can_activate(kind, state.energy()),
                    }
                })
                .collect(),
            obstacle_count: state.obstacles.len(),
            collectible_count: state.collectibles.len(),
            combo: state.combo,
            multiplier: state.multiplier,
            fps,
            time_remaining: state.wave_time_remaining(tuning),
            distance: state.distance,
            camera_x: state.camera_left(),
            shake_offset,
            player: state.player.bounds,
            invulnerable: state.player.is_invulnerable(),
            obstacles: state.obstacles.clone(),
            collectibles: state.collectibles.clone(),
            particles: particles.to_vec(),
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// Number of frames averaged for the fps readout
const FPS_WINDOW: usize = 60;

/// Rolling frame-rate estimate from raw host frame times
#[derive(Debug, Clone)]
pub struct FrameTimer {
    frame_times: [f32; FPS_WINDOW],
    frame_index: usize,
    filled: usize,
}

impl Default for FrameTimer {
    fn default() -> Self {
        Self {
            frame_times: [0.0; FPS_WINDOW],
            frame_index: 0,
            filled: 0,
        }
    }
}

impl FrameTimer {
    /// Record one host frame of `dt` seconds (unclamped)
    pub fn record(&mut self, dt: f32) {
        if !dt.is_finite() || dt <= 0.0 {
            return;
        }
        self.frame_times[self.frame_index] = dt;
        self.frame_index = (self.frame_index + 1) % FPS_WINDOW;
        self.filled = (self.filled + 1).min(FPS_WINDOW);
    }

    pub fn fps(&self) -> u32 {
        if self.filled == 0 {
            return 0;
        }
        let total: f32 = self.frame_times[..self.filled].iter().sum();
        if total <= 0.0 {
            return 0;
        }
        (self.filled as f32 / total).round() as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fps_average() {
        let mut timer = FrameTimer::default();
        assert_eq!(timer.fps(), 0);
        for _ in 0..120 {
            timer.record(1.0 / 60.0);
        }
        assert_eq!(timer.fps(), 60);
        for _ in 0..60 {
            timer.record(1.0 / 30.0);
        }
        assert_eq!(timer.fps(), 30);
        timer.record(-1.0);
        timer.record(f32::NAN);
        assert_eq!(timer.fps(), 30);
    }

    #[test]
    fn test_capture_reflects_state() {
        let tuning = Tuning::default();
        let mut state = GameState::new(5, &tuning);
        state.score = 77;
        state.combo = 6;
        state.multiplier = 2;
        state.change_health(-3.0);
        let stats = GameStats::capture(&state, &tuning, &[], Vec2::new(1.0, -2.0), 58);

        assert_eq!(stats.score, 77);
        assert_eq!(stats.health, 7.0);
        assert_eq!(stats.level, 1);
        assert_eq!(stats.fps, 58);
        assert_eq!(stats.shake_offset, Vec2::new(1.0, -2.0));
        assert_eq!(stats.abilities.len(), AbilityKind::COUNT);
        assert!(!stats.shield.active);
        assert!(stats.to_json().unwrap().contains("\"score\":77"));
    }
}
