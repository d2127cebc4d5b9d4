//! Player abilities
//!
//! Each ability runs the same timed state machine:
//! `Idle → Active` on request (energy and cooldown permitting),
//! `Active → Cooldown` when its duration runs out, `Cooldown → Idle` at zero.
//! The shield additionally drives a set of ring visuals.

use serde::{Deserialize, Serialize};

use crate::tuning::{AbilityTuning, AbilityTunings};

/// The fixed set of abilities
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AbilityKind {
    Shield,
    Dash,
    Magnet,
}

impl AbilityKind {
    pub const COUNT: usize = 3;
    pub const ALL: [AbilityKind; Self::COUNT] =
        [AbilityKind::Shield, AbilityKind::Dash, AbilityKind::Magnet];

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AbilityKind::Shield => "shield",
            AbilityKind::Dash => "dash",
            AbilityKind::Magnet => "magnet",
        }
    }

    pub fn from_id(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "shield" => Some(AbilityKind::Shield),
            "dash" | "boost" => Some(AbilityKind::Dash),
            "magnet" => Some(AbilityKind::Magnet),
            _ => None,
        }
    }
}

/// Where an ability is in its cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AbilityPhase {
    Idle,
    Active,
    Cooldown,
}

/// Timers for one ability
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AbilityState {
    pub active: bool,
    /// Seconds of activity left
    pub remaining: f32,
    /// Seconds since activation
    pub elapsed: f32,
    /// Seconds until usable again
    pub cooldown: f32,
    /// Energy debited on activation
    pub cost: f32,
    /// Upgrade level (1-based); each level adds 25% duration
    pub level: u8,
}

impl AbilityState {
    fn new(cost: f32) -> Self {
        Self {
            active: false,
            remaining: 0.0,
            elapsed: 0.0,
            cooldown: 0.0,
            cost,
            level: 1,
        }
    }

    pub fn phase(&self) -> AbilityPhase {
        if self.active {
            AbilityPhase::Active
        } else if self.cooldown > 0.0 {
            AbilityPhase::Cooldown
        } else {
            AbilityPhase::Idle
        }
    }

    fn duration(&self, tuning: &AbilityTuning) -> f32 {
        tuning.duration * (1.0 + 0.25 * (self.level.max(1) - 1) as f32)
    }

    fn start(&mut self, tuning: &AbilityTuning) {
        self.active = true;
        self.elapsed = 0.0;
        self.remaining = self.duration(tuning);
        self.cooldown = 0.0;
    }
}

/// One rotating ring of the shield visual
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShieldRing {
    pub radius: f32,
    pub rotation: f32,
    /// Radians per second (sign gives direction)
    pub angular_speed: f32,
    pub opacity: f32,
    pub segments: u32,
    pub active: bool,
}

/// Seconds over which the rings fade out before the shield drops
const RING_FADE_OUT: f32 = 0.5;

/// Ring geometry for a shield that has been up for `elapsed` seconds with
/// `remaining` seconds left. Pure function of those two timers.
pub fn shield_rings_at(elapsed: f32, remaining: f32, tuning: &AbilityTunings) -> Vec<ShieldRing> {
    let interval = tuning.shield_ring_interval.max(f32::EPSILON);
    let max_rings = tuning.shield_max_rings.max(1);
    let count = (1 + (elapsed / interval).floor() as u32).min(max_rings);
    let fade_out = (remaining / RING_FADE_OUT).clamp(0.0, 1.0);

    (0..count)
        .map(|i| {
            let direction = if i % 2 == 0 { 1.0 } else { -1.0 };
            let angular_speed = tuning.shield_spin * (1.0 + 0.5 * i as f32) * direction;
            let born = i as f32 * interval;
            let fade_in = ((elapsed - born) / interval).clamp(0.0, 1.0);
            ShieldRing {
                radius: tuning.shield_base_radius + i as f32 * tuning.shield_ring_spacing,
                rotation: (elapsed * angular_speed).rem_euclid(std::f32::consts::TAU),
                angular_speed,
                opacity: fade_in * fade_out,
                segments: 6 + 2 * i,
                active: true,
            }
        })
        .collect()
}

/// Something that changed while advancing ability timers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AbilityTransition {
    /// Active time ran out; cooldown started
    Expired(AbilityKind),
    /// Cooldown finished; ability is idle again
    Ready(AbilityKind),
}

/// Ability table for a player, indexed by [`AbilityKind`]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Abilities {
    states: [AbilityState; AbilityKind::COUNT],
    rings: Vec<ShieldRing>,
}

impl Abilities {
    pub fn new(tuning: &AbilityTunings) -> Self {
        Self {
            states: AbilityKind::ALL.map(|kind| AbilityState::new(tuning.get(kind).cost)),
            rings: Vec::new(),
        }
    }

    pub fn state(&self, kind: AbilityKind) -> &AbilityState {
        &self.states[kind.index()]
    }

    pub fn set_level(&mut self, kind: AbilityKind, level: u8) {
        self.states[kind.index()].level = level.max(1);
    }

    pub fn is_active(&self, kind: AbilityKind) -> bool {
        self.states[kind.index()].active
    }

    pub fn can_activate(&self, kind: AbilityKind, energy: f32) -> bool {
        let state = &self.states[kind.index()];
        state.phase() == AbilityPhase::Idle && energy >= state.cost
    }

    /// Try to activate `kind`, debiting its cost from `energy`.
    /// Returns false (changing nothing) if the ability is not idle or energy
    /// is short.
    pub fn activate(&mut self, kind: AbilityKind, energy: &mut f32, tuning: &AbilityTunings) -> bool {
        if !self.can_activate(kind, *energy) {
            return false;
        }
        let state = &mut self.states[kind.index()];
        *energy = (*energy - state.cost).max(0.0);
        state.start(tuning.get(kind));
        if kind == AbilityKind::Shield {
            self.rings = shield_rings_at(0.0, state.remaining, tuning);
        }
        true
    }

    /// Activate without cost or cooldown check (power-up pickups).
    /// An already-active ability has its timer refreshed instead.
    pub fn force_activate(&mut self, kind: AbilityKind, tuning: &AbilityTunings) {
        let state = &mut self.states[kind.index()];
        if state.active {
            state.remaining = state.remaining.max(state.duration(tuning.get(kind)));
        } else {
            state.start(tuning.get(kind));
        }
        if kind == AbilityKind::Shield {
            self.rings = shield_rings_at(state.elapsed, state.remaining, tuning);
        }
    }

    /// Clear every pending cooldown
    pub fn reset_cooldowns(&mut self) {
        for state in self.states.iter_mut() {
            state.cooldown = 0.0;
        }
    }

    /// Advance all timers by `dt`
    pub fn advance(&mut self, dt: f32, tuning: &AbilityTunings) -> Vec<AbilityTransition> {
        let mut transitions = Vec::new();

        for kind in AbilityKind::ALL {
            let state = &mut self.states[kind.index()];
            if state.active {
                state.elapsed += dt;
                state.remaining -= dt;
                if state.remaining <= 0.0 {
                    state.active = false;
                    state.remaining = 0.0;
                    state.cooldown = tuning.get(kind).cooldown.max(0.0);
                    transitions.push(AbilityTransition::Expired(kind));
                    if state.cooldown == 0.0 {
                        transitions.push(AbilityTransition::Ready(kind));
                    }
                }
            } else if state.cooldown > 0.0 {
                state.cooldown -= dt;
                if state.cooldown <= 0.0 {
                    state.cooldown = 0.0;
                    transitions.push(AbilityTransition::Ready(kind));
                }
            }
        }

        let shield = &self.states[AbilityKind::Shield.index()];
        if shield.active {
            self.rings = shield_rings_at(shield.elapsed, shield.remaining, tuning);
        } else {
            self.rings.clear();
        }

        transitions
    }

    pub fn shield_rings(&self) -> &[ShieldRing] {
        &self.rings
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tunings() -> AbilityTunings {
        AbilityTunings::default()
    }

    #[test]
    fn test_lookup_by_id() {
        assert_eq!(AbilityKind::from_id("Shield"), Some(AbilityKind::Shield));
        assert_eq!(AbilityKind::from_id("dash"), Some(AbilityKind::Dash));
        assert_eq!(AbilityKind::from_id("teleport"), None);
        for kind in AbilityKind::ALL {
            assert_eq!(AbilityKind::from_id(kind.as_str()), Some(kind));
        }
    }

    #[test]
    fn test_full_cycle() {
        let tuning = tunings();
        let mut abilities = Abilities::new(&tuning);
        let mut energy = 100.0;

        assert!(abilities.activate(AbilityKind::Dash, &mut energy, &tuning));
        assert_eq!(energy, 75.0);
        assert_eq!(abilities.state(AbilityKind::Dash).phase(), AbilityPhase::Active);

        // Energy is debited once, not per tick
        abilities.advance(0.5, &tuning);
        assert_eq!(energy, 75.0);

        let transitions = abilities.advance(0.6, &tuning);
        assert_eq!(transitions, vec![AbilityTransition::Expired(AbilityKind::Dash)]);
        assert_eq!(abilities.state(AbilityKind::Dash).phase(), AbilityPhase::Cooldown);
        assert_eq!(abilities.state(AbilityKind::Dash).cooldown, 3.0);

        let transitions = abilities.advance(3.0, &tuning);
        assert_eq!(transitions, vec![AbilityTransition::Ready(AbilityKind::Dash)]);
        assert_eq!(abilities.state(AbilityKind::Dash).phase(), AbilityPhase::Idle);
    }

    #[test]
    fn test_activation_rejected_without_energy() {
        let tuning = tunings();
        let mut abilities = Abilities::new(&tuning);
        let mut energy = 10.0;
        assert!(!abilities.activate(AbilityKind::Shield, &mut energy, &tuning));
        assert_eq!(energy, 10.0);
        assert_eq!(abilities.state(AbilityKind::Shield).phase(), AbilityPhase::Idle);
    }

    #[test]
    fn test_activation_is_noop_unless_idle() {
        let tuning = tunings();
        let mut abilities = Abilities::new(&tuning);
        let mut energy = 100.0;
        assert!(abilities.activate(AbilityKind::Shield, &mut energy, &tuning));
        // While active
        assert!(!abilities.activate(AbilityKind::Shield, &mut energy, &tuning));
        assert_eq!(energy, 60.0);

        abilities.advance(3.0, &tuning);
        // While cooling down
        assert!(!abilities.activate(AbilityKind::Shield, &mut energy, &tuning));
        assert_eq!(energy, 60.0);
    }

    #[test]
    fn test_shield_rings_follow_activation() {
        let tuning = tunings();
        let mut abilities = Abilities::new(&tuning);
        let mut energy = 100.0;
        assert!(abilities.shield_rings().is_empty());

        abilities.activate(AbilityKind::Shield, &mut energy, &tuning);
        assert_eq!(abilities.shield_rings().len(), 1);

        abilities.advance(0.5, &tuning);
        assert_eq!(abilities.shield_rings().len(), 2);
        abilities.advance(1.0, &tuning);
        assert_eq!(abilities.shield_rings().len(), 3);
        abilities.advance(1.0, &tuning);
        assert_eq!(abilities.shield_rings().len(), 3);

        abilities.advance(1.0, &tuning);
        assert!(abilities.shield_rings().is_empty());
    }

    #[test]
    fn test_ring_geometry_is_deterministic() {
        let tuning = tunings();
        let a = shield_rings_at(1.3, 1.7, &tuning);
        let b = shield_rings_at(1.3, 1.7, &tuning);
        assert_eq!(a, b);
        assert_eq!(a.len(), 3);
        assert_eq!(a[1].segments, 8);
        assert!(a[0].angular_speed > 0.0 && a[1].angular_speed < 0.0);
        assert!(a[2].radius > a[0].radius);
        // Fading out near the end
        let late = shield_rings_at(2.9, 0.1, &tuning);
        assert!(late.iter().all(|r| r.opacity <= 0.2 + 1e-6));
    }

    #[test]
    fn test_force_activate_ignores_cooldown() {
        let tuning = tunings();
        let mut abilities = Abilities::new(&tuning);
        let mut energy = 100.0;
        abilities.activate(AbilityKind::Shield, &mut energy, &tuning);
        abilities.advance(3.0, &tuning);
        assert_eq!(abilities.state(AbilityKind::Shield).phase(), AbilityPhase::Cooldown);

        abilities.force_activate(AbilityKind::Shield, &tuning);
        assert!(abilities.is_active(AbilityKind::Shield));
        assert_eq!(energy, 60.0);
        assert!(!abilities.shield_rings().is_empty());
    }

    #[test]
    fn test_level_extends_duration() {
        let tuning = tunings();
        let mut abilities = Abilities::new(&tuning);
        abilities.set_level(AbilityKind::Dash, 3);
        let mut energy = 100.0;
        abilities.activate(AbilityKind::Dash, &mut energy, &tuning);
        assert_eq!(abilities.state(AbilityKind::Dash).remaining, 1.5);
    }

    #[test]
    fn test_reset_cooldowns() {
        let tuning = tunings();
        let mut abilities = Abilities::new(&tuning);
        let mut energy = 100.0;
        abilities.activate(AbilityKind::Magnet, &mut energy, &tuning);
        abilities.advance(5.0, &tuning);
        assert!(abilities.state(AbilityKind::Magnet).cooldown > 0.0);
        abilities.reset_cooldowns();
        assert_eq!(abilities.state(AbilityKind::Magnet).phase(), AbilityPhase::Idle);
    }
}
