//! Per-frame simulation loop
//!
//! [`Simulation`] owns every piece of mutable session state. Hosts feed it
//! input and commands between frames and call [`Simulation::tick`] once per
//! frame; each tick runs to completion and leaves behind one immutable
//! [`GameStats`] snapshot.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;

use super::ability::{AbilityKind, AbilityTransition};
use super::collision::{self, CollisionOutcome};
use super::particles::{ParticleKind, ParticlePool, ParticleSpec};
use super::shake::ScreenShake;
use super::snapshot::{FrameTimer, GameStats};
use super::spawner::{self, Spawner};
use super::state::{GameEvent, GamePhase, GameState};
use crate::consts::*;
use crate::settings::Settings;
use crate::tuning::Tuning;
use crate::{lerp, sanitize_dt};

/// Stream offsets for the visual RNGs
const FX_STREAM: u64 = 0xF1_EC75;
const SHAKE_STREAM: u64 = 0x5A4E_0FF5E7;

/// How far ahead (in seconds of travel) the autopilot looks for obstacles
const AUTOPILOT_LOOKAHEAD: f32 = 0.3;

/// Latest continuous input from the host
#[derive(Debug, Clone, Default)]
pub struct InputState {
    /// Horizontal steer in [-1, 1]
    pub move_x: f32,
    /// Jump held
    pub jump: bool,
    /// Idle/demo mode - the simulation plays itself
    pub autopilot: bool,
}

/// Discrete control requests, applied at the next tick boundary
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Menu → Playing
    Start,
    /// Playing → Paused
    Pause,
    /// Paused → Playing
    Resume,
    /// Pause or resume depending on the current phase
    TogglePause,
    /// Any phase → Menu with a fresh run (next seed in sequence)
    Reset,
    /// Any phase → Menu with a fresh run on the given seed
    ResetWithSeed(u64),
}

/// Advance a seed to the next run's seed
fn next_seed(seed: u64) -> u64 {
    seed.wrapping_mul(6364136223846793005)
        .wrapping_add(1442695040888963407)
}

/// One game session's simulation
#[derive(Debug)]
pub struct Simulation {
    state: GameState,
    tuning: Tuning,
    settings: Settings,
    spawner: Spawner,
    particles: ParticlePool,
    shake: ScreenShake,
    fx_rng: Pcg32,
    input: InputState,
    jump_pressed: bool,
    ability_requests: Vec<AbilityKind>,
    commands: Vec<Command>,
    events: Vec<GameEvent>,
    frame_timer: FrameTimer,
    stats: GameStats,
}

impl Simulation {
    pub fn new(seed: u64, tuning: Tuning, settings: Settings) -> Self {
        let tuning = tuning.sanitized();
        let state = GameState::new(seed, &tuning);
        let particles = ParticlePool::new(settings.max_particles());
        let stats = GameStats::capture(&state, &tuning, particles.particles(), Vec2::ZERO, 0);
        Self {
            spawner: Spawner::new(seed),
            shake: ScreenShake::new(seed ^ SHAKE_STREAM),
            fx_rng: Pcg32::seed_from_u64(seed ^ FX_STREAM),
            state,
            tuning,
            settings,
            particles,
            input: InputState::default(),
            jump_pressed: false,
            ability_requests: Vec::new(),
            commands: Vec::new(),
            events: Vec::new(),
            frame_timer: FrameTimer::default(),
            stats,
        }
    }

    // --- Host entry points ---

    /// Queue a control command for the next tick
    pub fn queue(&mut self, command: Command) {
        self.commands.push(command);
    }

    /// Replace the buffered continuous input
    pub fn set_input(&mut self, input: InputState) {
        self.input = input;
    }

    /// One-shot jump, consumed by the next playing tick
    pub fn press_jump(&mut self) {
        self.jump_pressed = true;
    }

    /// Ask for an ability; applied at the start of the next playing tick
    pub fn request_ability(&mut self, kind: AbilityKind) {
        if !self.ability_requests.contains(&kind) {
            self.ability_requests.push(kind);
        }
    }

    /// Snapshot from the most recent tick
    pub fn snapshot(&self) -> &GameStats {
        &self.stats
    }

    /// Read-only view of the live session
    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn phase(&self) -> GamePhase {
        self.state.phase
    }

    pub fn seed(&self) -> u64 {
        self.state.seed
    }

    pub fn tuning(&self) -> &Tuning {
        &self.tuning
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Take every event emitted since the last call
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Advance one frame of `dt` seconds and return the new snapshot.
    ///
    /// Outside `Playing` nothing advances; the previous snapshot is kept
    /// unless a command changed the phase.
    pub fn tick(&mut self, dt: f32) -> &GameStats {
        self.frame_timer.record(dt);
        let dt = sanitize_dt(dt, self.tuning.max_step);

        let phase_before = self.state.phase;
        self.process_commands();

        if self.state.phase != GamePhase::Playing {
            self.jump_pressed = false;
            self.ability_requests.clear();
            if self.state.phase != phase_before {
                self.capture();
            }
            return &self.stats;
        }

        self.step(dt);
        &self.stats
    }

    // --- Phase machine ---

    fn process_commands(&mut self) {
        let commands = std::mem::take(&mut self.commands);
        for command in commands {
            let phase = self.state.phase;
            match (command, phase) {
                (Command::Start, GamePhase::Menu) => {
                    self.set_phase(GamePhase::Playing);
                    self.push_event(GameEvent::SessionStarted {
                        seed: self.state.seed,
                    });
                    log::info!("Session started with seed {}", self.state.seed);
                }
                (Command::Pause | Command::TogglePause, GamePhase::Playing) => {
                    self.set_phase(GamePhase::Paused);
                }
                (Command::Resume | Command::TogglePause, GamePhase::Paused) => {
                    self.set_phase(GamePhase::Playing);
                }
                (Command::Reset, _) => self.reset(next_seed(self.state.seed)),
                (Command::ResetWithSeed(seed), _) => self.reset(seed),
                (command, phase) => {
                    log::debug!("Ignoring {:?} while {}", command, phase.as_str());
                }
            }
        }
    }

    fn set_phase(&mut self, to: GamePhase) {
        let from = self.state.phase;
        if from == to {
            return;
        }
        self.state.phase = to;
        log::info!("Phase {} -> {}", from.as_str(), to.as_str());
        self.push_event(GameEvent::PhaseChanged { from, to });
    }

    /// Rebuild the session from scratch; the high score survives
    fn reset(&mut self, seed: u64) {
        if matches!(self.state.phase, GamePhase::Playing | GamePhase::Paused) {
            self.end_session();
        }
        let from = self.state.phase;
        let high_score = self.state.high_score.max(self.state.score);

        self.state = GameState::new(seed, &self.tuning);
        self.state.high_score = high_score;
        self.spawner = Spawner::new(seed);
        self.shake = ScreenShake::new(seed ^ SHAKE_STREAM);
        self.fx_rng = Pcg32::seed_from_u64(seed ^ FX_STREAM);
        self.particles = ParticlePool::new(self.settings.max_particles());
        self.jump_pressed = false;
        self.ability_requests.clear();

        if from != GamePhase::Menu {
            log::info!("Phase {} -> {}", from.as_str(), GamePhase::Menu.as_str());
            self.push_event(GameEvent::PhaseChanged {
                from,
                to: GamePhase::Menu,
            });
        }
    }

    fn end_session(&mut self) {
        log::info!(
            "Session ended: score {} distance {:.0}",
            self.state.score,
            self.state.distance
        );
        self.push_event(GameEvent::SessionEnded {
            score: self.state.score,
            distance: self.state.distance,
        });
    }

    fn push_event(&mut self, event: GameEvent) {
        self.events.push(event);
        if self.events.len() > MAX_PENDING_EVENTS {
            let excess = self.events.len() - MAX_PENDING_EVENTS;
            self.events.drain(..excess);
        }
    }

    // --- The tick ---

    fn step(&mut self, dt: f32) {
        // Buffered input
        let input = if self.input.autopilot {
            self.autopilot_input()
        } else {
            self.input.clone()
        };
        for kind in std::mem::take(&mut self.ability_requests) {
            if self.state.activate_ability(kind, &self.tuning) {
                log::debug!("Ability {} activated", kind.as_str());
                self.push_event(GameEvent::AbilityActivated { kind });
            }
        }

        // (1) Player physics
        self.integrate_player(&input, dt);

        // (2) Existing entities
        let t = self.state.elapsed;
        for obstacle in self.state.obstacles.iter_mut() {
            obstacle.oscillate(t);
        }

        // (3) Spawning
        self.spawner.update(&mut self.state, &self.tuning);

        // (4) Collisions and scoring
        let outcome = collision::resolve(&mut self.state, &self.tuning, dt);
        self.state.cull();
        self.state.normalize_order();
        self.apply_outcome(outcome);

        // (5) Particles
        self.particles.update(dt);
        let particles = &self.particles;
        self.state
            .player
            .effects
            .particle_ids
            .retain(|&id| particles.is_alive(id));

        // (6) Ability timers
        let transitions = self
            .state
            .player
            .abilities
            .advance(dt, &self.tuning.abilities);
        for transition in transitions {
            let event = match transition {
                AbilityTransition::Expired(kind) => {
                    log::debug!("Ability {} expired", kind.as_str());
                    GameEvent::AbilityEnded { kind }
                }
                AbilityTransition::Ready(kind) => {
                    log::debug!("Ability {} ready", kind.as_str());
                    GameEvent::AbilityReady { kind }
                }
            };
            self.push_event(event);
        }

        // (7) Camera shake
        self.shake.update(dt);

        // (8) Snapshot
        self.capture();
    }

    fn integrate_player(&mut self, input: &InputState, dt: f32) {
        let tuning = &self.tuning;
        let state = &mut self.state;
        state.elapsed += dt;
        state.change_energy(tuning.vitals.energy_regen * dt);

        let difficulty = spawner::difficulty(state.score, state.wave(tuning), &tuning.spawner);
        let mut run_speed = lerp(
            tuning.player.base_run_speed,
            tuning.player.max_run_speed,
            difficulty,
        );
        let dashing = state.player.abilities.is_active(AbilityKind::Dash);
        if dashing {
            run_speed *= tuning.abilities.dash_speed_mult;
        }

        let player = &mut state.player;
        let steer = if input.move_x.is_finite() {
            input.move_x.clamp(-1.0, 1.0)
        } else {
            0.0
        };
        player.vel.x = (run_speed + steer * tuning.player.strafe_speed).max(0.0);

        if (self.jump_pressed || input.jump) && player.grounded {
            player.vel.y = tuning.player.jump_speed;
            player.grounded = false;
        }
        self.jump_pressed = false;

        player.vel.y -= tuning.player.gravity * dt;
        player.bounds.min += player.vel * dt;

        if player.bounds.bottom() <= 0.0 {
            player.bounds.min.y = 0.0;
            player.vel.y = player.vel.y.max(0.0);
            player.grounded = true;
        }
        if player.bounds.top() > WORLD_HEIGHT {
            player.bounds.min.y = WORLD_HEIGHT - player.bounds.size.y;
            player.vel.y = player.vel.y.min(0.0);
        }

        state.distance += player.vel.x * dt;
        if dt > 0.0 {
            player.record_trail();
        }

        if dashing && dt > 0.0 {
            let origin = Vec2::new(player.bounds.left(), player.bounds.center().y);
            let mut spec = ParticleSpec::new(ParticleKind::Trail, origin, Vec2::new(-40.0, 0.0), 0.3);
            spec.drag = 4.0;
            spec.size = player.bounds.size.y * 0.5;
            if let Some(id) = self.particles.spawn(spec) {
                player.effects.particle_ids.push(id);
            }
        }
    }

    fn apply_outcome(&mut self, outcome: CollisionOutcome) {
        for burst in &outcome.bursts {
            self.particles
                .burst(burst.kind, burst.origin, burst.count, &mut self.fx_rng);
        }
        if let Some(shake) = outcome.shake {
            if self.settings.effective_screen_shake() {
                self.shake.trigger(shake.intensity, shake.duration);
            }
        }
        for event in outcome.events {
            if let GameEvent::PhaseChanged { from, to } = &event {
                log::info!("Phase {} -> {}", from.as_str(), to.as_str());
            }
            self.push_event(event);
        }
        if outcome.game_over {
            self.end_session();
        }
    }

    /// Demo input: hop over ground-level obstacles coming up
    fn autopilot_input(&self) -> InputState {
        let player = &self.state.player;
        let lookahead = player.vel.x.max(self.tuning.player.base_run_speed) * AUTOPILOT_LOOKAHEAD;
        let threat = self.state.obstacles.iter().any(|o| {
            !o.consumed
                && o.bounds.left() > player.bounds.right()
                && o.bounds.left() - player.bounds.right() < lookahead
                && o.bounds.bottom() < player.bounds.size.y
        });
        InputState {
            move_x: 0.0,
            jump: threat,
            autopilot: true,
        }
    }

    fn capture(&mut self) {
        self.stats = GameStats::capture(
            &self.state,
            &self.tuning,
            self.particles.particles(),
            self.shake.offset(),
            self.frame_timer.fps(),
        );
    }
}
