//! Neon Dash - simulation core for a side-scrolling arcade runner
//!
//! Core modules:
//! - `sim`: Per-frame simulation (physics, spawning, collisions, effects)
//! - `tuning`: Data-driven game balance
//! - `settings`: Quality and accessibility preferences that reach the sim
//!
//! Rendering, navigation and persistence live outside this crate. They
//! consume [`sim::GameStats`] snapshots and [`sim::GameEvent`]s.

pub mod settings;
pub mod sim;
pub mod tuning;

pub use settings::{QualityPreset, Settings};
pub use sim::{Command, GameEvent, GamePhase, GameStats, InputState, Simulation};
pub use tuning::Tuning;

/// World configuration constants
pub mod consts {
    /// Nominal frame step used by drivers and tests (60 Hz)
    pub const FRAME_DT: f32 = 1.0 / 60.0;

    /// Horizontal distance from the camera's left edge to the player
    pub const PLAYER_SCREEN_X: f32 = 160.0;
    /// Visible world width ahead of the camera's left edge
    pub const VIEW_WIDTH: f32 = 960.0;
    /// Ground is y = 0, ceiling is this height
    pub const WORLD_HEIGHT: f32 = 540.0;

    /// Player box
    pub const PLAYER_WIDTH: f32 = 40.0;
    pub const PLAYER_HEIGHT: f32 = 48.0;

    /// Trail history kept on the player
    pub const TRAIL_LENGTH: usize = 20;

    /// Events retained when nobody drains them
    pub const MAX_PENDING_EVENTS: usize = 256;
}

/// Linear interpolation between `a` and `b`
#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Sanitize a frame delta: non-finite or negative becomes zero, then clamp
#[inline]
pub fn sanitize_dt(dt: f32, max_step: f32) -> f32 {
    if !dt.is_finite() || dt <= 0.0 {
        return 0.0;
    }
    dt.min(max_step.max(0.0))
}
