//! Neon Dash headless driver
//!
//! Runs one autopilot session at a fixed 60 Hz and prints the final
//! snapshot summary as JSON.
//!
//! Usage: `neon-dash [seed] [seconds] [tuning.json] [settings.json]`

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use neon_dash::consts::FRAME_DT;
    use neon_dash::{Command, GameEvent, GamePhase, InputState, Settings, Simulation, Tuning};

    env_logger::init();

    let mut args = std::env::args().skip(1);
    let seed: u64 = args.next().and_then(|s| s.parse().ok()).unwrap_or(0xC0FFEE);
    let seconds: f32 = args
        .next()
        .and_then(|s| s.parse().ok())
        .filter(|s: &f32| s.is_finite() && *s > 0.0)
        .unwrap_or(60.0);
    let tuning = args
        .next()
        .and_then(|path| read_config(&path))
        .map(|json| Tuning::load_or_default(&json))
        .unwrap_or_default();
    let settings = args
        .next()
        .and_then(|path| read_config(&path))
        .map(|json| Settings::load_or_default(&json))
        .unwrap_or_default();

    log::info!("Neon Dash (headless) seed {} for {:.0}s", seed, seconds);

    let mut sim = Simulation::new(seed, tuning, settings);
    sim.set_input(InputState {
        autopilot: true,
        ..Default::default()
    });
    sim.queue(Command::Start);

    let frames = (seconds / FRAME_DT).ceil() as u32;
    let mut hits = 0u32;
    let mut passes = 0u32;
    let mut pickups = 0u32;
    for _ in 0..frames {
        let phase = sim.tick(FRAME_DT).phase;
        for event in sim.drain_events() {
            match event {
                GameEvent::ObstacleHit { .. } => hits += 1,
                GameEvent::ObstaclePassed { .. } => passes += 1,
                GameEvent::Collected { .. } => pickups += 1,
                _ => {}
            }
        }
        if phase == GamePhase::GameOver {
            break;
        }
    }

    let stats = sim.snapshot();
    let summary = serde_json::json!({
        "seed": seed,
        "phase": stats.phase,
        "score": stats.score,
        "high_score": stats.high_score,
        "wave": stats.level,
        "distance": stats.distance,
        "health": stats.health,
        "energy": stats.energy,
        "combo": stats.combo,
        "multiplier": stats.multiplier,
        "obstacles_hit": hits,
        "obstacles_passed": passes,
        "pickups": pickups,
        "live_particles": stats.particles.len(),
    });
    match serde_json::to_string_pretty(&summary) {
        Ok(json) => println!("{}", json),
        Err(err) => log::error!("Failed to encode summary: {}", err),
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn read_config(path: &str) -> Option<String> {
    match std::fs::read_to_string(path) {
        Ok(json) => Some(json),
        Err(err) => {
            log::warn!("Could not read {}: {}, using defaults", path, err);
            None
        }
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // The simulation is driven by the host page on the web
}
