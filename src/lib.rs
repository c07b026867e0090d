//! Siege Line - A wave-survival defense game engine
//!
//! Core modules:
//! - `sim`: Fixed-tick simulation (entities, combat, waves, game phases)
//! - `engine`: Host facade (input events, frame pacing, sound dispatch)
//! - `tuning`: Data-driven game balance
//! - `settings`: Player preferences
//! - `profile`: Profile gateway contract and local store
//! - `audio`: Sound trigger contract
//! - `autopilot`: Demo bot that plays the game

pub mod audio;
pub mod autopilot;
pub mod engine;
pub mod profile;
pub mod settings;
pub mod sim;
pub mod tuning;

pub use engine::{Engine, InputEvent, Key};
pub use settings::Settings;
pub use tuning::GameConfig;

use glam::Vec2;

/// Simulation timing constants
pub mod consts {
    /// Simulation tick rate (ticks per second)
    pub const TICK_RATE: u64 = 60;
    /// Fixed simulation timestep
    pub const SIM_DT: f32 = 1.0 / TICK_RATE as f32;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;
    /// Largest real frame delta accepted by the accumulator (seconds)
    pub const MAX_FRAME_DT: f32 = 0.1;
}

/// Convert a millisecond duration to whole simulation ticks.
/// Rounds to the nearest tick; non-zero input is at least 1 tick.
#[inline]
pub fn ms_to_ticks(ms: u64) -> u64 {
    if ms == 0 {
        return 0;
    }
    ((ms * consts::TICK_RATE + 500) / 1000).max(1)
}

/// Convert simulation ticks to milliseconds
#[inline]
pub fn ticks_to_ms(ticks: u64) -> u64 {
    ticks * 1000 / consts::TICK_RATE
}

/// Scale a per-tick damping factor to an arbitrary timestep
#[inline]
pub fn damping(factor_per_tick: f32, dt: f32) -> f32 {
    factor_per_tick.powf(dt / consts::SIM_DT)
}

/// Euclidean distance between two points
#[inline]
pub fn distance(a: Vec2, b: Vec2) -> f32 {
    (b - a).length()
}

/// Angle (radians) of the direction from `from` toward `to`
#[inline]
pub fn angle_to(from: Vec2, to: Vec2) -> f32 {
    let d = to - from;
    d.y.atan2(d.x)
}

/// Unit vector for an angle
#[inline]
pub fn direction(angle: f32) -> Vec2 {
    Vec2::new(angle.cos(), angle.sin())
}

/// Linear interpolation between two points
#[inline]
pub fn lerp(a: Vec2, b: Vec2, t: f32) -> Vec2 {
    a + (b - a) * t
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI;

    #[test]
    fn test_ms_to_ticks() {
        assert_eq!(ms_to_ticks(0), 0);
        assert_eq!(ms_to_ticks(1000), 60);
        assert_eq!(ms_to_ticks(200), 12);
        // Sub-tick durations still take a tick
        assert_eq!(ms_to_ticks(5), 1);
        assert_eq!(ticks_to_ms(60), 1000);
    }

    #[test]
    fn test_angle_to() {
        let a = Vec2::ZERO;
        assert!((angle_to(a, Vec2::new(1.0, 0.0))).abs() < 1e-6);
        assert!((angle_to(a, Vec2::new(0.0, 1.0)) - PI / 2.0).abs() < 1e-6);
        assert!((angle_to(a, Vec2::new(-1.0, 0.0)).abs() - PI).abs() < 1e-6);
    }

    #[test]
    fn test_damping_matches_per_tick_factor() {
        assert!((damping(0.9, consts::SIM_DT) - 0.9).abs() < 1e-6);
        assert!((damping(0.9, consts::SIM_DT * 2.0) - 0.81).abs() < 1e-5);
    }

    #[test]
    fn test_lerp_and_distance() {
        let p = lerp(Vec2::ZERO, Vec2::new(10.0, 0.0), 0.5);
        assert_eq!(p, Vec2::new(5.0, 0.0));
        assert!((distance(Vec2::ZERO, Vec2::new(3.0, 4.0)) - 5.0).abs() < 1e-6);
    }
}
