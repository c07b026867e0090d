//! Screen shake: a decaying random offset for the render transform

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::ms_to_ticks;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScreenShake {
    pub offset: Vec2,
    intensity: f32,
    duration_ticks: u64,
    remaining_ticks: u64,
}

impl ScreenShake {
    /// Start (or restart) a shake pulse
    pub fn trigger(&mut self, intensity: f32, duration_ms: u64) {
        self.intensity = intensity;
        self.duration_ticks = ms_to_ticks(duration_ms);
        self.remaining_ticks = self.duration_ticks;
    }

    pub fn is_active(&self) -> bool {
        self.remaining_ticks > 0
    }

    /// Roll a new offset, shrinking linearly until the pulse ends
    pub fn update<R: Rng>(&mut self, rng: &mut R) {
        if self.remaining_ticks == 0 {
            self.offset = Vec2::ZERO;
            return;
        }
        let progress = self.remaining_ticks as f32 / self.duration_ticks.max(1) as f32;
        let amplitude = self.intensity * progress * 2.0;
        self.offset = Vec2::new(
            rng.random_range(-1.0f32..=1.0) * amplitude,
            rng.random_range(-1.0f32..=1.0) * amplitude,
        );
        self.remaining_ticks -= 1;
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_shake_decays_to_zero() {
        let mut rng = Pcg32::seed_from_u64(3);
        let mut shake = ScreenShake::default();
        shake.trigger(5.0, 200);
        assert!(shake.is_active());
        let ticks = ms_to_ticks(200);
        for _ in 0..ticks {
            shake.update(&mut rng);
            assert!(shake.offset.x.abs() <= 10.0 && shake.offset.y.abs() <= 10.0);
        }
        assert!(!shake.is_active());
        shake.update(&mut rng);
        assert_eq!(shake.offset, Vec2::ZERO);
    }

    #[test]
    fn test_retrigger_restarts_pulse() {
        let mut rng = Pcg32::seed_from_u64(3);
        let mut shake = ScreenShake::default();
        shake.trigger(5.0, 100);
        shake.update(&mut rng);
        shake.trigger(5.0, 100);
        assert_eq!(shake.remaining_ticks, ms_to_ticks(100));
    }
}
