//! Wave spawner: cadence, composition and escalation
//!
//! Three tick timers drive it: the wave cadence, the spawn-count escalation
//! and the enemy scaling escalation. Escalation only ever goes up.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::enemy::EnemyKind;
use super::timer::IntervalTimer;
use crate::tuning::{ArenaConfig, SpawnWeights, SpawnerConfig};

/// What happened to the spawner this tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SpawnerTick {
    pub spawn_wave: bool,
    pub count_raised: bool,
    pub scaling_raised: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WaveSpawner {
    wave_timer: IntervalTimer,
    count_timer: IntervalTimer,
    scaling_timer: IntervalTimer,
    /// Enemies per wave
    pub spawn_count: u32,
    /// Multiplier applied to new enemies' speed and health
    pub scaling: f32,
    pub waves_spawned: u32,
}

impl WaveSpawner {
    pub fn new(config: &SpawnerConfig) -> Self {
        Self {
            wave_timer: IntervalTimer::from_ms(config.interval_ms),
            count_timer: IntervalTimer::from_ms(config.count_step_ms),
            scaling_timer: IntervalTimer::from_ms(config.scaling_step_ms),
            spawn_count: config.initial_count,
            scaling: 1.0,
            waves_spawned: 0,
        }
    }

    /// Advance all spawner timers by one tick
    pub fn update(&mut self, config: &SpawnerConfig) -> SpawnerTick {
        let mut result = SpawnerTick::default();
        if self.count_timer.tick() && self.spawn_count < config.max_count {
            self.spawn_count += 1;
            result.count_raised = true;
            log::info!("Wave size raised to {}", self.spawn_count);
        }
        if self.scaling_timer.tick() {
            self.scaling *= config.scaling_multiplier;
            result.scaling_raised = true;
            log::info!("Enemy scaling raised to {:.2}", self.scaling);
        }
        if self.wave_timer.tick() {
            self.waves_spawned += 1;
            result.spawn_wave = true;
        }
        result
    }

    /// Choose types and positions for one wave
    pub fn plan_wave<R: Rng>(
        &self,
        config: &SpawnerConfig,
        arena: &ArenaConfig,
        rng: &mut R,
    ) -> Vec<(EnemyKind, Vec2)> {
        let (min_x, max_x) = arena.spawn_band();
        let mut used_cells: Vec<i32> = Vec::with_capacity(self.spawn_count as usize);
        let cell_of = |x: f32| (x / config.cell_size.max(1.0)).floor() as i32;

        (0..self.spawn_count)
            .map(|_| {
                let kind = pick_kind(&config.weights, rng.random::<f32>());
                let mut x = random_x(rng, min_x, max_x);
                for _ in 0..config.placement_retries {
                    if !used_cells.contains(&cell_of(x)) {
                        break;
                    }
                    x = random_x(rng, min_x, max_x);
                }
                used_cells.push(cell_of(x));
                (kind, Vec2::new(x, arena.spawn_y))
            })
            .collect()
    }
}

fn random_x<R: Rng>(rng: &mut R, min_x: f32, max_x: f32) -> f32 {
    if max_x > min_x {
        rng.random_range(min_x..max_x)
    } else {
        min_x
    }
}

/// Weighted draw from a uniform sample in [0, 1)
pub fn pick_kind(weights: &SpawnWeights, roll: f32) -> EnemyKind {
    if roll < weights.normal {
        EnemyKind::Normal
    } else if roll < weights.normal + weights.fast {
        EnemyKind::Fast
    } else {
        EnemyKind::Tank
    }
}
