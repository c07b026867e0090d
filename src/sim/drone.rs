//! Support drones and the registry that owns them
//!
//! The registry holds every live drone plus the shared orbit phase, so slot
//! angles, target claims and separation all see the same population.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::bullet::{Bullet, BulletSource};
use super::enemy::Enemy;
use super::player::Player;
use crate::tuning::DroneConfig;
use crate::{angle_to, damping, direction, lerp, ms_to_ticks};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Drone {
    pub id: u32,
    pub pos: Vec2,
    /// Id of the enemy being engaged
    pub target: Option<u32>,
    /// Ticks until the next shot is allowed
    pub cooldown: u64,
}

impl Drone {
    pub fn new(id: u32, pos: Vec2) -> Self {
        Self {
            id,
            pos,
            target: None,
            cooldown: 0,
        }
    }
}

/// All live drones and their shared orbit phase
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DroneRegistry {
    drones: Vec<Drone>,
    /// Shared orbit phase (radians)
    pub orbit_angle: f32,
    next_id: u32,
}

impl DroneRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.drones.len()
    }

    pub fn is_empty(&self) -> bool {
        self.drones.is_empty()
    }

    pub fn drones(&self) -> &[Drone] {
        &self.drones
    }

    /// Grow or shrink the population to `count`; new drones appear at `spawn_at`
    pub fn resize(&mut self, count: usize, spawn_at: Vec2) {
        while self.drones.len() < count {
            self.next_id += 1;
            self.drones.push(Drone::new(self.next_id, spawn_at));
        }
        self.drones.truncate(count);
    }

    pub fn clear(&mut self) {
        self.drones.clear();
        self.orbit_angle = 0.0;
    }

    /// Advance the orbit phase and update every drone. Returns shots fired.
    pub fn update(
        &mut self,
        player: &Player,
        enemies: &[Enemy],
        config: &DroneConfig,
        bullets: &mut Vec<Bullet>,
        dt: f32,
    ) -> usize {
        self.orbit_angle = (self.orbit_angle + config.orbit_speed * dt) % std::f32::consts::TAU;

        let count = self.drones.len();
        let follow = 1.0 - damping(1.0 - config.smoothing, dt);
        let fire_ticks = ms_to_ticks(config.fire_rate_ms);
        let mut shots = 0;

        for i in 0..count {
            let claimed: Vec<u32> = self
                .drones
                .iter()
                .enumerate()
                .filter(|(j, _)| *j != i)
                .filter_map(|(_, d)| d.target)
                .collect();
            let others: Vec<Vec2> = self
                .drones
                .iter()
                .enumerate()
                .filter(|(j, _)| *j != i)
                .map(|(_, d)| d.pos)
                .collect();

            let drone = &mut self.drones[i];
            drone.cooldown = drone.cooldown.saturating_sub(1);

            let still_valid = drone
                .target
                .and_then(|id| enemies.iter().find(|e| e.id == id))
                .is_some_and(|e| {
                    !e.is_dead() && drone.pos.distance(e.pos) <= config.attack_range
                });
            if !still_valid {
                drone.target = acquire_target(drone.pos, enemies, &claimed, config.attack_range);
            }
            let target = drone.target.and_then(|id| enemies.iter().find(|e| e.id == id));

            let desired = match target {
                Some(enemy) => {
                    let away = drone.pos - enemy.pos;
                    let dir = if away.length_squared() > f32::EPSILON {
                        away.normalize()
                    } else {
                        direction(self.orbit_angle)
                    };
                    enemy.pos + dir * config.hover_distance
                }
                None => {
                    let slot = std::f32::consts::TAU * i as f32 / count as f32;
                    player.pos + direction(self.orbit_angle + slot) * config.orbit_radius
                }
            };
            drone.pos = lerp(drone.pos, desired, follow);

            let from_player = drone.pos - player.pos;
            let dist = from_player.length();
            if dist > config.max_distance {
                let excess = dist - config.max_distance;
                drone.pos -= from_player / dist * excess * config.leash_strength;
            }

            for other in &others {
                let apart = drone.pos - *other;
                let d = apart.length();
                if d < config.separation_distance {
                    let push = if d > f32::EPSILON { apart / d } else { direction(i as f32) };
                    let overlap = config.separation_distance - d;
                    drone.pos += push * overlap * config.separation_strength;
                }
            }

            if let Some(enemy) = target {
                let live = drone.pos.distance(enemy.pos);
                let in_band = (live - config.hover_distance).abs() <= config.hover_tolerance;
                if in_band && drone.cooldown == 0 {
                    let angle = angle_to(drone.pos, enemy.pos);
                    bullets.push(
                        Bullet::new(
                            drone.pos,
                            angle,
                            config.bullet_speed,
                            config.bullet_size,
                            config.bullet_damage,
                            BulletSource::Drone,
                        )
                        .with_knockback(config.knockback),
                    );
                    drone.cooldown = fire_ticks;
                    shots += 1;
                }
            }
        }
        shots
    }
}

/// Pick the nearest live enemy in range, preferring ones no sibling has claimed
fn acquire_target(from: Vec2, enemies: &[Enemy], claimed: &[u32], range: f32) -> Option<u32> {
    let in_range: Vec<(&Enemy, f32)> = enemies
        .iter()
        .filter(|e| !e.is_dead())
        .map(|e| (e, from.distance(e.pos)))
        .filter(|(_, d)| *d <= range)
        .collect();

    in_range
        .iter()
        .filter(|(e, _)| !claimed.contains(&e.id))
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .or_else(|| in_range.iter().min_by(|a, b| a.1.total_cmp(&b.1)))
        .map(|(e, _)| e.id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::SIM_DT;
    use crate::sim::enemy::EnemyKind;
    use crate::sim::weapon::{WeaponKind, WeaponState};
    use crate::tuning::{EnemyTable, PlayerConfig, WeaponTable};

    fn player_at(pos: Vec2) -> Player {
        let weapons = WeaponTable::default();
        Player::new(
            pos,
            &PlayerConfig::default(),
            WeaponState::new(WeaponKind::Pistol, weapons.pistol),
            vec![WeaponKind::Pistol],
        )
    }

    fn enemy_at(id: u32, pos: Vec2) -> Enemy {
        let table = EnemyTable::default();
        Enemy::spawn(id, EnemyKind::Normal, pos, &table.normal, 1.0, 6)
    }

    #[test]
    fn test_resize_grows_and_shrinks() {
        let mut registry = DroneRegistry::new();
        registry.resize(4, Vec2::ZERO);
        assert_eq!(registry.len(), 4);
        registry.resize(2, Vec2::ZERO);
        assert_eq!(registry.len(), 2);
        registry.resize(3, Vec2::ZERO);
        let ids: Vec<u32> = registry.drones().iter().map(|d| d.id).collect();
        assert_eq!(ids, vec![1, 2, 5]);
    }

    #[test]
    fn test_idle_drones_orbit_player() {
        let config = DroneConfig::default();
        let player = player_at(Vec2::new(640.0, 400.0));
        let mut registry = DroneRegistry::new();
        registry.resize(4, player.pos);
        let mut bullets = Vec::new();
        for _ in 0..600 {
            registry.update(&player, &[], &config, &mut bullets, SIM_DT);
        }
        assert!(bullets.is_empty());
        for drone in registry.drones() {
            let d = drone.pos.distance(player.pos);
            assert!(d > 20.0 && d < config.orbit_radius + 40.0, "drone at distance {d}");
        }
    }

    #[test]
    fn test_drones_prefer_unclaimed_targets() {
        let player = player_at(Vec2::new(640.0, 400.0));
        let enemies = vec![
            enemy_at(10, Vec2::new(640.0, 250.0)),
            enemy_at(11, Vec2::new(700.0, 260.0)),
        ];
        let claimed = [10];
        assert_eq!(acquire_target(player.pos, &enemies, &claimed, 300.0), Some(11));
        // Everything claimed: share the nearest
        let claimed = [10, 11];
        assert_eq!(acquire_target(player.pos, &enemies, &claimed, 300.0), Some(10));
        assert_eq!(acquire_target(player.pos, &enemies, &[], 50.0), None);
    }

    #[test]
    fn test_leash_pulls_stray_drone_back() {
        let player = player_at(Vec2::new(640.0, 400.0));
        let stray = player.pos + Vec2::new(1000.0, 0.0);
        let step = |config: &DroneConfig| {
            let mut registry = DroneRegistry::new();
            registry.resize(1, stray);
            registry.update(&player, &[], config, &mut Vec::new(), SIM_DT);
            registry.drones()[0].pos.distance(player.pos)
        };

        let loose = step(&DroneConfig {
            leash_strength: 0.0,
            ..DroneConfig::default()
        });
        let leashed = step(&DroneConfig::default());
        assert!(loose > DroneConfig::default().max_distance);
        assert!(leashed < loose);
    }

    #[test]
    fn test_crowded_drones_spread_apart() {
        // No smoothing: only separation moves them this tick
        let config = DroneConfig {
            smoothing: 0.0,
            ..DroneConfig::default()
        };
        let player = player_at(Vec2::new(640.0, 400.0));
        let mut registry = DroneRegistry::new();
        registry.resize(2, Vec2::new(640.0, 300.0));
        registry.drones[1].pos.x += 5.0;

        registry.update(&player, &[], &config, &mut Vec::new(), SIM_DT);

        let drones = registry.drones();
        assert!(drones[0].pos.x < 640.0);
        assert!(drones[1].pos.x > 645.0);
        assert!(drones[0].pos.distance(drones[1].pos) > 5.0);
    }

    #[test]
    fn test_engaged_drone_hovers_and_fires() {
        let config = DroneConfig::default();
        let player = player_at(Vec2::new(640.0, 400.0));
        let enemies = vec![enemy_at(7, Vec2::new(640.0, 250.0))];
        let mut registry = DroneRegistry::new();
        registry.resize(1, player.pos);
        let mut bullets = Vec::new();
        let mut shots = 0;
        for _ in 0..600 {
            shots += registry.update(&player, &enemies, &config, &mut bullets, SIM_DT);
        }
        assert_eq!(registry.drones()[0].target, Some(7));
        assert!(shots > 0);
        assert!(bullets.iter().all(|b| b.source == BulletSource::Drone));
    }
}
