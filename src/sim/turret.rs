//! Automated turrets guarding the defense line

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::bullet::{Bullet, BulletSource};
use super::enemy::Enemy;
use crate::tuning::TurretConfig;
use crate::{angle_to, direction, distance, ms_to_ticks};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Turret {
    pub pos: Vec2,
    pub angle: f32,
    /// Id of the enemy currently tracked
    pub target: Option<u32>,
    /// Ticks until the next shot is allowed
    pub cooldown: u64,
}

impl Turret {
    pub fn new(pos: Vec2) -> Self {
        Self {
            pos,
            angle: -std::f32::consts::FRAC_PI_2,
            target: None,
            cooldown: 0,
        }
    }

    /// Track the nearest in-range enemy and fire when the cooldown allows
    pub fn update(
        &mut self,
        enemies: &[Enemy],
        config: &TurretConfig,
        bullets: &mut Vec<Bullet>,
    ) -> bool {
        self.cooldown = self.cooldown.saturating_sub(1);

        let nearest = enemies
            .iter()
            .filter(|e| !e.is_dead())
            .map(|e| (e, distance(self.pos, e.pos)))
            .filter(|(_, d)| *d < config.range)
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(e, _)| e);

        let Some(enemy) = nearest else {
            self.target = None;
            return false;
        };
        self.target = Some(enemy.id);
        self.angle = angle_to(self.pos, enemy.pos);

        if self.cooldown > 0 {
            return false;
        }
        let muzzle = self.pos + direction(self.angle) * config.barrel_length;
        bullets.push(
            Bullet::new(
                muzzle,
                self.angle,
                config.bullet_speed,
                config.bullet_size,
                config.damage,
                BulletSource::Turret,
            )
            .with_knockback(config.knockback),
        );
        self.cooldown = ms_to_ticks(config.fire_rate_ms);
        true
    }
}
