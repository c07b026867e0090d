//! Projectiles fired by the player, turrets and drones

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::weapon::WeaponKind;
use crate::direction;
use crate::tuning::ArenaConfig;

/// Who fired a bullet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BulletSource {
    Weapon(WeaponKind),
    Turret,
    Drone,
}

/// A bullet in flight
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bullet {
    pub origin: Vec2,
    pub pos: Vec2,
    pub vel: Vec2,
    pub size: f32,
    pub damage: f32,
    /// Travel budget; `None` = until it leaves the playfield
    pub range: Option<f32>,
    pub source: BulletSource,
    /// Direction of travel, also used as knockback direction
    pub angle: f32,
    pub knockback: f32,
    pub ignites: bool,
}

impl Bullet {
    pub fn new(
        origin: Vec2,
        angle: f32,
        speed: f32,
        size: f32,
        damage: f32,
        source: BulletSource,
    ) -> Self {
        Self {
            origin,
            pos: origin,
            vel: direction(angle) * speed,
            size,
            damage,
            range: None,
            source,
            angle,
            knockback: 0.0,
            ignites: false,
        }
    }

    pub fn with_range(mut self, range: Option<f32>) -> Self {
        self.range = range;
        self
    }

    pub fn with_knockback(mut self, knockback: f32) -> Self {
        self.knockback = knockback;
        self
    }

    pub fn igniting(mut self, ignites: bool) -> Self {
        self.ignites = ignites;
        self
    }

    pub fn update(&mut self, dt: f32) {
        self.pos += self.vel * dt;
    }

    pub fn traveled(&self) -> f32 {
        (self.pos - self.origin).length()
    }

    /// Out of range or outside the playfield
    pub fn is_expired(&self, arena: &ArenaConfig) -> bool {
        let out_of_range = self.range.is_some_and(|range| self.traveled() >= range);
        out_of_range || !arena.contains(self.pos)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::SIM_DT;

    #[test]
    fn test_bullet_expires_at_range() {
        let arena = ArenaConfig::default();
        let origin = Vec2::new(100.0, 100.0);
        let mut bullet =
            Bullet::new(origin, 0.0, 600.0, 5.0, 10.0, BulletSource::Turret).with_range(Some(50.0));
        bullet.update(SIM_DT * 4.0);
        assert!(!bullet.is_expired(&arena));
        bullet.update(SIM_DT * 2.0);
        assert!(bullet.is_expired(&arena));
    }

    #[test]
    fn test_unbounded_bullet_expires_off_screen() {
        let arena = ArenaConfig::default();
        let angle = std::f32::consts::PI;
        let mut bullet =
            Bullet::new(Vec2::new(10.0, 10.0), angle, 600.0, 5.0, 10.0, BulletSource::Drone);
        assert!(!bullet.is_expired(&arena));
        bullet.update(SIM_DT);
        assert!(bullet.is_expired(&arena));
    }
}
