//! The player: movement, recoil, firing, reloading and health

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::bullet::{Bullet, BulletSource};
use super::weapon::{WeaponKind, WeaponState, pellet_angles};
use crate::tuning::{ArenaConfig, PlayerConfig, WeaponTable};
use crate::{angle_to, damping, direction, ms_to_ticks};

/// Frames in the movement animation cycle
pub const ANIMATION_FRAMES: u8 = 4;

/// Held movement keys for one tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveAxes {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
}

impl MoveAxes {
    /// Unit (or zero) direction from the held keys
    pub fn vector(&self) -> Vec2 {
        let mut v = Vec2::ZERO;
        if self.up {
            v.y -= 1.0;
        }
        if self.down {
            v.y += 1.0;
        }
        if self.left {
            v.x -= 1.0;
        }
        if self.right {
            v.x += 1.0;
        }
        v.normalize_or_zero()
    }
}

/// Which sprite set the player shows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Facing {
    /// Aiming downward, toward the camera
    #[default]
    Front,
    /// Aiming upward, toward the enemy side
    Back,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub pos: Vec2,
    /// Movement velocity from input (px/s)
    pub vel: Vec2,
    /// Decaying recoil velocity (px/s)
    pub recoil: Vec2,
    pub radius: f32,
    pub speed: f32,
    /// Multiplier from passive skills
    pub speed_modifier: f32,
    /// Reload duration multiplier from passive skills
    pub reload_modifier: f32,
    pub health: f32,
    pub max_health: f32,
    pub weapon: WeaponState,
    /// Weapons the run-start profile allows switching to
    pub owned_weapons: Vec<WeaponKind>,
    pub aim: Vec2,
    pub facing: Facing,
    pub moving: bool,
    pub anim_frame: u8,
    anim_ticks: u64,
    frame_ticks: u64,
    invincible_ticks: u64,
    invincibility_period: u64,
    /// Ticks since damage was last taken (saturating)
    pub ticks_since_damage: u64,
    recoil_damping: f32,
    muzzle_offset: f32,
}

impl Player {
    pub fn new(
        pos: Vec2,
        config: &PlayerConfig,
        weapon: WeaponState,
        owned_weapons: Vec<WeaponKind>,
    ) -> Self {
        Self {
            pos,
            vel: Vec2::ZERO,
            recoil: Vec2::ZERO,
            radius: config.radius,
            speed: config.speed,
            speed_modifier: 1.0,
            reload_modifier: 1.0,
            health: config.max_health,
            max_health: config.max_health,
            weapon,
            owned_weapons,
            aim: pos - Vec2::Y,
            facing: Facing::Back,
            moving: false,
            anim_frame: 0,
            anim_ticks: 0,
            frame_ticks: ms_to_ticks(config.frame_ms).max(1),
            invincible_ticks: 0,
            invincibility_period: ms_to_ticks(config.invincibility_ms),
            ticks_since_damage: u64::MAX,
            recoil_damping: config.recoil_damping,
            muzzle_offset: config.muzzle_offset,
        }
    }

    /// Move for one tick and advance per-tick counters
    pub fn update(&mut self, axes: MoveAxes, arena: &ArenaConfig, dt: f32) {
        self.invincible_ticks = self.invincible_ticks.saturating_sub(1);
        self.weapon.cooldown = self.weapon.cooldown.saturating_sub(1);
        self.ticks_since_damage = self.ticks_since_damage.saturating_add(1);

        self.vel = axes.vector() * self.speed * self.speed_modifier;
        self.recoil *= damping(self.recoil_damping, dt);
        if self.recoil.length_squared() < 0.01 {
            self.recoil = Vec2::ZERO;
        }

        self.pos += (self.vel + self.recoil) * dt;
        self.pos.x = self.pos.x.clamp(self.radius, (arena.width - self.radius).max(self.radius));
        self.pos.y = self.pos.y.clamp(self.radius, (arena.height - self.radius).max(self.radius));

        let moving = self.vel != Vec2::ZERO;
        if moving && !self.moving {
            // Restart the cycle the instant movement begins
            self.anim_frame = 0;
            self.anim_ticks = 0;
        } else if moving {
            self.anim_ticks += 1;
            if self.anim_ticks >= self.frame_ticks {
                self.anim_ticks = 0;
                self.anim_frame = (self.anim_frame + 1) % ANIMATION_FRAMES;
            }
        } else {
            self.anim_frame = 0;
        }
        self.moving = moving;
    }

    /// Point the gun at a world position
    pub fn aim_at(&mut self, point: Vec2) {
        self.aim = point;
        self.facing = if point.y < self.pos.y { Facing::Back } else { Facing::Front };
    }

    pub fn aim_angle(&self) -> f32 {
        angle_to(self.pos, self.aim)
    }

    /// Where bullets leave the gun for the given aim angle
    pub fn muzzle(&self, angle: f32) -> Vec2 {
        self.pos + direction(angle + std::f32::consts::FRAC_PI_2) * self.muzzle_offset
    }

    /// Try to shoot toward `aim_point`, pushing new bullets. Returns whether a shot was fired.
    pub fn attempt_fire(&mut self, aim_point: Vec2, bullets: &mut Vec<Bullet>) -> bool {
        let spec = self.weapon.spec;
        if !spec.unlocked || self.weapon.reloading {
            return false;
        }
        if self.weapon.ammo == 0 {
            self.start_reload();
            return false;
        }
        if self.weapon.cooldown > 0 {
            return false;
        }

        self.aim_at(aim_point);
        let angle = angle_to(self.pos, aim_point);
        self.recoil -= direction(angle) * spec.recoil;
        self.weapon.ammo -= 1;

        let muzzle = self.muzzle(angle);
        let source = BulletSource::Weapon(self.weapon.kind);
        for pellet in pellet_angles(angle, spec.pellets, spec.spread) {
            bullets.push(
                Bullet::new(
                    muzzle,
                    pellet,
                    spec.bullet_speed,
                    spec.bullet_size,
                    spec.damage,
                    source,
                )
                .with_range(spec.range)
                    .with_knockback(spec.recoil)
                    .igniting(spec.ignites),
            );
        }

        self.weapon.cooldown = self.weapon.fire_interval_ticks();
        if self.weapon.ammo == 0 {
            self.start_reload();
        }
        true
    }

    /// Begin reloading. No-op if already reloading or the magazine is full.
    pub fn start_reload(&mut self) -> bool {
        if self.weapon.reloading || self.weapon.is_full() {
            return false;
        }
        let scaled = self.weapon.spec.reload_ms as f32 * self.reload_modifier;
        let effective_ms = scaled.round() as u64;
        let total = ms_to_ticks(effective_ms);
        self.weapon.reloading = true;
        self.weapon.reload_total = total;
        self.weapon.reload_remaining = total;
        true
    }

    /// Advance the reload by one tick; returns true on the tick it completes
    pub fn update_reload(&mut self) -> bool {
        if !self.weapon.reloading {
            return false;
        }
        self.weapon.reload_remaining = self.weapon.reload_remaining.saturating_sub(1);
        if self.weapon.reload_remaining == 0 {
            self.weapon.refill();
            return true;
        }
        false
    }

    pub fn can_take_damage(&self) -> bool {
        self.invincible_ticks == 0
    }

    /// Apply damage unless invincible; returns true if this hit was lethal
    pub fn take_damage(&mut self, amount: f32) -> bool {
        if !self.can_take_damage() {
            return false;
        }
        self.health = (self.health - amount.max(0.0)).max(0.0);
        self.invincible_ticks = self.invincibility_period;
        self.ticks_since_damage = 0;
        self.health <= 0.0
    }

    /// Heal up to max health; returns the amount actually restored
    pub fn heal(&mut self, amount: f32) -> f32 {
        let before = self.health;
        self.health = (self.health + amount.max(0.0)).min(self.max_health);
        self.health - before
    }

    pub fn is_hurt(&self) -> bool {
        self.health < self.max_health
    }

    pub fn is_dead(&self) -> bool {
        self.health <= 0.0
    }

    pub fn is_invincible(&self) -> bool {
        !self.can_take_damage()
    }

    /// Equip another owned weapon with a fresh magazine
    pub fn switch_weapon(&mut self, kind: WeaponKind, weapons: &WeaponTable) -> bool {
        if !self.owned_weapons.contains(&kind) {
            log::warn!("Attempted to switch to unowned weapon: {}", kind.name());
            return false;
        }
        let spec = weapons.get(kind);
        if !spec.unlocked {
            log::warn!("Attempted to switch to locked weapon: {}", kind.name());
            return false;
        }
        if self.weapon.kind == kind {
            return false;
        }
        self.weapon = WeaponState::new(kind, *spec);
        log::info!("Switched weapon to: {}", kind.name());
        true
    }

    pub fn switch_weapon_by_name(&mut self, name: &str, weapons: &WeaponTable) -> bool {
        match WeaponKind::from_name(name) {
            Some(kind) => self.switch_weapon(kind, weapons),
            None => {
                log::warn!("Attempted to switch to unknown weapon: {}", name);
                false
            }
        }
    }
}
