//! Enemies: movement behaviors, knockback, damage and the base-damage countdown

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::collision::{circles_overlap, separation_normal};
use super::player::Player;
use crate::consts::SIM_DT;
use crate::{damping, direction};
use crate::tuning::{ArenaConfig, CombatConfig, EnemySpec};

/// Enemy archetypes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnemyKind {
    Normal,
    Fast,
    Tank,
}

impl EnemyKind {
    pub const ALL: [EnemyKind; 3] = [EnemyKind::Normal, EnemyKind::Fast, EnemyKind::Tank];

    pub fn name(self) -> &'static str {
        match self {
            EnemyKind::Normal => "normal",
            EnemyKind::Fast => "fast",
            EnemyKind::Tank => "tank",
        }
    }
}

/// Movement behavior tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Behavior {
    /// Walk straight down until the defense line, then halt there
    Ground,
    /// Pursue the player, never crossing the defense line
    Chase,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Enemy {
    pub id: u32,
    pub kind: EnemyKind,
    /// Center position
    pub pos: Vec2,
    /// Knockback/chase velocity (px/s)
    pub vel: Vec2,
    pub size: f32,
    pub speed: f32,
    pub health: f32,
    pub max_health: f32,
    pub damage: f32,
    pub score: u32,
    pub knockback_resistance: f32,
    pub behavior: Behavior,
    pub max_knockback_speed: f32,
    /// Halted at the defense line
    pub stopped: bool,
    /// Ticks until the next base-damage pulse; `Some` only while halted
    pub base_damage_countdown: Option<u64>,
    pub flash_ticks: u64,
    flash_period: u64,
    pub burn_ticks: u64,
    /// Kill reward already granted
    pub credited: bool,
    pub facing_right: bool,
}

impl Enemy {
    /// Create an enemy with stats scaled by the current wave scaling factor
    pub fn spawn(
        id: u32,
        kind: EnemyKind,
        pos: Vec2,
        spec: &EnemySpec,
        scaling: f32,
        flash_period: u64,
    ) -> Self {
        let health = spec.health * scaling;
        Self {
            id,
            kind,
            pos,
            vel: Vec2::ZERO,
            size: spec.size,
            speed: spec.speed * scaling,
            health,
            max_health: health,
            damage: spec.damage,
            score: spec.score,
            knockback_resistance: spec.knockback_resistance,
            behavior: spec.behavior,
            max_knockback_speed: spec.max_knockback_speed,
            stopped: false,
            base_damage_countdown: None,
            flash_ticks: 0,
            flash_period,
            burn_ticks: 0,
            credited: false,
            facing_right: true,
        }
    }

    pub fn half_size(&self) -> f32 {
        self.size / 2.0
    }

    pub fn is_dead(&self) -> bool {
        self.health <= 0.0
    }

    pub fn is_burning(&self) -> bool {
        self.burn_ticks > 0
    }

    pub fn is_flashing(&self) -> bool {
        self.flash_ticks > 0
    }

    /// Whether the enemy overlaps the player's circle
    pub fn touches(&self, player: &Player) -> bool {
        circles_overlap(self.pos, self.half_size(), player.pos, player.radius)
    }

    /// Move for one tick. Separates from the player on overlap and returns
    /// whether this enemy is touching the player (eligible for contact damage).
    pub fn update(
        &mut self,
        player: &mut Player,
        arena: &ArenaConfig,
        combat: &CombatConfig,
        dt: f32,
    ) -> bool {
        self.flash_ticks = self.flash_ticks.saturating_sub(1);
        self.burn_ticks = self.burn_ticks.saturating_sub(1);

        self.pos += self.vel * dt;
        self.vel *= damping(combat.enemy_friction, dt);
        self.snap_velocity(combat.knockback_snap);

        let max_y = arena.line_y() - self.half_size();
        match self.behavior {
            Behavior::Ground => self.move_ground(max_y, dt),
            Behavior::Chase => self.chase(player, dt),
        }

        self.clamp_to_field(arena);

        if self.kind == EnemyKind::Fast {
            self.facing_right = player.pos.x > self.pos.x;
        } else if self.vel.x.abs() > 30.0 {
            self.facing_right = self.vel.x > 0.0;
        }

        if !self.touches(player) {
            return false;
        }
        self.separate_from(player, combat);
        // The push may not carry the enemy past the line or the side walls
        self.clamp_to_field(arena);
        true
    }

    fn clamp_to_field(&mut self, arena: &ArenaConfig) {
        let half = self.half_size();
        let max_y = arena.line_y() - half;
        self.pos.x = self.pos.x.clamp(half, (arena.width - half).max(half));
        if self.pos.y > max_y {
            self.pos.y = max_y;
            self.vel.y = self.vel.y.min(0.0);
        }
    }

    fn move_ground(&mut self, max_y: f32, dt: f32) {
        if !self.stopped {
            self.pos.y += self.speed * dt;
        }
        if self.pos.y >= max_y {
            self.pos.y = max_y;
            self.stopped = true;
        } else if self.stopped && self.pos.y < max_y - 0.5 {
            // Knocked back above the line: walk again
            self.stopped = false;
            self.base_damage_countdown = None;
        }
    }

    fn chase(&mut self, player: &Player, dt: f32) {
        let to_player = player.pos - self.pos;
        let dist = to_player.length();
        if dist < player.radius + self.half_size() {
            // Already in contact: ease off instead of piling in
            self.vel *= damping(0.8, dt);
            return;
        }
        if dist > 0.0 {
            self.vel += to_player / dist * self.speed * 0.1 * (dt / SIM_DT);
            self.vel = self.vel.clamp_length_max(self.speed);
        }
    }

    /// Resolve overlap with the player, moving both apart along the contact normal
    fn separate_from(&mut self, player: &mut Player, combat: &CombatConfig) {
        let dist = self.pos.distance(player.pos);
        let normal = separation_normal(player.pos, self.pos);
        let target = player.radius + self.half_size() + combat.contact_margin;
        let overlap = (target - dist).max(0.0);
        self.pos += normal * overlap * (1.0 - combat.player_push_share);
        player.pos -= normal * overlap * combat.player_push_share;
    }

    fn snap_velocity(&mut self, snap: f32) {
        if self.vel.x.abs() < snap {
            self.vel.x = 0.0;
        }
        if self.vel.y.abs() < snap {
            self.vel.y = 0.0;
        }
    }

    /// Add a knockback impulse (attenuated by resistance, capped, residue snapped)
    pub fn apply_knockback(&mut self, force: f32, angle: f32, snap: f32) {
        let effective = force * (1.0 - self.knockback_resistance);
        if effective <= 0.0 {
            return;
        }
        self.vel += direction(angle) * effective;
        self.vel = self.vel.clamp_length_max(self.max_knockback_speed);
        self.snap_velocity(snap);
    }

    /// Apply damage and knockback; returns true if health dropped to zero or below
    pub fn take_damage(&mut self, damage: f32, knockback: f32, angle: f32, snap: f32) -> bool {
        self.health -= damage.max(0.0);
        self.flash_ticks = self.flash_period;
        self.apply_knockback(knockback, angle, snap);
        self.is_dead()
    }

    /// Set the enemy on fire. Burning deals its damage once on ignition.
    pub fn ignite(&mut self, duration_ticks: u64, initial_damage: f32) -> bool {
        if !self.is_burning() {
            self.burn_ticks = duration_ticks.max(1);
            self.health -= initial_damage.max(0.0);
        }
        self.is_dead()
    }

    /// Advance the base-damage countdown. Returns true on ticks where the
    /// enemy damages the base. The countdown exists only while halted.
    pub fn tick_base_damage(&mut self, period: u64) -> bool {
        if !self.stopped || self.is_dead() {
            self.base_damage_countdown = None;
            return false;
        }
        let remaining = self.base_damage_countdown.unwrap_or(period).saturating_sub(1);
        if remaining == 0 {
            self.base_damage_countdown = Some(period);
            true
        } else {
            self.base_damage_countdown = Some(remaining);
            false
        }
    }

    /// Claim the kill reward; true only the first time
    pub fn claim_credit(&mut self) -> bool {
        if self.credited {
            return false;
        }
        self.credited = true;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::weapon::{WeaponKind, WeaponState};
    use crate::tuning::{EnemyTable, PlayerConfig, WeaponTable};
    use proptest::prelude::*;

    fn far_player() -> Player {
        let weapons = WeaponTable::default();
        Player::new(
            Vec2::new(100.0, 700.0),
            &PlayerConfig::default(),
            WeaponState::new(WeaponKind::Pistol, weapons.pistol),
            vec![WeaponKind::Pistol],
        )
    }

    fn enemy(kind: EnemyKind, pos: Vec2) -> Enemy {
        let table = EnemyTable::default();
        Enemy::spawn(1, kind, pos, table.get(kind), 1.0, 6)
    }

    #[test]
    fn test_ground_enemy_halts_at_line() {
        let arena = ArenaConfig::default();
        let combat = CombatConfig::default();
        let mut player = far_player();
        let mut e = enemy(EnemyKind::Normal, Vec2::new(640.0, arena.line_y() - 40.0));
        for _ in 0..120 {
            e.update(&mut player, &arena, &combat, SIM_DT);
        }
        assert!(e.stopped);
        assert!((e.pos.y - (arena.line_y() - e.half_size())).abs() < 1e-3);
    }

    #[test]
    fn test_knockback_above_line_resumes_walking() {
        let arena = ArenaConfig::default();
        let combat = CombatConfig::default();
        let mut player = far_player();
        let mut e = enemy(EnemyKind::Normal, Vec2::new(640.0, arena.line_y() - 32.0));
        e.update(&mut player, &arena, &combat, SIM_DT);
        assert!(e.stopped);
        e.tick_base_damage(12);
        assert!(e.base_damage_countdown.is_some());

        e.apply_knockback(600.0, -std::f32::consts::FRAC_PI_2, combat.knockback_snap);
        e.update(&mut player, &arena, &combat, SIM_DT);
        assert!(!e.stopped);
        assert!(e.base_damage_countdown.is_none());
    }

    #[test]
    fn test_chaser_never_crosses_line() {
        let arena = ArenaConfig::default();
        let combat = CombatConfig::default();
        let mut player = far_player();
        player.pos = Vec2::new(640.0, 710.0);
        let mut e = enemy(EnemyKind::Fast, Vec2::new(640.0, 400.0));
        for _ in 0..600 {
            e.update(&mut player, &arena, &combat, SIM_DT);
            assert!(e.pos.y <= arena.line_y() - e.half_size() + 1e-3);
        }
    }

    #[test]
    fn test_contact_separates_and_reports_touch() {
        let arena = ArenaConfig::default();
        let combat = CombatConfig::default();
        let mut player = far_player();
        player.pos = Vec2::new(640.0, 300.0);
        let mut e = enemy(EnemyKind::Tank, Vec2::new(640.0, 300.0));
        let start = player.pos;
        assert!(e.update(&mut player, &arena, &combat, SIM_DT));
        assert!(e.pos.distance(player.pos) >= player.radius + e.half_size());
        // Tank stepped down first, so the push is purely vertical
        assert_eq!(e.pos.x, 640.0);
        assert!(player.pos.y < start.y);
        assert!(e.pos.y > start.y);
    }

    #[test]
    fn test_knockback_respects_resistance_and_cap() {
        let mut tank = enemy(EnemyKind::Tank, Vec2::new(300.0, 100.0));
        tank.apply_knockback(100.0, 0.0, 6.0);
        assert!((tank.vel.x - 20.0).abs() < 1e-3);

        let mut normal = enemy(EnemyKind::Normal, Vec2::new(300.0, 100.0));
        normal.apply_knockback(10_000.0, 0.0, 6.0);
        assert!((normal.vel.length() - normal.max_knockback_speed).abs() < 1e-2);

        let mut tiny = enemy(EnemyKind::Normal, Vec2::new(300.0, 100.0));
        tiny.apply_knockback(3.0, 0.0, 6.0);
        assert_eq!(tiny.vel, Vec2::ZERO);
    }

    #[test]
    fn test_base_damage_countdown_fires_every_period() {
        let mut e = enemy(EnemyKind::Normal, Vec2::new(300.0, 100.0));
        assert!(!e.tick_base_damage(3));
        assert!(e.base_damage_countdown.is_none());
        e.stopped = true;
        let hits = (0..9).filter(|_| e.tick_base_damage(3)).count();
        assert_eq!(hits, 3);
    }

    #[test]
    fn test_credit_claimed_once() {
        let mut e = enemy(EnemyKind::Fast, Vec2::ZERO);
        assert!(e.claim_credit());
        assert!(!e.claim_credit());
    }

    #[test]
    fn test_ignite_damages_once() {
        let mut e = enemy(EnemyKind::Normal, Vec2::ZERO);
        e.ignite(300, 10.0);
        e.ignite(300, 10.0);
        assert_eq!(e.health, 90.0);
        assert!(e.is_burning());
    }

    proptest! {
        #[test]
        fn prop_health_never_increases(
            hits in prop::collection::vec((-50.0f32..200.0, 0.0f32..900.0, -3.2f32..3.2), 1..50)
        ) {
            let mut e = enemy(EnemyKind::Tank, Vec2::new(640.0, 100.0));
            let mut last = e.health;
            for (damage, force, angle) in hits {
                e.take_damage(damage, force, angle, 6.0);
                prop_assert!(e.health <= last);
                prop_assert!(e.vel.length() <= e.max_knockback_speed + 1e-2);
                last = e.health;
            }
        }
    }
}
