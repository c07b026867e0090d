//! Data-driven game balance
//!
//! Every numeric constant the simulation reads comes from [`GameConfig`].
//! Defaults reproduce the reference tuning; partial JSON files override only
//! the fields they name. Speeds are in pixels per second, durations in
//! milliseconds (converted to ticks at use sites), damping factors are per
//! 60 Hz tick.

use std::path::Path;

use glam::Vec2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::ms_to_ticks;
use crate::sim::enemy::{Behavior, EnemyKind};
use crate::sim::weapon::WeaponKind;

/// Errors raised while loading a tuning file
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Playfield geometry
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ArenaConfig {
    pub width: f32,
    pub height: f32,
    /// Distance of the defense line above the bottom edge
    pub line_offset: f32,
    /// Width of each edge spawn-exclusion zone, as a fraction of arena width
    pub safe_zone_fraction: f32,
    /// Extra exclusion on the right edge (fraction of width)
    pub right_zone_extra: f32,
    /// Vertical spawn position (negative = above the visible area)
    pub spawn_y: f32,
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self {
            width: 1280.0,
            height: 720.0,
            line_offset: 144.0,
            safe_zone_fraction: 0.1,
            right_zone_extra: 0.05,
            spawn_y: -100.0,
        }
    }
}

impl ArenaConfig {
    /// Y coordinate of the defense line
    pub fn line_y(&self) -> f32 {
        self.height - self.line_offset
    }

    /// Horizontal band where enemies may spawn
    pub fn spawn_band(&self) -> (f32, f32) {
        let zone = self.width * self.safe_zone_fraction;
        let min_x = zone;
        let max_x = self.width - (zone + self.right_zone_extra * self.width);
        (min_x, max_x.max(min_x))
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.width / 2.0, self.height / 2.0)
    }

    /// Whether a point lies inside the playfield
    pub fn contains(&self, p: Vec2) -> bool {
        p.x >= 0.0 && p.x <= self.width && p.y >= 0.0 && p.y <= self.height
    }
}

/// Run-level rules
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Survive this long to win
    pub duration_ms: u64,
    pub initial_base_health: f32,
    /// Period of base damage from each enemy halted at the line
    pub base_damage_interval_ms: u64,
    pub intro_dialogue: Vec<String>,
    pub victory_dialogue: Vec<String>,
    /// Drones alive at run start
    pub initial_drones: usize,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            duration_ms: 7 * 60 * 1000,
            initial_base_health: 500.0,
            base_damage_interval_ms: 200,
            intro_dialogue: vec![
                "So you think you can hold the line?".to_string(),
                "My horde will break your walls before the sun sets.".to_string(),
                "Survive if you can.".to_string(),
            ],
            victory_dialogue: vec![
                "Impossible... the line still stands?".to_string(),
                "This is not over. We will return.".to_string(),
            ],
            initial_drones: 4,
        }
    }
}

/// Player body tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    pub radius: f32,
    pub speed: f32,
    pub max_health: f32,
    /// Recoil velocity retained per tick
    pub recoil_damping: f32,
    pub invincibility_ms: u64,
    /// Bullet spawn offset perpendicular to the aim direction
    pub muzzle_offset: f32,
    /// Time per movement animation frame
    pub frame_ms: u64,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            radius: 14.4,
            speed: 300.0,
            max_health: 100.0,
            recoil_damping: 0.9,
            invincibility_ms: 300,
            muzzle_offset: 24.0,
            frame_ms: 133,
        }
    }
}

/// Static stats for one weapon
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WeaponSpec {
    pub fire_rate_ms: u64,
    /// Damage per bullet (per pellet for spread weapons)
    pub damage: f32,
    /// Travel range per bullet; `None` = until it leaves the playfield
    pub range: Option<f32>,
    pub bullet_speed: f32,
    pub bullet_size: f32,
    pub max_ammo: u32,
    pub reload_ms: u64,
    pub automatic: bool,
    pub unlocked: bool,
    /// Recoil impulse on the player; also the knockback applied on hit
    pub recoil: f32,
    pub pellets: u32,
    /// Total fan angle for multi-pellet shots (radians)
    pub spread: f32,
    /// Hits set the target burning
    pub ignites: bool,
}

impl Default for WeaponSpec {
    fn default() -> Self {
        Self {
            fire_rate_ms: 200,
            damage: 15.0,
            range: Some(720.0),
            bullet_speed: 720.0,
            bullet_size: 11.0,
            max_ammo: 15,
            reload_ms: 1500,
            automatic: false,
            unlocked: true,
            recoil: 30.0,
            pellets: 1,
            spread: 0.0,
            ignites: false,
        }
    }
}

/// The weapon catalog
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WeaponTable {
    pub pistol: WeaponSpec,
    pub shotgun: WeaponSpec,
    pub machinegun: WeaponSpec,
}

impl Default for WeaponTable {
    fn default() -> Self {
        Self {
            pistol: WeaponSpec::default(),
            shotgun: WeaponSpec {
                fire_rate_ms: 900,
                damage: 35.0,
                range: Some(220.0),
                bullet_speed: 1080.0,
                bullet_size: 8.6,
                max_ammo: 8,
                reload_ms: 2500,
                recoil: 900.0,
                pellets: 8,
                spread: std::f32::consts::PI / 3.0,
                ..WeaponSpec::default()
            },
            machinegun: WeaponSpec {
                fire_rate_ms: 80,
                damage: 30.0,
                range: Some(360.0),
                bullet_speed: 1200.0,
                bullet_size: 7.2,
                max_ammo: 100,
                reload_ms: 3000,
                automatic: true,
                recoil: 180.0,
                ..WeaponSpec::default()
            },
        }
    }
}

impl WeaponTable {
    pub fn get(&self, kind: WeaponKind) -> &WeaponSpec {
        match kind {
            WeaponKind::Pistol => &self.pistol,
            WeaponKind::Shotgun => &self.shotgun,
            WeaponKind::Machinegun => &self.machinegun,
        }
    }
}

/// Base stats for one enemy type (before wave scaling)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnemySpec {
    pub size: f32,
    pub speed: f32,
    pub health: f32,
    /// Damage to the base per interval, and contact damage to the player
    pub damage: f32,
    pub score: u32,
    /// Fraction of knockback ignored (0 = full knockback, 1 = immovable)
    pub knockback_resistance: f32,
    pub behavior: Behavior,
    /// Cap on knockback velocity
    pub max_knockback_speed: f32,
}

impl Default for EnemySpec {
    fn default() -> Self {
        Self {
            size: 64.0,
            speed: 72.0,
            health: 100.0,
            damage: 10.0,
            score: 10,
            knockback_resistance: 0.0,
            behavior: Behavior::Ground,
            max_knockback_speed: 900.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EnemyTable {
    pub normal: EnemySpec,
    pub fast: EnemySpec,
    pub tank: EnemySpec,
}

impl Default for EnemyTable {
    fn default() -> Self {
        Self {
            normal: EnemySpec::default(),
            fast: EnemySpec {
                size: 54.0,
                speed: 192.0,
                health: 50.0,
                damage: 2.0,
                score: 15,
                knockback_resistance: 0.2,
                behavior: Behavior::Chase,
                max_knockback_speed: 1200.0,
            },
            tank: EnemySpec {
                size: 106.0,
                speed: 26.0,
                health: 500.0,
                damage: 25.0,
                score: 20,
                knockback_resistance: 0.8,
                behavior: Behavior::Ground,
                max_knockback_speed: 900.0,
            },
        }
    }
}

impl EnemyTable {
    pub fn get(&self, kind: EnemyKind) -> &EnemySpec {
        match kind {
            EnemyKind::Normal => &self.normal,
            EnemyKind::Fast => &self.fast,
            EnemyKind::Tank => &self.tank,
        }
    }
}

/// Weighted enemy type draw (weights should sum to 1)
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct SpawnWeights {
    pub normal: f32,
    pub fast: f32,
    pub tank: f32,
}

impl Default for SpawnWeights {
    fn default() -> Self {
        Self {
            normal: 0.60,
            fast: 0.35,
            tank: 0.05,
        }
    }
}

/// Wave cadence and escalation
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SpawnerConfig {
    pub interval_ms: u64,
    pub initial_count: u32,
    pub max_count: u32,
    /// Period of +1 spawn count escalation
    pub count_step_ms: u64,
    /// Period of enemy scaling escalation
    pub scaling_step_ms: u64,
    pub scaling_multiplier: f32,
    pub weights: SpawnWeights,
    /// Grid cell used to spread enemies within one wave
    pub cell_size: f32,
    pub placement_retries: u32,
}

impl Default for SpawnerConfig {
    fn default() -> Self {
        Self {
            interval_ms: 1500,
            initial_count: 2,
            max_count: 20,
            count_step_ms: 30_000,
            scaling_step_ms: 30_000,
            scaling_multiplier: 1.2,
            weights: SpawnWeights::default(),
            cell_size: 80.0,
            placement_retries: 4,
        }
    }
}

/// Automated turret tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TurretConfig {
    /// Turret positions as offsets: x from the nearest side edge, y below the line.
    /// Negative x counts from the right edge.
    pub placements: Vec<(f32, f32)>,
    pub barrel_length: f32,
    pub bullet_size: f32,
    pub bullet_speed: f32,
    pub damage: f32,
    pub fire_rate_ms: u64,
    pub range: f32,
    pub knockback: f32,
}

impl Default for TurretConfig {
    fn default() -> Self {
        Self {
            placements: vec![(150.0, 50.0), (-150.0, 50.0)],
            barrel_length: 60.0,
            bullet_size: 6.0,
            bullet_speed: 600.0,
            damage: 15.0,
            fire_rate_ms: 1000,
            range: 400.0,
            knockback: 60.0,
        }
    }
}

impl TurretConfig {
    /// Resolve placement offsets into arena coordinates
    pub fn positions(&self, arena: &ArenaConfig) -> Vec<Vec2> {
        let line_y = arena.line_y();
        self.placements
            .iter()
            .map(|&(x, dy)| {
                let px = if x < 0.0 { arena.width + x } else { x };
                Vec2::new(px, line_y + dy)
            })
            .collect()
    }
}

/// Support drone tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DroneConfig {
    pub orbit_radius: f32,
    /// Shared orbit phase speed (radians per second)
    pub orbit_speed: f32,
    pub max_distance: f32,
    /// Fraction of the way toward the desired position covered per tick
    pub smoothing: f32,
    pub leash_strength: f32,
    pub attack_range: f32,
    pub hover_distance: f32,
    pub hover_tolerance: f32,
    pub fire_rate_ms: u64,
    pub separation_distance: f32,
    pub separation_strength: f32,
    pub bullet_speed: f32,
    pub bullet_damage: f32,
    pub bullet_size: f32,
    pub knockback: f32,
}

impl Default for DroneConfig {
    fn default() -> Self {
        Self {
            orbit_radius: 60.0,
            orbit_speed: 1.2,
            max_distance: 400.0,
            smoothing: 0.06,
            leash_strength: 0.02,
            attack_range: 300.0,
            hover_distance: 90.0,
            hover_tolerance: 30.0,
            fire_rate_ms: 500,
            separation_distance: 90.0,
            separation_strength: 0.1,
            bullet_speed: 480.0,
            bullet_damage: 25.0,
            bullet_size: 5.0,
            knockback: 60.0,
        }
    }
}

/// Pickup tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ItemConfig {
    pub spawn_interval_ms: u64,
    pub spawn_chance: f32,
    pub padding: f32,
    pub size: f32,
    pub lifespan_ms: u64,
    pub medkit_heal: f32,
    /// Share of item spawns that are ammo crates instead of medkits
    pub ammo_share: f32,
}

impl Default for ItemConfig {
    fn default() -> Self {
        Self {
            spawn_interval_ms: 12_000,
            spawn_chance: 0.3,
            padding: 100.0,
            size: 30.0,
            lifespan_ms: 15_000,
            medkit_heal: 30.0,
            ammo_share: 0.25,
        }
    }
}

/// Collision response, rewards and feedback
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CombatConfig {
    /// Enemy knockback velocity retained per tick
    pub enemy_friction: f32,
    /// Knockback velocity components below this snap to zero
    pub knockback_snap: f32,
    /// Impulse pushing an enemy away after touching the player
    pub contact_knockback: f32,
    /// Extra gap left between player and enemy after separation
    pub contact_margin: f32,
    /// Share of the overlap resolved by moving the player
    pub player_push_share: f32,
    /// Knockback for bullets without a weapon recoil value
    pub default_knockback: f32,
    pub shake_intensity: f32,
    pub shake_duration_ms: u64,
    pub flash_ms: u64,
    pub burn_ms: u64,
    pub burn_damage: f32,
    /// Score points per unit of currency
    pub score_per_currency: u32,
    /// Score points per level gained at the end of a run
    pub score_per_level: u32,
}

impl Default for CombatConfig {
    fn default() -> Self {
        Self {
            enemy_friction: 0.9,
            knockback_snap: 6.0,
            contact_knockback: 900.0,
            contact_margin: 5.0,
            player_push_share: 0.25,
            default_knockback: 60.0,
            shake_intensity: 5.0,
            shake_duration_ms: 200,
            flash_ms: 100,
            burn_ms: 5000,
            burn_damage: 10.0,
            score_per_currency: 2,
            score_per_level: 100,
        }
    }
}

/// Passive skill tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SkillTuning {
    pub recovery_delay_ms: u64,
    pub recovery_interval_ms: u64,
    /// Fraction of max health restored per recovery pulse
    pub recovery_fraction: f32,
    pub life_steal_fraction: f32,
    pub thorns_fraction: f32,
    pub momentum_delay_ms: u64,
    pub momentum_multiplier: f32,
    pub fast_reload_multiplier: f32,
}

impl Default for SkillTuning {
    fn default() -> Self {
        Self {
            recovery_delay_ms: 5000,
            recovery_interval_ms: 15_000,
            recovery_fraction: 0.005,
            life_steal_fraction: 0.05,
            thorns_fraction: 0.2,
            momentum_delay_ms: 3000,
            momentum_multiplier: 2.0,
            fast_reload_multiplier: 0.7,
        }
    }
}

/// Complete balance configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub arena: ArenaConfig,
    pub run: RunConfig,
    pub player: PlayerConfig,
    pub weapons: WeaponTable,
    pub enemies: EnemyTable,
    pub spawner: SpawnerConfig,
    pub turret: TurretConfig,
    pub drones: DroneConfig,
    pub items: ItemConfig,
    pub combat: CombatConfig,
    pub skills: SkillTuning,
}

impl GameConfig {
    /// Parse a (possibly partial) JSON config
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let mut config: GameConfig = serde_json::from_str(json)?;
        config.validate();
        Ok(config)
    }

    /// Load a config file from disk
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path.as_ref())?;
        let config = Self::from_json_str(&json)?;
        log::info!("Loaded tuning from {}", path.as_ref().display());
        Ok(config)
    }

    /// Clamp values that would break the simulation
    pub fn validate(&mut self) {
        if self.arena.width <= 0.0 || self.arena.height <= 0.0 {
            log::warn!(
                "Invalid arena size {}x{}, using defaults",
                self.arena.width,
                self.arena.height
            );
            let defaults = ArenaConfig::default();
            self.arena.width = defaults.width;
            self.arena.height = defaults.height;
        }
        if self.arena.line_offset < 0.0 || self.arena.line_offset > self.arena.height {
            log::warn!("Defense line offset {} out of range", self.arena.line_offset);
            self.arena.line_offset = self.arena.line_offset.clamp(0.0, self.arena.height);
        }
        if self.spawner.scaling_multiplier < 1.0 {
            log::warn!(
                "Enemy scaling multiplier {} would shrink enemies, clamping to 1.0",
                self.spawner.scaling_multiplier
            );
            self.spawner.scaling_multiplier = 1.0;
        }
        if self.spawner.initial_count > self.spawner.max_count {
            log::warn!(
                "Initial spawn count {} exceeds cap {}",
                self.spawner.initial_count,
                self.spawner.max_count
            );
            self.spawner.initial_count = self.spawner.max_count;
        }
        let w = &self.spawner.weights;
        let total = w.normal + w.fast + w.tank;
        if (total - 1.0).abs() > 0.001 && total > 0.0 {
            log::warn!("Spawn weights sum to {}, normalizing", total);
            self.spawner.weights = SpawnWeights {
                normal: w.normal / total,
                fast: w.fast / total,
                tank: w.tank / total,
            };
        }
        for spec in [
            &mut self.enemies.normal,
            &mut self.enemies.fast,
            &mut self.enemies.tank,
        ] {
            spec.knockback_resistance = spec.knockback_resistance.clamp(0.0, 1.0);
        }
        self.player.recoil_damping = self.player.recoil_damping.clamp(0.0, 1.0);
        self.combat.enemy_friction = self.combat.enemy_friction.clamp(0.0, 1.0);
        self.combat.player_push_share = self.combat.player_push_share.clamp(0.0, 1.0);
        self.drones.smoothing = self.drones.smoothing.clamp(0.0, 1.0);
        self.combat.score_per_currency = self.combat.score_per_currency.max(1);
        self.combat.score_per_level = self.combat.score_per_level.max(1);
    }

    /// Base-damage period in ticks
    pub fn base_damage_ticks(&self) -> u64 {
        ms_to_ticks(self.run.base_damage_interval_ms).max(1)
    }
}
