//! Read-only view of a tick for renderers and HUDs

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::bullet::BulletSource;
use super::enemy::EnemyKind;
use super::item::ItemKind;
use super::player::Facing;
use super::state::{GamePhase, GameState};
use super::weapon::WeaponKind;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerView {
    pub pos: Vec2,
    pub radius: f32,
    pub facing: Facing,
    pub anim_frame: u8,
    pub moving: bool,
    pub aim: Vec2,
    pub muzzle: Vec2,
    /// Blink while invincible
    pub invincible: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnemyView {
    pub id: u32,
    pub kind: EnemyKind,
    pub pos: Vec2,
    pub size: f32,
    pub health_ratio: f32,
    pub flashing: bool,
    pub burning: bool,
    pub stopped: bool,
    pub facing_right: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BulletView {
    pub pos: Vec2,
    pub size: f32,
    pub angle: f32,
    pub source: BulletSource,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemView {
    pub id: u32,
    pub kind: ItemKind,
    pub pos: Vec2,
    pub size: f32,
    /// 1.0 when fresh, 0.0 at expiry
    pub remaining: f32,
}

/// Numbers for the HUD
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HudView {
    pub health: f32,
    pub max_health: f32,
    pub base_health: f32,
    pub max_base_health: f32,
    pub weapon: WeaponKind,
    pub ammo: u32,
    pub max_ammo: u32,
    pub reloading: bool,
    pub reload_progress: f32,
    pub score: u64,
    pub kills: u64,
    pub currency: u64,
    pub elapsed_ms: u64,
    pub remaining_ms: u64,
    pub active_skills: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderSnapshot {
    pub phase: GamePhase,
    pub arena_size: Vec2,
    pub line_y: f32,
    /// Left and right no-spawn strips as (x, width)
    pub safe_zones: [(f32, f32); 2],
    /// Global transform offset; zero when shake is off
    pub shake_offset: Vec2,
    pub cursor: Vec2,
    pub player: PlayerView,
    pub enemies: Vec<EnemyView>,
    pub bullets: Vec<BulletView>,
    /// Turret positions with barrel angles
    pub turrets: Vec<(Vec2, f32)>,
    pub drones: Vec<Vec2>,
    pub items: Vec<ItemView>,
    pub hud: HudView,
    /// Line of dialogue currently on screen, if any
    pub dialogue: Option<String>,
}

impl RenderSnapshot {
    pub fn capture(state: &GameState, reduced_motion: bool) -> Self {
        let arena = &state.config.arena;
        let (band_min, band_max) = arena.spawn_band();
        let player = &state.player;

        let dialogue = match state.phase {
            GamePhase::Intro { line } => state.config.run.intro_dialogue.get(line).cloned(),
            GamePhase::Victory { line } => state.config.run.victory_dialogue.get(line).cloned(),
            _ => None,
        };

        Self {
            phase: state.phase,
            arena_size: Vec2::new(arena.width, arena.height),
            line_y: arena.line_y(),
            safe_zones: [(0.0, band_min), (band_max, arena.width - band_max)],
            shake_offset: if reduced_motion { Vec2::ZERO } else { state.shake.offset },
            cursor: player.aim,
            player: PlayerView {
                pos: player.pos,
                radius: player.radius,
                facing: player.facing,
                anim_frame: player.anim_frame,
                moving: player.moving,
                aim: player.aim,
                muzzle: player.muzzle(player.aim_angle()),
                invincible: player.is_invincible(),
            },
            enemies: state
                .enemies
                .iter()
                .map(|e| EnemyView {
                    id: e.id,
                    kind: e.kind,
                    pos: e.pos,
                    size: e.size,
                    health_ratio: (e.health / e.max_health.max(f32::EPSILON)).clamp(0.0, 1.0),
                    flashing: e.is_flashing(),
                    burning: e.is_burning(),
                    stopped: e.stopped,
                    facing_right: e.facing_right,
                })
                .collect(),
            bullets: state
                .bullets
                .iter()
                .map(|b| BulletView {
                    pos: b.pos,
                    size: b.size,
                    angle: b.angle,
                    source: b.source,
                })
                .collect(),
            turrets: state.turrets.iter().map(|t| (t.pos, t.angle)).collect(),
            drones: state.drones.drones().iter().map(|d| d.pos).collect(),
            items: state
                .items
                .iter()
                .map(|i| ItemView {
                    id: i.id,
                    kind: i.kind,
                    pos: i.pos,
                    size: i.size,
                    remaining: i.remaining_fraction(),
                })
                .collect(),
            hud: HudView {
                health: player.health,
                max_health: player.max_health,
                base_health: state.base_health,
                max_base_health: state.config.run.initial_base_health,
                weapon: player.weapon.kind,
                ammo: player.weapon.ammo,
                max_ammo: player.weapon.max_ammo(),
                reloading: player.weapon.reloading,
                reload_progress: player.weapon.reload_progress(),
                score: state.score,
                kills: state.kills,
                currency: state.currency,
                elapsed_ms: state.elapsed_ms(),
                remaining_ms: state.remaining_ms(),
                active_skills: state.skills.ids(),
            },
            dialogue,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::Loadout;
    use crate::tuning::GameConfig;

    #[test]
    fn test_snapshot_shows_intro_line() {
        let state = GameState::new(GameConfig::default(), Loadout::default(), 1);
        let snap = RenderSnapshot::capture(&state, false);
        let first_line = state.config.run.intro_dialogue.first().map(|s| s.as_str());
        assert_eq!(snap.dialogue.as_deref(), first_line);
        assert_eq!(snap.turrets.len(), 2);
        assert_eq!(snap.line_y, 576.0);
        assert_eq!(snap.safe_zones[0], (0.0, 128.0));
    }

    #[test]
    fn test_snapshot_serializes() {
        let mut state = GameState::new(GameConfig::default(), Loadout::default(), 1);
        state.spawn_enemy(EnemyKind::Fast, Vec2::new(400.0, 100.0));
        let snap = RenderSnapshot::capture(&state, true);
        let json = serde_json::to_string(&snap).unwrap();
        let back: RenderSnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(back.enemies.len(), 1);
        assert_eq!(back.hud.max_ammo, 15);
        assert_eq!(back.shake_offset, Vec2::ZERO);
    }
}
