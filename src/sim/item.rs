//! Pickups that spawn on the field and expire if ignored

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::collision::circles_overlap;
use super::player::Player;
use crate::tuning::ItemConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    Medkit,
    Ammo,
}

impl ItemKind {
    pub fn name(self) -> &'static str {
        match self {
            ItemKind::Medkit => "medkit",
            ItemKind::Ammo => "ammo",
        }
    }

    /// Apply the pickup effect. Returns false when it had nothing to do,
    /// in which case the item stays on the field.
    pub fn apply(self, player: &mut Player, config: &ItemConfig) -> bool {
        match self {
            ItemKind::Medkit => {
                if !player.is_hurt() {
                    return false;
                }
                player.heal(config.medkit_heal);
                true
            }
            ItemKind::Ammo => {
                if player.weapon.is_full() && !player.weapon.reloading {
                    return false;
                }
                player.weapon.refill();
                true
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: u32,
    pub kind: ItemKind,
    pub pos: Vec2,
    pub size: f32,
    pub age_ticks: u64,
    pub lifespan_ticks: u64,
    pub collected: bool,
}

impl Item {
    pub fn new(id: u32, kind: ItemKind, pos: Vec2, size: f32, lifespan_ticks: u64) -> Self {
        Self {
            id,
            kind,
            pos,
            size,
            age_ticks: 0,
            lifespan_ticks,
            collected: false,
        }
    }

    pub fn update(&mut self) {
        self.age_ticks = self.age_ticks.saturating_add(1);
    }

    pub fn is_expired(&self) -> bool {
        self.age_ticks >= self.lifespan_ticks
    }

    pub fn touches(&self, player: &Player) -> bool {
        circles_overlap(self.pos, self.size / 2.0, player.pos, player.radius)
    }

    /// Fraction of lifespan remaining (for blink-out rendering)
    pub fn remaining_fraction(&self) -> f32 {
        if self.lifespan_ticks == 0 {
            return 0.0;
        }
        1.0 - (self.age_ticks as f32 / self.lifespan_ticks as f32).min(1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::weapon::{WeaponKind, WeaponState};
    use crate::tuning::{PlayerConfig, WeaponTable};

    fn player() -> Player {
        let weapons = WeaponTable::default();
        Player::new(
            Vec2::new(200.0, 200.0),
            &PlayerConfig::default(),
            WeaponState::new(WeaponKind::Pistol, weapons.pistol),
            vec![WeaponKind::Pistol],
        )
    }

    #[test]
    fn test_medkit_requires_injury() {
        let config = ItemConfig::default();
        let mut p = player();
        assert!(!ItemKind::Medkit.apply(&mut p, &config));
        p.health = 50.0;
        assert!(ItemKind::Medkit.apply(&mut p, &config));
        assert_eq!(p.health, 80.0);
    }

    #[test]
    fn test_ammo_refills_and_cancels_reload() {
        let config = ItemConfig::default();
        let mut p = player();
        assert!(!ItemKind::Ammo.apply(&mut p, &config));
        p.weapon.ammo = 0;
        p.start_reload();
        assert!(ItemKind::Ammo.apply(&mut p, &config));
        assert!(p.weapon.is_full());
        assert!(!p.weapon.reloading);
    }

    #[test]
    fn test_item_expires_after_lifespan() {
        let mut item = Item::new(1, ItemKind::Medkit, Vec2::ZERO, 30.0, 3);
        item.update();
        item.update();
        assert!(!item.is_expired());
        item.update();
        assert!(item.is_expired());
        assert_eq!(item.remaining_fraction(), 0.0);
    }
}
