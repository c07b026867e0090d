//! Weapon catalog identities and per-run weapon state

use serde::{Deserialize, Serialize};

use crate::ms_to_ticks;
use crate::tuning::WeaponSpec;

/// Weapons the player can carry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeaponKind {
    Pistol,
    Shotgun,
    Machinegun,
}

impl WeaponKind {
    pub const ALL: [WeaponKind; 3] =
        [WeaponKind::Pistol, WeaponKind::Shotgun, WeaponKind::Machinegun];

    /// Catalog id used by the profile gateway
    pub fn name(self) -> &'static str {
        match self {
            WeaponKind::Pistol => "pistol",
            WeaponKind::Shotgun => "shotgun",
            WeaponKind::Machinegun => "machinegun",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.name() == name)
    }

    /// Number key bound to this weapon
    pub fn slot(self) -> u8 {
        match self {
            WeaponKind::Pistol => 1,
            WeaponKind::Shotgun => 2,
            WeaponKind::Machinegun => 3,
        }
    }

    pub fn from_slot(slot: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.slot() == slot)
    }
}

/// The equipped weapon: catalog stats plus live ammo/cooldown/reload counters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeaponState {
    pub kind: WeaponKind,
    pub spec: WeaponSpec,
    pub ammo: u32,
    pub reloading: bool,
    /// Ticks left on the current reload
    pub reload_remaining: u64,
    /// Full length of the current reload (after modifiers)
    pub reload_total: u64,
    /// Ticks until the next shot is allowed
    pub cooldown: u64,
}

impl WeaponState {
    /// Fresh weapon: full magazine, no cooldown, no reload
    pub fn new(kind: WeaponKind, spec: WeaponSpec) -> Self {
        Self {
            kind,
            spec,
            ammo: spec.max_ammo,
            reloading: false,
            reload_remaining: 0,
            reload_total: 0,
            cooldown: 0,
        }
    }

    pub fn max_ammo(&self) -> u32 {
        self.spec.max_ammo
    }

    pub fn is_full(&self) -> bool {
        self.ammo >= self.spec.max_ammo
    }

    pub fn fire_interval_ticks(&self) -> u64 {
        ms_to_ticks(self.spec.fire_rate_ms)
    }

    /// Refill immediately, cancelling any reload in progress
    pub fn refill(&mut self) {
        self.ammo = self.spec.max_ammo;
        self.reloading = false;
        self.reload_remaining = 0;
        self.reload_total = 0;
    }

    /// Reload progress in [0, 1] (1 when not reloading)
    pub fn reload_progress(&self) -> f32 {
        if !self.reloading || self.reload_total == 0 {
            return 1.0;
        }
        1.0 - self.reload_remaining as f32 / self.reload_total as f32
    }
}

/// Angles of each projectile for one trigger pull.
///
/// Multi-pellet weapons fan evenly across `spread` centered on `aim`.
pub fn pellet_angles(aim: f32, pellets: u32, spread: f32) -> Vec<f32> {
    if pellets <= 1 {
        return vec![aim];
    }
    let step = spread / (pellets - 1) as f32;
    (0..pellets)
        .map(|i| aim - spread / 2.0 + step * i as f32)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tuning::WeaponTable;

    #[test]
    fn test_names_and_slots_roundtrip() {
        for kind in WeaponKind::ALL {
            assert_eq!(WeaponKind::from_name(kind.name()), Some(kind));
            assert_eq!(WeaponKind::from_slot(kind.slot()), Some(kind));
        }
        assert_eq!(WeaponKind::from_name("railgun"), None);
        assert_eq!(WeaponKind::from_slot(9), None);
    }

    #[test]
    fn test_pellet_fan_is_symmetric() {
        let angles = pellet_angles(1.0, 8, 0.7);
        assert_eq!(angles.len(), 8);
        assert!((angles[0] - (1.0 - 0.35)).abs() < 1e-5);
        assert!((angles[7] - (1.0 + 0.35)).abs() < 1e-5);
        assert_eq!(pellet_angles(0.3, 1, 0.7), vec![0.3]);
    }

    #[test]
    fn test_refill_cancels_reload() {
        let table = WeaponTable::default();
        let mut weapon = WeaponState::new(WeaponKind::Pistol, table.pistol);
        weapon.ammo = 0;
        weapon.reloading = true;
        weapon.reload_remaining = 50;
        weapon.refill();
        assert!(weapon.is_full());
        assert!(!weapon.reloading);
        assert_eq!(weapon.reload_progress(), 1.0);
    }
}
