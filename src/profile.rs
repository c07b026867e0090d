//! Player profile gateway
//!
//! The engine talks to profile storage only through [`ProfileGateway`]:
//! fetch the profile, submit end-of-run stats, set active skills and buy
//! store items. [`LocalProfileStore`] is the file-backed (or in-memory)
//! implementation used by the headless runner and tests.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::sim::skills::Skill;
use crate::sim::state::{GameState, Loadout};
use crate::sim::weapon::WeaponKind;

/// Maximum number of run scores to keep
pub const MAX_HIGH_SCORES: usize = 10;

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("unknown item: {0}")]
    NotFound(String),
    #[error("item already owned: {0}")]
    AlreadyOwned(String),
    #[error("not enough currency: need {needed}, have {available}")]
    InsufficientFunds { needed: u64, available: u64 },
    #[error("item not owned: {0}")]
    NotOwned(String),
    #[error("{item} is not in category {requested}")]
    CategoryMismatch { item: String, requested: StoreCategory },
    #[error("item not available: {0}")]
    Unavailable(String),
    #[error("profile I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("profile is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Store sections
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreCategory {
    Weapons,
    Turrets,
    Orbs,
    Skills,
    Ultimates,
}

impl StoreCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            StoreCategory::Weapons => "weapons",
            StoreCategory::Turrets => "turrets",
            StoreCategory::Orbs => "orbs",
            StoreCategory::Skills => "skills",
            StoreCategory::Ultimates => "ultimates",
        }
    }
}

impl std::fmt::Display for StoreCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One purchasable (or announced) store item
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CatalogEntry {
    pub id: &'static str,
    pub category: StoreCategory,
    pub price: u64,
    pub available: bool,
}

pub const CATALOG: &[CatalogEntry] = &[
    CatalogEntry {
        id: "pistol",
        category: StoreCategory::Weapons,
        price: 0,
        available: true,
    },
    CatalogEntry {
        id: "shotgun",
        category: StoreCategory::Weapons,
        price: 500,
        available: true,
    },
    CatalogEntry {
        id: "machinegun",
        category: StoreCategory::Weapons,
        price: 800,
        available: true,
    },
    CatalogEntry {
        id: "basic_turret",
        category: StoreCategory::Turrets,
        price: 1000,
        available: true,
    },
    CatalogEntry {
        id: "sniper_turret",
        category: StoreCategory::Turrets,
        price: 1500,
        available: false,
    },
    CatalogEntry {
        id: "attack_orb",
        category: StoreCategory::Orbs,
        price: 700,
        available: true,
    },
    CatalogEntry {
        id: "recovery",
        category: StoreCategory::Skills,
        price: 400,
        available: true,
    },
    CatalogEntry {
        id: "lifeSteal",
        category: StoreCategory::Skills,
        price: 600,
        available: true,
    },
    CatalogEntry {
        id: "dragons_breath",
        category: StoreCategory::Ultimates,
        price: 5000,
        available: false,
    },
];

pub fn catalog_entry(id: &str) -> Option<&'static CatalogEntry> {
    CATALOG.iter().find(|entry| entry.id == id)
}

/// Item ids owned per store category
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct OwnedItems {
    pub weapons: Vec<String>,
    pub turrets: Vec<String>,
    pub orbs: Vec<String>,
    pub skills: Vec<String>,
    pub ultimates: Vec<String>,
}

impl Default for OwnedItems {
    fn default() -> Self {
        Self {
            weapons: vec![WeaponKind::Pistol.name().to_string()],
            turrets: Vec::new(),
            orbs: Vec::new(),
            skills: Vec::new(),
            ultimates: Vec::new(),
        }
    }
}

impl OwnedItems {
    pub fn list(&self, category: StoreCategory) -> &[String] {
        match category {
            StoreCategory::Weapons => &self.weapons,
            StoreCategory::Turrets => &self.turrets,
            StoreCategory::Orbs => &self.orbs,
            StoreCategory::Skills => &self.skills,
            StoreCategory::Ultimates => &self.ultimates,
        }
    }

    fn list_mut(&mut self, category: StoreCategory) -> &mut Vec<String> {
        match category {
            StoreCategory::Weapons => &mut self.weapons,
            StoreCategory::Turrets => &mut self.turrets,
            StoreCategory::Orbs => &mut self.orbs,
            StoreCategory::Skills => &mut self.skills,
            StoreCategory::Ultimates => &mut self.ultimates,
        }
    }

    pub fn owns(&self, category: StoreCategory, id: &str) -> bool {
        self.list(category).iter().any(|owned| owned == id)
    }

    /// Owned in any category
    pub fn owns_anywhere(&self, id: &str) -> bool {
        [
            &self.weapons,
            &self.turrets,
            &self.orbs,
            &self.skills,
            &self.ultimates,
        ]
        .into_iter()
        .flatten()
        .any(|owned| owned == id)
    }
}

/// A single finished-run entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreEntry {
    pub score: u64,
    pub kills: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PlayerProfile {
    pub username: String,
    pub currency: u64,
    pub level: u32,
    pub kills: u64,
    pub owned_items: OwnedItems,
    pub current_weapon: String,
    pub active_skills: Vec<String>,
    pub high_score: u64,
    /// Best runs, sorted descending by score
    pub scores: Vec<ScoreEntry>,
}

impl Default for PlayerProfile {
    fn default() -> Self {
        Self {
            username: "player".to_string(),
            currency: 0,
            level: 1,
            kills: 0,
            owned_items: OwnedItems::default(),
            current_weapon: WeaponKind::Pistol.name().to_string(),
            active_skills: Vec::new(),
            high_score: 0,
            scores: Vec::new(),
        }
    }
}

impl PlayerProfile {
    /// Record a run score. Returns the rank achieved (1-indexed) or None if
    /// it did not make the list.
    pub fn add_score(&mut self, score: u64, kills: u64) -> Option<usize> {
        if score == 0 {
            return None;
        }
        self.high_score = self.high_score.max(score);

        let pos = self.scores.iter().position(|e| score > e.score);
        let rank = match pos {
            Some(i) => {
                self.scores.insert(i, ScoreEntry { score, kills });
                i + 1
            }
            None if self.scores.len() < MAX_HIGH_SCORES => {
                self.scores.push(ScoreEntry { score, kills });
                self.scores.len()
            }
            None => return None,
        };
        self.scores.truncate(MAX_HIGH_SCORES);
        Some(rank)
    }
}

/// End-of-run report sent to the gateway
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunStats {
    pub currency: u64,
    pub level: u32,
    pub kills: u64,
    pub current_weapon_name: String,
    pub active_skill_ids: Vec<String>,
    pub score: u64,
}

impl RunStats {
    pub fn from_state(state: &GameState) -> Self {
        Self {
            currency: state.currency,
            level: state.final_level(),
            kills: state.kills,
            current_weapon_name: state.player.weapon.kind.name().to_string(),
            active_skill_ids: state.skills.ids(),
            score: state.score,
        }
    }
}

impl From<&PlayerProfile> for Loadout {
    fn from(profile: &PlayerProfile) -> Self {
        let weapon = WeaponKind::from_name(&profile.current_weapon).unwrap_or_else(|| {
            log::warn!("Unknown current weapon {}, using pistol", profile.current_weapon);
            WeaponKind::Pistol
        });
        let owned_weapons = profile
            .owned_items
            .weapons
            .iter()
            .filter_map(|name| WeaponKind::from_name(name))
            .collect();
        // Ownership may be recorded under any category
        let owned_skills = Skill::ALL
            .into_iter()
            .filter(|skill| profile.owned_items.owns_anywhere(skill.id()))
            .collect();
        let skills = profile
            .active_skills
            .iter()
            .filter_map(|id| {
                let skill = Skill::from_id(id);
                if skill.is_none() {
                    log::warn!("Ignoring unknown skill id: {}", id);
                }
                skill
            })
            .collect();

        Self {
            currency: profile.currency,
            level: profile.level,
            kills: profile.kills,
            weapon,
            owned_weapons,
            skills,
            owned_skills,
        }
    }
}

/// Request/response contract with profile storage. Any call may fail; the
/// caller keeps its local state and reports the error.
pub trait ProfileGateway {
    fn fetch_profile(&mut self) -> Result<PlayerProfile, GatewayError>;
    fn submit_stats(&mut self, stats: &RunStats) -> Result<PlayerProfile, GatewayError>;
    fn set_active_skills(&mut self, ids: &[String]) -> Result<(), GatewayError>;
    fn purchase(&mut self, id: &str, category: StoreCategory)
    -> Result<PlayerProfile, GatewayError>;
}

/// Profile kept in memory, optionally mirrored to a JSON file after every change
#[derive(Debug, Clone, Default)]
pub struct LocalProfileStore {
    profile: PlayerProfile,
    path: Option<PathBuf>,
}

impl LocalProfileStore {
    pub fn in_memory(profile: PlayerProfile) -> Self {
        Self { profile, path: None }
    }

    /// Open a file-backed store. A missing file starts a fresh profile.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, GatewayError> {
        let path = path.as_ref().to_path_buf();
        let profile = match std::fs::read_to_string(&path) {
            Ok(json) => {
                let profile: PlayerProfile = serde_json::from_str(&json)?;
                log::info!("Loaded profile {} from {}", profile.username, path.display());
                profile
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::info!("No profile at {}, starting fresh", path.display());
                PlayerProfile::default()
            }
            Err(e) => return Err(e.into()),
        };
        Ok(Self {
            profile,
            path: Some(path),
        })
    }

    pub fn profile(&self) -> &PlayerProfile {
        &self.profile
    }

    /// Write the profile to its file, if it has one
    pub fn save(&self) -> Result<(), GatewayError> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let json = serde_json::to_string_pretty(&self.profile)?;
        std::fs::write(path, json)?;
        log::info!("Profile saved to {}", path.display());
        Ok(())
    }
}

impl ProfileGateway for LocalProfileStore {
    fn fetch_profile(&mut self) -> Result<PlayerProfile, GatewayError> {
        Ok(self.profile.clone())
    }

    fn submit_stats(&mut self, stats: &RunStats) -> Result<PlayerProfile, GatewayError> {
        let profile = &mut self.profile;
        profile.currency = stats.currency;
        profile.level = stats.level;
        profile.kills += stats.kills;
        profile.current_weapon = stats.current_weapon_name.clone();
        profile.active_skills = stats.active_skill_ids.clone();
        if let Some(rank) = profile.add_score(stats.score, stats.kills) {
            log::info!("Run score {} ranked #{}", stats.score, rank);
        }
        self.save()?;
        Ok(self.profile.clone())
    }

    fn set_active_skills(&mut self, ids: &[String]) -> Result<(), GatewayError> {
        if let Some(missing) = ids
            .iter()
            .find(|id| !self.profile.owned_items.owns_anywhere(id))
        {
            return Err(GatewayError::NotOwned(missing.clone()));
        }
        self.profile.active_skills = ids.to_vec();
        self.save()
    }

    fn purchase(
        &mut self,
        id: &str,
        category: StoreCategory,
    ) -> Result<PlayerProfile, GatewayError> {
        let entry = catalog_entry(id).ok_or_else(|| GatewayError::NotFound(id.to_string()))?;
        if entry.category != category {
            return Err(GatewayError::CategoryMismatch {
                item: id.to_string(),
                requested: category,
            });
        }
        if !entry.available {
            return Err(GatewayError::Unavailable(id.to_string()));
        }
        if self.profile.owned_items.owns(category, id) {
            return Err(GatewayError::AlreadyOwned(id.to_string()));
        }
        if self.profile.currency < entry.price {
            return Err(GatewayError::InsufficientFunds {
                needed: entry.price,
                available: self.profile.currency,
            });
        }

        self.profile.currency -= entry.price;
        self.profile.owned_items.list_mut(category).push(id.to_string());
        log::info!("Purchased {} ({}) for {}", id, category, entry.price);
        self.save()?;
        Ok(self.profile.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tuning::GameConfig;

    fn rich_store() -> LocalProfileStore {
        LocalProfileStore::in_memory(PlayerProfile {
            currency: 1000,
            ..PlayerProfile::default()
        })
    }

    #[test]
    fn test_purchase_deducts_and_grants() {
        let mut store = rich_store();
        let profile = store.purchase("shotgun", StoreCategory::Weapons).unwrap();
        assert_eq!(profile.currency, 500);
        assert!(profile.owned_items.owns(StoreCategory::Weapons, "shotgun"));
    }

    #[test]
    fn test_purchase_errors() {
        let mut store = rich_store();
        assert!(matches!(
            store.purchase("pistol", StoreCategory::Weapons),
            Err(GatewayError::AlreadyOwned(_))
        ));
        assert!(matches!(
            store.purchase("bazooka", StoreCategory::Weapons),
            Err(GatewayError::NotFound(_))
        ));
        assert!(matches!(
            store.purchase("recovery", StoreCategory::Weapons),
            Err(GatewayError::CategoryMismatch { .. })
        ));
        assert!(matches!(
            store.purchase("sniper_turret", StoreCategory::Turrets),
            Err(GatewayError::Unavailable(_))
        ));
        store.purchase("machinegun", StoreCategory::Weapons).unwrap();
        assert!(matches!(
            store.purchase("basic_turret", StoreCategory::Turrets),
            Err(GatewayError::InsufficientFunds { needed: 1000, available: 200 })
        ));
        assert_eq!(store.profile().currency, 200);
    }

    #[test]
    fn test_set_active_skills_requires_ownership() {
        let mut store = rich_store();
        let ids = vec!["recovery".to_string()];
        assert!(matches!(store.set_active_skills(&ids), Err(GatewayError::NotOwned(_))));
        store.purchase("recovery", StoreCategory::Skills).unwrap();
        store.set_active_skills(&ids).unwrap();
        assert_eq!(store.profile().active_skills, ids);
    }

    #[test]
    fn test_submit_accumulates_kills_and_replaces_rest() {
        let mut store = LocalProfileStore::in_memory(PlayerProfile {
            kills: 20,
            ..PlayerProfile::default()
        });
        let stats = RunStats {
            currency: 75,
            level: 4,
            kills: 30,
            current_weapon_name: "shotgun".to_string(),
            active_skill_ids: vec!["thorns".to_string()],
            score: 150,
        };
        let profile = store.submit_stats(&stats).unwrap();
        assert_eq!(profile.kills, 50);
        assert_eq!(profile.currency, 75);
        assert_eq!(profile.level, 4);
        assert_eq!(profile.current_weapon, "shotgun");
        assert_eq!(profile.high_score, 150);
        assert_eq!(profile.scores.len(), 1);
    }

    #[test]
    fn test_score_list_sorted_and_capped() {
        let mut profile = PlayerProfile::default();
        for score in 1..=12u64 {
            profile.add_score(score * 10, score);
        }
        assert_eq!(profile.scores.len(), MAX_HIGH_SCORES);
        assert_eq!(profile.scores[0].score, 120);
        assert_eq!(profile.add_score(5, 1), None);
        assert_eq!(profile.add_score(115, 1), Some(2));
        assert_eq!(profile.add_score(0, 0), None);
    }

    #[test]
    fn test_profile_json_is_camel_case() {
        let json = r#"{
            "currency": 10,
            "ownedItems": {"weapons": ["pistol", "shotgun"]},
            "currentWeapon": "shotgun",
            "activeSkills": ["lifeSteal"]
        }"#;
        let profile: PlayerProfile = serde_json::from_str(json).unwrap();
        assert_eq!(profile.currency, 10);
        assert_eq!(profile.level, 1);
        assert_eq!(profile.current_weapon, "shotgun");
        assert_eq!(profile.owned_items.weapons.len(), 2);
    }

    #[test]
    fn test_loadout_from_profile() {
        let mut profile = PlayerProfile::default();
        profile.owned_items.weapons.push("shotgun".to_string());
        profile.owned_items.skills.push("lifeSteal".to_string());
        profile.current_weapon = "shotgun".to_string();
        profile.active_skills = vec!["lifeSteal".to_string(), "mystery".to_string()];

        let loadout = Loadout::from(&profile);
        assert_eq!(loadout.weapon, WeaponKind::Shotgun);
        assert_eq!(loadout.owned_weapons, vec![WeaponKind::Pistol, WeaponKind::Shotgun]);
        assert_eq!(loadout.skills, vec![Skill::LifeSteal]);
        assert_eq!(loadout.owned_skills, vec![Skill::LifeSteal]);

        profile.current_weapon = "railgun".to_string();
        assert_eq!(Loadout::from(&profile).weapon, WeaponKind::Pistol);
    }

    #[test]
    fn test_run_stats_from_state() {
        let mut state = GameState::new(GameConfig::default(), Loadout::default(), 1);
        state.score = 230;
        state.kills = 9;
        state.currency = 115;
        let stats = RunStats::from_state(&state);
        assert_eq!(stats.level, 3);
        assert_eq!(stats.kills, 9);
        assert_eq!(stats.current_weapon_name, "pistol");
        assert!(stats.active_skill_ids.is_empty());
    }

    #[test]
    fn test_file_store_roundtrip() {
        let path = std::env::temp_dir()
            .join(format!("siege_line_profile_{}.json", std::process::id()));
        let _ = std::fs::remove_file(&path);
        let mut store = LocalProfileStore::open(&path).unwrap();
        assert_eq!(store.profile(), &PlayerProfile::default());
        store
            .submit_stats(&RunStats {
                currency: 9,
                level: 2,
                kills: 3,
                current_weapon_name: "pistol".to_string(),
                active_skill_ids: Vec::new(),
                score: 18,
            })
            .unwrap();
        let reopened = LocalProfileStore::open(&path).unwrap();
        assert_eq!(reopened.profile().kills, 3);
        assert_eq!(reopened.profile().currency, 9);
        let _ = std::fs::remove_file(&path);
    }
}
