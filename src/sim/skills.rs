//! Passive skills as an ordered list of per-tick modifiers
//!
//! Each active skill folds its effect into a [`Modifiers`] value once per
//! tick; the loop applies the result uniformly to speed, reload, healing and
//! reflected damage.

use serde::{Deserialize, Serialize};

use crate::ms_to_ticks;
use crate::tuning::SkillTuning;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Skill {
    Recovery,
    LifeSteal,
    Thorns,
    Momentum,
    FastReload,
}

impl Skill {
    pub const ALL: [Skill; 5] = [
        Skill::Recovery,
        Skill::LifeSteal,
        Skill::Thorns,
        Skill::Momentum,
        Skill::FastReload,
    ];

    /// Id shared with the profile gateway
    pub fn id(self) -> &'static str {
        match self {
            Skill::Recovery => "recovery",
            Skill::LifeSteal => "lifeSteal",
            Skill::Thorns => "thorns",
            Skill::Momentum => "momentum",
            Skill::FastReload => "fastReload",
        }
    }

    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|skill| skill.id() == id)
    }
}

/// Combined effect of all active skills for one tick
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Modifiers {
    pub speed: f32,
    pub reload: f32,
    /// Fraction of a killing bullet's damage returned as healing
    pub life_steal: f32,
    /// Fraction of contact damage reflected to the attacker
    pub thorns: f32,
    /// Health restored this tick
    pub regeneration: f32,
}

impl Default for Modifiers {
    fn default() -> Self {
        Self {
            speed: 1.0,
            reload: 1.0,
            life_steal: 0.0,
            thorns: 0.0,
            regeneration: 0.0,
        }
    }
}

/// Player state the skills read
#[derive(Debug, Clone, Copy)]
pub struct SkillContext {
    pub ticks_since_damage: u64,
    pub max_health: f32,
}

/// Active skills in activation order, plus their private cooldowns
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SkillSet {
    active: Vec<Skill>,
    recovery_cooldown: u64,
}

impl SkillSet {
    pub fn new(active: impl IntoIterator<Item = Skill>) -> Self {
        let mut set = Self::default();
        for skill in active {
            set.set_active(skill, true);
        }
        set
    }

    pub fn is_active(&self, skill: Skill) -> bool {
        self.active.contains(&skill)
    }

    pub fn active(&self) -> &[Skill] {
        &self.active
    }

    pub fn ids(&self) -> Vec<String> {
        self.active.iter().map(|s| s.id().to_string()).collect()
    }

    pub fn set_active(&mut self, skill: Skill, on: bool) {
        match (on, self.is_active(skill)) {
            (true, false) => self.active.push(skill),
            (false, true) => self.active.retain(|s| *s != skill),
            _ => {}
        }
    }

    /// Fold every active skill into this tick's modifiers
    pub fn evaluate(&mut self, ctx: SkillContext, tuning: &SkillTuning) -> Modifiers {
        self.recovery_cooldown = self.recovery_cooldown.saturating_sub(1);
        let mut mods = Modifiers::default();
        for &skill in &self.active {
            match skill {
                Skill::Recovery => {
                    let rested = ctx.ticks_since_damage >= ms_to_ticks(tuning.recovery_delay_ms);
                    if rested && self.recovery_cooldown == 0 {
                        mods.regeneration += ctx.max_health * tuning.recovery_fraction;
                        self.recovery_cooldown = ms_to_ticks(tuning.recovery_interval_ms);
                    }
                }
                Skill::LifeSteal => mods.life_steal += tuning.life_steal_fraction,
                Skill::Thorns => mods.thorns += tuning.thorns_fraction,
                Skill::Momentum => {
                    if ctx.ticks_since_damage > ms_to_ticks(tuning.momentum_delay_ms) {
                        mods.speed *= tuning.momentum_multiplier;
                    }
                }
                Skill::FastReload => mods.reload *= tuning.fast_reload_multiplier,
            }
        }
        mods
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx(ticks_since_damage: u64) -> SkillContext {
        SkillContext {
            ticks_since_damage,
            max_health: 100.0,
        }
    }

    #[test]
    fn test_no_skills_is_identity() {
        let mut set = SkillSet::default();
        assert_eq!(set.evaluate(ctx(0), &SkillTuning::default()), Modifiers::default());
    }

    #[test]
    fn test_ids_keep_activation_order() {
        let set = SkillSet::new([Skill::Thorns, Skill::FastReload, Skill::Thorns]);
        assert_eq!(set.active(), &[Skill::Thorns, Skill::FastReload]);
        assert_eq!(set.ids(), vec!["thorns".to_string(), "fastReload".to_string()]);
    }

    #[test]
    fn test_momentum_after_delay() {
        let tuning = SkillTuning::default();
        let mut set = SkillSet::new([Skill::Momentum]);
        assert_eq!(set.evaluate(ctx(10), &tuning).speed, 1.0);
        assert_eq!(set.evaluate(ctx(ms_to_ticks(3000) + 1), &tuning).speed, 2.0);
    }

    #[test]
    fn test_recovery_pulses_at_most_once_per_interval() {
        let tuning = SkillTuning::default();
        let mut set = SkillSet::new([Skill::Recovery]);
        let rested = ms_to_ticks(tuning.recovery_delay_ms);
        assert_eq!(set.evaluate(ctx(rested - 1), &tuning).regeneration, 0.0);
        assert!((set.evaluate(ctx(rested), &tuning).regeneration - 0.5).abs() < 1e-6);
        let interval = ms_to_ticks(tuning.recovery_interval_ms);
        let pulses = (1..=interval)
            .filter(|i| set.evaluate(ctx(rested + i), &tuning).regeneration > 0.0)
            .count();
        assert_eq!(pulses, 1);
    }

    #[test]
    fn test_fast_reload_and_combat_fractions() {
        let tuning = SkillTuning::default();
        let mut set = SkillSet::new([Skill::FastReload, Skill::LifeSteal, Skill::Thorns]);
        let mods = set.evaluate(ctx(0), &tuning);
        assert!((mods.reload - 0.7).abs() < 1e-6);
        assert!((mods.life_steal - 0.05).abs() < 1e-6);
        assert!((mods.thorns - 0.2).abs() < 1e-6);
    }

    #[test]
    fn test_set_active_is_idempotent() {
        let mut set = SkillSet::default();
        set.set_active(Skill::Recovery, true);
        set.set_active(Skill::Recovery, true);
        assert_eq!(set.active(), &[Skill::Recovery]);
        set.set_active(Skill::Recovery, false);
        assert!(set.active().is_empty());
    }
}
