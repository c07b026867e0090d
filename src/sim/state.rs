//! Run state: phases, counters, entity collections and lifecycle
//!
//! Everything the tick mutates lives here. The run-start loadout is kept so
//! restarts re-seed from it rather than from whatever changed mid-run.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::bullet::Bullet;
use super::drone::DroneRegistry;
use super::enemy::{Enemy, EnemyKind};
use super::item::{Item, ItemKind};
use super::player::Player;
use super::shake::ScreenShake;
use super::skills::{Modifiers, Skill, SkillSet};
use super::spawner::WaveSpawner;
use super::timer::IntervalTimer;
use super::turret::Turret;
use super::weapon::{WeaponKind, WeaponState};
use crate::audio::{MusicCue, SoundEffect};
use crate::tuning::GameConfig;
use crate::{ms_to_ticks, ticks_to_ms};

/// Current phase of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Opening dialogue, showing line `line`
    Intro { line: usize },
    /// Active gameplay
    Playing,
    /// Simulation frozen
    Paused,
    /// Player or base fell
    GameOver,
    /// Survived; closing dialogue showing line `line`
    Victory { line: usize },
    /// Victory dialogue finished
    Won,
    /// Run torn down
    Exited,
}

impl GamePhase {
    /// Whether the run has ended (no further simulation)
    pub fn is_finished(&self) -> bool {
        matches!(
            self,
            GamePhase::GameOver | GamePhase::Victory { .. } | GamePhase::Won | GamePhase::Exited
        )
    }
}

/// Discrete things that happened during a tick, drained by the host
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    Sound(SoundEffect),
    Music(MusicCue),
    PhaseChanged(GamePhase),
    EnemyKilled { kind: EnemyKind, score: u32 },
    BaseDamaged { amount: f32, remaining: f32 },
    PlayerDamaged { amount: f32, remaining: f32 },
    ItemCollected(ItemKind),
    WeaponSwitched(WeaponKind),
    ReloadStarted,
    ReloadFinished,
    WaveSpawned { count: u32 },
    /// Wave size or enemy scaling went up
    Escalated { spawn_count: u32, scaling: f32 },
}

/// Snapshot of the externally supplied profile taken at run start
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Loadout {
    pub currency: u64,
    pub level: u32,
    pub kills: u64,
    pub weapon: WeaponKind,
    pub owned_weapons: Vec<WeaponKind>,
    pub skills: Vec<Skill>,
    pub owned_skills: Vec<Skill>,
}

impl Default for Loadout {
    fn default() -> Self {
        Self {
            currency: 0,
            level: 1,
            kills: 0,
            weapon: WeaponKind::Pistol,
            owned_weapons: vec![WeaponKind::Pistol],
            skills: Vec::new(),
            owned_skills: Vec::new(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct GameState {
    pub config: GameConfig,
    pub seed: u64,
    pub rng: Pcg32,
    pub phase: GamePhase,
    /// Ticks spent in `Playing` this run
    pub time_ticks: u64,
    pub base_health: f32,
    pub score: u64,
    pub kills: u64,
    pub currency: u64,
    /// Score at the last score-to-currency conversion
    pub last_converted_score: u64,
    pub level: u32,
    pub won: bool,
    pub lost: bool,
    pub player: Player,
    pub enemies: Vec<Enemy>,
    pub bullets: Vec<Bullet>,
    pub turrets: Vec<Turret>,
    pub drones: DroneRegistry,
    /// Drone population the registry is resized to each tick
    pub target_drone_count: usize,
    pub items: Vec<Item>,
    pub spawner: WaveSpawner,
    pub item_timer: IntervalTimer,
    pub skills: SkillSet,
    /// Skill effects evaluated this tick
    pub modifiers: Modifiers,
    pub shake: ScreenShake,
    pub shake_enabled: bool,
    pub events: Vec<GameEvent>,
    pub loadout: Loadout,
    next_id: u32,
}

impl GameState {
    /// Start a run. Opens on the intro dialogue when there is one.
    pub fn new(config: GameConfig, loadout: Loadout, seed: u64) -> Self {
        let player = build_player(&config, &loadout);
        let mut state = Self {
            spawner: WaveSpawner::new(&config.spawner),
            item_timer: IntervalTimer::from_ms(config.items.spawn_interval_ms),
            turrets: build_turrets(&config),
            target_drone_count: config.run.initial_drones,
            base_health: config.run.initial_base_health,
            skills: SkillSet::new(loadout.skills.iter().copied()),
            currency: loadout.currency,
            level: loadout.level,
            config,
            seed,
            rng: Pcg32::seed_from_u64(seed),
            phase: GamePhase::Playing,
            time_ticks: 0,
            score: 0,
            kills: 0,
            last_converted_score: 0,
            won: false,
            lost: false,
            player,
            enemies: Vec::new(),
            bullets: Vec::new(),
            drones: DroneRegistry::new(),
            items: Vec::new(),
            modifiers: Modifiers::default(),
            shake: ScreenShake::default(),
            shake_enabled: true,
            events: Vec::new(),
            loadout,
            next_id: 1,
        };
        if state.config.run.intro_dialogue.is_empty() {
            state.enter_playing();
        } else {
            state.set_phase(GamePhase::Intro { line: 0 });
        }
        state
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub fn emit(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    pub fn play(&mut self, sound: SoundEffect) {
        self.events.push(GameEvent::Sound(sound));
    }

    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn set_phase(&mut self, phase: GamePhase) {
        if self.phase == phase {
            return;
        }
        log::info!("Phase {:?} -> {:?}", self.phase, phase);
        self.phase = phase;
        self.emit(GameEvent::PhaseChanged(phase));
    }

    /// Begin active play: timers run and gameplay music starts
    pub fn enter_playing(&mut self) {
        self.set_phase(GamePhase::Playing);
        self.emit(GameEvent::Music(MusicCue::Gameplay));
    }

    /// Toggle between playing and paused. Ignored in any other phase.
    pub fn toggle_pause(&mut self) -> bool {
        match self.phase {
            GamePhase::Playing => {
                self.set_phase(GamePhase::Paused);
                self.emit(GameEvent::Music(MusicCue::Stop));
                true
            }
            GamePhase::Paused => {
                self.enter_playing();
                true
            }
            _ => false,
        }
    }

    pub fn elapsed_ms(&self) -> u64 {
        ticks_to_ms(self.time_ticks)
    }

    pub fn remaining_ms(&self) -> u64 {
        self.config.run.duration_ms.saturating_sub(self.elapsed_ms())
    }

    pub fn duration_ticks(&self) -> u64 {
        ms_to_ticks(self.config.run.duration_ms)
    }

    pub fn line_y(&self) -> f32 {
        self.config.arena.line_y()
    }

    /// Grant a kill reward: score, kill count and score-to-currency conversion
    pub fn credit_kill(&mut self, kind: EnemyKind, score: u32) {
        self.score += u64::from(score);
        self.kills += 1;
        let divisor = u64::from(self.config.combat.score_per_currency.max(1));
        let gained = (self.score / divisor).saturating_sub(self.last_converted_score / divisor);
        if gained > 0 {
            self.currency += gained;
            self.last_converted_score = self.score;
        }
        self.emit(GameEvent::EnemyKilled { kind, score });
        self.play(SoundEffect::EnemyDeath(kind));
    }

    /// Level to report at the end of the run
    pub fn final_level(&self) -> u32 {
        let from_score = self.score / u64::from(self.config.combat.score_per_level.max(1));
        self.level.max(self.loadout.level) + from_score as u32
    }

    pub fn spawn_enemy(&mut self, kind: EnemyKind, pos: Vec2) -> u32 {
        let id = self.next_entity_id();
        let spec = *self.config.enemies.get(kind);
        let flash = ms_to_ticks(self.config.combat.flash_ms);
        self.enemies
            .push(Enemy::spawn(id, kind, pos, &spec, self.spawner.scaling, flash));
        id
    }

    pub fn spawn_item(&mut self, kind: ItemKind, pos: Vec2) -> u32 {
        let id = self.next_entity_id();
        let size = self.config.items.size;
        let lifespan = ms_to_ticks(self.config.items.lifespan_ms);
        self.items.push(Item::new(id, kind, pos, size, lifespan));
        id
    }

    /// Whether the run-start profile owns a skill
    pub fn owns_skill(&self, skill: Skill) -> bool {
        self.loadout.owned_skills.contains(&skill)
    }

    /// Turn a skill on or off locally. Activating an unowned skill is rejected.
    pub fn set_skill_active(&mut self, skill: Skill, on: bool) -> bool {
        if on && !self.owns_skill(skill) {
            log::warn!("Attempted to activate unowned skill: {}", skill.id());
            return false;
        }
        self.skills.set_active(skill, on);
        true
    }

    /// Reset every run-level counter and collection from the run-start loadout
    fn reset_run(&mut self) {
        self.time_ticks = 0;
        self.base_health = self.config.run.initial_base_health;
        self.score = 0;
        self.kills = 0;
        self.currency = self.loadout.currency;
        self.last_converted_score = 0;
        self.level = self.loadout.level;
        self.won = false;
        self.lost = false;
        self.player = build_player(&self.config, &self.loadout);
        // Dropping the enemies drops their base-damage countdowns with them
        self.enemies.clear();
        self.bullets.clear();
        self.items.clear();
        self.turrets = build_turrets(&self.config);
        self.drones.clear();
        self.spawner = WaveSpawner::new(&self.config.spawner);
        self.item_timer = IntervalTimer::from_ms(self.config.items.spawn_interval_ms);
        self.skills = SkillSet::new(self.loadout.skills.iter().copied());
        self.modifiers = Modifiers::default();
        self.shake.clear();
    }

    /// Start over from the run-start loadout, straight into play
    pub fn restart(&mut self) {
        log::info!("Restarting run");
        self.reset_run();
        self.enter_playing();
    }

    /// Leave the run: stop music and release every collection
    pub fn cleanup(&mut self) {
        log::info!("Cleaning up run");
        self.enemies.clear();
        self.bullets.clear();
        self.items.clear();
        self.turrets.clear();
        self.drones.clear();
        self.shake.clear();
        self.emit(GameEvent::Music(MusicCue::Stop));
        self.set_phase(GamePhase::Exited);
    }
}

fn build_player(config: &GameConfig, loadout: &Loadout) -> Player {
    let mut owned = loadout.owned_weapons.clone();
    if !owned.contains(&loadout.weapon) {
        owned.push(loadout.weapon);
    }
    let weapon = WeaponState::new(loadout.weapon, *config.weapons.get(loadout.weapon));
    let spawn = Vec2::new(config.arena.width / 2.0, config.arena.height / 2.0);
    Player::new(spawn, &config.player, weapon, owned)
}

fn build_turrets(config: &GameConfig) -> Vec<Turret> {
    config
        .turret
        .positions(&config.arena)
        .into_iter()
        .map(Turret::new)
        .collect()
}
