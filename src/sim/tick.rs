//! Fixed timestep simulation tick
//!
//! Core game loop. Per tick, in order: player, enemies (movement, base
//! damage, bullet hits, contact, removal), bullets, turrets, drones, items,
//! shake, then the end-of-run checks.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::collision::bullet_hits_enemy;
use super::enemy::Enemy;
use super::item::ItemKind;
use super::player::MoveAxes;
use super::skills::SkillContext;
use super::state::{GameEvent, GamePhase, GameState};
use super::weapon::WeaponKind;
use crate::audio::{MusicCue, SoundEffect};
use crate::{angle_to, ms_to_ticks};

/// Input commands for a single tick
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TickInput {
    /// Held movement keys
    pub axes: MoveAxes,
    /// Pointer position in arena coordinates
    pub aim: Vec2,
    /// Pointer went down this tick (semi-automatic trigger)
    pub fire_pressed: bool,
    /// Pointer is held (automatic trigger)
    pub fire_held: bool,
    pub reload: bool,
    pub switch_to: Option<WeaponKind>,
    /// Pause toggle
    pub pause: bool,
    /// Advance dialogue
    pub confirm: bool,
    /// Skip the remaining dialogue
    pub skip: bool,
    /// Demo mode - the bot plays the game
    pub autopilot: bool,
}

/// Advance the game state by one fixed timestep
pub fn tick(state: &mut GameState, input: &TickInput, dt: f32) {
    // Dialogue phases only listen for confirm/skip
    match state.phase {
        GamePhase::Intro { line } => {
            advance_intro(state, line, input);
            return;
        }
        GamePhase::Victory { line } => {
            advance_victory(state, line, input);
            return;
        }
        _ => {}
    }

    if input.pause {
        state.toggle_pause();
    }

    // Paused, over, won or exited: everything stays frozen
    if state.phase != GamePhase::Playing {
        return;
    }

    let mut input = input.clone();
    if input.autopilot {
        input = crate::autopilot::drive(state, &input);
    }
    let input = &input;

    state.time_ticks += 1;

    update_spawning(state);
    update_item_spawns(state);
    apply_skills(state);
    update_player(state, input, dt);
    update_enemies(state, dt);
    update_bullets(state, dt);
    update_turrets(state);
    update_drones(state, dt);
    update_items(state);

    if state.shake_enabled {
        state.shake.update(&mut state.rng);
    } else {
        state.shake.clear();
    }

    check_end_conditions(state);
}

fn advance_intro(state: &mut GameState, line: usize, input: &TickInput) {
    if input.skip {
        state.enter_playing();
    } else if input.confirm {
        state.play(SoundEffect::UiConfirm);
        let next = line + 1;
        if next >= state.config.run.intro_dialogue.len() {
            state.enter_playing();
        } else {
            state.set_phase(GamePhase::Intro { line: next });
        }
    }
}

fn advance_victory(state: &mut GameState, line: usize, input: &TickInput) {
    if input.skip {
        state.set_phase(GamePhase::Won);
    } else if input.confirm {
        state.play(SoundEffect::UiConfirm);
        let next = line + 1;
        if next >= state.config.run.victory_dialogue.len() {
            state.set_phase(GamePhase::Won);
        } else {
            state.set_phase(GamePhase::Victory { line: next });
        }
    }
}

fn update_spawning(state: &mut GameState) {
    let result = state.spawner.update(&state.config.spawner);
    if result.count_raised || result.scaling_raised {
        let (spawn_count, scaling) = (state.spawner.spawn_count, state.spawner.scaling);
        state.emit(GameEvent::Escalated { spawn_count, scaling });
    }
    if !result.spawn_wave {
        return;
    }
    let plan = state
        .spawner
        .plan_wave(&state.config.spawner, &state.config.arena, &mut state.rng);
    let count = plan.len() as u32;
    for (kind, pos) in plan {
        state.spawn_enemy(kind, pos);
    }
    log::debug!(
        "Wave {} spawned {} enemies (scaling {:.2})",
        state.spawner.waves_spawned,
        count,
        state.spawner.scaling
    );
    state.emit(GameEvent::WaveSpawned { count });
}

fn update_item_spawns(state: &mut GameState) {
    if !state.item_timer.tick() {
        return;
    }
    if state.rng.random::<f32>() >= state.config.items.spawn_chance {
        return;
    }
    let kind = if state.rng.random::<f32>() < state.config.items.ammo_share {
        ItemKind::Ammo
    } else {
        ItemKind::Medkit
    };
    let pad = state.config.items.padding;
    let (width, height) = (state.config.arena.width, state.config.arena.height);
    let x = random_between(&mut state.rng, pad, width - pad);
    let y = random_between(&mut state.rng, pad, height - pad);
    state.spawn_item(kind, Vec2::new(x, y));
}

fn random_between<R: Rng>(rng: &mut R, lo: f32, hi: f32) -> f32 {
    if hi > lo {
        rng.random_range(lo..hi)
    } else {
        (lo + hi) / 2.0
    }
}

/// Evaluate passive skills once and hand the result to the player
fn apply_skills(state: &mut GameState) {
    let ctx = SkillContext {
        ticks_since_damage: state.player.ticks_since_damage,
        max_health: state.player.max_health,
    };
    state.modifiers = state.skills.evaluate(ctx, &state.config.skills);
    state.player.speed_modifier = state.modifiers.speed;
    state.player.reload_modifier = state.modifiers.reload;
    if state.modifiers.regeneration > 0.0 {
        state.player.heal(state.modifiers.regeneration);
    }
}

fn update_player(state: &mut GameState, input: &TickInput, dt: f32) {
    if let Some(kind) = input.switch_to
        && state.player.switch_weapon(kind, &state.config.weapons)
    {
        state.emit(GameEvent::WeaponSwitched(kind));
        state.play(SoundEffect::WeaponSwitch);
    }

    if input.reload && state.player.start_reload() {
        state.emit(GameEvent::ReloadStarted);
        state.play(SoundEffect::Reload);
    }

    state.player.aim_at(input.aim);
    state.player.update(input.axes, &state.config.arena, dt);

    if state.player.update_reload() {
        state.emit(GameEvent::ReloadFinished);
    }

    let wants_fire = if state.player.weapon.spec.automatic {
        input.fire_held
    } else {
        input.fire_pressed
    };
    if !wants_fire {
        return;
    }

    let was_reloading = state.player.weapon.reloading;
    let kind = state.player.weapon.kind;
    if state.player.attempt_fire(input.aim, &mut state.bullets) {
        state.play(SoundEffect::WeaponFire(kind));
    }
    // Empty magazine: the trigger pull (or last shot) started a reload
    if !was_reloading && state.player.weapon.reloading {
        state.emit(GameEvent::ReloadStarted);
        state.play(SoundEffect::Reload);
    }
}

fn update_enemies(state: &mut GameState, dt: f32) {
    let combat = state.config.combat.clone();
    let arena = state.config.arena.clone();
    let base_period = state.config.base_damage_ticks();
    let burn_ticks = ms_to_ticks(combat.burn_ms);

    // Nothing spawns during this pass, so the list can be held outside the state
    let mut enemies = std::mem::take(&mut state.enemies);

    for enemy in enemies.iter_mut() {
        let touching = enemy.update(&mut state.player, &arena, &combat, dt);

        if state.base_health > 0.0 {
            if enemy.tick_base_damage(base_period) {
                let amount = enemy.damage;
                state.base_health = (state.base_health - amount).max(0.0);
                let remaining = state.base_health;
                state.emit(GameEvent::BaseDamaged { amount, remaining });
            }
        } else {
            enemy.base_damage_countdown = None;
        }

        resolve_bullet_hits(state, enemy, burn_ticks);

        // A bullet kill this tick takes precedence over contact
        if touching && !enemy.is_dead() {
            resolve_contact(state, enemy);
        }
    }

    // Removal after every collision pass; anything not yet credited goes
    // through the non-bullet path exactly once
    let mut survivors = Vec::with_capacity(enemies.len());
    for mut enemy in enemies {
        if !enemy.is_dead() {
            survivors.push(enemy);
            continue;
        }
        if enemy.claim_credit() {
            state.credit_kill(enemy.kind, enemy.score);
        }
    }
    state.enemies = survivors;
}

/// Bullets vs one enemy. Each hit consumes its bullet in this pass; a dead
/// enemy stops absorbing bullets.
fn resolve_bullet_hits(state: &mut GameState, enemy: &mut Enemy, burn_ticks: u64) {
    let snap = state.config.combat.knockback_snap;
    let mut i = 0;
    while i < state.bullets.len() && !enemy.is_dead() {
        if !bullet_hits_enemy(&state.bullets[i], enemy) {
            i += 1;
            continue;
        }
        let bullet = state.bullets.remove(i);
        enemy.take_damage(bullet.damage, bullet.knockback, bullet.angle, snap);
        if bullet.ignites {
            enemy.ignite(burn_ticks, state.config.combat.burn_damage);
        }

        let combat = &state.config.combat;
        let (intensity, duration) = (combat.shake_intensity, combat.shake_duration_ms);
        state.shake.trigger(intensity, duration);
        state.play(SoundEffect::EnemyHit(enemy.kind));

        if enemy.is_dead() && enemy.claim_credit() {
            state.credit_kill(enemy.kind, enemy.score);
            let stolen = bullet.damage * state.modifiers.life_steal;
            if stolen > 0.0 {
                state.player.heal(stolen);
            }
        }
    }
}

/// Contact damage (subject to invincibility and thorns), then shove the enemy away
fn resolve_contact(state: &mut GameState, enemy: &mut Enemy) {
    let combat = &state.config.combat;
    let snap = combat.knockback_snap;
    let shove = combat.contact_knockback;

    if state.player.can_take_damage() {
        let reflected = enemy.damage * state.modifiers.thorns;
        if reflected > 0.0 {
            enemy.take_damage(reflected, 0.0, 0.0, snap);
        }
        let amount = enemy.damage;
        state.player.take_damage(amount);
        let remaining = state.player.health;
        state.emit(GameEvent::PlayerDamaged { amount, remaining });
        state.play(SoundEffect::PlayerHurt);
    }

    let away = angle_to(state.player.pos, enemy.pos);
    enemy.apply_knockback(shove, away, snap);
}

fn update_bullets(state: &mut GameState, dt: f32) {
    for bullet in state.bullets.iter_mut() {
        bullet.update(dt);
    }
    let arena = &state.config.arena;
    state.bullets.retain(|b| !b.is_expired(arena));
}

fn update_turrets(state: &mut GameState) {
    let mut shots = 0;
    for turret in state.turrets.iter_mut() {
        if turret.update(&state.enemies, &state.config.turret, &mut state.bullets) {
            shots += 1;
        }
    }
    for _ in 0..shots {
        state.play(SoundEffect::TurretFire);
    }
}

fn update_drones(state: &mut GameState, dt: f32) {
    state.drones.resize(state.target_drone_count, state.player.pos);
    let shots = state.drones.update(
        &state.player,
        &state.enemies,
        &state.config.drones,
        &mut state.bullets,
        dt,
    );
    for _ in 0..shots {
        state.play(SoundEffect::DroneFire);
    }
}

fn update_items(state: &mut GameState) {
    let mut collected = Vec::new();
    for item in state.items.iter_mut() {
        if item.touches(&state.player) && item.kind.apply(&mut state.player, &state.config.items) {
            item.collected = true;
            collected.push(item.kind);
        } else {
            item.update();
        }
    }
    state.items.retain(|item| !item.collected && !item.is_expired());

    for kind in collected {
        state.emit(GameEvent::ItemCollected(kind));
        state.play(SoundEffect::ItemPickup);
    }
}

/// Loss is checked first; each outcome fires at most once per run
fn check_end_conditions(state: &mut GameState) {
    if state.won || state.lost {
        return;
    }

    if state.player.is_dead() || state.base_health <= 0.0 {
        state.lost = true;
        stop_run_timers(state);
        state.emit(GameEvent::Music(MusicCue::Stop));
        state.play(SoundEffect::GameOver);
        state.set_phase(GamePhase::GameOver);
        log::info!(
            "Game over after {}s: score {}, kills {}",
            state.elapsed_ms() / 1000,
            state.score,
            state.kills
        );
    } else if state.time_ticks >= state.duration_ticks() {
        state.won = true;
        stop_run_timers(state);
        state.emit(GameEvent::Music(MusicCue::Stop));
        state.play(SoundEffect::Victory);
        if state.config.run.victory_dialogue.is_empty() {
            state.set_phase(GamePhase::Won);
        } else {
            state.set_phase(GamePhase::Victory { line: 0 });
        }
        log::info!("Survived: score {}, kills {}", state.score, state.kills);
    }
}

fn stop_run_timers(state: &mut GameState) {
    for enemy in state.enemies.iter_mut() {
        enemy.base_damage_countdown = None;
    }
    state.shake.clear();
}
