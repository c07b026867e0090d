//! Demo bot
//!
//! Produces a [`TickInput`] for the current state: shoot whatever is closest
//! to the defense line, reload during lulls, grab useful items when nothing
//! fast is nearby, otherwise hold a spot just behind the line.

use std::cmp::Ordering;

use glam::Vec2;

use crate::sim::enemy::{Behavior, Enemy};
use crate::sim::item::ItemKind;
use crate::sim::player::MoveAxes;
use crate::sim::state::GameState;
use crate::sim::tick::TickInput;

/// How far ahead (seconds) to lead a moving target
const LEAD_TIME: f32 = 0.15;
/// Chasers closer than this make item runs unsafe
const DANGER_RADIUS: f32 = 160.0;
/// Distance below the defense line the bot holds
const HOLD_OFFSET: f32 = 72.0;
/// Movement deadzone (px)
const ARRIVE_RADIUS: f32 = 6.0;

pub fn drive(state: &GameState, input: &TickInput) -> TickInput {
    let mut out = input.clone();
    out.autopilot = true;
    let player = &state.player;
    let arena = &state.config.arena;

    // Most dangerous enemy: the one furthest down the field that is on screen
    let target = state
        .enemies
        .iter()
        .filter(|e| !e.is_dead() && e.pos.y > -e.half_size())
        .max_by(|a, b| a.pos.y.partial_cmp(&b.pos.y).unwrap_or(Ordering::Equal));

    match target {
        Some(enemy) => {
            out.aim = enemy.pos + enemy.vel * LEAD_TIME;
            out.fire_pressed = true;
            out.fire_held = true;
        }
        None => {
            out.fire_pressed = false;
            out.fire_held = false;
        }
    }

    let weapon = &player.weapon;
    out.reload = !weapon.reloading && (weapon.ammo == 0 || (target.is_none() && !weapon.is_full()));

    let chaser_near = state
        .enemies
        .iter()
        .any(|e| e.behavior == Behavior::Chase && e.pos.distance(player.pos) < DANGER_RADIUS);

    let item = if chaser_near {
        None
    } else {
        state
            .items
            .iter()
            .filter(|item| match item.kind {
                ItemKind::Medkit => player.is_hurt(),
                ItemKind::Ammo => !weapon.is_full() || weapon.reloading,
            })
            .min_by(|a, b| {
                let dist_a = a.pos.distance(player.pos);
                let dist_b = b.pos.distance(player.pos);
                dist_a.partial_cmp(&dist_b).unwrap_or(Ordering::Equal)
            })
    };

    let destination = match item {
        Some(item) => item.pos,
        None => hold_position(state, target),
    };
    out.axes = steer(player.pos, destination);

    // Keep inside the arena even if the hold point is off the edge
    if player.pos.x <= player.radius + 1.0 {
        out.axes.left = false;
    }
    if player.pos.x >= arena.width - player.radius - 1.0 {
        out.axes.right = false;
    }
    out
}

/// Behind the line, drifting under the current target with a slow sway
fn hold_position(state: &GameState, target: Option<&Enemy>) -> Vec2 {
    let arena = &state.config.arena;
    let time_factor = state.time_ticks as f32 * 0.01;
    let sway = time_factor.sin() * 40.0 + (time_factor * 0.7).sin() * 20.0;
    let x = target.map_or(arena.width / 2.0, |e| e.pos.x) + sway;
    let y = (arena.line_y() + HOLD_OFFSET).min(arena.height - state.player.radius);
    Vec2::new(x.clamp(0.0, arena.width), y)
}

fn steer(from: Vec2, to: Vec2) -> MoveAxes {
    let delta = to - from;
    MoveAxes {
        up: delta.y < -ARRIVE_RADIUS,
        down: delta.y > ARRIVE_RADIUS,
        left: delta.x < -ARRIVE_RADIUS,
        right: delta.x > ARRIVE_RADIUS,
    }
}
