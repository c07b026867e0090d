//! Host-facing engine
//!
//! Wraps a [`GameState`] with everything a host loop needs: raw input events,
//! frame pacing into fixed ticks, sound dispatch and the profile gateway calls
//! made around a run.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::audio::{Mixer, SoundSink};
use crate::consts::{MAX_FRAME_DT, MAX_SUBSTEPS, SIM_DT};
use crate::profile::{GatewayError, PlayerProfile, ProfileGateway, RunStats};
use crate::settings::Settings;
use crate::sim::skills::Skill;
use crate::sim::snapshot::RenderSnapshot;
use crate::sim::state::{GameEvent, GamePhase, GameState, Loadout};
use crate::sim::tick::{TickInput, tick};
use crate::sim::weapon::WeaponKind;
use crate::tuning::GameConfig;

/// Logical keys the engine understands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Key {
    Up,
    Down,
    Left,
    Right,
    /// Weapon slot (1-3)
    Slot(u8),
    Reload,
    Pause,
    Confirm,
    Skip,
}

impl Key {
    /// Map a DOM-style key name
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "w" | "W" | "ArrowUp" => Some(Key::Up),
            "s" | "S" | "ArrowDown" => Some(Key::Down),
            "a" | "A" | "ArrowLeft" => Some(Key::Left),
            "d" | "D" | "ArrowRight" => Some(Key::Right),
            "1" => Some(Key::Slot(1)),
            "2" => Some(Key::Slot(2)),
            "3" => Some(Key::Slot(3)),
            "r" | "R" => Some(Key::Reload),
            "Escape" | "p" | "P" => Some(Key::Pause),
            "Enter" | " " => Some(Key::Confirm),
            "Tab" => Some(Key::Skip),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum InputEvent {
    PointerMove { x: f32, y: f32 },
    PointerDown,
    PointerUp,
    KeyDown(Key),
    KeyUp(Key),
    /// Host window shown or hidden
    Visibility { visible: bool },
}

pub struct Engine<S: SoundSink> {
    state: GameState,
    /// Held keys plus one-shot commands waiting for the next tick
    input: TickInput,
    accumulator: f32,
    settings: Settings,
    mixer: Mixer,
    sink: S,
    /// Profile as it was when the run started
    start_profile: PlayerProfile,
    paused_by_visibility: bool,
    hidden: bool,
    /// Events from the most recent frame
    recent_events: Vec<GameEvent>,
    /// Last gateway failure, until dismissed
    last_error: Option<String>,
}

impl<S: SoundSink> Engine<S> {
    pub fn new(
        config: GameConfig,
        profile: PlayerProfile,
        settings: Settings,
        sink: S,
        seed: u64,
    ) -> Self {
        let mut state = GameState::new(config, Loadout::from(&profile), seed);
        state.shake_enabled = settings.effective_screen_shake();
        log::info!("Run started with seed {}", seed);
        let mut engine = Self {
            state,
            input: TickInput::default(),
            accumulator: 0.0,
            mixer: Mixer::new(settings.master_volume, settings.sfx_volume, settings.music_volume),
            settings,
            sink,
            start_profile: profile,
            paused_by_visibility: false,
            hidden: false,
            recent_events: Vec::new(),
            last_error: None,
        };
        engine.dispatch_events();
        engine
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut GameState {
        &mut self.state
    }

    pub fn phase(&self) -> GamePhase {
        self.state.phase
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn start_profile(&self) -> &PlayerProfile {
        &self.start_profile
    }

    pub fn recent_events(&self) -> &[GameEvent] {
        &self.recent_events
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn dismiss_error(&mut self) {
        self.last_error = None;
    }

    pub fn set_settings(&mut self, settings: Settings) {
        self.mixer = Mixer::new(settings.master_volume, settings.sfx_volume, settings.music_volume);
        self.mixer.set_muted(self.hidden && settings.mute_on_blur);
        self.state.shake_enabled = settings.effective_screen_shake();
        self.settings = settings;
    }

    /// Externally controlled drone population
    pub fn set_drone_count(&mut self, count: usize) {
        self.state.target_drone_count = count;
    }

    /// Let the bot drive (demo mode)
    pub fn set_autopilot(&mut self, enabled: bool) {
        self.input.autopilot = enabled;
    }

    pub fn handle_event(&mut self, event: InputEvent) {
        match event {
            InputEvent::PointerMove { x, y } => self.input.aim = Vec2::new(x, y),
            InputEvent::PointerDown => {
                self.input.fire_pressed = true;
                self.input.fire_held = true;
            }
            InputEvent::PointerUp => self.input.fire_held = false,
            InputEvent::KeyDown(key) => self.key(key, true),
            InputEvent::KeyUp(key) => self.key(key, false),
            InputEvent::Visibility { visible } => self.set_visible(visible),
        }
    }

    fn key(&mut self, key: Key, down: bool) {
        match key {
            Key::Up => self.input.axes.up = down,
            Key::Down => self.input.axes.down = down,
            Key::Left => self.input.axes.left = down,
            Key::Right => self.input.axes.right = down,
            // One-shot commands fire on key down only
            _ if !down => {}
            Key::Slot(slot) => match WeaponKind::from_slot(slot) {
                Some(kind) => self.input.switch_to = Some(kind),
                None => log::warn!("No weapon in slot {}", slot),
            },
            Key::Reload => self.input.reload = true,
            Key::Pause => {
                self.input.pause = true;
                self.paused_by_visibility = false;
            }
            Key::Confirm => self.input.confirm = true,
            Key::Skip => self.input.skip = true,
        }
    }

    fn release_held(&mut self) {
        self.input.axes = Default::default();
        self.input.fire_held = false;
    }

    fn set_visible(&mut self, visible: bool) {
        self.hidden = !visible;
        self.mixer.set_muted(self.hidden && self.settings.mute_on_blur);

        if !visible {
            // Keys released while hidden never arrive
            self.release_held();
            if self.state.phase == GamePhase::Playing {
                self.state.toggle_pause();
                self.paused_by_visibility = true;
                log::info!("Auto-paused (window hidden)");
            }
        } else if self.paused_by_visibility {
            self.paused_by_visibility = false;
            if self.state.phase == GamePhase::Paused {
                self.state.toggle_pause();
                log::info!("Resumed (window visible)");
            }
        }
        self.dispatch_events();
    }

    /// Advance by a real frame delta. Returns the number of ticks run.
    pub fn frame(&mut self, dt: f32) -> u32 {
        let dt = dt.clamp(0.0, MAX_FRAME_DT);
        self.accumulator += dt;

        let mut substeps = 0;
        while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
            tick(&mut self.state, &self.input, SIM_DT);
            self.accumulator -= SIM_DT;
            substeps += 1;

            // Clear one-shot inputs after processing
            self.input.fire_pressed = false;
            self.input.reload = false;
            self.input.switch_to = None;
            self.input.pause = false;
            self.input.confirm = false;
            self.input.skip = false;
        }

        self.dispatch_events();
        substeps
    }

    /// Forward sound and music cues; keep the rest for the host
    fn dispatch_events(&mut self) {
        self.recent_events = self.state.drain_events();
        for event in &self.recent_events {
            match *event {
                GameEvent::Sound(effect) => self.mixer.play(&mut self.sink, effect),
                GameEvent::Music(cue) => self.mixer.music(&mut self.sink, cue),
                _ => {}
            }
        }
    }

    pub fn snapshot(&self) -> RenderSnapshot {
        RenderSnapshot::capture(&self.state, self.settings.reduced_motion)
    }

    pub fn restart(&mut self) {
        self.state.restart();
        let autopilot = self.input.autopilot;
        self.input = TickInput {
            aim: self.input.aim,
            autopilot,
            ..Default::default()
        };
        self.accumulator = 0.0;
        self.paused_by_visibility = false;
        self.dispatch_events();
    }

    pub fn cleanup(&mut self) {
        self.state.cleanup();
        self.input = TickInput::default();
        self.dispatch_events();
    }

    pub fn final_stats(&self) -> RunStats {
        RunStats::from_state(&self.state)
    }

    pub fn submit_final_stats<G: ProfileGateway>(
        &mut self,
        gateway: &mut G,
    ) -> Result<PlayerProfile, GatewayError> {
        let stats = self.final_stats();
        gateway.submit_stats(&stats).inspect_err(|e| {
            log::warn!("Failed to submit run stats: {}", e);
            self.last_error = Some(e.to_string());
        })
    }

    /// Flip a passive skill, confirm with the gateway, and roll back on
    /// failure. Returns whether the skill is active afterwards.
    pub fn toggle_skill<G: ProfileGateway>(
        &mut self,
        gateway: &mut G,
        id: &str,
    ) -> Result<bool, GatewayError> {
        let Some(skill) = Skill::from_id(id) else {
            log::warn!("Attempted to toggle unknown skill: {}", id);
            return Ok(false);
        };
        if !self.start_profile.owned_items.owns_anywhere(id) {
            log::warn!("Attempted to toggle unowned skill: {}", id);
            return Ok(self.state.skills.is_active(skill));
        }

        let was_active = self.state.skills.is_active(skill);
        self.state.set_skill_active(skill, !was_active);
        let ids = self.state.skills.ids();
        match gateway.set_active_skills(&ids) {
            Ok(()) => Ok(!was_active),
            Err(e) => {
                log::warn!("Skill toggle rejected, reverting {}: {}", id, e);
                self.state.set_skill_active(skill, was_active);
                self.last_error = Some(e.to_string());
                Err(e)
            }
        }
    }
}
