//! Audio trigger contract
//!
//! The simulation only names sounds; playback belongs to whatever implements
//! [`SoundSink`]. The [`Mixer`] applies volume settings before forwarding.

use serde::{Deserialize, Serialize};

use crate::sim::enemy::EnemyKind;
use crate::sim::weapon::WeaponKind;

/// Sound effect types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SoundEffect {
    /// Trigger pulled and a shot left the gun
    WeaponFire(WeaponKind),
    /// Weapon changed
    WeaponSwitch,
    /// Reload started
    Reload,
    /// Bullet struck an enemy
    EnemyHit(EnemyKind),
    /// Enemy removed
    EnemyDeath(EnemyKind),
    /// Contact damage landed on the player
    PlayerHurt,
    /// Item picked up
    ItemPickup,
    TurretFire,
    DroneFire,
    /// Pointer entered a button
    UiHover,
    /// Dialogue advanced
    UiConfirm,
    GameOver,
    Victory,
}

impl SoundEffect {
    /// Opaque identifier handed to asset-backed sinks
    pub fn id(self) -> String {
        match self {
            SoundEffect::WeaponFire(kind) => format!("{}_fire", kind.name()),
            SoundEffect::WeaponSwitch => "weapon_switch".to_string(),
            SoundEffect::Reload => "reload".to_string(),
            SoundEffect::EnemyHit(kind) => format!("{}_hurt", kind.name()),
            SoundEffect::EnemyDeath(kind) => format!("{}_death", kind.name()),
            SoundEffect::PlayerHurt => "player_hurt".to_string(),
            SoundEffect::ItemPickup => "item_pickup".to_string(),
            SoundEffect::TurretFire => "turret_fire".to_string(),
            SoundEffect::DroneFire => "drone_fire".to_string(),
            SoundEffect::UiHover => "ui_hover".to_string(),
            SoundEffect::UiConfirm => "ui_confirm".to_string(),
            SoundEffect::GameOver => "game_over".to_string(),
            SoundEffect::Victory => "victory".to_string(),
        }
    }
}

/// Background music transitions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MusicCue {
    /// Start (or resume) the gameplay loop
    Gameplay,
    Stop,
}

/// Something that can play sounds. Calls must not block on playback.
pub trait SoundSink {
    fn play(&mut self, effect: SoundEffect, volume: f32);
    fn music(&mut self, cue: MusicCue, volume: f32);
}

/// Discards everything
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl SoundSink for NullSink {
    fn play(&mut self, _effect: SoundEffect, _volume: f32) {}
    fn music(&mut self, _cue: MusicCue, _volume: f32) {}
}

/// Writes each trigger to the debug log (used by the headless runner)
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSink;

impl SoundSink for LogSink {
    fn play(&mut self, effect: SoundEffect, volume: f32) {
        log::debug!("sound {} @ {:.2}", effect.id(), volume);
    }

    fn music(&mut self, cue: MusicCue, volume: f32) {
        log::debug!("music {:?} @ {:.2}", cue, volume);
    }
}

/// Keeps every trigger, for hosts that batch playback and for tests
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    pub sounds: Vec<(SoundEffect, f32)>,
    pub music: Vec<(MusicCue, f32)>,
}

impl SoundSink for RecordingSink {
    fn play(&mut self, effect: SoundEffect, volume: f32) {
        self.sounds.push((effect, volume));
    }

    fn music(&mut self, cue: MusicCue, volume: f32) {
        self.music.push((cue, volume));
    }
}

/// Volume state in front of a sink
#[derive(Debug, Clone)]
pub struct Mixer {
    master_volume: f32,
    sfx_volume: f32,
    music_volume: f32,
    muted: bool,
}

impl Default for Mixer {
    fn default() -> Self {
        Self {
            master_volume: 0.8,
            sfx_volume: 1.0,
            music_volume: 0.5,
            muted: false,
        }
    }
}

impl Mixer {
    pub fn new(master: f32, sfx: f32, music: f32) -> Self {
        let mut mixer = Self::default();
        mixer.set_master_volume(master);
        mixer.set_sfx_volume(sfx);
        mixer.set_music_volume(music);
        mixer
    }

    /// Set master volume (0.0 - 1.0)
    pub fn set_master_volume(&mut self, vol: f32) {
        self.master_volume = vol.clamp(0.0, 1.0);
    }

    /// Set SFX volume (0.0 - 1.0)
    pub fn set_sfx_volume(&mut self, vol: f32) {
        self.sfx_volume = vol.clamp(0.0, 1.0);
    }

    /// Set music volume (0.0 - 1.0)
    pub fn set_music_volume(&mut self, vol: f32) {
        self.music_volume = vol.clamp(0.0, 1.0);
    }

    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }

    pub fn is_muted(&self) -> bool {
        self.muted
    }

    fn effective_sfx_volume(&self) -> f32 {
        if self.muted {
            0.0
        } else {
            self.master_volume * self.sfx_volume
        }
    }

    fn effective_music_volume(&self) -> f32 {
        if self.muted {
            0.0
        } else {
            self.master_volume * self.music_volume
        }
    }

    /// Forward a sound effect unless it would be silent
    pub fn play<S: SoundSink>(&self, sink: &mut S, effect: SoundEffect) {
        let vol = self.effective_sfx_volume();
        if vol <= 0.0 {
            return;
        }
        sink.play(effect, vol);
    }

    /// Music cues always go through so a stop is never lost while muted
    pub fn music<S: SoundSink>(&self, sink: &mut S, cue: MusicCue) {
        sink.music(cue, self.effective_music_volume());
    }
}
