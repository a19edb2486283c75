//! Sound cues and the audio collaborator boundary
//!
//! The game only names sounds; mixing and playback belong to whatever
//! implements [`AudioSink`].

use crate::settings::Settings;

/// Audio collaborator: fire-and-forget playback by name
pub trait AudioSink {
    fn play_sound(&mut self, name: &str, volume: f32);
    fn stop_sound(&mut self, name: &str);
}

/// Sink for headless runs: every cue goes to the log
#[derive(Debug, Default)]
pub struct LogSink;

impl AudioSink for LogSink {
    fn play_sound(&mut self, name: &str, volume: f32) {
        log::debug!("play '{name}' at {volume:.2}");
    }

    fn stop_sound(&mut self, name: &str) {
        log::debug!("stop '{name}'");
    }
}

/// Sound effect types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundEffect {
    /// Player landed a blow
    Hit,
    /// Player took damage
    Hurt,
    /// Someone died
    Death,
    /// Player walked into a map zone
    Trigger,
    /// Screen confirmed
    Confirm,
    GameOver,
}

impl SoundEffect {
    pub fn name(self) -> &'static str {
        match self {
            SoundEffect::Hit => "hit",
            SoundEffect::Hurt => "hurt",
            SoundEffect::Death => "death",
            SoundEffect::Trigger => "trigger",
            SoundEffect::Confirm => "confirm",
            SoundEffect::GameOver => "game_over",
        }
    }
}

/// Audio manager for the game
pub struct AudioManager {
    sink: Box<dyn AudioSink>,
    master_volume: f32,
    sfx_volume: f32,
    music_volume: f32,
    muted: bool,
    music: Option<String>,
}

impl AudioManager {
    pub fn new(sink: Box<dyn AudioSink>) -> Self {
        Self {
            sink,
            master_volume: 0.8,
            sfx_volume: 1.0,
            music_volume: 0.7,
            muted: false,
            music: None,
        }
    }

    pub fn from_settings(sink: Box<dyn AudioSink>, settings: &Settings) -> Self {
        let mut audio = Self::new(sink);
        audio.set_master_volume(settings.master_volume);
        audio.set_sfx_volume(settings.sfx_volume);
        audio.set_music_volume(settings.music_volume);
        audio.set_muted(settings.muted);
        audio
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

    /// Mute/unmute all audio
    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }

    fn effective_volume(&self, channel: f32) -> f32 {
        if self.muted { 0.0 } else { self.master_volume * channel }
    }

    /// Play a sound effect
    pub fn play(&mut self, effect: SoundEffect) {
        let vol = self.effective_volume(self.sfx_volume);
        if vol <= 0.0 {
            return;
        }
        self.sink.play_sound(effect.name(), vol);
    }

    /// Switch the looping track; replaying the current one does nothing
    pub fn play_music(&mut self, name: &str) {
        if self.music.as_deref() == Some(name) {
            return;
        }
        self.stop_music();
        let vol = self.effective_volume(self.music_volume);
        self.sink.play_sound(name, vol);
        self.music = Some(name.to_string());
    }

    pub fn stop_music(&mut self) {
        if let Some(name) = self.music.take() {
            self.sink.stop_sound(&name);
        }
    }
}
