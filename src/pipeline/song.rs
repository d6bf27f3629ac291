use std::fmt;

use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize, Serializer};

use crate::audio_api::SoundEvent;
use crate::shared::{
    ChannelId, DEFAULT_PAN, DEFAULT_STEPS, DEFAULT_TEMPO, DEFAULT_VOLUME, Sound, TEMPO_FLOOR,
    next_channel_id,
};

/// The whole arrangement. Owns its channels, which own their steps.
///
/// Every change to a persisted field bumps `revision`, which is what the
/// share-token memo keys on. Playhead markers (`Step::active`) do not.
#[derive(Clone, Debug)]
pub struct Song {
    name: String,
    tempo: u32,
    channels: Vec<Channel>,
    revision: u64,
}

impl Default for Song {
    fn default() -> Self {
        Self::new(String::new(), DEFAULT_TEMPO)
    }
}

impl Song {
    pub fn new(name: String, tempo: u32) -> Self {
        Self {
            name,
            tempo,
            channels: Vec::new(),
            revision: 0,
        }
    }

    pub fn with_channels(name: String, tempo: u32, channels: Vec<Channel>) -> Self {
        Self {
            name,
            tempo,
            channels,
            revision: 0,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn tempo(&self) -> u32 {
        self.tempo
    }

    pub fn channels(&self) -> &[Channel] {
        &self.channels
    }

    pub fn channel(&self, id: ChannelId) -> Option<&Channel> {
        self.channels.iter().find(|c| c.id == id)
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    fn touch(&mut self) {
        self.revision += 1;
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
        self.touch();
    }

    /// Tempo has no musical ceiling, only the integer one. Returns false
    /// once it is reached.
    pub fn increase_tempo(&mut self) -> bool {
        if self.tempo == u32::MAX {
            return false;
        }
        self.tempo += 1;
        self.touch();
        true
    }

    /// No-op once tempo is at or below the floor.
    pub fn decrease_tempo(&mut self) -> bool {
        if self.tempo > TEMPO_FLOOR {
            self.tempo -= 1;
            self.touch();
            true
        } else {
            false
        }
    }

    /// Append a fresh channel of `sound` with the default sixteen silent steps.
    pub fn add_channel(&mut self, sound: Sound) -> ChannelId {
        let mut channel = Channel::new(sound);
        channel.add_steps(DEFAULT_STEPS);
        let id = channel.id;
        self.channels.push(channel);
        self.touch();
        id
    }

    pub fn remove_channel(&mut self, id: ChannelId) -> Option<Channel> {
        let index = self.channels.iter().position(|c| c.id == id)?;
        self.touch();
        Some(self.channels.remove(index))
    }

    /// Run a persisted-field edit against one channel and bump the revision
    /// if the channel exists.
    pub fn edit_channel<R>(
        &mut self,
        id: ChannelId,
        f: impl FnOnce(&mut Channel) -> R,
    ) -> Option<R> {
        let channel = self.channels.iter_mut().find(|c| c.id == id)?;
        let out = f(channel);
        self.touch();
        Some(out)
    }

    /// Like `edit_channel`, for edits that may turn out to change nothing.
    /// `f` reports whether it changed anything; only then does the revision
    /// move.
    pub fn update_channel(
        &mut self,
        id: ChannelId,
        f: impl FnOnce(&mut Channel) -> bool,
    ) -> Option<bool> {
        let channel = self.channels.iter_mut().find(|c| c.id == id)?;
        let changed = f(channel);
        if changed {
            self.touch();
        }
        Some(changed)
    }

    // Playhead updates go through here so they never count as an edit.
    pub(crate) fn channel_mut(&mut self, id: ChannelId) -> Option<&mut Channel> {
        self.channels.iter_mut().find(|c| c.id == id)
    }
}

#[derive(Clone, Debug)]
pub struct Channel {
    id: ChannelId,
    pub sound: Sound,
    pub volume: f64,
    pub pan: f64,
    steps: Vec<Step>,
}

impl Channel {
    pub fn new(sound: Sound) -> Self {
        Self::with_steps(sound, DEFAULT_VOLUME, Vec::new())
    }

    pub fn with_steps(sound: Sound, volume: f64, steps: Vec<Step>) -> Self {
        Self {
            id: next_channel_id(),
            sound,
            volume,
            pan: DEFAULT_PAN,
            steps,
        }
    }

    pub fn id(&self) -> ChannelId {
        self.id
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub fn step_count(&self) -> usize {
        self.steps.len()
    }

    pub fn add_step(&mut self) {
        self.steps.push(Step::default());
    }

    pub fn add_steps(&mut self, n: usize) {
        for _ in 0..n {
            self.add_step();
        }
    }

    /// Pop the last step. A channel never drops below one step, since a
    /// zero-length channel has no playhead position.
    pub fn remove_step(&mut self) -> Option<Step> {
        if self.steps.len() <= 1 {
            return None;
        }
        self.steps.pop()
    }

    /// Advance one step's velocity 0 -> 0.5 -> 1 -> 0 and return the new value.
    pub fn cycle_step(&mut self, index: usize) -> Option<Velocity> {
        let step = self.steps.get_mut(index)?;
        step.velocity = step.velocity.next();
        Some(step.velocity)
    }

    pub fn set_velocity(&mut self, index: usize, velocity: Velocity) -> bool {
        match self.steps.get_mut(index) {
            Some(step) => {
                step.velocity = velocity;
                true
            }
            None => false,
        }
    }

    pub fn previous_sound(&mut self) -> Sound {
        self.sound = self.sound.previous();
        self.sound
    }

    pub fn next_sound(&mut self) -> Sound {
        self.sound = self.sound.next();
        self.sound
    }

    /// Returns false if the channel was already muted.
    pub fn mute(&mut self) -> bool {
        let changed = self.volume != 0.0;
        self.volume = 0.0;
        changed
    }

    /// Back to full volume. Returns false if it was already there.
    pub fn unmute(&mut self) -> bool {
        let changed = self.volume != 1.0;
        self.volume = 1.0;
        changed
    }

    pub fn is_muted(&self) -> bool {
        self.volume == 0.0
    }

    /// Move the playhead marker: clear every step, then light `index`.
    pub fn mark_active(&mut self, index: usize) {
        for step in &mut self.steps {
            step.active = false;
        }
        if let Some(step) = self.steps.get_mut(index) {
            step.active = true;
        }
    }

    pub fn active_step(&self) -> Option<usize> {
        self.steps.iter().position(|s| s.active)
    }

    /// The trigger this channel emits for a hit of `velocity`.
    pub fn trigger(&self, velocity: f64) -> SoundEvent {
        SoundEvent {
            sound: self.sound,
            velocity: velocity * self.volume,
            pan: self.pan,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Step {
    pub velocity: Velocity,
    pub active: bool, // playhead marker, never persisted
}

impl Step {
    pub fn new(velocity: Velocity) -> Self {
        Self { velocity, active: false }
    }

    pub fn enabled(&self) -> bool {
        self.velocity != Velocity::Off
    }
}

/// Per-step accent level. On the wire it is the bare number 0, 0.5 or 1.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Velocity {
    #[default]
    Off,
    Soft,
    Full,
}

impl Velocity {
    pub fn value(self) -> f64 {
        match self {
            Velocity::Off => 0.0,
            Velocity::Soft => 0.5,
            Velocity::Full => 1.0,
        }
    }

    pub fn from_value(value: f64) -> Option<Self> {
        if value == 0.0 {
            Some(Velocity::Off)
        } else if value == 0.5 {
            Some(Velocity::Soft)
        } else if value == 1.0 {
            Some(Velocity::Full)
        } else {
            None
        }
    }

    pub fn next(self) -> Self {
        match self {
            Velocity::Off => Velocity::Soft,
            Velocity::Soft => Velocity::Full,
            Velocity::Full => Velocity::Off,
        }
    }
}

impl Serialize for Velocity {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Velocity::Off => serializer.serialize_u8(0),
            Velocity::Soft => serializer.serialize_f64(0.5),
            Velocity::Full => serializer.serialize_u8(1),
        }
    }
}

impl<'de> Deserialize<'de> for Velocity {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct VelocityVisitor;

        impl Visitor<'_> for VelocityVisitor {
            type Value = Velocity;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a velocity of 0, 0.5 or 1")
            }

            fn visit_f64<E: de::Error>(self, v: f64) -> Result<Velocity, E> {
                Velocity::from_value(v)
                    .ok_or_else(|| E::invalid_value(de::Unexpected::Float(v), &self))
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<Velocity, E> {
                Velocity::from_value(v as f64)
                    .ok_or_else(|| E::invalid_value(de::Unexpected::Unsigned(v), &self))
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<Velocity, E> {
                Velocity::from_value(v as f64)
                    .ok_or_else(|| E::invalid_value(de::Unexpected::Signed(v), &self))
            }
        }

        deserializer.deserialize_f64(VelocityVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_channel_has_default_steps() {
        let mut song = Song::default();
        let id = song.add_channel(Sound::Snare);
        let channel = song.channel(id).unwrap();
        assert_eq!(channel.step_count(), DEFAULT_STEPS);
        assert!(channel.steps().iter().all(|s| !s.enabled()));
        assert_eq!(channel.volume, 1.0);
        assert_eq!(channel.pan, 1.0);
    }

    #[test]
    fn test_tempo_floor() {
        let mut song = Song::new(String::new(), 6);
        assert!(song.decrease_tempo());
        assert!(!song.decrease_tempo());
        assert!(!song.decrease_tempo());
        assert_eq!(song.tempo(), TEMPO_FLOOR);

        song.increase_tempo();
        assert_eq!(song.tempo(), 6);
    }

    #[test]
    fn test_tempo_has_no_ceiling() {
        let mut song = Song::new(String::new(), 300);
        for _ in 0..50 {
            song.increase_tempo();
        }
        assert_eq!(song.tempo(), 350);
    }

    #[test]
    fn test_increase_tempo_stops_at_integer_limit() {
        let mut song = Song::new(String::new(), u32::MAX - 1);
        assert!(song.increase_tempo());
        let revision = song.revision();
        assert!(!song.increase_tempo());
        assert!(!song.increase_tempo());
        assert_eq!(song.tempo(), u32::MAX);
        assert_eq!(song.revision(), revision);
    }

    #[test]
    fn test_revision_bumps_on_edits_only() {
        let mut song = Song::default();
        let id = song.add_channel(Sound::Kick);
        let after_add = song.revision();

        song.channel_mut(id).unwrap().mark_active(3);
        assert_eq!(song.revision(), after_add);

        song.edit_channel(id, |c| c.cycle_step(0));
        assert!(song.revision() > after_add);

        // refused tempo decrease is not an edit
        let mut floor = Song::new(String::new(), TEMPO_FLOOR);
        floor.decrease_tempo();
        assert_eq!(floor.revision(), 0);
    }

    #[test]
    fn test_update_channel_bumps_only_on_change() {
        let mut song = Song::default();
        let id = song.add_channel(Sound::TomHi);
        let start = song.revision();

        assert_eq!(song.update_channel(id, Channel::unmute), Some(false));
        assert_eq!(song.revision(), start);

        assert_eq!(song.update_channel(id, Channel::mute), Some(true));
        assert_eq!(song.update_channel(id, Channel::mute), Some(false));
        assert_eq!(song.revision(), start + 1);

        let stray = Channel::new(Sound::Rim).id();
        assert_eq!(song.update_channel(stray, Channel::mute), None);
        assert_eq!(song.revision(), start + 1);
    }

    #[test]
    fn test_edit_unknown_channel() {
        let mut song = Song::default();
        let stray = Channel::new(Sound::Rim).id();
        assert!(song.edit_channel(stray, |c| c.mute()).is_none());
        assert_eq!(song.revision(), 0);
        assert!(song.remove_channel(stray).is_none());
    }

    #[test]
    fn test_velocity_cycle() {
        let mut channel = Channel::new(Sound::Clap);
        channel.add_steps(2);
        assert_eq!(channel.cycle_step(1), Some(Velocity::Soft));
        assert_eq!(channel.cycle_step(1), Some(Velocity::Full));
        assert_eq!(channel.cycle_step(1), Some(Velocity::Off));
        assert_eq!(channel.cycle_step(9), None);
    }

    #[test]
    fn test_remove_step_keeps_one() {
        let mut channel = Channel::new(Sound::Clap);
        channel.add_steps(2);
        assert!(channel.remove_step().is_some());
        assert!(channel.remove_step().is_none());
        assert_eq!(channel.step_count(), 1);
    }

    #[test]
    fn test_mark_active_lights_exactly_one() {
        let mut channel = Channel::new(Sound::Clap);
        channel.add_steps(4);
        channel.mark_active(2);
        channel.mark_active(3);
        assert_eq!(channel.steps().iter().filter(|s| s.active).count(), 1);
        assert_eq!(channel.active_step(), Some(3));
    }

    #[test]
    fn test_trigger_scales_by_volume() {
        let mut channel = Channel::new(Sound::Cymbal);
        let event = channel.trigger(0.5);
        assert_eq!(event.velocity, 0.5);
        assert_eq!(event.sound, Sound::Cymbal);

        channel.mute();
        assert!(channel.is_muted());
        assert_eq!(channel.trigger(1.0).velocity, 0.0);
        channel.unmute();
        assert_eq!(channel.trigger(1.0).velocity, 1.0);
    }

    #[test]
    fn test_velocity_wire_form() {
        assert_eq!(serde_json::to_string(&Velocity::Off).unwrap(), "0");
        assert_eq!(serde_json::to_string(&Velocity::Soft).unwrap(), "0.5");
        assert_eq!(serde_json::to_string(&Velocity::Full).unwrap(), "1");

        assert_eq!(serde_json::from_str::<Velocity>("1").unwrap(), Velocity::Full);
        assert_eq!(serde_json::from_str::<Velocity>("1.0").unwrap(), Velocity::Full);
        assert_eq!(serde_json::from_str::<Velocity>("0.5").unwrap(), Velocity::Soft);
        assert!(serde_json::from_str::<Velocity>("0.75").is_err());
        assert!(serde_json::from_str::<Velocity>("\"loud\"").is_err());
    }
}
