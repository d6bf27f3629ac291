// The persisted form of a song: exactly what goes into a share token.
//
// Pan and the playhead markers are not part of it. Decoding fills them with
// entity defaults, so a round trip through a token resets both.

use serde::{Deserialize, Serialize, Serializer};

use crate::pipeline::codec::DecodeError;
use crate::pipeline::song::{Channel, Song, Step, Velocity};
use crate::shared::{DEFAULT_TEMPO, DEFAULT_VOLUME, Sound};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SongData {
    #[serde(default)]
    pub name: String,
    #[serde(default = "default_tempo")]
    pub tempo: u32,
    #[serde(default)]
    pub channels: Vec<ChannelData>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChannelData {
    #[serde(default)]
    pub sound: Sound,
    #[serde(default = "default_volume", serialize_with = "serialize_number")]
    pub volume: f64,
    #[serde(default)]
    pub steps: Vec<StepData>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct StepData {
    #[serde(default)]
    pub velocity: Velocity,
}

fn default_tempo() -> u32 {
    DEFAULT_TEMPO
}

fn default_volume() -> f64 {
    DEFAULT_VOLUME
}

// Whole numbers go out as `1`, not `1.0`, so tokens match the ones already
// in circulation byte for byte.
fn serialize_number<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    if value.fract() == 0.0 && value.abs() < i64::MAX as f64 {
        serializer.serialize_i64(*value as i64)
    } else {
        serializer.serialize_f64(*value)
    }
}

pub fn serialize(song: &Song) -> SongData {
    SongData {
        name: song.name().to_string(),
        tempo: song.tempo(),
        channels: song
            .channels()
            .iter()
            .map(|channel| ChannelData {
                sound: channel.sound,
                volume: channel.volume,
                steps: channel
                    .steps()
                    .iter()
                    .map(|step| StepData { velocity: step.velocity })
                    .collect(),
            })
            .collect(),
    }
}

/// Rebuild a live song. Rejects what could never be played: a zero tempo
/// has no tick interval, a zero-length channel has no playhead, and a volume
/// outside 0..=1 would push hit velocities out of range.
pub fn deserialize(data: SongData) -> Result<Song, DecodeError> {
    if data.tempo == 0 {
        return Err(DecodeError::InvalidTempo);
    }
    let mut channels = Vec::with_capacity(data.channels.len());
    for (index, channel) in data.channels.into_iter().enumerate() {
        if channel.steps.is_empty() {
            return Err(DecodeError::EmptyChannel { index });
        }
        if !(0.0..=1.0).contains(&channel.volume) {
            return Err(DecodeError::InvalidVolume { index });
        }
        let steps = channel
            .steps
            .iter()
            .map(|s| Step::new(s.velocity))
            .collect();
        channels.push(Channel::with_steps(channel.sound, channel.volume, steps));
    }
    Ok(Song::with_channels(data.name, data.tempo, channels))
}
