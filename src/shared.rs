// Constants and small types shared by every layer.
//
// The palette order is significant: previous/next walk it with wraparound,
// and the sprite table in audio/sprite.rs is laid out in the same order.

use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

pub const NUM_SOUNDS: usize = 16;
pub const DEFAULT_STEPS: usize = 16;
pub const DEFAULT_TEMPO: u32 = 100;
pub const TEMPO_FLOOR: u32 = 5; // decrease only works while tempo > floor
pub const DEFAULT_VOLUME: f64 = 1.0;
pub const DEFAULT_PAN: f64 = 1.0;
pub const SIXTEENTHS_PER_BEAT: u64 = 4;
pub const BEATS_PER_BAR: u64 = 4;
pub const SINK_CAPACITY: usize = 1024;

// ye olde ids
static NEXT_CHANNEL_ID: AtomicU64 = AtomicU64::new(0);
static NEXT_OWNER_ID: AtomicU64 = AtomicU64::new(0);

/// Identity of a channel for the lifetime of the process. Never persisted.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ChannelId(pub u64);

/// Identity a bus subscriber registers its handlers under.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct OwnerId(pub u64);

pub fn next_channel_id() -> ChannelId {
    ChannelId(NEXT_CHANNEL_ID.fetch_add(1, Ordering::Relaxed))
}

pub fn next_owner_id() -> OwnerId {
    OwnerId(NEXT_OWNER_ID.fetch_add(1, Ordering::Relaxed))
}

/// One of the sixteen percussion sounds, declared in palette order.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sound {
    Cowbell,
    CongaHi,
    Cymbal,
    CongaMid,
    CongaLow,
    HihatOpen,
    TomHi,
    Maracas,
    TomMid,
    HihatClosed,
    TomLow,
    Clave,
    Clap,
    Snare,
    Rim,
    #[default]
    Kick,
}

impl Sound {
    pub const PALETTE: [Sound; NUM_SOUNDS] = [
        Sound::Cowbell,
        Sound::CongaHi,
        Sound::Cymbal,
        Sound::CongaMid,
        Sound::CongaLow,
        Sound::HihatOpen,
        Sound::TomHi,
        Sound::Maracas,
        Sound::TomMid,
        Sound::HihatClosed,
        Sound::TomLow,
        Sound::Clave,
        Sound::Clap,
        Sound::Snare,
        Sound::Rim,
        Sound::Kick,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn previous(self) -> Self {
        Self::PALETTE[(self.index() + NUM_SOUNDS - 1) % NUM_SOUNDS]
    }

    pub fn next(self) -> Self {
        Self::PALETTE[(self.index() + 1) % NUM_SOUNDS]
    }

    pub fn name(self) -> &'static str {
        match self {
            Sound::Cowbell => "cowbell",
            Sound::CongaHi => "conga_hi",
            Sound::Cymbal => "cymbal",
            Sound::CongaMid => "conga_mid",
            Sound::CongaLow => "conga_low",
            Sound::HihatOpen => "hihat_open",
            Sound::TomHi => "tom_hi",
            Sound::Maracas => "maracas",
            Sound::TomMid => "tom_mid",
            Sound::HihatClosed => "hihat_closed",
            Sound::TomLow => "tom_low",
            Sound::Clave => "clave",
            Sound::Clap => "clap",
            Sound::Snare => "snare",
            Sound::Rim => "rim",
            Sound::Kick => "kick",
        }
    }
}

impl fmt::Display for Sound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown sound: {0}")]
pub struct UnknownSound(pub String);

impl FromStr for Sound {
    type Err = UnknownSound;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::PALETTE
            .iter()
            .copied()
            .find(|sound| sound.name() == s)
            .ok_or_else(|| UnknownSound(s.to_string()))
    }
}

/// Payload of the `tick` topic. Counts start at 1 and only grow while running.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TickEvent {
    pub count: u64,
}

// User actions the middle layer understands. The view layer resolves its own
// gestures into these; nothing below the middle knows about widgets.
#[derive(Clone, Debug, PartialEq)]
pub enum UiAction {
    Start,
    Stop,
    IncreaseTempo,
    DecreaseTempo,
    ToggleShare,
    Rename(String),
    SwitchToPreset(crate::pipeline::presets::Preset),

    AddChannel(Sound),
    DeleteChannel(ChannelId),
    PreviousSound(ChannelId),
    NextSound(ChannelId),
    Mute(ChannelId),
    Unmute(ChannelId),

    AddStep(ChannelId),
    RemoveStep(ChannelId),
    ClickStep { channel: ChannelId, step: usize },
}
