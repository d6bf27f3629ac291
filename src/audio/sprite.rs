// All sixteen sounds live in one audio sprite. Each sound is a fixed window
// into it, in milliseconds, laid out in palette order.

use std::time::Duration;

use crate::shared::{NUM_SOUNDS, Sound};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SpriteRegion {
    pub start_ms: u32,
    pub duration_ms: u32,
}

impl SpriteRegion {
    const fn new(start_ms: u32, duration_ms: u32) -> Self {
        Self { start_ms, duration_ms }
    }

    pub fn start(&self) -> Duration {
        Duration::from_millis(u64::from(self.start_ms))
    }

    pub fn duration(&self) -> Duration {
        Duration::from_millis(u64::from(self.duration_ms))
    }

    pub fn end_ms(&self) -> u32 {
        self.start_ms + self.duration_ms
    }
}

const REGIONS: [SpriteRegion; NUM_SOUNDS] = [
    SpriteRegion::new(0, 300),     // cowbell
    SpriteRegion::new(400, 300),   // conga_hi
    SpriteRegion::new(807, 3640),  // cymbal
    SpriteRegion::new(4455, 202),  // conga_mid
    SpriteRegion::new(4863, 343),  // conga_low
    SpriteRegion::new(5268, 706),  // hihat_open
    SpriteRegion::new(6277, 206),  // tom_hi
    SpriteRegion::new(6684, 53),   // maracas
    SpriteRegion::new(7092, 263),  // tom_mid
    SpriteRegion::new(7496, 90),   // hihat_closed
    SpriteRegion::new(7903, 370),  // tom_low
    SpriteRegion::new(8307, 44),   // clave
    SpriteRegion::new(8712, 208),  // clap
    SpriteRegion::new(9116, 137),  // snare
    SpriteRegion::new(9521, 36),   // rim
    SpriteRegion::new(9929, 390),  // kick
];

pub fn region(sound: Sound) -> SpriteRegion {
    REGIONS[sound.index()]
}
