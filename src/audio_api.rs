pub use crate::audio::{SoundSink, SpriteRegion};
use crate::shared::Sound;

// Everything an output sink needs to make a noise. The core never waits on
// the sink and never hears back from it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SoundEvent {
    pub sound: Sound,
    pub velocity: f64, // step velocity times channel volume, in [0, 1]
    pub pan: f64,
}
