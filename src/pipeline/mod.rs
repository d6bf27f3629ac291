// Song state and everything that turns it into a shareable link and back.

pub mod codec;
pub mod lz;
pub mod persistence;
pub mod presets;
pub mod route;
pub mod share;
pub mod song;

pub use codec::{DecodeError, EncodeError};
pub use persistence::{ChannelData, SongData, StepData};
pub use presets::Preset;
pub use route::Route;
pub use share::ShareLinks;
pub use song::{Channel, Song, Step, Velocity};
