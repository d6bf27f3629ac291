//! drumroll: a step sequencer whose songs travel as URL tokens.
//!
//! A transport publishes a tick every sixteenth note on an [`bus::EventBus`];
//! one step selector per channel picks that channel's current step and
//! publishes a sound event for a [`audio::SoundSink`] to render. Songs
//! encode to a compact URL-safe token and decode back.

pub mod audio;
pub mod audio_api;
pub mod bus;
pub mod middle;
pub mod pipeline;
pub mod sequencer;
pub mod shared;

pub use middle::{DisplayState, Middle};
