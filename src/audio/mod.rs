// The output side of the bus. The core hands finished sound events to a
// `SoundSink` and never waits on it; whatever renders audio lives on the
// far end of a bounded channel.

use std::rc::{Rc, Weak};

use crossbeam_channel::{Receiver, Sender, TrySendError};

use crate::audio_api::SoundEvent;
use crate::bus::{Event, EventBus, Handler, Topic};
use crate::shared::{OwnerId, next_owner_id};

mod sprite;

pub use sprite::{SpriteRegion, region};

pub trait SoundSink {
    fn play(&self, event: &SoundEvent);
}

/// Queues events for another thread. A full queue drops the event rather
/// than stalling the clock.
pub struct ChannelSink {
    tx: Sender<SoundEvent>,
}

impl SoundSink for ChannelSink {
    fn play(&self, event: &SoundEvent) {
        match self.tx.try_send(*event) {
            Ok(()) => {}
            Err(TrySendError::Full(dropped)) => {
                log::warn!("sound queue full, dropping {}", dropped.sound);
            }
            Err(TrySendError::Disconnected(_)) => {
                log::trace!("sound queue has no receiver");
            }
        }
    }
}

pub fn sound_channel(capacity: usize) -> (ChannelSink, Receiver<SoundEvent>) {
    let (tx, rx) = crossbeam_channel::bounded::<SoundEvent>(capacity);
    (ChannelSink { tx }, rx)
}

/// Keeps a sink subscribed to the sound topic until dropped.
pub struct SinkSubscription {
    owner: OwnerId,
    handler: Handler,
    bus: Weak<EventBus>,
}

pub fn attach_sink(bus: &Rc<EventBus>, sink: Rc<dyn SoundSink>) -> SinkSubscription {
    let owner = next_owner_id();
    let handler: Handler = Rc::new(move |event: &Event| {
        if let Event::Sound(sound) = event {
            sink.play(sound);
        }
    });
    bus.subscribe(Topic::Sound, owner, Rc::clone(&handler));
    SinkSubscription {
        owner,
        handler,
        bus: Rc::downgrade(bus),
    }
}

impl Drop for SinkSubscription {
    fn drop(&mut self) {
        if let Some(bus) = self.bus.upgrade() {
            bus.unsubscribe(Topic::Sound, self.owner, &self.handler);
        }
    }
}
