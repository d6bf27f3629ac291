// Step selection. Every channel keeps its own loop length, so a 16-step kick
// and a 3-step conga drift against each other. Each global tick picks the
// channel-local step, moves the playhead marker and, for enabled steps,
// publishes a sound.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use crate::audio_api::SoundEvent;
use crate::bus::{Event, EventBus, Handler, Topic};
use crate::pipeline::song::{Channel, Song};
use crate::shared::{ChannelId, OwnerId, next_owner_id};

/// Channel-local step for a 1-based global tick.
pub fn local_step_index(tick: u64, step_count: usize) -> usize {
    assert!(step_count > 0, "cannot select a step from an empty channel");
    assert!(tick >= 1, "tick counts start at 1");
    ((tick - 1) % step_count as u64) as usize
}

/// Advance `channel`'s playhead to `tick` and return what it should play.
pub fn select_step(channel: &mut Channel, tick: u64) -> Option<SoundEvent> {
    let index = local_step_index(tick, channel.step_count());
    channel.mark_active(index);
    let step = channel.steps()[index];
    step.enabled().then(|| channel.trigger(step.velocity.value()))
}

/// Wires one channel to the tick topic. Dropping it unwires the channel.
pub struct StepSelector {
    channel: ChannelId,
    owner: OwnerId,
    handler: Handler,
    bus: Weak<EventBus>,
}

impl StepSelector {
    /// Panics if the channel is missing or has no steps.
    pub fn attach(bus: &Rc<EventBus>, song: &Rc<RefCell<Song>>, channel: ChannelId) -> Self {
        let step_count = song.borrow().channel(channel).map_or(0, Channel::step_count);
        assert!(
            step_count > 0,
            "channel {channel:?} needs at least one step before it can play"
        );

        let owner = next_owner_id();
        let song = Rc::downgrade(song);
        let weak_bus = Rc::downgrade(bus);
        let handler: Handler = Rc::new(move |event: &Event| {
            let Event::Tick(tick) = event else {
                return;
            };
            let Some(song) = song.upgrade() else {
                return;
            };
            // the song borrow ends here, before anyone hears the sound
            let sound = match song.borrow_mut().channel_mut(channel) {
                Some(ch) => select_step(ch, tick.count),
                None => {
                    log::trace!("tick {} for removed channel {channel:?}", tick.count);
                    None
                }
            };
            if let (Some(sound), Some(bus)) = (sound, weak_bus.upgrade()) {
                bus.publish(&Event::Sound(sound));
            }
        });
        bus.subscribe(Topic::Tick, owner, Rc::clone(&handler));
        log::debug!("selector attached to {channel:?} ({step_count} steps)");

        Self {
            channel,
            owner,
            handler,
            bus: Rc::downgrade(bus),
        }
    }

    pub fn channel(&self) -> ChannelId {
        self.channel
    }
}

impl Drop for StepSelector {
    fn drop(&mut self) {
        if let Some(bus) = self.bus.upgrade() {
            bus.unsubscribe(Topic::Tick, self.owner, &self.handler);
            log::debug!("selector detached from {:?}", self.channel);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::song::{Step, Velocity};
    use crate::shared::{Sound, TickEvent};

    fn pattern(sound: Sound, velocities: &[Velocity]) -> Channel {
        Channel::with_steps(
            sound,
            1.0,
            velocities.iter().map(|&v| Step::new(v)).collect(),
        )
    }

    fn sounds(bus: &Rc<EventBus>) -> Rc<RefCell<Vec<SoundEvent>>> {
        let heard = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&heard);
        bus.subscribe(
            Topic::Sound,
            next_owner_id(),
            Rc::new(move |event: &Event| {
                if let Event::Sound(s) = event {
                    sink.borrow_mut().push(*s);
                }
            }),
        );
        heard
    }

    fn tick(bus: &EventBus, count: u64) {
        bus.publish(&Event::Tick(TickEvent { count }));
    }

    #[test]
    fn test_local_index_wraps_per_channel() {
        let sixteen: Vec<_> = (1..=20).map(|t| local_step_index(t, 16)).collect();
        assert_eq!(sixteen[..16], (0..16).collect::<Vec<_>>()[..]);
        assert_eq!(sixteen[16..], [0, 1, 2, 3]);

        let four: Vec<_> = (1..=8).map(|t| local_step_index(t, 4)).collect();
        assert_eq!(four, [0, 1, 2, 3, 0, 1, 2, 3]);

        assert_eq!(local_step_index(5, 3), 1);
    }

    #[test]
    #[should_panic]
    fn test_local_index_rejects_empty_channel() {
        local_step_index(1, 0);
    }

    #[test]
    #[should_panic]
    fn test_local_index_rejects_tick_zero() {
        local_step_index(0, 4);
    }

    #[test]
    fn test_select_step_moves_marker_and_scales_velocity() {
        let mut channel = pattern(Sound::Clap, &[Velocity::Soft, Velocity::Off]);
        channel.volume = 0.5;

        let hit = select_step(&mut channel, 1).unwrap();
        assert_eq!(hit.sound, Sound::Clap);
        assert_eq!(hit.velocity, 0.25);
        assert_eq!(channel.active_step(), Some(0));

        assert_eq!(select_step(&mut channel, 2), None);
        assert_eq!(channel.active_step(), Some(1));
        assert_eq!(channel.steps().iter().filter(|s| s.active).count(), 1);
    }

    #[test]
    fn test_muted_channel_still_publishes() {
        let mut channel = pattern(Sound::Kick, &[Velocity::Full]);
        channel.mute();
        let hit = select_step(&mut channel, 1).unwrap();
        assert_eq!(hit.velocity, 0.0);
    }

    #[test]
    fn test_selector_publishes_enabled_steps() {
        let bus = EventBus::new();
        let song = Rc::new(RefCell::new(Song::with_channels(
            String::new(),
            120,
            vec![
                pattern(Sound::Kick, &[Velocity::Full, Velocity::Off, Velocity::Off, Velocity::Off]),
                pattern(Sound::Rim, &[Velocity::Off, Velocity::Soft, Velocity::Off]),
            ],
        )));
        let ids: Vec<_> = song.borrow().channels().iter().map(Channel::id).collect();
        let _selectors: Vec<_> = ids
            .iter()
            .map(|&id| StepSelector::attach(&bus, &song, id))
            .collect();
        let heard = sounds(&bus);

        for count in 1..=6 {
            tick(&bus, count);
        }
        let heard: Vec<_> = heard.borrow().iter().map(|s| s.sound).collect();
        // kick on 1 and 5, rim on 2 and 5
        assert_eq!(heard, [Sound::Kick, Sound::Rim, Sound::Kick, Sound::Rim]);
    }

    #[test]
    fn test_drop_unwires_selector() {
        let bus = EventBus::new();
        let song = Rc::new(RefCell::new(Song::default()));
        let id = song.borrow_mut().add_channel(Sound::Snare);
        let selector = StepSelector::attach(&bus, &song, id);
        assert_eq!(selector.channel(), id);
        assert_eq!(bus.subscriber_count(Topic::Tick), 1);
        drop(selector);
        assert_eq!(bus.subscriber_count(Topic::Tick), 0);
    }

    #[test]
    fn test_removed_channel_is_skipped() {
        let bus = EventBus::new();
        let song = Rc::new(RefCell::new(Song::default()));
        let id = song.borrow_mut().add_channel(Sound::Snare);
        song.borrow_mut()
            .edit_channel(id, |ch| ch.set_velocity(0, Velocity::Full));
        let _selector = StepSelector::attach(&bus, &song, id);
        let heard = sounds(&bus);

        song.borrow_mut().remove_channel(id);
        tick(&bus, 1);
        assert!(heard.borrow().is_empty());
    }

    #[test]
    #[should_panic]
    fn test_attach_requires_steps() {
        let bus = EventBus::new();
        let song = Rc::new(RefCell::new(Song::with_channels(
            String::new(),
            100,
            vec![pattern(Sound::Kick, &[])],
        )));
        let id = song.borrow().channels()[0].id();
        StepSelector::attach(&bus, &song, id);
    }
}
