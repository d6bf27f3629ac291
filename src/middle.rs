// Middle layer: owns the song, the clock and the wiring between them, and
// turns user actions into song edits. The view on one side and the sound
// sink on the other only ever talk to this.

use std::cell::{Ref, RefCell};
use std::rc::Rc;
use std::time::Duration;

use crate::audio_api::SoundEvent;
use crate::bus::{Event, EventBus};
use crate::pipeline::codec::{self, DecodeError, EncodeError};
use crate::pipeline::presets::Preset;
use crate::pipeline::route::{self, Route};
use crate::pipeline::share::ShareLinks;
use crate::pipeline::song::{Channel, Song, Step, Velocity};
use crate::sequencer::{StepSelector, Transport};
use crate::shared::{ChannelId, Sound, UiAction};

#[derive(Clone, Debug, PartialEq)]
pub struct ChannelView {
    pub id: ChannelId,
    pub sound: Sound,
    pub muted: bool,
    pub steps: Vec<Step>,
}

/// Snapshot of everything a view renders.
#[derive(Clone, Debug, PartialEq)]
pub struct DisplayState {
    pub display: String,
    pub playing: bool,
    pub tempo: u32,
    pub name: String,
    pub share_visible: bool,
    pub channels: Vec<ChannelView>,
}

pub struct Middle {
    bus: Rc<EventBus>,
    song: Rc<RefCell<Song>>,
    transport: Transport,
    selectors: Vec<StepSelector>,
    token_memo: Option<(u64, String)>,
    synced_revision: Option<u64>,
    share_visible: bool,
}

impl Middle {
    /// Starts on the default preset.
    pub fn new() -> Result<Self, DecodeError> {
        Ok(Self::with_song(Preset::Default.load()?))
    }

    pub fn with_song(song: Song) -> Self {
        let bus = EventBus::new();
        let song = Rc::new(RefCell::new(song));
        let transport = Transport::new(Rc::clone(&bus), Rc::clone(&song));
        let mut middle = Self {
            bus,
            song,
            transport,
            selectors: Vec::new(),
            token_memo: None,
            synced_revision: None,
            share_visible: false,
        };
        middle.rewire();
        middle
    }

    pub fn bus(&self) -> &Rc<EventBus> {
        &self.bus
    }

    /// Don't hold on to this across `tick` or `handle_action`.
    pub fn song(&self) -> Ref<'_, Song> {
        self.song.borrow()
    }

    pub fn transport(&self) -> &Transport {
        &self.transport
    }

    pub fn handle_action(&mut self, action: UiAction) -> Result<(), DecodeError> {
        match action {
            UiAction::Start => self.transport.start(),
            UiAction::Stop => self.transport.stop(),
            UiAction::IncreaseTempo => {
                if !self.transport.increase_tempo() {
                    log::debug!("tempo already at the limit");
                }
            }
            UiAction::DecreaseTempo => {
                if !self.transport.decrease_tempo() {
                    log::debug!("tempo already at the floor");
                }
            }
            UiAction::ToggleShare => self.share_visible = !self.share_visible,
            UiAction::Rename(name) => self.song.borrow_mut().set_name(name),
            UiAction::SwitchToPreset(preset) => self.load_preset(preset)?,

            UiAction::AddChannel(sound) => {
                let id = self.song.borrow_mut().add_channel(sound);
                self.selectors.push(StepSelector::attach(&self.bus, &self.song, id));
            }
            UiAction::DeleteChannel(id) => {
                if self.song.borrow_mut().remove_channel(id).is_some() {
                    self.selectors.retain(|s| s.channel() != id);
                } else {
                    log::debug!("delete: no channel {id:?}");
                }
            }
            UiAction::PreviousSound(id) => {
                let preview = self.song.borrow_mut().edit_channel(id, |ch| {
                    ch.previous_sound();
                    ch.trigger(Velocity::Full.value())
                });
                self.preview(preview);
            }
            UiAction::NextSound(id) => {
                let preview = self.song.borrow_mut().edit_channel(id, |ch| {
                    ch.next_sound();
                    ch.trigger(Velocity::Full.value())
                });
                self.preview(preview);
            }
            UiAction::Mute(id) => self.edit(id, Channel::mute),
            UiAction::Unmute(id) => self.edit(id, Channel::unmute),

            UiAction::AddStep(id) => self.edit(id, |ch| {
                ch.add_step();
                true
            }),
            UiAction::RemoveStep(id) => self.edit(id, |ch| ch.remove_step().is_some()),
            UiAction::ClickStep { channel, step } => {
                if self.song().channel(channel).is_none_or(|ch| step >= ch.step_count()) {
                    log::debug!("click: no step {step} on {channel:?}");
                    return Ok(());
                }
                let preview = self
                    .song
                    .borrow_mut()
                    .edit_channel(channel, |ch| {
                        let velocity = ch.cycle_step(step)?;
                        (velocity != Velocity::Off).then(|| ch.trigger(velocity.value()))
                    })
                    .flatten();
                self.preview(preview);
            }
        }
        Ok(())
    }

    // `f` returns whether it changed anything, so no-op edits leave the
    // revision (and the shared link) alone.
    fn edit(&mut self, id: ChannelId, f: impl FnOnce(&mut Channel) -> bool) {
        if self.song.borrow_mut().update_channel(id, f).is_none() {
            log::debug!("edit: no channel {id:?}");
        }
    }

    // Publish outside any song borrow; a sink may read the song.
    fn preview(&self, sound: Option<SoundEvent>) {
        if let Some(sound) = sound {
            self.bus.publish(&Event::Sound(sound));
        }
    }

    /// Advance the playback clock by wall time. Returns how many ticks fired.
    pub fn tick(&mut self, elapsed: Duration) -> usize {
        self.transport.advance(elapsed)
    }

    pub fn load_token(&mut self, token: &str) -> Result<(), DecodeError> {
        let song = codec::song_from_token(token).inspect_err(|e| {
            log::warn!("could not load token: {e}");
        })?;
        self.replace_song(song);
        Ok(())
    }

    pub fn load_preset(&mut self, preset: Preset) -> Result<(), DecodeError> {
        let song = preset.load()?;
        self.replace_song(song);
        Ok(())
    }

    /// Load whatever `path` points at, index or `/song/<token>`.
    pub fn load_route(&mut self, path: &str) -> Result<(), DecodeError> {
        let song = Route::parse(path)?.resolve().inspect_err(|e| {
            log::warn!("could not load {path}: {e}");
        })?;
        self.replace_song(song);
        Ok(())
    }

    // The transport and any outside holders keep the same Rc; only its
    // contents change, so nothing needs re-plumbing except the selectors.
    fn replace_song(&mut self, song: Song) {
        log::info!(
            "loaded {:?} at {} bpm with {} channels",
            song.name(),
            song.tempo(),
            song.channels().len()
        );
        self.selectors.clear();
        *self.song.borrow_mut() = song;
        self.token_memo = None;
        self.synced_revision = None;
        self.rewire();
    }

    fn rewire(&mut self) {
        let ids: Vec<ChannelId> = self.song.borrow().channels().iter().map(|c| c.id()).collect();
        self.selectors = ids
            .into_iter()
            .map(|id| StepSelector::attach(&self.bus, &self.song, id))
            .collect();
    }

    /// Token for the current song, re-encoded only after an edit.
    pub fn share_token(&mut self) -> Result<String, EncodeError> {
        let revision = self.song.borrow().revision();
        if let Some((_, token)) = self.token_memo.as_ref().filter(|(rev, _)| *rev == revision) {
            return Ok(token.clone());
        }
        let token = codec::song_to_token(&self.song.borrow())?;
        self.token_memo = Some((revision, token.clone()));
        Ok(token)
    }

    pub fn permalink(&mut self, origin: &str) -> Result<String, EncodeError> {
        Ok(route::permalink(origin, &self.share_token()?))
    }

    /// The permalink to replace the current URL with, or `None` if nothing
    /// changed since the last sync.
    pub fn sync_url(&mut self, origin: &str) -> Result<Option<String>, EncodeError> {
        let revision = self.song.borrow().revision();
        if self.synced_revision == Some(revision) {
            return Ok(None);
        }
        let link = self.permalink(origin)?;
        self.synced_revision = Some(revision);
        Ok(Some(link))
    }

    pub fn share_links(&mut self, origin: &str) -> Result<ShareLinks, EncodeError> {
        Ok(ShareLinks::new(&self.permalink(origin)?))
    }

    pub fn display_state(&self) -> DisplayState {
        let song = self.song.borrow();
        DisplayState {
            display: self.transport.display(),
            playing: self.transport.is_active(),
            tempo: song.tempo(),
            name: song.name().to_string(),
            share_visible: self.share_visible,
            channels: song
                .channels()
                .iter()
                .map(|ch| ChannelView {
                    id: ch.id(),
                    sound: ch.sound,
                    muted: ch.is_muted(),
                    steps: ch.steps().to_vec(),
                })
                .collect(),
        }
    }
}

impl Drop for Middle {
    fn drop(&mut self) {
        self.selectors.clear();
        self.bus.clear();
    }
}
