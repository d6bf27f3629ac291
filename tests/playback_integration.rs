// Playback through the public surface: actions in, sound events out of a
// sink, clock driven by hand.

use std::rc::Rc;
use std::time::Duration;

use approx::assert_relative_eq;
use crossbeam_channel::Receiver;

use drumroll::Middle;
use drumroll::audio::{self, SinkSubscription};
use drumroll::audio_api::SoundEvent;
use drumroll::pipeline::song::{Song, Velocity};
use drumroll::sequencer::{interval, interval_ms};
use drumroll::shared::{ChannelId, Sound, UiAction};

const SIXTEENTH: Duration = Duration::from_millis(125); // at 120 bpm

fn rig(tempo: u32) -> (Middle, Receiver<SoundEvent>, SinkSubscription) {
    let middle = Middle::with_song(Song::new(String::new(), tempo));
    let (sink, rx) = audio::sound_channel(256);
    let sub = audio::attach_sink(middle.bus(), Rc::new(sink));
    (middle, rx, sub)
}

fn add_channel(middle: &mut Middle, sound: Sound) -> ChannelId {
    middle.handle_action(UiAction::AddChannel(sound)).unwrap();
    middle.song().channels().last().unwrap().id()
}

// Two clicks: off -> soft -> full.
fn set_full(middle: &mut Middle, channel: ChannelId, step: usize) {
    for _ in 0..2 {
        middle
            .handle_action(UiAction::ClickStep { channel, step })
            .unwrap();
    }
}

fn drain(rx: &Receiver<SoundEvent>) -> Vec<SoundEvent> {
    rx.try_iter().collect()
}

#[test]
fn test_interval_matches_tempo() {
    assert_eq!(interval(120), SIXTEENTH);
    for tempo in [5, 60, 95, 98, 100, 133, 300] {
        assert_relative_eq!(interval_ms(tempo) * f64::from(tempo), 15_000.0, epsilon = 1e-6);
    }
}

#[test]
fn test_single_hit_loops_every_bar() {
    let (mut middle, rx, _sub) = rig(120);
    let kick = add_channel(&mut middle, Sound::Kick);
    set_full(&mut middle, kick, 0);
    drain(&rx);

    middle.handle_action(UiAction::Start).unwrap();
    assert_eq!(drain(&rx).len(), 1);

    middle.tick(SIXTEENTH * 15);
    assert!(drain(&rx).is_empty());
    assert_eq!(middle.display_state().display, "2:1:1");

    middle.tick(SIXTEENTH);
    let hits = drain(&rx);
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].sound, Sound::Kick);
    assert_eq!(hits[0].velocity, 1.0);
}

#[test]
fn test_channels_cycle_independently() {
    let (mut middle, rx, _sub) = rig(120);
    let kick = add_channel(&mut middle, Sound::Kick);
    let conga = add_channel(&mut middle, Sound::CongaLow);
    for _ in 0..12 {
        middle.handle_action(UiAction::RemoveStep(conga)).unwrap();
    }
    assert_eq!(middle.song().channel(conga).unwrap().step_count(), 4);
    set_full(&mut middle, kick, 0);
    set_full(&mut middle, conga, 0);
    drain(&rx);

    middle.handle_action(UiAction::Start).unwrap();
    middle.tick(SIXTEENTH * 15);

    let hits = drain(&rx);
    let kicks = hits.iter().filter(|s| s.sound == Sound::Kick).count();
    let congas = hits.iter().filter(|s| s.sound == Sound::CongaLow).count();
    assert_eq!(kicks, 1);
    assert_eq!(congas, 4);

    let song = middle.song();
    assert_eq!(song.channel(kick).unwrap().active_step(), Some(15));
    assert_eq!(song.channel(conga).unwrap().active_step(), Some(3));
}

#[test]
fn test_soft_steps_and_mute_scale_velocity() {
    let (mut middle, rx, _sub) = rig(120);
    let clap = add_channel(&mut middle, Sound::Clap);
    middle
        .handle_action(UiAction::ClickStep { channel: clap, step: 0 })
        .unwrap();
    assert_eq!(drain(&rx)[0].velocity, 0.5);

    middle.handle_action(UiAction::Mute(clap)).unwrap();
    middle.handle_action(UiAction::Start).unwrap();
    let hits = drain(&rx);
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].velocity, 0.0);

    middle.handle_action(UiAction::Unmute(clap)).unwrap();
    middle.tick(SIXTEENTH * 16);
    assert_eq!(drain(&rx)[0].velocity, 0.5);
}

#[test]
fn test_stop_then_stale_tick_is_silent() {
    let (mut middle, rx, _sub) = rig(120);
    let snare = add_channel(&mut middle, Sound::Snare);
    for step in 0..16 {
        set_full(&mut middle, snare, step);
    }
    drain(&rx);

    middle.handle_action(UiAction::Start).unwrap();
    middle.handle_action(UiAction::Stop).unwrap();
    assert_eq!(drain(&rx).len(), 1);

    // the tick armed before stop still fires, and does nothing
    assert_eq!(middle.tick(Duration::from_secs(2)), 1);
    assert!(drain(&rx).is_empty());
    let state = middle.display_state();
    assert!(!state.playing);
    assert_eq!(state.display, "1:1:1");
}

#[test]
fn test_restart_begins_from_the_top() {
    let (mut middle, _rx, _sub) = rig(120);
    add_channel(&mut middle, Sound::Rim);
    middle.handle_action(UiAction::Start).unwrap();
    middle.tick(SIXTEENTH * 6);
    assert_eq!(middle.transport().tick_count(), Some(7));

    middle.handle_action(UiAction::Stop).unwrap();
    middle.tick(SIXTEENTH);
    middle.handle_action(UiAction::Start).unwrap();
    assert_eq!(middle.transport().tick_count(), Some(1));
}

#[test]
fn test_tempo_change_while_playing() {
    let (mut middle, _rx, _sub) = rig(120);
    add_channel(&mut middle, Sound::Kick);
    middle.handle_action(UiAction::Start).unwrap();
    for _ in 0..120 {
        middle.handle_action(UiAction::IncreaseTempo).unwrap();
    }
    assert_eq!(middle.display_state().tempo, 240);

    // one old-length interval, then four at double speed
    middle.tick(SIXTEENTH);
    middle.tick(Duration::from_millis(250));
    assert_eq!(middle.transport().tick_count(), Some(6));
}

#[test]
fn test_tempo_floor() {
    let (mut middle, _rx, _sub) = rig(7);
    for _ in 0..5 {
        middle.handle_action(UiAction::DecreaseTempo).unwrap();
    }
    assert_eq!(middle.display_state().tempo, 5);
    middle.handle_action(UiAction::IncreaseTempo).unwrap();
    assert_eq!(middle.display_state().tempo, 6);
}

#[test]
fn test_sound_palette_wraps_with_previews() {
    let (mut middle, rx, _sub) = rig(120);
    let channel = add_channel(&mut middle, Sound::Kick);
    for _ in 0..16 {
        middle.handle_action(UiAction::NextSound(channel)).unwrap();
    }
    let previews: Vec<Sound> = drain(&rx).iter().map(|s| s.sound).collect();
    assert_eq!(previews.len(), 16);
    assert_eq!(previews[0], Sound::Cowbell);
    assert_eq!(previews[15], Sound::Kick);
    assert_eq!(middle.song().channel(channel).unwrap().sound, Sound::Kick);
}

#[test]
fn test_deleted_channel_goes_quiet() {
    let (mut middle, rx, _sub) = rig(120);
    let tom = add_channel(&mut middle, Sound::TomLow);
    set_full(&mut middle, tom, 0);
    middle.handle_action(UiAction::Start).unwrap();
    assert_eq!(drain(&rx).len(), 3); // two previews and the hit

    middle.handle_action(UiAction::DeleteChannel(tom)).unwrap();
    middle.tick(SIXTEENTH * 32);
    assert!(drain(&rx).is_empty());
    assert!(middle.display_state().channels.is_empty());
}

#[test]
fn test_click_cycle_wraps_to_off() {
    let (mut middle, rx, _sub) = rig(120);
    let hat = add_channel(&mut middle, Sound::HihatClosed);
    for _ in 0..3 {
        middle
            .handle_action(UiAction::ClickStep { channel: hat, step: 5 })
            .unwrap();
    }
    assert_eq!(
        middle.song().channel(hat).unwrap().steps()[5].velocity,
        Velocity::Off
    );
    // the click back to off is silent
    assert_eq!(drain(&rx).len(), 2);
}
