// Transport - the playback clock.
//
// Each tick publishes `tick` on the bus and arms exactly one deferred
// re-invocation one sixteenth note later. Deferred calls live on a virtual
// clock owned by the transport; whoever drives it (the app loop, a test)
// calls `advance` with elapsed time and due calls fire in order.
//
// Stopping does not cancel what is already armed. A pending call that fires
// after `stop` sees the transport inactive and does nothing.

use std::cell::RefCell;
use std::cmp::Reverse;
use std::collections::BinaryHeap;
use std::fmt;
use std::rc::Rc;
use std::time::Duration;

use crate::bus::{Event, EventBus};
use crate::pipeline::song::Song;
use crate::shared::{BEATS_PER_BAR, SIXTEENTHS_PER_BEAT, TickEvent};

/// Length of one sixteenth note in milliseconds.
pub fn interval_ms(tempo: u32) -> f64 {
    1000.0 / (f64::from(tempo) / 60.0 * SIXTEENTHS_PER_BEAT as f64)
}

pub fn interval(tempo: u32) -> Duration {
    // tempo 0 has no interval; treat it as the slowest playable tempo
    Duration::from_secs_f64(interval_ms(tempo.max(1)) / 1000.0)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransportState {
    #[default]
    Stopped,
    Running,
}

impl TransportState {
    pub fn is_playing(&self) -> bool {
        matches!(self, TransportState::Running)
    }
}

/// Bar/beat/sixteenth readout, all 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
    pub bar: u64,
    pub beat: u64,
    pub sixteenth: u64,
}

impl Position {
    pub fn from_ticks(tick_count: u64) -> Self {
        Self {
            sixteenth: tick_count % SIXTEENTHS_PER_BEAT + 1,
            beat: (tick_count / SIXTEENTHS_PER_BEAT) % BEATS_PER_BAR + 1,
            bar: tick_count / (SIXTEENTHS_PER_BEAT * BEATS_PER_BAR) + 1,
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.bar, self.beat, self.sixteenth)
    }
}

pub struct Transport {
    bus: Rc<EventBus>,
    song: Rc<RefCell<Song>>,
    tick_count: Option<u64>,
    is_active: bool,
    now: Duration,
    // (due, arm order) so equal deadlines fire in the order they were armed
    pending: BinaryHeap<Reverse<(Duration, u64)>>,
    armed: u64,
}

impl Transport {
    pub fn new(bus: Rc<EventBus>, song: Rc<RefCell<Song>>) -> Self {
        Self {
            bus,
            song,
            tick_count: None,
            is_active: false,
            now: Duration::ZERO,
            pending: BinaryHeap::new(),
            armed: 0,
        }
    }

    pub fn state(&self) -> TransportState {
        if self.is_active {
            TransportState::Running
        } else {
            TransportState::Stopped
        }
    }

    pub fn is_active(&self) -> bool {
        self.is_active
    }

    /// `None` while stopped.
    pub fn tick_count(&self) -> Option<u64> {
        self.tick_count
    }

    /// Begin playback from the top. The first tick fires immediately.
    pub fn start(&mut self) {
        if self.is_active {
            return;
        }
        log::debug!("transport start at {} bpm", self.song.borrow().tempo());
        self.is_active = true;
        self.tick();
    }

    /// Stop and rewind. There is no pause; the next start begins at tick 1.
    pub fn stop(&mut self) {
        if self.is_active {
            log::debug!("transport stop after {:?} ticks", self.tick_count);
        }
        self.is_active = false;
        self.tick_count = None;
    }

    pub fn tick(&mut self) {
        if !self.is_active {
            log::trace!("stale tick ignored");
            return;
        }
        let count = self.tick_count.map_or(1, |c| c + 1);
        self.tick_count = Some(count);
        self.bus.publish(&Event::Tick(TickEvent { count }));

        let delay = self.interval();
        self.arm(delay);
    }

    pub fn increase_tempo(&self) -> bool {
        self.song.borrow_mut().increase_tempo()
    }

    pub fn decrease_tempo(&self) -> bool {
        self.song.borrow_mut().decrease_tempo()
    }

    /// Delay between ticks at the song's current tempo.
    pub fn interval(&self) -> Duration {
        interval(self.song.borrow().tempo())
    }

    pub fn position(&self) -> Position {
        Position::from_ticks(self.tick_count.unwrap_or(0))
    }

    pub fn display(&self) -> String {
        self.position().to_string()
    }

    /// Time on the transport's own clock.
    pub fn now(&self) -> Duration {
        self.now
    }

    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    /// How long until the next armed call is due, if any.
    pub fn until_next(&self) -> Option<Duration> {
        self.pending
            .peek()
            .map(|Reverse((due, _))| due.saturating_sub(self.now))
    }

    /// Move the clock forward, firing every armed call that falls due on the
    /// way, including ones armed by calls fired during this advance.
    /// Returns how many calls fired.
    pub fn advance(&mut self, elapsed: Duration) -> usize {
        let target = self.now + elapsed;
        let mut fired = 0;
        while let Some(&Reverse((due, _))) = self.pending.peek() {
            if due > target {
                break;
            }
            self.pending.pop();
            self.now = due;
            self.tick();
            fired += 1;
        }
        self.now = target;
        fired
    }

    fn arm(&mut self, delay: Duration) {
        self.armed += 1;
        self.pending.push(Reverse((self.now + delay, self.armed)));
    }
}
