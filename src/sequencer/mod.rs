// The playback engine: a clock that ticks every sixteenth note and one step
// selector per channel listening to it.

pub mod selector;
pub mod transport;

pub use selector::{StepSelector, local_step_index, select_step};
pub use transport::{Position, Transport, TransportState, interval, interval_ms};
