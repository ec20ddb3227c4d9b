pub mod two_phase_clock;

pub use two_phase_clock::{ClockPhase, TwoPhaseClock};
