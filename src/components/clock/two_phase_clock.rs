use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::error::SimError;
use crate::pin::{Line, Network, NodeId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClockPhase {
    Low,
    High,
}

impl fmt::Display for ClockPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClockPhase::Low => write!(f, "LOW"),
            ClockPhase::High => write!(f, "HIGH"),
        }
    }
}

/// The system clock line, stepped by hand.
///
/// One pulse is two phases, each followed by a full evaluate pass: CLK high
/// then evaluate, CLK low then evaluate. Parts that gate on CLK (the RAM
/// write NAND, register edge detectors) see both transitions that way.
#[derive(Debug, Clone)]
pub struct TwoPhaseClock {
    line: Line,
    phase: ClockPhase,
    cycles: u64,
}

impl TwoPhaseClock {
    pub fn new(net: &mut Network, name: &str) -> Self {
        TwoPhaseClock {
            line: Line::new(net, name, false),
            phase: ClockPhase::Low,
            cycles: 0,
        }
    }

    pub fn node(&self) -> NodeId {
        self.line.node()
    }

    pub fn phase(&self) -> ClockPhase {
        self.phase
    }

    /// Completed pulses since construction.
    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    pub fn set_phase(&mut self, net: &mut Network, phase: ClockPhase) {
        self.phase = phase;
        self.line.set(net, phase == ClockPhase::High);
    }

    /// Run one full pulse, calling `evaluate` once per phase.
    pub fn pulse<F>(&mut self, net: &mut Network, mut evaluate: F) -> Result<(), SimError>
    where
        F: FnMut(&mut Network) -> Result<(), SimError>,
    {
        self.set_phase(net, ClockPhase::High);
        evaluate(net)?;

        self.set_phase(net, ClockPhase::Low);
        evaluate(net)?;

        self.cycles += 1;
        trace!(cycle = self.cycles, "clock pulse");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pin::PinValue;

    #[test]
    fn test_pulse_evaluates_both_phases() {
        let mut net = Network::new();
        let mut clock = TwoPhaseClock::new(&mut net, "CLK");
        let node = clock.node();

        let mut seen = Vec::new();
        clock
            .pulse(&mut net, |net| {
                seen.push(net.resolve(node)?);
                Ok(())
            })
            .unwrap();

        assert_eq!(seen, vec![PinValue::High, PinValue::Low]);
        assert_eq!(clock.cycles(), 1);
        assert_eq!(clock.phase(), ClockPhase::Low);
    }

    #[test]
    fn test_failed_pass_aborts_pulse() {
        let mut net = Network::new();
        let mut clock = TwoPhaseClock::new(&mut net, "CLK");

        let result = clock.pulse(&mut net, |_| Err(SimError::configuration("test", "boom")));
        assert!(result.is_err());
        assert_eq!(clock.cycles(), 0);
        assert_eq!(clock.phase(), ClockPhase::High);
    }
}
