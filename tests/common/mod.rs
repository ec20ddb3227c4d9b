//! Shared test bench for chip and module integration tests.

#![allow(dead_code)]

use breadboard_emu::bus::Bus;
use breadboard_emu::component::Component;
use breadboard_emu::components::TwoPhaseClock;
use breadboard_emu::error::SimError;
use breadboard_emu::modules::Backplane;
use breadboard_emu::pin::{Line, Network, Rails};

/// A powered network with a shared 8-bit bus, a clock and a reset line.
pub struct Bench {
    pub net: Network,
    pub rails: Rails,
    pub bus: Bus,
    pub clock: TwoPhaseClock,
    pub reset: Line,
}

impl Bench {
    pub fn new() -> Self {
        let mut net = Network::new();
        let rails = Rails::new(&mut net);
        let bus = Bus::new(&mut net, "BUS", 8);
        let clock = TwoPhaseClock::new(&mut net, "CLK");
        let reset = Line::new(&mut net, "RESET", false);

        Bench {
            net,
            rails,
            bus,
            clock,
            reset,
        }
    }

    /// Wiring context for building a module, with the network split off.
    pub fn split(&mut self) -> (&mut Network, Backplane<'_>) {
        let plane = Backplane {
            rails: &self.rails,
            bus: &self.bus,
            clock: self.clock.node(),
            reset: self.reset.node(),
        };
        (&mut self.net, plane)
    }

    pub fn line(&mut self, name: &str, value: bool) -> Line {
        Line::new(&mut self.net, name, value)
    }

    pub fn new_bus(&mut self, name: &str, width: usize) -> Bus {
        Bus::new(&mut self.net, name, width)
    }

    pub fn evaluate(&mut self, parts: &mut [&mut dyn Component]) -> Result<(), SimError> {
        for part in parts.iter_mut() {
            part.evaluate(&mut self.net)?;
        }
        Ok(())
    }

    /// One micro-step: settle at clock low, then a full clock pulse.
    pub fn cycle(&mut self, parts: &mut [&mut dyn Component]) -> Result<(), SimError> {
        self.evaluate(parts)?;
        self.clock.pulse(&mut self.net, |net| {
            for part in parts.iter_mut() {
                part.evaluate(net)?;
            }
            Ok(())
        })
    }

    pub fn bus_value(&self) -> Option<u32> {
        self.bus.value(&self.net).expect("bus conflict")
    }
}
