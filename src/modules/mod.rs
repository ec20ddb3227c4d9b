//! Composite parts: groups of chips wired together into one functional block
//! of the breadboard computer, each evaluated as a single [`Component`].
//!
//! [`Component`]: crate::component::Component

pub mod alu;
pub mod output;
pub mod program_counter;
pub mod ram_module;
pub mod register;

pub use alu::Alu;
pub use output::OutputUnit;
pub use program_counter::ProgramCounter;
pub use ram_module::RamModule;
pub use register::{Register, RegisterOutput};

use crate::bus::Bus;
use crate::pin::{NodeId, Rails};

/// The nets every module plugs into: power, the shared data bus, the system
/// clock and the active-high reset line.
#[derive(Debug, Clone, Copy)]
pub struct Backplane<'a> {
    pub rails: &'a Rails,
    pub bus: &'a Bus,
    pub clock: NodeId,
    pub reset: NodeId,
}

impl<'a> Backplane<'a> {
    pub fn vcc(&self) -> NodeId {
        self.rails.vcc()
    }

    pub fn gnd(&self) -> NodeId {
        self.rails.gnd()
    }

    /// Bus nodes for `bits`, in the order given.
    pub fn bus_bits(&self, bits: &[usize]) -> Vec<NodeId> {
        bits.iter().map(|bit| self.bus.node(*bit)).collect()
    }
}
