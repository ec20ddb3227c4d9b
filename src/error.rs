use thiserror::Error;

use crate::pin::PinValue;

/// A fatal simulation error.
///
/// Nothing inside the simulator recovers from these: the current
/// `evaluate` call is aborted and the error travels up to whoever is
/// driving the clock.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SimError {
    /// Two or more drivers on one net disagree.
    #[error("conflict on node `{node}`: driven high by [{}], low by [{}]", .highs.join(", "), .lows.join(", "))]
    Conflict {
        node: String,
        highs: Vec<String>,
        lows: Vec<String>,
    },

    #[error("{part} is not powered: VCC is {vcc}, GND is {gnd}")]
    Power {
        part: String,
        vcc: PinValue,
        gnd: PinValue,
    },

    #[error("{part}: {detail}")]
    Configuration { part: String, detail: String },

    #[error("{gate} gate expects {expected} input(s), got {got}")]
    Shape {
        gate: &'static str,
        expected: &'static str,
        got: usize,
    },

    #[error("{part} has no pin {pin}")]
    UnknownPin { part: String, pin: u8 },

    #[error("{part}: address {address:#06x} is out of range")]
    AddressOutOfRange { part: String, address: usize },

    #[error("illegal opcode {opcode:#03x} at address {address}")]
    IllegalInstruction { opcode: u8, address: u8 },
}

impl SimError {
    pub fn configuration(part: impl Into<String>, detail: impl Into<String>) -> Self {
        SimError::Configuration {
            part: part.into(),
            detail: detail.into(),
        }
    }
}
