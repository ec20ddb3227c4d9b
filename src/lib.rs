//! # Breadboard Emulator Library
//!
//! A gate-level simulator of an 8-bit breadboard computer built from
//! 74LS-series logic, a 74LS161 program counter and a 71256 static RAM.
//!
//! This library provides:
//! - A signal network of nodes and drivers with three-valued levels and
//!   conflict detection
//! - Pin-accurate chip models: gate arrays, bus transceiver, D-register,
//!   counter, adder and RAM
//! - Composite modules (registers, ALU, memory, program counter, output)
//! - A two-phase-clock control sequencer running fetch/execute micro-programs
//! - An assembler, JSON machine configs and a terminal console

pub mod assembler;
pub mod bus;
pub mod component;
pub mod components;
pub mod connection;
pub mod console;
pub mod error;
pub mod modules;
pub mod pin;
pub mod system_config;
pub mod systems;
pub mod types;

// Re-export commonly used items for easier importing
pub use bus::Bus;
pub use component::{BaseComponent, Chip, Component, Powered};
pub use connection::{attach_power, connect_pins};
pub use error::SimError;
pub use pin::{Line, Network, NodeId, PinValue, Rails};
pub use systems::{Computer, Instruction, MachineState, Opcode};
