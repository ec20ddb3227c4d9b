// The assembled machine and its control logic
pub mod computer;
pub mod microcode;

pub use computer::{Computer, ControlBus, MachineState, PROGRAM_SIZE};
pub use microcode::{ControlWord, Instruction, Opcode, Signal};
