// Chip models, one file per package family
pub mod arithmetic;
pub mod clock;
pub mod counter;
pub mod logic;
pub mod memory;
pub mod register;

pub use arithmetic::FourBitAdder;
pub use clock::{ClockPhase, TwoPhaseClock};
pub use counter::BinaryCounter;
pub use logic::{
    GateKind, HexInverter, OctalBusTransceiver, QuadAnd, QuadNand, QuadNor, QuadOr, QuadXor,
};
pub use memory::{StaticRam, RAM_SIZE};
pub use register::FourBitDRegister;
