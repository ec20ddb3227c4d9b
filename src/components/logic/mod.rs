// Combinational parts
pub mod gate;
pub mod gate_arrays;
pub mod transceiver;

pub use gate::{Gate, GateArray, GateKind};
pub use gate_arrays::{HexInverter, QuadAnd, QuadNand, QuadNor, QuadOr, QuadXor};
pub use transceiver::OctalBusTransceiver;
