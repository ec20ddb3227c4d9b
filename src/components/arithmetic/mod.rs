pub mod adder;

pub use adder::FourBitAdder;
