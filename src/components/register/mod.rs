pub mod d_register;

pub use d_register::FourBitDRegister;
