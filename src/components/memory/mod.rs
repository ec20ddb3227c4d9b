pub mod static_ram;

pub use static_ram::{StaticRam, RAM_SIZE};
