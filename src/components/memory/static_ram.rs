//! 71256 32K x 8 asynchronous static RAM.
//!
//! Control pins are all active low. Writes are level sensitive: every
//! evaluate with CS and WE low stores the data pins at the addressed cell,
//! so the write window is set by whatever gates WE.

use std::ops::Range;

use tracing::trace;

use crate::component::{BaseComponent, Chip, Component, Powered};
use crate::error::SimError;
use crate::pin::{DriverId, Network, PinValue};
use crate::types::{int_to_levels, levels_to_int};

pub const RAM_SIZE: usize = 1 << 15;

#[derive(Debug, Clone)]
pub struct StaticRam {
    base: BaseComponent,
    io_drivers: [DriverId; 8],
    memory: Vec<u8>,
}

impl StaticRam {
    pub const CS: u8 = 20;
    pub const OE: u8 = 22;
    pub const WE: u8 = 27;

    /// A0..A14
    pub const A: [u8; 15] = [10, 9, 8, 7, 6, 5, 4, 3, 25, 24, 21, 23, 2, 26, 1];
    /// IO0..IO7
    pub const IO: [u8; 8] = [11, 12, 13, 15, 16, 17, 18, 19];

    pub fn new(net: &mut Network, name: impl Into<String>) -> Self {
        let base = BaseComponent::new(
            net,
            name,
            &[
                (1, "A14"),
                (2, "A12"),
                (3, "A7"),
                (4, "A6"),
                (5, "A5"),
                (6, "A4"),
                (7, "A3"),
                (8, "A2"),
                (9, "A1"),
                (10, "A0"),
                (11, "IO0"),
                (12, "IO1"),
                (13, "IO2"),
                (14, "GND"),
                (15, "IO3"),
                (16, "IO4"),
                (17, "IO5"),
                (18, "IO6"),
                (19, "IO7"),
                (20, "CS"),
                (21, "A10"),
                (22, "OE"),
                (23, "A11"),
                (24, "A9"),
                (25, "A8"),
                (26, "A13"),
                (27, "WE"),
                (28, "VCC"),
            ],
        );

        let io_drivers = Self::IO.map(|pin| {
            net.add_driver(format!("{}.{}", base.name(), base.pin_name(pin).unwrap_or("IO")), false)
        });

        StaticRam {
            base,
            io_drivers,
            memory: vec![0; RAM_SIZE],
        }
    }

    fn check_address(&self, address: usize) -> Result<(), SimError> {
        if address < RAM_SIZE {
            Ok(())
        } else {
            Err(SimError::AddressOutOfRange {
                part: self.base.name().to_string(),
                address,
            })
        }
    }

    fn check_range(&self, start: usize, len: usize) -> Result<Range<usize>, SimError> {
        match start.checked_add(len) {
            Some(end) if end <= RAM_SIZE => Ok(start..end),
            end => Err(SimError::AddressOutOfRange {
                part: self.base.name().to_string(),
                address: end.map_or(start, |end| end.saturating_sub(1).max(start)),
            }),
        }
    }

    /// Write a cell directly, bypassing the pins.
    pub fn set(&mut self, address: usize, value: u8) -> Result<(), SimError> {
        self.check_address(address)?;
        self.memory[address] = value;
        Ok(())
    }

    pub fn get(&self, address: usize) -> Result<u8, SimError> {
        self.check_address(address)?;
        Ok(self.memory[address])
    }

    /// Copy `data` into consecutive cells starting at `start`.
    pub fn load(&mut self, start: usize, data: &[u8]) -> Result<(), SimError> {
        if data.is_empty() {
            return Ok(());
        }
        let cells = self.check_range(start, data.len())?;
        self.memory[cells].copy_from_slice(data);
        Ok(())
    }

    pub fn snapshot(&self, start: usize, len: usize) -> Result<&[u8], SimError> {
        let cells = self.check_range(start, len)?;
        Ok(&self.memory[cells])
    }

    fn release_data(&self, net: &mut Network) {
        for (pin, driver) in Self::IO.iter().zip(&self.io_drivers) {
            net.release(self.pin(*pin), *driver);
        }
    }

    fn read_address(&self, net: &Network) -> Result<usize, SimError> {
        let levels = self.base.read_all(net, &Self::A)?;
        levels_to_int(&levels)
            .map(|address| address as usize)
            .ok_or_else(|| SimError::configuration(self.base.name(), "address lines are floating"))
    }
}

impl Component for StaticRam {
    fn name(&self) -> &str {
        self.base.name()
    }

    fn evaluate(&mut self, net: &mut Network) -> Result<(), SimError> {
        self.check_power(net)?;

        // Chip select (active low)
        if self.base.read(net, Self::CS)? != PinValue::Low {
            self.release_data(net);
            return Ok(());
        }

        // Write enable (active low). Release first so we read the bus, not ourselves.
        if self.base.read(net, Self::WE)? == PinValue::Low {
            self.release_data(net);
            let address = self.read_address(net)?;
            let levels = self.base.read_all(net, &Self::IO)?;
            let value = levels_to_int(&levels).ok_or_else(|| {
                SimError::configuration(self.base.name(), "data lines are floating during a write")
            })? as u8;
            trace!(chip = self.base.name(), address, value, "write");
            self.memory[address] = value;
            return Ok(());
        }

        // Output enable (active low)
        if self.base.read(net, Self::OE)? == PinValue::Low {
            let address = self.read_address(net)?;
            let levels = int_to_levels(self.memory[address] as u32, 8);
            for ((pin, driver), level) in Self::IO.iter().zip(&self.io_drivers).zip(levels) {
                net.output(self.pin(*pin), *driver, level);
            }
            return Ok(());
        }

        self.release_data(net);
        Ok(())
    }
}

impl Chip for StaticRam {
    fn base(&self) -> &BaseComponent {
        &self.base
    }
}

impl Powered for StaticRam {
    const VCC: u8 = 28;
    const GND: u8 = 14;
}
