use tracing::trace;

use crate::component::{BaseComponent, Chip, Component, Powered};
use crate::error::SimError;
use crate::pin::{DriverId, Network, PinValue};
use crate::types::{int_to_levels, levels_to_int};

/// 74LS161 4-bit synchronous binary counter.
#[derive(Debug, Clone)]
pub struct BinaryCounter {
    base: BaseComponent,
    q_drivers: [DriverId; 4],
    rco_driver: DriverId,
    count: u8,
    last_clock: bool,
}

impl BinaryCounter {
    pub const CLR: u8 = 1;
    pub const CLK: u8 = 2;
    pub const ENP: u8 = 7;
    pub const LOAD: u8 = 9;
    pub const ENT: u8 = 10;
    pub const RCO: u8 = 15;

    /// D1..D4
    pub const D: [u8; 4] = [3, 4, 5, 6];
    /// Q1..Q4
    pub const Q: [u8; 4] = [14, 13, 12, 11];

    pub fn new(net: &mut Network, name: impl Into<String>) -> Self {
        let base = BaseComponent::new(
            net,
            name,
            &[
                (1, "CLR"),
                (2, "CLK"),
                (3, "D1"),
                (4, "D2"),
                (5, "D3"),
                (6, "D4"),
                (7, "ENP"),
                (8, "GND"),
                (9, "LOAD"),
                (10, "ENT"),
                (11, "Q4"),
                (12, "Q3"),
                (13, "Q2"),
                (14, "Q1"),
                (15, "RCO"),
                (16, "VCC"),
            ],
        );

        let q_drivers = Self::Q.map(|pin| {
            net.add_driver(format!("{}.{}", base.name(), base.pin_name(pin).unwrap_or("Q")), false)
        });
        let rco_driver = net.add_driver(format!("{}.RCO", base.name()), false);

        BinaryCounter {
            base,
            q_drivers,
            rco_driver,
            count: 0,
            last_clock: false,
        }
    }

    pub fn count(&self) -> u8 {
        self.count
    }

    fn drive_outputs(&self, net: &mut Network) -> Result<(), SimError> {
        let levels = int_to_levels(self.count as u32, 4);
        for ((pin, driver), level) in Self::Q.iter().zip(&self.q_drivers).zip(levels) {
            net.output(self.pin(*pin), *driver, level);
        }

        let carry = self.count == 15 && self.base.read(net, Self::ENT)?.is_high();
        net.output(self.pin(Self::RCO), self.rco_driver, PinValue::from_bool(carry));
        Ok(())
    }
}

impl Component for BinaryCounter {
    fn name(&self) -> &str {
        self.base.name()
    }

    fn evaluate(&mut self, net: &mut Network) -> Result<(), SimError> {
        self.check_power(net)?;

        let clock = self.base.read(net, Self::CLK)?.is_high();
        let rising = clock && !self.last_clock;
        self.last_clock = clock;

        if self.base.read(net, Self::CLR)?.is_low() {
            // Asynchronous clear (active low)
            self.count = 0;
        } else if self.base.read(net, Self::LOAD)?.is_low() {
            // Parallel load (active low). Data still settling keeps the old
            // count until a later pass sees it driven.
            if let Some(value) = levels_to_int(&self.base.read_all(net, &Self::D)?) {
                if value as u8 != self.count {
                    trace!(chip = self.base.name(), value, "loaded");
                }
                self.count = value as u8;
            }
        } else if rising
            && self.base.read(net, Self::ENP)?.is_high()
            && self.base.read(net, Self::ENT)?.is_high()
        {
            self.count = (self.count + 1) % 16;
            trace!(chip = self.base.name(), count = self.count, "counted");
        }

        self.drive_outputs(net)
    }
}

impl Chip for BinaryCounter {
    fn base(&self) -> &BaseComponent {
        &self.base
    }
}

impl Powered for BinaryCounter {
    const VCC: u8 = 16;
    const GND: u8 = 8;
}
